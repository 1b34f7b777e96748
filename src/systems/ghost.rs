use bevy_ecs::component::Component;
use bevy_ecs::event::EventWriter;
use bevy_ecs::query::{With, Without};
use bevy_ecs::resource::Resource;
use bevy_ecs::system::{Query, Res, ResMut};
use glam::Vec2;
use rand::seq::IndexedRandom;
use strum_macros::AsRefStr;
use tracing::{debug, trace, warn};

use crate::constants::{mode, score, speed, NCOLS, NROWS, TILE_HEIGHT, TILE_WIDTH};
use crate::error::GameError;
use crate::map::builder::{Map, StartPositions};
use crate::map::direction::Direction;
use crate::map::graph::{Access, Graph, NodeId};
use crate::systems::components::{DeltaTime, GameRng, PlayerControlled};
use crate::systems::movement::{valid_directions, Position, Velocity};

/// The four ghosts.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Ghost {
    Blinky,
    Pinky,
    Inky,
    Clyde,
}

impl Ghost {
    pub const ALL: [Ghost; 4] = [Ghost::Blinky, Ghost::Pinky, Ghost::Inky, Ghost::Clyde];

    /// The access class this ghost is checked against.
    pub fn access(self) -> Access {
        match self {
            Ghost::Blinky => Access::BLINKY,
            Ghost::Pinky => Access::PINKY,
            Ghost::Inky => Access::INKY,
            Ghost::Clyde => Access::CLYDE,
        }
    }

    /// Each ghost scatters to its own corner of the board.
    pub fn scatter_target(self) -> Vec2 {
        let right = TILE_WIDTH * NCOLS as f32;
        let bottom = TILE_HEIGHT * NROWS as f32;
        match self {
            Ghost::Blinky => Vec2::ZERO,
            Ghost::Pinky => Vec2::new(right, 0.0),
            Ghost::Inky => Vec2::new(right, bottom),
            Ghost::Clyde => Vec2::new(0.0, bottom),
        }
    }

    pub fn start_node(self, starts: &StartPositions) -> NodeId {
        match self {
            Ghost::Blinky => starts.blinky,
            Ghost::Pinky => starts.pinky,
            Ghost::Inky => starts.inky,
            Ghost::Clyde => starts.clyde,
        }
    }

    /// Where this ghost heads while chasing.
    pub fn chase_target(self, context: &ChaseContext) -> Vec2 {
        match self {
            Ghost::Blinky => context.pacman,
            Ghost::Pinky => context.ahead(4.0),
            Ghost::Inky => {
                let pivot = context.ahead(2.0);
                context.blinky + (pivot - context.blinky) * 2.0
            }
            Ghost::Clyde => {
                let reach = 8.0 * TILE_WIDTH;
                if context.pacman.distance_squared(context.position) <= reach * reach {
                    self.scatter_target()
                } else {
                    context.ahead(4.0)
                }
            }
        }
    }
}

/// What the chase targets are computed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaseContext {
    pub pacman: Vec2,
    /// Pac-Man's heading, `None` while he is stopped.
    pub heading: Option<Direction>,
    pub blinky: Vec2,
    /// The deciding ghost's own position.
    pub position: Vec2,
}

impl ChaseContext {
    fn ahead(&self, tiles: f32) -> Vec2 {
        let heading = self.heading.map(Direction::as_vec2).unwrap_or(Vec2::ZERO);
        self.pacman + heading * TILE_WIDTH * tiles
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
pub enum GhostMode {
    Scatter,
    Chase,
    Freight,
    Spawn,
}

/// The scatter/chase cycle shared by all modes. It keeps running underneath FREIGHT and SPAWN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainMode {
    mode: GhostMode,
    timer: f32,
}

impl Default for MainMode {
    fn default() -> Self {
        Self {
            mode: GhostMode::Scatter,
            timer: 0.0,
        }
    }
}

impl MainMode {
    pub fn mode(&self) -> GhostMode {
        self.mode
    }

    pub fn update(&mut self, seconds: f32) {
        self.timer += seconds;
        let limit = match self.mode {
            GhostMode::Chase => mode::CHASE,
            _ => mode::SCATTER,
        };
        if self.timer >= limit {
            self.mode = match self.mode {
                GhostMode::Chase => GhostMode::Scatter,
                _ => GhostMode::Chase,
            };
            self.timer = 0.0;
        }
    }
}

/// Per-ghost mode state machine.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct ModeController {
    main: MainMode,
    current: Option<GhostMode>,
    timer: f32,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mode the ghost is acting in.
    pub fn current(&self) -> GhostMode {
        self.current.unwrap_or(self.main.mode)
    }

    /// Advances the timers. Returns true on the frame FREIGHT runs out.
    pub fn update(&mut self, seconds: f32) -> bool {
        self.main.update(seconds);
        if self.current == Some(GhostMode::Freight) {
            self.timer += seconds;
            if self.timer >= mode::FREIGHT {
                self.current = None;
                self.timer = 0.0;
                return true;
            }
        }
        false
    }

    /// Frightens the ghost, or restarts the FREIGHT timer if it already is.
    /// A ghost in SPAWN is unaffected. Returns true if the ghost is in FREIGHT afterwards.
    pub fn start_freight(&mut self) -> bool {
        match self.current() {
            GhostMode::Spawn => false,
            _ => {
                self.current = Some(GhostMode::Freight);
                self.timer = 0.0;
                true
            }
        }
    }

    /// Moves a frightened ghost into SPAWN.
    pub fn start_spawn(&mut self) {
        if self.current() == GhostMode::Freight {
            self.current = Some(GhostMode::Spawn);
            self.timer = 0.0;
        }
    }

    /// Ends SPAWN, resuming the scatter/chase cycle.
    pub fn finish_spawn(&mut self) -> bool {
        if self.current() == GhostMode::Spawn {
            self.current = None;
            return true;
        }
        false
    }

    /// True during the last seconds of FREIGHT.
    pub fn is_flashing(&self) -> bool {
        self.current() == GhostMode::Freight && self.timer >= mode::FREIGHT - mode::FREIGHT_FLASH
    }
}

/// Where a ghost starts a level and where it returns to after capture.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostHome {
    pub start: NodeId,
    pub spawn: NodeId,
}

/// Points for the next ghost captured. Doubles with each capture and resets when a power pellet is eaten.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GhostBounty(pub u32);

impl Default for GhostBounty {
    fn default() -> Self {
        Self(score::GHOST_BASE)
    }
}

impl GhostBounty {
    /// Returns the current bounty and doubles it.
    pub fn claim(&mut self) -> u32 {
        let points = self.0;
        self.0 = self.0.saturating_mul(2);
        points
    }

    pub fn reset(&mut self) {
        self.0 = score::GHOST_BASE;
    }
}

/// Picks the candidate whose one-tile probe lands closest to `goal`.
/// Ties go to the earlier direction in [`Direction::PRIORITY`].
pub fn goal_direction(graph: &Graph, node: NodeId, candidates: &[Direction], goal: Vec2) -> Option<Direction> {
    let origin = graph.position(node)?;
    let mut best: Option<(Direction, f32)> = None;
    for direction in Direction::PRIORITY.into_iter().filter(|d| candidates.contains(d)) {
        let distance = (origin + direction.as_vec2() * TILE_WIDTH).distance_squared(goal);
        if best.is_none_or(|(_, closest)| distance < closest) {
            best = Some((direction, distance));
        }
    }
    best.map(|(direction, _)| direction)
}

/// Frightens a ghost. A ghost that was not frightened already turns around on the spot.
pub fn frighten(graph: &Graph, controller: &mut ModeController, position: &mut Position, velocity: &mut Velocity) {
    let was_frightened = controller.current() == GhostMode::Freight;
    if !controller.start_freight() {
        return;
    }
    velocity.speed = speed::GHOST_FREIGHT;
    if !was_frightened {
        position.reverse(graph);
        velocity.direction = velocity.direction.opposite();
    }
}

/// Sends a captured ghost back to the home at SPAWN speed, letting it down through the home entry.
pub fn send_home(ghost: Ghost, graph: &mut Graph, controller: &mut ModeController, velocity: &mut Velocity) {
    controller.start_freight();
    controller.start_spawn();
    velocity.speed = speed::GHOST_SPAWN;
    graph.allow_home_access(ghost.access());
    debug!(ghost = ghost.as_ref(), "Ghost captured");
}

/// Ticks every ghost's mode timers, restoring normal speed when FREIGHT ends.
pub fn ghost_mode_system(delta_time: Res<DeltaTime>, mut ghosts: Query<(&Ghost, &mut ModeController, &mut Velocity)>) {
    for (ghost, mut controller, mut velocity) in ghosts.iter_mut() {
        if controller.update(delta_time.seconds) {
            velocity.speed = speed::GHOST;
            trace!(ghost = ghost.as_ref(), "Freight ended");
        }
    }
}

/// Moves the ghosts along the graph, choosing a new direction at every node they reach.
///
/// Frightened ghosts wander at random; the others head for the goal of their current mode.
/// A ghost in SPAWN that reaches the spawn node resumes its main mode and is shut out of the home again.
#[allow(clippy::type_complexity)]
pub fn ghost_movement_system(
    mut map: ResMut<Map>,
    delta_time: Res<DeltaTime>,
    mut rng: ResMut<GameRng>,
    players: Query<(&Position, &Velocity), With<PlayerControlled>>,
    mut ghosts: Query<(&Ghost, &GhostHome, &mut ModeController, &mut Position, &mut Velocity), Without<PlayerControlled>>,
    mut errors: EventWriter<GameError>,
) {
    let Ok((player_position, player_velocity)) = players.single() else {
        return;
    };
    let pacman = match player_position.get_pixel_position(&map.graph) {
        Ok(pixel) => pixel,
        Err(e) => {
            errors.write(e);
            return;
        }
    };
    let heading = (!player_position.is_at_node()).then_some(player_velocity.direction);
    let blinky = ghosts
        .iter()
        .find(|(ghost, ..)| **ghost == Ghost::Blinky)
        .and_then(|(_, _, _, position, _)| position.get_pixel_position(&map.graph).ok())
        .unwrap_or(pacman);

    for (ghost, home, mut controller, mut position, mut velocity) in ghosts.iter_mut() {
        let mut distance = velocity.speed * delta_time.seconds;

        loop {
            match *position {
                Position::Stopped { node } => {
                    let candidates = valid_directions(&map.graph, node, ghost.access(), velocity.direction);
                    let choice = match controller.current() {
                        GhostMode::Freight => candidates.choose(&mut rng.0).copied(),
                        current => {
                            let own = map.graph.position(node).unwrap_or(pacman);
                            let goal = match current {
                                GhostMode::Scatter => ghost.scatter_target(),
                                GhostMode::Spawn => map.graph.position(home.spawn).unwrap_or(own),
                                _ => ghost.chase_target(&ChaseContext {
                                    pacman,
                                    heading,
                                    blinky,
                                    position: own,
                                }),
                            };
                            goal_direction(&map.graph, node, &candidates, goal)
                        }
                    };

                    let next = choice.and_then(|direction| {
                        Position::depart(&map.graph, node, direction, ghost.access()).map(|next| (direction, next))
                    });
                    match next {
                        Some((direction, next)) => {
                            velocity.direction = direction;
                            *position = next;
                        }
                        None => {
                            warn!(node, ghost = ghost.as_ref(), "Ghost has no available directions");
                            break;
                        }
                    }
                }
                Position::Moving { .. } => {
                    let overflow = position.tick(distance);
                    position.enter_portal(&map.graph);

                    let arrived_home = position.is_at_node() && position.current_node() == home.spawn;
                    if arrived_home && controller.current() == GhostMode::Spawn && controller.finish_spawn() {
                        velocity.speed = speed::GHOST;
                        map.graph.deny_home_access(ghost.access());
                        debug!(ghost = ghost.as_ref(), "Ghost respawned");
                    }

                    match overflow {
                        Some(overflow) => distance = overflow,
                        None => break,
                    }
                }
            }
        }
    }
}
