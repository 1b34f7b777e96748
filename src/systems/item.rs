//! Pellets, power-ups and fruit.

use bevy_ecs::{
    component::Component,
    entity::Entity,
    event::{Event, EventReader, EventWriter},
    query::{Or, With, Without},
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
};
use glam::Vec2;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use crate::{
    constants::{collider, milestones, score, timing},
    error::GameError,
    map::{
        builder::Map,
        direction::Direction,
        graph::Graph,
        parser::{PelletKind, TileGrid},
    },
    systems::{
        audio::{AudioEvent, Sound},
        components::{Collider, DeltaTime, GameRng, Hidden, PlayerControlled},
        ghost::{frighten, Ghost, GhostBounty, ModeController},
        hud::HudEvent,
        lifetime::TimeToLive,
        movement::{Position, Velocity},
        pause::{Pause, PauseAction},
        player::{PlayerLifecycle, PlayerModifiers},
        state::{award_points, BackgroundFlash, Session},
    },
};

impl PelletKind {
    pub fn points(self) -> u32 {
        match self {
            PelletKind::Normal => score::PELLET,
            PelletKind::Power => score::POWER_PELLET,
            _ => score::SPECIAL_PELLET,
        }
    }

    /// Whether a score magnet pulls this kind in.
    pub fn is_magnetic(self) -> bool {
        matches!(self, PelletKind::Normal | PelletKind::Power)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pellet {
    /// Tile coordinate as `(col, row)`.
    pub tile: (usize, usize),
    pub position: Vec2,
    pub kind: PelletKind,
    pub points: u32,
    /// Power pellets blink; the others are always visible.
    pub visible: bool,
}

/// Every pellet left on the board.
#[derive(Resource, Debug, Clone, Default)]
pub struct PelletGroup {
    pellets: Vec<Pellet>,
    blink_timer: f32,
}

impl PelletGroup {
    /// Places a pellet on every tile that carries one.
    pub fn from_grid(grid: &TileGrid) -> Self {
        let pellets = grid
            .iter()
            .filter_map(|(col, row, tile)| {
                let kind = tile.pellet()?;
                Some(Pellet {
                    tile: (col, row),
                    position: Graph::tile_to_pixel(Vec2::new(col as f32, row as f32)),
                    kind,
                    points: kind.points(),
                    visible: true,
                })
            })
            .collect();
        Self {
            pellets,
            blink_timer: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.pellets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pellets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pellet> {
        self.pellets.iter()
    }

    /// Toggles power pellet visibility on the blink interval.
    pub fn update(&mut self, seconds: f32) {
        self.blink_timer += seconds;
        if self.blink_timer < timing::POWER_PELLET_BLINK {
            return;
        }
        self.blink_timer -= timing::POWER_PELLET_BLINK;
        for pellet in self.pellets.iter_mut().filter(|p| p.kind == PelletKind::Power) {
            pellet.visible = !pellet.visible;
        }
    }

    /// Index of the first pellet within reach of a collider at `position`.
    pub fn find_collision(&self, position: Vec2, radius: f32) -> Option<usize> {
        let reach = radius + collider::PELLET;
        self.pellets
            .iter()
            .position(|pellet| pellet.position.distance_squared(position) <= reach * reach)
    }

    pub fn remove(&mut self, index: usize) -> Pellet {
        self.pellets.remove(index)
    }

    /// Removes and returns the visible normal and power pellets within `radius` of `center`.
    pub fn absorb_within(&mut self, center: Vec2, radius: f32) -> Vec<Pellet> {
        let (absorbed, kept): (Vec<Pellet>, Vec<Pellet>) = self.pellets.iter().partition(|pellet| {
            pellet.kind.is_magnetic() && pellet.visible && pellet.position.distance_squared(center) <= radius * radius
        });
        self.pellets = kept;
        absorbed
    }
}

impl FromIterator<Pellet> for PelletGroup {
    fn from_iter<I: IntoIterator<Item = Pellet>>(iter: I) -> Self {
        Self {
            pellets: iter.into_iter().collect(),
            blink_timer: 0.0,
        }
    }
}

/// Sent when the eaten-pellet count goes from `before` to `after` in one frame.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PelletsEaten {
    pub before: u32,
    pub after: u32,
}

impl PelletsEaten {
    /// Whether the count passed `threshold` in this step.
    pub fn crossed(&self, threshold: u32) -> bool {
        self.before < threshold && threshold <= self.after
    }
}

/// A bonus fruit sitting next to the fruit node until it is eaten or expires.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fruit {
    pub points: u32,
}

impl Fruit {
    pub fn for_level(level: u32) -> Self {
        Self {
            points: score::FRUIT_BASE + score::FRUIT_PER_LEVEL * level,
        }
    }
}

pub fn pellet_blink_system(delta_time: Res<DeltaTime>, mut pellets: ResMut<PelletGroup>) {
    pellets.update(delta_time.seconds);
}

/// Eats the pellet under Pac-Man and applies its effect.
///
/// Clearing the last pellet flashes the background, hides everyone and schedules the next level.
#[allow(clippy::too_many_arguments)]
#[allow(clippy::type_complexity)]
pub fn pellet_collision_system(
    mut commands: Commands,
    map: Res<Map>,
    mut pellets: ResMut<PelletGroup>,
    mut session: ResMut<Session>,
    mut pause: ResMut<Pause>,
    mut flash: ResMut<BackgroundFlash>,
    mut rng: ResMut<GameRng>,
    mut bounty: ResMut<GhostBounty>,
    mut players: Query<(&mut Position, &mut PlayerModifiers, &Collider), With<PlayerControlled>>,
    mut ghosts: Query<(&mut ModeController, &mut Position, &mut Velocity), (With<Ghost>, Without<PlayerControlled>)>,
    actors: Query<Entity, Or<(With<PlayerControlled>, With<Ghost>)>>,
    mut audio: EventWriter<AudioEvent>,
    mut progress: EventWriter<PelletsEaten>,
    mut errors: EventWriter<GameError>,
) {
    let Ok((mut position, mut modifiers, collider)) = players.single_mut() else {
        return;
    };
    let pacman = match position.get_pixel_position(&map.graph) {
        Ok(pixel) => pixel,
        Err(e) => {
            errors.write(e);
            return;
        }
    };
    let Some(index) = pellets.find_collision(pacman, collider.radius) else {
        return;
    };

    let before = session.pellets_eaten;
    let pellet = pellets.remove(index);
    session.pellets_eaten += 1;
    award_points(&mut session, pellet.points, &mut audio);

    match pellet.kind {
        PelletKind::Normal => {
            audio.write(AudioEvent::PlaySound(Sound::Munch));
        }
        PelletKind::Power => {
            audio.write(AudioEvent::PlaySound(Sound::PowerPellet));
            bounty.reset();
            for (mut controller, mut ghost_position, mut velocity) in ghosts.iter_mut() {
                frighten(&map.graph, &mut controller, &mut ghost_position, &mut velocity);
            }
        }
        PelletKind::Teleport => {
            let occupied = [position.current_node(), position.target_node()];
            let destinations: Vec<_> = map
                .graph
                .nodes()
                .map(|(id, _)| id)
                .filter(|id| !map.graph.is_home_node(*id) && !occupied.contains(id))
                .collect();
            if let Some(&node) = destinations.choose(&mut rng.0) {
                debug!(from = position.current_node(), to = node, "Teleported");
                *position = Position::Stopped { node };
            }
        }
        PelletKind::Invisibility => {
            modifiers.invisibility = timing::INVISIBILITY;
        }
        PelletKind::SpeedBoost => {
            modifiers.speed_boost = timing::SPEED_BOOST;
        }
        PelletKind::ScoreMagnet => {
            let absorbed = pellets.absorb_within(pellet.position, collider::MAGNET_RADIUS);
            debug!(count = absorbed.len(), "Magnet absorbed pellets");
            for pellet in absorbed {
                session.pellets_eaten += 1;
                award_points(&mut session, pellet.points, &mut audio);
            }
        }
    }

    progress.write(PelletsEaten {
        before,
        after: session.pellets_eaten,
    });

    if pellets.is_empty() {
        info!(level = session.level, score = session.score, "Level cleared");
        audio.write(AudioEvent::PlaySound(Sound::LevelClear));
        flash.start();
        for entity in actors.iter() {
            commands.entity(entity).insert(Hidden);
        }
        pause.pause_for(timing::LEVEL_CLEAR_DELAY, PauseAction::NextLevel);
    }
}

/// Reacts to the eaten count passing its thresholds: ghosts leave the home and fruit appears.
pub fn pellet_milestone_system(
    mut commands: Commands,
    mut map: ResMut<Map>,
    session: Res<Session>,
    fruits: Query<(), With<Fruit>>,
    mut events: EventReader<PelletsEaten>,
) {
    let mut fruit_active = !fruits.is_empty();
    for event in events.read() {
        if event.crossed(milestones::INKY_RELEASE) {
            debug!(eaten = event.after, "Inky released");
            map.release_inky();
        }
        if event.crossed(milestones::CLYDE_RELEASE) {
            debug!(eaten = event.after, "Clyde released");
            map.release_clyde();
        }
        if !fruit_active && milestones::FRUIT.iter().any(|&threshold| event.crossed(threshold)) {
            spawn_fruit(&mut commands, &map, session.level);
            fruit_active = true;
        }
    }
}

/// Places the level's fruit halfway between the fruit node and its right-hand neighbor.
pub fn spawn_fruit(commands: &mut Commands, map: &Map, level: u32) -> Entity {
    let node = map.start_positions.fruit;
    let position = Position::between(&map.graph, node, Direction::Right).unwrap_or(Position::Stopped { node });
    let fruit = Fruit::for_level(level);
    debug!(points = fruit.points, "Fruit spawned");
    commands
        .spawn((
            fruit,
            position,
            Collider::new(collider::FRUIT),
            TimeToLive::new(timing::FRUIT_LIFESPAN),
        ))
        .id()
}

/// Eats a fruit the player touches.
#[allow(clippy::too_many_arguments)]
pub fn fruit_collision_system(
    mut commands: Commands,
    map: Res<Map>,
    mut session: ResMut<Session>,
    players: Query<(&PlayerLifecycle, &Position, &Collider), (With<PlayerControlled>, Without<Hidden>)>,
    fruits: Query<(Entity, &Fruit, &Position, &Collider)>,
    mut audio: EventWriter<AudioEvent>,
    mut hud: EventWriter<HudEvent>,
    mut errors: EventWriter<GameError>,
) {
    let Ok((lifecycle, player_position, player_collider)) = players.single() else {
        return;
    };
    if !lifecycle.is_alive() {
        return;
    }
    let pacman = match player_position.get_pixel_position(&map.graph) {
        Ok(pixel) => pixel,
        Err(e) => {
            errors.write(e);
            return;
        }
    };

    for (entity, fruit, position, collider) in fruits.iter() {
        let Ok(fruit_position) = position.get_pixel_position(&map.graph) else {
            continue;
        };
        if !player_collider.collides(pacman, collider, fruit_position) {
            continue;
        }

        debug!(points = fruit.points, "Fruit eaten");
        audio.write(AudioEvent::PlaySound(Sound::EatFruit));
        award_points(&mut session, fruit.points, &mut audio);
        session.fruits_captured.push(fruit.points);
        hud.write(HudEvent::Popup {
            points: fruit.points,
            position: fruit_position,
        });
        hud.write(HudEvent::FruitCaptured(fruit.points));
        commands.entity(entity).despawn();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pellets_from_grid() {
        let grid = TileGrid::parse("+.p\nn-M").unwrap();
        let pellets = PelletGroup::from_grid(&grid);
        let kinds: Vec<PelletKind> = pellets.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PelletKind::Normal,
                PelletKind::Normal,
                PelletKind::Power,
                PelletKind::ScoreMagnet
            ]
        );
        assert_eq!(pellets.iter().nth(2).map(|p| p.position), Some(Vec2::new(32.0, 0.0)));
    }

    #[test]
    fn test_power_pellets_blink() {
        let grid = TileGrid::parse("+p").unwrap();
        let mut pellets = PelletGroup::from_grid(&grid);
        pellets.update(timing::POWER_PELLET_BLINK);
        let visible: Vec<bool> = pellets.iter().map(|p| p.visible).collect();
        assert_eq!(visible, vec![true, false]);
    }

    #[test]
    fn test_find_collision_uses_half_tile_threshold() {
        let grid = TileGrid::parse("+").unwrap();
        let pellets = PelletGroup::from_grid(&grid);
        assert_eq!(pellets.find_collision(Vec2::new(8.0, 0.0), collider::PACMAN), Some(0));
        assert_eq!(pellets.find_collision(Vec2::new(8.5, 0.0), collider::PACMAN), None);
    }

    #[test]
    fn test_threshold_crossing() {
        let step = PelletsEaten { before: 28, after: 33 };
        assert!(step.crossed(30));
        assert!(!step.crossed(28));
        assert!(step.crossed(33));
        assert!(!step.crossed(34));
    }

    #[test]
    fn test_fruit_points_scale_with_level() {
        assert_eq!(Fruit::for_level(0).points, 100);
        assert_eq!(Fruit::for_level(3).points, 160);
    }
}
