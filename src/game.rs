//! This module contains the main game logic and state.

use bevy_ecs::bundle::Bundle;
use bevy_ecs::entity::Entity;
use bevy_ecs::event::{Event, EventRegistry, Events};
use bevy_ecs::query::{Has, Or, QueryFilter, With};
use bevy_ecs::schedule::{IntoScheduleConfigs, Schedule, SystemSet};
use bevy_ecs::system::Res;
use bevy_ecs::world::World;
use tracing::{debug, error, info, warn};

use crate::config::GameConfig;
use crate::constants::{collider, speed};
use crate::error::{GameError, GameResult};
use crate::events::{GameCommand, GameEvent};
use crate::formatter;
use crate::highscore::HighScoreStore;
use crate::map::builder::Map;
use crate::map::direction::Direction;
use crate::map::graph::Access;
use crate::map::layout::Maze;
use crate::render::{Frame, GhostView, PacmanView};
use crate::systems::{
    ability_system, audio_system, background_flash_system, background_music_system, bullet_collision_system,
    bullet_movement_system, fruit_collision_system, ghost_collision_system, ghost_mode_system, ghost_movement_system,
    handle_pause_command, hud_sync_system, hud_system, pellet_blink_system, pellet_collision_system,
    pellet_milestone_system, player_control_system, player_modifier_system, player_movement_system,
    time_to_live_system, AbilitySlot, AudioEvent, AudioResource, AudioSink, AudioState, BackgroundFlash, Banner,
    BufferedDirection, Bullet, Collider, DeltaTime, Fruit, GameRng, Ghost, GhostBounty, GhostHome, GlobalState,
    Hidden, Hud, HudEvent, HudResource, ModeController, Pause, PauseAction, PelletGroup, PelletsEaten,
    PlayerControlled, PlayerLifecycle, PlayerModifiers, Position, Session, Sound, Velocity,
};

/// Frame phases, run in declaration order.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
enum GameplaySet {
    /// Player commands and the pause key
    Input,
    /// Blinking and flashing that continue through pauses
    Ambient,
    /// Ghost timers, ghost movement and item lifetimes
    Update,
    /// Collisions between Pac-Man, bullets and everything else
    Respond,
    /// Abilities, power-ups and movement for Pac-Man and his bullets
    Player,
    /// Music, HUD readouts and delivery to the collaborators
    Present,
}

fn gameplay_running(pause: Res<Pause>) -> bool {
    !pause.is_paused()
}

#[derive(Bundle)]
struct PlayerBundle {
    player: PlayerControlled,
    lifecycle: PlayerLifecycle,
    modifiers: PlayerModifiers,
    ability: AbilitySlot,
    position: Position,
    velocity: Velocity,
    buffered_direction: BufferedDirection,
    collider: Collider,
}

#[derive(Bundle)]
struct GhostBundle {
    ghost: Ghost,
    home: GhostHome,
    controller: ModeController,
    position: Position,
    velocity: Velocity,
    collider: Collider,
}

/// Core game state manager built on the Bevy ECS architecture.
///
/// The `World` holds the maze, the actors and the session, and the `Schedule` runs one frame of
/// gameplay in a fixed order. Level transitions happen outside the schedule, when a timed pause
/// hands back its action at the end of [`Game::update`]. The audio and HUD backends are stored as
/// `NonSend` resources, so they need not be thread-safe.
pub struct Game {
    pub world: World,
    pub schedule: Schedule,
}

impl Game {
    /// Builds the world and loads the first level, paused with READY shown.
    ///
    /// # Errors
    ///
    /// Returns `GameError` if the first maze cannot be loaded or built.
    pub fn new(config: GameConfig, audio: Box<dyn AudioSink>, hud: Box<dyn Hud>) -> GameResult<Game> {
        info!(character = config.character.as_ref(), "Starting game initialization");
        let mut world = World::default();
        let mut schedule = Schedule::default();

        EventRegistry::register_event::<GameError>(&mut world);
        EventRegistry::register_event::<GameEvent>(&mut world);
        EventRegistry::register_event::<AudioEvent>(&mut world);
        EventRegistry::register_event::<HudEvent>(&mut world);
        EventRegistry::register_event::<PelletsEaten>(&mut world);

        let high_scores = HighScoreStore::new(&config.high_score_path);
        let high_score = high_scores.load();
        debug!(high_score, "High score loaded");

        world.insert_resource(Session::new(&config, high_score));
        world.insert_resource(Pause::new(true));
        world.insert_resource(Banner::default());
        world.insert_resource(GhostBounty::default());
        world.insert_resource(BackgroundFlash::default());
        world.insert_resource(AudioState::default());
        world.insert_resource(GameRng::new(config.seed));
        world.insert_resource(GlobalState { exit: false });
        world.insert_resource(DeltaTime::default());
        world.insert_resource(high_scores);
        world.insert_resource(config);
        world.insert_non_send_resource(AudioResource(audio));
        world.insert_non_send_resource(HudResource(hud));

        Self::configure_schedule(&mut schedule);

        let mut game = Game { world, schedule };
        game.start_level()?;
        game.set_banner(Banner::Ready);
        info!("Game initialized");
        Ok(game)
    }

    fn configure_schedule(schedule: &mut Schedule) {
        schedule
            .add_systems((
                (player_control_system, handle_pause_command)
                    .chain()
                    .in_set(GameplaySet::Input),
                (pellet_blink_system, background_flash_system).in_set(GameplaySet::Ambient),
                (ghost_mode_system, ghost_movement_system, time_to_live_system)
                    .chain()
                    .in_set(GameplaySet::Update),
                (
                    pellet_collision_system.run_if(gameplay_running),
                    pellet_milestone_system,
                    ghost_collision_system.run_if(gameplay_running),
                    bullet_collision_system.run_if(gameplay_running),
                    fruit_collision_system.run_if(gameplay_running),
                )
                    .chain()
                    .in_set(GameplaySet::Respond),
                (
                    ability_system,
                    player_modifier_system,
                    player_movement_system,
                    bullet_movement_system,
                )
                    .chain()
                    .in_set(GameplaySet::Player),
                (background_music_system, hud_sync_system, audio_system, hud_system)
                    .chain()
                    .in_set(GameplaySet::Present),
            ))
            .configure_sets(
                (
                    GameplaySet::Input,
                    GameplaySet::Ambient,
                    GameplaySet::Update.run_if(gameplay_running),
                    GameplaySet::Respond,
                    GameplaySet::Player.run_if(gameplay_running),
                    GameplaySet::Present,
                )
                    .chain(),
            );
    }

    /// Queues a player command for the next update.
    ///
    /// Exiting also saves the high score right away.
    pub fn handle_command(&mut self, command: GameCommand) {
        if command == GameCommand::Exit {
            self.save_high_score();
        }
        self.world.send_event(GameEvent::from(command));
    }

    /// Runs one frame.
    ///
    /// Returns true once the game has been asked to exit.
    ///
    /// # Errors
    ///
    /// Returns `GameError` if a level transition fails to load its maze.
    pub fn update(&mut self, dt: f32) -> GameResult<bool> {
        formatter::increment_tick();
        self.world.insert_resource(DeltaTime::from_seconds(dt));

        self.schedule.run(&mut self.world);
        self.report_errors();

        let action = self.world.resource_mut::<Pause>().update(dt);
        if let Some(action) = action {
            self.apply(action)?;
        }

        self.rotate_events();
        Ok(self.world.resource::<GlobalState>().exit)
    }

    fn apply(&mut self, action: PauseAction) -> GameResult<()> {
        debug!(?action, "Pause action");
        match action {
            PauseAction::NextLevel => self.next_level(),
            PauseAction::ResetLevel => {
                self.reset_level();
                Ok(())
            }
            PauseAction::RestartGame => self.restart_game(),
            PauseAction::ShowEntities => {
                self.show_entities();
                Ok(())
            }
        }
    }

    /// Loads the maze for the current level and puts every actor at its start.
    ///
    /// # Errors
    ///
    /// Returns `GameError` if the maze text is missing or malformed.
    pub fn start_level(&mut self) -> GameResult<()> {
        let level = self.world.resource::<Session>().level;
        let maze = Maze::for_level(level);
        let map = Map::load(maze, self.world.resource::<GameConfig>().maze_dir.as_deref())?;
        let pellets = PelletGroup::from_grid(&map.grid);
        info!(level, maze = maze.as_ref(), pellets = pellets.len(), "Level loaded");

        self.world.insert_resource(map);
        self.world.insert_resource(pellets);
        self.despawn_matching::<Or<(With<PlayerControlled>, With<Ghost>, With<Fruit>, With<Bullet>)>>();

        let character = self.world.resource::<Session>().character;
        self.spawn_actors(AbilitySlot(character.ability()));

        self.world.resource_mut::<Session>().pellets_eaten = 0;
        self.world.resource_mut::<GhostBounty>().reset();
        self.world.resource_mut::<BackgroundFlash>().stop();
        self.world.send_event(AudioEvent::StopMusic);
        self.world.send_event(AudioEvent::PlaySound(Sound::GameStart));
        Ok(())
    }

    fn spawn_actors(&mut self, ability: AbilitySlot) {
        let (starts, pacman_position) = {
            let map = self.world.resource::<Map>();
            let node = map.start_positions.pacman;
            let position = Position::between(&map.graph, node, Direction::Left).unwrap_or(Position::Stopped { node });
            (map.start_positions, position)
        };

        self.world.spawn(PlayerBundle {
            player: PlayerControlled,
            lifecycle: PlayerLifecycle::Alive,
            modifiers: PlayerModifiers::default(),
            ability,
            position: pacman_position,
            velocity: Velocity {
                speed: speed::PACMAN,
                direction: Direction::Left,
            },
            buffered_direction: BufferedDirection::None,
            collider: Collider::new(collider::PACMAN),
        });

        for ghost in Ghost::ALL {
            let start = ghost.start_node(&starts);
            self.world.spawn(GhostBundle {
                ghost,
                home: GhostHome {
                    start,
                    spawn: starts.spawn,
                },
                controller: ModeController::new(),
                position: Position::Stopped { node: start },
                velocity: Velocity {
                    speed: speed::GHOST,
                    direction: Direction::Left,
                },
                collider: Collider::new(collider::GHOST),
            });
        }
    }

    /// Advances to the next level after the board is cleared.
    ///
    /// # Errors
    ///
    /// Returns `GameError` if the next maze cannot be loaded.
    pub fn next_level(&mut self) -> GameResult<()> {
        self.world.send_event(AudioEvent::PlaySound(Sound::Intermission));
        self.world.send_event(AudioEvent::StopMusic);
        self.show_entities();
        self.save_high_score();

        let level = {
            let mut session = self.world.resource_mut::<Session>();
            session.level += 1;
            session.level
        };
        info!(level, "Next level");

        self.world.resource_mut::<Pause>().set_pause(true, None, None);
        self.start_level()?;
        self.set_banner(Banner::Ready);
        Ok(())
    }

    /// Puts Pac-Man and the ghosts back at their starts after a death, keeping the eaten pellets.
    pub fn reset_level(&mut self) {
        let ability = self
            .world
            .query_filtered::<&AbilitySlot, With<PlayerControlled>>()
            .single(&self.world)
            .ok()
            .copied()
            .unwrap_or_default();

        self.world.resource_mut::<Pause>().set_pause(true, None, None);
        self.despawn_matching::<Or<(With<PlayerControlled>, With<Ghost>, With<Fruit>, With<Bullet>)>>();
        self.world.resource_mut::<Map>().graph.deny_home_access(Access::GHOSTS);
        self.spawn_actors(ability);
        self.world.resource_mut::<GhostBounty>().reset();
        self.show_entities();

        debug!(lives = self.world.resource::<Session>().lives, "Level reset");
        self.set_banner(Banner::Ready);
    }

    /// Starts over from level zero after a game over.
    ///
    /// # Errors
    ///
    /// Returns `GameError` if the first maze cannot be loaded.
    pub fn restart_game(&mut self) -> GameResult<()> {
        self.world.resource_mut::<Session>().restart();
        self.world.resource_mut::<Pause>().set_pause(true, None, None);
        self.world.send_event(AudioEvent::StopMusic);
        self.start_level()?;
        info!("Game restarted");
        self.set_banner(Banner::Ready);
        Ok(())
    }

    /// Makes every hidden entity visible again.
    pub fn show_entities(&mut self) {
        let hidden: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<Hidden>>()
            .iter(&self.world)
            .collect();
        for entity in hidden {
            self.world.entity_mut(entity).remove::<Hidden>();
        }
    }

    /// Writes the high score if it beats the stored one.
    pub fn save_high_score(&self) {
        let high_score = self.world.resource::<Session>().high_score;
        let store = self.world.resource::<HighScoreStore>();
        if high_score <= store.load() {
            return;
        }
        if let Err(e) = store.save(high_score) {
            warn!(error = %e, "Failed to save high score");
        }
    }

    fn set_banner(&mut self, banner: Banner) {
        *self.world.resource_mut::<Banner>() = banner;
        self.world.send_event(match banner.text() {
            Some(text) => HudEvent::ShowText(text),
            None => HudEvent::HideText,
        });
    }

    fn despawn_matching<F: QueryFilter>(&mut self) {
        let entities: Vec<Entity> = self.world.query_filtered::<Entity, F>().iter(&self.world).collect();
        for entity in entities {
            self.world.despawn(entity);
        }
    }

    fn report_errors(&mut self) {
        for e in self.world.resource_mut::<Events<GameError>>().drain() {
            error!(error = %e, "Game error");
        }
    }

    fn rotate_events(&mut self) {
        fn rotate<E: Event>(world: &mut World) {
            world.resource_mut::<Events<E>>().update();
        }

        rotate::<GameEvent>(&mut self.world);
        rotate::<AudioEvent>(&mut self.world);
        rotate::<HudEvent>(&mut self.world);
        rotate::<PelletsEaten>(&mut self.world);
    }

    /// Snapshot of the board for the renderer.
    pub fn frame(&mut self) -> Frame {
        let pacman = {
            let mut query = self.world.query_filtered::<(
                &Position,
                &Velocity,
                &PlayerLifecycle,
                &PlayerModifiers,
                Has<Hidden>,
            ), With<PlayerControlled>>();
            let map = self.world.resource::<Map>();
            query
                .iter(&self.world)
                .find_map(|(position, velocity, lifecycle, modifiers, hidden)| {
                    Some(PacmanView {
                        position: position.get_pixel_position(&map.graph).ok()?,
                        direction: velocity.direction,
                        visible: !hidden,
                        alive: lifecycle.is_alive(),
                        invisible: modifiers.is_invisible(),
                    })
                })
        };

        let ghosts = {
            let mut query = self
                .world
                .query::<(&Ghost, &ModeController, &Position, &Velocity, Has<Hidden>)>();
            let map = self.world.resource::<Map>();
            query
                .iter(&self.world)
                .filter_map(|(ghost, controller, position, velocity, hidden)| {
                    Some(GhostView {
                        ghost: *ghost,
                        position: position.get_pixel_position(&map.graph).ok()?,
                        direction: velocity.direction,
                        mode: controller.current(),
                        flashing: controller.is_flashing(),
                        visible: !hidden,
                    })
                })
                .collect()
        };

        let fruit = {
            let mut query = self.world.query_filtered::<&Position, With<Fruit>>();
            let map = self.world.resource::<Map>();
            query
                .iter(&self.world)
                .find_map(|position| position.get_pixel_position(&map.graph).ok())
        };

        let bullets = self
            .world
            .query::<&Bullet>()
            .iter(&self.world)
            .map(|bullet| bullet.position)
            .collect();

        Frame {
            maze: self.world.resource::<Map>().layout.maze,
            pacman,
            ghosts,
            pellets: self.world.resource::<PelletGroup>().iter().copied().collect(),
            fruit,
            bullets,
            background_lit: self.world.resource::<BackgroundFlash>().is_lit(),
            paused: self.world.resource::<Pause>().is_paused(),
            banner: self.world.resource::<Banner>().text(),
        }
    }
}
