use std::time::{Duration, Instant};

use anyhow::Result;
use glam::Vec2;
use powerpac::config::GameConfig;
use powerpac::events::GameCommand;
use powerpac::game::Game;
use powerpac::map::direction::Direction;
use powerpac::render::{Frame, Renderer};
use powerpac::systems::{AudioSink, Hud, TextId};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use thousands::Separable;
use tracing::{debug, info, trace, warn};

/// Logs sounds instead of playing them.
struct TracingAudio;

impl AudioSink for TracingAudio {
    fn play_sound(&mut self, name: &str) {
        debug!(sound = name, "Sound");
    }

    fn play_background_music(&mut self, name: &str, loops: i32) {
        debug!(track = name, loops, "Music started");
    }

    fn stop_music(&mut self) {
        debug!("Music stopped");
    }
}

/// Logs HUD changes.
#[derive(Default)]
struct TracingHud {
    score: u32,
}

impl Hud for TracingHud {
    fn update_score(&mut self, score: u32) {
        self.score = score;
        trace!(score = %score.separate_with_commas(), "Score");
    }

    fn update_level(&mut self, level: u32) {
        info!(level, "Level");
    }

    fn show_text(&mut self, text: TextId) {
        info!(text = text.as_ref(), score = %self.score.separate_with_commas(), "Banner");
    }

    fn hide_text(&mut self) {
        debug!("Banner hidden");
    }

    fn update_high_score(&mut self, score: u32) {
        trace!(high_score = %score.separate_with_commas(), "High score");
    }

    fn update_lives(&mut self, lives: u32) {
        info!(lives, "Lives");
    }

    fn add_popup(&mut self, points: u32, position: Vec2, _duration: f32) {
        debug!(points, x = position.x, y = position.y, "Popup");
    }

    fn add_captured_fruit(&mut self, points: u32) {
        debug!(points, "Fruit captured");
    }
}

/// Summarizes the board in the log about once a second.
struct TracingRenderer {
    frames: u32,
    every: u32,
}

impl Renderer for TracingRenderer {
    fn render(&mut self, frame: &Frame) {
        self.frames = self.frames.wrapping_add(1);
        if self.frames % self.every != 0 {
            return;
        }

        let ghosts: SmallVec<[&str; 4]> = frame.ghosts.iter().map(|ghost| ghost.mode.as_ref()).collect();
        debug!(
            maze = frame.maze.as_ref(),
            pacman = ?frame.pacman.map(|pacman| pacman.position),
            ghosts = ?ghosts,
            pellets = frame.pellets.len(),
            bullets = frame.bullets.len(),
            paused = frame.paused,
            "Frame"
        );
    }
}

/// Scripted input for the headless demo: dismisses READY, wanders and uses the ability now and then.
struct Autopilot {
    rng: SmallRng,
    banner_time: f32,
    turn_time: f32,
    ability_time: f32,
}

impl Autopilot {
    const READY_DELAY: f32 = 1.0;
    const TURN_INTERVAL: f32 = 0.6;
    const ABILITY_INTERVAL: f32 = 6.0;

    fn new(seed: Option<u64>) -> Self {
        Self {
            rng: match seed {
                Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(1)),
                None => SmallRng::from_rng(&mut rand::rng()),
            },
            banner_time: 0.0,
            turn_time: 0.0,
            ability_time: 0.0,
        }
    }

    fn commands(&mut self, frame: &Frame, dt: f32) -> SmallVec<[GameCommand; 2]> {
        let mut commands = SmallVec::new();

        if frame.banner == Some(TextId::Ready) {
            self.banner_time += dt;
            if self.banner_time >= Self::READY_DELAY {
                self.banner_time = 0.0;
                commands.push(GameCommand::TogglePause);
            }
            return commands;
        }
        self.banner_time = 0.0;
        if frame.paused {
            return commands;
        }

        self.turn_time += dt;
        if self.turn_time >= Self::TURN_INTERVAL {
            self.turn_time = 0.0;
            let direction = Direction::DIRECTIONS[self.rng.random_range(0..Direction::DIRECTIONS.len())];
            commands.push(GameCommand::MovePlayer(direction));
        }

        self.ability_time += dt;
        if self.ability_time >= Self::ABILITY_INTERVAL {
            self.ability_time = 0.0;
            commands.push(GameCommand::UseAbility);
        }
        commands
    }
}

/// Headless runner: drives the game at a fixed frame rate for a fixed time.
pub struct App {
    game: Game,
    renderer: TracingRenderer,
    autopilot: Autopilot,
    loop_time: Duration,
    run_time: Duration,
}

impl App {
    pub fn new(config: GameConfig) -> Result<Self> {
        let frame_rate = config.frame_rate;
        let run_time = Duration::from_secs(config.run_seconds.into());
        let autopilot = Autopilot::new(config.seed);
        let game = Game::new(config, Box::new(TracingAudio), Box::new(TracingHud::default()))?;

        Ok(Self {
            game,
            renderer: TracingRenderer {
                frames: 0,
                every: frame_rate,
            },
            autopilot,
            loop_time: Duration::from_secs(1) / frame_rate,
            run_time,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        info!(
            frame_ms = format!("{:.3}", self.loop_time.as_secs_f32() * 1000.0),
            seconds = self.run_time.as_secs(),
            "Starting game loop"
        );

        let started = Instant::now();
        let mut last_tick = Instant::now();
        loop {
            let start = Instant::now();
            let dt = last_tick.elapsed().as_secs_f32();
            last_tick = start;

            let frame = self.game.frame();
            for command in self.autopilot.commands(&frame, dt) {
                self.game.handle_command(command);
            }
            if started.elapsed() >= self.run_time {
                info!("Demo time is up");
                self.game.handle_command(GameCommand::Exit);
            }

            if self.game.update(dt)? {
                break;
            }
            self.renderer.render(&self.game.frame());

            if start.elapsed() < self.loop_time {
                let time = self.loop_time.saturating_sub(start.elapsed());
                if time != Duration::ZERO {
                    spin_sleep::sleep(time);
                }
            } else {
                warn!("Game loop behind schedule by: {:?}", start.elapsed() - self.loop_time);
            }
        }

        self.game.save_high_score();
        Ok(())
    }
}
