use bevy_ecs::{
    entity::Entity,
    event::{EventReader, EventWriter},
    query::With,
    resource::Resource,
    system::{Commands, Query, Res, ResMut},
};
use tracing::{debug, info};

use crate::{
    config::GameConfig,
    constants::timing,
    events::{GameCommand, GameEvent},
    systems::{
        ability::Character,
        audio::{AudioEvent, Sound},
        components::{DeltaTime, Hidden, PlayerControlled},
        hud::{HudEvent, TextId},
        pause::Pause,
        player::PlayerLifecycle,
    },
};

/// Score, lives and level for the game in progress.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct Session {
    pub score: u32,
    pub high_score: u32,
    pub lives: u32,
    /// Zero-based level number.
    pub level: u32,
    pub extra_life_awarded: bool,
    /// Pellets eaten on the current level, including those absorbed by a magnet.
    pub pellets_eaten: u32,
    /// Points of each fruit eaten this game.
    pub fruits_captured: Vec<u32>,
    pub character: Character,
    starting_lives: u32,
    extra_life_score: u32,
}

impl Session {
    pub fn new(config: &GameConfig, high_score: u32) -> Self {
        Self {
            score: 0,
            high_score,
            lives: config.starting_lives,
            level: 0,
            extra_life_awarded: false,
            pellets_eaten: 0,
            fruits_captured: Vec::new(),
            character: config.character,
            starting_lives: config.starting_lives,
            extra_life_score: config.extra_life_score,
        }
    }

    /// Adds points, raising the high score along with them.
    /// Returns true when this crossed the extra-life score, which also grants the life.
    pub fn add_score(&mut self, points: u32) -> bool {
        self.score = self.score.saturating_add(points);
        self.high_score = self.high_score.max(self.score);
        if !self.extra_life_awarded && self.score >= self.extra_life_score {
            self.extra_life_awarded = true;
            self.lives += 1;
            info!(score = self.score, lives = self.lives, "Extra life awarded");
            return true;
        }
        false
    }

    /// Takes away a life. Returns true when none are left.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        self.lives == 0
    }

    /// Back to a fresh game, keeping the high score.
    pub fn restart(&mut self) {
        self.score = 0;
        self.lives = self.starting_lives;
        self.level = 0;
        self.extra_life_awarded = false;
        self.pellets_eaten = 0;
        self.fruits_captured.clear();
    }
}

/// Scores points and plays the extra-life jingle when it is earned.
pub fn award_points(session: &mut Session, points: u32, audio: &mut EventWriter<AudioEvent>) {
    if session.add_score(points) {
        audio.write(AudioEvent::PlaySound(Sound::Extend));
    }
}

/// The banner text currently on screen.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    #[default]
    None,
    Ready,
    Paused,
    GameOver,
}

impl Banner {
    pub fn text(self) -> Option<TextId> {
        match self {
            Banner::None => None,
            Banner::Ready => Some(TextId::Ready),
            Banner::Paused => Some(TextId::Pause),
            Banner::GameOver => Some(TextId::GameOver),
        }
    }

    /// Replaces the banner and tells the HUD.
    pub fn set(&mut self, banner: Banner, hud: &mut EventWriter<HudEvent>) {
        *self = banner;
        hud.write(match banner.text() {
            Some(text) => HudEvent::ShowText(text),
            None => HudEvent::HideText,
        });
    }
}

/// The maze background flashing after a level is cleared.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq)]
pub struct BackgroundFlash {
    active: bool,
    lit: bool,
    timer: f32,
}

impl BackgroundFlash {
    pub fn start(&mut self) {
        *self = Self {
            active: true,
            lit: false,
            timer: 0.0,
        };
    }

    pub fn stop(&mut self) {
        *self = Self::default();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the flashing background is showing its alternate color.
    pub fn is_lit(&self) -> bool {
        self.active && self.lit
    }

    pub fn update(&mut self, seconds: f32) {
        if !self.active {
            return;
        }
        self.timer += seconds;
        if self.timer >= timing::BACKGROUND_FLASH {
            self.timer -= timing::BACKGROUND_FLASH;
            self.lit = !self.lit;
        }
    }
}

pub fn background_flash_system(delta_time: Res<DeltaTime>, mut flash: ResMut<BackgroundFlash>) {
    flash.update(delta_time.seconds);
}

/// Handles the pause key.
///
/// While READY is shown the key starts play. Otherwise it toggles an open-ended pause,
/// but only while the player is alive and no timed pause is counting down.
#[allow(clippy::too_many_arguments)]
pub fn handle_pause_command(
    mut commands: Commands,
    mut events: EventReader<GameEvent>,
    mut pause: ResMut<Pause>,
    mut banner: ResMut<Banner>,
    players: Query<&PlayerLifecycle, With<PlayerControlled>>,
    hidden: Query<Entity, With<Hidden>>,
    mut hud: EventWriter<HudEvent>,
) {
    for event in events.read() {
        let GameEvent::Command(GameCommand::TogglePause) = event else {
            continue;
        };

        if pause.is_paused() && *banner == Banner::Ready {
            pause.set_pause(false, None, None);
            banner.set(Banner::None, &mut hud);
            debug!("Play started");
            continue;
        }

        let alive = players.iter().any(|lifecycle| lifecycle.is_alive());
        if !alive || pause.is_timed() {
            continue;
        }

        pause.flip();
        if pause.is_paused() {
            banner.set(Banner::Paused, &mut hud);
        } else {
            banner.set(Banner::None, &mut hud);
            for entity in hidden.iter() {
                commands.entity(entity).remove::<Hidden>();
            }
        }
        debug!(paused = pause.is_paused(), "Pause toggled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session() -> Session {
        Session::new(&GameConfig::default(), 0)
    }

    #[test]
    fn test_extra_life_awarded_once() {
        let mut session = session();
        assert!(!session.add_score(9_990));
        assert!(session.add_score(10));
        assert_eq!(session.lives, 6);
        assert!(!session.add_score(10_000));
        assert_eq!(session.lives, 6);
    }

    #[test]
    fn test_high_score_follows_score() {
        let mut session = Session::new(&GameConfig::default(), 500);
        session.add_score(300);
        assert_eq!(session.high_score, 500);
        session.add_score(300);
        assert_eq!(session.high_score, 600);
    }

    #[test]
    fn test_restart_keeps_high_score() {
        let mut session = session();
        session.add_score(12_000);
        session.level = 3;
        session.lose_life();
        session.restart();
        assert_eq!(session.score, 0);
        assert_eq!(session.level, 0);
        assert_eq!(session.lives, 5);
        assert!(!session.extra_life_awarded);
        assert_eq!(session.high_score, 12_000);
    }

    #[test]
    fn test_background_flash_toggles() {
        let mut flash = BackgroundFlash::default();
        flash.update(1.0);
        assert!(!flash.is_lit());
        flash.start();
        flash.update(0.2);
        assert!(flash.is_lit());
        flash.update(0.2);
        assert!(!flash.is_lit());
        flash.stop();
        assert!(!flash.is_active());
    }
}
