//! Runtime configuration, read from `PACMAN_*` environment variables.

use std::path::PathBuf;

use bevy_ecs::resource::Resource;
use figment::{providers::Env, Figment};
use serde::Deserialize;
use tracing::warn;

use crate::constants::{EXTRA_LIFE_SCORE, STARTING_LIVES};
use crate::error::GameResult;
use crate::systems::ability::Character;

/// Main game configuration
#[derive(Resource, Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawConfig")]
pub struct GameConfig {
    /// Which character the player controls, and so which ability it carries
    pub character: Character,
    pub starting_lives: u32,
    /// Score at which the single extra life is granted
    pub extra_life_score: u32,
    /// Plain text file holding the high score
    pub high_score_path: PathBuf,
    /// Directory of maze files overriding the embedded ones
    pub maze_dir: Option<PathBuf>,
    /// Frames per second driven by the binary
    pub frame_rate: u32,
    /// How long the headless demo runs before exiting
    pub run_seconds: u32,
    /// Seed for ghost and teleport randomness. OS-random when unset.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

/// Configuration as read from the environment, before validation
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    character: Character,
    #[serde(default = "default_starting_lives")]
    starting_lives: u32,
    #[serde(default = "default_extra_life_score")]
    extra_life_score: u32,
    #[serde(default = "default_high_score_path")]
    high_score_path: PathBuf,
    #[serde(default)]
    maze_dir: Option<PathBuf>,
    #[serde(default = "default_frame_rate")]
    frame_rate: u32,
    #[serde(default = "default_run_seconds")]
    run_seconds: u32,
    #[serde(default)]
    seed: Option<u64>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            character: Character::default(),
            starting_lives: default_starting_lives(),
            extra_life_score: default_extra_life_score(),
            high_score_path: default_high_score_path(),
            maze_dir: None,
            frame_rate: default_frame_rate(),
            run_seconds: default_run_seconds(),
            seed: None,
        }
    }
}

impl From<RawConfig> for GameConfig {
    fn from(raw: RawConfig) -> Self {
        let starting_lives = if raw.starting_lives == 0 {
            warn!("PACMAN_STARTING_LIVES must be at least 1, using {}", STARTING_LIVES);
            STARTING_LIVES
        } else {
            raw.starting_lives
        };

        let frame_rate = if raw.frame_rate == 0 {
            warn!("PACMAN_FRAME_RATE must be at least 1, using 60");
            default_frame_rate()
        } else {
            raw.frame_rate
        };

        GameConfig {
            character: raw.character,
            starting_lives,
            extra_life_score: raw.extra_life_score,
            high_score_path: raw.high_score_path,
            maze_dir: raw.maze_dir,
            frame_rate,
            run_seconds: raw.run_seconds,
            seed: raw.seed,
        }
    }
}

fn default_starting_lives() -> u32 {
    STARTING_LIVES
}

fn default_extra_life_score() -> u32 {
    EXTRA_LIFE_SCORE
}

fn default_high_score_path() -> PathBuf {
    PathBuf::from("highscore.txt")
}

fn default_frame_rate() -> u32 {
    60
}

fn default_run_seconds() -> u32 {
    120
}

/// The configuration sources, in merge order.
pub fn figment() -> Figment {
    Figment::new().merge(Env::prefixed("PACMAN_"))
}

/// Reads the configuration from the environment.
///
/// # Errors
///
/// Returns `GameError::Config` if a variable is set to a value of the wrong type.
pub fn load_config() -> GameResult<GameConfig> {
    Ok(figment().extract()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_without_environment() {
        Jail::expect_with(|_jail| {
            let config: GameConfig = figment().extract()?;
            assert_eq!(config, GameConfig::default());
            assert_eq!(config.starting_lives, 5);
            assert_eq!(config.extra_life_score, 10_000);
            assert_eq!(config.high_score_path, PathBuf::from("highscore.txt"));
            assert_eq!(config.character, Character::Classic);
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("PACMAN_CHARACTER", "gunner");
            jail.set_env("PACMAN_STARTING_LIVES", "3");
            jail.set_env("PACMAN_SEED", "42");
            jail.set_env("PACMAN_MAZE_DIR", "mazes");
            let config: GameConfig = figment().extract()?;
            assert_eq!(config.character, Character::Gunner);
            assert_eq!(config.starting_lives, 3);
            assert_eq!(config.seed, Some(42));
            assert_eq!(config.maze_dir, Some(PathBuf::from("mazes")));
            Ok(())
        });
    }

    #[test]
    fn test_zero_lives_falls_back_to_default() {
        let config = GameConfig::from(RawConfig {
            starting_lives: 0,
            ..RawConfig::default()
        });
        assert_eq!(config.starting_lives, STARTING_LIVES);
    }

    #[test]
    fn test_bad_value_is_an_error() {
        Jail::expect_with(|jail| {
            jail.set_env("PACMAN_FRAME_RATE", "fast");
            assert!(figment().extract::<GameConfig>().is_err());
            Ok(())
        });
    }
}
