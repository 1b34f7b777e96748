//! The high score, kept as a bare decimal integer in a plain text file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bevy_ecs::resource::Resource;
use tracing::{debug, warn};

#[derive(Resource, Debug, Clone, PartialEq, Eq)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored high score. A missing or unreadable file counts as zero.
    pub fn load(&self) -> u32 {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No high score file yet");
                return 0;
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read high score");
                return 0;
            }
        };

        match parse_high_score(&text) {
            Some(score) => score,
            None => {
                warn!(path = %self.path.display(), contents = text.trim(), "Invalid high score file");
                0
            }
        }
    }

    pub fn save(&self, score: u32) -> io::Result<()> {
        fs::write(&self.path, score.to_string())?;
        debug!(path = %self.path.display(), score, "High score saved");
        Ok(())
    }
}

/// Parses the file contents, ignoring surrounding whitespace.
pub fn parse_high_score(text: &str) -> Option<u32> {
    text.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scratch_file(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("powerpac-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_parse_high_score() {
        assert_eq!(parse_high_score("12340"), Some(12_340));
        assert_eq!(parse_high_score(" 700\n"), Some(700));
        assert_eq!(parse_high_score(""), None);
        assert_eq!(parse_high_score("-5"), None);
        assert_eq!(parse_high_score("lots"), None);
    }

    #[test]
    fn test_missing_file_is_zero() {
        let store = HighScoreStore::new(scratch_file("missing"));
        assert_eq!(store.load(), 0);
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_file("roundtrip");
        let store = HighScoreStore::new(&path);
        store.save(4_560).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "4560");
        assert_eq!(store.load(), 4_560);
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_garbage_file_is_zero() {
        let path = scratch_file("garbage");
        fs::write(&path, "not a number").unwrap();
        assert_eq!(HighScoreStore::new(&path).load(), 0);
        fs::remove_file(path).unwrap();
    }
}
