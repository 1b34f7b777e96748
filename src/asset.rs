//! Maze asset loading.
//! The shipped mazes are embedded with `rust-embed`; a directory on disk may override them.

use std::fs;
use std::path::Path;

use rust_embed::RustEmbed;
use tracing::debug;

use crate::error::{AssetError, GameResult};
use crate::map::layout::Maze;

#[derive(RustEmbed)]
#[folder = "assets/maze/"]
struct MazeFiles;

/// Returns the text of a maze, reading from `dir` when given and from the embedded copy otherwise.
///
/// # Errors
///
/// Returns `GameError::Io` if the override file cannot be read, or `AssetError` if the
/// embedded file is missing or not UTF-8.
pub fn load_maze(maze: Maze, dir: Option<&Path>) -> GameResult<String> {
    let name = maze.file_name();
    if let Some(dir) = dir {
        let path = dir.join(&name);
        debug!(path = %path.display(), "Loading maze from disk");
        return Ok(fs::read_to_string(path)?);
    }

    let file = MazeFiles::get(&name).ok_or_else(|| AssetError::NotFound(name.clone()))?;
    let text = std::str::from_utf8(&file.data).map_err(|_| AssetError::Encoding(name))?;
    Ok(text.to_owned())
}
