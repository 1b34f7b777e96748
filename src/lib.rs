//! Maze-chase arcade core with power-up pellets and gun/shield characters.

pub mod asset;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod formatter;
pub mod game;
pub mod highscore;
pub mod logging;
pub mod map;
pub mod render;
pub mod systems;
