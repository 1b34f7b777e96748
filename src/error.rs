//! Centralized error types for the game core.
//!
//! This module defines all error types used throughout the crate,
//! providing a consistent error handling approach.

use std::io;

use bevy_ecs::event::Event;

use crate::map::graph::NodeId;

/// Main error type for the game.
///
/// This is the primary error type that should be used in public APIs.
/// It can represent any error that can occur while loading or running a game.
#[derive(thiserror::Error, Debug, Event)]
pub enum GameError {
    #[error("Asset error: {0}")]
    Asset(#[from] AssetError),

    #[error("Map parsing error: {0}")]
    MapParse(#[from] ParseError),

    #[error("Map error: {0}")]
    Map(#[from] MapError),

    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Asset is not valid UTF-8: {0}")]
    Encoding(String),
}

/// Error type for maze text parsing.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("Maze contains no rows")]
    EmptyMaze,
    #[error("Row {row} has {found} columns, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
    #[error("Invalid token {token:?} on row {row}")]
    InvalidToken { row: usize, token: String },
}

/// Errors related to entity operations.
#[derive(thiserror::Error, Debug)]
pub enum EntityError {
    #[error("Node not found in graph: {0}")]
    NodeNotFound(NodeId),

    #[error("Expected exactly one {0} entity")]
    MissingEntity(&'static str),
}

/// Errors related to map operations.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MapError {
    #[error("No node at tile ({col}, {row})")]
    NodeNotFound { col: f32, row: f32 },

    #[error("Invalid map configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
