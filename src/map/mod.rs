//! This module defines the maze: text parsing, the node graph, and per-level layouts.

pub mod builder;
pub mod direction;
pub mod graph;
pub mod layout;
pub mod parser;
