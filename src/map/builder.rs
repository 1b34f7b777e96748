//! Map construction: turns maze text and layout metadata into a playable graph.

use std::path::Path;

use bevy_ecs::resource::Resource;
use glam::Vec2;
use tracing::debug;

use crate::asset::load_maze;
use crate::error::{GameResult, MapError};
use crate::map::direction::Direction;
use crate::map::graph::{Access, Graph, NodeId};
use crate::map::layout::{Maze, MazeLayout};
use crate::map::parser::TileGrid;

/// Nodes where each entity starts a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartPositions {
    pub pacman: NodeId,
    pub blinky: NodeId,
    pub pinky: NodeId,
    pub inky: NodeId,
    pub clyde: NodeId,
    /// Where captured ghosts return to.
    pub spawn: NodeId,
    pub fruit: NodeId,
}

/// The game map, holding the graph and the parsed tiles it was built from.
#[derive(Resource, Debug, Clone)]
pub struct Map {
    pub graph: Graph,
    pub grid: TileGrid,
    pub layout: &'static MazeLayout,
    /// Entry node of the home sub-maze.
    pub home: NodeId,
    pub start_positions: StartPositions,
}

impl Map {
    /// Loads a maze by name, optionally from a directory on disk.
    pub fn load(maze: Maze, dir: Option<&Path>) -> GameResult<Self> {
        Self::new(&load_maze(maze, dir)?, maze.layout())
    }

    /// Builds a map from maze text and its layout.
    ///
    /// Portals, the home sub-maze and the starting access rules are all applied here:
    /// nobody may walk down into the home, ghosts may not leave its center sideways,
    /// and Inky and Clyde are held at their start nodes until released.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is malformed or any tile named by the layout has no node.
    pub fn new(text: &str, layout: &'static MazeLayout) -> GameResult<Self> {
        let grid = TileGrid::parse(text)?;
        let mut graph = Graph::from_tiles(&grid);
        if graph.is_empty() {
            return Err(MapError::InvalidConfig(format!("{} has no nodes", layout.maze.as_ref())).into());
        }

        layout.set_portal_pairs(&mut graph);
        let home = layout.connect_home_nodes(&mut graph)?;
        graph.deny_home_access(Access::PACMAN | Access::GHOSTS);

        let start_positions = StartPositions {
            pacman: Self::require(&graph, layout.pacman_start)?,
            blinky: Self::require(&graph, layout.add_offset(2.0, 0.0))?,
            pinky: Self::require(&graph, layout.add_offset(2.0, 3.0))?,
            inky: Self::require(&graph, layout.add_offset(0.0, 3.0))?,
            clyde: Self::require(&graph, layout.add_offset(4.0, 3.0))?,
            spawn: Self::require(&graph, layout.add_offset(2.0, 3.0))?,
            fruit: Self::require(&graph, layout.fruit_start)?,
        };

        layout.deny_ghosts_access(&mut graph);
        graph.deny_node_access(start_positions.inky, Direction::Right, Access::INKY);
        graph.deny_node_access(start_positions.clyde, Direction::Left, Access::CLYDE);

        debug!(
            maze = layout.maze.as_ref(),
            nodes = graph.len(),
            rows = grid.rows(),
            cols = grid.cols(),
            "Map built"
        );

        Ok(Self {
            graph,
            grid,
            layout,
            home,
            start_positions,
        })
    }

    fn require(graph: &Graph, tile: Vec2) -> Result<NodeId, MapError> {
        graph
            .node_at_tile(tile)
            .ok_or(MapError::NodeNotFound { col: tile.x, row: tile.y })
    }

    /// Opens Inky's start node to the right.
    pub fn release_inky(&mut self) {
        self.graph
            .allow_node_access(self.start_positions.inky, Direction::Right, Access::INKY);
    }

    /// Opens Clyde's start node to the left.
    pub fn release_clyde(&mut self) {
        self.graph
            .allow_node_access(self.start_positions.clyde, Direction::Left, Access::CLYDE);
    }
}
