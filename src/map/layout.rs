//! Static per-maze layout data: portals, home placement, start tiles and ghost restrictions.

use glam::Vec2;
use strum_macros::AsRefStr;

use crate::error::{GameResult, MapError};
use crate::map::direction::Direction;
use crate::map::graph::{Access, Graph, NodeId};

/// The mazes shipped with the game, cycled by level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Maze {
    Maze1,
    Maze2,
}

impl Maze {
    pub const ALL: [Maze; 2] = [Maze::Maze1, Maze::Maze2];

    /// The maze played on the given (zero-based) level.
    pub fn for_level(level: u32) -> Maze {
        Self::ALL[level as usize % Self::ALL.len()]
    }

    /// Name of the maze text file.
    pub fn file_name(self) -> String {
        format!("{}.txt", self.as_ref())
    }

    pub fn layout(self) -> &'static MazeLayout {
        match self {
            Maze::Maze1 => &MAZE1,
            Maze::Maze2 => &MAZE2,
        }
    }
}

/// Layout metadata for one maze. All coordinates are in tiles.
#[derive(Debug, Clone, PartialEq)]
pub struct MazeLayout {
    pub maze: Maze,
    /// Pairs of tiles joined by a PORTAL link.
    pub portal_pairs: &'static [(Vec2, Vec2)],
    /// Top-left corner of the home template.
    pub home_offset: Vec2,
    /// Node the home entry joins on its left.
    pub home_connect_left: Vec2,
    /// Node the home entry joins on its right.
    pub home_connect_right: Vec2,
    pub pacman_start: Vec2,
    pub fruit_start: Vec2,
    /// Nodes ghosts may not leave upward.
    pub ghost_deny_up: &'static [Vec2],
}

pub const MAZE1: MazeLayout = MazeLayout {
    maze: Maze::Maze1,
    portal_pairs: &[(Vec2::new(0.0, 17.0), Vec2::new(27.0, 17.0))],
    home_offset: Vec2::new(11.5, 14.0),
    home_connect_left: Vec2::new(12.0, 14.0),
    home_connect_right: Vec2::new(15.0, 14.0),
    pacman_start: Vec2::new(15.0, 26.0),
    fruit_start: Vec2::new(9.0, 20.0),
    ghost_deny_up: &[
        Vec2::new(12.0, 14.0),
        Vec2::new(15.0, 14.0),
        Vec2::new(12.0, 26.0),
        Vec2::new(15.0, 26.0),
    ],
};

pub const MAZE2: MazeLayout = MazeLayout {
    maze: Maze::Maze2,
    portal_pairs: &[
        (Vec2::new(0.0, 4.0), Vec2::new(27.0, 4.0)),
        (Vec2::new(0.0, 26.0), Vec2::new(27.0, 26.0)),
    ],
    home_offset: Vec2::new(11.5, 14.0),
    home_connect_left: Vec2::new(9.0, 14.0),
    home_connect_right: Vec2::new(18.0, 14.0),
    pacman_start: Vec2::new(16.0, 26.0),
    fruit_start: Vec2::new(11.0, 20.0),
    ghost_deny_up: &[
        Vec2::new(9.0, 14.0),
        Vec2::new(18.0, 14.0),
        Vec2::new(11.0, 23.0),
        Vec2::new(16.0, 23.0),
    ],
};

impl MazeLayout {
    /// Returns a tile relative to the home offset.
    pub fn add_offset(&self, x: f32, y: f32) -> Vec2 {
        self.home_offset + Vec2::new(x, y)
    }

    pub fn set_portal_pairs(&self, graph: &mut Graph) {
        for (a, b) in self.portal_pairs {
            if !graph.set_portal_pair(*a, *b) {
                tracing::warn!(maze = self.maze.as_ref(), ?a, ?b, "Portal pair has a missing end");
            }
        }
    }

    /// Builds the home sub-maze and wires it to the left and right connector nodes.
    ///
    /// # Errors
    ///
    /// Returns `MapError::NodeNotFound` if either connector tile has no node.
    pub fn connect_home_nodes(&self, graph: &mut Graph) -> GameResult<NodeId> {
        let home = graph.create_home_nodes(self.home_offset)?;
        for (tile, direction) in [
            (self.home_connect_left, Direction::Left),
            (self.home_connect_right, Direction::Right),
        ] {
            if !graph.connect_home_nodes(home, tile, direction) {
                return Err(MapError::NodeNotFound { col: tile.x, row: tile.y }.into());
            }
        }
        Ok(home)
    }

    /// Keeps ghosts from wandering sideways out of the home center and up through the no-climb nodes.
    pub fn deny_ghosts_access(&self, graph: &mut Graph) {
        let center = self.add_offset(2.0, 3.0);
        graph.deny_access(center, Direction::Left, Access::GHOSTS);
        graph.deny_access(center, Direction::Right, Access::GHOSTS);
        graph.deny_access_list(self.ghost_deny_up, Direction::Up, Access::GHOSTS);
    }
}
