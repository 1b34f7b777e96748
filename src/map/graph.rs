use std::collections::HashMap;

use bitflags::bitflags;
use glam::{IVec2, Vec2};
use tracing::trace;

use crate::constants::{TILE_HEIGHT, TILE_WIDTH};
use crate::error::{GameResult, MapError};
use crate::map::direction::Direction;
use crate::map::parser::TileGrid;

/// An identifier for a node in the graph.
pub type NodeId = usize;

bitflags! {
    /// Entity classes that may leave a node in a given direction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Access: u8 {
        const PACMAN = 1 << 0;
        const BLINKY = 1 << 1;
        const PINKY = 1 << 2;
        const INKY = 1 << 3;
        const CLYDE = 1 << 4;
        const FRUIT = 1 << 5;
        const GHOSTS = Self::BLINKY.bits() | Self::PINKY.bits() | Self::INKY.bits() | Self::CLYDE.bits();
    }
}

/// The ghost house, laid out relative to the home offset. The home node sits at column 2, row 0.
const HOME_TEMPLATE: &str = "\
X X + X X
X X . X X
+ X . X +
+ . + . +
+ X X X +";

/// A vertex of the maze graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The pixel position of this node.
    pub position: Vec2,
    neighbors: [Option<NodeId>; 4],
    /// A non-adjacent link followed on arrival, used for screen-wrap tunnels.
    pub portal: Option<NodeId>,
    access: [Access; 4],
}

impl Node {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            neighbors: [None; 4],
            portal: None,
            access: [Access::all(); 4],
        }
    }

    /// Returns the neighbor reached by leaving in `direction`, if any.
    pub fn neighbor(&self, direction: Direction) -> Option<NodeId> {
        self.neighbors[direction.as_usize()]
    }

    /// Returns the classes allowed to leave this node in `direction`.
    pub fn access(&self, direction: Direction) -> Access {
        self.access[direction.as_usize()]
    }

    pub fn permits(&self, direction: Direction, class: Access) -> bool {
        self.access[direction.as_usize()].contains(class)
    }
}

/// The navigable maze: a sparse set of nodes keyed by pixel coordinate.
///
/// Links are directional and need not be symmetric; construction makes
/// them symmetric, later home wiring and access rules may not.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    lookup: HashMap<IVec2, NodeId>,
    home: Option<NodeId>,
    home_nodes: Vec<NodeId>,
}

impl Graph {
    /// Creates a new, empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from a parsed maze with no offset.
    pub fn from_tiles(grid: &TileGrid) -> Self {
        let mut graph = Self::new();
        graph.add_tiles(grid, Vec2::ZERO);
        graph
    }

    /// Converts a tile coordinate into the integer pixel key used for lookups.
    fn pixel_key(pixel: Vec2) -> IVec2 {
        pixel.round().as_ivec2()
    }

    /// Converts a (possibly fractional) tile coordinate into pixel space.
    pub fn tile_to_pixel(tile: Vec2) -> Vec2 {
        Vec2::new(tile.x * TILE_WIDTH, tile.y * TILE_HEIGHT)
    }

    /// Adds every node symbol of `grid` at `offset` (in tiles), then links runs
    /// row-major (RIGHT/LEFT) and column-major (DOWN/UP).
    ///
    /// Returns the ids of the nodes created, in row-major order.
    pub fn add_tiles(&mut self, grid: &TileGrid, offset: Vec2) -> Vec<NodeId> {
        let id_at = |graph: &Graph, col: usize, row: usize| {
            graph.node_at_tile(offset + Vec2::new(col as f32, row as f32))
        };

        let mut created = Vec::new();
        for (col, row, tile) in grid.iter() {
            if tile.is_node() {
                created.push(self.add_node(Self::tile_to_pixel(offset + Vec2::new(col as f32, row as f32))));
            }
        }

        for row in 0..grid.rows() {
            let mut last = None;
            for col in 0..grid.cols() {
                match grid.get(col, row) {
                    Some(tile) if tile.is_node() => {
                        let current = id_at(self, col, row);
                        if let (Some(previous), Some(current)) = (last, current) {
                            self.connect(previous, current, Direction::Right);
                        }
                        last = current;
                    }
                    Some(tile) if tile.is_path() => {}
                    _ => last = None,
                }
            }
        }

        for col in 0..grid.cols() {
            let mut last = None;
            for row in 0..grid.rows() {
                match grid.get(col, row) {
                    Some(tile) if tile.is_node() => {
                        let current = id_at(self, col, row);
                        if let (Some(previous), Some(current)) = (last, current) {
                            self.connect(previous, current, Direction::Down);
                        }
                        last = current;
                    }
                    Some(tile) if tile.is_path() => {}
                    _ => last = None,
                }
            }
        }

        trace!(created = created.len(), total = self.nodes.len(), "Added maze tiles to graph");
        created
    }

    /// Adds a node at a pixel position. A node already at that position is reused.
    pub fn add_node(&mut self, position: Vec2) -> NodeId {
        let key = Self::pixel_key(position);
        if let Some(&id) = self.lookup.get(&key) {
            return id;
        }
        let id = self.nodes.len();
        self.nodes.push(Node::new(position));
        self.lookup.insert(key, id);
        id
    }

    /// Links `from` to `to` in `direction`, and `to` back to `from` in the opposite direction.
    pub fn connect(&mut self, from: NodeId, to: NodeId, direction: Direction) {
        self.link(from, direction, to);
        self.link(to, direction.opposite(), from);
    }

    /// Sets a single directional link. Missing nodes are ignored.
    pub fn link(&mut self, from: NodeId, direction: Direction, to: NodeId) {
        if to >= self.nodes.len() {
            return;
        }
        if let Some(node) = self.nodes.get_mut(from) {
            node.neighbors[direction.as_usize()] = Some(to);
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Iterates over all nodes with their ids.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate()
    }

    pub fn position(&self, id: NodeId) -> Option<Vec2> {
        self.nodes.get(id).map(|node| node.position)
    }

    pub fn neighbor(&self, id: NodeId, direction: Direction) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.neighbor(direction))
    }

    pub fn portal(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|node| node.portal)
    }

    /// Returns the straight-line distance between two nodes.
    pub fn distance(&self, a: NodeId, b: NodeId) -> Option<f32> {
        Some(self.position(a)?.distance(self.position(b)?))
    }

    /// Whether an entity of `class` standing at `id` may leave in `direction`.
    pub fn can_traverse(&self, id: NodeId, direction: Direction, class: Access) -> bool {
        self.nodes
            .get(id)
            .is_some_and(|node| node.neighbor(direction).is_some() && node.permits(direction, class))
    }

    /// Looks up a node by pixel coordinate.
    pub fn node_at_pixel(&self, pixel: Vec2) -> Option<NodeId> {
        self.lookup.get(&Self::pixel_key(pixel)).copied()
    }

    /// Looks up a node by tile coordinate. Half-tile coordinates are valid (the home sits between columns).
    pub fn node_at_tile(&self, tile: Vec2) -> Option<NodeId> {
        self.node_at_pixel(Self::tile_to_pixel(tile))
    }

    /// The first node created, used when no better start node is known.
    pub fn first_node(&self) -> Option<NodeId> {
        (!self.nodes.is_empty()).then_some(0)
    }

    /// Links two tile positions through their PORTAL slots.
    ///
    /// Returns false without changing anything if either tile has no node.
    pub fn set_portal_pair(&mut self, a: Vec2, b: Vec2) -> bool {
        let (Some(first), Some(second)) = (self.node_at_tile(a), self.node_at_tile(b)) else {
            return false;
        };
        self.nodes[first].portal = Some(second);
        self.nodes[second].portal = Some(first);
        true
    }

    /// Builds the home sub-maze at `offset` (in tiles) and returns its entry node.
    pub fn create_home_nodes(&mut self, offset: Vec2) -> GameResult<NodeId> {
        let grid = TileGrid::parse(HOME_TEMPLATE)?;
        self.home_nodes = self.add_tiles(&grid, offset);
        let home = self
            .node_at_tile(offset + Vec2::new(2.0, 0.0))
            .ok_or(MapError::NodeNotFound {
                col: offset.x + 2.0,
                row: offset.y,
            })?;
        self.home = Some(home);
        Ok(home)
    }

    /// Wires the home entry to the node at `other` in `direction`, and that node back to the home.
    pub fn connect_home_nodes(&mut self, home: NodeId, other: Vec2, direction: Direction) -> bool {
        match self.node_at_tile(other) {
            Some(other) => {
                self.connect(home, other, direction);
                true
            }
            None => false,
        }
    }

    pub fn home(&self) -> Option<NodeId> {
        self.home
    }

    /// Nodes belonging to the home sub-maze.
    pub fn home_nodes(&self) -> &[NodeId] {
        &self.home_nodes
    }

    pub fn is_home_node(&self, id: NodeId) -> bool {
        self.home_nodes.contains(&id)
    }

    fn update_access(&mut self, id: NodeId, direction: Direction, class: Access, allow: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.access[direction.as_usize()].set(class, allow);
        }
    }

    /// Forbids `class` from leaving the node at `tile` in `direction`. No-op if there is no node.
    pub fn deny_access(&mut self, tile: Vec2, direction: Direction, class: Access) {
        if let Some(id) = self.node_at_tile(tile) {
            self.update_access(id, direction, class, false);
        }
    }

    /// Permits `class` to leave the node at `tile` in `direction`. No-op if there is no node.
    pub fn allow_access(&mut self, tile: Vec2, direction: Direction, class: Access) {
        if let Some(id) = self.node_at_tile(tile) {
            self.update_access(id, direction, class, true);
        }
    }

    pub fn deny_access_list(&mut self, tiles: &[Vec2], direction: Direction, class: Access) {
        for tile in tiles {
            self.deny_access(*tile, direction, class);
        }
    }

    pub fn allow_access_list(&mut self, tiles: &[Vec2], direction: Direction, class: Access) {
        for tile in tiles {
            self.allow_access(*tile, direction, class);
        }
    }

    /// Same as [`Graph::deny_access`], addressed by node id.
    pub fn deny_node_access(&mut self, id: NodeId, direction: Direction, class: Access) {
        self.update_access(id, direction, class, false);
    }

    /// Same as [`Graph::allow_access`], addressed by node id.
    pub fn allow_node_access(&mut self, id: NodeId, direction: Direction, class: Access) {
        self.update_access(id, direction, class, true);
    }

    /// Closes the way down into the home for `class`.
    pub fn deny_home_access(&mut self, class: Access) {
        if let Some(home) = self.home {
            self.update_access(home, Direction::Down, class, false);
        }
    }

    /// Opens the way down into the home for `class`.
    pub fn allow_home_access(&mut self, class: Access) {
        if let Some(home) = self.home {
            self.update_access(home, Direction::Down, class, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(text: &str) -> Graph {
        Graph::from_tiles(&TileGrid::parse(text).unwrap())
    }

    #[test]
    fn test_runs_are_broken_by_walls() {
        let graph = graph("+.X.+");
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.neighbor(0, Direction::Right), None);
        assert_eq!(graph.neighbor(1, Direction::Left), None);
    }

    #[test]
    fn test_paths_without_nodes_make_no_edges() {
        let graph = graph("..+..");
        assert_eq!(graph.len(), 1);
        for direction in Direction::DIRECTIONS {
            assert_eq!(graph.neighbor(0, direction), None);
        }
    }

    #[test]
    fn test_marker_tiles_are_nodes() {
        let graph = graph("+.T.P.M\n|X|X|X|\ns.i.n.+");
        assert_eq!(graph.len(), 8);
        let teleport = graph.node_at_tile(Vec2::new(2.0, 0.0)).unwrap();
        let power = graph.node_at_tile(Vec2::new(4.0, 0.0)).unwrap();
        assert_eq!(graph.neighbor(teleport, Direction::Right), Some(power));
        assert_eq!(graph.neighbor(teleport, Direction::Down), graph.node_at_tile(Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn test_lookup_by_pixel_and_tile() {
        let graph = graph("+.+");
        assert_eq!(graph.node_at_pixel(Vec2::new(2.0 * TILE_WIDTH, 0.0)), Some(1));
        assert_eq!(graph.node_at_tile(Vec2::new(2.0, 0.0)), Some(1));
        assert_eq!(graph.node_at_tile(Vec2::new(1.0, 0.0)), None);
        assert_eq!(graph.first_node(), Some(0));
        assert_eq!(Graph::new().first_node(), None);
    }

    #[test]
    fn test_access_is_per_direction_and_one_way() {
        let mut graph = graph("+.+");
        graph.deny_access(Vec2::ZERO, Direction::Right, Access::INKY);
        assert!(!graph.can_traverse(0, Direction::Right, Access::INKY));
        assert!(graph.can_traverse(0, Direction::Right, Access::BLINKY));
        assert!(graph.can_traverse(1, Direction::Left, Access::INKY));

        graph.allow_access(Vec2::ZERO, Direction::Right, Access::INKY);
        assert!(graph.can_traverse(0, Direction::Right, Access::INKY));
    }

    #[test]
    fn test_access_on_missing_node_is_a_no_op() {
        let mut graph = graph("+.+");
        let before = graph.clone();
        graph.deny_access(Vec2::new(9.0, 9.0), Direction::Up, Access::all());
        graph.allow_access_list(&[Vec2::new(5.0, 5.0)], Direction::Up, Access::all());
        assert_eq!(graph.nodes, before.nodes);
    }

    #[test]
    fn test_portal_requires_both_ends() {
        let mut graph = graph("+.+");
        assert!(!graph.set_portal_pair(Vec2::ZERO, Vec2::new(7.0, 0.0)));
        assert_eq!(graph.portal(0), None);

        assert!(graph.set_portal_pair(Vec2::ZERO, Vec2::new(2.0, 0.0)));
        assert_eq!(graph.portal(0), Some(1));
        assert_eq!(graph.portal(1), Some(0));
    }

    #[test]
    fn test_home_template() {
        let mut graph = graph("+.....+");
        let home = graph.create_home_nodes(Vec2::new(1.5, 2.0)).unwrap();
        assert_eq!(graph.home(), Some(home));
        assert_eq!(graph.home_nodes().len(), 8);
        assert_eq!(graph.position(home), Some(Vec2::new(3.5 * TILE_WIDTH, 2.0 * TILE_HEIGHT)));

        let center = graph.node_at_tile(Vec2::new(3.5, 5.0)).unwrap();
        assert_eq!(graph.neighbor(home, Direction::Down), Some(center));
        assert_eq!(graph.neighbor(center, Direction::Up), Some(home));
        assert!(graph.is_home_node(center));
        assert!(!graph.is_home_node(0));
    }

    #[test]
    fn test_home_connections_and_access() {
        let mut graph = graph("+......+");
        let home = graph.create_home_nodes(Vec2::new(1.5, 0.0)).unwrap();
        let left = graph.node_at_tile(Vec2::ZERO).unwrap();
        assert!(graph.connect_home_nodes(home, Vec2::ZERO, Direction::Left));
        assert!(!graph.connect_home_nodes(home, Vec2::new(30.0, 0.0), Direction::Right));
        assert_eq!(graph.neighbor(home, Direction::Left), Some(left));
        assert_eq!(graph.neighbor(left, Direction::Right), Some(home));

        graph.deny_home_access(Access::PACMAN | Access::GHOSTS);
        assert!(!graph.can_traverse(home, Direction::Down, Access::PACMAN));
        assert!(!graph.can_traverse(home, Direction::Down, Access::CLYDE));

        graph.allow_home_access(Access::CLYDE);
        assert!(graph.can_traverse(home, Direction::Down, Access::CLYDE));
        assert!(!graph.can_traverse(home, Direction::Down, Access::BLINKY));
    }
}
