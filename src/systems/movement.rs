use bevy_ecs::component::Component;
use glam::Vec2;
use smallvec::SmallVec;

use crate::error::{EntityError, GameResult};
use crate::map::direction::Direction;
use crate::map::graph::{Access, Graph, NodeId};

/// Where an entity sits on the maze graph.
///
/// A stopped entity is exactly at a node. A moving entity is on the edge from `from` towards `to`,
/// `remaining_distance` pixels short of `to`.
#[derive(Component, Debug, Copy, Clone, PartialEq)]
pub enum Position {
    Stopped {
        node: NodeId,
    },
    Moving {
        from: NodeId,
        to: NodeId,
        remaining_distance: f32,
    },
}

impl Position {
    pub fn is_at_node(&self) -> bool {
        matches!(self, Position::Stopped { .. })
    }

    /// The node the entity is at, or the one it is leaving.
    pub fn current_node(&self) -> NodeId {
        match *self {
            Position::Stopped { node } => node,
            Position::Moving { from, .. } => from,
        }
    }

    /// The node the entity is heading to, or the one it is at.
    pub fn target_node(&self) -> NodeId {
        match *self {
            Position::Stopped { node } => node,
            Position::Moving { to, .. } => to,
        }
    }

    /// Advances towards the target node by `distance` pixels.
    ///
    /// On reaching the target the position snaps to it and becomes `Stopped`. If the distance
    /// overshoots the target, the leftover distance is returned so it can be spent on the next edge.
    pub fn tick(&mut self, distance: f32) -> Option<f32> {
        let Position::Moving {
            to, remaining_distance, ..
        } = *self
        else {
            return None;
        };

        if distance < remaining_distance {
            if let Position::Moving { remaining_distance, .. } = self {
                *remaining_distance -= distance;
            }
            return None;
        }

        *self = Position::Stopped { node: to };
        let overflow = distance - remaining_distance;
        (overflow > 0.0).then_some(overflow)
    }

    /// Interpolated pixel position on the graph.
    pub fn get_pixel_position(&self, graph: &Graph) -> GameResult<Vec2> {
        let node_position = |id: NodeId| graph.position(id).ok_or(EntityError::NodeNotFound(id));
        match *self {
            Position::Stopped { node } => Ok(node_position(node)?),
            Position::Moving {
                from,
                to,
                remaining_distance,
            } => {
                let from = node_position(from)?;
                let to = node_position(to)?;
                let length = from.distance(to);
                if length <= f32::EPSILON {
                    return Ok(to);
                }
                Ok(to + (from - to) * (remaining_distance / length))
            }
        }
    }

    /// Turns around on the current edge: the target becomes the origin, keeping the pixel position.
    pub fn reverse(&mut self, graph: &Graph) {
        if let Position::Moving {
            from,
            to,
            remaining_distance,
        } = *self
        {
            let length = graph.distance(from, to).unwrap_or(remaining_distance);
            *self = Position::Moving {
                from: to,
                to: from,
                remaining_distance: (length - remaining_distance).max(0.0),
            };
        }
    }

    /// Starts travelling from `node` in `direction`, if that neighbor exists and admits `class`.
    pub fn depart(graph: &Graph, node: NodeId, direction: Direction, class: Access) -> Option<Position> {
        if !graph.can_traverse(node, direction, class) {
            return None;
        }
        let to = graph.neighbor(node, direction)?;
        Some(Position::Moving {
            from: node,
            to,
            remaining_distance: graph.distance(node, to)?,
        })
    }

    /// A position halfway along the edge leaving `node` in `direction`, regardless of access rules.
    pub fn between(graph: &Graph, node: NodeId, direction: Direction) -> Option<Position> {
        let to = graph.neighbor(node, direction)?;
        Some(Position::Moving {
            from: node,
            to,
            remaining_distance: graph.distance(node, to)? / 2.0,
        })
    }

    /// Follows the PORTAL link of the node a stopped entity has just reached.
    pub fn enter_portal(&mut self, graph: &Graph) -> bool {
        if let Position::Stopped { node } = *self {
            if let Some(partner) = graph.portal(node) {
                *self = Position::Stopped { node: partner };
                return true;
            }
        }
        false
    }
}

/// Speed in pixels per second and the facing direction.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub speed: f32,
    pub direction: Direction,
}

/// A direction requested by the player that has not been acted on yet.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub enum BufferedDirection {
    #[default]
    None,
    Some { direction: Direction, remaining_time: f32 },
}

impl BufferedDirection {
    pub fn new(direction: Direction, remaining_time: f32) -> Self {
        BufferedDirection::Some {
            direction,
            remaining_time,
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match *self {
            BufferedDirection::None => None,
            BufferedDirection::Some { direction, .. } => Some(direction),
        }
    }

    /// Counts down the buffer, dropping it once it has expired.
    pub fn tick(&mut self, seconds: f32) {
        if let BufferedDirection::Some {
            direction,
            remaining_time,
        } = *self
        {
            let remaining_time = remaining_time - seconds;
            *self = if remaining_time <= 0.0 {
                BufferedDirection::None
            } else {
                BufferedDirection::Some {
                    direction,
                    remaining_time,
                }
            };
        }
    }
}

/// Directions `class` may leave `node` by, excluding a reversal of `heading` unless it is the only way out.
pub fn valid_directions(graph: &Graph, node: NodeId, class: Access, heading: Direction) -> SmallVec<[Direction; 4]> {
    let reverse = heading.opposite();
    let mut directions: SmallVec<[Direction; 4]> = Direction::DIRECTIONS
        .iter()
        .copied()
        .filter(|&direction| direction != reverse && graph.can_traverse(node, direction, class))
        .collect();

    if directions.is_empty() && graph.can_traverse(node, reverse, class) {
        directions.push(reverse);
    }
    directions
}
