use bevy_ecs::{component::Component, resource::Resource};
use glam::Vec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// A tag component for entities that are controlled by the player.
#[derive(Default, Component)]
pub struct PlayerControlled;

/// Marker for entities that are currently not drawn and do not take part in collisions.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Hidden;

/// Circular collision bounds, in pixels.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub radius: f32,
}

impl Collider {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    /// Two colliders touch when the squared distance between their centers is within the squared sum of their radii.
    pub fn collides(&self, position: Vec2, other: &Collider, other_position: Vec2) -> bool {
        let reach = self.radius + other.radius;
        position.distance_squared(other_position) <= reach * reach
    }
}

#[derive(Resource)]
pub struct GlobalState {
    pub exit: bool,
}

/// Time elapsed during the current frame.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default)]
pub struct DeltaTime {
    pub seconds: f32,
    /// Frames elapsed since the previous update, normally 1.
    pub ticks: u32,
}

impl DeltaTime {
    pub fn from_seconds(seconds: f32) -> Self {
        Self { seconds, ticks: 1 }
    }
}

/// Source of randomness for ghost wandering, teleport destinations and similar choices.
#[derive(Resource, Debug)]
pub struct GameRng(pub SmallRng);

impl GameRng {
    /// A fixed seed gives a reproducible game; otherwise the generator is seeded from the thread RNG.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(SmallRng::seed_from_u64(seed)),
            None => Self(SmallRng::from_rng(&mut rand::rng())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{collider, TILE_WIDTH};

    #[test]
    fn test_player_item_threshold_is_half_a_tile() {
        let pacman = Collider::new(collider::PACMAN);
        let pellet = Collider::new(collider::PELLET);
        assert!(pacman.collides(Vec2::ZERO, &pellet, Vec2::new(TILE_WIDTH / 2.0, 0.0)));
        assert!(!pacman.collides(Vec2::ZERO, &pellet, Vec2::new(TILE_WIDTH / 2.0 + 0.1, 0.0)));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        use rand::Rng;
        let a: u32 = GameRng::new(Some(7)).0.random();
        let b: u32 = GameRng::new(Some(7)).0.random();
        assert_eq!(a, b);
    }
}
