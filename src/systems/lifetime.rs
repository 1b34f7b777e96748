use bevy_ecs::{
    component::Component,
    entity::Entity,
    system::{Commands, Query, Res},
};

use crate::systems::components::DeltaTime;

/// Component for entities that are despawned once their lifespan runs out.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct TimeToLive {
    pub remaining: f32,
}

impl TimeToLive {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }
}

/// Counts down every `TimeToLive` and despawns the entities that expire.
pub fn time_to_live_system(mut commands: Commands, dt: Res<DeltaTime>, mut query: Query<(Entity, &mut TimeToLive)>) {
    for (entity, mut ttl) in query.iter_mut() {
        if ttl.remaining <= dt.seconds {
            commands.entity(entity).despawn();
        } else {
            ttl.remaining -= dt.seconds;
        }
    }
}
