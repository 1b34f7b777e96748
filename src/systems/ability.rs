//! Character abilities: the gun fires bullets for a while, the shield absorbs one ghost hit.

use bevy_ecs::component::Component;
use bevy_ecs::entity::Entity;
use bevy_ecs::event::EventWriter;
use bevy_ecs::system::{Commands, Query, Res};
use glam::Vec2;
use serde::Deserialize;
use strum_macros::{AsRefStr, EnumString};
use tracing::debug;

use crate::constants::{ability, collider, speed};
use crate::error::GameError;
use crate::map::builder::Map;
use crate::map::direction::Direction;
use crate::systems::components::{Collider, DeltaTime};
use crate::systems::lifetime::TimeToLive;
use crate::systems::movement::{Position, Velocity};
use crate::systems::player::PlayerLifecycle;

/// The playable characters. Each one carries a different ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Character {
    #[default]
    Classic,
    Gunner,
    Guardian,
}

impl Character {
    pub fn ability(self) -> Option<Ability> {
        match self {
            Character::Classic => None,
            Character::Gunner => Some(Ability::Gun(Gun::default())),
            Character::Guardian => Some(Ability::Shield(Shield::default())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum AbilityState {
    #[default]
    Ready,
    Active {
        remaining: f32,
    },
    Cooldown {
        remaining: f32,
    },
}

impl AbilityState {
    pub fn is_ready(&self) -> bool {
        matches!(self, AbilityState::Ready)
    }

    pub fn is_active(&self) -> bool {
        matches!(self, AbilityState::Active { .. })
    }

    /// Counts down the active or cooldown phase. Active runs into a cooldown of `cooldown` seconds.
    fn tick(&mut self, seconds: f32, cooldown: f32) {
        *self = match *self {
            AbilityState::Ready => AbilityState::Ready,
            AbilityState::Active { remaining } if remaining > seconds => AbilityState::Active {
                remaining: remaining - seconds,
            },
            AbilityState::Active { .. } => AbilityState::Cooldown { remaining: cooldown },
            AbilityState::Cooldown { remaining } if remaining > seconds => AbilityState::Cooldown {
                remaining: remaining - seconds,
            },
            AbilityState::Cooldown { .. } => AbilityState::Ready,
        };
    }
}

/// Shared behavior of the ability slot.
pub trait Capability {
    fn state(&self) -> AbilityState;

    /// Switches a ready ability on. Returns false if it is active or cooling down.
    fn activate(&mut self) -> bool;

    /// Fires from `origin` towards `direction`, if this ability can.
    fn shoot(&mut self, _origin: Vec2, _direction: Direction) -> Option<Bullet> {
        None
    }

    /// Called when a ghost touches the player. Returns true if the hit was absorbed.
    fn on_ghost_collide(&mut self) -> bool {
        false
    }

    fn tick(&mut self, seconds: f32);
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Gun {
    state: AbilityState,
}

impl Capability for Gun {
    fn state(&self) -> AbilityState {
        self.state
    }

    fn activate(&mut self) -> bool {
        if !self.state.is_ready() {
            return false;
        }
        self.state = AbilityState::Active {
            remaining: ability::GUN_ACTIVE,
        };
        true
    }

    fn shoot(&mut self, origin: Vec2, direction: Direction) -> Option<Bullet> {
        self.state.is_active().then(|| Bullet::new(origin, direction))
    }

    fn tick(&mut self, seconds: f32) {
        self.state.tick(seconds, ability::GUN_COOLDOWN);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Shield {
    state: AbilityState,
}

impl Capability for Shield {
    fn state(&self) -> AbilityState {
        self.state
    }

    fn activate(&mut self) -> bool {
        if !self.state.is_ready() {
            return false;
        }
        self.state = AbilityState::Active {
            remaining: ability::SHIELD_ACTIVE,
        };
        true
    }

    fn on_ghost_collide(&mut self) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.state = AbilityState::Cooldown {
            remaining: ability::SHIELD_COOLDOWN,
        };
        true
    }

    fn tick(&mut self, seconds: f32) {
        self.state.tick(seconds, ability::SHIELD_COOLDOWN);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ability {
    Gun(Gun),
    Shield(Shield),
}

impl Ability {
    fn capability(&mut self) -> &mut dyn Capability {
        match self {
            Ability::Gun(gun) => gun,
            Ability::Shield(shield) => shield,
        }
    }

    pub fn state(&self) -> AbilityState {
        match self {
            Ability::Gun(gun) => gun.state(),
            Ability::Shield(shield) => shield.state(),
        }
    }

    /// Activates a ready ability; otherwise an active gun fires.
    pub fn use_ability(&mut self, origin: Vec2, direction: Direction) -> Option<Bullet> {
        let capability = self.capability();
        if capability.activate() {
            debug!(state = ?capability.state(), "Ability activated");
            return None;
        }
        capability.shoot(origin, direction)
    }

    pub fn on_ghost_collide(&mut self) -> bool {
        self.capability().on_ghost_collide()
    }

    pub fn tick(&mut self, seconds: f32) {
        self.capability().tick(seconds);
    }
}

/// The player's ability, if the character has one.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct AbilitySlot(pub Option<Ability>);

/// A projectile travelling in a straight line, free of the maze graph.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub position: Vec2,
    pub direction: Direction,
}

impl Bullet {
    pub fn new(position: Vec2, direction: Direction) -> Self {
        Self { position, direction }
    }
}

/// Spawns a bullet with its lifetime and collider.
pub fn spawn_bullet(commands: &mut Commands, bullet: Bullet) -> Entity {
    commands
        .spawn((
            bullet,
            Collider::new(collider::BULLET),
            TimeToLive::new(ability::BULLET_LIFETIME),
        ))
        .id()
}

/// Uses the player's ability. Returns a bullet when a gun fired.
pub fn use_ability(slot: &mut AbilitySlot, origin: Vec2, direction: Direction) -> Option<Bullet> {
    slot.0.as_mut()?.use_ability(origin, direction)
}

/// Counts down ability phases while the player is alive.
pub fn ability_system(delta_time: Res<DeltaTime>, mut players: Query<(&PlayerLifecycle, &mut AbilitySlot)>) {
    for (lifecycle, mut slot) in players.iter_mut() {
        if !lifecycle.is_alive() {
            continue;
        }
        if let Some(ability) = slot.0.as_mut() {
            ability.tick(delta_time.seconds);
        }
    }
}

/// Fires a bullet from the player's current position, if the ability allows it.
pub fn fire(
    map: &Map,
    commands: &mut Commands,
    slot: &mut AbilitySlot,
    position: &Position,
    velocity: &Velocity,
    errors: &mut EventWriter<GameError>,
) {
    let origin = match position.get_pixel_position(&map.graph) {
        Ok(origin) => origin,
        Err(e) => {
            errors.write(e);
            return;
        }
    };
    if let Some(bullet) = use_ability(slot, origin, velocity.direction) {
        debug!(?origin, direction = velocity.direction.as_ref(), "Bullet fired");
        spawn_bullet(commands, bullet);
    }
}

/// Moves bullets in a straight line.
pub fn bullet_movement_system(delta_time: Res<DeltaTime>, mut bullets: Query<&mut Bullet>) {
    for mut bullet in bullets.iter_mut() {
        let step = bullet.direction.as_vec2() * speed::BULLET * delta_time.seconds;
        bullet.position += step;
    }
}
