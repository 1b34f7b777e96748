use bevy_ecs::{
    component::Component,
    event::{EventReader, EventWriter},
    query::With,
    system::{Commands, Query, Res, ResMut},
};
use tracing::{debug, trace};

use crate::{
    constants::{speed, timing},
    error::{EntityError, GameError},
    events::{GameCommand, GameEvent},
    map::{builder::Map, graph::Access},
    systems::{
        ability::{fire, AbilitySlot},
        components::{DeltaTime, GlobalState, PlayerControlled},
        movement::{BufferedDirection, Position, Velocity},
        pause::Pause,
    },
};

/// Lifecycle state for the player entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerLifecycle {
    #[default]
    Alive,
    /// Caught by a ghost; waiting for the level to reset.
    Dying,
}

impl PlayerLifecycle {
    /// Returns true when input, movement and collisions should be active
    pub fn is_alive(self) -> bool {
        matches!(self, PlayerLifecycle::Alive)
    }
}

/// Timed power-ups granted by special pellets.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerModifiers {
    /// Seconds of invisibility left. Ghosts pass through the player while it lasts.
    pub invisibility: f32,
    /// Seconds of speed boost left.
    pub speed_boost: f32,
}

impl PlayerModifiers {
    pub fn is_invisible(&self) -> bool {
        self.invisibility > 0.0
    }

    pub fn speed_multiplier(&self) -> f32 {
        if self.speed_boost > 0.0 {
            speed::BOOST_FACTOR
        } else {
            1.0
        }
    }

    pub fn tick(&mut self, seconds: f32) {
        self.invisibility = (self.invisibility - seconds).max(0.0);
        self.speed_boost = (self.speed_boost - seconds).max(0.0);
    }
}

/// Processes player input commands.
///
/// Movement commands are buffered so a turn can be requested before reaching an intersection.
/// Ability use is ignored while paused or dead. Exit is always honored.
#[allow(clippy::type_complexity)]
pub fn player_control_system(
    mut commands: Commands,
    map: Res<Map>,
    pause: Res<Pause>,
    mut events: EventReader<GameEvent>,
    mut state: ResMut<GlobalState>,
    mut players: Query<
        (
            &PlayerLifecycle,
            &Position,
            &Velocity,
            &mut BufferedDirection,
            &mut AbilitySlot,
        ),
        With<PlayerControlled>,
    >,
    mut errors: EventWriter<GameError>,
) {
    // Get the player (ensuring there is only one player)
    let (lifecycle, position, velocity, mut buffered_direction, mut slot) = match players.single_mut() {
        Ok(tuple) => tuple,
        Err(e) => {
            trace!(error = %e, "Player query failed");
            errors.write(EntityError::MissingEntity("player").into());
            return;
        }
    };

    for event in events.read() {
        let GameEvent::Command(command) = event;
        match *command {
            GameCommand::MovePlayer(direction) => {
                if lifecycle.is_alive() {
                    *buffered_direction = BufferedDirection::new(direction, timing::INPUT_BUFFER);
                }
            }
            GameCommand::UseAbility => {
                if lifecycle.is_alive() && !pause.is_paused() {
                    fire(&map, &mut commands, &mut slot, position, velocity, &mut errors);
                }
            }
            GameCommand::Exit => {
                debug!("Exit requested");
                state.exit = true;
            }
            GameCommand::TogglePause => {}
        }
    }
}

/// Counts down the player's timed power-ups.
pub fn player_modifier_system(delta_time: Res<DeltaTime>, mut players: Query<&mut PlayerModifiers>) {
    for mut modifiers in players.iter_mut() {
        modifiers.tick(delta_time.seconds);
    }
}

/// Executes frame-by-frame movement for Pac-Man.
///
/// At a node the buffered direction is taken if that way is open, otherwise Pac-Man carries on
/// straight or stops. Between nodes a buffered reversal turns him around immediately.
/// Arriving at a portal node moves him to its partner within the same frame.
pub fn player_movement_system(
    map: Res<Map>,
    delta_time: Res<DeltaTime>,
    mut entities: Query<
        (
            &PlayerLifecycle,
            &PlayerModifiers,
            &mut Position,
            &mut Velocity,
            &mut BufferedDirection,
        ),
        With<PlayerControlled>,
    >,
) {
    for (lifecycle, modifiers, mut position, mut velocity, mut buffered_direction) in entities.iter_mut() {
        if !lifecycle.is_alive() {
            continue;
        }

        buffered_direction.tick(delta_time.seconds);
        let mut distance = velocity.speed * modifiers.speed_multiplier() * delta_time.seconds;

        loop {
            match *position {
                Position::Stopped { node } => {
                    if let Some(direction) = buffered_direction.direction() {
                        if let Some(next) = Position::depart(&map.graph, node, direction, Access::PACMAN) {
                            velocity.direction = direction;
                            *position = next;
                            *buffered_direction = BufferedDirection::None;
                            continue;
                        }
                    }

                    match Position::depart(&map.graph, node, velocity.direction, Access::PACMAN) {
                        Some(next) => *position = next,
                        None => break,
                    }
                }
                Position::Moving { .. } => {
                    if buffered_direction.direction() == Some(velocity.direction.opposite()) {
                        position.reverse(&map.graph);
                        velocity.direction = velocity.direction.opposite();
                        *buffered_direction = BufferedDirection::None;
                    }

                    let overflow = position.tick(distance);
                    position.enter_portal(&map.graph);
                    match overflow {
                        Some(overflow) => distance = overflow,
                        None => break,
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_expire() {
        let mut modifiers = PlayerModifiers {
            invisibility: 1.0,
            speed_boost: 2.0,
        };
        assert!(modifiers.is_invisible());
        assert_eq!(modifiers.speed_multiplier(), speed::BOOST_FACTOR);
        modifiers.tick(1.5);
        assert!(!modifiers.is_invisible());
        modifiers.tick(1.0);
        assert_eq!(modifiers.speed_multiplier(), 1.0);
    }
}
