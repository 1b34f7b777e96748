//! The Entity-Component-System (ECS) module.
//!
//! This module contains all the ECS-related logic, including components, systems,
//! and resources.

pub mod ability;
pub mod audio;
pub mod collision;
pub mod components;
pub mod ghost;
pub mod hud;
pub mod item;
pub mod lifetime;
pub mod movement;
pub mod pause;
pub mod player;
pub mod state;

pub use self::ability::*;
pub use self::audio::*;
pub use self::collision::*;
pub use self::components::*;
pub use self::ghost::*;
pub use self::hud::*;
pub use self::item::*;
pub use self::lifetime::*;
pub use self::movement::*;
pub use self::pause::*;
pub use self::player::*;
pub use self::state::*;
