//! This module contains all the constants used in the game.

/// The width of a maze tile, in pixels.
pub const TILE_WIDTH: f32 = 16.0;
/// The height of a maze tile, in pixels.
pub const TILE_HEIGHT: f32 = 16.0;
/// The number of rows in a maze file.
pub const NROWS: usize = 36;
/// The number of columns in a maze file.
pub const NCOLS: usize = 28;

/// Lives granted at the start of a game.
pub const STARTING_LIVES: u32 = 5;
/// Score at which the single extra life is awarded.
pub const EXTRA_LIFE_SCORE: u32 = 10_000;

/// Converts a speed authored for 16px tiles into pixels per second for the current tile size.
pub const fn scaled_speed(speed: f32) -> f32 {
    speed * TILE_WIDTH / 16.0
}

/// Movement speeds, in pixels per second.
pub mod speed {
    use super::scaled_speed;

    pub const PACMAN: f32 = scaled_speed(100.0);
    pub const GHOST: f32 = scaled_speed(100.0);
    pub const GHOST_FREIGHT: f32 = scaled_speed(50.0);
    pub const GHOST_SPAWN: f32 = scaled_speed(150.0);
    pub const BULLET: f32 = scaled_speed(300.0);
    /// Multiplier applied to Pac-Man's speed while a speed boost is active.
    pub const BOOST_FACTOR: f32 = 1.5;
}

/// Ghost mode durations, in seconds.
pub mod mode {
    pub const SCATTER: f32 = 7.0;
    pub const CHASE: f32 = 20.0;
    pub const FREIGHT: f32 = 7.0;
    /// Ghosts flash for this long before FREIGHT runs out.
    pub const FREIGHT_FLASH: f32 = 2.0;
}

/// Timers for game flow and power-ups, in seconds.
pub mod timing {
    pub const LEVEL_CLEAR_DELAY: f32 = 3.0;
    pub const DEATH_DELAY: f32 = 3.0;
    pub const CAPTURE_DELAY: f32 = 1.0;
    /// How long a direction press is remembered before it is discarded.
    pub const INPUT_BUFFER: f32 = 0.25;
    pub const POWER_PELLET_BLINK: f32 = 0.2;
    pub const BACKGROUND_FLASH: f32 = 0.2;
    pub const FRUIT_LIFESPAN: f32 = 5.0;
    pub const INVISIBILITY: f32 = 5.0;
    pub const SPEED_BOOST: f32 = 8.0;
    pub const POPUP: f32 = 1.0;
}

/// Ability durations, in seconds.
pub mod ability {
    pub const GUN_ACTIVE: f32 = 5.0;
    pub const GUN_COOLDOWN: f32 = 10.0;
    pub const BULLET_LIFETIME: f32 = 1.5;
    pub const SHIELD_ACTIVE: f32 = 4.0;
    pub const SHIELD_COOLDOWN: f32 = 15.0;
}

/// Point values.
pub mod score {
    pub const PELLET: u32 = 10;
    pub const POWER_PELLET: u32 = 50;
    pub const SPECIAL_PELLET: u32 = 50;
    pub const GHOST_BASE: u32 = 200;
    pub const FRUIT_BASE: u32 = 100;
    pub const FRUIT_PER_LEVEL: u32 = 20;
}

/// Collision radii, in pixels. Two entities touch when their centers are within the sum of their radii.
pub mod collider {
    use super::TILE_WIDTH;

    pub const PACMAN: f32 = TILE_WIDTH / 4.0;
    pub const GHOST: f32 = TILE_WIDTH / 4.0;
    pub const PELLET: f32 = TILE_WIDTH / 4.0;
    pub const FRUIT: f32 = TILE_WIDTH / 4.0;
    pub const BULLET: f32 = 2.0;
    /// Reach of the score magnet, measured from the magnet pellet.
    pub const MAGNET_RADIUS: f32 = 4.0 * TILE_WIDTH;
}

/// Pellet-eaten counts that change the state of a level.
pub mod milestones {
    /// Inky may leave the home once this many pellets are eaten.
    pub const INKY_RELEASE: u32 = 30;
    /// Clyde may leave the home once this many pellets are eaten.
    pub const CLYDE_RELEASE: u32 = 70;
    /// A fruit appears at each of these counts.
    pub const FRUIT: [u32; 2] = [50, 140];
}
