//! Addresses and constants of the reference games.
//!
//! Atari 2600 RAM is 128 bytes, indexed from 0 (the console maps it at
//! $80-$FF, but emulators expose it zero-based).

use crate::Address;

/// Size of the Atari 2600 RAM as exposed by the emulator
pub const RAM_SIZE: usize = 128;

/// Native screen width in pixels
pub const SCREEN_WIDTH: usize = 160;
/// Native screen height in pixels
pub const SCREEN_HEIGHT: usize = 210;

// ---------------------------------------------------------------------------
// Space Invaders
// ---------------------------------------------------------------------------

/// Horizontal position of the player's laser shot
pub const LASER_X: Address = 87;
/// Horizontal midpoint of the playing field
pub const LASER_MIDPOINT: u8 = 81;
/// Displacement only applies strictly above this value
pub const LASER_LOWER_BOUND: u8 = 40;
/// Displacement only applies strictly below this value
pub const LASER_UPPER_BOUND: u8 = 122;
/// Fraction of the current position added (or removed) per frame
pub const LASER_CURVATURE: f64 = 0.01;

// ---------------------------------------------------------------------------
// Freeway
// ---------------------------------------------------------------------------

/// First car color cell
pub const CAR_COLOR_START: Address = 77;
/// One past the last car color cell (ten cars)
pub const CAR_COLOR_END: Address = 87;

/// Colors the game writes on its own, starting at `CAR_COLOR_START`.
/// The table is one entry longer than the car range; the last entry
/// belongs to the cell right after the cars.
pub const CAR_DEFAULT_COLORS: [u8; 11] = [26, 216, 68, 136, 36, 130, 74, 18, 220, 66, 189];

/// First car motion cell
pub const CAR_MOTION_START: Address = 33;
/// One past the last car motion cell
pub const CAR_MOTION_END: Address = 43;

/// Motion value that stops a car
pub const CAR_FREEZE_VALUE: u8 = 100;
/// Motion value that lets a car drive again
pub const CAR_RELEASE_VALUE: u8 = 0;

/// Probability that the randomly picked car drives off (stop mode 1)
pub const SINGLE_RELEASE_PROBABILITY: f64 = 0.9;
/// Probability that all cars drive off together (stop mode 2)
pub const SIMULTANEOUS_RELEASE_PROBABILITY: f64 = 0.4;

/// Horizontal positions of the five lower cars
pub const LOWER_CARS_X_START: Address = 108;
pub const LOWER_CARS_X_END: Address = 113;
/// Parking position of the lower cars when all are stopped
pub const LOWER_CARS_PARKED_X: u8 = 15;

/// Horizontal positions of the five upper cars
pub const UPPER_CARS_X_START: Address = 113;
pub const UPPER_CARS_X_END: Address = 118;
/// Parking position of the upper cars when all are stopped
pub const UPPER_CARS_PARKED_X: u8 = 150;
