//! Interface of the external emulator.
//!
//! The framework never emulates anything itself. It drives an implementation
//! of [`Emulator`]: step one frame, read the screen, reset, and clone or
//! restore the full machine state.

use serde::{Deserialize, Serialize};

use crate::memory::MemoryView;

/// Index into the emulator's action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Action(pub u8);

impl Action {
    /// The neutral action; advances the game without player input.
    pub const NOOP: Action = Action(0);
}

/// RGB pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const BLACK: Rgb = Rgb([0, 0, 0]);
}

impl core::fmt::Display for Rgb {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// A rendered frame, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
}

impl ScreenBuffer {
    /// Blank (black) frame
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgb::BLACK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Pixel at column `x`, row `y`
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// Set a pixel; writes outside the frame are dropped.
    pub fn set_pixel(&mut self, x: usize, y: usize, color: Rgb) {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x] = color;
        }
    }

    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }
}

/// Extra information returned with every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StepInfo {
    pub frame_number: u64,
    pub episode_frame_number: u64,
}

/// Native result of one frame advance.
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult<O> {
    pub observation: O,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
    pub info: StepInfo,
}

impl<O> StepResult<O> {
    /// True when the episode ended, either way.
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// The emulator collaborator.
///
/// Implementations are expected to be synchronous; every call returns once
/// the emulator has finished the work.
pub trait Emulator: MemoryView {
    type Observation;
    /// Opaque full-machine snapshot
    type State: Clone;

    /// Advance the simulation by one frame.
    fn step(&mut self, action: Action) -> StepResult<Self::Observation>;

    /// Copy of the current rendered frame.
    fn screen_rgb(&self) -> ScreenBuffer;

    /// Width and height of the rendered frame.
    fn screen_size(&self) -> (usize, usize);

    /// Start a new episode.
    fn reset(&mut self) -> Self::Observation;

    fn clone_state(&self) -> Self::State;

    fn restore_state(&mut self, state: &Self::State);
}
