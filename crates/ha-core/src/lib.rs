//! ha-core: RAM modification framework for Atari game variants
//!
//! Two pieces sit on top of an external emulator:
//! - a per-frame hook that rewrites RAM according to a declarative
//!   [`VariantConfig`] before each step, and
//! - a [`CausalDiscoveryEngine`] that finds the RAM cells driving a given
//!   screen pixel.
//!
//! The emulator itself is reached only through the [`Emulator`] trait.
//! Everything is single threaded; the embedding loop serializes all calls.

pub mod catalog;
pub mod consts;
pub mod discovery;
pub mod emulator;
pub mod episode;
pub mod error;
pub mod hook;
pub mod inspector;
pub mod memory;
pub mod rules;
pub mod session;
pub mod variant;

mod rng;

/// Index of a RAM cell
pub type Address = usize;

pub use discovery::{CausalDiscoveryEngine, CausalityMap, Coordinate, DiscoveryReport, TrialObserver};
pub use emulator::{Action, Emulator, Rgb, ScreenBuffer, StepInfo, StepResult};
pub use error::{ConfigError, DiscoveryError, HookError, MemoryError};
pub use hook::{HookedEmulator, StepHook};
pub use memory::{ByteChange, MemorySnapshot, MemoryView};
pub use rng::VariantRng;
pub use rules::{Rule, Write};
pub use session::{RunMode, Session};
pub use variant::VariantConfig;
