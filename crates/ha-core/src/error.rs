//! Error types for variant configuration, memory access, the step hook and
//! causal discovery.

use thiserror::Error;

use crate::Address;
use crate::memory::ByteChange;

/// Rejected variant configurations. Always raised at construction or install
/// time, never while frames are running.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Rules '{first}' and '{second}' both write address {address}")]
    ConflictingTargets {
        address: Address,
        first: String,
        second: String,
    },

    #[error("Invalid color selector: {0}")]
    InvalidSelector(i32),

    #[error("Invalid stop mode: {0}")]
    InvalidStopMode(i32),

    #[error("Only one stop mode may be active per variant")]
    MultipleStopModes,

    #[error("Rule '{rule}' has an empty address range {start}..{end}")]
    EmptyRange {
        rule: String,
        start: Address,
        end: Address,
    },

    #[error("Rule '{rule}' has an invalid parameter: {reason}")]
    InvalidParameter { rule: String, reason: String },

    #[error("Variant '{variant}' targets address {address}, but memory is only {len} bytes")]
    AddressOutOfRange {
        variant: String,
        address: Address,
        len: usize,
    },

    #[error("Unknown game: {0}")]
    UnknownGame(String),

    #[error("Unknown modification '{modif}' for {game}")]
    UnknownModification { game: String, modif: String },

    #[error("Invalid value for modification '{modif}': {value}")]
    InvalidModificationValue { modif: String, value: String },

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Direct memory access failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Address {address} is outside memory of {len} bytes")]
    AddressOutOfRange { address: Address, len: usize },

    #[error("Value {0} does not fit in a byte")]
    ValueOutOfRange(u32),

    #[error("Snapshot holds {expected} bytes, memory holds {found}")]
    LengthMismatch { expected: usize, found: usize },
}

/// Failures while applying a variant around a frame. Any of these means the
/// variant is misconfigured; the episode must be aborted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HookError {
    #[error("Variant '{variant}' wrote undeclared address {address}")]
    UndeclaredWrite { variant: String, address: Address },

    #[error("Variant '{variant}' wrote address {address} beyond memory of {len} bytes")]
    WriteOutOfRange {
        variant: String,
        address: Address,
        len: usize,
    },
}

/// Failures of a causal discovery query
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("Coordinate ({x}, {y}) is outside the {width}x{height} frame")]
    CoordinateOutOfFrame {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error(
        "Memory differs from baseline at address {address} after restore ({count} cells)",
        count = .changes.len()
    )]
    RestoreMismatch {
        /// Lowest differing address
        address: Address,
        changes: Vec<ByteChange>,
    },

    #[error(transparent)]
    Memory(#[from] MemoryError),
}
