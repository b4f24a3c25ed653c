//! Per-frame RAM transformation rules.
//!
//! A rule reads the current RAM, may consult the injected random source, and
//! emits the writes it wants for this frame. Rules hold configuration only;
//! they carry no state from one frame to the next.

pub mod displacement;
pub mod freeze;
pub mod palette;

use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::Address;
use crate::error::ConfigError;
use crate::rng::VariantRng;

pub use displacement::ParabolicDisplacement;
pub use freeze::{FreezeRule, Parking, StopMode};
pub use palette::{CarColor, PaletteRecolor};

/// Half-open range of RAM addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRange {
    pub start: Address,
    pub end: Address,
}

impl AddressRange {
    pub const fn new(start: Address, end: Address) -> Self {
        Self { start, end }
    }

    /// Range holding a single address. Empty for `Address::MAX`, which has
    /// no successor.
    pub const fn single(address: Address) -> Self {
        Self {
            start: address,
            end: address.saturating_add(1),
        }
    }

    pub fn contains(&self, address: Address) -> bool {
        (self.start..self.end).contains(&address)
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn iter(&self) -> Range<Address> {
        self.start..self.end
    }

    pub fn overlaps(&self, other: &AddressRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub(crate) fn require_non_empty(&self, rule: &str) -> Result<(), ConfigError> {
        if self.is_empty() {
            return Err(ConfigError::EmptyRange {
                rule: rule.to_string(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }
}

impl From<Range<Address>> for AddressRange {
    fn from(range: Range<Address>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl core::fmt::Display for AddressRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A single byte a rule wants written this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Write {
    pub address: Address,
    pub value: u8,
}

impl Write {
    pub const fn new(address: Address, value: u8) -> Self {
        Self { address, value }
    }
}

/// Round to the nearest integer (ties to even) and saturate into a byte.
pub fn clamp_to_byte(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round_ties_even().clamp(0.0, 255.0) as u8
}

/// One transformation of a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Rule {
    /// Slide a coordinate away from a midpoint
    Displacement(ParabolicDisplacement),
    /// Recolor a block of sprites
    Palette(PaletteRecolor),
    /// Stop and release moving objects
    Freeze(FreezeRule),
}

impl Rule {
    /// Short name used in logs and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Displacement(_) => "displacement",
            Rule::Palette(_) => "palette",
            Rule::Freeze(rule) => rule.mode().name(),
        }
    }

    /// Every range this rule may write. Nothing outside is ever touched.
    pub fn targets(&self) -> Vec<AddressRange> {
        match self {
            Rule::Displacement(rule) => vec![rule.target()],
            Rule::Palette(rule) => rule.targets(),
            Rule::Freeze(rule) => rule.targets(),
        }
    }

    pub fn declares(&self, address: Address) -> bool {
        self.targets().iter().any(|range| range.contains(address))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            Rule::Displacement(rule) => rule.validate(),
            Rule::Palette(rule) => rule.validate(),
            Rule::Freeze(rule) => rule.validate(),
        }
    }

    /// Append this frame's writes to `out`.
    pub fn apply(&self, memory: &[u8], rng: &mut VariantRng, out: &mut Vec<Write>) {
        match self {
            Rule::Displacement(rule) => rule.apply(memory, out),
            Rule::Palette(rule) => rule.apply(out),
            Rule::Freeze(rule) => rule.apply(rng, out),
        }
    }
}

impl From<ParabolicDisplacement> for Rule {
    fn from(rule: ParabolicDisplacement) -> Self {
        Rule::Displacement(rule)
    }
}

impl From<PaletteRecolor> for Rule {
    fn from(rule: PaletteRecolor) -> Self {
        Rule::Palette(rule)
    }
}

impl From<FreezeRule> for Rule {
    fn from(rule: FreezeRule) -> Self {
        Rule::Freeze(rule)
    }
}
