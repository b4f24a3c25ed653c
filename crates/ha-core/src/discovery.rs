//! Causal RAM discovery.
//!
//! Finds the RAM cells that drive one screen pixel: from a captured baseline,
//! each cell in turn is overwritten, the game advances one neutral frame, the
//! pixel is compared with the unperturbed reference, and RAM is restored
//! before the next cell is tried. Trials never accumulate.
//!
//! Only the value 0 is used as a perturbation. Other values can crash the
//! emulated console, so coverage is limited to cells whose zeroing shows up
//! on screen.

use std::collections::BTreeSet;

use hashbrown::HashMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::Address;
use crate::emulator::{Action, Emulator, Rgb};
use crate::error::DiscoveryError;
use crate::memory::{MemorySnapshot, MemoryView};

/// Values written during a trial. Restricted to values the console survives.
pub const PERTURBATION_VALUES: &[u8] = &[0];

/// Screen position, in native (unscaled) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: usize,
    pub y: usize,
}

impl Coordinate {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Causative addresses per coordinate.
#[derive(Debug, Clone, Default)]
pub struct CausalityMap {
    entries: HashMap<Coordinate, BTreeSet<Address>>,
}

impl CausalityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh query for `coordinate`, discarding any earlier result.
    pub fn begin(&mut self, coordinate: Coordinate) {
        self.entries.insert(coordinate, BTreeSet::new());
    }

    pub fn record(&mut self, coordinate: Coordinate, address: Address) {
        self.entries.entry(coordinate).or_default().insert(address);
    }

    pub fn causes(&self, coordinate: Coordinate) -> Option<&BTreeSet<Address>> {
        self.entries.get(&coordinate)
    }

    pub fn coordinates(&self) -> impl Iterator<Item = Coordinate> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Called after every trial, once RAM is back at the baseline.
pub trait TrialObserver {
    fn on_trial(&mut self, address: Address, value: u8, memory: &[u8]);
}

/// Observer that ignores every trial
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl TrialObserver for NullObserver {
    fn on_trial(&mut self, _address: Address, _value: u8, _memory: &[u8]) {}
}

impl<F: FnMut(Address, u8, &[u8])> TrialObserver for F {
    fn on_trial(&mut self, address: Address, value: u8, memory: &[u8]) {
        self(address, value, memory)
    }
}

/// Outcome of one discovery query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub coordinate: Coordinate,
    /// Pixel after one neutral frame from the baseline
    pub original_pixel: Rgb,
    pub causes: BTreeSet<Address>,
    /// Number of perturb-step-restore cycles run
    pub trials: usize,
}

#[derive(Debug, Clone)]
pub struct CausalDiscoveryEngine {
    neutral_action: Action,
    map: CausalityMap,
}

impl Default for CausalDiscoveryEngine {
    fn default() -> Self {
        Self::new(Action::NOOP)
    }
}

impl CausalDiscoveryEngine {
    pub fn new(neutral_action: Action) -> Self {
        Self {
            neutral_action,
            map: CausalityMap::new(),
        }
    }

    pub fn neutral_action(&self) -> Action {
        self.neutral_action
    }

    pub fn map(&self) -> &CausalityMap {
        &self.map
    }

    /// Addresses whose perturbation changes the pixel at (`x`, `y`).
    pub fn discover<E: Emulator>(
        &mut self,
        emulator: &mut E,
        x: usize,
        y: usize,
    ) -> Result<BTreeSet<Address>, DiscoveryError> {
        self.discover_with(emulator, Coordinate::new(x, y), &mut NullObserver)
            .map(|report| report.causes)
    }

    /// Run a discovery query, reporting every trial to `observer`.
    ///
    /// The emulator must be paused: nothing else may touch it until this
    /// returns. On return RAM equals the baseline captured at the start.
    pub fn discover_with<E: Emulator, O: TrialObserver + ?Sized>(
        &mut self,
        emulator: &mut E,
        coordinate: Coordinate,
        observer: &mut O,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        let (width, height) = emulator.screen_size();
        let out_of_frame = || DiscoveryError::CoordinateOutOfFrame {
            x: coordinate.x,
            y: coordinate.y,
            width,
            height,
        };
        if coordinate.x >= width || coordinate.y >= height {
            return Err(out_of_frame());
        }

        let baseline = MemorySnapshot::capture(emulator);

        emulator.step(self.neutral_action);
        let original_pixel = emulator.screen_rgb().pixel(coordinate.x, coordinate.y);
        restore(emulator, &baseline)?;
        let original_pixel = original_pixel.ok_or_else(out_of_frame)?;

        self.map.begin(coordinate);
        let mut trials = 0;

        for address in 0..baseline.len() {
            for &value in PERTURBATION_VALUES {
                emulator.write_byte(address, value);
                emulator.step(self.neutral_action);
                let new_pixel = emulator.screen_rgb().pixel(coordinate.x, coordinate.y);
                restore(emulator, &baseline)?;
                let new_pixel = new_pixel.ok_or_else(out_of_frame)?;
                trials += 1;
                observer.on_trial(address, value, emulator.memory());

                if new_pixel != original_pixel {
                    debug!(
                        "{coordinate}: address {address} = {value} changes {original_pixel} to {new_pixel}"
                    );
                    self.map.record(coordinate, address);
                    break;
                }
            }
        }

        let causes = self.map.causes(coordinate).cloned().unwrap_or_default();
        info!(
            "{coordinate}: {} causative addresses out of {} ({:?})",
            causes.len(),
            baseline.len(),
            causes
        );

        Ok(DiscoveryReport {
            coordinate,
            original_pixel,
            causes,
            trials,
        })
    }
}

/// Write the baseline back and make sure it took.
fn restore<M: MemoryView + ?Sized>(
    memory: &mut M,
    baseline: &MemorySnapshot,
) -> Result<(), DiscoveryError> {
    baseline.restore(memory)?;
    let Some(address) = baseline.first_difference(memory) else {
        return Ok(());
    };
    let changes = baseline.diff(&MemorySnapshot::capture(memory));
    Err(DiscoveryError::RestoreMismatch { address, changes })
}
