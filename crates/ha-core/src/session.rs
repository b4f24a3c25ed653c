//! Entry point for front ends.
//!
//! A `Session` bundles the hooked emulator, the discovery engine and the RAM
//! inspector, and tracks whether play is paused. Everything runs on the
//! caller's thread; the session is the only writer of emulator RAM.

use std::collections::BTreeSet;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::Address;
use crate::discovery::{CausalDiscoveryEngine, CausalityMap, Coordinate, DiscoveryReport, TrialObserver};
use crate::emulator::{Action, Emulator, StepResult};
use crate::error::{ConfigError, DiscoveryError, HookError};
use crate::hook::HookedEmulator;
use crate::inspector::RamInspector;
use crate::rng::VariantRng;
use crate::variant::VariantConfig;

/// Who is choosing the actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    /// A person at the keyboard; play can be paused
    Human,
    /// A trained policy; play never pauses
    Agent,
}

pub struct Session<E: Emulator> {
    hooked: HookedEmulator<E>,
    engine: CausalDiscoveryEngine,
    inspector: RamInspector,
    mode: RunMode,
    paused: bool,
}

impl<E: Emulator> Session<E> {
    pub fn new(emulator: E, mode: RunMode, rng: VariantRng) -> Self {
        Self {
            hooked: HookedEmulator::new(emulator, rng),
            engine: CausalDiscoveryEngine::default(),
            inspector: RamInspector::new(),
            mode,
            paused: false,
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Toggle pause. Only honored in human mode; returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        match self.mode {
            RunMode::Human => self.paused = !self.paused,
            RunMode::Agent => warn!("pause requested in agent mode, ignored"),
        }
        self.paused
    }

    pub fn apply_variant(&mut self, variant: VariantConfig) -> Result<(), ConfigError> {
        self.hooked.apply_variant(variant)
    }

    pub fn variant(&self) -> &VariantConfig {
        self.hooked.variant()
    }

    /// Apply the variant and advance one frame, paused or not.
    pub fn hooked_step(&mut self, action: Action) -> Result<StepResult<E::Observation>, HookError> {
        self.hooked.hooked_step(action)
    }

    /// Advance one frame unless paused.
    pub fn advance(&mut self, action: Action) -> Result<Option<StepResult<E::Observation>>, HookError> {
        if self.paused {
            return Ok(None);
        }
        self.hooked_step(action).map(Some)
    }

    /// Restart the episode. The variant stays installed.
    pub fn reset(&mut self) -> E::Observation {
        self.inspector.cancel();
        self.hooked.reset()
    }

    /// Full emulator snapshot; only taken while paused.
    pub fn save_state(&self) -> Option<E::State> {
        if !self.paused {
            warn!("state can only be saved while paused");
            return None;
        }
        Some(self.hooked.emulator().clone_state())
    }

    pub fn load_state(&mut self, state: &E::State) {
        self.hooked.emulator_mut().restore_state(state);
        info!("emulator state restored");
    }

    /// RAM cells that drive the pixel at (`x`, `y`).
    ///
    /// Runs against the raw emulator, without the variant hook. The result
    /// becomes the inspector's candidate set.
    pub fn discover_causes(&mut self, x: usize, y: usize) -> Result<BTreeSet<Address>, DiscoveryError> {
        let causes = self.engine.discover(self.hooked.emulator_mut(), x, y)?;
        self.inspector.set_candidates(causes.clone());
        Ok(causes)
    }

    /// Like `discover_causes`, reporting progress to `observer`.
    pub fn discover_with<O: TrialObserver + ?Sized>(
        &mut self,
        coordinate: Coordinate,
        observer: &mut O,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        let report = self
            .engine
            .discover_with(self.hooked.emulator_mut(), coordinate, observer)?;
        self.inspector.set_candidates(report.causes.clone());
        Ok(report)
    }

    pub fn causality(&self) -> &CausalityMap {
        self.engine.map()
    }

    pub fn inspector(&self) -> &RamInspector {
        &self.inspector
    }

    /// Inspector together with the emulator RAM it edits
    pub fn inspect(&mut self) -> (&mut RamInspector, &mut E) {
        (&mut self.inspector, self.hooked.emulator_mut())
    }

    pub fn emulator(&self) -> &E {
        self.hooked.emulator()
    }

    pub fn hooked(&mut self) -> &mut HookedEmulator<E> {
        &mut self.hooked
    }
}
