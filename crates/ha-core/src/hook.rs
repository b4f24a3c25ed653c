//! Per-frame variant application around the emulator's step.
//!
//! `StepHook` owns the installed variant and its random source. Every frame
//! it computes the variant's writes from current RAM, checks them against the
//! declared targets, writes them, and only then lets the emulator advance.

use log::{debug, info};

use crate::Address;
use crate::emulator::{Action, Emulator, StepResult};
use crate::error::{ConfigError, HookError};
use crate::memory::MemoryView;
use crate::rng::VariantRng;
use crate::rules::Write;
use crate::variant::VariantConfig;

#[derive(Debug, Clone)]
pub struct StepHook {
    variant: VariantConfig,
    rng: VariantRng,
}

impl StepHook {
    /// Hook with no rules installed
    pub fn new(rng: VariantRng) -> Self {
        Self {
            variant: VariantConfig::unmodified(),
            rng,
        }
    }

    pub fn variant(&self) -> &VariantConfig {
        &self.variant
    }

    pub fn rng(&self) -> &VariantRng {
        &self.rng
    }

    /// Replace the active variant. Targets are checked against the memory
    /// length here, not on the first frame.
    pub fn install(&mut self, variant: VariantConfig, memory_len: usize) -> Result<(), ConfigError> {
        variant.check_memory_len(memory_len)?;
        info!(
            "installed variant '{}' ({} rules, seed {}): {}",
            variant.name(),
            variant.rules().len(),
            self.rng.seed(),
            variant.description()
        );
        self.variant = variant;
        Ok(())
    }

    /// Compute and write this frame's variant writes.
    ///
    /// Nothing is written unless every write is valid. Returns the number of
    /// bytes written.
    pub fn apply_to<M: MemoryView + ?Sized>(&mut self, memory: &mut M) -> Result<usize, HookError> {
        if self.variant.is_empty() {
            return Ok(0);
        }
        let writes = self.variant.apply(memory.memory(), &mut self.rng);
        verify_writes(&self.variant, &writes, memory.memory_len())?;
        for write in &writes {
            memory.write_byte(write.address, write.value);
        }
        debug!("{}: wrote {} bytes", self.variant.name(), writes.len());
        Ok(writes.len())
    }
}

/// Every write must target a declared address inside memory.
pub(crate) fn verify_writes(
    variant: &VariantConfig,
    writes: &[Write],
    memory_len: usize,
) -> Result<(), HookError> {
    for &Write { address, .. } in writes {
        check_write(variant, address, memory_len)?;
    }
    Ok(())
}

fn check_write(variant: &VariantConfig, address: Address, memory_len: usize) -> Result<(), HookError> {
    if !variant.declares(address) {
        return Err(HookError::UndeclaredWrite {
            variant: variant.name().into(),
            address,
        });
    }
    if address >= memory_len {
        return Err(HookError::WriteOutOfRange {
            variant: variant.name().into(),
            address,
            len: memory_len,
        });
    }
    Ok(())
}

/// An emulator whose every step goes through a `StepHook`.
#[derive(Debug)]
pub struct HookedEmulator<E: Emulator> {
    emulator: E,
    hook: StepHook,
}

impl<E: Emulator> HookedEmulator<E> {
    pub fn new(emulator: E, rng: VariantRng) -> Self {
        Self {
            emulator,
            hook: StepHook::new(rng),
        }
    }

    /// Install the rule set used for all following frames.
    pub fn apply_variant(&mut self, variant: VariantConfig) -> Result<(), ConfigError> {
        let len = self.emulator.memory_len();
        self.hook.install(variant, len)
    }

    pub fn variant(&self) -> &VariantConfig {
        self.hook.variant()
    }

    /// Apply the variant, then advance one frame with `action`.
    ///
    /// The emulator's result is returned as is. An error means the frame was
    /// not advanced and the episode should be abandoned.
    pub fn hooked_step(&mut self, action: Action) -> Result<StepResult<E::Observation>, HookError> {
        self.hook.apply_to(&mut self.emulator)?;
        Ok(self.emulator.step(action))
    }

    /// Reset the emulator. The variant stays installed and applies again from
    /// the next frame.
    pub fn reset(&mut self) -> E::Observation {
        self.emulator.reset()
    }

    pub fn emulator(&self) -> &E {
        &self.emulator
    }

    pub fn emulator_mut(&mut self) -> &mut E {
        &mut self.emulator
    }

    pub fn into_inner(self) -> E {
        self.emulator
    }
}
