//! Manual RAM editing for a paused emulator.
//!
//! Holds the interaction state of a RAM view: the selected cell and its typed
//! input, the cells hidden from display, and the candidate cells found by the
//! last discovery query. Drawing is left to the front end.

use std::collections::BTreeSet;

use log::warn;

use crate::Address;
use crate::error::MemoryError;
use crate::memory::MemoryView;

#[derive(Debug, Clone, Default)]
pub struct RamInspector {
    active: Option<Address>,
    input: String,
    hidden: BTreeSet<Address>,
    candidates: BTreeSet<Address>,
}

impl RamInspector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with some cells hidden
    pub fn with_hidden(hidden: impl IntoIterator<Item = Address>) -> Self {
        Self {
            hidden: hidden.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn increment<M: MemoryView + ?Sized>(&self, memory: &mut M, address: Address) -> Result<u8, MemoryError> {
        let value = read(memory, address)?.saturating_add(1);
        memory.try_write_byte(address, value)?;
        Ok(value)
    }

    pub fn decrement<M: MemoryView + ?Sized>(&self, memory: &mut M, address: Address) -> Result<u8, MemoryError> {
        let value = read(memory, address)?.saturating_sub(1);
        memory.try_write_byte(address, value)?;
        Ok(value)
    }

    /// Write a typed value. Values of 256 and above are rejected and the cell
    /// keeps its old value.
    pub fn set_value<M: MemoryView + ?Sized>(
        &self,
        memory: &mut M,
        address: Address,
        value: u32,
    ) -> Result<(), MemoryError> {
        let Ok(byte) = u8::try_from(value) else {
            warn!("rejected value {value} for address {address}");
            return Err(MemoryError::ValueOutOfRange(value));
        };
        memory.try_write_byte(address, byte)
    }

    /// Select a cell for typed input, clearing any pending input.
    pub fn select(&mut self, address: Address, memory_len: usize) -> Result<(), MemoryError> {
        if address >= memory_len {
            return Err(MemoryError::AddressOutOfRange {
                address,
                len: memory_len,
            });
        }
        self.active = Some(address);
        self.input.clear();
        Ok(())
    }

    pub fn active(&self) -> Option<Address> {
        self.active
    }

    /// Pending typed input of the selected cell
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Append a decimal digit. Ignored when no cell is selected.
    pub fn push_digit(&mut self, digit: u8) {
        if self.active.is_none() {
            return;
        }
        if digit > 9 {
            warn!("ignored non-decimal digit {digit}");
            return;
        }
        self.input.push(char::from(b'0' + digit));
    }

    pub fn backspace(&mut self) {
        if self.active.is_some() {
            self.input.pop();
        }
    }

    /// Drop the selection and its input.
    pub fn cancel(&mut self) {
        self.active = None;
        self.input.clear();
    }

    /// Write the typed input to the selected cell and drop the selection.
    ///
    /// Returns the written byte, or `None` if nothing was selected or typed.
    /// The selection is dropped even when the value is rejected.
    pub fn commit<M: MemoryView + ?Sized>(&mut self, memory: &mut M) -> Result<Option<u8>, MemoryError> {
        let active = self.active.take();
        let input = std::mem::take(&mut self.input);
        let Some(address) = active else {
            return Ok(None);
        };
        if input.is_empty() {
            return Ok(None);
        }
        // only digits can be typed, so a parse failure is an overflow
        let value = input.parse::<u32>().unwrap_or(u32::MAX);
        self.set_value(memory, address, value)?;
        Ok(Some(value as u8))
    }

    /// Flip the hidden state of a cell; returns true if it is now hidden.
    pub fn toggle_hidden(&mut self, address: Address) -> bool {
        if self.hidden.remove(&address) {
            false
        } else {
            self.hidden.insert(address);
            true
        }
    }

    pub fn is_hidden(&self, address: Address) -> bool {
        self.hidden.contains(&address)
    }

    /// Hidden cells in ascending order
    pub fn hidden(&self) -> impl Iterator<Item = Address> + '_ {
        self.hidden.iter().copied()
    }

    pub fn set_candidates(&mut self, candidates: BTreeSet<Address>) {
        self.candidates = candidates;
    }

    pub fn candidates(&self) -> &BTreeSet<Address> {
        &self.candidates
    }

    pub fn is_candidate(&self, address: Address) -> bool {
        self.candidates.contains(&address)
    }
}

fn read<M: MemoryView + ?Sized>(memory: &M, address: Address) -> Result<u8, MemoryError> {
    memory.read_byte(address).ok_or(MemoryError::AddressOutOfRange {
        address,
        len: memory.memory_len(),
    })
}
