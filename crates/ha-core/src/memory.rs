//! Byte-addressable emulator memory and restore points.
//!
//! `MemoryView` is the only access the framework has to emulator RAM.
//! `MemorySnapshot` is an immutable copy used to restore RAM after
//! experiments, and to diff two points in time.

use serde::{Deserialize, Serialize};

use crate::Address;
use crate::error::MemoryError;

/// Random-access view of the emulator's RAM.
pub trait MemoryView {
    /// Current RAM contents, in address order.
    fn memory(&self) -> &[u8];

    /// Write a single byte. Callers guarantee `address < memory_len()`.
    fn write_byte(&mut self, address: Address, value: u8);

    fn memory_len(&self) -> usize {
        self.memory().len()
    }

    fn read_byte(&self, address: Address) -> Option<u8> {
        self.memory().get(address).copied()
    }

    /// Write a byte after checking the address against the memory length.
    fn try_write_byte(&mut self, address: Address, value: u8) -> Result<(), MemoryError> {
        let len = self.memory_len();
        if address >= len {
            return Err(MemoryError::AddressOutOfRange { address, len });
        }
        self.write_byte(address, value);
        Ok(())
    }
}

impl MemoryView for Vec<u8> {
    fn memory(&self) -> &[u8] {
        self
    }

    fn write_byte(&mut self, address: Address, value: u8) {
        if let Some(cell) = self.get_mut(address) {
            *cell = value;
        }
    }
}

impl<const N: usize> MemoryView for [u8; N] {
    fn memory(&self) -> &[u8] {
        self
    }

    fn write_byte(&mut self, address: Address, value: u8) {
        if let Some(cell) = self.get_mut(address) {
            *cell = value;
        }
    }
}

/// One cell that differs between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteChange {
    pub address: Address,
    pub before: u8,
    pub after: u8,
}

impl core::fmt::Display for ByteChange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[{:3}] {} -> {}", self.address, self.before, self.after)
    }
}

/// Immutable copy of RAM at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    bytes: Box<[u8]>,
}

impl MemorySnapshot {
    /// Copy the current contents of `view`.
    pub fn capture<M: MemoryView + ?Sized>(view: &M) -> Self {
        Self {
            bytes: view.memory().into(),
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into().into_boxed_slice(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, address: Address) -> Option<u8> {
        self.bytes.get(address).copied()
    }

    /// Write every byte of the snapshot back into `view`.
    ///
    /// Fails without writing anything if the lengths differ.
    pub fn restore<M: MemoryView + ?Sized>(&self, view: &mut M) -> Result<(), MemoryError> {
        let found = view.memory_len();
        if found != self.len() {
            return Err(MemoryError::LengthMismatch {
                expected: self.len(),
                found,
            });
        }
        for (address, &value) in self.bytes.iter().enumerate() {
            view.write_byte(address, value);
        }
        Ok(())
    }

    /// True if `view` currently holds exactly these bytes.
    pub fn matches<M: MemoryView + ?Sized>(&self, view: &M) -> bool {
        view.memory() == &*self.bytes
    }

    /// First address where `view` differs from the snapshot, if any.
    ///
    /// A length difference is reported at the shorter length.
    pub fn first_difference<M: MemoryView + ?Sized>(&self, view: &M) -> Option<Address> {
        let current = view.memory();
        self.bytes
            .iter()
            .zip(current)
            .position(|(a, b)| a != b)
            .or_else(|| (current.len() != self.len()).then(|| current.len().min(self.len())))
    }

    /// Cells that differ from `other`, in ascending address order.
    ///
    /// Only the common prefix is compared.
    pub fn diff(&self, other: &MemorySnapshot) -> Vec<ByteChange> {
        self.bytes
            .iter()
            .zip(other.bytes.iter())
            .enumerate()
            .filter(|(_, (before, after))| before != after)
            .map(|(address, (&before, &after))| ByteChange {
                address,
                before,
                after,
            })
            .collect()
    }
}

impl AsRef<[u8]> for MemorySnapshot {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
