//! Named shared cells ("pins").
//!
//! Each cell is a single-slot mailbox: one designated writer overwrites it
//! every cycle, readers read it at most once per cycle. Writer/reader
//! ordering within a cycle is established by the scheduler's static funct
//! order, never by a lock, so relaxed atomics are sufficient — a reader in
//! the same cycle always runs strictly after its writer on the same thread,
//! and off-thread observers only ever see a whole value.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Pin direction, from the owning component's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDir {
    /// Written by an external peer, read by the owning component.
    In,
    /// Written by the owning component, read by external peers.
    Out,
}

/// Lock-free `f64` mailbox cell.
#[derive(Debug, Default)]
pub struct FloatCell(AtomicU64);

impl FloatCell {
    /// Create a cell holding `value`.
    pub fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    /// Read the current value.
    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Overwrite the value. Only the designated writer may call this.
    #[inline]
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Lock-free boolean mailbox cell.
#[derive(Debug, Default)]
pub struct BitCell(AtomicBool);

impl BitCell {
    /// Create a cell holding `value`.
    pub fn new(value: bool) -> Self {
        Self(AtomicBool::new(value))
    }

    /// Read the current value.
    #[inline]
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Overwrite the value. Only the designated writer may call this.
    #[inline]
    pub fn set(&self, value: bool) {
        self.0.store(value, Ordering::Relaxed);
    }
}

/// Handle to a named float cell, held by the owning component.
///
/// `In` pins are read here and written by a peer; `Out` pins are written
/// here once per cycle.
#[derive(Debug, Clone)]
pub struct FloatPin {
    cell: Arc<FloatCell>,
    dir: PinDir,
}

impl FloatPin {
    pub(crate) fn new(cell: Arc<FloatCell>, dir: PinDir) -> Self {
        Self { cell, dir }
    }

    /// Pin direction as declared at creation.
    #[inline]
    pub fn dir(&self) -> PinDir {
        self.dir
    }

    /// Read the current value.
    #[inline]
    pub fn get(&self) -> f64 {
        self.cell.get()
    }

    /// Write the value. Valid only on `Out` pins — `In` pins belong to an
    /// external writer.
    #[inline]
    pub fn set(&self, value: f64) {
        debug_assert_eq!(self.dir, PinDir::Out, "write to an IN pin");
        self.cell.set(value);
    }
}

/// Handle to a named boolean cell, held by the owning component.
#[derive(Debug, Clone)]
pub struct BitPin {
    cell: Arc<BitCell>,
    dir: PinDir,
}

impl BitPin {
    pub(crate) fn new(cell: Arc<BitCell>, dir: PinDir) -> Self {
        Self { cell, dir }
    }

    /// Pin direction as declared at creation.
    #[inline]
    pub fn dir(&self) -> PinDir {
        self.dir
    }

    /// Read the current value.
    #[inline]
    pub fn get(&self) -> bool {
        self.cell.get()
    }

    /// Write the value. Valid only on `Out` pins.
    #[inline]
    pub fn set(&self, value: bool) {
        debug_assert_eq!(self.dir, PinDir::Out, "write to an IN pin");
        self.cell.set(value);
    }
}
