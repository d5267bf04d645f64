//! Pin registry: named cell allocation.
//!
//! The registry is a setup-phase facility. Components create their pins here
//! once at load time; peers (and tests) look cells up by name to wire
//! themselves to the other side of the boundary. Nothing in the registry is
//! touched from the cyclic path — per-cycle code holds the `Arc`'d cells
//! directly through its pin handles.

use std::sync::Arc;

use crate::PIN_NAME_LEN;
use crate::error::HalError;
use crate::pin::{BitCell, BitPin, FloatCell, FloatPin, PinDir};

/// Bounded pin name storage.
type PinName = heapless::String<PIN_NAME_LEN>;

/// The cell behind a registered pin.
#[derive(Debug)]
enum CellSlot {
    Float(Arc<FloatCell>),
    Bit(Arc<BitCell>),
}

/// One registered pin.
#[derive(Debug)]
struct PinEntry {
    name: PinName,
    dir: PinDir,
    cell: CellSlot,
}

/// Registry of uniquely named shared cells.
#[derive(Debug, Default)]
pub struct PinRegistry {
    pins: Vec<PinEntry>,
}

impl PinRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a named float pin. Fails on duplicate or over-length names.
    pub fn new_float(&mut self, name: &str, dir: PinDir) -> Result<FloatPin, HalError> {
        let stored = self.check_name(name)?;
        let cell = Arc::new(FloatCell::default());
        self.pins.push(PinEntry {
            name: stored,
            dir,
            cell: CellSlot::Float(Arc::clone(&cell)),
        });
        Ok(FloatPin::new(cell, dir))
    }

    /// Create a named boolean pin. Fails on duplicate or over-length names.
    pub fn new_bit(&mut self, name: &str, dir: PinDir) -> Result<BitPin, HalError> {
        let stored = self.check_name(name)?;
        let cell = Arc::new(BitCell::default());
        self.pins.push(PinEntry {
            name: stored,
            dir,
            cell: CellSlot::Bit(Arc::clone(&cell)),
        });
        Ok(BitPin::new(cell, dir))
    }

    /// Look up a float cell by name (peer side of the boundary).
    pub fn float_cell(&self, name: &str) -> Option<Arc<FloatCell>> {
        self.pins.iter().find(|p| p.name.as_str() == name).and_then(|p| match &p.cell {
            CellSlot::Float(cell) => Some(Arc::clone(cell)),
            CellSlot::Bit(_) => None,
        })
    }

    /// Look up a boolean cell by name (peer side of the boundary).
    pub fn bit_cell(&self, name: &str) -> Option<Arc<BitCell>> {
        self.pins.iter().find(|p| p.name.as_str() == name).and_then(|p| match &p.cell {
            CellSlot::Bit(cell) => Some(Arc::clone(cell)),
            CellSlot::Float(_) => None,
        })
    }

    /// Direction of a registered pin, if present.
    pub fn pin_dir(&self, name: &str) -> Option<PinDir> {
        self.pins.iter().find(|p| p.name.as_str() == name).map(|p| p.dir)
    }

    /// Number of registered pins.
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// True when no pins have been registered.
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Iterate over registered pin names, in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.pins.iter().map(|p| p.name.as_str())
    }

    fn check_name(&self, name: &str) -> Result<PinName, HalError> {
        let mut stored = PinName::new();
        stored.push_str(name).map_err(|_| HalError::PinNameTooLong {
            name: name.to_string(),
            len: name.len(),
            max: PIN_NAME_LEN,
        })?;
        if self.pins.iter().any(|p| p.name == stored) {
            return Err(HalError::DuplicatePin {
                name: name.to_string(),
            });
        }
        Ok(stored)
    }
}
