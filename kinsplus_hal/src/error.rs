//! Error types for HAL services.

use thiserror::Error;

/// Errors raised by pin allocation or scheduler registration.
///
/// All of these occur during setup only; the per-cycle path has no failure
/// modes.
#[derive(Error, Debug)]
pub enum HalError {
    /// A pin with this name was already created.
    #[error("pin already exists: {name}")]
    DuplicatePin {
        /// Requested pin name.
        name: String,
    },

    /// Pin name exceeds the fixed name capacity.
    #[error("pin name too long: {name} ({len} > {max} chars)")]
    PinNameTooLong {
        /// Requested pin name.
        name: String,
        /// Actual length.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// A funct with this name was already registered on the thread.
    #[error("funct already registered: {name}")]
    DuplicateFunct {
        /// Requested funct name.
        name: String,
    },

    /// RT system call failed during setup or loop pacing.
    #[error("RT setup error: {0}")]
    RtSetup(String),
}
