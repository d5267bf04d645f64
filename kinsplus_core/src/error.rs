//! Setup error taxonomy.
//!
//! Every variant is detected synchronously during setup and is fatal to the
//! load: the host logs it and tears the component down. The per-cycle path
//! has no error conditions at all.

use thiserror::Error;

use kinsplus_hal::HalError;

use crate::coords::CoordsError;

/// Errors raised while building the adapter at load time.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Total joint count exceeds the motion system maximum.
    #[error("joint count exceeded: {kinematic} kinematic + {extra} extra > max {max}")]
    TooManyJoints {
        /// Kinematic joint count.
        kinematic: usize,
        /// Requested extra joint count (after clamping).
        extra: usize,
        /// Maximum total joints.
        max: usize,
    },

    /// Extra joint count exceeds the fixed slot capacity.
    #[error("extra joint count {requested} exceeds max {max}")]
    TooManyExtraJoints {
        /// Requested extra joint count.
        requested: usize,
        /// Maximum extra joints.
        max: usize,
    },

    /// The coordinate string contained an unrecognized character.
    #[error("coordinates: {0}")]
    Coords(#[from] CoordsError),

    /// Extra joints were requested but no coordinate letters were given.
    #[error("coordinates must be specified when using extra joints (extra_joints={extra_joints})")]
    MissingCoordinates {
        /// Requested extra joint count.
        extra_joints: usize,
    },

    /// Pin creation or funct registration failed.
    #[error(transparent)]
    Hal(#[from] HalError),
}
