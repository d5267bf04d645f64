//! Compile-time limits of the motion system.

use static_assertions::const_assert;

/// Maximum joints the motion system supports, kinematic and extra combined.
pub const MAX_JOINTS: usize = 16;

/// Maximum auxiliary (extra) joints.
pub const MAX_EXTRA_JOINTS: usize = 9;

const_assert!(MAX_EXTRA_JOINTS <= MAX_JOINTS);
