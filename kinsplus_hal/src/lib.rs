//! # kinsplus HAL services
//!
//! Host-side services the kinematics adapter relies on:
//!
//! - **Pins** (`pin`, `registry`): uniquely named shared cells with a single
//!   designated writer, used as the boundary between the adapter and its
//!   real-time peers. Allocation happens only during setup; per-cycle code
//!   touches pre-allocated cells only.
//! - **Cyclic scheduler** (`thread`): a fixed-period thread that invokes
//!   registered functions in registration order every cycle. Registration
//!   order is the only cross-component ordering guarantee — there are no
//!   locks on the pin boundary.
//!
//! With the `rt` feature the scheduler uses `clock_nanosleep(TIMER_ABSTIME)`
//! and exposes the full RT setup sequence (mlockall, stack prefault, CPU
//! affinity, SCHED_FIFO). Without it, all RT calls are no-ops and the loop
//! paces itself with `std::thread::sleep`.

pub mod error;
pub mod pin;
pub mod registry;
pub mod thread;

pub use error::HalError;
pub use pin::{BitCell, BitPin, FloatCell, FloatPin, PinDir};
pub use registry::PinRegistry;
pub use thread::{CyclicThread, TimingStats};

/// Maximum pin-name length, including separators and the joint index.
pub const PIN_NAME_LEN: usize = 48;
