//! Identity joint ↔ pose mapping.
//!
//! The mapping table assigns one pose axis per kinematic joint slot, in the
//! order the coordinate letters appeared. Forward and inverse are pure 1:1
//! projections over that table — no coupling, no solving — and both leave
//! unassigned slots in the caller-supplied buffers untouched.

use crate::consts::MAX_JOINTS;
use crate::coords::{CoordinateParser, CoordsError};
use crate::pose::{Axis, Pose};

/// Forward-transform feature flags, per the host kinematics contract.
pub type ForwardFlags = u32;
/// Inverse-transform feature flags, per the host kinematics contract.
pub type InverseFlags = u32;

/// Which transform directions the host may call.
///
/// Fixed at setup and never changed afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KinematicsMode {
    /// Joint and world coordinates are interchangeable.
    Identity = 0,
    /// Only the forward transform is available.
    ForwardOnly = 1,
    /// Only the inverse transform is available.
    InverseOnly = 2,
    /// Both transforms are available.
    Both = 3,
}

impl KinematicsMode {
    /// Map a configuration selector character to a mode.
    ///
    /// `b`/`B` → Both, `f`/`F` → ForwardOnly, `i`/`I` → InverseOnly;
    /// anything else (the documented selector is `1`) → Identity.
    #[inline]
    pub const fn from_selector(selector: char) -> Self {
        match selector {
            'b' | 'B' => Self::Both,
            'f' | 'F' => Self::ForwardOnly,
            'i' | 'I' => Self::InverseOnly,
            _ => Self::Identity,
        }
    }
}

/// Joint-slot → axis mapping table, sized for the whole motion system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisMapping {
    axes: [Option<Axis>; MAX_JOINTS],
    assigned: usize,
}

impl AxisMapping {
    /// Build the table from a coordinate string.
    ///
    /// Axes are assigned to joint slots 0.. in the order their letters
    /// appear; the remaining slots stay unassigned. Letters beyond
    /// `MAX_JOINTS` are ignored. An invalid character is an error.
    pub fn from_coordinates(coordinates: &str) -> Result<Self, CoordsError> {
        let mut axes = [None; MAX_JOINTS];
        let mut parser = CoordinateParser::new(coordinates);
        for slot in axes.iter_mut() {
            match parser.next_axis() {
                Ok(axis) => *slot = Some(axis),
                Err(CoordsError::EndOfCoordinates) => break,
                Err(e) => return Err(e),
            }
        }
        Ok(Self {
            axes,
            assigned: parser.consumed(),
        })
    }

    /// Number of joint slots with an assigned axis — the kinematic joint
    /// count.
    #[inline]
    pub const fn assigned_count(&self) -> usize {
        self.assigned
    }

    /// Axis assigned to a joint slot, if any.
    #[inline]
    pub fn axis_of(&self, joint: usize) -> Option<Axis> {
        self.axes.get(joint).copied().flatten()
    }

    /// Forward transform: joint values → pose.
    ///
    /// Writes `pose[axis] = joints[i]` for every assigned slot; unassigned
    /// slots leave the caller's pose fields untouched. Always succeeds.
    pub fn forward(&self, joints: &[f64; MAX_JOINTS], pose: &mut Pose) {
        for (joint, slot) in self.axes.iter().enumerate() {
            if let Some(axis) = slot {
                pose.set(*axis, joints[joint]);
            }
        }
    }

    /// Inverse transform: pose → joint values.
    ///
    /// Exact mirror of [`forward`](Self::forward); unassigned joint slots
    /// are left untouched. Always succeeds.
    pub fn inverse(&self, pose: &Pose, joints: &mut [f64; MAX_JOINTS]) {
        for (joint, slot) in self.axes.iter().enumerate() {
            if let Some(axis) = slot {
                joints[joint] = pose.get(*axis);
            }
        }
    }

    /// Home transform: forward with both feature-flag scratch values
    /// cleared. Used by the host for homing-related pose queries.
    pub fn home(
        &self,
        joints: &[f64; MAX_JOINTS],
        pose: &mut Pose,
        fflags: &mut ForwardFlags,
        iflags: &mut InverseFlags,
    ) {
        *fflags = 0;
        *iflags = 0;
        self.forward(joints, pose);
    }
}
