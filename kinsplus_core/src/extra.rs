//! Auxiliary ("extra") joints: pre-home / post-home command switching.
//!
//! Extra joints sit outside the kinematics transform. Their only runtime
//! logic is a per-joint two-state switch, recomputed from the current
//! cycle's pin inputs every period — no state is latched between cycles
//! beyond the externally owned `homed` flag.

use heapless::Vec;

use kinsplus_hal::{BitPin, FloatPin, PinDir, PinRegistry};

use crate::consts::{MAX_EXTRA_JOINTS, MAX_JOINTS};
use crate::error::SetupError;

/// The seven pins of one extra joint.
///
/// Inputs are written by external peers (homing sequencer, motion planner)
/// before this component's update runs in the same cycle; the two outputs
/// are written only here, once per cycle.
#[derive(Debug, Clone)]
struct ExtraJointSlot {
    /// Commanded position before homing (in).
    prehome_cmd: FloatPin,
    /// Commanded position once homed (in).
    posthome_cmd: FloatPin,
    /// Set by the external homing sequencer (in).
    homed: BitPin,
    /// Feedback source before homing (in).
    prehome_fb: FloatPin,
    /// Motor offset applied to the post-home command (in).
    motor_offset: FloatPin,
    /// Motor position command (out).
    motor_pos_cmd: FloatPin,
    /// Motor position feedback (out).
    motor_pos_fb: FloatPin,
}

/// Manager for all extra joints of one component.
#[derive(Debug, Clone)]
pub struct ExtraJoints {
    kinematic_joints: usize,
    slots: Vec<ExtraJointSlot, MAX_EXTRA_JOINTS>,
}

impl ExtraJoints {
    /// Create the extra-joint slots and their pins.
    ///
    /// Extra joints are numbered after the kinematic joints: joint `j =
    /// kinematic_joints + i` gets pins `<name>.<j>.<suffix>`. A negative
    /// `extra_joints` is clamped to zero. Exceeding the total or extra joint
    /// maximum fails before any pin is created; a pin-creation failure
    /// mid-way aborts without rolling back pins already created (the whole
    /// load is abandoned).
    pub fn setup(
        kinematic_joints: usize,
        extra_joints: i32,
        registry: &mut PinRegistry,
        name: &str,
    ) -> Result<Self, SetupError> {
        let extra_joints = extra_joints.max(0) as usize;

        if kinematic_joints + extra_joints > MAX_JOINTS {
            return Err(SetupError::TooManyJoints {
                kinematic: kinematic_joints,
                extra: extra_joints,
                max: MAX_JOINTS,
            });
        }
        if extra_joints > MAX_EXTRA_JOINTS {
            return Err(SetupError::TooManyExtraJoints {
                requested: extra_joints,
                max: MAX_EXTRA_JOINTS,
            });
        }

        let mut slots = Vec::new();
        for i in 0..extra_joints {
            let j = kinematic_joints + i;
            let slot = ExtraJointSlot {
                prehome_cmd: registry.new_float(&format!("{name}.{j}.prehome-cmd"), PinDir::In)?,
                posthome_cmd: registry
                    .new_float(&format!("{name}.{j}.posthome-cmd"), PinDir::In)?,
                homed: registry.new_bit(&format!("{name}.{j}.homed"), PinDir::In)?,
                prehome_fb: registry.new_float(&format!("{name}.{j}.prehome-fb"), PinDir::In)?,
                motor_offset: registry
                    .new_float(&format!("{name}.{j}.motor-offset"), PinDir::In)?,
                motor_pos_cmd: registry
                    .new_float(&format!("{name}.{j}.motor-pos-cmd"), PinDir::Out)?,
                motor_pos_fb: registry
                    .new_float(&format!("{name}.{j}.motor-pos-fb"), PinDir::Out)?,
            };
            slots
                .push(slot)
                .map_err(|_| SetupError::TooManyExtraJoints {
                    requested: extra_joints,
                    max: MAX_EXTRA_JOINTS,
                })?;
        }

        Ok(Self {
            kinematic_joints,
            slots,
        })
    }

    /// Per-cycle update: switch each joint's command/feedback source on its
    /// `homed` flag.
    ///
    /// Homed: `motor-pos-cmd = posthome-cmd + motor-offset` and
    /// `motor-pos-fb = prehome-cmd` (open-loop loopback — the pre-home
    /// command stands in as feedback where no sensor is wired).
    /// Not homed: `motor-pos-cmd = prehome-cmd`, `motor-pos-fb = prehome-fb`.
    ///
    /// Pure function of the current inputs; zero allocation, no failure
    /// path, O(extra joints). The period is part of the funct contract and
    /// unused here.
    pub fn update(&self, _period_ns: i64) {
        for slot in &self.slots {
            if slot.homed.get() {
                slot.motor_pos_cmd
                    .set(slot.posthome_cmd.get() + slot.motor_offset.get());
                slot.motor_pos_fb.set(slot.prehome_cmd.get()); // loopback
            } else {
                slot.motor_pos_cmd.set(slot.prehome_cmd.get());
                slot.motor_pos_fb.set(slot.prehome_fb.get());
            }
        }
    }

    /// Number of extra joints managed.
    #[inline]
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    /// Number of kinematic joints preceding the extra joints.
    #[inline]
    pub const fn kinematic_joints(&self) -> usize {
        self.kinematic_joints
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pins_named_from_component_and_joint_index() {
        let mut reg = PinRegistry::new();
        let extra = ExtraJoints::setup(3, 2, &mut reg, "kins").unwrap();
        assert_eq!(extra.count(), 2);
        assert_eq!(extra.kinematic_joints(), 3);
        // 7 pins per joint, numbered after the kinematic joints.
        assert_eq!(reg.len(), 14);
        assert!(reg.float_cell("kins.3.prehome-cmd").is_some());
        assert!(reg.bit_cell("kins.3.homed").is_some());
        assert!(reg.float_cell("kins.4.motor-pos-fb").is_some());
        assert!(reg.float_cell("kins.2.prehome-cmd").is_none());
        assert_eq!(reg.pin_dir("kins.3.motor-pos-cmd"), Some(PinDir::Out));
        assert_eq!(reg.pin_dir("kins.3.motor-offset"), Some(PinDir::In));
    }

    #[test]
    fn joint_count_over_max_fails_with_no_pins() {
        let mut reg = PinRegistry::new();
        let err = ExtraJoints::setup(MAX_JOINTS - 1, 2, &mut reg, "kins").unwrap_err();
        assert!(matches!(err, SetupError::TooManyJoints { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn negative_count_clamped_to_zero() {
        let mut reg = PinRegistry::new();
        let extra = ExtraJoints::setup(3, -5, &mut reg, "kins").unwrap();
        assert_eq!(extra.count(), 0);
        assert!(reg.is_empty());
        // A zero-joint update is a no-op.
        extra.update(1_000_000);
    }

    #[test]
    fn not_homed_uses_prehome_sources() {
        let mut reg = PinRegistry::new();
        let extra = ExtraJoints::setup(0, 1, &mut reg, "kins").unwrap();

        reg.float_cell("kins.0.prehome-cmd").unwrap().set(1.0);
        reg.float_cell("kins.0.prehome-fb").unwrap().set(2.0);

        extra.update(1_000_000);
        assert_eq!(reg.float_cell("kins.0.motor-pos-cmd").unwrap().get(), 1.0);
        assert_eq!(reg.float_cell("kins.0.motor-pos-fb").unwrap().get(), 2.0);
    }

    #[test]
    fn homed_applies_offset_and_loopback() {
        let mut reg = PinRegistry::new();
        let extra = ExtraJoints::setup(0, 1, &mut reg, "kins").unwrap();

        reg.bit_cell("kins.0.homed").unwrap().set(true);
        reg.float_cell("kins.0.posthome-cmd").unwrap().set(5.0);
        reg.float_cell("kins.0.motor-offset").unwrap().set(0.5);
        reg.float_cell("kins.0.prehome-cmd").unwrap().set(1.0);

        extra.update(1_000_000);
        assert_eq!(reg.float_cell("kins.0.motor-pos-cmd").unwrap().get(), 5.5);
        // Loopback: feedback tracks the pre-home command, not the post-home one.
        assert_eq!(reg.float_cell("kins.0.motor-pos-fb").unwrap().get(), 1.0);
    }

    #[test]
    fn update_is_recomputed_every_cycle() {
        let mut reg = PinRegistry::new();
        let extra = ExtraJoints::setup(0, 1, &mut reg, "kins").unwrap();

        let homed = reg.bit_cell("kins.0.homed").unwrap();
        let prehome_cmd = reg.float_cell("kins.0.prehome-cmd").unwrap();
        let posthome_cmd = reg.float_cell("kins.0.posthome-cmd").unwrap();
        let cmd_out = reg.float_cell("kins.0.motor-pos-cmd").unwrap();

        prehome_cmd.set(1.0);
        extra.update(1_000_000);
        assert_eq!(cmd_out.get(), 1.0);

        homed.set(true);
        posthome_cmd.set(9.0);
        extra.update(1_000_000);
        assert_eq!(cmd_out.get(), 9.0);

        // Flag drops again: back to the pre-home source, nothing latched.
        homed.set(false);
        extra.update(1_000_000);
        assert_eq!(cmd_out.get(), 1.0);
    }

    #[test]
    fn each_joint_switches_independently() {
        let mut reg = PinRegistry::new();
        let extra = ExtraJoints::setup(1, 2, &mut reg, "kins").unwrap();

        reg.float_cell("kins.1.prehome-cmd").unwrap().set(10.0);
        reg.bit_cell("kins.2.homed").unwrap().set(true);
        reg.float_cell("kins.2.posthome-cmd").unwrap().set(20.0);
        reg.float_cell("kins.2.motor-offset").unwrap().set(-1.0);

        extra.update(1_000_000);
        assert_eq!(reg.float_cell("kins.1.motor-pos-cmd").unwrap().get(), 10.0);
        assert_eq!(reg.float_cell("kins.2.motor-pos-cmd").unwrap().get(), 19.0);
    }
}
