//! Adapter setup and validation.
//!
//! Runs once, synchronously, at load time: selects the kinematics mode,
//! builds the axis mapping from the coordinate string, and creates the
//! extra-joint pins. Any failure is fatal to the load — the host tears the
//! partially initialized component down; nothing is rolled back piecemeal.

use tracing::{info, warn};

use kinsplus_hal::PinRegistry;

use crate::config::AdapterConfig;
use crate::error::SetupError;
use crate::extra::ExtraJoints;
use crate::mapper::{AxisMapping, KinematicsMode};

/// Coordinate string used when none is configured and no extra joints are
/// requested.
pub const DEFAULT_COORDINATES: &str = "XYZABCUVW";

/// The fully initialized adapter: mapping, mode, and extra-joint manager.
///
/// Explicitly created and explicitly threaded through calls — there is no
/// global instance.
#[derive(Debug, Clone)]
pub struct KinsAdapter {
    mapping: AxisMapping,
    mode: KinematicsMode,
    extra: ExtraJoints,
}

impl KinsAdapter {
    /// Build the adapter from a validated configuration.
    ///
    /// Steps, in order:
    /// 1. mode from the `kins_type` selector; forced to `Both` (with a
    ///    warning) whenever extra joints are configured, because the
    ///    extra-joint logic needs the forward path during homing;
    /// 2. empty coordinates default to [`DEFAULT_COORDINATES`] only when no
    ///    extra joints are requested;
    /// 3. the mapping table is built, failing on invalid characters;
    /// 4. extra joints require at least one coordinate letter;
    /// 5. extra-joint slots and pins are created.
    pub fn setup(config: &AdapterConfig, registry: &mut PinRegistry) -> Result<Self, SetupError> {
        // Negative counts are equivalent to zero throughout.
        let extra_joints = config.extra_joints.max(0);

        let mut mode = KinematicsMode::from_selector(config.kins_selector());
        if extra_joints > 0 && mode != KinematicsMode::Both {
            warn!(
                "extra_joints={extra_joints}: forcing kinematics mode Both (configured {mode:?})"
            );
            mode = KinematicsMode::Both;
        }

        let coordinates = if extra_joints == 0 && config.coordinates.is_empty() {
            DEFAULT_COORDINATES
        } else {
            config.coordinates.as_str()
        };

        let mapping = AxisMapping::from_coordinates(coordinates)?;

        if mapping.assigned_count() == 0 && extra_joints > 0 {
            return Err(SetupError::MissingCoordinates {
                extra_joints: extra_joints as usize,
            });
        }

        let extra = ExtraJoints::setup(
            mapping.assigned_count(),
            extra_joints,
            registry,
            &config.name,
        )?;

        info!(
            "adapter '{}' ready: mode={:?}, kinematic joints={}, extra joints={}",
            config.name,
            mode,
            mapping.assigned_count(),
            extra.count()
        );

        Ok(Self {
            mapping,
            mode,
            extra,
        })
    }

    /// The joint ↔ pose mapping.
    #[inline]
    pub fn mapping(&self) -> &AxisMapping {
        &self.mapping
    }

    /// The kinematics mode fixed at setup.
    #[inline]
    pub const fn mode(&self) -> KinematicsMode {
        self.mode
    }

    /// The extra-joint manager.
    #[inline]
    pub fn extra(&self) -> &ExtraJoints {
        &self.extra
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Axis;

    fn config(coordinates: &str, extra_joints: i32, kins_type: &str) -> AdapterConfig {
        AdapterConfig {
            coordinates: coordinates.to_string(),
            extra_joints,
            kins_type: kins_type.to_string(),
            ..AdapterConfig::default()
        }
    }

    #[test]
    fn empty_coordinates_default_to_all_nine_axes() {
        let mut reg = PinRegistry::new();
        let adapter = KinsAdapter::setup(&config("", 0, "1"), &mut reg).unwrap();
        assert_eq!(adapter.mapping().assigned_count(), 9);
        for i in 0..9 {
            assert_eq!(adapter.mapping().axis_of(i), Axis::from_index(i));
        }
        assert_eq!(adapter.mode(), KinematicsMode::Identity);
        assert_eq!(adapter.extra().count(), 0);
        assert!(reg.is_empty());
    }

    #[test]
    fn no_default_coordinates_with_extra_joints() {
        let mut reg = PinRegistry::new();
        let err = KinsAdapter::setup(&config("", 2, "b"), &mut reg).unwrap_err();
        assert!(matches!(err, SetupError::MissingCoordinates { .. }));
        assert!(reg.is_empty());
    }

    #[test]
    fn extra_joints_force_mode_both() {
        let mut reg = PinRegistry::new();
        let adapter = KinsAdapter::setup(&config("XYZ", 1, "1"), &mut reg).unwrap();
        assert_eq!(adapter.mode(), KinematicsMode::Both);
        assert_eq!(adapter.extra().count(), 1);
        assert_eq!(adapter.extra().kinematic_joints(), 3);
        // First extra joint is numbered after the kinematic joints.
        assert!(reg.float_cell("kinsplus.3.prehome-cmd").is_some());
    }

    #[test]
    fn configured_mode_kept_without_extra_joints() {
        let mut reg = PinRegistry::new();
        let adapter = KinsAdapter::setup(&config("XYZ", 0, "f"), &mut reg).unwrap();
        assert_eq!(adapter.mode(), KinematicsMode::ForwardOnly);
    }

    #[test]
    fn negative_extra_joints_same_as_zero() {
        let mut reg = PinRegistry::new();
        let adapter = KinsAdapter::setup(&config("", -4, "1"), &mut reg).unwrap();
        // Default coordinates apply and setup succeeds, exactly as with 0.
        assert_eq!(adapter.mapping().assigned_count(), 9);
        assert_eq!(adapter.extra().count(), 0);
        assert_eq!(adapter.mode(), KinematicsMode::Identity);
    }

    #[test]
    fn invalid_coordinate_character_fails_setup() {
        let mut reg = PinRegistry::new();
        let err = KinsAdapter::setup(&config("XY9", 0, "1"), &mut reg).unwrap_err();
        assert!(matches!(err, SetupError::Coords(_)));
    }

    #[test]
    fn total_joint_count_checked() {
        let mut reg = PinRegistry::new();
        // 15 kinematic + 9 extra > 16 total.
        let err = KinsAdapter::setup(&config("XYZABCUVWXYZABC", 9, "b"), &mut reg).unwrap_err();
        assert!(matches!(err, SetupError::TooManyJoints { .. }));
        assert!(reg.is_empty());
    }
}
