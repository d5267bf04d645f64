//! # kinsplus
//!
//! Kinematics adapter for a machine-motion controller: converts between an
//! ordered joint-position array and a named Cartesian/rotary pose (up to
//! nine axes), and manages auxiliary joints outside the kinematics whose
//! commanded position switches every control cycle between a pre-home and a
//! post-home source.
//!
//! ## Components
//!
//! - [`coords`] — coordinate-letter parser.
//! - [`mapper`] — forward/inverse identity projection over the mapping
//!   table, plus the kinematics mode.
//! - [`extra`] — extra-joint pins and the per-cycle switching update.
//! - [`setup`] — load-time glue and validation producing a [`KinsAdapter`].
//! - [`config`] — TOML configuration consumed by the binary.
//!
//! ## Zero allocation after setup
//!
//! Setup is the only phase that allocates. The mapping table and the
//! extra-joint slots are fixed-size, built once, and the per-cycle update is
//! a total function over pre-allocated shared cells — no locks, no
//! blocking, no failure path.

pub mod config;
pub mod consts;
pub mod coords;
pub mod error;
pub mod extra;
pub mod mapper;
pub mod pose;
pub mod setup;

pub use config::AdapterConfig;
pub use consts::{MAX_EXTRA_JOINTS, MAX_JOINTS};
pub use coords::{CoordinateParser, CoordsError};
pub use error::SetupError;
pub use extra::ExtraJoints;
pub use mapper::{AxisMapping, ForwardFlags, InverseFlags, KinematicsMode};
pub use pose::{Axis, Pose};
pub use setup::{DEFAULT_COORDINATES, KinsAdapter};
