//! Error types for drivetrain assembly.
//!
//! All construction-time problems are fatal and reported here; once a
//! [`SwerveDrive`](crate::drivetrain::SwerveDrive) exists, every control
//! operation is total over its inputs.

use strafe_kinematics::KinematicsError;
use thiserror::Error;

/// Errors raised while assembling a drivetrain from its settings.
#[derive(Debug, Error, PartialEq)]
pub enum DriveError {
    /// Module geometry that makes the kinematic inversion ill-defined.
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),

    /// A module whose drive and steering actuators share one hardware
    /// identifier. The two axes need two independently configured devices.
    #[error("module `{id}`: drive and steering actuators share identifier {actuator}")]
    DuplicateActuatorId {
        /// The offending module's label.
        id: String,
        /// The identifier assigned to both axes.
        actuator: u8,
    },

    /// One hardware identifier wired to more than one module.
    #[error("actuator identifier {actuator} is assigned to more than one module")]
    SharedActuatorId {
        /// The identifier that appears twice.
        actuator: u8,
    },
}
