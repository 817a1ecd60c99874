#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! This module defines error types that can occur when assembling a set of
//! swerve modules into a drivetrain kinematic model.

use core::fmt;

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for degenerate module geometry.
    /// This variant is returned when two modules are placed at the same mount
    /// point, which makes the kinematic inversion ill-defined.
    DegenerateGeometry(&'static str),
}

impl core::fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::DegenerateGeometry(msg) => {
                write!(f, "Degenerate module geometry: {}", msg)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for KinematicsError {}
