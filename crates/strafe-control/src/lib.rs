//! Closed-loop control for a four-module swerve drivetrain.
//!
//! This crate owns the per-module control pipeline (unit conversion, angle
//! PID for steering, PID plus feedforward for drive) and the drivetrain
//! coordinator that maps vehicle-level motion onto the four modules. The
//! geometric math lives in `strafe-kinematics`; actual sensors and actuators
//! sit behind the [`module::ModuleIo`] trait.

pub mod conversion;
pub mod drivetrain;
pub mod error;
pub mod feedforward;
pub mod module;
pub mod pid;
pub mod settings;
pub mod tunables;

pub use conversion::EncoderConversion;
pub use drivetrain::SwerveDrive;
pub use error::DriveError;
pub use feedforward::MotorFeedforward;
pub use module::{ModuleIo, SwerveModule};
pub use pid::{AnglePid, Pid};
pub use settings::DriveSettings;
pub use tunables::{Tunable, TunableStore, keys};
