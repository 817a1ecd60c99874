//! Deserializable drivetrain settings.
//!
//! These structs carry the fixed physical constants and the tunable defaults
//! for one vehicle; the runtime loads them from `config/default.toml` and
//! hands them to [`SwerveDrive::new`](crate::drivetrain::SwerveDrive::new).
//! After construction the gains live in the tunable store; the settings
//! themselves never change at runtime.

use core::f64::consts::PI;
use serde::Deserialize;
use strafe_kinematics::{MODULE_COUNT, Vec2};

/// PID gains for the steering loop.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    pub ki: f64,
    /// Derivative gain.
    pub kd: f64,
}

/// PID gains plus feedforward coefficients for the drive loop.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DriveGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    pub ki: f64,
    /// Derivative gain.
    pub kd: f64,
    /// Static friction coefficient (V).
    pub ks: f64,
    /// Velocity coefficient (V·s/m).
    pub kv: f64,
    /// Acceleration coefficient (V·s²/m).
    pub ka: f64,
}

/// Per-module geometry and wiring. Fixed at construction.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleSettings {
    /// Identifying label, e.g. "front_left".
    pub id: String,
    /// Mount position relative to vehicle center, forward component (m).
    pub mount_x: f64,
    /// Mount position relative to vehicle center, leftward component (m).
    pub mount_y: f64,
    /// Angular bias between the absolute encoder's zero and the module's
    /// true mechanical zero (degrees, as measured on the vehicle).
    pub angle_offset_degrees: f64,
    /// Hardware identifier of the drive motor controller.
    pub drive_id: u8,
    /// Hardware identifier of the steering motor controller. Must differ
    /// from `drive_id`.
    pub turn_id: u8,
}

impl ModuleSettings {
    /// Mount offset as a vector.
    pub fn mount_offset(&self) -> Vec2 {
        Vec2::new(self.mount_x, self.mount_y)
    }

    /// Calibration offset in radians.
    pub fn angle_offset(&self) -> f64 {
        self.angle_offset_degrees.to_radians()
    }
}

/// Complete drivetrain settings for one vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveSettings {
    /// Nominal control period (s).
    pub period: f64,
    /// Maximum attainable module speed (m/s); tunable default.
    pub max_module_speed: f64,
    /// Module velocity deadband (m/s); tunable default.
    pub velocity_deadband: f64,
    /// Wheel diameter (m).
    pub wheel_diameter: f64,
    /// Output gear ratio, wheel rotations per motor rotation.
    pub gear_ratio: f64,
    /// Steering loop gain defaults.
    pub turn: PidGains,
    /// Drive loop gain and feedforward defaults.
    pub drive: DriveGains,
    /// The four modules, in the fixed drivetrain order.
    pub modules: [ModuleSettings; MODULE_COUNT],
}

impl DriveSettings {
    /// Wheel circumference (m).
    pub fn wheel_circumference(&self) -> f64 {
        self.wheel_diameter * PI
    }
}
