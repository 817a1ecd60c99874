//! In-memory module hardware for the demo runtime.
//!
//! First-order motor model: the drive wheel lags toward the steady-state
//! speed implied by the applied voltage, the steering axis integrates the
//! applied voltage at a fixed rate. Good enough to close both loops and
//! watch the drivetrain settle.

use std::f64::consts::TAU;

use strafe_control::{EncoderConversion, ModuleIo};

/// Steering slew rate per volt of command (rad/s/V).
const TURN_RATE_PER_VOLT: f64 = 4.0;
/// Drive velocity time constant (s).
const DRIVE_TIME_CONSTANT: f64 = 0.15;

pub struct SimModuleIo {
    angle_offset: f64,
    conversion: EncoderConversion,
    heading: f64,
    velocity: f64,
    position: f64,
    turn_volts: f64,
    drive_volts: f64,
    ks: f64,
    kv: f64,
}

impl SimModuleIo {
    pub fn new(angle_offset: f64, conversion: EncoderConversion, ks: f64, kv: f64) -> Self {
        SimModuleIo {
            angle_offset,
            conversion,
            heading: 0.0,
            velocity: 0.0,
            position: 0.0,
            turn_volts: 0.0,
            drive_volts: 0.0,
            ks,
            kv,
        }
    }

    /// Advance the motor model by `dt` seconds using the last commanded
    /// voltages.
    pub fn integrate(&mut self, dt: f64) {
        self.heading += self.turn_volts * TURN_RATE_PER_VOLT * dt;

        let friction = if self.drive_volts > 0.0 {
            self.ks
        } else if self.drive_volts < 0.0 {
            -self.ks
        } else {
            0.0
        };
        let steady_state = (self.drive_volts - friction) / self.kv;
        let alpha = (dt / DRIVE_TIME_CONSTANT).min(1.0);
        self.velocity += (steady_state - self.velocity) * alpha;
        self.position += self.velocity * dt;
    }
}

impl ModuleIo for SimModuleIo {
    fn absolute_angle(&self) -> f64 {
        // the raw encoder reports the uncalibrated angle as a turn fraction
        ((self.heading + self.angle_offset) / TAU).rem_euclid(1.0)
    }

    fn drive_position(&self) -> f64 {
        self.conversion.meters_to_rotations(self.position)
    }

    fn drive_velocity(&self) -> f64 {
        self.conversion.mps_to_rpm(self.velocity)
    }

    fn set_turn_voltage(&mut self, volts: f64) {
        self.turn_volts = volts;
    }

    fn set_drive_voltage(&mut self, volts: f64) {
        self.drive_volts = volts;
    }
}
