//! PID feedback controllers.
//!
//! Gains are [`Tunable`] handles read on every update, so an external tuner
//! can adjust a running loop. The controllers are plain accumulators with no
//! internal clamping; the output contract is a voltage command whose bounds
//! the downstream actuator abstraction enforces. All math is polynomial in
//! the inputs, so badly chosen gains degrade performance but cannot produce
//! NaN on their own.

use strafe_kinematics::angle;

use crate::tunables::Tunable;

/// Textbook PID over a scalar error.
#[derive(Debug)]
pub struct Pid {
    kp: Tunable,
    ki: Tunable,
    kd: Tunable,
    integral: f64,
    prev_error: Option<f64>,
}

impl Pid {
    /// Construct from gain handles.
    pub fn new(kp: Tunable, ki: Tunable, kd: Tunable) -> Self {
        Pid {
            kp,
            ki,
            kd,
            integral: 0.0,
            prev_error: None,
        }
    }

    /// One control step against a setpoint and a measurement.
    ///
    /// `dt` is the elapsed control period in seconds. A non-positive `dt`
    /// skips the integral and derivative terms rather than dividing by zero.
    pub fn update(&mut self, setpoint: f64, measurement: f64, dt: f64) -> f64 {
        self.update_error(setpoint - measurement, dt)
    }

    /// One control step against a precomputed error. Used by [`AnglePid`],
    /// whose error is not a plain subtraction.
    pub fn update_error(&mut self, error: f64, dt: f64) -> f64 {
        let derivative = match self.prev_error {
            Some(prev) if dt > 0.0 => (error - prev) / dt,
            _ => 0.0,
        };
        if dt > 0.0 {
            self.integral += error * dt;
        }
        self.prev_error = Some(error);

        self.kp.get() * error + self.ki.get() * self.integral + self.kd.get() * derivative
    }

    /// Clear the accumulator state. Gains are untouched.
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.prev_error = None;
    }
}

/// PID over headings.
///
/// Headings are continuous angles, so the error must be the wrap-aware
/// shortest angular distance: the error from 350° to 10° is 20°, the same as
/// from −10° to 10°, never 340°. A naive subtraction would make the steering
/// loop unwind full turns.
#[derive(Debug)]
pub struct AnglePid {
    pid: Pid,
}

impl AnglePid {
    /// Construct from gain handles.
    pub fn new(kp: Tunable, ki: Tunable, kd: Tunable) -> Self {
        AnglePid {
            pid: Pid::new(kp, ki, kd),
        }
    }

    /// One control step: drive `current_heading` toward `target_heading`
    /// along the shortest rotation.
    pub fn update(&mut self, target_heading: f64, current_heading: f64, dt: f64) -> f64 {
        let error = angle::shortest_distance(current_heading, target_heading);
        self.pid.update_error(error, dt)
    }

    /// Clear the accumulator state.
    pub fn reset(&mut self) {
        self.pid.reset();
    }
}
