//! Open-loop actuation model for the drive motor.
//!
//! Predicts the steady-state voltage for a velocity setpoint from calibrated
//! physical coefficients: `kS` overcomes static friction, `kV` scales with
//! velocity, `kA` with the setpoint's rate of change. The PID term on top of
//! this only has to correct the residual error.

use crate::tunables::Tunable;

/// `kS·sgn(v) + kV·v + kA·v̇` feedforward over a velocity setpoint.
#[derive(Debug)]
pub struct MotorFeedforward {
    ks: Tunable,
    kv: Tunable,
    ka: Tunable,
    prev_setpoint: Option<f64>,
}

impl MotorFeedforward {
    /// Construct from coefficient handles.
    pub fn new(ks: Tunable, kv: Tunable, ka: Tunable) -> Self {
        MotorFeedforward {
            ks,
            kv,
            ka,
            prev_setpoint: None,
        }
    }

    /// Voltage estimate for `velocity` (m/s).
    ///
    /// The acceleration term differentiates consecutive setpoints, so the
    /// first call after construction or [`reset`](Self::reset) carries no
    /// acceleration contribution. A zero setpoint produces no static term;
    /// the wheel is not asked to fight friction it does not need to break.
    pub fn calculate(&mut self, velocity: f64, dt: f64) -> f64 {
        let accel = match self.prev_setpoint {
            Some(prev) if dt > 0.0 => (velocity - prev) / dt,
            _ => 0.0,
        };
        self.prev_setpoint = Some(velocity);

        self.ks.get() * sign(velocity) + self.kv.get() * velocity + self.ka.get() * accel
    }

    /// Forget the previous setpoint.
    pub fn reset(&mut self) {
        self.prev_setpoint = None;
    }
}

/// Sign with a genuine zero at zero, unlike `f64::signum`.
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
