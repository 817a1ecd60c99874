//! Raw encoder units to physical units and back.
//!
//! The drive encoder reports rotations and rotations-per-minute on the motor
//! shaft; the fixed scale factor `wheel_circumference * gear_ratio` maps those
//! to meters and the same factor over 60 maps RPM to m/s. The steering
//! absolute encoder reports a fraction of a turn with an arbitrary zero; a
//! per-module calibration offset brings it to the true mechanical zero.
//!
//! Everything here is pure arithmetic over fixed per-module constants. No
//! error conditions.

use core::f64::consts::TAU;
use strafe_kinematics::angle;

/// Fixed drive-encoder scale factors for one module type.
///
/// The factors are identical across all four modules of a vehicle; one value
/// of this type is shared at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderConversion {
    position_factor: f64,
}

impl EncoderConversion {
    /// Construct from the wheel circumference (m) and the output gear ratio
    /// (wheel rotations per motor rotation).
    pub const fn new(wheel_circumference: f64, gear_ratio: f64) -> Self {
        EncoderConversion {
            position_factor: wheel_circumference * gear_ratio,
        }
    }

    /// Meters of travel per raw rotation.
    pub fn position_factor(&self) -> f64 {
        self.position_factor
    }

    /// Raw encoder rotations to meters of wheel travel.
    pub fn rotations_to_meters(&self, rotations: f64) -> f64 {
        rotations * self.position_factor
    }

    /// Meters of wheel travel back to raw encoder rotations. Inverse of
    /// [`rotations_to_meters`](Self::rotations_to_meters).
    pub fn meters_to_rotations(&self, meters: f64) -> f64 {
        meters / self.position_factor
    }

    /// Raw rotations-per-minute to meters per second.
    pub fn rpm_to_mps(&self, rpm: f64) -> f64 {
        rpm * self.position_factor / 60.0
    }

    /// Meters per second back to raw rotations-per-minute.
    pub fn mps_to_rpm(&self, mps: f64) -> f64 {
        mps * 60.0 / self.position_factor
    }
}

/// Interpret a raw absolute-encoder reading as a calibrated heading.
///
/// `raw_fraction` is a fraction of a full turn (the encoder's duty-cycle
/// output); `calibration_offset` is the fixed angular bias (rad) between the
/// sensor zero and the module's true mechanical zero. Any raw input maps to a
/// valid heading in `(-PI, PI]`.
pub fn absolute_to_heading(raw_fraction: f64, calibration_offset: f64) -> f64 {
    angle::wrap(raw_fraction * TAU - calibration_offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    // 4 in wheel, 6.12:1 reduction — the vehicle this was tuned on
    fn conv() -> EncoderConversion {
        EncoderConversion::new(0.1016 * core::f64::consts::PI, 1.0 / 6.12)
    }

    #[test]
    fn test_position_round_trip() {
        let c = conv();
        for raw in [-12.5, -1.0, 0.0, 0.25, 3.0, 1000.0] {
            let back = c.meters_to_rotations(c.rotations_to_meters(raw));
            assert!((back - raw).abs() < EPSILON * raw.abs().max(1.0));
        }
    }

    #[test]
    fn test_velocity_round_trip() {
        let c = conv();
        for rpm in [-4000.0, -1.0, 0.0, 60.0, 5243.7] {
            let back = c.mps_to_rpm(c.rpm_to_mps(rpm));
            assert!((back - rpm).abs() < EPSILON * rpm.abs().max(1.0));
        }
    }

    #[test]
    fn test_velocity_is_position_over_sixty() {
        let c = conv();
        // 60 RPM is one rotation per second
        assert!((c.rpm_to_mps(60.0) - c.position_factor()).abs() < EPSILON);
    }

    #[test]
    fn test_absolute_heading_subtracts_calibration() {
        // encoder reads a quarter turn, calibration says zero is at 45°
        let heading = absolute_to_heading(0.25, 45.0_f64.to_radians());
        assert!((heading - 45.0_f64.to_radians()).abs() < EPSILON);
    }

    #[test]
    fn test_absolute_heading_total_over_raw_inputs() {
        // out-of-range raw fractions still land in (-PI, PI]
        for raw in [-3.7, -1.0, 0.0, 0.999, 1.0, 27.3] {
            let heading = absolute_to_heading(raw, 1.0);
            assert!(heading > -core::f64::consts::PI - EPSILON);
            assert!(heading <= core::f64::consts::PI + EPSILON);
        }
    }
}
