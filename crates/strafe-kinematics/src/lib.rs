#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for four-module swerve drivetrain kinematics."]
#![doc = ""]
#![doc = "This crate provides the value types, angle math, shortest-rotation module"]
#![doc = "optimization, and forward/inverse kinematics for an independently steered"]
#![doc = "four-wheel drivetrain."]

use core::f64::consts::{FRAC_PI_2, PI};
use core::fmt;
use libm::{atan2, cos, fabs, hypot, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod angle;
pub mod error;
pub use error::KinematicsError;

/// Number of modules on the drivetrain. Fixed: one per corner.
pub const MODULE_COUNT: usize = 4;

/// A 2-D vector `(x, y)` in meters, used for module mount offsets relative to
/// the vehicle center (+x forward, +y left).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    /// Forward component (m).
    pub x: f64,
    /// Leftward component (m).
    pub y: f64,
}

impl Vec2 {
    /// Construct a new vector.
    pub const fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    /// Euclidean length of the vector (m).
    pub fn norm(&self) -> f64 {
        hypot(self.x, self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}) m", self.x, self.y)
    }
}

/// The commanded or measured state of one swerve module.
///
/// `heading` is a continuous angle: any real value is valid and is interpreted
/// modulo a full turn. The value is immutable; a new state replaces the old
/// one wholesale.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModuleState {
    /// Signed wheel speed along the module heading (m/s).
    pub speed: f64,
    /// Steering angle (rad), counter-clockwise from vehicle forward.
    pub heading: f64,
}

impl ModuleState {
    /// Construct a new module state.
    ///
    /// # Arguments
    ///
    /// * `speed`: Signed wheel speed in m/s.
    /// * `heading`: Steering angle in radians.
    pub const fn new(speed: f64, heading: f64) -> Self {
        ModuleState { speed, heading }
    }

    /// Pick the equivalent target state that requires the least steering
    /// rotation from `current_heading`.
    ///
    /// If the wrapped angular difference between the desired heading and the
    /// current heading exceeds 90°, the heading is flipped by 180° and the
    /// speed negated; the two together describe the same physical motion. The
    /// steering loop is therefore never asked to rotate more than 90°.
    ///
    /// Total over all real-valued inputs, and a fixed point: optimizing an
    /// already-optimized state against the same current heading returns it
    /// unchanged.
    ///
    /// # Arguments
    ///
    /// * `current_heading`: The module's measured heading in radians.
    ///
    /// # Returns
    ///
    /// The optimized target state.
    pub fn optimize(self, current_heading: f64) -> ModuleState {
        let delta = angle::shortest_distance(current_heading, self.heading);
        if fabs(delta) > FRAC_PI_2 {
            ModuleState {
                speed: -self.speed,
                heading: angle::wrap(self.heading + PI),
            }
        } else {
            self
        }
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2} m/s @ {:.1}°)", self.speed, self.heading.to_degrees())
    }
}

/// The cumulative travel of one swerve module: drive distance plus heading.
/// Consumed by an odometry collaborator; the drivetrain only reports it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ModulePosition {
    /// Cumulative drive distance (m).
    pub distance: f64,
    /// Steering angle (rad).
    pub heading: f64,
}

impl ModulePosition {
    /// Construct a new module position.
    pub const fn new(distance: f64, heading: f64) -> Self {
        ModulePosition { distance, heading }
    }
}

/// Vehicle-level motion: translation plus rotation rate, in the body frame.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ChassisSpeeds {
    /// Forward velocity (m/s).
    pub vx: f64,
    /// Leftward velocity (m/s).
    pub vy: f64,
    /// Counter-clockwise rotation rate (rad/s).
    pub omega: f64,
}

impl ChassisSpeeds {
    /// Construct new chassis speeds.
    ///
    /// # Arguments
    ///
    /// * `vx`: Forward velocity (m/s).
    /// * `vy`: Leftward velocity (m/s).
    /// * `omega`: Counter-clockwise rotation rate (rad/s).
    pub const fn new(vx: f64, vy: f64, omega: f64) -> Self {
        ChassisSpeeds { vx, vy, omega }
    }
}

impl fmt::Display for ChassisSpeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(vx: {:.2} m/s, vy: {:.2} m/s, ω: {:.2} rad/s)",
            self.vx, self.vy, self.omega
        )
    }
}

/// Minimum separation between two module mount points (m). Anything closer is
/// rejected as degenerate.
const MIN_MOUNT_SEPARATION: f64 = 1e-9;

/// Swerve drivetrain kinematics helper.
///
/// This struct encapsulates the fixed mount offsets of the four modules and
/// provides the mapping between vehicle-level motion and per-module states.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwerveKinematics {
    /// Module mount offsets relative to vehicle center, in fixed order.
    offsets: [Vec2; MODULE_COUNT],
}

impl SwerveKinematics {
    /// Construct a new swerve kinematics helper.
    ///
    /// The order of `offsets` fixes the module order for every per-module
    /// array this struct produces or consumes.
    ///
    /// # Arguments
    ///
    /// * `offsets`: Mount positions of the four modules relative to the
    ///   vehicle center, in meters.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::DegenerateGeometry)` if two modules
    /// share a mount point, which would make the kinematic inversion
    /// ill-defined.
    pub fn new(offsets: [Vec2; MODULE_COUNT]) -> Result<Self, KinematicsError> {
        for i in 0..MODULE_COUNT {
            for j in (i + 1)..MODULE_COUNT {
                let dx = offsets[i].x - offsets[j].x;
                let dy = offsets[i].y - offsets[j].y;
                if hypot(dx, dy) < MIN_MOUNT_SEPARATION {
                    return Err(KinematicsError::DegenerateGeometry(
                        "two modules share a mount point",
                    ));
                }
            }
        }
        Ok(SwerveKinematics { offsets })
    }

    /// Returns the module mount offsets.
    pub fn offsets(&self) -> &[Vec2; MODULE_COUNT] {
        &self.offsets
    }

    /// Calculates the per-module states that realize the given chassis
    /// speeds. This is the inverse kinematics problem.
    ///
    /// Each module's velocity is the chassis translation plus the rotational
    /// contribution `ω × r` at its mount point; the module state is the polar
    /// form of that vector. A module with zero velocity reports heading 0.
    ///
    /// The returned states are not yet optimized against any current heading;
    /// that is the module controller's job.
    ///
    /// # Arguments
    ///
    /// * `speeds`: The desired vehicle translation and rotation rate.
    ///
    /// # Returns
    ///
    /// One state per module, in mount-offset order.
    pub fn inverse(&self, speeds: ChassisSpeeds) -> [ModuleState; MODULE_COUNT] {
        let mut states = [ModuleState::default(); MODULE_COUNT];
        for (state, offset) in states.iter_mut().zip(self.offsets.iter()) {
            let vx = speeds.vx - speeds.omega * offset.y;
            let vy = speeds.vy + speeds.omega * offset.x;
            *state = ModuleState {
                speed: hypot(vx, vy),
                heading: atan2(vy, vx),
            };
        }
        states
    }

    /// Calculates the chassis speeds implied by the given module states.
    /// This is the forward kinematics problem, used to feed odometry.
    ///
    /// With four modules the per-module velocity constraints overdetermine
    /// the three chassis degrees of freedom, so this solves the normal
    /// equations (least squares). The 3×3 system is always solvable once the
    /// constructor has rejected degenerate geometry.
    ///
    /// # Arguments
    ///
    /// * `states`: Measured module states, in mount-offset order.
    ///
    /// # Returns
    ///
    /// The best-fit vehicle translation and rotation rate.
    pub fn forward(&self, states: &[ModuleState; MODULE_COUNT]) -> ChassisSpeeds {
        let (mut bx, mut by, mut bw) = (0.0, 0.0, 0.0);
        let (mut sx, mut sy, mut srr) = (0.0, 0.0, 0.0);
        for (state, offset) in states.iter().zip(self.offsets.iter()) {
            let vx = state.speed * cos(state.heading);
            let vy = state.speed * sin(state.heading);
            bx += vx;
            by += vy;
            bw += offset.x * vy - offset.y * vx;
            sx += offset.x;
            sy += offset.y;
            srr += offset.x * offset.x + offset.y * offset.y;
        }

        // Normal equations M * [vx, vy, ω]ᵀ = b for the stacked constraints
        // vx_i = vx - ω·y_i, vy_i = vy + ω·x_i.
        let n = MODULE_COUNT as f64;
        let m = [[n, 0.0, -sy], [0.0, n, sx], [-sy, sx, srr]];
        let det = det3(&m);

        let mx = [[bx, 0.0, -sy], [by, n, sx], [bw, sx, srr]];
        let my = [[n, bx, -sy], [0.0, by, sx], [-sy, bw, srr]];
        let mw = [[n, 0.0, bx], [0.0, n, by], [-sy, sx, bw]];

        ChassisSpeeds {
            vx: det3(&mx) / det,
            vy: det3(&my) / det,
            omega: det3(&mw) / det,
        }
    }
}

impl fmt::Display for SwerveKinematics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SwerveKinematics [{}, {}, {}, {}]",
            self.offsets[0], self.offsets[1], self.offsets[2], self.offsets[3]
        )
    }
}

/// Determinant of a 3×3 matrix given in row-major order.
fn det3(m: &[[f64; 3]; 3]) -> f64 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

/// Uniformly scales module speeds down so that none exceeds `max_speed`.
///
/// Inverse kinematics can ask individual wheels for more speed than the
/// hardware has; scaling all four together preserves the direction of travel
/// instead of distorting it. Headings and the relative speed ratios are
/// unchanged. A non-positive `max_speed` leaves the states untouched.
///
/// # Arguments
///
/// * `states`: Module states to rescale in place.
/// * `max_speed`: The attainable module speed limit (m/s).
pub fn desaturate(states: &mut [ModuleState; MODULE_COUNT], max_speed: f64) {
    if max_speed <= 0.0 {
        return;
    }
    let mut highest = 0.0;
    for state in states.iter() {
        let s = fabs(state.speed);
        if s > highest {
            highest = s;
        }
    }
    if highest > max_speed {
        let scale = max_speed / highest;
        for state in states.iter_mut() {
            state.speed *= scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    /// 0.6 m square frame, offsets in (FL, FR, BL, BR) order.
    fn square_offsets() -> [Vec2; MODULE_COUNT] {
        [
            Vec2::new(0.3, 0.3),
            Vec2::new(0.3, -0.3),
            Vec2::new(-0.3, 0.3),
            Vec2::new(-0.3, -0.3),
        ]
    }

    #[test]
    fn test_constructor_accepts_square_frame() {
        let kinematics = SwerveKinematics::new(square_offsets()).unwrap();
        assert_eq!(kinematics.offsets()[1], Vec2::new(0.3, -0.3));
    }

    #[test]
    fn test_constructor_rejects_duplicate_mounts() {
        let offsets = [
            Vec2::new(0.3, 0.3),
            Vec2::new(0.3, 0.3), // duplicate
            Vec2::new(-0.3, 0.3),
            Vec2::new(-0.3, -0.3),
        ];
        let result = SwerveKinematics::new(offsets);
        assert!(matches!(
            result,
            Err(KinematicsError::DegenerateGeometry("two modules share a mount point"))
        ));
    }

    #[test]
    fn test_inverse_straight_line() {
        // (1.0 m/s forward, no strafe, no rotation) must command all four
        // modules to identical (1.0 m/s, 0°) regardless of mount offsets.
        let kinematics = SwerveKinematics::new(square_offsets()).unwrap();
        let states = kinematics.inverse(ChassisSpeeds::new(1.0, 0.0, 0.0));
        for state in states.iter() {
            assert!((state.speed - 1.0).abs() < EPSILON);
            assert!(state.heading.abs() < EPSILON);
        }
    }

    #[test]
    fn test_inverse_pure_strafe() {
        let kinematics = SwerveKinematics::new(square_offsets()).unwrap();
        let states = kinematics.inverse(ChassisSpeeds::new(0.0, 0.5, 0.0));
        for state in states.iter() {
            assert!((state.speed - 0.5).abs() < EPSILON);
            assert!((state.heading - core::f64::consts::FRAC_PI_2).abs() < EPSILON);
        }
    }

    #[test]
    fn test_inverse_rotation_in_place() {
        // Pure rotation: each heading perpendicular to its mount offset,
        // speed proportional to the module's distance from center.
        let kinematics = SwerveKinematics::new(square_offsets()).unwrap();
        let omega = 2.0;
        let states = kinematics.inverse(ChassisSpeeds::new(0.0, 0.0, omega));
        for (state, offset) in states.iter().zip(kinematics.offsets().iter()) {
            assert!((state.speed - omega * offset.norm()).abs() < EPSILON);
            // velocity (−ωy, ωx) · offset (x, y) == 0
            let dot = cos(state.heading) * offset.x + sin(state.heading) * offset.y;
            assert!(dot.abs() < EPSILON);
        }
    }

    #[test]
    fn test_inverse_rotation_speed_scales_with_radius() {
        // Modules at different radii see proportionally different speeds.
        let offsets = [
            Vec2::new(0.2, 0.2),
            Vec2::new(0.4, -0.4),
            Vec2::new(-0.2, 0.2),
            Vec2::new(-0.4, -0.4),
        ];
        let kinematics = SwerveKinematics::new(offsets).unwrap();
        let states = kinematics.inverse(ChassisSpeeds::new(0.0, 0.0, 1.5));
        assert!((states[1].speed / states[0].speed - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_forward_inverts_inverse() {
        let kinematics = SwerveKinematics::new(square_offsets()).unwrap();
        let speeds = ChassisSpeeds::new(1.2, -0.4, 0.8);
        let states = kinematics.inverse(speeds);
        let recovered = kinematics.forward(&states);
        assert!((recovered.vx - speeds.vx).abs() < 1e-6);
        assert!((recovered.vy - speeds.vy).abs() < 1e-6);
        assert!((recovered.omega - speeds.omega).abs() < 1e-6);
    }

    #[test]
    fn test_forward_inverts_inverse_asymmetric_frame() {
        // Offsets that do not sum to zero exercise the full 3×3 solve.
        let offsets = [
            Vec2::new(0.5, 0.2),
            Vec2::new(0.4, -0.3),
            Vec2::new(-0.2, 0.3),
            Vec2::new(-0.3, -0.2),
        ];
        let kinematics = SwerveKinematics::new(offsets).unwrap();
        let speeds = ChassisSpeeds::new(-0.7, 0.9, -1.3);
        let recovered = kinematics.forward(&kinematics.inverse(speeds));
        assert!((recovered.vx - speeds.vx).abs() < 1e-6);
        assert!((recovered.vy - speeds.vy).abs() < 1e-6);
        assert!((recovered.omega - speeds.omega).abs() < 1e-6);
    }

    #[test]
    fn test_optimize_keeps_near_target() {
        // current=5°, desired=8°: difference 3° ≤ 90°, nothing changes
        let desired = ModuleState::new(2.0, 8.0_f64.to_radians());
        let optimized = desired.optimize(5.0_f64.to_radians());
        assert_eq!(optimized, desired);
    }

    #[test]
    fn test_optimize_flips_far_target() {
        // current=0°, desired=170°: flipped to −10° with speed negated
        let desired = ModuleState::new(2.0, 170.0_f64.to_radians());
        let optimized = desired.optimize(0.0);
        assert!((optimized.heading - (-10.0_f64).to_radians()).abs() < EPSILON);
        assert!((optimized.speed - -2.0).abs() < EPSILON);
    }

    #[test]
    fn test_optimize_never_exceeds_quarter_turn() {
        // sweep desired/current pairs: optimized difference magnitude ≤ 90°
        let mut desired_deg = -540.0;
        while desired_deg <= 540.0 {
            let mut current_deg = -540.0;
            while current_deg <= 540.0 {
                let current = (current_deg as f64).to_radians();
                let state = ModuleState::new(1.0, (desired_deg as f64).to_radians());
                let optimized = state.optimize(current);
                let delta = angle::shortest_distance(current, optimized.heading);
                assert!(
                    delta.abs() <= FRAC_PI_2 + EPSILON,
                    "optimized delta {}° for desired {}° current {}°",
                    delta.to_degrees(),
                    desired_deg,
                    current_deg
                );
                current_deg += 7.0;
            }
            desired_deg += 7.0;
        }
    }

    #[test]
    fn test_optimize_flip_is_exactly_half_turn() {
        // a flipped heading differs from the raw desired one by 180° (mod 360°)
        let desired = ModuleState::new(1.5, 130.0_f64.to_radians());
        let optimized = desired.optimize(-60.0_f64.to_radians());
        assert!((optimized.speed - -1.5).abs() < EPSILON);
        let separation = angle::shortest_distance(desired.heading, optimized.heading);
        assert!((separation.abs() - PI).abs() < EPSILON);
    }

    #[test]
    fn test_optimize_is_idempotent() {
        let current = 20.0_f64.to_radians();
        let desired = ModuleState::new(3.0, 160.0_f64.to_radians());
        let once = desired.optimize(current);
        let twice = once.optimize(current);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_optimize_exact_quarter_turn_not_flipped() {
        let desired = ModuleState::new(1.0, 90.0_f64.to_radians());
        let optimized = desired.optimize(0.0);
        assert_eq!(optimized, desired);
    }

    #[test]
    fn test_desaturate_scales_uniformly() {
        let mut states = [
            ModuleState::new(4.0, 0.0),
            ModuleState::new(8.0, 1.0),
            ModuleState::new(-2.0, 2.0),
            ModuleState::new(6.0, 3.0),
        ];
        desaturate(&mut states, 4.0);
        // everything halves; headings untouched
        assert!((states[0].speed - 2.0).abs() < EPSILON);
        assert!((states[1].speed - 4.0).abs() < EPSILON);
        assert!((states[2].speed - -1.0).abs() < EPSILON);
        assert!((states[3].speed - 3.0).abs() < EPSILON);
        assert!((states[1].heading - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_desaturate_noop_under_limit() {
        let mut states = [
            ModuleState::new(1.0, 0.0),
            ModuleState::new(-1.5, 0.5),
            ModuleState::new(0.5, 1.0),
            ModuleState::new(2.0, 1.5),
        ];
        let before = states;
        desaturate(&mut states, 5.0);
        assert_eq!(states, before);
    }
}
