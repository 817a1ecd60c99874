//! One swerve module: sensors in, voltages out.
//!
//! [`SwerveModule`] owns the steering and drive closed loops for a single
//! wheel. Hardware sits behind [`ModuleIo`]: one production implementation
//! per motor-controller vendor, plus in-memory implementations for tests and
//! simulation. The module never validates sensor readings; it computes with
//! whatever the hardware layer reports, and staleness detection belongs to
//! that layer.

use strafe_kinematics::{ModulePosition, ModuleState, Vec2};

use crate::conversion::{EncoderConversion, absolute_to_heading};
use crate::feedforward::MotorFeedforward;
use crate::pid::{AnglePid, Pid};
use crate::settings::{DriveSettings, ModuleSettings};
use crate::tunables::{TunableStore, keys};

/// Raw sensor access and actuation for one physical module.
///
/// Readings are the latest snapshot the hardware layer holds; calls must not
/// block. Voltages are commands for the current control cycle; bounding them
/// to what the hardware tolerates is the implementor's responsibility.
pub trait ModuleIo {
    /// Steering absolute-encoder reading, as a fraction of a full turn.
    fn absolute_angle(&self) -> f64;
    /// Drive encoder position, in raw rotations.
    fn drive_position(&self) -> f64;
    /// Drive encoder velocity, in raw rotations per minute.
    fn drive_velocity(&self) -> f64;
    /// Command the steering motor voltage for this cycle.
    fn set_turn_voltage(&mut self, volts: f64);
    /// Command the drive motor voltage for this cycle.
    fn set_drive_voltage(&mut self, volts: f64);
}

/// Closed-loop controller for one module.
pub struct SwerveModule<Io> {
    id: String,
    mount_offset: Vec2,
    angle_offset: f64,
    conversion: EncoderConversion,
    turn_controller: AnglePid,
    drive_controller: Pid,
    drive_feedforward: MotorFeedforward,
    target: ModuleState,
    io: Io,
}

impl<Io: ModuleIo> SwerveModule<Io> {
    /// Build a module controller.
    ///
    /// Gain tunables are registered in (or fetched from) `tunables` under the
    /// shared `swerve/...` names, so all four modules of a drivetrain read
    /// the same cells.
    pub fn new(
        module: &ModuleSettings,
        drive: &DriveSettings,
        tunables: &TunableStore,
        io: Io,
    ) -> Self {
        let turn_controller = AnglePid::new(
            tunables.entry(keys::TURN_KP, drive.turn.kp),
            tunables.entry(keys::TURN_KI, drive.turn.ki),
            tunables.entry(keys::TURN_KD, drive.turn.kd),
        );
        let drive_controller = Pid::new(
            tunables.entry(keys::DRIVE_KP, drive.drive.kp),
            tunables.entry(keys::DRIVE_KI, drive.drive.ki),
            tunables.entry(keys::DRIVE_KD, drive.drive.kd),
        );
        let drive_feedforward = MotorFeedforward::new(
            tunables.entry(keys::DRIVE_KS, drive.drive.ks),
            tunables.entry(keys::DRIVE_KV, drive.drive.kv),
            tunables.entry(keys::DRIVE_KA, drive.drive.ka),
        );

        SwerveModule {
            id: module.id.clone(),
            mount_offset: module.mount_offset(),
            angle_offset: module.angle_offset(),
            conversion: EncoderConversion::new(drive.wheel_circumference(), drive.gear_ratio),
            turn_controller,
            drive_controller,
            drive_feedforward,
            target: ModuleState::default(),
            io,
        }
    }

    /// The module's identifying label.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Mount position relative to the vehicle center.
    pub fn mount_offset(&self) -> Vec2 {
        self.mount_offset
    }

    /// Calibrated steering heading from the latest sensor snapshot (rad).
    pub fn heading(&self) -> f64 {
        absolute_to_heading(self.io.absolute_angle(), self.angle_offset)
    }

    /// Drive velocity from the latest sensor snapshot (m/s).
    pub fn velocity(&self) -> f64 {
        self.conversion.rpm_to_mps(self.io.drive_velocity())
    }

    /// Measured state: drive velocity plus heading.
    pub fn state(&self) -> ModuleState {
        ModuleState::new(self.velocity(), self.heading())
    }

    /// Cumulative drive distance plus heading, for the odometry consumer.
    pub fn position(&self) -> ModulePosition {
        ModulePosition::new(
            self.conversion.rotations_to_meters(self.io.drive_position()),
            self.heading(),
        )
    }

    /// The last commanded target, after optimization.
    pub fn target(&self) -> ModuleState {
        self.target
    }

    /// Store a new target, optimized against the current measured heading so
    /// the steering loop never has to rotate more than 90°. No actuation
    /// happens until the next [`step`](Self::step).
    pub fn set_desired_state(&mut self, desired: ModuleState) {
        self.target = desired.optimize(self.heading());
    }

    /// Run exactly one control cycle: wrap-aware PID on the steering axis,
    /// PID plus feedforward on the drive axis, both emitted as voltage
    /// commands to the hardware layer.
    pub fn step(&mut self, dt: f64) {
        let turn_volts = self
            .turn_controller
            .update(self.target.heading, self.heading(), dt);

        let drive_volts = self
            .drive_controller
            .update(self.target.speed, self.velocity(), dt)
            + self.drive_feedforward.calculate(self.target.speed, dt);

        self.io.set_turn_voltage(turn_volts);
        self.io.set_drive_voltage(drive_volts);
    }

    /// Access the hardware layer.
    pub fn io(&self) -> &Io {
        &self.io
    }

    /// Mutable access to the hardware layer (simulation hooks).
    pub fn io_mut(&mut self) -> &mut Io {
        &mut self.io
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::settings::{DriveGains, PidGains};
    const EPSILON: f64 = 1e-9;
    const DT: f64 = 0.02;

    /// Programmed-value hardware fake: tests set the sensor readings and
    /// inspect the commanded voltages.
    #[derive(Debug, Default)]
    pub(crate) struct FakeIo {
        pub angle_fraction: f64,
        pub position_rotations: f64,
        pub velocity_rpm: f64,
        pub turn_volts: f64,
        pub drive_volts: f64,
    }

    impl ModuleIo for FakeIo {
        fn absolute_angle(&self) -> f64 {
            self.angle_fraction
        }
        fn drive_position(&self) -> f64 {
            self.position_rotations
        }
        fn drive_velocity(&self) -> f64 {
            self.velocity_rpm
        }
        fn set_turn_voltage(&mut self, volts: f64) {
            self.turn_volts = volts;
        }
        fn set_drive_voltage(&mut self, volts: f64) {
            self.drive_volts = volts;
        }
    }

    pub(crate) fn test_drive_settings() -> DriveSettings {
        DriveSettings {
            period: DT,
            max_module_speed: 5.06,
            velocity_deadband: 0.02,
            wheel_diameter: 0.1016,
            gear_ratio: 1.0 / 6.12,
            turn: PidGains {
                kp: 6.0,
                ki: 0.0,
                kd: 0.0,
            },
            drive: DriveGains {
                kp: 0.018327,
                ki: 0.0,
                kd: 0.0,
                ks: 0.098993,
                kv: 2.4495,
                ka: 0.089872,
            },
            modules: [
                module_settings("front_left", 0.3302, 0.3302, 10, 11),
                module_settings("front_right", 0.3302, -0.3302, 12, 13),
                module_settings("back_left", -0.3302, 0.3302, 14, 15),
                module_settings("back_right", -0.3302, -0.3302, 16, 17),
            ],
        }
    }

    pub(crate) fn module_settings(
        id: &str,
        x: f64,
        y: f64,
        drive_id: u8,
        turn_id: u8,
    ) -> ModuleSettings {
        ModuleSettings {
            id: id.to_string(),
            mount_x: x,
            mount_y: y,
            angle_offset_degrees: 0.0,
            drive_id,
            turn_id,
        }
    }

    fn module(io: FakeIo) -> SwerveModule<FakeIo> {
        let settings = test_drive_settings();
        let store = TunableStore::new();
        SwerveModule::new(&settings.modules[0], &settings, &store, io)
    }

    #[test]
    fn test_heading_applies_calibration() {
        let settings = test_drive_settings();
        let store = TunableStore::new();
        let mut module_cfg = settings.modules[0].clone();
        module_cfg.angle_offset_degrees = 90.0;
        let io = FakeIo {
            angle_fraction: 0.5, // raw 180°
            ..FakeIo::default()
        };
        let m = SwerveModule::new(&module_cfg, &settings, &store, io);
        assert!((m.heading() - 90.0_f64.to_radians()).abs() < EPSILON);
    }

    #[test]
    fn test_state_reads_through_conversion() {
        let io = FakeIo {
            velocity_rpm: 600.0,
            position_rotations: 12.0,
            ..FakeIo::default()
        };
        let m = module(io);
        let factor = 0.1016 * core::f64::consts::PI / 6.12;
        assert!((m.state().speed - 600.0 * factor / 60.0).abs() < EPSILON);
        assert!((m.position().distance - 12.0 * factor).abs() < EPSILON);
    }

    #[test]
    fn test_set_desired_state_optimizes() {
        // module sitting at 0°, asked for 170°: stored target is −10° reversed
        let mut m = module(FakeIo::default());
        m.set_desired_state(ModuleState::new(1.0, 170.0_f64.to_radians()));
        assert!((m.target().heading - (-10.0_f64).to_radians()).abs() < EPSILON);
        assert!((m.target().speed - -1.0).abs() < EPSILON);
    }

    #[test]
    fn test_step_turn_voltage_is_wrap_aware() {
        // encoder at 350°, target 10°: error is +20°, voltage positive
        let mut m = module(FakeIo {
            angle_fraction: 350.0 / 360.0,
            ..FakeIo::default()
        });
        m.set_desired_state(ModuleState::new(0.0, 10.0_f64.to_radians()));
        m.step(DT);
        let expected = 6.0 * 20.0_f64.to_radians();
        assert!((m.io().turn_volts - expected).abs() < 1e-6);
    }

    #[test]
    fn test_step_drive_voltage_has_feedforward() {
        let mut m = module(FakeIo::default());
        m.set_desired_state(ModuleState::new(1.0, 0.0));
        m.step(DT);
        // stationary wheel, 1 m/s target: kP·error + kS + kV·target
        let expected = 0.018327 * 1.0 + 0.098993 + 2.4495 * 1.0;
        assert!((m.io().drive_volts - expected).abs() < 1e-6);
    }

    #[test]
    fn test_step_at_rest_commands_nothing() {
        let mut m = module(FakeIo::default());
        m.set_desired_state(ModuleState::default());
        m.step(DT);
        assert!(m.io().turn_volts.abs() < EPSILON);
        assert!(m.io().drive_volts.abs() < EPSILON);
    }

    #[test]
    fn test_step_tracks_live_sensor_updates() {
        let mut m = module(FakeIo::default());
        m.set_desired_state(ModuleState::new(0.0, 45.0_f64.to_radians()));
        m.step(DT);
        let first = m.io().turn_volts;
        // steering moved halfway: proportional command halves
        m.io_mut().angle_fraction = 22.5 / 360.0;
        m.step(DT);
        assert!((m.io().turn_volts - first / 2.0).abs() < 1e-6);
    }
}
