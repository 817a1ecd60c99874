//! The four-module drivetrain coordinator.
//!
//! Owns the fixed set of modules, translates a vehicle-level motion request
//! into per-module states through the kinematics, and drives the periodic
//! control step. Constructed once; stepped by an external scheduler once per
//! control period for the life of the process.

use tracing::debug;

use strafe_kinematics::{
    ChassisSpeeds, MODULE_COUNT, ModulePosition, ModuleState, SwerveKinematics, desaturate,
};

use crate::error::DriveError;
use crate::module::{ModuleIo, SwerveModule};
use crate::settings::DriveSettings;
use crate::tunables::{Tunable, TunableStore, keys};

/// Four swerve modules plus the kinematics derived from their mount offsets.
pub struct SwerveDrive<Io> {
    modules: [SwerveModule<Io>; MODULE_COUNT],
    kinematics: SwerveKinematics,
    max_module_speed: Tunable,
    velocity_deadband: Tunable,
}

impl<Io: ModuleIo> SwerveDrive<Io> {
    /// Assemble a drivetrain.
    ///
    /// `ios` pairs with `settings.modules` in order; that order is the fixed
    /// module order for every per-module array this struct produces or
    /// consumes.
    ///
    /// # Errors
    ///
    /// Rejects degenerate geometry (two modules on one mount point), a module
    /// whose drive and steering actuators share a hardware identifier, and an
    /// identifier wired to more than one module. All of these are fatal
    /// configuration mistakes and must not survive until the control loop.
    pub fn new(
        settings: &DriveSettings,
        tunables: &TunableStore,
        ios: [Io; MODULE_COUNT],
    ) -> Result<Self, DriveError> {
        let mut seen_ids: Vec<u8> = Vec::with_capacity(2 * MODULE_COUNT);
        for module in settings.modules.iter() {
            if module.drive_id == module.turn_id {
                return Err(DriveError::DuplicateActuatorId {
                    id: module.id.clone(),
                    actuator: module.drive_id,
                });
            }
            for actuator in [module.drive_id, module.turn_id] {
                if seen_ids.contains(&actuator) {
                    return Err(DriveError::SharedActuatorId { actuator });
                }
                seen_ids.push(actuator);
            }
        }

        let offsets = [
            settings.modules[0].mount_offset(),
            settings.modules[1].mount_offset(),
            settings.modules[2].mount_offset(),
            settings.modules[3].mount_offset(),
        ];
        let kinematics = SwerveKinematics::new(offsets)?;

        let [io0, io1, io2, io3] = ios;
        let modules = [
            SwerveModule::new(&settings.modules[0], settings, tunables, io0),
            SwerveModule::new(&settings.modules[1], settings, tunables, io1),
            SwerveModule::new(&settings.modules[2], settings, tunables, io2),
            SwerveModule::new(&settings.modules[3], settings, tunables, io3),
        ];
        debug!(
            modules = ?settings.modules.iter().map(|m| m.id.as_str()).collect::<Vec<_>>(),
            "swerve drivetrain assembled"
        );

        Ok(SwerveDrive {
            modules,
            kinematics,
            max_module_speed: tunables.entry(keys::MAX_MODULE_SPEED, settings.max_module_speed),
            velocity_deadband: tunables.entry(keys::VELOCITY_DEADBAND, settings.velocity_deadband),
        })
    }

    /// Command a vehicle-level motion: inverse kinematics, then per-module
    /// optimization through [`set_module_states`](Self::set_module_states).
    pub fn drive(&mut self, speeds: ChassisSpeeds) {
        let states = self.kinematics.inverse(speeds);
        self.set_module_states(states);
    }

    /// Forward one desired state to each module, in fixed module order.
    ///
    /// Speeds are first desaturated so no module is asked for more than the
    /// attainable maximum, then speeds under the velocity deadband are
    /// zeroed with the module's current heading kept, so modules do not
    /// jitter around their steering axes at rest.
    pub fn set_module_states(&mut self, mut states: [ModuleState; MODULE_COUNT]) {
        desaturate(&mut states, self.max_module_speed.get());
        let deadband = self.velocity_deadband.get();
        for (module, state) in self.modules.iter_mut().zip(states.into_iter()) {
            if state.speed.abs() < deadband {
                module.set_desired_state(ModuleState::new(0.0, module.heading()));
            } else {
                module.set_desired_state(state);
            }
        }
    }

    /// Run one control cycle on all four modules.
    ///
    /// The modules have no cross-dependency within a cycle; the iteration
    /// order is the fixed module order, so runs are reproducible.
    pub fn step(&mut self, dt: f64) {
        for module in self.modules.iter_mut() {
            module.step(dt);
        }
    }

    /// Measured states of all four modules, in fixed module order.
    pub fn module_states(&self) -> [ModuleState; MODULE_COUNT] {
        [
            self.modules[0].state(),
            self.modules[1].state(),
            self.modules[2].state(),
            self.modules[3].state(),
        ]
    }

    /// Cumulative positions of all four modules, for the odometry consumer.
    pub fn module_positions(&self) -> [ModulePosition; MODULE_COUNT] {
        [
            self.modules[0].position(),
            self.modules[1].position(),
            self.modules[2].position(),
            self.modules[3].position(),
        ]
    }

    /// Last commanded targets, in fixed module order.
    pub fn module_targets(&self) -> [ModuleState; MODULE_COUNT] {
        [
            self.modules[0].target(),
            self.modules[1].target(),
            self.modules[2].target(),
            self.modules[3].target(),
        ]
    }

    /// Measured vehicle motion, from forward kinematics over the measured
    /// module states.
    pub fn chassis_speeds(&self) -> ChassisSpeeds {
        self.kinematics.forward(&self.module_states())
    }

    /// The kinematic model derived from the mount offsets.
    pub fn kinematics(&self) -> &SwerveKinematics {
        &self.kinematics
    }

    /// The modules themselves, in fixed order.
    pub fn modules(&self) -> &[SwerveModule<Io>; MODULE_COUNT] {
        &self.modules
    }

    /// Mutable module access (simulation hooks).
    pub fn modules_mut(&mut self) -> &mut [SwerveModule<Io>; MODULE_COUNT] {
        &mut self.modules
    }
}
