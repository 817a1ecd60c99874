//! Named, externally adjustable control parameters.
//!
//! Gains, feedforward coefficients, and deadbands are read by the control
//! loops at call time and may be overwritten at any moment by an external
//! tuning collaborator (a diagnostics channel, a dashboard bridge). Each read
//! is independently volatile: two reads of the same tunable within one
//! control cycle may observe different values if a writer is racing, and the
//! loops must tolerate that.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Well-known tunable names shared between the control crate and external
/// tuning collaborators.
pub mod keys {
    /// Steering loop proportional gain.
    pub const TURN_KP: &str = "swerve/turn/kp";
    /// Steering loop integral gain.
    pub const TURN_KI: &str = "swerve/turn/ki";
    /// Steering loop derivative gain.
    pub const TURN_KD: &str = "swerve/turn/kd";
    /// Drive loop proportional gain.
    pub const DRIVE_KP: &str = "swerve/drive/kp";
    /// Drive loop integral gain.
    pub const DRIVE_KI: &str = "swerve/drive/ki";
    /// Drive loop derivative gain.
    pub const DRIVE_KD: &str = "swerve/drive/kd";
    /// Drive feedforward static friction coefficient (V).
    pub const DRIVE_KS: &str = "swerve/drive/ks";
    /// Drive feedforward velocity coefficient (V·s/m).
    pub const DRIVE_KV: &str = "swerve/drive/kv";
    /// Drive feedforward acceleration coefficient (V·s²/m).
    pub const DRIVE_KA: &str = "swerve/drive/ka";
    /// Maximum attainable module speed (m/s), used for desaturation.
    pub const MAX_MODULE_SPEED: &str = "swerve/max_module_speed";
    /// Commanded speeds below this magnitude are zeroed (m/s).
    pub const VELOCITY_DEADBAND: &str = "swerve/velocity_deadband";
}

struct Inner {
    name: String,
    default: f64,
    value: RwLock<f64>,
}

/// A cheap cloneable handle to one named value.
///
/// All clones share the same cell, so a controller holding a handle sees
/// writes made through the [`TunableStore`] immediately. `get` takes a read
/// lock per call and never blocks the control loop for longer than a write of
/// one `f64`.
#[derive(Clone)]
pub struct Tunable {
    inner: Arc<Inner>,
}

impl Tunable {
    fn new(name: impl Into<String>, default: f64) -> Self {
        Tunable {
            inner: Arc::new(Inner {
                name: name.into(),
                default,
                value: RwLock::new(default),
            }),
        }
    }

    /// The stable name identifying this tunable.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The fixed default this tunable was registered with.
    pub fn default_value(&self) -> f64 {
        self.inner.default
    }

    /// Latest value. Each call reads the cell anew.
    pub fn get(&self) -> f64 {
        *self.inner.value.read()
    }

    /// Overwrite the current value.
    pub fn set(&self, value: f64) {
        *self.inner.value.write() = value;
    }

    /// Restore the registered default.
    pub fn reset(&self) {
        self.set(self.inner.default);
    }
}

impl fmt::Debug for Tunable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tunable")
            .field("name", &self.inner.name)
            .field("value", &self.get())
            .field("default", &self.inner.default)
            .finish()
    }
}

/// Registry mapping names to tunable cells.
///
/// Controllers register their parameters at construction via [`entry`] and
/// keep the returned handles; external writers address parameters by name
/// via [`set`]. The live-editing transport (dashboard, telemetry link) is a
/// collaborator outside this crate.
///
/// Every cell holds an `f64`; boolean parameters are represented as
/// `0.0`/`1.0`.
///
/// [`entry`]: TunableStore::entry
/// [`set`]: TunableStore::set
#[derive(Default)]
pub struct TunableStore {
    entries: RwLock<HashMap<String, Tunable>>,
}

impl TunableStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the tunable registered under `name`, registering it with
    /// `default` first if absent. Re-registration keeps the existing cell
    /// and its current value, so four modules sharing one gain get the same
    /// handle.
    pub fn entry(&self, name: &str, default: f64) -> Tunable {
        let mut entries = self.entries.write();
        entries
            .entry(name.to_string())
            .or_insert_with(|| Tunable::new(name, default))
            .clone()
    }

    /// Overwrite a registered tunable by name. Returns `false` (and logs)
    /// when the name is unknown.
    pub fn set(&self, name: &str, value: f64) -> bool {
        let entries = self.entries.read();
        match entries.get(name) {
            Some(tunable) => {
                tunable.set(value);
                debug!(name, value, "tunable updated");
                true
            }
            None => {
                warn!(name, "ignoring write to unknown tunable");
                false
            }
        }
    }

    /// Read a registered tunable by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries.read().get(name).map(Tunable::get)
    }

    /// Names of everything registered so far, unordered.
    pub fn names(&self) -> Vec<String> {
        self.entries.read().keys().cloned().collect()
    }
}
