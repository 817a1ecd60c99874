use parking_lot::RwLock;
use std::{sync::Arc, time::Instant};

use strafe_kinematics::{ChassisSpeeds, MODULE_COUNT, ModulePosition, ModuleState};

#[derive(Clone)]
pub struct State {
    pub module_states: [ModuleState; MODULE_COUNT],
    pub module_positions: [ModulePosition; MODULE_COUNT],
    pub measured_speeds: ChassisSpeeds,
    pub last_step_ts: Instant,
    pub faults: Vec<String>,
}

impl Default for State {
    fn default() -> Self {
        State {
            module_states: [ModuleState::default(); MODULE_COUNT],
            module_positions: [ModulePosition::default(); MODULE_COUNT],
            measured_speeds: ChassisSpeeds::default(),
            last_step_ts: Instant::now(),
            faults: Vec::new(),
        }
    }
}

pub type Blackboard = Arc<RwLock<State>>;

pub fn snapshot(bb: &Blackboard) -> State {
    (*bb.read()).clone()
}

pub fn touch_step(bb: &Blackboard) {
    bb.write().last_step_ts = Instant::now();
}

pub fn raise_fault(bb: &Blackboard, msg: &str) {
    let mut g = bb.write();
    if !g.faults.iter().any(|s| s == msg) {
        g.faults.push(msg.to_string());
    }
}
