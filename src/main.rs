mod blackboard;
mod bus;
mod config;
mod sim;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use spin_sleep::SpinSleeper;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use strafe_control::{EncoderConversion, SwerveDrive, TunableStore, keys};
use strafe_kinematics::{ChassisSpeeds, MODULE_COUNT};

use blackboard::{Blackboard, State, raise_fault, snapshot, touch_step};
use bus::Topic;
use sim::SimModuleIo;

/// How long the watchdog tolerates a silent control thread.
const STEP_STALENESS_LIMIT: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    info!("Swerve demo runtime starting.");

    let settings = config::load_settings()?;
    let tunables = Arc::new(TunableStore::new());

    let conversion = EncoderConversion::new(settings.wheel_circumference(), settings.gear_ratio);
    let ios: [SimModuleIo; MODULE_COUNT] = std::array::from_fn(|i| {
        SimModuleIo::new(
            settings.modules[i].angle_offset(),
            conversion,
            settings.drive.ks,
            settings.drive.kv,
        )
    });
    let mut drive = SwerveDrive::new(&settings, &tunables, ios)?;

    let bb: Blackboard = Arc::default();
    let state_topic: Topic<State> = Topic::new(16);

    info!("Spawning control thread...");
    let period = Duration::from_secs_f64(settings.period);
    let dt = settings.period;
    std::thread::Builder::new().name("control".into()).spawn({
        let bb = Arc::clone(&bb);
        let state_topic = state_topic.clone();
        move || {
            info!("Control thread started.");
            let sleeper = SpinSleeper::new(10_000);
            let start = Instant::now();
            loop {
                // scripted command: forward, strafe, then rotate, on a
                // six-second cycle
                let phase = (start.elapsed().as_secs_f64() / 2.0) as u64 % 3;
                let command = match phase {
                    0 => ChassisSpeeds::new(1.0, 0.0, 0.0),
                    1 => ChassisSpeeds::new(0.0, 1.0, 0.0),
                    _ => ChassisSpeeds::new(0.0, 0.0, 1.5),
                };

                drive.drive(command);
                drive.step(dt);
                for module in drive.modules_mut() {
                    module.io_mut().integrate(dt);
                }

                {
                    let mut guard = bb.write();
                    guard.module_states = drive.module_states();
                    guard.module_positions = drive.module_positions();
                    guard.measured_speeds = drive.chassis_speeds();
                }
                touch_step(&bb);
                state_topic.publish(snapshot(&bb));

                sleeper.sleep(period);
            }
        }
    })?;

    tokio::try_join!(
        watchdog(bb.clone()),
        telemetry(state_topic.subscribe()),
        retune(Arc::clone(&tunables)),
    )?;

    Ok(())
}

/// Flags the drivetrain as faulted if the control thread stops stepping.
async fn watchdog(bb: Blackboard) -> anyhow::Result<()> {
    info!("Watchdog task started.");
    let mut tick = tokio::time::interval(Duration::from_millis(50));
    loop {
        tick.tick().await;
        let age = Instant::now() - snapshot(&bb).last_step_ts;
        if age > STEP_STALENESS_LIMIT {
            warn!(?age, "Control step timeout.");
            raise_fault(&bb, "control step timeout");
        }
    }
}

/// Logs the measured vehicle motion once a second.
async fn telemetry(
    mut rx: tokio::sync::broadcast::Receiver<Arc<State>>,
) -> anyhow::Result<()> {
    info!("Telemetry task started.");
    let mut tick = tokio::time::interval(Duration::from_secs(1));
    loop {
        tick.tick().await;
        if let Some(state) = bus::drain_latest(&mut rx) {
            let speeds = state.measured_speeds;
            info!(
                vx = speeds.vx,
                vy = speeds.vy,
                omega = speeds.omega,
                faults = ?state.faults,
                "measured chassis motion"
            );
        }
    }
}

/// Demonstrates live gain changes: stiffens the steering loop after ten
/// seconds, with every module picking the new gain up on its next step.
async fn retune(tunables: Arc<TunableStore>) -> anyhow::Result<()> {
    tokio::time::sleep(Duration::from_secs(10)).await;
    if tunables.set(keys::TURN_KP, 7.5) {
        info!(key = keys::TURN_KP, value = 7.5, "retuned steering gain");
    }
    Ok(())
}
