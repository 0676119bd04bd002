//! Main control executable entry point.
//!
//! # Architecture
//!
//! Two tasks run for the lifetime of the process:
//!
//!     - The control task (this thread) samples the distance sensor and
//!       commands the arm at a fixed period.
//!     - The operator console task blocks on stdin and writes the shared
//!       parameter store.
//!
//! The tasks share nothing but the parameter store and its stop flag. Each
//! control tick is: range check -> reference ramp -> regulator -> safety
//! governor -> arm command -> telemetry, then a sleeping wait for the next
//! monotonic deadline. The trajectory runs on logical time (one period per
//! tick) so scheduling jitter never distorts the ramp.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use ctrl_lib::{
    cmd::console,
    data_store::DataStore,
    param_store::ParamStore,
    standoff_ctrl,
    telemetry::{TelemetryArchive, TelemetrySample},
};

#[cfg(feature = "sim")]
use ctrl_lib::sim_client::{SimArm, SimParams, SimSensor, SimWorld};

#[cfg(not(feature = "sim"))]
compile_error!("No equipment stack selected: enable the `sim` feature or link a hardware driver");

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use std::env;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use eqpt_if::arm::{Arm, VEL_VECTOR_LEN};
use eqpt_if::sensor::DistanceSensor;
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one control cycle.
const CYCLE_PERIOD_S: f64 = 0.02;

/// Default target stand-off distance if none is given on the command line.
///
/// Units: millimeters
const DEFAULT_TARGET_DISTANCE_MM: f64 = 50.0;

/// Default sensor calibration curve (slope, intercept).
const DEFAULT_CALIBRATION: (f64, f64) = (1.0, 0.0);

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("ctrl_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Standoff Control Executable\n");
    info!("Running on: {}", util::host::get_host_desc());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- COMMAND LINE ARGUMENTS ----

    // `ctrl_exec [target_mm [m q]]`
    let args: Vec<String> = env::args().collect();

    let (initial_target_mm, initial_cal) = match args.len() {
        1 => (DEFAULT_TARGET_DISTANCE_MM, DEFAULT_CALIBRATION),
        2 => (parse_arg(&args[1], "target distance")?, DEFAULT_CALIBRATION),
        4 => (
            parse_arg(&args[1], "target distance")?,
            (
                parse_arg(&args[2], "calibration slope")?,
                parse_arg(&args[3], "calibration intercept")?,
            ),
        ),
        n => {
            return Err(eyre!(
                "Expected zero, one, or three arguments, found {}",
                n - 1
            ))
        }
    };

    info!("Initial target distance: {} mm", initial_target_mm);

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.standoff_ctrl
        .init("standoff_ctrl.toml", &session)
        .wrap_err("Failed to initialise StandoffCtrl")?;
    info!("StandoffCtrl init complete");

    // Snapshot the loaded parameters into the session for post-run analysis
    session.save("standoff_ctrl_params.json", ds.standoff_ctrl.params().clone());

    info!("Module initialisation complete\n");

    // ---- INITIALISE EQUIPMENT ----

    #[cfg(feature = "sim")]
    let (mut sensor, mut arm) = {
        let sim_params: SimParams =
            util::params::load("eqpt.toml").wrap_err("Could not load simulated equipment params")?;
        let world = SimWorld::new(sim_params.clone());
        let sensor = SimSensor::new(world.clone());
        let arm = SimArm::new(world, &sim_params);
        info!("Simulated equipment initialised");
        (sensor, arm)
    };

    sensor.set_calibration_curve(initial_cal.0, initial_cal.1);

    let pos_limit_lower_mm = arm.pos_limit_lower_mm();
    let pos_limit_upper_mm = arm.pos_limit_upper_mm();

    // ---- TELEMETRY ----

    let mut telemetry = TelemetryArchive::new(&session)
        .map_err(|e| eyre!("Failed to initialise the telemetry archive: {}", e))?;

    // ---- SHARED PARAMETERS & CONSOLE ----

    let store = Arc::new(ParamStore::new(
        initial_target_mm,
        initial_cal.0,
        initial_cal.1,
    ));

    let console_handle = {
        let store = store.clone();
        let mut history_path = session.session_root.clone();
        history_path.push("console_history.txt");
        thread::spawn(move || console::console_task(store, history_path))
    };

    info!("Console task started");

    // The calibration at generation zero is already on the sensor
    let mut seen_cal_generation = store.cal_generation();

    // ---- MAIN LOOP ----

    info!("Beginning control loop\n");

    let cycle_period = Duration::from_secs_f64(CYCLE_PERIOD_S);
    let mut next_cycle_instant = Instant::now() + cycle_period;

    let mut velocity_demand = [0.0; VEL_VECTOR_LEN];

    while store.is_running() {
        ds.cycle_start();

        // ---- PAUSE HANDLING ----

        // While paused the arm is held at zero velocity and neither the
        // controller state nor the logical clock advances
        let paused = store.is_paused();
        if paused {
            if !ds.was_paused {
                info!("Control paused");
            }
            ds.was_paused = true;

            velocity_demand = [0.0; VEL_VECTOR_LEN];
            if let Err(e) = arm.move_lin_vel(&velocity_demand) {
                warn!("Could not command the arm: {}", e);
            }

            wait_for_cycle(&mut next_cycle_instant, cycle_period, &mut ds);
            continue;
        }

        let resumed = ds.was_paused;
        if resumed {
            info!("Control resumed");
        }
        ds.was_paused = false;

        // ---- OPERATOR PARAMETER PICKUP ----

        let cal_generation = store.cal_generation();
        if cal_generation != seen_cal_generation {
            let (m, q) = store.calibration();
            sensor.set_calibration_curve(m, q);
            seen_cal_generation = cal_generation;
            info!("Sensor calibration curve updated to {{{}, {}}}", m, q);
        }

        // ---- SENSING ----

        let measured_distance_mm = match sensor.get_distance_mm() {
            Ok(d) => d,
            Err(e) => {
                // A sensor fault is not an out-of-range reading: hold at
                // zero for this tick and try again on the next one
                warn!("Sensor acquisition failed: {}", e);

                velocity_demand = [0.0; VEL_VECTOR_LEN];
                if let Err(e) = arm.move_lin_vel(&velocity_demand) {
                    warn!("Could not command the arm: {}", e);
                }

                wait_for_cycle(&mut next_cycle_instant, cycle_period, &mut ds);
                continue;
            }
        };

        let arm_position_mm = arm.get_position_mm();

        // ---- CONTROL ALGORITHM PROCESSING ----

        ds.standoff_ctrl_input = standoff_ctrl::InputData {
            measured_distance_mm,
            arm_position_mm,
            pos_limit_lower_mm,
            pos_limit_upper_mm,
            target_distance_mm: store.target_distance_mm(),
            target_generation: store.target_generation(),
            resumed,
            time_s: ds.time_s,
        };

        match ds.standoff_ctrl.proc(&ds.standoff_ctrl_input) {
            Ok((out, rpt)) => {
                ds.standoff_ctrl_output = out;
                ds.standoff_ctrl_status_rpt = rpt;
            }
            Err(e) => {
                warn!("Error during StandoffCtrl processing: {}", e);
            }
        };

        if ds.standoff_ctrl_status_rpt.ramp_armed {
            debug!(
                "Reference ramp armed towards {} mm",
                ds.standoff_ctrl_input.target_distance_mm
            );
        }

        // ---- COMMAND THE ARM ----

        velocity_demand = [0.0; VEL_VECTOR_LEN];
        velocity_demand[0] = ds.standoff_ctrl_output.velocity_mms;
        if let Err(e) = arm.move_lin_vel(&velocity_demand) {
            warn!("Could not command the arm: {}", e);
        }

        // ---- TELEMETRY ----

        telemetry.append(&TelemetrySample {
            time: ds.time_s,
            reference: ds.standoff_ctrl_output.reference_mm,
            position: arm_position_mm,
            measured_distance: measured_distance_mm,
            error: ds.standoff_ctrl_output.error_mm,
            velocity_control: ds.standoff_ctrl_output.velocity_mms,
        });

        // ---- CYCLE MANAGEMENT ----

        // Logical time advances by exactly one period per active tick,
        // never by the measured elapsed time
        ds.time_s += CYCLE_PERIOD_S;

        wait_for_cycle(&mut next_cycle_instant, cycle_period, &mut ds);
    }

    // ---- SHUTDOWN ----

    info!("Stop requested, shutting down");

    velocity_demand = [0.0; VEL_VECTOR_LEN];
    if let Err(e) = arm.move_lin_vel(&velocity_demand) {
        warn!("Could not command zero velocity during shutdown: {}", e);
    }
    arm.deactivate();

    if console_handle.join().is_err() {
        warn!("Console task panicked");
    }

    session.exit();

    info!("End of execution");

    Ok(())
}

/// Sleep until the next cycle deadline.
///
/// The deadline always advances by exactly one period: an overrun is
/// absorbed by the next iteration instead of shifting every later cycle.
fn wait_for_cycle(next_cycle_instant: &mut Instant, cycle_period: Duration, ds: &mut DataStore) {
    let now = Instant::now();

    match next_cycle_instant.checked_duration_since(now) {
        Some(remaining) => {
            ds.num_consec_cycle_overruns = 0;
            thread::sleep(remaining);
        }
        None => {
            ds.num_consec_cycle_overruns += 1;
            warn!(
                "Cycle overran by {:.06} s",
                (now - *next_cycle_instant).as_secs_f64()
            );
        }
    }

    *next_cycle_instant += cycle_period;

    // Increment cycle counter
    ds.num_cycles += 1;
}

/// Parse a positional command line argument as a float.
fn parse_arg(arg: &str, what: &str) -> Result<f64, Report> {
    arg.parse::<f64>()
        .map_err(|_| eyre!("Could not parse the {} from `{}`", what, arg))
}
