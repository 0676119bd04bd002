//! # Operator command processor
//!
//! Applies parsed operator commands to the shared parameter store and
//! produces the response echoed at the console. The control loop picks the
//! changes up at its next tick.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};

// Internal
use crate::cmd::{OpCmd, HELP_TEXT};
use crate::param_store::ParamStore;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Execute an operator command.
///
/// Mutates only the parameter store and returns the operator-facing
/// response.
pub fn exec(store: &ParamStore, op_cmd: &OpCmd) -> String {
    match op_cmd {
        OpCmd::Help => HELP_TEXT.to_string(),

        OpCmd::SetReference(mm) => {
            debug!("Received reference command: {} mm", mm);
            store.set_target_distance_mm(*mm);
            format!("Reference set to {} mm", mm)
        }

        OpCmd::TogglePause => {
            let paused = store.toggle_paused();
            info!("Pause toggled, paused = {}", paused);
            if paused {
                "Paused, arm held at zero velocity".to_string()
            } else {
                "Resumed".to_string()
            }
        }

        OpCmd::SetCalibration { m, q } => {
            debug!("Received calibration command: m = {}, q = {}", m, q);
            store.set_calibration(*m, *q);
            format!("Sensor calibration curve set to {{{}, {}}}", m, q)
        }

        OpCmd::Stop => {
            info!("Stop requested from the console");
            store.request_stop();
            "Stopping execution".to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reference_command_updates_the_store() {
        let store = ParamStore::new(50.0, 1.0, 0.0);
        exec(&store, &OpCmd::SetReference(80.0));
        assert_eq!(store.target_distance_mm(), 80.0);
        assert_eq!(store.target_generation(), 1);
    }

    #[test]
    fn repeated_pause_commands_strictly_alternate() {
        let store = ParamStore::new(50.0, 1.0, 0.0);

        for i in 0..6 {
            exec(&store, &OpCmd::TogglePause);
            assert_eq!(store.is_paused(), i % 2 == 0);
        }
    }

    #[test]
    fn calibration_command_updates_the_store() {
        let store = ParamStore::new(50.0, 1.0, 0.0);
        exec(&store, &OpCmd::SetCalibration { m: 1.2, q: -3.0 });
        assert_eq!(store.calibration(), (1.2, -3.0));
    }

    #[test]
    fn stop_clears_the_running_flag() {
        let store = ParamStore::new(50.0, 1.0, 0.0);
        exec(&store, &OpCmd::Stop);
        assert!(!store.is_running());
    }
}
