//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::standoff_ctrl::{self, StandoffCtrl};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the control executable.
///
/// Owned exclusively by the control task; everything the operator can touch
/// lives in the shared [`crate::param_store::ParamStore`] instead.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// Logical time driving the reference trajectory [s].
    ///
    /// Advances by exactly one period per active tick, independent of the
    /// wall-clock wait, and does not advance while paused. This keeps
    /// scheduling jitter out of the ramp.
    pub time_s: f64,

    // StandoffCtrl
    pub standoff_ctrl: StandoffCtrl,
    pub standoff_ctrl_input: standoff_ctrl::InputData,
    pub standoff_ctrl_output: standoff_ctrl::OutputData,
    pub standoff_ctrl_status_rpt: standoff_ctrl::StatusReport,

    // Pause tracking
    /// True if the previous tick was spent paused
    pub was_paused: bool,

    // Monitoring counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the per-cycle module input/output slots.
    pub fn cycle_start(&mut self) {
        self.standoff_ctrl_input = standoff_ctrl::InputData::default();
        self.standoff_ctrl_output = standoff_ctrl::OutputData::default();
        self.standoff_ctrl_status_rpt = standoff_ctrl::StatusReport::default();
    }
}
