//! Range recovery machine
//!
//! An out-of-range reading (obstacle removed, or something pressed against
//! the sensor face) is not a control error - feeding it to the regulator
//! could demand unbounded velocity. While the reading is outside the
//! validity envelope the machine holds motion at zero and the loop keeps
//! resampling at the control period until a usable reading returns.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};
use serde::Serialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Range state of the measured distance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RangeState {
    /// Readings are inside the validity envelope.
    Normal,

    /// Readings are outside the envelope; motion is held at zero.
    OutOfRange,
}

impl Default for RangeState {
    fn default() -> Self {
        RangeState::Normal
    }
}

/// Outcome of assessing one distance sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangeAssessment {
    /// Reading usable, control proceeds normally.
    InRange,

    /// Reading just left the envelope: hold motion, reset the regulator.
    EnteredOutOfRange,

    /// Still waiting for a usable reading.
    HoldingOutOfRange,

    /// Reading just returned: re-arm the reference from this distance.
    Recovered,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Tracks whether the sensor reading is inside its validity envelope.
#[derive(Clone, Copy, Debug, Default)]
pub struct RangeRecovery {
    state: RangeState,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl RangeRecovery {
    /// Assess one sample against the envelope and advance the state
    /// machine.
    pub fn assess(
        &mut self,
        distance_mm: f64,
        min_valid_mm: f64,
        max_valid_mm: f64,
    ) -> RangeAssessment {
        let in_range = distance_mm >= min_valid_mm && distance_mm <= max_valid_mm;

        match (self.state, in_range) {
            (RangeState::Normal, true) => RangeAssessment::InRange,
            (RangeState::Normal, false) => {
                warn!(
                    "Sensor reading {:.1} mm is out of range, stopping the arm",
                    distance_mm
                );
                info!("Waiting for an obstacle in range...");
                self.state = RangeState::OutOfRange;
                RangeAssessment::EnteredOutOfRange
            }
            (RangeState::OutOfRange, false) => RangeAssessment::HoldingOutOfRange,
            (RangeState::OutOfRange, true) => {
                info!(
                    "Obstacle in range at {:.1} mm, resuming control",
                    distance_mm
                );
                self.state = RangeState::Normal;
                RangeAssessment::Recovered
            }
        }
    }

    /// Current range state.
    pub fn state(&self) -> RangeState {
        self.state
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const MIN: f64 = 0.0;
    const MAX: f64 = 200.0;

    #[test]
    fn in_range_readings_stay_normal() {
        let mut rec = RangeRecovery::default();
        assert_eq!(rec.assess(100.0, MIN, MAX), RangeAssessment::InRange);
        assert_eq!(rec.assess(0.0, MIN, MAX), RangeAssessment::InRange);
        assert_eq!(rec.assess(200.0, MIN, MAX), RangeAssessment::InRange);
        assert_eq!(rec.state(), RangeState::Normal);
    }

    #[test]
    fn loss_hold_and_recovery_sequence() {
        let mut rec = RangeRecovery::default();

        assert_eq!(rec.assess(150.0, MIN, MAX), RangeAssessment::InRange);

        // Obstacle removed
        assert_eq!(
            rec.assess(1000.0, MIN, MAX),
            RangeAssessment::EnteredOutOfRange
        );
        assert_eq!(rec.state(), RangeState::OutOfRange);

        // Still gone
        assert_eq!(
            rec.assess(1000.0, MIN, MAX),
            RangeAssessment::HoldingOutOfRange
        );

        // Back in view
        assert_eq!(rec.assess(80.0, MIN, MAX), RangeAssessment::Recovered);
        assert_eq!(rec.state(), RangeState::Normal);

        // And normal control resumes
        assert_eq!(rec.assess(80.0, MIN, MAX), RangeAssessment::InRange);
    }

    #[test]
    fn too_close_readings_are_also_out_of_range() {
        let mut rec = RangeRecovery::default();
        assert_eq!(
            rec.assess(-5.0, MIN, MAX),
            RangeAssessment::EnteredOutOfRange
        );
    }
}
