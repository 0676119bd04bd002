//! Parameters structure for StandoffCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for standoff control.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Params {
    // ---- REGULATOR ----

    /// Feedforward (input) coefficients of the discrete regulator, most
    /// recent sample first. Derived offline from a pole/zero/gain design at
    /// the control period.
    pub input_coefficients: Vec<f64>,

    /// Feedback (output) coefficients of the discrete regulator, most recent
    /// sample first.
    pub output_coefficients: Vec<f64>,

    // ---- REFERENCE TRAJECTORY ----

    /// Time taken by the reference ramp to move from the current distance to
    /// a new target.
    ///
    /// Units: seconds
    pub ramp_rise_time_s: f64,

    // ---- SENSOR VALIDITY ----

    /// Lowest distance reading considered a real obstacle.
    ///
    /// Units: millimeters
    pub min_valid_distance_mm: f64,

    /// Highest distance reading considered a real obstacle. Readings above
    /// this usually mean the obstacle has been removed.
    ///
    /// Units: millimeters
    pub max_valid_distance_mm: f64,

    // ---- CAPABILITIES ----

    /// Maximum magnitude of the commanded axis velocity.
    ///
    /// Units: millimeters/second
    pub max_speed_mms: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    /// Defaults match the design the controller shipped with: pole 0.6,
    /// zero 0.7967, gain 1.6334 at the 20 ms control period.
    fn default() -> Self {
        Params {
            input_coefficients: vec![1.6334, -1.3013],
            output_coefficients: vec![1.2, -0.36],
            ramp_rise_time_s: 0.5,
            min_valid_distance_mm: 0.0,
            max_valid_distance_mm: 200.0,
            max_speed_mms: 100.0,
        }
    }
}

impl Params {
    /// Check that the parameter set is usable.
    pub fn validate(&self) -> Result<(), super::StandoffCtrlError> {
        use super::StandoffCtrlError::InvalidParams;

        if self.input_coefficients.is_empty() || self.output_coefficients.is_empty() {
            return Err(InvalidParams(
                "regulator coefficient vectors must not be empty".into(),
            ));
        }
        if self.ramp_rise_time_s <= 0.0 {
            return Err(InvalidParams("ramp rise time must be positive".into()));
        }
        if self.min_valid_distance_mm >= self.max_valid_distance_mm {
            return Err(InvalidParams(
                "sensor validity envelope must have min < max".into(),
            ));
        }
        if self.max_speed_mms <= 0.0 {
            return Err(InvalidParams("maximum speed must be positive".into()));
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn default_params_are_valid() {
        assert!(Params::default().validate().is_ok());
    }

    #[test]
    fn bad_params_are_rejected() {
        let mut p = Params::default();
        p.input_coefficients.clear();
        assert!(p.validate().is_err());

        let mut p = Params::default();
        p.ramp_rise_time_s = 0.0;
        assert!(p.validate().is_err());

        let mut p = Params::default();
        p.min_valid_distance_mm = p.max_valid_distance_mm;
        assert!(p.validate().is_err());

        let mut p = Params::default();
        p.max_speed_mms = -1.0;
        assert!(p.validate().is_err());
    }
}
