//! Implementations for the StandoffCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::{
    govern, GovernorReport, Params, RangeAssessment, RangeRecovery, RangeState, RefTrajectory,
    Regulator, StandoffCtrlError,
};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Standoff control module state
pub struct StandoffCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,

    pub(crate) regulator: Regulator,

    pub(crate) ref_traj: RefTrajectory,

    pub(crate) range_recovery: RangeRecovery,

    /// Target generation last acted upon, or `None` before the first tick.
    pub(crate) seen_target_generation: Option<u32>,

    /// Reference reported while the trajectory is not being evaluated
    /// (i.e. during out-of-range holds).
    pub(crate) last_reference_mm: f64,
}

/// Input data to standoff control.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputData {
    /// Calibrated distance sample for this tick.
    ///
    /// Units: millimeters
    pub measured_distance_mm: f64,

    /// Arm position along the controlled axis.
    ///
    /// Units: millimeters
    pub arm_position_mm: f64,

    /// Lower travel limit of the controlled axis.
    ///
    /// Units: millimeters
    pub pos_limit_lower_mm: f64,

    /// Upper travel limit of the controlled axis.
    ///
    /// Units: millimeters
    pub pos_limit_upper_mm: f64,

    /// Operator target stand-off distance.
    ///
    /// Units: millimeters
    pub target_distance_mm: f64,

    /// Generation counter of the target; a change re-arms the ramp.
    pub target_generation: u32,

    /// True on the first tick after a resume from pause.
    pub resumed: bool,

    /// Logical time of this tick.
    ///
    /// Units: seconds
    pub time_s: f64,
}

/// Output demand from standoff control for one tick.
#[derive(Clone, Copy, Serialize, Debug, Default)]
pub struct OutputData {
    /// Governed axis velocity demand.
    ///
    /// Units: millimeters/second
    pub velocity_mms: f64,

    /// Reference distance used this tick.
    ///
    /// Units: millimeters
    pub reference_mm: f64,

    /// Error fed to the regulator this tick (reference - measured, so a
    /// positive error means too close and demands a retreat).
    ///
    /// Units: millimeters
    pub error_mm: f64,
}

/// Status report for StandoffCtrl processing.
#[derive(Clone, Copy, Serialize, Debug, Default)]
pub struct StatusReport {
    /// Range state after this tick.
    pub range_state: RangeState,

    /// True while the reference ramp is still moving.
    pub ramp_active: bool,

    /// The reference ramp was (re-)armed this tick.
    pub ramp_armed: bool,

    /// The regulator history was cleared this tick.
    pub regulator_reset: bool,

    /// Governor flags for this tick.
    pub governor: GovernorReport,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for StandoffCtrl {
    fn default() -> Self {
        let params = Params::default();
        let regulator = Regulator::new(
            params.input_coefficients.clone(),
            params.output_coefficients.clone(),
        );

        StandoffCtrl {
            params,
            report: StatusReport::default(),
            regulator,
            ref_traj: RefTrajectory::default(),
            range_recovery: RangeRecovery::default(),
            seen_target_generation: None,
            last_reference_mm: 0.0,
        }
    }
}

impl State for StandoffCtrl {
    type InitData = &'static str;
    type InitError = StandoffCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = StandoffCtrlError;

    /// Initialise the StandoffCtrl module.
    ///
    /// Expected init data is the name of the parameter file.
    fn init(&mut self, init_data: Self::InitData, _session: &Session)
        -> Result<(), Self::InitError>
    {
        let params: Params =
            params::load(init_data).map_err(StandoffCtrlError::ParamLoadError)?;

        self.set_params(params)
    }

    /// Perform cyclic processing of standoff control.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        // Clear the status report
        self.report = StatusReport::default();

        // Assess the sample against the validity envelope first: an
        // out-of-range reading is not a control error and must never reach
        // the regulator.
        let assessment = self.range_recovery.assess(
            input_data.measured_distance_mm,
            self.params.min_valid_distance_mm,
            self.params.max_valid_distance_mm,
        );

        match assessment {
            RangeAssessment::EnteredOutOfRange => {
                // The regulator is reset on entry, before the hold output
                // (and therefore before the first recovery telemetry row)
                // is produced
                self.regulator.reset();
                self.report.regulator_reset = true;
                return Ok(self.hold_output());
            }
            RangeAssessment::HoldingOutOfRange => {
                return Ok(self.hold_output());
            }
            RangeAssessment::Recovered => {
                // Ramp from the distance sampled at this exit tick towards
                // the current target, then fall through to normal control
                self.arm_ramp(input_data.measured_distance_mm, input_data);
                self.seen_target_generation = Some(input_data.target_generation);
            }
            RangeAssessment::InRange => {
                let mut need_arm = false;

                // A resume from pause is a resume from rest: clear the
                // history the regulator accumulated before the pause
                if input_data.resumed {
                    self.regulator.reset();
                    self.report.regulator_reset = true;
                    need_arm = true;
                }

                // An operator target change re-arms the ramp from the
                // current distance; the first ever tick arms the initial
                // ramp the same way
                if self.seen_target_generation != Some(input_data.target_generation) {
                    self.seen_target_generation = Some(input_data.target_generation);
                    need_arm = true;
                }

                if need_arm {
                    self.arm_ramp(input_data.measured_distance_mm, input_data);
                }
            }
        }

        // Reference and error for this tick
        let reference_mm = self.ref_traj.current(input_data.time_s);
        self.last_reference_mm = reference_mm;

        let error_mm = reference_mm - input_data.measured_distance_mm;

        // Regulator then governor
        let raw_velocity_mms = self.regulator.calculate_output(error_mm);

        let (velocity_mms, governor) = govern(
            raw_velocity_mms,
            input_data.arm_position_mm,
            input_data.pos_limit_lower_mm,
            input_data.pos_limit_upper_mm,
            self.params.max_speed_mms,
        );

        self.report.range_state = self.range_recovery.state();
        self.report.ramp_active = self.ref_traj.is_active();
        self.report.governor = governor;

        Ok((
            OutputData {
                velocity_mms,
                reference_mm,
                error_mm,
            },
            self.report,
        ))
    }
}

impl StandoffCtrl {
    /// Build a module directly from a parameter set. Used by tests and
    /// benchmarks; `init` goes through the parameter file instead.
    pub fn from_params(params: Params) -> Result<Self, StandoffCtrlError> {
        let mut ctrl = StandoffCtrl::default();
        ctrl.set_params(params)?;
        Ok(ctrl)
    }

    /// The loaded parameter set.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Validate and apply a parameter set, rebuilding the controller state.
    fn set_params(&mut self, params: Params) -> Result<(), StandoffCtrlError> {
        params.validate()?;

        self.regulator = Regulator::new(
            params.input_coefficients.clone(),
            params.output_coefficients.clone(),
        );
        self.ref_traj = RefTrajectory::default();
        self.range_recovery = RangeRecovery::default();
        self.seen_target_generation = None;
        self.params = params;

        Ok(())
    }

    /// Re-arm the reference ramp from the given distance towards the
    /// operator target.
    fn arm_ramp(&mut self, start_mm: f64, input_data: &InputData) {
        self.ref_traj.arm(
            start_mm,
            input_data.target_distance_mm,
            self.params.ramp_rise_time_s,
            input_data.time_s,
        );
        self.report.ramp_armed = true;
    }

    /// Output for a tick spent out of range: zero velocity, zero error, the
    /// last evaluated reference.
    fn hold_output(&mut self) -> (OutputData, StatusReport) {
        self.report.range_state = self.range_recovery.state();
        self.report.ramp_active = self.ref_traj.is_active();

        (
            OutputData {
                velocity_mms: 0.0,
                reference_mm: self.last_reference_mm,
                error_mm: 0.0,
            },
            self.report,
        )
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const PERIOD_S: f64 = 0.02;

    /// Drive one tick with the given measurement, advancing logical time by
    /// one period per call.
    fn tick(
        ctrl: &mut StandoffCtrl,
        measured_mm: f64,
        target_mm: f64,
        target_generation: u32,
        resumed: bool,
        time_s: &mut f64,
    ) -> (OutputData, StatusReport) {
        let input = InputData {
            measured_distance_mm: measured_mm,
            arm_position_mm: 0.0,
            pos_limit_lower_mm: -100.0,
            pos_limit_upper_mm: 100.0,
            target_distance_mm: target_mm,
            target_generation,
            resumed,
            time_s: *time_s,
        };
        *time_s += PERIOD_S;
        ctrl.proc(&input).unwrap()
    }

    #[test]
    fn first_tick_arms_the_ramp_from_the_measured_distance() {
        let mut ctrl = StandoffCtrl::from_params(Params::default()).unwrap();
        let mut t = 0.0;

        let (out, rpt) = tick(&mut ctrl, 100.0, 50.0, 0, false, &mut t);

        // The ramp starts where the sensor is, so the first error is zero
        // and the arm does not jump
        assert!(rpt.ramp_armed);
        assert!(rpt.ramp_active);
        assert_eq!(out.reference_mm, 100.0);
        assert_eq!(out.error_mm, 0.0);
        assert_eq!(out.velocity_mms, 0.0);
    }

    #[test]
    fn ramp_walks_the_reference_towards_the_target() {
        let mut ctrl = StandoffCtrl::from_params(Params::default()).unwrap();
        let mut t = 0.0;

        tick(&mut ctrl, 100.0, 50.0, 0, false, &mut t);

        // Half the rise time later the reference is halfway down
        let mut out = OutputData::default();
        while t < 0.25 {
            out = tick(&mut ctrl, 100.0, 50.0, 0, false, &mut t).0;
        }
        assert!((out.reference_mm - 75.0).abs() < 2.0);

        // Past the rise time it is pinned at the target
        while t < 0.6 {
            out = tick(&mut ctrl, 100.0, 50.0, 0, false, &mut t).0;
        }
        assert_eq!(out.reference_mm, 50.0);
    }

    #[test]
    fn out_of_range_holds_zero_and_resets_the_regulator() {
        let mut ctrl = StandoffCtrl::from_params(Params::default()).unwrap();
        let mut t = 0.0;

        // Build up some regulator history with a real error
        tick(&mut ctrl, 100.0, 50.0, 0, false, &mut t);
        for _ in 0..5 {
            tick(&mut ctrl, 120.0, 50.0, 0, false, &mut t);
        }

        // Obstacle removed: the entry tick must already command zero and
        // have reset the regulator
        let (out, rpt) = tick(&mut ctrl, 1000.0, 50.0, 0, false, &mut t);
        assert_eq!(out.velocity_mms, 0.0);
        assert_eq!(out.error_mm, 0.0);
        assert!(rpt.regulator_reset);
        assert_eq!(rpt.range_state, RangeState::OutOfRange);

        // Holding: still zero, no further resets
        let (out, rpt) = tick(&mut ctrl, 1000.0, 50.0, 0, false, &mut t);
        assert_eq!(out.velocity_mms, 0.0);
        assert!(!rpt.regulator_reset);
        assert_eq!(rpt.range_state, RangeState::OutOfRange);
    }

    #[test]
    fn recovery_rearms_from_the_exit_tick_distance() {
        let mut ctrl = StandoffCtrl::from_params(Params::default()).unwrap();
        let mut t = 0.0;

        tick(&mut ctrl, 100.0, 50.0, 0, false, &mut t);
        tick(&mut ctrl, 1000.0, 50.0, 0, false, &mut t);
        tick(&mut ctrl, 1000.0, 50.0, 0, false, &mut t);

        // Obstacle back at 80 mm: the ramp restarts there, so the first
        // recovered tick has zero error and a fresh regulator
        let (out, rpt) = tick(&mut ctrl, 80.0, 50.0, 0, false, &mut t);
        assert!(rpt.ramp_armed);
        assert_eq!(rpt.range_state, RangeState::Normal);
        assert_eq!(out.reference_mm, 80.0);
        assert_eq!(out.error_mm, 0.0);
        assert_eq!(out.velocity_mms, 0.0);
    }

    #[test]
    fn target_change_rearms_from_the_current_distance() {
        let mut ctrl = StandoffCtrl::from_params(Params::default()).unwrap();
        let mut t = 0.0;

        tick(&mut ctrl, 100.0, 50.0, 0, false, &mut t);
        tick(&mut ctrl, 100.0, 50.0, 0, false, &mut t);

        // Operator sets a new target: generation bumps, ramp re-arms from
        // the measured distance
        let (out, rpt) = tick(&mut ctrl, 100.0, 80.0, 1, false, &mut t);
        assert!(rpt.ramp_armed);
        assert_eq!(out.reference_mm, 100.0);
        assert_eq!(out.error_mm, 0.0);
    }

    #[test]
    fn resume_resets_the_regulator_and_rearms() {
        let mut ctrl = StandoffCtrl::from_params(Params::default()).unwrap();
        let mut t = 0.0;

        tick(&mut ctrl, 100.0, 50.0, 0, false, &mut t);
        for _ in 0..5 {
            tick(&mut ctrl, 130.0, 50.0, 0, false, &mut t);
        }

        // First tick after a pause: history cleared, ramp re-armed from the
        // fresh measurement, so the output is exactly zero again
        let (out, rpt) = tick(&mut ctrl, 130.0, 50.0, 0, true, &mut t);
        assert!(rpt.regulator_reset);
        assert!(rpt.ramp_armed);
        assert_eq!(out.error_mm, 0.0);
        assert_eq!(out.velocity_mms, 0.0);
    }

    #[test]
    fn governor_flags_surface_in_the_report() {
        let mut ctrl = StandoffCtrl::from_params(Params::default()).unwrap();
        let mut t = 0.0;

        // Position pinned at the upper limit while far too close: the
        // regulator demands a retreat the governor must refuse
        let input = InputData {
            measured_distance_mm: 10.0,
            arm_position_mm: 100.0,
            pos_limit_lower_mm: -100.0,
            pos_limit_upper_mm: 100.0,
            target_distance_mm: 50.0,
            target_generation: 0,
            resumed: false,
            time_s: t,
        };
        ctrl.proc(&input).unwrap();
        t += PERIOD_S;

        // Second tick: the ramp is pulling the reference up towards 50
        // while the measurement stays at 10, so the error is positive and
        // the raw demand outward
        let input = InputData { time_s: t, ..input };
        let (out, rpt) = ctrl.proc(&input).unwrap();
        assert_eq!(out.velocity_mms, 0.0);
        assert!(rpt.governor.travel_limited);
    }
}
