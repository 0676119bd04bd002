//! Simulated equipment client
//!
//! Provides the simulated sensor and arm used for development and testing
//! when no hardware is attached. The two handles share a [`SimWorld`]
//! plant: the arm integrates velocity demands into an axis position and the
//! sensor derives the stand-off distance from that position. Positive
//! velocity moves the axis away from the obstacle, so the measured distance
//! grows with it.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

// Internal
use eqpt_if::arm::{self, Arm, ArmError};
use eqpt_if::sensor::{DistanceSensor, SensorError};
use util::maths;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Raw reading produced when the obstacle has been removed, far outside any
/// sane validity envelope.
pub const NO_OBSTACLE_READING_MM: f64 = 10_000.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulated equipment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimParams {
    /// Stand-off distance seen with the axis at its zero position.
    ///
    /// Units: millimeters
    pub initial_distance_mm: f64,

    /// Lower travel limit of the axis.
    ///
    /// Units: millimeters
    pub pos_limit_lower_mm: f64,

    /// Upper travel limit of the axis.
    ///
    /// Units: millimeters
    pub pos_limit_upper_mm: f64,

    /// Integration step for velocity demands, normally the control period.
    ///
    /// Units: seconds
    pub step_s: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            initial_distance_mm: 100.0,
            pos_limit_lower_mm: -100.0,
            pos_limit_upper_mm: 100.0,
            step_s: 0.02,
        }
    }
}

/// Shared simulated plant state.
#[derive(Debug)]
pub struct SimWorld {
    /// Axis position; positive is away from the obstacle.
    ///
    /// Units: millimeters
    pub position_mm: f64,

    /// Whether the obstacle is in front of the sensor.
    pub obstacle_present: bool,

    params: SimParams,
}

/// Simulated distance sensor with a linear calibration curve.
pub struct SimSensor {
    world: Arc<Mutex<SimWorld>>,

    /// Calibration curve coefficients, highest order first: `[m, q]`.
    cal_curve: Vec<f64>,
}

/// Simulated arm.
pub struct SimArm {
    world: Arc<Mutex<SimWorld>>,
    pos_limit_lower_mm: f64,
    pos_limit_upper_mm: f64,
    active: bool,
}

/// Sensor replaying a fixed list of raw readings, for deterministic tests.
pub struct ScriptedSensor {
    readings: VecDeque<f64>,
    cal_curve: Vec<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimWorld {
    /// Create a new shared world with the axis at zero and the obstacle
    /// present.
    pub fn new(params: SimParams) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(SimWorld {
            position_mm: 0.0,
            obstacle_present: true,
            params,
        }))
    }

    /// Distance the sensor sees before calibration.
    fn raw_distance_mm(&self) -> f64 {
        if self.obstacle_present {
            self.params.initial_distance_mm + self.position_mm
        } else {
            NO_OBSTACLE_READING_MM
        }
    }

    /// Remove or restore the obstacle (test hook).
    pub fn set_obstacle_present(&mut self, present: bool) {
        self.obstacle_present = present;
    }
}

impl SimSensor {
    /// Create a sensor attached to the given world, with the identity
    /// calibration curve.
    pub fn new(world: Arc<Mutex<SimWorld>>) -> Self {
        SimSensor {
            world,
            cal_curve: vec![1.0, 0.0],
        }
    }
}

impl DistanceSensor for SimSensor {
    fn get_distance_mm(&mut self) -> Result<f64, SensorError> {
        let raw = match self.world.lock() {
            Ok(w) => w.raw_distance_mm(),
            Err(_) => {
                return Err(SensorError::AcquisitionFailed(
                    "simulated world lock poisoned".into(),
                ))
            }
        };

        Ok(maths::poly_val(&raw, &self.cal_curve))
    }

    fn set_calibration_curve(&mut self, m: f64, q: f64) {
        debug!("Sim sensor calibration curve set to {{{}, {}}}", m, q);
        self.cal_curve = vec![m, q];
    }
}

impl SimArm {
    /// Create an arm attached to the given world.
    pub fn new(world: Arc<Mutex<SimWorld>>, params: &SimParams) -> Self {
        SimArm {
            world,
            pos_limit_lower_mm: params.pos_limit_lower_mm,
            pos_limit_upper_mm: params.pos_limit_upper_mm,
            active: true,
        }
    }
}

impl Arm for SimArm {
    fn get_position_mm(&mut self) -> f64 {
        self.world.lock().map(|w| w.position_mm).unwrap_or(0.0)
    }

    fn move_lin_vel(&mut self, vel_mms: &[f64]) -> Result<(), ArmError> {
        arm::check_vel_vector(vel_mms)?;

        if !self.active {
            return Err(ArmError::DemandRejected("arm is deactivated".into()));
        }

        if let Ok(mut world) = self.world.lock() {
            let step_s = world.params.step_s;
            let next = world.position_mm + vel_mms[0] * step_s;
            world.position_mm =
                maths::clamp(&next, &self.pos_limit_lower_mm, &self.pos_limit_upper_mm);
        }

        Ok(())
    }

    fn pos_limit_lower_mm(&self) -> f64 {
        self.pos_limit_lower_mm
    }

    fn pos_limit_upper_mm(&self) -> f64 {
        self.pos_limit_upper_mm
    }

    fn deactivate(&mut self) {
        debug!("Sim arm deactivated");
        self.active = false;
    }
}

impl ScriptedSensor {
    /// Create a sensor that replays the given raw readings in order.
    pub fn new(readings: Vec<f64>) -> Self {
        ScriptedSensor {
            readings: readings.into(),
            cal_curve: vec![1.0, 0.0],
        }
    }
}

impl DistanceSensor for ScriptedSensor {
    fn get_distance_mm(&mut self) -> Result<f64, SensorError> {
        match self.readings.pop_front() {
            Some(raw) => Ok(maths::poly_val(&raw, &self.cal_curve)),
            None => Err(SensorError::AcquisitionFailed(
                "scripted readings exhausted".into(),
            )),
        }
    }

    fn set_calibration_curve(&mut self, m: f64, q: f64) {
        self.cal_curve = vec![m, q];
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn distance_grows_as_the_arm_retreats() {
        let params = SimParams::default();
        let world = SimWorld::new(params.clone());
        let mut sensor = SimSensor::new(world.clone());
        let mut arm = SimArm::new(world, &params);

        assert_eq!(sensor.get_distance_mm().unwrap(), 100.0);

        // 1 s of retreat at 10 mm/s
        let mut vel = [0.0; arm::VEL_VECTOR_LEN];
        vel[0] = 10.0;
        for _ in 0..50 {
            arm.move_lin_vel(&vel).unwrap();
        }

        assert!((arm.get_position_mm() - 10.0).abs() < 1e-9);
        assert!((sensor.get_distance_mm().unwrap() - 110.0).abs() < 1e-9);
    }

    #[test]
    fn travel_limits_clamp_the_position() {
        let params = SimParams::default();
        let world = SimWorld::new(params.clone());
        let mut arm = SimArm::new(world, &params);

        let mut vel = [0.0; arm::VEL_VECTOR_LEN];
        vel[0] = 1000.0;
        for _ in 0..200 {
            arm.move_lin_vel(&vel).unwrap();
        }

        assert_eq!(arm.get_position_mm(), params.pos_limit_upper_mm);
    }

    #[test]
    fn malformed_demands_are_rejected_without_motion() {
        let params = SimParams::default();
        let world = SimWorld::new(params.clone());
        let mut arm = SimArm::new(world, &params);

        assert!(matches!(
            arm.move_lin_vel(&[5.0, 0.0]),
            Err(ArmError::InvalidVelocityVector { .. })
        ));
        assert_eq!(arm.get_position_mm(), 0.0);
    }

    #[test]
    fn deactivated_arm_refuses_demands() {
        let params = SimParams::default();
        let world = SimWorld::new(params.clone());
        let mut arm = SimArm::new(world, &params);

        arm.deactivate();
        assert!(matches!(
            arm.move_lin_vel(&[0.0; arm::VEL_VECTOR_LEN]),
            Err(ArmError::DemandRejected(_))
        ));
    }

    #[test]
    fn removed_obstacle_reads_far_out_of_range() {
        let params = SimParams::default();
        let world = SimWorld::new(params.clone());
        let mut sensor = SimSensor::new(world.clone());

        world.lock().unwrap().set_obstacle_present(false);
        assert_eq!(sensor.get_distance_mm().unwrap(), NO_OBSTACLE_READING_MM);

        world.lock().unwrap().set_obstacle_present(true);
        assert_eq!(sensor.get_distance_mm().unwrap(), 100.0);
    }

    #[test]
    fn scripted_sensor_applies_its_calibration() {
        let mut sensor = ScriptedSensor::new(vec![100.0, 50.0]);
        sensor.set_calibration_curve(2.0, 5.0);

        assert_eq!(sensor.get_distance_mm().unwrap(), 205.0);
        assert_eq!(sensor.get_distance_mm().unwrap(), 105.0);
        assert!(sensor.get_distance_mm().is_err());
    }
}
