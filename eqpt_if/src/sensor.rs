//! # Distance sensor equipment contract

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Contract for a calibrated proximity sensor.
///
/// Readings are signed millimetres along the controlled axis; larger values
/// mean the obstacle is further away. Implementations apply the linear
/// calibration curve `distance = m*raw + q` before returning a reading.
///
/// An out-of-range reading (obstacle removed, or something pressed against
/// the sensor face) is *not* an error: the driver returns whatever the
/// sensor saw and the control software decides whether it is usable.
pub trait DistanceSensor {
    /// Take one calibrated distance sample.
    ///
    /// Units: millimeters
    fn get_distance_mm(&mut self) -> Result<f64, SensorError>;

    /// Replace the linear calibration curve applied to raw readings.
    fn set_calibration_curve(&mut self, m: f64, q: f64);
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised by a sensor driver.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("Could not acquire a sample from the sensor: {0}")]
    AcquisitionFailed(String),
}
