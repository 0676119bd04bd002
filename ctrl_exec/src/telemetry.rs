//! Telemetry definitions and archiving
//!
//! One row per control tick. The column layout matches the historical
//! test-bench logger, so existing analysis scripts keep working.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use serde::Serialize;

// Internal
use util::archive::Archiver;
use util::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// One tick of control telemetry. Immutable once produced.
///
/// Field order defines the CSV column order:
/// `time,reference,position,measured_distance,error,velocity_control`.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct TelemetrySample {
    /// Logical time of the tick [s]
    pub time: f64,

    /// Reference distance [mm]
    pub reference: f64,

    /// Arm axis position [mm]
    pub position: f64,

    /// Measured (calibrated) distance [mm]
    pub measured_distance: f64,

    /// Regulator input error [mm]
    pub error: f64,

    /// Commanded axis velocity [mm/s]
    pub velocity_control: f64,
}

/// Writes telemetry rows into the session archive.
pub struct TelemetryArchive {
    arch: Archiver,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TelemetryArchive {
    /// Open `standoff_ctrl/telemetry.csv` inside the session's archive
    /// root. The header row is written once, with the first sample.
    pub fn new(session: &Session) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(TelemetryArchive {
            arch: Archiver::from_path(session, "standoff_ctrl/telemetry.csv")?,
        })
    }

    /// Append one row. Archiving failures are logged but never fatal to the
    /// control loop.
    pub fn append(&mut self, sample: &TelemetrySample) {
        if let Err(e) = self.arch.serialise(*sample) {
            warn!("Could not archive telemetry row: {}", e);
        }
    }
}
