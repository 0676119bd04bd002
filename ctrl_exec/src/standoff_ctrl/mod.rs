//! Standoff control module
//!
//! Holds the end-effector at a target stand-off distance from an obstacle by
//! converting the distance error into an axis velocity demand once per
//! control cycle. The chain is: reference ramp -> discrete regulator ->
//! safety governor, with a range recovery machine gating the whole chain
//! whenever the sensor reading leaves its validity envelope.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod recovery;
mod ref_traj;
mod regulator;
mod safety;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use recovery::*;
pub use ref_traj::*;
pub use regulator::*;
pub use safety::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during StandoffCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum StandoffCtrlError {
    #[error("Error loading the parameter file: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid parameter set: {0}")]
    InvalidParams(String),
}
