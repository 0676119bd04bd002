//! # Equipment interface crate.
//!
//! Provides the contracts between the control software and its equipment.
//! Hardware drivers and the simulated equipment both implement these traits,
//! so the control loop never depends on what is actually attached.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Arm (motion controller) contract
pub mod arm;

/// Distance sensor contract
pub mod sensor;
