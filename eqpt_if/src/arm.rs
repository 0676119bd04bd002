//! # Arm equipment contract

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use thiserror::Error;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Number of elements in a linear velocity demand vector.
///
/// The demand covers all six Cartesian components; this software commands
/// only the first element and holds the others at zero.
pub const VEL_VECTOR_LEN: usize = 6;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Contract for the arm's motion controller.
///
/// Positions and velocities refer to the single controlled axis. Positive
/// velocity moves the end-effector away from the obstacle.
pub trait Arm {
    /// Current position of the controlled axis.
    ///
    /// Units: millimeters
    fn get_position_mm(&mut self) -> f64;

    /// Command a linear velocity.
    ///
    /// The demand must have exactly [`VEL_VECTOR_LEN`] elements; anything
    /// else is rejected without moving the arm.
    ///
    /// Units: millimeters/second
    fn move_lin_vel(&mut self, vel_mms: &[f64]) -> Result<(), ArmError>;

    /// Lower travel limit of the controlled axis.
    ///
    /// Units: millimeters
    fn pos_limit_lower_mm(&self) -> f64;

    /// Upper travel limit of the controlled axis.
    ///
    /// Units: millimeters
    fn pos_limit_upper_mm(&self) -> f64;

    /// Deactivate the arm. Called once during shutdown, after a zero
    /// velocity demand.
    fn deactivate(&mut self);
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors raised by an arm driver.
#[derive(Debug, Error)]
pub enum ArmError {
    #[error("Expected a velocity vector of {expected} elements, found {found}")]
    InvalidVelocityVector { expected: usize, found: usize },

    #[error("The arm rejected the demand: {0}")]
    DemandRejected(String),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Validate the element count of a velocity demand vector.
///
/// Drivers call this before actuating so a malformed demand never produces
/// any motion.
pub fn check_vel_vector(vel_mms: &[f64]) -> Result<(), ArmError> {
    if vel_mms.len() != VEL_VECTOR_LEN {
        return Err(ArmError::InvalidVelocityVector {
            expected: VEL_VECTOR_LEN,
            found: vel_mms.len(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
