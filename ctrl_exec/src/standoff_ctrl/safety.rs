//! Safety governor
//!
//! A hard gate between the regulator output and the arm: whatever the
//! regulator asks for, the arm is never driven past its known travel limits
//! and never faster than the configured speed limit. The governor is
//! stateless and independent of regulator correctness.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;
use util::maths;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Flags raised when the governor alters the demanded velocity.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct GovernorReport {
    /// The demand would have pushed past a travel limit and was zeroed.
    pub travel_limited: bool,

    /// The demand exceeded the speed limit and was clamped.
    pub speed_limited: bool,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Gate a velocity demand against the axis travel limits and speed limit.
///
/// At or beyond the upper travel limit positive (outward) velocity is
/// forced to zero; at or beyond the lower limit negative velocity is forced
/// to zero. Motion back towards the working range always passes. The
/// surviving demand is clamped to `[-max_speed_mms, max_speed_mms]`.
pub fn govern(
    velocity_mms: f64,
    position_mm: f64,
    lower_limit_mm: f64,
    upper_limit_mm: f64,
    max_speed_mms: f64,
) -> (f64, GovernorReport) {
    let mut report = GovernorReport::default();
    let mut velocity = velocity_mms;

    if position_mm >= upper_limit_mm && velocity > 0.0 {
        velocity = 0.0;
        report.travel_limited = true;
    } else if position_mm <= lower_limit_mm && velocity < 0.0 {
        velocity = 0.0;
        report.travel_limited = true;
    }

    let limited = maths::clamp(&velocity, &-max_speed_mms, &max_speed_mms);
    if limited != velocity {
        report.speed_limited = true;
    }

    (limited, report)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const LOWER: f64 = -100.0;
    const UPPER: f64 = 100.0;
    const MAX_SPEED: f64 = 50.0;

    #[test]
    fn outward_motion_at_the_upper_limit_is_stopped() {
        let (v, r) = govern(3.0, UPPER, LOWER, UPPER, MAX_SPEED);
        assert_eq!(v, 0.0);
        assert!(r.travel_limited);
    }

    #[test]
    fn inward_motion_at_the_upper_limit_passes() {
        let (v, r) = govern(-3.0, UPPER, LOWER, UPPER, MAX_SPEED);
        assert_eq!(v, -3.0);
        assert!(!r.travel_limited);
    }

    #[test]
    fn inward_motion_at_the_lower_limit_is_stopped() {
        let (v, r) = govern(-3.0, LOWER, LOWER, UPPER, MAX_SPEED);
        assert_eq!(v, 0.0);
        assert!(r.travel_limited);
    }

    #[test]
    fn motion_inside_the_limits_passes_through() {
        let (v, r) = govern(3.0, 0.0, LOWER, UPPER, MAX_SPEED);
        assert_eq!(v, 3.0);
        assert!(!r.travel_limited);
        assert!(!r.speed_limited);
    }

    #[test]
    fn excessive_speed_is_clamped() {
        let (v, r) = govern(80.0, 0.0, LOWER, UPPER, MAX_SPEED);
        assert_eq!(v, MAX_SPEED);
        assert!(r.speed_limited);

        let (v, r) = govern(-80.0, 0.0, LOWER, UPPER, MAX_SPEED);
        assert_eq!(v, -MAX_SPEED);
        assert!(r.speed_limited);
    }
}
