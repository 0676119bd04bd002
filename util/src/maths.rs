//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Apply polynomial coefficients to a value.
///
/// Coefficients are given highest order first, so a linear calibration curve
/// `m*x + q` is `poly_val(&x, &[m, q])`.
pub fn poly_val<T>(value: &T, coeffs: &[T]) -> T
where
    T: Float + std::ops::Mul + std::ops::Add + std::ops::AddAssign,
{
    let mut res = T::from(0).unwrap();

    for i in 0..(coeffs.len() as i32) {
        res += value.powi(coeffs.len() as i32 - 1 - i) * coeffs[i as usize];
    }

    res
}

/// Limit a value to the range `[min, max]`.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_poly_val() {
        // Identity calibration curve
        assert_eq!(poly_val(&42.0f64, &[1.0, 0.0]), 42.0);

        // Linear curve with slope and intercept
        assert_eq!(poly_val(&10.0f64, &[2.0, 5.0]), 25.0);

        // Quadratic
        assert_eq!(poly_val(&3.0f64, &[1.0, 0.0, -9.0]), 0.0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&5.0f64, &-1.0, &1.0), 1.0);
        assert_eq!(clamp(&-5.0f64, &-1.0, &1.0), -1.0);
        assert_eq!(clamp(&0.5f64, &-1.0, &1.0), 0.5);
    }
}
