//! Discrete-time regulator
//!
//! Implements the difference equation
//!
//! `y[k] = sum_i(a[i] * u[k-i]) + sum_j(b[j] * y[k-1-j])`
//!
//! where `u` is the distance error and `y` the velocity demand. The
//! coefficients `a` (feedforward) and `b` (feedback) are configuration,
//! derived offline from a pole/zero/gain design - nothing in this module
//! depends on their values.

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Fixed-capacity sample history with a rotating head.
///
/// Logical index 0 is always the most recent sample. Pushing rotates the
/// head instead of shifting every element, so inserts are O(1).
#[derive(Clone, Debug)]
struct History {
    samples: Vec<f64>,
    head: usize,
}

/// Discrete-time regulator state.
///
/// Holds the input (error) and output (velocity) histories together with
/// the transfer function coefficients. Each history length always equals
/// the matching coefficient count; callers guarantee the coefficient
/// vectors are non-empty (the module parameters are validated at init).
#[derive(Clone, Debug)]
pub struct Regulator {
    input_coefficients: Vec<f64>,
    output_coefficients: Vec<f64>,
    previous_inputs: History,
    previous_outputs: History,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl History {
    fn new(len: usize) -> Self {
        History {
            samples: vec![0.0; len],
            head: 0,
        }
    }

    /// Insert a new most-recent sample, discarding the oldest.
    fn push(&mut self, sample: f64) {
        self.head = (self.head + self.samples.len() - 1) % self.samples.len();
        self.samples[self.head] = sample;
    }

    /// Dot product of the history with a coefficient vector of equal length.
    fn dot(&self, coefficients: &[f64]) -> f64 {
        let n = self.samples.len();
        coefficients
            .iter()
            .enumerate()
            .map(|(i, c)| c * self.samples[(self.head + i) % n])
            .sum()
    }

    /// Zero every sample without touching the capacity.
    fn clear(&mut self) {
        for sample in self.samples.iter_mut() {
            *sample = 0.0;
        }
    }
}

impl Regulator {
    /// Build a regulator from its transfer function coefficients, most
    /// recent sample first. Both histories start zeroed.
    pub fn new(input_coefficients: Vec<f64>, output_coefficients: Vec<f64>) -> Self {
        let previous_inputs = History::new(input_coefficients.len());
        let previous_outputs = History::new(output_coefficients.len());

        Regulator {
            input_coefficients,
            output_coefficients,
            previous_inputs,
            previous_outputs,
        }
    }

    /// Advance the regulator by one sample and return the new output.
    pub fn calculate_output(&mut self, error: f64) -> f64 {
        // The current error becomes the most recent input sample
        self.previous_inputs.push(error);

        let feedforward = self.previous_inputs.dot(&self.input_coefficients);
        let feedback = self.previous_outputs.dot(&self.output_coefficients);

        let output = feedforward + feedback;
        self.previous_outputs.push(output);

        output
    }

    /// Zero both histories, leaving the coefficients untouched.
    ///
    /// Called whenever control resumes from rest, so a stale history cannot
    /// drive a transient into the first new command.
    pub fn reset(&mut self) {
        self.previous_inputs.clear();
        self.previous_outputs.clear();
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Coefficients from the shipped pole/zero/gain design.
    fn shipped_regulator() -> Regulator {
        Regulator::new(vec![1.6334, -1.301], vec![1.2, -0.36])
    }

    #[test]
    fn first_sample_is_scaled_by_the_leading_coefficient() {
        // Histories are empty, so only a[0]*u[0] contributes
        let mut reg = shipped_regulator();
        let out = reg.calculate_output(5.0);
        assert!((out - 8.167).abs() < 1e-9);
    }

    #[test]
    fn zero_error_from_rest_gives_zero_output() {
        let mut reg = shipped_regulator();
        for _ in 0..50 {
            assert_eq!(reg.calculate_output(0.0), 0.0);
        }
    }

    #[test]
    fn feedback_enters_on_the_second_sample() {
        // One nonzero error followed by zero:
        // y[1] = a[1]*u[0] + b[0]*y[0]
        let mut reg = shipped_regulator();
        let y0 = reg.calculate_output(5.0);
        let y1 = reg.calculate_output(0.0);
        let expected = -1.301 * 5.0 + 1.2 * y0;
        assert!((y1 - expected).abs() < 1e-9);
    }

    #[test]
    fn reset_clears_the_histories() {
        let mut reg = shipped_regulator();
        for i in 0..10 {
            reg.calculate_output(i as f64);
        }

        reg.reset();

        // With zeroed histories the regulator must behave exactly as a
        // fresh one
        for _ in 0..20 {
            assert_eq!(reg.calculate_output(0.0), 0.0);
        }
    }

    #[test]
    fn longer_coefficient_vectors_are_supported() {
        // A pure 4-tap FIR: output is the dot of the last four errors
        let mut reg = Regulator::new(vec![1.0, 2.0, 3.0, 4.0], vec![0.0]);
        reg.calculate_output(1.0);
        reg.calculate_output(10.0);
        reg.calculate_output(100.0);
        let out = reg.calculate_output(1000.0);
        // u = [1000, 100, 10, 1] -> 1000 + 200 + 30 + 4
        assert!((out - 1234.0).abs() < 1e-9);
    }
}
