//! Shared operator parameters
//!
//! The single piece of state shared between the control loop and the
//! operator console. The console writes, the control loop reads; every
//! field is a lock-free atomic so the loop never blocks on operator input.
//!
//! Float values are stored as `u64` bit patterns. The target distance and
//! the calibration curve each carry a generation counter, bumped with
//! `Release` ordering after the value store: a reader that observes a new
//! generation (with `Acquire`) is guaranteed to observe the matching value.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Thread-safe operator-settable parameters.
#[derive(Debug)]
pub struct ParamStore {
    target_distance_bits: AtomicU64,
    target_generation: AtomicU32,

    cal_m_bits: AtomicU64,
    cal_q_bits: AtomicU64,
    cal_generation: AtomicU32,

    paused: AtomicBool,
    running: AtomicBool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ParamStore {
    /// Create a store with the given initial target distance and
    /// calibration curve. The store starts running and unpaused, at
    /// generation zero for both values.
    pub fn new(target_distance_mm: f64, cal_m: f64, cal_q: f64) -> Self {
        ParamStore {
            target_distance_bits: AtomicU64::new(target_distance_mm.to_bits()),
            target_generation: AtomicU32::new(0),
            cal_m_bits: AtomicU64::new(cal_m.to_bits()),
            cal_q_bits: AtomicU64::new(cal_q.to_bits()),
            cal_generation: AtomicU32::new(0),
            paused: AtomicBool::new(false),
            running: AtomicBool::new(true),
        }
    }

    // ---- TARGET DISTANCE ----

    /// Set the target stand-off distance. The control loop arms a new
    /// reference ramp when it sees the generation change.
    pub fn set_target_distance_mm(&self, target_mm: f64) {
        self.target_distance_bits
            .store(target_mm.to_bits(), Ordering::Relaxed);
        self.target_generation.fetch_add(1, Ordering::Release);
    }

    /// Current target stand-off distance [mm].
    pub fn target_distance_mm(&self) -> f64 {
        f64::from_bits(self.target_distance_bits.load(Ordering::Relaxed))
    }

    /// Generation counter of the target distance.
    pub fn target_generation(&self) -> u32 {
        self.target_generation.load(Ordering::Acquire)
    }

    // ---- CALIBRATION ----

    /// Set the sensor calibration curve. The control loop forwards it to
    /// the sensor when it sees the generation change.
    pub fn set_calibration(&self, m: f64, q: f64) {
        self.cal_m_bits.store(m.to_bits(), Ordering::Relaxed);
        self.cal_q_bits.store(q.to_bits(), Ordering::Relaxed);
        self.cal_generation.fetch_add(1, Ordering::Release);
    }

    /// Current calibration curve `(m, q)`.
    pub fn calibration(&self) -> (f64, f64) {
        (
            f64::from_bits(self.cal_m_bits.load(Ordering::Relaxed)),
            f64::from_bits(self.cal_q_bits.load(Ordering::Relaxed)),
        )
    }

    /// Generation counter of the calibration curve.
    pub fn cal_generation(&self) -> u32 {
        self.cal_generation.load(Ordering::Acquire)
    }

    // ---- PAUSE ----

    /// Toggle the paused flag, returning the new state.
    pub fn toggle_paused(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::Relaxed)
    }

    /// Set the paused flag directly.
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    /// True if the control loop should hold at zero velocity.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    // ---- RUN/STOP ----

    /// Request a graceful shutdown of both tasks. Observed by the control
    /// loop at the top of its next tick.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// True until a stop has been requested.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn target_updates_bump_the_generation_once() {
        let store = ParamStore::new(50.0, 1.0, 0.0);
        assert_eq!(store.target_generation(), 0);
        assert_eq!(store.target_distance_mm(), 50.0);

        store.set_target_distance_mm(80.0);
        assert_eq!(store.target_generation(), 1);
        assert_eq!(store.target_distance_mm(), 80.0);

        store.set_target_distance_mm(80.0);
        assert_eq!(store.target_generation(), 2);
    }

    #[test]
    fn calibration_round_trips() {
        let store = ParamStore::new(50.0, 1.0, 0.0);
        assert_eq!(store.calibration(), (1.0, 0.0));

        store.set_calibration(1.5, -2.25);
        assert_eq!(store.calibration(), (1.5, -2.25));
        assert_eq!(store.cal_generation(), 1);
    }

    #[test]
    fn pause_toggles_strictly_alternate() {
        let store = ParamStore::new(50.0, 1.0, 0.0);
        assert!(!store.is_paused());

        assert!(store.toggle_paused());
        assert!(store.is_paused());

        assert!(!store.toggle_paused());
        assert!(!store.is_paused());

        assert!(store.toggle_paused());
        assert!(store.is_paused());
    }

    #[test]
    fn stop_is_a_latch() {
        let store = ParamStore::new(50.0, 1.0, 0.0);
        assert!(store.is_running());

        store.request_stop();
        assert!(!store.is_running());

        store.request_stop();
        assert!(!store.is_running());
    }

    #[test]
    fn concurrent_writers_never_tear_a_float() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(ParamStore::new(50.0, 1.0, 0.0));

        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..1000 {
                    store.set_target_distance_mm(i as f64);
                }
            })
        };

        // Every observed value must be one the writer actually stored
        for _ in 0..1000 {
            let v = store.target_distance_mm();
            assert!(v == 50.0 || (v >= 0.0 && v < 1000.0 && v.fract() == 0.0));
        }

        writer.join().unwrap();
    }
}
