//! RNG trait abstraction for the reactor simulation
//!
//! The reactor owns its random source so a run can be replayed exactly:
//! - seeded Xoshiro in tests and the headless runner
//! - whatever `rand::Rng` the host hands over in a live game

/// Random number generator trait for reactor simulation
pub trait ReactorRng {
    /// Generate random f32 in [0.0, 1.0)
    fn gen_f32(&mut self) -> f32;

    /// Generate a u32 in `low..=high`
    fn gen_range_u32(&mut self, low: u32, high: u32) -> u32;

    /// Roll a percentage chance. Anything at or above 100 always succeeds,
    /// and succeeds only once.
    fn prob(&mut self, percent: f32) -> bool {
        self.gen_f32() * 100.0 < percent
    }
}

impl<T: rand::Rng> ReactorRng for T {
    fn gen_f32(&mut self) -> f32 {
        rand::Rng::gen(self)
    }

    fn gen_range_u32(&mut self, low: u32, high: u32) -> u32 {
        if low >= high {
            return low;
        }
        rand::Rng::gen_range(self, low..=high)
    }
}
