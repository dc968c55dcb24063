//! RNG module - seedable random source for board generation
//!
//! Board layout and pair draws must be reproducible in tests, so every random
//! decision goes through [`RandomSource`]. [`SimpleRng`] is the default LCG
//! implementation; hosts can inject their own source.

/// Source of randomness used by the board generator.
pub trait RandomSource {
    /// Generate next random u32
    fn next_u32(&mut self) -> u32;

    /// Generate random value in range [0, max)
    ///
    /// Uses rejection sampling so every value is equally likely.
    fn next_range(&mut self, max: u32) -> u32 {
        debug_assert!(max > 0);
        let zone = u32::MAX - (u32::MAX % max);
        loop {
            let v = self.next_u32();
            if v < zone {
                return v % max;
            }
        }
    }

    /// Shuffle a slice using Fisher-Yates
    fn shuffle<T>(&mut self, slice: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..slice.len()).rev() {
            let j = self.next_range((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Current internal state, usable as a seed to replay from this point.
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl RandomSource for SimpleRng {
    fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        // The low bits of a power-of-two LCG cycle with short periods; mix the high
        // half down before handing the value out.
        self.state ^ (self.state >> 16)
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}
