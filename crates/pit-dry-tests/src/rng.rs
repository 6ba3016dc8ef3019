// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Deterministic xorshift generator for reproducible test instances.

/// Simple deterministic PRNG (xorshift64*).
///
/// Not cryptographically secure; only used so randomized tests replay
/// exactly from a seed.
#[derive(Debug, Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// Creates a new PRNG with the given seed.
    ///
    /// If `seed` is 0, it is replaced with 1 (zero seeds would produce
    /// all-zero output in xorshift).
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    /// Returns the next pseudo-random `u64` in the xorshift64* sequence.
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Returns a pseudo-random value in `[0, upper)`.
    ///
    /// Modulo reduction; slightly biased when `upper` is not a power of two.
    pub fn gen_range_usize(&mut self, upper: usize) -> usize {
        if upper <= 1 {
            return 0;
        }
        (self.next_u64() % upper as u64) as usize
    }

    /// Returns an integer-valued `f64` in `[lo, hi]`.
    ///
    /// Integer values keep sums exact, so engines can be compared with `==`.
    pub fn gen_value(&mut self, lo: i32, hi: i32) -> f64 {
        if hi <= lo {
            return f64::from(lo);
        }
        let span = (i64::from(hi) - i64::from(lo) + 1) as usize;
        let offset = self.gen_range_usize(span) as i64;
        (i64::from(lo) + offset) as f64
    }

    /// Returns `true` with probability `numerator / denominator`.
    pub fn gen_ratio(&mut self, numerator: usize, denominator: usize) -> bool {
        self.gen_range_usize(denominator) < numerator
    }
}
