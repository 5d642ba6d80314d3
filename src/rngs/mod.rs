//! Sources of uniform randomness consumed by the distributions in this crate

use rand::Rng;
use rand_core::RngCore;
use rand_distr::StandardNormal;

mod replay;
pub use replay::ReplayRng;

/// The capability every sampler draws from.
///
/// Implemented for every [`RngCore`], so any `rand` generator can be passed to
/// [`TryDistribution::try_sample`](crate::TryDistribution::try_sample). The normal and
/// bounded-integer mechanics belong to the source, not to the samplers.
pub trait UniformSource {
    /// One draw from `[0, 1)`
    fn next_uniform(&mut self) -> f64;
    /// One draw from N(0, 1)
    fn next_standard_normal(&mut self) -> f64;
    /// One integer from `low..=high`. Callers guarantee `low <= high`
    fn next_int_in_range(&mut self, low: i64, high: i64) -> i64;
}

impl<R: RngCore + ?Sized> UniformSource for R {
    #[inline]
    fn next_uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    #[inline]
    fn next_standard_normal(&mut self) -> f64 {
        self.sample(StandardNormal)
    }

    #[inline]
    fn next_int_in_range(&mut self, low: i64, high: i64) -> i64 {
        self.gen_range(low..=high)
    }
}
