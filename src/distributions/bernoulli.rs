use rand::Rng;
use thiserror::Error;

use super::TryDistribution;
use crate::rngs::UniformSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BernoulliError {
    #[error("p is NaN or outside [0, 1] in Bernoulli distribution")]
    ProbabilityOutOfRange,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// A single trial that succeeds with probability `p`
pub struct Bernoulli {
    pub p: f64,
}

impl Bernoulli {
    pub fn new(p: f64) -> Self {
        Self { p }
    }

    fn check(&self) -> Result<(), BernoulliError> {
        if (0.0..=1.0).contains(&self.p) {
            Ok(())
        } else {
            Err(BernoulliError::ProbabilityOutOfRange)
        }
    }

    pub fn pmf(&self, outcome: bool) -> Result<f64, BernoulliError> {
        self.check()?;
        Ok(if outcome { self.p } else { 1.0 - self.p })
    }

    pub fn ln_pmf(&self, outcome: bool) -> Result<f64, BernoulliError> {
        self.pmf(outcome).map(f64::ln)
    }
}

impl TryDistribution<bool> for Bernoulli {
    type Error = BernoulliError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<bool, BernoulliError> {
        self.check()?;
        Ok(rng.next_uniform() < self.p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_frequency() {
        let mut rng = StdRng::seed_from_u64(4);
        let hits = Bernoulli::new(0.3)
            .try_sample_n(&mut rng, 20_000)
            .unwrap()
            .into_iter()
            .filter(|&b| b)
            .count();
        let freq = hits as f64 / 20_000.0;
        assert!((freq - 0.3).abs() < 0.02, "freq = {}", freq);
    }

    #[test]
    fn test_extremes() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..1_000 {
            assert_eq!(Bernoulli::new(0.0).try_sample(&mut rng), Ok(false));
            assert_eq!(Bernoulli::new(1.0).try_sample(&mut rng), Ok(true));
        }
    }

    #[test]
    fn test_pmf() {
        assert_eq!(Bernoulli::new(0.3).pmf(true), Ok(0.3));
        assert_eq!(Bernoulli::new(0.25).pmf(false), Ok(0.75));
        assert_eq!(Bernoulli::new(0.0).ln_pmf(true), Ok(f64::NEG_INFINITY));
        assert_eq!(
            Bernoulli::new(1.2).pmf(true),
            Err(BernoulliError::ProbabilityOutOfRange)
        );
    }
}
