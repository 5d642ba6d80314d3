use rand::Rng;
use thiserror::Error;

use super::gamma::sample_gamma;
use super::poisson::{check_lambda, sample_poisson, PoissonError};
use super::TryDistribution;
use crate::special::{count_arg, log_factorial, log_gamma, xlog1py, SpecialError};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum NegativeBinomialError {
    #[error("number of successes is NaN, infinite or not positive in negative binomial distribution")]
    BadNumSuccesses,
    #[error("success probability is NaN or outside (0, 1] in negative binomial distribution")]
    BadProbSuccess,
    #[error("gamma-poisson mixture failed: {0}")]
    Poisson(#[from] PoissonError),
    #[error(transparent)]
    Special(#[from] SpecialError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Number of failures before the `r`-th success, each trial succeeding with probability
/// `p`. `r` need not be an integer
pub struct NegativeBinomial {
    pub r: f64,
    pub p: f64,
}

impl NegativeBinomial {
    pub fn new(r: f64, p: f64) -> Self {
        Self { r, p }
    }

    fn check(&self) -> Result<(), NegativeBinomialError> {
        if !self.r.is_finite() || self.r <= 0.0 {
            return Err(NegativeBinomialError::BadNumSuccesses);
        }
        if !(self.p > 0.0 && self.p <= 1.0) {
            return Err(NegativeBinomialError::BadProbSuccess);
        }
        Ok(())
    }

    pub fn pmf(&self, k: u64) -> Result<f64, NegativeBinomialError> {
        self.ln_pmf(k).map(f64::exp)
    }

    pub fn ln_pmf(&self, k: u64) -> Result<f64, NegativeBinomialError> {
        self.check()?;
        let kf = k as f64;
        let ln_choose = log_gamma(kf + self.r)?
            - log_factorial(count_arg("log_factorial", k)?)?
            - log_gamma(self.r)?;
        Ok(ln_choose + self.r * self.p.ln() + xlog1py(kf, -self.p))
    }
}

impl TryDistribution<u64> for NegativeBinomial {
    type Error = NegativeBinomialError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<u64, NegativeBinomialError> {
        self.check()?;
        if self.p == 1.0 {
            return Ok(0);
        }
        // Poisson(Y) with Y ~ Gamma(r, (1 - p) / p)
        let lambda = sample_gamma(rng, self.r, (1.0 - self.p) / self.p);
        check_lambda(lambda)?;
        Ok(sample_poisson(rng, lambda)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rngs::ReplayRng;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_moments() {
        // mean r (1 - p) / p = 6, variance mean / p = 15
        let mut rng = StdRng::seed_from_u64(77);
        let dist = NegativeBinomial::new(4.0, 0.4);
        let draws = dist.try_sample_n(&mut rng, 40_000).unwrap();
        let mean = draws.iter().sum::<u64>() as f64 / draws.len() as f64;
        let var = draws
            .iter()
            .map(|&k| (k as f64 - mean).powi(2))
            .sum::<f64>()
            / draws.len() as f64;
        assert!((mean - 6.0).abs() < 0.1, "mean = {}", mean);
        assert!((var - 15.0).abs() < 0.8, "var = {}", var);
    }

    #[test]
    fn test_certain_success_draws_nothing() {
        let mut rng = ReplayRng::from_seed(vec![]);
        assert_eq!(NegativeBinomial::new(3.0, 1.0).try_sample(&mut rng), Ok(0));
    }

    #[test]
    fn test_pmf() {
        // r = 3, p = 0.5, k = 2: C(4, 2) 0.5^5
        let dist = NegativeBinomial::new(3.0, 0.5);
        assert_relative_eq!(dist.pmf(2).unwrap(), 6.0 / 32.0, max_relative = 1e-12);
        let total: f64 = (0..200).map(|k| dist.pmf(k).unwrap()).sum();
        assert_relative_eq!(total, 1.0, max_relative = 1e-10);
    }

    #[test]
    fn test_errors() {
        let mut rng = ReplayRng::from_seed(vec![]);
        assert_eq!(
            NegativeBinomial::new(0.0, 0.5).try_sample(&mut rng),
            Err(NegativeBinomialError::BadNumSuccesses)
        );
        assert_eq!(
            NegativeBinomial::new(2.0, 0.0).try_sample(&mut rng),
            Err(NegativeBinomialError::BadProbSuccess)
        );
        assert_eq!(
            NegativeBinomial::new(2.0, 1.5).pmf(1),
            Err(NegativeBinomialError::BadProbSuccess)
        );
    }
}
