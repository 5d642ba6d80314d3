use rand::Rng;
use thiserror::Error;

use super::gamma::sample_gamma;
use super::TryDistribution;
use crate::rngs::UniformSource;
use crate::special::{log_beta, xlog1py, xlogy, SpecialError};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BetaError {
    #[error("alpha is NaN, infinite or not positive in beta distribution")]
    AlphaLessThanZero,
    #[error("beta is NaN, infinite or not positive in beta distribution")]
    BetaLessThanZero,
    #[error("x is outside [0, 1] in beta distribution")]
    XOutOfRange,
    #[error(transparent)]
    Special(#[from] SpecialError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Beta(alpha, beta) on `[0, 1]`
pub struct Beta {
    pub alpha: f64,
    pub beta: f64,
}

impl Beta {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    fn check(&self) -> Result<(), BetaError> {
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            return Err(BetaError::AlphaLessThanZero);
        }
        if !self.beta.is_finite() || self.beta <= 0.0 {
            return Err(BetaError::BetaLessThanZero);
        }
        Ok(())
    }

    pub fn pdf(&self, x: f64) -> Result<f64, BetaError> {
        self.ln_pdf(x).map(f64::exp)
    }

    pub fn ln_pdf(&self, x: f64) -> Result<f64, BetaError> {
        self.check()?;
        if !(0.0..=1.0).contains(&x) {
            return Err(BetaError::XOutOfRange);
        }
        Ok(xlogy(self.alpha - 1.0, x) + xlog1py(self.beta - 1.0, -x)
            - log_beta(self.alpha, self.beta)?)
    }
}

impl TryDistribution<f64> for Beta {
    type Error = BetaError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, BetaError> {
        self.check()?;
        if self.alpha <= 1.0 && self.beta <= 1.0 {
            Ok(sample_johnk(rng, self.alpha, self.beta))
        } else {
            let x1 = sample_gamma(rng, self.alpha, 1.0);
            let x2 = sample_gamma(rng, self.beta, 1.0);
            Ok(x1 / (x1 + x2))
        }
    }
}

/// Jöhnk's acceptance scheme for alpha, beta <= 1
fn sample_johnk<R: Rng + ?Sized>(rng: &mut R, alpha: f64, beta: f64) -> f64 {
    loop {
        let u = rng.next_uniform();
        let v = rng.next_uniform();
        let x = u.powf(1.0 / alpha);
        let y = v.powf(1.0 / beta);
        let sum = x + y;
        if sum > 1.0 {
            continue;
        }
        if sum > 0.0 {
            return x / sum;
        }

        // both powers underflowed: take the ratio in the log domain
        let ln_x = u.ln() / alpha;
        let ln_y = v.ln() / beta;
        let ln_max = ln_x.max(ln_y);
        if ln_max == f64::NEG_INFINITY {
            continue;
        }
        let (ln_x, ln_y) = (ln_x - ln_max, ln_y - ln_max);
        return (ln_x - (ln_x.exp() + ln_y.exp()).ln()).exp();
    }
}
