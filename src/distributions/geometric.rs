use rand::Rng;
use thiserror::Error;

use super::TryDistribution;
use crate::rngs::UniformSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeometricError {
    #[error("p is NaN or outside (0, 1] in geometric distribution")]
    ProbabilityOutOfRange,
    #[error("k is below 1 in geometric distribution")]
    KOutOfRange,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Number of trials up to and including the first success, so the support starts at 1
pub struct Geometric {
    pub p: f64,
}

impl Geometric {
    pub fn new(p: f64) -> Self {
        Self { p }
    }

    fn check(&self) -> Result<(), GeometricError> {
        if self.p > 0.0 && self.p <= 1.0 {
            Ok(())
        } else {
            Err(GeometricError::ProbabilityOutOfRange)
        }
    }

    pub fn pmf(&self, k: u64) -> Result<f64, GeometricError> {
        self.ln_pmf(k).map(f64::exp)
    }

    pub fn ln_pmf(&self, k: u64) -> Result<f64, GeometricError> {
        self.check()?;
        if k == 0 {
            return Err(GeometricError::KOutOfRange);
        }
        let failures = (k - 1) as f64;
        let ln_q = if failures == 0.0 {
            0.0
        } else {
            failures * (-self.p).ln_1p()
        };
        Ok(ln_q + self.p.ln())
    }
}

impl TryDistribution<u64> for Geometric {
    type Error = GeometricError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<u64, GeometricError> {
        self.check()?;
        if self.p == 1.0 {
            return Ok(1);
        }
        // 1 - u lies in (0, 1]; ln(1) = 0 gives the minimum of one trial
        let u = 1.0 - rng.next_uniform();
        let trials = (u.ln() / (-self.p).ln_1p()).floor() + 1.0;
        // saturates on the far tail of tiny p
        Ok(trials as u64)
    }
}
