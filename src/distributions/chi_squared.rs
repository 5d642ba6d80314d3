use rand::Rng;
use thiserror::Error;
use tracing::trace;

use super::gamma::{sample_gamma, Gamma, GammaError};
use super::TryDistribution;
use crate::rngs::UniformSource;
use crate::special::SpecialError;

/// Up to this many degrees of freedom a draw is a sum of squared normals
const SUM_OF_SQUARES_MAX_DOF: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ChiSquaredError {
    #[error("degrees of freedom must be at least 1 in chi-squared distribution")]
    DoFInvalid,
    #[error(transparent)]
    Special(#[from] SpecialError),
}

impl From<GammaError> for ChiSquaredError {
    fn from(err: GammaError) -> Self {
        match err {
            GammaError::Special(e) => ChiSquaredError::Special(e),
            // k / 2 and 2 are always valid gamma parameters once k >= 1
            GammaError::ShapeInvalid | GammaError::ScaleInvalid | GammaError::ParamsInfinite => {
                ChiSquaredError::DoFInvalid
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Chi-squared with `k` degrees of freedom
pub struct ChiSquared {
    pub k: u64,
}

impl ChiSquared {
    pub fn new(k: u64) -> Self {
        Self { k }
    }

    fn check(&self) -> Result<(), ChiSquaredError> {
        if self.k == 0 {
            Err(ChiSquaredError::DoFInvalid)
        } else {
            Ok(())
        }
    }

    fn as_gamma(&self) -> Gamma {
        Gamma::new(self.k as f64 / 2.0, 2.0)
    }

    pub fn pdf(&self, x: f64) -> Result<f64, ChiSquaredError> {
        self.check()?;
        Ok(self.as_gamma().pdf(x)?)
    }

    pub fn ln_pdf(&self, x: f64) -> Result<f64, ChiSquaredError> {
        self.check()?;
        Ok(self.as_gamma().ln_pdf(x)?)
    }
}

impl TryDistribution<f64> for ChiSquared {
    type Error = ChiSquaredError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, ChiSquaredError> {
        self.check()?;
        if self.k <= SUM_OF_SQUARES_MAX_DOF {
            trace!(k = self.k, "chi-squared via sum of squared normals");
            Ok((0..self.k)
                .map(|_| {
                    let z = rng.next_standard_normal();
                    z * z
                })
                .sum())
        } else {
            trace!(k = self.k, "chi-squared via gamma");
            Ok(sample_gamma(rng, self.k as f64 / 2.0, 2.0))
        }
    }
}
