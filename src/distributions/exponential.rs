use rand::Rng;
use thiserror::Error;

use super::TryDistribution;
use crate::rngs::UniformSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExponentialError {
    #[error("lambda is NaN or not positive in exponential distribution")]
    LambdaInvalid,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Exponential with rate `lambda`
pub struct Exponential {
    pub lambda: f64,
}

impl Exponential {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }

    fn check(&self) -> Result<(), ExponentialError> {
        if self.lambda.is_nan() || self.lambda <= 0.0 {
            Err(ExponentialError::LambdaInvalid)
        } else {
            Ok(())
        }
    }

    pub fn pdf(&self, x: f64) -> Result<f64, ExponentialError> {
        self.ln_pdf(x).map(f64::exp)
    }

    pub fn ln_pdf(&self, x: f64) -> Result<f64, ExponentialError> {
        self.check()?;
        Ok(if x < 0.0 {
            f64::NEG_INFINITY
        } else {
            self.lambda.ln() - self.lambda * x
        })
    }
}

impl TryDistribution<f64> for Exponential {
    type Error = ExponentialError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, ExponentialError> {
        self.check()?;
        // 1 - u lies in (0, 1], so the log is finite
        Ok(-(-rng.next_uniform()).ln_1p() / self.lambda)
    }
}
