use std::f64::consts::PI;

use rand::Rng;
use thiserror::Error;

use super::TryDistribution;
use crate::rngs::UniformSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CauchyError {
    #[error("location is not finite in Cauchy distribution")]
    LocationInvalid,
    #[error("scale is NaN or not positive in Cauchy distribution")]
    ScaleTooSmall,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Cauchy with location `x0` and scale `gamma`
pub struct Cauchy {
    pub x0: f64,
    pub gamma: f64,
}

impl Cauchy {
    pub fn new(x0: f64, gamma: f64) -> Self {
        Self { x0, gamma }
    }

    fn check(&self) -> Result<(), CauchyError> {
        if !self.x0.is_finite() {
            return Err(CauchyError::LocationInvalid);
        }
        if self.gamma.is_nan() || self.gamma <= 0.0 {
            return Err(CauchyError::ScaleTooSmall);
        }
        Ok(())
    }

    pub fn pdf(&self, x: f64) -> Result<f64, CauchyError> {
        self.check()?;
        let z = (x - self.x0) / self.gamma;
        Ok(1.0 / (PI * self.gamma * (1.0 + z * z)))
    }

    pub fn ln_pdf(&self, x: f64) -> Result<f64, CauchyError> {
        self.check()?;
        let z = (x - self.x0) / self.gamma;
        Ok(-(PI * self.gamma).ln() - (z * z).ln_1p())
    }
}

impl TryDistribution<f64> for Cauchy {
    type Error = CauchyError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, CauchyError> {
        self.check()?;
        let u = loop {
            let u = rng.next_uniform();
            if u != 0.5 {
                break u;
            }
        };
        Ok(self.x0 + self.gamma * (PI * (u - 0.5)).tan())
    }
}
