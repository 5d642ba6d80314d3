use rand::Rng;
use thiserror::Error;

use super::TryDistribution;
use crate::rngs::UniformSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UniformError {
    #[error("uniform range is empty or not finite: requires low < high (low <= high for integers)")]
    InvalidRange,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Continuous uniform on `[low, high)`
pub struct Uniform {
    pub low: f64,
    pub high: f64,
}

impl Uniform {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    fn check(&self) -> Result<(), UniformError> {
        if self.low.is_finite() && self.high.is_finite() && self.low < self.high {
            Ok(())
        } else {
            Err(UniformError::InvalidRange)
        }
    }

    pub fn pdf(&self, x: f64) -> Result<f64, UniformError> {
        self.check()?;
        Ok(if (self.low..self.high).contains(&x) {
            1.0 / (self.high - self.low)
        } else {
            0.0
        })
    }

    pub fn ln_pdf(&self, x: f64) -> Result<f64, UniformError> {
        self.pdf(x).map(f64::ln)
    }
}

impl TryDistribution<f64> for Uniform {
    type Error = UniformError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, UniformError> {
        self.check()?;
        Ok(self.low + (self.high - self.low) * rng.next_uniform())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Discrete uniform on `low..=high`
pub struct UniformInt {
    pub low: i64,
    pub high: i64,
}

impl UniformInt {
    pub fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }

    fn check(&self) -> Result<(), UniformError> {
        if self.low <= self.high {
            Ok(())
        } else {
            Err(UniformError::InvalidRange)
        }
    }

    pub fn pmf(&self, k: i64) -> Result<f64, UniformError> {
        self.check()?;
        Ok(if (self.low..=self.high).contains(&k) {
            // the span of i64::MIN..=i64::MAX does not fit in an i64
            1.0 / ((self.high as i128 - self.low as i128 + 1) as f64)
        } else {
            0.0
        })
    }

    pub fn ln_pmf(&self, k: i64) -> Result<f64, UniformError> {
        self.pmf(k).map(f64::ln)
    }
}

impl TryDistribution<i64> for UniformInt {
    type Error = UniformError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<i64, UniformError> {
        self.check()?;
        Ok(rng.next_int_in_range(self.low, self.high))
    }
}
