use rand::Rng;
use thiserror::Error;

use super::TryDistribution;
use crate::rngs::UniformSource;
use crate::special::LN_SQRT_2PI;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NormalError {
    #[error("mean is not finite in normal distribution")]
    MeanInvalid,
    #[error("standard deviation is NaN, infinite or not positive in normal distribution")]
    SigmaInvalid,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// N(mu, sigma^2)
pub struct Normal {
    pub mu: f64,
    pub sigma: f64,
}

impl Normal {
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    pub fn standard() -> Self {
        Self::new(0.0, 1.0)
    }

    fn check(&self) -> Result<(), NormalError> {
        if !self.mu.is_finite() {
            return Err(NormalError::MeanInvalid);
        }
        if !self.sigma.is_finite() || self.sigma <= 0.0 {
            return Err(NormalError::SigmaInvalid);
        }
        Ok(())
    }

    pub fn pdf(&self, x: f64) -> Result<f64, NormalError> {
        self.check()?;
        let z = (x - self.mu) / self.sigma;
        Ok(FRAC_1_SQRT_2PI / self.sigma * (-0.5 * z * z).exp())
    }

    pub fn ln_pdf(&self, x: f64) -> Result<f64, NormalError> {
        self.check()?;
        let z = (x - self.mu) / self.sigma;
        Ok(-LN_SQRT_2PI - self.sigma.ln() - 0.5 * z * z)
    }
}

impl TryDistribution<f64> for Normal {
    type Error = NormalError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, NormalError> {
        self.check()?;
        Ok(rng.next_standard_normal() * self.sigma + self.mu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};
    use std::f64::consts::PI;

    #[test]
    fn test_constants() {
        assert_relative_eq!(FRAC_1_SQRT_2PI, 1.0 / (2.0 * PI).sqrt(), max_relative = 1e-15);
        assert_relative_eq!(LN_SQRT_2PI, (2.0 * PI).sqrt().ln(), max_relative = 1e-15);
    }

    #[test]
    fn test_location_scale() {
        let mut a = StdRng::seed_from_u64(5);
        let mut b = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let z = Normal::standard().try_sample(&mut a).unwrap();
            let x = Normal::new(3.0, 2.0).try_sample(&mut b).unwrap();
            assert_relative_eq!(x, 2.0 * z + 3.0, max_relative = 1e-14);
        }
    }

    #[test]
    fn test_pdf() {
        let dist = Normal::new(1.0, 2.0);
        assert_relative_eq!(dist.pdf(1.0).unwrap(), FRAC_1_SQRT_2PI / 2.0);
        for &x in &[-4.0, 0.0, 1.5, 6.0] {
            assert_relative_eq!(
                dist.ln_pdf(x).unwrap().exp(),
                dist.pdf(x).unwrap(),
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn test_invalid() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(
            Normal::new(0.0, 0.0).try_sample(&mut rng),
            Err(NormalError::SigmaInvalid)
        );
        assert_eq!(
            Normal::new(f64::NAN, 1.0).pdf(0.0),
            Err(NormalError::MeanInvalid)
        );
    }
}
