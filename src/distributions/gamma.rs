use rand::Rng;
use thiserror::Error;

use super::TryDistribution;
use crate::rngs::UniformSource;
use crate::special::{log_gamma, SpecialError};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GammaError {
    #[error("shape is NaN or not positive in gamma distribution")]
    ShapeInvalid,
    #[error("scale is NaN or not positive in gamma distribution")]
    ScaleInvalid,
    #[error("shape and scale are both infinite in gamma distribution")]
    ParamsInfinite,
    #[error(transparent)]
    Special(#[from] SpecialError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Gamma(shape k, scale θ), with density `x^(k-1) e^(-x/θ) / (Γ(k) θ^k)`
pub struct Gamma {
    pub shape: f64,
    pub scale: f64,
}

impl Gamma {
    pub fn new(shape: f64, scale: f64) -> Self {
        Self { shape, scale }
    }

    fn check(&self) -> Result<(), GammaError> {
        if self.shape.is_nan() || self.shape <= 0.0 {
            return Err(GammaError::ShapeInvalid);
        }
        if self.scale.is_nan() || self.scale <= 0.0 {
            return Err(GammaError::ScaleInvalid);
        }
        if self.shape.is_infinite() && self.scale.is_infinite() {
            return Err(GammaError::ParamsInfinite);
        }
        Ok(())
    }

    /// Density at `x`, zero for negative `x`.
    ///
    /// At the origin the density is `1 / scale` for `shape == 1`, zero for `shape > 1`, and
    /// `+inf` for `shape < 1`, where it diverges. [`Gamma::ln_pdf`] follows the same limits.
    pub fn pdf(&self, x: f64) -> Result<f64, GammaError> {
        self.check()?;
        if x < 0.0 {
            return Ok(0.0);
        }
        if x == 0.0 {
            // avoid 0^0 and ln(0) at the origin
            return Ok(if self.shape == 1.0 {
                1.0 / self.scale
            } else if self.shape < 1.0 {
                f64::INFINITY
            } else {
                0.0
            });
        }
        self.ln_pdf(x).map(f64::exp)
    }

    pub fn ln_pdf(&self, x: f64) -> Result<f64, GammaError> {
        self.check()?;
        if x < 0.0 {
            return Ok(f64::NEG_INFINITY);
        }
        if self.shape == 1.0 {
            // exponential with rate 1/scale
            return Ok(-self.scale.ln() - x / self.scale);
        }
        if x == 0.0 {
            return Ok(if self.shape < 1.0 {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            });
        }
        Ok((self.shape - 1.0) * x.ln()
            - x / self.scale
            - log_gamma(self.shape)?
            - self.shape * self.scale.ln())
    }
}

impl TryDistribution<f64> for Gamma {
    type Error = GammaError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64, GammaError> {
        self.check()?;
        Ok(sample_gamma(rng, self.shape, self.scale))
    }
}

/// Marsaglia–Tsang. Preconditions: shape > 0, scale > 0
pub(crate) fn sample_gamma<R: Rng + ?Sized>(rng: &mut R, shape: f64, scale: f64) -> f64 {
    if shape < 1.0 {
        // Gamma(k) = Gamma(k + 1) * U^(1/k)
        let boosted = sample_gamma(rng, shape + 1.0, scale);
        let u = rng.next_uniform();
        return boosted * u.powf(1.0 / shape);
    }
    scale * sample_marsaglia_tsang(rng, shape)
}

/// ln of a Gamma(shape, 1) draw, for shapes small enough that the draw itself underflows.
/// Consumes the source exactly as [`sample_gamma`] does
pub(crate) fn sample_ln_gamma<R: Rng + ?Sized>(rng: &mut R, shape: f64) -> f64 {
    if shape < 1.0 {
        let boosted = sample_ln_gamma(rng, shape + 1.0);
        let u = rng.next_uniform();
        return boosted + u.ln() / shape;
    }
    sample_marsaglia_tsang(rng, shape).ln()
}

fn sample_marsaglia_tsang<R: Rng + ?Sized>(rng: &mut R, shape: f64) -> f64 {
    let d = shape - 1.0 / 3.0;
    let c = 1.0 / (9.0 * d).sqrt();

    loop {
        let (x, v) = loop {
            let x = rng.next_standard_normal();
            let v = 1.0 + c * x;
            if v > 0.0 {
                break (x, v * v * v);
            }
        };
        let u = rng.next_uniform();

        let x_sqr = x * x;
        if u < 1.0 - 0.0331 * x_sqr * x_sqr || u.ln() < 0.5 * x_sqr + d * (1.0 - v + v.ln()) {
            return d * v;
        }
    }
}
