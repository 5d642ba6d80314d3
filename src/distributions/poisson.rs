use rand::Rng;
use thiserror::Error;
use tracing::trace;

use super::TryDistribution;
use crate::rngs::UniformSource;
use crate::special::{count_arg, log_factorial, xlogy, SpecialError};

/// Below this lambda P(X >= 3) is under the resolution of a uniform draw
const LOW_LAMBDA: f64 = 1e-6;
/// Below this lambda draws are made by inversion, above it by ratio-of-uniforms
const INVERSION_MAX_LAMBDA: f64 = 17.0;
/// Search cutoff for the inversion branch
const INVERSION_BOUND: u64 = 127;
/// Largest supported lambda
const MAX_LAMBDA: f64 = 2e9;

/// 8 / e, hat width factor for ratio-of-uniforms
const HAT_WIDTH_SCALE: f64 = 2.943_035_529_371_538_6;
/// 3 - 2 sqrt(3 / e), hat width offset for ratio-of-uniforms
const HAT_WIDTH_OFFSET: f64 = 0.898_916_162_058_898_7;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PoissonError {
    #[error("lambda is NaN or negative in poisson distribution")]
    BadLambda,
    #[error("lambda is above the supported maximum of 2e9 in poisson distribution")]
    LambdaTooLarge,
    #[error(transparent)]
    Special(#[from] SpecialError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Poisson with mean `lambda`
pub struct Poisson {
    pub lambda: f64,
}

impl Poisson {
    pub fn new(lambda: f64) -> Self {
        Self { lambda }
    }

    fn check(&self) -> Result<(), PoissonError> {
        check_lambda(self.lambda)
    }

    pub fn pmf(&self, k: u64) -> Result<f64, PoissonError> {
        self.ln_pmf(k).map(f64::exp)
    }

    pub fn ln_pmf(&self, k: u64) -> Result<f64, PoissonError> {
        self.check()?;
        let k_arg = count_arg("log_factorial", k)?;
        Ok(xlogy(k as f64, self.lambda) - self.lambda - log_factorial(k_arg)?)
    }
}

pub(crate) fn check_lambda(lambda: f64) -> Result<(), PoissonError> {
    if lambda.is_nan() || lambda < 0.0 {
        Err(PoissonError::BadLambda)
    } else if lambda > MAX_LAMBDA {
        Err(PoissonError::LambdaTooLarge)
    } else {
        Ok(())
    }
}

impl TryDistribution<u64> for Poisson {
    type Error = PoissonError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<u64, PoissonError> {
        self.check()?;
        sample_poisson(rng, self.lambda)
    }
}

/// Poisson draw for an already validated lambda
pub(crate) fn sample_poisson<R: Rng + ?Sized>(
    rng: &mut R,
    lambda: f64,
) -> Result<u64, PoissonError> {
    if lambda == 0.0 {
        return Ok(0);
    }
    if lambda < LOW_LAMBDA {
        trace!(lambda, "poisson via low-lambda shortcut");
        return Ok(sample_low(rng, lambda));
    }
    if lambda < INVERSION_MAX_LAMBDA {
        trace!(lambda, "poisson via inversion");
        return Ok(sample_inversion(rng, lambda));
    }
    trace!(lambda, "poisson via ratio-of-uniforms");
    sample_ratio_of_uniforms(rng, lambda)
}

fn sample_low<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u64 {
    let p0 = (-lambda).exp();
    let u = rng.next_uniform();
    if u < p0 {
        0
    } else if u < p0 * (1.0 + lambda) {
        1
    } else {
        2
    }
}

fn sample_inversion<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> u64 {
    let f0 = (-lambda).exp();
    loop {
        let mut r = rng.next_uniform();
        let mut f = f0;
        let mut x = 0u64;
        loop {
            r -= f;
            if r <= 0.0 {
                return x;
            }
            if x >= INVERSION_BOUND {
                // rounding left r above the summed mass; start over
                break;
            }
            x += 1;
            f *= lambda / x as f64;
        }
    }
}

/// Stadlober's ratio-of-uniforms with a table-mountain hat centred on lambda + 1/2
fn sample_ratio_of_uniforms<R: Rng + ?Sized>(
    rng: &mut R,
    lambda: f64,
) -> Result<u64, PoissonError> {
    let centre = lambda + 0.5;
    let mode = lambda.floor();
    let ln_lambda = lambda.ln();
    let ln_f_mode = mode * ln_lambda - log_factorial(mode as i64)?;
    let width = (HAT_WIDTH_SCALE * centre).sqrt() + HAT_WIDTH_OFFSET;
    let bound = (centre + 6.0 * width).floor();

    loop {
        let u = rng.next_uniform();
        if u == 0.0 {
            continue;
        }
        let x = centre + width * (rng.next_uniform() - 0.5) / u;
        if x < 0.0 || x >= bound {
            continue;
        }
        let k = x.floor();
        let ln_ratio = k * ln_lambda - log_factorial(k as i64)? - ln_f_mode;
        // quadratic squeeze
        if ln_ratio >= u * (4.0 - u) - 3.0 {
            return Ok(k as u64);
        }
        if u * (u - ln_ratio) > 1.0 {
            continue;
        }
        if 2.0 * u.ln() <= ln_ratio {
            return Ok(k as u64);
        }
    }
}
