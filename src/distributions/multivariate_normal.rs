use rand::Rng;
use thiserror::Error;
use tracing::debug;

use super::{check_len, TryDistribution};
use crate::rngs::UniformSource;
use crate::special::LN_SQRT_2PI;

/// Relative tolerance when checking the covariance for symmetry
const SYMMETRY_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MultivariateNormalError {
    #[error("mean vector is empty in multivariate normal distribution")]
    EmptyMean,
    #[error("mean or covariance has a non-finite entry")]
    NotFinite,
    #[error("covariance holds {actual} entries, expected {expected} for the mean's dimension")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("buffer holds {actual} entries, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("covariance is not symmetric at ({row}, {col})")]
    NotSymmetric { row: usize, col: usize },
    #[error("covariance is not positive-definite: pivot {pivot} is not positive")]
    NotPositiveDefinite { pivot: usize },
}

/// Replace the `n x n` row-major symmetric matrix in `a` with its lower Cholesky factor
/// `L` (`a = L L^T`), zeroing the strict upper triangle.
///
/// Only the lower triangle of `a` is read. On failure `a` is left partially overwritten.
pub fn cholesky_in_place(a: &mut [f64], n: usize) -> Result<(), MultivariateNormalError> {
    check_len(n * n, a.len(), || MultivariateNormalError::DimensionMismatch {
        expected: n * n,
        actual: a.len(),
    })?;

    for i in 0..n {
        for j in 0..=i {
            let dot: f64 = (0..j).map(|k| a[i * n + k] * a[j * n + k]).sum();
            if i == j {
                let residual = a[i * n + i] - dot;
                // also rejects NaN
                if !(residual > 0.0) {
                    debug!(pivot = i, residual, "cholesky factorisation failed");
                    return Err(MultivariateNormalError::NotPositiveDefinite { pivot: i });
                }
                a[i * n + i] = residual.sqrt();
            } else {
                a[i * n + j] = (a[i * n + j] - dot) / a[j * n + j];
            }
        }
        a[i * n + i + 1..(i + 1) * n].fill(0.0);
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Multivariate normal with mean vector `mean` and row-major covariance `covariance`
pub struct MultivariateNormal {
    pub mean: Vec<f64>,
    pub covariance: Vec<f64>,
}

impl MultivariateNormal {
    pub fn new(mean: impl Into<Vec<f64>>, covariance: impl Into<Vec<f64>>) -> Self {
        Self {
            mean: mean.into(),
            covariance: covariance.into(),
        }
    }

    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    fn check(&self) -> Result<(), MultivariateNormalError> {
        let n = self.dim();
        if n == 0 {
            return Err(MultivariateNormalError::EmptyMean);
        }
        check_len(n * n, self.covariance.len(), || {
            MultivariateNormalError::DimensionMismatch {
                expected: n * n,
                actual: self.covariance.len(),
            }
        })?;
        if !self.mean.iter().chain(&self.covariance).all(|v| v.is_finite()) {
            return Err(MultivariateNormalError::NotFinite);
        }
        for row in 0..n {
            for col in 0..row {
                let lower = self.covariance[row * n + col];
                let upper = self.covariance[col * n + row];
                let scale = lower.abs().max(upper.abs()).max(1.0);
                if (lower - upper).abs() > SYMMETRY_TOLERANCE * scale {
                    return Err(MultivariateNormalError::NotSymmetric { row, col });
                }
            }
        }
        Ok(())
    }

    /// Validated lower Cholesky factor of the covariance, leaving `self` untouched
    pub fn cholesky(&self) -> Result<Vec<f64>, MultivariateNormalError> {
        self.check()?;
        let mut factor = self.covariance.clone();
        cholesky_in_place(&mut factor, self.dim())?;
        Ok(factor)
    }

    /// Draw one vector into `out`, which must hold [`MultivariateNormal::dim`] entries
    pub fn sample_into<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        out: &mut [f64],
    ) -> Result<(), MultivariateNormalError> {
        let factor = self.cholesky()?;
        self.check_out(out)?;
        self.transform(&factor, rng, out);
        Ok(())
    }

    fn check_out(&self, out: &[f64]) -> Result<(), MultivariateNormalError> {
        check_len(self.dim(), out.len(), || MultivariateNormalError::LengthMismatch {
            expected: self.dim(),
            actual: out.len(),
        })
    }

    /// `out = mean + L z` for a fresh standard normal vector `z`
    fn transform<R: Rng + ?Sized>(&self, factor: &[f64], rng: &mut R, out: &mut [f64]) {
        let n = self.dim();
        let work = (0..n)
            .map(|_| rng.next_standard_normal())
            .collect::<Vec<_>>();
        for (i, slot) in out.iter_mut().enumerate() {
            let row = &factor[i * n..i * n + i + 1];
            *slot = self.mean[i] + row.iter().zip(&work).map(|(l, z)| l * z).sum::<f64>();
        }
    }

    pub fn pdf(&self, x: &[f64]) -> Result<f64, MultivariateNormalError> {
        self.ln_pdf(x).map(f64::exp)
    }

    pub fn ln_pdf(&self, x: &[f64]) -> Result<f64, MultivariateNormalError> {
        let factor = self.cholesky()?;
        self.check_out(x)?;
        let n = self.dim();

        // forward substitution L y = x - mean, so the Mahalanobis term is |y|^2
        let mut y = vec![0.0; n];
        for i in 0..n {
            let dot: f64 = (0..i).map(|k| factor[i * n + k] * y[k]).sum();
            y[i] = (x[i] - self.mean[i] - dot) / factor[i * n + i];
        }
        let mahalanobis: f64 = y.iter().map(|v| v * v).sum();
        let half_ln_det: f64 = (0..n).map(|i| factor[i * n + i].ln()).sum();

        Ok(-(n as f64) * LN_SQRT_2PI - half_ln_det - 0.5 * mahalanobis)
    }
}

impl TryDistribution<Vec<f64>> for MultivariateNormal {
    type Error = MultivariateNormalError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f64>, Self::Error> {
        let mut out = vec![0.0; self.dim()];
        self.sample_into(rng, &mut out)?;
        Ok(out)
    }

    fn try_fill<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        out: &mut [Vec<f64>],
    ) -> Result<(), Self::Error> {
        let factor = self.cholesky()?;
        out.iter_mut().for_each(|slot| {
            slot.resize(self.dim(), 0.0);
            self.transform(&factor, rng, slot);
        });
        Ok(())
    }

    fn try_sample_n<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
    ) -> Result<Vec<Vec<f64>>, Self::Error> {
        let mut out = vec![Vec::new(); count];
        self.try_fill(rng, &mut out)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rngs::ReplayRng;
    use approx::assert_relative_eq;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_cholesky_known() {
        let mut a = vec![4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0];
        cholesky_in_place(&mut a, 3).unwrap();
        let expected = [2.0, 0.0, 0.0, 6.0, 1.0, 0.0, -8.0, 5.0, 3.0];
        for (got, want) in a.iter().zip(expected) {
            assert_relative_eq!(*got, want, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cholesky_not_positive_definite() {
        let mut a = vec![1.0, 2.0, 2.0, 1.0];
        assert_eq!(
            cholesky_in_place(&mut a, 2),
            Err(MultivariateNormalError::NotPositiveDefinite { pivot: 1 })
        );
    }

    #[test]
    fn test_covariance_left_untouched() {
        let dist = MultivariateNormal::new([0.0, 0.0], [2.0, 1.0, 1.0, 2.0]);
        let mut rng = StdRng::seed_from_u64(1);
        dist.try_sample(&mut rng).unwrap();
        assert_eq!(dist.covariance, vec![2.0, 1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_sample_moments() {
        let dist = MultivariateNormal::new([1.0, -2.0], [4.0, 1.2, 1.2, 1.0]);
        let mut rng = StdRng::seed_from_u64(1);
        const SAMPLES: usize = 40_000;
        let draws = dist.try_sample_n(&mut rng, SAMPLES).unwrap();
        let mean0 = draws.iter().map(|d| d[0]).sum::<f64>() / SAMPLES as f64;
        let mean1 = draws.iter().map(|d| d[1]).sum::<f64>() / SAMPLES as f64;
        let cov01 = draws
            .iter()
            .map(|d| (d[0] - mean0) * (d[1] - mean1))
            .sum::<f64>()
            / SAMPLES as f64;
        assert!((mean0 - 1.0).abs() < 0.05, "mean0 = {}", mean0);
        assert!((mean1 + 2.0).abs() < 0.05, "mean1 = {}", mean1);
        assert!((cov01 - 1.2).abs() < 0.08, "cov01 = {}", cov01);
    }

    #[test]
    fn test_ln_pdf_diagonal() {
        // independent components: product of univariate densities
        let dist = MultivariateNormal::new([0.0, 1.0], [1.0, 0.0, 0.0, 4.0]);
        let x = [0.5, 2.0];
        let expected = -2.0 * LN_SQRT_2PI - 2f64.ln() - 0.5 * (0.25 + 0.25);
        assert_relative_eq!(dist.ln_pdf(&x).unwrap(), expected, max_relative = 1e-12);
        assert_relative_eq!(
            dist.pdf(&x).unwrap(),
            dist.ln_pdf(&x).unwrap().exp(),
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_validation_draws_nothing() {
        let mut rng = ReplayRng::from_seed(vec![]);
        assert_eq!(
            MultivariateNormal::new(Vec::<f64>::new(), Vec::<f64>::new()).try_sample(&mut rng),
            Err(MultivariateNormalError::EmptyMean)
        );
        assert_eq!(
            MultivariateNormal::new([0.0, 0.0], [1.0, 0.0, 0.0]).try_sample(&mut rng),
            Err(MultivariateNormalError::DimensionMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            MultivariateNormal::new([0.0, 0.0], [1.0, 0.5, 0.4, 1.0]).try_sample(&mut rng),
            Err(MultivariateNormalError::NotSymmetric { row: 1, col: 0 })
        );
        assert_eq!(
            MultivariateNormal::new([0.0, 0.0], [1.0, 3.0, 3.0, 1.0]).try_sample(&mut rng),
            Err(MultivariateNormalError::NotPositiveDefinite { pivot: 1 })
        );
        let mut out = [0.0; 3];
        assert_eq!(
            MultivariateNormal::new([0.0, 0.0], [1.0, 0.0, 0.0, 1.0])
                .sample_into(&mut rng, &mut out),
            Err(MultivariateNormalError::LengthMismatch {
                expected: 2,
                actual: 3
            })
        );
    }
}
