use rand::Rng;
use thiserror::Error;

use super::gamma::{sample_gamma, sample_ln_gamma};
use super::{check_len, TryDistribution};
use crate::special::{log_gamma, xlogy, SpecialError};

/// Tolerance on the sum of an observation passed to [`Dirichlet::pdf`]
const SIMPLEX_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum DirichletError {
    #[error("dirichlet distribution needs at least one concentration parameter")]
    NoCategories,
    #[error("concentration parameter {index} is NaN or not positive in dirichlet distribution")]
    AlphaTooSmall { index: usize },
    #[error("concentration parameter {index} is infinite in dirichlet distribution")]
    AlphaInfinite { index: usize },
    #[error("output holds {actual} slots for {expected} categories")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("x is not a point of the probability simplex")]
    XOutOfSimplex,
    #[error(transparent)]
    Special(#[from] SpecialError),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Dirichlet over `alpha.len()` categories
pub struct Dirichlet {
    pub alpha: Vec<f64>,
}

impl Dirichlet {
    pub fn new(alpha: impl Into<Vec<f64>>) -> Self {
        Self {
            alpha: alpha.into(),
        }
    }

    fn check(&self) -> Result<(), DirichletError> {
        if self.alpha.is_empty() {
            return Err(DirichletError::NoCategories);
        }
        if let Some(index) = self.alpha.iter().position(|a| a.is_nan() || *a <= 0.0) {
            return Err(DirichletError::AlphaTooSmall { index });
        }
        match self.alpha.iter().position(|a| a.is_infinite()) {
            Some(index) => Err(DirichletError::AlphaInfinite { index }),
            None => Ok(()),
        }
    }

    /// Draw one point of the simplex into `out`, which must hold one slot per category
    pub fn sample_into<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        out: &mut [f64],
    ) -> Result<(), DirichletError> {
        self.check()?;
        check_len(self.alpha.len(), out.len(), || DirichletError::LengthMismatch {
            expected: self.alpha.len(),
            actual: out.len(),
        })?;

        if self.alpha.iter().any(|&a| a < 1.0) {
            // small concentrations underflow to 0 / 0; normalise in the log domain
            out.iter_mut()
                .zip(&self.alpha)
                .for_each(|(slot, &a)| *slot = sample_ln_gamma(rng, a));
            let ln_max = out.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            out.iter_mut().for_each(|slot| *slot = (*slot - ln_max).exp());
        } else {
            out.iter_mut()
                .zip(&self.alpha)
                .for_each(|(slot, &a)| *slot = sample_gamma(rng, a, 1.0));
        }

        let sum: f64 = out.iter().sum();
        out.iter_mut().for_each(|slot| *slot /= sum);
        Ok(())
    }

    pub fn pdf(&self, x: &[f64]) -> Result<f64, DirichletError> {
        self.ln_pdf(x).map(f64::exp)
    }

    pub fn ln_pdf(&self, x: &[f64]) -> Result<f64, DirichletError> {
        self.check()?;
        check_len(self.alpha.len(), x.len(), || DirichletError::LengthMismatch {
            expected: self.alpha.len(),
            actual: x.len(),
        })?;
        if x.iter().any(|&xi| !(0.0..=1.0).contains(&xi))
            || (x.iter().sum::<f64>() - 1.0).abs() > SIMPLEX_TOLERANCE
        {
            return Err(DirichletError::XOutOfSimplex);
        }

        let mut ln_norm = log_gamma(self.alpha.iter().sum())?;
        let mut ln_kernel = 0.0;
        for (&a, &xi) in self.alpha.iter().zip(x) {
            ln_norm -= log_gamma(a)?;
            ln_kernel += xlogy(a - 1.0, xi);
        }
        Ok(ln_norm + ln_kernel)
    }
}

impl TryDistribution<Vec<f64>> for Dirichlet {
    type Error = DirichletError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<f64>, DirichletError> {
        self.check()?;
        let mut out = vec![0.0; self.alpha.len()];
        self.sample_into(rng, &mut out)?;
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
    fn test_sums_to_one() {
        let mut rng = StdRng::seed_from_u64(8);
        for alpha in [vec![1.0, 2.0, 3.0], vec![0.1, 0.1], vec![1e-4, 5.0, 1e-4, 0.5]] {
            let dist = Dirichlet::new(alpha);
            for _ in 0..500 {
                let x = dist.try_sample(&mut rng).unwrap();
                assert!(x.iter().all(|&xi| xi >= 0.0), "Negative component in {:?}", x);
                assert!((x.iter().sum::<f64>() - 1.0).abs() < 1e-9, "Bad sum {:?}", x);
            }
        }
    }

    #[test]
    fn test_mean() {
        let mut rng = StdRng::seed_from_u64(8);
        let dist = Dirichlet::new([2.0, 3.0, 5.0]);
        let mut acc = [0.0; 3];
        const SAMPLES: usize = 10_000;
        for _ in 0..SAMPLES {
            let x = dist.try_sample(&mut rng).unwrap();
            acc.iter_mut().zip(&x).for_each(|(a, xi)| *a += xi);
        }
        for (a, expected) in acc.iter().zip([0.2, 0.3, 0.5]) {
            assert!((a / SAMPLES as f64 - expected).abs() < 0.01);
        }
    }

    #[test]
    fn test_single_category() {
        let mut rng = StdRng::seed_from_u64(8);
        assert_eq!(Dirichlet::new([0.3]).try_sample(&mut rng).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_sample_into_len() {
        let mut rng = ReplayRng::from_seed(vec![]);
        let mut out = [0.0; 2];
        assert_eq!(
            Dirichlet::new([1.0, 1.0, 1.0]).sample_into(&mut rng, &mut out),
            Err(DirichletError::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_invalid_alpha() {
        let mut rng = ReplayRng::from_seed(vec![]);
        assert_eq!(
            Dirichlet::new([1.0, -0.5]).try_sample(&mut rng),
            Err(DirichletError::AlphaTooSmall { index: 1 })
        );
        assert_eq!(
            Dirichlet::new([2.0, 1.0, f64::INFINITY]).try_sample(&mut rng),
            Err(DirichletError::AlphaInfinite { index: 2 })
        );
        assert_eq!(
            Dirichlet::new([f64::INFINITY, 1.0]).ln_pdf(&[0.5, 0.5]),
            Err(DirichletError::AlphaInfinite { index: 0 })
        );
        assert_eq!(
            Dirichlet::new(Vec::<f64>::new()).try_sample(&mut rng),
            Err(DirichletError::NoCategories)
        );
    }

    #[test]
    fn test_pdf() {
        // flat dirichlet over 3 categories has density Gamma(3) = 2
        let dist = Dirichlet::new([1.0, 1.0, 1.0]);
        assert_relative_eq!(dist.pdf(&[0.2, 0.3, 0.5]).unwrap(), 2.0, max_relative = 1e-12);
        let dist = Dirichlet::new([2.0, 4.0]);
        // reduces to Beta(2, 4)
        assert_relative_eq!(
            dist.pdf(&[0.2, 0.8]).unwrap(),
            20.0 * 0.2 * 0.8f64.powi(3),
            max_relative = 1e-10
        );
        assert_eq!(dist.pdf(&[0.2, 0.7]), Err(DirichletError::XOutOfSimplex));
    }
}
