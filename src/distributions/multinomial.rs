use rand::Rng;
use thiserror::Error;

use super::binomial::sample_binomial;
use super::{check_len, TryDistribution};
use crate::special::{count_arg, log_factorial, xlogy, SpecialError};

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum MultinomialError {
    #[error("multinomial distribution needs at least one category")]
    NoCategories,
    #[error("probability {index} is NaN or outside [0, 1] in multinomial distribution")]
    ProbabilityOutOfRange { index: usize },
    #[error("probabilities sum to {sum}, not 1, in multinomial distribution")]
    ProbSumNotOne { sum: f64 },
    #[error("buffer holds {actual} slots for {expected} categories")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("counts sum to {sum}, not the number of trials {n}")]
    CountSumMismatch { sum: u64, n: u64 },
    #[error("counts sum past u64::MAX in multinomial distribution")]
    CountSumOverflow,
    #[error(transparent)]
    Special(#[from] SpecialError),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Category counts from `n` trials, each landing in category `i` with probability `p[i]`
pub struct Multinomial {
    pub n: u64,
    pub p: Vec<f64>,
}

impl Multinomial {
    pub fn new(n: u64, p: impl Into<Vec<f64>>) -> Self {
        Self { n, p: p.into() }
    }

    fn check(&self) -> Result<(), MultinomialError> {
        if self.p.is_empty() {
            return Err(MultinomialError::NoCategories);
        }
        if let Some(index) = self.p.iter().position(|pi| !(0.0..=1.0).contains(pi)) {
            return Err(MultinomialError::ProbabilityOutOfRange { index });
        }
        let sum: f64 = self.p.iter().sum();
        if (sum - 1.0).abs() > f64::EPSILON.sqrt() {
            return Err(MultinomialError::ProbSumNotOne { sum });
        }
        Ok(())
    }

    fn check_out(&self, len: usize) -> Result<(), MultinomialError> {
        check_len(self.p.len(), len, || MultinomialError::LengthMismatch {
            expected: self.p.len(),
            actual: len,
        })
    }

    /// Draw one set of counts into `out`, which must hold one slot per category
    pub fn sample_into<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        out: &mut [u64],
    ) -> Result<(), MultinomialError> {
        self.check()?;
        self.check_out(out.len())?;

        let (last, head) = match out.split_last_mut() {
            Some(split) => split,
            None => return Err(MultinomialError::NoCategories),
        };
        let mut remaining = self.n;
        let mut mass = 1.0;
        for (slot, &pi) in head.iter_mut().zip(&self.p) {
            if remaining == 0 {
                *slot = 0;
                continue;
            }
            // conditional probability of category i given the earlier ones missed
            let conditional = if mass > pi { pi / mass } else { 1.0 };
            let count = sample_binomial(rng, remaining, conditional.clamp(0.0, 1.0));
            *slot = count;
            remaining -= count;
            mass -= pi;
        }
        *last = remaining;
        Ok(())
    }

    pub fn pmf(&self, counts: &[u64]) -> Result<f64, MultinomialError> {
        self.ln_pmf(counts).map(f64::exp)
    }

    pub fn ln_pmf(&self, counts: &[u64]) -> Result<f64, MultinomialError> {
        self.check()?;
        self.check_out(counts.len())?;
        let sum = counts
            .iter()
            .try_fold(0u64, |acc, &c| acc.checked_add(c))
            .ok_or(MultinomialError::CountSumOverflow)?;
        if sum != self.n {
            return Err(MultinomialError::CountSumMismatch { sum, n: self.n });
        }

        let mut ln_p = log_factorial(count_arg("log_factorial", self.n)?)?;
        for (&x, &pi) in counts.iter().zip(&self.p) {
            ln_p += xlogy(x as f64, pi) - log_factorial(count_arg("log_factorial", x)?)?;
        }
        Ok(ln_p)
    }
}

impl TryDistribution<Vec<u64>> for Multinomial {
    type Error = MultinomialError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<u64>, MultinomialError> {
        self.check()?;
        let mut out = vec![0; self.p.len()];
        self.sample_into(rng, &mut out)?;
        Ok(out)
    }
}
