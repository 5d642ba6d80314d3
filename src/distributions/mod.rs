//! Samplers and density evaluators for the supported distributions
//!
//! Every descriptor is plain data. Parameters are validated when a sample or density is
//! requested, and always before the first draw from the source, so a rejected call leaves
//! the source untouched.

use std::marker::PhantomData;

use rand::Rng;

mod bernoulli;
mod beta;
mod binomial;
mod cauchy;
mod chi_squared;
mod dirichlet;
mod exponential;
mod gamma;
mod geometric;
mod multinomial;
mod multivariate_normal;
mod neg_binomial;
mod normal;
mod poisson;
mod uniform;

pub use bernoulli::{Bernoulli, BernoulliError};
pub use beta::{Beta, BetaError};
pub use binomial::{Binomial, BinomialError};
pub use cauchy::{Cauchy, CauchyError};
pub use chi_squared::{ChiSquared, ChiSquaredError};
pub use dirichlet::{Dirichlet, DirichletError};
pub use exponential::{Exponential, ExponentialError};
pub use gamma::{Gamma, GammaError};
pub use geometric::{Geometric, GeometricError};
pub use multinomial::{Multinomial, MultinomialError};
pub use multivariate_normal::{cholesky_in_place, MultivariateNormal, MultivariateNormalError};
pub use neg_binomial::{NegativeBinomial, NegativeBinomialError};
pub use normal::{Normal, NormalError};
pub use poisson::{Poisson, PoissonError};
pub use uniform::{Uniform, UniformError, UniformInt};

/// A distribution whose parameters are checked at sampling time.
///
/// Where [`rand::distributions::Distribution`] assumes valid parameters, every method here
/// reports a domain violation as [`TryDistribution::Error`] instead.
pub trait TryDistribution<T> {
    type Error;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<T, Self::Error>;

    /// Fill `out` with independent draws
    fn try_fill<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut [T]) -> Result<(), Self::Error> {
        out.iter_mut().try_for_each(|slot| {
            *slot = self.try_sample(rng)?;
            Ok(())
        })
    }

    /// `count` independent draws in a new vector
    fn try_sample_n<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        count: usize,
    ) -> Result<Vec<T>, Self::Error> {
        (0..count).map(|_| self.try_sample(rng)).collect()
    }

    fn try_sample_iter<R: Rng>(self, rng: R) -> TryDistIter<Self, R, T>
    where
        Self: Sized,
    {
        TryDistIter {
            distr: self,
            rng,
            phantom: PhantomData,
        }
    }

    fn try_map<F, S>(self, func: F) -> TryDistMap<Self, F, T, S>
    where
        F: Fn(T) -> S,
        Self: Sized,
    {
        TryDistMap {
            distr: self,
            func,
            phantom: PhantomData,
        }
    }
}

impl<'a, T, D: TryDistribution<T>> TryDistribution<T> for &'a D {
    type Error = D::Error;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<T, Self::Error> {
        (*self).try_sample(rng)
    }
}

#[derive(Debug)]
/// An endless iterator of fallible draws, created by [`TryDistribution::try_sample_iter`]
pub struct TryDistIter<D, R, T> {
    distr: D,
    rng: R,
    phantom: PhantomData<fn() -> T>,
}

impl<D, R, T> Iterator for TryDistIter<D, R, T>
where
    D: TryDistribution<T>,
    R: Rng,
{
    type Item = Result<T, D::Error>;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        Some(self.distr.try_sample(&mut self.rng))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[derive(Debug)]
/// A distribution whose draws are passed through a function, created by
/// [`TryDistribution::try_map`]
pub struct TryDistMap<D, F, T, S> {
    distr: D,
    func: F,
    phantom: PhantomData<fn(T) -> S>,
}

impl<D, F, T, S> TryDistribution<S> for TryDistMap<D, F, T, S>
where
    D: TryDistribution<T>,
    F: Fn(T) -> S,
{
    type Error = D::Error;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<S, Self::Error> {
        self.distr.try_sample(rng).map(&self.func)
    }
}

/// Rejects `out` unless it holds exactly `expected` slots
pub(crate) fn check_len<E>(
    expected: usize,
    actual: usize,
    err: impl FnOnce() -> E,
) -> Result<(), E> {
    if expected == actual {
        Ok(())
    } else {
        Err(err())
    }
}
