use thiserror::Error;

use crate::distributions::{
    BernoulliError, BetaError, BinomialError, CauchyError, ChiSquaredError, DirichletError,
    ExponentialError, GammaError, GeometricError, MultinomialError, MultivariateNormalError,
    NegativeBinomialError, NormalError, PoissonError, UniformError,
};
use crate::special::SpecialError;

/// Any error this crate reports, for callers mixing several distributions behind `?`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    Special(#[from] SpecialError),
    #[error(transparent)]
    Bernoulli(#[from] BernoulliError),
    #[error(transparent)]
    Beta(#[from] BetaError),
    #[error(transparent)]
    Binomial(#[from] BinomialError),
    #[error(transparent)]
    Cauchy(#[from] CauchyError),
    #[error(transparent)]
    ChiSquared(#[from] ChiSquaredError),
    #[error(transparent)]
    Dirichlet(#[from] DirichletError),
    #[error(transparent)]
    Exponential(#[from] ExponentialError),
    #[error(transparent)]
    Gamma(#[from] GammaError),
    #[error(transparent)]
    Geometric(#[from] GeometricError),
    #[error(transparent)]
    Multinomial(#[from] MultinomialError),
    #[error(transparent)]
    MultivariateNormal(#[from] MultivariateNormalError),
    #[error(transparent)]
    NegativeBinomial(#[from] NegativeBinomialError),
    #[error(transparent)]
    Normal(#[from] NormalError),
    #[error(transparent)]
    Poisson(#[from] PoissonError),
    #[error(transparent)]
    Uniform(#[from] UniformError),
}

pub type Result<T> = std::result::Result<T, Error>;
