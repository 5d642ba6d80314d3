#![doc = include_str!("../README.md")]

mod distributions;
pub use distributions::{
    cholesky_in_place, Bernoulli, BernoulliError, Beta, BetaError, Binomial, BinomialError,
    Cauchy, CauchyError, ChiSquared, ChiSquaredError, Dirichlet, DirichletError, Exponential,
    ExponentialError, Gamma, GammaError, Geometric, GeometricError, Multinomial,
    MultinomialError, MultivariateNormal, MultivariateNormalError, NegativeBinomial,
    NegativeBinomialError, Normal, NormalError, Poisson, PoissonError, TryDistIter, TryDistMap,
    TryDistribution, Uniform, UniformError, UniformInt,
};
mod error;
pub use error::{Error, Result};
pub mod rngs;
pub use rngs::{ReplayRng, UniformSource};
pub mod special;
