//! Sample means and variances against the analytic values for every scalar distribution

use concat_idents::concat_idents;
use rand::{rngs::StdRng, SeedableRng};
use variate::{
    Beta, Binomial, Cauchy, ChiSquared, Exponential, Gamma, Geometric, NegativeBinomial, Normal,
    Poisson, TryDistribution, Uniform, UniformInt,
};

const SAMPLES: usize = 20_000;

fn sample_moments<T, D>(dist: &D, seed: u64, to_f64: impl Fn(T) -> f64) -> (f64, f64)
where
    D: TryDistribution<T>,
    D::Error: std::fmt::Debug,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let draws = dist
        .try_sample_n(&mut rng, SAMPLES)
        .unwrap()
        .into_iter()
        .map(to_f64)
        .collect::<Vec<_>>();
    let mean = draws.iter().sum::<f64>() / SAMPLES as f64;
    let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / SAMPLES as f64;
    (mean, var)
}

macro_rules! test_moments_impl {
    ($TN:ident, $dist:expr, $T:ty, $mean:expr, $var:expr) => {
        concat_idents!(test_name = test_, $TN, _mean, {
            #[test]
            fn test_name() {
                let (mean, _) = sample_moments($dist, 0x5eed, |x: $T| x as f64);
                // five standard errors
                let tolerance = 5.0 * ($var / SAMPLES as f64).sqrt();
                assert!(
                    (mean - $mean).abs() < tolerance,
                    "mean = {}, expected {} +- {}",
                    mean,
                    $mean,
                    tolerance
                );
            }
        });

        concat_idents!(test_name = test_, $TN, _variance, {
            #[test]
            fn test_name() {
                let (_, var) = sample_moments($dist, 0x5eed + 1, |x: $T| x as f64);
                assert!(
                    (var - $var).abs() < 0.1 * $var,
                    "variance = {}, expected {}",
                    var,
                    $var
                );
            }
        });
    };
}

test_moments_impl!(binomial_small, &Binomial::new(10, 0.4), u64, 4.0, 2.4);
test_moments_impl!(binomial_btpe, &Binomial::new(500, 0.3), u64, 150.0, 105.0);
test_moments_impl!(binomial_btpe_flipped, &Binomial::new(500, 0.7), u64, 350.0, 105.0);
test_moments_impl!(poisson_inversion, &Poisson::new(6.0), u64, 6.0, 6.0);
test_moments_impl!(poisson_rou, &Poisson::new(90.0), u64, 90.0, 90.0);
test_moments_impl!(geometric, &Geometric::new(0.35), u64, 1.0 / 0.35, 0.65 / (0.35 * 0.35));
test_moments_impl!(
    neg_binomial,
    &NegativeBinomial::new(2.5, 0.6),
    u64,
    2.5 * 0.4 / 0.6,
    2.5 * 0.4 / 0.36
);
test_moments_impl!(uniform_int, &UniformInt::new(-5, 5), i64, 0.0, 10.0);
test_moments_impl!(uniform, &Uniform::new(2.0, 8.0), f64, 5.0, 3.0);
test_moments_impl!(normal, &Normal::new(-3.0, 1.5), f64, -3.0, 2.25);
test_moments_impl!(exponential, &Exponential::new(0.5), f64, 2.0, 4.0);
test_moments_impl!(gamma, &Gamma::new(3.0, 0.5), f64, 1.5, 0.75);
test_moments_impl!(gamma_small_shape, &Gamma::new(0.6, 2.0), f64, 1.2, 2.4);
test_moments_impl!(beta, &Beta::new(2.0, 5.0), f64, 2.0 / 7.0, 10.0 / (49.0 * 8.0));
test_moments_impl!(beta_johnk, &Beta::new(0.7, 0.4), f64, 0.7 / 1.1, 0.28 / (1.21 * 2.1));
test_moments_impl!(chi_squared_small, &ChiSquared::new(4), f64, 4.0, 8.0);

#[test]
fn test_binomial_within_one_sd() {
    // Binomial(10, 0.4): mean 4, sd ~1.549
    let (mean, _) = sample_moments(&Binomial::new(10, 0.4), 1, |x: u64| x as f64);
    assert!((mean - 4.0).abs() < 1.549, "mean = {}", mean);
}

#[test]
fn test_chi_squared_branches_agree() {
    // k = 100 sums squared normals, k = 101 goes through the gamma sampler
    for k in [100u64, 101] {
        let (mean, var) = sample_moments(&ChiSquared::new(k), 0xc41 + k, |x: f64| x);
        let kf = k as f64;
        assert!(
            (mean - kf).abs() < 5.0 * (2.0 * kf / SAMPLES as f64).sqrt(),
            "mean = {} for k = {}",
            mean,
            k
        );
        assert!((var - 2.0 * kf).abs() < 0.1 * 2.0 * kf, "variance = {} for k = {}", var, k);
    }
}

#[test]
fn test_identical_seeds_reproduce() {
    let dist = Binomial::new(400, 0.45);
    let a = dist.try_sample_n(&mut StdRng::seed_from_u64(77), 500).unwrap();
    let b = dist.try_sample_n(&mut StdRng::seed_from_u64(77), 500).unwrap();
    assert_eq!(a, b);

    let dist = Gamma::new(0.4, 3.0);
    let a = dist.try_sample_n(&mut StdRng::seed_from_u64(78), 500).unwrap();
    let b = dist.try_sample_n(&mut StdRng::seed_from_u64(78), 500).unwrap();
    assert!(a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits()));
}

#[test]
fn test_cauchy_quartiles() {
    // no moments; the quartiles sit at x0 -+ gamma
    let mut rng = StdRng::seed_from_u64(3);
    let mut draws = Cauchy::new(1.0, 0.5).try_sample_n(&mut rng, SAMPLES).unwrap();
    draws.sort_by(|a, b| a.total_cmp(b));
    let q1 = draws[SAMPLES / 4];
    let q3 = draws[3 * SAMPLES / 4];
    assert!((q1 - 0.5).abs() < 0.05, "q1 = {}", q1);
    assert!((q3 - 1.5).abs() < 0.05, "q3 = {}", q3);
}
