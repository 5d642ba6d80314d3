use rand::Rng;
use thiserror::Error;
use tracing::trace;

use super::TryDistribution;
use crate::rngs::UniformSource;
use crate::special::{count_arg, log_binomial_coefficient, xlog1py, xlogy, SpecialError};

/// Below this mean (of the smaller tail probability) draws are made by inversion
const INVERSION_MAX_MEAN: f64 = 30.0;

/// Candidates at most this far from the mode are always checked by the explicit ratio
const SQUEEZE_MIN_DISTANCE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum BinomialError {
    #[error("p is NaN or less than 0 in binomial distribution")]
    ParamTooSmall,
    #[error("p is greater than 1 in binomial distribution")]
    ParamTooBig,
    #[error("k is outside [0, n] in binomial distribution")]
    KOutOfRange,
    #[error(transparent)]
    Special(#[from] SpecialError),
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
/// Number of successes in `n` independent trials with success probability `p`
pub struct Binomial {
    pub n: u64,
    pub p: f64,
}

impl Binomial {
    pub fn new(n: u64, p: f64) -> Self {
        Self { n, p }
    }

    fn check(&self) -> Result<(), BinomialError> {
        check_probability(self.p)
    }

    pub fn pmf(&self, k: u64) -> Result<f64, BinomialError> {
        self.ln_pmf(k).map(f64::exp)
    }

    pub fn ln_pmf(&self, k: u64) -> Result<f64, BinomialError> {
        self.check()?;
        if k > self.n {
            return Err(BinomialError::KOutOfRange);
        }
        let ln_choose = log_binomial_coefficient(
            count_arg("log_binomial_coefficient", self.n)?,
            count_arg("log_binomial_coefficient", k)?,
        )?;
        Ok(ln_choose + xlogy(k as f64, self.p) + xlog1py((self.n - k) as f64, -self.p))
    }
}

fn check_probability(p: f64) -> Result<(), BinomialError> {
    if p.is_nan() || p < 0.0 {
        Err(BinomialError::ParamTooSmall)
    } else if p > 1.0 {
        Err(BinomialError::ParamTooBig)
    } else {
        Ok(())
    }
}

impl TryDistribution<u64> for Binomial {
    type Error = BinomialError;

    fn try_sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<u64, BinomialError> {
        self.check()?;
        Ok(sample_binomial(rng, self.n, self.p))
    }
}

/// Binomial draw for an already validated `p`
pub(crate) fn sample_binomial<R: Rng + ?Sized>(rng: &mut R, n: u64, p: f64) -> u64 {
    if n == 0 || p == 0.0 {
        return 0;
    }
    if p == 1.0 {
        return n;
    }

    // work with the smaller tail and reflect at the end
    let flipped = p > 0.5;
    let p0 = if flipped { 1.0 - p } else { p };

    let k = if n as f64 * p0 < INVERSION_MAX_MEAN {
        trace!(n, p, "binomial via inversion");
        sample_inversion(rng, n, p0)
    } else {
        trace!(n, p, "binomial via BTPE");
        sample_btpe(rng, n, p0)
    };

    if flipped {
        n - k
    } else {
        k
    }
}

/// Sequential search from zero. Preconditions: 0 < p <= 0.5, n * p < 30
fn sample_inversion<R: Rng + ?Sized>(rng: &mut R, n: u64, p: f64) -> u64 {
    let ratio = p / (1.0 - p);
    let f0 = (n as f64 * (-p).ln_1p()).exp();
    // beyond this the remaining mass is negligible; restart rather than walk on
    let np1 = (n as f64 + 1.0) * p;
    let bound = (np1 + 11.0 * (np1.sqrt() + 1.0)).min(n as f64) as u64;

    loop {
        let mut r = rng.next_uniform();
        let mut f = f0;
        let mut x = 0u64;
        loop {
            r -= f;
            if r <= 0.0 {
                return x;
            }
            if x >= bound {
                break;
            }
            x += 1;
            f *= ratio * (n - x + 1) as f64 / x as f64;
        }
    }
}

/// Kachitvichyanukul & Schmeiser's BTPE. Preconditions: 0 < p <= 0.5, n * p >= 30
fn sample_btpe<R: Rng + ?Sized>(rng: &mut R, n: u64, p: f64) -> u64 {
    let nf = n as f64;
    let q = 1.0 - p;
    let npq = nf * p * q;
    let fm = nf * p + p;
    let m = fm.floor();

    // triangle half-width, parallelogram edges and exponential tail rates
    let p1 = (2.195 * npq.sqrt() - 4.6 * q).floor() + 0.5;
    let xm = m + 0.5;
    let xl = xm - p1;
    let xr = xm + p1;
    let c = 0.134 + 20.5 / (15.3 + m);
    let a = (fm - xl) / (fm - xl * p);
    let lambda_l = a * (1.0 + 0.5 * a);
    let a = (xr - fm) / (xr * q);
    let lambda_r = a * (1.0 + 0.5 * a);
    let p2 = p1 * (1.0 + 2.0 * c);
    let p3 = p2 + c / lambda_l;
    let p4 = p3 + c / lambda_r;

    loop {
        let u = rng.next_uniform() * p4;
        let mut v = rng.next_uniform();

        if u <= p1 {
            // triangle, always accepted
            return (xm - p1 * v + u).floor() as u64;
        }

        let y = if u <= p2 {
            let x = xl + (u - p1) / c;
            v = v * c + 1.0 - (m - x + 0.5).abs() / p1;
            if v > 1.0 {
                continue;
            }
            x.floor()
        } else if u <= p3 {
            let y = (xl + v.ln() / lambda_l).floor();
            if y < 0.0 || v == 0.0 {
                continue;
            }
            v *= (u - p2) * lambda_l;
            y
        } else {
            let y = (xr - v.ln() / lambda_r).floor();
            if y > nf || v == 0.0 {
                continue;
            }
            v *= (u - p3) * lambda_r;
            y
        };

        let k = (y - m).abs();
        if k <= SQUEEZE_MIN_DISTANCE || k >= npq / 2.0 - 1.0 {
            // f(y) / f(m) by the recurrence between successive terms
            let s = p / q;
            let a = s * (nf + 1.0);
            let mut f = 1.0;
            if m < y {
                let mut i = m + 1.0;
                while i <= y {
                    f *= a / i - s;
                    i += 1.0;
                }
            } else if m > y {
                let mut i = y + 1.0;
                while i <= m {
                    f /= a / i - s;
                    i += 1.0;
                }
            }
            if v <= f {
                return y as u64;
            }
            continue;
        }

        // squeeze on ln f(y) / f(m)
        let rho = (k / npq) * ((k * (k / 3.0 + 0.625) + 1.0 / 6.0) / npq + 0.5);
        let t = -k * k / (2.0 * npq);
        let ln_v = v.ln();
        if ln_v < t - rho {
            return y as u64;
        }
        if ln_v > t + rho {
            continue;
        }

        let x1 = y + 1.0;
        let f1 = m + 1.0;
        let z = nf + 1.0 - m;
        let w = nf - y + 1.0;
        let ln_ratio = xm * (f1 / x1).ln()
            + (nf - m + 0.5) * (z / w).ln()
            + (y - m) * (w * p / (x1 * q)).ln()
            + stirling_tail(f1)
            + stirling_tail(z)
            + stirling_tail(x1)
            + stirling_tail(w);
        if ln_v <= ln_ratio {
            return y as u64;
        }
    }
}

/// 1/(12x) - 1/(360x^3) + 1/(1260x^5) - 1/(1680x^7) + 1/(1188x^9)
#[inline]
fn stirling_tail(x: f64) -> f64 {
    let x2 = x * x;
    (13860.0 - (462.0 - (132.0 - (99.0 - 140.0 / x2) / x2) / x2) / x2) / x / 166_320.0
}
