//! Numerically stable primitives for base-10 log-domain probability math.
//!
//! All model tables store log10 probabilities, so the accumulation
//! primitives here work in base 10 throughout. Summing probabilities stored
//! in the log domain via naive `10^x` round trips loses precision for long
//! sequences; `log10_sum_exp` is the single accumulation primitive used by
//! the decoders instead.

/// log10 of the smallest positive normal f64.
///
/// Used as the floor for probabilities that would otherwise be zero, keeping
/// downstream log-domain sums finite.
pub fn log10_floor() -> f64 {
    f64::MIN_POSITIVE.log10()
}

/// Stable log10(sum(10^v for v in values)).
///
/// Returns NEG_INFINITY for empty input or all -inf inputs; NaN inputs
/// propagate.
pub fn log10_sum_exp(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NEG_INFINITY;
    }
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    if max == f64::INFINITY {
        return f64::INFINITY;
    }
    let mut sum = 0.0;
    for v in values {
        sum += pow10(*v - max);
    }
    max + sum.log10()
}

/// Stable log10(10^a + 10^b).
pub fn log10_add_exp(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        return f64::NAN;
    }
    if a == f64::NEG_INFINITY {
        return b;
    }
    if b == f64::NEG_INFINITY {
        return a;
    }
    if a == f64::INFINITY || b == f64::INFINITY {
        return f64::INFINITY;
    }
    let m = a.max(b);
    let diff = (a - b).abs();
    m + pow10(-diff).ln_1p() / std::f64::consts::LN_10
}

/// 10^x.
#[inline]
pub fn pow10(x: f64) -> f64 {
    10.0_f64.powf(x)
}

/// log10 of a linear-domain probability, floored instead of -inf for zero.
pub fn log10_prob(p: f64) -> f64 {
    if p <= 0.0 {
        log10_floor()
    } else {
        p.log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        (a - b).abs() <= tol
    }

    #[test]
    fn log10_sum_exp_basic() {
        let v = [0.0, 0.0];
        let out = log10_sum_exp(&v);
        assert!(approx_eq(out, 2.0f64.log10(), 1e-12));
    }

    #[test]
    fn log10_sum_exp_dominance() {
        let v = [-1000.0, 0.0];
        let out = log10_sum_exp(&v);
        assert!(approx_eq(out, 0.0, 1e-12));
    }

    #[test]
    fn log10_sum_exp_empty_and_neg_inf() {
        assert!(log10_sum_exp(&[]).is_infinite());
        let v = [f64::NEG_INFINITY, f64::NEG_INFINITY];
        let out = log10_sum_exp(&v);
        assert!(out.is_infinite() && out.is_sign_negative());
    }

    #[test]
    fn log10_sum_exp_nan_propagates() {
        assert!(log10_sum_exp(&[0.0, f64::NAN]).is_nan());
    }

    #[test]
    fn log10_add_exp_matches_lse() {
        let a = 1.234;
        let b = -0.75;
        let out = log10_add_exp(a, b);
        let lse = log10_sum_exp(&[a, b]);
        assert!(approx_eq(out, lse, 1e-12));
    }

    #[test]
    fn log10_add_exp_neg_inf_identity() {
        assert!(approx_eq(log10_add_exp(f64::NEG_INFINITY, 2.0), 2.0, 1e-12));
        assert!(approx_eq(log10_add_exp(2.0, f64::NEG_INFINITY), 2.0, 1e-12));
    }

    #[test]
    fn log10_prob_floors_zero() {
        assert!(approx_eq(log10_prob(0.0), log10_floor(), 1e-12));
        assert!(approx_eq(log10_prob(0.1), -1.0, 1e-12));
        assert!(log10_prob(0.0).is_finite());
    }

    proptest! {
        #[test]
        fn log10_sum_exp_matches_linear_sum(values in proptest::collection::vec(-5.0f64..0.0, 1..10)) {
            let linear: f64 = values.iter().map(|v| pow10(*v)).sum();
            let out = log10_sum_exp(&values);
            prop_assert!((pow10(out) - linear).abs() < 1e-9);
        }

        #[test]
        fn log10_sum_exp_at_least_max(values in proptest::collection::vec(-50.0f64..0.0, 1..10)) {
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            prop_assert!(log10_sum_exp(&values) >= max);
        }
    }
}
