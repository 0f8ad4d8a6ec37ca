//! Log-domain Metropolis-Hastings acceptance test.

use mhmc_core::RngKey;
use rand::Rng;

/// Log of the acceptance ratio for one chain.
///
/// The difference is formed before exponentiating. A `-inf` current
/// log-probability against a finite proposal yields `+inf`, a finite current
/// against a `-inf` proposal yields `-inf`; `NaN` (both infinite with the same
/// sign) is left as is and rejected by [`accepts`].
pub fn log_ratio(current: f64, proposed: f64, correction: f64) -> f64 {
    proposed - current + correction
}

/// Whether a uniform draw `u` in `[0, 1)` accepts a move with `log_ratio`.
///
/// `exp` saturating to `+inf` accepts unconditionally; `NaN` never accepts.
pub fn accepts(u: f64, log_ratio: f64) -> bool {
    u < log_ratio.exp()
}

/// `n` independent uniform draws in `[0, 1)` from a consumed key.
pub fn uniform_draws(key: RngKey, n: usize) -> Vec<f64> {
    let mut rng = key.into_rng();
    (0..n).map(|_| rng.gen::<f64>()).collect()
}

/// Per-chain acceptance mask.
///
/// `correction` is the optional Hastings term; a missing term counts as zero.
pub fn accept_mask(
    uniforms: &[f64],
    current: &[f64],
    proposed: &[f64],
    correction: Option<&[f64]>,
) -> Vec<bool> {
    uniforms
        .iter()
        .zip(current.iter().zip(proposed))
        .enumerate()
        .map(|(chain, (&u, (&cur, &prop)))| {
            let corr = correction.map_or(0.0, |values| values[chain]);
            accepts(u, log_ratio(cur, prop, corr))
        })
        .collect()
}

/// Keeps `current[i]` where `mask[i]` is false and takes `proposed[i]` otherwise.
pub fn select_values(mask: &[bool], current: &mut [f64], proposed: &[f64]) {
    for ((dst, &src), &take) in current.iter_mut().zip(proposed).zip(mask) {
        let pick = u64::from(take).wrapping_neg();
        *dst = f64::from_bits((src.to_bits() & pick) | (dst.to_bits() & !pick));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_log_probs_always_accept() {
        for u in [0.0, 0.5, 0.999_999] {
            assert!(accepts(u, log_ratio(-3.0, -3.0, 0.0)));
        }
    }

    #[test]
    fn overflow_to_infinity_accepts() {
        let ratio = log_ratio(-1.0e300, 1.0e300, 0.0);
        assert!(ratio.exp().is_infinite());
        assert!(accepts(0.999, ratio));
    }

    #[test]
    fn infinite_endpoints_follow_natural_limits() {
        assert!(accepts(0.999, log_ratio(f64::NEG_INFINITY, -5.0, 0.0)));
        assert!(!accepts(0.0, log_ratio(-5.0, f64::NEG_INFINITY, 0.0)));
        assert!(!accepts(0.0, log_ratio(f64::NEG_INFINITY, f64::NEG_INFINITY, 0.0)));
    }

    #[test]
    fn correction_shifts_the_ratio() {
        // exp(-ln 2) = 0.5
        let mask = accept_mask(
            &[0.4, 0.6],
            &[0.0, 0.0],
            &[0.0, 0.0],
            Some(&[-std::f64::consts::LN_2, -std::f64::consts::LN_2]),
        );
        assert_eq!(mask, vec![true, false]);
    }

    #[test]
    fn select_values_respects_mask() {
        let mut current = vec![1.0, 2.0, f64::NEG_INFINITY];
        select_values(&[false, true, true], &mut current, &[9.0, 8.0, 7.0]);
        assert_eq!(current, vec![1.0, 8.0, 7.0]);
    }
}
