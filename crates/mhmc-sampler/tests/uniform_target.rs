use std::collections::BTreeMap;

use mhmc_core::{Batch, Complex64, DiscreteHilbert, MachineError, RngKey};
use mhmc_sampler::{LocalRule, MetropolisSampler, SamplerConfig};

fn flat(_: &(), batch: &Batch) -> Result<Vec<Complex64>, MachineError> {
    Ok(vec![Complex64::new(0.0, 0.0); batch.n_chains()])
}

fn index_of(row: &[f64]) -> usize {
    row.iter()
        .enumerate()
        .filter(|(_, &value)| value > 0.0)
        .map(|(site, _)| 1 << site)
        .sum()
}

fn four_spin_sampler() -> MetropolisSampler<DiscreteHilbert, LocalRule> {
    let config = SamplerConfig {
        n_chains: 2,
        n_sweeps: Some(4),
        ..SamplerConfig::default()
    };
    MetropolisSampler::new(DiscreteHilbert::spin_half(4), LocalRule, config).unwrap()
}

#[test]
fn constant_amplitude_accepts_every_move() {
    let sampler = four_spin_sampler();
    let mut state = sampler.init_state(&flat, &(), RngKey::new(11)).unwrap();
    for _ in 0..100 {
        sampler.advance(&flat, &(), &mut state).unwrap();
    }
    assert_eq!(state.n_samples(), 800);
    assert_eq!(state.n_accepted(), 800);
    assert_eq!(state.acceptance(), Some(1.0));
}

#[test]
fn constant_amplitude_visits_configurations_uniformly() {
    let sampler = four_spin_sampler();
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    let trials = 400;

    for seed in 0..trials {
        let mut state = sampler.init_state(&flat, &(), RngKey::new(seed)).unwrap();
        for _ in 0..100 {
            sampler.advance(&flat, &(), &mut state).unwrap();
        }
        for row in state.configurations().rows() {
            *counts.entry(index_of(row)).or_default() += 1;
        }
    }

    assert_eq!(counts.len(), 16);
    let total = (trials * 2) as f64;
    let expected = total / 16.0;
    let chi_square: f64 = counts
        .values()
        .map(|&observed| {
            let diff = observed as f64 - expected;
            diff * diff / expected
        })
        .sum();
    // 15 degrees of freedom; the 0.9999 quantile is about 44.3
    assert!(chi_square < 50.0, "chi-square {chi_square} with counts {counts:?}");
}
