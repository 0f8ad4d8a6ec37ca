use mhmc_core::{Batch, Complex64, DiscreteHilbert, MachineError, RngKey};
use mhmc_sampler::{LocalRule, MetropolisSampler, SamplerConfig};

/// Log amplitude that is finite everywhere except at the all-up configuration.
fn deep_well(_: &(), batch: &Batch) -> Result<Vec<Complex64>, MachineError> {
    Ok(batch
        .rows()
        .map(|row| {
            if row.iter().all(|&value| value > 0.0) {
                Complex64::new(f64::NEG_INFINITY, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            }
        })
        .collect())
}

/// Log amplitude peaked at the all-up configuration.
fn peaked(_: &(), batch: &Batch) -> Result<Vec<Complex64>, MachineError> {
    Ok(batch
        .rows()
        .map(|row| {
            if row.iter().all(|&value| value > 0.0) {
                Complex64::new(f64::INFINITY, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            }
        })
        .collect())
}

fn single_step_sampler(n_chains: usize) -> MetropolisSampler<DiscreteHilbert, LocalRule> {
    let config = SamplerConfig {
        n_chains,
        n_sweeps: Some(1),
        ..SamplerConfig::default()
    };
    MetropolisSampler::new(DiscreteHilbert::spin_half(3), LocalRule, config).unwrap()
}

#[test]
fn zero_probability_current_always_moves() {
    let sampler = single_step_sampler(5);
    let mut state = sampler.init_state(&deep_well, &(), RngKey::new(8)).unwrap();
    let all_up = Batch::from_flat(5, 3, vec![1.0; 15]).unwrap();
    sampler.set_configurations(&mut state, all_up.clone()).unwrap();

    let batch = sampler.advance(&deep_well, &(), &mut state).unwrap();

    assert_eq!(state.n_accepted(), 5);
    for (before, after) in all_up.rows().zip(batch.rows()) {
        assert_ne!(before, after);
    }
}

#[test]
fn infinite_proposal_is_always_taken() {
    let sampler = single_step_sampler(4);
    let mut state = sampler.init_state(&peaked, &(), RngKey::new(21)).unwrap();
    // one flip away from all-up, with a single flippable site
    let near = Batch::from_rows(&[[1.0, 1.0, -1.0]; 4]).unwrap();
    sampler.set_configurations(&mut state, near).unwrap();

    let mut reached = 0;
    for _ in 0..500 {
        let batch = sampler.advance(&peaked, &(), &mut state).unwrap();
        reached = batch
            .rows()
            .filter(|row| row.iter().all(|&value| value > 0.0))
            .count();
        if reached == 4 {
            break;
        }
    }
    assert_eq!(reached, 4);

    // leaving the peak has ratio -inf, so the chains stay put
    let accepted_before = state.n_accepted();
    let batch = sampler.advance(&peaked, &(), &mut state).unwrap();
    assert_eq!(state.n_accepted(), accepted_before);
    assert_eq!(batch, Batch::from_flat(4, 3, vec![1.0; 12]).unwrap());
}

#[test]
fn set_configurations_checks_domain_and_shape() {
    let sampler = single_step_sampler(2);
    let mut state = sampler.init_state(&deep_well, &(), RngKey::new(0)).unwrap();

    let err = sampler
        .set_configurations(&mut state, Batch::zeros(2, 3))
        .unwrap_err();
    assert_eq!(err.info().code, "outside-domain");

    let err = sampler
        .set_configurations(&mut state, Batch::zeros(3, 3))
        .unwrap_err();
    assert_eq!(err.info().code, "shape-mismatch");
}
