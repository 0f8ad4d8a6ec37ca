use mhmc_core::{Batch, Complex64, DiscreteHilbert, MachineError, RngKey, SamplerError};
use mhmc_sampler::{BaseRule, LocalRule, MetropolisSampler, SamplerConfig};

#[derive(Clone, Copy)]
enum Mode {
    Healthy,
    Failing,
    NotANumber,
    Truncated,
}

fn scripted(mode: &Mode, batch: &Batch) -> Result<Vec<Complex64>, MachineError> {
    let n = batch.n_chains();
    match mode {
        Mode::Healthy => Ok(batch
            .rows()
            .map(|row| Complex64::new(0.25 * row.iter().sum::<f64>(), 0.0))
            .collect()),
        Mode::Failing => Err(MachineError::new("network diverged")),
        Mode::NotANumber => Ok(vec![Complex64::new(f64::NAN, 0.0); n]),
        Mode::Truncated => Ok(vec![Complex64::new(0.0, 0.0); n.saturating_sub(1)]),
    }
}

fn sampler() -> MetropolisSampler<DiscreteHilbert, LocalRule> {
    let config = SamplerConfig {
        n_chains: 4,
        ..SamplerConfig::default()
    };
    MetropolisSampler::new(DiscreteHilbert::spin_half(6), LocalRule, config).unwrap()
}

#[test]
fn scoring_failures_leave_state_untouched() {
    let sampler = sampler();
    let mut state = sampler
        .init_state(&scripted, &Mode::Healthy, RngKey::new(5))
        .unwrap();
    sampler
        .advance(&scripted, &Mode::Healthy, &mut state)
        .unwrap();
    let before = state.fingerprint();

    for (mode, code) in [
        (Mode::Failing, "machine-failed"),
        (Mode::NotANumber, "nan-log-amplitude"),
        (Mode::Truncated, "shape-mismatch"),
    ] {
        let err = sampler.advance(&scripted, &mode, &mut state).unwrap_err();
        assert!(matches!(err, SamplerError::ScoringFunction(_)), "{err}");
        assert!(err.is_recoverable());
        assert_eq!(err.info().code, code);
        assert_eq!(state.fingerprint(), before);

        let err = sampler
            .sample(&scripted, &mode, &mut state, 3, 1)
            .unwrap_err();
        assert_eq!(err.info().code, code);
        assert_eq!(state.fingerprint(), before);
    }

    // the session keeps working after a failure
    sampler
        .advance(&scripted, &Mode::Healthy, &mut state)
        .unwrap();
    assert_ne!(state.fingerprint(), before);
}

#[test]
fn retry_after_failure_matches_uninterrupted_run() {
    let sampler = sampler();
    let mut interrupted = sampler
        .init_state(&scripted, &Mode::Healthy, RngKey::new(13))
        .unwrap();
    let mut clean = sampler
        .init_state(&scripted, &Mode::Healthy, RngKey::new(13))
        .unwrap();

    sampler
        .advance(&scripted, &Mode::Failing, &mut interrupted)
        .unwrap_err();
    let retried = sampler
        .advance(&scripted, &Mode::Healthy, &mut interrupted)
        .unwrap();
    let expected = sampler
        .advance(&scripted, &Mode::Healthy, &mut clean)
        .unwrap();

    assert_eq!(retried, expected);
    assert_eq!(interrupted.fingerprint(), clean.fingerprint());
}

#[test]
fn base_rule_refuses_to_propose() {
    let sampler =
        MetropolisSampler::new(DiscreteHilbert::qubits(3), BaseRule, SamplerConfig::default())
            .unwrap();
    let mut state = sampler
        .init_state(&scripted, &Mode::Healthy, RngKey::new(1))
        .unwrap();
    let before = state.fingerprint();

    let err = sampler
        .advance(&scripted, &Mode::Healthy, &mut state)
        .unwrap_err();

    assert!(matches!(err, SamplerError::RuleNotImplemented(_)));
    assert_eq!(err.info().code, "transition-missing");
    assert!(!err.is_recoverable());
    assert_eq!(state.fingerprint(), before);
}

#[test]
fn failing_advance_after_reset_keeps_state() {
    let config = SamplerConfig {
        n_chains: 4,
        reset_chain: true,
        ..SamplerConfig::default()
    };
    let sampler = MetropolisSampler::new(DiscreteHilbert::spin_half(6), LocalRule, config).unwrap();
    let mut state = sampler
        .init_state(&scripted, &Mode::Healthy, RngKey::new(2))
        .unwrap();
    sampler.reset(&scripted, &Mode::Healthy, &mut state).unwrap();
    let before = state.fingerprint();
    sampler
        .advance(&scripted, &Mode::Failing, &mut state)
        .unwrap_err();
    assert_eq!(state.fingerprint(), before);
}
