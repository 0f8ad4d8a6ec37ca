use mhmc_core::errors::{ErrorInfo, SamplerError};
use mhmc_core::MachineError;

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("chain", "1")
        .with_context("reason", "example")
}

#[test]
fn configuration_error_surface() {
    let err = SamplerError::Configuration(sample_info("zero-chains", "n_chains must be positive"));
    assert_eq!(err.info().code, "zero-chains");
    assert!(err.info().context.contains_key("chain"));
    assert!(!err.is_recoverable());
}

#[test]
fn scoring_error_is_recoverable() {
    let err = SamplerError::ScoringFunction(sample_info("nan-log-amplitude", "NaN"));
    assert_eq!(err.info().code, "nan-log-amplitude");
    assert!(err.is_recoverable());
}

#[test]
fn rule_errors_are_fatal() {
    let err = SamplerError::RuleNotImplemented(sample_info("transition-missing", "base rule"));
    assert!(!err.is_recoverable());
    let err = SamplerError::RuleConstruction(sample_info("no-exchange-pairs", "d_max too small"));
    assert!(!err.is_recoverable());
}

#[test]
fn display_includes_context_and_hint() {
    let err = SamplerError::Graph(
        ErrorInfo::new("self-loop", "edges must join distinct nodes")
            .with_context("node", "3")
            .with_hint("drop the edge"),
    );
    let rendered = err.to_string();
    assert!(rendered.starts_with("graph error: edges must join distinct nodes (code: self-loop)"));
    assert!(rendered.contains("node=3"));
    assert!(rendered.ends_with("hint: drop the edge"));
}

#[test]
fn machine_error_converts_to_scoring_failure() {
    let err = MachineError::new("network diverged");
    assert_eq!(err.to_string(), "network diverged");
    let source: &dyn std::error::Error = &err;
    assert!(source.source().is_none());

    let converted = SamplerError::from(err);
    assert!(matches!(converted, SamplerError::ScoringFunction(_)));
    assert_eq!(converted.info().code, "machine-failed");
    assert_eq!(converted.info().message, "network diverged");
    assert!(converted.is_recoverable());
}
