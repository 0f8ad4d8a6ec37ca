use std::fmt;

use mhmc_core::errors::{ErrorInfo, SamplerError};
use mhmc_core::{Batch, Dtype, HilbertSpace, LogPsi, RngKey};

/// Read-only view of the sampler handed to transition rules.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    hilbert: &'a dyn HilbertSpace,
    n_chains: usize,
    n_sweeps: usize,
    machine_pow: f64,
    dtype: Dtype,
}

impl<'a> RuleContext<'a> {
    /// Creates a context; samplers build one per call.
    pub fn new(
        hilbert: &'a dyn HilbertSpace,
        n_chains: usize,
        n_sweeps: usize,
        machine_pow: f64,
        dtype: Dtype,
    ) -> Self {
        Self {
            hilbert,
            n_chains,
            n_sweeps,
            machine_pow,
            dtype,
        }
    }

    /// Configuration space being sampled.
    pub fn hilbert(&self) -> &'a dyn HilbertSpace {
        self.hilbert
    }

    /// Number of chains in every batch.
    pub fn n_chains(&self) -> usize {
        self.n_chains
    }

    /// Proposals per chain per sweep.
    pub fn n_sweeps(&self) -> usize {
        self.n_sweeps
    }

    /// Exponent turning `Re(log psi)` into a log-probability.
    pub fn machine_pow(&self) -> f64 {
        self.machine_pow
    }

    /// Numeric type of configuration entries.
    pub fn dtype(&self) -> Dtype {
        self.dtype
    }
}

impl fmt::Debug for RuleContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleContext")
            .field("dim", &self.hilbert.size())
            .field("n_chains", &self.n_chains)
            .field("n_sweeps", &self.n_sweeps)
            .field("machine_pow", &self.machine_pow)
            .field("dtype", &self.dtype)
            .finish()
    }
}

/// Proposed configurations for a whole batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    /// One proposed configuration per chain.
    pub configs: Batch,
    /// Per-chain `ln q(sigma | sigma') - ln q(sigma' | sigma)`; `None` for symmetric kernels.
    pub log_correction: Option<Vec<f64>>,
}

impl Proposal {
    /// Proposal from a symmetric kernel.
    pub fn symmetric(configs: Batch) -> Self {
        Self {
            configs,
            log_correction: None,
        }
    }
}

/// Strategy generating Metropolis proposals.
///
/// All methods are pure functions of their arguments. Randomness only enters
/// through the [`RngKey`] passed by value, which the rule consumes.
pub trait TransitionRule {
    /// Auxiliary payload threaded through the sampler untouched.
    type State: Clone + fmt::Debug;

    /// Builds the auxiliary state once per session from a fresh key.
    fn init_state(
        &self,
        ctx: &RuleContext<'_>,
        machine: &dyn LogPsi,
        key: RngKey,
    ) -> Result<Self::State, SamplerError>;

    /// Refreshes the auxiliary state on chain reset; keeps it by default.
    fn reset(
        &self,
        ctx: &RuleContext<'_>,
        machine: &dyn LogPsi,
        sigma: &Batch,
        rule_state: &Self::State,
    ) -> Result<Self::State, SamplerError> {
        let _ = (ctx, machine, sigma);
        Ok(rule_state.clone())
    }

    /// Proposes one move per chain from `sigma`.
    ///
    /// Rules without proposal logic keep this default, which fails with
    /// [`SamplerError::RuleNotImplemented`].
    fn transition(
        &self,
        ctx: &RuleContext<'_>,
        machine: &dyn LogPsi,
        rule_state: &Self::State,
        key: RngKey,
        sigma: &Batch,
    ) -> Result<Proposal, SamplerError> {
        let _ = (ctx, machine, rule_state, key);
        Err(SamplerError::RuleNotImplemented(
            ErrorInfo::new(
                "transition-missing",
                "transition rule does not implement a proposal",
            )
            .with_context("rule", std::any::type_name::<Self>())
            .with_context("n_chains", sigma.n_chains().to_string()),
        ))
    }

    /// Draws a batch of uniformly random configurations for a restart.
    fn random_state(
        &self,
        ctx: &RuleContext<'_>,
        machine: &dyn LogPsi,
        rule_state: &Self::State,
        key: RngKey,
    ) -> Result<Batch, SamplerError> {
        let _ = (machine, rule_state);
        let mut rng = key.into_rng();
        Ok(ctx
            .hilbert()
            .random_state(&mut rng, ctx.n_chains(), ctx.dtype()))
    }
}

/// Rule with no proposal logic.
///
/// Useful as a starting point and to check that samplers refuse to run
/// without one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseRule;

impl TransitionRule for BaseRule {
    type State = ();

    fn init_state(
        &self,
        _ctx: &RuleContext<'_>,
        _machine: &dyn LogPsi,
        _key: RngKey,
    ) -> Result<Self::State, SamplerError> {
        Ok(())
    }
}
