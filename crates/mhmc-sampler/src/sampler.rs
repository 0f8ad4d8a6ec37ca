//! Metropolis-Hastings sampler over batches of chains.

use mhmc_core::errors::{ErrorInfo, SamplerError};
use mhmc_core::{log_prob, Batch, Bound, HilbertSpace, LogPsi, Machine, RngKey};

use crate::acceptance::{accept_mask, select_values, uniform_draws};
use crate::config::SamplerConfig;
use crate::rule::{Proposal, RuleContext, TransitionRule};
use crate::state::ChainState;

/// Configurations recorded by [`MetropolisSampler::sample`], one batch per sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct Samples {
    batches: Vec<Batch>,
}

impl Samples {
    /// Number of recorded sweeps.
    pub fn chain_length(&self) -> usize {
        self.batches.len()
    }

    /// Batch recorded after sweep `step`.
    pub fn get(&self, step: usize) -> Option<&Batch> {
        self.batches.get(step)
    }

    /// Recorded batches in sweep order.
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Every recorded configuration, sweep-major then chain order.
    pub fn configurations(&self) -> impl Iterator<Item = &[f64]> + '_ {
        self.batches.iter().flat_map(|batch| batch.rows())
    }

    /// Consumes the samples and returns the batches.
    pub fn into_batches(self) -> Vec<Batch> {
        self.batches
    }
}

/// Metropolis-Hastings sampler with a pluggable transition rule.
///
/// The sampler itself is immutable; all per-session data lives in the
/// [`ChainState`] created by [`init_state`](Self::init_state).
#[derive(Debug, Clone)]
pub struct MetropolisSampler<H, R> {
    hilbert: H,
    rule: R,
    config: SamplerConfig,
    n_sweeps: usize,
}

impl<H: HilbertSpace, R: TransitionRule> MetropolisSampler<H, R> {
    /// Validates `config` against `hilbert` and builds the sampler.
    pub fn new(hilbert: H, rule: R, config: SamplerConfig) -> Result<Self, SamplerError> {
        let n_sweeps = config.validate(&hilbert)?;
        log::debug!(
            "metropolis sampler: dim={} n_chains={} n_sweeps={} machine_pow={} dtype={}",
            hilbert.size(),
            config.n_chains,
            n_sweeps,
            config.machine_pow,
            config.dtype.as_str()
        );
        Ok(Self {
            hilbert,
            rule,
            config,
            n_sweeps,
        })
    }

    /// Configuration space being sampled.
    pub fn hilbert(&self) -> &H {
        &self.hilbert
    }

    /// Transition rule generating proposals.
    pub fn rule(&self) -> &R {
        &self.rule
    }

    /// Config as supplied at construction.
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Number of chains per batch.
    pub fn n_chains(&self) -> usize {
        self.config.n_chains
    }

    /// Proposals per chain per sweep, after defaulting.
    pub fn n_sweeps(&self) -> usize {
        self.n_sweeps
    }

    fn context(&self) -> RuleContext<'_> {
        RuleContext::new(
            &self.hilbert,
            self.config.n_chains,
            self.n_sweeps,
            self.config.machine_pow,
            self.config.dtype,
        )
    }

    /// Creates the session state from a never-used master key.
    ///
    /// The batch starts zero-filled. Without `reset_chain` it is immediately
    /// replaced by a random draw, since such a sampler may never be reset.
    pub fn init_state<M, P>(
        &self,
        machine: &M,
        params: &P,
        master: RngKey,
    ) -> Result<ChainState<R::State>, SamplerError>
    where
        M: Machine<P> + ?Sized,
        P: ?Sized,
    {
        let ctx = self.context();
        let bound = Bound::new(machine, params);
        let (state_key, rule_key) = master.split();
        let rule_state = self.rule.init_state(&ctx, &bound, rule_key)?;

        let (rng, sigma) = if self.config.reset_chain {
            (state_key, Batch::zeros(self.n_chains(), self.hilbert.size()))
        } else {
            let (carry, draw) = state_key.split();
            let sigma = self.rule.random_state(&ctx, &bound, &rule_state, draw)?;
            self.check_shape(&sigma, "random_state")?;
            (carry, sigma)
        };

        log::info!(
            "initialised {} chains of dimension {}",
            self.n_chains(),
            self.hilbert.size()
        );
        Ok(ChainState {
            sigma,
            rng,
            rule_state,
            n_samples: 0,
            n_accepted: 0,
        })
    }

    /// Resets the chains and zeroes the acceptance counters.
    ///
    /// With `reset_chain` the configurations are redrawn, otherwise they are
    /// kept bit for bit. On error `state` is left untouched.
    pub fn reset<M, P>(
        &self,
        machine: &M,
        params: &P,
        state: &mut ChainState<R::State>,
    ) -> Result<(), SamplerError>
    where
        M: Machine<P> + ?Sized,
        P: ?Sized,
    {
        let ctx = self.context();
        let bound = Bound::new(machine, params);
        let sigma = &state.sigma;
        let current_rule_state = &state.rule_state;

        let (fresh, rule_state) = state.rng.advance_with(|draw| {
            let fresh = if self.config.reset_chain {
                let redrawn = self
                    .rule
                    .random_state(&ctx, &bound, current_rule_state, draw)?;
                self.check_shape(&redrawn, "random_state")?;
                Some(redrawn)
            } else {
                None
            };
            let rule_state = self.rule.reset(
                &ctx,
                &bound,
                fresh.as_ref().unwrap_or(sigma),
                current_rule_state,
            )?;
            Ok::<_, SamplerError>((fresh, rule_state))
        })?;

        if let Some(sigma) = fresh {
            state.sigma = sigma;
        }
        state.rule_state = rule_state;
        state.n_samples = 0;
        state.n_accepted = 0;
        log::info!(
            "reset {} chains (redrawn: {})",
            self.n_chains(),
            self.config.reset_chain
        );
        Ok(())
    }

    /// Replaces the configurations of every chain.
    ///
    /// Rows must have the sampler's shape and lie in the Hilbert space. The
    /// acceptance counters are left alone.
    pub fn set_configurations(
        &self,
        state: &mut ChainState<R::State>,
        sigma: Batch,
    ) -> Result<(), SamplerError> {
        self.check_shape(&sigma, "set_configurations")?;
        if let Some(chain) = sigma.rows().position(|row| !self.hilbert.contains(row)) {
            return Err(SamplerError::Configuration(
                ErrorInfo::new("outside-domain", "configuration is not in the Hilbert space")
                    .with_context("chain", chain.to_string()),
            ));
        }
        state.sigma = sigma;
        Ok(())
    }

    /// Advances every chain by one sweep and returns the resulting batch.
    ///
    /// The state is only updated once the whole sweep succeeded, so a
    /// scoring failure leaves it valid for a retry.
    pub fn advance<M, P>(
        &self,
        machine: &M,
        params: &P,
        state: &mut ChainState<R::State>,
    ) -> Result<Batch, SamplerError>
    where
        M: Machine<P> + ?Sized,
        P: ?Sized,
    {
        let bound = Bound::new(machine, params);
        let sigma = &state.sigma;
        let rule_state = &state.rule_state;
        let (next, accepted) = state
            .rng
            .advance_with(|working| self.sweep(&bound, rule_state, sigma, working))?;

        state.sigma = next;
        state.n_accepted += accepted;
        state.n_samples += self.moves_per_sweep();
        Ok(state.sigma.clone())
    }

    /// Runs `n_discard` sweeps without recording, then records `chain_length` sweeps.
    ///
    /// Equivalent to calling [`advance`](Self::advance) `n_discard +
    /// chain_length` times, except that nothing is committed unless every
    /// sweep succeeds.
    pub fn sample<M, P>(
        &self,
        machine: &M,
        params: &P,
        state: &mut ChainState<R::State>,
        chain_length: usize,
        n_discard: usize,
    ) -> Result<Samples, SamplerError>
    where
        M: Machine<P> + ?Sized,
        P: ?Sized,
    {
        let bound = Bound::new(machine, params);
        let rule_state = &state.rule_state;
        let mut sigma = state.sigma.clone();
        let mut accepted = 0u64;
        let mut batches = Vec::with_capacity(chain_length);

        state
            .rng
            .try_steps(n_discard + chain_length, |step, working| {
                let (next, next_accepted) = self.sweep(&bound, rule_state, &sigma, working)?;
                sigma = next;
                accepted += next_accepted;
                if step >= n_discard {
                    batches.push(sigma.clone());
                }
                Ok::<_, SamplerError>(())
            })?;

        state.sigma = sigma;
        state.n_accepted += accepted;
        state.n_samples += self.moves_per_sweep() * (n_discard + chain_length) as u64;
        log::info!(
            "sampled {} sweeps ({} discarded), acceptance {:?}",
            chain_length,
            n_discard,
            state.acceptance()
        );
        Ok(Samples { batches })
    }

    fn moves_per_sweep(&self) -> u64 {
        (self.n_sweeps * self.config.n_chains) as u64
    }

    /// One sweep of `n_sweeps` proposal/accept steps folded over the batch.
    fn sweep(
        &self,
        machine: &dyn LogPsi,
        rule_state: &R::State,
        sigma: &Batch,
        key: RngKey,
    ) -> Result<(Batch, u64), SamplerError> {
        let ctx = self.context();
        let machine_pow = self.config.machine_pow;
        let log_probs = log_prob(machine, sigma, machine_pow)?;

        let (sigma, _, accepted, _) = (0..self.n_sweeps).try_fold(
            (sigma.clone(), log_probs, 0u64, key),
            |(mut sigma, mut log_probs, accepted, key), iteration| {
                let (carry, rule_key, accept_key) = key.split3();
                let proposal = self
                    .rule
                    .transition(&ctx, machine, rule_state, rule_key, &sigma)?;
                self.check_proposal(&proposal)?;
                let proposed_log_probs = log_prob(machine, &proposal.configs, machine_pow)?;
                let uniforms = uniform_draws(accept_key, sigma.n_chains());
                let mask = accept_mask(
                    &uniforms,
                    &log_probs,
                    &proposed_log_probs,
                    proposal.log_correction.as_deref(),
                );
                sigma.select_rows(&mask, &proposal.configs)?;
                select_values(&mask, &mut log_probs, &proposed_log_probs);
                let step_accepted = mask.iter().filter(|&&take| take).count() as u64;
                log::trace!("sweep iteration {iteration}: accepted {step_accepted}");
                Ok::<_, SamplerError>((sigma, log_probs, accepted + step_accepted, carry))
            },
        )?;

        if accepted == 0 {
            log::warn!(
                "sweep accepted no moves across {} chains",
                self.config.n_chains
            );
        }
        log::debug!(
            "sweep accepted {accepted} of {} proposals",
            self.moves_per_sweep()
        );
        Ok((sigma, accepted))
    }

    fn check_shape(&self, sigma: &Batch, source: &str) -> Result<(), SamplerError> {
        let expected = (self.config.n_chains, self.hilbert.size());
        if sigma.shape() != expected {
            return Err(SamplerError::Configuration(
                ErrorInfo::new("shape-mismatch", "batch shape differs from sampler shape")
                    .with_context("source", source)
                    .with_context("expected", format!("{expected:?}"))
                    .with_context("actual", format!("{:?}", sigma.shape())),
            ));
        }
        Ok(())
    }

    fn check_proposal(&self, proposal: &Proposal) -> Result<(), SamplerError> {
        self.check_shape(&proposal.configs, "transition")?;
        if let Some(correction) = &proposal.log_correction {
            if correction.len() != self.config.n_chains {
                return Err(SamplerError::Configuration(
                    ErrorInfo::new("correction-length", "one log correction per chain required")
                        .with_context("expected", self.config.n_chains.to_string())
                        .with_context("actual", correction.len().to_string()),
                ));
            }
        }
        Ok(())
    }
}
