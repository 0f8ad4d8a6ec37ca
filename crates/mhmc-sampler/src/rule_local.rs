use mhmc_core::errors::SamplerError;
use mhmc_core::{Batch, LogPsi, RngKey};
use rand::Rng;

use crate::rule::{Proposal, RuleContext, TransitionRule};

/// Changes one uniformly chosen coordinate per chain to a different admissible value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalRule;

impl TransitionRule for LocalRule {
    type State = ();

    fn init_state(
        &self,
        _ctx: &RuleContext<'_>,
        _machine: &dyn LogPsi,
        _key: RngKey,
    ) -> Result<Self::State, SamplerError> {
        Ok(())
    }

    fn transition(
        &self,
        ctx: &RuleContext<'_>,
        _machine: &dyn LogPsi,
        _rule_state: &Self::State,
        key: RngKey,
        sigma: &Batch,
    ) -> Result<Proposal, SamplerError> {
        let hilbert = ctx.hilbert();
        let dtype = ctx.dtype();
        let mut rng = key.into_rng();
        let mut proposed = sigma.clone();
        if sigma.dim() == 0 {
            return Ok(Proposal::symmetric(proposed));
        }
        for chain in 0..sigma.n_chains() {
            let site = rng.gen_range(0..sigma.dim());
            let row = proposed.row_mut(chain);
            let current = row[site];
            let mut alternatives = hilbert
                .local_states(site)
                .iter()
                .copied()
                .filter(|value| *value != current);
            let n_alternatives = alternatives.clone().count();
            // single-valued domains have nowhere to go
            if n_alternatives == 0 {
                continue;
            }
            if let Some(value) = alternatives.nth(rng.gen_range(0..n_alternatives)) {
                row[site] = dtype.cast(value);
            }
        }
        Ok(Proposal::symmetric(proposed))
    }
}
