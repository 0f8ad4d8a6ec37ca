use criterion::{criterion_group, criterion_main, Criterion};
use mhmc_core::{Batch, Complex64, DiscreteHilbert, MachineError, RngKey};
use mhmc_graph::hypercube;
use mhmc_sampler::{ExchangeRule, LocalRule, MetropolisSampler, MixtureRule, SamplerConfig};

fn ising(coupling: &f64, batch: &Batch) -> Result<Vec<Complex64>, MachineError> {
    Ok(batch
        .rows()
        .map(|row| {
            let bonds: f64 = row.windows(2).map(|pair| pair[0] * pair[1]).sum();
            Complex64::new(coupling * bonds, 0.0)
        })
        .collect())
}

fn bench_config() -> SamplerConfig {
    SamplerConfig {
        n_chains: 64,
        ..SamplerConfig::default()
    }
}

fn bench_sweep(c: &mut Criterion) {
    let sampler =
        MetropolisSampler::new(DiscreteHilbert::spin_half(36), LocalRule, bench_config()).unwrap();
    let mut state = sampler.init_state(&ising, &0.4, RngKey::new(42)).unwrap();

    c.bench_function("local_sweep", |b| {
        b.iter(|| {
            let _ = sampler.advance(&ising, &0.4, &mut state).unwrap();
        })
    });
}

fn bench_mixture_sweep(c: &mut Criterion) {
    let exchange = ExchangeRule::from_graph(hypercube(6, 2, true).unwrap(), 1);
    let rule = MixtureRule::new(LocalRule, exchange, 0.5);
    let sampler =
        MetropolisSampler::new(DiscreteHilbert::spin_half(36), rule, bench_config()).unwrap();
    let mut state = sampler.init_state(&ising, &0.4, RngKey::new(42)).unwrap();

    c.bench_function("mixture_sweep", |b| {
        b.iter(|| {
            let _ = sampler.advance(&ising, &0.4, &mut state).unwrap();
        })
    });
}

criterion_group!(benches, bench_sweep, bench_mixture_sweep);
criterion_main!(benches);
