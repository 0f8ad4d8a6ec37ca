//! Sparse operators driving Hamiltonian proposals.

use std::fmt;

use mhmc_core::errors::{ErrorInfo, SamplerError};
use mhmc_graph::Graph;
use num_complex::Complex64;

/// One nonzero matrix element `<sigma|O|sigma'>` of a sparse operator row.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// Target configuration `sigma'`.
    pub config: Vec<f64>,
    /// Matrix element (coupling) between `sigma` and `sigma'`.
    pub mel: Complex64,
}

/// Operator exposing its rows as finite lists of connected configurations.
pub trait SparseOperator: fmt::Debug + Send + Sync {
    /// Length of the configurations the operator acts on.
    fn size(&self) -> usize;

    /// Configurations connected to `config`, diagonal entry included or not.
    fn connected(&self, config: &[f64]) -> Result<Vec<Connection>, SamplerError>;
}

/// Hopping term `J sum_<ij> (|..b_i..a_j..><..a_i..b_j..| + h.c.)` over graph bonds.
///
/// Connects a configuration to every configuration obtained by exchanging
/// the values at the two ends of a bond whose values differ.
#[derive(Debug, Clone)]
pub struct BondHopping {
    graph: Graph,
    coupling: f64,
}

impl BondHopping {
    /// Hopping with amplitude `coupling` on every bond of `graph`.
    pub fn new(graph: Graph, coupling: f64) -> Result<Self, SamplerError> {
        if !coupling.is_finite() {
            return Err(SamplerError::Operator(
                ErrorInfo::new("mel-not-finite", "coupling must be finite")
                    .with_context("coupling", coupling.to_string()),
            ));
        }
        Ok(Self { graph, coupling })
    }

    /// Bond graph of the operator.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }
}

impl SparseOperator for BondHopping {
    fn size(&self) -> usize {
        self.graph.n_nodes()
    }

    fn connected(&self, config: &[f64]) -> Result<Vec<Connection>, SamplerError> {
        if config.len() != self.graph.n_nodes() {
            return Err(SamplerError::Operator(
                ErrorInfo::new("connection-shape", "configuration length differs from operator size")
                    .with_context("expected", self.graph.n_nodes().to_string())
                    .with_context("actual", config.len().to_string()),
            ));
        }
        Ok(self
            .graph
            .edges()
            .iter()
            .filter(|&&(i, j)| config[i] != config[j])
            .map(|&(i, j)| {
                let mut target = config.to_vec();
                target.swap(i, j);
                Connection {
                    config: target,
                    mel: Complex64::new(self.coupling, 0.0),
                }
            })
            .collect())
    }
}
