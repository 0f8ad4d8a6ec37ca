use std::fs;
use std::path::Path;

use mhmc_core::errors::{ErrorInfo, SamplerError};
use mhmc_core::{Dtype, HilbertSpace};
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters of a Metropolis sampler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerConfig {
    /// Number of chains advanced in lockstep.
    #[serde(default = "default_n_chains")]
    pub n_chains: usize,
    /// Proposals per chain per sweep; `None` or `0` means the Hilbert space size.
    #[serde(default)]
    pub n_sweeps: Option<usize>,
    /// Whether `reset` redraws configurations instead of keeping them.
    #[serde(default)]
    pub reset_chain: bool,
    /// Exponent applied to `Re(log psi)` to form the log-probability.
    #[serde(default = "default_machine_pow")]
    pub machine_pow: f64,
    /// Numeric type of the configurations.
    #[serde(default)]
    pub dtype: Dtype,
}

fn default_n_chains() -> usize {
    8
}

fn default_machine_pow() -> f64 {
    2.0
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            n_chains: default_n_chains(),
            n_sweeps: None,
            reset_chain: false,
            machine_pow: default_machine_pow(),
            dtype: Dtype::default(),
        }
    }
}

impl SamplerConfig {
    /// Parses a config from a YAML document; missing keys take their defaults.
    pub fn from_yaml_str(contents: &str) -> Result<Self, SamplerError> {
        serde_yaml::from_str(contents).map_err(|err| {
            SamplerError::Serde(ErrorInfo::new("config-parse", err.to_string()))
        })
    }

    /// Reads and parses a YAML config file.
    pub fn from_path(path: &Path) -> Result<Self, SamplerError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SamplerError::Serde(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&contents).map_err(|err| match err {
            SamplerError::Serde(info) => {
                SamplerError::Serde(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }

    /// Renders the config as YAML.
    pub fn to_yaml_string(&self) -> Result<String, SamplerError> {
        serde_yaml::to_string(self)
            .map_err(|err| SamplerError::Serde(ErrorInfo::new("config-render", err.to_string())))
    }

    /// Sweep count after defaulting against a space of `dim` coordinates.
    pub fn resolved_sweeps(&self, dim: usize) -> usize {
        match self.n_sweeps {
            Some(n) if n > 0 => n,
            _ => dim,
        }
    }

    /// Checks the config against `hilbert` and returns the resolved sweep count.
    pub fn validate(&self, hilbert: &dyn HilbertSpace) -> Result<usize, SamplerError> {
        if self.n_chains == 0 {
            return Err(SamplerError::Configuration(
                ErrorInfo::new("zero-chains", "n_chains must be positive")
                    .with_hint("use at least one chain"),
            ));
        }
        if !self.machine_pow.is_finite() || self.machine_pow <= 0.0 {
            return Err(SamplerError::Configuration(
                ErrorInfo::new("invalid-machine-pow", "machine_pow must be finite and positive")
                    .with_context("machine_pow", self.machine_pow.to_string()),
            ));
        }
        let dim = hilbert.size();
        if dim == 0 {
            return Err(SamplerError::Configuration(ErrorInfo::new(
                "empty-hilbert",
                "configuration space has no coordinates",
            )));
        }
        let n_sweeps = self.resolved_sweeps(dim);
        for site in 0..dim {
            let states = hilbert.local_states(site);
            if states.is_empty() {
                return Err(SamplerError::Configuration(
                    ErrorInfo::new("empty-domain", "coordinate has no admissible values")
                        .with_context("site", site.to_string()),
                ));
            }
            if let Some(value) = states.iter().find(|value| !self.dtype.represents(**value)) {
                return Err(SamplerError::Configuration(
                    ErrorInfo::new(
                        "dtype-mismatch",
                        "dtype cannot represent every admissible value",
                    )
                    .with_context("dtype", self.dtype.as_str())
                    .with_context("site", site.to_string())
                    .with_context("value", value.to_string()),
                ));
            }
        }
        Ok(n_sweeps)
    }
}
