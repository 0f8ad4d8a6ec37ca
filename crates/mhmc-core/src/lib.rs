#![deny(missing_docs)]

//! Core contracts and data types shared by the mhmc sampler crates.
//!
//! The sampler consumes three collaborators that live here: a
//! [`HilbertSpace`] describing admissible configurations, a [`Machine`]
//! scoring configurations, and splittable [`RngKey`] streams.

pub mod batch;
mod dtype;
pub mod errors;
pub mod hilbert;
pub mod machine;
pub mod rng;

pub use batch::Batch;
pub use dtype::Dtype;
pub use errors::{ErrorInfo, SamplerError};
pub use hilbert::{DiscreteHilbert, HilbertSpace};
pub use machine::{log_prob, Bound, LogPsi, Machine, MachineError};
pub use num_complex::Complex64;
pub use rng::{derive_substream_seed, RngHandle, RngKey};
