//! mapscope: per-level cluster analysis for dataflow cost modeling
//!
//! This library is the analytical core of a cost-modeling pipeline for
//! spatial/temporal dataflow mappings of tensor computations onto accelerator
//! hardware. Given a declarative mapping (an ordered sequence of directives
//! splitting loop dimensions across time-multiplexed and spatially-parallel
//! processing-element clusters) and a target cluster width, it derives in
//! closed form the quantities downstream latency, energy, buffer and NoC
//! estimators consume.
//!
//! # Core Pipeline Flow
//! ```text
//! Mapping description → DirectiveTable → input-centric normalization
//!                                              ↓
//!                  ClusterAnalysis (one per cluster level)
//!                       ↓                        ↓
//!        iteration / edge-cluster counts   per-dimension reuse
//!                       ↓                        ↓
//!              downstream cost estimators (latency, energy, NoC)
//! ```
//!
//! The analysis itself is purely computational: no I/O, no simulation, no
//! search. One [`ClusterAnalysis`] is built per hierarchical cluster level;
//! all of them borrow the same dimension registry, directive table, tensor
//! table and NoC handle from the evaluation context that owns them. Invalid
//! mappings are reported as [`ConfigurationError`] values so a design-space
//! sweep can skip a bad candidate and keep going.
//!
//! # Module Organization
//!
//! ## Data Model
//! - [`dimension`]: loop dimensions, overlap links, output aliases
//! - [`directive`]: mapping directives and the ordered sequence
//! - [`tensor`]: operand tensors (pass-through to traffic estimators)
//! - [`noc`]: network-on-chip handle (pass-through to the NoC estimator)
//!
//! ## Analysis
//! - [`cluster`]: the per-level analysis engine and reuse records
//! - [`error`]: the configuration-error taxonomy

// ============================================================================
// Data Model
// ============================================================================

pub mod dimension;
pub mod directive;
pub mod noc;
pub mod tensor;

// ============================================================================
// Analysis
// ============================================================================

pub mod cluster;
pub mod error;

pub use cluster::{ClusterAnalysis, DimReuse};
pub use dimension::{Dimension, DimensionTable};
pub use directive::{Directive, DirectiveClass, DirectiveTable};
pub use error::ConfigurationError;
pub use noc::NetworkOnChipModel;
pub use tensor::{Tensor, TensorKind, TensorTable};
