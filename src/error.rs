use thiserror::Error;

/// Errors that can occur while validating a mapping for one cluster level
///
/// Every variant is a permanent defect in the input mapping configuration:
/// there is no I/O and no transient failure mode, so retrying never helps.
/// Callers running a design-space sweep are expected to skip the offending
/// candidate and continue with the next one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The directive sequence maps no dimension spatially at this level
    #[error("no spatial directive at cluster level {cluster_level}")]
    NoSpatialMap {
        /// Cluster level whose directive sequence was analyzed
        cluster_level: usize,
    },

    /// More than two spatial directives folded into a single cluster level
    ///
    /// Only one level of spatial parallelism per cluster is supported; the
    /// first two spatial directives are distinguished as upper/lower, a third
    /// is rejected.
    #[error("more than two spatial directives at cluster level {cluster_level}")]
    MultiParallelismInSingleCluster {
        /// Cluster level whose directive sequence was analyzed
        cluster_level: usize,
    },

    /// A directive carries a zero tile size, a zero stride, or maps a
    /// dimension absent from the registry
    ///
    /// Caught before any analysis arithmetic so the closed-form formulas never
    /// divide by zero or operate on an unknown extent.
    #[error("malformed directive over dimension '{variable}'")]
    MalformedDirective {
        /// Dimension the malformed directive maps
        variable: String,
    },

    /// The total-iteration product exceeds the representable range
    ///
    /// Design-space sweeps enumerate very large dimension sizes; the product
    /// over all directives is checked rather than silently wrapped.
    #[error("total iteration count overflows u64 at cluster level {cluster_level}")]
    IterationOverflow {
        /// Cluster level whose iteration product overflowed
        cluster_level: usize,
    },
}
