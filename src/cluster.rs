//! Per-level cluster analysis of a dataflow mapping
//!
//! [`ClusterAnalysis`] is the core of the crate: for one hierarchical cluster
//! level it consumes the normalized directive sequence, the dimension
//! registry, and the cluster width, and derives in closed form the quantities
//! every downstream cost estimator needs:
//!
//! - spatial iteration count and steady-vs-edge cluster occupancy,
//! - per-dimension mapped / unique / reused element counts,
//! - the partial-output count of multi-pass reductions,
//! - the total iteration count across all directives (on demand).
//!
//! # Design Invariants
//!
//! 1. All derived quantities except the total iteration count are computed at
//!    construction time (eager evaluation); the analyzer is never mutated
//!    afterwards and every accessor is a pure read.
//! 2. The preprocessing stages have a strict ordering dependency: index
//!    discovery runs before spatial/edge analysis, which runs before
//!    mapping-size bookkeeping (it consults the inner-temporal index).
//!    Construction is atomic from the caller's perspective.
//! 3. Invalid mappings surface as [`ConfigurationError`] from construction,
//!    never as a process abort, so a search loop over thousands of candidate
//!    mappings can discard one bad candidate and continue.
//!
//! Independent analyzers share no mutable state; a caller may evaluate
//! different mappings, or different levels of one mapping, in parallel.

use log::{debug, warn};
use std::collections::HashMap;

use crate::dimension::DimensionTable;
use crate::directive::{DirectiveClass, DirectiveTable};
use crate::error::ConfigurationError;
use crate::noc::NetworkOnChipModel;
use crate::tensor::TensorTable;

// ============================================================================
// Per-dimension reuse record
// ============================================================================

/// Element bookkeeping for one mapped dimension
///
/// Quantifies, for the traffic and energy models, how many elements of the
/// dimension are newly fetched versus reused across spatial and temporal
/// iteration. `mapped = unique + reused` holds on both axes; `reused` goes
/// negative when the stride exceeds the tile size (elements skipped between
/// steps rather than reused).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimReuse {
    /// Elements held per mapping step (the tile size)
    pub mapped: i64,
    /// Elements newly delivered per spatial step
    pub spatial_unique: i64,
    /// Elements newly delivered per temporal step
    pub temporal_unique: i64,
    /// Elements shared with the neighboring cluster's tile
    pub spatial_reused: i64,
    /// Elements retained from the previous temporal step
    pub temporal_reused: i64,
}

// ============================================================================
// Spatial edge occupancy
// ============================================================================

/// Result of the spatial sweep analysis over the upper spatial dimension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpatialEdge {
    /// Full sweeps in which every cluster receives a complete tile
    steady_iterations: u64,
    /// Whether a final, partially occupied sweep exists (0 or 1)
    edge_iterations: u64,
    /// Clusters active during the final sweep
    edge_clusters: u64,
}

// ============================================================================
// Cluster analysis
// ============================================================================

/// Closed-form analysis of one cluster level of a dataflow mapping
///
/// Constructed once per (level, width, dataflow, dimensions) combination.
/// Holds non-owning references to the tables, which are owned by the
/// evaluation context that outlives all per-level analyzers of one mapping
/// evaluation. The directive sequence must already be input-centric (see
/// [`DirectiveTable::convert_to_input_centric`]).
#[derive(Debug, Clone)]
pub struct ClusterAnalysis<'a> {
    cluster_level: usize,
    cluster_size: u64,

    dataflow: &'a DirectiveTable,
    dimensions: &'a DimensionTable,
    tensors: &'a TensorTable,
    noc: &'a NetworkOnChipModel,

    /// Index of the first spatial directive
    upper_spatial_idx: usize,
    /// Index of the second spatial directive, if present
    lower_spatial_idx: Option<usize>,
    /// Index of the inner-most non-unrolled temporal directive at or below
    /// the upper spatial directive; equals `upper_spatial_idx` when none
    /// exists
    inner_temporal_idx: usize,

    num_spatial_iterations: u64,
    num_steady_spatial_iterations: u64,
    num_edge_spatial_iterations: u64,
    num_spatial_edge_clusters: u64,

    num_partial_outputs: u64,

    reuse: HashMap<String, DimReuse>,
}

impl<'a> ClusterAnalysis<'a> {
    /// Analyze one cluster level of a mapping.
    ///
    /// Runs the full preprocessing pipeline eagerly: directive validation,
    /// index discovery, spatial iteration and edge-cluster analysis,
    /// mapping-size bookkeeping, and partial-output counting.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError::MalformedDirective`] for a zero tile size,
    ///   zero stride, or a variable missing from the registry
    /// - [`ConfigurationError::NoSpatialMap`] when no directive is spatial
    /// - [`ConfigurationError::MultiParallelismInSingleCluster`] when more
    ///   than two directives are spatial
    ///
    /// # Panics
    ///
    /// Panics if `cluster_size` is zero; a cluster level always has at least
    /// one processing element.
    pub fn new(
        cluster_level: usize,
        cluster_size: u64,
        dataflow: &'a DirectiveTable,
        dimensions: &'a DimensionTable,
        tensors: &'a TensorTable,
        noc: &'a NetworkOnChipModel,
    ) -> Result<Self, ConfigurationError> {
        assert!(cluster_size >= 1, "cluster width must be at least 1");

        for directive in dataflow {
            let registered = dimensions.size(&directive.variable).is_some();
            if directive.tile_size == 0 || directive.stride == 0 || !registered {
                return Err(ConfigurationError::MalformedDirective {
                    variable: directive.variable.clone(),
                });
            }
        }

        let (upper_spatial_idx, lower_spatial_idx) =
            discover_spatial_indices(cluster_level, dataflow)?;
        let inner_temporal_idx =
            discover_inner_temporal_idx(upper_spatial_idx, dataflow, dimensions);

        let upper = &dataflow.as_slice()[upper_spatial_idx];
        // Validated above: the spatial variable is registered.
        let sp_dim_size = dimensions.size(&upper.variable).unwrap_or(0);

        let num_spatial_iterations =
            ceil_div(sp_dim_size, upper.stride * cluster_size);
        let edge = analyze_spatial_edges(
            sp_dim_size,
            upper.tile_size,
            upper.stride,
            cluster_size,
        );

        let reuse = build_reuse_map(dataflow, inner_temporal_idx);
        let num_partial_outputs = count_partial_outputs(cluster_level, dimensions);

        debug!(
            "cluster level {}: width {}, spatial idx {} (lower {:?}), inner temporal idx {}, \
             spatial iters {}, steady {}, edge iters {}, edge clusters {}, partial outputs {}",
            cluster_level,
            cluster_size,
            upper_spatial_idx,
            lower_spatial_idx,
            inner_temporal_idx,
            num_spatial_iterations,
            edge.steady_iterations,
            edge.edge_iterations,
            edge.edge_clusters,
            num_partial_outputs,
        );

        Ok(ClusterAnalysis {
            cluster_level,
            cluster_size,
            dataflow,
            dimensions,
            tensors,
            noc,
            upper_spatial_idx,
            lower_spatial_idx,
            inner_temporal_idx,
            num_spatial_iterations,
            num_steady_spatial_iterations: edge.steady_iterations,
            num_edge_spatial_iterations: edge.edge_iterations,
            num_spatial_edge_clusters: edge.edge_clusters,
            num_partial_outputs,
            reuse,
        })
    }

    pub fn cluster_level(&self) -> usize {
        self.cluster_level
    }

    /// Cluster count: the full width, or the edge-sweep occupancy.
    pub fn num_clusters(&self, edge: bool) -> u64 {
        if edge {
            self.num_spatial_edge_clusters
        } else {
            self.cluster_size
        }
    }

    /// Total iteration count across all directives at this level.
    ///
    /// Recomputed on each call; repeated calls return identical values. For a
    /// dimension overlapped by a fully resident sliding window (the partner's
    /// mapped tile equals its full size) the effective extent shrinks to the
    /// number of valid window positions before the per-directive count is
    /// taken.
    pub fn num_total_iterations(&self) -> Result<u64, ConfigurationError> {
        let mut total: u64 = 1;

        for directive in self.dataflow {
            let mut dim_size = self
                .dimensions
                .size(&directive.variable)
                .ok_or_else(|| ConfigurationError::MalformedDirective {
                    variable: directive.variable.clone(),
                })?;

            if self.dimensions.is_overlapped(&directive.variable)
                && !self.dimensions.is_sliding(&directive.variable)
            {
                if let Some(adjusted) = self.fully_resident_window_extent(
                    &directive.variable,
                    dim_size,
                ) {
                    dim_size = adjusted;
                }
            }

            let iterations = match directive.class {
                DirectiveClass::Temporal => ceil_div(dim_size, directive.stride),
                DirectiveClass::Spatial => {
                    let step = directive
                        .stride
                        .checked_mul(self.cluster_size)
                        .ok_or(ConfigurationError::IterationOverflow {
                            cluster_level: self.cluster_level,
                        })?;
                    ceil_div(dim_size, step)
                }
            };

            total = total.checked_mul(iterations).ok_or(
                ConfigurationError::IterationOverflow {
                    cluster_level: self.cluster_level,
                },
            )?;
        }

        Ok(total)
    }

    /// Valid window positions along an overlapped dimension, provided its
    /// sliding partner is mapped with its full extent resident.
    fn fully_resident_window_extent(&self, variable: &str, dim_size: u64) -> Option<u64> {
        let partner = self.dimensions.overlapping_dim(variable)?;
        let partner_size = self.dimensions.size(partner)?;
        let partner_directive = self.dataflow.find_by_variable(partner)?;

        if partner_directive.tile_size == partner_size && dim_size >= partner_size {
            Some(dim_size - partner_size + 1)
        } else {
            None
        }
    }

    pub fn num_spatial_iterations(&self) -> u64 {
        self.num_spatial_iterations
    }

    pub fn num_steady_spatial_iterations(&self) -> u64 {
        self.num_steady_spatial_iterations
    }

    /// 1 when a final, partially occupied sweep exists, else 0
    pub fn num_edge_spatial_iterations(&self) -> u64 {
        self.num_edge_spatial_iterations
    }

    /// Clusters active during the final sweep; always in `[1, cluster width]`
    pub fn num_spatial_edge_clusters(&self) -> u64 {
        self.num_spatial_edge_clusters
    }

    pub fn upper_spatial_idx(&self) -> usize {
        self.upper_spatial_idx
    }

    pub fn lower_spatial_idx(&self) -> Option<usize> {
        self.lower_spatial_idx
    }

    pub fn inner_temporal_idx(&self) -> usize {
        self.inner_temporal_idx
    }

    /// Partial outputs requiring accumulation across iterations before being
    /// final; drives accumulation-buffer pressure estimates.
    pub fn num_partial_outputs(&self) -> u64 {
        self.num_partial_outputs
    }

    /// Reuse record for one mapped dimension
    pub fn reuse(&self, variable: &str) -> Option<&DimReuse> {
        self.reuse.get(variable)
    }

    /// All per-dimension reuse records, keyed by dimension name
    pub fn reuse_map(&self) -> &HashMap<String, DimReuse> {
        &self.reuse
    }

    pub fn dimensions(&self) -> &'a DimensionTable {
        self.dimensions
    }

    pub fn dataflow(&self) -> &'a DirectiveTable {
        self.dataflow
    }

    pub fn tensors(&self) -> &'a TensorTable {
        self.tensors
    }

    pub fn noc_model(&self) -> &'a NetworkOnChipModel {
        self.noc
    }
}

// ============================================================================
// Preprocessing stages
// ============================================================================

fn ceil_div(numerator: u64, denominator: u64) -> u64 {
    numerator / denominator + u64::from(numerator % denominator != 0)
}

/// Locate the upper (first) and lower (second) spatial directives.
fn discover_spatial_indices(
    cluster_level: usize,
    dataflow: &DirectiveTable,
) -> Result<(usize, Option<usize>), ConfigurationError> {
    let mut upper = None;
    let mut lower = None;

    for (idx, directive) in dataflow.iter().enumerate() {
        if directive.class != DirectiveClass::Spatial {
            continue;
        }
        match (upper, lower) {
            (None, _) => upper = Some(idx),
            (Some(_), None) => lower = Some(idx),
            (Some(_), Some(_)) => {
                return Err(ConfigurationError::MultiParallelismInSingleCluster {
                    cluster_level,
                })
            }
        }
    }

    match upper {
        Some(idx) => Ok((idx, lower)),
        None => Err(ConfigurationError::NoSpatialMap { cluster_level }),
    }
}

/// Index of the inner-most temporal directive, at or below the upper spatial
/// directive, that still iterates at this level.
///
/// A temporal directive whose tile covers its dimension's full extent is
/// unrolled: it contributes no iteration here and is excluded. When every
/// temporal directive below the spatial one is unrolled (or none exists), the
/// spatial index itself is returned.
fn discover_inner_temporal_idx(
    upper_spatial_idx: usize,
    dataflow: &DirectiveTable,
    dimensions: &DimensionTable,
) -> usize {
    let mut inner = upper_spatial_idx;

    for (idx, directive) in dataflow.iter().enumerate().skip(upper_spatial_idx) {
        if directive.class != DirectiveClass::Temporal {
            continue;
        }
        let unrolled = match dimensions.size(&directive.variable) {
            Some(size) => directive.tile_size >= size,
            None => true,
        };
        if !unrolled {
            inner = idx;
        }
    }

    inner
}

/// Steady/edge occupancy of the spatial sweep over a dimension of size `s`,
/// tiled `t` wide, advancing `o` per cluster, across `c` clusters.
fn analyze_spatial_edges(s: u64, t: u64, o: u64, c: u64) -> SpatialEdge {
    // One sweep advances o*c; including tile overlap it covers o*(c-1) + t.
    let full_coverage = o * (c - 1) + t;

    let (steady_iterations, edge_iterations, edge_clusters) = if s > full_coverage {
        // s - t > o*(c-1) here, so at least one full sweep fits.
        let full_sweeps = ((s - t) / o + 1) / c;
        let steady = full_sweeps - 1;

        let edge = u64::from((steady + 1) * o * c + full_coverage > s);

        // A stride wider than the tile can leave the tail short of one tile.
        let remaining = s.saturating_sub((steady + 1) * o * c);
        let clusters = if remaining < t {
            1
        } else {
            (remaining - t) / o + 1
        };
        (steady, edge, clusters)
    } else {
        let clusters = if s > t {
            let mut clusters = (s - t) / o + 1;
            if o * (clusters - 1) + t < s {
                clusters += 1;
            }
            clusters
        } else {
            1
        };
        (0, 1, clusters)
    };

    SpatialEdge {
        steady_iterations,
        edge_iterations,
        // A tile covering the whole dimension occupies a single cluster.
        edge_clusters: if s <= t { 1 } else { edge_clusters },
    }
}

/// Build the per-dimension mapped/unique/reused table.
///
/// Spatial directives deliver `stride` fresh elements per spatial step and
/// their whole tile per temporal step. Temporal directives deliver nothing
/// spatially; temporally they deliver `stride` fresh elements at the
/// inner-most non-unrolled position and their whole tile elsewhere.
fn build_reuse_map(
    dataflow: &DirectiveTable,
    inner_temporal_idx: usize,
) -> HashMap<String, DimReuse> {
    let mut reuse = HashMap::with_capacity(dataflow.len());

    for (idx, directive) in dataflow.iter().enumerate() {
        let mapped = directive.tile_size as i64;
        let (spatial_unique, temporal_unique) = match directive.class {
            DirectiveClass::Spatial => (directive.stride as i64, mapped),
            DirectiveClass::Temporal => {
                let temporal = if idx == inner_temporal_idx {
                    directive.stride as i64
                } else {
                    mapped
                };
                (0, temporal)
            }
        };

        reuse.insert(
            directive.variable.clone(),
            DimReuse {
                mapped,
                spatial_unique,
                temporal_unique,
                spatial_reused: mapped - spatial_unique,
                temporal_reused: mapped - temporal_unique,
            },
        );
    }

    reuse
}

/// Product of output-position counts across all non-output dimensions.
///
/// An overlapped, non-sliding dimension contributes its valid window-position
/// count `size - partner + 1` when positive, its raw size otherwise; sliding
/// and plain dimensions contribute their raw size.
fn count_partial_outputs(cluster_level: usize, dimensions: &DimensionTable) -> u64 {
    let mut pouts: u64 = 1;

    for dim in dimensions.iter() {
        if dimensions.is_output(&dim.name) {
            continue;
        }

        let contribution = if dimensions.is_overlapped(&dim.name)
            && !dimensions.is_sliding(&dim.name)
        {
            let partner_size = dimensions
                .overlapping_dim(&dim.name)
                .and_then(|partner| dimensions.size(partner));
            match partner_size {
                Some(partner) if dim.size >= partner => dim.size - partner + 1,
                _ => dim.size,
            }
        } else {
            dim.size
        };

        let (product, saturated) = pouts.overflowing_mul(contribution);
        if saturated {
            warn!(
                "partial-output count saturated at cluster level {}",
                cluster_level
            );
            return u64::MAX;
        }
        pouts = product;
    }

    pouts
}

// ============================================================================
// Tests
// ============================================================================
