//! Dimension registry for one mapped layer
//!
//! A [`DimensionTable`] holds every loop dimension of the computation being
//! mapped, together with the two relationships the analysis needs:
//!
//! - **overlap links**: a dimension swept by a sliding window (e.g. an input
//!   column) is linked to the sliding dimension that sweeps it (the filter
//!   column). Both sides report as overlapped; only the filter side reports
//!   as sliding.
//! - **output aliases**: output dimensions are projections of input dimensions
//!   and carry no independent iteration; they are skipped by partial-output
//!   counting and rewritten away by input-centric normalization.
//!
//! Registration order is preserved; iteration yields dimensions in the order
//! they were inserted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single loop dimension: identifier plus full extent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    /// Dimension identifier, unique within one table
    pub name: String,
    /// Full extent of the dimension in elements
    pub size: u64,
}

impl Dimension {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Dimension {
            name: name.into(),
            size,
        }
    }
}

/// Per-layer dimension registry with overlap and output-alias relationships
///
/// Populated once by the surrounding evaluation context, then consumed
/// read-only by every per-level analyzer of the mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimensionTable {
    dims: Vec<Dimension>,
    index: HashMap<String, usize>,
    /// Overlapped dimension -> its sliding partner
    overlaps: HashMap<String, String>,
    /// Sliding dimension -> the dimension it slides over
    sliding: HashMap<String, String>,
    /// Output dimension -> the input dimension it projects onto
    outputs: HashMap<String, String>,
}

impl DimensionTable {
    pub fn new() -> Self {
        DimensionTable::default()
    }

    /// Register a dimension. Re-inserting a name updates its size in place.
    pub fn insert(&mut self, dim: Dimension) {
        match self.index.get(&dim.name) {
            Some(&pos) => self.dims[pos] = dim,
            None => {
                self.index.insert(dim.name.clone(), self.dims.len());
                self.dims.push(dim);
            }
        }
    }

    /// Link an overlapped dimension to the sliding dimension that sweeps it.
    ///
    /// Re-linking either side replaces the previous partner, so an overlapped
    /// non-sliding dimension always has exactly one partner.
    pub fn link_overlap(&mut self, overlapped: impl Into<String>, sliding: impl Into<String>) {
        let overlapped = overlapped.into();
        let sliding = sliding.into();
        self.overlaps.insert(overlapped.clone(), sliding.clone());
        self.sliding.insert(sliding, overlapped);
    }

    /// Designate an output dimension and the input dimension it projects onto.
    pub fn alias_output(&mut self, output: impl Into<String>, input: impl Into<String>) {
        self.outputs.insert(output.into(), input.into());
    }

    pub fn size(&self, name: &str) -> Option<u64> {
        self.get(name).map(|d| d.size)
    }

    pub fn get(&self, name: &str) -> Option<&Dimension> {
        self.index.get(name).map(|&pos| &self.dims[pos])
    }

    /// True for both sides of an overlap link
    pub fn is_overlapped(&self, name: &str) -> bool {
        self.overlaps.contains_key(name) || self.sliding.contains_key(name)
    }

    /// True only for the sliding (filter) side of an overlap link
    pub fn is_sliding(&self, name: &str) -> bool {
        self.sliding.contains_key(name)
    }

    /// The partner across the overlap link, from either side
    pub fn overlapping_dim(&self, name: &str) -> Option<&str> {
        self.overlaps
            .get(name)
            .or_else(|| self.sliding.get(name))
            .map(String::as_str)
    }

    pub fn is_output(&self, name: &str) -> bool {
        self.outputs.contains_key(name)
    }

    /// The input dimension a designated output dimension projects onto
    pub fn input_dim_of(&self, output: &str) -> Option<&str> {
        self.outputs.get(output).map(String::as_str)
    }

    /// Dimensions in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Dimension> {
        self.dims.iter()
    }

    pub fn len(&self) -> usize {
        self.dims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dims.is_empty()
    }
}
