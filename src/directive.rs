//! Mapping directives and the ordered directive sequence
//!
//! A mapping is an ordered (outer to inner) list of [`Directive`]s, one per
//! mapped dimension. A directive either distributes its dimension across
//! parallel clusters ([`DirectiveClass::Spatial`]) or iterates it over time
//! within one cluster ([`DirectiveClass::Temporal`]). Tile size is the number
//! of elements held per mapping step; stride is the number of elements the
//! tile advances by between steps.
//!
//! Sequences written against output dimensions must be normalized with
//! [`DirectiveTable::convert_to_input_centric`] before analysis: the analyzer
//! reasons entirely in the input iteration space, where sliding-window overlap
//! is visible.

use crate::dimension::DimensionTable;
use serde::{Deserialize, Serialize};

/// How a directive maps its dimension onto the cluster array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectiveClass {
    /// Distribute the dimension across parallel processing-element clusters
    Spatial,
    /// Iterate the dimension over time within one cluster
    Temporal,
}

/// One mapping directive over a single dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directive {
    /// Dimension this directive maps
    pub variable: String,
    pub class: DirectiveClass,
    /// Elements of the dimension held per mapping step
    pub tile_size: u64,
    /// Elements the tile advances by between consecutive steps
    pub stride: u64,
}

impl Directive {
    pub fn spatial(variable: impl Into<String>, tile_size: u64, stride: u64) -> Self {
        Directive {
            variable: variable.into(),
            class: DirectiveClass::Spatial,
            tile_size,
            stride,
        }
    }

    pub fn temporal(variable: impl Into<String>, tile_size: u64, stride: u64) -> Self {
        Directive {
            variable: variable.into(),
            class: DirectiveClass::Temporal,
            tile_size,
            stride,
        }
    }
}

/// Ordered (outer to inner) sequence of mapping directives
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectiveTable {
    directives: Vec<Directive>,
}

impl DirectiveTable {
    pub fn new() -> Self {
        DirectiveTable::default()
    }

    pub fn from_directives(directives: Vec<Directive>) -> Self {
        DirectiveTable { directives }
    }

    pub fn push(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    pub fn get(&self, idx: usize) -> Option<&Directive> {
        self.directives.get(idx)
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.directives.iter()
    }

    pub fn as_slice(&self) -> &[Directive] {
        &self.directives
    }

    /// First directive mapping `variable`, if any
    pub fn find_by_variable(&self, variable: &str) -> Option<&Directive> {
        self.directives.iter().find(|d| d.variable == variable)
    }

    /// Rewrite output-dimension directives into the input iteration space.
    ///
    /// A directive over a designated output dimension is moved onto the input
    /// dimension it projects onto; its tile widens to the receptive-field span
    /// `tile + filter_tile - 1`, where `filter_tile` is the mapped tile size
    /// of the input dimension's sliding partner (falling back to the partner's
    /// full size when the partner is not mapped in this sequence). Strides are
    /// unchanged. Directives already over input dimensions pass through, so
    /// applying the transformation twice is a no-op.
    ///
    /// Called exactly once by the owning evaluation context, before any
    /// analyzer is constructed over this table.
    pub fn convert_to_input_centric(&mut self, dims: &DimensionTable) {
        // Filter tile sizes have to be resolved against the pre-rewrite
        // sequence, so collect the rewrites first.
        let mut rewrites: Vec<(usize, String, u64)> = Vec::new();

        for (idx, directive) in self.directives.iter().enumerate() {
            let Some(input_dim) = dims.input_dim_of(&directive.variable) else {
                continue;
            };

            let filter_span = dims
                .overlapping_dim(input_dim)
                .map(|filter| {
                    self.find_by_variable(filter)
                        .map(|d| d.tile_size)
                        .or_else(|| dims.size(filter))
                        .unwrap_or(1)
                })
                .unwrap_or(1);

            let widened = directive.tile_size + filter_span - 1;
            rewrites.push((idx, input_dim.to_string(), widened));
        }

        for (idx, input_dim, widened) in rewrites {
            log::debug!(
                "input-centric rewrite: {} -> {} (tile {} -> {})",
                self.directives[idx].variable,
                input_dim,
                self.directives[idx].tile_size,
                widened
            );
            self.directives[idx].variable = input_dim;
            self.directives[idx].tile_size = widened;
        }
    }
}

impl<'a> IntoIterator for &'a DirectiveTable {
    type Item = &'a Directive;
    type IntoIter = std::slice::Iter<'a, Directive>;

    fn into_iter(self) -> Self::IntoIter {
        self.directives.iter()
    }
}
