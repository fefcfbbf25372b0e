//! Tensor table handed through to downstream cost estimators
//!
//! The cluster analysis itself never inspects tensors; the table rides along
//! so traffic and buffer estimators can resolve which dimensions compose each
//! operand without re-threading it through every call site.

use serde::{Deserialize, Serialize};

/// Role of a tensor in the mapped computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TensorKind {
    Input,
    Weight,
    Output,
}

/// One operand tensor: name, role, and the dimensions that compose it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tensor {
    pub name: String,
    pub kind: TensorKind,
    /// Names of the registry dimensions spanning this tensor
    pub dimensions: Vec<String>,
}

impl Tensor {
    pub fn new(name: impl Into<String>, kind: TensorKind, dimensions: Vec<String>) -> Self {
        Tensor {
            name: name.into(),
            kind,
            dimensions,
        }
    }
}

/// All operand tensors of the mapped computation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TensorTable {
    tensors: Vec<Tensor>,
}

impl TensorTable {
    pub fn new() -> Self {
        TensorTable::default()
    }

    pub fn push(&mut self, tensor: Tensor) {
        self.tensors.push(tensor);
    }

    pub fn find(&self, name: &str) -> Option<&Tensor> {
        self.tensors.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tensor> {
        self.tensors.iter()
    }

    pub fn len(&self) -> usize {
        self.tensors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tensors.is_empty()
    }
}
