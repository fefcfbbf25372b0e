//! Network-on-chip model handle
//!
//! Held by each per-level analyzer and exposed pass-through to the NoC traffic
//! estimator; none of its fields influence the closed-form analysis here.

use serde::{Deserialize, Serialize};

/// Parameters of the interconnect feeding one cluster level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkOnChipModel {
    /// Words deliverable per cycle
    pub bandwidth: u64,
    /// Cycles per hop
    pub hop_latency: u64,
    /// Whether a single send can feed all clusters at once
    pub supports_multicast: bool,
}

impl NetworkOnChipModel {
    pub fn new(bandwidth: u64, hop_latency: u64, supports_multicast: bool) -> Self {
        NetworkOnChipModel {
            bandwidth,
            hop_latency,
            supports_multicast,
        }
    }
}

impl Default for NetworkOnChipModel {
    fn default() -> Self {
        NetworkOnChipModel {
            bandwidth: 1,
            hop_latency: 1,
            supports_multicast: true,
        }
    }
}
