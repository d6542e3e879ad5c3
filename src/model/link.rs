//! Link (edge) from one node's gate to another node's slot.

use serde::{Deserialize, Serialize};

use super::{Channel, NodeId};

/// Opaque link identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LinkId(pub u64);

impl std::fmt::Display for LinkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A weighted, directed edge: `source.gate -> target.slot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub source: NodeId,
    pub source_gate: Channel,
    pub target: NodeId,
    pub target_slot: Channel,
    pub weight: f64,
}

impl Link {
    pub fn new(
        id: LinkId,
        source: NodeId,
        source_gate: Channel,
        target: NodeId,
        target_slot: Channel,
        weight: f64,
    ) -> Self {
        Self { id, source, source_gate, target, target_slot, weight }
    }

    /// Whether this link connects the same gate to the same slot as the
    /// given endpoints.
    pub fn connects(&self, source: NodeId, gate: Channel, target: NodeId, slot: Channel) -> bool {
        self.source == source
            && self.source_gate == gate
            && self.target == target
            && self.target_slot == slot
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}
