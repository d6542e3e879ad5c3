//! # nodenet-rs: Spreading-Activation Node Nets
//!
//! A directed, weighted graph of typed nodes that propagates activation in
//! discrete, double-buffered ticks.
//!
//! ## Design Principles
//!
//! 1. **Closed node kinds**: `Register`, `Concept`, `Pipe`, `Activator`,
//!    `Sensor` and `Actor` form one enum; the scheduler dispatches on it
//! 2. **Clean DTOs**: `Node`, `Link`, `Gate`, `Value` cross all boundaries
//! 3. **Order-free ticks**: every node reads only the previous tick
//! 4. **World I/O outside the lock**: adapters run before and after a tick
//!
//! ## Quick Start
//!
//! ```rust
//! use nodenet_rs::{Channel, NetApi, NodeKind};
//!
//! # fn main() -> nodenet_rs::Result<()> {
//! let net = NetApi::new();
//! let source = net.create_node(NodeKind::Register, "Root", "Source")?;
//! let sink = net.create_node(NodeKind::Register, "Root", "Sink")?;
//! net.link(source, Channel::Gen, source, Channel::Gen, 1.0)?;
//! net.link(source, Channel::Gen, sink, Channel::Gen, 0.5)?;
//! net.set_activation(source, 1.0)?;
//!
//! net.step();
//! assert_eq!(net.get_gate(sink, Channel::Gen)?, 0.5);
//! # Ok(())
//! # }
//! ```
//!
//! ## Channels
//!
//! | Pair | Meaning |
//! |------|---------|
//! | `gen` | Generic activation |
//! | `sub` / `sur` | Part-of request / report (classification) |
//! | `por` / `ret` | Successor / predecessor (scripts) |
//! | `cat` / `exp` | Category / exemplar (feature binding) |

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod model;
pub mod net;
pub mod netapi;
pub mod world;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Channel, Gate, GateParameterUpdate, GateParameters, Link, LinkId, LinkPair,
    Node, NodeId, NodeKind, ParameterMap, Slot, Value,
};

// ============================================================================
// Re-exports: Engine
// ============================================================================

pub use config::{ChannelDefault, NetConfig};
pub use net::{ChannelStates, Nodenet, SiblingSetId, StepReport};
pub use netapi::NetApi;

// ============================================================================
// Re-exports: World boundary
// ============================================================================

pub use world::{MemoryWorld, WorldAdapter, WorldRunner};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("{kind} node {node} has no {channel} slot")]
    UnknownSlot { node: NodeId, kind: &'static str, channel: Channel },

    #[error("{kind} node {node} has no {channel} gate")]
    UnknownGate { node: NodeId, kind: &'static str, channel: Channel },

    #[error("Invalid gate parameters: {0}")]
    InvalidGateParameters(String),

    #[error("Invalid {kind} parameter '{key}': {reason}")]
    InvalidNodeParameter { kind: &'static str, key: String, reason: String },

    #[error("Unknown channel: {0}")]
    InvalidChannel(String),

    #[error("Unknown link pair: {0}")]
    InvalidLinkPair(String),

    #[error("Unknown node kind: {0}")]
    InvalidNodeKind(String),

    #[error("Activation must be finite and within the gate range, got {0}")]
    InvalidActivation(f64),

    #[error("Link weight must be finite, got {0}")]
    InvalidWeight(f64),

    #[error("Sibling set must contain at least one node")]
    EmptySiblingSet,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("World adapter error: {0}")]
    World(String),
}

pub type Result<T> = std::result::Result<T, Error>;
