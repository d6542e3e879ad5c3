//! # Nodenet Model
//!
//! The data that crosses every boundary: channels, nodes, slots, gates,
//! links and parameter values.
//!
//! Design rule: this module is pure data plus the per-gate transfer
//! function. No scheduling, no locking, no I/O.

pub mod channel;
pub mod gate;
pub mod link;
pub mod node;
pub mod slot;
pub mod value;

pub use channel::{Channel, LinkPair};
pub use gate::{Gate, GateParameterUpdate, GateParameters};
pub use link::{Link, LinkId};
pub use node::{Node, NodeId, NodeKind};
pub use slot::Slot;
pub use value::{ParameterMap, Value};
