//! A node's per-tick input accumulator.

use serde::{Deserialize, Serialize};

use super::Channel;

/// A node's named input. `activation` holds the weighted sum accumulated
/// during the most recent tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub channel: Channel,
    pub activation: f64,
}

impl Slot {
    pub fn new(channel: Channel) -> Self {
        Self { channel, activation: 0.0 }
    }
}
