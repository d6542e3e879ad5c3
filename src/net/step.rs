//! Tick scheduler.
//!
//! One tick is two passes over a frozen snapshot of the previous tick:
//!
//! 1. accumulate every slot from the current gate activations into a fresh
//!    buffer;
//! 2. compute every gate from that buffer and its own previous activation
//!    into a second buffer.
//!
//! Only then are both buffers published. No node ever reads a value written
//! during the same tick, so evaluation order cannot change the result.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use smallvec::SmallVec;
use tracing::trace;

use crate::config::ChannelDefault;
use crate::model::{Channel, LinkId, NodeId, NodeKind};

use super::transfer::{self, PreActivations, SlotInputs};
use super::{Nodenet, SiblingSetId};

/// Enable flag per channel for one tick. `gen` is always enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelStates {
    enabled: [bool; 7],
}

impl ChannelStates {
    /// Every directional channel set according to `policy`.
    pub fn uniform(policy: ChannelDefault) -> Self {
        let open = policy == ChannelDefault::Open;
        let mut enabled = [open; 7];
        enabled[Channel::Gen.index()] = true;
        Self { enabled }
    }

    pub fn all_open() -> Self {
        Self::uniform(ChannelDefault::Open)
    }

    pub fn is_enabled(&self, channel: Channel) -> bool {
        self.enabled[channel.index()]
    }

    pub fn set(&mut self, channel: Channel, enabled: bool) {
        if channel.is_directional() {
            self.enabled[channel.index()] = enabled;
        }
    }

    /// Enabled directional channels, in channel order.
    pub fn enabled_channels(&self) -> Vec<Channel> {
        Channel::DIRECTIONAL
            .into_iter()
            .filter(|c| self.is_enabled(*c))
            .collect()
    }
}

impl Default for ChannelStates {
    fn default() -> Self {
        Self::all_open()
    }
}

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Step counter after the tick.
    pub step: u64,
    /// Gates whose activation differs from the previous tick.
    pub changed_gates: usize,
}

impl StepReport {
    pub fn is_stable(&self) -> bool {
        self.changed_gates == 0
    }
}

/// Per-set running sum and the distinct members that contributed.
type SiblingGroups = BTreeMap<SiblingSetId, (f64, SmallVec<[NodeId; 4]>)>;

impl Nodenet {
    /// Run one tick.
    pub fn step(&mut self) -> StepReport {
        self.channels = self.compute_channel_states();

        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort();

        // Pass 1: slots.
        let inputs: HashMap<NodeId, SlotInputs> = ids
            .iter()
            .filter_map(|id| self.nodes.get(id).map(|n| (*id, self.accumulate(n.id, &n.kind))))
            .collect();

        // Pass 2: gates.
        let mut outputs: HashMap<NodeId, PreActivations> = HashMap::with_capacity(ids.len());
        for id in &ids {
            let (Some(node), Some(inp)) = (self.nodes.get(id), inputs.get(id)) else { continue };
            let pre = transfer::pre_activations(&node.kind, inp, &self.channels);
            let mut next = [0.0; 7];
            for gate in node.gates() {
                next[gate.channel.index()] = gate.transfer(pre[gate.channel.index()]);
            }
            outputs.insert(*id, next);
        }

        // Publish.
        let mut changed_gates = 0;
        for id in &ids {
            let (Some(node), Some(inp), Some(next)) =
                (self.nodes.get_mut(id), inputs.get(id), outputs.get(id))
            else {
                continue;
            };
            for channel in node.kind.slot_channels() {
                if let Some(slot) = node.slot_mut(*channel) {
                    slot.activation = inp.get(*channel);
                }
            }
            for channel in node.kind.gate_channels() {
                if let Some(gate) = node.gate_mut(*channel) {
                    let value = next[channel.index()];
                    if gate.activation != value {
                        changed_gates += 1;
                    }
                    gate.activation = value;
                }
            }
        }

        self.current_step += 1;
        trace!(
            step = self.current_step,
            changed_gates,
            channels = ?self.channels.enabled_channels(),
            "tick"
        );
        StepReport { step: self.current_step, changed_gates }
    }

    /// Enable flags from the previous tick's Activator `gen` values.
    fn compute_channel_states(&self) -> ChannelStates {
        let mut bound = [false; 7];
        let mut active = [false; 7];
        for node in self.nodes() {
            if let NodeKind::Activator { channel } = node.kind {
                bound[channel.index()] = true;
                if node.activation() > 0.0 {
                    active[channel.index()] = true;
                }
            }
        }

        let mut states = ChannelStates::uniform(self.config.unbound_channels);
        for channel in Channel::DIRECTIONAL {
            if bound[channel.index()] {
                states.set(channel, active[channel.index()]);
            }
        }
        states
    }

    /// Pass 1 for one node: weighted sums over inbound links in insertion
    /// order, plus the external value for Sensors.
    fn accumulate(&self, id: NodeId, kind: &NodeKind) -> SlotInputs {
        let mut inputs = SlotInputs::default();
        for channel in kind.slot_channels() {
            let links = self.inbound(id, *channel);
            let averaged = *channel == Channel::Sur
                && matches!(kind, NodeKind::Pipe)
                && self.channels.is_enabled(Channel::Sur);

            let mut value = if averaged {
                self.averaged_sum(links)
            } else {
                links.iter().map(|l| self.contribution(*l)).sum()
            };

            if let (Channel::Gen, NodeKind::Sensor { datasource }) = (channel, kind) {
                value += self.sensor_value(datasource);
            }
            inputs.set(*channel, value, !links.is_empty());
        }
        inputs
    }

    fn contribution(&self, link: LinkId) -> f64 {
        let Some(link) = self.links.get(&link) else { return 0.0 };
        let source = self
            .nodes
            .get(&link.source)
            .and_then(|n| n.gate(link.source_gate))
            .map(|g| g.activation)
            .unwrap_or(0.0);
        link.weight * source
    }

    /// Sum for a Pipe `sur` slot: reports from sibling-set members are
    /// averaged per set, everything else adds as-is.
    fn averaged_sum(&self, links: &[LinkId]) -> f64 {
        let mut plain = 0.0;
        let mut groups = SiblingGroups::new();
        for id in links {
            let Some(link) = self.links.get(id) else { continue };
            let set = self.sibling_of.get(&link.source).copied();
            match set {
                Some(set) if link.source_gate == Channel::Sur => {
                    let (sum, members) = groups.entry(set).or_default();
                    *sum += self.contribution(*id);
                    if !members.contains(&link.source) {
                        members.push(link.source);
                    }
                }
                _ => plain += self.contribution(*id),
            }
        }
        groups
            .values()
            .fold(plain, |acc, (sum, members)| acc + sum / members.len() as f64)
    }
}
