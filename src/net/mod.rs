//! # Nodenet
//!
//! The graph arena plus its tick scheduler.
//!
//! Nodes and links live in maps keyed by stable identifiers; links refer to
//! nodes by id only, so cycles and self-loops need no special handling.
//! Two indexes are kept in step with the link map:
//!
//! - `adjacency`: node → every link touching it (deletion)
//! - `inbound`: (node, slot) → links feeding that slot, in insertion order
//!   (accumulation; the fixed order keeps float sums bit-identical)
//!
//! Every mutating method validates fully before it writes, so a failed call
//! leaves the graph unchanged.

pub mod step;
pub mod transfer;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::config::NetConfig;
use crate::model::*;
use crate::{Error, Result};

pub use step::{ChannelStates, StepReport};

/// Identifier of a sibling set declared by `link_full`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SiblingSetId(pub u64);

pub(crate) type InboundLinks = SmallVec<[LinkId; 4]>;

/// A nodenet: nodes, links, sibling sets and tick state.
pub struct Nodenet {
    config: NetConfig,
    nodes: HashMap<NodeId, Node>,
    links: HashMap<LinkId, Link>,
    /// node_id → ids of every link touching the node
    adjacency: HashMap<NodeId, Vec<LinkId>>,
    /// (target, slot) → inbound link ids
    inbound: HashMap<(NodeId, Channel), InboundLinks>,
    sibling_of: HashMap<NodeId, SiblingSetId>,
    sibling_sets: BTreeMap<SiblingSetId, Vec<NodeId>>,
    /// datasource → value injected into matching Sensor `gen` slots
    sensor_values: HashMap<String, f64>,
    channels: ChannelStates,
    current_step: u64,
    next_node_id: u64,
    next_link_id: u64,
    next_set_id: u64,
}

impl Default for Nodenet {
    fn default() -> Self {
        Self::with_validated(NetConfig::default())
    }
}

impl Nodenet {
    /// Build an empty net. The configuration is validated first; its gate
    /// defaults seed every gate created later.
    pub fn new(config: NetConfig) -> Result<Self> {
        config.validate()?;
        debug!(name = %config.name, "nodenet created");
        Ok(Self::with_validated(config))
    }

    fn with_validated(config: NetConfig) -> Self {
        let channels = ChannelStates::uniform(config.unbound_channels);
        Self {
            config,
            nodes: HashMap::new(),
            links: HashMap::new(),
            adjacency: HashMap::new(),
            inbound: HashMap::new(),
            sibling_of: HashMap::new(),
            sibling_sets: BTreeMap::new(),
            sensor_values: HashMap::new(),
            channels,
            current_step: 0,
            next_node_id: 1,
            next_link_id: 1,
            next_set_id: 1,
        }
    }

    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    pub fn current_step(&self) -> u64 {
        self.current_step
    }

    /// Channel enable flags used by the most recent tick.
    pub fn channel_states(&self) -> ChannelStates {
        self.channels
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    pub fn create_node(
        &mut self,
        kind: NodeKind,
        parent: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<NodeId> {
        if let NodeKind::Activator { channel } = &kind {
            if !channel.is_directional() {
                return Err(Error::InvalidNodeParameter {
                    kind: "Activator",
                    key: "type".into(),
                    reason: format!("{channel} is not a directional channel"),
                });
            }
        }
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        let node = Node::new(id, kind, parent, name, self.config.gate_defaults);
        debug!(node = %id, kind = %node.kind, name = %node.name, "node created");
        self.nodes.insert(id, node);
        self.adjacency.insert(id, Vec::new());
        Ok(id)
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes.get(&id).ok_or(Error::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes.get_mut(&id).ok_or(Error::NodeNotFound(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Ids of all nodes with the given name, ascending.
    pub fn nodes_named(&self, name: &str) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .nodes()
            .filter(|n| n.name == name)
            .map(|n| n.id)
            .collect();
        ids.sort();
        ids
    }

    /// Delete a node together with every link touching it.
    pub fn delete_node(&mut self, id: NodeId) -> Result<()> {
        self.node(id)?;
        let touching = self.adjacency.remove(&id).unwrap_or_default();
        for link_id in touching {
            self.detach_link(link_id);
        }
        self.leave_sibling_set(id);
        self.nodes.remove(&id);
        debug!(node = %id, "node deleted");
        Ok(())
    }

    /// Overwrite the `gen` gate activation. The value must be finite and lie
    /// within the gate's `[min, max]`.
    pub fn set_activation(&mut self, id: NodeId, value: f64) -> Result<()> {
        let params = self.gate(id, Channel::Gen)?.parameters;
        if !value.is_finite() || value < params.min || value > params.max {
            return Err(Error::InvalidActivation(value));
        }
        let node = self.node_mut(id)?;
        if let Some(gate) = node.gate_mut(Channel::Gen) {
            gate.activation = value;
        }
        Ok(())
    }

    pub fn set_node_parameter(&mut self, id: NodeId, key: &str, value: &Value) -> Result<()> {
        let node = self.node_mut(id)?;
        let mut kind = node.kind.clone();
        kind.set_parameter(key, value)?;
        node.kind = kind;
        debug!(node = %id, key, %value, "node parameter set");
        Ok(())
    }

    // ========================================================================
    // Gates and slots
    // ========================================================================

    pub fn gate(&self, id: NodeId, channel: Channel) -> Result<&Gate> {
        let node = self.node(id)?;
        node.gate(channel).ok_or_else(|| Error::UnknownGate {
            node: id,
            kind: node.kind.type_name(),
            channel,
        })
    }

    pub fn slot(&self, id: NodeId, channel: Channel) -> Result<&Slot> {
        let node = self.node(id)?;
        node.slot(channel).ok_or_else(|| Error::UnknownSlot {
            node: id,
            kind: node.kind.type_name(),
            channel,
        })
    }

    /// Apply a partial parameter update to one gate. The merged set is
    /// validated before anything is written.
    pub fn set_gate_parameters(
        &mut self,
        id: NodeId,
        channel: Channel,
        update: &GateParameterUpdate,
    ) -> Result<GateParameters> {
        let merged = self.gate(id, channel)?.parameters.merged(update);
        merged.validate()?;
        let node = self.node_mut(id)?;
        if let Some(gate) = node.gate_mut(channel) {
            gate.parameters = merged;
        }
        debug!(node = %id, gate = %channel, ?merged, "gate parameters set");
        Ok(merged)
    }

    // ========================================================================
    // Links
    // ========================================================================

    pub fn get_link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(&id)
    }

    /// All links touching a node, ordered by id.
    pub fn links_of(&self, id: NodeId) -> Result<Vec<&Link>> {
        self.node(id)?;
        let mut links: Vec<&Link> = self
            .adjacency
            .get(&id)
            .map(|ids| ids.iter().filter_map(|l| self.links.get(l)).collect())
            .unwrap_or_default();
        links.sort_by_key(|l| l.id);
        Ok(links)
    }

    /// Links feeding `target.slot`, in accumulation order.
    pub fn inbound(&self, target: NodeId, slot: Channel) -> &[LinkId] {
        self.inbound
            .get(&(target, slot))
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    fn find_link(&self, source: NodeId, gate: Channel, target: NodeId, slot: Channel) -> Option<LinkId> {
        self.inbound(target, slot)
            .iter()
            .copied()
            .find(|id| {
                self.links
                    .get(id)
                    .is_some_and(|l| l.connects(source, gate, target, slot))
            })
    }

    fn check_endpoints(&self, source: NodeId, gate: Channel, target: NodeId, slot: Channel) -> Result<()> {
        self.gate(source, gate)?;
        self.slot(target, slot)?;
        Ok(())
    }

    fn check_weight(weight: f64) -> Result<()> {
        if weight.is_finite() {
            Ok(())
        } else {
            Err(Error::InvalidWeight(weight))
        }
    }

    /// Link `source.gate` to `target.slot`. Linking an already connected
    /// pair replaces that edge's weight and returns its id.
    pub fn link(
        &mut self,
        source: NodeId,
        gate: Channel,
        target: NodeId,
        slot: Channel,
        weight: f64,
    ) -> Result<LinkId> {
        Self::check_weight(weight)?;
        self.check_endpoints(source, gate, target, slot)?;
        Ok(self.insert_link(source, gate, target, slot, weight))
    }

    fn insert_link(&mut self, source: NodeId, gate: Channel, target: NodeId, slot: Channel, weight: f64) -> LinkId {
        if let Some(id) = self.find_link(source, gate, target, slot) {
            self.links.insert(id, Link::new(id, source, gate, target, slot, weight));
            debug!(link = %id, weight, "link reweighted");
            return id;
        }

        let id = LinkId(self.next_link_id);
        self.next_link_id += 1;
        let link = Link::new(id, source, gate, target, slot, weight);
        self.inbound.entry((target, slot)).or_default().push(id);

        self.adjacency.entry(source).or_default().push(id);
        if !link.is_self_loop() {
            self.adjacency.entry(target).or_default().push(id);
        }
        debug!(link = %id, %source, %gate, %target, %slot, weight, "link created");
        self.links.insert(id, link);
        id
    }

    /// Remove the link between `source.gate` and `target.slot`, if any.
    pub fn unlink(&mut self, source: NodeId, gate: Channel, target: NodeId, slot: Channel) -> Result<bool> {
        self.check_endpoints(source, gate, target, slot)?;
        match self.find_link(source, gate, target, slot) {
            Some(id) => {
                self.detach_link(id);
                debug!(link = %id, "link removed");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Drop a link from the link map, the inbound index and both endpoints'
    /// adjacency lists.
    fn detach_link(&mut self, id: LinkId) {
        let Some(link) = self.links.remove(&id) else { return };
        if let Some(ids) = self.inbound.get_mut(&(link.target, link.target_slot)) {
            ids.retain(|l| *l != id);
            if ids.is_empty() {
                self.inbound.remove(&(link.target, link.target_slot));
            }
        }
        for end in [link.source, link.target] {
            if let Some(adj) = self.adjacency.get_mut(&end) {
                adj.retain(|l| *l != id);
            }
        }
    }

    /// Create both directions of a channel pair between `a` and `b`:
    /// `a.forward -> b.forward` and `b.backward -> a.backward`.
    /// Both links are validated before either is written.
    pub fn link_with_reciprocal(
        &mut self,
        a: NodeId,
        b: NodeId,
        pair: LinkPair,
        weight: f64,
    ) -> Result<(LinkId, LinkId)> {
        Self::check_weight(weight)?;
        let (forward, backward) = pair.channels();
        self.check_endpoints(a, forward, b, forward)?;
        self.check_endpoints(b, backward, a, backward)?;

        let there = self.insert_link(a, forward, b, forward, weight);
        let back = self.insert_link(b, backward, a, backward, weight);
        Ok((there, back))
    }

    // ========================================================================
    // Sibling sets
    // ========================================================================

    /// Declare `nodes` a sibling set. Members leave any set they were in.
    ///
    /// No links are created; the set only affects how a Pipe parent averages
    /// the members' `sur` reports.
    pub fn link_full(&mut self, nodes: &[NodeId]) -> Result<SiblingSetId> {
        if nodes.is_empty() {
            return Err(Error::EmptySiblingSet);
        }
        for id in nodes {
            self.node(*id)?;
        }

        let mut members: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for id in nodes {
            if !members.contains(id) {
                members.push(*id);
            }
        }
        for id in &members {
            self.leave_sibling_set(*id);
        }

        let set = SiblingSetId(self.next_set_id);
        self.next_set_id += 1;
        for id in &members {
            self.sibling_of.insert(*id, set);
        }
        debug!(set = set.0, size = members.len(), "sibling set declared");
        self.sibling_sets.insert(set, members);
        Ok(set)
    }

    pub fn sibling_set_of(&self, id: NodeId) -> Option<SiblingSetId> {
        self.sibling_of.get(&id).copied()
    }

    pub fn sibling_members(&self, set: SiblingSetId) -> &[NodeId] {
        self.sibling_sets.get(&set).map(|m| m.as_slice()).unwrap_or(&[])
    }

    fn leave_sibling_set(&mut self, id: NodeId) {
        let Some(set) = self.sibling_of.remove(&id) else { return };
        if let Some(members) = self.sibling_sets.get_mut(&set) {
            members.retain(|m| *m != id);
            if members.is_empty() {
                self.sibling_sets.remove(&set);
            }
        }
    }

    // ========================================================================
    // World boundary
    // ========================================================================

    /// Store an external value for every Sensor reading `datasource`. It is
    /// injected on each following tick until replaced.
    pub fn set_sensor_value(&mut self, datasource: impl Into<String>, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::InvalidActivation(value));
        }
        self.sensor_values.insert(datasource.into(), value);
        Ok(())
    }

    pub fn sensor_value(&self, datasource: &str) -> f64 {
        self.sensor_values.get(datasource).copied().unwrap_or(0.0)
    }

    /// Sum of Actor `gen` activations per datatarget.
    pub fn actuator_values(&self) -> HashMap<String, f64> {
        let mut out: HashMap<String, f64> = HashMap::new();
        let mut actors: Vec<&Node> = self
            .nodes()
            .filter(|n| matches!(n.kind, NodeKind::Actor { .. }))
            .collect();
        actors.sort_by_key(|n| n.id);
        for node in actors {
            if let NodeKind::Actor { datatarget } = &node.kind {
                *out.entry(datatarget.clone()).or_insert(0.0) += node.activation();
            }
        }
        out
    }
}
