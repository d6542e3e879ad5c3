//! # NetApi
//!
//! Thread-safe facade over a [`Nodenet`].
//!
//! The net sits behind one `Arc<RwLock<_>>`. A tick holds the write lock
//! from start to finish, so mutations queue behind it and readers never see
//! a half-published tick. Handles are cheap to clone and share one net.
//!
//! Every operation returns [`crate::Result`]; a failed call leaves the net
//! unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::config::NetConfig;
use crate::model::*;
use crate::net::{ChannelStates, Nodenet, SiblingSetId, StepReport};
use crate::Result;

/// Shared handle to one nodenet.
#[derive(Clone)]
pub struct NetApi {
    net: Arc<RwLock<Nodenet>>,
}

impl Default for NetApi {
    fn default() -> Self {
        Self::new()
    }
}

impl NetApi {
    pub fn new() -> Self {
        Self::from_net(Nodenet::default())
    }

    /// Build a net from a validated configuration.
    pub fn with_config(config: NetConfig) -> Result<Self> {
        Ok(Self::from_net(Nodenet::new(config)?))
    }

    pub fn from_net(net: Nodenet) -> Self {
        Self { net: Arc::new(RwLock::new(net)) }
    }

    /// Run `f` with shared access to the underlying net.
    pub fn read<R>(&self, f: impl FnOnce(&Nodenet) -> R) -> R {
        f(&self.net.read())
    }

    pub fn config(&self) -> NetConfig {
        self.net.read().config().clone()
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    pub fn create_node(&self, kind: NodeKind, parent: &str, name: &str) -> Result<NodeId> {
        self.net.write().create_node(kind, parent, name)
    }

    pub fn delete_node(&self, id: NodeId) -> Result<()> {
        self.net.write().delete_node(id)
    }

    /// Snapshot of a node.
    pub fn get_node(&self, id: NodeId) -> Result<Node> {
        self.net.read().node(id).cloned()
    }

    pub fn nodes_named(&self, name: &str) -> Vec<NodeId> {
        self.net.read().nodes_named(name)
    }

    pub fn node_count(&self) -> usize {
        self.net.read().node_count()
    }

    pub fn link_count(&self) -> usize {
        self.net.read().link_count()
    }

    pub fn set_activation(&self, id: NodeId, value: f64) -> Result<()> {
        self.net.write().set_activation(id, value)
    }

    pub fn set_node_parameter(&self, id: NodeId, key: &str, value: impl Into<Value>) -> Result<()> {
        self.net.write().set_node_parameter(id, key, &value.into())
    }

    // ========================================================================
    // Links
    // ========================================================================

    pub fn link(&self, source: NodeId, gate: Channel, target: NodeId, slot: Channel, weight: f64) -> Result<LinkId> {
        self.net.write().link(source, gate, target, slot, weight)
    }

    pub fn unlink(&self, source: NodeId, gate: Channel, target: NodeId, slot: Channel) -> Result<bool> {
        self.net.write().unlink(source, gate, target, slot)
    }

    pub fn links_of(&self, id: NodeId) -> Result<Vec<Link>> {
        let net = self.net.read();
        Ok(net.links_of(id)?.into_iter().cloned().collect())
    }

    pub fn link_with_reciprocal(&self, a: NodeId, b: NodeId, pair: LinkPair, weight: f64) -> Result<(LinkId, LinkId)> {
        self.net.write().link_with_reciprocal(a, b, pair, weight)
    }

    pub fn link_full(&self, nodes: &[NodeId]) -> Result<SiblingSetId> {
        self.net.write().link_full(nodes)
    }

    pub fn sibling_set_of(&self, id: NodeId) -> Option<SiblingSetId> {
        self.net.read().sibling_set_of(id)
    }

    // ========================================================================
    // Gates and slots
    // ========================================================================

    pub fn set_gate_parameters(&self, id: NodeId, gate: Channel, update: GateParameterUpdate) -> Result<GateParameters> {
        self.net.write().set_gate_parameters(id, gate, &update)
    }

    pub fn get_gate(&self, id: NodeId, gate: Channel) -> Result<f64> {
        Ok(self.net.read().gate(id, gate)?.activation)
    }

    pub fn get_slot(&self, id: NodeId, slot: Channel) -> Result<f64> {
        Ok(self.net.read().slot(id, slot)?.activation)
    }

    // ========================================================================
    // Ticks
    // ========================================================================

    pub fn channel_states(&self) -> ChannelStates {
        self.net.read().channel_states()
    }

    pub fn current_step(&self) -> u64 {
        self.net.read().current_step()
    }

    pub fn step(&self) -> StepReport {
        self.net.write().step()
    }

    /// Run `n` ticks under one lock. Returns the last report, or `None` for
    /// `n == 0`.
    pub fn step_n(&self, n: u64) -> Option<StepReport> {
        let mut net = self.net.write();
        (0..n).map(|_| net.step()).last()
    }

    /// Tick until a tick changes no gate. Returns how many ticks ran,
    /// counting the quiet one, or `None` if `max` ticks were not enough.
    pub fn step_until_stable(&self, max: u64) -> Option<u64> {
        let mut net = self.net.write();
        for taken in 1..=max {
            if net.step().is_stable() {
                return Some(taken);
            }
        }
        None
    }

    // ========================================================================
    // World boundary
    // ========================================================================

    pub fn set_sensor_value(&self, datasource: &str, value: f64) -> Result<()> {
        self.net.write().set_sensor_value(datasource, value)
    }

    pub fn actuator_values(&self) -> HashMap<String, f64> {
        self.net.read().actuator_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_clones_share_one_net() {
        let api = NetApi::new();
        let other = api.clone();
        let id = api.create_node(NodeKind::Register, "Root", "r").unwrap();
        assert_eq!(other.get_node(id).unwrap().name, "r");
        assert_eq!(other.node_count(), 1);
    }

    #[test]
    fn test_with_config_validates() {
        let mut cfg = NetConfig::default();
        cfg.gate_defaults.min = 2.0;
        assert!(matches!(NetApi::with_config(cfg), Err(Error::Config(_))));
    }

    #[test]
    fn test_gate_defaults_from_config() {
        let mut cfg = NetConfig::default();
        cfg.gate_defaults.threshold = 0.5;
        let api = NetApi::with_config(cfg).unwrap();
        let src = api.create_node(NodeKind::Register, "Root", "s").unwrap();
        let dst = api.create_node(NodeKind::Register, "Root", "d").unwrap();
        api.link(src, Channel::Gen, dst, Channel::Gen, 0.4).unwrap();
        api.set_activation(src, 1.0).unwrap();
        api.step();
        assert_eq!(api.get_slot(dst, Channel::Gen).unwrap(), 0.4);
        assert_eq!(api.get_gate(dst, Channel::Gen).unwrap(), 0.0);
    }

    #[test]
    fn test_step_n_and_until_stable() {
        let api = NetApi::new();
        assert_eq!(api.step_n(0), None);
        let a = api.create_node(NodeKind::Register, "Root", "a").unwrap();
        let b = api.create_node(NodeKind::Register, "Root", "b").unwrap();
        api.link(a, Channel::Gen, b, Channel::Gen, 1.0).unwrap();
        api.set_activation(a, 1.0).unwrap();

        // tick 1: a -> 0, b -> 1; tick 2: b -> 0; tick 3: quiet
        assert_eq!(api.step_until_stable(10), Some(3));
        assert_eq!(api.current_step(), 3);
        assert_eq!(api.step_n(2).map(|r| r.step), Some(5));
    }

    #[test]
    fn test_until_stable_gives_up() {
        let api = NetApi::new();
        let a = api.create_node(NodeKind::Register, "Root", "a").unwrap();
        api.link(a, Channel::Gen, a, Channel::Gen, -1.0).unwrap();
        api.set_activation(a, 1.0).unwrap();
        assert_eq!(api.step_until_stable(5), None);
        assert_eq!(api.current_step(), 5);
    }

    #[test]
    fn test_set_node_parameter_through_facade() {
        let api = NetApi::new();
        let s = api.create_node(NodeKind::sensor("light"), "Root", "eye").unwrap();
        api.set_node_parameter(s, "datasource", "sound").unwrap();
        assert_eq!(api.get_node(s).unwrap().kind, NodeKind::sensor("sound"));
        assert!(api.set_node_parameter(s, "datasource", 3_i64).is_err());
    }
}
