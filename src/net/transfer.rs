//! Per-kind transfer functions.
//!
//! Each function maps a node's freshly accumulated slot values to one
//! pre-activation per gate. The gate's own [`Gate::transfer`] then applies
//! amplification, decay, threshold and clamping.
//!
//! [`Gate::transfer`]: crate::model::Gate::transfer

use crate::model::{Channel, NodeKind};

use super::ChannelStates;

/// Slot values of one node for the tick being computed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SlotInputs {
    values: [f64; 7],
    linked: [bool; 7],
}

impl SlotInputs {
    pub fn set(&mut self, channel: Channel, value: f64, linked: bool) {
        self.values[channel.index()] = value;
        self.linked[channel.index()] = linked;
    }

    pub fn get(&self, channel: Channel) -> f64 {
        self.values[channel.index()]
    }

    /// Whether at least one link feeds this slot.
    pub fn linked(&self, channel: Channel) -> bool {
        self.linked[channel.index()]
    }
}

/// Pre-activations indexed by [`Channel::index`].
pub type PreActivations = [f64; 7];

/// Dispatch on the node kind.
pub fn pre_activations(kind: &NodeKind, inputs: &SlotInputs, channels: &ChannelStates) -> PreActivations {
    match kind {
        NodeKind::Pipe => pipe(inputs, channels),
        NodeKind::Register
        | NodeKind::Concept
        | NodeKind::Activator { .. }
        | NodeKind::Sensor { .. }
        | NodeKind::Actor { .. } => relay(inputs),
    }
}

/// Every gate passes its same-named slot through.
fn relay(inputs: &SlotInputs) -> PreActivations {
    Channel::ALL.map(|c| inputs.get(c))
}

/// Pipe logic: hierarchy on sub/sur, sequencing on por/ret, binding on
/// cat/exp. Coupling for a channel only applies while it is enabled; a
/// disabled channel relays its slot.
fn pipe(inputs: &SlotInputs, channels: &ChannelStates) -> PreActivations {
    use Channel::*;

    let s = |c: Channel| inputs.get(c);
    let on = |c: Channel| channels.is_enabled(c);

    // Sequencing needs both directions of the por/ret pair.
    let seq = on(Por) && on(Ret);
    let muted = seq && inputs.linked(Por) && s(Por) <= 0.0;
    let live = |v: f64| if muted { 0.0 } else { v };

    // `sur` already holds the sibling-averaged report (see step.rs).
    let report = if on(Sur) { s(Sur) } else { 0.0 };
    let confirmed = if on(Exp) { s(Exp) } else { 0.0 };
    let success = report + confirmed;

    let mut out = [0.0; 7];

    out[Gen.index()] = s(Gen) + live(success) + if seq { s(Ret).min(0.0) } else { 0.0 };

    out[Sub.index()] = if on(Sub) { live(s(Sub)) } else { s(Sub) };

    out[Sur.index()] = if !on(Sur) {
        s(Sur)
    } else if seq && inputs.linked(Ret) {
        // A successor carries success on; only failure is reported upward.
        live(success.min(0.0))
    } else {
        live(success)
    };

    out[Por.index()] = if seq { live(success.max(0.0)) } else { s(Por) };

    out[Ret.index()] = if !on(Ret) {
        s(Ret)
    } else if seq {
        s(Ret) + live(success.min(0.0))
    } else {
        // ret search: a por impulse is reflected backward.
        s(Ret) + s(Por)
    };

    out[Cat.index()] = if on(Cat) { s(Cat) + live(s(Sub)) } else { s(Cat) };

    out[Exp.index()] = if on(Exp) { s(Exp) + live(report) } else { s(Exp) };

    out
}
