//! End-to-end tests for directional search.
//!
//! One Activator per directional channel is created and only the one under
//! test is driven. Every other channel is therefore closed and its Pipe
//! coupling is off, so activation spreads along a single direction.

use nodenet_rs::{Channel, ChannelDefault, LinkPair, NetApi, NetConfig, NodeId, NodeKind};

fn prepare() -> (NetApi, NodeId) {
    let net = NetApi::new();
    let source = net.create_node(NodeKind::Register, "Root", "Source").unwrap();
    net.link(source, Channel::Gen, source, Channel::Gen, 1.0).unwrap();
    net.set_activation(source, 1.0).unwrap();
    net.step();
    (net, source)
}

/// Creates one activator per directional channel and drives the one for
/// `channel` from `source`.
fn activate_only(net: &NetApi, source: NodeId, channel: Channel) {
    for c in Channel::DIRECTIONAL {
        let act = net
            .create_node(NodeKind::activator(c), "Root", &format!("{c}-activator"))
            .unwrap();
        if c == channel {
            net.link(source, Channel::Gen, act, Channel::Gen, 1.0).unwrap();
        }
    }
}

fn pair(net: &NetApi, link_pair: LinkPair) -> (NodeId, NodeId) {
    let a = net.create_node(NodeKind::Pipe, "Root", "A").unwrap();
    let b = net.create_node(NodeKind::Pipe, "Root", "B").unwrap();
    net.link_with_reciprocal(a, b, link_pair, 1.0).unwrap();
    (a, b)
}

// ============================================================================
// 1. One search per channel
// ============================================================================

#[test]
fn test_search_sub() {
    let (net, source) = prepare();
    let (a, b) = pair(&net, LinkPair::SubSur);
    activate_only(&net, source, Channel::Sub);
    net.link(source, Channel::Gen, a, Channel::Sub, 1.0).unwrap();
    net.step_n(3);

    assert_eq!(net.get_gate(a, Channel::Sub).unwrap(), 1.0);
    assert_eq!(net.get_gate(b, Channel::Sub).unwrap(), 1.0);
}

#[test]
fn test_search_sur() {
    let (net, source) = prepare();
    let (a, b) = pair(&net, LinkPair::SubSur);
    activate_only(&net, source, Channel::Sur);
    net.link(source, Channel::Gen, b, Channel::Sur, 1.0).unwrap();
    net.step_n(3);

    assert!(net.get_gate(b, Channel::Sur).unwrap() > 0.0);
    assert!(net.get_gate(a, Channel::Sur).unwrap() > 0.0);
}

#[test]
fn test_search_por() {
    let (net, source) = prepare();
    let (a, b) = pair(&net, LinkPair::PorRet);
    activate_only(&net, source, Channel::Por);
    net.link(source, Channel::Gen, a, Channel::Por, 1.0).unwrap();
    net.step_n(3);

    assert_eq!(net.get_gate(a, Channel::Por).unwrap(), 1.0);
    assert_eq!(net.get_gate(b, Channel::Por).unwrap(), 1.0);
}

#[test]
fn test_search_ret() {
    let (net, source) = prepare();
    let (a, b) = pair(&net, LinkPair::PorRet);
    activate_only(&net, source, Channel::Ret);
    net.link(source, Channel::Gen, b, Channel::Por, 1.0).unwrap();
    net.step_n(3);

    assert_eq!(net.get_gate(b, Channel::Ret).unwrap(), 1.0);
    assert_eq!(net.get_gate(a, Channel::Ret).unwrap(), 1.0);
}

#[test]
fn test_search_cat() {
    let (net, source) = prepare();
    let (a, b) = pair(&net, LinkPair::CatExp);
    activate_only(&net, source, Channel::Cat);
    net.link(source, Channel::Gen, a, Channel::Cat, 1.0).unwrap();
    net.step_n(3);

    assert_eq!(net.get_gate(a, Channel::Cat).unwrap(), 1.0);
    assert_eq!(net.get_gate(b, Channel::Cat).unwrap(), 1.0);
}

#[test]
fn test_search_exp() {
    let (net, source) = prepare();
    let (a, b) = pair(&net, LinkPair::CatExp);
    activate_only(&net, source, Channel::Exp);
    net.link(source, Channel::Gen, b, Channel::Exp, 1.0).unwrap();
    net.step_n(3);

    assert!(net.get_gate(b, Channel::Exp).unwrap() > 0.0);
    assert!(net.get_gate(a, Channel::Exp).unwrap() > 0.0);
}

// ============================================================================
// 2. Channel state bookkeeping
// ============================================================================

#[test]
fn test_only_driven_channel_is_enabled() {
    let (net, source) = prepare();
    activate_only(&net, source, Channel::Cat);
    net.step_n(2);
    assert_eq!(net.channel_states().enabled_channels(), vec![Channel::Cat]);
}

#[test]
fn test_retyped_activator_moves_its_channel() {
    let (net, source) = prepare();
    let act = net.create_node(NodeKind::activator(Channel::Sub), "Root", "act").unwrap();
    net.link(source, Channel::Gen, act, Channel::Gen, 1.0).unwrap();
    net.step_n(2);
    assert!(net.channel_states().is_enabled(Channel::Sub));

    net.set_node_parameter(act, "type", "ret").unwrap();
    net.step();
    assert!(net.channel_states().is_enabled(Channel::Ret));
    // sub is unbound again and falls back to the default policy
    assert!(net.channel_states().is_enabled(Channel::Sub));
}

#[test]
fn test_closed_policy_keeps_pipes_in_relay_mode() {
    let cfg = NetConfig::default().with_unbound_channels(ChannelDefault::Closed);
    let net = NetApi::with_config(cfg).unwrap();
    let source = net.create_node(NodeKind::Register, "Root", "Source").unwrap();
    net.link(source, Channel::Gen, source, Channel::Gen, 1.0).unwrap();
    net.set_activation(source, 1.0).unwrap();

    let head = net.create_node(NodeKind::Pipe, "Root", "Head").unwrap();
    net.link(source, Channel::Gen, head, Channel::Sur, 1.0).unwrap();
    net.step_n(2);

    // sur relays, but nothing counts as success on gen
    assert_eq!(net.get_gate(head, Channel::Sur).unwrap(), 1.0);
    assert_eq!(net.get_gate(head, Channel::Gen).unwrap(), 0.0);
}
