//! End-to-end tests for sequential scripts over por/ret.
//!
//! Children of one head are chained with `porret`. Each waits for its
//! predecessor's success before requesting, and a failure anywhere mutes the
//! rest of the chain and surfaces as a negative result at the head.

use nodenet_rs::{Channel, LinkPair, NetApi, NodeId, NodeKind};

fn prepare() -> (NetApi, NodeId) {
    let net = NetApi::new();
    let source = net.create_node(NodeKind::Register, "Root", "Source").unwrap();
    net.link(source, Channel::Gen, source, Channel::Gen, 1.0).unwrap();
    net.set_activation(source, 1.0).unwrap();
    net.step();
    (net, source)
}

/// Head with a `porret` chain of children named `A`, `B`, ...
fn script(net: &NetApi, source: NodeId, n: usize) -> (NodeId, Vec<NodeId>) {
    let head = net.create_node(NodeKind::Pipe, "Root", "Head").unwrap();
    let steps: Vec<NodeId> = ["A", "B", "C"][..n]
        .iter()
        .map(|name| net.create_node(NodeKind::Pipe, "Root", name).unwrap())
        .collect();
    for step in &steps {
        net.link_with_reciprocal(head, *step, LinkPair::SubSur, 1.0).unwrap();
    }
    for pair in steps.windows(2) {
        net.link_with_reciprocal(pair[0], pair[1], LinkPair::PorRet, 1.0).unwrap();
    }
    net.link(source, Channel::Gen, head, Channel::Sub, 1.0).unwrap();
    (head, steps)
}

/// `(sub, sur)` gate activations of a node.
fn request_report(net: &NetApi, id: NodeId) -> (f64, f64) {
    (
        net.get_gate(id, Channel::Sub).unwrap(),
        net.get_gate(id, Channel::Sur).unwrap(),
    )
}

// ============================================================================
// 1. Two-step script
// ============================================================================

#[test]
fn test_two_script() {
    let (net, source) = prepare();
    let (head, s) = script(&net, source, 2);
    let (a, b) = (s[0], s[1]);
    net.step_n(2);

    // quiet, first node requesting
    assert_eq!(net.get_gate(head, Channel::Gen).unwrap(), 0.0);
    assert_eq!(request_report(&net, a), (1.0, 0.0));
    assert_eq!(request_report(&net, b), (0.0, 0.0));

    // first node succeeds; success goes forward on por, not up on sur
    net.link(source, Channel::Gen, a, Channel::Sur, 1.0).unwrap();
    net.step();
    assert_eq!(request_report(&net, a), (1.0, 0.0));
    assert_eq!(request_report(&net, b), (0.0, 0.0));

    // second node now requesting
    net.step();
    assert_eq!(request_report(&net, a), (1.0, 0.0));
    assert_eq!(request_report(&net, b), (1.0, 0.0));

    // last node succeeds and reports upward
    net.link(source, Channel::Gen, b, Channel::Sur, 1.0).unwrap();
    net.step_n(2);
    assert_eq!(request_report(&net, a), (1.0, 0.0));
    assert_eq!(request_report(&net, b), (1.0, 1.0));

    net.step();
    assert_eq!(net.get_gate(head, Channel::Gen).unwrap(), 1.0);
}

// ============================================================================
// 2. Three-step script, then a failure in the middle
// ============================================================================

#[test]
fn test_three_script() {
    let (net, source) = prepare();
    let (head, s) = script(&net, source, 3);
    let (a, b, c) = (s[0], s[1], s[2]);
    net.step_n(2);

    assert_eq!(net.get_gate(head, Channel::Gen).unwrap(), 0.0);
    assert_eq!(request_report(&net, a), (1.0, 0.0));
    assert_eq!(request_report(&net, b), (0.0, 0.0));
    assert_eq!(request_report(&net, c), (0.0, 0.0));

    net.link(source, Channel::Gen, a, Channel::Sur, 1.0).unwrap();
    net.step();
    assert_eq!(request_report(&net, a), (1.0, 0.0));
    assert_eq!(request_report(&net, b), (0.0, 0.0));
    assert_eq!(request_report(&net, c), (0.0, 0.0));

    net.step();
    assert_eq!(request_report(&net, a), (1.0, 0.0));
    assert_eq!(request_report(&net, b), (1.0, 0.0));
    assert_eq!(request_report(&net, c), (0.0, 0.0));

    net.link(source, Channel::Gen, b, Channel::Sur, 1.0).unwrap();
    net.step_n(2);
    assert_eq!(request_report(&net, a), (1.0, 0.0));
    assert_eq!(request_report(&net, b), (1.0, 0.0));
    assert_eq!(request_report(&net, c), (1.0, 0.0));

    net.link(source, Channel::Gen, c, Channel::Sur, 1.0).unwrap();
    net.step_n(2);
    assert_eq!(request_report(&net, a), (1.0, 0.0));
    assert_eq!(request_report(&net, b), (1.0, 0.0));
    assert_eq!(request_report(&net, c), (1.0, 1.0));

    net.step();
    assert_eq!(net.get_gate(head, Channel::Gen).unwrap(), 1.0);

    // the middle node fails: it reports the failure, the last node is muted
    net.link(source, Channel::Gen, b, Channel::Sur, -1.0).unwrap();
    net.step_n(2);
    assert_eq!(request_report(&net, a), (1.0, 0.0));
    assert_eq!(request_report(&net, b), (1.0, -1.0));
    assert_eq!(net.get_gate(c, Channel::Sub).unwrap(), 0.0);
    assert_eq!(net.get_gate(c, Channel::Sur).unwrap(), 0.0);

    net.step();
    assert_eq!(net.get_gate(head, Channel::Gen).unwrap(), -1.0);
}

// ============================================================================
// 3. Failure travels backward on ret
// ============================================================================

#[test]
fn test_failure_reaches_predecessor_on_ret() {
    let (net, source) = prepare();
    let (_, s) = script(&net, source, 2);
    let (a, b) = (s[0], s[1]);
    net.link(source, Channel::Gen, a, Channel::Sur, 1.0).unwrap();
    net.link(source, Channel::Gen, b, Channel::Sur, -1.0).unwrap();
    net.step_n(4);

    assert_eq!(net.get_gate(b, Channel::Ret).unwrap(), -1.0);
    // a's success and b's failure cancel on a's gen
    assert_eq!(net.get_slot(a, Channel::Ret).unwrap(), -1.0);
    assert_eq!(net.get_gate(a, Channel::Gen).unwrap(), 0.0);
}
