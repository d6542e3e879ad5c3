//! Node in the nodenet.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Channel, Gate, GateParameters, ParameterMap, Slot, Value};
use crate::{Error, Result};

/// Opaque node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const GEN_ONLY: &[Channel] = &[Channel::Gen];

/// The closed set of node kinds, each carrying only the parameters it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    /// Plain `gen` relay.
    Register,
    /// Relay on every channel, no cross-channel coupling.
    Concept,
    /// Hierarchical / sequential / categorical logic.
    Pipe,
    /// Network-wide enable switch for one directional channel.
    Activator { channel: Channel },
    /// Receives an external value on its `gen` slot every tick.
    Sensor { datasource: String },
    /// Exposes its `gen` gate to the world after every tick.
    Actor { datatarget: String },
}

impl NodeKind {
    pub fn activator(channel: Channel) -> Self {
        NodeKind::Activator { channel }
    }

    pub fn sensor(datasource: impl Into<String>) -> Self {
        NodeKind::Sensor { datasource: datasource.into() }
    }

    pub fn actor(datatarget: impl Into<String>) -> Self {
        NodeKind::Actor { datatarget: datatarget.into() }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Register => "Register",
            NodeKind::Concept => "Concept",
            NodeKind::Pipe => "Pipe",
            NodeKind::Activator { .. } => "Activator",
            NodeKind::Sensor { .. } => "Sensor",
            NodeKind::Actor { .. } => "Actor",
        }
    }

    /// Slot layout fixed by the kind.
    pub fn slot_channels(&self) -> &'static [Channel] {
        match self {
            NodeKind::Concept | NodeKind::Pipe => &Channel::ALL,
            _ => GEN_ONLY,
        }
    }

    /// Gate layout fixed by the kind.
    pub fn gate_channels(&self) -> &'static [Channel] {
        match self {
            NodeKind::Concept | NodeKind::Pipe => &Channel::ALL,
            _ => GEN_ONLY,
        }
    }

    pub fn parameters(&self) -> ParameterMap {
        let mut map = ParameterMap::new();
        match self {
            NodeKind::Activator { channel } => {
                map.insert("type".into(), Value::from(channel.as_str()));
            }
            NodeKind::Sensor { datasource } => {
                map.insert("datasource".into(), Value::from(datasource.as_str()));
            }
            NodeKind::Actor { datatarget } => {
                map.insert("datatarget".into(), Value::from(datatarget.as_str()));
            }
            NodeKind::Register | NodeKind::Concept | NodeKind::Pipe => {}
        }
        map
    }

    /// Update one parameter in place. Leaves `self` untouched on error.
    pub fn set_parameter(&mut self, key: &str, value: &Value) -> Result<()> {
        let kind = self.type_name();
        let invalid = |reason: String| Error::InvalidNodeParameter {
            kind,
            key: key.to_string(),
            reason,
        };
        let text = || {
            value
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(format!("expected STRING, got {}", value.type_name())))
        };
        match (self, key) {
            (NodeKind::Activator { channel }, "type") => {
                let parsed: Channel = text()?.parse()?;
                if !parsed.is_directional() {
                    return Err(invalid("activators gate directional channels only".into()));
                }
                *channel = parsed;
            }
            (NodeKind::Sensor { datasource }, "datasource") => *datasource = text()?,
            (NodeKind::Actor { datatarget }, "datatarget") => *datatarget = text()?,
            _ => return Err(invalid("no such parameter".into())),
        }
        Ok(())
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::Activator { channel } => write!(f, "Activator:{channel}"),
            NodeKind::Sensor { datasource } => write!(f, "Sensor:{datasource}"),
            NodeKind::Actor { datatarget } => write!(f, "Actor:{datatarget}"),
            other => f.write_str(other.type_name()),
        }
    }
}

/// Parses `Register`, `Concept`, `Pipe`, `Activator:<channel>`,
/// `Sensor:<datasource>` and `Actor:<datatarget>`.
impl FromStr for NodeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (head, arg) = match s.split_once(':') {
            Some((h, a)) => (h, Some(a)),
            None => (s, None),
        };
        match (head, arg) {
            ("Register", None) => Ok(NodeKind::Register),
            ("Concept", None) => Ok(NodeKind::Concept),
            ("Pipe", None) => Ok(NodeKind::Pipe),
            ("Activator", Some(c)) => {
                let channel: Channel = c.parse()?;
                if !channel.is_directional() {
                    return Err(Error::InvalidNodeKind(s.to_string()));
                }
                Ok(NodeKind::Activator { channel })
            }
            ("Sensor", Some(ds)) if !ds.is_empty() => Ok(NodeKind::sensor(ds)),
            ("Actor", Some(dt)) if !dt.is_empty() => Ok(NodeKind::actor(dt)),
            _ => Err(Error::InvalidNodeKind(s.to_string())),
        }
    }
}

/// A node: identity, kind, and the slots/gates its kind prescribes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    /// Nodespace the node was created in.
    pub parent: String,
    pub kind: NodeKind,
    slots: Vec<Slot>,
    gates: Vec<Gate>,
}

impl Node {
    pub fn new(
        id: NodeId,
        kind: NodeKind,
        parent: impl Into<String>,
        name: impl Into<String>,
        gate_defaults: GateParameters,
    ) -> Self {
        let slots = kind.slot_channels().iter().copied().map(Slot::new).collect();
        let gates = kind
            .gate_channels()
            .iter()
            .map(|c| Gate::new(*c, gate_defaults))
            .collect();
        Self {
            id,
            name: name.into(),
            parent: parent.into(),
            kind,
            slots,
            gates,
        }
    }

    pub fn slot(&self, channel: Channel) -> Option<&Slot> {
        self.slots.iter().find(|s| s.channel == channel)
    }

    pub fn gate(&self, channel: Channel) -> Option<&Gate> {
        self.gates.iter().find(|g| g.channel == channel)
    }

    pub(crate) fn slot_mut(&mut self, channel: Channel) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.channel == channel)
    }

    pub(crate) fn gate_mut(&mut self, channel: Channel) -> Option<&mut Gate> {
        self.gates.iter_mut().find(|g| g.channel == channel)
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    pub fn has_slot(&self, channel: Channel) -> bool {
        self.slot(channel).is_some()
    }

    pub fn has_gate(&self, channel: Channel) -> bool {
        self.gate(channel).is_some()
    }

    /// The node's `gen` gate activation; every kind has one.
    pub fn activation(&self) -> f64 {
        self.gate(Channel::Gen).map(|g| g.activation).unwrap_or(0.0)
    }

    pub fn parameters(&self) -> ParameterMap {
        self.kind.parameters()
    }
}
