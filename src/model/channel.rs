//! Channel vocabulary shared by slots, gates and activators.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// One of the seven slot/gate names a node can carry.
///
/// `Gen` is the generic channel; the remaining six are directional and come
/// in pairs: `Sub`/`Sur` (hierarchy), `Por`/`Ret` (sequence), `Cat`/`Exp`
/// (abstraction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Gen,
    Sub,
    Sur,
    Por,
    Ret,
    Cat,
    Exp,
}

impl Channel {
    /// All channels in canonical order.
    pub const ALL: [Channel; 7] = [
        Channel::Gen,
        Channel::Sub,
        Channel::Sur,
        Channel::Por,
        Channel::Ret,
        Channel::Cat,
        Channel::Exp,
    ];

    /// The six channels an Activator can gate.
    pub const DIRECTIONAL: [Channel; 6] = [
        Channel::Sub,
        Channel::Sur,
        Channel::Por,
        Channel::Ret,
        Channel::Cat,
        Channel::Exp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Gen => "gen",
            Channel::Sub => "sub",
            Channel::Sur => "sur",
            Channel::Por => "por",
            Channel::Ret => "ret",
            Channel::Cat => "cat",
            Channel::Exp => "exp",
        }
    }

    /// Position in [`Channel::ALL`]; used to index fixed-size buffers.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_directional(&self) -> bool {
        !matches!(self, Channel::Gen)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Channel::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| Error::InvalidChannel(s.to_string()))
    }
}

/// A directional channel pair, linked in both directions by
/// `link_with_reciprocal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPair {
    SubSur,
    PorRet,
    CatExp,
}

impl LinkPair {
    /// `(forward, backward)`: forward runs from the first node to the second,
    /// backward returns from the second to the first.
    pub fn channels(&self) -> (Channel, Channel) {
        match self {
            LinkPair::SubSur => (Channel::Sub, Channel::Sur),
            LinkPair::PorRet => (Channel::Por, Channel::Ret),
            LinkPair::CatExp => (Channel::Cat, Channel::Exp),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LinkPair::SubSur => "subsur",
            LinkPair::PorRet => "porret",
            LinkPair::CatExp => "catexp",
        }
    }
}

impl fmt::Display for LinkPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkPair {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "subsur" => Ok(LinkPair::SubSur),
            "porret" => Ok(LinkPair::PorRet),
            "catexp" => Ok(LinkPair::CatExp),
            other => Err(Error::InvalidLinkPair(other.to_string())),
        }
    }
}
