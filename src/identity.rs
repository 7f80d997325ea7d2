// SPDX-License-Identifier: EUPL-1.2-or-later
// Copyright © 2026-present Arbor Contributors

//! Node and group naming
//!
//! Every router, member, and multicast group in the overlay is referenced by
//! a flat globally unique name. A [`NodeIdentity`] pairs such a name with the
//! transport locator it is currently reachable at, and is the value type used
//! as a key in every RIB map and set.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Globally unique name of a router or end-host member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Globally unique name of a multicast group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub String);

impl GroupId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GroupId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Transport locator plus node name, identifying a neighbor or member.
///
/// Equality and hashing cover both fields, so the same node re-registered
/// under a new locator counts as a distinct identity until the old entry is
/// removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeIdentity {
    /// Transport locator (e.g. "host:port" for the UDP transport).
    pub addr: String,
    /// Globally unique node name.
    pub id: NodeId,
}

impl NodeIdentity {
    pub fn new(addr: impl Into<String>, id: impl Into<NodeId>) -> Self {
        Self {
            addr: addr.into(),
            id: id.into(),
        }
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.addr)
    }
}
