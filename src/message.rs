// SPDX-License-Identifier: EUPL-1.2-or-later
// Copyright © 2026-present Arbor Contributors

//! Protocol message definitions
//!
//! A [`Message`] is the unit of exchange between routers and members: a
//! tagged payload, one variant per operation kind, encoded with postcard for
//! the wire. Handlers consume a `Message` and produce [`Outbound`] envelopes
//! for the transport to deliver.

use crate::identity::{GroupId, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a joining node relates to the router it contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinIntent {
    /// End host attaching below this router; never forwards traffic.
    Member,
    /// Subordinate router in the domain tree.
    Child,
}

/// Propagation direction of a group join while the shared tree is built.
///
/// `Up` means the join is still climbing toward the domain root looking for a
/// converging path; `Down` means a lowest common ancestor was found and
/// confirmations are fanning out toward the leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

/// A protocol message, one variant per operation kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Message {
    /// Register a new child router in the domain tree.
    CreateDomain { addr: String, id: NodeId },
    /// Attach a member or child router to this domain.
    JoinDomain {
        addr: String,
        id: NodeId,
        intent: JoinIntent,
    },
    /// Detach a member or child router from this domain.
    LeaveDomain { id: NodeId },
    /// Announce a new multicast group up the domain tree.
    CreateGroup {
        addr: String,
        id: NodeId,
        group: GroupId,
    },
    /// Join the shared distribution tree of a group.
    JoinGroup {
        addr: String,
        id: NodeId,
        group: GroupId,
        direction: Direction,
    },
    /// Leave a group's distribution tree (maintenance seam).
    LeaveGroup { id: NodeId, group: GroupId },
    /// Carry application content along the confirmed tree.
    SendGroup {
        addr: String,
        id: NodeId,
        group: GroupId,
        content: Vec<u8>,
    },
    /// Rotate group credentials (maintenance seam).
    RotateGroupKeys { group: GroupId },
}

/// Field-less discriminant of a [`Message`], used for dispatch and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    CreateDomain,
    JoinDomain,
    LeaveDomain,
    CreateGroup,
    JoinGroup,
    LeaveGroup,
    SendGroup,
    RotateGroupKeys,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::CreateDomain => "CREATE_TD",
            MessageKind::JoinDomain => "JOIN_TD",
            MessageKind::LeaveDomain => "LEAVE_TD",
            MessageKind::CreateGroup => "CREATE_MG",
            MessageKind::JoinGroup => "JOIN_MG",
            MessageKind::LeaveGroup => "LEAVE_MG",
            MessageKind::SendGroup => "SEND_MG",
            MessageKind::RotateGroupKeys => "KEY_ROTATE_MG",
        };
        write!(f, "{}", name)
    }
}

impl Message {
    /// Returns the operation kind of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::CreateDomain { .. } => MessageKind::CreateDomain,
            Message::JoinDomain { .. } => MessageKind::JoinDomain,
            Message::LeaveDomain { .. } => MessageKind::LeaveDomain,
            Message::CreateGroup { .. } => MessageKind::CreateGroup,
            Message::JoinGroup { .. } => MessageKind::JoinGroup,
            Message::LeaveGroup { .. } => MessageKind::LeaveGroup,
            Message::SendGroup { .. } => MessageKind::SendGroup,
            Message::RotateGroupKeys { .. } => MessageKind::RotateGroupKeys,
        }
    }

    /// Encodes the message for the wire using postcard.
    pub fn encode(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Decodes a message from wire bytes.
    ///
    /// A datagram that does not decode to a structurally valid message is a
    /// malformed input; the caller drops it without touching router state.
    pub fn decode(data: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(data)
    }
}

/// An addressed outbound message produced by a handler.
///
/// The empty destination is the discard sentinel: domain handlers return it
/// to signal "handled locally, nothing to send" and the transport must never
/// deliver it anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub dest: String,
    pub message: Message,
}

impl Outbound {
    pub fn new(dest: impl Into<String>, message: Message) -> Self {
        Self {
            dest: dest.into(),
            message,
        }
    }

    /// A no-op envelope that the transport discards.
    pub fn discard(message: Message) -> Self {
        Self {
            dest: String::new(),
            message,
        }
    }

    /// True when this envelope carries the discard sentinel.
    pub fn is_discard(&self) -> bool {
        self.dest.is_empty()
    }
}
