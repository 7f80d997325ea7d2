// SPDX-License-Identifier: EUPL-1.2-or-later
// Copyright © 2026-present Arbor Contributors

//! Per-node control plane for a hierarchical overlay multicast router.
//!
//! Routers form a rooted tree of named domains; multicast groups are shared
//! distribution trees layered over that hierarchy. Group joins climb toward
//! the domain root until two paths converge, at which point the router where
//! they meet (the lowest common ancestor) flips the propagation direction and
//! confirms the tree back down toward the leaves. No node ever needs global
//! topology knowledge.
//!
//! Inbound messages drain through a single dispatch loop, one handler at a
//! time; drain order is most-recently-enqueued-first unless configured
//! otherwise (see [`dispatch`]).

// Public module declarations
pub mod config;
pub mod dispatch;
pub mod error;
pub mod identity;
pub mod maintenance;
pub mod message;
pub mod rib;
pub mod router;
pub mod transport;

// Re-export commonly used types
pub use config::{CliArgs, RouterConfig, TomlConfig};
pub use dispatch::{DrainOrder, Mailbox, RouterActor, SweepConfig};
pub use error::{ArborError, ConfigError, TransportError};
pub use identity::{GroupId, NodeId, NodeIdentity};
pub use maintenance::{GroupMaintenance, NoopMaintenance};
pub use message::{Direction, JoinIntent, Message, MessageKind, Outbound};
pub use rib::Rib;
pub use router::Router;
pub use transport::{Transport, UdpTransport};
