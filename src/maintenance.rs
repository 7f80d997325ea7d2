// SPDX-License-Identifier: EUPL-1.2-or-later
// Copyright © 2026-present Arbor Contributors

//! Pluggable group maintenance
//!
//! Leaving a distribution tree and rotating group credentials are dispatched
//! through this trait so the wire format and handler table stay stable while
//! the algorithms behind them remain replaceable. The default implementation
//! does nothing: it neither mutates the RIB nor emits messages.

use crate::identity::{GroupId, NodeId};
use crate::message::Outbound;
use crate::rib::Rib;

/// Strategy invoked for the `LEAVE_MG` and `KEY_ROTATE_MG` operations.
///
/// A real leave implementation would reverse the join promotions this node
/// took part in; key rotation belongs to an external credential manager.
/// Both receive mutable RIB access so a replacement can do that without
/// changes to the dispatch table.
pub trait GroupMaintenance: Send + Sync {
    /// Handles a request by `id` to leave `group`.
    fn on_leave(&self, rib: &mut Rib, id: &NodeId, group: &GroupId) -> Vec<Outbound>;

    /// Handles a credential rotation request for `group`.
    fn on_key_rotate(&self, rib: &mut Rib, group: &GroupId) -> Vec<Outbound>;

    /// Returns the strategy name.
    fn name(&self) -> &str;
}

/// Default maintenance strategy: every operation is a silent no-op.
#[derive(Debug, Default)]
pub struct NoopMaintenance;

impl GroupMaintenance for NoopMaintenance {
    fn on_leave(&self, _rib: &mut Rib, _id: &NodeId, _group: &GroupId) -> Vec<Outbound> {
        Vec::new()
    }

    fn on_key_rotate(&self, _rib: &mut Rib, _group: &GroupId) -> Vec<Outbound> {
        Vec::new()
    }

    fn name(&self) -> &str {
        "Noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_emits_nothing() {
        let strategy = NoopMaintenance;
        let mut rib = Rib::new();

        let out = strategy.on_leave(&mut rib, &NodeId::from("leaf-1"), &GroupId::from("g1"));
        assert!(out.is_empty());

        let out = strategy.on_key_rotate(&mut rib, &GroupId::from("g1"));
        assert!(out.is_empty());
        assert_eq!(strategy.name(), "Noop");
    }
}
