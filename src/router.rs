// SPDX-License-Identifier: EUPL-1.2-or-later
// Copyright © 2026-present Arbor Contributors

//! Protocol handlers
//!
//! One handler per message kind, each reading and mutating the RIB and
//! returning the addressed outbound messages the transport should deliver.
//! Handlers never block and never wait for replies: a confirmation for an
//! upward join arrives later as an ordinary inbound message.
//!
//! The central piece is the group join. Upward joins climb toward the domain
//! root leaving tentative links behind; the first router that sees a second
//! independent path for the same group is the lowest common ancestor and
//! flips the direction, promoting its tentative links to confirmed and
//! fanning confirmations back down. No router needs global topology
//! knowledge for this, only its own RIB.

use crate::identity::{GroupId, NodeId, NodeIdentity};
use crate::maintenance::{GroupMaintenance, NoopMaintenance};
use crate::message::{Direction, JoinIntent, Message, Outbound};
use crate::rib::Rib;
use tracing::{debug, info};

/// A single overlay router: identity, upward link, RIB, and handlers.
pub struct Router {
    identity: NodeIdentity,
    /// Upward neighbor in the domain tree; `None` at the root.
    parent: Option<NodeIdentity>,
    rib: Rib,
    maintenance: Box<dyn GroupMaintenance>,
}

impl Router {
    /// Creates a router with the default no-op maintenance strategy.
    pub fn new(identity: NodeIdentity, parent: Option<NodeIdentity>) -> Self {
        Self::with_maintenance(identity, parent, Box::new(NoopMaintenance))
    }

    /// Creates a router with an injected maintenance strategy.
    pub fn with_maintenance(
        identity: NodeIdentity,
        parent: Option<NodeIdentity>,
        maintenance: Box<dyn GroupMaintenance>,
    ) -> Self {
        Self {
            identity,
            parent,
            rib: Rib::new(),
            maintenance,
        }
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn rib(&self) -> &Rib {
        &self.rib
    }

    pub fn rib_mut(&mut self) -> &mut Rib {
        &mut self.rib
    }

    /// Dispatches one inbound message to its handler.
    ///
    /// Runs to completion before the caller dequeues the next message; that
    /// contract is what lets the RIB go unlocked.
    pub fn handle(&mut self, msg: Message) -> Vec<Outbound> {
        debug!(kind = %msg.kind(), router = %self.identity.id, "handling message");
        match msg {
            Message::CreateDomain { addr, id } => self.handle_create_domain(addr, id),
            Message::JoinDomain { addr, id, intent } => self.handle_join_domain(addr, id, intent),
            Message::LeaveDomain { id } => self.handle_leave_domain(id),
            Message::CreateGroup { addr, id, group } => self.handle_create_group(addr, id, group),
            Message::JoinGroup {
                addr,
                id,
                group,
                direction,
            } => self.handle_join_group(addr, id, group, direction),
            Message::SendGroup {
                addr,
                id,
                group,
                content,
            } => self.handle_send_group(addr, id, group, content),
            Message::LeaveGroup { id, group } => self.maintenance.on_leave(&mut self.rib, &id, &group),
            Message::RotateGroupKeys { group } => {
                self.maintenance.on_key_rotate(&mut self.rib, &group)
            }
        }
    }

    // --- domain membership ---

    fn handle_create_domain(&mut self, addr: String, id: NodeId) -> Vec<Outbound> {
        self.rib.add_child(id, addr);
        Vec::new()
    }

    fn handle_join_domain(&mut self, addr: String, id: NodeId, intent: JoinIntent) -> Vec<Outbound> {
        match intent {
            JoinIntent::Member => self.rib.add_member(id, addr),
            JoinIntent::Child => self.rib.add_child(id, addr),
        }
        Vec::new()
    }

    fn handle_leave_domain(&mut self, id: NodeId) -> Vec<Outbound> {
        self.rib.remove_node(&id);
        Vec::new()
    }

    // --- multicast group ---

    /// Records interest in a new group and announces it one hop upward.
    ///
    /// This is a one-shot announcement, independent of the join state
    /// machine: it lets ancestors learn the group exists before any join
    /// completes.
    fn handle_create_group(&mut self, addr: String, id: NodeId, group: GroupId) -> Vec<Outbound> {
        let sender = NodeIdentity::new(addr, id);
        if self.rib.is_child(&sender.id) {
            self.rib.add_tentative(&group, sender);
        } else {
            // Members skip the join handshake entirely.
            self.rib.add_group_member(&group, sender);
        }

        match &self.parent {
            Some(parent) => vec![Outbound::new(
                parent.addr.clone(),
                Message::CreateGroup {
                    addr: self.identity.addr.clone(),
                    id: self.identity.id.clone(),
                    group,
                },
            )],
            None => Vec::new(),
        }
    }

    fn handle_join_group(
        &mut self,
        addr: String,
        id: NodeId,
        group: GroupId,
        direction: Direction,
    ) -> Vec<Outbound> {
        match direction {
            // Confirmations flow from the parent, which is never in the
            // children table, so they are routed on direction alone.
            Direction::Down => self.confirm_downward(group),
            Direction::Up => {
                let sender = NodeIdentity::new(addr, id);
                if self.rib.is_child(&sender.id) {
                    self.join_from_child_upward(sender, group)
                } else {
                    // Leaf join: record the member and keep climbing.
                    self.rib.add_group_member(&group, sender);
                    self.propagate_join_up(group)
                }
            }
        }
    }

    /// An upward join from a child: either this router is the LCA of two
    /// converging paths, or the search continues toward the root.
    fn join_from_child_upward(&mut self, sender: NodeIdentity, group: GroupId) -> Vec<Outbound> {
        // Re-sent join for an already confirmed link: re-emit the
        // confirmation downward, touch nothing.
        if self.rib.is_confirmed(&group, &sender) {
            return vec![self.downward_confirmation(&sender, &group)];
        }

        // Measured before recording the new request, and ignoring the
        // requester itself so duplicates cannot fake a convergence.
        let had_link = self.rib.has_link_excluding(&group, &sender);
        self.rib.add_tentative(&group, sender);

        if had_link {
            // Two join paths meet here: this router is the LCA. Flip the
            // direction and confirm everything pending, the new request
            // included.
            info!(router = %self.identity.id, group = %group, "join paths converged, confirming tree");
            self.promote_and_fan_down(&group)
        } else {
            self.propagate_join_up(group)
        }
    }

    /// A downward confirmation from the parent: the upward link is now part
    /// of the tree for this group, and confirmation keeps fanning toward the
    /// leaves.
    fn confirm_downward(&mut self, group: GroupId) -> Vec<Outbound> {
        self.rib.confirm_parent(&group);
        self.promote_and_fan_down(&group)
    }

    fn promote_and_fan_down(&mut self, group: &GroupId) -> Vec<Outbound> {
        self.rib
            .promote_tentative(group)
            .iter()
            .map(|neighbor| self.downward_confirmation(neighbor, group))
            .collect()
    }

    fn downward_confirmation(&self, neighbor: &NodeIdentity, group: &GroupId) -> Outbound {
        Outbound::new(
            neighbor.addr.clone(),
            Message::JoinGroup {
                addr: self.identity.addr.clone(),
                id: self.identity.id.clone(),
                group: group.clone(),
                direction: Direction::Down,
            },
        )
    }

    fn propagate_join_up(&self, group: GroupId) -> Vec<Outbound> {
        match &self.parent {
            Some(parent) => vec![Outbound::new(
                parent.addr.clone(),
                Message::JoinGroup {
                    addr: self.identity.addr.clone(),
                    id: self.identity.id.clone(),
                    group,
                    direction: Direction::Up,
                },
            )],
            // The root has nowhere further up; the tentative link waits here
            // for a second path to arrive.
            None => Vec::new(),
        }
    }

    /// Floods content along the confirmed tree: direct subscribers, the
    /// parent when confirmed for this group, and every confirmed link.
    /// The neighbor the data just arrived from is skipped, so content is
    /// never reflected back toward its upstream. Mutates no state.
    fn handle_send_group(
        &mut self,
        _addr: String,
        from: NodeId,
        group: GroupId,
        content: Vec<u8>,
    ) -> Vec<Outbound> {
        let forwarded = Message::SendGroup {
            addr: self.identity.addr.clone(),
            id: self.identity.id.clone(),
            group: group.clone(),
            content,
        };

        let mut out: Vec<Outbound> = self
            .rib
            .group_members(&group)
            .filter(|m| m.id != from)
            .map(|m| Outbound::new(m.addr.clone(), forwarded.clone()))
            .collect();

        if self.rib.is_parent_confirmed(&group) {
            if let Some(parent) = &self.parent {
                if parent.id != from {
                    out.push(Outbound::new(parent.addr.clone(), forwarded.clone()));
                }
            }
        }

        out.extend(
            self.rib
                .confirmed_links(&group)
                .filter(|c| c.id != from)
                .map(|c| Outbound::new(c.addr.clone(), forwarded.clone())),
        );

        out
    }
}
