// SPDX-License-Identifier: EUPL-1.2-or-later
// Copyright © 2026-present Arbor Contributors

//! Routing Information Base (RIB)
//!
//! The RIB holds everything one router knows about the overlay:
//! - its domain-tree children and attached end-host members,
//! - per multicast group, the tentative and confirmed distribution links,
//! - per group, the directly attached subscribing members,
//! - the set of groups for which the upward (parent) link is confirmed.
//!
//! The RIB is owned by the dispatch loop and mutated by exactly one task, so
//! it carries no interior locking; the serialization of handlers is what
//! makes that safe. Absent map keys always mean "empty set".

use crate::identity::{GroupId, NodeId, NodeIdentity};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

/// Per-router routing state.
#[derive(Debug, Default)]
pub struct Rib {
    /// Domain-tree children of this router, name to locator.
    children: HashMap<NodeId, String>,
    /// End hosts attached to this router's domain, name to locator.
    members: HashMap<NodeId, String>,
    /// Per group, neighbors whose join was forwarded upward but not yet
    /// confirmed, with the time the request was recorded (feeds expiry).
    tentative: HashMap<GroupId, HashMap<NodeIdentity, Instant>>,
    /// Per group, neighbors permanently part of the distribution tree.
    confirmed: HashMap<GroupId, HashSet<NodeIdentity>>,
    /// Per group, directly attached members receiving data here.
    group_members: HashMap<GroupId, HashSet<NodeIdentity>>,
    /// Groups for which the upward link carries confirmed tree traffic.
    parent_confirmed: HashSet<GroupId>,
}

impl Rib {
    /// Creates a new, empty RIB.
    pub fn new() -> Self {
        Self::default()
    }

    // --- domain tree ---

    /// Registers a child router.
    pub fn add_child(&mut self, id: NodeId, addr: String) {
        self.children.insert(id, addr);
    }

    /// Registers an end-host member.
    pub fn add_member(&mut self, id: NodeId, addr: String) {
        self.members.insert(id, addr);
    }

    /// Removes `id` from the members if present, otherwise from the
    /// children. Unknown names are a silent no-op.
    pub fn remove_node(&mut self, id: &NodeId) {
        if self.members.remove(id).is_none() {
            self.children.remove(id);
        }
    }

    /// True when `id` names a registered child router.
    pub fn is_child(&self, id: &NodeId) -> bool {
        self.children.contains_key(id)
    }

    pub fn children(&self) -> &HashMap<NodeId, String> {
        &self.children
    }

    pub fn members(&self) -> &HashMap<NodeId, String> {
        &self.members
    }

    // --- multicast link state ---

    /// Records a pending join from `neighbor` for `group`.
    ///
    /// Idempotent: re-recording a neighbor refreshes its timestamp but never
    /// duplicates it. A neighbor already confirmed for the group is not
    /// re-added (promotion is one-directional).
    pub fn add_tentative(&mut self, group: &GroupId, neighbor: NodeIdentity) {
        if self.is_confirmed(group, &neighbor) {
            return;
        }
        self.tentative
            .entry(group.clone())
            .or_default()
            .insert(neighbor, Instant::now());
    }

    /// True when this router already holds a tentative or confirmed link for
    /// `group` from some neighbor other than `requester`.
    ///
    /// Excluding the requester keeps a re-sent upward join from looking like
    /// a second converging path.
    pub fn has_link_excluding(&self, group: &GroupId, requester: &NodeIdentity) -> bool {
        let tentative_other = self
            .tentative
            .get(group)
            .is_some_and(|set| set.keys().any(|n| n != requester));
        let confirmed_any = self.confirmed.get(group).is_some_and(|set| !set.is_empty());
        tentative_other || confirmed_any
    }

    /// True when `neighbor` is a confirmed link for `group`.
    pub fn is_confirmed(&self, group: &GroupId, neighbor: &NodeIdentity) -> bool {
        self.confirmed
            .get(group)
            .is_some_and(|set| set.contains(neighbor))
    }

    /// Promotes every tentative link for `group` to confirmed and returns
    /// the promoted neighbors. The tentative set for the group is cleared.
    pub fn promote_tentative(&mut self, group: &GroupId) -> Vec<NodeIdentity> {
        let Some(pending) = self.tentative.remove(group) else {
            return Vec::new();
        };
        let confirmed = self.confirmed.entry(group.clone()).or_default();
        let mut promoted = Vec::with_capacity(pending.len());
        for neighbor in pending.into_keys() {
            confirmed.insert(neighbor.clone());
            promoted.push(neighbor);
        }
        promoted
    }

    /// Confirmed links for `group`.
    pub fn confirmed_links(&self, group: &GroupId) -> impl Iterator<Item = &NodeIdentity> {
        self.confirmed.get(group).into_iter().flatten()
    }

    /// Tentative link count for `group`.
    pub fn tentative_count(&self, group: &GroupId) -> usize {
        self.tentative.get(group).map_or(0, |set| set.len())
    }

    // --- group membership ---

    /// Records a directly attached member interested in `group`.
    pub fn add_group_member(&mut self, group: &GroupId, member: NodeIdentity) {
        self.group_members
            .entry(group.clone())
            .or_default()
            .insert(member);
    }

    /// Directly attached members subscribed to `group`.
    pub fn group_members(&self, group: &GroupId) -> impl Iterator<Item = &NodeIdentity> {
        self.group_members.get(group).into_iter().flatten()
    }

    // --- parent link ---

    /// Marks the upward link as part of the confirmed tree for `group`.
    pub fn confirm_parent(&mut self, group: &GroupId) {
        self.parent_confirmed.insert(group.clone());
    }

    /// True when the upward link carries traffic for `group`.
    pub fn is_parent_confirmed(&self, group: &GroupId) -> bool {
        self.parent_confirmed.contains(group)
    }

    // --- maintenance ---

    /// Drops tentative links older than `ttl` across all groups, returning
    /// the number of entries removed.
    ///
    /// A join that never converges would otherwise pin its tentative entry
    /// forever; the sweep runs from the dispatch loop on a fixed interval.
    pub fn sweep_tentative(&mut self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.tentative.retain(|_, pending| {
            pending.retain(|_, recorded| {
                let expired = now.duration_since(*recorded) > ttl;
                if expired {
                    removed += 1;
                }
                !expired
            });
            !pending.is_empty()
        });
        removed
    }
}
