// SPDX-License-Identifier: EUPL-1.2-or-later
// Copyright © 2026-present Arbor Contributors

//! Inbound mailbox and dispatch loop
//!
//! The transport enqueues decoded messages into a [`Mailbox`]; the
//! [`RouterActor`] drains it one message at a time, running each handler to
//! completion before the next dequeue. That single-drainer discipline is the
//! concurrency contract the RIB relies on.
//!
//! Drain order is **most-recently-enqueued-first by default**. This stack
//! discipline is deliberate, inherited protocol behavior: a join interleaved
//! with a following send may be observed in either order, and switching to
//! arrival order changes those causal interleavings. FIFO draining is
//! available, but only through the explicit `drain_order` configuration flag.

use crate::message::Message;
use crate::router::Router;
use crate::transport::Transport;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tracing::{debug, warn};

/// Order in which the dispatch loop drains the mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrainOrder {
    /// Most-recently-enqueued-first (the default, inherited discipline).
    Lifo,
    /// Arrival order.
    Fifo,
}

impl Default for DrainOrder {
    fn default() -> Self {
        DrainOrder::Lifo
    }
}

impl fmt::Display for DrainOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrainOrder::Lifo => write!(f, "lifo"),
            DrainOrder::Fifo => write!(f, "fifo"),
        }
    }
}

impl std::str::FromStr for DrainOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lifo" => Ok(DrainOrder::Lifo),
            "fifo" => Ok(DrainOrder::Fifo),
            _ => Err(format!("Invalid drain order: {}. Use 'lifo' or 'fifo'", s)),
        }
    }
}

struct MailboxInner {
    queue: Mutex<VecDeque<Message>>,
    notify: Notify,
    order: DrainOrder,
}

/// Concurrent-safe inbox shared between the transport receive loop and the
/// dispatch loop.
///
/// Insertion is safe from any task or thread; draining is expected from the
/// single dispatch loop.
#[derive(Clone)]
pub struct Mailbox {
    inner: Arc<MailboxInner>,
}

impl Mailbox {
    pub fn new(order: DrainOrder) -> Self {
        Self {
            inner: Arc::new(MailboxInner {
                queue: Mutex::new(VecDeque::new()),
                notify: Notify::new(),
                order,
            }),
        }
    }

    /// Enqueues an inbound message.
    pub fn push(&self, msg: Message) {
        self.inner
            .queue
            .lock()
            .expect("mailbox mutex poisoned")
            .push_back(msg);
        self.inner.notify.notify_one();
    }

    /// Removes the next message per the configured drain order, if any.
    pub fn try_pop(&self) -> Option<Message> {
        let mut queue = self.inner.queue.lock().expect("mailbox mutex poisoned");
        match self.inner.order {
            DrainOrder::Lifo => queue.pop_back(),
            DrainOrder::Fifo => queue.pop_front(),
        }
    }

    /// Waits for the next message.
    pub async fn recv(&self) -> Message {
        loop {
            // Register for wakeup before checking, so a push between the
            // check and the await is not lost.
            let notified = self.inner.notify.notified();
            if let Some(msg) = self.try_pop() {
                return msg;
            }
            notified.await;
        }
    }

    pub fn len(&self) -> usize {
        self.inner.queue.lock().expect("mailbox mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Expiry settings for tentative links.
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig {
    /// Tentative entries older than this are dropped; `None` disables expiry.
    pub tentative_ttl: Option<Duration>,
    /// How often the sweep runs.
    pub interval: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            tentative_ttl: Some(Duration::from_secs(300)),
            interval: Duration::from_secs(30),
        }
    }
}

/// Dispatch loop: drains the mailbox into the router's handler table and
/// hands the resulting outbound messages to the transport.
pub struct RouterActor {
    router: Router,
    mailbox: Mailbox,
    transport: Arc<dyn Transport>,
    sweep: SweepConfig,
}

impl RouterActor {
    pub fn new(
        router: Router,
        mailbox: Mailbox,
        transport: Arc<dyn Transport>,
        sweep: SweepConfig,
    ) -> Self {
        Self {
            router,
            mailbox,
            transport,
            sweep,
        }
    }

    /// Runs until the shutdown channel yields or closes.
    ///
    /// Handlers run strictly one at a time on this task; the periodic
    /// tentative-link sweep runs here too, so the RIB has exactly one writer.
    pub async fn run(mut self, mut shutdown: mpsc::Receiver<()>) {
        let mut sweep_timer = tokio::time::interval(self.sweep.interval);
        sweep_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    debug!(router = %self.router.identity().id, "dispatch loop shutting down");
                    break;
                }
                msg = self.mailbox.recv() => {
                    self.dispatch(msg);
                }
                _ = sweep_timer.tick() => {
                    if let Some(ttl) = self.sweep.tentative_ttl {
                        let removed = self.router.rib_mut().sweep_tentative(ttl);
                        if removed > 0 {
                            debug!(removed, "expired stale tentative links");
                        }
                    }
                }
            }
        }
    }

    fn dispatch(&mut self, msg: Message) {
        for out in self.router.handle(msg) {
            if out.is_discard() {
                continue;
            }
            if let Err(e) = self.transport.deliver(&out.dest, &out.message) {
                warn!(dest = %out.dest, error = %e, "failed to deliver outbound message");
            }
        }
    }
}
