// SPDX-License-Identifier: EUPL-1.2-or-later
// Copyright © 2026-present Arbor Contributors

//! Integration test: mailbox drain order is observable protocol behavior
//!
//! A join and a send enqueued back-to-back are processed in opposite orders
//! under LIFO and FIFO draining. Under the default LIFO discipline the send
//! runs first and finds no subscriber; under FIFO the join lands first and
//! the send fans out. This pins the configuration contract: changing the
//! drain order changes causal interleavings.

use arbor::{
    Direction, DrainOrder, GroupId, Mailbox, Message, NodeIdentity, Outbound, Router, RouterActor,
    SweepConfig, Transport, TransportError,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

struct CollectingTransport {
    delivered: Mutex<Vec<Outbound>>,
}

impl CollectingTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            delivered: Mutex::new(Vec::new()),
        })
    }

    fn count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

impl Transport for CollectingTransport {
    fn deliver(&self, dest: &str, message: &Message) -> Result<(), TransportError> {
        self.delivered
            .lock()
            .unwrap()
            .push(Outbound::new(dest, message.clone()));
        Ok(())
    }
}

async fn run_scenario(order: DrainOrder) -> usize {
    let router = Router::new(NodeIdentity::new("127.0.0.1:9000", "root"), None);
    let mailbox = Mailbox::new(order);
    let transport = CollectingTransport::new();
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

    // Enqueue both messages before the dispatch loop starts, so the drain
    // order alone decides which handler runs first.
    let member = NodeIdentity::new("127.0.0.1:9100", "member-1");
    let group = GroupId::from("g1");
    mailbox.push(Message::JoinGroup {
        addr: member.addr.clone(),
        id: member.id.clone(),
        group: group.clone(),
        direction: Direction::Up,
    });
    mailbox.push(Message::SendGroup {
        addr: "127.0.0.1:9200".to_string(),
        id: "publisher".into(),
        group,
        content: b"tick".to_vec(),
    });

    let actor = RouterActor::new(router, mailbox, transport.clone(), SweepConfig::default());
    let task = tokio::spawn(actor.run(shutdown_rx));

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown_tx.send(()).await.unwrap();
    task.await.unwrap();

    transport.count()
}

#[tokio::test]
async fn test_lifo_processes_send_before_join() {
    // Send drains first, no subscriber yet: nothing is delivered.
    assert_eq!(run_scenario(DrainOrder::Lifo).await, 0);
}

#[tokio::test]
async fn test_fifo_processes_join_before_send() {
    // Join drains first, so the send reaches the freshly recorded member.
    assert_eq!(run_scenario(DrainOrder::Fifo).await, 1);
}
