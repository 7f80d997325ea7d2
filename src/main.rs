// SPDX-License-Identifier: EUPL-1.2-or-later
// Copyright © 2026-present Arbor Contributors

use arbor::{
    CliArgs, Mailbox, NodeIdentity, Router, RouterActor, RouterConfig, UdpTransport,
};
use clap::Parser;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = CliArgs::parse();
    let config = match RouterConfig::resolve(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let transport = Arc::new(UdpTransport::new());
    if let Err(e) = transport.bind(&config.bind) {
        error!(error = %e, bind = %config.bind, "failed to bind transport");
        std::process::exit(1);
    }

    let local_addr = match transport.local_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "transport reports no local address");
            std::process::exit(1);
        }
    };

    let identity = NodeIdentity::new(local_addr.to_string(), config.name.clone());
    let parent = config.parent_identity();
    match &parent {
        Some(p) => info!(router = %identity, parent = %p, "starting router"),
        None => info!(router = %identity, "starting router as domain root"),
    }
    info!(drain_order = %config.drain_order, "mailbox drain order");

    let mailbox = Mailbox::new(config.drain_order);
    let (recv_shutdown_tx, recv_shutdown_rx) = mpsc::channel(1);
    let receiver =
        UdpTransport::spawn_receiver(transport.clone(), mailbox.clone(), recv_shutdown_rx);

    let router = Router::new(identity, parent);
    let actor = RouterActor::new(router, mailbox, transport, config.sweep_config());
    let (actor_shutdown_tx, actor_shutdown_rx) = mpsc::channel(1);
    let dispatch = tokio::spawn(actor.run(actor_shutdown_rx));

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutting down");

    let _ = actor_shutdown_tx.send(()).await;
    let _ = recv_shutdown_tx.send(()).await;
    let _ = dispatch.await;
    let _ = receiver.await;
}
