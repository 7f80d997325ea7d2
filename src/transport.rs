// SPDX-License-Identifier: EUPL-1.2-or-later
// Copyright © 2026-present Arbor Contributors

//! Transport layer
//!
//! The core never opens a socket on its own: handlers produce addressed
//! [`Outbound`](crate::message::Outbound) envelopes and this module delivers
//! them. [`UdpTransport`] carries postcard-encoded messages as UDP datagrams
//! and feeds decoded inbound messages into the mailbox. Loss, retransmission,
//! and wire authentication are out of scope here.

use crate::dispatch::Mailbox;
use crate::error::TransportError;
use crate::message::Message;
use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Delivers an encoded message to a remote locator.
///
/// Implementations must be callable from the dispatch loop; the dispatch
/// loop never hands them the empty (discard) destination.
pub trait Transport: Send + Sync {
    fn deliver(&self, dest: &str, message: &Message) -> Result<(), TransportError>;
}

/// UDP datagram transport.
pub struct UdpTransport {
    socket: Arc<Mutex<Option<UdpSocket>>>,
    max_buffer_size: usize,
}

impl UdpTransport {
    pub fn new() -> Self {
        Self {
            socket: Arc::new(Mutex::new(None)),
            max_buffer_size: 65536,
        }
    }

    /// Binds the transport to a local UDP address.
    pub fn bind(&self, addr: &str) -> Result<(), TransportError> {
        let socket = UdpSocket::bind(addr)
            .map_err(|e| TransportError::BindFailed(format!("{}: {}", addr, e)))?;

        // Short read timeout keeps the receive loop responsive to shutdown.
        socket
            .set_read_timeout(Some(Duration::from_millis(100)))
            .map_err(|e| TransportError::BindFailed(format!("set read timeout: {}", e)))?;

        let mut guard = self.socket.lock().expect("socket mutex poisoned");
        *guard = Some(socket);
        Ok(())
    }

    /// Returns the bound local address.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        let guard = self.socket.lock().expect("socket mutex poisoned");
        let socket = guard.as_ref().ok_or(TransportError::NotBound)?;
        socket
            .local_addr()
            .map_err(|e| TransportError::ReceiveFailed(e.to_string()))
    }

    fn send_to(&self, data: &[u8], dest: &str) -> Result<usize, TransportError> {
        let guard = self.socket.lock().expect("socket mutex poisoned");
        let socket = guard.as_ref().ok_or(TransportError::NotBound)?;

        let dest: SocketAddr = dest
            .parse()
            .map_err(|e| TransportError::InvalidAddress(format!("{}: {}", dest, e)))?;

        socket
            .send_to(data, dest)
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }

    /// Receives one datagram if available within the read timeout.
    fn recv_from(&self) -> Result<Option<(Vec<u8>, SocketAddr)>, TransportError> {
        let guard = self.socket.lock().expect("socket mutex poisoned");
        let socket = guard.as_ref().ok_or(TransportError::NotBound)?;

        let mut buffer = vec![0u8; self.max_buffer_size];
        match socket.recv_from(&mut buffer) {
            Ok((size, src)) => {
                buffer.truncate(size);
                Ok(Some((buffer, src)))
            }
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                Ok(None)
            }
            Err(e) => Err(TransportError::ReceiveFailed(e.to_string())),
        }
    }

    /// Spawns the inbound receive loop: decode datagrams, enqueue them into
    /// the mailbox, drop what does not decode.
    ///
    /// A datagram failing structural decoding is logged and discarded; only
    /// that one message is lost, router state is untouched.
    pub fn spawn_receiver(
        transport: Arc<UdpTransport>,
        mailbox: Mailbox,
        mut shutdown: mpsc::Receiver<()>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::task::spawn_blocking(move || {
            loop {
                match shutdown.try_recv() {
                    Err(mpsc::error::TryRecvError::Empty) => {}
                    _ => {
                        debug!("transport receive loop shutting down");
                        break;
                    }
                }
                match transport.recv_from() {
                    Ok(Some((data, src))) => match Message::decode(&data) {
                        Ok(msg) => {
                            debug!(kind = %msg.kind(), %src, "received message");
                            mailbox.push(msg);
                        }
                        Err(e) => {
                            warn!(%src, error = %e, "dropping undecodable datagram");
                        }
                    },
                    Ok(None) => {}
                    Err(e) => {
                        warn!(error = %e, "receive failed");
                    }
                }
            }
        })
    }
}

impl Default for UdpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UdpTransport {
    fn deliver(&self, dest: &str, message: &Message) -> Result<(), TransportError> {
        let data = message.encode()?;
        self.send_to(&data, dest)?;
        Ok(())
    }
}

impl std::fmt::Debug for UdpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UdpTransport")
            .field("max_buffer_size", &self.max_buffer_size)
            .field(
                "bound",
                &self.socket.lock().expect("socket mutex poisoned").is_some(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::NodeId;

    #[test]
    fn test_bind_and_local_addr() {
        let transport = UdpTransport::new();
        transport.bind("127.0.0.1:0").unwrap();
        assert!(transport.local_addr().is_ok());
    }

    #[test]
    fn test_unbound_send_fails() {
        let transport = UdpTransport::new();
        let msg = Message::LeaveDomain {
            id: NodeId::from("leaf-1"),
        };
        assert!(matches!(
            transport.deliver("127.0.0.1:9000", &msg),
            Err(TransportError::NotBound)
        ));
    }

    #[test]
    fn test_deliver_and_receive() {
        let sender = UdpTransport::new();
        let receiver = UdpTransport::new();
        sender.bind("127.0.0.1:0").unwrap();
        receiver.bind("127.0.0.1:0").unwrap();

        let msg = Message::LeaveDomain {
            id: NodeId::from("leaf-1"),
        };
        sender
            .deliver(&receiver.local_addr().unwrap().to_string(), &msg)
            .unwrap();

        std::thread::sleep(Duration::from_millis(50));
        let (data, src) = receiver.recv_from().unwrap().expect("datagram expected");
        assert_eq!(Message::decode(&data).unwrap(), msg);
        assert_eq!(src, sender.local_addr().unwrap());
    }

    #[test]
    fn test_recv_timeout_yields_none() {
        let transport = UdpTransport::new();
        transport.bind("127.0.0.1:0").unwrap();
        assert!(transport.recv_from().unwrap().is_none());
    }

    #[test]
    fn test_invalid_destination() {
        let transport = UdpTransport::new();
        transport.bind("127.0.0.1:0").unwrap();
        let msg = Message::LeaveDomain {
            id: NodeId::from("leaf-1"),
        };
        assert!(matches!(
            transport.deliver("not-an-address", &msg),
            Err(TransportError::InvalidAddress(_))
        ));
    }
}
