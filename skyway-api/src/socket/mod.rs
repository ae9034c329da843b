//! Socket.IO client for the flight service's push notifications.

pub mod client;
pub mod event;
pub mod packet;
pub mod refresh;
pub mod transport;

pub use client::{ConnectionState, SocketClient, SocketIdentity, SocketSettings};
pub use event::ServerEvent;
pub use refresh::RefreshTarget;
pub use transport::{Connector, Transport, WsConnector};

use packet::PacketError;

#[derive(Debug, thiserror::Error)]
pub enum SocketError {
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error(transparent)]
    Packet(#[from] PacketError),
    #[error("Invalid payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Connection failed: {0}")]
    Connect(String),
    #[error("Handshake failed: {0}")]
    Handshake(String),
    #[error("Connection refused by server: {0}")]
    Rejected(String),
    #[error("Socket client has stopped")]
    Closed,
}
