use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

use super::SocketError;

/// One open text-frame connection.
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, frame: String) -> Result<(), SocketError>;
    /// `None` once the peer has closed the connection.
    async fn recv(&mut self) -> Result<Option<String>, SocketError>;
    async fn close(&mut self) -> Result<(), SocketError>;
}

/// Opens transports; called again for every reconnect attempt.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, SocketError>;
}

/// `ws://host:5001` (or `http://host:5001`) → the Engine.IO websocket endpoint.
pub fn engine_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/socket.io/?EIO=4&transport=websocket", base)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Transport>, SocketError> {
        let (stream, response) = tokio_tungstenite::connect_async(url).await?;
        debug!("WebSocket upgrade to {} returned {}", url, response.status());
        Ok(Box::new(WsTransport { stream }))
    }
}

pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, frame: String) -> Result<(), SocketError> {
        self.stream.send(Message::Text(frame)).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<String>, SocketError> {
        while let Some(message) = self.stream.next().await {
            match message? {
                Message::Text(text) => return Ok(Some(text)),
                Message::Close(_) => return Ok(None),
                // ping/pong at the websocket layer are answered by tungstenite
                _ => continue,
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.stream.close(None).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_url() {
        assert_eq!(
            engine_url("ws://localhost:5001"),
            "ws://localhost:5001/socket.io/?EIO=4&transport=websocket"
        );
        assert_eq!(
            engine_url("https://flights.example.com/"),
            "wss://flights.example.com/socket.io/?EIO=4&transport=websocket"
        );
    }
}
