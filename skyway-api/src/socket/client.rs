use serde_json::json;
use skyway_core::Role;
use skyway_shared::models::{FlightRoom, RoomJoin};
use skyway_shared::Masked;
use skyway_store::app_config::SocketConfig;
use skyway_store::Session;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::packet::{EnginePacket, Handshake, SocketPacket};
use super::transport::{engine_url, Connector, Transport};
use super::{ServerEvent, SocketError};

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct SocketSettings {
    pub url: String,
    /// Reconnection attempts after a lost or failed connection.
    pub reconnect_attempts: u32,
    pub reconnect_delay: Duration,
}

impl From<&SocketConfig> for SocketSettings {
    fn from(config: &SocketConfig) -> Self {
        Self {
            url: config.url.clone(),
            reconnect_attempts: config.reconnect_attempts,
            reconnect_delay: config.reconnect_delay(),
        }
    }
}

/// Who the socket connects as.
#[derive(Debug, Clone)]
pub struct SocketIdentity {
    pub token: Masked<String>,
    pub user_id: i64,
    pub role: Role,
}

impl SocketIdentity {
    pub fn from_session(session: &Session) -> Self {
        Self {
            token: session.token.clone(),
            user_id: session.user.user_id,
            role: session.user.role,
        }
    }
}

/// Room every role joins on connect.
pub fn role_room_event(role: Role) -> &'static str {
    match role {
        Role::Administrator => "join_admin_room",
        Role::Manager => "join_manager_room",
        Role::User => "join_user_room",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    Disconnected,
    /// Reconnection attempts exhausted or the server refused the connection.
    Failed,
}

#[derive(Debug)]
enum Command {
    JoinFlight(i64),
    LeaveFlight(i64),
    Shutdown,
}

/// Handle to the background task that owns the Socket.IO connection.
///
/// Server events are fanned out to every [`SocketClient::subscribe`]r.
/// Flight rooms joined through this handle are re-joined after each
/// reconnect.
pub struct SocketClient {
    commands: mpsc::Sender<Command>,
    events: broadcast::Sender<ServerEvent>,
    state: watch::Receiver<ConnectionState>,
    task: JoinHandle<()>,
}

impl SocketClient {
    pub fn connect(
        connector: Arc<dyn Connector>,
        settings: SocketSettings,
        identity: SocketIdentity,
    ) -> Self {
        let (commands, command_rx) = mpsc::channel(32);
        let (events, _) = broadcast::channel(100);
        let (state_tx, state) = watch::channel(ConnectionState::Connecting);

        let worker = Worker {
            connector,
            settings,
            identity,
            commands: command_rx,
            events: events.clone(),
            state: state_tx,
            flight_rooms: BTreeSet::new(),
        };
        let task = tokio::spawn(worker.run());

        Self {
            commands,
            events,
            state,
            task,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn state_changes(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }

    pub async fn join_flight_room(&self, flight_id: i64) -> Result<(), SocketError> {
        self.command(Command::JoinFlight(flight_id)).await
    }

    pub async fn leave_flight_room(&self, flight_id: i64) -> Result<(), SocketError> {
        self.command(Command::LeaveFlight(flight_id)).await
    }

    /// Close the connection and wait for the background task to finish.
    pub async fn disconnect(self) {
        let _ = self.commands.send(Command::Shutdown).await;
        if let Err(e) = self.task.await {
            warn!("Socket task ended abnormally: {}", e);
        }
    }

    async fn command(&self, command: Command) -> Result<(), SocketError> {
        self.commands.send(command).await.map_err(|_| SocketError::Closed)
    }
}

enum SessionEnd {
    Shutdown,
    Lost { established: bool, reason: String },
    Rejected(String),
}

struct Worker {
    connector: Arc<dyn Connector>,
    settings: SocketSettings,
    identity: SocketIdentity,
    commands: mpsc::Receiver<Command>,
    events: broadcast::Sender<ServerEvent>,
    state: watch::Sender<ConnectionState>,
    flight_rooms: BTreeSet<i64>,
}

impl Worker {
    async fn run(mut self) {
        let url = engine_url(&self.settings.url);
        let mut attempt = 0;

        loop {
            match self.connector.connect(&url).await {
                Ok(transport) => match self.session(transport).await {
                    SessionEnd::Shutdown => {
                        info!("Socket disconnected");
                        self.set_state(ConnectionState::Disconnected);
                        return;
                    }
                    SessionEnd::Rejected(reason) => {
                        error!("Socket connection refused: {}", reason);
                        self.set_state(ConnectionState::Failed);
                        return;
                    }
                    SessionEnd::Lost { established, reason } => {
                        warn!("Socket connection lost: {}", reason);
                        if established {
                            attempt = 0;
                        }
                    }
                },
                Err(e) => warn!("Socket connection to {} failed: {}", url, e),
            }

            if attempt >= self.settings.reconnect_attempts {
                error!("Giving up on socket after {} reconnection attempts", attempt);
                self.set_state(ConnectionState::Failed);
                return;
            }
            attempt += 1;
            self.set_state(ConnectionState::Reconnecting { attempt });

            if !self.wait(self.settings.reconnect_delay).await {
                self.set_state(ConnectionState::Disconnected);
                return;
            }
        }
    }

    async fn session(&mut self, mut transport: Box<dyn Transport>) -> SessionEnd {
        let handshake = self.handshake(transport.as_mut());
        let handshake = match tokio::time::timeout(HANDSHAKE_TIMEOUT, handshake).await {
            Ok(Ok(handshake)) => handshake,
            Ok(Err(SocketError::Rejected(reason))) => return SessionEnd::Rejected(reason),
            Ok(Err(e)) => {
                return SessionEnd::Lost {
                    established: false,
                    reason: e.to_string(),
                }
            }
            Err(_) => {
                return SessionEnd::Lost {
                    established: false,
                    reason: "handshake timed out".to_string(),
                }
            }
        };

        info!("Socket connected (sid {})", handshake.sid);
        self.set_state(ConnectionState::Connected);

        match self.pump(transport.as_mut(), &handshake).await {
            Ok(end) => end,
            Err(e) => SessionEnd::Lost {
                established: true,
                reason: e.to_string(),
            },
        }
    }

    /// Engine open, Socket.IO connect with the token, then room joins.
    async fn handshake(
        &mut self,
        transport: &mut dyn Transport,
    ) -> Result<Handshake, SocketError> {
        let handshake = match next_engine_packet(transport).await? {
            EnginePacket::Open(handshake) => handshake,
            other => {
                return Err(SocketError::Handshake(format!(
                    "expected open packet, got {:?}",
                    other
                )))
            }
        };

        let auth = json!({ "token": self.identity.token.expose() });
        transport.send(SocketPacket::Connect(Some(auth)).to_frame()).await?;

        loop {
            match next_engine_packet(transport).await? {
                EnginePacket::Ping => transport.send(EnginePacket::Pong.encode()).await?,
                EnginePacket::Close => {
                    return Err(SocketError::Handshake("closed during connect".to_string()))
                }
                EnginePacket::Message(payload) => match SocketPacket::decode(&payload)? {
                    SocketPacket::Connect(_) => break,
                    SocketPacket::ConnectError(data) => {
                        let reason = data
                            .get("message")
                            .and_then(|m| m.as_str())
                            .map(str::to_string)
                            .unwrap_or_else(|| data.to_string());
                        return Err(SocketError::Rejected(reason));
                    }
                    other => debug!("Ignoring {:?} before connect", other),
                },
                _ => {}
            }
        }

        let join = RoomJoin {
            user_id: self.identity.user_id,
            role: self.identity.role.as_str().to_string(),
        };
        emit(transport, role_room_event(self.identity.role), serde_json::to_value(&join)?).await?;

        for flight_id in self.flight_rooms.clone() {
            let room = serde_json::to_value(FlightRoom { flight_id })?;
            emit(transport, "join_flight_room", room).await?;
        }

        Ok(handshake)
    }

    async fn pump(
        &mut self,
        transport: &mut dyn Transport,
        handshake: &Handshake,
    ) -> Result<SessionEnd, SocketError> {
        // the server pings every interval; silence beyond interval + timeout means a dead link
        let liveness = Duration::from_millis(handshake.ping_interval + handshake.ping_timeout);

        loop {
            tokio::select! {
                frame = tokio::time::timeout(liveness, transport.recv()) => {
                    let frame = match frame {
                        Ok(frame) => frame?,
                        Err(_) => return Ok(lost("ping timeout")),
                    };
                    let Some(frame) = frame else {
                        return Ok(lost("connection closed"));
                    };

                    match EnginePacket::decode(&frame) {
                        Ok(EnginePacket::Ping) => {
                            transport.send(EnginePacket::Pong.encode()).await?
                        }
                        Ok(EnginePacket::Close) => {
                            return Ok(lost("server closed the connection"))
                        }
                        Ok(EnginePacket::Message(payload)) => {
                            if let Some(end) = self.dispatch(&payload) {
                                return Ok(end);
                            }
                        }
                        Ok(_) => {}
                        Err(e) => warn!("Dropping bad frame {:?}: {}", frame, e),
                    }
                }
                command = self.commands.recv() => match command {
                    Some(Command::JoinFlight(flight_id)) => {
                        self.flight_rooms.insert(flight_id);
                        let room = serde_json::to_value(FlightRoom { flight_id })?;
                        emit(transport, "join_flight_room", room).await?;
                    }
                    Some(Command::LeaveFlight(flight_id)) => {
                        self.flight_rooms.remove(&flight_id);
                        let room = serde_json::to_value(FlightRoom { flight_id })?;
                        emit(transport, "leave_flight_room", room).await?;
                    }
                    Some(Command::Shutdown) | None => {
                        let _ = transport.send(SocketPacket::Disconnect.to_frame()).await;
                        let _ = transport.close().await;
                        return Ok(SessionEnd::Shutdown);
                    }
                },
            }
        }
    }

    fn dispatch(&mut self, payload: &str) -> Option<SessionEnd> {
        match SocketPacket::decode(payload) {
            Ok(SocketPacket::Event { name, data, .. }) => {
                let event = ServerEvent::from_wire(&name, data);
                debug!("Socket event {}", event.name());
                // no subscribers is fine
                let _ = self.events.send(event);
                None
            }
            Ok(SocketPacket::Disconnect) => {
                info!("Server closed the socket session");
                Some(SessionEnd::Shutdown)
            }
            Ok(other) => {
                debug!("Ignoring socket packet {:?}", other);
                None
            }
            Err(e) => {
                warn!("Dropping bad socket packet {:?}: {}", payload, e);
                None
            }
        }
    }

    /// Sleep out the reconnect delay while still taking commands.
    /// Returns false when asked to shut down.
    async fn wait(&mut self, delay: Duration) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);
        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                command = self.commands.recv() => match command {
                    Some(Command::JoinFlight(flight_id)) => {
                        self.flight_rooms.insert(flight_id);
                    }
                    Some(Command::LeaveFlight(flight_id)) => {
                        self.flight_rooms.remove(&flight_id);
                    }
                    Some(Command::Shutdown) | None => return false,
                },
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state.send_replace(state);
    }
}

fn lost(reason: &str) -> SessionEnd {
    SessionEnd::Lost {
        established: true,
        reason: reason.to_string(),
    }
}

async fn next_engine_packet(transport: &mut dyn Transport) -> Result<EnginePacket, SocketError> {
    let frame = transport
        .recv()
        .await?
        .ok_or_else(|| SocketError::Handshake("connection closed".to_string()))?;
    Ok(EnginePacket::decode(&frame)?)
}

async fn emit(
    transport: &mut dyn Transport,
    name: &str,
    data: serde_json::Value,
) -> Result<(), SocketError> {
    debug!("Socket emit {}", name);
    transport.send(SocketPacket::event(name, data).to_frame()).await
}
