mod handle;
mod session;
mod tombstones;

pub use handle::{OrchestratorCommand, OrchestratorHandle};
pub use session::{SessionState, SessionView};

use crate::media::{LocalStream, RemoteStream};
use crate::negotiation::{
    NegotiationFactory, NegotiationRole, SessionEvent, SessionEventKind, SessionEventSender,
    SessionSpec,
};
use crate::transport::SignalingTransport;
use huddle_core::{ClientEvent, ConnectionId, Nickname, PresenceNotice, ServerEvent, SignalPayload};
use session::PeerSession;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tombstones::Tombstones;
use tracing::{debug, info, warn};

const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// How many torn-down remotes are remembered for dropping late envelopes.
pub const CLOSED_SESSION_MEMORY: usize = 256;

/// Client-side actor that keeps one media session per remote participant.
///
/// Every method runs on the orchestrator's own task (see [`PeerOrchestrator::run`]),
/// so the session map is never touched concurrently. Relay events, session
/// events and UI commands are applied strictly one after another.
pub struct PeerOrchestrator {
    self_id: Option<ConnectionId>,
    sessions: HashMap<ConnectionId, PeerSession>,
    /// Remotes whose session was torn down; anything they still send is dropped.
    closed: Tombstones,
    local_stream: Option<LocalStream>,
    factory: Arc<dyn NegotiationFactory>,
    transport: Arc<dyn SignalingTransport>,
    events_tx: SessionEventSender,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    snapshot_tx: watch::Sender<Vec<SessionView>>,
}

impl PeerOrchestrator {
    pub fn new(factory: Arc<dyn NegotiationFactory>, transport: Arc<dyn SignalingTransport>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(Vec::new());

        Self {
            self_id: None,
            sessions: HashMap::new(),
            closed: Tombstones::with_capacity(CLOSED_SESSION_MEMORY),
            local_stream: None,
            factory,
            transport,
            events_tx,
            events_rx,
            snapshot_tx,
        }
    }

    pub fn self_id(&self) -> Option<ConnectionId> {
        self.self_id
    }

    pub fn current_sessions(&self) -> Vec<SessionView> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<SessionView>> {
        self.snapshot_tx.subscribe()
    }

    /// `None` means no session was ever opened for `remote`.
    pub fn session_state(&self, remote: &ConnectionId) -> Option<SessionState> {
        match self.sessions.get(remote) {
            Some(session) => Some(session.state),
            None if self.closed.contains(remote) => Some(SessionState::Closed),
            None => None,
        }
    }

    pub fn local_stream(&self) -> Option<&LocalStream> {
        self.local_stream.as_ref()
    }

    /// Spawns [`PeerOrchestrator::run`] and returns the handle driving it.
    pub fn spawn(self, relay_rx: mpsc::UnboundedReceiver<ServerEvent>) -> OrchestratorHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let handle = OrchestratorHandle::new(command_tx, self.subscribe());
        tokio::spawn(self.run(relay_rx, command_rx));
        handle
    }

    pub async fn run(
        mut self,
        mut relay_rx: mpsc::UnboundedReceiver<ServerEvent>,
        mut command_rx: mpsc::Receiver<OrchestratorCommand>,
    ) {
        info!("Peer orchestrator started");

        loop {
            tokio::select! {
                event = relay_rx.recv() => {
                    match event {
                        Some(e) => self.handle_server_event(e).await,
                        None => {
                            info!("Relay channel closed. Stopping orchestrator.");
                            break;
                        }
                    }
                }

                event = self.events_rx.recv() => {
                    // The sender lives in `self`, so the channel never closes here.
                    if let Some(e) = event {
                        self.handle_session_event(e).await;
                    }
                }

                cmd = command_rx.recv() => {
                    match cmd {
                        Some(OrchestratorCommand::Shutdown) | None => break,
                        Some(c) => self.handle_command(c).await,
                    }
                }
            }
        }

        self.shutdown().await;
        info!("Peer orchestrator finished");
    }

    async fn handle_command(&mut self, cmd: OrchestratorCommand) {
        match cmd {
            OrchestratorCommand::SetLocalStream(stream) => self.set_local_stream(stream).await,
            OrchestratorCommand::ClearLocalStream => self.clear_local_stream().await,
            OrchestratorCommand::CloseSession(remote) => self.close_session(&remote).await,
            OrchestratorCommand::Shutdown => self.shutdown().await,
        }
    }

    /// Applies one event received from the relay.
    pub async fn handle_server_event(&mut self, event: ServerEvent) {
        match event.into_signal() {
            Ok((from, payload)) => self.route_signal(from, payload).await,
            Err(ServerEvent::Welcome { identifier, .. }) => {
                info!("Relay assigned identifier {}", identifier);
                self.self_id = Some(identifier);
            }
            Err(ServerEvent::UserJoined(notice)) => self.on_user_joined(notice).await,
            Err(ServerEvent::UserLeft(notice)) => self.on_user_left(notice).await,
            Err(ServerEvent::NicknameChanged {
                old_nickname,
                new_nickname,
            }) => self.on_nickname_changed(&old_nickname, new_nickname),
            Err(other) => debug!("Orchestrator ignores {}", other.name()),
        }
    }

    async fn on_user_joined(&mut self, notice: PresenceNotice) {
        let remote = notice.identifier;
        if self.self_id == Some(remote) {
            return;
        }

        if let Some(session) = self.sessions.get_mut(&remote) {
            session.remote_nickname = notice.nickname;
            self.publish();
            return;
        }

        self.closed.remove(&remote);
        self.open_session(remote, notice.nickname, NegotiationRole::Initiator)
            .await;
    }

    async fn on_user_left(&mut self, notice: PresenceNotice) {
        let remote = if self.sessions.contains_key(&notice.identifier) {
            Some(notice.identifier)
        } else if self.closed.contains(&notice.identifier) {
            // Already torn down; the nickname may belong to someone else now.
            None
        } else {
            self.sessions
                .values()
                .find(|s| s.remote_nickname == notice.nickname)
                .map(|s| s.remote_id)
        };

        match remote {
            Some(remote) => {
                info!("{} left, closing session", notice.nickname);
                self.teardown(&remote).await;
            }
            None => {
                // Leaves before any session existed still block late envelopes.
                self.closed.insert(notice.identifier);
            }
        }
    }

    fn on_nickname_changed(&mut self, old_nickname: &Nickname, new_nickname: Nickname) {
        let mut changed = false;
        for session in self.sessions.values_mut() {
            if session.remote_nickname == *old_nickname {
                session.remote_nickname = new_nickname.clone();
                changed = true;
            }
        }
        if changed {
            self.publish();
        }
    }

    async fn route_signal(&mut self, from: ConnectionId, payload: SignalPayload) {
        if self.closed.contains(&from) {
            debug!("Dropping late {} from closed session {}", payload.kind(), from);
            return;
        }

        if !self.sessions.contains_key(&from) {
            if !matches!(payload, SignalPayload::Offer(_)) {
                debug!("Dropping {} from {}: no session", payload.kind(), from);
                return;
            }
            let placeholder = Nickname::placeholder_for(&from);
            if !self
                .open_session(from, placeholder, NegotiationRole::Responder)
                .await
            {
                return;
            }
        }

        let Some(session) = self.sessions.get(&from) else {
            return;
        };
        let kind = payload.kind();
        if let Err(e) = session.handle.apply_remote(payload).await {
            warn!("Failed to apply {} from {}: {}", kind, from, e);
            self.teardown(&from).await;
        }
    }

    /// Creates the session for `remote` unless one already exists.
    /// Returns whether a session is present afterwards.
    async fn open_session(
        &mut self,
        remote: ConnectionId,
        nickname: Nickname,
        role: NegotiationRole,
    ) -> bool {
        if self.sessions.contains_key(&remote) {
            return true;
        }

        let spec = SessionSpec {
            remote,
            role,
            local_stream: self.local_stream.clone(),
        };

        match self.factory.open(spec, self.events_tx.clone()).await {
            Ok(handle) => {
                info!("Opened {:?} session with {} ({})", role, nickname, remote);
                self.sessions.insert(
                    remote,
                    PeerSession {
                        remote_id: remote,
                        remote_nickname: nickname,
                        role,
                        state: SessionState::Negotiating,
                        handle,
                        stream: None,
                    },
                );
                self.publish();
                true
            }
            Err(e) => {
                warn!("Failed to open session with {}: {}", remote, e);
                false
            }
        }
    }

    /// Applies one event produced by a negotiation session.
    pub async fn handle_session_event(&mut self, event: SessionEvent) {
        let remote = event.remote;
        let Some(session) = self.sessions.get_mut(&remote) else {
            debug!("Dropping session event for {}: no session", remote);
            return;
        };

        match event.kind {
            SessionEventKind::Signal(payload) => {
                let kind = payload.kind();
                if let Err(e) = self.transport.send(ClientEvent::signal(remote, payload)) {
                    warn!("Failed to send {} to {}: {}", kind, remote, e);
                }
            }

            SessionEventKind::RemoteTrack { stream_id, track } => {
                let stream = session
                    .stream
                    .get_or_insert_with(|| RemoteStream::new(stream_id.clone()));
                if stream.id != stream_id {
                    *stream = RemoteStream::new(stream_id);
                }
                stream.add_track(track);
                session.state = SessionState::Connected;
                self.publish();
            }

            SessionEventKind::RemoteTrackEnded { track_id } => {
                let Some(stream) = session.stream.as_mut() else {
                    return;
                };
                if !stream.remove_track(&track_id) {
                    return;
                }
                debug!("Remote track {} from {} ended", track_id, remote);
                if stream.is_empty() {
                    session.stream = None;
                }
                self.publish();
            }

            SessionEventKind::Connected => {
                if session.state != SessionState::Connected {
                    session.state = SessionState::Connected;
                    self.publish();
                }
            }

            SessionEventKind::Failed(reason) => {
                warn!("Session with {} failed: {}", remote, reason);
                self.teardown(&remote).await;
            }

            SessionEventKind::Closed => {
                debug!("Session with {} closed by the engine", remote);
                self.teardown(&remote).await;
            }
        }
    }

    /// Applies every session event already queued. Returns how many were handled.
    pub async fn drain_session_events(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_session_event(event).await;
            handled += 1;
        }
        handled
    }

    /// Hands the local media over to every session, current and future.
    pub async fn set_local_stream(&mut self, stream: LocalStream) {
        if let Some(previous) = self.local_stream.take() {
            for track in previous.tracks() {
                if !stream.has_track(track.id()) {
                    track.stop();
                }
            }
        }

        info!("Local stream {} set", stream.id());
        self.local_stream = Some(stream);
        self.push_local_stream().await;
    }

    /// Stops the local tracks and detaches them from every session.
    pub async fn clear_local_stream(&mut self) {
        let Some(stream) = self.local_stream.take() else {
            return;
        };

        stream.stop();
        info!("Local stream {} cleared", stream.id());
        self.push_local_stream().await;
    }

    async fn push_local_stream(&mut self) {
        let mut failed = Vec::new();
        for (remote, session) in &self.sessions {
            if let Err(e) = session
                .handle
                .replace_local_stream(self.local_stream.as_ref())
                .await
            {
                warn!("Failed to update local tracks for {}: {}", remote, e);
                failed.push(*remote);
            }
        }
        for remote in failed {
            self.teardown(&remote).await;
        }
    }

    pub async fn close_session(&mut self, remote: &ConnectionId) {
        self.teardown(remote).await;
    }

    /// Closes every session. The local stream is left to its owner.
    pub async fn shutdown(&mut self) {
        let remotes: Vec<_> = self.sessions.keys().copied().collect();
        for remote in remotes {
            self.teardown(&remote).await;
        }
    }

    async fn teardown(&mut self, remote: &ConnectionId) {
        self.closed.insert(*remote);
        let Some(session) = self.sessions.remove(remote) else {
            return;
        };

        session.handle.close().await;
        info!(
            "Closed session with {} ({})",
            session.remote_nickname, remote
        );
        self.publish();
    }

    fn publish(&self) {
        let mut views: Vec<SessionView> = self.sessions.values().map(PeerSession::view).collect();
        views.sort_by_key(|v| v.remote_id);
        self.snapshot_tx.send_replace(views);
    }
}
