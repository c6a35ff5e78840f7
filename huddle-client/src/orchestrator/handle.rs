use crate::error::ClientError;
use crate::media::LocalStream;
use crate::orchestrator::SessionView;
use huddle_core::ConnectionId;
use tokio::sync::{mpsc, watch};

#[derive(Debug)]
pub enum OrchestratorCommand {
    SetLocalStream(LocalStream),
    ClearLocalStream,
    CloseSession(ConnectionId),
    Shutdown,
}

/// UI-facing handle to a running [`PeerOrchestrator`](crate::PeerOrchestrator).
#[derive(Clone)]
pub struct OrchestratorHandle {
    commands: mpsc::Sender<OrchestratorCommand>,
    sessions: watch::Receiver<Vec<SessionView>>,
}

impl OrchestratorHandle {
    pub(crate) fn new(
        commands: mpsc::Sender<OrchestratorCommand>,
        sessions: watch::Receiver<Vec<SessionView>>,
    ) -> Self {
        Self { commands, sessions }
    }

    pub fn current_sessions(&self) -> Vec<SessionView> {
        self.sessions.borrow().clone()
    }

    /// A receiver that wakes on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<SessionView>> {
        self.sessions.clone()
    }

    pub async fn set_local_stream(&self, stream: LocalStream) -> Result<(), ClientError> {
        self.send(OrchestratorCommand::SetLocalStream(stream)).await
    }

    pub async fn clear_local_stream(&self) -> Result<(), ClientError> {
        self.send(OrchestratorCommand::ClearLocalStream).await
    }

    pub async fn close_session(&self, remote: ConnectionId) -> Result<(), ClientError> {
        self.send(OrchestratorCommand::CloseSession(remote)).await
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.send(OrchestratorCommand::Shutdown).await
    }

    async fn send(&self, command: OrchestratorCommand) -> Result<(), ClientError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ClientError::OrchestratorStopped)
    }
}
