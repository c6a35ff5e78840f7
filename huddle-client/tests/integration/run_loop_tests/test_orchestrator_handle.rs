use crate::integration::init_tracing;
use crate::utils::*;
use huddle_client::{ClientError, MediaTrack, PeerOrchestrator, SessionEventKind, SessionState, TrackKind};
use huddle_core::{ConnectionId, SignalKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

async fn eventually(check: impl Fn() -> bool) -> bool {
    let poll = async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    };
    timeout(WAIT, poll).await.is_ok()
}

#[tokio::test]
async fn test_handle_drives_running_orchestrator() -> anyhow::Result<()> {
    init_tracing();
    let factory = Arc::new(MockNegotiationFactory::new());
    let transport = Arc::new(MockTransport::new());
    let (relay_tx, relay_rx) = mpsc::unbounded_channel();
    let handle = PeerOrchestrator::new(factory.clone(), transport.clone()).spawn(relay_rx);
    let mut sessions = handle.subscribe();

    let me = ConnectionId::new();
    let bee = ConnectionId::new();
    relay_tx.send(welcome(me))?;
    relay_tx.send(joined(me, "Me"))?;
    relay_tx.send(joined(bee, "Bee"))?;

    timeout(WAIT, sessions.wait_for(|s| s.len() == 1)).await??;
    assert!(eventually(|| transport.signals_to(&bee) == vec![SignalKind::Offer]).await);

    factory.emit(bee, SessionEventKind::Connected);
    timeout(
        WAIT,
        sessions.wait_for(|s| s.first().is_some_and(|v| v.state == SessionState::Connected)),
    )
    .await??;

    let mic = MockTrack::new("mic", TrackKind::Audio);
    handle
        .set_local_stream(stream_of("cam", &[mic.clone()]))
        .await?;
    assert!(eventually(|| factory.stream_updates(&bee) == vec![Some("cam".to_owned())]).await);

    relay_tx.send(left(bee, "Bee"))?;
    timeout(WAIT, sessions.wait_for(|s| s.is_empty())).await??;
    assert_eq!(handle.current_sessions(), Vec::new());

    handle.shutdown().await?;
    let stopped = timeout(WAIT, async {
        loop {
            if let Err(ClientError::OrchestratorStopped) = handle.clear_local_stream().await {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(stopped.is_ok());
    assert!(!mic.is_stopped());
    Ok(())
}

#[tokio::test]
async fn test_relay_close_stops_orchestrator() -> anyhow::Result<()> {
    init_tracing();
    let factory = Arc::new(MockNegotiationFactory::new());
    let transport = Arc::new(MockTransport::new());
    let (relay_tx, relay_rx) = mpsc::unbounded_channel();
    let handle = PeerOrchestrator::new(factory.clone(), transport).spawn(relay_rx);
    let mut sessions = handle.subscribe();

    let bee = ConnectionId::new();
    relay_tx.send(joined(bee, "Bee"))?;
    timeout(WAIT, sessions.wait_for(|s| s.len() == 1)).await??;

    drop(relay_tx);

    // The session is closed on the way out and the snapshot sender goes away.
    let closed = timeout(WAIT, async {
        while sessions.changed().await.is_ok() {}
    })
    .await;
    assert!(closed.is_ok());
    assert_eq!(factory.closed(), vec![bee]);
    Ok(())
}
