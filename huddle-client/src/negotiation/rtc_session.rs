use super::rtc_track::codec_capability;
use crate::error::ClientError;
use crate::media::{LocalStream, RemoteTrack, TrackKind};
use crate::negotiation::{
    NegotiationFactory, NegotiationRole, NegotiationSession, RtcLocalTrack, SessionEvent,
    SessionEventKind, SessionEventSender, SessionSpec,
};
use async_trait::async_trait;
use huddle_core::{ConnectionId, IceCandidate, IceServerConfig, SessionDescription, SignalPayload};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use webrtc::api::API;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

const DATA_CHANNEL_LABEL: &str = "huddle";
const SLOT_STREAM_ID: &str = "huddle";

/// A remote track that delivers nothing for this long is reported as ended.
/// It is reported again once packets resume.
const REMOTE_TRACK_IDLE: Duration = Duration::from_secs(3);

/// Opens real peer connections with webrtc-rs.
pub struct RtcNegotiationFactory {
    api: API,
    ice_servers: Vec<IceServerConfig>,
}

impl RtcNegotiationFactory {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Result<Self, ClientError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        Ok(Self { api, ice_servers })
    }

    fn rtc_configuration(&self) -> RTCConfiguration {
        let ice_servers = self
            .ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
            })
            .collect();

        RTCConfiguration {
            ice_servers,
            ..Default::default()
        }
    }
}

#[async_trait]
impl NegotiationFactory for RtcNegotiationFactory {
    async fn open(
        &self,
        spec: SessionSpec,
        events: SessionEventSender,
    ) -> Result<Box<dyn NegotiationSession>, ClientError> {
        let peer_connection = Arc::new(self.api.new_peer_connection(self.rtc_configuration()).await?);
        install_callbacks(&peer_connection, spec.remote, &events);

        let mut slots = Vec::with_capacity(2);
        for kind in [TrackKind::Audio, TrackKind::Video] {
            slots.push(MediaSlot::open(&peer_connection, kind).await?);
        }

        let session = RtcSession {
            remote: spec.remote,
            peer_connection,
            events,
            slots,
            pending_candidates: Mutex::new(Vec::new()),
        };

        session.fill_slots(spec.local_stream.as_ref()).await?;

        if spec.role == NegotiationRole::Initiator {
            session
                .peer_connection
                .create_data_channel(DATA_CHANNEL_LABEL, None)
                .await?;
            session.send_offer().await?;
        }

        info!("Opened {:?} session with {}", spec.role, spec.remote);
        Ok(Box::new(session))
    }
}

fn install_callbacks(
    peer_connection: &Arc<RTCPeerConnection>,
    remote: ConnectionId,
    events: &SessionEventSender,
) {
    let ice_tx = events.clone();
    peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
        let tx = ice_tx.clone();

        Box::pin(async move {
            let Some(candidate) = c else { return };
            let Ok(init) = candidate.to_json() else {
                return;
            };
            let payload = SignalPayload::IceCandidate(IceCandidate {
                candidate: init.candidate,
                sdp_mid: init.sdp_mid,
                sdp_m_line_index: init.sdp_mline_index,
            });
            let _ = tx.send(SessionEvent::new(remote, SessionEventKind::Signal(payload)));
        })
    }));

    let state_tx = events.clone();
    peer_connection.on_peer_connection_state_change(Box::new(
        move |s: RTCPeerConnectionState| {
            let tx = state_tx.clone();

            Box::pin(async move {
                debug!("Peer connection state with {}: {:?}", remote, s);
                let kind = match s {
                    RTCPeerConnectionState::Connected => SessionEventKind::Connected,
                    RTCPeerConnectionState::Failed => {
                        SessionEventKind::Failed("ice connectivity failed".to_owned())
                    }
                    RTCPeerConnectionState::Closed => SessionEventKind::Closed,
                    _ => return,
                };
                let _ = tx.send(SessionEvent::new(remote, kind));
            })
        },
    ));

    let track_tx = events.clone();
    peer_connection.on_track(Box::new(move |track: Arc<TrackRemote>, _receiver, _transceiver| {
        let tx = track_tx.clone();
        tokio::spawn(watch_remote_track(remote, track, tx));
        Box::pin(async {})
    }));
}

/// Reports the track, then reads it until the connection drops, flagging
/// idle stretches as ended so a cleared remote stream disappears.
async fn watch_remote_track(remote: ConnectionId, track: Arc<TrackRemote>, tx: SessionEventSender) {
    let kind = match track.kind() {
        RTPCodecType::Audio => TrackKind::Audio,
        _ => TrackKind::Video,
    };
    let announce = SessionEventKind::RemoteTrack {
        stream_id: track.stream_id(),
        track: RemoteTrack {
            id: track.id(),
            kind,
        },
    };
    let ended = SessionEventKind::RemoteTrackEnded {
        track_id: track.id(),
    };

    if tx.send(SessionEvent::new(remote, announce.clone())).is_err() {
        return;
    }

    let mut live = true;
    loop {
        match tokio::time::timeout(REMOTE_TRACK_IDLE, track.read_rtp()).await {
            Ok(Ok(_)) if !live => {
                live = true;
                if tx.send(SessionEvent::new(remote, announce.clone())).is_err() {
                    return;
                }
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                debug!("Remote track {} from {} stopped: {}", track.id(), remote, e);
                if live {
                    let _ = tx.send(SessionEvent::new(remote, ended));
                }
                return;
            }
            Err(_) if live => {
                live = false;
                if tx.send(SessionEvent::new(remote, ended.clone())).is_err() {
                    return;
                }
            }
            Err(_) => {}
        }
    }
}

/// One outgoing media line per kind, created with the session so both the
/// offer and the answer carry it. Local tracks are swapped onto the sender
/// afterwards, which never needs another offer/answer exchange. With no local
/// track the sender carries a silent placeholder instead.
struct MediaSlot {
    kind: TrackKind,
    sender: Arc<RTCRtpSender>,
    idle: Arc<dyn TrackLocal + Send + Sync>,
}

impl MediaSlot {
    async fn open(peer_connection: &RTCPeerConnection, kind: TrackKind) -> Result<Self, ClientError> {
        let track_id = match kind {
            TrackKind::Audio => "audio",
            TrackKind::Video => "video",
        };
        let idle: Arc<dyn TrackLocal + Send + Sync> = Arc::new(TrackLocalStaticSample::new(
            codec_capability(kind),
            track_id.to_owned(),
            SLOT_STREAM_ID.to_owned(),
        ));
        let sender = peer_connection.add_track(idle.clone()).await?;

        Ok(Self { kind, sender, idle })
    }
}

struct RtcSession {
    remote: ConnectionId,
    peer_connection: Arc<RTCPeerConnection>,
    events: SessionEventSender,
    slots: Vec<MediaSlot>,
    pending_candidates: Mutex<Vec<RTCIceCandidateInit>>,
}

impl RtcSession {
    fn emit(&self, payload: SignalPayload) {
        let _ = self
            .events
            .send(SessionEvent::new(self.remote, SessionEventKind::Signal(payload)));
    }

    async fn send_offer(&self) -> Result<(), ClientError> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        self.emit(SignalPayload::Offer(SessionDescription { sdp: offer.sdp }));
        Ok(())
    }

    /// Puts the first webrtc-backed track of each kind from `stream` on its
    /// slot. Slots without a matching track fall back to the placeholder.
    async fn fill_slots(&self, stream: Option<&LocalStream>) -> Result<(), ClientError> {
        for slot in &self.slots {
            let candidates: Vec<_> = stream
                .map(|s| s.tracks().iter().filter(|t| t.kind() == slot.kind).collect())
                .unwrap_or_default();
            if candidates.len() > 1 {
                warn!(
                    "Only one {:?} track is sent to {}, ignoring {} more",
                    slot.kind,
                    self.remote,
                    candidates.len() - 1
                );
            }

            let track = candidates
                .iter()
                .filter(|t| !t.is_stopped())
                .find_map(|t| t.as_any().downcast_ref::<RtcLocalTrack>())
                .map(RtcLocalTrack::rtc_track)
                .unwrap_or_else(|| slot.idle.clone());
            slot.sender.replace_track(Some(track)).await?;
        }
        Ok(())
    }

    async fn flush_pending_candidates(&self) -> Result<(), ClientError> {
        let pending: Vec<_> = self.pending_candidates.lock().await.drain(..).collect();
        if !pending.is_empty() {
            debug!("Applying {} buffered candidates from {}", pending.len(), self.remote);
        }
        for candidate in pending {
            self.peer_connection.add_ice_candidate(candidate).await?;
        }
        Ok(())
    }

    async fn has_remote_description(&self) -> bool {
        self.peer_connection.remote_description().await.is_some()
    }
}

#[async_trait]
impl NegotiationSession for RtcSession {
    async fn apply_remote(&self, payload: SignalPayload) -> Result<(), ClientError> {
        match payload {
            SignalPayload::Offer(description) => {
                let offer = RTCSessionDescription::offer(description.sdp)?;
                self.peer_connection.set_remote_description(offer).await?;
                self.flush_pending_candidates().await?;

                let answer = self.peer_connection.create_answer(None).await?;
                self.peer_connection
                    .set_local_description(answer.clone())
                    .await?;
                self.emit(SignalPayload::Answer(SessionDescription { sdp: answer.sdp }));
            }

            SignalPayload::Answer(description) => {
                let answer = RTCSessionDescription::answer(description.sdp)?;
                self.peer_connection.set_remote_description(answer).await?;
                self.flush_pending_candidates().await?;
            }

            SignalPayload::IceCandidate(candidate) => {
                let init = RTCIceCandidateInit {
                    candidate: candidate.candidate,
                    sdp_mid: candidate.sdp_mid,
                    sdp_mline_index: candidate.sdp_m_line_index,
                    username_fragment: None,
                };
                if self.has_remote_description().await {
                    self.peer_connection.add_ice_candidate(init).await?;
                } else {
                    self.pending_candidates.lock().await.push(init);
                }
            }
        }
        Ok(())
    }

    async fn replace_local_stream(&self, stream: Option<&LocalStream>) -> Result<(), ClientError> {
        self.fill_slots(stream).await
    }

    async fn close(&self) {
        if let Err(e) = self.peer_connection.close().await {
            warn!("Failed to close peer connection with {}: {}", self.remote, e);
        }
    }
}
