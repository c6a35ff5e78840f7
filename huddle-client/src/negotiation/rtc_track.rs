use crate::error::ClientError;
use crate::media::{MediaTrack, TrackKind};
use bytes::Bytes;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Local track backed by a webrtc sample track. Callers feed encoded frames
/// through [`RtcLocalTrack::write_frame`].
pub struct RtcLocalTrack {
    id: String,
    kind: TrackKind,
    inner: Arc<TrackLocalStaticSample>,
    stopped: AtomicBool,
}

/// Opus for audio, VP8 for video. Session slots and local tracks share it so
/// one can stand in for the other on a sender.
pub(crate) fn codec_capability(kind: TrackKind) -> RTCRtpCodecCapability {
    match kind {
        TrackKind::Audio => RTCRtpCodecCapability {
            mime_type: MIME_TYPE_OPUS.to_owned(),
            clock_rate: 48000,
            channels: 2,
            ..Default::default()
        },
        TrackKind::Video => RTCRtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_owned(),
            clock_rate: 90000,
            ..Default::default()
        },
    }
}

impl RtcLocalTrack {
    pub fn new(kind: TrackKind, track_id: impl Into<String>, stream_id: impl Into<String>) -> Self {
        let id = track_id.into();
        let inner = Arc::new(TrackLocalStaticSample::new(
            codec_capability(kind),
            id.clone(),
            stream_id.into(),
        ));

        Self {
            id,
            kind,
            inner,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn rtc_track(&self) -> Arc<dyn TrackLocal + Send + Sync> {
        self.inner.clone()
    }

    /// Writes one encoded frame. Frames written after `stop` are discarded.
    pub async fn write_frame(&self, data: Bytes, duration: Duration) -> Result<(), ClientError> {
        if self.is_stopped() {
            return Ok(());
        }

        let sample = Sample {
            data,
            duration,
            ..Default::default()
        };
        self.inner.write_sample(&sample).await?;
        Ok(())
    }
}

impl MediaTrack for RtcLocalTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
