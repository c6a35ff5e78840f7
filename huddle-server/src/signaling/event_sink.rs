use huddle_core::{ConnectionId, ServerEvent};

/// Direct-to-identifier delivery, implemented by the websocket layer.
///
/// Per-target delivery preserves call order; nothing is ordered across targets.
pub trait EventSink: Send + Sync {
    /// Queues `event` for `target`. Returns `false` when `target` has no open
    /// channel; the event is then dropped.
    fn send_to(&self, target: &ConnectionId, event: &ServerEvent) -> bool;
}
