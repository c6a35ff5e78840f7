mod relay_client;

pub use relay_client::RelayClient;

use crate::error::ClientError;
use huddle_core::ClientEvent;

/// Outbound half of the relay connection.
pub trait SignalingTransport: Send + Sync {
    fn send(&self, event: ClientEvent) -> Result<(), ClientError>;
}
