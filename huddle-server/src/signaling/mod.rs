mod channel_hub;
mod event_sink;
mod relay;
mod ws_handler;

pub use channel_hub::*;
pub use event_sink::*;
pub use relay::*;
pub use ws_handler::*;
