mod message_store;
mod room_lookup;

pub use message_store::*;
pub use room_lookup::*;
