mod error;
pub mod model;
pub mod utils;

pub use error::CoreError;
pub use model::*;
