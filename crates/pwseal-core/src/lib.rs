pub mod config;
pub mod error;

pub use config::{load_config, PwsealConfig};
pub use error::{PwsealError, PwsealResult};
