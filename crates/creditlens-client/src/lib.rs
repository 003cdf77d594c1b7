pub mod commands;
pub mod config;
pub mod contracts;
pub mod engine;
pub mod error;
pub mod http;
pub mod import;
pub mod store;
pub mod table;

pub use contracts::envelope::{FailureEnvelope, SuccessEnvelope};
pub use error::{ClientError, ClientResult};

pub const API_VERSION: &str = env!("CARGO_PKG_VERSION");
