pub mod config;
pub mod error;
pub mod flows;
pub mod llm;
pub mod schema;
pub mod server;

pub use error::{Error, Result};
