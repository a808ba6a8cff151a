//! Core application infrastructure

pub mod cli;
pub mod config;
pub mod constants;
pub mod shutdown;
pub mod topics;

pub use crate::app::CoreApp;
pub use cli::CliConfig;
pub use config::{AppConfig, IngestConfig, ServerConfig};
pub use shutdown::ShutdownService;
pub use topics::{Publisher, Subscriber, Topic, TopicConfig, TopicError, TopicMessage};
