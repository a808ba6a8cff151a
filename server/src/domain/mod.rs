//! Domain logic

pub mod exposition;
pub mod ingest;

pub use exposition::render_exposition;
pub use ingest::{InboundMessage, IngestPipeline, IngestStats, Janitor};
