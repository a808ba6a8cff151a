//! API route handlers

pub mod exposition;
pub mod health;
pub mod ingest;
