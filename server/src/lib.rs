//! promgate server library
//!
//! Push-to-pull metrics gateway: producers push self-describing JSON
//! metric samples, the expiring registry holds them, and a Prometheus
//! collector scrapes the current set from `/metrics`.

pub mod api;
pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
