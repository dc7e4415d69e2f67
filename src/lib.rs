//! Roster - record-keeping service with a file-backed store
//!
//! Accepts records over HTTP, persists them to a single JSON snapshot file,
//! lists and removes them, and exposes operational counters for Prometheus.

pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod records;
pub mod telemetry;
