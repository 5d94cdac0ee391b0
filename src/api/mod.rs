//! Status API
//!
//! Read-only HTTP endpoints for the monitoring collaborator: liveness,
//! uptime, aggregate wager stats, leaderboards and Prometheus metrics.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use server::{StatusServer, StatusServerConfig};
