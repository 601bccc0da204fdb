//! HTTP management API
//!
//! Exposes alert queries, rule CRUD, silences, health snapshots and metrics.

pub mod routes;
pub mod server;
pub mod state;


pub use server::HttpServer;
pub use state::AppState;
