//! Kindred HTTP server library
//!
//! Exposes the router and application state so integration tests can drive
//! the API in-process.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod state;

pub use api::create_router;
pub use config::ServerConfig;
pub use state::AppState;
