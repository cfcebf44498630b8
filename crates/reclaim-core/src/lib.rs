//! Service plumbing shared by the reclaim services.
//!
//! Tracing setup, HTTP middleware, health handlers, environment config helpers
//! and the shutdown signal.

pub mod config;
pub mod health;
pub mod middleware;
pub mod shutdown;
pub mod tracing;
