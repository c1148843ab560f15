//! Shared service plumbing for Yata services.
//!
//! Configuration loading, tracing setup, health handlers and HTTP middleware.

pub mod config;
pub mod health;
pub mod middleware;
pub mod tracing;
