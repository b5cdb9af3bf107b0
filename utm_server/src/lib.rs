//! HTTP server library for the prompt-card game backend.
//!
//! Exposes the router and configuration so integration tests can drive the
//! API in-process; the binary in `main.rs` is a thin wrapper.

pub mod api;
pub mod config;
