//! HTTP adapter for the credkeep credential service
//!
//! Library exports for the binary and for integration tests.

pub mod app;
pub mod config;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;
