//! HTTP API: configuration, service facade, routing and response mapping.

pub mod app;
pub mod config;
