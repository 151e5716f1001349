pub mod app;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod exposition;
pub mod infra;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod services;
pub mod snapshot;
