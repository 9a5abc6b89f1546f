pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod infra;
pub mod logging;
pub mod observability;
pub mod pipeline;
pub mod sources;
