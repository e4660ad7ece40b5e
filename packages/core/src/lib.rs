// Library root - exposes internal modules for integration tests in `tests/`.
// Production entry point remains `src/main.rs`.

pub mod analysis;
pub mod api;
pub mod error;
pub mod metrics;
pub mod model;
pub mod service;
pub mod services;
pub mod store;

// Startup concerns used by the binary.
pub mod cli;
pub mod config;
pub mod logging;
