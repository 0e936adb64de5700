//! Shared infrastructure for the Mandate services: configuration loaded from
//! the environment, the canonical error type, tracing setup, and the
//! Postgres pool wrapper.

pub mod config;
pub mod db;
pub mod errors;
pub mod logging;

pub use config::{CoreConfig, Environment};
pub use db::DatabasePool;
pub use errors::{MandateError, Result};
