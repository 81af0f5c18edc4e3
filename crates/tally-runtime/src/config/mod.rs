//! Configuration module for the Tally runtime.
//!
//! This module provides figment-based configuration loading and validation
//! for storage, seed and logging settings.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig, StorageConfig, TallyConfig,
};
pub use validation::validate_config;
