//! Configuration validation utilities.

use tally_core::Seed;
use tracing_subscriber::filter::Directive;

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, StorageConfig, TallyConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &TallyConfig) -> ConfigResult<()> {
    validate_storage_config(&config.storage)?;
    validate_seed(&config.seed)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

fn validate_storage_config(storage: &StorageConfig) -> ConfigResult<()> {
    if storage.data_file.as_os_str().is_empty() {
        return Err(ConfigError::missing_field("storage.data_file"));
    }
    Ok(())
}

fn validate_seed(seed: &Seed) -> ConfigResult<()> {
    if seed.trigger_words.iter().any(String::is_empty) {
        return Err(ConfigError::validation(
            "seed.trigger_words cannot contain empty entries",
        ));
    }
    Ok(())
}

fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::missing_field("logging.file_path"));
    }

    for (module, level) in &logging.filters {
        let directive = format!("{module}={}", level.as_str());
        if module.trim().is_empty() || directive.parse::<Directive>().is_err() {
            return Err(ConfigError::validation(format!(
                "logging.filters: '{module}' is not a module path"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_validate_default_config() {
        let config = TallyConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_trigger_word() {
        let mut config = TallyConfig::default();
        config.seed.trigger_words = vec!["banana".to_string(), String::new()];
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        config.seed.trigger_words = vec!["banana".to_string(), " ".to_string()];
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_log_filters() {
        let mut config = TallyConfig::default();
        config
            .logging
            .filters
            .insert("tally_core::store".to_string(), LogLevel::Trace);
        assert!(validate_config(&config).is_ok());

        config.logging.filters.insert("  ".to_string(), LogLevel::Debug);
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_validate_file_output_requires_path() {
        let mut config = TallyConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { .. })
        ));

        config.logging.file_path = Some(PathBuf::from("tally.log"));
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_empty_data_file() {
        let mut config = TallyConfig::default();
        config.storage.data_file = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }
}
