//! Configuration validation with range checks.

use std::path::Path;

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::ValidationError(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.llm_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.llm_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.io_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.io_timeout_ms must be > 0".into(),
            ));
        }
        if same_directory(&self.input_dir(), &self.output_dir()) {
            return Err(ConfigError::ValidationError(
                "paths.output_dir must differ from paths.input_dir".into(),
            ));
        }
        if self.listing.condition.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "listing.condition must not be empty".into(),
            ));
        }
        for (role, route) in self.llm.routes() {
            if route.model.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "llm.{role}.model must not be empty"
                )));
            }
            if !(0.0..=2.0).contains(&route.temperature) {
                return Err(ConfigError::ValidationError(format!(
                    "llm.{role}.temperature must be between 0.0 and 2.0"
                )));
            }
            if route.max_tokens == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "llm.{role}.max_tokens must be > 0"
                )));
            }
        }
        Ok(())
    }
}

/// Compare on disk when both exist, component-wise otherwise.
fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_parallel_workers() {
        let mut config = Config::default();
        config.processing.parallel_workers = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("parallel_workers"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.io_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("io_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_blank_condition() {
        let mut config = Config::default();
        config.listing.condition = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("condition"));
    }

    #[test]
    fn test_validate_rejects_invalid_temperature() {
        let mut config = Config::default();
        config.llm.listing.temperature = 2.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("llm.listing.temperature"));

        config.llm.listing.temperature = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_model() {
        let mut config = Config::default();
        config.llm.naming.model = String::new();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("llm.naming.model"));
    }

    #[test]
    fn test_validate_rejects_output_dir_equal_to_input_dir() {
        let mut config = Config::default();
        config.paths.input_dir = PathBuf::from("photos");
        config.paths.output_dir = PathBuf::from("photos/");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output_dir"));
    }

    #[test]
    fn test_validate_resolves_aliased_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("photos")).unwrap();
        let mut config = Config::default();
        config.paths.input_dir = dir.path().join("photos");
        config.paths.output_dir = dir.path().join("photos/../photos");
        assert!(config.validate().is_err());

        config.paths.output_dir = dir.path().join("listed");
        assert!(config.validate().is_ok());
    }
}
