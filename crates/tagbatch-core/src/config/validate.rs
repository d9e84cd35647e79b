//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

fn check_unit(name: &str, value: f32) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::ValidationError(format!(
            "{name} must be between 0.0 and 1.0"
        )));
    }
    Ok(())
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.host.url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(
                "host.url must start with http:// or https://".into(),
            ));
        }
        if self.host.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "host.timeout_ms must be > 0".into(),
            ));
        }
        if self.host.probe_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "host.probe_timeout_ms must be > 0".into(),
            ));
        }

        let interrogation = &self.interrogation;
        check_unit("interrogation.wd_threshold", interrogation.wd_threshold)?;
        check_unit(
            "interrogation.wd_rating_threshold",
            interrogation.wd_rating_threshold,
        )?;
        check_unit("interrogation.prompt_weight", interrogation.prompt_weight)?;

        match self.logging.format.as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(ConfigError::ValidationError(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{other}\""
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.host.url = "127.0.0.1:7860".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("host.url"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.host.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_out_of_range_thresholds() {
        let mut config = Config::default();
        config.interrogation.wd_threshold = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("wd_threshold"));

        let mut config = Config::default();
        config.interrogation.wd_rating_threshold = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("wd_rating_threshold"));

        let mut config = Config::default();
        config.interrogation.prompt_weight = 1.01;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("prompt_weight"));
    }

    #[test]
    fn test_validate_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".into();
        assert!(config.validate().is_err());
    }
}
