use crate::config::types::{Config, HttpConfig, LimitsConfig, OutputConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound for concurrent probes within one page batch
const MAX_PROBE_CONCURRENCY: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_http_config(&config.http)?;
    validate_limits_config(&config.limits)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates HTTP client configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    // Probes are the lightweight request; they never wait longer than a page fetch
    if config.probe_timeout_secs < 1 || config.probe_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "probe-timeout-secs must be between 1 and timeout-secs ({}), got {}",
            config.timeout_secs, config.probe_timeout_secs
        )));
    }

    if let Some(proxy) = &config.proxy {
        Url::parse(proxy).map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy: {}", e)))?;
    }

    Ok(())
}

/// Validates crawl limits
fn validate_limits_config(config: &LimitsConfig) -> Result<(), ConfigError> {
    if config.max_pages_per_domain < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages-per-domain must be >= 1, got {}",
            config.max_pages_per_domain
        )));
    }

    if config.probe_concurrency < 1 || config.probe_concurrency > MAX_PROBE_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "probe-concurrency must be between 1 and {}, got {}",
            MAX_PROBE_CONCURRENCY, config.probe_concurrency
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.reports_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "reports-dir cannot be empty".to_string(),
        ));
    }

    if config.status_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "status-path cannot be empty".to_string(),
        ));
    }

    if let Some(dir) = &config.extracted_dir {
        if dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "extracted-dir cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
