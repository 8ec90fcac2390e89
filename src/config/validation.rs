use crate::config::types::{AnalyticsConfig, Config, CrawlerConfig, StorageConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_storage_config(&config.storage)?;
    validate_analytics_config(&config.analytics)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.threads_count < 1 || config.threads_count > 100 {
        return Err(ConfigError::Validation(format!(
            "threads_count must be between 1 and 100, got {}",
            config.threads_count
        )));
    }

    if config.seed_urls.is_empty() {
        return Err(ConfigError::Validation(
            "at least one seed URL is required".to_string(),
        ));
    }

    for seed in &config.seed_urls {
        let url = Url::parse(seed).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use the http or https scheme",
                seed
            )));
        }
    }

    if config.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(
            "allowed_domains cannot be empty".to_string(),
        ));
    }

    for suffix in &config.allowed_domains {
        validate_domain_suffix(suffix)?;
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.save_file.is_empty() {
        return Err(ConfigError::Validation(
            "save_file cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates analytics configuration
fn validate_analytics_config(config: &AnalyticsConfig) -> Result<(), ConfigError> {
    validate_domain_suffix(&config.domain_suffix)?;

    for (name, path) in [
        ("report_path", &config.report_path),
        ("text_report_path", &config.text_report_path),
        ("log_path", &config.log_path),
    ] {
        if path.is_empty() {
            return Err(ConfigError::Validation(format!("{} cannot be empty", name)));
        }
    }

    Ok(())
}

/// Validates a domain suffix such as ".ics.uci.edu" or "ics.uci.edu"
fn validate_domain_suffix(suffix: &str) -> Result<(), ConfigError> {
    let domain = suffix.strip_prefix('.').unwrap_or(suffix);

    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain suffix cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain suffix '{}' contains invalid characters",
            suffix
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain suffix '{}' cannot start or end with '.' or '-'",
            suffix
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain suffix '{}' cannot contain consecutive dots",
            suffix
        )));
    }

    Ok(())
}
