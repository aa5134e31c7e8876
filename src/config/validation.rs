use crate::config::types::{
    BatchConfig, Config, EnqueueConfig, FetchConfig, FrontierConfig, SeedConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_frontier_config(&config.frontier)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_batch_config(&config.batch)?;
    validate_enqueue_config(&config.enqueue)?;
    validate_seed_config(&config.seeds)?;
    validate_fetch_config(&config.fetch)?;
    Ok(())
}

/// Validates frontier store configuration
fn validate_frontier_config(config: &FrontierConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.max_hops < 1 || config.max_hops > 20 {
        return Err(ConfigError::Validation(format!(
            "max_hops must be between 1 and 20, got {}",
            config.max_hops
        )));
    }

    Ok(())
}

/// Validates batch reader configuration
fn validate_batch_config(config: &BatchConfig) -> Result<(), ConfigError> {
    if config.parallel_urls_to_sync < 1 || config.parallel_urls_to_sync > 1000 {
        return Err(ConfigError::Validation(format!(
            "parallel_urls_to_sync must be between 1 and 1000, got {}",
            config.parallel_urls_to_sync
        )));
    }

    if config.page_size < 1 || config.page_size > 1000 {
        return Err(ConfigError::Validation(format!(
            "page_size must be between 1 and 1000, got {}",
            config.page_size
        )));
    }

    Ok(())
}

/// Validates enqueuer configuration
fn validate_enqueue_config(config: &EnqueueConfig) -> Result<(), ConfigError> {
    if config.group_size < 1 || config.group_size > 100 {
        return Err(ConfigError::Validation(format!(
            "group_size must be between 1 and 100, got {}",
            config.group_size
        )));
    }

    Ok(())
}

fn validate_seed_config(config: &SeedConfig) -> Result<(), ConfigError> {
    if config.url_field.trim().is_empty() {
        return Err(ConfigError::Validation(
            "url_field cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    // Domain part should contain at least one dot
    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
