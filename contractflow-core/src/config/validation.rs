//! Configuration validation module

use crate::config::{
    ContractsConfig, DatabaseConfig, DocumentsConfig, LifecycleConfig, LoggingConfig,
    MAX_EXPIRING_WITHIN_DAYS, ServerConfig, StorageBackend,
};

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Server configuration error: {message}")]
    Server { message: String },

    #[error("Database configuration error: {message}")]
    Database { message: String },

    #[error("Logging configuration error: {message}")]
    Logging { message: String },

    #[error("Contracts configuration error: {message}")]
    Contracts { message: String },

    #[error("Approvals configuration error: {message}")]
    Approvals { message: String },

    #[error("Documents configuration error: {message}")]
    Documents { message: String },

    #[error("Lifecycle configuration error: {message}")]
    Lifecycle { message: String },
}

impl ValidationError {
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }

    pub fn contracts(message: impl Into<String>) -> Self {
        Self::Contracts {
            message: message.into(),
        }
    }

    pub fn approvals(message: impl Into<String>) -> Self {
        Self::Approvals {
            message: message.into(),
        }
    }

    pub fn documents(message: impl Into<String>) -> Self {
        Self::Documents {
            message: message.into(),
        }
    }

    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::Lifecycle {
            message: message.into(),
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::server("Port must be greater than 0"));
        }

        if self.host.trim().is_empty() {
            return Err(ValidationError::server("Host cannot be empty"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(ValidationError::server(
                "request_timeout_seconds must be > 0",
            ));
        }

        if self.request_timeout_seconds > 600 {
            return Err(ValidationError::server(
                "request_timeout_seconds cannot exceed 600 (10 minutes)",
            ));
        }

        Ok(())
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.backend == StorageBackend::Memory {
            return Ok(());
        }

        if self.url.is_empty() {
            return Err(ValidationError::database("Database URL cannot be empty"));
        }

        if !self.url.starts_with("postgres://") && !self.url.starts_with("postgresql://") {
            return Err(ValidationError::database(
                "Database URL must start with postgres:// or postgresql://",
            ));
        }

        if self.max_connections == 0 {
            return Err(ValidationError::database(
                "max_connections must be greater than 0",
            ));
        }

        if self.min_idle.is_some_and(|min_idle| min_idle > self.max_connections) {
            return Err(ValidationError::database(
                "min_idle cannot exceed max_connections",
            ));
        }

        if self.connect_timeout_seconds == 0 {
            return Err(ValidationError::database(
                "connect_timeout_seconds must be greater than 0",
            ));
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.level.trim().is_empty() {
            return Err(ValidationError::logging("level cannot be empty"));
        }

        match self.format.to_ascii_lowercase().as_str() {
            "json" | "text" => Ok(()),
            other => Err(ValidationError::logging(format!(
                "format must be 'json' or 'text', got '{}'",
                other
            ))),
        }
    }
}

impl Validate for ContractsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_page_size == 0 {
            return Err(ValidationError::contracts("max_page_size must be > 0"));
        }

        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ValidationError::contracts(
                "default_page_size must be between 1 and max_page_size",
            ));
        }

        let currency = self.default_currency.as_str();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ValidationError::contracts(
                "default_currency must be a 3-letter upper-case code",
            ));
        }

        Ok(())
    }
}

impl Validate for DocumentsConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.max_size_bytes == 0 {
            return Err(ValidationError::documents("max_size_bytes must be > 0"));
        }

        if self.allowed_content_types.is_empty() {
            return Err(ValidationError::documents(
                "allowed_content_types cannot be empty",
            ));
        }

        Ok(())
    }
}

impl Validate for LifecycleConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.expiry_worker_enabled && self.check_interval_minutes == 0 {
            return Err(ValidationError::lifecycle(
                "check_interval_minutes must be > 0 when the expiry worker is enabled",
            ));
        }

        if self.expiring_within_days > MAX_EXPIRING_WITHIN_DAYS {
            return Err(ValidationError::lifecycle(format!(
                "expiring_within_days cannot exceed {MAX_EXPIRING_WITHIN_DAYS}"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_rejects_zero_port() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::Server { .. })
        ));
    }

    #[test]
    fn test_database_url_scheme_checked_only_for_postgres() {
        let mut config = DatabaseConfig {
            url: "mysql://localhost/db".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.backend = StorageBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_min_idle_bounded_by_max_connections() {
        let config = DatabaseConfig {
            max_connections: 2,
            min_idle: Some(5),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_logging_format() {
        let mut config = LoggingConfig::default();
        assert!(config.validate().is_ok());
        config.format = "TEXT".to_string();
        assert!(config.validate().is_ok());
        config.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_contracts_currency_and_page_sizes() {
        let mut config = ContractsConfig::default();
        assert!(config.validate().is_ok());

        config.default_currency = "usd".to_string();
        assert!(config.validate().is_err());

        config.default_currency = "EUR".to_string();
        config.default_page_size = 500;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_lifecycle_interval_required_when_enabled() {
        let mut config = LifecycleConfig {
            check_interval_minutes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config.expiry_worker_enabled = false;
        assert!(config.validate().is_ok());
    }
}
