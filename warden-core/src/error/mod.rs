pub mod utilities;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Cryptographic error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Record not found")]
    NotFound,

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Random number generator failure: {0}")]
    Rng(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Error {
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_crypto_error(&self) -> bool {
        matches!(self, Error::Crypto(_))
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let validation_error =
            Error::Validation(ValidationError::InvalidEmail("test@".to_string()));
        assert_eq!(
            validation_error.to_string(),
            "Validation error: Invalid email format: test@"
        );

        let storage_error = Error::Storage(StorageError::NotFound);
        assert_eq!(storage_error.to_string(), "Storage error: Record not found");

        let config_error = Error::Config(ConfigError::InvalidValue {
            key: "WARDEN_MAX_FAILED_ATTEMPTS".to_string(),
            value: "many".to_string(),
        });
        assert_eq!(
            config_error.to_string(),
            "Configuration error: Invalid value for WARDEN_MAX_FAILED_ATTEMPTS: many"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::Storage(StorageError::Database("down".to_string())).is_storage_error());
        assert!(
            Error::Validation(ValidationError::MissingField("email".to_string()))
                .is_validation_error()
        );
        assert!(Error::Crypto(CryptoError::Rng("no entropy".to_string())).is_crypto_error());
        assert!(Error::Config(ConfigError::Invalid("zero".to_string())).is_config_error());
        assert!(!Error::Storage(StorageError::NotFound).is_validation_error());
    }

    #[test]
    fn test_storage_error_variants() {
        let db_error = StorageError::Database("connection failed".to_string());
        assert_eq!(db_error.to_string(), "Database error: connection failed");

        let corrupt = StorageError::Corrupt("bad timestamp".to_string());
        assert_eq!(corrupt.to_string(), "Corrupt record: bad timestamp");
    }

    #[test]
    fn test_error_from_conversions() {
        let error: Error = ValidationError::InvalidPassword("short".to_string()).into();
        assert!(matches!(
            error,
            Error::Validation(ValidationError::InvalidPassword(_))
        ));

        let error: Error = StorageError::Connection("refused".to_string()).into();
        assert!(matches!(error, Error::Storage(StorageError::Connection(_))));
    }
}
