//! # Error Handling
//!
//! Error types for secure form storage using `thiserror`.
//!
//! Connector operations distinguish *benign* outcomes (record not found,
//! delete conflict, unsupported capability) from *fatal* ones. Benign outcomes
//! are modelled as values (see [`crate::connectors::ReadOutcome`] and
//! [`crate::connectors::DeleteOutcome`]); only fatal conditions surface as a
//! [`SecureStorageError`].

/// Custom result type for secure storage operations
pub type Result<T> = std::result::Result<T, SecureStorageError>;

/// Main error type for secure form storage
#[derive(thiserror::Error, Debug)]
pub enum SecureStorageError {
    /// Required settings or credentials are missing or malformed
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Backend unreachable or credentials rejected
    #[error("Connection error ({backend}): {message}")]
    Connection {
        backend: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Database errors from the relational connector
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// HTTP errors from the vault connector
    #[error("HTTP error: {message} (status: {status:?})")]
    Http { message: String, status: Option<u16> },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// A connector was asked for a capability it does not implement
    #[error("Unsupported operation: {operation} is not supported by the '{connector}' connector")]
    Unsupported { connector: String, operation: String },

    /// Backend-reported conflict that could not be treated as benign
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Resource not found errors
    #[error("Resource not found: {resource_type} '{id}'")]
    NotFound { resource_type: String, id: String },

    /// I/O errors
    #[error("I/O error: {context}")]
    Io {
        #[source]
        source: std::io::Error,
        context: String,
    },

    /// Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl SecureStorageError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config { message: message.into(), source: None }
    }

    /// Create a configuration error with source
    pub fn config_with_source<S: Into<String>>(
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Config { message: message.into(), source: Some(source) }
    }

    /// Create a connection error for the named backend
    pub fn connection<B: Into<String>, S: Into<String>>(backend: B, message: S) -> Self {
        Self::Connection { backend: backend.into(), message: message.into(), source: None }
    }

    /// Create a connection error with source
    pub fn connection_with_source<B: Into<String>, S: Into<String>>(
        backend: B,
        message: S,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Connection { backend: backend.into(), message: message.into(), source: Some(source) }
    }

    /// Create a database error with context
    pub fn database<S: Into<String>>(source: sqlx::Error, context: S) -> Self {
        Self::Database { source, context: context.into() }
    }

    /// Create an HTTP error
    pub fn http<S: Into<String>>(message: S, status: Option<u16>) -> Self {
        Self::Http { message: message.into(), status }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create an unsupported operation error
    pub fn unsupported<C: Into<String>, O: Into<String>>(connector: C, operation: O) -> Self {
        Self::Unsupported { connector: connector.into(), operation: operation.into() }
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict { message: message.into() }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource_type: R, id: I) -> Self {
        Self::NotFound { resource_type: resource_type.into(), id: id.into() }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into() }
    }

    /// True for configuration errors
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Config { .. })
    }

    /// True when the backend could not be reached or rejected the credentials
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::Http { status, .. } => matches!(status, None | Some(401) | Some(403)),
            Self::Database { source, .. } => matches!(
                source,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
            ),
            _ => false,
        }
    }
}

impl From<sqlx::Error> for SecureStorageError {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}

impl From<serde_json::Error> for SecureStorageError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization { source: error, context: "JSON serialization failed".to_string() }
    }
}

impl From<std::io::Error> for SecureStorageError {
    fn from(error: std::io::Error) -> Self {
        Self::Io { source: error, context: "I/O operation failed".to_string() }
    }
}

impl From<reqwest::Error> for SecureStorageError {
    fn from(error: reqwest::Error) -> Self {
        let status = error.status().map(|s| s.as_u16());
        if error.is_connect() || error.is_timeout() {
            return Self::connection_with_source(
                "vault",
                "Vault request could not be completed",
                Box::new(error),
            );
        }
        Self::Http { message: error.to_string(), status }
    }
}

impl From<config::ConfigError> for SecureStorageError {
    fn from(error: config::ConfigError) -> Self {
        Self::config_with_source("Configuration loading failed", Box::new(error))
    }
}

impl From<validator::ValidationErrors> for SecureStorageError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = SecureStorageError::config("missing secure_client_id");
        assert!(error.is_configuration());
        assert_eq!(error.to_string(), "Configuration error: missing secure_client_id");
    }

    #[test]
    fn test_connection_classification() {
        assert!(SecureStorageError::connection("relational", "refused").is_connection());
        assert!(SecureStorageError::http("unauthorized", Some(401)).is_connection());
        assert!(!SecureStorageError::http("bad request", Some(400)).is_connection());
        assert!(!SecureStorageError::validation("bad").is_connection());
        assert!(SecureStorageError::database(sqlx::Error::PoolTimedOut, "acquire").is_connection());
    }

    #[test]
    fn test_unsupported_display() {
        let error = SecureStorageError::unsupported("relational", "delete_record");
        assert_eq!(
            error.to_string(),
            "Unsupported operation: delete_record is not supported by the 'relational' connector"
        );
    }

    #[test]
    fn test_validation_field() {
        let error = SecureStorageError::validation_field("too short", "secure_api_secret");
        if let SecureStorageError::Validation { field, .. } = error {
            assert_eq!(field, Some("secure_api_secret".to_string()));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_error_conversions() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: SecureStorageError = io_error.into();
        assert!(matches!(error, SecureStorageError::Io { .. }));

        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: SecureStorageError = json_error.into();
        assert!(matches!(error, SecureStorageError::Serialization { .. }));
    }
}
