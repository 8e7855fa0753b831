//! Error types for gastos-core
//!
//! Every failure the front end can hit ends up here: the backend being
//! unreachable or answering with an error status, a response that does
//! not decode, or a form that fails its presence/range checks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Backend could not be reached or timed out
    BackendUnavailable,
    /// Backend answered with a non-success status
    BackendStatus,
    /// Requested record does not exist
    NotFound,
    /// Response body did not match the expected shape
    DecodeError,
    /// Form input rejected before submission
    ValidationError,
    /// Request could not be built
    InvalidRequest,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::BackendUnavailable => write!(f, "BACKEND_UNAVAILABLE"),
            ErrorCode::BackendStatus => write!(f, "BACKEND_STATUS"),
            ErrorCode::NotFound => write!(f, "NOT_FOUND"),
            ErrorCode::DecodeError => write!(f, "DECODE_ERROR"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::InvalidRequest => write!(f, "INVALID_REQUEST"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Form field the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            field: None,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_field(mut self, field: String) -> Self {
        self.field = Some(field);
        self
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref field) = self.field {
            write!(f, "\nField: {}", field)?;
        }
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for gastos-core
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    #[error("Backend unavailable: {message}")]
    BackendUnavailable { message: String },

    #[error("Backend returned HTTP {status}")]
    BackendStatus { status: u16, body: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Invalid backend response: {message}")]
    Decode { message: String },

    #[error("{message}")]
    Validation { field: String, message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl CoreError {
    pub fn decode(error: serde_json::Error) -> Self {
        CoreError::Decode {
            message: error.to_string(),
        }
    }

    pub fn validation(field: &str, message: &str) -> Self {
        CoreError::Validation {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::BackendUnavailable { .. } => ErrorCode::BackendUnavailable,
            CoreError::BackendStatus { .. } => ErrorCode::BackendStatus,
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::Decode { .. } => ErrorCode::DecodeError,
            CoreError::Validation { .. } => ErrorCode::ValidationError,
            CoreError::InvalidRequest { .. } => ErrorCode::InvalidRequest,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::BackendUnavailable { .. } => ErrorSeverity::Error,
            CoreError::BackendStatus { status, .. } if *status >= 500 => ErrorSeverity::Error,
            CoreError::BackendStatus { .. } => ErrorSeverity::Warning,
            CoreError::NotFound { .. } => ErrorSeverity::Info,
            CoreError::Decode { .. } => ErrorSeverity::Error,
            CoreError::Validation { .. } => ErrorSeverity::Info,
            CoreError::InvalidRequest { .. } => ErrorSeverity::Error,
        }
    }

    /// HTTP status the front end should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            CoreError::BackendUnavailable { .. } => 503,
            CoreError::BackendStatus { status, .. } if *status == 404 => 404,
            CoreError::BackendStatus { status, .. } if (400..500).contains(status) => 400,
            CoreError::BackendStatus { .. } => 502,
            CoreError::NotFound { .. } => 404,
            CoreError::Decode { .. } => 502,
            CoreError::Validation { .. } => 422,
            CoreError::InvalidRequest { .. } => 500,
        }
    }

    /// Short pt-BR text shown to the user in notifications
    pub fn user_message(&self) -> String {
        match self {
            CoreError::BackendUnavailable { .. } => {
                "Não foi possível conectar ao servidor. Verifique se o backend está rodando.".to_string()
            }
            CoreError::BackendStatus { status, .. } if *status == 404 => {
                "Registro não encontrado.".to_string()
            }
            CoreError::BackendStatus { status, .. } if (400..500).contains(status) => {
                "O servidor recusou os dados enviados.".to_string()
            }
            CoreError::BackendStatus { .. } => "O servidor encontrou um erro.".to_string(),
            CoreError::NotFound { .. } => "Registro não encontrado.".to_string(),
            CoreError::Decode { .. } => "Resposta inesperada do servidor.".to_string(),
            CoreError::Validation { message, .. } => message.clone(),
            CoreError::InvalidRequest { .. } => "Não foi possível montar a requisição.".to_string(),
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::BackendUnavailable { .. } => {
                details = details
                    .with_suggestion("Check that the backend is running.".to_string())
                    .with_suggestion("Check backend.base_url in the config file.".to_string());
            }
            CoreError::BackendStatus { status, body } => {
                details = details.with_detail(serde_json::json!({
                    "status": status,
                    "body": body,
                }));
            }
            CoreError::Validation { field, .. } => {
                details = details.with_field(field.clone());
            }
            CoreError::Decode { message } => {
                details = details.with_detail(serde_json::json!({ "decode_message": message }));
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed, e.g. `GET /despesas`
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            data: serde_json::json!({}),
        }
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Error => log::error!(
                target: "gastos::error",
                "[{}] {} - Operation: {} - Data: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
            ErrorSeverity::Warning => log::warn!(
                target: "gastos::error",
                "[{}] {} - Operation: {} - Data: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
            ErrorSeverity::Info => log::info!(
                target: "gastos::error",
                "[{}] {} - Operation: {}",
                error.code(),
                error,
                context.operation
            ),
        }
    }
}

// ==================== Tests ====================
