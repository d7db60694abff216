//! Error types for tillbook-core
//!
//! Bad amounts and missing dates never reach this module; they are coerced or
//! skipped where they are read. What remains are rule violations, lookups of
//! records that do not exist, and failures passed up from the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tillbook_store::StoreError;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Supplier still referenced by orders
    SupplierHasOrders,
    /// Record lookup failed
    NotFound,
    /// Required field missing
    ValidationError,
    /// Snapshot could not be read or written
    StoreError,
    /// Import file rejected
    ImportError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ErrorCode::SupplierHasOrders => "SUPPLIER_HAS_ORDERS",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::StoreError => "STORE_ERROR",
            ErrorCode::ImportError => "IMPORT_ERROR",
        })
    }
}

/// Detailed error information for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
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
            details: None,
            suggestions: vec![],
        }
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
        f.write_str(match self {
            ErrorSeverity::Info => "info",
            ErrorSeverity::Warning => "warning",
            ErrorSeverity::Error => "error",
        })
    }
}

/// Main error type for tillbook-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Supplier {supplier_id} has {order_count} order(s) and cannot be changed")]
    SupplierHasOrders { supplier_id: u64, order_count: usize },

    #[error("Sale not found: {id}")]
    SaleNotFound { id: u64 },

    #[error("Refund not found: {id}")]
    RefundNotFound { id: u64 },

    #[error("Supplier not found: {id}")]
    SupplierNotFound { id: u64 },

    #[error("Supplier order not found: {id}")]
    SupplierOrderNotFound { id: u64 },

    #[error("Expense not found: {id}")]
    ExpenseNotFound { id: u64 },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Import error: {message}")]
    Import { message: String },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::ValidationError {
            message: message.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::SupplierHasOrders { .. } => ErrorCode::SupplierHasOrders,
            CoreError::SaleNotFound { .. }
            | CoreError::RefundNotFound { .. }
            | CoreError::SupplierNotFound { .. }
            | CoreError::SupplierOrderNotFound { .. }
            | CoreError::ExpenseNotFound { .. } => ErrorCode::NotFound,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::Store { .. } => ErrorCode::StoreError,
            CoreError::Import { .. } => ErrorCode::ImportError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::SupplierHasOrders { .. } => ErrorSeverity::Warning,
            CoreError::SaleNotFound { .. }
            | CoreError::RefundNotFound { .. }
            | CoreError::SupplierNotFound { .. }
            | CoreError::SupplierOrderNotFound { .. }
            | CoreError::ExpenseNotFound { .. } => ErrorSeverity::Info,
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::Store { .. } => ErrorSeverity::Error,
            CoreError::Import { .. } => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::SupplierHasOrders {
                supplier_id,
                order_count,
            } => details
                .with_detail(serde_json::json!({
                    "supplier_id": supplier_id,
                    "order_count": order_count,
                }))
                .with_suggestion(
                    "Suppliers with orders keep their history; add a new order to correct the balance."
                        .to_string(),
                )
                .with_suggestion(format!(
                    "Run `tillbook supplier {}` to review its orders.",
                    supplier_id
                )),
            CoreError::SaleNotFound { .. } => details
                .with_suggestion("Run `tillbook sales` to list sale ids.".to_string()),
            CoreError::RefundNotFound { .. } => details
                .with_suggestion("Run `tillbook refunds` to list refund ids.".to_string()),
            CoreError::SupplierNotFound { .. } => details
                .with_suggestion("Run `tillbook suppliers` to list supplier ids.".to_string()),
            CoreError::ValidationError { message } => details
                .with_detail(serde_json::json!({ "validation_message": message }))
                .with_suggestion("Fill in the required field and submit again.".to_string()),
            CoreError::Import { .. } => details.with_suggestion(
                "The header row needs name, product and total columns.".to_string(),
            ),
            _ => details,
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<StoreError> for CoreError {
    fn from(error: StoreError) -> Self {
        let message = error.to_string();
        match error {
            StoreError::MissingColumns { .. } | StoreError::Empty => CoreError::Import { message },
            StoreError::IoError(_) | StoreError::JsonError(_) => CoreError::Store { message },
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
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
pub trait ErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using the log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Info | ErrorSeverity::Warning => log::warn!(
                target: "tillbook::error",
                "[{}] {} - Operation: {} - Data: {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
            ErrorSeverity::Error => log::error!(
                target: "tillbook::error",
                "[{}] {} - Operation: {} - Data: {}",
                error.code(),
                error.to_details(),
                context.operation,
                context.data
            ),
        }
    }
}

// ==================== Tests ====================
