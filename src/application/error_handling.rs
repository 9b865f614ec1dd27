// src/application/error_handling.rs
//
// Error Handling for Commands
//
// ARCHITECTURE:
// - Maps internal errors → user-friendly responses
// - Provides consistent error format for UI
// - Never exposes internal implementation details
// - Logs errors for debugging

use log::error;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Standard error response for UI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error_type: ErrorType,
    pub message: String,
    pub details: Option<String>,
}

/// Error categories for UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// Login needed (401)
    AuthRequired,

    /// Invalid input or rejected by a domain rule (400)
    Validation,

    /// Resource not found (404)
    NotFound,

    /// Already favorited or similar (409)
    Conflict,

    /// Backend answered with an error (4xx/5xx)
    ExternalService,

    /// Backend unreachable or timed out
    Network,

    /// Other/unknown error (500)
    Internal,
}

impl ErrorResponse {
    /// Create error response from AppError
    pub fn from_app_error(error: AppError) -> Self {
        match error {
            AppError::AuthRequired => Self {
                success: false,
                error_type: ErrorType::AuthRequired,
                message: "Login required".to_string(),
                details: None,
            },

            AppError::Domain(domain_error) => Self {
                success: false,
                error_type: ErrorType::Validation,
                message: "Validation failed".to_string(),
                details: Some(domain_error.to_string()),
            },

            AppError::NotFound => Self {
                success: false,
                error_type: ErrorType::NotFound,
                message: "Resource not found".to_string(),
                details: None,
            },

            AppError::Api {
                status,
                code,
                message,
            } => {
                let error_type = match status {
                    400 | 422 => ErrorType::Validation,
                    401 | 403 => ErrorType::AuthRequired,
                    404 => ErrorType::NotFound,
                    409 => ErrorType::Conflict,
                    _ => {
                        error!("Backend error {} ({:?}): {}", status, code, message);
                        ErrorType::ExternalService
                    }
                };

                Self {
                    success: false,
                    error_type,
                    message,
                    details: code,
                }
            }

            AppError::Network(network_error) => {
                error!("Network error: {:?}", network_error);

                Self {
                    success: false,
                    error_type: ErrorType::Network,
                    message: "Could not reach the server".to_string(),
                    details: Some(network_error.to_string()),
                }
            }

            AppError::Serialization(serde_error) => {
                error!("Serialization error: {:?}", serde_error);

                Self {
                    success: false,
                    error_type: ErrorType::Internal,
                    message: "Data serialization failed".to_string(),
                    details: None,
                }
            }

            AppError::Io(io_error) => {
                error!("IO error: {:?}", io_error);

                Self {
                    success: false,
                    error_type: ErrorType::Internal,
                    message: "File system operation failed".to_string(),
                    details: Some(io_error.to_string()),
                }
            }

            AppError::Config(message) => {
                error!("Configuration error: {}", message);

                Self {
                    success: false,
                    error_type: ErrorType::Internal,
                    message: "Client is misconfigured".to_string(),
                    details: Some(message),
                }
            }

            AppError::Other(message) => {
                error!("Other error: {}", message);

                Self {
                    success: false,
                    error_type: ErrorType::Internal,
                    message,
                    details: None,
                }
            }
        }
    }

    /// Create validation error
    pub fn validation(message: String) -> Self {
        Self {
            success: false,
            error_type: ErrorType::Validation,
            message,
            details: None,
        }
    }

    /// Create not found error
    pub fn not_found(resource: &str) -> Self {
        Self {
            success: false,
            error_type: ErrorType::NotFound,
            message: format!("{} not found", resource),
            details: None,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "Internal error".to_string())
    }
}

/// Helper trait to convert Results to ErrorResponse
pub trait ToErrorResponse<T> {
    fn to_error_response(self) -> Result<T, String>;
}

impl<T> ToErrorResponse<T> for Result<T, AppError> {
    fn to_error_response(self) -> Result<T, String> {
        self.map_err(|e| ErrorResponse::from_app_error(e).to_json())
    }
}

/// Macro to wrap command results with error handling
#[macro_export]
macro_rules! handle_command {
    ($expr:expr) => {
        match $expr {
            Ok(value) => Ok(value),
            Err(e) => Err($crate::application::error_handling::ErrorResponse::from_app_error(e).to_json()),
        }
    };
}
