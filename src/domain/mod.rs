/// Domain module containing core business logic and data types
///
/// This module defines the habit record, the clock that supplies "today",
/// and the validation rules shared by every layer above it.

pub mod clock;
pub mod habit;
pub mod types;

// Re-export public types for easy access
pub use clock::*;
pub use habit::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid variant: {0}")]
    InvalidVariant(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
