//! # Error Types
//!
//! Domain-specific error types for docforge-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  docforge-core errors (this file)                                      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  docforge-render errors (separate crate)                               │
//! │  └── RenderError      - NotFound / Render / Superseded / Timeout       │
//! │                         (wraps ValidationError via #[from])            │
//! │                                                                         │
//! │  Flow: ValidationError → RenderError → ErrorBody {code, message}       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, offending value)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet requirements. They are fatal
/// at the render boundary: surfaced immediately, never retried here.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format.
    ///
    /// ## When This Occurs
    /// - Template id contains characters outside `[A-Za-z0-9_-]`
    ///   (the sole defense against path traversal, checked before any
    ///   storage access)
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with ValidationError.
pub type CoreResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::Required {
            field: "document number".to_string(),
        };
        assert_eq!(err.to_string(), "document number is required");

        let err = ValidationError::InvalidFormat {
            field: "template_id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        };
        assert!(err.to_string().starts_with("template_id has invalid format"));
    }
}
