//! # Render Error Types
//!
//! Error taxonomy for the rendering service, plus the wire-format error
//! body exposed at the API boundary.
//!
//! ## Propagation Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Variant      Fatal?   Retried here?  Surfaced as                      │
//! │  ──────────   ──────   ────────────   ─────────────────────────────     │
//! │  Validation   yes      never          {code: "validation_error"}       │
//! │  NotFound     yes      never          {code: "not_found"}              │
//! │  Render       no       never          degraded markup + error flag     │
//! │  Superseded   no       n/a            empty non-error result           │
//! │  Timeout      no       n/a            identical to Superseded          │
//! │  Storage      yes      never          generic message (detail is       │
//! │                                        dev-mode only)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use docforge_core::{DocumentType, ValidationError};

// =============================================================================
// Render Error
// =============================================================================

/// Errors surfaced by the rendering service.
#[derive(Debug, Clone, Error)]
pub enum RenderError {
    /// Bad template id format or missing required document field.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// No backing markup exists for (template id, document type).
    #[error("template not found: {template_id} for {document_type}")]
    NotFound {
        template_id: String,
        document_type: DocumentType,
    },

    /// Failure during calculation or placeholder binding. The orchestrator
    /// pairs this with the unbound sanitized markup (fail-safe degrade).
    #[error("render failed: {reason}")]
    Render { reason: String },

    /// The render was cancelled by the caller or superseded by a newer
    /// request for the same template. Not a failure.
    #[error("render superseded")]
    Superseded,

    /// The pipeline exceeded the configured deadline. Treated identically
    /// to [`RenderError::Superseded`] by callers.
    #[error("render timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Underlying template storage failed (I/O error, not NotFound).
    /// The raw message never leaves a production configuration.
    #[error("template storage error: {0}")]
    Storage(String),
}

impl RenderError {
    /// Stable wire code for the API boundary.
    pub const fn code(&self) -> &'static str {
        match self {
            RenderError::Validation(_) => "validation_error",
            RenderError::NotFound { .. } => "not_found",
            RenderError::Render { .. } => "render_error",
            RenderError::Superseded => "cancelled",
            RenderError::Timeout { .. } => "timeout",
            RenderError::Storage(_) => "storage_error",
        }
    }

    /// Whether this error should be surfaced to the caller as a failure.
    /// Superseded/timed-out renders are "render superseded", not failures.
    pub const fn is_fatal(&self) -> bool {
        !matches!(self, RenderError::Superseded | RenderError::Timeout { .. })
    }

    /// Message safe for external consumers in production: internal I/O
    /// details are replaced with a generic message.
    pub fn public_message(&self) -> String {
        match self {
            RenderError::Storage(_) => "template storage unavailable".to_string(),
            other => other.to_string(),
        }
    }
}

/// Convenience type alias for Results with RenderError.
pub type RenderResult<T> = Result<T, RenderError>;

// =============================================================================
// Wire Error Body
// =============================================================================

/// Structured error object returned at the render entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Stable machine-readable code.
    pub code: String,

    /// Human-readable message, safe for production.
    pub message: String,

    /// Underlying cause text. Attached only in a development
    /// configuration; always absent in production payloads.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorBody {
    /// Builds the wire body for an error. `include_detail` comes from the
    /// service configuration (development mode only).
    pub fn from_error(err: &RenderError, include_detail: bool) -> Self {
        ErrorBody {
            code: err.code().to_string(),
            message: err.public_message(),
            detail: include_detail.then(|| err.to_string()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(
            RenderError::NotFound {
                template_id: "x".into(),
                document_type: DocumentType::Invoice,
            }
            .code(),
            "not_found"
        );
        assert_eq!(RenderError::Superseded.code(), "cancelled");
        assert_eq!(RenderError::Timeout { timeout_ms: 10 }.code(), "timeout");
    }

    #[test]
    fn test_superseded_and_timeout_are_not_fatal() {
        assert!(!RenderError::Superseded.is_fatal());
        assert!(!RenderError::Timeout { timeout_ms: 10 }.is_fatal());
        assert!(RenderError::Render {
            reason: "boom".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_storage_details_hidden_in_production() {
        let err = RenderError::Storage("open /secret/path: permission denied".into());
        let body = ErrorBody::from_error(&err, false);
        assert_eq!(body.message, "template storage unavailable");
        assert!(body.detail.is_none());

        let dev = ErrorBody::from_error(&err, true);
        assert!(dev.detail.unwrap().contains("permission denied"));
    }

    #[test]
    fn test_validation_converts_to_render_error() {
        let v = ValidationError::Required {
            field: "template_id".into(),
        };
        let err: RenderError = v.into();
        assert_eq!(err.code(), "validation_error");
    }
}
