//! # Validation Module
//!
//! Input validation utilities for docforge.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Data-entry wizard (external)                                 │
//! │  ├── Required-field enforcement, numeric range clamping                │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (render boundary)                                │
//! │  ├── Template id charset check - BEFORE any storage access             │
//! │  └── Per-type required document fields                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Calculation/binding (docforge-core/render)                   │
//! │  ├── NaN/negative clamping (never crash)                               │
//! │  └── Collection-size truncation (500 items, 10 tax lines)              │
//! │                                                                         │
//! │  Defense in depth: the wizard is trusted for ranges, never for sizes   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreResult, ValidationError};
use crate::types::{Document, DocumentType};
use crate::MAX_TEMPLATE_ID_LEN;

// =============================================================================
// Template Id Validation
// =============================================================================

/// Validates a template identifier.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_TEMPLATE_ID_LEN`] characters
/// - Only `[A-Za-z0-9_-]`
///
/// This check MUST run before any filesystem/storage access: it is the sole
/// defense against path traversal in template ids.
///
/// ## Example
/// ```rust
/// use docforge_core::validation::validate_template_id;
///
/// assert!(validate_template_id("template-1").is_ok());
/// assert!(validate_template_id("../etc/passwd").is_err());
/// assert!(validate_template_id("<script>").is_err());
/// assert!(validate_template_id("a b").is_err());
/// ```
pub fn validate_template_id(id: &str) -> CoreResult<()> {
    if id.is_empty() {
        return Err(ValidationError::Required {
            field: "template_id".to_string(),
        });
    }

    if id.len() > MAX_TEMPLATE_ID_LEN {
        return Err(ValidationError::TooLong {
            field: "template_id".to_string(),
            max: MAX_TEMPLATE_ID_LEN,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "template_id".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Document Validation
// =============================================================================

/// Validates the per-type required fields of a document.
///
/// ## Rules
/// - The document kind must match the requested document type
/// - The currency code must be present
/// - The type-specific document number must be non-empty, except for the
///   canonical empty document that warmup/preload renders
pub fn validate_document(document: &Document, document_type: DocumentType) -> CoreResult<()> {
    if document.document_type() != document_type {
        return Err(ValidationError::InvalidFormat {
            field: "document".to_string(),
            reason: format!(
                "kind is {} but {} was requested",
                document.document_type(),
                document_type
            ),
        });
    }

    if document.currency.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "currency".to_string(),
        });
    }

    if document.kind.number().trim().is_empty() && *document != Document::empty(document_type) {
        return Err(ValidationError::Required {
            field: "document number".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Clamps
// =============================================================================

/// Clamps a monetary/tax input to a sane non-negative finite value.
///
/// The wizard is expected to have validated ranges already, but the
/// calculation engine must not crash on NaN or negative input.
#[inline]
pub fn clamp_non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Clamps a percentage to the 0-100 range (NaN becomes 0).
#[inline]
pub fn clamp_percent(value: f64) -> f64 {
    clamp_non_negative(value).min(100.0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentKind;

    #[test]
    fn test_validate_template_id() {
        // Valid ids
        assert!(validate_template_id("template-1").is_ok());
        assert!(validate_template_id("classic").is_ok());
        assert!(validate_template_id("thermal_80mm").is_ok());

        // Invalid ids
        assert!(validate_template_id("").is_err());
        assert!(validate_template_id("../etc/passwd").is_err());
        assert!(validate_template_id("<script>").is_err());
        assert!(validate_template_id("a b").is_err());
        assert!(validate_template_id("a/b").is_err());
        assert!(validate_template_id(&"a".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_document_kind_mismatch() {
        let doc = Document::empty(DocumentType::Invoice);
        assert!(validate_document(&doc, DocumentType::Invoice).is_ok());
        assert!(validate_document(&doc, DocumentType::Receipt).is_err());
    }

    #[test]
    fn test_validate_document_currency() {
        let mut doc = Document::empty(DocumentType::Quotation);
        doc.currency = "  ".into();
        assert!(validate_document(&doc, DocumentType::Quotation).is_err());
    }

    #[test]
    fn test_validate_document_number() {
        // Canonical empty document passes (warmup path).
        let empty = Document::empty(DocumentType::Invoice);
        assert!(validate_document(&empty, DocumentType::Invoice).is_ok());

        // A real document with a number passes.
        let doc = Document {
            kind: DocumentKind::Invoice {
                number: "INV-1".into(),
            },
            ..Document::empty(DocumentType::Invoice)
        };
        assert!(validate_document(&doc, DocumentType::Invoice).is_ok());

        // A non-empty document missing its number is rejected.
        let mut bad = doc.clone();
        bad.kind = DocumentKind::Invoice {
            number: "".into(),
        };
        bad.order_reference = Some("PO-9".into());
        assert!(validate_document(&bad, DocumentType::Invoice).is_err());
    }

    #[test]
    fn test_clamps() {
        assert_eq!(clamp_non_negative(5.0), 5.0);
        assert_eq!(clamp_non_negative(-1.0), 0.0);
        assert_eq!(clamp_non_negative(f64::NAN), 0.0);
        assert_eq!(clamp_non_negative(f64::INFINITY), 0.0);

        assert_eq!(clamp_percent(16.0), 16.0);
        assert_eq!(clamp_percent(250.0), 100.0);
        assert_eq!(clamp_percent(-3.0), 0.0);
    }
}
