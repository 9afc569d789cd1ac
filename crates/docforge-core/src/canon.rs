//! # Canonical Hashing
//!
//! Content-addressable cache keys for rendered documents.
//!
//! ## Canonical Form
//! The canonical form of a [`Document`] is its `serde_json` serialization.
//! Struct fields serialize in declaration order, so the typed value itself
//! is the canonicalizer: two wire payloads that differ only in key order
//! deserialize to the same `Document` and hash identically, while any
//! field-value difference changes the serialization and therefore the hash.
//!
//! ## Key Composition
//! ```text
//! key = SHA-256( len(template_id) ‖ template_id
//!              ‖ len(document_type) ‖ document_type
//!              ‖ canonical_json(document) )
//! ```
//! The length prefixes prevent concatenation ambiguity: ("ab", "c") and
//! ("a", "bc") must never produce the same hash input.

use sha2::{Digest, Sha256};

use crate::types::{Document, DocumentType};

/// Computes the content-addressable render-cache key.
///
/// Deterministic: the same (template, type, document) triple always yields
/// the same 64-char lowercase hex digest.
pub fn canonical_hash(template_id: &str, document_type: DocumentType, document: &Document) -> String {
    // Serialization of plain-data structs cannot fail; non-finite floats
    // serialize as null. The Debug fallback keeps this infallible anyway.
    let canonical =
        serde_json::to_string(document).unwrap_or_else(|_| format!("{document:?}"));

    let mut hasher = Sha256::new();
    hasher.update((template_id.len() as u64).to_le_bytes());
    hasher.update(template_id.as_bytes());
    hasher.update((document_type.as_str().len() as u64).to_le_bytes());
    hasher.update(document_type.as_str().as_bytes());
    hasher.update(canonical.as_bytes());

    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(hex, "{byte:02x}");
    }
    hex
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DocumentKind, LineItem};

    fn sample() -> Document {
        let mut doc = Document::empty(DocumentType::Invoice);
        doc.kind = DocumentKind::Invoice {
            number: "INV-1".into(),
        };
        doc.items.push(LineItem {
            id: "a".into(),
            description: "Widget".into(),
            quantity: 2,
            unit_price: 100.0,
            taxes: vec![],
        });
        doc
    }

    #[test]
    fn test_hash_is_deterministic() {
        let doc = sample();
        let a = canonical_hash("classic", DocumentType::Invoice, &doc);
        let b = canonical_hash("classic", DocumentType::Invoice, &doc);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_any_field_difference_changes_hash() {
        let doc = sample();

        let mut other = doc.clone();
        other.items[0].unit_price = 100.01;
        assert_ne!(
            canonical_hash("classic", DocumentType::Invoice, &doc),
            canonical_hash("classic", DocumentType::Invoice, &other),
        );

        let mut other = doc.clone();
        other.terms = Some("Net 30".into());
        assert_ne!(
            canonical_hash("classic", DocumentType::Invoice, &doc),
            canonical_hash("classic", DocumentType::Invoice, &other),
        );
    }

    #[test]
    fn test_template_and_type_participate_in_key() {
        let doc = sample();
        assert_ne!(
            canonical_hash("classic", DocumentType::Invoice, &doc),
            canonical_hash("modern", DocumentType::Invoice, &doc),
        );
    }

    #[test]
    fn test_no_concatenation_collisions() {
        let doc = sample();
        // ("ab", ...) vs ("a", ...) with compensating content must differ.
        assert_ne!(
            canonical_hash("ab", DocumentType::Invoice, &doc),
            canonical_hash("a", DocumentType::Invoice, &doc),
        );
    }

    #[test]
    fn test_field_reordered_wire_payloads_hash_equal() {
        // Two JSON payloads with different key order parse to the same
        // Document and must produce the same cache key.
        let a = r#"{
            "kind": {"type": "invoice", "number": "INV-9"},
            "currency": "USD",
            "issue_date": "2026-08-24",
            "items": []
        }"#;
        let b = r#"{
            "issue_date": "2026-08-24",
            "items": [],
            "currency": "USD",
            "kind": {"number": "INV-9", "type": "invoice"}
        }"#;

        let doc_a: Document = serde_json::from_str(a).unwrap();
        let doc_b: Document = serde_json::from_str(b).unwrap();

        assert_eq!(
            canonical_hash("classic", DocumentType::Invoice, &doc_a),
            canonical_hash("classic", DocumentType::Invoice, &doc_b),
        );
    }
}
