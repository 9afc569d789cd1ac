//! # Template Storage
//!
//! The collaborator boundary for raw template markup: a key-value or
//! filesystem-like store addressed by `(document_type, template_id)`.
//! `Ok(None)` is the defined NotFound outcome, not an error.
//!
//! Template ids are validated BEFORE any call into this module; see
//! `docforge_core::validation::validate_template_id`.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use thiserror::Error;

use docforge_core::DocumentType;

// =============================================================================
// Store Error
// =============================================================================

/// Underlying storage failure (I/O, not NotFound).
#[derive(Debug, Clone, Error)]
#[error("template storage error: {0}")]
pub struct StoreError(pub String);

// =============================================================================
// Store Trait
// =============================================================================

/// Raw markup source keyed by `(document_type, template_id)`.
pub trait TemplateStore: Send + Sync {
    /// Fetches the raw markup for a template, or `Ok(None)` if no backing
    /// resource exists for the pair.
    fn fetch(&self, document_type: DocumentType, template_id: &str)
        -> Result<Option<String>, StoreError>;
}

// =============================================================================
// Filesystem Store
// =============================================================================

/// Templates laid out as `<root>/<document_type>/<template_id>.html`.
#[derive(Debug, Clone)]
pub struct FsTemplateStore {
    root: PathBuf,
}

impl FsTemplateStore {
    /// Creates a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsTemplateStore { root: root.into() }
    }
}

impl TemplateStore for FsTemplateStore {
    fn fetch(
        &self,
        document_type: DocumentType,
        template_id: &str,
    ) -> Result<Option<String>, StoreError> {
        let path = self
            .root
            .join(document_type.as_str())
            .join(format!("{template_id}.html"));

        match std::fs::read_to_string(&path) {
            Ok(markup) => Ok(Some(markup)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(StoreError(format!("{}: {err}", path.display()))),
        }
    }
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// In-memory store for tests, demos, and embedded catalogs.
///
/// Counts fetches so tests can assert that cached renders perform no
/// storage I/O.
#[derive(Debug, Default)]
pub struct MemoryTemplateStore {
    templates: RwLock<HashMap<(DocumentType, String), String>>,
    fetch_count: AtomicUsize,
}

impl MemoryTemplateStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers markup for a `(document_type, template_id)` pair.
    pub fn insert(&self, document_type: DocumentType, template_id: &str, markup: &str) {
        let mut templates = self.templates.write().unwrap_or_else(|e| e.into_inner());
        templates.insert((document_type, template_id.to_string()), markup.to_string());
    }

    /// Number of fetches performed so far.
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::Relaxed)
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn fetch(
        &self,
        document_type: DocumentType,
        template_id: &str,
    ) -> Result<Option<String>, StoreError> {
        self.fetch_count.fetch_add(1, Ordering::Relaxed);
        let templates = self.templates.read().unwrap_or_else(|e| e.into_inner());
        Ok(templates
            .get(&(document_type, template_id.to_string()))
            .cloned())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryTemplateStore::new();
        store.insert(DocumentType::Invoice, "classic", "<html></html>");

        let markup = store.fetch(DocumentType::Invoice, "classic").unwrap();
        assert_eq!(markup.as_deref(), Some("<html></html>"));

        // Different type is a different key.
        assert!(store
            .fetch(DocumentType::Receipt, "classic")
            .unwrap()
            .is_none());
        assert_eq!(store.fetch_count(), 2);
    }

    #[test]
    fn test_fs_store_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTemplateStore::new(dir.path());
        assert!(store
            .fetch(DocumentType::Invoice, "nothing")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_fs_store_reads_markup() {
        let dir = tempfile::tempdir().unwrap();
        let invoice_dir = dir.path().join("invoice");
        std::fs::create_dir_all(&invoice_dir).unwrap();
        std::fs::write(invoice_dir.join("classic.html"), "<html>x</html>").unwrap();

        let store = FsTemplateStore::new(dir.path());
        let markup = store.fetch(DocumentType::Invoice, "classic").unwrap();
        assert_eq!(markup.as_deref(), Some("<html>x</html>"));
    }
}
