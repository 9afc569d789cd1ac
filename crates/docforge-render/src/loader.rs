//! # Template Loader
//!
//! Resolves a validated template id + document type to sanitized markup.
//!
//! ## Load Path
//! ```text
//! load(template_id, document_type)
//!      │
//!      ▼
//! validate_template_id ← BEFORE any storage access (path-traversal defense)
//!      │
//!      ▼
//! sanitized-markup cache hit? ──yes──► return cached Arc<str>
//!      │ no
//!      ▼
//! store.fetch → None → NotFound
//!      │ Some(raw)
//!      ▼
//! sanitize(raw) → insert into cache → return
//! ```
//!
//! Sanitization runs at most once per `(document_type, template_id)` per
//! process lifetime, or until explicit invalidation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use docforge_core::validation::validate_template_id;
use docforge_core::DocumentType;

use crate::error::{RenderError, RenderResult};
use crate::sanitize::sanitize;
use crate::store::TemplateStore;

type LoaderKey = (DocumentType, String);

// =============================================================================
// Template Loader
// =============================================================================

/// Loads, sanitizes, and caches template markup.
pub struct TemplateLoader {
    store: Arc<dyn TemplateStore>,
    cache: RwLock<HashMap<LoaderKey, Arc<str>>>,
}

impl TemplateLoader {
    /// Creates a loader over the given store.
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        TemplateLoader {
            store,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Loads sanitized markup for a template.
    ///
    /// Fails with `Validation` for malformed ids (checked before any
    /// storage access) and `NotFound` when no backing resource exists.
    pub fn load(&self, template_id: &str, document_type: DocumentType) -> RenderResult<Arc<str>> {
        validate_template_id(template_id)?;

        let key = (document_type, template_id.to_string());

        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(markup) = cache.get(&key) {
                debug!(template_id, %document_type, "sanitized template cache hit");
                return Ok(Arc::clone(markup));
            }
        }

        let raw = self
            .store
            .fetch(document_type, template_id)
            .map_err(|err| {
                warn!(template_id, %document_type, error = %err, "template storage failed");
                RenderError::Storage(err.to_string())
            })?
            .ok_or_else(|| RenderError::NotFound {
                template_id: template_id.to_string(),
                document_type,
            })?;

        let sanitized: Arc<str> = Arc::from(sanitize(&raw));
        debug!(
            template_id,
            %document_type,
            raw_len = raw.len(),
            sanitized_len = sanitized.len(),
            "template sanitized"
        );

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        // A concurrent load may have won the race; keep the existing entry
        // so all callers share one allocation.
        let entry = cache.entry(key).or_insert(sanitized);
        Ok(Arc::clone(entry))
    }

    /// Checks whether a backing resource exists, without sanitizing or
    /// caching markup.
    pub fn exists(&self, template_id: &str, document_type: DocumentType) -> RenderResult<bool> {
        validate_template_id(template_id)?;

        let key = (document_type, template_id.to_string());
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if cache.contains_key(&key) {
                return Ok(true);
            }
        }

        Ok(self
            .store
            .fetch(document_type, template_id)
            .map_err(|err| RenderError::Storage(err.to_string()))?
            .is_some())
    }

    /// Drops the cached sanitized markup for one template.
    pub fn invalidate(&self, template_id: &str, document_type: DocumentType) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.remove(&(document_type, template_id.to_string()));
    }

    /// Drops every cached sanitized template.
    pub fn invalidate_all(&self) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        cache.clear();
    }

    /// Number of cached sanitized templates.
    pub fn cached_count(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTemplateStore;

    fn loader_with(template_id: &str, markup: &str) -> (Arc<MemoryTemplateStore>, TemplateLoader) {
        let store = Arc::new(MemoryTemplateStore::new());
        store.insert(DocumentType::Invoice, template_id, markup);
        let loader = TemplateLoader::new(Arc::clone(&store) as Arc<dyn TemplateStore>);
        (store, loader)
    }

    #[test]
    fn test_invalid_id_rejected_before_storage_access() {
        let (store, loader) = loader_with("classic", "<html></html>");

        for bad in ["../etc/passwd", "<script>", "a b"] {
            let err = loader.load(bad, DocumentType::Invoice).unwrap_err();
            assert_eq!(err.code(), "validation_error");
        }
        // No fetch ever reached the store.
        assert_eq!(store.fetch_count(), 0);
    }

    #[test]
    fn test_load_sanitizes() {
        let (_, loader) = loader_with(
            "classic",
            "<div id=\"x\" onclick=\"p()\">ok</div><script>alert(1)</script>",
        );

        let markup = loader.load("classic", DocumentType::Invoice).unwrap();
        assert!(!markup.contains("script"));
        assert!(!markup.contains("onclick"));
        assert!(markup.contains("ok"));
    }

    #[test]
    fn test_sanitization_runs_once() {
        let (store, loader) = loader_with("classic", "<html></html>");

        loader.load("classic", DocumentType::Invoice).unwrap();
        loader.load("classic", DocumentType::Invoice).unwrap();
        loader.load("classic", DocumentType::Invoice).unwrap();
        assert_eq!(store.fetch_count(), 1);
    }

    #[test]
    fn test_missing_template_is_not_found() {
        let (_, loader) = loader_with("classic", "<html></html>");
        let err = loader.load("missing", DocumentType::Invoice).unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn test_invalidate_forces_refetch() {
        let (store, loader) = loader_with("classic", "<html></html>");

        loader.load("classic", DocumentType::Invoice).unwrap();
        loader.invalidate("classic", DocumentType::Invoice);
        loader.load("classic", DocumentType::Invoice).unwrap();
        assert_eq!(store.fetch_count(), 2);
    }

    #[test]
    fn test_exists() {
        let (_, loader) = loader_with("classic", "<html></html>");
        assert!(loader.exists("classic", DocumentType::Invoice).unwrap());
        assert!(!loader.exists("missing", DocumentType::Invoice).unwrap());
        assert!(loader.exists("../x", DocumentType::Invoice).is_err());
    }
}
