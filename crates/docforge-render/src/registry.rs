//! # Template Registry
//!
//! Static catalog of available templates, their supported document types,
//! and layout capabilities. Built once at process start and injected into
//! the orchestrator; no runtime mutation.

use docforge_core::{DocumentType, LayoutMode, Template};

// =============================================================================
// Registry
// =============================================================================

/// Read-only template catalog with circular navigation.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<Template>,
}

impl TemplateRegistry {
    /// Creates a registry from an explicit catalog.
    pub fn new(templates: Vec<Template>) -> Self {
        TemplateRegistry { templates }
    }

    /// The built-in catalog shipped with docforge.
    pub fn builtin() -> Self {
        let all = DocumentType::all().to_vec();
        TemplateRegistry::new(vec![
            Template {
                id: "classic".into(),
                name: "Classic".into(),
                supported_types: all.clone(),
                layout: LayoutMode::Detailed,
            },
            Template {
                id: "modern".into(),
                name: "Modern".into(),
                supported_types: vec![DocumentType::Invoice, DocumentType::Quotation],
                layout: LayoutMode::Detailed,
            },
            Template {
                id: "minimal".into(),
                name: "Minimal".into(),
                supported_types: all.clone(),
                layout: LayoutMode::Detailed,
            },
            Template {
                id: "thermal-80mm".into(),
                name: "Thermal 80mm".into(),
                supported_types: vec![DocumentType::Invoice, DocumentType::Receipt],
                layout: LayoutMode::Compact,
            },
            Template {
                id: "compact-a5".into(),
                name: "Compact A5".into(),
                supported_types: all,
                layout: LayoutMode::Compact,
            },
        ])
    }

    /// Looks a template up by id.
    pub fn by_id(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Templates supporting the given document type, in catalog order.
    pub fn list_by_type(&self, document_type: DocumentType) -> Vec<&Template> {
        self.templates
            .iter()
            .filter(|t| t.supports(document_type))
            .collect()
    }

    /// Whether the template exists and supports the document type.
    pub fn supports(&self, id: &str, document_type: DocumentType) -> bool {
        self.by_id(id)
            .map(|t| t.supports(document_type))
            .unwrap_or(false)
    }

    /// The next template after `id` within the type-filtered list,
    /// wrapping around at the end. An unknown `id` lands on the first
    /// entry. Returns `None` only when no template supports the type.
    pub fn next(&self, id: &str, document_type: DocumentType) -> Option<&Template> {
        self.step(id, document_type, 1)
    }

    /// The previous template before `id`, wrapping around at the start.
    pub fn prev(&self, id: &str, document_type: DocumentType) -> Option<&Template> {
        self.step(id, document_type, -1)
    }

    fn step(&self, id: &str, document_type: DocumentType, delta: isize) -> Option<&Template> {
        let filtered = self.list_by_type(document_type);
        if filtered.is_empty() {
            return None;
        }

        let len = filtered.len() as isize;
        let position = match filtered.iter().position(|t| t.id == id) {
            Some(pos) => (pos as isize + delta).rem_euclid(len),
            None => 0,
        };
        Some(filtered[position as usize])
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let reg = TemplateRegistry::builtin();
        assert!(reg.by_id("classic").is_some());
        assert!(reg.by_id("missing").is_none());
        assert!(reg.supports("classic", DocumentType::Receipt));
        assert!(!reg.supports("modern", DocumentType::Receipt));
    }

    #[test]
    fn test_list_by_type_filters() {
        let reg = TemplateRegistry::builtin();
        let receipts = reg.list_by_type(DocumentType::Receipt);
        assert!(receipts.iter().all(|t| t.supports(DocumentType::Receipt)));
        assert!(receipts.iter().any(|t| t.id == "thermal-80mm"));
        assert!(!receipts.iter().any(|t| t.id == "modern"));
    }

    #[test]
    fn test_circular_navigation() {
        let reg = TemplateRegistry::builtin();
        let invoices = reg.list_by_type(DocumentType::Invoice);
        let first = invoices.first().unwrap().id.clone();
        let last = invoices.last().unwrap().id.clone();

        // Wraps forward from the last entry to the first.
        assert_eq!(reg.next(&last, DocumentType::Invoice).unwrap().id, first);
        // Wraps backward from the first entry to the last.
        assert_eq!(reg.prev(&first, DocumentType::Invoice).unwrap().id, last);
    }

    #[test]
    fn test_navigation_from_unknown_id() {
        let reg = TemplateRegistry::builtin();
        let first = reg.list_by_type(DocumentType::Invoice)[0].id.clone();
        assert_eq!(reg.next("nope", DocumentType::Invoice).unwrap().id, first);
    }

    #[test]
    fn test_navigation_empty_catalog() {
        let reg = TemplateRegistry::new(vec![]);
        assert!(reg.next("classic", DocumentType::Invoice).is_none());
    }
}
