//! # Domain Types
//!
//! Core domain types used throughout docforge.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Document     │   │    LineItem     │   │    TaxLine      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  kind (tagged)  │   │  id             │   │  name           │       │
//! │  │  emitter        │   │  description    │   │  kind           │       │
//! │  │  recipient?     │   │  quantity       │   │  value          │       │
//! │  │  items[]        │   │  unit_price     │   └─────────────────┘       │
//! │  │  discount       │   │  taxes[]        │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DocumentKind   │   │    Template     │   │   LayoutMode    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Invoice        │   │  id             │   │  Detailed (5col)│       │
//! │  │  Quotation      │   │  name           │   │  Compact  (3col)│       │
//! │  │  Receipt        │   │  supported_types│   └─────────────────┘       │
//! │  └─────────────────┘   │  layout         │                             │
//! │                        └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Tagged Document Kinds
//! The three document shapes are a tagged union, not a bag of optional
//! fields. Every per-type lookup goes through exhaustive pattern matching,
//! so a field can never be "silently undefined" for the wrong kind.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// =============================================================================
// Document Type
// =============================================================================

/// The three business document shapes docforge renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// A bill requesting payment.
    Invoice,
    /// A price offer that has not been accepted yet.
    Quotation,
    /// Proof that a payment was received.
    Receipt,
}

impl DocumentType {
    /// Stable machine-readable name, used in storage paths and cache keys.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Quotation => "quotation",
            DocumentType::Receipt => "receipt",
        }
    }

    /// The display title placed in the template's title slot.
    pub const fn title(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "INVOICE",
            DocumentType::Quotation => "QUOTATION",
            DocumentType::Receipt => "RECEIPT",
        }
    }

    /// All document types, in catalog order.
    pub const fn all() -> [DocumentType; 3] {
        [
            DocumentType::Invoice,
            DocumentType::Quotation,
            DocumentType::Receipt,
        ]
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Amount Kind
// =============================================================================

/// How a tax or discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountKind {
    /// Value is a percentage of the base amount (0-100).
    Percent,
    /// Value is a fixed amount in the document currency.
    Fixed,
}

impl Default for AmountKind {
    fn default() -> Self {
        AmountKind::Percent
    }
}

// =============================================================================
// Party (Emitter / Recipient)
// =============================================================================

/// A party on the document: the emitting business or the recipient.
///
/// Every field is optional at this layer. Required-field enforcement is the
/// data-entry wizard's job; the renderer substitutes a blank for anything
/// absent rather than failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// Legal or display name.
    pub name: Option<String>,

    /// Tax document id (VAT number, RFC, EIN, ...).
    pub tax_id: Option<String>,

    /// Country name or code.
    pub country: Option<String>,

    /// City.
    pub city: Option<String>,

    /// Street address line.
    pub address: Option<String>,

    /// Contact phone.
    pub phone: Option<String>,

    /// Contact email.
    pub email: Option<String>,
}

// =============================================================================
// Tax Line
// =============================================================================

/// A single tax applied to a line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxLine {
    /// Display name ("VAT", "IVA 16%", ...). Also the aggregation key for
    /// the document-level tax breakdown.
    pub name: String,

    /// Percent-of-subtotal or fixed amount.
    pub kind: AmountKind,

    /// Rate (percent) or amount (fixed). Non-negative; percent <= 100.
    pub value: f64,
}

// =============================================================================
// Line Item
// =============================================================================

/// One row of the document's item table.
///
/// Derived values (subtotal, tax total, line total) are never stored; they
/// are recomputed by [`crate::calc`] so rendered totals cannot drift from
/// the item data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Caller-assigned id (UUID in practice; opaque here).
    pub id: String,

    /// Free-text description shown in the table.
    pub description: String,

    /// Units sold/quoted. Integer by contract.
    pub quantity: u32,

    /// Price per unit in the document currency.
    pub unit_price: f64,

    /// Taxes applied to this line. Only the first
    /// [`crate::MAX_TAX_LINES_PER_ITEM`] are rendered.
    #[serde(default)]
    pub taxes: Vec<TaxLine>,
}

// =============================================================================
// Document Kind (tagged union)
// =============================================================================

/// The per-type payload of a document.
///
/// ## Why a tagged union?
/// The per-type fields (invoice number vs. receipt payment details) live on
/// the variant, so every lookup is an exhaustive `match`. There is no code
/// path that reads a receipt field off an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentKind {
    /// An invoice with its invoice number.
    Invoice {
        /// Invoice number ("INV-2024-0001").
        number: String,
    },

    /// A quotation with its quotation number.
    Quotation {
        /// Quotation number ("QUO-2024-0001").
        number: String,
    },

    /// A receipt. Receipts reuse invoice-shaped templates, so they carry
    /// the payment-specific fields the binder folds into those templates.
    Receipt {
        /// Receipt number ("REC-2024-0001").
        number: String,

        /// Amount actually received.
        amount_received: f64,

        /// How payment was made ("cash", "transfer", ...).
        payment_method: Option<String>,

        /// External payment reference (bank confirmation, auth code).
        payment_reference: Option<String>,

        /// Number of the invoice/quotation this receipt settles.
        source_document: Option<String>,
    },
}

impl DocumentKind {
    /// The document type this kind belongs to.
    pub const fn document_type(&self) -> DocumentType {
        match self {
            DocumentKind::Invoice { .. } => DocumentType::Invoice,
            DocumentKind::Quotation { .. } => DocumentType::Quotation,
            DocumentKind::Receipt { .. } => DocumentType::Receipt,
        }
    }

    /// The type-specific document number.
    pub fn number(&self) -> &str {
        match self {
            DocumentKind::Invoice { number }
            | DocumentKind::Quotation { number }
            | DocumentKind::Receipt { number, .. } => number,
        }
    }
}

// =============================================================================
// Document
// =============================================================================

/// A business document as supplied by the data-entry wizard.
///
/// ## Lifecycle
/// Constructed per render call by the external boundary; docforge never
/// owns or persists it. The canonical hash of this value (plus template id
/// and document type) is the render-cache key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Type tag plus per-type fields.
    pub kind: DocumentKind,

    /// The issuing party.
    #[serde(default)]
    pub emitter: Party,

    /// The receiving party. Optional for receipts.
    #[serde(default)]
    pub recipient: Option<Party>,

    /// Item table rows. Only the first [`crate::MAX_RENDER_ITEMS`] render.
    #[serde(default)]
    pub items: Vec<LineItem>,

    /// Document-level discount interpretation.
    #[serde(default)]
    pub discount_kind: AmountKind,

    /// Document-level discount value (percent or fixed).
    #[serde(default)]
    pub discount_value: f64,

    /// ISO 4217 currency code ("USD", "EUR", "MXN").
    pub currency: String,

    /// Date the document was issued.
    pub issue_date: NaiveDate,

    /// Payment due date, when applicable.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,

    /// Free-text terms and conditions.
    #[serde(default)]
    pub terms: Option<String>,

    /// Buyer's order/PO reference.
    #[serde(default)]
    pub order_reference: Option<String>,
}

impl Document {
    /// The canonical empty document for a type, used by warmup/preload so
    /// first real requests hit a warm cache.
    pub fn empty(document_type: DocumentType) -> Self {
        let kind = match document_type {
            DocumentType::Invoice => DocumentKind::Invoice {
                number: String::new(),
            },
            DocumentType::Quotation => DocumentKind::Quotation {
                number: String::new(),
            },
            DocumentType::Receipt => DocumentKind::Receipt {
                number: String::new(),
                amount_received: 0.0,
                payment_method: None,
                payment_reference: None,
                source_document: None,
            },
        };

        Document {
            kind,
            emitter: Party::default(),
            recipient: None,
            items: Vec::new(),
            discount_kind: AmountKind::Percent,
            discount_value: 0.0,
            currency: "USD".to_string(),
            issue_date: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default(),
            due_date: None,
            terms: None,
            order_reference: None,
        }
    }

    /// The document type derived from the kind tag.
    pub const fn document_type(&self) -> DocumentType {
        self.kind.document_type()
    }
}

// =============================================================================
// Template Metadata
// =============================================================================

/// Item-table density of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// 5 columns: quantity, description, unit price, taxes, line total.
    Detailed,
    /// 3 columns: quantity, description (taxes inlined), line total.
    /// Used for narrow/thermal-style templates.
    Compact,
}

/// Catalog entry describing a visual template.
///
/// Immutable after registration; the registry hands out shared references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Stable identifier; must satisfy template-id validation.
    pub id: String,

    /// Human-readable display name for the template picker.
    pub name: String,

    /// Document types this template has backing markup for.
    pub supported_types: Vec<DocumentType>,

    /// Declared item-table density.
    pub layout: LayoutMode,
}

impl Template {
    /// Whether this template supports the given document type.
    pub fn supports(&self, document_type: DocumentType) -> bool {
        self.supported_types.contains(&document_type)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
