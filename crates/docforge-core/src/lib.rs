//! # docforge-core: Pure Business Logic for docforge
//!
//! This crate is the **heart** of docforge. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       docforge Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Embedding App (wizard UI, persistence)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ render(templateId, type, document)     │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 docforge-render (Service Layer)                 │   │
//! │  │     registry, loader, sanitizer, binder, cache, orchestrator    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ docforge-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   calc    │  │   canon   │  │ validation│  │   │
//! │  │   │ Document  │  │  Totals   │  │ hash keys │  │   rules   │  │   │
//! │  │   │ LineItem  │  │ TaxMath   │  │  (sha256) │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TEMPLATE STORAGE • NO CACHE • PURE FUNCTIONS     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Document, LineItem, TaxLine, Template, etc.)
//! - [`calc`] - Tax/discount/total arithmetic (unrounded accumulation)
//! - [`canon`] - Canonical document serialization and cache-key hashing
//! - [`format`] - Display formatting and HTML escaping
//! - [`error`] - Domain error types
//! - [`validation`] - Template-id and document validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Template storage, caching, network access is FORBIDDEN here
//! 3. **Never Crash on Bad Numbers**: NaN/negative inputs clamp to zero
//! 4. **Explicit Errors**: All errors are typed, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calc;
pub mod canon;
pub mod error;
pub mod format;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use docforge_core::Document` instead of
// `use docforge_core::types::Document`

pub use calc::{compute_totals, line_totals, LineTotals, TaxBreakdownEntry, Totals};
pub use canon::canonical_hash;
pub use error::{CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of line items that a single document renders.
///
/// ## Business Reason
/// Bounds the work done for adversarial or malformed payloads. Excess items
/// are silently truncated, never an error; the calculation engine applies
/// the same cap so displayed totals always match displayed rows.
pub const MAX_RENDER_ITEMS: usize = 500;

/// Maximum tax lines rendered per line item.
///
/// ## Business Reason
/// Same bounding rationale as [`MAX_RENDER_ITEMS`]. Documents with more tax
/// lines are legal input; only the surplus lines are dropped from the output.
pub const MAX_TAX_LINES_PER_ITEM: usize = 10;

/// Maximum entries in the document-level tax breakdown block.
pub const MAX_TAX_BREAKDOWN_ENTRIES: usize = 10;

/// Maximum accepted length of a template identifier.
pub const MAX_TEMPLATE_ID_LEN: usize = 64;
