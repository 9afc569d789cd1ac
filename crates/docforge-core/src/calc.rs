//! # Calculation Engine
//!
//! Per-item and per-document tax/discount/total arithmetic.
//!
//! ## Numeric Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CALCULATION RULES                                                      │
//! │                                                                         │
//! │  item.subtotal   = quantity × unit_price                                │
//! │  tax(percent)    = item.subtotal × value / 100                          │
//! │  tax(fixed)      = value                                                │
//! │  item.line_total = item.subtotal + Σ tax                                │
//! │                                                                         │
//! │  doc.subtotal    = Σ item.line_total                                    │
//! │  doc.discount    = percent ? doc.subtotal × value / 100 : value         │
//! │  doc.final       = max(0, doc.subtotal − doc.discount)                  │
//! │                                                                         │
//! │  Accumulation is UNROUNDED (f64). Half-up 2-decimal rounding happens    │
//! │  only at display formatting, so rounding error never compounds across   │
//! │  items.                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Pure functions: no side effects, no I/O, never fail. NaN and negative
//! inputs clamp to zero; percent values clamp to 100. The truncation caps
//! ([`crate::MAX_RENDER_ITEMS`], [`crate::MAX_TAX_LINES_PER_ITEM`]) are
//! applied here exactly as the binder applies them, so displayed totals
//! always agree with displayed rows.

use serde::{Deserialize, Serialize};

use crate::types::{AmountKind, LineItem, TaxLine};
use crate::validation::{clamp_non_negative, clamp_percent};
use crate::{MAX_RENDER_ITEMS, MAX_TAX_BREAKDOWN_ENTRIES, MAX_TAX_LINES_PER_ITEM};

// =============================================================================
// Result Types
// =============================================================================

/// Derived amounts for a single line item. Never stored on the item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineTotals {
    /// quantity × unit_price.
    pub subtotal: f64,

    /// Sum of this line's tax amounts (capped at
    /// [`MAX_TAX_LINES_PER_ITEM`] lines).
    pub tax_total: f64,

    /// subtotal + tax_total.
    pub line_total: f64,
}

/// Document-level totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of line totals across the rendered items.
    pub subtotal: f64,

    /// Sum of tax totals across the rendered items.
    pub total_taxes: f64,

    /// The discount actually applied (clamped so the final total
    /// never goes negative).
    pub discount_amount: f64,

    /// subtotal − discount_amount, floored at zero.
    pub final_total: f64,
}

/// One aggregated entry of the document-level tax breakdown block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdownEntry {
    /// Tax name as it appeared on the tax lines (aggregation key).
    pub name: String,

    /// Total amount collected under this name across all rendered items.
    pub amount: f64,
}

// =============================================================================
// Per-Line Arithmetic
// =============================================================================

/// The amount a single tax line contributes, given its line's subtotal.
#[inline]
pub fn tax_amount(tax: &TaxLine, subtotal: f64) -> f64 {
    match tax.kind {
        AmountKind::Percent => subtotal * clamp_percent(tax.value) / 100.0,
        AmountKind::Fixed => clamp_non_negative(tax.value),
    }
}

/// Derives the totals for one line item.
///
/// ## Example
/// ```rust
/// use docforge_core::calc::line_totals;
/// use docforge_core::types::{AmountKind, LineItem, TaxLine};
///
/// let item = LineItem {
///     id: "a".into(),
///     description: "Widget".into(),
///     quantity: 2,
///     unit_price: 100.0,
///     taxes: vec![TaxLine { name: "VAT".into(), kind: AmountKind::Percent, value: 16.0 }],
/// };
/// let t = line_totals(&item);
/// assert_eq!(t.subtotal, 200.0);
/// assert_eq!(t.tax_total, 32.0);
/// assert_eq!(t.line_total, 232.0);
/// ```
pub fn line_totals(item: &LineItem) -> LineTotals {
    let subtotal = f64::from(item.quantity) * clamp_non_negative(item.unit_price);

    let tax_total: f64 = item
        .taxes
        .iter()
        .take(MAX_TAX_LINES_PER_ITEM)
        .map(|tax| tax_amount(tax, subtotal))
        .sum();

    LineTotals {
        subtotal,
        tax_total,
        line_total: subtotal + tax_total,
    }
}

// =============================================================================
// Document Arithmetic
// =============================================================================

/// Computes document-level totals.
///
/// Only the first [`MAX_RENDER_ITEMS`] items participate, matching what the
/// binder renders. The discount clamps at the subtotal: the final total is
/// never negative.
pub fn compute_totals(items: &[LineItem], discount_kind: AmountKind, discount_value: f64) -> Totals {
    let mut subtotal = 0.0;
    let mut total_taxes = 0.0;

    for item in items.iter().take(MAX_RENDER_ITEMS) {
        let line = line_totals(item);
        subtotal += line.line_total;
        total_taxes += line.tax_total;
    }

    let requested_discount = match discount_kind {
        AmountKind::Percent => subtotal * clamp_percent(discount_value) / 100.0,
        AmountKind::Fixed => clamp_non_negative(discount_value),
    };

    // Clamp so the final total can't go below zero.
    let discount_amount = requested_discount.min(subtotal);

    Totals {
        subtotal,
        total_taxes,
        discount_amount,
        final_total: (subtotal - discount_amount).max(0.0),
    }
}

/// Aggregates tax amounts by tax name across the rendered items.
///
/// Entries keep first-seen order, zero-amount entries are omitted, and the
/// result is capped at [`MAX_TAX_BREAKDOWN_ENTRIES`].
pub fn tax_breakdown(items: &[LineItem]) -> Vec<TaxBreakdownEntry> {
    let mut entries: Vec<TaxBreakdownEntry> = Vec::new();

    for item in items.iter().take(MAX_RENDER_ITEMS) {
        let subtotal = f64::from(item.quantity) * clamp_non_negative(item.unit_price);

        for tax in item.taxes.iter().take(MAX_TAX_LINES_PER_ITEM) {
            let amount = tax_amount(tax, subtotal);
            match entries.iter_mut().find(|e| e.name == tax.name) {
                Some(entry) => entry.amount += amount,
                None => entries.push(TaxBreakdownEntry {
                    name: tax.name.clone(),
                    amount,
                }),
            }
        }
    }

    entries.retain(|e| e.amount > 0.0);
    entries.truncate(MAX_TAX_BREAKDOWN_ENTRIES);
    entries
}

// =============================================================================
// Unit Tests
// =============================================================================
