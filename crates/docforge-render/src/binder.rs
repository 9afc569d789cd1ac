//! # Placeholder Substitution Engine
//!
//! Binds document data and calculation results into sanitized template
//! markup. Slots are markup elements addressed by a stable `id` attribute;
//! only their inner content is replaced, surrounding tags and attributes
//! stay untouched.
//!
//! ## Binding Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  bind(markup, document, totals, document_type)                          │
//! │                                                                         │
//! │  1. Flat slot map: emitter, recipient, header, type-specific fields     │
//! │     (exactly one number + one title slot resolves per render)           │
//! │  2. Escape-and-replace every mapped slot (inner text only)              │
//! │  3. Item rows into the id="item-rows" container                         │
//! │     - data-compact="true"  → 3 columns (taxes inlined in description)   │
//! │     - otherwise            → 5 columns                                  │
//! │     - 0 items              → single "no items" row, correct colspan     │
//! │  4. Totals slots + tax-breakdown block LAST                             │
//! │                                                                         │
//! │  Any panic inside binding is caught at the boundary: the original       │
//! │  sanitized markup is returned, never a half-bound document.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every substituted value goes through HTML escaping, including values
//! from internal computation; the substitution step is injection-safe
//! regardless of upstream input.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::warn;

use docforge_core::calc::{line_totals, tax_amount, tax_breakdown, Totals};
use docforge_core::format::{
    escape_html, format_money, format_opt_date, format_percent, format_quantity,
};
use docforge_core::types::{AmountKind, Document, DocumentKind, DocumentType, LineItem, Party};
use docforge_core::{MAX_RENDER_ITEMS, MAX_TAX_LINES_PER_ITEM};

use crate::error::RenderError;

// =============================================================================
// Public Entry Point
// =============================================================================

/// The result of a bind: final HTML, or the untouched sanitized markup
/// plus the error when binding failed (fail-safe degrade at this layer;
/// the orchestrator still records the condition).
#[derive(Debug)]
pub struct BindOutcome {
    /// Bound HTML on success; the original sanitized markup on failure.
    pub html: String,

    /// Present when binding degraded.
    pub error: Option<RenderError>,
}

/// Binds a document into sanitized markup.
pub fn bind(
    markup: &str,
    document: &Document,
    totals: &Totals,
    document_type: DocumentType,
) -> BindOutcome {
    match catch_unwind(AssertUnwindSafe(|| {
        bind_inner(markup, document, totals, document_type)
    })) {
        Ok(html) => BindOutcome { html, error: None },
        Err(_) => {
            warn!(%document_type, "placeholder substitution panicked; returning unbound markup");
            BindOutcome {
                html: markup.to_string(),
                error: Some(RenderError::Render {
                    reason: "placeholder substitution failed".to_string(),
                }),
            }
        }
    }
}

fn bind_inner(
    markup: &str,
    document: &Document,
    totals: &Totals,
    document_type: DocumentType,
) -> String {
    let mut html = markup.to_string();

    // 1-2. Flat slot map, escape-and-replace.
    for (slot, value) in build_slot_map(document, document_type) {
        html = replace_slot_text(&html, slot, &value);
    }

    // 3. Item rows.
    let compact = container_is_compact(&html, "item-rows");
    let rows = build_item_rows(document, compact);
    if let Some(replaced) = replace_inner(&html, "item-rows", &rows) {
        html = replaced;
    }

    // 4. Totals and the tax breakdown block come last.
    let currency = document.currency.as_str();
    for (slot, amount) in [
        ("totals-subtotal", totals.subtotal),
        ("totals-taxes", totals.total_taxes),
        ("totals-discount", totals.discount_amount),
        ("totals-final", totals.final_total),
    ] {
        html = replace_slot_text(&html, slot, &format_money(amount, currency));
    }

    let breakdown = build_tax_breakdown_rows(document);
    if let Some(replaced) = replace_inner(&html, "tax-breakdown", &breakdown) {
        html = replaced;
    }

    html
}

// =============================================================================
// Slot Map
// =============================================================================

/// Builds the flat slot-name → display-string mapping.
///
/// Exactly one "number" and one "title" slot resolves per render. A receipt
/// kind overrides the generic title regardless of the requested type,
/// because receipts reuse invoice-shaped templates.
fn build_slot_map(document: &Document, document_type: DocumentType) -> Vec<(&'static str, String)> {
    let mut slots: Vec<(&'static str, String)> = Vec::with_capacity(24);

    let title = match &document.kind {
        DocumentKind::Receipt { .. } => DocumentType::Receipt.title(),
        _ => document_type.title(),
    };
    slots.push(("document-title", title.to_string()));
    slots.push(("document-number", document.kind.number().to_string()));

    push_party_slots(
        &mut slots,
        &document.emitter,
        [
            "emitter-name",
            "emitter-tax-id",
            "emitter-country",
            "emitter-city",
            "emitter-address",
            "emitter-phone",
            "emitter-email",
        ],
    );

    // Recipient is optional (receipts); absent fields render blank.
    let recipient = document.recipient.clone().unwrap_or_default();
    push_party_slots(
        &mut slots,
        &recipient,
        [
            "recipient-name",
            "recipient-tax-id",
            "recipient-country",
            "recipient-city",
            "recipient-address",
            "recipient-phone",
            "recipient-email",
        ],
    );

    slots.push((
        "issue-date",
        format_opt_date(Some(document.issue_date)),
    ));
    slots.push(("due-date", format_opt_date(document.due_date)));
    slots.push(("currency", document.currency.clone()));
    slots.push(("terms", document.terms.clone().unwrap_or_default()));
    slots.push((
        "order-reference",
        document.order_reference.clone().unwrap_or_default(),
    ));

    if let DocumentKind::Receipt {
        amount_received,
        payment_method,
        payment_reference,
        source_document,
        ..
    } = &document.kind
    {
        slots.push((
            "amount-received",
            format_money(*amount_received, &document.currency),
        ));
        slots.push((
            "payment-method",
            payment_method.clone().unwrap_or_default(),
        ));
        slots.push((
            "payment-reference",
            payment_reference.clone().unwrap_or_default(),
        ));
        slots.push((
            "source-document",
            source_document.clone().unwrap_or_default(),
        ));
    }

    slots
}

fn push_party_slots(
    slots: &mut Vec<(&'static str, String)>,
    party: &Party,
    names: [&'static str; 7],
) {
    let fields = [
        &party.name,
        &party.tax_id,
        &party.country,
        &party.city,
        &party.address,
        &party.phone,
        &party.email,
    ];
    for (slot, field) in names.into_iter().zip(fields) {
        slots.push((slot, field.clone().unwrap_or_default()));
    }
}

// =============================================================================
// Item Rows
// =============================================================================

/// Builds the item-table rows for the active layout mode.
fn build_item_rows(document: &Document, compact: bool) -> String {
    let columns = if compact { 3 } else { 5 };
    let currency = document.currency.as_str();

    let items = &document.items[..document.items.len().min(MAX_RENDER_ITEMS)];
    if items.is_empty() {
        return format!(
            "<tr><td class=\"no-items\" colspan=\"{columns}\">No items</td></tr>"
        );
    }

    let mut rows = String::with_capacity(items.len() * 96);
    for item in items {
        let line = line_totals(item);
        let description = escape_html(&item.description);
        let quantity = format_quantity(item.quantity);
        let line_total = format_money(line.line_total, currency);
        let taxes = build_tax_cell(item, line.subtotal, currency);

        if compact {
            let tax_block = if taxes.is_empty() {
                String::new()
            } else {
                format!("<br/><small>{taxes}</small>")
            };
            rows.push_str(&format!(
                "<tr><td>{quantity}</td><td>{description}{tax_block}</td><td>{line_total}</td></tr>"
            ));
        } else {
            let unit_price = format_money(item.unit_price, currency);
            rows.push_str(&format!(
                "<tr><td>{quantity}</td><td>{description}</td><td>{unit_price}</td><td>{taxes}</td><td>{line_total}</td></tr>"
            ));
        }
    }
    rows
}

/// Per-item tax summary, capped at the tax-line limit.
fn build_tax_cell(item: &LineItem, subtotal: f64, currency: &str) -> String {
    item.taxes
        .iter()
        .take(MAX_TAX_LINES_PER_ITEM)
        .map(|tax| {
            let amount = tax_amount(tax, subtotal);
            let label = match tax.kind {
                AmountKind::Percent => {
                    format!("{} ({})", escape_html(&tax.name), format_percent(tax.value))
                }
                AmountKind::Fixed => escape_html(&tax.name),
            };
            format!("{label}: {}", format_money(amount, currency))
        })
        .collect::<Vec<_>>()
        .join("<br/>")
}

/// Aggregated document-level tax breakdown rows (zero entries omitted,
/// capped upstream in the calculation engine).
fn build_tax_breakdown_rows(document: &Document) -> String {
    let entries = tax_breakdown(&document.items);
    if entries.is_empty() {
        return String::new();
    }

    let currency = document.currency.as_str();
    entries
        .iter()
        .map(|entry| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&entry.name),
                format_money(entry.amount, currency)
            )
        })
        .collect::<String>()
}

// =============================================================================
// Replacement Primitives
// =============================================================================

/// Locates the `id="slot"` (or `id='slot'`) attribute occurrence.
fn find_id_attr(markup: &str, slot: &str) -> Option<(usize, usize)> {
    let double = format!("id=\"{slot}\"");
    if let Some(start) = markup.find(&double) {
        return Some((start, start + double.len()));
    }
    let single = format!("id='{slot}'");
    markup
        .find(&single)
        .map(|start| (start, start + single.len()))
}

/// Replaces the inner text of the slot element with an escaped value.
/// A markup with no such slot is returned unchanged.
fn replace_slot_text(markup: &str, slot: &str, value: &str) -> String {
    let escaped = escape_html(value);
    replace_inner(markup, slot, &escaped).unwrap_or_else(|| markup.to_string())
}

/// Replaces the inner content of the element carrying `id="slot"`.
///
/// Primary strategy: from the end of the opening tag to the element's
/// closing tag. When no matching closing-tag pattern exists (defensive
/// markup variance), falls back to a looser replace covering only the
/// content immediately following the id attribute up to the next `<`.
fn replace_inner(markup: &str, slot: &str, new_inner: &str) -> Option<String> {
    let (attr_start, attr_end) = find_id_attr(markup, slot)?;

    let open_end = markup[attr_end..].find('>').map(|i| attr_end + i);
    let tag_name = markup[..attr_start].rfind('<').and_then(|lt| {
        let name: String = markup[lt + 1..attr_start]
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect();
        (!name.is_empty()).then_some(name)
    });

    if let (Some(open_end), Some(tag)) = (open_end, &tag_name) {
        let closing = format!("</{tag}");
        if let Some(close_start) = find_ascii_ci(markup, &closing, open_end + 1) {
            let mut out =
                String::with_capacity(markup.len() + new_inner.len());
            out.push_str(&markup[..=open_end]);
            out.push_str(new_inner);
            out.push_str(&markup[close_start..]);
            return Some(out);
        }
    }

    // Loose fallback: content after the id attribute (past the opening
    // tag's '>' when present) up to the next '<'.
    let start = open_end.map(|i| i + 1).unwrap_or(attr_end);
    let end = markup[start..]
        .find('<')
        .map(|i| start + i)
        .unwrap_or(markup.len());

    let mut out = String::with_capacity(markup.len() + new_inner.len());
    out.push_str(&markup[..start]);
    out.push_str(new_inner);
    out.push_str(&markup[end..]);
    Some(out)
}

/// Case-insensitive ASCII substring search from a byte offset.
fn find_ascii_ci(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() || from + pat.len() > hay.len() {
        return None;
    }
    (from..=hay.len() - pat.len())
        .find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

/// Whether the row container is flagged compact via `data-compact="true"`.
fn container_is_compact(markup: &str, slot: &str) -> bool {
    let Some((attr_start, attr_end)) = find_id_attr(markup, slot) else {
        return false;
    };
    let tag_start = markup[..attr_start].rfind('<').unwrap_or(0);
    let tag_end = markup[attr_end..]
        .find('>')
        .map(|i| attr_end + i)
        .unwrap_or(markup.len());
    let tag_text = &markup[tag_start..tag_end];
    tag_text.contains("data-compact=\"true\"") || tag_text.contains("data-compact='true'")
}

// =============================================================================
// Unit Tests
// =============================================================================
