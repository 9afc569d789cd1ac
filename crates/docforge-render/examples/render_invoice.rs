//! Renders a sample invoice against an in-memory template and prints the
//! finished HTML plus cache counters.
//!
//! Run with: `cargo run -p docforge-render --example render_invoice`

use std::sync::Arc;

use docforge_core::{AmountKind, Document, DocumentKind, DocumentType, LineItem, TaxLine};
use docforge_render::{
    MemoryTemplateStore, RenderConfig, RenderOptions, RenderService, TemplateStore,
};

const CLASSIC_INVOICE: &str = r#"<html>
<body>
  <h1 id="document-title">Document</h1>
  <p>No. <span id="document-number"></span> · Issued <span id="issue-date"></span></p>
  <p>From <strong id="emitter-name"></strong> · To <strong id="recipient-name"></strong></p>
  <table>
    <tbody id="item-rows"></tbody>
  </table>
  <table>
    <tbody id="tax-breakdown"></tbody>
  </table>
  <p>Subtotal <span id="totals-subtotal"></span></p>
  <p>Taxes <span id="totals-taxes"></span></p>
  <p>Discount <span id="totals-discount"></span></p>
  <p>Total <span id="totals-final"></span></p>
</body>
</html>"#;

fn sample_invoice() -> Document {
    let mut doc = Document::empty(DocumentType::Invoice);
    doc.kind = DocumentKind::Invoice {
        number: "INV-2026-0042".into(),
    };
    doc.emitter.name = Some("Acme Widgets Ltd".into());
    doc.recipient = Some(docforge_core::Party {
        name: Some("Globex Corp".into()),
        ..Default::default()
    });
    doc.discount_kind = AmountKind::Percent;
    doc.discount_value = 10.0;
    doc.items = vec![
        LineItem {
            id: "1".into(),
            description: "Widget, standard".into(),
            quantity: 2,
            unit_price: 100.0,
            taxes: vec![TaxLine {
                name: "VAT".into(),
                kind: AmountKind::Percent,
                value: 16.0,
            }],
        },
        LineItem {
            id: "2".into(),
            description: "Rush handling".into(),
            quantity: 1,
            unit_price: 50.0,
            taxes: vec![],
        },
    ];
    doc
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docforge_render=debug".into()),
        )
        .init();

    let store = Arc::new(MemoryTemplateStore::new());
    store.insert(DocumentType::Invoice, "classic", CLASSIC_INVOICE);

    let service = Arc::new(RenderService::new(
        store as Arc<dyn TemplateStore>,
        RenderConfig::default(),
    ));

    let report = service.warmup(DocumentType::Invoice).await;
    println!(
        "warmup: {} attempted, {} cached, {} skipped",
        report.attempted, report.succeeded, report.failed
    );

    let doc = sample_invoice();
    for pass in 1..=2 {
        let outcome = service
            .render("classic", DocumentType::Invoice, &doc, RenderOptions::default())
            .await
            .unwrap();
        println!(
            "pass {pass}: from_cache={}, {} bytes",
            outcome.from_cache(),
            outcome.html().map(str::len).unwrap_or(0)
        );
    }

    let outcome = service
        .render("classic", DocumentType::Invoice, &doc, RenderOptions::default())
        .await
        .unwrap();
    println!("\n{}", outcome.html().unwrap_or(""));
    println!("\ncache stats: {:?}", service.cache_stats());
}
