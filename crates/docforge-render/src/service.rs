//! # Render Orchestrator
//!
//! Façade coordinating the full pipeline: validate → hash → cache lookup
//! → template load → totals → bind → cache write.
//!
//! ## Pipeline
//! ```text
//! render(template_id, document_type, document, options)
//!      │
//!      ▼
//! validate id ──► registry check ──► validate document
//!      │
//!      ▼
//! cancel any in-flight render for the same template id   (single flight)
//!      │
//!      ▼
//! ┌─ select ───────────────────────────────────────────────────────────────┐
//! │  superseded by newer request ─────────────► Superseded (no cache write)│
//! │  caller cancel token fired ───────────────► Superseded                 │
//! │  wall-clock timeout elapsed ──────────────► Superseded                 │
//! │  pipeline finished ───────────────────────► Rendered / Degraded        │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Single Flight
//! The calling UI re-triggers renders on every edit. Before starting work
//! for a template id, any previously in-flight render for that id is
//! cancelled (last writer wins). A superseded render resolves with an
//! empty, non-error result and performs no cache write.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use docforge_core::validation::{validate_document, validate_template_id};
use docforge_core::{canonical_hash, compute_totals, Document, DocumentType, Template};

use crate::binder::bind;
use crate::cache::{CacheKey, CacheStats, RenderCache};
use crate::error::{RenderError, RenderResult};
use crate::loader::TemplateLoader;
use crate::registry::TemplateRegistry;
use crate::store::TemplateStore;

// =============================================================================
// Configuration
// =============================================================================

/// Tunables for the rendering service.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Wall-clock deadline wrapping the full pipeline (load + compute +
    /// bind + cache write). Expiry behaves identically to cancellation.
    pub timeout: Duration,

    /// Total render-cache bound, spread across shards.
    pub cache_max_entries: usize,

    /// Attach underlying error causes to wire error bodies. Development
    /// only; production keeps storage details internal.
    pub include_error_detail: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            timeout: Duration::from_secs(10),
            cache_max_entries: 1024,
            include_error_detail: false,
        }
    }
}

// =============================================================================
// Cancellation
// =============================================================================

/// Caller-side switch that aborts an in-flight render.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signals cancellation. Idempotent.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Cancellation signal threaded through a render call. Checked at least
/// before template load and before the final cache write.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    /// Creates a connected handle/token pair.
    pub fn pair() -> (CancelHandle, CancelToken) {
        let (tx, rx) = watch::channel(false);
        (CancelHandle { tx }, CancelToken { rx })
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is signalled. Never resolves if the
    /// handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        loop {
            if *rx.borrow() {
                return;
            }
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

// =============================================================================
// Request Options & Outcome
// =============================================================================

/// Per-call options for [`RenderService::render`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Consult and populate the render cache. `false` forces a fresh
    /// pipeline run and skips the cache write.
    pub use_cache: bool,

    /// Optional caller-side cancellation signal.
    pub cancel: Option<CancelToken>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            use_cache: true,
            cancel: None,
        }
    }
}

/// Result of a render call that did not fail outright.
#[derive(Debug, Clone)]
pub enum RenderOutcome {
    /// Finished HTML, freshly bound or served from cache.
    Rendered { html: Arc<str>, from_cache: bool },

    /// Binding degraded: the sanitized markup is returned unbound together
    /// with the error, so the caller can decide whether to use it.
    Degraded { html: String, error: RenderError },

    /// Cancelled by the caller, superseded by a newer request for the same
    /// template, or timed out. Empty non-error result, no cache write.
    Superseded,
}

impl RenderOutcome {
    /// The HTML payload, if any.
    pub fn html(&self) -> Option<&str> {
        match self {
            RenderOutcome::Rendered { html, .. } => Some(html),
            RenderOutcome::Degraded { html, .. } => Some(html),
            RenderOutcome::Superseded => None,
        }
    }

    /// Whether this outcome was served from the render cache.
    pub fn from_cache(&self) -> bool {
        matches!(self, RenderOutcome::Rendered { from_cache: true, .. })
    }
}

/// Aggregate result of a preload/warmup sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WarmupReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

// =============================================================================
// Render Service
// =============================================================================

struct Inflight {
    generation: u64,
    supersede: watch::Sender<bool>,
}

/// The rendering façade: owns the registry, loader, and render cache.
pub struct RenderService {
    registry: Arc<TemplateRegistry>,
    loader: TemplateLoader,
    cache: RenderCache,
    config: RenderConfig,
    inflight: Mutex<HashMap<String, Inflight>>,
    generation: AtomicU64,
}

impl RenderService {
    /// Creates a service over the given store with the built-in catalog.
    pub fn new(store: Arc<dyn TemplateStore>, config: RenderConfig) -> Self {
        RenderService::with_registry(Arc::new(TemplateRegistry::builtin()), store, config)
    }

    /// Creates a service with an explicit template catalog.
    pub fn with_registry(
        registry: Arc<TemplateRegistry>,
        store: Arc<dyn TemplateStore>,
        config: RenderConfig,
    ) -> Self {
        RenderService {
            registry,
            loader: TemplateLoader::new(store),
            cache: RenderCache::new(config.cache_max_entries),
            config,
            inflight: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// The template catalog backing this service.
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Renders a document against a template.
    ///
    /// Starting a render for a template id synchronously cancels any
    /// still-pending render for the same id before proceeding.
    pub async fn render(
        &self,
        template_id: &str,
        document_type: DocumentType,
        document: &Document,
        options: RenderOptions,
    ) -> RenderResult<RenderOutcome> {
        validate_template_id(template_id)?;
        if !self.registry.supports(template_id, document_type) {
            return Err(RenderError::NotFound {
                template_id: template_id.to_string(),
                document_type,
            });
        }
        validate_document(document, document_type)?;

        let hash = canonical_hash(template_id, document_type, document);
        let key = CacheKey {
            template_id: template_id.to_string(),
            document_type,
            canonical_hash: hash,
        };

        // Single flight: cancel any in-flight render for this template id,
        // then register ourselves under a fresh generation.
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let (supersede_tx, supersede_rx) = watch::channel(false);
        {
            let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(previous) = inflight.insert(
                template_id.to_string(),
                Inflight {
                    generation,
                    supersede: supersede_tx,
                },
            ) {
                debug!(template_id, "superseding in-flight render");
                let _ = previous.supersede.send(true);
            }
        }

        let result = self
            .render_guarded(&key, document, &options, supersede_rx)
            .await;

        // Deregister, unless a newer render has already replaced us.
        {
            let mut inflight = self.inflight.lock().unwrap_or_else(|e| e.into_inner());
            if inflight
                .get(template_id)
                .map(|entry| entry.generation == generation)
                .unwrap_or(false)
            {
                inflight.remove(template_id);
            }
        }

        result
    }

    async fn render_guarded(
        &self,
        key: &CacheKey,
        document: &Document,
        options: &RenderOptions,
        supersede_rx: watch::Receiver<bool>,
    ) -> RenderResult<RenderOutcome> {
        let superseded = {
            let mut rx = supersede_rx.clone();
            async move {
                loop {
                    if *rx.borrow() {
                        return;
                    }
                    if rx.changed().await.is_err() {
                        std::future::pending::<()>().await;
                    }
                }
            }
        };

        let caller_cancelled = async {
            match &options.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };

        let deadline = tokio::time::Instant::now() + self.config.timeout;
        let pipeline = self.run_pipeline(key, document, options, &supersede_rx, deadline);

        tokio::select! {
            biased;
            _ = superseded => {
                debug!(template_id = %key.template_id, "render superseded by newer request");
                Ok(RenderOutcome::Superseded)
            }
            _ = caller_cancelled => {
                debug!(template_id = %key.template_id, "render cancelled by caller");
                Ok(RenderOutcome::Superseded)
            }
            result = tokio::time::timeout_at(deadline, pipeline) => match result {
                Ok(outcome) => outcome,
                Err(_) => {
                    let err = RenderError::Timeout {
                        timeout_ms: self.config.timeout.as_millis() as u64,
                    };
                    warn!(template_id = %key.template_id, error = %err, "render deadline exceeded");
                    Ok(RenderOutcome::Superseded)
                }
            },
        }
    }

    async fn run_pipeline(
        &self,
        key: &CacheKey,
        document: &Document,
        options: &RenderOptions,
        supersede_rx: &watch::Receiver<bool>,
        deadline: tokio::time::Instant,
    ) -> RenderResult<RenderOutcome> {
        // The deadline is checked here as well as by the timer wrapping
        // this future: a fast pipeline can otherwise finish (and write the
        // cache) before an already-expired timer gets a chance to fire.
        let abandoned = |cancel: &Option<CancelToken>| {
            *supersede_rx.borrow()
                || tokio::time::Instant::now() >= deadline
                || cancel
                    .as_ref()
                    .map(|token| token.is_cancelled())
                    .unwrap_or(false)
        };

        // Checkpoint before template load.
        tokio::task::yield_now().await;
        if abandoned(&options.cancel) {
            return Ok(RenderOutcome::Superseded);
        }

        if options.use_cache {
            if let Some(html) = self.cache.get(key) {
                debug!(template_id = %key.template_id, "render cache hit");
                return Ok(RenderOutcome::Rendered {
                    html,
                    from_cache: true,
                });
            }
        }

        let markup = self.loader.load(&key.template_id, key.document_type)?;

        let totals = compute_totals(&document.items, document.discount_kind, document.discount_value);
        let outcome = bind(&markup, document, &totals, key.document_type);

        if let Some(error) = outcome.error {
            // Degraded output is never cached.
            return Ok(RenderOutcome::Degraded {
                html: outcome.html,
                error,
            });
        }

        // Checkpoint before the cache write and final result.
        tokio::task::yield_now().await;
        if abandoned(&options.cancel) {
            return Ok(RenderOutcome::Superseded);
        }

        let html: Arc<str> = Arc::from(outcome.html);
        if options.use_cache {
            self.cache.put(key.clone(), Arc::clone(&html));
        }

        Ok(RenderOutcome::Rendered {
            html,
            from_cache: false,
        })
    }

    // =========================================================================
    // Preload / Warmup
    // =========================================================================

    /// Renders every template supporting `document_type` with a canonical
    /// empty document, concurrently. Per-template failures are logged and
    /// counted, never propagated.
    pub async fn preload(self: &Arc<Self>, document_type: DocumentType) -> WarmupReport {
        let template_ids: Vec<String> = self
            .registry
            .list_by_type(document_type)
            .iter()
            .map(|t| t.id.clone())
            .collect();

        let mut report = WarmupReport {
            attempted: template_ids.len(),
            ..WarmupReport::default()
        };

        let mut tasks = JoinSet::new();
        for template_id in template_ids {
            let service = Arc::clone(self);
            tasks.spawn(async move {
                let document = Document::empty(document_type);
                let result = service
                    .render(&template_id, document_type, &document, RenderOptions::default())
                    .await;
                (template_id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(RenderOutcome::Rendered { .. }))) => report.succeeded += 1,
                Ok((template_id, Ok(RenderOutcome::Degraded { error, .. }))) => {
                    warn!(template_id, %document_type, error = %error, "warmup render degraded");
                    report.failed += 1;
                }
                Ok((template_id, Ok(RenderOutcome::Superseded))) => {
                    debug!(template_id, %document_type, "warmup render superseded");
                    report.failed += 1;
                }
                Ok((template_id, Err(error))) => {
                    warn!(template_id, %document_type, error = %error, "warmup render failed");
                    report.failed += 1;
                }
                Err(join_error) => {
                    warn!(%document_type, error = %join_error, "warmup task panicked");
                    report.failed += 1;
                }
            }
        }

        info!(
            %document_type,
            attempted = report.attempted,
            succeeded = report.succeeded,
            failed = report.failed,
            "preload finished"
        );
        report
    }

    /// Alias sweep used at startup so first user requests hit the cache.
    pub async fn warmup(self: &Arc<Self>, document_type: DocumentType) -> WarmupReport {
        self.preload(document_type).await
    }

    // =========================================================================
    // Template Navigation & Maintenance
    // =========================================================================

    /// Whether a backing template resource exists for the pair. Does not
    /// sanitize or cache.
    pub fn exists(&self, template_id: &str, document_type: DocumentType) -> RenderResult<bool> {
        if !self.registry.supports(template_id, document_type) {
            return Ok(false);
        }
        self.loader.exists(template_id, document_type)
    }

    /// The next template after `current_id` for the type, wrapping around.
    pub fn next_template(&self, current_id: &str, document_type: DocumentType) -> Option<&Template> {
        self.registry.next(current_id, document_type)
    }

    /// The previous template before `current_id`, wrapping around.
    pub fn prev_template(&self, current_id: &str, document_type: DocumentType) -> Option<&Template> {
        self.registry.prev(current_id, document_type)
    }

    /// Looks a template up by id, if it supports the type.
    pub fn select_template(&self, id: &str, document_type: DocumentType) -> Option<&Template> {
        self.registry
            .by_id(id)
            .filter(|t| t.supports(document_type))
    }

    /// Drops the sanitized markup for one template so the next render
    /// refetches it, and clears the render cache (cached HTML may embed
    /// the stale markup).
    pub fn invalidate_template(&self, template_id: &str, document_type: DocumentType) {
        self.loader.invalidate(template_id, document_type);
        self.cache.clear();
        info!(template_id, %document_type, "template invalidated");
    }

    /// Current render-cache counters.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Service configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryTemplateStore;

    const MARKUP: &str = r#"<html><body>
        <h1 id="document-title">T</h1>
        <span id="document-number">N</span>
        <table><tbody id="item-rows"></tbody></table>
        <span id="totals-final">0</span>
    </body></html>"#;

    fn service_with_classic() -> (Arc<MemoryTemplateStore>, Arc<RenderService>) {
        let store = Arc::new(MemoryTemplateStore::new());
        for dt in DocumentType::all() {
            store.insert(dt, "classic", MARKUP);
        }
        let service = Arc::new(RenderService::new(
            Arc::clone(&store) as Arc<dyn TemplateStore>,
            RenderConfig::default(),
        ));
        (store, service)
    }

    fn invoice() -> Document {
        let mut doc = Document::empty(DocumentType::Invoice);
        doc.kind = docforge_core::DocumentKind::Invoice {
            number: "INV-001".into(),
        };
        doc
    }

    #[tokio::test]
    async fn test_unknown_template_is_not_found() {
        let (_, service) = service_with_classic();
        let err = service
            .render("nope", DocumentType::Invoice, &invoice(), RenderOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "not_found");
    }

    #[tokio::test]
    async fn test_invalid_id_rejected_before_storage() {
        let (store, service) = service_with_classic();
        let err = service
            .render("../etc/passwd", DocumentType::Invoice, &invoice(), RenderOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.code(), "validation_error");
        assert_eq!(store.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_pre_cancelled_token_yields_superseded() {
        let (store, service) = service_with_classic();
        let (handle, token) = CancelToken::pair();
        handle.cancel();

        let outcome = service
            .render(
                "classic",
                DocumentType::Invoice,
                &invoice(),
                RenderOptions {
                    use_cache: true,
                    cancel: Some(token),
                },
            )
            .await
            .unwrap();
        assert!(matches!(outcome, RenderOutcome::Superseded));
        // Abandoned before template load, and nothing was cached.
        assert_eq!(store.fetch_count(), 0);
        assert_eq!(service.cache_stats().entries, 0);
    }

    #[tokio::test]
    async fn test_expired_deadline_behaves_like_cancellation() {
        let store = Arc::new(MemoryTemplateStore::new());
        store.insert(DocumentType::Invoice, "classic", MARKUP);
        let service = Arc::new(RenderService::new(
            Arc::clone(&store) as Arc<dyn TemplateStore>,
            RenderConfig {
                timeout: Duration::ZERO,
                ..RenderConfig::default()
            },
        ));

        let outcome = service
            .render("classic", DocumentType::Invoice, &invoice(), RenderOptions::default())
            .await
            .unwrap();

        // An already-expired deadline resolves as a non-error empty result
        // with no storage access and no cache write.
        assert!(matches!(outcome, RenderOutcome::Superseded));
        assert_eq!(store.fetch_count(), 0);
        assert_eq!(service.cache_stats().entries, 0);
    }

    #[tokio::test]
    async fn test_use_cache_false_skips_cache() {
        let (_, service) = service_with_classic();
        let options = RenderOptions {
            use_cache: false,
            cancel: None,
        };

        for _ in 0..2 {
            let outcome = service
                .render("classic", DocumentType::Invoice, &invoice(), options.clone())
                .await
                .unwrap();
            assert!(!outcome.from_cache());
        }
        assert_eq!(service.cache_stats().entries, 0);
    }

    #[tokio::test]
    async fn test_preload_populates_cache() {
        let (_, service) = service_with_classic();
        let report = service.preload(DocumentType::Quotation).await;

        // Only "classic" has backing markup; the other catalog entries
        // supporting quotations are NotFound and counted as failures.
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.attempted, report.succeeded + report.failed);
        assert_eq!(service.cache_stats().entries, 1);

        // The canonical empty payload now renders from cache.
        let outcome = service
            .render(
                "classic",
                DocumentType::Quotation,
                &Document::empty(DocumentType::Quotation),
                RenderOptions::default(),
            )
            .await
            .unwrap();
        assert!(outcome.from_cache());
    }

    #[tokio::test]
    async fn test_navigation_and_selection() {
        let (_, service) = service_with_classic();
        let next = service.next_template("classic", DocumentType::Invoice).unwrap();
        assert_ne!(next.id, "classic");
        assert!(service.select_template("modern", DocumentType::Receipt).is_none());
        assert!(service.select_template("modern", DocumentType::Invoice).is_some());
    }

    #[tokio::test]
    async fn test_exists() {
        let (_, service) = service_with_classic();
        assert!(service.exists("classic", DocumentType::Invoice).unwrap());
        // In the catalog but with no backing markup.
        assert!(!service.exists("modern", DocumentType::Invoice).unwrap());
        // Not in the catalog at all.
        assert!(!service.exists("ghost", DocumentType::Invoice).unwrap());
    }
}
