//! # docforge-render: Rendering Service for Docforge
//!
//! This crate provides the asynchronous rendering layer for docforge:
//! template loading and sanitization, placeholder binding, the
//! content-addressable render cache, and the orchestrating façade.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Render Service Architecture                       │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                   RenderService (Orchestrator)                   │  │
//! │  │                                                                  │  │
//! │  │  validate → hash → cache lookup → load → bind → cache write      │  │
//! │  │  Single-flight per template id, cancellation, wall-clock timeout │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │ TemplateLoader │  │     binder     │  │     RenderCache        │    │
//! │  │                │  │                │  │                        │    │
//! │  │ id validation  │  │ slot rewriting │  │ 16 shards, idempotent  │    │
//! │  │ sanitization   │  │ item rows      │  │ writes, keyed by       │    │
//! │  │ markup cache   │  │ totals, panics │  │ canonical SHA-256      │    │
//! │  │                │  │ degrade safely │  │                        │    │
//! │  └───────┬────────┘  └────────────────┘  └────────────────────────┘    │
//! │          ▼                                                              │
//! │  ┌────────────────┐  ┌────────────────┐                                │
//! │  │ TemplateStore  │  │TemplateRegistry│                                │
//! │  │ (trait)        │  │                │                                │
//! │  │ fs / in-memory │  │ static catalog │                                │
//! │  │ Ok(None) =     │  │ circular       │                                │
//! │  │ NotFound       │  │ navigation     │                                │
//! │  └────────────────┘  └────────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`api`] - Serde wire shapes and request handlers
//! - [`binder`] - Placeholder substitution engine
//! - [`cache`] - Sharded content-addressable render cache
//! - [`error`] - Render error taxonomy and wire error body
//! - [`loader`] - Template loading + sanitized-markup cache
//! - [`registry`] - Static template catalog with navigation
//! - [`sanitize`] - Defensive markup sanitization pass
//! - [`service`] - The orchestrating façade
//! - [`store`] - Template storage trait and implementations

pub mod api;
pub mod binder;
pub mod cache;
pub mod error;
pub mod loader;
pub mod registry;
pub mod sanitize;
pub mod service;
pub mod store;

pub use api::{handle_exists, handle_render, ExistsReply, RenderReply, RenderRequest};
pub use binder::{bind, BindOutcome};
pub use cache::{CacheKey, CacheStats, RenderCache};
pub use error::{ErrorBody, RenderError, RenderResult};
pub use loader::TemplateLoader;
pub use registry::TemplateRegistry;
pub use sanitize::sanitize;
pub use service::{
    CancelHandle, CancelToken, RenderConfig, RenderOptions, RenderOutcome, RenderService,
    WarmupReport,
};
pub use store::{FsTemplateStore, MemoryTemplateStore, StoreError, TemplateStore};
