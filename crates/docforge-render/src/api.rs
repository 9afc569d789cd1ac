//! # Wire API
//!
//! Serde-shaped request/reply types for callers driving the service over
//! JSON (IPC bridge, HTTP handler, CLI), plus thin handlers mapping
//! service outcomes onto them.
//!
//! Field names are camelCase on the wire; superseded renders come back as
//! an empty, non-error reply so callers never alert users about them.

use serde::{Deserialize, Serialize};

use docforge_core::{Document, DocumentType};

use crate::error::ErrorBody;
use crate::service::{RenderOptions, RenderOutcome, RenderService};

// =============================================================================
// Request / Reply Shapes
// =============================================================================

/// A render request as received on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub template_id: String,
    pub document_type: DocumentType,
    pub document: Document,

    /// Consult and populate the render cache.
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

fn default_use_cache() -> bool {
    true
}

/// A successful (possibly degraded or superseded) render reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReply {
    /// Finished HTML; empty when superseded.
    pub html: String,

    pub from_cache: bool,

    /// The render was cancelled or superseded; `html` is empty and the
    /// caller should simply drop the reply.
    pub superseded: bool,

    /// Present when binding degraded and `html` carries the unbound
    /// sanitized markup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded: Option<ErrorBody>,
}

/// Reply for template-existence probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistsReply {
    pub exists: bool,
}

// =============================================================================
// Handlers
// =============================================================================

/// Runs a wire render request against the service.
///
/// Fatal errors come back as `Err(ErrorBody)`; degraded and superseded
/// renders are non-error replies.
pub async fn handle_render(
    service: &RenderService,
    request: &RenderRequest,
) -> Result<RenderReply, ErrorBody> {
    let options = RenderOptions {
        use_cache: request.use_cache,
        cancel: None,
    };

    let outcome = service
        .render(
            &request.template_id,
            request.document_type,
            &request.document,
            options,
        )
        .await
        .map_err(|err| ErrorBody::from_error(&err, service.config().include_error_detail))?;

    Ok(match outcome {
        RenderOutcome::Rendered { html, from_cache } => RenderReply {
            html: html.to_string(),
            from_cache,
            superseded: false,
            degraded: None,
        },
        RenderOutcome::Degraded { html, error } => RenderReply {
            degraded: Some(ErrorBody::from_error(
                &error,
                service.config().include_error_detail,
            )),
            html,
            from_cache: false,
            superseded: false,
        },
        RenderOutcome::Superseded => RenderReply {
            html: String::new(),
            from_cache: false,
            superseded: true,
            degraded: None,
        },
    })
}

/// Probes whether a template has a backing resource.
pub fn handle_exists(
    service: &RenderService,
    template_id: &str,
    document_type: DocumentType,
) -> Result<ExistsReply, ErrorBody> {
    service
        .exists(template_id, document_type)
        .map(|exists| ExistsReply { exists })
        .map_err(|err| ErrorBody::from_error(&err, service.config().include_error_detail))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let json = r#"{
            "templateId": "classic",
            "documentType": "invoice",
            "document": {
                "kind": {"type": "invoice", "number": "INV-1"},
                "emitter": {"name": "Acme"},
                "currency": "USD",
                "issue_date": "2026-08-24"
            }
        }"#;

        let request: RenderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.template_id, "classic");
        assert_eq!(request.document_type, DocumentType::Invoice);
        // Omitted useCache defaults to true.
        assert!(request.use_cache);
    }

    #[test]
    fn test_reply_omits_absent_degraded() {
        let reply = RenderReply {
            html: "<html></html>".into(),
            from_cache: true,
            superseded: false,
            degraded: None,
        };
        let json = serde_json::to_string(&reply).unwrap();
        assert!(json.contains("fromCache"));
        assert!(!json.contains("degraded"));
    }
}
