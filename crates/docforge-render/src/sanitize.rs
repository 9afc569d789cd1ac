//! # Markup Sanitization
//!
//! Defensive sanitization pass applied to raw template markup before any
//! binding happens. Templates come from untrusted-origin storage, so three
//! classes of active content are stripped:
//!
//! 1. `<script>…</script>` blocks (and stray unclosed `<script>` tags)
//! 2. `on*` event-handler attributes, in any quoting style
//! 3. `javascript:` URI schemes in attribute values
//!
//! Patterns are compiled exactly once per process via `OnceLock`, which is
//! safe under concurrent first access.

use std::sync::OnceLock;

use regex::Regex;

fn script_blocks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>").expect("static pattern")
    })
}

fn stray_script_tags() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</?script\b[^>]*>").expect("static pattern"))
}

fn event_handler_attrs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Covers onclick="x()", onclick='x()', and unquoted onclick=x()
    RE.get_or_init(|| {
        Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#)
            .expect("static pattern")
    })
}

fn javascript_uris() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Scheme at the start of an attribute value, any quoting style.
    RE.get_or_init(|| {
        Regex::new(r#"(?i)=\s*(["']?)\s*javascript\s*:"#).expect("static pattern")
    })
}

/// Strips active content from raw template markup.
///
/// Runs at most once per `(template_id, document_type)` per process
/// lifetime; the loader caches the sanitized result.
pub fn sanitize(raw: &str) -> String {
    let pass = script_blocks().replace_all(raw, "");
    let pass = stray_script_tags().replace_all(&pass, "");
    let pass = event_handler_attrs().replace_all(&pass, "");
    let pass = javascript_uris().replace_all(&pass, "=$1");
    pass.into_owned()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_script_blocks() {
        let raw = "<div>ok</div><script>alert(1)</script><p>after</p>";
        let clean = sanitize(raw);
        assert!(!clean.contains("<script"));
        assert!(!clean.contains("alert"));
        assert!(clean.contains("<div>ok</div>"));
        assert!(clean.contains("<p>after</p>"));
    }

    #[test]
    fn test_strips_multiline_and_attributed_scripts() {
        let raw = "<script type=\"text/javascript\">\nwindow.x = 1;\n</script>";
        assert!(!sanitize(raw).contains("window.x"));
    }

    #[test]
    fn test_strips_stray_script_tags() {
        let raw = "<div><script src=\"evil.js\"></div>";
        let clean = sanitize(raw);
        assert!(!clean.contains("script"));
        assert!(clean.contains("<div>"));
    }

    #[test]
    fn test_strips_event_handlers_all_quoting_styles() {
        let raw = r##"<a onclick="x()" onmouseover='y()' onload=z() href="#">link</a>"##;
        let clean = sanitize(raw);
        assert!(!clean.to_lowercase().contains("onclick"));
        assert!(!clean.to_lowercase().contains("onmouseover"));
        assert!(!clean.to_lowercase().contains("onload"));
        assert!(clean.contains("href"));
        assert!(clean.contains("link"));
    }

    #[test]
    fn test_strips_javascript_uris() {
        let raw = r#"<a href="javascript:steal()">x</a><img src='JAVASCRIPT:bad()'/>"#;
        let clean = sanitize(raw).to_lowercase();
        assert!(!clean.contains("javascript:"));
        // The attribute survives, only the scheme is removed.
        assert!(clean.contains("href="));
    }

    #[test]
    fn test_benign_markup_untouched() {
        let raw = r#"<td id="emitter-name" class="bold">Name</td>"#;
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn test_case_insensitive() {
        let raw = "<SCRIPT>alert(1)</SCRIPT><div ONCLICK=\"x()\">d</div>";
        let clean = sanitize(raw);
        assert!(!clean.to_lowercase().contains("script"));
        assert!(!clean.to_lowercase().contains("onclick"));
    }
}
