//! Log and error-message hygiene: truncation and credential redaction.
//!
//! Bodies are only ever shortened for display. The values handed back to
//! callers are never touched by anything in this module.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex_lite::Regex;

/// Longest body (in characters) written to the log at `info`/`debug` level.
pub const MAX_LOG_ENTRY_LENGTH: usize = 280;

/// Cut `text` to at most `limit` characters, appending `...` when shortened.
pub fn truncate(text: &str, limit: usize) -> Cow<'_, str> {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => Cow::Owned(format!("{}...", &text[..idx])),
        None => Cow::Borrowed(text),
    }
}

/// Replace tokens, cookies and passwords with placeholders.
pub fn redact(text: &str) -> String {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        [
            (
                r#""(access_token|password|verification_code)"\s*:\s*"[^"]*""#,
                r#""$1":"[REDACTED]""#,
            ),
            (
                r#"(?i)((?:proxy-)?authorization"?\s*[:=]\s*"?(?:bearer|basic))\s+[A-Za-z0-9._~+/=-]+"#,
                "$1 [REDACTED]",
            ),
            (r"zuid=[^;,\s]+", "zuid=[REDACTED]"),
        ]
        .into_iter()
        .filter_map(|(pattern, replacement)| Some((Regex::new(pattern).ok()?, replacement)))
        .collect()
    });

    let mut out = text.to_string();
    for (pattern, replacement) in patterns {
        out = pattern.replace_all(&out, *replacement).into_owned();
    }
    out
}

/// Redacted and truncated rendering used in error `Display` impls.
pub fn for_display(text: &str) -> String {
    truncate(&redact(text), MAX_LOG_ENTRY_LENGTH).into_owned()
}

/// Redacted, untruncated rendering of a body for trace logging.
pub(crate) fn for_trace(body: &[u8]) -> String {
    redact(&String::from_utf8_lossy(body))
}

/// Redacted rendering of a body for logging, truncated to `limit` characters.
pub(crate) fn for_log(body: &[u8], limit: usize) -> String {
    let text = String::from_utf8_lossy(body);
    truncate(&redact(&text), limit).into_owned()
}
