//! Redaction of credentials before they reach a log line.
//!
//! Two secrets flow through this integration: the Google API key (appears
//! as a `key=` query parameter in request URLs) and the lounge auth token.
//! Error messages from the HTTP stack tend to echo the full request URL,
//! so anything destined for a log goes through [`redact_secrets`] first.

use std::borrow::Cow;

const SENSITIVE_PATTERNS: &[(&str, &str)] = &[
    ("key=", "key=[REDACTED]"),
    ("loungeIdToken=", "loungeIdToken=[REDACTED]"),
    ("lounge_token=", "lounge_token=[REDACTED]"),
    ("Authorization: Bearer ", "Authorization: Bearer [REDACTED]"),
];

/// Replace known credential patterns with `[REDACTED]`.
pub fn redact_secrets(input: &str) -> Cow<'_, str> {
    let mut result = Cow::Borrowed(input);
    for (pattern, replacement) in SENSITIVE_PATTERNS {
        if result.contains(pattern) {
            result = Cow::Owned(redact_pattern_value(&result, pattern, replacement));
        }
    }
    result
}

/// True if `input` still carries a known credential pattern.
pub fn contains_sensitive(input: &str) -> bool {
    SENSITIVE_PATTERNS
        .iter()
        .any(|(pattern, _)| input.contains(pattern))
}

fn redact_pattern_value(input: &str, pattern: &str, replacement: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut remaining = input;

    while let Some(pos) = remaining.find(pattern) {
        result.push_str(&remaining[..pos]);
        result.push_str(replacement);

        let after = &remaining[pos + pattern.len()..];
        let end = after
            .find(|c: char| c.is_whitespace() || c == '&' || c == '"' || c == '\'')
            .unwrap_or(after.len());
        remaining = &after[end..];
    }

    result.push_str(remaining);
    result
}
