pub mod document;
pub mod payment;
pub mod policy;
pub mod quote;

/// Canonical form of a backend enum token: trimmed, lowercase, `_`-separated.
pub(crate) fn normalize_token(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|ch| match ch {
            '-' | ' ' => '_',
            other => other.to_ascii_lowercase(),
        })
        .collect()
}
