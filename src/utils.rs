use ulid::Ulid;
use url::Url;

/// Generates a new time-based, lexicographically sortable unique identifier.
///
/// Records stored in the JSON collections are keyed by these ids, so sorting
/// a collection by id also sorts it by creation time.
pub fn time_sortable_uid() -> String {
    Ulid::new().to_string()
}

/// Extracts the host name of an absolute URL, e.g. `https://www.example.com/a`
/// gives `www.example.com`.
pub fn hostname_of(raw: &str) -> Option<String> {
    Url::parse(raw)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.to_string()))
}

/// Returns `value` unless it is empty, in which case `fallback` is used.
pub fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
