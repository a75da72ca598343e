use url::Url;

/// Maps a navigable URL to the hostname time is attributed to.
///
/// Returns `None` for anything that is not an `http`/`https` URL with a host:
/// browser-internal pages, `file://`, `data:` and malformed input.
pub fn extract_domain(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let host = parsed.host_str()?;
    if host.is_empty() {
        return None;
    }

    Some(host.trim_end_matches('.').to_lowercase())
}
