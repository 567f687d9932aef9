/// Reduce a configured base URL to the host root the native `/api/...`
/// routes hang off, e.g. `http://localhost:11434/v1/` becomes
/// `http://localhost:11434`.
pub fn base_url_to_host_root(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    trimmed
        .strip_suffix("/v1")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}
