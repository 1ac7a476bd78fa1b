// src/url.rs

/// Joins `path` onto `base`.
///
/// - `None` or an empty path returns the base unchanged.
/// - A relative path is appended with exactly one `/` between them.
/// - A path starting with `/` brings its own separator and is appended as is.
pub fn join_url(base: &str, path: Option<&str>) -> String {
    let path = match path {
        Some(p) if !p.is_empty() => p,
        _ => return base.to_string(),
    };
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}
