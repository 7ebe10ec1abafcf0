//! Helpers for `/`-separated gateway paths.

/// Parent directory of `path`; `/` for top-level entries.
pub fn parent(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &trimmed[..i],
    }
}

/// Last component of `path`.
pub fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}

/// Joins `dir` and `name` with exactly one separator.
pub fn join(dir: &str, name: &str) -> String {
    format!(
        "{}/{}",
        dir.trim_end_matches('/'),
        name.trim_start_matches('/')
    )
}

/// Every prefix of `path` from the top down, e.g. `/a`, `/a/b` for `/a/b`.
pub fn ancestors_inclusive(path: &str) -> Vec<String> {
    let mut current = String::new();
    path.split('/')
        .filter(|c| !c.is_empty())
        .map(|component| {
            current.push('/');
            current.push_str(component);
            current.clone()
        })
        .collect()
}
