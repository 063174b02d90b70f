//! POSIX path helpers shared by the resolver.
//!
//! All paths handled here use `/` separators. Functions prefixed with
//! `assert_` panic on malformed input; the rest are total.

/// Directory names ignored when computing an inheritance root.
pub const INHERITANCE_NEUTRAL_DIRS: &[&str] = &["renderer"];

/// Directory names ignored when computing a filesystem route.
pub const ROUTE_NEUTRAL_DIRS: &[&str] = &["renderer", "pages", "src", "index"];

/// Returns true if the path uses forward slashes only.
pub fn is_posix_path(path: &str) -> bool {
    !path.contains('\\')
}

pub fn assert_posix_path(path: &str) {
    assert!(is_posix_path(path), "path is not POSIX: {path:?}");
}

/// Non-empty `/`-separated segments of a path.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Whether any segment is `.` or `..`.
pub fn has_dot_segment(path: &str) -> bool {
    path.split('/').any(|s| s == "." || s == "..")
}

/// Whether `path` is a bare npm specifier such as `pkg`, `pkg/sub`,
/// `@scope/pkg` or `@scope/pkg/sub`.
pub fn is_npm_package_import(path: &str) -> bool {
    npm_package_name(path).is_some()
}

/// Package name part of a bare specifier (`@scope/pkg/sub` -> `@scope/pkg`).
pub fn npm_package_name(path: &str) -> Option<&str> {
    if path.is_empty()
        || path.starts_with('/')
        || path.starts_with('.')
        || path.contains(':')
        || path.contains('\\')
        || path.chars().any(char::is_whitespace)
    {
        return None;
    }
    let parts: Vec<&str> = path.split('/').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    let name_len = if parts[0].starts_with('@') {
        if parts[0].len() < 2 || parts.len() < 2 {
            return None;
        }
        parts[0].len() + 1 + parts[1].len()
    } else {
        parts[0].len()
    };
    Some(&path[..name_len])
}

/// Sub-path after the package name, always absolute (`pkg` -> `/`,
/// `pkg/renderer` -> `/renderer`).
pub fn npm_package_subpath(path: &str) -> Option<String> {
    let name = npm_package_name(path)?;
    let rest = &path[name.len()..];
    if rest.is_empty() {
        Some("/".to_string())
    } else {
        Some(rest.to_string())
    }
}

/// Strip the trailing filename (a last segment containing `.`).
///
/// `/pages/about/+Page.js` -> `/pages/about`, `/+config.toml` -> `/`.
pub fn remove_filename(path: &str) -> String {
    assert_posix_path(path);
    let (dir, filename) = match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    };
    assert!(
        filename.contains('.'),
        "expected a path ending with a filename, got {path:?}"
    );
    if dir.is_empty() {
        "/".to_string()
    } else {
        dir.to_string()
    }
}

/// Drop every segment named in `dirs` from an absolute path.
pub fn remove_directories(path: &str, dirs: &[&str]) -> String {
    assert_posix_path(path);
    assert!(path.starts_with('/'), "expected an absolute path, got {path:?}");
    let kept: Vec<&str> = segments(path).filter(|s| !dirs.contains(s)).collect();
    format!("/{}", kept.join("/"))
}

/// Collapse empty segments and force a single leading `/`.
pub fn normalize_route(path: &str) -> String {
    let kept: Vec<&str> = segments(path).collect();
    format!("/{}", kept.join("/"))
}

/// Segment-wise prefix test: `/pages` is a prefix of `/pages/about` but
/// `/pages/about` is not a prefix of `/pages/about2`.
pub fn path_starts_with(path: &str, prefix: &str) -> bool {
    let mut path_segments = segments(path);
    segments(prefix).all(|p| path_segments.next() == Some(p))
}
