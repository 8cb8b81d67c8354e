//! Helpers for `/`-separated path strings.

pub const SEPARATOR: char = '/';
pub const ROOT_PATH: &str = "/";

#[must_use]
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(SEPARATOR)
}

/// Path segments, skipping the empty ones produced by leading, trailing
/// or doubled separators.
pub fn segments(path: &str) -> impl DoubleEndedIterator<Item = &str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty())
}

/// Appends a trailing separator when missing.
#[must_use]
pub fn with_trailing_separator(path: &str) -> String {
    if path.ends_with(SEPARATOR) {
        path.to_string()
    } else {
        format!("{path}{SEPARATOR}")
    }
}

/// Strips the trailing separator, keeping the root as `/`.
#[must_use]
pub fn without_trailing_separator(path: &str) -> &str {
    let trimmed = path.trim_end_matches(SEPARATOR);
    if trimmed.is_empty() && is_absolute(path) {
        ROOT_PATH
    } else {
        trimmed
    }
}

/// Extracts the final segment of a path, if there is one.
#[must_use]
pub fn basename(path: &str) -> Option<&str> {
    segments(path).next_back()
}

/// Splits a path into its parent part and final segment.
///
/// The parent of a bare name is `.`, the parent of `/name` is `/`.
/// Returns `None` when there is no final segment (`/`, or an empty path).
#[must_use]
pub fn split_last(path: &str) -> Option<(&str, &str)> {
    let trimmed = path.trim_end_matches(SEPARATOR);
    let name = basename(trimmed)?;
    let parent = match trimmed.rfind(SEPARATOR) {
        None => ".",
        Some(i) => {
            let head = trimmed[..i].trim_end_matches(SEPARATOR);
            if head.is_empty() { ROOT_PATH } else { head }
        }
    };
    Some((parent, name))
}

/// True for the arguments that name the current or parent directory.
#[must_use]
pub fn is_dot_path(path: &str) -> bool {
    matches!(path, "." | "./" | ".." | "../")
}
