//! Path normalization shared by the analyzers.

/// Separator between path segments
pub const SEPARATOR: char = '/';

/// Split a raw path into its non-empty segments
///
/// Repeated separators collapse, a trailing separator is ignored and a bare
/// root (`"/"` or `""`) yields no segments at all.
pub fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(SEPARATOR).filter(|segment| !segment.is_empty())
}

/// Rebuild an absolute path from segments, restoring the leading separator
pub fn join_segments<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = String::new();
    for segment in segments {
        path.push(SEPARATOR);
        path.push_str(segment.as_ref());
    }
    if path.is_empty() {
        path.push(SEPARATOR);
    }
    path
}
