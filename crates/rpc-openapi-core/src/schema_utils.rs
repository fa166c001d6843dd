//! JSON Pointer helpers for locating descriptors inside a procedure tree.
//!
//! Converter errors report where in a descriptor tree they failed using the
//! same RFC 6901 pointers JSON Schema tooling uses, rooted at the procedure
//! slot (e.g. `users.create.input#/shape/address/shape/zip`).

use std::borrow::Cow;

/// Escape a single path segment per RFC 6901.
///
/// - `~` → `~0`
/// - `/` → `~1`
///
/// Returns `Cow::Borrowed` when no escaping is needed (the common case).
pub(crate) fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') || segment.contains('/') {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Build a JSON Pointer path by appending escaped segments to a parent path.
pub(crate) fn build_path(parent: &str, segments: &[&str]) -> String {
    let mut path = parent.to_string();
    for segment in segments {
        path.push('/');
        path.push_str(&escape_pointer_segment(segment));
    }
    path
}
