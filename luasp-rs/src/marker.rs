//! Script region delimiters.
//!
//! A region opens with `<?lua` and closes with `?>`.  Both checks are pure
//! predicates over the document and a byte offset; the driver calls them
//! once per position.

/// Bytes that open an embedded Lua region.
pub const OPEN_MARKER: &[u8] = b"<?lua";

/// Bytes that close an embedded Lua region.
pub const CLOSE_MARKER: &[u8] = b"?>";

/// Returns `true` if an open marker starts at `pos`.
///
/// The marker must be followed by at least one more byte.  A `<?lua` that
/// runs into the end of the document is not a marker; its bytes are
/// ordinary text.
pub fn is_open_marker(doc: &[u8], pos: usize) -> bool {
    let end = pos + OPEN_MARKER.len();
    if end >= doc.len() {
        return false;
    }
    &doc[pos..end] == OPEN_MARKER
}

/// Returns `true` if a close marker starts at `pos`.
pub fn is_close_marker(doc: &[u8], pos: usize) -> bool {
    if pos + 1 >= doc.len() {
        return false;
    }
    doc[pos] == b'?' && doc[pos + 1] == b'>'
}

// ── Tests ─────────────────────────────────────────────────────────────────────
