//! One Lua state per interpretation call.
//!
//! A [`Session`] is built at the start of [`crate::interpret`] and dropped
//! when the call returns, on every path.  Dropping it closes the Lua state.
//! Sessions are never shared between documents.

use std::io::Write;

use mlua::prelude::*;

use crate::sink::{register_print, OutputSink};

/// Chunk name reported in Lua error messages.  Lua's line numbers count
/// from the start of the region, not the document.
const CHUNK_NAME: &str = "=region";

/// A Lua interpreter with `print` redirected into an [`OutputSink`].
pub struct Session {
    lua: Lua,
    sink: OutputSink,
}

impl Session {
    /// Create a fresh Lua state and register the output binding.
    pub fn new() -> LuaResult<Self> {
        let lua = Lua::new();
        let sink = OutputSink::new();
        register_print(&lua, sink.clone())?;
        Ok(Self { lua, sink })
    }

    /// Execute one chunk of Lua source.
    ///
    /// Globals set by earlier chunks remain visible.
    pub fn exec(&self, chunk: &[u8]) -> LuaResult<()> {
        self.lua.load(chunk).set_name(CHUNK_NAME).exec()
    }

    /// Move everything `print` produced into `out`.
    ///
    /// The buffer is empty afterwards even if the write fails.
    pub fn drain_into<W: Write + ?Sized>(&self, out: &mut W) -> std::io::Result<()> {
        let captured = self.sink.take();
        if captured.is_empty() {
            return Ok(());
        }
        out.write_all(&captured)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
