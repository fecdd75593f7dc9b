//! The `print` binding that captures script output.
//!
//! Lua's own `print` writes to the process stdout.  Every session replaces
//! it with a closure that appends to an [`OutputSink`] instead, so the
//! driver can splice the text back into the document.

use std::cell::RefCell;
use std::rc::Rc;

use mlua::prelude::*;

/// Shared, append-only buffer written by `print` and drained by the driver.
///
/// Cloning the handle shares the buffer; the session and the registered
/// closure each hold one clone.
#[derive(Debug, Clone, Default)]
pub struct OutputSink {
    buf: Rc<RefCell<Vec<u8>>>,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes.
    pub fn write(&self, bytes: &[u8]) {
        self.buf.borrow_mut().extend_from_slice(bytes);
    }

    pub fn len(&self) -> usize {
        self.buf.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.borrow().is_empty()
    }

    /// Take everything written so far, leaving the buffer empty.
    pub fn take(&self) -> Vec<u8> {
        std::mem::take(&mut *self.buf.borrow_mut())
    }
}

/// Textual form of one `print` argument.
///
/// Strings are passed through as raw bytes; everything else goes through
/// `tostring` semantics (including `__tostring` metamethods).
fn to_text(value: &LuaValue) -> LuaResult<Vec<u8>> {
    match value {
        LuaValue::String(s) => Ok(s.as_bytes().to_vec()),
        other => Ok(other.to_string()?.into_bytes()),
    }
}

/// Install `print` as a global on `lua`, writing into `sink`.
///
/// Arguments are separated by a single space and followed by one newline.
pub fn register_print(lua: &Lua, sink: OutputSink) -> LuaResult<()> {
    let print = lua.create_function(move |_, args: LuaMultiValue| {
        // Convert first: a `__tostring` metamethod may itself call `print`.
        let parts = args.iter().map(to_text).collect::<LuaResult<Vec<_>>>()?;
        let mut line = parts.join(&b' ');
        line.push(b'\n');
        sink.write(&line);
        Ok(())
    })?;
    lua.globals().set("print", print)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
