//! Single-pass document interpretation.
//!
//! [`interpret`] walks the document one byte at a time.  Outside a region
//! bytes are copied straight to the destination; inside one they collect in
//! a pending buffer that is handed to the [`Session`] when the close marker
//! arrives.  A region still open at end of document is run anyway if it has
//! any source, the way PHP treats a missing `?>`.

use std::io::Write;

use crate::error::Error;
use crate::marker::{is_close_marker, is_open_marker, CLOSE_MARKER, OPEN_MARKER};
use crate::session::Session;

/// Which side of a marker the cursor is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Literal,
    InScript,
}

/// Scanner state for one document.
struct Driver<'a, W: Write + ?Sized> {
    src: &'a [u8],
    out: &'a mut W,
    session: Session,
    mode: Mode,
    /// 1-based line of the byte under the cursor.
    line: usize,
    /// Start of the literal run not yet written.
    literal_start: usize,
    pending: Vec<u8>,
}

impl<'a, W: Write + ?Sized> Driver<'a, W> {
    fn run(mut self) -> Result<(), Error> {
        let mut pos = 0;
        while pos < self.src.len() {
            if self.src[pos] == b'\n' {
                self.line += 1;
            }
            pos = match self.mode {
                Mode::Literal if is_open_marker(self.src, pos) => {
                    self.flush_literal(pos)?;
                    self.mode = Mode::InScript;
                    pos + OPEN_MARKER.len()
                }
                Mode::Literal => pos + 1,
                Mode::InScript if is_close_marker(self.src, pos) => {
                    self.dispatch()?;
                    self.mode = Mode::Literal;
                    self.literal_start = pos + CLOSE_MARKER.len();
                    pos + CLOSE_MARKER.len()
                }
                Mode::InScript => {
                    self.pending.push(self.src[pos]);
                    pos + 1
                }
            };
        }

        match self.mode {
            Mode::Literal => self.flush_literal(self.src.len()),
            Mode::InScript if !self.pending.is_empty() => self.dispatch(),
            Mode::InScript => Ok(()),
        }
    }

    /// Write the literal bytes between `literal_start` and `end`.
    fn flush_literal(&mut self, end: usize) -> Result<(), Error> {
        if end > self.literal_start {
            self.out.write_all(&self.src[self.literal_start..end])?;
        }
        self.literal_start = end;
        Ok(())
    }

    /// Run the pending region and splice its output in.
    fn dispatch(&mut self) -> Result<(), Error> {
        let line = self.line;
        self.session
            .exec(&self.pending)
            .map_err(|e| Error::script(line, &e))?;
        self.pending.clear();
        self.session.drain_into(&mut *self.out)?;
        Ok(())
    }
}

/// Interpret `src`, writing the expanded document to `out`.
///
/// Every `<?lua … ?>` region is replaced by whatever it `print`s.  All
/// regions share one Lua state, so globals set early are visible later.
/// On failure the destination keeps everything written before the failing
/// region.
///
/// ```rust
/// let mut out = Vec::new();
/// luasp::interpret(&mut out, b"Hello <?lua print(\"World\") ?>!").unwrap();
/// assert_eq!(out, b"Hello World\n!");
/// ```
pub fn interpret<W: Write + ?Sized>(out: &mut W, src: &[u8]) -> Result<(), Error> {
    let session = Session::new().map_err(|e| Error::setup(&e))?;
    Driver {
        src,
        out,
        session,
        mode: Mode::Literal,
        line: 1,
        literal_start: 0,
        pending: Vec::new(),
    }
    .run()
}

/// Interpret `src` into a fresh buffer.
pub fn render(src: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(src.len());
    interpret(&mut out, src)?;
    Ok(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
