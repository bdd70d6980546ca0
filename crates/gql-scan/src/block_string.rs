//! Interpretation of raw block-string payloads.
//!
//! The scanner emits [`Token::StrBlock`](crate::Token::StrBlock) with the
//! raw bytes between the `"""` delimiters. This module turns that raw body
//! into the interpreted contents: common indentation is stripped, an
//! all-whitespace first or last line is dropped, and `\"""` unescapes to
//! `"""`. Output is streamed through a caller-provided buffer in
//! fixed-size chunks, so interpretation allocates nothing.

use std::ops::ControlFlow;

/// Streams the interpreted contents of a raw block-string payload into
/// `buf`, invoking `flush` with each full chunk and once with the final
/// partial chunk. `flush` may stop the interpretation early by returning
/// [`Break`](ControlFlow::Break), which is propagated.
///
/// # Panics
///
/// Panics if `buf` is empty.
pub fn interpret<F>(raw: &[u8], buf: &mut [u8], flush: F) -> ControlFlow<()>
where
    F: FnMut(&[u8]) -> ControlFlow<()>,
{
    assert!(!buf.is_empty(), "chunk buffer must not be empty");
    let indent = common_indent(raw);
    let last = raw.split(|&b| b == b'\n').count() - 1;
    let mut out = Out { buf, len: 0, flush };
    let mut emitted = false;
    for (i, line) in raw.split(|&b| b == b'\n').enumerate() {
        if (i == 0 || i == last) && blank(line) {
            continue;
        }
        if emitted {
            out.push(b"\n")?;
        }
        emitted = true;
        let mut rest = dedent(line, indent);
        while let Some(at) = find_escape(rest) {
            out.push(&rest[..at])?;
            out.push(b"\"\"\"")?;
            rest = &rest[at + 4..];
        }
        out.push(rest)?;
    }
    out.finish()
}

/// Common leading space/tab count over the non-blank lines after the
/// first.
fn common_indent(raw: &[u8]) -> usize {
    let mut common: Option<usize> = None;
    for (i, line) in raw.split(|&b| b == b'\n').enumerate() {
        if i == 0 || blank(line) {
            continue;
        }
        let n = line
            .iter()
            .take_while(|&&b| b == b' ' || b == b'\t')
            .count();
        common = Some(common.map_or(n, |c| c.min(n)));
    }
    common.unwrap_or(0)
}

fn blank(line: &[u8]) -> bool {
    line.iter().all(|&b| b == b' ' || b == b'\t' || b == b'\r')
}

fn dedent(line: &[u8], indent: usize) -> &[u8] {
    let ws = line
        .iter()
        .take_while(|&&b| b == b' ' || b == b'\t')
        .count();
    &line[indent.min(ws)..]
}

fn find_escape(line: &[u8]) -> Option<usize> {
    line.windows(4).position(|w| w == b"\\\"\"\"")
}

struct Out<'a, F> {
    buf: &'a mut [u8],
    len: usize,
    flush: F,
}

impl<F> Out<'_, F>
where
    F: FnMut(&[u8]) -> ControlFlow<()>,
{
    fn push(&mut self, mut bytes: &[u8]) -> ControlFlow<()> {
        while !bytes.is_empty() {
            let room = self.buf.len() - self.len;
            let n = room.min(bytes.len());
            self.buf[self.len..self.len + n].copy_from_slice(&bytes[..n]);
            self.len += n;
            bytes = &bytes[n..];
            if self.len == self.buf.len() {
                (self.flush)(&self.buf[..self.len])?;
                self.len = 0;
            }
        }
        ControlFlow::Continue(())
    }

    fn finish(mut self) -> ControlFlow<()> {
        if self.len > 0 {
            (self.flush)(&self.buf[..self.len])?;
        }
        ControlFlow::Continue(())
    }
}
