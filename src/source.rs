//! Source buffer
//!
//! Owns the UTF-8 input text for one compilation and turns byte offsets
//! into `(line, column)` pairs for diagnostics.

use std::fmt;
use std::sync::Arc;

/// A location within a single source buffer.
///
/// Immutable once produced; cheap to clone since the file name is shared
/// via `Arc`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub source_name: Arc<str>,
    /// 1-based line number.
    pub line: u32,
    /// 1-based column number.
    pub column: u32,
    /// 0-based byte offset into the source text.
    pub offset: u32,
}

impl Location {
    pub fn new(source_name: Arc<str>, line: u32, column: u32, offset: u32) -> Self {
        Location {
            source_name,
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.source_name, self.line, self.column)
    }
}

/// Owns the text of a single compilation unit and maps byte offsets to
/// `(line, column)`.
///
/// Tabs advance the column by exactly one, matching the original ReShade
/// lexer (no tab-stop expansion).
pub struct SourceBuffer {
    name: Arc<str>,
    text: String,
    /// Byte offset of the start of each line, line 0 first.
    line_starts: Vec<u32>,
}

impl SourceBuffer {
    pub fn new(name: impl Into<Arc<str>>, text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0u32];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        SourceBuffer {
            name: name.into(),
            text,
            line_starts,
        }
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Convert a byte offset into a `Location`. `offset` is clamped to the
    /// buffer length so a lexer asking for the position of EOF never panics.
    pub fn locate(&self, offset: u32) -> Location {
        let offset = offset.min(self.text.len() as u32);
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        let column = offset - line_start + 1;
        Location::new(self.name.clone(), (line_idx as u32) + 1, column, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_first_line() {
        let buf = SourceBuffer::new("test.fx", "abc\ndef\n");
        let loc = buf.locate(1);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 2);
    }

    #[test]
    fn locates_subsequent_lines() {
        let buf = SourceBuffer::new("test.fx", "abc\ndef\nghi");
        let loc = buf.locate(5); // 'e' in "def"
        assert_eq!(loc.line, 2);
        assert_eq!(loc.column, 2);

        let loc = buf.locate(8); // 'g' in "ghi"
        assert_eq!(loc.line, 3);
        assert_eq!(loc.column, 1);
    }

    #[test]
    fn clamps_out_of_range_offset() {
        let buf = SourceBuffer::new("test.fx", "abc");
        let loc = buf.locate(999);
        assert_eq!(loc.line, 1);
        assert_eq!(loc.column, 4);
    }
}
