use anyhow::{Context, Result};
use std::ops::Range;
use std::str::FromStr;

/// The read/write primitives a host hands to every command.
pub trait TextSource {
    /// Currently selected text; empty when nothing is selected.
    fn selection(&self) -> &str;

    fn full_text(&self) -> &str;

    fn replace_selection(&mut self, text: String);

    fn set_full_text(&mut self, text: String);

    /// Only an empty selection string counts as "no selection". A selection
    /// of blanks or newlines is still a selection.
    fn has_selection(&self) -> bool {
        !self.selection().is_empty()
    }
}

/// In-memory document with a byte-range selection.
///
/// An empty range is a cursor: `replace_selection` inserts there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    text: String,
    selection: Range<usize>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection: 0..0,
        }
    }

    /// Selects `range`, clamped to the text and snapped back to char boundaries.
    pub fn with_selection(text: impl Into<String>, range: Range<usize>) -> Self {
        let text = text.into();
        let end = floor_char_boundary(&text, range.end);
        let start = floor_char_boundary(&text, range.start.min(end));
        Self {
            text,
            selection: start..end,
        }
    }

    /// Selects whole lines, from the start of `lines.start` to the end of
    /// `lines.end` without its trailing newline. Lines past the end of the
    /// text are clamped; a range starting past the last line selects nothing.
    pub fn select_lines(text: impl Into<String>, lines: LineRange) -> Self {
        let text = text.into();
        let mut start = None;
        let mut end = None;
        let mut offset = 0;

        for (index, line) in text.split('\n').enumerate() {
            let number = index + 1;
            if number == lines.start {
                start = Some(offset);
            }
            if number >= lines.start {
                end = Some(offset + line.len());
            }
            if number == lines.end {
                break;
            }
            offset += line.len() + 1;
        }

        let selection = match (start, end) {
            (Some(start), Some(end)) => start..end,
            _ => 0..0,
        };

        tracing::debug!(
            "Line range {}:{} selects bytes {:?}",
            lines.start,
            lines.end,
            selection
        );

        Self { text, selection }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl TextSource for Document {
    fn selection(&self) -> &str {
        &self.text[self.selection.clone()]
    }

    fn full_text(&self) -> &str {
        &self.text
    }

    fn replace_selection(&mut self, text: String) {
        let start = self.selection.start;
        let end = start + text.len();
        self.text.replace_range(self.selection.clone(), &text);
        self.selection = start..end;
    }

    fn set_full_text(&mut self, text: String) {
        self.text = text;
        self.selection = 0..0;
    }
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// 1-based, inclusive line range: `"3:7"` or a single line `"5"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl FromStr for LineRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = match s.split_once(':') {
            Some((start, end)) => (start.trim(), end.trim()),
            None => (s.trim(), s.trim()),
        };

        let start: usize = start
            .parse()
            .with_context(|| format!("Invalid start line in range '{}'", s))?;
        let end: usize = end
            .parse()
            .with_context(|| format!("Invalid end line in range '{}'", s))?;

        if start == 0 {
            anyhow::bail!("Line numbers start at 1: '{}'", s);
        }
        if end < start {
            anyhow::bail!("Line range ends before it starts: '{}'", s);
        }

        Ok(Self { start, end })
    }
}
