use crate::source::{Document, TextSource};
use std::cell::Cell;

/// A document with all of `text` selected.
pub fn selected(text: &str) -> Document {
    Document::with_selection(text, 0..text.len())
}

/// Records full-text reads and every write, without applying them.
pub struct RecordingSource {
    pub text: String,
    pub selected: String,
    pub full_text_reads: Cell<usize>,
    pub writes: Vec<(&'static str, String)>,
}

impl RecordingSource {
    pub fn new(text: &str, selected: &str) -> Self {
        Self {
            text: text.to_string(),
            selected: selected.to_string(),
            full_text_reads: Cell::new(0),
            writes: Vec::new(),
        }
    }
}

impl TextSource for RecordingSource {
    fn selection(&self) -> &str {
        &self.selected
    }

    fn full_text(&self) -> &str {
        self.full_text_reads.set(self.full_text_reads.get() + 1);
        &self.text
    }

    fn replace_selection(&mut self, text: String) {
        self.writes.push(("selection", text));
    }

    fn set_full_text(&mut self, text: String) {
        self.writes.push(("document", text));
    }
}
