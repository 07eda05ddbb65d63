//! Scripted editor host for unit tests

use std::collections::HashMap;

use crate::document::EditorView;
use crate::styler::StyleContext;

pub struct TestHost {
    pub doc: String,
    pub caret: usize,
    pub changes: u64,
    pub settings: HashMap<String, bool>,
}

impl TestHost {
    /// A host with every feature switched on
    pub fn new(text: &str) -> Self {
        let mut settings = HashMap::new();
        settings.insert(crate::styler::HIGHLIGHT_VARIABLES.to_string(), true);
        settings.insert(crate::styler::HIGHLIGHT_HTML.to_string(), true);
        Self {
            doc: text.to_string(),
            caret: 0,
            changes: 0,
            settings,
        }
    }

    pub fn cx(&self) -> StyleContext<'_> {
        StyleContext::new(&self.doc, self, &self.settings)
    }

    pub fn set(&mut self, key: &str, value: bool) {
        self.settings.insert(key.to_string(), value);
    }

    /// Insert text without telling any styler
    pub fn insert(&mut self, pos: usize, text: &str) {
        self.doc.insert_str(pos, text);
        self.changes += 1;
    }

    /// Delete text without telling any styler
    pub fn delete(&mut self, start: usize, end: usize) {
        self.doc.replace_range(start..end, "");
        self.changes += 1;
    }
}

impl EditorView for TestHost {
    fn caret(&self) -> usize {
        self.caret
    }

    fn word_at(&self, offset: usize) -> String {
        let bytes = self.doc.as_bytes();
        let is_word = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
        let offset = offset.min(bytes.len());
        let mut start = offset;
        while start > 0 && is_word(bytes[start - 1]) {
            start -= 1;
        }
        let mut end = offset;
        while end < bytes.len() && is_word(bytes[end]) {
            end += 1;
        }
        self.doc[start..end].to_string()
    }

    fn change_state(&self) -> u64 {
        self.changes
    }
}
