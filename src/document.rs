//! Host collaborator interfaces
//!
//! The stylers never own the text they annotate. The editor hands them
//! read-only views of its document, caret and settings for the duration of
//! a single call.

use std::borrow::Cow;

/// Read-only view of a text buffer, addressed by byte offset.
pub trait Document {
    /// Length in bytes
    fn len(&self) -> usize;

    /// Byte at `offset`, or `None` past the end
    fn byte_at(&self, offset: usize) -> Option<u8>;

    /// Character starting at `offset`
    fn char_at(&self, offset: usize) -> Option<char>;

    /// Character ending at `offset`
    fn char_before(&self, offset: usize) -> Option<char>;

    /// Text in `[start, end)`. Both ends must lie on character boundaries;
    /// out-of-range or misaligned requests yield an empty slice.
    fn slice(&self, start: usize, end: usize) -> Cow<'_, str>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset of the first byte of the line containing `offset`
    fn line_start(&self, offset: usize) -> usize {
        let mut pos = offset.min(self.len());
        while pos > 0 && self.byte_at(pos - 1) != Some(b'\n') {
            pos -= 1;
        }
        pos
    }

    /// Offset just past the line containing `offset` (including its newline)
    fn line_end(&self, offset: usize) -> usize {
        let len = self.len();
        let mut pos = offset.min(len);
        while pos < len {
            pos += 1;
            if self.byte_at(pos - 1) == Some(b'\n') {
                break;
            }
        }
        pos
    }
}

impl Document for &str {
    fn len(&self) -> usize {
        str::len(self)
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        self.as_bytes().get(offset).copied()
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        self.get(offset..)?.chars().next()
    }

    fn char_before(&self, offset: usize) -> Option<char> {
        self.get(..offset)?.chars().next_back()
    }

    fn slice(&self, start: usize, end: usize) -> Cow<'_, str> {
        Cow::Borrowed(self.get(start..end).unwrap_or(""))
    }
}

impl Document for String {
    fn len(&self) -> usize {
        self.as_str().len()
    }

    fn byte_at(&self, offset: usize) -> Option<u8> {
        Document::byte_at(&self.as_str(), offset)
    }

    fn char_at(&self, offset: usize) -> Option<char> {
        Document::char_at(&self.as_str(), offset)
    }

    fn char_before(&self, offset: usize) -> Option<char> {
        Document::char_before(&self.as_str(), offset)
    }

    fn slice(&self, start: usize, end: usize) -> Cow<'_, str> {
        Cow::Borrowed(self.get(start..end).unwrap_or(""))
    }
}

/// The editor state a styler may observe.
pub trait EditorView {
    /// Current caret offset
    fn caret(&self) -> usize;

    /// The word touching `offset`, empty if there is none
    fn word_at(&self, offset: usize) -> String;

    /// Opaque token that changes on every document mutation
    fn change_state(&self) -> u64;
}

/// Boolean settings lookup.
pub trait Settings {
    /// Value of `key`, `None` if unset
    fn get_bool(&self, key: &str) -> Option<bool>;

    /// Value of `key`, treating unset as disabled
    fn is_enabled(&self, key: &str) -> bool {
        self.get_bool(key).unwrap_or(false)
    }
}

impl Settings for std::collections::HashMap<String, bool> {
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).copied()
    }
}

/// One document mutation, as delivered by the host's diff feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// `len` bytes inserted at `pos`
    Insert { pos: usize, len: usize },
    /// Bytes in `[start, end)` removed
    Delete { start: usize, end: usize },
}
