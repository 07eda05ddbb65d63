//! Incremental stylers
//!
//! A styler keeps derived, position-indexed annotations over a document the
//! editor owns. It hears about every edit before the next paint, keeps its
//! state cheap to update, and recomputes lazily when asked to style a run:
//! - `SearchHighlighter`: all occurrences of a query
//! - `VariableHighlighter`: all other occurrences of the word under the caret
//! - `TagStyler`: the open/close tag pair around the caret

mod search;
mod tags;
mod variable;

pub use search::{filter_match, SearchHighlighter, SearchOptions};
pub use tags::{TagInterval, TagStyler, Validity};
pub use variable::VariableHighlighter;

use crate::document::{Change, Document, EditorView, Settings};
use crate::style::StyleRun;

/// Setting that gates the variable highlighter
pub const HIGHLIGHT_VARIABLES: &str = "highlightVariables";
/// Setting that gates the tag matcher
pub const HIGHLIGHT_HTML: &str = "highlightHtml";

/// Borrowed host state for the duration of one styler call
#[derive(Clone, Copy)]
pub struct StyleContext<'a> {
    pub doc: &'a dyn Document,
    pub editor: &'a dyn EditorView,
    pub settings: &'a dyn Settings,
}

impl<'a> StyleContext<'a> {
    pub fn new(
        doc: &'a dyn Document,
        editor: &'a dyn EditorView,
        settings: &'a dyn Settings,
    ) -> Self {
        Self {
            doc,
            editor,
            settings,
        }
    }
}

/// What the host editor drives on each styler.
///
/// Edit hooks arrive synchronously and in document order, always before the
/// `style` call that observes their effect.
pub trait Styler {
    /// Paint this styler's annotations into `run`
    fn style(&mut self, cx: &StyleContext<'_>, run: &mut StyleRun);

    /// `len` bytes were inserted at `pos`
    fn insert(&mut self, cx: &StyleContext<'_>, pos: usize, len: usize);

    /// The bytes in `[start, end)` were removed
    fn delete(&mut self, cx: &StyleContext<'_>, start: usize, end: usize);

    /// Replay a batch of changes in order
    fn apply_diff(&mut self, cx: &StyleContext<'_>, changes: &[Change]) {
        for change in changes {
            match *change {
                Change::Insert { pos, len } => self.insert(cx, pos, len),
                Change::Delete { start, end } => self.delete(cx, start, end),
            }
        }
    }

    /// Low-priority work slot. Returns true when a repaint is needed.
    fn on_idle(&mut self, _cx: &StyleContext<'_>) -> bool {
        false
    }

    /// Drop all derived state
    fn invalidate(&mut self);
}
