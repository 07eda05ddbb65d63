//! Variable highlighting: the other occurrences of the word under the caret

use tracing::{debug, warn};

use super::search::{SearchHighlighter, SearchOptions};
use super::{StyleContext, Styler, HIGHLIGHT_VARIABLES};
use crate::clock::{Clock, Debounce, SystemClock};
use crate::document::Settings;
use crate::interval::TextInterval;
use crate::style::{StyleRun, Theme};

/// Highlights whole-token occurrences of the word under the caret.
///
/// Searching happens in `on_idle`, once the document has been left alone
/// for the debounce delay. Every new edit restarts the wait. The occurrence
/// the caret sits in is never painted.
pub struct VariableHighlighter<C: Clock = SystemClock> {
    search: SearchHighlighter,
    /// Caret anchor, kept in step with edits between paints
    cursor: usize,
    last_state: Option<u64>,
    last_update: Option<std::time::Duration>,
    debounce: Debounce,
    clock: C,
}

impl VariableHighlighter<SystemClock> {
    pub fn new(theme: &Theme) -> Self {
        Self::with_clock(theme, Debounce::default(), SystemClock::new())
    }
}

impl<C: Clock> VariableHighlighter<C> {
    pub fn with_clock(theme: &Theme, debounce: Debounce, clock: C) -> Self {
        Self {
            search: SearchHighlighter::with_default_options(theme, SearchOptions::exact_word()),
            cursor: 0,
            last_state: None,
            last_update: None,
            debounce,
            clock,
        }
    }

    pub fn search(&self) -> &SearchHighlighter {
        &self.search
    }

    /// The word currently highlighted, empty if none
    pub fn word(&self) -> &str {
        self.search.text()
    }

    pub fn matches(&self) -> &[TextInterval] {
        self.search.matches()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn should_style(&self, settings: &dyn Settings) -> bool {
        settings.is_enabled(HIGHLIGHT_VARIABLES)
    }

    /// Whether `[start, end]` touches the caret
    pub fn is_current_word(&self, start: usize, end: usize) -> bool {
        start <= self.cursor && end >= self.cursor
    }

    pub fn clear(&mut self) {
        self.search.clear();
    }
}

impl<C: Clock> Styler for VariableHighlighter<C> {
    fn style(&mut self, cx: &StyleContext<'_>, run: &mut StyleRun) {
        if !self.should_style(cx.settings) {
            self.invalidate();
            return;
        }

        self.cursor = cx.editor.caret();
        let cursor = self.cursor;
        self.search
            .style_with(cx.doc, run, |m| m.start <= cursor && m.end >= cursor);
    }

    fn insert(&mut self, cx: &StyleContext<'_>, pos: usize, len: usize) {
        if !self.should_style(cx.settings) {
            self.invalidate();
            return;
        }

        // The editor has not moved its caret yet
        if self.cursor >= pos {
            self.cursor += len;
        }
        self.search.insert(pos, len);
    }

    fn delete(&mut self, cx: &StyleContext<'_>, start: usize, end: usize) {
        if !self.should_style(cx.settings) {
            self.invalidate();
            return;
        }

        if end < self.cursor {
            self.cursor -= end - start;
        } else if start <= self.cursor && end >= self.cursor {
            self.cursor = start;
        }
        self.search.delete(start, end);
    }

    fn on_idle(&mut self, cx: &StyleContext<'_>) -> bool {
        if !self.should_style(cx.settings) {
            // Drop everything so re-enabling starts from a fresh search
            self.invalidate();
            return false;
        }

        let word = cx.editor.word_at(self.cursor);
        let now = self.clock.now();
        let state = cx.editor.change_state();

        if self.debounce.is_waiting(self.last_update, now) {
            return false;
        }
        if self.last_state != Some(state) {
            // Fresh edit: wait for another quiet period
            self.last_state = Some(state);
            self.last_update = Some(now);
            return false;
        }
        if word == self.search.text() {
            return false;
        }

        self.search.clear();
        if !word.is_empty() {
            if let Err(e) = self.search.set_search(&word, SearchOptions::exact_word()) {
                warn!(error = %e, "variable search rejected");
                return false;
            }
            self.search.search_all(cx.doc);
            debug!(word = %word, matches = self.search.matches().len(), "variable highlight");
        }

        self.last_state = Some(state);
        self.last_update = Some(now);
        true
    }

    fn invalidate(&mut self) {
        self.search.clear();
        self.last_state = None;
        self.last_update = None;
    }
}
