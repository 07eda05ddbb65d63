//! Search highlighting: every occurrence of a query, kept current under edits

use regex::{Regex, RegexBuilder};
use tracing::{debug, trace};

use super::{StyleContext, Styler};
use crate::document::Document;
use crate::error::Result;
use crate::interval::{IntervalStore, TextInterval};
use crate::style::{Color, StyleRun, Theme};

/// How a query is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    /// Case-sensitive comparison
    pub match_case: bool,
    /// Only accept matches not glued to other word characters
    pub whole_word: bool,
    /// Treat the query as a regular expression
    pub regex: bool,
}

impl SearchOptions {
    /// Case-sensitive whole-token literal match
    pub fn exact_word() -> Self {
        Self {
            match_case: true,
            whole_word: true,
            regex: false,
        }
    }
}

/// Accept a match only if it is not part of a larger identifier.
///
/// With `var` as the query this rejects `variable`, `avar` and `a_var`, and
/// keeps `var.method()`, `f(var)` and `var+2`.
pub fn filter_match(doc: &dyn Document, m: TextInterval) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    !doc.char_before(m.start).is_some_and(is_word) && !doc.char_at(m.end).is_some_and(is_word)
}

/// Highlights every occurrence of a query.
///
/// Setting a query schedules a full scan, but the scan only happens when
/// the next run is styled. Edits shift the stored matches and schedule a
/// re-scan of just the lines they touched.
pub struct SearchHighlighter {
    text: String,
    options: SearchOptions,
    default_options: SearchOptions,
    pattern: Option<Regex>,
    matches: IntervalStore,
    /// Regions awaiting a re-scan, shifted along with the matches
    pending: IntervalStore,
    color: Color,
}

impl SearchHighlighter {
    pub fn new(theme: &Theme) -> Self {
        Self::with_default_options(theme, SearchOptions::default())
    }

    /// A highlighter whose `clear` falls back to `options`
    pub fn with_default_options(theme: &Theme, options: SearchOptions) -> Self {
        Self {
            text: String::new(),
            options,
            default_options: options,
            pattern: None,
            matches: IntervalStore::new(),
            pending: IntervalStore::new(),
            color: theme.search_highlight,
        }
    }

    /// Current query, empty when searching is off
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> SearchOptions {
        self.options
    }

    /// Matches found so far, in document order
    pub fn matches(&self) -> &[TextInterval] {
        self.matches.as_slice()
    }

    pub fn is_active(&self) -> bool {
        self.pattern.is_some()
    }

    /// Whether some region still waits for a re-scan
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Switch to a new query. The document is scanned on the next `style`
    /// or `refresh`.
    pub fn set_search(&mut self, text: &str, options: SearchOptions) -> Result<()> {
        if text == self.text && options == self.options && self.pattern.is_some() {
            return Ok(());
        }

        let pattern = if text.is_empty() {
            None
        } else {
            let source = if options.regex {
                text.to_string()
            } else {
                regex::escape(text)
            };
            Some(
                RegexBuilder::new(&source)
                    .case_insensitive(!options.match_case)
                    .build()?,
            )
        };

        self.matches.clear();
        self.pending.clear();
        self.text = text.to_string();
        self.options = options;
        self.pattern = pattern;
        if self.pattern.is_some() {
            self.pending.push(TextInterval::new(0, usize::MAX));
        }
        Ok(())
    }

    /// Drop the query and every match, restoring the default options
    pub fn clear(&mut self) {
        self.text.clear();
        self.options = self.default_options;
        self.pattern = None;
        self.matches.clear();
        self.pending.clear();
    }

    /// Scan `[from, to)` now, replacing whatever was stored for it.
    ///
    /// The pattern sees the whole document, so anchors such as `^` and `\b`
    /// look past the edges of the window. Only matches lying entirely inside
    /// `[from, to)` are kept. Both ends must lie on character boundaries.
    pub fn do_search(&mut self, doc: &dyn Document, from: usize, to: usize) {
        let Some(pattern) = &self.pattern else {
            return;
        };
        let to = to.min(doc.len());
        let from = from.min(to);
        let whole_word = self.options.whole_word;

        let haystack: &str = &doc.slice(0, doc.len());
        let mut found = Vec::new();
        let mut pos = from;
        while pos <= to {
            let Some(m) = pattern.find_at(haystack, pos) else {
                break;
            };
            if m.end() > to {
                break;
            }
            if m.is_empty() {
                // Step over the next character so the scan always advances
                pos = m.end() + haystack[m.end()..].chars().next().map_or(1, char::len_utf8);
                continue;
            }
            let m = TextInterval::new(m.start(), m.end());
            if !whole_word || filter_match(doc, m) {
                found.push(m);
            }
            pos = m.end;
        }

        debug!(from, to, found = found.len(), query = %self.text, "search");
        self.matches.replace_range(from, to, found);
    }

    /// Scan the whole document, superseding anything pending
    pub fn search_all(&mut self, doc: &dyn Document) {
        self.pending.clear();
        self.do_search(doc, 0, doc.len());
    }

    /// Re-scan every pending region
    pub fn refresh(&mut self, doc: &dyn Document) {
        if self.pending.is_empty() {
            return;
        }
        let regions = self.pending.merged();
        self.pending.clear();
        if self.pattern.is_none() {
            return;
        }

        // A match can begin up to a query length before the edit
        let margin = self.text.len();
        let len = doc.len();
        for region in regions {
            let start = doc.line_start(region.start.saturating_sub(margin));
            let end = doc.line_end(region.end.saturating_add(margin).min(len));
            self.do_search(doc, start, end);
        }
    }

    /// Shift for an insertion and schedule the touched text for a re-scan
    pub fn insert(&mut self, pos: usize, len: usize) {
        if self.pattern.is_none() || len == 0 {
            return;
        }
        trace!(pos, len, "search insert");
        self.matches.insert(pos, len);
        self.pending.insert(pos, len);
        // Neighbours may stop being whole words
        self.matches
            .remove_overlapping(pos.saturating_sub(1), pos + len + 1);
        self.pending.push(TextInterval::new(pos, pos + len));
    }

    /// Shift for a deletion and schedule the join point for a re-scan
    pub fn delete(&mut self, start: usize, end: usize) {
        if self.pattern.is_none() || end <= start {
            return;
        }
        trace!(start, end, "search delete");
        self.matches.delete(start, end);
        self.pending.delete(start, end);
        self.matches
            .remove_overlapping(start.saturating_sub(1), start + 1);
        self.pending.push(TextInterval::new(start, start));
    }

    /// Paint the matches overlapping `run`, skipping those `skip` rejects
    pub fn style_with(
        &mut self,
        doc: &dyn Document,
        run: &mut StyleRun,
        skip: impl Fn(TextInterval) -> bool,
    ) {
        self.refresh(doc);

        let color = self.color;
        for &m in self.matches.overlapping(run.start(), run.end()) {
            if skip(m) {
                continue;
            }
            run.set_background_color(m.start, m.end, color);
            run.set_show_hidden(m.start, m.end, true);
        }
    }
}

impl Styler for SearchHighlighter {
    fn style(&mut self, cx: &StyleContext<'_>, run: &mut StyleRun) {
        self.style_with(cx.doc, run, |_| false);
    }

    fn insert(&mut self, _cx: &StyleContext<'_>, pos: usize, len: usize) {
        SearchHighlighter::insert(self, pos, len);
    }

    fn delete(&mut self, _cx: &StyleContext<'_>, start: usize, end: usize) {
        SearchHighlighter::delete(self, start, end);
    }

    fn invalidate(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHost;

    fn spans(m: &[TextInterval]) -> Vec<(usize, usize)> {
        m.iter().map(|r| (r.start, r.end)).collect()
    }

    #[test]
    fn test_filter_match_token_boundaries() {
        let doc = "variable avar a_var var.x var";
        let mut hl = SearchHighlighter::new(&Theme::default());
        hl.set_search("var", SearchOptions::exact_word()).unwrap();
        hl.do_search(&doc, 0, doc.len());
        assert_eq!(spans(hl.matches()), vec![(20, 23), (26, 29)]);
    }

    #[test]
    fn test_search_is_lazy() {
        let host = TestHost::new("foo bar foo");
        let mut hl = SearchHighlighter::new(&Theme::default());
        hl.set_search("foo", SearchOptions::default()).unwrap();
        assert!(hl.matches().is_empty());
        assert!(hl.has_pending());

        let mut run = StyleRun::new(0, 11);
        hl.style(&host.cx(), &mut run);
        assert!(!hl.has_pending());
        assert_eq!(run.backgrounds(), vec![(0, 3), (8, 11)]);
        assert_eq!(run.annotations().len(), 4);
    }

    #[test]
    fn test_case_and_regex_options() {
        let doc = "Foo foo FOO f0o";
        let mut hl = SearchHighlighter::new(&Theme::default());

        hl.set_search("foo", SearchOptions::default()).unwrap();
        hl.refresh(&doc);
        assert_eq!(hl.matches().len(), 3);

        let exact = SearchOptions {
            match_case: true,
            ..Default::default()
        };
        hl.set_search("foo", exact).unwrap();
        hl.refresh(&doc);
        assert_eq!(spans(hl.matches()), vec![(4, 7)]);

        let regex = SearchOptions {
            match_case: true,
            regex: true,
            ..Default::default()
        };
        hl.set_search(r"f\wo", regex).unwrap();
        hl.refresh(&doc);
        assert_eq!(spans(hl.matches()), vec![(4, 7), (12, 15)]);
    }

    #[test]
    fn test_rescan_keeps_document_anchors() {
        let mut host = TestHost::new("foo bar baz\nfoo and more");
        let mut hl = SearchHighlighter::new(&Theme::default());
        let options = SearchOptions {
            match_case: true,
            regex: true,
            ..Default::default()
        };
        hl.set_search("^foo", options).unwrap();
        hl.refresh(&host.doc);
        assert_eq!(spans(hl.matches()), vec![(0, 3)]);

        // Only the second line is rescanned; `^` still means document start
        host.insert(24, "!");
        Styler::insert(&mut hl, &host.cx(), 24, 1);
        hl.refresh(&host.doc);
        assert_eq!(spans(hl.matches()), vec![(0, 3)]);

        // A window starting mid-word does not invent a word boundary
        let doc = "xmore more";
        hl.set_search(r"\bmore", options).unwrap();
        hl.do_search(&doc, 1, doc.len());
        assert_eq!(spans(hl.matches()), vec![(6, 10)]);
    }

    #[test]
    fn test_invalid_regex() {
        let mut hl = SearchHighlighter::new(&Theme::default());
        let options = SearchOptions {
            regex: true,
            ..Default::default()
        };
        assert!(hl.set_search("(unclosed", options).is_err());
        assert!(!hl.is_active());
        // Literal mode escapes the same text
        assert!(hl.set_search("(unclosed", SearchOptions::default()).is_ok());
    }

    #[test]
    fn test_empty_query_disables() {
        let host = TestHost::new("abc abc");
        let mut hl = SearchHighlighter::new(&Theme::default());
        hl.set_search("", SearchOptions::default()).unwrap();
        assert!(!hl.is_active());

        let mut run = StyleRun::new(0, 7);
        hl.style(&host.cx(), &mut run);
        assert!(run.annotations().is_empty());
    }

    #[test]
    fn test_insert_rescans_touched_line() {
        let mut host = TestHost::new("foo x foo\nfoo");
        let mut hl = SearchHighlighter::new(&Theme::default());
        hl.set_search("foo", SearchOptions::exact_word()).unwrap();
        hl.refresh(&host.doc);
        assert_eq!(spans(hl.matches()), vec![(0, 3), (6, 9), (10, 13)]);

        // "foo x foo" -> "foo xfoo foo": typed "foo" right after the x
        host.insert(5, "foo");
        Styler::insert(&mut hl, &host.cx(), 5, 3);
        assert!(hl.has_pending());
        hl.refresh(&host.doc);
        assert_eq!(host.doc, "foo xfoo foo\nfoo");
        assert_eq!(spans(hl.matches()), vec![(0, 3), (9, 12), (13, 16)]);
    }

    #[test]
    fn test_delete_joins_words() {
        let mut host = TestHost::new("foo bar foo");
        let mut hl = SearchHighlighter::new(&Theme::default());
        hl.set_search("foo", SearchOptions::exact_word()).unwrap();
        hl.refresh(&host.doc);
        assert_eq!(hl.matches().len(), 2);

        // Remove " bar " so the two words run together
        host.delete(3, 8);
        Styler::delete(&mut hl, &host.cx(), 3, 8);
        hl.refresh(&host.doc);
        assert_eq!(host.doc, "foofoo");
        assert!(hl.matches().is_empty());
    }

    #[test]
    fn test_edits_shift_untouched_matches() {
        let mut host = TestHost::new("foo\nbar\nfoo");
        let mut hl = SearchHighlighter::new(&Theme::default());
        hl.set_search("foo", SearchOptions::default()).unwrap();
        hl.refresh(&host.doc);

        host.insert(4, "baz");
        Styler::insert(&mut hl, &host.cx(), 4, 3);
        // The last line was not rescanned, only shifted
        assert_eq!(spans(hl.matches()), vec![(0, 3), (11, 14)]);

        host.delete(4, 7);
        Styler::delete(&mut hl, &host.cx(), 4, 7);
        hl.refresh(&host.doc);
        assert_eq!(spans(hl.matches()), vec![(0, 3), (8, 11)]);
    }

    #[test]
    fn test_clear_restores_defaults() {
        let mut hl = SearchHighlighter::with_default_options(&Theme::default(), SearchOptions::exact_word());
        hl.set_search("x", SearchOptions::default()).unwrap();
        hl.clear();
        assert_eq!(hl.text(), "");
        assert_eq!(hl.options(), SearchOptions::exact_word());
        assert!(!hl.is_active());
    }
}
