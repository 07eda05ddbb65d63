//! HTML tag matching
//!
//! Finds every `<...>` delimiter in the document, pairs open and close tags
//! by name and nesting depth, and highlights the pair around the caret.
//! Any edit throws the tag list away: a single typed `<` can change the
//! structure of everything after it, so a full rescan is the only safe
//! update. Moving the caret only re-derives the current pair.

use std::borrow::Cow;
use std::collections::HashMap;

use tracing::{debug, trace};

use super::{StyleContext, Styler, HIGHLIGHT_HTML};
use crate::document::{Document, EditorView, Settings};
use crate::interval::{IntervalStore, Ranged, TextInterval};
use crate::style::{Color, StyleRun, Theme};

/// One tag delimiter, e.g. `<div class="x">`, `</div>` or `<br/>`.
///
/// This is a single delimiter, not a whole element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInterval {
    range: TextInterval,
    name_len: usize,
    pub is_closing: bool,
    pub is_self_closing: bool,
}

impl TagInterval {
    /// Classify the delimiter spanning `[start, end)`
    pub fn new(start: usize, end: usize, doc: &dyn Document) -> Self {
        let is_closing = doc.byte_at(start + 1) == Some(b'/');
        let is_self_closing = end >= start + 3 && doc.byte_at(end - 2) == Some(b'/');

        let name_start = start + 1 + usize::from(is_closing);
        let mut name_end = name_start;
        while name_end + 1 < end {
            match doc.byte_at(name_end) {
                Some(b) if b.is_ascii_whitespace() || b == b'/' || b == b'>' => break,
                Some(_) => name_end += 1,
                None => break,
            }
        }

        Self {
            range: TextInterval::new(start, end),
            name_len: name_end - name_start,
            is_closing,
            is_self_closing,
        }
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn name_start(&self) -> usize {
        self.range.start + 1 + usize::from(self.is_closing)
    }

    pub fn tag_name_end(&self) -> usize {
        self.name_start() + self.name_len
    }

    pub fn name<'a>(&self, doc: &'a dyn Document) -> Cow<'a, str> {
        doc.slice(self.name_start(), self.tag_name_end())
    }
}

impl Ranged for TagInterval {
    fn range(&self) -> TextInterval {
        self.range
    }

    fn range_mut(&mut self) -> &mut TextInterval {
        &mut self.range
    }
}

/// Which derived state can still be trusted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Validity {
    /// Bracket and tag lists match the document
    pub tags_valid: bool,
    /// Current and matching tag match the caret
    pub current_valid: bool,
}

pub struct TagStyler {
    cursor: usize,
    validity: Validity,
    current_tag: Option<usize>,
    matching_tag: Option<usize>,
    brackets: Vec<usize>,
    tags: IntervalStore<TagInterval>,
    /// Counterpart of each tag, filled in by `find_tags`
    pairs: Vec<Option<usize>>,
    color: Color,
}

impl TagStyler {
    pub fn new(theme: &Theme) -> Self {
        Self {
            cursor: 0,
            validity: Validity::default(),
            current_tag: None,
            matching_tag: None,
            brackets: Vec::new(),
            tags: IntervalStore::new(),
            pairs: Vec::new(),
            color: theme.selection_highlight,
        }
    }

    pub fn should_style(&self, settings: &dyn Settings) -> bool {
        settings.is_enabled(HIGHLIGHT_HTML)
    }

    pub fn validity(&self) -> Validity {
        self.validity
    }

    pub fn tags(&self) -> &[TagInterval] {
        self.tags.as_slice()
    }

    /// Offsets of every `<` and `>` outside comments, from the last reparse
    pub fn brackets(&self) -> &[usize] {
        &self.brackets
    }

    pub fn current_tag(&self) -> Option<usize> {
        self.current_tag
    }

    pub fn matching_tag(&self) -> Option<usize> {
        self.matching_tag
    }

    pub fn clear(&mut self) {
        self.brackets.clear();
        self.tags.clear();
        self.pairs.clear();
        self.current_tag = None;
        self.matching_tag = None;
        self.validity = Validity::default();
    }

    /// Rebuild the bracket and tag lists from scratch
    pub fn reparse(&mut self, doc: &dyn Document) {
        self.find_all_brackets(doc);
        self.find_tags(doc);
        self.validity.tags_valid = true;
        // Tag indices may have changed under the cached pair
        self.validity.current_valid = false;
        debug!(
            brackets = self.brackets.len(),
            tags = self.tags.len(),
            "reparsed tags"
        );
    }

    /// Note a caret move; only the current pair goes stale
    pub fn update_cursor_position(&mut self, editor: &dyn EditorView) {
        let caret = editor.caret();
        if caret != self.cursor {
            self.cursor = caret;
            self.validity.current_valid = false;
        }
    }

    pub fn find_all_brackets(&mut self, doc: &dyn Document) {
        self.brackets.clear();
        self.find_brackets(0, doc.len(), doc);
    }

    /// Append the bracket offsets in `[start, end)`, skipping comments.
    /// Returns whether any were found.
    pub fn find_brackets(&mut self, start: usize, end: usize, doc: &dyn Document) -> bool {
        let before = self.brackets.len();
        let end = end.min(doc.len());
        let mut pos = start;

        while pos < end {
            match doc.byte_at(pos) {
                Some(b'<') if self.is_open_comment(doc, pos) => {
                    pos += 4;
                    while pos < end && !self.is_close_comment(doc, pos) {
                        pos += 1;
                    }
                }
                Some(b'<' | b'>') => self.brackets.push(pos),
                _ => {}
            }
            pos += 1;
        }

        self.brackets.len() > before
    }

    /// `bracket` opens a `<!--` comment
    pub fn is_open_comment(&self, doc: &dyn Document, bracket: usize) -> bool {
        b"<!--"
            .iter()
            .enumerate()
            .all(|(i, &b)| doc.byte_at(bracket + i) == Some(b))
    }

    /// `bracket` closes a `-->` comment
    pub fn is_close_comment(&self, doc: &dyn Document, bracket: usize) -> bool {
        bracket >= 2
            && doc.byte_at(bracket) == Some(b'>')
            && doc.byte_at(bracket - 1) == Some(b'-')
            && doc.byte_at(bracket - 2) == Some(b'-')
    }

    /// Turn the bracket list into tag delimiters and pair them up
    pub fn find_tags(&mut self, doc: &dyn Document) {
        self.tags.clear();
        // Brackets before this offset sit inside an accepted tag
        let mut consumed = 0;

        for &start in &self.brackets {
            if start < consumed || doc.byte_at(start) != Some(b'<') {
                continue;
            }
            let Some(end) = tag_end(doc, start) else {
                continue;
            };
            if self.is_valid_tag(start, end, doc) {
                self.tags.push(TagInterval::new(start, end, doc));
                consumed = end;
            }
        }

        self.pair_tags(doc);
    }

    /// Pair every close tag with the nearest unclosed open tag of the same
    /// name. Self-closing tags and unbalanced ones stay unpaired.
    fn pair_tags(&mut self, doc: &dyn Document) {
        let tags = self.tags.as_slice();
        let mut pairs = vec![None; tags.len()];
        let mut open: HashMap<String, Vec<usize>> = HashMap::new();

        for (i, tag) in tags.iter().enumerate() {
            if tag.is_self_closing {
                continue;
            }
            let name = tag.name(doc).to_ascii_lowercase();
            if !tag.is_closing {
                open.entry(name).or_default().push(i);
            } else if let Some(o) = open.get_mut(&name).and_then(Vec::pop) {
                pairs[o] = Some(i);
                pairs[i] = Some(o);
            }
        }

        self.pairs = pairs;
    }

    /// `[start, end)` looks like a real tag rather than a stray `<` in text
    pub fn is_valid_tag(&self, start: usize, end: usize, doc: &dyn Document) -> bool {
        if end < start + 3 || doc.byte_at(end - 1) != Some(b'>') {
            return false;
        }
        let name_start = match doc.byte_at(start + 1) {
            Some(b'/') => start + 2,
            _ => start + 1,
        };
        doc.byte_at(name_start).is_some_and(|b| b.is_ascii_alphabetic())
    }

    /// Tag names compare without regard to ASCII case
    pub fn same_tag(&self, open: &TagInterval, close: &TagInterval, doc: &dyn Document) -> bool {
        open.name_len == close.name_len
            && (0..open.name_len).all(|i| {
                match (doc.byte_at(open.name_start() + i), doc.byte_at(close.name_start() + i)) {
                    (Some(a), Some(b)) => a.eq_ignore_ascii_case(&b),
                    _ => false,
                }
            })
    }

    /// The counterpart of `tag`: the close tag for an open tag, the open
    /// tag for a close tag. `None` for self-closing tags and unbalanced
    /// markup.
    pub fn find_matching_tag(&self, tag: usize) -> Option<usize> {
        self.pairs.get(tag).copied().flatten()
    }

    /// Locate the tag pair for the caret and cache it.
    ///
    /// A caret inside a delimiter selects that delimiter. Otherwise the
    /// innermost element around the caret is used.
    pub fn find_current_tag(&mut self) -> Option<usize> {
        let (current, matching) = self.locate_current();
        self.current_tag = current;
        self.matching_tag = matching;
        self.validity.current_valid = true;
        trace!(cursor = self.cursor, ?current, ?matching, "current tag");
        current
    }

    fn locate_current(&self) -> (Option<usize>, Option<usize>) {
        let tags = self.tags.as_slice();
        let cursor = self.cursor;
        let before = tags.partition_point(|t| t.start() <= cursor);

        if before > 0 && tags[before - 1].range.contains(cursor) {
            let tag = before - 1;
            return (Some(tag), self.find_matching_tag(tag));
        }

        // Nearest opener whose close tag lies past the caret
        (0..before)
            .rev()
            .filter(|&i| !tags[i].is_closing)
            .find_map(|i| {
                let m = self.find_matching_tag(i)?;
                (tags[m].start() >= cursor).then_some((Some(i), Some(m)))
            })
            .unwrap_or((None, None))
    }

    /// First close tag at or after `search_position` that closes an element
    /// opened before it.
    pub fn find_parent_closing_tag(&self, search_position: usize) -> Option<usize> {
        let tags = self.tags.as_slice();
        (self.tags.first_from(search_position)..tags.len()).find(|&i| {
            tags[i].is_closing
                && self
                    .find_matching_tag(i)
                    .is_some_and(|open| tags[open].start() < search_position)
        })
    }

    /// The whole element one level outside `selection` (or the caret).
    ///
    /// Feeding the result back in as the next selection climbs one level
    /// per call. `None` once there is no enclosing element.
    pub fn select_parent_tag(
        &mut self,
        cx: &StyleContext<'_>,
        selection: Option<TextInterval>,
    ) -> Option<TextInterval> {
        if !self.should_style(cx.settings) {
            self.invalidate();
            return None;
        }
        if !self.validity.tags_valid {
            self.reparse(cx.doc);
        }

        let selection = selection.unwrap_or_else(|| {
            let caret = cx.editor.caret();
            TextInterval::new(caret, caret)
        });

        let mut search_from = selection.end;
        if selection.is_empty() {
            // Caret inside a delimiter: a close tag belongs to the element
            // it closes, an open tag to the element it starts
            if let Some(tag) = self.tags.index_at(selection.start).and_then(|i| self.tags.get(i)) {
                search_from = if tag.is_closing { tag.start() } else { tag.end() };
            }
        }

        loop {
            let close = self.find_parent_closing_tag(search_from)?;
            let close_tag = self.tags.get(close)?;
            let open = self.find_matching_tag(close)?;
            let open_start = self.tags.get(open)?.start();
            if open_start <= selection.start {
                return Some(TextInterval::new(open_start, close_tag.end()));
            }
            search_from = close_tag.end();
        }
    }

    fn mark_dirty(&mut self) {
        self.validity = Validity::default();
    }
}

/// End (exclusive) of the delimiter opened at `start`, honouring quoted
/// attribute values. `None` if another `<` or the end of the document
/// comes first.
fn tag_end(doc: &dyn Document, start: usize) -> Option<usize> {
    let len = doc.len();
    let mut quote: Option<u8> = None;
    let mut after_equals = false;

    for pos in start + 1..len {
        let b = doc.byte_at(pos)?;
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'>' => return Some(pos + 1),
            b'<' => return None,
            b'"' | b'\'' if after_equals => {
                quote = Some(b);
                after_equals = false;
            }
            b'=' => after_equals = true,
            b if b.is_ascii_whitespace() => {}
            _ => after_equals = false,
        }
    }
    None
}

impl Styler for TagStyler {
    fn style(&mut self, cx: &StyleContext<'_>, run: &mut StyleRun) {
        if !self.should_style(cx.settings) {
            self.invalidate();
            return;
        }

        if !self.validity.tags_valid {
            self.reparse(cx.doc);
        }
        self.update_cursor_position(cx.editor);
        if !self.validity.current_valid {
            self.find_current_tag();
        }

        if let (Some(current), Some(matching)) = (self.current_tag, self.matching_tag) {
            for idx in [current, matching] {
                if let Some(tag) = self.tags.get(idx) {
                    run.set_background_color(tag.start(), tag.end(), self.color);
                }
            }
        }
    }

    fn insert(&mut self, cx: &StyleContext<'_>, pos: usize, len: usize) {
        if !self.should_style(cx.settings) {
            self.invalidate();
            return;
        }
        trace!(pos, len, "tag insert");
        self.mark_dirty();
    }

    fn delete(&mut self, cx: &StyleContext<'_>, start: usize, end: usize) {
        if !self.should_style(cx.settings) {
            self.invalidate();
            return;
        }
        trace!(start, end, "tag delete");
        self.mark_dirty();
    }

    fn invalidate(&mut self) {
        self.clear();
    }
}
