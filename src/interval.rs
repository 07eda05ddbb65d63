//! Byte ranges and the edit-aware store that keeps them aligned with the text

use std::fmt;

/// Half open byte range: [start, end)
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TextInterval {
    pub start: usize,
    pub end: usize,
}

impl TextInterval {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether `offset` falls inside, end exclusive
    pub fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Whether the two ranges share at least one byte
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        self.start < end && start < self.end
    }
}

impl fmt::Debug for TextInterval {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end)
    }
}

impl From<(usize, usize)> for TextInterval {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

/// Anything positioned by a `TextInterval`
pub trait Ranged {
    fn range(&self) -> TextInterval;
    fn range_mut(&mut self) -> &mut TextInterval;
}

impl Ranged for TextInterval {
    fn range(&self) -> TextInterval {
        *self
    }

    fn range_mut(&mut self) -> &mut TextInterval {
        self
    }
}

/// Ordered collection of ranged items, sorted by start offset
#[derive(Clone, PartialEq, Eq)]
pub struct IntervalStore<T: Ranged = TextInterval> {
    items: Vec<T>,
}

impl<T: Ranged + fmt::Debug> fmt::Debug for IntervalStore<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.items.fmt(f)
    }
}

impl<T: Ranged> Default for IntervalStore<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Ranged> IntervalStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn get(&self, idx: usize) -> Option<&T> {
        self.items.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Add an item, keeping the store sorted
    pub fn push(&mut self, item: T) {
        let start = item.range().start;
        match self.items.last() {
            Some(last) if last.range().start > start => {
                let idx = self.items.partition_point(|i| i.range().start <= start);
                self.items.insert(idx, item);
            }
            _ => self.items.push(item),
        }
    }

    /// Index of the first item starting at or after `offset`
    pub fn first_from(&self, offset: usize) -> usize {
        self.items.partition_point(|i| i.range().start < offset)
    }

    /// Index of the item containing `offset`, if any
    pub fn index_at(&self, offset: usize) -> Option<usize> {
        let idx = self.items.partition_point(|i| i.range().start <= offset);
        // Items may nest, so walk back until one covers the offset
        (0..idx).rev().find(|&i| self.items[i].range().contains(offset))
    }

    /// Items sharing at least one byte with `[start, end)`
    pub fn overlapping(&self, start: usize, end: usize) -> impl Iterator<Item = &T> + '_ {
        self.items
            .iter()
            .take_while(move |i| i.range().start < end)
            .filter(move |i| i.range().overlaps(start, end))
    }

    /// Drop every item sharing a byte with `[start, end)`
    pub fn remove_overlapping(&mut self, start: usize, end: usize) -> usize {
        let before = self.items.len();
        self.items.retain(|i| !i.range().overlaps(start, end));
        before - self.items.len()
    }

    /// Replace everything overlapping `[start, end)` with `items`
    pub fn replace_range(&mut self, start: usize, end: usize, items: impl IntoIterator<Item = T>) {
        self.remove_overlapping(start, end);
        for item in items {
            self.push(item);
        }
    }

    /// Shift for `len` bytes inserted at `pos`.
    ///
    /// Items at or after `pos` move forward; an item straddling `pos` grows.
    pub fn insert(&mut self, pos: usize, len: usize) {
        if len == 0 {
            return;
        }
        for item in &mut self.items {
            let r = item.range_mut();
            if r.start >= pos {
                r.start = r.start.saturating_add(len);
                r.end = r.end.saturating_add(len);
            } else if r.end > pos {
                r.end = r.end.saturating_add(len);
            }
        }
    }

    /// Shift for the bytes in `[start, end)` being removed.
    ///
    /// Items after the deletion move back, items overlapping it are clamped
    /// to its start, and items swallowed whole are dropped.
    pub fn delete(&mut self, start: usize, end: usize) {
        if end <= start {
            return;
        }
        let removed = end - start;
        let clamp = |offset: usize| {
            if offset >= end {
                offset - removed
            } else if offset > start {
                start
            } else {
                offset
            }
        };

        self.items.retain_mut(|item| {
            let r = item.range_mut();
            let was_empty = r.is_empty();
            r.start = clamp(r.start);
            r.end = clamp(r.end);
            was_empty || !r.is_empty()
        });
    }
}

impl IntervalStore<TextInterval> {
    /// Overlapping and touching ranges coalesced, in order
    pub fn merged(&self) -> Vec<TextInterval> {
        let mut out: Vec<TextInterval> = Vec::with_capacity(self.items.len());
        for r in &self.items {
            match out.last_mut() {
                Some(last) if r.start <= last.end => last.end = last.end.max(r.end),
                _ => out.push(*r),
            }
        }
        out
    }
}

impl<T: Ranged> FromIterator<T> for IntervalStore<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut items: Vec<T> = iter.into_iter().collect();
        items.sort_by_key(|i| i.range().start);
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(ranges: &[(usize, usize)]) -> IntervalStore {
        ranges.iter().map(|&r| TextInterval::from(r)).collect()
    }

    fn ranges(store: &IntervalStore) -> Vec<(usize, usize)> {
        store.iter().map(|r| (r.start, r.end)).collect()
    }

    #[test]
    fn test_push_keeps_order() {
        let mut s = IntervalStore::new();
        s.push(TextInterval::new(10, 12));
        s.push(TextInterval::new(2, 4));
        s.push(TextInterval::new(20, 22));
        s.push(TextInterval::new(10, 11));
        assert_eq!(ranges(&s), vec![(2, 4), (10, 12), (10, 11), (20, 22)]);
    }

    #[test]
    fn test_insert_shifts_following() {
        let mut s = store(&[(0, 3), (5, 8), (10, 12)]);
        s.insert(5, 4);
        assert_eq!(ranges(&s), vec![(0, 3), (9, 12), (14, 16)]);
    }

    #[test]
    fn test_insert_inside_grows() {
        let mut s = store(&[(2, 6)]);
        s.insert(4, 3);
        assert_eq!(ranges(&s), vec![(2, 9)]);
        // At the end of an interval nothing moves
        s.insert(9, 1);
        assert_eq!(ranges(&s), vec![(2, 9)]);
    }

    #[test]
    fn test_delete_shifts_and_clamps() {
        let mut s = store(&[(0, 3), (3, 8), (6, 12), (6, 9), (12, 15)]);
        s.delete(5, 10);
        // (3,8) loses its tail, (6,12) is clamped to start at 5,
        // (6,9) vanishes, (12,15) moves back by 5
        assert_eq!(ranges(&s), vec![(0, 3), (3, 5), (5, 7), (7, 10)]);
    }

    #[test]
    fn test_delete_keeps_empty_markers() {
        let mut s = store(&[(4, 4), (8, 8)]);
        s.delete(2, 6);
        assert_eq!(ranges(&s), vec![(2, 2), (4, 4)]);
    }

    #[test]
    fn test_index_at_nested() {
        let s = store(&[(0, 20), (5, 8), (10, 15)]);
        assert_eq!(s.index_at(6), Some(1));
        assert_eq!(s.index_at(9), Some(0));
        assert_eq!(s.index_at(20), None);
    }

    #[test]
    fn test_overlapping_and_replace() {
        let mut s = store(&[(0, 2), (4, 6), (8, 10), (12, 14)]);
        let hits: Vec<_> = s.overlapping(5, 9).map(|r| (r.start, r.end)).collect();
        assert_eq!(hits, vec![(4, 6), (8, 10)]);

        s.replace_range(5, 9, [TextInterval::new(7, 8)]);
        assert_eq!(ranges(&s), vec![(0, 2), (7, 8), (12, 14)]);
        assert_eq!(s.first_from(7), 1);
        assert_eq!(s.first_from(13), 3);
    }

    #[test]
    fn test_merged() {
        let s = store(&[(0, 4), (2, 6), (6, 8), (10, 12)]);
        assert_eq!(s.merged(), vec![TextInterval::new(0, 8), TextInterval::new(10, 12)]);
    }
}
