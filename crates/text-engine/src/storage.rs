//! Gap buffer text storage.
//!
//! The backing array keeps one movable hole (the gap) at the edit point:
//!
//! ```text
//!  [ text before gap | gap (unused) | text after gap ]
//!    0..gap_start      gap_start..gap_end  gap_end..cap
//! ```
//!
//! Inserting at the gap is O(1); moving the gap costs the distance moved, so sequential typing
//! at one cursor stays amortized O(1). Positions are character offsets into the logical text.
//!
//! The primitives here assert their preconditions instead of clamping. Callers that accept
//! untrusted offsets (the [`Buffer`](crate::Buffer) edit surface) clamp before calling in.

use crate::config::GapConfig;
use std::fmt;
use std::ops::Range;

const FILL: char = '\0';

/// Gap buffer over `char`s.
#[derive(Clone)]
pub struct TextStore {
    storage: Vec<char>,
    gap_start: usize,
    gap_end: usize,
    config: GapConfig,
}

impl TextStore {
    /// Create an empty store.
    pub fn new(config: GapConfig) -> Self {
        let cap = config.min_capacity;
        Self {
            storage: vec![FILL; cap],
            gap_start: 0,
            gap_end: cap,
            config,
        }
    }

    /// Create a store holding `text`, with the configured headroom after it.
    pub fn from_text(text: &str, config: GapConfig) -> Self {
        let mut storage: Vec<char> = text.chars().collect();
        let len = storage.len();
        let cap = config.initial_capacity(len);
        storage.resize(cap, FILL);
        Self {
            storage,
            gap_start: len,
            gap_end: cap,
            config,
        }
    }

    /// Number of live characters.
    pub fn len(&self) -> usize {
        self.storage.len() - (self.gap_end - self.gap_start)
    }

    /// Returns `true` if the store holds no characters.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated slots, including the gap.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Physical gap range (`gap_start..gap_end`). `gap_start` is also the current edit point.
    pub fn gap(&self) -> Range<usize> {
        self.gap_start..self.gap_end
    }

    /// Move the gap so that it starts at logical position `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos > len()`.
    pub fn set(&mut self, pos: usize) {
        assert!(
            pos <= self.len(),
            "gap position {pos} out of range (len {})",
            self.len()
        );
        if pos < self.gap_start {
            let moved = self.gap_start - pos;
            self.storage
                .copy_within(pos..self.gap_start, self.gap_end - moved);
            self.gap_start = pos;
            self.gap_end -= moved;
        } else if pos > self.gap_start {
            let moved = pos - self.gap_start;
            self.storage
                .copy_within(self.gap_end..self.gap_end + moved, self.gap_start);
            self.gap_start += moved;
            self.gap_end += moved;
        }
    }

    /// Write one character into the gap at `pos` and advance the edit point.
    ///
    /// # Panics
    ///
    /// Panics if the gap is not at `pos` or has no room left; call [`set`](Self::set) and
    /// [`ensure_capacity`](Self::ensure_capacity) first.
    pub fn insert_rune(&mut self, pos: usize, ch: char) {
        assert_eq!(pos, self.gap_start, "gap is not at insert position");
        assert!(self.gap_start < self.gap_end, "gap buffer has no headroom");
        self.storage[self.gap_start] = ch;
        self.gap_start += 1;
    }

    /// Grow the backing array so that `additional` more characters fit under the growth
    /// threshold. The text after the gap moves to the end of the new allocation.
    pub fn ensure_capacity(&mut self, additional: usize) {
        let needed = self.len() + additional;
        let old_cap = self.capacity();
        if !self.config.needs_growth(needed, old_cap) {
            return;
        }

        let mut new_cap = old_cap.max(self.config.min_capacity);
        while self.config.needs_growth(needed, new_cap) {
            let grown = (new_cap as f64 * self.config.growth_factor).ceil() as usize;
            new_cap = grown.max(new_cap + 1);
        }

        let tail = old_cap - self.gap_end;
        self.storage.resize(new_cap, FILL);
        self.storage
            .copy_within(self.gap_end..old_cap, new_cap - tail);
        self.gap_end = new_cap - tail;
        tracing::debug!(old_cap, new_cap, "gap buffer grown");
    }

    /// Character at logical position `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos >= len()`.
    pub fn at(&self, pos: usize) -> char {
        assert!(
            pos < self.len(),
            "position {pos} out of range (len {})",
            self.len()
        );
        if pos < self.gap_start {
            self.storage[pos]
        } else {
            self.storage[self.gap_end + (pos - self.gap_start)]
        }
    }

    /// The two physical slices making up `pos..pos + len`.
    fn segments(&self, pos: usize, len: usize) -> (&[char], &[char]) {
        let end = pos + len;
        assert!(
            end <= self.len(),
            "range {pos}..{end} out of range (len {})",
            self.len()
        );
        let physical = |i: usize| {
            if i < self.gap_start {
                i
            } else {
                self.gap_end + (i - self.gap_start)
            }
        };
        if end <= self.gap_start || pos >= self.gap_start {
            (&self.storage[physical(pos)..physical(pos) + len], &[])
        } else {
            (
                &self.storage[pos..self.gap_start],
                &self.storage[self.gap_end..physical(end)],
            )
        }
    }

    /// Copy of `len` characters starting at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past `len()`.
    pub fn substr(&self, pos: usize, len: usize) -> String {
        let (head, tail) = self.segments(pos, len);
        head.iter().chain(tail).collect()
    }

    /// Copy of `len` characters starting at `pos`, as a char vector.
    pub fn chars_range(&self, pos: usize, len: usize) -> Vec<char> {
        let (head, tail) = self.segments(pos, len);
        let mut out = Vec::with_capacity(len);
        out.extend_from_slice(head);
        out.extend_from_slice(tail);
        out
    }

    /// All characters, as handed to lexers.
    pub fn chars(&self) -> Vec<char> {
        self.chars_range(0, self.len())
    }

    /// The whole text.
    pub fn text(&self) -> String {
        self.substr(0, self.len())
    }

    /// Insert `text` at `pos`.
    ///
    /// # Panics
    ///
    /// Panics if `pos > len()`.
    pub fn insert_str(&mut self, pos: usize, text: &str) {
        self.ensure_capacity(text.chars().count());
        self.set(pos);
        for ch in text.chars() {
            self.insert_rune(self.gap_start, ch);
        }
    }

    /// Insert `text` at the end of the store.
    pub fn append(&mut self, text: &str) {
        self.ensure_capacity(text.chars().count());
        let end = self.len();
        if self.gap_start != end {
            self.set(end);
        }
        for ch in text.chars() {
            self.insert_rune(self.gap_start, ch);
        }
    }

    /// Remove `len` characters at `pos` by widening the gap over them.
    ///
    /// # Panics
    ///
    /// Panics if the range extends past `len()`.
    pub fn delete(&mut self, pos: usize, len: usize) {
        assert!(
            pos + len <= self.len(),
            "delete {pos}+{len} out of range (len {})",
            self.len()
        );
        self.set(pos);
        self.gap_end += len;
    }

    /// Drop all content and shrink back to the minimum allocation.
    pub fn clear(&mut self) {
        *self = Self::new(self.config);
    }

    /// Number of `'\n'` characters before `pos`, plus the column of `pos`.
    ///
    /// Linear scan used when no token index is available.
    pub fn scan_position(&self, pos: usize) -> (usize, usize) {
        let (head, tail) = self.segments(0, pos);
        let mut line = 0;
        let mut column = 0;
        for &ch in head.iter().chain(tail) {
            if ch == '\n' {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }
        (line, column)
    }
}

impl fmt::Debug for TextStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextStore")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("gap", &self.gap())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(text: &str) -> TextStore {
        TextStore::from_text(text, GapConfig::default())
    }

    #[test]
    fn test_new_store() {
        let ts = store("Hello, World!");
        assert_eq!(ts.text(), "Hello, World!");
        assert_eq!(ts.len(), 13);
        assert!(ts.capacity() > 13);
    }

    #[test]
    fn test_empty_store() {
        let ts = TextStore::new(GapConfig::default());
        assert_eq!(ts.text(), "");
        assert!(ts.is_empty());
        assert_eq!(ts.gap(), 0..16);
    }

    #[test]
    fn test_insert_at_start() {
        let mut ts = store("World");
        ts.insert_str(0, "Hello, ");
        assert_eq!(ts.text(), "Hello, World");
    }

    #[test]
    fn test_insert_at_end() {
        let mut ts = store("Hello");
        ts.append(", World");
        assert_eq!(ts.text(), "Hello, World");
    }

    #[test]
    fn test_insert_in_middle() {
        let mut ts = store("Hlo");
        ts.insert_str(1, "el");
        assert_eq!(ts.text(), "Hello");
        assert_eq!(ts.gap().start, 3);
    }

    #[test]
    fn test_delete_at_start() {
        let mut ts = store("Hello, World");
        ts.delete(0, 7);
        assert_eq!(ts.text(), "World");
    }

    #[test]
    fn test_delete_at_end() {
        let mut ts = store("Hello, World");
        ts.delete(5, 7);
        assert_eq!(ts.text(), "Hello");
    }

    #[test]
    fn test_delete_in_middle() {
        let mut ts = store("Hello, World");
        ts.delete(5, 2);
        assert_eq!(ts.text(), "HelloWorld");
    }

    #[test]
    fn test_multiple_operations() {
        let mut ts = store("Hello");
        ts.insert_str(5, " World");
        ts.insert_str(5, ",");
        ts.delete(0, 7);
        ts.insert_str(0, "Hi, ");
        assert_eq!(ts.text(), "Hi, World");
    }

    #[test]
    fn test_utf8_chinese() {
        let mut ts = store("你好");
        assert_eq!(ts.len(), 2);
        ts.insert_str(1, "们");
        assert_eq!(ts.text(), "你们好");
        assert_eq!(ts.at(1), '们');
    }

    #[test]
    fn test_set_moves_gap_both_ways() {
        let mut ts = store("abcdef");
        ts.set(2);
        assert_eq!(ts.gap().start, 2);
        assert_eq!(ts.text(), "abcdef");
        ts.set(5);
        assert_eq!(ts.gap().start, 5);
        assert_eq!(ts.text(), "abcdef");
        ts.set(0);
        assert_eq!(ts.text(), "abcdef");
    }

    #[test]
    fn test_at_and_substr_across_gap() {
        let mut ts = store("abcdef");
        ts.set(3);
        assert_eq!(ts.at(2), 'c');
        assert_eq!(ts.at(3), 'd');
        assert_eq!(ts.substr(1, 4), "bcde");
        assert_eq!(ts.substr(0, 3), "abc");
        assert_eq!(ts.substr(3, 3), "def");
        assert_eq!(ts.substr(6, 0), "");
    }

    #[test]
    fn test_growth_preserves_tail() {
        let mut ts = TextStore::new(GapConfig::default());
        ts.insert_str(0, "tail");
        ts.set(0);
        let before = ts.capacity();
        let long = "x".repeat(100);
        ts.insert_str(0, &long);
        assert!(ts.capacity() > before);
        assert_eq!(ts.text(), format!("{long}tail"));
        assert!(!GapConfig::default().needs_growth(ts.len(), ts.capacity()));
    }

    #[test]
    fn test_delete_is_gap_widening() {
        let mut ts = store("abcdef");
        let cap = ts.capacity();
        ts.delete(1, 3);
        assert_eq!(ts.text(), "aef");
        assert_eq!(ts.capacity(), cap);
        assert_eq!(ts.gap().start, 1);
    }

    #[test]
    fn test_scan_position() {
        let ts = store("ab\ncd\n\nx");
        assert_eq!(ts.scan_position(0), (0, 0));
        assert_eq!(ts.scan_position(4), (1, 1));
        assert_eq!(ts.scan_position(7), (3, 0));
    }

    #[test]
    fn test_clear() {
        let mut ts = store("some text");
        ts.clear();
        assert!(ts.is_empty());
        assert_eq!(ts.capacity(), GapConfig::default().min_capacity);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_past_end_panics() {
        let mut ts = store("abc");
        ts.set(4);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_at_past_end_panics() {
        store("abc").at(3);
    }

    #[test]
    #[should_panic(expected = "gap is not at insert position")]
    fn test_insert_rune_requires_gap_placement() {
        let mut ts = store("abc");
        ts.insert_rune(0, 'x');
    }
}
