use std::ops::Range;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_64;

/// A single byte-span replacement over a source file's full text.
///
/// Every manipulation in this crate compiles down to one or more `TextEdit`s that
/// are fed to the manipulation pipeline as a single atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TextEdit does nothing until it is applied to a source file"]
pub struct TextEdit {
    /// Starting byte offset (inclusive)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
    /// Text written over [start, end)
    pub new_text: String,
    /// Optional check of the text currently at [start, end)
    pub expected_before: Option<EditVerification>,
}

/// Verification strategy for the text an edit replaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditVerification {
    /// Exact text match required
    ExactMatch(String),
    /// xxh3 hash of expected text (faster for large spans)
    Hash(u64),
}

impl EditVerification {
    /// Check if the provided text matches the verification criteria.
    pub fn matches(&self, text: &str) -> bool {
        match self {
            EditVerification::ExactMatch(expected) => text == expected,
            EditVerification::Hash(expected_hash) => xxh3_64(text.as_bytes()) == *expected_hash,
        }
    }

    /// Create verification from text, using hash for text over 1KB.
    pub fn from_text(text: &str) -> Self {
        if text.len() > 1024 {
            EditVerification::Hash(xxh3_64(text.as_bytes()))
        } else {
            EditVerification::ExactMatch(text.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("invalid byte range [{start}, {end}) in text of length {text_len}")]
    InvalidRange {
        start: usize,
        end: usize,
        text_len: usize,
    },

    #[error("byte offset {offset} is not on a UTF-8 character boundary")]
    NotCharBoundary { offset: usize },

    #[error("edits {first:?} and {second:?} overlap")]
    Overlapping {
        first: Range<usize>,
        second: Range<usize>,
    },

    #[error("before-text verification failed at [{start}, {end}): found {found:?}")]
    BeforeTextMismatch {
        start: usize,
        end: usize,
        found: String,
    },
}

impl TextEdit {
    /// Replace [start, end) with `new_text`.
    pub fn replace(start: usize, end: usize, new_text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            new_text: new_text.into(),
            expected_before: None,
        }
    }

    /// Insert `text` at `pos`.
    pub fn insert(pos: usize, text: impl Into<String>) -> Self {
        Self::replace(pos, pos, text)
    }

    /// Delete [start, end).
    pub fn delete(start: usize, end: usize) -> Self {
        Self::replace(start, end, String::new())
    }

    /// Replace [start, end) only if the current text there equals `expected_before`.
    pub fn verified(
        start: usize,
        end: usize,
        new_text: impl Into<String>,
        expected_before: impl AsRef<str>,
    ) -> Self {
        Self::replace(start, end, new_text)
            .with_verification(EditVerification::from_text(expected_before.as_ref()))
    }

    /// Attach an explicit verification strategy.
    pub fn with_verification(mut self, verification: EditVerification) -> Self {
        self.expected_before = Some(verification);
        self
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn is_insertion(&self) -> bool {
        self.start == self.end
    }

    /// Signed change in text length caused by this edit.
    pub fn delta(&self) -> isize {
        self.new_text.len() as isize - (self.end - self.start) as isize
    }

    fn validate(&self, text: &str) -> Result<(), EditError> {
        if self.start > self.end || self.end > text.len() {
            return Err(EditError::InvalidRange {
                start: self.start,
                end: self.end,
                text_len: text.len(),
            });
        }
        for offset in [self.start, self.end] {
            if !text.is_char_boundary(offset) {
                return Err(EditError::NotCharBoundary { offset });
            }
        }
        if let Some(verification) = &self.expected_before {
            let current = &text[self.start..self.end];
            if !verification.matches(current) {
                return Err(EditError::BeforeTextMismatch {
                    start: self.start,
                    end: self.end,
                    found: current.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Validate a batch against `text` and return it sorted by start offset, descending.
///
/// Nothing is mutated here; any error leaves the caller's text untouched.
pub fn prepare(mut edits: Vec<TextEdit>, text: &str) -> Result<Vec<TextEdit>, EditError> {
    for edit in &edits {
        edit.validate(text)?;
    }

    edits.sort_by(|a, b| b.start.cmp(&a.start).then(b.end.cmp(&a.end)));

    // Sorted descending: for non-overlapping regions, earlier.end <= later.start
    for window in edits.windows(2) {
        let (later, earlier) = (&window[0], &window[1]);
        let same_point_insertions =
            later.is_insertion() && earlier.is_insertion() && later.start == earlier.start;
        if earlier.end > later.start || same_point_insertions {
            return Err(EditError::Overlapping {
                first: earlier.range(),
                second: later.range(),
            });
        }
    }

    Ok(edits)
}

/// Apply a prepared (descending) batch bottom-to-top so earlier offsets stay valid.
pub fn apply_prepared(text: &str, edits: &[TextEdit]) -> String {
    let growth: isize = edits.iter().map(TextEdit::delta).sum();
    let capacity = (text.len() as isize + growth).max(0) as usize;
    let mut out = String::with_capacity(capacity);
    out.push_str(text);
    for edit in edits {
        out.replace_range(edit.start..edit.end, &edit.new_text);
    }
    out
}

/// Where each edit's new text landed in the edited text, in ascending order.
pub fn new_spans(prepared: &[TextEdit]) -> Vec<Range<usize>> {
    let mut shift: isize = 0;
    let mut spans = Vec::with_capacity(prepared.len());
    for edit in prepared.iter().rev() {
        let start = (edit.start as isize + shift) as usize;
        spans.push(start..start + edit.new_text.len());
        shift += edit.delta();
    }
    spans
}

/// Where an untouched range of the old text ended up, or `None` if an edit
/// overlaps it. An insertion exactly at `range.start` pushes the range right.
pub fn shift_range(range: &Range<usize>, prepared: &[TextEdit]) -> Option<Range<usize>> {
    let mut delta: isize = 0;
    for edit in prepared {
        if edit.end <= range.start {
            delta += edit.delta();
        } else if edit.start < range.end {
            return None;
        }
    }
    Some(range.start.checked_add_signed(delta)?..range.end.checked_add_signed(delta)?)
}

/// The single edit turning `old` into `new`, covering only the changed middle.
pub fn between(old: &str, new: &str) -> TextEdit {
    let prefix = old
        .char_indices()
        .zip(new.chars())
        .find(|((_, a), b)| a != b)
        .map_or(old.len().min(new.len()), |((i, _), _)| i);
    let room = old.len().min(new.len()) - prefix;
    let suffix = old[prefix..]
        .chars()
        .rev()
        .zip(new[prefix..].chars().rev())
        .take_while(|(a, b)| a == b)
        .map(|(a, _)| a.len_utf8())
        .scan(0, |total, len| {
            *total += len;
            Some(*total)
        })
        .take_while(|&total| total <= room)
        .last()
        .unwrap_or(0);
    TextEdit::replace(prefix, old.len() - suffix, &new[prefix..new.len() - suffix])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn between_covers_only_the_change() {
        let edit = between("let a = 1;\nlet b = 2;", "let a = 1;\nlet bb = 2;");
        assert_eq!((edit.start, edit.end, edit.new_text.as_str()), (16, 16, "b"));

        let edit = between("same", "same");
        assert_eq!(edit.range(), 4..4);
        assert!(edit.new_text.is_empty());

        let edit = between("aé", "aè");
        assert_eq!((edit.start, edit.end, edit.new_text.as_str()), (1, 3, "è"));
    }

    #[test]
    fn verification_exact_match() {
        let verify = EditVerification::ExactMatch("hello world".to_string());
        assert!(verify.matches("hello world"));
        assert!(!verify.matches("hello"));
    }

    #[test]
    fn verification_from_large_text_uses_hash() {
        let text = "x".repeat(2000);
        let verify = EditVerification::from_text(&text);
        assert!(matches!(verify, EditVerification::Hash(_)));
        assert!(verify.matches(&text));
    }

    #[test]
    fn rejects_out_of_bounds() {
        let result = prepare(vec![TextEdit::replace(5, 20, "x")], "hello world");
        assert!(matches!(result, Err(EditError::InvalidRange { .. })));
    }

    #[test]
    fn rejects_inverted_range() {
        let result = prepare(vec![TextEdit::replace(10, 5, "x")], "hello world");
        assert!(matches!(result, Err(EditError::InvalidRange { .. })));
    }

    #[test]
    fn rejects_split_character() {
        let result = prepare(vec![TextEdit::insert(1, "x")], "é");
        assert!(matches!(result, Err(EditError::NotCharBoundary { offset: 1 })));
    }

    #[test]
    fn rejects_overlap() {
        let result = prepare(
            vec![TextEdit::replace(0, 5, "a"), TextEdit::replace(3, 8, "b")],
            "hello world",
        );
        assert!(matches!(result, Err(EditError::Overlapping { .. })));
    }

    #[test]
    fn rejects_two_insertions_at_one_offset() {
        let result = prepare(
            vec![TextEdit::insert(2, "a"), TextEdit::insert(2, "b")],
            "hello",
        );
        assert!(matches!(result, Err(EditError::Overlapping { .. })));
    }

    #[test]
    fn adjacent_edits_are_allowed() {
        let prepared = prepare(
            vec![TextEdit::replace(0, 5, "HELLO"), TextEdit::replace(5, 6, "_")],
            "hello world",
        )
        .unwrap();
        assert_eq!(apply_prepared("hello world", &prepared), "HELLO_world");
    }

    #[test]
    fn verification_mismatch_is_reported() {
        let result = prepare(vec![TextEdit::verified(0, 5, "HELLO", "howdy")], "hello world");
        assert!(matches!(result, Err(EditError::BeforeTextMismatch { .. })));
    }

    #[test]
    fn batch_applies_back_to_front() {
        let text = "line1\nline2\nline3\n";
        let prepared = prepare(
            vec![
                TextEdit::replace(0, 5, "LINE1"),
                TextEdit::replace(6, 11, "L2"),
                TextEdit::replace(12, 17, "LINE_THREE"),
            ],
            text,
        )
        .unwrap();
        assert_eq!(prepared[0].start, 12);
        assert_eq!(apply_prepared(text, &prepared), "LINE1\nL2\nLINE_THREE\n");
    }

    #[test]
    fn new_spans_track_shifts() {
        let text = "aaaa bbbb";
        let prepared = prepare(
            vec![TextEdit::replace(0, 4, "x"), TextEdit::insert(5, "yy")],
            text,
        )
        .unwrap();
        let edited = apply_prepared(text, &prepared);
        assert_eq!(edited, "x yybbbb");
        let spans = new_spans(&prepared);
        assert_eq!(&edited[spans[0].clone()], "x");
        assert_eq!(&edited[spans[1].clone()], "yy");
    }

    #[test]
    fn shift_range_moves_untouched_spans() {
        let prepared = prepare(
            vec![TextEdit::insert(0, "abc"), TextEdit::replace(10, 12, "")],
            "0123456789012345",
        )
        .unwrap();
        assert_eq!(shift_range(&(2..5), &prepared), Some(5..8));
        assert_eq!(shift_range(&(0..2), &prepared), Some(3..5));
        assert_eq!(shift_range(&(12..15), &prepared), Some(13..16));
        assert_eq!(shift_range(&(9..11), &prepared), None);
    }

    proptest! {
        #[test]
        fn between_reproduces_the_new_text(old in "[ab\u{e9} ]{0,12}", new in "[ab\u{e9} ]{0,12}") {
            let edit = between(&old, &new);
            let prepared = prepare(vec![edit], &old).unwrap();
            prop_assert_eq!(apply_prepared(&old, &prepared), new);
        }

        #[test]
        fn batch_equals_sequential_descending(
            text in "[a-z \n]{20,60}",
            cuts in proptest::collection::btree_set(0usize..20, 0..6),
            replacement in "[A-Z]{0,4}",
        ) {
            // Pair up sorted cut points into disjoint spans.
            let points: Vec<usize> = cuts.into_iter().collect();
            let edits: Vec<TextEdit> = points
                .chunks(2)
                .filter(|pair| pair.len() == 2)
                .map(|pair| TextEdit::replace(pair[0], pair[1], replacement.clone()))
                .collect();

            let prepared = prepare(edits.clone(), &text).unwrap();
            let batched = apply_prepared(&text, &prepared);

            let mut sequential = text.clone();
            let mut ordered = edits;
            ordered.sort_by(|a, b| b.start.cmp(&a.start));
            for edit in &ordered {
                sequential.replace_range(edit.start..edit.end, &edit.new_text);
            }
            prop_assert_eq!(batched, sequential);
        }
    }
}
