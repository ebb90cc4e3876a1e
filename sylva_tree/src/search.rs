// Copyright 2025 the Sylva Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Case-insensitive label matching and highlight spans.

use alloc::string::String;
use alloc::vec::Vec;
use core::ops::Range;

/// A prepared search term.
///
/// The term is trimmed and lowercased once; matching lowercases the label
/// char by char, so no folded copy of every label is allocated while
/// flattening.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    folded: Vec<char>,
}

impl SearchTerm {
    /// Prepares `term`. Surrounding whitespace is ignored.
    #[must_use]
    pub fn new(term: &str) -> Self {
        let raw = String::from(term.trim());
        let folded = raw.chars().flat_map(char::to_lowercase).collect();
        Self { raw, folded }
    }

    /// The trimmed term as given.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns `true` when no search is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    /// Returns `true` if `label` contains the term, ignoring case.
    ///
    /// An empty term matches nothing.
    #[must_use]
    pub fn matches(&self, label: &str) -> bool {
        !self.is_empty()
            && label
                .char_indices()
                .any(|(start, _)| self.match_len(&label[start..]).is_some())
    }

    /// Byte ranges of non-overlapping matches in `label`, left to right.
    #[must_use]
    pub fn spans(&self, label: &str) -> Vec<Range<usize>> {
        let mut spans = Vec::new();
        if self.is_empty() {
            return spans;
        }
        let mut resume = 0;
        for (start, _) in label.char_indices() {
            if start < resume {
                continue;
            }
            if let Some(len) = self.match_len(&label[start..]) {
                spans.push(start..start + len);
                resume = start + len;
            }
        }
        spans
    }

    /// Length in bytes of the prefix of `hay` that matches the term.
    fn match_len(&self, hay: &str) -> Option<usize> {
        let needle = &self.folded;
        let mut matched = 0;
        for (offset, c) in hay.char_indices() {
            if matched == needle.len() {
                return Some(offset);
            }
            for lower in c.to_lowercase() {
                if needle.get(matched) != Some(&lower) {
                    return None;
                }
                matched += 1;
            }
        }
        (matched == needle.len()).then_some(hay.len())
    }
}

/// Byte ranges of `label` matching `term` case-insensitively.
///
/// ```rust
/// use sylva_tree::highlight_spans;
///
/// assert_eq!(highlight_spans("Read README", "read"), vec![0..4, 5..9]);
/// assert!(highlight_spans("anything", "  ").is_empty());
/// ```
#[must_use]
pub fn highlight_spans(label: &str, term: &str) -> Vec<Range<usize>> {
    SearchTerm::new(term).spans(label)
}
