//! Feature layout metadata.
//!
//! A [`FeatureLayout`] records where each state record's features land in
//! the flat output tensor, as an insertion-ordered name → [`Span`] map.
//! Consumers use it to slice out the self block, a particular pedestrian
//! slot, or an obstacle slot without hard-coding offsets.

use indexmap::IndexMap;

/// A contiguous slice of the flat feature tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    /// Offset of the first element.
    pub offset: usize,
    /// Number of elements.
    pub len: usize,
}

impl Span {
    /// The half-open element range `offset..offset + len`.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Named spans of the flat feature tensor, in tensor order.
///
/// Entry names are `"self"`, `"human[i]"`, and `"obstacle[j]"`. Iteration
/// order is insertion order, which equals tensor order.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureLayout {
    spans: IndexMap<String, Span>,
    total_len: usize,
}

impl FeatureLayout {
    pub(crate) fn new() -> Self {
        Self {
            spans: IndexMap::new(),
            total_len: 0,
        }
    }

    /// Append a named block of `len` elements, returning its span.
    pub(crate) fn push(&mut self, name: String, len: usize) -> Span {
        let span = Span {
            offset: self.total_len,
            len,
        };
        self.spans.insert(name, span);
        self.total_len += len;
        span
    }

    /// Total tensor length.
    pub fn total_len(&self) -> usize {
        self.total_len
    }

    /// Look up a span by entry name.
    pub fn span(&self, name: &str) -> Option<Span> {
        self.spans.get(name).copied()
    }

    /// Number of named entries.
    pub fn entry_count(&self) -> usize {
        self.spans.len()
    }

    /// Iterate entries in tensor order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Span)> {
        self.spans.iter().map(|(name, span)| (name.as_str(), *span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_are_contiguous_and_ordered() {
        let mut layout = FeatureLayout::new();
        layout.push("self".into(), 9);
        layout.push("human[0]".into(), 6);
        layout.push("human[1]".into(), 6);

        assert_eq!(layout.total_len(), 21);
        assert_eq!(layout.span("self"), Some(Span { offset: 0, len: 9 }));
        assert_eq!(layout.span("human[1]"), Some(Span { offset: 15, len: 6 }));

        let mut end = 0;
        for (_, span) in layout.iter() {
            assert_eq!(span.offset, end);
            end = span.range().end;
        }
        assert_eq!(end, layout.total_len());
    }
}
