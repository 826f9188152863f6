//! Document statistics for the status line.

use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    /// Editor lines (an empty document has one)
    pub lines: usize,
    /// Unicode words
    pub words: usize,
    /// User-perceived characters (grapheme clusters)
    pub chars: usize,
}

impl DocumentStats {
    pub fn of(content: &str) -> Self {
        Self {
            lines: content.split('\n').count(),
            words: content.unicode_words().count(),
            chars: content.graphemes(true).count(),
        }
    }
}
