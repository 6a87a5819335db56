//! Line boundaries of the canonical text.
//!
//! Rebuilt from scratch after each mutation; documents are small enough
//! that incremental maintenance is not worth it.

/// Start offsets and lengths of every line, in chars.
///
/// Lines are split on `\n`. A text always has at least one line, and a
/// trailing `\n` opens an empty last line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Char offset of the first char of each line. `line_starts[0] == 0`.
    line_starts: Vec<usize>,
    /// Length of each line in chars, excluding its `\n`.
    line_lengths: Vec<usize>,
    len_chars: usize,
}

impl Default for LineIndex {
    fn default() -> Self {
        Self::build("")
    }
}

impl LineIndex {
    /// Builds the index for `text`.
    pub fn build(text: &str) -> Self {
        let mut line_starts = vec![0];
        let mut line_lengths = Vec::new();
        let mut offset = 0;
        for ch in text.chars() {
            offset += 1;
            if ch == '\n' {
                let start = line_starts[line_starts.len() - 1];
                line_lengths.push(offset - 1 - start);
                line_starts.push(offset);
            }
        }
        let last_start = line_starts[line_starts.len() - 1];
        line_lengths.push(offset - last_start);

        Self {
            line_starts,
            line_lengths,
            len_chars: offset,
        }
    }

    /// Returns the number of lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Returns the total number of chars in the indexed text.
    pub fn len_chars(&self) -> usize {
        self.len_chars
    }

    /// Returns the char offset where the 0-indexed `line` starts.
    pub fn line_start(&self, line: usize) -> Option<usize> {
        self.line_starts.get(line).copied()
    }

    /// Returns the length of the 0-indexed `line`, excluding its line break.
    pub fn line_len(&self, line: usize) -> Option<usize> {
        self.line_lengths.get(line).copied()
    }

    /// Returns all line lengths in order.
    pub fn line_lengths(&self) -> &[usize] {
        &self.line_lengths
    }

    /// Returns the 0-indexed line containing `offset`.
    ///
    /// An offset right after a `\n` belongs to the following line. Offsets
    /// past the end map to the last line.
    pub fn line_of_offset(&self, offset: usize) -> usize {
        let offset = offset.min(self.len_chars);
        match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(insert_at) => insert_at - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_has_one_line() {
        let idx = LineIndex::build("");
        assert_eq!(idx.line_count(), 1);
        assert_eq!(idx.line_len(0), Some(0));
        assert_eq!(idx.len_chars(), 0);
    }

    #[test]
    fn test_line_lengths() {
        let idx = LineIndex::build("ab\n\ncde\n");
        assert_eq!(idx.line_lengths(), &[2, 0, 3, 0]);
        assert_eq!(idx.line_start(2), Some(4));
        assert_eq!(idx.line_start(3), Some(8));
        assert_eq!(idx.line_start(4), None);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let idx = LineIndex::build("héllo\nwörld");
        assert_eq!(idx.line_lengths(), &[5, 5]);
        assert_eq!(idx.line_start(1), Some(6));
        assert_eq!(idx.len_chars(), 11);
    }

    #[test]
    fn test_line_of_offset_on_break_boundary() {
        let idx = LineIndex::build("ab\ncd");
        assert_eq!(idx.line_of_offset(0), 0);
        // offset 2 is the '\n' itself: still the first line
        assert_eq!(idx.line_of_offset(2), 0);
        // offset 3 sits right after the break: start of the next line
        assert_eq!(idx.line_of_offset(3), 1);
        assert_eq!(idx.line_of_offset(5), 1);
        assert_eq!(idx.line_of_offset(99), 1);
    }

    #[test]
    fn test_line_of_offset_with_empty_lines() {
        let idx = LineIndex::build("\n\n");
        assert_eq!(idx.line_of_offset(0), 0);
        assert_eq!(idx.line_of_offset(1), 1);
        assert_eq!(idx.line_of_offset(2), 2);
    }
}
