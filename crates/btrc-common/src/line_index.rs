//! On-demand conversion between 1-based line/column pairs and byte
//! offsets.
//!
//! Tokens and diagnostics carry 1-based line/column positions; terminal
//! rendering (ariadne) wants byte ranges into the source. The index is
//! built once per source file and queried in both directions.

/// Pre-computed index of line start positions.
#[derive(Debug)]
pub struct LineIndex {
    /// Byte offset of the start of each line. The first entry is always 0.
    line_starts: Vec<u32>,
}

impl LineIndex {
    /// Build a line index by scanning the source text for newlines.
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    /// Convert a byte offset to a 1-based (line, column) pair.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let line_idx = self.line_starts.partition_point(|&start| start <= offset);
        let line_idx = line_idx.saturating_sub(1);
        let line = (line_idx as u32) + 1;
        let col = offset - self.line_starts[line_idx] + 1;
        (line, col)
    }

    /// Convert a 1-based (line, column) pair to a byte offset.
    ///
    /// Out-of-range lines clamp to the last line start; the column is
    /// added as-is (columns count bytes, matching the lexer).
    pub fn offset(&self, line: u32, col: u32) -> u32 {
        let idx = (line.saturating_sub(1) as usize).min(self.line_starts.len() - 1);
        self.line_starts[idx] + col.saturating_sub(1)
    }

    /// Number of lines in the source.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_single_line() {
        let idx = LineIndex::new("hello");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(4), (1, 5));
    }

    #[test]
    fn line_col_multiple_lines() {
        let idx = LineIndex::new("hello\nworld\nfoo");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line_col(6), (2, 1));
        assert_eq!(idx.line_col(12), (3, 1));
        assert_eq!(idx.line_col(13), (3, 2));
    }

    #[test]
    fn offset_round_trips() {
        let src = "ab\ncdef\ng";
        let idx = LineIndex::new(src);
        for off in 0..src.len() as u32 {
            let (line, col) = idx.line_col(off);
            assert_eq!(idx.offset(line, col), off);
        }
    }

    #[test]
    fn offset_clamps_out_of_range_line() {
        let idx = LineIndex::new("ab\ncd");
        assert_eq!(idx.offset(99, 1), 3);
    }

    #[test]
    fn line_count() {
        assert_eq!(LineIndex::new("a\nb\nc").line_count(), 3);
    }
}
