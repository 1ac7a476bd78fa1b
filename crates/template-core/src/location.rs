use std::fmt;

/// A position in template source, used by every diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// Byte offset from the start of the source.
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl Location {
    /// Computes the 1-based line and column of a byte offset in `source`.
    pub fn locate(source: &str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let prefix = &source[..offset];
        let line = prefix.matches('\n').count() + 1;
        let col = match prefix.rfind('\n') {
            Some(nl) => prefix[nl + 1..].chars().count() + 1,
            None => prefix.chars().count() + 1,
        };
        Location { offset, line, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {} (offset {})", self.line, self.col, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locates_offsets_across_lines() {
        let source = "ab\ncdé\nf";
        assert_eq!(Location::locate(source, 0), Location { offset: 0, line: 1, col: 1 });
        assert_eq!(Location::locate(source, 4), Location { offset: 4, line: 2, col: 2 });
        // 'f' sits after the two-byte 'é'
        assert_eq!(Location::locate(source, 8).line, 3);
        assert_eq!(Location::locate(source, 8).col, 1);
    }

    #[test]
    fn clamps_past_the_end() {
        assert_eq!(Location::locate("abc", 99).offset, 3);
    }
}
