//! Source positions and the files they resolve into.
//!
//! Positions are global offsets shared by every file of a package: each
//! [`SourceFile`] owns the range `base ..= base + size`, so a single [`Pos`]
//! identifies both the file and the byte offset inside it.

use super::syntax::Expr;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A global source offset. `Pos::NONE` marks "no position".
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Pos(pub u32);

impl Pos {
    pub const NONE: Pos = Pos(0);

    pub fn is_valid(self) -> bool {
        self != Self::NONE
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extent of a syntax node; `end` is the position just past its last character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(start: Pos, end: Pos) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.start <= pos && pos < self.end
    }

    pub fn len(&self) -> u32 {
        self.end.0.saturating_sub(self.start.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A resolved, human-readable location (1-based line and column).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// One source file of a package together with its syntax.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub base: u32,
    pub size: u32,
    /// Offsets (relative to `base`) at which each line starts. The first entry is 0.
    #[serde(default)]
    pub line_starts: Vec<u32>,
    /// Top-level expressions of the file, in source order.
    #[serde(default)]
    pub exprs: Vec<Expr>,
}

impl SourceFile {
    pub fn start(&self) -> Pos {
        Pos(self.base)
    }

    pub fn end(&self) -> Pos {
        Pos(self.base.saturating_add(self.size))
    }

    pub fn contains(&self, pos: Pos) -> bool {
        self.start() <= pos && pos <= self.end()
    }

    /// Resolve `pos` to a line and column inside this file.
    pub fn position(&self, pos: Pos) -> Option<Location> {
        if !pos.is_valid() || !self.contains(pos) {
            return None;
        }
        let offset = pos.0 - self.base;
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(index) => index,
            Err(0) => 0,
            Err(index) => index - 1,
        };
        let line_start = self.line_starts.get(line_index).copied().unwrap_or(0);
        // a line table that does not start at 0 leaves offsets before its first line
        let column = offset.checked_sub(line_start)?;

        Some(Location {
            file: self.name.clone(),
            line: line_index + 1,
            column: column as usize + 1,
        })
    }
}

/// Find the file whose position range contains `pos`.
pub fn find_file(files: &[SourceFile], pos: Pos) -> Option<&SourceFile> {
    files.iter().find(|file| file.contains(pos))
}

/// Compute line start offsets for `text`, suitable for [`SourceFile::line_starts`].
pub fn line_starts(text: &str) -> Vec<u32> {
    std::iter::once(0)
        .chain(
            text.char_indices()
                .filter(|(_, c)| *c == '\n')
                .map(|(i, _)| i as u32 + 1),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(base: u32, text: &str) -> SourceFile {
        SourceFile {
            name: "errorf.go".into(),
            base,
            size: text.len() as u32,
            line_starts: line_starts(text),
            exprs: vec![],
        }
    }

    #[test]
    fn test_position_resolves_line_and_column() {
        let f = file(1, "package errorf\n\nfunc main() {\n}\n");

        let loc = f.position(Pos(1)).unwrap();
        assert_eq!((loc.line, loc.column), (1, 1));

        // "func" starts at offset 16, third line
        let loc = f.position(Pos(1 + 16)).unwrap();
        assert_eq!((loc.line, loc.column), (3, 1));

        let loc = f.position(Pos(1 + 21)).unwrap();
        assert_eq!((loc.line, loc.column), (3, 6));
        assert_eq!(loc.to_string(), "errorf.go:3:6");
    }

    #[test]
    fn test_position_outside_file_is_none() {
        let f = file(100, "abc");
        assert!(f.position(Pos(99)).is_none());
        assert!(f.position(Pos(104)).is_none());
        assert!(f.position(Pos::NONE).is_none());
        // end position still belongs to the file
        assert!(f.position(Pos(103)).is_some());
    }

    #[test]
    fn test_find_file_picks_owning_file() {
        let files = vec![file(1, "aaaa"), file(10, "bbbb")];
        assert_eq!(find_file(&files, Pos(3)).map(|f| f.base), Some(1));
        assert_eq!(find_file(&files, Pos(12)).map(|f| f.base), Some(10));
        assert!(find_file(&files, Pos(7)).is_none());
    }

    #[test]
    fn test_inconsistent_line_table_gives_no_location() {
        let mut f = file(1, "package errorf\n");
        f.line_starts = vec![1000];
        assert!(f.position(Pos(5)).is_none());
    }

    #[test]
    fn test_file_end_saturates() {
        let f = SourceFile {
            name: "huge.go".into(),
            base: u32::MAX - 1,
            size: 10,
            line_starts: vec![0],
            exprs: vec![],
        };
        assert_eq!(f.end(), Pos(u32::MAX));
        assert!(f.contains(Pos(u32::MAX)));
        assert_eq!(f.position(Pos(u32::MAX)).map(|loc| loc.column), Some(2));
    }

    #[test]
    fn test_span_contains_is_half_open() {
        let span = Span::new(Pos(5), Pos(9));
        assert!(span.contains(Pos(5)));
        assert!(span.contains(Pos(8)));
        assert!(!span.contains(Pos(9)));
        assert_eq!(span.len(), 4);
    }
}
