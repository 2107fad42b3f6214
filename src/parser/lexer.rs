//! Lexical modes and source access for the structural scanner
//!
//! The scanner never builds tokens. It walks characters once and keeps a single
//! [`LexMode`] telling it how to read the current character; only
//! [`LexMode::Normal`] text can end a declaration. Everything else (string and
//! character literals, comments, directive lines, preprocessor-skipped code)
//! is consumed without affecting structure.

use super::tree::SourceLocation;
use thiserror::Error;

/// How the scanner reads the character under the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexMode {
    /// Structural text: boundaries, brackets and declaration headers
    Normal,
    /// Inside `"..."`; a verbatim string (`@"..."`) ignores backslashes
    InString { verbatim: bool },
    /// Inside `'...'`
    InChar,
    /// After `//` up to the end of the line
    LineComment,
    /// After `///`; the rest of the line is documentation
    SummaryComment,
    /// Inside `/* ... */`
    BlockComment,
    /// A `#` directive line
    Preprocessor,
    /// Code excluded by a false conditional, up to the next directive line
    PreprocessorSkip,
}

/// What went wrong while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated character literal")]
    UnterminatedChar,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("unclosed parenthesis or bracket")]
    UnclosedBracket,
    #[error("unclosed block")]
    UnclosedBlock,
}

/// A construct that was opened but never closed.
///
/// `offset` counts characters from the start of the scanned text and points at
/// the opening character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "parse error at line {}, column {} (offset {offset}): {kind}",
    .location.line,
    .location.column
)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub offset: usize,
    pub location: SourceLocation,
}

/// Character-indexed view of the text being scanned
pub struct SourceText {
    chars: Vec<char>,
}

impl SourceText {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn get(&self, offset: usize) -> Option<char> {
        self.chars.get(offset).copied()
    }

    /// Character just before `offset`, if any
    pub fn before(&self, offset: usize) -> Option<char> {
        offset.checked_sub(1).and_then(|i| self.get(i))
    }

    /// Text of `start..end` (clamped to the input)
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }

    /// Text of `start..end` with the given sorted, non-overlapping ranges left out
    pub fn slice_excluding(&self, start: usize, end: usize, excluded: &[(usize, usize)]) -> String {
        let mut text = String::new();
        let mut cursor = start;
        for &(from, to) in excluded {
            if to <= cursor || from >= end {
                continue;
            }
            if from > cursor {
                text.push_str(&self.slice(cursor, from));
            }
            cursor = cursor.max(to);
        }
        if cursor < end {
            text.push_str(&self.slice(cursor, end));
        }
        text
    }

    /// 1-based line and column of a character offset
    pub fn location(&self, offset: usize) -> SourceLocation {
        let mut line = 1;
        let mut column = 1;
        for &ch in self.chars.iter().take(offset) {
            if ch == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        SourceLocation::new(line, column)
    }

    pub fn error(&self, kind: ParseErrorKind, offset: usize) -> ParseError {
        ParseError {
            kind,
            offset,
            location: self.location(offset),
        }
    }
}
