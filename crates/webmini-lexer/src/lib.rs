//! webmini lexers
//!
//! Streaming tokenizers for the web formats handled by `webmini-minify`.
//! Every lexer walks a borrowed byte slice and hands out `(TokenType, &[u8])`
//! pairs that point straight into the input, so nothing is copied while
//! scanning. When the input is exhausted the lexer returns its `Error` token
//! type and `err()` tells a clean end (`None`) apart from a parse error.
//!
//! # Example
//!
//! ```
//! use webmini_lexer::json::{Parser, TokenType};
//!
//! let mut p = Parser::new(br#"{"a": 1}"#);
//! assert_eq!(p.next().0, TokenType::StartObject);
//! ```

pub mod buffer;
pub mod css;
pub mod css_parser;
pub mod hash;
pub mod html;
pub mod input;
pub mod js;
pub mod json;
pub mod xml;

pub use buffer::{TokenBuffer, TokenSource};
pub use input::Input;

/// Lexer error with position information.
///
/// `context` holds the offending source line and a caret under the column,
/// ready to be printed below the message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message} on line {line} and column {column}\n{context}")]
pub struct LexerError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub context: String,
}

impl LexerError {
    /// Build an error for the byte `offset` of `source`.
    pub fn new(source: &[u8], offset: usize, message: impl Into<String>) -> Self {
        let (line, column, context) = input::position(source, offset);
        Self {
            message: message.into(),
            line,
            column,
            context,
        }
    }
}

/// Whitespace as defined by HTML, CSS and XML (space, tab, newline, carriage return, form feed).
pub fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0C)
}

/// Newline bytes (`\n`, `\r`, form feed).
pub fn is_newline(c: u8) -> bool {
    matches!(c, b'\n' | b'\r' | 0x0C)
}

/// Whether all bytes are whitespace. An empty slice counts as whitespace.
pub fn is_all_whitespace(b: &[u8]) -> bool {
    b.iter().all(|&c| is_whitespace(c))
}

/// Trim leading and trailing whitespace.
pub fn trim_whitespace(b: &[u8]) -> &[u8] {
    let start = b.iter().position(|&c| !is_whitespace(c)).unwrap_or(b.len());
    let end = b.iter().rposition(|&c| !is_whitespace(c)).map_or(start, |i| i + 1);
    &b[start..end]
}

/// ASCII case-insensitive comparison with an already lowercase needle.
pub fn eq_lower(b: &[u8], lower: &[u8]) -> bool {
    b.len() == lower.len() && b.iter().zip(lower).all(|(c, l)| c.to_ascii_lowercase() == *l)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LexerError::new(b"buffer", 3, "unexpected");
        assert_eq!(err.line, 1);
        assert_eq!(err.column, 4);
        assert_eq!(
            err.to_string(),
            "unexpected on line 1 and column 4\n    1: buffer\n          ^"
        );
    }

    #[test]
    fn test_trim_whitespace() {
        assert_eq!(trim_whitespace(b"  a b \n"), b"a b");
        assert_eq!(trim_whitespace(b"   "), b"");
        assert_eq!(trim_whitespace(b""), b"");
    }

    #[test]
    fn test_eq_lower() {
        assert!(eq_lower(b"SCRIPT", b"script"));
        assert!(!eq_lower(b"scripts", b"script"));
    }
}
