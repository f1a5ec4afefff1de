//! CSS tokenizer following CSS Syntax Level 3.

use crate::input::Input;
use crate::LexerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// End of input or parse error; see `Lexer::err`.
    Error,

    // Names
    Ident,
    Function,
    AtKeyword,
    Hash,

    // Literals
    String,
    BadString,
    Url,
    BadUrl,
    Number,
    Percentage,
    Dimension,
    UnicodeRange,

    // Operators
    Delim,
    IncludeMatch,
    DashMatch,
    PrefixMatch,
    SuffixMatch,
    SubstringMatch,
    Column,

    // Structure
    Whitespace,
    Cdo,
    Cdc,
    Colon,
    Semicolon,
    Comma,
    LeftBracket,
    RightBracket,
    LeftParenthesis,
    RightParenthesis,
    LeftBrace,
    RightBrace,
    Comment,

    // Produced by the grammar parser only
    CustomPropertyName,
    CustomPropertyValue,
}

/// CSS lexer.
///
/// Unterminated strings, comments and urls are returned as a best-effort
/// token followed by an `Error` token carrying the parse error.
pub struct Lexer<'a> {
    z: Input<'a>,
    err: Option<LexerError>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            z: Input::new(src),
            err: None,
        }
    }

    /// `None` when the input ended cleanly.
    pub fn err(&self) -> Option<&LexerError> {
        self.err.as_ref()
    }

    /// Offset of the next unread byte.
    pub fn offset(&self) -> usize {
        self.z.pos()
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.z.bytes()
    }

    pub fn next(&mut self) -> (TokenType, &'a [u8]) {
        if self.err.is_some() || self.z.is_eof() {
            return (TokenType::Error, b"");
        }

        let c = self.z.peek(0);
        let tt = match c {
            b' ' | b'\t' | b'\n' | b'\r' | 0x0C => {
                while crate::is_whitespace(self.z.peek(0)) {
                    self.z.move_by(1);
                }
                TokenType::Whitespace
            }
            b'"' | b'\'' => self.consume_string(c),
            b'#' => {
                if is_name_char(self.z.peek(1)) || self.is_escape(1) {
                    self.z.move_by(1);
                    self.consume_name();
                    TokenType::Hash
                } else {
                    self.delim()
                }
            }
            b'$' | b'*' | b'^' | b'~' if self.z.peek(1) == b'=' => {
                self.z.move_by(2);
                match c {
                    b'$' => TokenType::SuffixMatch,
                    b'*' => TokenType::SubstringMatch,
                    b'^' => TokenType::PrefixMatch,
                    _ => TokenType::IncludeMatch,
                }
            }
            b'|' if self.z.peek(1) == b'=' => {
                self.z.move_by(2);
                TokenType::DashMatch
            }
            b'|' if self.z.peek(1) == b'|' => {
                self.z.move_by(2);
                TokenType::Column
            }
            b'(' => self.single(TokenType::LeftParenthesis),
            b')' => self.single(TokenType::RightParenthesis),
            b'[' => self.single(TokenType::LeftBracket),
            b']' => self.single(TokenType::RightBracket),
            b'{' => self.single(TokenType::LeftBrace),
            b'}' => self.single(TokenType::RightBrace),
            b',' => self.single(TokenType::Comma),
            b':' => self.single(TokenType::Colon),
            b';' => self.single(TokenType::Semicolon),
            b'+' | b'.' if self.starts_number(0) => self.consume_numeric(),
            b'-' => {
                if self.starts_number(0) {
                    self.consume_numeric()
                } else if self.z.peek(1) == b'-' && self.z.peek(2) == b'>' {
                    self.z.move_by(3);
                    TokenType::Cdc
                } else if self.starts_ident(0) {
                    self.consume_ident_like()
                } else {
                    self.delim()
                }
            }
            b'<' if self.z.peek(1) == b'!' && self.z.peek(2) == b'-' && self.z.peek(3) == b'-' => {
                self.z.move_by(4);
                TokenType::Cdo
            }
            b'@' if self.starts_ident(1) => {
                self.z.move_by(1);
                self.consume_name();
                TokenType::AtKeyword
            }
            b'/' if self.z.peek(1) == b'*' => self.consume_comment(),
            b'\\' if self.is_escape(0) => self.consume_ident_like(),
            b'0'..=b'9' => self.consume_numeric(),
            b'u' | b'U' if self.starts_unicode_range() => self.consume_unicode_range(),
            _ if is_name_start(c) => self.consume_ident_like(),
            _ => self.delim(),
        };
        (tt, self.z.shift())
    }

    // --- Scanners ---

    fn single(&mut self, tt: TokenType) -> TokenType {
        self.z.move_by(1);
        tt
    }

    fn delim(&mut self) -> TokenType {
        self.z.move_by(utf8_len(self.z.peek(0)));
        TokenType::Delim
    }

    fn consume_comment(&mut self) -> TokenType {
        self.z.move_by(2);
        loop {
            if self.z.is_eof() {
                self.err = Some(self.z.error_at(self.z.start(), "unterminated comment"));
                return TokenType::Comment;
            }
            if self.z.peek(0) == b'*' && self.z.peek(1) == b'/' {
                self.z.move_by(2);
                return TokenType::Comment;
            }
            self.z.move_by(1);
        }
    }

    fn consume_string(&mut self, quote: u8) -> TokenType {
        self.z.move_by(1);
        loop {
            if self.z.is_eof() {
                self.err = Some(self.z.error_at(self.z.start(), "unterminated string"));
                return TokenType::String;
            }
            match self.z.peek(0) {
                c if c == quote => {
                    self.z.move_by(1);
                    return TokenType::String;
                }
                b'\n' | b'\r' | 0x0C => return TokenType::BadString,
                b'\\' => {
                    if self.z.peek(1) == b'\r' && self.z.peek(2) == b'\n' {
                        self.z.move_by(3);
                    } else {
                        self.z.move_by(2);
                    }
                }
                _ => self.z.move_by(1),
            }
        }
    }

    fn consume_numeric(&mut self) -> TokenType {
        if matches!(self.z.peek(0), b'+' | b'-') {
            self.z.move_by(1);
        }
        self.skip_digits();
        if self.z.peek(0) == b'.' && self.z.peek(1).is_ascii_digit() {
            self.z.move_by(1);
            self.skip_digits();
        }
        let e = self.z.peek(0);
        if e == b'e' || e == b'E' {
            let sign = usize::from(matches!(self.z.peek(1), b'+' | b'-'));
            if self.z.peek(1 + sign).is_ascii_digit() {
                self.z.move_by(1 + sign);
                self.skip_digits();
            }
        }
        if self.starts_ident(0) {
            self.consume_name();
            TokenType::Dimension
        } else if self.z.peek(0) == b'%' {
            self.z.move_by(1);
            TokenType::Percentage
        } else {
            TokenType::Number
        }
    }

    fn consume_ident_like(&mut self) -> TokenType {
        self.consume_name();
        if self.z.peek(0) != b'(' {
            return TokenType::Ident;
        }
        self.z.move_by(1);
        if !crate::eq_lower(&self.z.lexeme()[..self.z.lexeme().len() - 1], b"url") {
            return TokenType::Function;
        }

        // url( followed by a quoted string is an ordinary function
        let mut i = 0;
        while crate::is_whitespace(self.z.peek(i)) {
            i += 1;
        }
        if matches!(self.z.peek(i), b'"' | b'\'') {
            return TokenType::Function;
        }
        self.z.move_by(i);
        self.consume_url()
    }

    fn consume_url(&mut self) -> TokenType {
        loop {
            if self.z.is_eof() {
                self.err = Some(self.z.error_at(self.z.start(), "unterminated url"));
                return TokenType::Url;
            }
            match self.z.peek(0) {
                b')' => {
                    self.z.move_by(1);
                    return TokenType::Url;
                }
                c if crate::is_whitespace(c) => {
                    while crate::is_whitespace(self.z.peek(0)) {
                        self.z.move_by(1);
                    }
                    if self.z.peek(0) == b')' {
                        self.z.move_by(1);
                        return TokenType::Url;
                    }
                    if self.z.is_eof() {
                        continue;
                    }
                    return self.consume_bad_url();
                }
                b'"' | b'\'' | b'(' => return self.consume_bad_url(),
                b'\\' => {
                    if self.is_escape(0) {
                        self.z.move_by(2);
                    } else {
                        return self.consume_bad_url();
                    }
                }
                _ => self.z.move_by(1),
            }
        }
    }

    fn consume_bad_url(&mut self) -> TokenType {
        while !self.z.is_eof() && self.z.peek(0) != b')' {
            if self.is_escape(0) {
                self.z.move_by(2);
            } else {
                self.z.move_by(1);
            }
        }
        self.z.move_by(1);
        TokenType::BadUrl
    }

    fn consume_unicode_range(&mut self) -> TokenType {
        self.z.move_by(2);
        let mut n = 0;
        while n < 6 && self.z.peek(0).is_ascii_hexdigit() {
            self.z.move_by(1);
            n += 1;
        }
        while n < 6 && self.z.peek(0) == b'?' {
            self.z.move_by(1);
            n += 1;
        }
        if self.z.peek(0) == b'-' && self.z.peek(1).is_ascii_hexdigit() {
            self.z.move_by(1);
            let mut m = 0;
            while m < 6 && self.z.peek(0).is_ascii_hexdigit() {
                self.z.move_by(1);
                m += 1;
            }
        }
        TokenType::UnicodeRange
    }

    // --- Helpers ---

    fn consume_name(&mut self) {
        loop {
            let c = self.z.peek(0);
            if is_name_char(c) {
                self.z.move_by(1);
            } else if self.is_escape(0) {
                self.consume_escape();
            } else {
                return;
            }
        }
    }

    fn consume_escape(&mut self) {
        self.z.move_by(1);
        if self.z.peek(0).is_ascii_hexdigit() {
            let mut n = 0;
            while n < 6 && self.z.peek(0).is_ascii_hexdigit() {
                self.z.move_by(1);
                n += 1;
            }
            if crate::is_whitespace(self.z.peek(0)) {
                self.z.move_by(1);
            }
        } else {
            self.z.move_by(utf8_len(self.z.peek(0)));
        }
    }

    fn skip_digits(&mut self) {
        while self.z.peek(0).is_ascii_digit() {
            self.z.move_by(1);
        }
    }

    fn is_escape(&self, i: usize) -> bool {
        self.z.peek(i) == b'\\' && !self.z.is_eof_at(i + 1) && !crate::is_newline(self.z.peek(i + 1))
    }

    fn starts_ident(&self, i: usize) -> bool {
        match self.z.peek(i) {
            b'-' => {
                let c = self.z.peek(i + 1);
                is_name_start(c) || c == b'-' || self.is_escape(i + 1)
            }
            b'\\' => self.is_escape(i),
            c => is_name_start(c),
        }
    }

    fn starts_number(&self, i: usize) -> bool {
        match self.z.peek(i) {
            b'+' | b'-' => {
                self.z.peek(i + 1).is_ascii_digit()
                    || (self.z.peek(i + 1) == b'.' && self.z.peek(i + 2).is_ascii_digit())
            }
            b'.' => self.z.peek(i + 1).is_ascii_digit(),
            c => c.is_ascii_digit(),
        }
    }

    fn starts_unicode_range(&self) -> bool {
        self.z.peek(1) == b'+' && (self.z.peek(2).is_ascii_hexdigit() || self.z.peek(2) == b'?')
    }
}

pub fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c >= 0x80
}

pub fn is_name_char(c: u8) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == b'-'
}

/// Whether `b` is a valid identifier that needs no escaping.
pub fn is_ident(b: &[u8]) -> bool {
    let rest = match b {
        [b'-', b'-', rest @ ..] => rest,
        [b'-', c, rest @ ..] if is_name_start(*c) => rest,
        [c, rest @ ..] if is_name_start(*c) => rest,
        _ => return false,
    };
    rest.iter().all(|&c| is_name_char(c))
}

/// Split a numeric token into its number and unit (or `%`) parts.
pub fn split_number(b: &[u8]) -> (&[u8], &[u8]) {
    let mut i = 0;
    if matches!(b.first(), Some(b'+' | b'-')) {
        i += 1;
    }
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    if i + 1 < b.len() && b[i] == b'.' && b[i + 1].is_ascii_digit() {
        i += 1;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < b.len() && (b[i] == b'e' || b[i] == b'E') {
        let mut j = i + 1;
        if j < b.len() && matches!(b[j], b'+' | b'-') {
            j += 1;
        }
        if j < b.len() && b[j].is_ascii_digit() {
            while j < b.len() && b[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    b.split_at(i)
}

fn utf8_len(c: u8) -> usize {
    match c {
        0xF0..=0xFF => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(src: &str) -> Vec<(TokenType, std::string::String)> {
        let mut l = Lexer::new(src.as_bytes());
        let mut out = Vec::new();
        loop {
            let (tt, data) = l.next();
            if tt == TokenType::Error {
                return out;
            }
            out.push((tt, std::string::String::from_utf8_lossy(data).into_owned()));
        }
    }

    fn kinds(src: &str) -> Vec<TokenType> {
        tokens(src).into_iter().map(|(tt, _)| tt).collect()
    }

    use TokenType::*;

    #[test]
    fn test_empty() {
        assert_eq!(kinds(""), vec![]);
        let mut l = Lexer::new(b"");
        assert_eq!(l.next().0, Error);
        assert!(l.err().is_none());
    }

    #[test]
    fn test_ruleset() {
        assert_eq!(
            kinds("a{color:red;}"),
            vec![Ident, LeftBrace, Ident, Colon, Ident, Semicolon, RightBrace]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("5 .5 +5 -5e3 5px 5% -.5em"),
            vec![
                (Number, "5".into()),
                (Whitespace, " ".into()),
                (Number, ".5".into()),
                (Whitespace, " ".into()),
                (Number, "+5".into()),
                (Whitespace, " ".into()),
                (Number, "-5e3".into()),
                (Whitespace, " ".into()),
                (Dimension, "5px".into()),
                (Whitespace, " ".into()),
                (Percentage, "5%".into()),
                (Whitespace, " ".into()),
                (Dimension, "-.5em".into()),
            ]
        );
    }

    #[test]
    fn test_hash_and_at_keyword() {
        assert_eq!(
            tokens("#fff @media # @"),
            vec![
                (Hash, "#fff".into()),
                (Whitespace, " ".into()),
                (AtKeyword, "@media".into()),
                (Whitespace, " ".into()),
                (Delim, "#".into()),
                (Whitespace, " ".into()),
                (Delim, "@".into()),
            ]
        );
    }

    #[test]
    fn test_functions_and_urls() {
        assert_eq!(
            tokens("rgb( url(x.png) url( 'y' ) url(a b)"),
            vec![
                (Function, "rgb(".into()),
                (Whitespace, " ".into()),
                (Url, "url(x.png)".into()),
                (Whitespace, " ".into()),
                (Function, "url(".into()),
                (Whitespace, " ".into()),
                (String, "'y'".into()),
                (Whitespace, " ".into()),
                (RightParenthesis, ")".into()),
                (Whitespace, " ".into()),
                (BadUrl, "url(a b)".into()),
            ]
        );
    }

    #[test]
    fn test_data_url() {
        assert_eq!(
            tokens("url(data:image/png;base64,iVBO==)"),
            vec![(Url, "url(data:image/png;base64,iVBO==)".into())]
        );
    }

    #[test]
    fn test_match_operators() {
        assert_eq!(
            kinds("~= |= ^= $= *= || |"),
            vec![
                IncludeMatch, Whitespace, DashMatch, Whitespace, PrefixMatch, Whitespace,
                SuffixMatch, Whitespace, SubstringMatch, Whitespace, Column, Whitespace, Delim
            ]
        );
    }

    #[test]
    fn test_cdo_cdc() {
        assert_eq!(kinds("<!-- -->"), vec![Cdo, Whitespace, Cdc]);
    }

    #[test]
    fn test_unicode_range() {
        assert_eq!(
            tokens("U+26 u+0-7F u+4??"),
            vec![
                (UnicodeRange, "U+26".into()),
                (Whitespace, " ".into()),
                (UnicodeRange, "u+0-7F".into()),
                (Whitespace, " ".into()),
                (UnicodeRange, "u+4??".into()),
            ]
        );
    }

    #[test]
    fn test_idents() {
        assert_eq!(
            tokens("-webkit-box --var \\31 a"),
            vec![
                (Ident, "-webkit-box".into()),
                (Whitespace, " ".into()),
                (Ident, "--var".into()),
                (Whitespace, " ".into()),
                (Ident, "\\31 a".into()),
            ]
        );
    }

    #[test]
    fn test_bad_string() {
        assert_eq!(kinds("'a\nb'"), vec![BadString, Whitespace, Ident, String]);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let mut l = Lexer::new(b"a{b:'x");
        let mut last = (Error, &b""[..]);
        loop {
            let t = l.next();
            if t.0 == Error {
                break;
            }
            last = t;
        }
        assert_eq!(last, (String, &b"'x"[..]));
        let err = l.err().unwrap();
        assert_eq!(err.message, "unterminated string");
        assert_eq!(err.column, 5);
    }

    #[test]
    fn test_unterminated_comment_is_error() {
        let mut l = Lexer::new(b"/* x");
        assert_eq!(l.next(), (Comment, &b"/* x"[..]));
        assert_eq!(l.next().0, Error);
        assert!(l.err().is_some());
    }

    #[test]
    fn test_split_number() {
        assert_eq!(split_number(b"-1.5em"), (&b"-1.5"[..], &b"em"[..]));
        assert_eq!(split_number(b"10%"), (&b"10"[..], &b"%"[..]));
        assert_eq!(split_number(b"1e3px"), (&b"1e3"[..], &b"px"[..]));
        assert_eq!(split_number(b"2em"), (&b"2"[..], &b"em"[..]));
    }

    #[test]
    fn test_is_ident() {
        assert!(is_ident(b"abc"));
        assert!(is_ident(b"-moz"));
        assert!(is_ident(b"--x"));
        assert!(!is_ident(b"1a"));
        assert!(!is_ident(b"a b"));
        assert!(!is_ident(b""));
    }

    #[test]
    fn test_malformed_never_loops() {
        for src in ["\\", "'\\", "url(", "url(\\", "@", "#", "u+", "\u{0}", "\u{0}\u{0}"] {
            let mut l = Lexer::new(src.as_bytes());
            for _ in 0..64 {
                if l.next().0 == Error {
                    break;
                }
            }
            assert_eq!(l.next().0, Error, "{src:?}");
        }
    }
}
