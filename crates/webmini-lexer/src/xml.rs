//! XML tokenizer.
//!
//! Unlike the HTML lexer this one reports unterminated comments, CDATA
//! sections, doctypes, tags and attribute strings as errors.

use crate::buffer::TokenSource;
use crate::input::Input;
use crate::{is_whitespace, LexerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Error,
    Comment,
    Doctype,
    CData,
    StartTag,
    /// `<?name`
    StartTagPI,
    Attribute,
    StartTagClose,
    StartTagCloseVoid,
    /// `?>`
    StartTagClosePI,
    EndTag,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenType,
    pub data: &'a [u8],
    pub text: &'a [u8],
    pub attr_val: &'a [u8],
}

pub struct Lexer<'a> {
    z: Input<'a>,
    err: Option<LexerError>,
    in_tag: bool,
    text: &'a [u8],
    attr_val: &'a [u8],
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            z: Input::new(src),
            err: None,
            in_tag: false,
            text: b"",
            attr_val: b"",
        }
    }

    pub fn err(&self) -> Option<&LexerError> {
        self.err.as_ref()
    }

    /// Tag or attribute name, or the content of a comment, CDATA section or doctype.
    pub fn text(&self) -> &'a [u8] {
        self.text
    }

    /// Raw attribute value of the last `Attribute` token, quotes included.
    pub fn attr_val(&self) -> &'a [u8] {
        self.attr_val
    }

    pub fn next(&mut self) -> (TokenType, &'a [u8]) {
        self.text = b"";
        self.attr_val = b"";
        if self.err.is_some() {
            return (TokenType::Error, b"");
        }
        if self.in_tag {
            return self.next_in_tag();
        }
        if self.z.is_eof() {
            return (TokenType::Error, b"");
        }

        let rest = self.z.rest();
        if rest[0] == b'<' {
            if rest.starts_with(b"<!--") {
                return self.consume_comment();
            } else if rest.starts_with(b"<![CDATA[") {
                return self.consume_cdata();
            } else if rest.starts_with(b"<!DOCTYPE") {
                return self.consume_doctype();
            } else if rest.starts_with(b"</") {
                return self.consume_end_tag();
            } else if rest.starts_with(b"<?") {
                return self.consume_start_tag(TokenType::StartTagPI, 2);
            } else if rest.len() > 1 && is_name_start(rest[1]) {
                return self.consume_start_tag(TokenType::StartTag, 1);
            }
        }

        self.z.move_by(1);
        while !self.z.is_eof() && self.z.peek(0) != b'<' {
            self.z.move_by(1);
        }
        (TokenType::Text, self.z.shift())
    }

    fn fail(&mut self, offset: usize, message: &str) -> (TokenType, &'a [u8]) {
        self.err = Some(self.z.error_at(offset, message));
        (TokenType::Error, b"")
    }

    fn consume_comment(&mut self) -> (TokenType, &'a [u8]) {
        let start = self.z.pos();
        self.z.move_by(4);
        let inner = self.z.pos();
        match find(self.z.rest(), b"-->") {
            Some(n) => {
                self.text = self.z.slice(inner, inner + n);
                self.z.move_by(n + 3);
                (TokenType::Comment, self.z.shift())
            }
            None => self.fail(start, "unexpected end of input in comment"),
        }
    }

    fn consume_cdata(&mut self) -> (TokenType, &'a [u8]) {
        let start = self.z.pos();
        self.z.move_by(9);
        let inner = self.z.pos();
        match find(self.z.rest(), b"]]>") {
            Some(n) => {
                self.text = self.z.slice(inner, inner + n);
                self.z.move_by(n + 3);
                (TokenType::CData, self.z.shift())
            }
            None => self.fail(start, "unexpected end of input in CDATA section"),
        }
    }

    /// `<!DOCTYPE ...>` with an optional `[...]` internal subset.
    fn consume_doctype(&mut self) -> (TokenType, &'a [u8]) {
        let start = self.z.pos();
        self.z.move_by(9);
        let inner = self.z.pos();
        let mut in_subset = false;
        let mut quote = 0;
        while !self.z.is_eof() {
            let c = self.z.peek(0);
            if quote != 0 {
                if c == quote {
                    quote = 0;
                }
            } else if c == b'"' || c == b'\'' {
                quote = c;
            } else if c == b'[' {
                in_subset = true;
            } else if c == b']' {
                in_subset = false;
            } else if c == b'>' && !in_subset {
                self.text = self.z.slice(inner, self.z.pos());
                self.z.move_by(1);
                return (TokenType::Doctype, self.z.shift());
            }
            self.z.move_by(1);
        }
        self.fail(start, "unexpected end of input in doctype")
    }

    fn consume_end_tag(&mut self) -> (TokenType, &'a [u8]) {
        let start = self.z.pos();
        self.z.move_by(2);
        let name_start = self.z.pos();
        while !self.z.is_eof() && is_name_char(self.z.peek(0)) {
            self.z.move_by(1);
        }
        self.text = self.z.slice(name_start, self.z.pos());
        while !self.z.is_eof() && self.z.peek(0) != b'>' {
            self.z.move_by(1);
        }
        if self.z.is_eof() {
            return self.fail(start, "unexpected end of input in end tag");
        }
        self.z.move_by(1);
        (TokenType::EndTag, self.z.shift())
    }

    fn consume_start_tag(&mut self, tt: TokenType, skip: usize) -> (TokenType, &'a [u8]) {
        self.z.move_by(skip);
        let name_start = self.z.pos();
        while !self.z.is_eof() && is_name_char(self.z.peek(0)) {
            self.z.move_by(1);
        }
        self.text = self.z.slice(name_start, self.z.pos());
        self.in_tag = true;
        (tt, self.z.shift())
    }

    fn next_in_tag(&mut self) -> (TokenType, &'a [u8]) {
        while is_whitespace(self.z.peek(0)) {
            self.z.move_by(1);
        }
        self.z.skip();
        if self.z.is_eof() {
            return self.fail(self.z.pos(), "unexpected end of input in tag");
        }
        let (c, next) = (self.z.peek(0), self.z.peek(1));
        let close = match (c, next) {
            (b'>', _) => Some((TokenType::StartTagClose, 1)),
            (b'/', b'>') => Some((TokenType::StartTagCloseVoid, 2)),
            (b'?', b'>') => Some((TokenType::StartTagClosePI, 2)),
            _ => None,
        };
        if let Some((tt, n)) = close {
            self.z.move_by(n);
            self.in_tag = false;
            return (tt, self.z.shift());
        }

        let name_start = self.z.pos();
        while !self.z.is_eof() {
            let c = self.z.peek(0);
            if is_whitespace(c) || c == b'=' || c == b'>' || (c == b'/' || c == b'?') && self.z.peek(1) == b'>' {
                break;
            }
            self.z.move_by(1);
        }
        if self.z.pos() == name_start {
            // stray byte such as a lone `/`
            self.z.move_by(1);
        }
        self.text = self.z.slice(name_start, self.z.pos());

        let mut i = 0;
        while is_whitespace(self.z.peek(i)) {
            i += 1;
        }
        if self.z.peek(i) == b'=' {
            i += 1;
            while is_whitespace(self.z.peek(i)) {
                i += 1;
            }
            self.z.move_by(i);
            let val_start = self.z.pos();
            let quote = self.z.peek(0);
            if quote == b'"' || quote == b'\'' {
                self.z.move_by(1);
                while !self.z.is_eof() && self.z.peek(0) != quote {
                    self.z.move_by(1);
                }
                if self.z.is_eof() {
                    return self.fail(val_start, "unexpected end of input in attribute value");
                }
                self.z.move_by(1);
            } else {
                while !self.z.is_eof() {
                    let c = self.z.peek(0);
                    if is_whitespace(c) || c == b'>' || (c == b'/' || c == b'?') && self.z.peek(1) == b'>' {
                        break;
                    }
                    self.z.move_by(1);
                }
            }
            self.attr_val = self.z.slice(val_start, self.z.pos());
        }
        (TokenType::Attribute, self.z.shift())
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn is_name_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b':' || c >= 0x80
}

fn is_name_char(c: u8) -> bool {
    is_name_start(c) || c.is_ascii_digit() || c == b'-' || c == b'.'
}

impl<'a> TokenSource for Lexer<'a> {
    type Token = Token<'a>;

    fn next_token(&mut self) -> Token<'a> {
        let (kind, data) = self.next();
        Token {
            kind,
            data,
            text: self.text(),
            attr_val: self.attr_val(),
        }
    }

    fn is_terminal(token: &Token<'a>) -> bool {
        token.kind == TokenType::Error
    }
}
