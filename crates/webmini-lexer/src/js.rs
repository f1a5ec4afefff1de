//! JavaScript tokenizer.
//!
//! Whether a `/` starts a regular expression or is a division operator
//! cannot be decided from the bytes alone. The lexer always returns `/` and
//! `/=` as punctuators and keeps an [`ExprContext`] describing the previous
//! significant token. Callers check `context()` before calling `next()`
//! and call `rescan_as_regex()` when the slash starts a regular expression.

use crate::input::Input;
use crate::LexerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// End of input or parse error; see `Lexer::err`.
    Error,

    // Trivia
    Whitespace,
    LineTerminator,
    Comment,
    /// Multi-line comment that contains a line terminator.
    CommentLineTerminator,

    // Names
    Identifier,
    Keyword,
    PrivateIdentifier,

    // Literals
    Numeric,
    String,
    Regexp,
    /// Template without substitutions.
    Template,
    TemplateStart,
    TemplateMiddle,
    TemplateEnd,

    Punctuator,
}

/// What the previous significant token leaves the parser expecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExprContext {
    /// An operand may start here: a `/` begins a regular expression.
    ExpectOperand,
    /// An expression just ended: a `/` is division.
    AfterOperand,
}

pub struct Lexer<'a> {
    z: Input<'a>,
    err: Option<LexerError>,
    context: ExprContext,
    /// Context in effect before the last token, restored by a rescan.
    prev_context: ExprContext,
    last_start: usize,
    braces: usize,
    /// Brace depth at each open `${`, innermost last.
    templates: Vec<usize>,
    /// Only whitespace and comments since the last line terminator.
    line_start: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            z: Input::new(src),
            err: None,
            context: ExprContext::ExpectOperand,
            prev_context: ExprContext::ExpectOperand,
            last_start: 0,
            braces: 0,
            templates: Vec::new(),
            line_start: true,
        }
    }

    pub fn err(&self) -> Option<&LexerError> {
        self.err.as_ref()
    }

    /// Context for the next token.
    pub fn context(&self) -> ExprContext {
        self.context
    }

    pub fn next(&mut self) -> (TokenType, &'a [u8]) {
        if self.err.is_some() || self.z.is_eof() {
            return (TokenType::Error, b"");
        }
        self.last_start = self.z.pos();
        self.prev_context = self.context;

        let c = self.z.peek(0);
        let tt = match c {
            b' ' | b'\t' | 0x0B | 0x0C => self.consume_whitespace(),
            0xC2 if self.z.peek(1) == 0xA0 => self.consume_whitespace(),
            0xEF if self.z.peek(1) == 0xBB && self.z.peek(2) == 0xBF => self.consume_whitespace(),
            b'\n' | b'\r' => self.consume_line_terminator(),
            0xE2 if self.z.line_separator_len(0) > 0 => self.consume_line_terminator(),
            b'/' if self.z.peek(1) == b'/' => self.consume_line_comment(),
            b'/' if self.z.peek(1) == b'*' => self.consume_block_comment(),
            b'#' if self.z.pos() == 0 && self.z.peek(1) == b'!' => self.consume_line_comment(),
            // HTML-like comments of classic scripts.
            b'<' if self.z.rest().starts_with(b"<!--") => self.consume_line_comment(),
            b'-' if self.line_start && self.z.rest().starts_with(b"-->") => self.consume_line_comment(),
            b'"' | b'\'' => self.consume_string(c),
            b'`' => {
                self.z.move_by(1);
                self.consume_template(false)
            }
            b'}' if self.templates.last() == Some(&self.braces) => {
                self.z.move_by(1);
                self.consume_template(true)
            }
            b'0'..=b'9' => self.consume_numeric(),
            b'.' if self.z.peek(1).is_ascii_digit() => self.consume_numeric(),
            b'#' if is_identifier_start(self.z.peek(1)) => {
                self.z.move_by(1);
                self.consume_identifier_part();
                TokenType::PrivateIdentifier
            }
            _ if is_identifier_start(c) || (c == b'\\' && self.z.peek(1) == b'u') => {
                self.consume_identifier_part();
                if is_keyword(self.z.lexeme()) {
                    TokenType::Keyword
                } else {
                    TokenType::Identifier
                }
            }
            _ => match punctuator_len(self.z.rest()) {
                0 => {
                    self.err = Some(self.z.error(format!("unexpected {}", describe_byte(c))));
                    return (TokenType::Error, b"");
                }
                n => {
                    self.z.move_by(n);
                    TokenType::Punctuator
                }
            },
        };

        let data = self.z.shift();
        if tt == TokenType::Punctuator {
            match data {
                b"{" => self.braces += 1,
                b"}" => self.braces = self.braces.saturating_sub(1),
                _ => {}
            }
        }
        self.line_start = match tt {
            TokenType::LineTerminator | TokenType::CommentLineTerminator => true,
            TokenType::Whitespace | TokenType::Comment => self.line_start,
            _ => false,
        };
        self.update_context(tt, data);
        (tt, data)
    }

    /// Re-read the `/` or `/=` punctuator just returned as a regular expression.
    ///
    /// Returns `Error` (with `err()` set) when the expression is unterminated.
    /// Calling it after any other token does nothing and returns `Error`
    /// without setting an error.
    pub fn rescan_as_regex(&mut self) -> (TokenType, &'a [u8]) {
        if self.z.bytes().get(self.last_start) != Some(&b'/') || self.err.is_some() {
            return (TokenType::Error, b"");
        }
        self.z.reset(self.last_start);
        self.context = self.prev_context;
        self.z.move_by(1);

        let mut in_class = false;
        loop {
            if self.z.is_eof() || self.at_line_terminator(0) {
                self.err = Some(
                    self.z
                        .error_at(self.last_start, "unterminated regular expression literal"),
                );
                return (TokenType::Error, b"");
            }
            match self.z.peek(0) {
                b'\\' if !self.z.is_eof_at(1) && !self.at_line_terminator(1) => self.z.move_by(2),
                b'[' => {
                    in_class = true;
                    self.z.move_by(1);
                }
                b']' => {
                    in_class = false;
                    self.z.move_by(1);
                }
                b'/' if !in_class => {
                    self.z.move_by(1);
                    break;
                }
                _ => self.z.move_by(1),
            }
        }
        while is_identifier_char(self.z.peek(0)) && !self.z.is_eof() {
            self.z.move_by(1);
        }
        let data = self.z.shift();
        self.context = ExprContext::AfterOperand;
        (TokenType::Regexp, data)
    }

    fn update_context(&mut self, tt: TokenType, data: &[u8]) {
        self.context = match tt {
            TokenType::Whitespace
            | TokenType::LineTerminator
            | TokenType::Comment
            | TokenType::CommentLineTerminator
            | TokenType::Error => return,
            TokenType::Identifier
            | TokenType::PrivateIdentifier
            | TokenType::Numeric
            | TokenType::String
            | TokenType::Regexp
            | TokenType::Template
            | TokenType::TemplateEnd => ExprContext::AfterOperand,
            TokenType::TemplateStart | TokenType::TemplateMiddle => ExprContext::ExpectOperand,
            TokenType::Keyword => {
                if matches!(data, b"this" | b"super" | b"null" | b"true" | b"false") {
                    ExprContext::AfterOperand
                } else {
                    ExprContext::ExpectOperand
                }
            }
            TokenType::Punctuator => match data {
                b")" | b"]" => ExprContext::AfterOperand,
                b"++" | b"--" => return,
                _ => ExprContext::ExpectOperand,
            },
        };
    }

    // --- Scanners ---

    fn consume_whitespace(&mut self) -> TokenType {
        loop {
            match self.z.peek(0) {
                b' ' | b'\t' | 0x0B | 0x0C => self.z.move_by(1),
                0xC2 if self.z.peek(1) == 0xA0 => self.z.move_by(2),
                0xEF if self.z.peek(1) == 0xBB && self.z.peek(2) == 0xBF => self.z.move_by(3),
                _ => return TokenType::Whitespace,
            }
        }
    }

    fn consume_line_terminator(&mut self) -> TokenType {
        match self.z.peek(0) {
            b'\r' if self.z.peek(1) == b'\n' => self.z.move_by(2),
            b'\n' | b'\r' => self.z.move_by(1),
            _ => self.z.move_by(3),
        }
        TokenType::LineTerminator
    }

    fn consume_line_comment(&mut self) -> TokenType {
        while !self.z.is_eof() && !self.at_line_terminator(0) {
            self.z.move_by(1);
        }
        TokenType::Comment
    }

    fn consume_block_comment(&mut self) -> TokenType {
        self.z.move_by(2);
        let mut newline = false;
        loop {
            if self.z.is_eof() {
                self.err = Some(self.z.error_at(self.z.start(), "unterminated comment"));
                return TokenType::Comment;
            }
            match self.z.peek(0) {
                b'*' if self.z.peek(1) == b'/' => {
                    self.z.move_by(2);
                    break;
                }
                b'\n' | b'\r' => {
                    newline = true;
                    self.z.move_by(1);
                }
                _ => {
                    if self.z.line_separator_len(0) > 0 {
                        newline = true;
                    }
                    self.z.move_by(1);
                }
            }
        }
        if newline {
            TokenType::CommentLineTerminator
        } else {
            TokenType::Comment
        }
    }

    fn consume_string(&mut self, quote: u8) -> TokenType {
        self.z.move_by(1);
        loop {
            if self.z.is_eof() {
                break;
            }
            match self.z.peek(0) {
                c if c == quote => {
                    self.z.move_by(1);
                    return TokenType::String;
                }
                b'\\' => {
                    if self.z.peek(1) == b'\r' && self.z.peek(2) == b'\n' {
                        self.z.move_by(3);
                    } else {
                        self.z.move_by(2);
                    }
                }
                b'\n' | b'\r' => break,
                _ => self.z.move_by(1),
            }
        }
        self.err = Some(self.z.error_at(self.z.start(), "unterminated string literal"));
        TokenType::String
    }

    /// Scan template characters after the opening backtick or the `}` that
    /// closes a substitution.
    fn consume_template(&mut self, continuation: bool) -> TokenType {
        loop {
            if self.z.is_eof() {
                self.err = Some(self.z.error_at(self.z.start(), "unterminated template literal"));
                return if continuation {
                    TokenType::TemplateEnd
                } else {
                    TokenType::Template
                };
            }
            match self.z.peek(0) {
                b'`' => {
                    self.z.move_by(1);
                    if continuation {
                        self.templates.pop();
                        return TokenType::TemplateEnd;
                    }
                    return TokenType::Template;
                }
                b'\\' => self.z.move_by(2),
                b'$' if self.z.peek(1) == b'{' => {
                    self.z.move_by(2);
                    if continuation {
                        return TokenType::TemplateMiddle;
                    }
                    self.templates.push(self.braces);
                    return TokenType::TemplateStart;
                }
                _ => self.z.move_by(1),
            }
        }
    }

    fn consume_numeric(&mut self) -> TokenType {
        if self.z.peek(0) == b'0' && matches!(self.z.peek(1) | 0x20, b'x' | b'o' | b'b') {
            let radix = self.z.peek(1) | 0x20;
            self.z.move_by(2);
            loop {
                let c = self.z.peek(0);
                let ok = match radix {
                    b'x' => c.is_ascii_hexdigit(),
                    b'o' => (b'0'..=b'7').contains(&c),
                    _ => c == b'0' || c == b'1',
                };
                if ok || c == b'_' {
                    self.z.move_by(1);
                } else {
                    break;
                }
            }
        } else {
            self.skip_digits();
            if self.z.peek(0) == b'.' {
                self.z.move_by(1);
                self.skip_digits();
            }
            if matches!(self.z.peek(0), b'e' | b'E') {
                let sign = usize::from(matches!(self.z.peek(1), b'+' | b'-'));
                if self.z.peek(1 + sign).is_ascii_digit() {
                    self.z.move_by(1 + sign);
                    self.skip_digits();
                }
            }
        }
        if self.z.peek(0) == b'n' {
            self.z.move_by(1);
        }
        TokenType::Numeric
    }

    fn consume_identifier_part(&mut self) {
        loop {
            let c = self.z.peek(0);
            if c == b'\\' && self.z.peek(1) == b'u' {
                self.z.move_by(2);
                if self.z.peek(0) == b'{' {
                    while !self.z.is_eof() && self.z.peek(0) != b'}' {
                        self.z.move_by(1);
                    }
                    self.z.move_by(1);
                } else {
                    let mut n = 0;
                    while n < 4 && self.z.peek(0).is_ascii_hexdigit() {
                        self.z.move_by(1);
                        n += 1;
                    }
                }
            } else if is_identifier_char(c) && !self.z.is_eof() && !self.is_unicode_trivia() {
                self.z.move_by(1);
            } else {
                return;
            }
        }
    }

    /// Non-ASCII whitespace or line separator at the read position.
    fn is_unicode_trivia(&self) -> bool {
        let (a, b, c) = (self.z.peek(0), self.z.peek(1), self.z.peek(2));
        (a == 0xC2 && b == 0xA0)
            || (a == 0xEF && b == 0xBB && c == 0xBF)
            || self.z.line_separator_len(0) > 0
    }

    fn at_line_terminator(&self, n: usize) -> bool {
        matches!(self.z.peek(n), b'\n' | b'\r') || self.z.line_separator_len(n) > 0
    }

    fn skip_digits(&mut self) {
        while self.z.peek(0).is_ascii_digit() || self.z.peek(0) == b'_' {
            self.z.move_by(1);
        }
    }
}

pub fn is_identifier_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'$' || c == b'_' || c >= 0x80
}

pub fn is_identifier_char(c: u8) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

pub fn is_keyword(b: &[u8]) -> bool {
    matches!(
        b,
        b"await"
            | b"break"
            | b"case"
            | b"catch"
            | b"class"
            | b"const"
            | b"continue"
            | b"debugger"
            | b"default"
            | b"delete"
            | b"do"
            | b"else"
            | b"enum"
            | b"export"
            | b"extends"
            | b"false"
            | b"finally"
            | b"for"
            | b"function"
            | b"if"
            | b"import"
            | b"in"
            | b"instanceof"
            | b"let"
            | b"new"
            | b"null"
            | b"return"
            | b"static"
            | b"super"
            | b"switch"
            | b"this"
            | b"throw"
            | b"true"
            | b"try"
            | b"typeof"
            | b"var"
            | b"void"
            | b"while"
            | b"with"
            | b"yield"
    )
}

/// Length of the longest punctuator at the start of `b`, or 0.
fn punctuator_len(b: &[u8]) -> usize {
    const PUNCTUATORS: [&[u8]; 49] = [
        b">>>=", b"...", b"===", b"!==", b"**=", b"<<=", b">>=", b">>>", b"&&=", b"||=", b"??=",
        b"=>", b"==", b"!=", b"<=", b">=", b"&&", b"||", b"??", b"?.", b"++", b"--", b"+=", b"-=",
        b"*=", b"/=", b"%=", b"&=", b"|=", b"^=", b"**", b"<<", b">>", b"{", b"}", b"(", b")",
        b"[", b"]", b";", b",", b"<", b">", b"+", b"-", b"*", b"/", b"%", b"&",
    ];
    const SINGLES: &[u8] = b"|^!~?:=.@";

    for p in PUNCTUATORS {
        if b.starts_with(p) {
            // `a?.5:b` is a conditional, not optional chaining
            if p == b"?." && b.get(2).is_some_and(u8::is_ascii_digit) {
                continue;
            }
            return p.len();
        }
    }
    match b.first() {
        Some(c) if SINGLES.contains(c) => 1,
        _ => 0,
    }
}

fn describe_byte(c: u8) -> String {
    if c.is_ascii_graphic() {
        format!("'{}'", c as char)
    } else {
        format!("0x{:02X}", c)
    }
}
