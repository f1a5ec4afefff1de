//! JavaScript minifier.
//!
//! Works on the token stream alone: whitespace and comments are dropped,
//! separators are written back only where two tokens would merge or where a
//! line terminator changes how semicolons are inserted, and string and
//! numeric literals are shortened.

use serde::{Deserialize, Serialize};
use webmini_lexer::js::{is_identifier_char, ExprContext, Lexer, TokenType};

use crate::common::number;
use crate::{Minifier, Minify, MinifyError, Params};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Significant digits kept in numbers, 0 keeps them all.
    pub precision: usize,
    /// Keep `/*! ... */` comments.
    pub keep_license_comments: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            precision: 0,
            keep_license_comments: true,
        }
    }
}

impl Minify for Options {
    fn minify(
        &self,
        _m: &Minifier,
        out: &mut Vec<u8>,
        input: &[u8],
        _params: &Params,
    ) -> Result<(), MinifyError> {
        JsWriter::new(self, out).run(input)
    }
}

struct JsWriter<'w> {
    o: &'w Options,
    out: &'w mut Vec<u8>,
    /// Kind of the last written token, `None` at the start or after a newline.
    prev: Option<TokenType>,
    /// Start of the last written token in `out`.
    prev_start: usize,
    /// A line terminator was skipped since the last written token.
    newline: bool,
    /// A `;` waits for the next token to see whether it can be dropped.
    semicolon: bool,
    /// Whether each open `(` is the head of `if`, `for`, `while`, `with`, `catch` or `switch`.
    parens: Vec<bool>,
    /// Whether each open `{` is a statement block.
    braces: Vec<bool>,
    /// The last `)` closed a control head.
    closed_control: bool,
    /// The last `}` closed a statement block.
    closed_block: bool,
}

impl<'w> JsWriter<'w> {
    fn new(o: &'w Options, out: &'w mut Vec<u8>) -> Self {
        Self {
            o,
            out,
            prev: None,
            prev_start: 0,
            newline: false,
            semicolon: false,
            parens: Vec::new(),
            braces: Vec::new(),
            closed_control: false,
            closed_block: false,
        }
    }

    fn run(&mut self, input: &[u8]) -> Result<(), MinifyError> {
        let mut l = Lexer::new(input);
        loop {
            let ctx = l.context();
            let (mut tt, mut data) = l.next();
            if tt == TokenType::Punctuator
                && data.first() == Some(&b'/')
                && (ctx == ExprContext::ExpectOperand || self.after_control_head())
            {
                (tt, data) = l.rescan_as_regex();
            }

            match tt {
                TokenType::Error => {
                    if let Some(err) = l.err() {
                        return Err(err.clone().into());
                    }
                    if self.semicolon && self.semicolon_is_statement() {
                        self.out.push(b';');
                    }
                    return Ok(());
                }
                TokenType::Whitespace => {}
                TokenType::LineTerminator => self.newline = true,
                TokenType::Comment | TokenType::CommentLineTerminator => {
                    if data.starts_with(b"#!") || (data.starts_with(b"/*!") && self.o.keep_license_comments) {
                        self.write_comment(data);
                    } else if tt == TokenType::CommentLineTerminator {
                        self.newline = true;
                    }
                }
                TokenType::Punctuator if data == b";" => {
                    if self.semicolon {
                        self.flush_semicolon();
                    }
                    self.semicolon = true;
                    self.newline = false;
                }
                _ => {
                    if self.semicolon {
                        self.semicolon = false;
                        if data != b"}" || self.semicolon_is_statement() {
                            self.out.push(b';');
                            self.mark(TokenType::Punctuator, self.out.len() - 1);
                            self.newline = false;
                        }
                    }
                    let text = self.token_text(tt, data);
                    self.write(tt, &text);
                }
            }
        }
    }

    /// A `;` right after these tokens may be the empty body of a statement.
    fn semicolon_is_statement(&self) -> bool {
        let prev = &self.out[self.prev_start..];
        match self.prev {
            Some(TokenType::Punctuator) => prev == b")" && self.closed_control,
            Some(TokenType::Keyword) => matches!(prev, b"else" | b"do"),
            _ => false,
        }
    }

    fn flush_semicolon(&mut self) {
        self.out.push(b';');
        self.mark(TokenType::Punctuator, self.out.len() - 1);
        self.semicolon = false;
    }

    fn after_control_head(&self) -> bool {
        self.prev == Some(TokenType::Punctuator) && &self.out[self.prev_start..] == b")" && self.closed_control
    }

    fn write_comment(&mut self, data: &[u8]) {
        if self.semicolon {
            self.flush_semicolon();
        }
        if self.newline && self.prev.is_some() {
            self.out.push(b'\n');
        }
        self.out.extend_from_slice(data);
        self.out.push(b'\n');
        self.prev = None;
        self.prev_start = self.out.len();
        self.newline = false;
    }

    fn token_text(&self, tt: TokenType, data: &[u8]) -> Vec<u8> {
        match tt {
            TokenType::String => minify_string(data),
            TokenType::Numeric => self.numeric(data),
            _ => data.to_vec(),
        }
    }

    fn numeric(&self, data: &[u8]) -> Vec<u8> {
        if data.contains(&b'_') || data.ends_with(b"n") {
            return data.to_vec();
        }
        let radix = match data {
            [b'0', b'x' | b'X', ..] => 16,
            [b'0', b'o' | b'O', ..] => 8,
            [b'0', b'b' | b'B', ..] => 2,
            // legacy octal
            [b'0', b'0'..=b'9', ..] => return data.to_vec(),
            _ => return number(data, self.o.precision),
        };
        let digits = std::str::from_utf8(&data[2..]).ok();
        match digits.and_then(|d| u128::from_str_radix(d, radix).ok()) {
            Some(value) => {
                let decimal = number(value.to_string().as_bytes(), 0);
                if decimal.len() < data.len() {
                    decimal
                } else {
                    data.to_vec()
                }
            }
            None => data.to_vec(),
        }
    }

    fn write(&mut self, tt: TokenType, text: &[u8]) {
        let space = self.prev.is_some()
            && needs_space(&self.out[self.prev_start..], text, self.prev == Some(TokenType::Numeric));
        if self.newline && self.needs_newline(tt, text) {
            self.out.push(b'\n');
        } else if space {
            self.out.push(b' ');
        }
        self.newline = false;

        if tt == TokenType::Punctuator {
            self.track_nesting(text);
        }
        let start = self.out.len();
        self.out.extend_from_slice(text);
        self.mark(tt, start);
    }

    fn mark(&mut self, tt: TokenType, start: usize) {
        self.prev = Some(tt);
        self.prev_start = start;
    }

    fn track_nesting(&mut self, text: &[u8]) {
        let prev = &self.out[self.prev_start..];
        match text {
            b"(" => {
                let control = self.prev == Some(TokenType::Keyword)
                    && matches!(prev, b"if" | b"for" | b"while" | b"with" | b"catch" | b"switch");
                self.parens.push(control);
            }
            b")" => self.closed_control = self.parens.pop().unwrap_or(false),
            b"{" => {
                let block = match self.prev {
                    None => true,
                    Some(TokenType::Punctuator) => {
                        matches!(prev, b";" | b"{") || (prev == b"}" && self.closed_block) || (prev == b")" && self.closed_control)
                    }
                    Some(TokenType::Keyword) => matches!(prev, b"else" | b"do" | b"try" | b"finally"),
                    _ => false,
                };
                self.braces.push(block);
            }
            b"}" => self.closed_block = self.braces.pop().unwrap_or(false),
            _ => {}
        }
    }

    /// Whether a skipped line terminator must be kept before the next token.
    fn needs_newline(&self, tt: TokenType, text: &[u8]) -> bool {
        let Some(prev_tt) = self.prev else {
            return false;
        };
        let prev = &self.out[self.prev_start..];
        if prev_tt == TokenType::Keyword && matches!(prev, b"return" | b"break" | b"continue" | b"throw" | b"yield") {
            return !matches!(text, b";" | b"}");
        }
        let ends = match prev_tt {
            TokenType::Identifier
            | TokenType::PrivateIdentifier
            | TokenType::Numeric
            | TokenType::String
            | TokenType::Regexp
            | TokenType::Template
            | TokenType::TemplateEnd => true,
            TokenType::Keyword => matches!(prev, b"this" | b"super" | b"null" | b"true" | b"false"),
            TokenType::Punctuator => match prev {
                b"]" | b"++" | b"--" => true,
                b")" => !self.closed_control,
                b"}" => !self.closed_block,
                _ => false,
            },
            _ => false,
        };
        let starts = match tt {
            TokenType::Identifier
            | TokenType::PrivateIdentifier
            | TokenType::Numeric
            | TokenType::String
            | TokenType::Regexp => true,
            TokenType::Keyword => !matches!(text, b"in" | b"instanceof"),
            TokenType::Punctuator => matches!(text, b"{" | b"++" | b"--" | b"!" | b"~"),
            _ => false,
        };
        ends && starts
    }
}

/// Whether writing `next` right after `prev` would change how they are tokenized.
fn needs_space(prev: &[u8], next: &[u8], prev_numeric: bool) -> bool {
    let (Some(&a), Some(&b)) = (prev.last(), next.first()) else {
        return false;
    };
    if is_identifier_char(a) && (is_identifier_char(b) || b == b'\\') {
        return true;
    }
    match (a, b) {
        (b'+', b'+') | (b'-', b'-') | (b'/', b'/' | b'*') | (b'<', b'!') | (b'-', b'>') => true,
        (_, b'.') => prev_numeric && prev.iter().all(u8::is_ascii_digit),
        _ => false,
    }
}

/// Drop needless escapes and line continuations and pick the quote that
/// needs the fewest escapes.
fn minify_string(s: &[u8]) -> Vec<u8> {
    if s.len() < 2 {
        return s.to_vec();
    }
    let quote = s[0];
    let inner = &s[1..s.len() - 1];

    // unescaped body, quotes appear raw and other escapes are kept as written
    let mut body = Vec::with_capacity(inner.len());
    let mut i = 0;
    while i < inner.len() {
        let c = inner[i];
        if c != b'\\' {
            body.push(c);
            i += 1;
            continue;
        }
        let Some(&e) = inner.get(i + 1) else {
            body.push(c);
            break;
        };
        match e {
            b'\n' => i += 2,
            b'\r' => i += if inner.get(i + 2) == Some(&b'\n') { 3 } else { 2 },
            0xE2 if inner.get(i + 2) == Some(&0x80) && matches!(inner.get(i + 3), Some(0xA8 | 0xA9)) => i += 4,
            b'"' | b'\'' => {
                body.push(e);
                i += 2;
            }
            b'b' | b'f' | b'n' | b'r' | b't' | b'v' | b'x' | b'u' | b'0'..=b'9' | b'\\' | b'/' => {
                body.extend_from_slice(&[c, e]);
                i += 2;
            }
            _ => i += 1,
        }
    }

    let (mut double, mut single) = (0usize, 0usize);
    let mut i = 0;
    while i < body.len() {
        match body[i] {
            b'\\' => i += 1,
            b'"' => double += 1,
            b'\'' => single += 1,
            _ => {}
        }
        i += 1;
    }
    let q = match double.cmp(&single) {
        std::cmp::Ordering::Less => b'"',
        std::cmp::Ordering::Greater => b'\'',
        std::cmp::Ordering::Equal => quote,
    };

    let mut out = Vec::with_capacity(body.len() + 2);
    out.push(q);
    let mut i = 0;
    while i < body.len() {
        let c = body[i];
        if c == b'\\' {
            out.extend_from_slice(&body[i..(i + 2).min(body.len())]);
            i += 2;
            continue;
        }
        if c == q {
            out.push(b'\\');
        }
        out.push(c);
        i += 1;
    }
    out.push(q);
    out
}
