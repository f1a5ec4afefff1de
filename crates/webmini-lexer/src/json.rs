//! JSON parser.
//!
//! The parser validates the grammar while it tokenizes and exposes the
//! grammatical position of the next token through `state()`, so a writer
//! can emit `,` and `:` separators without keeping its own stack.

use crate::input::Input;
use crate::{is_whitespace, LexerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Error,
    /// `true`, `false` or `null`.
    Literal,
    Number,
    String,
    StartObject,
    EndObject,
    StartArray,
    EndArray,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Top level.
    Value,
    ObjectKey,
    ObjectValue,
    Array,
}

pub struct Parser<'a> {
    z: Input<'a>,
    err: Option<LexerError>,
    state: Vec<State>,
    /// No element has been read yet in the innermost container.
    first: bool,
    done: bool,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            z: Input::new(src),
            err: None,
            state: vec![State::Value],
            first: true,
            done: false,
        }
    }

    pub fn err(&self) -> Option<&LexerError> {
        self.err.as_ref()
    }

    /// Grammatical position of the token that `next()` returns next.
    pub fn state(&self) -> State {
        self.state.last().copied().unwrap_or(State::Value)
    }

    pub fn next(&mut self) -> (TokenType, &'a [u8]) {
        if self.err.is_some() {
            return (TokenType::Error, b"");
        }
        self.skip_whitespace();

        match self.state() {
            State::Value => {
                if self.z.is_eof() {
                    // empty input is accepted as an empty document
                    return (TokenType::Error, b"");
                }
                if self.done {
                    return self.fail("unexpected character after top-level value");
                }
                self.consume_value()
            }
            State::ObjectKey => {
                if self.z.peek(0) == b'}' {
                    return self.close(TokenType::EndObject);
                }
                if !self.first && !self.consume_comma() {
                    return self.fail_here();
                }
                if self.z.peek(0) != b'"' {
                    return self.fail_here();
                }
                let key = self.consume_string();
                if key.0 == TokenType::Error {
                    return key;
                }
                self.skip_whitespace();
                if self.z.peek(0) != b':' || self.z.is_eof() {
                    return self.fail("expected ':' after object key");
                }
                self.z.move_by(1);
                self.z.skip();
                if let Some(top) = self.state.last_mut() {
                    *top = State::ObjectValue;
                }
                key
            }
            State::ObjectValue => self.consume_value(),
            State::Array => {
                if self.z.peek(0) == b']' {
                    return self.close(TokenType::EndArray);
                }
                if !self.first && !self.consume_comma() {
                    return self.fail_here();
                }
                self.consume_value()
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while is_whitespace(self.z.peek(0)) {
            self.z.move_by(1);
        }
        self.z.skip();
    }

    fn consume_comma(&mut self) -> bool {
        if self.z.peek(0) != b',' {
            return false;
        }
        self.z.move_by(1);
        self.skip_whitespace();
        true
    }

    fn fail(&mut self, message: &str) -> (TokenType, &'a [u8]) {
        self.err = Some(self.z.error(message));
        (TokenType::Error, b"")
    }

    fn fail_here(&mut self) -> (TokenType, &'a [u8]) {
        if self.z.is_eof() {
            return self.fail("unexpected end of input");
        }
        let message = match self.z.peek(0) {
            c @ 0x21..=0x7E => format!("unexpected character '{}'", c as char),
            c => format!("unexpected byte 0x{:02X}", c),
        };
        self.fail(&message)
    }

    /// Called when a complete value has been read in the current position.
    fn value_done(&mut self) {
        match self.state() {
            State::Value => self.done = true,
            State::ObjectValue => {
                if let Some(top) = self.state.last_mut() {
                    *top = State::ObjectKey;
                }
            }
            State::ObjectKey | State::Array => {}
        }
        self.first = false;
    }

    fn close(&mut self, tt: TokenType) -> (TokenType, &'a [u8]) {
        self.z.move_by(1);
        self.state.pop();
        self.value_done();
        (tt, self.z.shift())
    }

    fn consume_value(&mut self) -> (TokenType, &'a [u8]) {
        match self.z.peek(0) {
            b'{' | b'[' if !self.z.is_eof() => {
                let (tt, state) = if self.z.peek(0) == b'{' {
                    (TokenType::StartObject, State::ObjectKey)
                } else {
                    (TokenType::StartArray, State::Array)
                };
                self.z.move_by(1);
                self.state.push(state);
                self.first = true;
                (tt, self.z.shift())
            }
            b'"' => {
                let s = self.consume_string();
                if s.0 != TokenType::Error {
                    self.value_done();
                }
                s
            }
            b'-' | b'0'..=b'9' => {
                if !self.consume_number() {
                    return self.fail("invalid number");
                }
                self.value_done();
                (TokenType::Number, self.z.shift())
            }
            b't' | b'f' | b'n' => {
                let rest = self.z.rest();
                let literal = [&b"true"[..], b"false", b"null"]
                    .into_iter()
                    .find(|lit| rest.starts_with(lit));
                match literal {
                    Some(lit) => {
                        self.z.move_by(lit.len());
                        self.value_done();
                        (TokenType::Literal, self.z.shift())
                    }
                    None => self.fail_here(),
                }
            }
            _ => self.fail_here(),
        }
    }

    fn consume_string(&mut self) -> (TokenType, &'a [u8]) {
        let start = self.z.pos();
        self.z.move_by(1);
        loop {
            if self.z.is_eof() {
                self.err = Some(self.z.error_at(start, "unterminated string"));
                return (TokenType::Error, b"");
            }
            match self.z.peek(0) {
                b'"' => {
                    self.z.move_by(1);
                    return (TokenType::String, self.z.shift());
                }
                b'\\' => self.z.move_by(2),
                _ => self.z.move_by(1),
            }
        }
    }

    /// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
    fn consume_number(&mut self) -> bool {
        if self.z.peek(0) == b'-' {
            self.z.move_by(1);
        }
        match self.z.peek(0) {
            b'0' => self.z.move_by(1),
            b'1'..=b'9' => self.skip_digits(),
            _ => return false,
        }
        if self.z.peek(0) == b'.' {
            self.z.move_by(1);
            if !self.z.peek(0).is_ascii_digit() {
                return false;
            }
            self.skip_digits();
        }
        if matches!(self.z.peek(0), b'e' | b'E') {
            self.z.move_by(1);
            if matches!(self.z.peek(0), b'+' | b'-') {
                self.z.move_by(1);
            }
            if !self.z.peek(0).is_ascii_digit() {
                return false;
            }
            self.skip_digits();
        }
        // `01` or `1a` are not numbers
        !self.z.peek(0).is_ascii_alphanumeric()
    }

    fn skip_digits(&mut self) {
        while self.z.peek(0).is_ascii_digit() {
            self.z.move_by(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(src: &str) -> Vec<(State, TokenType, std::string::String)> {
        let mut p = Parser::new(src.as_bytes());
        let mut out = Vec::new();
        loop {
            let state = p.state();
            let (tt, data) = p.next();
            if tt == TokenType::Error {
                return out;
            }
            out.push((state, tt, std::string::String::from_utf8_lossy(data).into_owned()));
        }
    }

    fn error(src: &str) -> Option<std::string::String> {
        let mut p = Parser::new(src.as_bytes());
        while p.next().0 != TokenType::Error {}
        p.err().map(|e| e.message.clone())
    }

    use State::*;
    use TokenType::*;

    #[test]
    fn test_states() {
        assert_eq!(
            tokens(r#" { "a" : [1, true], "b": {} } "#),
            vec![
                (Value, StartObject, "{".into()),
                (ObjectKey, String, r#""a""#.into()),
                (ObjectValue, StartArray, "[".into()),
                (Array, Number, "1".into()),
                (Array, Literal, "true".into()),
                (Array, EndArray, "]".into()),
                (ObjectKey, String, r#""b""#.into()),
                (ObjectValue, StartObject, "{".into()),
                (ObjectKey, EndObject, "}".into()),
                (ObjectKey, EndObject, "}".into()),
            ]
        );
    }

    #[test]
    fn test_scalars() {
        assert_eq!(tokens("-1.5e+3"), vec![(Value, Number, "-1.5e+3".into())]);
        assert_eq!(tokens(r#""x\"y""#), vec![(Value, String, r#""x\"y""#.into())]);
        assert_eq!(tokens(""), vec![]);
        assert_eq!(error(""), None);
        assert_eq!(error("[null]"), None);
    }

    #[test]
    fn test_errors() {
        assert_eq!(error("[1}").as_deref(), Some("unexpected character '}'"));
        assert_eq!(error("[1").as_deref(), Some("unexpected end of input"));
        assert_eq!(error(r#"{"a" 1}"#).as_deref(), Some("expected ':' after object key"));
        assert_eq!(error(r#""abc"#).as_deref(), Some("unterminated string"));
        assert_eq!(error("01").as_deref(), Some("invalid number"));
        assert_eq!(error("1.").as_deref(), Some("invalid number"));
        assert_eq!(error("[1,]").as_deref(), Some("unexpected character ']'"));
        assert_eq!(error("1 2").as_deref(), Some("unexpected character after top-level value"));
        assert_eq!(error("tru").as_deref(), Some("unexpected character 't'"));
    }

    #[test]
    fn test_error_position() {
        let mut p = Parser::new(b"[1,\n  x]");
        while p.next().0 != Error {}
        let err = p.err().cloned().unwrap();
        assert_eq!((err.line, err.column), (2, 3));
    }
}
