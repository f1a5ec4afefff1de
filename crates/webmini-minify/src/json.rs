//! JSON minifier.

use serde::{Deserialize, Serialize};
use webmini_lexer::json::{Parser, State, TokenType};

use crate::common::number;
use crate::{Minifier, Minify, MinifyError, Params};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Significant digits kept in numbers, 0 keeps them all.
    pub precision: usize,
}

impl Minify for Options {
    fn minify(
        &self,
        _m: &Minifier,
        out: &mut Vec<u8>,
        input: &[u8],
        _params: &Params,
    ) -> Result<(), MinifyError> {
        let mut p = Parser::new(input);
        let mut first = true;
        loop {
            let state = p.state();
            let (kind, data) = p.next();
            match (state, kind) {
                (_, TokenType::Error) => {
                    return match p.err() {
                        Some(err) => Err(err.clone().into()),
                        None => Ok(()),
                    };
                }
                (State::ObjectKey, TokenType::EndObject) | (State::Array, TokenType::EndArray) => {}
                (State::ObjectKey | State::Array, _) if !first => out.push(b','),
                (State::ObjectValue, _) => out.push(b':'),
                _ => {}
            }
            first = matches!(kind, TokenType::StartObject | TokenType::StartArray);

            if kind == TokenType::Number {
                out.extend(json_number(data, self.precision));
            } else {
                out.extend_from_slice(data);
            }
        }
    }
}

/// Shortest number that is still valid JSON, which needs a digit before the point.
fn json_number(data: &[u8], precision: usize) -> Vec<u8> {
    let mut num = number(data, precision);
    let point = usize::from(num.first() == Some(&b'-'));
    if num.get(point) == Some(&b'.') {
        num.insert(point, b'0');
    }
    num
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn json(src: &str, precision: usize) -> Result<std::string::String, MinifyError> {
        let m = Minifier::new();
        let mut out = Vec::new();
        Options { precision }.minify(&m, &mut out, src.as_bytes(), &Params::default())?;
        Ok(std::string::String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_separators() {
        assert_eq!(json(r#"{ "a": [1, 2] }"#, 0).unwrap(), r#"{"a":[1,2]}"#);
        assert_eq!(
            json("{\n  \"a\" : { },\n  \"b\" : [ [ ], { \"c\" : null } ],\n  \"d\" : \"x y\"\n}", 0).unwrap(),
            r#"{"a":{},"b":[[],{"c":null}],"d":"x y"}"#
        );
        assert_eq!(json(" [ true , false ] ", 0).unwrap(), "[true,false]");
        assert_eq!(json("\"\\u0041 \"", 0).unwrap(), "\"\\u0041 \"");
        assert_eq!(json("", 0).unwrap(), "");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(json("[1.50, -0.5, 1000000, 1e3]", 0).unwrap(), "[1.5,-0.5,1e6,1e3]");
        assert_eq!(json("[3.14159]", 3).unwrap(), "[3.14]");
    }

    #[test]
    fn test_errors() {
        let err = json("[1,]", 0).unwrap_err();
        assert_eq!(err.to_string(), "unexpected character ']' on line 1 and column 4\n    1: [1,]\n          ^");
        assert!(json("{\"a\" 1}", 0).is_err());
        assert!(json("[1", 0).is_err());
    }
}
