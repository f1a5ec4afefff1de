//! Value helpers shared by the minifiers.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use percent_encoding::{percent_decode, percent_encode, AsciiSet, NON_ALPHANUMERIC};
use webmini_lexer::{eq_lower, is_whitespace};

use crate::{Minifier, Params};

/// Bytes escaped in a percent-encoded data URI payload.
const DATA_URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn is_unreserved(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'-' | b'_' | b'.' | b'~')
}

/// A decimal number as `0.digits × 10^point`, with no leading or trailing
/// zeros in `digits`. Zero has no digits.
struct Decimal {
    negative: bool,
    digits: Vec<u8>,
    point: i64,
}

impl Decimal {
    fn parse(num: &[u8]) -> Option<Self> {
        let mut i = 0;
        let mut negative = false;
        if let Some(&c @ (b'+' | b'-')) = num.first() {
            negative = c == b'-';
            i = 1;
        }

        let mut digits = Vec::with_capacity(num.len());
        let mut int_len: i64 = 0;
        while i < num.len() && num[i].is_ascii_digit() {
            digits.push(num[i]);
            int_len += 1;
            i += 1;
        }
        if i < num.len() && num[i] == b'.' {
            i += 1;
            while i < num.len() && num[i].is_ascii_digit() {
                digits.push(num[i]);
                i += 1;
            }
        }
        if digits.is_empty() {
            return None;
        }

        let mut exp: i64 = 0;
        if i < num.len() && (num[i] | 0x20) == b'e' {
            i += 1;
            let mut exp_negative = false;
            if let Some(&c @ (b'+' | b'-')) = num.get(i) {
                exp_negative = c == b'-';
                i += 1;
            }
            let start = i;
            while i < num.len() && num[i].is_ascii_digit() {
                exp = (exp * 10 + i64::from(num[i] - b'0')).min(1 << 40);
                i += 1;
            }
            if i == start {
                return None;
            }
            if exp_negative {
                exp = -exp;
            }
        }
        if i != num.len() {
            return None;
        }

        let leading = digits.iter().take_while(|&&c| c == b'0').count();
        digits.drain(..leading);
        while digits.last() == Some(&b'0') {
            digits.pop();
        }
        Some(Self {
            negative,
            digits,
            point: int_len + exp - leading as i64,
        })
    }

    /// Round half up to `prec` significant digits.
    fn round(&mut self, prec: usize) {
        if prec == 0 || self.digits.len() <= prec {
            return;
        }
        let round_up = self.digits[prec] >= b'5';
        self.digits.truncate(prec);
        if round_up {
            let mut i = prec;
            loop {
                if i == 0 {
                    self.digits.insert(0, b'1');
                    self.point += 1;
                    break;
                }
                i -= 1;
                if self.digits[i] == b'9' {
                    self.digits[i] = b'0';
                } else {
                    self.digits[i] += 1;
                    break;
                }
            }
        }
        while self.digits.last() == Some(&b'0') {
            self.digits.pop();
        }
    }

    fn write(&self) -> Vec<u8> {
        if self.digits.is_empty() {
            return b"0".to_vec();
        }
        let n = self.digits.len() as i64;
        let p = self.point;
        let fixed_len = if p <= 0 {
            1 - p + n
        } else if p < n {
            n + 1
        } else {
            p
        };
        let exp = p - n;
        let exp_text = exp.to_string();
        let exp_len = n + 1 + exp_text.len() as i64;

        let mut out = Vec::new();
        if self.negative {
            out.push(b'-');
        }
        if exp == 0 || fixed_len <= exp_len {
            if p <= 0 {
                out.push(b'.');
                out.resize(out.len() + (-p) as usize, b'0');
                out.extend_from_slice(&self.digits);
            } else if p < n {
                out.extend_from_slice(&self.digits[..p as usize]);
                out.push(b'.');
                out.extend_from_slice(&self.digits[p as usize..]);
            } else {
                out.extend_from_slice(&self.digits);
                out.resize(out.len() + (p - n) as usize, b'0');
            }
        } else {
            out.extend_from_slice(&self.digits);
            out.push(b'e');
            out.extend_from_slice(exp_text.as_bytes());
        }
        out
    }
}

/// Shortest text for a decimal number.
///
/// A `+` sign and redundant zeros are removed, zero is written as `0`, and
/// fixed or exponent notation is chosen by length, preferring fixed notation
/// on a tie. With `prec > 0` the number is rounded to `prec` significant
/// digits first. Anything that is not a decimal number is returned unchanged.
pub fn number(num: &[u8], prec: usize) -> Vec<u8> {
    match Decimal::parse(num) {
        Some(mut d) => {
            d.round(prec);
            d.write()
        }
        None => num.to_vec(),
    }
}

/// Quote an attribute value for output.
///
/// The value is left unquoted when that is valid, otherwise it is wrapped in
/// the quote that occurs less often in it, with that quote escaped as
/// `&#34;` or `&#39;`. On a tie the quote of `orig` (the value as it appeared
/// in the source, quotes included) is kept. `keep_quotes` always uses `"`.
pub fn escape_attr_val(val: &[u8], orig: &[u8], keep_quotes: bool) -> Vec<u8> {
    let needs_quotes = keep_quotes
        || val.is_empty()
        || val
            .iter()
            .any(|&c| is_whitespace(c) || matches!(c, b'"' | b'\'' | b'`' | b'=' | b'<' | b'>'));
    if !needs_quotes {
        return val.to_vec();
    }

    let doubles = val.iter().filter(|&&c| c == b'"').count();
    let singles = val.iter().filter(|&&c| c == b'\'').count();
    let quote = if keep_quotes || doubles < singles {
        b'"'
    } else if singles < doubles || orig.first() == Some(&b'\'') {
        b'\''
    } else {
        b'"'
    };
    let escaped: &[u8] = if quote == b'"' { b"&#34;" } else { b"&#39;" };

    let mut out = Vec::with_capacity(val.len() + 2);
    out.push(quote);
    for &c in val {
        if c == quote {
            out.extend_from_slice(escaped);
        } else {
            out.push(c);
        }
    }
    out.push(quote);
    out
}

/// Escape literal text for an HTML text node.
///
/// Only an `&` that would be read as the start of a character reference is
/// escaped.
pub fn escape_text(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for (i, &c) in text.iter().enumerate() {
        if c == b'&' && starts_reference(&text[i + 1..]) {
            out.extend_from_slice(b"&amp;");
        } else {
            out.push(c);
        }
    }
    out
}

/// Whether the bytes after an `&` could make it a character reference.
pub(crate) fn starts_reference(rest: &[u8]) -> bool {
    matches!(rest.first(), Some(c) if c.is_ascii_alphanumeric() || *c == b'#')
}

/// Collapse every run of whitespace into a single space.
pub fn collapse_whitespace(b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(b.len());
    let mut in_space = false;
    for &c in b {
        if is_whitespace(c) {
            if !in_space {
                out.push(b' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Normalize a content type: lowercase everything outside quoted strings and
/// drop whitespace, e.g. `text/html; charset=UTF-8` → `text/html;charset=utf-8`.
pub fn media_type(b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(b.len());
    let mut quote = 0;
    for &c in b {
        if quote != 0 {
            out.push(c);
            if c == quote {
                quote = 0;
            }
        } else if c == b'"' || c == b'\'' {
            quote = c;
            out.push(c);
        } else if !is_whitespace(c) {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

/// Split a `data:[mediatype][;base64],payload` URI into its media type and
/// decoded payload. An empty media type is `text/plain`.
pub fn parse_data_uri(uri: &[u8]) -> Option<(Vec<u8>, Vec<u8>)> {
    if uri.len() < 5 || !eq_lower(&uri[..5], b"data:") {
        return None;
    }
    let rest = &uri[5..];
    let comma = rest.iter().position(|&c| c == b',')?;
    let (mut header, payload) = (&rest[..comma], &rest[comma + 1..]);

    let base64 = header.len() >= 7 && eq_lower(&header[header.len() - 7..], b";base64");
    if base64 {
        header = &header[..header.len() - 7];
    }
    let data = if base64 {
        STANDARD.decode(payload).ok()?
    } else {
        percent_decode(payload).collect()
    };

    let mut mt = media_type(header);
    if mt.is_empty() || mt[0] == b';' {
        mt = [&b"text/plain"[..], &mt].concat();
    }
    Some((mt, data))
}

/// Minify a data URI.
///
/// The payload is minified by its media type and written with base64 or
/// percent-encoding, whichever is shorter. Anything that is not a valid data
/// URI is returned unchanged.
pub fn data_uri(m: &Minifier, uri: &[u8], params: &Params) -> Vec<u8> {
    let Some((mt, data)) = parse_data_uri(uri) else {
        return uri.to_vec();
    };
    let mut payload = Vec::with_capacity(data.len());
    m.minify_embedded(&String::from_utf8_lossy(&mt), &params.nested(), &mut payload, &data);

    let base64_len = ";base64".len() + payload.len().div_ceil(3) * 4;
    let mut percent_len = 0;
    for &c in &payload {
        percent_len += if is_unreserved(c) { 1 } else { 3 };
        if percent_len > base64_len {
            break;
        }
    }

    let mt = mt.strip_prefix(b"text/plain").unwrap_or(&mt);
    let mut out = b"data:".to_vec();
    out.extend_from_slice(mt);
    if percent_len > base64_len {
        out.extend_from_slice(b";base64,");
        out.extend_from_slice(STANDARD.encode(&payload).as_bytes());
    } else {
        out.push(b',');
        for part in percent_encode(&payload, DATA_URI) {
            out.extend_from_slice(part.as_bytes());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use pretty_assertions::assert_eq;

    fn num(s: &str) -> std::string::String {
        std::string::String::from_utf8(number(s.as_bytes(), 0)).unwrap()
    }

    #[test]
    fn test_number() {
        for (input, want) in [
            ("1.0", "1"),
            ("0.1", ".1"),
            ("+1", "1"),
            ("-0.1", "-.1"),
            ("100", "100"),
            ("1000", "1e3"),
            ("0", "0"),
            ("-0.000", "0"),
            ("+.5", ".5"),
            ("5.", "5"),
            ("0.0001", "1e-4"),
            ("0.001", ".001"),
            ("1.5e3", "1500"),
            ("15e-1", "1.5"),
            ("1E+2", "100"),
            ("123456789", "123456789"),
            ("1230000", "123e4"),
            ("00012.3400", "12.34"),
        ] {
            assert_eq!(num(input), want, "{input}");
        }
    }

    #[test]
    fn test_number_invalid_unchanged() {
        for input in ["", "-", ".", "1e", "1e+", "1.2.3", "abc", "1px", "--1"] {
            assert_eq!(num(input), input);
        }
    }

    #[test]
    fn test_number_precision() {
        assert_eq!(number(b"3.14159", 3), b"3.14");
        assert_eq!(number(b"0.99999", 2), b"1");
        assert_eq!(number(b"9.96", 2), b"10");
        assert_eq!(number(b"123456", 2), b"12e4");
        assert_eq!(number(b"1.5", 5), b"1.5");
    }

    #[test]
    fn test_escape_attr_val() {
        assert_eq!(escape_attr_val(b"abc", b"\"abc\"", false), b"abc");
        assert_eq!(escape_attr_val(b"a b", b"'a b'", false), b"'a b'");
        assert_eq!(escape_attr_val(b"a b", b"a b", false), b"\"a b\"");
        assert_eq!(escape_attr_val(b"a\"b", b"", false), b"'a\"b'");
        assert_eq!(escape_attr_val(b"a\"'\"", b"", false), b"'a\"&#39;\"'");
        assert_eq!(escape_attr_val(b"abc", b"", true), b"\"abc\"");
        assert_eq!(escape_attr_val(b"a\"b", b"", true), b"\"a&#34;b\"");
        assert_eq!(escape_attr_val(b"", b"", false), b"\"\"");
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text(b"a & b"), b"a & b");
        assert_eq!(escape_text(b"a&b"), b"a&amp;b");
        assert_eq!(escape_text(b"&#39;"), b"&amp;#39;");
        assert_eq!(escape_text(b"x&"), b"x&");
    }

    #[test]
    fn test_media_type() {
        assert_eq!(media_type(b"text/html; charset=UTF-8"), b"text/html;charset=utf-8");
        assert_eq!(media_type(b"a/b; x=\"Q R\""), b"a/b;x=\"Q R\"");
    }

    #[test]
    fn test_parse_data_uri() {
        assert_eq!(
            parse_data_uri(b"data:,a%20b"),
            Some((b"text/plain".to_vec(), b"a b".to_vec()))
        );
        assert_eq!(
            parse_data_uri(b"DATA:Text/CSS;base64,YSB7fQ=="),
            Some((b"text/css".to_vec(), b"a {}".to_vec()))
        );
        assert_eq!(
            parse_data_uri(b"data:;charset=utf-8,x"),
            Some((b"text/plain;charset=utf-8".to_vec(), b"x".to_vec()))
        );
        assert_eq!(parse_data_uri(b"data:text/css"), None);
        assert_eq!(parse_data_uri(b"data:;base64,!!!"), None);
        assert_eq!(parse_data_uri(b"http://x"), None);
    }

    #[test]
    fn test_data_uri_encoding_choice() {
        let m = Minifier::from_config(&Config::default());
        let p = Params::default();
        assert_eq!(data_uri(&m, b"data:,======", &p), b"data:;base64,PT09PT09");
        assert_eq!(data_uri(&m, b"data:;base64,aGVsbG8=", &p), b"data:,hello");
        assert_eq!(
            data_uri(&m, b"data:text/css,a%20%7B%20color%3A%20red%20%7D", &p),
            b"data:text/css,a%7Bcolor%3Ared%7D"
        );
        assert_eq!(data_uri(&m, b"http://x", &p), b"http://x");
    }
}
