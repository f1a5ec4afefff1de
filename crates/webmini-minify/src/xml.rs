//! XML minifier.

use serde::{Deserialize, Serialize};
use webmini_lexer::xml::{Lexer, Token, TokenType};
use webmini_lexer::{is_all_whitespace, is_whitespace, trim_whitespace, TokenBuffer};

use crate::common::collapse_whitespace;
use crate::{Minifier, Minify, MinifyError, Params};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Write text nodes unchanged.
    pub keep_whitespace: bool,
}

impl Minify for Options {
    fn minify(
        &self,
        _m: &Minifier,
        out: &mut Vec<u8>,
        input: &[u8],
        _params: &Params,
    ) -> Result<(), MinifyError> {
        let mut z = TokenBuffer::new(Lexer::new(input));
        let mut omit_space = true;
        loop {
            let t = z.shift();
            match t.kind {
                TokenType::Error => {
                    return match z.source().err() {
                        Some(err) => Err(err.clone().into()),
                        None => Ok(()),
                    };
                }
                TokenType::Comment => {}
                TokenType::Doctype => {
                    out.extend_from_slice(b"<!DOCTYPE ");
                    out.extend_from_slice(trim_whitespace(t.text));
                    out.push(b'>');
                }
                TokenType::CData => match cdata_as_text(t.text) {
                    Some(text) if !self.keep_whitespace => {
                        let text = trimmed_text(&mut z, &text, &mut omit_space);
                        out.extend(text);
                    }
                    _ => out.extend_from_slice(t.data),
                },
                TokenType::Text => {
                    if self.keep_whitespace {
                        out.extend_from_slice(t.data);
                    } else {
                        out.extend(trimmed_text(&mut z, t.data, &mut omit_space));
                    }
                }
                TokenType::StartTag => {
                    out.push(b'<');
                    out.extend_from_slice(t.text);
                }
                TokenType::StartTagPI => {
                    out.extend_from_slice(b"<?");
                    out.extend_from_slice(t.text);
                }
                TokenType::Attribute => write_attribute(out, t.text, t.attr_val),
                TokenType::StartTagClose => {
                    omit_space = true;
                    if collapse_empty(&mut z, !self.keep_whitespace) {
                        out.extend_from_slice(b"/>");
                    } else {
                        out.push(b'>');
                    }
                }
                TokenType::StartTagCloseVoid => {
                    omit_space = true;
                    out.extend_from_slice(b"/>");
                }
                TokenType::StartTagClosePI => out.extend_from_slice(b"?>"),
                TokenType::EndTag => {
                    omit_space = true;
                    out.extend_from_slice(b"</");
                    out.extend_from_slice(t.text);
                    out.push(b'>');
                }
            }
        }
    }
}

/// Collapse whitespace in a text node and drop the spaces that border tags.
///
/// `omit_space` is true when the previous output ends in a space or a tag.
fn trimmed_text(z: &mut TokenBuffer<Lexer>, data: &[u8], omit_space: &mut bool) -> Vec<u8> {
    let mut text = collapse_whitespace(data);
    if *omit_space && text.first() == Some(&b' ') {
        text.remove(0);
    }
    *omit_space = text.is_empty();
    if text.last() == Some(&b' ') {
        *omit_space = true;
        if space_follows_or_tag(z) {
            text.pop();
            *omit_space = false;
        }
    }
    text
}

/// Whether the tokens after a text node make its trailing space redundant.
fn space_follows_or_tag(z: &mut TokenBuffer<Lexer>) -> bool {
    let mut i = 0;
    loop {
        let next = *z.peek(i);
        match next.kind {
            TokenType::Comment => i += 1,
            TokenType::Text => return next.data.first().copied().is_some_and(is_whitespace),
            TokenType::CData => return next.text.first().copied().is_some_and(is_whitespace),
            _ => return true,
        }
    }
}

/// After `>`: if only whitespace separates it from an end tag, consume both
/// so the element can be written as `<x/>`.
pub(crate) fn collapse_empty(z: &mut TokenBuffer<Lexer>, skip_whitespace: bool) -> bool {
    let mut next: Token = *z.peek(0);
    let blank = skip_whitespace && next.kind == TokenType::Text && is_all_whitespace(next.data);
    if blank {
        next = *z.peek(1);
    }
    if next.kind != TokenType::EndTag {
        return false;
    }
    z.shift();
    if blank {
        z.shift();
    }
    true
}

fn write_attribute(out: &mut Vec<u8>, name: &[u8], raw: &[u8]) {
    out.push(b' ');
    out.extend_from_slice(name);
    if raw.is_empty() {
        return;
    }
    out.push(b'=');
    let val: Vec<u8> = unquote(raw)
        .iter()
        .map(|&c| if is_whitespace(c) { b' ' } else { c })
        .collect();
    out.extend(quote_attr_val(&decode_quotes(&val)));
}

/// Strip matching quotes from a raw attribute value.
pub(crate) fn unquote(raw: &[u8]) -> &[u8] {
    match raw {
        [q @ (b'"' | b'\''), inner @ .., last] if last == q => inner,
        _ => raw,
    }
}

/// Decode the quote character references so the value can be requoted.
pub(crate) fn decode_quotes(val: &[u8]) -> Vec<u8> {
    const REFS: [(&[u8], u8); 4] = [(b"&quot;", b'"'), (b"&#34;", b'"'), (b"&apos;", b'\''), (b"&#39;", b'\'')];
    let mut out = Vec::with_capacity(val.len());
    let mut i = 0;
    'outer: while i < val.len() {
        if val[i] == b'&' {
            for (r, c) in REFS {
                if val[i..].starts_with(r) {
                    out.push(c);
                    i += r.len();
                    continue 'outer;
                }
            }
        }
        out.push(val[i]);
        i += 1;
    }
    out
}

/// Quote a value with whichever quote occurs less in it, escaping that
/// quote. Double quotes win a tie.
pub(crate) fn quote_attr_val(val: &[u8]) -> Vec<u8> {
    let doubles = val.iter().filter(|&&c| c == b'"').count();
    let singles = val.iter().filter(|&&c| c == b'\'').count();
    let (quote, escaped): (u8, &[u8]) = if singles < doubles { (b'\'', b"&#39;") } else { (b'"', b"&#34;") };

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

/// Rewrite the content of a CDATA section as escaped text, if that is not
/// longer than keeping the section.
/// Decode the predefined entities and character references of XML text.
pub(crate) fn decode_entities(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        if text[i] == b'&' {
            let end = text[i + 1..].iter().take(10).position(|&c| c == b';');
            if let Some((n, decoded)) = end.and_then(|n| Some((n, entity(&text[i + 1..i + 1 + n])?))) {
                let mut buf = [0; 4];
                out.extend_from_slice(decoded.encode_utf8(&mut buf).as_bytes());
                i += n + 2;
                continue;
            }
        }
        out.push(text[i]);
        i += 1;
    }
    out
}

fn entity(name: &[u8]) -> Option<char> {
    match name {
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"amp" => Some('&'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        [b'#', b'x' | b'X', hex @ ..] => {
            u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok().and_then(char::from_u32)
        }
        [b'#', dec @ ..] => std::str::from_utf8(dec).ok()?.parse().ok().and_then(char::from_u32),
        _ => None,
    }
}

pub(crate) fn cdata_as_text(text: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len());
    for (i, &c) in text.iter().enumerate() {
        match c {
            b'<' => out.extend_from_slice(b"&lt;"),
            b'&' => out.extend_from_slice(b"&amp;"),
            b'>' if i >= 2 && &text[i - 2..i] == b"]]" => out.extend_from_slice(b"&gt;"),
            _ => out.push(c),
        }
    }
    (out.len() <= text.len() + "<![CDATA[]]>".len()).then_some(out)
}
