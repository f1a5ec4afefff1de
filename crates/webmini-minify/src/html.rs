//! HTML minifier.
//!
//! Tokens are pulled through a [`TokenBuffer`] so that whitespace and
//! optional end tag decisions can look ahead past comments and empty text
//! to the next structural token. Embedded scripts, styles, SVG and MathML
//! are handed back to the [`Minifier`] by media type.

use serde::{Deserialize, Serialize};
use webmini_lexer::html::{Hash, Lexer, Token, TokenType};
use webmini_lexer::{eq_lower, is_all_whitespace, is_whitespace, trim_whitespace, TokenBuffer};

use crate::common::{collapse_whitespace, data_uri, escape_attr_val, media_type, number, starts_reference};
use crate::{Minifier, Minify, MinifyError, Params};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub keep_comments: bool,
    /// Keep `<!--[if IE]>` style comments.
    pub keep_conditional_comments: bool,
    pub keep_default_attr_vals: bool,
    /// Keep `html`, `head` and `body` tags.
    pub keep_document_tags: bool,
    /// Keep optional end tags such as `</li>` and `</p>`.
    pub keep_end_tags: bool,
    /// Always quote attribute values.
    pub keep_quotes: bool,
    /// Collapse whitespace but never remove it around tags.
    pub keep_whitespace: bool,
    /// Opening and closing delimiters of template actions, such as
    /// [`GO_TEMPLATE_DELIMS`]. Actions are written as is.
    pub template_delims: Option<[String; 2]>,
}

pub const GO_TEMPLATE_DELIMS: [&str; 2] = ["{{", "}}"];
pub const PHP_TEMPLATE_DELIMS: [&str; 2] = ["<?", "?>"];
pub const ASP_TEMPLATE_DELIMS: [&str; 2] = ["<%", "%>"];

impl Options {
    /// The same options with `delims` as template delimiters.
    pub fn with_template_delims(&self, delims: [&str; 2]) -> Self {
        Self {
            template_delims: Some(delims.map(str::to_string)),
            ..self.clone()
        }
    }
}

impl Minify for Options {
    fn minify(
        &self,
        m: &Minifier,
        out: &mut Vec<u8>,
        input: &[u8],
        params: &Params,
    ) -> Result<(), MinifyError> {
        let mut w = HtmlWriter {
            o: self,
            m,
            params,
            out,
            omit_space: true,
            preformatted: 0,
            raw: None,
            raw_type: None,
            opened: None,
        };
        let lexer = match &self.template_delims {
            Some([open, close]) => Lexer::with_template_delims(input, open.as_bytes(), close.as_bytes()),
            None => Lexer::new(input),
        };
        w.run(&mut TokenBuffer::new(lexer));
        Ok(())
    }
}

/// An attribute collected from a start tag.
struct Attr<'a> {
    name: Vec<u8>,
    hash: Option<Hash>,
    /// Value as written, quotes included.
    raw: &'a [u8],
    /// Unquoted value with entities decoded.
    val: Vec<u8>,
    /// The whole attribute as written.
    data: &'a [u8],
    template: bool,
    removed: bool,
}

impl<'a> Attr<'a> {
    fn new(t: &Token<'a>) -> Self {
        let raw = t.attr_val;
        let unquoted = match raw.first() {
            Some(&q @ (b'"' | b'\'')) => {
                let inner = &raw[1..];
                inner.strip_suffix(&[q]).unwrap_or(inner)
            }
            _ => raw,
        };
        Self {
            name: t.text.to_ascii_lowercase(),
            hash: t.hash,
            raw,
            val: decode_entities(unquoted, true),
            data: t.data,
            template: t.template,
            removed: false,
        }
    }

    fn is(&self, hash: Hash) -> bool {
        !self.removed && self.hash == Some(hash)
    }
}

struct HtmlWriter<'w> {
    o: &'w Options,
    m: &'w Minifier,
    params: &'w Params,
    out: &'w mut Vec<u8>,
    /// Leading whitespace of the next text can be dropped.
    omit_space: bool,
    /// Depth of open `pre` and `code` elements.
    preformatted: usize,
    /// Raw-text element whose content comes next.
    raw: Option<Hash>,
    /// Media type from the `type` attribute of that element.
    raw_type: Option<Vec<u8>>,
    /// Element whose start tag was the last token written.
    opened: Option<Hash>,
}

impl HtmlWriter<'_> {
    fn run(&mut self, z: &mut TokenBuffer<Lexer>) {
        loop {
            let t = z.shift();
            if matches!(t.kind, TokenType::Text | TokenType::Svg | TokenType::Math) {
                self.opened = None;
            }
            match t.kind {
                TokenType::Error => return,
                TokenType::Doctype => self.out.extend_from_slice(b"<!doctype html>"),
                TokenType::Comment => self.comment(&t),
                TokenType::Svg => self.foreign("image/svg+xml", t.data),
                TokenType::Math => self.foreign("application/mathml+xml", t.data),
                TokenType::Text => self.text(z, &t),
                TokenType::StartTag | TokenType::EndTag => self.tag(z, &t),
                // attributes and closers of skipped tags
                TokenType::Attribute | TokenType::StartTagClose | TokenType::StartTagVoid => {}
            }
        }
    }

    fn embed(&mut self, media_type: &str, data: &[u8]) {
        self.m.minify_embedded(media_type, &self.params.nested(), self.out, data);
    }

    fn foreign(&mut self, media_type: &str, data: &[u8]) {
        self.embed(media_type, data);
        self.omit_space = false;
    }

    fn comment(&mut self, t: &Token) {
        if self.o.keep_comments {
            self.out.extend_from_slice(t.data);
            return;
        }
        if !self.o.keep_conditional_comments || !is_conditional(t.text) {
            return;
        }
        // downlevel-hidden: the content is HTML
        if t.data.starts_with(b"<!--[if ") && t.data.ends_with(b"<![endif]-->") {
            let begin = t.data.iter().position(|&c| c == b'>').map_or(0, |i| i + 1);
            let end = t.data.len() - b"<![endif]-->".len();
            if begin <= end {
                self.out.extend_from_slice(&t.data[..begin]);
                self.embed("text/html", &t.data[begin..end]);
                self.out.extend_from_slice(&t.data[end..]);
                return;
            }
        }
        self.out.extend_from_slice(t.data);
    }

    // --- Text ---

    fn text(&mut self, z: &mut TokenBuffer<Lexer>, t: &Token) {
        if let Some(raw) = self.raw {
            match raw {
                _ if t.template => self.out.extend_from_slice(t.data),
                Hash::Script | Hash::Style | Hash::Iframe => {
                    let mt = match (&self.raw_type, raw) {
                        (_, Hash::Iframe) => "text/html".to_string(),
                        (Some(ty), _) if ty.as_slice() == b"module" => "application/javascript".to_string(),
                        (Some(ty), _) => String::from_utf8_lossy(ty).into_owned(),
                        (None, Hash::Script) => "application/javascript".to_string(),
                        (None, _) => "text/css".to_string(),
                    };
                    self.embed(&mt, t.data);
                }
                _ => self.out.extend_from_slice(t.data),
            }
            return;
        }
        if self.preformatted > 0 {
            if t.template {
                self.out.extend_from_slice(t.data);
            } else {
                self.out.extend(decode_entities(t.data, false));
            }
            self.omit_space = false;
            return;
        }

        let mut text = if t.template {
            self.template_text(t.data)
        } else {
            collapse_whitespace(&decode_entities(t.data, false))
        };
        if self.omit_space && text.first().copied().is_some_and(is_whitespace) {
            text.remove(0);
        }
        self.omit_space = text.is_empty();
        if text.last().copied().is_some_and(is_whitespace) {
            self.omit_space = true;
            if self.o.keep_whitespace {
                // only the end of the document trims
                if self.next_structural(z).kind == TokenType::Error {
                    text.pop();
                    self.omit_space = false;
                }
            } else if self.trailing_space_is_redundant(z, t.template) {
                text.pop();
                self.omit_space = false;
            }
        }
        self.out.extend_from_slice(&text);
    }

    /// Collapse whitespace and decode entities outside of template actions.
    fn template_text(&self, data: &[u8]) -> Vec<u8> {
        let Some([open, close]) = &self.o.template_delims else {
            return collapse_whitespace(&decode_entities(data, false));
        };
        let (open, close) = (open.as_bytes(), close.as_bytes());
        let mut out = Vec::with_capacity(data.len());
        let mut rest = data;
        while !rest.is_empty() {
            let start = find_bytes(rest, open).unwrap_or(rest.len());
            out.extend(collapse_whitespace(&decode_entities(&rest[..start], false)));
            rest = &rest[start..];
            if rest.is_empty() {
                break;
            }
            let end = find_bytes(&rest[open.len()..], close).map_or(rest.len(), |i| open.len() + i + close.len());
            out.extend_from_slice(&rest[..end]);
            rest = &rest[end..];
        }
        out
    }

    /// Whether the space that ends a text node can go, judged by the tokens
    /// that follow it. After a template action the space stays and the
    /// next text loses its leading space instead.
    fn trailing_space_is_redundant(&self, z: &mut TokenBuffer<Lexer>, template: bool) -> bool {
        let mut i = 0;
        loop {
            let next = *z.peek(i);
            match next.kind {
                TokenType::Error => return true,
                TokenType::Text => return !template && next.data.first().copied().is_some_and(is_whitespace),
                TokenType::StartTag | TokenType::EndTag => {
                    if next.hash.is_some_and(is_block) {
                        return true;
                    }
                    if next.kind == TokenType::StartTag {
                        return false;
                    }
                }
                TokenType::Svg | TokenType::Math => return false,
                _ => {}
            }
            i += 1;
        }
    }

    // --- Tags ---

    fn tag(&mut self, z: &mut TokenBuffer<Lexer>, t: &Token) {
        self.raw = None;
        let opened = self.opened.take();
        let start = t.kind == TokenType::StartTag;
        let has_attributes = start && z.peek(0).kind == TokenType::Attribute;

        if start {
            if let Some(h @ (Hash::Script | Hash::Style | Hash::Iframe | Hash::Textarea | Hash::Title | Hash::Xmp | Hash::Noembed | Hash::Noframes | Hash::Plaintext)) = t.hash {
                // empty <script></script> and <style></style>
                if !has_attributes
                    && matches!(h, Hash::Script | Hash::Style)
                    && z.peek(0).kind == TokenType::StartTagClose
                    && z.peek(1).kind == TokenType::EndTag
                {
                    z.shift();
                    z.shift();
                    return;
                }
                self.raw = Some(h);
                self.raw_type = None;
            }
        } else if t.hash == Some(Hash::Template) {
            self.omit_space = true;
        }

        if matches!(t.hash, Some(Hash::Pre | Hash::Code)) {
            if start {
                self.preformatted += 1;
            } else {
                self.preformatted = self.preformatted.saturating_sub(1);
            }
        }

        let document_tag = matches!(t.hash, Some(Hash::Html | Hash::Head | Hash::Body));
        if !has_attributes && ((document_tag && !self.o.keep_document_tags) || t.hash == Some(Hash::Colgroup)) {
            return;
        }

        if let Some(h) = t.hash {
            if self.o.keep_whitespace || is_object(h) {
                self.omit_space = false;
            } else if is_block(h) {
                self.omit_space = true;
            } else if !start && opened == Some(h) && !matches!(h, Hash::Script | Hash::Style) {
                // an empty inline element such as an icon renders as content
                self.omit_space = false;
            }
        }

        let name = if t.template { t.text.to_vec() } else { t.text.to_ascii_lowercase() };
        if !start {
            if self.o.keep_end_tags || !self.end_tag_is_optional(z, t.hash) {
                self.out.extend_from_slice(b"</");
                self.out.extend_from_slice(&name);
                self.out.push(b'>');
            }
            if matches!(t.hash, Some(Hash::Option | Hash::Optgroup)) {
                skip_blank_text(z);
            }
            return;
        }

        self.out.push(b'<');
        self.out.extend_from_slice(&name);
        let mut attrs = Vec::new();
        loop {
            match z.peek(0).kind {
                TokenType::Attribute => attrs.push(Attr::new(&z.shift())),
                TokenType::StartTagClose | TokenType::StartTagVoid => {
                    z.shift();
                    break;
                }
                _ => break,
            }
        }
        if !attrs.is_empty() {
            self.attributes(t.hash, &mut attrs);
        }
        self.out.push(b'>');
        self.opened = t.hash;

        if matches!(t.hash, Some(Hash::Select | Hash::Optgroup)) {
            skip_blank_text(z);
        }
    }

    fn end_tag_is_optional(&self, z: &mut TokenBuffer<Lexer>, hash: Option<Hash>) -> bool {
        match hash {
            Some(
                Hash::Thead
                | Hash::Tbody
                | Hash::Tfoot
                | Hash::Tr
                | Hash::Th
                | Hash::Td
                | Hash::Option
                | Hash::Dd
                | Hash::Dt
                | Hash::Li
                | Hash::Rb
                | Hash::Rt
                | Hash::Rtc
                | Hash::Rp,
            ) => true,
            Some(Hash::P) => {
                let next = self.next_structural(z);
                match next.kind {
                    TokenType::Error => true,
                    TokenType::EndTag => next.hash.is_some_and(|h| !keeps_p_end(h)),
                    TokenType::StartTag => next.hash.is_some_and(closes_p),
                    _ => false,
                }
            }
            Some(Hash::Optgroup) => {
                let mut i = 0;
                while z.peek(i).kind == TokenType::Text {
                    i += 1;
                }
                let next = z.peek(i);
                next.kind == TokenType::Error || next.hash != Some(Hash::Option)
            }
            _ => false,
        }
    }

    /// The first token that is neither whitespace-only text nor a comment
    /// that gets dropped, without consuming anything.
    fn next_structural<'a>(&self, z: &mut TokenBuffer<Lexer<'a>>) -> Token<'a> {
        let mut i = 0;
        loop {
            let next = *z.peek(i);
            let skipped = match next.kind {
                TokenType::Text => is_all_whitespace(next.data),
                TokenType::Comment => {
                    !self.o.keep_comments && !(self.o.keep_conditional_comments && is_conditional(next.text))
                }
                _ => false,
            };
            if !skipped {
                return next;
            }
            i += 1;
        }
    }

    // --- Attributes ---

    fn attributes(&mut self, tag: Option<Hash>, attrs: &mut [Attr]) {
        match tag {
            Some(Hash::Meta) => rewrite_meta(attrs),
            Some(Hash::Script) => {
                if attrs.iter().any(|a| a.is(Hash::Src)) {
                    for a in attrs.iter_mut().filter(|a| a.is(Hash::Charset)) {
                        a.removed = true;
                    }
                }
            }
            Some(Hash::Input) => {
                let radio = attrs
                    .iter()
                    .find(|a| a.is(Hash::Type))
                    .is_some_and(|a| eq_lower(trim_whitespace(&a.val), b"radio"));
                for a in attrs.iter_mut().filter(|a| a.is(Hash::Value)) {
                    if (!radio && a.val.is_empty()) || (radio && eq_lower(&a.val, b"on")) {
                        a.removed = true;
                    }
                }
            }
            Some(Hash::A) => {
                let id = attrs.iter().find(|a| a.is(Hash::Id)).map(|a| a.val.clone());
                for a in attrs.iter_mut().filter(|a| a.is(Hash::Name)) {
                    if id.as_ref() == Some(&a.val) {
                        a.removed = true;
                    }
                }
            }
            _ => {}
        }

        for attr in attrs.iter().filter(|a| !a.removed) {
            if attr.template {
                self.out.push(b' ');
                self.out.extend_from_slice(attr.data);
                continue;
            }
            let Some(val) = self.attribute_value(tag, attr) else {
                continue;
            };
            self.out.push(b' ');
            self.out.extend_from_slice(&attr.name);
            if !val.is_empty() && !attr.hash.is_some_and(is_boolean_attr) {
                let rdfa = matches!(
                    attr.hash,
                    Some(
                        Hash::Vocab
                            | Hash::Typeof
                            | Hash::Property
                            | Hash::Resource
                            | Hash::Prefix
                            | Hash::Content
                            | Hash::About
                            | Hash::Rev
                            | Hash::Datatype
                            | Hash::Inlist
                    )
                );
                self.out.push(b'=');
                self.out.extend(escape_attr_val(&val, attr.raw, self.o.keep_quotes || rdfa));
            }
        }
    }

    /// Minified value of an attribute, or `None` when it can be left out.
    fn attribute_value(&mut self, tag: Option<Hash>, attr: &Attr) -> Option<Vec<u8>> {
        let mut val = if attr.hash.is_some_and(is_trim_attr) {
            trim_whitespace(&collapse_whitespace(&attr.val)).to_vec()
        } else {
            attr.val.clone()
        };
        let Some(tag) = tag else {
            return Some(val);
        };

        if val.is_empty()
            && matches!(
                attr.hash,
                Some(Hash::Class | Hash::Dir | Hash::Id | Hash::Lang | Hash::Name | Hash::Title | Hash::Action)
            )
        {
            return None;
        }
        if attr.hash.is_some_and(is_caseless_attr) && !(attr.hash == Some(Hash::Type) && matches!(tag, Hash::Ol | Hash::Li)) {
            val.make_ascii_lowercase();
            let media = match attr.hash {
                Some(Hash::Enctype | Hash::Accept) => true,
                Some(Hash::Type) => matches!(
                    tag,
                    Hash::A | Hash::Link | Hash::Embed | Hash::Object | Hash::Source | Hash::Script | Hash::Style
                ),
                _ => false,
            };
            if media {
                val = media_type(&val);
            }
        }
        if self.raw.is_some() && attr.hash == Some(Hash::Type) {
            self.raw_type = Some(val.clone());
        }
        if !self.o.keep_default_attr_vals && is_default_value(tag, attr.hash, &val) {
            return None;
        }

        if attr.hash == Some(Hash::Style) {
            let mut css = Vec::with_capacity(val.len());
            self.m
                .minify_embedded("text/css", &self.params.nested_inline(), &mut css, trim_whitespace(&val));
            return (!css.is_empty()).then_some(css);
        }
        if attr.name.len() > 2 && attr.name.starts_with(b"on") {
            let mut code = trim_whitespace(&val);
            if code.len() >= 11 && eq_lower(&code[..11], b"javascript:") {
                code = &code[11..];
            }
            let mut js = Vec::with_capacity(code.len());
            self.m
                .minify_embedded("application/javascript", &self.params.nested_inline(), &mut js, code);
            return (!js.is_empty()).then_some(js);
        }
        if attr.hash.is_some_and(is_url_attr) {
            let url = trim_whitespace(&val);
            if url.len() > 5 && eq_lower(&url[..5], b"data:") {
                return Some(data_uri(self.m, url, self.params));
            }
        }
        Some(val)
    }
}

/// `<meta>` rewrites: `http-equiv` content types become `charset`, keyword
/// lists and viewports lose their spaces.
fn rewrite_meta(attrs: &mut [Attr]) {
    fn find(attrs: &[Attr], h: Hash) -> Option<usize> {
        attrs.iter().position(|a| a.is(h))
    }
    let Some(content) = find(attrs, Hash::Content) else {
        return;
    };

    if let Some(http_equiv) = find(attrs, Hash::HttpEquiv) {
        let content_type = eq_lower(trim_whitespace(&attrs[http_equiv].val), b"content-type");
        if content_type && find(attrs, Hash::Charset).is_none() {
            let mt = media_type(&attrs[content].val);
            if mt == b"text/html;charset=utf-8" {
                attrs[http_equiv].removed = true;
                let c = &mut attrs[content];
                c.name = b"charset".to_vec();
                c.hash = Some(Hash::Charset);
                c.val = b"utf-8".to_vec();
            } else {
                attrs[content].val = mt;
            }
        }
    }

    if let Some(name) = find(attrs, Hash::Name) {
        let name = trim_whitespace(&attrs[name].val).to_vec();
        let val = &mut attrs[content].val;
        if eq_lower(&name, b"keywords") {
            *val = replace(val, b", ", b",");
        } else if eq_lower(&name, b"viewport") {
            let compact: Vec<u8> = val.iter().copied().filter(|&c| !is_whitespace(c)).collect();
            let parts: Vec<Vec<u8>> = compact
                .split(|&c| c == b',')
                .map(|part| match part.iter().position(|&c| c == b'=') {
                    Some(eq) => [&part[..=eq], number(&part[eq + 1..], 0).as_slice()].concat(),
                    None => part.to_vec(),
                })
                .collect();
            *val = parts.join(&b","[..]);
        }
    }
}

fn replace(haystack: &[u8], from: &[u8], to: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if haystack[i..].starts_with(from) {
            out.extend_from_slice(to);
            i += from.len();
        } else {
            out.push(haystack[i]);
            i += 1;
        }
    }
    out
}

fn is_default_value(tag: Hash, attr: Option<Hash>, val: &[u8]) -> bool {
    let Some(attr) = attr else {
        return false;
    };
    match attr {
        Hash::Type => match tag {
            Hash::Script => matches!(
                val,
                b"text/javascript" | b"application/javascript" | b"text/ecmascript" | b"application/ecmascript"
            ),
            Hash::Style | Hash::Link => val == b"text/css",
            Hash::Input => val == b"text",
            Hash::Button => val == b"submit",
            _ => false,
        },
        Hash::Language => tag == Hash::Script,
        Hash::Method => val == b"get",
        Hash::Enctype => val == b"application/x-www-form-urlencoded",
        Hash::Colspan | Hash::Rowspan | Hash::Span => val == b"1",
        Hash::Shape => val == b"rect",
        Hash::Clear => val == b"none",
        Hash::Frameborder => val == b"1",
        Hash::Scrolling => val == b"auto",
        Hash::Valuetype => val == b"data",
        Hash::Media => tag == Hash::Style && val == b"all",
        _ => false,
    }
}

fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn skip_blank_text(z: &mut TokenBuffer<Lexer>) {
    let next = z.peek(0);
    if next.kind == TokenType::Text && is_all_whitespace(next.data) {
        z.shift();
    }
}

fn is_conditional(text: &[u8]) -> bool {
    text.len() > 6 && (text.starts_with(b"[if ") || text.ends_with(b"[endif]") || text.ends_with(b"[endif]--"))
}

/// Decode the character references that have a shorter literal form.
///
/// `&lt;` is only decoded in attribute values, and `&amp;` stays when the
/// bytes after it would turn the literal `&` into a reference.
fn decode_entities(b: &[u8], in_attr: bool) -> Vec<u8> {
    const ENTITIES: [(&[u8], u8); 10] = [
        (b"&amp;", b'&'),
        (b"&#38;", b'&'),
        (b"&gt;", b'>'),
        (b"&#62;", b'>'),
        (b"&quot;", b'"'),
        (b"&#34;", b'"'),
        (b"&apos;", b'\''),
        (b"&#39;", b'\''),
        (b"&lt;", b'<'),
        (b"&#60;", b'<'),
    ];
    let mut out = Vec::with_capacity(b.len());
    let mut i = 0;
    'outer: while i < b.len() {
        if b[i] == b'&' {
            for (entity, c) in ENTITIES {
                if !b[i..].starts_with(entity) || (c == b'<' && !in_attr) {
                    continue;
                }
                let rest = &b[i + entity.len()..];
                if c == b'&' && starts_reference(rest) {
                    out.extend_from_slice(b"&amp;");
                } else {
                    out.push(c);
                }
                i += entity.len();
                continue 'outer;
            }
        }
        out.push(b[i]);
        i += 1;
    }
    out
}

// --- Element and attribute tables ---

/// Elements around which whitespace does not render.
const fn is_block(h: Hash) -> bool {
    matches!(
        h,
        Hash::Address
            | Hash::Article
            | Hash::Aside
            | Hash::Base
            | Hash::Blockquote
            | Hash::Body
            | Hash::Br
            | Hash::Caption
            | Hash::Col
            | Hash::Colgroup
            | Hash::Dd
            | Hash::Details
            | Hash::Dialog
            | Hash::Div
            | Hash::Dl
            | Hash::Dt
            | Hash::Fieldset
            | Hash::Figcaption
            | Hash::Figure
            | Hash::Footer
            | Hash::Form
            | Hash::H1
            | Hash::H2
            | Hash::H3
            | Hash::H4
            | Hash::H5
            | Hash::H6
            | Hash::Head
            | Hash::Header
            | Hash::Hgroup
            | Hash::Hr
            | Hash::Html
            | Hash::Legend
            | Hash::Li
            | Hash::Link
            | Hash::Main
            | Hash::Menu
            | Hash::Meta
            | Hash::Nav
            | Hash::Noscript
            | Hash::Ol
            | Hash::Optgroup
            | Hash::Option
            | Hash::P
            | Hash::Param
            | Hash::Pre
            | Hash::Section
            | Hash::Source
            | Hash::Summary
            | Hash::Table
            | Hash::Tbody
            | Hash::Td
            | Hash::Template
            | Hash::Tfoot
            | Hash::Th
            | Hash::Thead
            | Hash::Title
            | Hash::Tr
            | Hash::Track
            | Hash::Ul
    )
}

/// Replaced and interactive elements that keep the whitespace around them.
const fn is_object(h: Hash) -> bool {
    matches!(
        h,
        Hash::Audio
            | Hash::Button
            | Hash::Canvas
            | Hash::Embed
            | Hash::Iframe
            | Hash::Img
            | Hash::Input
            | Hash::Meter
            | Hash::Object
            | Hash::Output
            | Hash::Picture
            | Hash::Progress
            | Hash::Select
            | Hash::Textarea
            | Hash::Video
    )
}

/// End tags of elements whose content may hold a `p` that needs its `</p>`.
const fn keeps_p_end(h: Hash) -> bool {
    matches!(
        h,
        Hash::A | Hash::Audio | Hash::Del | Hash::Ins | Hash::Label | Hash::Map | Hash::Noscript | Hash::Video
    )
}

/// Start tags that implicitly close an open `p`.
const fn closes_p(h: Hash) -> bool {
    matches!(
        h,
        Hash::Address
            | Hash::Article
            | Hash::Aside
            | Hash::Blockquote
            | Hash::Details
            | Hash::Div
            | Hash::Dl
            | Hash::Fieldset
            | Hash::Figcaption
            | Hash::Figure
            | Hash::Footer
            | Hash::Form
            | Hash::H1
            | Hash::H2
            | Hash::H3
            | Hash::H4
            | Hash::H5
            | Hash::H6
            | Hash::Header
            | Hash::Hgroup
            | Hash::Hr
            | Hash::Main
            | Hash::Menu
            | Hash::Nav
            | Hash::Ol
            | Hash::P
            | Hash::Pre
            | Hash::Section
            | Hash::Table
            | Hash::Ul
    )
}

const fn is_boolean_attr(h: Hash) -> bool {
    matches!(
        h,
        Hash::Allowfullscreen
            | Hash::Async
            | Hash::Autofocus
            | Hash::Autoplay
            | Hash::Checked
            | Hash::Compact
            | Hash::Controls
            | Hash::Declare
            | Hash::Default
            | Hash::Defer
            | Hash::Disabled
            | Hash::Formnovalidate
            | Hash::Hidden
            | Hash::Inert
            | Hash::Ismap
            | Hash::Itemscope
            | Hash::Loop
            | Hash::Multiple
            | Hash::Muted
            | Hash::Nohref
            | Hash::Nomodule
            | Hash::Noresize
            | Hash::Noshade
            | Hash::Novalidate
            | Hash::Nowrap
            | Hash::Open
            | Hash::Playsinline
            | Hash::Readonly
            | Hash::Required
            | Hash::Reversed
            | Hash::Scoped
            | Hash::Seamless
            | Hash::Selected
            | Hash::Truespeed
    )
}

/// Attributes whose values are case-insensitive keywords.
const fn is_caseless_attr(h: Hash) -> bool {
    matches!(
        h,
        Hash::Accept
            | Hash::AcceptCharset
            | Hash::Align
            | Hash::Charset
            | Hash::Clear
            | Hash::Color
            | Hash::Compact
            | Hash::Declare
            | Hash::Defer
            | Hash::Dir
            | Hash::Disabled
            | Hash::Enctype
            | Hash::Face
            | Hash::Frame
            | Hash::Hreflang
            | Hash::HttpEquiv
            | Hash::Language
            | Hash::Media
            | Hash::Method
            | Hash::Multiple
            | Hash::Nohref
            | Hash::Noresize
            | Hash::Noshade
            | Hash::Nowrap
            | Hash::Readonly
            | Hash::Rel
            | Hash::Rev
            | Hash::Scope
            | Hash::Scrolling
            | Hash::Selected
            | Hash::Shape
            | Hash::Type
            | Hash::Valuetype
    )
}

/// Attributes where surrounding whitespace is insignificant and inner runs collapse.
const fn is_trim_attr(h: Hash) -> bool {
    matches!(
        h,
        Hash::Accept
            | Hash::AcceptCharset
            | Hash::Action
            | Hash::Align
            | Hash::Charset
            | Hash::Class
            | Hash::Clear
            | Hash::Color
            | Hash::Cols
            | Hash::Colspan
            | Hash::Compact
            | Hash::Declare
            | Hash::Defer
            | Hash::Dir
            | Hash::Disabled
            | Hash::Enctype
            | Hash::Face
            | Hash::Frame
            | Hash::Height
            | Hash::Href
            | Hash::HttpEquiv
            | Hash::Id
            | Hash::Ismap
            | Hash::Lang
            | Hash::Language
            | Hash::Media
            | Hash::Method
            | Hash::Multiple
            | Hash::Name
            | Hash::Nohref
            | Hash::Noresize
            | Hash::Noshade
            | Hash::Nowrap
            | Hash::Readonly
            | Hash::Rel
            | Hash::Rev
            | Hash::Rows
            | Hash::Rowspan
            | Hash::Scope
            | Hash::Scrolling
            | Hash::Selected
            | Hash::Shape
            | Hash::Size
            | Hash::Span
            | Hash::Src
            | Hash::Start
            | Hash::Target
            | Hash::Type
            | Hash::Valuetype
            | Hash::Width
    )
}

const fn is_url_attr(h: Hash) -> bool {
    matches!(
        h,
        Hash::Action
            | Hash::Background
            | Hash::Cite
            | Hash::Classid
            | Hash::Codebase
            | Hash::Data
            | Hash::Formaction
            | Hash::Href
            | Hash::Icon
            | Hash::Longdesc
            | Hash::Manifest
            | Hash::Poster
            | Hash::Profile
            | Hash::Src
            | Hash::Usemap
            | Hash::Xmlns
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use pretty_assertions::assert_eq;

    fn passthrough(_: &Minifier, out: &mut Vec<u8>, input: &[u8], _: &Params) -> Result<(), MinifyError> {
        out.extend_from_slice(input);
        Ok(())
    }

    /// HTML alone, with embedded CSS and JS copied as they are.
    fn html_with(o: Options, src: &str) -> std::string::String {
        let mut m = Minifier::new();
        m.add("text/html", o);
        m.add("text/css", passthrough);
        m.add("application/javascript", passthrough);
        std::string::String::from_utf8(m.bytes("text/html", src.as_bytes()).unwrap()).unwrap()
    }

    fn html(src: &str) -> std::string::String {
        html_with(Options::default(), src)
    }

    fn full(src: &str) -> std::string::String {
        let m = Minifier::from_config(&Config::default());
        m.string("text/html", src).unwrap()
    }

    #[test]
    fn test_document() {
        assert_eq!(html("<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0//EN\">"), "<!doctype html>");
        assert_eq!(html("<!-- comment -->x"), "x");
        assert_eq!(html("<html><head></head><body>x</body></html>"), "x");
        assert_eq!(html("<body id=\"main\"></body>"), "<body id=main>");
        assert_eq!(
            html_with(Options { keep_document_tags: true, ..Options::default() }, "<html><body>x</body></html>"),
            "<html><body>x</body></html>"
        );
        assert_eq!(html("<DIV TITLE=\"blah\">boo</DIV>"), "<div title=blah>boo</div>");
        assert_eq!(html("<span ></span >"), "<span></span>");
        assert_eq!(html("<br/>"), "<br>");
        assert_eq!(html("<a b"), "<a b>");
    }

    #[test]
    fn test_comments() {
        let o = Options {
            keep_conditional_comments: true,
            ..Options::default()
        };
        assert_eq!(html_with(o.clone(), "<!--[if IE 6]> <b> x </b> <![endif]-->"), "<!--[if IE 6]><b>x</b><![endif]-->");
        assert_eq!(html_with(o, "<!-- plain -->"), "");
        assert_eq!(
            html_with(Options { keep_comments: true, ..Options::default() }, "<!-- c -->"),
            "<!-- c -->"
        );
    }

    #[test]
    fn test_whitespace() {
        assert_eq!(html("cats  and \tdogs "), "cats and dogs");
        assert_eq!(html(" <div> <i> test </i> <b> test </b> </div> "), "<div><i>test</i> <b>test</b></div>");
        assert_eq!(html("<strong>x </strong> y"), "<strong>x</strong> y");
        assert_eq!(html("<p>x </p>y"), "<p>x</p>y");
        assert_eq!(html("x <p>y</p>"), "x<p>y");
        assert_eq!(html("text <img> text"), "text <img> text");
        assert_eq!(html("cats  <br>  dogs "), "cats<br>dogs");
        assert_eq!(html("a <svg>b</svg> c"), "a <svg>b</svg> c");
        assert_eq!(html("<pre> a  b </pre>"), "<pre> a  b </pre>");
        assert_eq!(html("<code> a  b </code>"), "<code> a  b </code>");
        assert_eq!(html("<p>Hello <code>x</code> there</p>"), "<p>Hello <code>x</code> there");
        assert_eq!(
            html_with(Options { keep_whitespace: true, ..Options::default() }, "<div> a  <b>b</b> </div>"),
            "<div> a <b>b</b> </div>"
        );
    }

    #[test]
    fn test_empty_inline_elements() {
        assert_eq!(html("<i class=\"fas\"></i> Text"), "<i class=fas></i> Text");
        assert_eq!(html("<i class=\"fas\"> </i> Text"), "<i class=fas></i>Text");
        assert_eq!(html("a <span></span> b"), "a <span></span> b");
        assert_eq!(html("<div><span></span> text</div>"), "<div><span></span> text</div>");
        assert_eq!(
            html("<script src=a></script> <script src=b></script> <span></span>"),
            "<script src=a></script><script src=b></script><span></span>"
        );
    }

    #[test]
    fn test_template_delims() {
        let go = |src: &str| {
            let o = Options {
                template_delims: Some(GO_TEMPLATE_DELIMS.map(str::to_string)),
                ..Options::default()
            };
            html_with(o, src)
        };
        assert_eq!(go("<a href={{ .Link }} />"), "<a href={{ .Link }}>");
        assert_eq!(
            go("<input type=\"file\" accept=\"{{ .Accept }}, image/jpeg\">"),
            "<input type=file accept=\"{{ .Accept }}, image/jpeg\">"
        );
        assert_eq!(
            go("<option value=\"0\" {{ if eq .Type 0 }}selected{{ end }}>Foo</option>"),
            "<option value=0 {{ if eq .Type 0 }}selected{{ end }}>Foo"
        );
        assert_eq!(go("<style>a { color: {{.Color}} }</style>"), "<style>a { color: {{.Color}} }</style>");
        assert_eq!(go("<div style=\" color: {{.Color}} \">"), "<div style=\" color: {{.Color}} \">");
        assert_eq!(go("<script>alert( {{.Alert}} )</script>"), "<script>alert( {{.Alert}} )</script>");
        assert_eq!(
            go("<select>{{ range . }}<option>{{ . }}{{ end }}</select>"),
            "<select>{{ range . }}<option>{{ . }}{{ end }}</select>"
        );
        assert_eq!(go("<p>Hello <code>{{\"\"}}</code> there</p>"), "<p>Hello <code>{{\"\"}}</code> there");
        assert_eq!(
            go("<select><option>Default</option>{{range $i, $lang := .Languages}}<option>{{$lang}}</option>{{end}}</select>"),
            "<select><option>Default{{range $i, $lang := .Languages}}<option>{{$lang}}{{end}}</select>"
        );
        assert_eq!(
            go("<tr{{if .Deleted}} class=\"is-disabled\"{{end}}>"),
            "<tr{{if .Deleted}} class=\"is-disabled\"{{end}}>"
        );
        assert_eq!(go("{{ printf \"  !  \" }}"), "{{ printf \"  !  \" }}");
        assert_eq!(go("a<p>  {{a}}  </p>b"), "a<p>{{a}}</p>b");
        assert_eq!(go("a<span>  {{a}}  </span>b"), "a<span> {{a}} </span>b");
        assert_eq!(go("a <span>  {{a}}  </span> b"), "a <span>{{a}} </span>b");
        assert_eq!(go("  {{a}}  {{b}}  "), "{{a}} {{b}}");

        let php = Options {
            template_delims: Some(PHP_TEMPLATE_DELIMS.map(str::to_string)),
            ..Options::default()
        };
        assert_eq!(
            html_with(php, "\n<div class=\"foo\">\n<?php\necho \"hello\";\n?>\n</div>\n"),
            "<div class=foo><?php\necho \"hello\";\n?></div>"
        );
    }

    #[test]
    fn test_entities() {
        assert_eq!(html("<span>&amp;</span>"), "<span>&</span>");
        assert_eq!(html("<span>&amp;copy;</span>"), "<span>&amp;copy;</span>");
        assert_eq!(html("<span>&lt;&gt;</span>"), "<span>&lt;></span>");
        assert_eq!(html("<span>&#160;</span>"), "<span>&#160;</span>");
        assert_eq!(html("<span name=\"&lt;&apos;\">a</span>"), "<span name=\"<'\">a</span>");
    }

    #[test]
    fn test_attributes() {
        assert_eq!(html("<span attr=\"test\"></span>"), "<span attr=test></span>");
        assert_eq!(html("<span attr=\"test&quot;test\"></span>"), "<span attr='test\"test'></span>");
        assert_eq!(html("<span attr=\"\"></span>"), "<span attr></span>");
        assert_eq!(html("<span selected=\"selected\"></span>"), "<span selected></span>");
        assert_eq!(html("<p class=\"  name  other  \">"), "<p class=\"name other\">");
        assert_eq!(html("<p id=\"\" class=\"\">x"), "<p>x");
        assert_eq!(html("<input type=\"text\" value=\"\">"), "<input>");
        assert_eq!(html("<input type=\"radio\" value=\"on\">"), "<input type=radio>");
        assert_eq!(html("<input type=\"radio\" value=\"\">"), "<input type=radio value>");
        assert_eq!(html("<form method=\"GET\"></form>"), "<form></form>");
        assert_eq!(html("<td colspan=\"1\" rowspan=\"2\"></td>"), "<td rowspan=2>");
        assert_eq!(html("<ol type=\"A\"></ol>"), "<ol type=A></ol>");
        assert_eq!(html("<a id=\"abc\" name=\"abc\">y</a>"), "<a id=abc>y</a>");
        assert_eq!(html("<script charset=\"x\" src=\"y\"></script>"), "<script src=y></script>");
        assert_eq!(html("<x-el type=\"Mixed\"></x-el>"), "<x-el type=Mixed></x-el>");
        assert_eq!(html("<meta property=\"rdfa\" content=\"data\">"), "<meta property=\"rdfa\" content=\"data\">");
        assert_eq!(
            html_with(Options { keep_quotes: true, ..Options::default() }, "<a href=x>"),
            "<a href=\"x\">"
        );
        assert_eq!(
            html_with(Options { keep_default_attr_vals: true, ..Options::default() }, "<form method=get>"),
            "<form method=get>"
        );
    }

    #[test]
    fn test_meta() {
        assert_eq!(html("<meta http-equiv=\"Content-Type\" content=\"text/html; charset=UTF-8\" />"), "<meta charset=utf-8>");
        assert_eq!(html("<meta name=\"keywords\" content=\"a, b\">"), "<meta name=keywords content=\"a,b\">");
        assert_eq!(
            html("<meta name=viewport content=\"width=0.1, initial-scale=1.0 , maximum-scale=1000\">"),
            "<meta name=viewport content=\"width=.1,initial-scale=1,maximum-scale=1e3\">"
        );
    }

    #[test]
    fn test_optional_end_tags() {
        assert_eq!(
            html("<table><thead><tr><th>foo</th><th>bar</th></tr></thead><tbody><tr><td>boo</td></tr></tbody></table>"),
            "<table><thead><tr><th>foo<th>bar<tbody><tr><td>boo</table>"
        );
        assert_eq!(html("<ul><li></li> <li></li></ul>"), "<ul><li><li></ul>");
        assert_eq!(html("<p></p><p></p>"), "<p><p>");
        assert_eq!(html("<p></p><a></a>"), "<p></p><a></a>");
        assert_eq!(html("<a><p>x</p></a>"), "<a><p>x</p></a>");
        assert_eq!(html("<p>a</p>\n<!-- c -->\n<p>b</p>"), "<p>a<p>b");
        assert_eq!(
            html_with(Options { keep_comments: true, ..Options::default() }, "<p>a</p><!-- c --><p>b</p>"),
            "<p>a</p><!-- c --><p>b"
        );
        assert_eq!(
            html("<select> <optgroup> <option>foo</option> </optgroup> <option>bar</option></select>"),
            "<select><optgroup><option>foo</optgroup><option>bar</select>"
        );
        assert_eq!(
            html_with(Options { keep_end_tags: true, ..Options::default() }, "<ul><li>x</li></ul>"),
            "<ul><li>x</li></ul>"
        );
    }

    #[test]
    fn test_raw_tags() {
        assert_eq!(html("<script></script>x"), "x");
        assert_eq!(html("<script type=\"text/javascript\">js</script>"), "<script>js</script>");
        assert_eq!(html("<style>&</style>"), "<style>&</style>");
        assert_eq!(html("<textarea> a  b </textarea>"), "<textarea> a  b </textarea>");
        assert_eq!(html("<script type=\"text/template\"> <b> </script>"), "<script type=text/template> <b> </script>");
    }

    #[test]
    fn test_embedded() {
        assert_eq!(full("<style> a { color : red ; } </style>"), "<style>a{color:red}</style>");
        assert_eq!(full("<p style=\" color : #FF0000 ; \">x"), "<p style=color:red>x");
        assert_eq!(full("<span style=\" \"></span>"), "<span></span>");
        assert_eq!(full("<button onclick=\"javascript: a ( ) ;\"></button>"), "<button onclick=a()></button>");
        assert_eq!(full("<script>var a = 1 ;</script>"), "<script>var a=1</script>");
        assert_eq!(full("<script>var a = \"</script>"), "<script>var a = \"</script>");
        assert_eq!(full("<script><!--\nx = 1\n//--></script>"), "<script>x=1</script>");
        assert_eq!(full("<link href=\"data:text/plain, data\">"), "<link href=data:,%20data>");
        assert_eq!(full("<svg> <rect width=\"0\"/> </svg>"), "<svg></svg>");
    }
}
