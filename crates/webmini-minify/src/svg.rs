//! SVG minifier.
//!
//! Runs on the XML tokenizer and adds what SVG knows beyond XML: invisible
//! shapes and metadata are dropped, presentation values are shortened, and
//! `d`, `style` and `<style>` are minified as path data and CSS.

use serde::{Deserialize, Serialize};
use webmini_lexer::css::split_number;
use webmini_lexer::xml::{Lexer, TokenType};
use webmini_lexer::{eq_lower, is_whitespace, trim_whitespace, TokenBuffer};

use crate::color::minify_color;
use crate::common::{collapse_whitespace, media_type, number};
use crate::pathdata::shorten_path_data;
use crate::xml::{cdata_as_text, collapse_empty, decode_entities, decode_quotes, quote_attr_val, unquote};
use crate::{Minifier, Minify, MinifyError, Params};

webmini_lexer::hashes! {
    /// SVG element and attribute names the minifier treats specially.
    pub enum Name {
        BaseProfile => "baseprofile",
        Circle => "circle",
        Class => "class",
        Color => "color",
        ContentScriptType => "contentscripttype",
        ContentStyleType => "contentstyletype",
        D => "d",
        Ellipse => "ellipse",
        Fill => "fill",
        FloodColor => "flood-color",
        Height => "height",
        Id => "id",
        LightingColor => "lighting-color",
        Metadata => "metadata",
        Points => "points",
        PreserveAspectRatio => "preserveaspectratio",
        R => "r",
        Rect => "rect",
        Rx => "rx",
        Ry => "ry",
        StopColor => "stop-color",
        Stroke => "stroke",
        Style => "style",
        Svg => "svg",
        Text => "text",
        TextPath => "textpath",
        Tspan => "tspan",
        Type => "type",
        Version => "version",
        ViewBox => "viewbox",
        Width => "width",
        X => "x",
        Y => "y",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Significant digits kept in numbers, 0 keeps them all.
    pub precision: usize,
    pub keep_comments: bool,
}

impl Minify for Options {
    fn minify(
        &self,
        m: &Minifier,
        out: &mut Vec<u8>,
        input: &[u8],
        params: &Params,
    ) -> Result<(), MinifyError> {
        let mut w = SvgWriter {
            o: self,
            m,
            params,
            out,
            tag: None,
            style_type: "text/css".to_string(),
            text_depth: 0,
        };
        let mut z = TokenBuffer::new(Lexer::new(input));
        w.run(&mut z);
        match z.source().err() {
            Some(err) => Err(err.clone().into()),
            None => Ok(()),
        }
    }
}

struct SvgWriter<'w> {
    o: &'w Options,
    m: &'w Minifier,
    params: &'w Params,
    out: &'w mut Vec<u8>,
    /// Element whose start tag or content is being written.
    tag: Option<Name>,
    /// Media type of `<style>` content, from `contentStyleType`.
    style_type: String,
    /// Depth of text content elements, where whitespace is significant.
    text_depth: usize,
}

impl SvgWriter<'_> {
    fn run(&mut self, z: &mut TokenBuffer<Lexer>) {
        loop {
            let t = z.shift();
            match t.kind {
                TokenType::Error => return,
                TokenType::Comment => {
                    if self.o.keep_comments {
                        self.out.extend_from_slice(t.data);
                    }
                }
                TokenType::Doctype => {
                    // only an internal subset can change the document
                    if trim_whitespace(t.text).ends_with(b"]") {
                        self.out.extend_from_slice(t.data);
                    }
                }
                TokenType::StartTagPI => loop {
                    if matches!(z.shift().kind, TokenType::StartTagClosePI | TokenType::Error) {
                        break;
                    }
                },
                TokenType::Text => self.text(t.data),
                TokenType::CData => self.cdata(t.data, t.text),
                TokenType::StartTag => {
                    let name = Name::lookup(t.text);
                    if self.invisible(z, name) {
                        skip_element(z);
                        continue;
                    }
                    self.tag = name;
                    if is_text_content(name) {
                        self.text_depth += 1;
                    }
                    self.out.push(b'<');
                    self.out.extend_from_slice(t.text);
                }
                TokenType::Attribute => self.attribute(t.text, t.attr_val),
                TokenType::StartTagClose => {
                    if collapse_empty(z, true) {
                        self.out.extend_from_slice(b"/>");
                        self.close_element();
                    } else {
                        self.out.push(b'>');
                    }
                }
                TokenType::StartTagCloseVoid => {
                    self.out.extend_from_slice(b"/>");
                    self.close_element();
                }
                // processing instructions are skipped whole
                TokenType::StartTagClosePI => {}
                TokenType::EndTag => {
                    if is_text_content(Name::lookup(t.text)) {
                        self.text_depth = self.text_depth.saturating_sub(1);
                    }
                    self.tag = None;
                    self.out.extend_from_slice(b"</");
                    self.out.extend_from_slice(t.text);
                    self.out.push(b'>');
                }
            }
        }
    }

    fn close_element(&mut self) {
        if is_text_content(self.tag) {
            self.text_depth = self.text_depth.saturating_sub(1);
        }
        self.tag = None;
    }

    fn text(&mut self, data: &[u8]) {
        let text = collapse_whitespace(data);
        let text = if self.text_depth > 0 { &text[..] } else { trim_whitespace(&text) };
        if self.tag == Some(Name::Style) && !text.is_empty() {
            let mut content = Vec::new();
            let mt = self.style_type.clone();
            self.m.minify_embedded(&mt, &self.params.nested(), &mut content, &decode_entities(text));
            self.write_character_data(&content);
        } else {
            self.out.extend_from_slice(text);
        }
    }

    fn cdata(&mut self, data: &[u8], inner: &[u8]) {
        let mut content = inner.to_vec();
        if self.tag == Some(Name::Style) {
            content.clear();
            let mt = self.style_type.clone();
            self.m.minify_embedded(&mt, &self.params.nested(), &mut content, inner);
        }
        match cdata_as_text(&content) {
            Some(text) => {
                let text = collapse_whitespace(&text);
                self.out.extend_from_slice(trim_whitespace(&text));
            }
            None if content.as_slice() == inner => self.out.extend_from_slice(data),
            None => self.write_character_data(&content),
        }
    }

    /// Write raw content as escaped text, or as a CDATA section when that is shorter.
    fn write_character_data(&mut self, content: &[u8]) {
        match cdata_as_text(content) {
            Some(text) => self.out.extend_from_slice(&text),
            None => {
                self.out.extend_from_slice(b"<![CDATA[");
                self.out.extend_from_slice(content);
                self.out.extend_from_slice(b"]]>");
            }
        }
    }

    /// Shapes that cannot render and `metadata` are dropped with their content.
    fn invisible(&self, z: &mut TokenBuffer<Lexer>, name: Option<Name>) -> bool {
        let zero = |v: &[u8]| {
            let (num, _) = split_number(trim_whitespace(unquote(v)));
            num.is_empty() || number(num, self.o.precision) == b"0"
        };
        match name {
            Some(Name::Metadata) => true,
            Some(Name::Rect) => {
                let (w, h) = (peek_attr(z, Name::Width), peek_attr(z, Name::Height));
                w.map_or(true, zero) || h.map_or(true, zero)
            }
            Some(Name::Circle) => peek_attr(z, Name::R).is_some_and(zero),
            Some(Name::Ellipse) => peek_attr(z, Name::Rx).is_some_and(zero) || peek_attr(z, Name::Ry).is_some_and(zero),
            _ => false,
        }
    }

    fn attribute(&mut self, name: &[u8], raw: &[u8]) {
        let attr = Name::lookup(name);
        let decoded = decode_quotes(unquote(raw));
        let collapsed = collapse_whitespace(&decoded);
        let mut val = trim_whitespace(&collapsed).to_vec();
        if val.is_empty() {
            return;
        }
        if !matches!(attr, Some(Name::Version | Name::Id | Name::Class)) && !name.contains(&b':') {
            if let Some(dim) = shorten_dimension(&val, self.o.precision) {
                val = dim;
            }
        }
        if self.is_default(attr, &val) {
            return;
        }

        match attr {
            Some(Name::ContentStyleType) if self.tag == Some(Name::Svg) => {
                val = media_type(&val);
                self.style_type = String::from_utf8_lossy(&val).into_owned();
            }
            Some(Name::Style) => {
                let mut css = Vec::with_capacity(val.len());
                let mt = self.style_type.clone();
                self.m
                    .minify_embedded(&mt, &self.params.nested_inline(), &mut css, &val);
                if css.is_empty() {
                    return;
                }
                val = css;
            }
            Some(Name::D) => val = shorten_path_data(&val, self.o.precision),
            Some(Name::ViewBox | Name::Points) => val = shorten_numbers(&val, self.o.precision),
            Some(Name::Fill | Name::Stroke | Name::StopColor | Name::FloodColor | Name::LightingColor | Name::Color) => {
                if !(val.len() >= 4 && eq_lower(&val[..4], b"url(")) {
                    val = minify_color(&val);
                }
            }
            _ => {}
        }

        self.out.push(b' ');
        self.out.extend_from_slice(name);
        self.out.push(b'=');
        self.out.extend(quote_attr_val(&val));
    }

    fn is_default(&self, attr: Option<Name>, val: &[u8]) -> bool {
        let Some(attr) = attr else {
            return false;
        };
        match self.tag {
            Some(Name::Svg) => matches!(
                (attr, val),
                (Name::Version, b"1.1")
                    | (Name::X | Name::Y, b"0")
                    | (Name::Width | Name::Height, b"100%")
                    | (Name::PreserveAspectRatio, b"xMidYMid meet")
                    | (Name::BaseProfile, b"full")
                    | (Name::ContentScriptType, b"application/ecmascript")
                    | (Name::ContentStyleType, b"text/css")
            ),
            Some(Name::Style) => attr == Name::Type && val == b"text/css",
            _ => false,
        }
    }
}

fn is_text_content(name: Option<Name>) -> bool {
    matches!(name, Some(Name::Text | Name::Tspan | Name::TextPath))
}

/// Raw value of an attribute of the start tag at the front of the buffer.
fn peek_attr<'a>(z: &mut TokenBuffer<Lexer<'a>>, name: Name) -> Option<&'a [u8]> {
    let mut i = 0;
    loop {
        let t = *z.peek(i);
        if t.kind != TokenType::Attribute {
            return None;
        }
        if Name::lookup(t.text) == Some(name) {
            return Some(t.attr_val);
        }
        i += 1;
    }
}

/// Consume the rest of an element whose start tag name was just read.
fn skip_element(z: &mut TokenBuffer<Lexer>) {
    let mut level = 0usize;
    loop {
        match z.shift().kind {
            TokenType::Error => return,
            TokenType::StartTag => level += 1,
            TokenType::EndTag | TokenType::StartTagCloseVoid => {
                if level == 0 {
                    return;
                }
                level -= 1;
            }
            _ => {}
        }
    }
}

/// Shorten a value made of a single number with an optional unit. Zero loses
/// its unit and so does `px`, the user unit.
fn shorten_dimension(val: &[u8], precision: usize) -> Option<Vec<u8>> {
    let (num, unit) = split_number(val);
    if num.is_empty() || !(unit == b"%" || unit.iter().all(u8::is_ascii_alphabetic)) {
        return None;
    }
    let mut out = number(num, precision);
    if out != b"0" && !eq_lower(unit, b"px") {
        out.extend(unit.iter().map(u8::to_ascii_lowercase));
    }
    Some(out)
}

/// Shorten a list of numbers such as `viewBox` or `points`, separated by
/// spaces, or by nothing before a minus sign.
fn shorten_numbers(val: &[u8], precision: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(val.len());
    for part in val.split(|&c| is_whitespace(c) || c == b',').filter(|p| !p.is_empty()) {
        let Some(num) = shorten_dimension(part, precision) else {
            return val.to_vec();
        };
        if !out.is_empty() && num.first() != Some(&b'-') {
            out.push(b' ');
        }
        out.extend(num);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use pretty_assertions::assert_eq;

    /// SVG alone; embedded CSS is copied as it is.
    fn svg(src: &str) -> std::string::String {
        let mut m = Minifier::new();
        m.add("image/svg+xml", Options::default());
        m.string("image/svg+xml", src).unwrap()
    }

    fn full(src: &str) -> std::string::String {
        Minifier::from_config(&Config::default())
            .string("image/svg+xml", src)
            .unwrap()
    }

    #[test]
    fn test_markup() {
        assert_eq!(svg("<!-- comment -->"), "");
        assert_eq!(svg("<!DOCTYPE svg SYSTEM \"foo.dtd\">"), "");
        assert_eq!(
            svg("<!DOCTYPE svg [ <!ENTITY x \"bar\"> ]>"),
            "<!DOCTYPE svg [ <!ENTITY x \"bar\"> ]>"
        );
        assert_eq!(svg("<?xml version=\"1.0\" encoding=\"utf-8\"?>"), "");
        assert_eq!(svg("<!DOCTYPE bla><?xml?><!-- comment --><metadata/>"), "");
        assert_eq!(svg("<metadata><dc:title /></metadata><g/>"), "<g/>");
        assert_eq!(svg("<g></g>"), "<g/>");
        assert_eq!(svg("<g id=\"a\"><g><path/></g></g>"), "<g id=\"a\"><g><path/></g></g>");
        assert_eq!(svg("<foreignObject/>  text"), "<foreignObject/>text");
        assert_eq!(
            svg("<text> a  <tspan> b </tspan> c </text>"),
            "<text> a <tspan> b </tspan> c </text>"
        );
        let mut m = Minifier::new();
        m.add("image/svg+xml", Options { keep_comments: true, ..Options::default() });
        assert_eq!(m.string("image/svg+xml", "<!-- c --><g/>").unwrap(), "<!-- c --><g/>");
    }

    #[test]
    fn test_invisible_shapes() {
        assert_eq!(svg("<rect x=\"5\" y=\"10\" rx=\"2\" ry=\"3\">"), "");
        assert_eq!(svg("<rect x=\"5\" y=\"10\" height=\"40\"/>"), "");
        assert_eq!(svg("<rect x=\"5\" y=\"10\" width=\"30\" height=\"0%\"/>"), "");
        assert_eq!(
            svg("<rect x=\"5\" y=\"10\" width=\"30%\" height=\"100%\"/>"),
            "<rect x=\"5\" y=\"10\" width=\"30%\" height=\"100%\"/>"
        );
        assert_eq!(svg("<rect height=\"10\"><path/></rect><g/>"), "<g/>");
        assert_eq!(svg("<circle r=\"0\"/><circle r=\"1\"/>"), "<circle r=\"1\"/>");
        assert_eq!(svg("<ellipse rx=\"2\" ry=\"0.0\"/>"), "");
    }

    #[test]
    fn test_attributes() {
        assert_eq!(svg("<svg version=\"1.0\"></svg>"), "<svg version=\"1.0\"/>");
        assert_eq!(
            svg("<svg version=\"1.1\" x=\"0\" y=\"0px\" width=\"100%\" height=\"100%\"><path/></svg>"),
            "<svg><path/></svg>"
        );
        assert_eq!(svg("<path x=\"\"> </path>"), "<path/>");
        assert_eq!(svg("<path x=\" a \n b \"/>"), "<path x=\"a b\"/>");
        assert_eq!(svg("<path x=\"5.0px\" y=\"0%\" z=\"2EM\"/>"), "<path x=\"5\" y=\"0\" z=\"2em\"/>");
        assert_eq!(svg("<path id=\"05\"/>"), "<path id=\"05\"/>");
        assert_eq!(svg("<path title='say \"hi\"'/>"), "<path title='say \"hi\"'/>");
        assert_eq!(
            svg("<svg viewBox=\"0.0 0 -10.50 24px\"><path/></svg>"),
            "<svg viewBox=\"0 0-10.5 24\"><path/></svg>"
        );
        assert_eq!(svg("<polygon points=\"1.0,2 3,4\"/>"), "<polygon points=\"1 2 3 4\"/>");
        assert_eq!(svg("<svg viewBox=\"5.0!5px\"><path/></svg>"), "<svg viewBox=\"5.0!5px\"><path/></svg>");
        assert_eq!(svg("<path d=\"M 100 100 L 300 100 L 200 100 z\"/>"), "<path d=\"M100 100H300 200z\"/>");
    }

    #[test]
    fn test_colors() {
        assert_eq!(svg("<path fill=\"#ffffff\"/>"), "<path fill=\"#fff\"/>");
        assert_eq!(svg("<path fill=\"white\"/>"), "<path fill=\"#fff\"/>");
        assert_eq!(svg("<path fill=\"#FF0000\"/>"), "<path fill=\"red\"/>");
        assert_eq!(svg("<path stroke=\"url(#UPPERCASE)\"/>"), "<path stroke=\"url(#UPPERCASE)\"/>");
        assert_eq!(svg("<stop stop-color=\"currentColor\"/>"), "<stop stop-color=\"currentColor\"/>");
    }

    #[test]
    fn test_style() {
        assert_eq!(svg("<style> <![CDATA[ x ]]> </style>"), "<style>x</style>");
        assert_eq!(svg("<style> <![CDATA[ <<<< ]]> </style>"), "<style>&lt;&lt;&lt;&lt;</style>");
        assert_eq!(svg("<style> <![CDATA[ <<<<< ]]> </style>"), "<style><![CDATA[ <<<<< ]]></style>");
        assert_eq!(svg("<style type=\"text/css\">x</style>"), "<style>x</style>");
        assert_eq!(full("<style> a > b { color : #ff0000 } </style>"), "<style>a>b{color:red}</style>");
        assert_eq!(
            full("<path style=\"fill: black; stroke: #ff0000;\"/>"),
            "<path style=\"fill:#000;stroke:red\"/>"
        );
        assert_eq!(
            full("<svg contentStyleType=\"text/json ; charset=iso-8859-1\"><style>{a : true}</style></svg>"),
            "<svg contentStyleType=\"text/json;charset=iso-8859-1\"><style>{a : true}</style></svg>"
        );
    }

    #[test]
    fn test_style_entities() {
        assert_eq!(full("<style> a &gt; b { fill : red } </style>"), "<style>a>b{fill:red}</style>");
        assert_eq!(full("<style>a>b{fill:red}</style>"), "<style>a>b{fill:red}</style>");
        assert_eq!(
            full("<style>p { content : \"&lt;&#38;\" }</style>"),
            "<style>p{content:\"&lt;&amp;\"}</style>"
        );
        assert_eq!(
            full("<style>p{content:\"&lt;&amp;\"}</style>"),
            "<style>p{content:\"&lt;&amp;\"}</style>"
        );
        let once = full("<svg><style><![CDATA[ @media x < y {} ]]></style></svg>");
        assert_eq!(full(&once), once);
    }

    #[test]
    fn test_errors() {
        let mut m = Minifier::new();
        m.add("image/svg+xml", Options::default());
        assert!(m.bytes("image/svg+xml", b"<line").is_err());
        assert!(m.bytes("image/svg+xml", b"<a b=\"").is_err());
    }
}
