//! HTML tokenizer.
//!
//! The lexer is lenient: unterminated comments, tags and raw-text elements
//! simply run to the end of the input and `err()` never reports an error.

use crate::buffer::TokenSource;
use crate::input::Input;
use crate::{is_whitespace, LexerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    /// End of input.
    Error,
    Comment,
    Doctype,
    /// `<name`; the tag name is in `text`.
    StartTag,
    /// `>` closing a start tag.
    StartTagClose,
    /// `/>` closing a start tag.
    StartTagVoid,
    EndTag,
    /// `name="value"` inside a start tag; the value with quotes is in `attr_val`.
    Attribute,
    Text,
    /// A whole `<svg>...</svg>` element.
    Svg,
    /// A whole `<math>...</math>` element.
    Math,
}

crate::hashes! {
    /// Known HTML tag and attribute names.
    pub enum Hash {
        A => "a",
        Abbr => "abbr",
        About => "about",
        Accept => "accept",
        AcceptCharset => "accept-charset",
        Action => "action",
        Address => "address",
        Align => "align",
        Allowfullscreen => "allowfullscreen",
        Alt => "alt",
        Area => "area",
        Article => "article",
        Aside => "aside",
        Async => "async",
        Audio => "audio",
        Autofocus => "autofocus",
        Autoplay => "autoplay",
        B => "b",
        Background => "background",
        Base => "base",
        Bdi => "bdi",
        Bdo => "bdo",
        Blockquote => "blockquote",
        Body => "body",
        Br => "br",
        Button => "button",
        Canvas => "canvas",
        Caption => "caption",
        Charset => "charset",
        Checked => "checked",
        Cite => "cite",
        Class => "class",
        Classid => "classid",
        Clear => "clear",
        Code => "code",
        Codebase => "codebase",
        Col => "col",
        Colgroup => "colgroup",
        Color => "color",
        Cols => "cols",
        Colspan => "colspan",
        Compact => "compact",
        Content => "content",
        Controls => "controls",
        Coords => "coords",
        Data => "data",
        Datalist => "datalist",
        Datatype => "datatype",
        Datetime => "datetime",
        Dd => "dd",
        Declare => "declare",
        Default => "default",
        Defer => "defer",
        Del => "del",
        Details => "details",
        Dfn => "dfn",
        Dialog => "dialog",
        Dir => "dir",
        Disabled => "disabled",
        Div => "div",
        Dl => "dl",
        Download => "download",
        Dt => "dt",
        Em => "em",
        Embed => "embed",
        Enctype => "enctype",
        Face => "face",
        Fieldset => "fieldset",
        Figcaption => "figcaption",
        Figure => "figure",
        Footer => "footer",
        For => "for",
        Form => "form",
        Formaction => "formaction",
        Formnovalidate => "formnovalidate",
        Frame => "frame",
        Frameborder => "frameborder",
        Frameset => "frameset",
        H1 => "h1",
        H2 => "h2",
        H3 => "h3",
        H4 => "h4",
        H5 => "h5",
        H6 => "h6",
        Head => "head",
        Header => "header",
        Headers => "headers",
        Height => "height",
        Hgroup => "hgroup",
        Hidden => "hidden",
        Hr => "hr",
        Href => "href",
        Hreflang => "hreflang",
        Html => "html",
        HttpEquiv => "http-equiv",
        I => "i",
        Icon => "icon",
        Id => "id",
        Iframe => "iframe",
        Img => "img",
        Inert => "inert",
        Inlist => "inlist",
        Input => "input",
        Ins => "ins",
        Ismap => "ismap",
        Itemscope => "itemscope",
        Kbd => "kbd",
        Label => "label",
        Lang => "lang",
        Language => "language",
        Legend => "legend",
        Li => "li",
        Link => "link",
        List => "list",
        Listing => "listing",
        Longdesc => "longdesc",
        Loop => "loop",
        Main => "main",
        Manifest => "manifest",
        Map => "map",
        Mark => "mark",
        Math => "math",
        Media => "media",
        Menu => "menu",
        Meta => "meta",
        Meter => "meter",
        Method => "method",
        Multiple => "multiple",
        Muted => "muted",
        Name => "name",
        Nav => "nav",
        Nohref => "nohref",
        Noembed => "noembed",
        Noframes => "noframes",
        Nomodule => "nomodule",
        Noresize => "noresize",
        Noscript => "noscript",
        Noshade => "noshade",
        Novalidate => "novalidate",
        Nowrap => "nowrap",
        Object => "object",
        Ol => "ol",
        Open => "open",
        Optgroup => "optgroup",
        Option => "option",
        Output => "output",
        P => "p",
        Param => "param",
        Picture => "picture",
        Ping => "ping",
        Plaintext => "plaintext",
        Playsinline => "playsinline",
        Poster => "poster",
        Pre => "pre",
        Prefix => "prefix",
        Profile => "profile",
        Progress => "progress",
        Property => "property",
        Q => "q",
        Rb => "rb",
        Readonly => "readonly",
        Rel => "rel",
        Required => "required",
        Resource => "resource",
        Rev => "rev",
        Reversed => "reversed",
        Rows => "rows",
        Rowspan => "rowspan",
        Rp => "rp",
        Rt => "rt",
        Rtc => "rtc",
        Ruby => "ruby",
        S => "s",
        Samp => "samp",
        Scope => "scope",
        Scoped => "scoped",
        Script => "script",
        Scrolling => "scrolling",
        Seamless => "seamless",
        Section => "section",
        Select => "select",
        Selected => "selected",
        Shape => "shape",
        Size => "size",
        Slot => "slot",
        Small => "small",
        Source => "source",
        Span => "span",
        Src => "src",
        Start => "start",
        Strong => "strong",
        Style => "style",
        Sub => "sub",
        Summary => "summary",
        Sup => "sup",
        Svg => "svg",
        Table => "table",
        Target => "target",
        Tbody => "tbody",
        Td => "td",
        Template => "template",
        Textarea => "textarea",
        Tfoot => "tfoot",
        Th => "th",
        Thead => "thead",
        Time => "time",
        Title => "title",
        Tr => "tr",
        Track => "track",
        Truespeed => "truespeed",
        Type => "type",
        Typeof => "typeof",
        U => "u",
        Ul => "ul",
        Usemap => "usemap",
        Value => "value",
        Valuetype => "valuetype",
        Var => "var",
        Video => "video",
        Vocab => "vocab",
        Wbr => "wbr",
        Width => "width",
        Xmlns => "xmlns",
        Xmp => "xmp",
    }
}

/// Raw-text tracking. Inside a raw-text element `<` does not start a tag
/// until the element's own end tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawState {
    Normal,
    /// Inside `<script>` or `<style>`. Scripts honour `<!--` escapes.
    InScriptOrStyle(Hash),
    /// Inside `<textarea>`, `<title>`, `<iframe>`, `<noembed>`, `<noframes>`,
    /// `<xmp>` or `<plaintext>`.
    InRawText(Hash),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenType,
    pub data: &'a [u8],
    /// Tag or attribute name, comment or doctype content.
    pub text: &'a [u8],
    pub attr_val: &'a [u8],
    pub hash: Option<Hash>,
    /// Holds a template action, which must be written as is.
    pub template: bool,
}

pub struct Lexer<'a> {
    z: Input<'a>,
    state: RawState,
    in_tag: bool,
    tag: Option<Hash>,
    text: &'a [u8],
    attr_val: &'a [u8],
    /// Opening and closing delimiters of template actions such as `{{ .X }}`.
    delims: Option<(&'a [u8], &'a [u8])>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            z: Input::new(src),
            state: RawState::Normal,
            in_tag: false,
            tag: None,
            text: b"",
            attr_val: b"",
            delims: None,
        }
    }

    /// Lexer that keeps template actions between `open` and `close` inside
    /// text, tag names and attributes.
    pub fn with_template_delims(src: &'a [u8], open: &'a [u8], close: &'a [u8]) -> Self {
        let mut l = Self::new(src);
        if !open.is_empty() && !close.is_empty() {
            l.delims = Some((open, close));
        }
        l
    }

    /// Whether `data` holds the start of a template action.
    pub fn has_template(&self, data: &[u8]) -> bool {
        self.delims
            .is_some_and(|(open, _)| data.windows(open.len()).any(|w| w == open))
    }

    /// Always `None`: HTML parsing recovers from every malformation.
    pub fn err(&self) -> Option<&LexerError> {
        None
    }

    pub fn state(&self) -> RawState {
        self.state
    }

    /// Name or content belonging to the last token.
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

        if self.in_tag {
            return self.next_in_tag();
        }
        if let RawState::InScriptOrStyle(tag) | RawState::InRawText(tag) = self.state {
            self.state = RawState::Normal;
            if self.consume_raw_text(tag) {
                return (TokenType::Text, self.z.shift());
            }
        }
        if self.z.is_eof() {
            return (TokenType::Error, b"");
        }

        if self.z.peek(0) == b'<' && !self.at_template() {
            let c = self.z.peek(1);
            if c.is_ascii_alphabetic() {
                return self.consume_start_tag();
            } else if c == b'/' {
                if self.z.peek(2).is_ascii_alphabetic() {
                    return self.consume_end_tag();
                } else if !self.z.is_eof_at(2) {
                    return self.consume_bogus_comment(2);
                }
            } else if c == b'!' {
                if self.z.rest().starts_with(b"<!--") {
                    return self.consume_comment();
                } else if self.z.rest().len() >= 9 && crate::eq_lower(&self.z.rest()[..9], b"<!doctype") {
                    return self.consume_doctype();
                }
                return self.consume_bogus_comment(2);
            } else if c == b'?' {
                return self.consume_bogus_comment(1);
            }
        }
        self.consume_text()
    }

    // --- Scanners ---

    fn at_template(&self) -> bool {
        self.delims.is_some_and(|(open, _)| self.z.rest().starts_with(open))
    }

    /// Move past the template action starting here, if any.
    fn skip_template(&mut self) -> bool {
        let Some((open, close)) = self.delims else {
            return false;
        };
        if !self.z.rest().starts_with(open) {
            return false;
        }
        self.z.move_by(open.len());
        while !self.z.is_eof() && !self.z.rest().starts_with(close) {
            self.z.move_by(1);
        }
        self.z.move_by(close.len());
        true
    }

    fn next_in_tag(&mut self) -> (TokenType, &'a [u8]) {
        loop {
            while is_whitespace(self.z.peek(0)) {
                self.z.move_by(1);
            }
            if self.z.is_eof() {
                self.in_tag = false;
                self.z.skip();
                return (TokenType::Error, b"");
            }
            match self.z.peek(0) {
                b'>' => {
                    self.z.skip();
                    self.z.move_by(1);
                    self.in_tag = false;
                    self.enter_raw_state();
                    return (TokenType::StartTagClose, self.z.shift());
                }
                b'/' if self.z.peek(1) == b'>' => {
                    self.z.skip();
                    self.z.move_by(2);
                    self.in_tag = false;
                    self.enter_raw_state();
                    return (TokenType::StartTagVoid, self.z.shift());
                }
                b'/' => self.z.move_by(1),
                _ => return self.consume_attribute(),
            }
        }
    }

    fn enter_raw_state(&mut self) {
        self.state = match self.tag {
            Some(tag @ (Hash::Script | Hash::Style)) => RawState::InScriptOrStyle(tag),
            Some(
                tag @ (Hash::Textarea
                | Hash::Title
                | Hash::Iframe
                | Hash::Noembed
                | Hash::Noframes
                | Hash::Xmp
                | Hash::Plaintext),
            ) => RawState::InRawText(tag),
            _ => RawState::Normal,
        };
    }

    fn consume_attribute(&mut self) -> (TokenType, &'a [u8]) {
        self.z.skip();
        let name_start = self.z.pos();
        // an attribute name may start with `=`
        if !self.skip_template() {
            self.z.move_by(1);
        }
        while !self.z.is_eof() {
            if self.skip_template() {
                continue;
            }
            let c = self.z.peek(0);
            if is_whitespace(c) || c == b'=' || c == b'>' || c == b'/' {
                break;
            }
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
                    if !self.skip_template() {
                        self.z.move_by(1);
                    }
                }
                self.z.move_by(1);
                while self.skip_template() {}
            } else {
                while !self.z.is_eof() && !is_whitespace(self.z.peek(0)) && self.z.peek(0) != b'>' {
                    if !self.skip_template() {
                        self.z.move_by(1);
                    }
                }
            }
            self.attr_val = self.z.slice(val_start, self.z.pos());
        }
        (TokenType::Attribute, self.z.shift())
    }

    fn consume_start_tag(&mut self) -> (TokenType, &'a [u8]) {
        self.z.move_by(1);
        let name_start = self.z.pos();
        while !self.z.is_eof() {
            if self.skip_template() {
                continue;
            }
            let c = self.z.peek(0);
            if is_whitespace(c) || c == b'/' || c == b'>' {
                break;
            }
            self.z.move_by(1);
        }
        self.text = self.z.slice(name_start, self.z.pos());
        self.tag = Hash::lookup(self.text);

        if let Some(tag @ (Hash::Svg | Hash::Math)) = self.tag {
            self.consume_foreign_element(tag);
            let tt = if tag == Hash::Svg {
                TokenType::Svg
            } else {
                TokenType::Math
            };
            return (tt, self.z.shift());
        }
        self.in_tag = true;
        (TokenType::StartTag, self.z.shift())
    }

    /// Consume up to and including the end tag that closes the svg or math
    /// element, counting nested elements of the same name.
    fn consume_foreign_element(&mut self, tag: Hash) {
        let name = tag.as_str().as_bytes();
        let mut depth = 1;
        while !self.z.is_eof() {
            if self.z.peek(0) == b'<' {
                let close = self.z.peek(1) == b'/';
                let offset = 1 + usize::from(close);
                if self.is_tag_name_at(offset, name) {
                    if close {
                        depth -= 1;
                        if depth == 0 {
                            while !self.z.is_eof() && self.z.peek(0) != b'>' {
                                self.z.move_by(1);
                            }
                            self.z.move_by(1);
                            return;
                        }
                    } else {
                        depth += 1;
                    }
                }
            }
            self.z.move_by(1);
        }
    }

    fn consume_end_tag(&mut self) -> (TokenType, &'a [u8]) {
        self.z.move_by(2);
        let name_start = self.z.pos();
        while !self.z.is_eof() {
            let c = self.z.peek(0);
            if is_whitespace(c) || c == b'/' || c == b'>' {
                break;
            }
            self.z.move_by(1);
        }
        self.text = self.z.slice(name_start, self.z.pos());
        while !self.z.is_eof() && self.z.peek(0) != b'>' {
            self.z.move_by(1);
        }
        self.z.move_by(1);
        (TokenType::EndTag, self.z.shift())
    }

    fn consume_comment(&mut self) -> (TokenType, &'a [u8]) {
        self.z.move_by(4);
        let inner = self.z.pos();
        loop {
            if self.z.is_eof() {
                self.text = self.z.slice(inner, self.z.pos());
                break;
            }
            if self.z.rest().starts_with(b"-->") {
                self.text = self.z.slice(inner, self.z.pos());
                self.z.move_by(3);
                break;
            }
            if self.z.rest().starts_with(b"--!>") {
                self.text = self.z.slice(inner, self.z.pos());
                self.z.move_by(4);
                break;
            }
            self.z.move_by(1);
        }
        (TokenType::Comment, self.z.shift())
    }

    /// `<!...>`, `<?...>` and `</...>` that are not real markup.
    fn consume_bogus_comment(&mut self, skip: usize) -> (TokenType, &'a [u8]) {
        self.z.move_by(skip);
        let inner = self.z.pos();
        while !self.z.is_eof() && self.z.peek(0) != b'>' {
            self.z.move_by(1);
        }
        self.text = self.z.slice(inner, self.z.pos());
        self.z.move_by(1);
        (TokenType::Comment, self.z.shift())
    }

    fn consume_doctype(&mut self) -> (TokenType, &'a [u8]) {
        self.z.move_by(9);
        let inner = self.z.pos();
        while !self.z.is_eof() && self.z.peek(0) != b'>' {
            self.z.move_by(1);
        }
        self.text = crate::trim_whitespace(self.z.slice(inner, self.z.pos()));
        self.z.move_by(1);
        (TokenType::Doctype, self.z.shift())
    }

    fn consume_text(&mut self) -> (TokenType, &'a [u8]) {
        // the first byte is text even when it is a `<`
        if !self.skip_template() {
            self.z.move_by(1);
        }
        while !self.z.is_eof() {
            if self.skip_template() {
                continue;
            }
            if self.z.peek(0) == b'<' {
                let c = self.z.peek(1);
                if c.is_ascii_alphabetic() || c == b'/' || c == b'!' || c == b'?' {
                    break;
                }
            }
            self.z.move_by(1);
        }
        (TokenType::Text, self.z.shift())
    }

    /// Consume raw text up to the end tag of `tag`. Returns whether any
    /// text was consumed.
    fn consume_raw_text(&mut self, tag: Hash) -> bool {
        let name = tag.as_str().as_bytes();
        let start = self.z.pos();
        if tag == Hash::Plaintext {
            self.z.move_by(self.z.rest().len());
            return self.z.pos() > start;
        }

        let script = tag == Hash::Script;
        let mut escaped = false;
        let mut double_escaped = false;
        while !self.z.is_eof() {
            let rest = self.z.rest();
            if script && !escaped && rest.starts_with(b"<!--") {
                escaped = true;
                self.z.move_by(4);
                continue;
            }
            if script && escaped && rest.starts_with(b"-->") {
                escaped = false;
                double_escaped = false;
                self.z.move_by(3);
                continue;
            }
            if rest.starts_with(b"</") && self.is_tag_name_at(2, name) {
                if !double_escaped {
                    break;
                }
                double_escaped = false;
                self.z.move_by(2 + name.len());
                continue;
            }
            if script && escaped && rest.starts_with(b"<") && self.is_tag_name_at(1, name) {
                double_escaped = true;
                self.z.move_by(1 + name.len());
                continue;
            }
            self.z.move_by(1);
        }
        self.z.pos() > start
    }

    /// Whether `name` follows at `pos + offset`, case-insensitively, and is
    /// terminated by whitespace, `/`, `>` or the end of input.
    fn is_tag_name_at(&self, offset: usize, name: &[u8]) -> bool {
        let rest = &self.z.rest()[offset.min(self.z.rest().len())..];
        if rest.len() < name.len() || !crate::eq_lower(&rest[..name.len()], name) {
            return false;
        }
        match rest.get(name.len()) {
            None => true,
            Some(&c) => is_whitespace(c) || c == b'/' || c == b'>',
        }
    }
}

impl<'a> TokenSource for Lexer<'a> {
    type Token = Token<'a>;

    fn next_token(&mut self) -> Token<'a> {
        let (kind, data) = self.next();
        let text = self.text();
        let hash = match kind {
            TokenType::StartTag
            | TokenType::EndTag
            | TokenType::Attribute
            | TokenType::Svg
            | TokenType::Math => Hash::lookup(text),
            _ => None,
        };
        Token {
            kind,
            data,
            text,
            attr_val: self.attr_val(),
            hash,
            template: kind != TokenType::Error && self.has_template(data),
        }
    }

    fn is_terminal(token: &Token<'a>) -> bool {
        token.kind == TokenType::Error
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
    fn test_tags_and_attributes() {
        let mut l = Lexer::new(b"<span id='x' hidden class=a>text</span>");
        assert_eq!(l.next(), (StartTag, &b"<span"[..]));
        assert_eq!(l.text(), b"span");
        assert_eq!(l.next(), (Attribute, &b"id='x'"[..]));
        assert_eq!((l.text(), l.attr_val()), (&b"id"[..], &b"'x'"[..]));
        assert_eq!(l.next(), (Attribute, &b"hidden"[..]));
        assert_eq!(l.attr_val(), b"");
        assert_eq!(l.next(), (Attribute, &b"class=a"[..]));
        assert_eq!(l.attr_val(), b"a");
        assert_eq!(l.next(), (StartTagClose, &b">"[..]));
        assert_eq!(l.next(), (Text, &b"text"[..]));
        assert_eq!(l.next(), (EndTag, &b"</span>"[..]));
        assert_eq!(l.text(), b"span");
        assert_eq!(l.next().0, Error);
    }

    #[test]
    fn test_void_and_doctype() {
        assert_eq!(
            tokens("<!DOCTYPE html><br/><!-- c -->"),
            vec![
                (Doctype, "<!DOCTYPE html>".into()),
                (StartTag, "<br".into()),
                (StartTagVoid, "/>".into()),
                (Comment, "<!-- c -->".into()),
            ]
        );
    }

    #[test]
    fn test_text_with_lone_brackets() {
        assert_eq!(tokens("a < b <3"), vec![(Text, "a < b <3".into())]);
    }

    #[test]
    fn test_raw_text() {
        assert_eq!(
            tokens("<style>a<b>c</style><textarea><p></TEXTAREA >"),
            vec![
                (StartTag, "<style".into()),
                (StartTagClose, ">".into()),
                (Text, "a<b>c".into()),
                (EndTag, "</style>".into()),
                (StartTag, "<textarea".into()),
                (StartTagClose, ">".into()),
                (Text, "<p>".into()),
                (EndTag, "</TEXTAREA >".into()),
            ]
        );
    }

    #[test]
    fn test_script_escapes() {
        assert_eq!(
            tokens("<script><!--var x='</script>';--></script>"),
            vec![
                (StartTag, "<script".into()),
                (StartTagClose, ">".into()),
                (Text, "<!--var x='".into()),
                (EndTag, "</script>".into()),
                (Text, "';-->".into()),
                (EndTag, "</script>".into()),
            ]
        );
        assert_eq!(
            tokens("<script><!--<script></script>--></script>"),
            vec![
                (StartTag, "<script".into()),
                (StartTagClose, ">".into()),
                (Text, "<!--<script></script>-->".into()),
                (EndTag, "</script>".into()),
            ]
        );
    }

    #[test]
    fn test_script_not_closed_by_prefix() {
        assert_eq!(
            kinds("<script></scripts></script>"),
            vec![StartTag, StartTagClose, Text, EndTag]
        );
    }

    #[test]
    fn test_unterminated_raw_text_is_tolerated() {
        let mut l = Lexer::new(b"<script>x");
        l.next();
        l.next();
        assert_eq!(l.state(), RawState::InScriptOrStyle(Hash::Script));
        assert_eq!(l.next(), (Text, &b"x"[..]));
        assert_eq!(l.next().0, Error);
        assert!(l.err().is_none());
    }

    #[test]
    fn test_svg_is_one_token() {
        assert_eq!(
            tokens("a<svg><svg></svg><path/></svg>b"),
            vec![
                (Text, "a".into()),
                (Svg, "<svg><svg></svg><path/></svg>".into()),
                (Text, "b".into()),
            ]
        );
    }

    #[test]
    fn test_bogus_comments() {
        assert_eq!(
            tokens("<?xml?></ x><!x>"),
            vec![
                (Comment, "<?xml?>".into()),
                (Comment, "</ x>".into()),
                (Comment, "<!x>".into()),
            ]
        );
    }

    #[test]
    fn test_unterminated_tag() {
        assert_eq!(
            tokens("<a href='x"),
            vec![(StartTag, "<a".into()), (Attribute, "href='x".into())]
        );
    }

    #[test]
    fn test_token_hash() {
        let mut l = Lexer::new(b"<DIV Class=x>");
        assert_eq!(l.next_token().hash, Some(Hash::Div));
        assert_eq!(l.next_token().hash, Some(Hash::Class));
        assert_eq!(l.next_token().hash, None);
    }

    #[test]
    fn test_template_delims() {
        let src = b"<tr{{if .X}} class=\"a\"{{end}} href={{ .Link }}>a {{ if a<b }}<b>{{ end }}";
        let mut l = Lexer::with_template_delims(src, b"{{", b"}}");
        let mut next = || {
            let t = l.next_token();
            (t.kind, std::string::String::from_utf8_lossy(t.data).into_owned(), t.template)
        };
        assert_eq!(next(), (StartTag, "<tr{{if .X}}".into(), true));
        assert_eq!(next(), (Attribute, "class=\"a\"{{end}}".into(), true));
        assert_eq!(next(), (Attribute, "href={{ .Link }}".into(), true));
        assert_eq!(next(), (StartTagClose, ">".into(), false));
        assert_eq!(next(), (Text, "a {{ if a<b }}".into(), true));
        assert_eq!(next(), (StartTag, "<b".into(), false));
        assert_eq!(next(), (StartTagClose, ">".into(), false));
        assert_eq!(next(), (Text, "{{ end }}".into(), true));
        assert_eq!(next().0, Error);

        let mut l = Lexer::with_template_delims(b"<div>\n<?php echo 1; ?>\n</div>", b"<?php", b"?>");
        l.next();
        l.next();
        assert_eq!(l.next(), (Text, &b"\n<?php echo 1; ?>\n"[..]));
        assert_eq!(l.next(), (EndTag, &b"</div>"[..]));
    }
}
