//! CSS minifier.
//!
//! Walks the grammar units of `webmini_lexer::css_parser` and rewrites
//! selectors, at-rule preludes and declaration values in a single pass.

use serde::{Deserialize, Serialize};
use webmini_lexer::css::{is_ident, split_number, TokenType};
use webmini_lexer::css_parser::{GrammarType, Parser, Token};
use webmini_lexer::eq_lower;

use crate::color;
use crate::common::{data_uri, number};
use crate::{Minifier, Minify, MinifyError, Params};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Significant digits kept in numbers, 0 keeps them all.
    pub precision: usize,
    /// Do not emit 4 and 8 digit hex colors.
    pub keep_css2: bool,
}

impl Minify for Options {
    fn minify(
        &self,
        m: &Minifier,
        out: &mut Vec<u8>,
        input: &[u8],
        params: &Params,
    ) -> Result<(), MinifyError> {
        let mut w = CssWriter {
            o: self,
            m,
            params,
            out,
            semicolon: false,
            at_rules: Vec::new(),
        };
        w.run(input)
    }
}

struct CssWriter<'w> {
    o: &'w Options,
    m: &'w Minifier,
    params: &'w Params,
    out: &'w mut Vec<u8>,
    /// A `;` is owed before the next unit in the same block.
    semicolon: bool,
    /// Names of the open at-rule blocks, lowercase and without vendor prefix.
    at_rules: Vec<Vec<u8>>,
}

impl CssWriter<'_> {
    fn run(&mut self, input: &[u8]) -> Result<(), MinifyError> {
        let mut p = Parser::new(input, self.params.inline);
        loop {
            let (gt, data) = p.next();
            match gt {
                GrammarType::Error => {
                    if let Some(err) = p.err() {
                        return Err(err.clone().into());
                    }
                    return Ok(());
                }
                GrammarType::Comment => {
                    if data.starts_with(b"/*!") {
                        self.separate();
                        self.out.extend_from_slice(data);
                    }
                }
                GrammarType::AtRule => {
                    self.separate();
                    self.write_at_rule(data, p.values());
                    self.semicolon = true;
                }
                GrammarType::BeginAtRule => {
                    self.separate();
                    self.write_at_rule(data, p.values());
                    self.out.push(b'{');
                    let name = data.strip_prefix(b"@").unwrap_or(data).to_ascii_lowercase();
                    self.at_rules.push(strip_vendor_prefix(&name).to_vec());
                }
                GrammarType::EndAtRule => {
                    self.semicolon = false;
                    self.at_rules.pop();
                    self.out.push(b'}');
                }
                GrammarType::BeginRuleset => {
                    self.separate();
                    self.write_selector(p.values());
                    self.out.push(b'{');
                }
                GrammarType::EndRuleset => {
                    self.semicolon = false;
                    self.out.push(b'}');
                }
                GrammarType::Declaration => {
                    self.separate();
                    self.write_declaration(data, p.values());
                    self.semicolon = true;
                }
                GrammarType::CustomProperty => {
                    self.separate();
                    self.out.extend_from_slice(data);
                    self.out.push(b':');
                    for t in p.values() {
                        self.out.extend_from_slice(t.data);
                        self.out.extend(unclosed_raw(t.data));
                    }
                    self.semicolon = true;
                }
                GrammarType::Token => {
                    if p.values().is_empty() {
                        continue;
                    }
                    self.separate();
                    let declarations = p.state().has_declarations();
                    if let Some((name, value)) = star_hack(p.values()).filter(|_| declarations) {
                        self.out.push(b'*');
                        self.write_declaration(name, value);
                        self.semicolon = true;
                        continue;
                    }
                    let text = join_collapsed(p.values());
                    self.out.extend_from_slice(&text);
                    self.semicolon = !matches!(p.values()[0].kind, TokenType::Cdo | TokenType::Cdc);
                }
            }
        }
    }

    fn separate(&mut self) {
        if self.semicolon {
            self.out.push(b';');
            self.semicolon = false;
        }
    }

    // --- At-rules ---

    fn write_at_rule(&mut self, name: &[u8], values: &[Token]) {
        let lower = name.to_ascii_lowercase();
        self.out.extend_from_slice(&lower);
        if values.is_empty() {
            return;
        }
        if lower == b"@charset" {
            self.out.push(b' ');
            self.out.extend_from_slice(&join_collapsed(values));
            return;
        }

        let mut rest = values;
        if lower == b"@import" {
            if let Some((url, n)) = import_url(values) {
                let quote = if url.contains(&b'"') { b'\'' } else { b'"' };
                self.out.push(b' ');
                self.out.push(quote);
                self.out.extend_from_slice(url);
                self.out.push(quote);
                rest = &values[n..];
            }
        }

        let mut prelude = Vec::new();
        let mut space = false;
        let mut prev = TokenType::Whitespace;
        for t in rest {
            match t.kind {
                TokenType::Whitespace | TokenType::Comment => {
                    space = true;
                    continue;
                }
                TokenType::Colon | TokenType::Comma | TokenType::RightParenthesis => {}
                _ if space
                    && !prelude.is_empty()
                    && !matches!(
                        prev,
                        TokenType::Colon
                            | TokenType::Comma
                            | TokenType::LeftParenthesis
                            | TokenType::Function
                    ) =>
                {
                    prelude.push(b' ')
                }
                _ => {}
            }
            space = false;
            match t.kind {
                TokenType::Number => prelude.extend(number(t.data, self.o.precision)),
                TokenType::Dimension | TokenType::Percentage => {
                    let (num, unit) = split_number(t.data);
                    prelude.extend(number(num, self.o.precision));
                    prelude.extend(unit.to_ascii_lowercase());
                }
                _ => prelude.extend_from_slice(t.data),
            }
            prev = t.kind;
        }
        if !prelude.is_empty() {
            self.out.push(b' ');
            self.out.extend(prelude);
        }
    }

    // --- Selectors ---

    fn write_selector(&mut self, values: &[Token]) {
        let keyframes = self
            .at_rules
            .last()
            .is_some_and(|name| name.as_slice() == b"keyframes");
        let mut space = false;
        let mut prev: Option<Token> = None;
        let mut brackets = 0usize;

        for &t in values {
            if matches!(t.kind, TokenType::Whitespace | TokenType::Comment) {
                space = prev.is_some();
                continue;
            }
            let type_pos = brackets == 0 && (space || is_type_position(prev));
            let text = self.selector_token(t, type_pos, brackets > 0, keyframes);
            if space {
                let after = prev.map_or(false, |p| is_combinator(&p) || opens(p.kind));
                let need = if brackets > 0 {
                    self.out.last().is_some_and(|&c| is_word_byte(c))
                        && text.first().is_some_and(|&c| is_word_byte(c))
                } else {
                    !after && !is_combinator(&t) && t.kind != TokenType::RightParenthesis
                };
                if need {
                    self.out.push(b' ');
                }
            }
            space = false;
            match t.kind {
                TokenType::LeftBracket => brackets += 1,
                TokenType::RightBracket => brackets = brackets.saturating_sub(1),
                _ => {}
            }
            self.out.extend_from_slice(&text);
            prev = Some(t);
        }
    }

    fn selector_token(
        &self,
        t: Token,
        type_pos: bool,
        in_brackets: bool,
        keyframes: bool,
    ) -> Vec<u8> {
        match t.kind {
            TokenType::Ident if keyframes && eq_lower(t.data, b"from") => b"0%".to_vec(),
            TokenType::Percentage if keyframes => {
                let (num, _) = split_number(t.data);
                let num = number(num, self.o.precision);
                if num == b"100" {
                    b"to".to_vec()
                } else {
                    [num.as_slice(), b"%"].concat()
                }
            }
            TokenType::Ident if type_pos => {
                let known = webmini_lexer::html::Hash::lookup(t.data).is_some();
                if known || !t.data.iter().any(u8::is_ascii_lowercase) {
                    t.data.to_ascii_lowercase()
                } else {
                    t.data.to_vec()
                }
            }
            TokenType::String if in_brackets => {
                let inner = &t.data[1..t.data.len().saturating_sub(1).max(1)];
                if is_ident(inner) && !inner.contains(&b'\\') {
                    inner.to_vec()
                } else {
                    t.data.to_vec()
                }
            }
            _ => t.data.to_vec(),
        }
    }

    // --- Declarations ---

    fn write_declaration(&mut self, name: &[u8], values: &[Token]) {
        let prop = name.to_ascii_lowercase();
        self.out.extend_from_slice(&prop);
        self.out.push(b':');
        let mut pieces = self.value_pieces(&prop, values);
        let base = strip_vendor_prefix(&prop).to_vec();
        shorten_property(&base, &mut pieces);
        self.out.extend(join_pieces(&pieces));
        self.out.extend(unclosed(values));
    }

    fn value_pieces(&self, prop: &[u8], tokens: &[Token]) -> Vec<Piece> {
        let base = strip_vendor_prefix(prop);
        let colors = is_color_property(base);
        let integers = is_integer_property(base);
        let mut pieces: Vec<Piece> = Vec::with_capacity(tokens.len());
        let mut depth = 0usize;
        let mut i = 0;
        while i < tokens.len() {
            let t = tokens[i];
            i += 1;
            let text = match t.kind {
                TokenType::Whitespace => {
                    if pieces.last().is_some_and(|p| p.kind != TokenType::Whitespace) {
                        pieces.push(Piece::new(TokenType::Whitespace, b" ".to_vec()));
                    }
                    continue;
                }
                TokenType::Comment => continue,
                TokenType::Number if integers => t.data.to_vec(),
                TokenType::Number => number(t.data, self.o.precision),
                TokenType::Dimension => self.dimension(t.data, depth == 0 && base != b"flex"),
                TokenType::Percentage => {
                    let (num, _) = split_number(t.data);
                    [number(num, self.o.precision).as_slice(), b"%"].concat()
                }
                TokenType::Hash => self.hash_color(t.data),
                TokenType::Ident => self.ident(prop, t.data, colors && depth == 0),
                TokenType::String => remove_line_continuations(t.data),
                TokenType::Url => self.url_token(t.data),
                TokenType::Delim if t.data == b"!" => {
                    let mut j = i;
                    while j < tokens.len() && tokens[j].kind == TokenType::Whitespace {
                        j += 1;
                    }
                    if j < tokens.len() && eq_lower(tokens[j].data, b"important") {
                        i = j + 1;
                        if pieces.last().is_some_and(|p| p.kind == TokenType::Whitespace) {
                            pieces.pop();
                        }
                        pieces.push(Piece::new(TokenType::Delim, b"!important".to_vec()));
                        continue;
                    }
                    t.data.to_vec()
                }
                TokenType::Function => {
                    let close = matching_paren(tokens, i);
                    let args = &tokens[i..close.min(tokens.len())];
                    let name = t.data[..t.data.len() - 1].to_ascii_lowercase();
                    if let Some(c) = self.fold_color_function(&name, args) {
                        i = (close + 1).min(tokens.len());
                        pieces.push(Piece::new(TokenType::Ident, c));
                        continue;
                    }
                    if name == b"url" {
                        if let Some(url) = self.url_function(args) {
                            i = (close + 1).min(tokens.len());
                            pieces.push(Piece::new(TokenType::Url, url));
                            continue;
                        }
                    }
                    depth += 1;
                    t.data.to_vec()
                }
                TokenType::LeftParenthesis => {
                    depth += 1;
                    t.data.to_vec()
                }
                TokenType::RightParenthesis => {
                    depth = depth.saturating_sub(1);
                    t.data.to_vec()
                }
                _ => t.data.to_vec(),
            };
            pieces.push(Piece::new(t.kind, text));
        }
        while pieces.last().is_some_and(|p| p.kind == TokenType::Whitespace) {
            pieces.pop();
        }
        pieces
    }

    fn dimension(&self, data: &[u8], top_level: bool) -> Vec<u8> {
        let (num, unit) = split_number(data);
        let num = number(num, self.o.precision);
        let unit = unit.to_ascii_lowercase();
        if num == b"0" && top_level && is_length_unit(&unit) {
            return num;
        }
        [num, unit].concat()
    }

    fn hash_color(&self, data: &[u8]) -> Vec<u8> {
        match color::parse_hex(&data[1..]) {
            Some([.., 0]) if !self.o.keep_css2 => color::shortest([0; 4]),
            Some(rgba) if rgba[3] == 255 || !self.o.keep_css2 => color::shortest(rgba),
            Some(_) => data.to_ascii_lowercase(),
            None => data.to_vec(),
        }
    }

    fn ident(&self, prop: &[u8], data: &[u8], colors: bool) -> Vec<u8> {
        match prop {
            b"font-weight" if eq_lower(data, b"normal") => return b"400".to_vec(),
            b"font-weight" | b"font" if eq_lower(data, b"bold") => return b"700".to_vec(),
            _ => {}
        }
        if colors && color::by_name(data).is_some() {
            return color::minify_color(data);
        }
        if colors && !self.o.keep_css2 && eq_lower(data, b"transparent") {
            return self.transparent();
        }
        data.to_vec()
    }

    fn transparent(&self) -> Vec<u8> {
        if self.o.keep_css2 {
            b"transparent".to_vec()
        } else {
            color::shortest([0; 4])
        }
    }

    /// `rgb()`, `rgba()`, `hsl()` and `hsla()` with literal arguments.
    fn fold_color_function(&self, name: &[u8], args: &[Token]) -> Option<Vec<u8>> {
        let hsl = match name {
            b"rgb" | b"rgba" => false,
            b"hsl" | b"hsla" => true,
            _ => return None,
        };
        let mut values = Vec::with_capacity(4);
        for t in args {
            match t.kind {
                TokenType::Whitespace | TokenType::Comma | TokenType::Comment => {}
                TokenType::Delim if t.data == b"/" => {}
                TokenType::Number => values.push((parse_f64(t.data)?, false)),
                TokenType::Percentage => values.push((parse_f64(split_number(t.data).0)?, true)),
                _ => return None,
            }
        }
        if values.len() != 3 && values.len() != 4 {
            return None;
        }

        let mut alpha = 255;
        if let Some(&(a, pct)) = values.get(3) {
            let a = if pct { a / 100.0 } else { a };
            if a <= 0.0 {
                return Some(self.transparent());
            }
            if a < 1.0 {
                if self.o.keep_css2 {
                    return None;
                }
                alpha = (a * 255.0).round() as u8;
            }
        }

        let channels = if hsl {
            let (h, h_pct) = values[0];
            let (s, s_pct) = values[1];
            let (l, l_pct) = values[2];
            if h_pct || !s_pct || !l_pct {
                return None;
            }
            hsl_to_rgb(h, s / 100.0, l / 100.0)
        } else {
            let mut rgb = [0.0; 3];
            for (c, &(v, pct)) in rgb.iter_mut().zip(&values[..3]) {
                *c = if pct { v * 2.55 } else { v };
            }
            rgb
        };

        let mut rgba = [0, 0, 0, alpha];
        for (dst, c) in rgba.iter_mut().zip(channels) {
            *dst = c.round().clamp(0.0, 255.0) as u8;
        }
        Some(color::shortest(rgba))
    }

    fn url_token(&self, data: &[u8]) -> Vec<u8> {
        let inner = webmini_lexer::trim_whitespace(&data[4..data.len().saturating_sub(1).max(4)]);
        let inner = if has_data_scheme(inner) {
            data_uri(self.m, inner, self.params)
        } else {
            inner.to_vec()
        };
        [&b"url("[..], &inner, b")"].concat()
    }

    /// `url("x")` without quotes when the URL allows it.
    fn url_function(&self, args: &[Token]) -> Option<Vec<u8>> {
        let mut strings = args.iter().filter(|t| t.kind != TokenType::Whitespace);
        let s = strings.next()?;
        if s.kind != TokenType::String || strings.next().is_some() || s.data.len() < 2 {
            return None;
        }
        let inner = remove_line_continuations(&s.data[1..s.data.len() - 1]);
        let url = if has_data_scheme(&inner) {
            data_uri(self.m, &inner, self.params)
        } else {
            inner
        };
        let safe = url
            .iter()
            .all(|&c| c > b' ' && !matches!(c, b'"' | b'\'' | b'(' | b')' | b'\\' | 0x7F));
        if safe {
            Some([&b"url("[..], &url, b")"].concat())
        } else {
            let quote = s.data[0];
            Some([&b"url("[..], &[quote], &url, &[quote], b")"].concat())
        }
    }
}

/// One output token of a declaration value.
#[derive(Debug, Clone, PartialEq)]
struct Piece {
    kind: TokenType,
    text: Vec<u8>,
}

impl Piece {
    fn new(kind: TokenType, text: Vec<u8>) -> Self {
        Self { kind, text }
    }

    fn is_space(&self) -> bool {
        self.kind == TokenType::Whitespace
    }
}

/// Write pieces, keeping a space only where it separates components.
fn join_pieces(pieces: &[Piece]) -> Vec<u8> {
    let mut out = Vec::new();
    for (i, p) in pieces.iter().enumerate() {
        if p.is_space() {
            let (Some(prev), Some(next)) = (i.checked_sub(1).map(|j| &pieces[j]), pieces.get(i + 1)) else {
                continue;
            };
            let tight = matches!(prev.kind, TokenType::Comma | TokenType::Function | TokenType::LeftParenthesis)
                || prev.text == b"/"
                || matches!(next.kind, TokenType::Comma | TokenType::RightParenthesis)
                || next.text == b"/"
                || next.text == b"!important";
            if !tight {
                out.push(b' ');
            }
            continue;
        }
        out.extend_from_slice(&p.text);
    }
    out
}

/// Property specific rewrites on the minified value.
fn shorten_property(prop: &[u8], pieces: &mut Vec<Piece>) {
    let important = pieces.last().is_some_and(|p| p.text == b"!important");
    if important {
        pieces.pop();
    }
    match prop {
        b"font-family" => {
            for p in pieces.iter_mut() {
                if p.kind == TokenType::String {
                    if let Some(name) = unquote_font_family(&p.text) {
                        p.kind = TokenType::Ident;
                        p.text = name;
                    }
                }
            }
        }
        b"filter" => shorten_alpha_filter(pieces),
        _ => {
            if let Some(mut values) = components(pieces).filter(|v| !v.is_empty()) {
                shorten_components(prop, &mut values);
                *pieces = spaced(values);
            }
        }
    }
    if important {
        pieces.push(Piece::new(TokenType::Delim, b"!important".to_vec()));
    }
}

/// Top-level components of a value with each function call collapsed into a
/// single piece and the `,` and `/` separators kept. `None` when the value
/// has bare blocks or components not separated by whitespace.
fn components(pieces: &[Piece]) -> Option<Vec<Piece>> {
    let mut values = Vec::new();
    let mut separated = true;
    let mut i = 0;
    while i < pieces.len() {
        let p = &pieces[i];
        i += 1;
        if p.is_space() || is_separator(p) {
            if !p.is_space() {
                values.push(p.clone());
            }
            separated = true;
            continue;
        }
        let block = matches!(
            p.kind,
            TokenType::LeftParenthesis
                | TokenType::RightParenthesis
                | TokenType::LeftBracket
                | TokenType::RightBracket
                | TokenType::LeftBrace
                | TokenType::RightBrace
        );
        if !separated || block {
            return None;
        }
        separated = false;
        if p.kind != TokenType::Function {
            values.push(p.clone());
            continue;
        }
        let start = i - 1;
        let mut depth = 1usize;
        while depth > 0 {
            let q = pieces.get(i)?;
            i += 1;
            match q.kind {
                TokenType::Function | TokenType::LeftParenthesis => depth += 1,
                TokenType::RightParenthesis => depth -= 1,
                _ => {}
            }
        }
        values.push(Piece::new(TokenType::Function, join_pieces(&pieces[start..i])));
    }
    Some(values)
}

/// Pieces for a list of components, with a space between neighbours.
fn spaced(values: Vec<Piece>) -> Vec<Piece> {
    let mut pieces = Vec::with_capacity(values.len() * 2);
    for v in values {
        if !pieces.is_empty() {
            pieces.push(Piece::new(TokenType::Whitespace, b" ".to_vec()));
        }
        let kind = if v.kind == TokenType::Function { TokenType::Ident } else { v.kind };
        pieces.push(Piece::new(kind, v.text));
    }
    pieces
}

fn shorten_components(prop: &[u8], v: &mut Vec<Piece>) {
    let flat = !v.iter().any(is_separator);
    match prop {
        b"margin" | b"padding" | b"border-width" | b"border-style" | b"border-color" | b"border-radius"
        | b"inset" | b"scroll-margin" | b"scroll-padding"
            if flat && (2..=4).contains(&v.len()) =>
        {
            if v.len() == 4 && v[1].text == v[3].text {
                v.pop();
            }
            if v.len() == 3 && v[0].text == v[2].text {
                v.pop();
            }
            if v.len() == 2 && v[0].text == v[1].text {
                v.pop();
            }
        }
        b"border" | b"border-top" | b"border-right" | b"border-bottom" | b"border-left" if flat => {
            drop_defaults(v, &["none", "currentcolor", "medium"], "0");
        }
        b"outline" if flat => drop_defaults(v, &["invert", "none", "medium"], "0"),
        b"column-rule" if flat => drop_defaults(v, &["currentcolor", "none", "medium"], "none"),
        b"text-decoration" if flat => drop_defaults(v, &["currentcolor", "none", "solid"], "none"),
        b"text-emphasis" if flat => drop_defaults(v, &["currentcolor", "none"], "none"),
        b"border-color" | b"border-top-color" | b"border-right-color" | b"border-bottom-color"
        | b"border-left-color" | b"column-rule-color" | b"text-decoration-color"
        | b"text-emphasis-color"
            if v.len() == 1 && is_keyword(&v[0], "currentcolor") =>
        {
            v[0] = keyword("initial");
        }
        b"box-shadow" if v.len() == 1 && is_keyword(&v[0], "initial") => v[0] = keyword("none"),
        b"box-shadow" => each_layer(v, |layer| {
            if (3..=4).contains(&layer.len()) && layer.iter().all(|p| p.text == b"0") {
                *layer = vec![zero(), zero()];
            }
        }),
        b"font" => shorten_font(v),
        b"background" => each_layer(v, shorten_background),
        b"background-position" => each_layer(v, shorten_position),
        b"background-size" => each_layer(v, |layer| {
            if layer.len() == 2 && is_keyword(&layer[1], "auto") {
                layer.pop();
            }
        }),
        b"background-repeat" => each_layer(v, shorten_repeat),
        b"flex" => shorten_flex(v),
        b"flex-basis" if v.len() == 1 => {
            if v[0].text == b"0%" {
                v[0] = zero();
            } else if is_keyword(&v[0], "initial") {
                v[0] = keyword("auto");
            }
        }
        b"flex-grow" | b"order" if v.len() == 1 && is_keyword(&v[0], "initial") => v[0] = zero(),
        b"flex-shrink" if v.len() == 1 && is_keyword(&v[0], "initial") => {
            v[0] = Piece::new(TokenType::Number, b"1".to_vec());
        }
        _ => {}
    }
}

/// Remove keywords a shorthand resets to anyway, `empty` when none remain.
fn drop_defaults(v: &mut Vec<Piece>, defaults: &[&str], empty: &str) {
    v.retain(|p| !defaults.iter().any(|d| is_keyword(p, d)));
    if v.is_empty() {
        v.push(keyword(empty));
    }
}

/// Apply `f` to every comma separated layer of a value.
fn each_layer(v: &mut Vec<Piece>, mut f: impl FnMut(&mut Vec<Piece>)) {
    let mut out = Vec::with_capacity(v.len());
    for (i, layer) in v.split(|p| p.kind == TokenType::Comma).enumerate() {
        if i > 0 {
            out.push(Piece::new(TokenType::Comma, b",".to_vec()));
        }
        let mut layer = layer.to_vec();
        if !layer.is_empty() {
            f(&mut layer);
        }
        out.extend(layer);
    }
    *v = out;
}

fn shorten_background(layer: &mut Vec<Piece>) {
    let size = |p: Option<&Piece>| {
        p.is_some_and(|p| {
            matches!(
                p.kind,
                TokenType::Number | TokenType::Dimension | TokenType::Percentage | TokenType::Function
            ) || is_keyword(p, "auto")
        })
    };
    let mut i = 0;
    while i < layer.len() {
        if is_slash(&layer[i]) {
            if size(layer.get(i + 1)) && layer.get(i + 2).is_some_and(|p| is_keyword(p, "auto")) {
                layer.remove(i + 2);
            }
            if layer.get(i + 1).is_some_and(|p| is_keyword(p, "auto")) && !size(layer.get(i + 2)) {
                layer.drain(i..i + 2);
                continue;
            }
        }
        i += 1;
    }

    let mut padding_box = None;
    let mut i = 0;
    while i < layer.len() {
        if is_slash(&layer[i]) {
            i += 1;
            while i < layer.len() && size(layer.get(i)) {
                i += 1;
            }
            continue;
        }
        if is_repeat_keyword(&layer[i]) && layer.get(i + 1).is_some_and(is_repeat_keyword) {
            let mut pair = layer[i..i + 2].to_vec();
            shorten_repeat(&mut pair);
            if pair.len() == 1 && is_keyword(&pair[0], "repeat") {
                pair.clear();
            }
            let n = pair.len();
            layer.splice(i..i + 2, pair);
            i += n;
            continue;
        }
        let p = &layer[i];
        if ["none", "scroll", "transparent", "repeat"].iter().any(|k| is_keyword(p, k)) || p.text == b"#0000" {
            layer.remove(i);
            continue;
        }
        if is_keyword(p, "padding-box") && padding_box.is_none() {
            padding_box = Some(i);
        } else if is_keyword(p, "border-box") {
            if let Some(j) = padding_box.take() {
                layer.remove(i);
                layer.remove(j);
                i -= 1;
                continue;
            }
        } else if is_position_start(p) {
            let mut j = i + 1;
            while j < layer.len() && is_position_start(&layer[j]) {
                j += 1;
            }
            let mut pos = layer[i..j].to_vec();
            shorten_position(&mut pos);
            let sized = layer.get(j).is_some_and(is_slash);
            if !sized && pos.len() == 2 && pos.iter().all(|p| p.text == b"0") {
                layer.drain(i..j);
            } else {
                let n = pos.len();
                layer.splice(i..j, pos);
                i += n;
            }
            continue;
        }
        i += 1;
    }
    if layer.is_empty() {
        *layer = vec![zero(), zero()];
    }
}

/// Rewrite a background position as offsets from the top left corner.
fn shorten_position(v: &mut Vec<Piece>) {
    if (3..=4).contains(&v.len()) && position_keyword(&v[0]).is_some() {
        if v.len() == 4 && is_zero(&v[3]) {
            v.pop();
        }
        if v.len() == 3 && is_zero(&v[1]) {
            v.remove(1);
        } else if v.len() == 3 && is_zero(&v[2]) && v[1].kind == TokenType::Ident {
            v.pop();
        }
    }
    if (3..=4).contains(&v.len()) && position_keyword(&v[0]).is_some() {
        let j = if v[2].kind == TokenType::Ident { 2 } else { 1 };
        let mut kws = [position_keyword(&v[0]), None, None];
        kws[j] = position_keyword(&v[j]);
        let mut offsets: [Option<Piece>; 2] = [None, None];
        for i in [j, 0] {
            let Some(kw) = kws[i] else { continue };
            let axis = usize::from(matches!(kw, "top" | "bottom"));
            if i + 1 < v.len() && i + 1 != j {
                if let (Some(n), "right" | "bottom") = (percentage(&v[i + 1]), kw) {
                    v[i + 1].text = format!("{}%", 100 - n).into_bytes();
                    kws[i] = Some(if axis == 0 { "left" } else { "top" });
                }
                if matches!(kws[i], Some("left" | "top")) {
                    offsets[axis] = Some(v[i + 1].clone());
                }
            } else {
                match kw {
                    "left" | "top" => offsets[axis] = Some(zero()),
                    "right" | "bottom" => {
                        offsets[axis] = Some(Piece::new(TokenType::Percentage, b"100%".to_vec()));
                        kws[i] = Some(if axis == 0 { "left" } else { "top" });
                    }
                    _ => {}
                }
            }
        }
        let mut horizontal_only = false;
        if kws.contains(&Some("center")) {
            if kws.contains(&Some("left")) {
                horizontal_only = true;
            } else if kws.contains(&Some("top")) {
                offsets[0] = Some(Piece::new(TokenType::Percentage, b"50%".to_vec()));
            }
        }
        match offsets {
            [Some(x), _] if horizontal_only => *v = vec![x],
            [Some(x), Some(y)] => *v = vec![x, y],
            _ => {}
        }
        return;
    }
    if v.len() > 2 {
        return;
    }
    if matches!(position_keyword(&v[0]), Some("top" | "bottom")) {
        if v.len() == 1 {
            return;
        }
        v.swap(0, 1);
    }
    let mut i = 0;
    while i < v.len() {
        match position_keyword(&v[i]) {
            Some("left" | "top") => v[i] = zero(),
            Some("right" | "bottom") => v[i] = Piece::new(TokenType::Percentage, b"100%".to_vec()),
            Some(_) if i == 0 => v[i] = Piece::new(TokenType::Percentage, b"50%".to_vec()),
            Some(_) => v.truncate(1),
            None if i == 1 && v[i].text == b"50%" => v.truncate(1),
            None if v[i].text == b"0%" => v[i] = zero(),
            None => {}
        }
        i += 1;
    }
}

fn shorten_repeat(v: &mut Vec<Piece>) {
    if v.len() != 2 || !v.iter().all(is_repeat_keyword) {
        return;
    }
    let (x, y) = (v[0].text.to_ascii_lowercase(), v[1].text.to_ascii_lowercase());
    match (x.as_slice(), y.as_slice()) {
        _ if x == y => *v = vec![keyword(&String::from_utf8_lossy(&x))],
        (b"repeat", b"no-repeat") => *v = vec![keyword("repeat-x")],
        (b"no-repeat", b"repeat") => *v = vec![keyword("repeat-y")],
        _ => {}
    }
}

/// Drop `normal` and `400` from the font shorthand, and a `normal` line height.
fn shorten_font(v: &mut Vec<Piece>) {
    if v.len() < 2 {
        return;
    }
    // Walk back over the family names to the font size or line height.
    let mut i = match v.iter().skip(2).position(|p| p.kind == TokenType::Comma) {
        Some(comma) => comma + 1,
        None => v.len() - 1,
    };
    i -= 1;
    while i > 0 {
        let p = &v[i];
        if is_slash(&v[i - 1]) || !matches!(p.kind, TokenType::Ident | TokenType::String) || is_font_size_keyword(p) {
            break;
        }
        i -= 1;
    }
    if i == 0 {
        return;
    }
    if i > 1 && is_slash(&v[i - 1]) {
        if is_keyword(&v[i], "normal") {
            v.drain(i - 1..=i);
        }
        i -= 2;
    }
    for k in (0..i).rev() {
        if is_keyword(&v[k], "normal") || v[k].text == b"400" {
            v.remove(k);
        }
    }
}

fn shorten_flex(v: &mut Vec<Piece>) {
    let number = |p: &Piece| p.kind == TokenType::Number;
    match v.len() {
        3 if number(&v[0]) && number(&v[1]) => {
            if is_keyword(&v[2], "auto") {
                let name = match (v[0].text.as_slice(), v[1].text.as_slice()) {
                    (b"0", b"1") => Some("initial"),
                    (b"1", b"1") => Some("auto"),
                    (b"0", b"0") => Some("none"),
                    _ => None,
                };
                if let Some(name) = name {
                    *v = vec![keyword(name)];
                }
            } else if is_zero(&v[2]) {
                v.pop();
                if v[1].text == b"1" {
                    v.pop();
                }
            }
        }
        2 if number(&v[0]) && !number(&v[1]) && is_zero(&v[1]) => {
            v.pop();
        }
        _ => {}
    }
}

/// `progid:DXImageTransform.Microsoft.Alpha(Opacity=80)` as `alpha(opacity=80)`.
fn shorten_alpha_filter(pieces: &mut Vec<Piece>) {
    const PROGID: &[u8] = b"progid:DXImageTransform.Microsoft.Alpha(Opacity=";
    if let [p] = pieces.as_mut_slice() {
        if p.kind == TokenType::String && p.text.len() > PROGID.len() + 2 {
            let quote = p.text[0];
            let inner = &p.text[1..p.text.len() - 1];
            if inner[..PROGID.len()].eq_ignore_ascii_case(PROGID) {
                let rest = inner[PROGID.len()..].to_vec();
                p.text = [&[quote][..], b"alpha(opacity=", &rest, &[quote]].concat();
            }
        }
        return;
    }
    let words: Vec<&Piece> = pieces.iter().filter(|p| !p.is_space()).collect();
    let expected: [&[u8]; 9] = [b"progid", b":", b"dximagetransform", b".", b"microsoft", b".", b"alpha(", b"opacity", b"="];
    let alpha = words.len() == 11
        && words.iter().zip(expected).all(|(p, e)| p.text.eq_ignore_ascii_case(e))
        && words[9].kind == TokenType::Number
        && words[10].kind == TokenType::RightParenthesis;
    if alpha {
        let text = [&b"alpha(opacity="[..], &words[9].text, b")"].concat();
        *pieces = vec![Piece::new(TokenType::Ident, text)];
    }
}

fn keyword(text: &str) -> Piece {
    Piece::new(TokenType::Ident, text.as_bytes().to_vec())
}

fn zero() -> Piece {
    Piece::new(TokenType::Number, b"0".to_vec())
}

fn is_keyword(p: &Piece, name: &str) -> bool {
    p.kind == TokenType::Ident && eq_lower(&p.text, name.as_bytes())
}

fn is_zero(p: &Piece) -> bool {
    matches!(p.kind, TokenType::Number | TokenType::Dimension | TokenType::Percentage)
        && split_number(&p.text).0 == b"0"
}

fn is_slash(p: &Piece) -> bool {
    p.kind == TokenType::Delim && p.text == b"/"
}

fn is_separator(p: &Piece) -> bool {
    p.kind == TokenType::Comma || is_slash(p)
}

/// Integer value of a percentage such as `25%`.
fn percentage(p: &Piece) -> Option<i64> {
    if p.kind != TokenType::Percentage {
        return None;
    }
    std::str::from_utf8(split_number(&p.text).0).ok()?.parse().ok()
}

fn position_keyword(p: &Piece) -> Option<&'static str> {
    if p.kind != TokenType::Ident {
        return None;
    }
    ["left", "right", "top", "bottom", "center"]
        .into_iter()
        .find(|k| eq_lower(&p.text, k.as_bytes()))
}

fn is_position_start(p: &Piece) -> bool {
    matches!(p.kind, TokenType::Number | TokenType::Dimension | TokenType::Percentage)
        || position_keyword(p).is_some()
}

fn is_repeat_keyword(p: &Piece) -> bool {
    ["repeat", "no-repeat", "space", "round"].iter().any(|k| is_keyword(p, k))
}

fn is_font_size_keyword(p: &Piece) -> bool {
    [
        "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large", "xxx-large", "larger",
        "smaller",
    ]
    .iter()
    .any(|k| is_keyword(p, k))
}

fn unquote_font_family(quoted: &[u8]) -> Option<Vec<u8>> {
    const KEYWORDS: [&[u8]; 19] = [
        b"serif", b"sans-serif", b"monospace", b"cursive", b"fantasy", b"system-ui", b"ui-serif",
        b"ui-sans-serif", b"ui-monospace", b"ui-rounded", b"emoji", b"math", b"fangsong",
        b"inherit", b"initial", b"unset", b"revert", b"revert-layer", b"default",
    ];
    if quoted.len() < 3 {
        return None;
    }
    let name = &quoted[1..quoted.len() - 1];
    let ok = name.split(|&c| c == b' ').all(|word| {
        is_ident(word) && !word.starts_with(b"--") && !KEYWORDS.iter().any(|k| eq_lower(word, k))
    });
    ok.then(|| name.to_vec())
}

fn join_collapsed(tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut space = false;
    for t in tokens {
        if matches!(t.kind, TokenType::Whitespace | TokenType::Comment) {
            space = !out.is_empty();
            continue;
        }
        if space {
            out.push(b' ');
            space = false;
        }
        out.extend_from_slice(t.data);
    }
    out
}

/// Closing brackets for the blocks a declaration value leaves open at the
/// end of the input.
fn unclosed(tokens: &[Token]) -> Vec<u8> {
    let mut open = Vec::new();
    for t in tokens {
        match t.kind {
            TokenType::Function | TokenType::LeftParenthesis => open.push(b')'),
            TokenType::LeftBracket => open.push(b']'),
            TokenType::LeftBrace => open.push(b'}'),
            TokenType::RightParenthesis | TokenType::RightBracket | TokenType::RightBrace => {
                if open.last() == t.data.first() {
                    open.pop();
                }
            }
            _ => {}
        }
    }
    open.reverse();
    open
}

fn unclosed_raw(raw: &[u8]) -> Vec<u8> {
    let mut lexer = webmini_lexer::css::Lexer::new(raw);
    let mut tokens = Vec::new();
    loop {
        let (kind, data) = lexer.next();
        if kind == TokenType::Error {
            break;
        }
        tokens.push(Token::new(kind, data));
    }
    unclosed(&tokens)
}

/// Property name and value of the `*property: value` hack for old IE.
fn star_hack<'a, 'b>(values: &'b [Token<'a>]) -> Option<(&'a [u8], &'b [Token<'a>])> {
    let [star, name, rest @ ..] = values else {
        return None;
    };
    if star.kind != TokenType::Delim || star.data != b"*" || name.kind != TokenType::Ident {
        return None;
    }
    let colon = rest.iter().position(|t| t.kind != TokenType::Whitespace)?;
    if rest[colon].kind != TokenType::Colon {
        return None;
    }
    let value = &rest[colon + 1..];
    let lead = value.iter().take_while(|t| t.kind == TokenType::Whitespace).count();
    Some((name.data, &value[lead..]))
}

/// URL of `@import url(x)` or `@import url("x")` and the number of tokens it spans.
fn import_url<'a>(values: &[Token<'a>]) -> Option<(&'a [u8], usize)> {
    let first = values.first()?;
    match first.kind {
        TokenType::Url => {
            let inner = webmini_lexer::trim_whitespace(&first.data[4..first.data.len().saturating_sub(1).max(4)]);
            (!inner.contains(&b'\'') || !inner.contains(&b'"')).then_some((inner, 1))
        }
        TokenType::Function if eq_lower(first.data, b"url(") => {
            let mut n = 1;
            let mut url = None;
            while n < values.len() {
                let t = values[n];
                n += 1;
                match t.kind {
                    TokenType::Whitespace => {}
                    TokenType::String if url.is_none() && t.data.len() >= 2 => {
                        url = Some(&t.data[1..t.data.len() - 1]);
                    }
                    TokenType::RightParenthesis => {
                        let url = url?;
                        return (!url.contains(&b'\\')).then_some((url, n));
                    }
                    _ => return None,
                }
            }
            None
        }
        _ => None,
    }
}

fn matching_paren(tokens: &[Token], from: usize) -> usize {
    let mut depth = 0usize;
    for (i, t) in tokens.iter().enumerate().skip(from) {
        match t.kind {
            TokenType::Function | TokenType::LeftParenthesis => depth += 1,
            TokenType::RightParenthesis => {
                if depth == 0 {
                    return i;
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    tokens.len()
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> [f64; 3] {
    fn hue(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    }
    let h = h.rem_euclid(360.0) / 360.0;
    let (s, l) = (s.clamp(0.0, 1.0), l.clamp(0.0, 1.0));
    let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    [
        hue(p, q, h + 1.0 / 3.0) * 255.0,
        hue(p, q, h) * 255.0,
        hue(p, q, h - 1.0 / 3.0) * 255.0,
    ]
}

fn parse_f64(b: &[u8]) -> Option<f64> {
    std::str::from_utf8(b).ok()?.parse().ok()
}

fn remove_line_continuations(s: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    let mut i = 0;
    while i < s.len() {
        if s[i] == b'\\' {
            match s.get(i + 1) {
                Some(b'\r') if s.get(i + 2) == Some(&b'\n') => {
                    i += 3;
                    continue;
                }
                Some(b'\n' | b'\r' | 0x0C) => {
                    i += 2;
                    continue;
                }
                Some(&c) => {
                    out.push(b'\\');
                    out.push(c);
                    i += 2;
                    continue;
                }
                None => {}
            }
        }
        out.push(s[i]);
        i += 1;
    }
    out
}

fn has_data_scheme(url: &[u8]) -> bool {
    url.len() >= 5 && eq_lower(&url[..5], b"data:")
}

fn is_length_unit(unit: &[u8]) -> bool {
    matches!(
        unit,
        b"px" | b"em" | b"rem" | b"ex" | b"ch" | b"vw" | b"vh" | b"vmin" | b"vmax" | b"cm" | b"mm"
            | b"q" | b"in" | b"pt" | b"pc"
    )
}

fn is_color_property(prop: &[u8]) -> bool {
    prop.ends_with(b"color")
        || matches!(
            prop,
            b"background"
                | b"border"
                | b"border-top"
                | b"border-right"
                | b"border-bottom"
                | b"border-left"
                | b"outline"
                | b"fill"
                | b"stroke"
                | b"box-shadow"
                | b"text-shadow"
                | b"column-rule"
                | b"text-decoration"
        )
}

/// Properties taking integers, whose values must not use exponent notation.
fn is_integer_property(prop: &[u8]) -> bool {
    matches!(
        prop,
        b"z-index"
            | b"order"
            | b"counter-reset"
            | b"counter-increment"
            | b"counter-set"
            | b"column-count"
            | b"orphans"
            | b"widows"
            | b"tab-size"
            | b"grid-row"
            | b"grid-column"
            | b"grid-row-start"
            | b"grid-row-end"
            | b"grid-column-start"
            | b"grid-column-end"
            | b"grid-area"
            | b"initial-letter"
            | b"line-clamp"
            | b"box-flex-group"
            | b"box-ordinal-group"
    )
}

fn strip_vendor_prefix(name: &[u8]) -> &[u8] {
    if name.first() == Some(&b'-') && name.get(1) != Some(&b'-') {
        if let Some(i) = name[1..].iter().position(|&c| c == b'-') {
            return &name[i + 2..];
        }
    }
    name
}

fn is_combinator(t: &Token) -> bool {
    matches!(t.kind, TokenType::Comma | TokenType::Column)
        || (t.kind == TokenType::Delim && matches!(t.data, b">" | b"+" | b"~"))
}

fn opens(kind: TokenType) -> bool {
    matches!(kind, TokenType::Function | TokenType::LeftParenthesis | TokenType::LeftBracket)
}

/// Whether an identifier in a selector names an element.
fn is_type_position(prev: Option<Token>) -> bool {
    match prev {
        None => true,
        Some(p) => {
            is_combinator(&p)
                || opens(p.kind)
                || !matches!(p.kind, TokenType::Delim | TokenType::Colon | TokenType::Ident | TokenType::Hash)
        }
    }
}

fn is_word_byte(c: u8) -> bool {
    webmini_lexer::css::is_name_char(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use pretty_assertions::assert_eq;

    fn minify_with(o: Options, src: &str, inline: bool) -> std::string::String {
        let mut m = Minifier::from_config(&Config::default());
        m.add("text/css", o);
        let params = Params {
            inline,
            ..Params::default()
        };
        let mut out = Vec::new();
        m.minify_with("text/css", &params, &mut out, src.as_bytes())
            .unwrap();
        std::string::String::from_utf8(out).unwrap()
    }

    fn css(src: &str) -> std::string::String {
        minify_with(Options::default(), src, false)
    }

    fn inline(src: &str) -> std::string::String {
        minify_with(Options::default(), src, true)
    }

    #[test]
    fn test_rulesets() {
        assert_eq!(css("a { color : red ; }"), "a{color:red}");
        assert_eq!(css("a{}"), "a{}");
        assert_eq!(css("a{x:1;y:2;}\nb{z:3}"), "a{x:1;y:2}b{z:3}");
        assert_eq!(css("a { b: 1"), "a{b:1}");
        assert_eq!(css("/* c */a{/* d */b:c}"), "a{b:c}");
        assert_eq!(css("/*! keep */a{b:c}"), "/*! keep */a{b:c}");
    }

    #[test]
    fn test_selectors() {
        assert_eq!(css("A > B + C ~ D , E F{x:y}"), "a>b+c~d,e f{x:y}");
        assert_eq!(css("DIV.Foo #Bar:HOVER{x:y}"), "div.Foo #Bar:HOVER{x:y}");
        assert_eq!(css("a :hover{x:y}"), "a :hover{x:y}");
        assert_eq!(css("input[ type = \"text\" ]{x:y}"), "input[type=text]{x:y}");
        assert_eq!(css("a[b=\"c d\"]{x:y}"), "a[b=\"c d\"]{x:y}");
        assert_eq!(css("a[b=\"c\" i]{x:y}"), "a[b=c i]{x:y}");
        assert_eq!(css("foreignObject{x:y}"), "foreignObject{x:y}");
        assert_eq!(css(":not( P , Span ){x:y}"), ":not(p,span){x:y}");
        assert_eq!(css("svg FOO{x:y}"), "svg foo{x:y}");
        assert_eq!(css("fooBar{x:y}"), "fooBar{x:y}");
    }

    #[test]
    fn test_values() {
        assert_eq!(css("a{margin:0px 0.50em 0 +1.0px}"), "a{margin:0 .5em 0 1px}");
        assert_eq!(css("a{width:calc( 100% - 10.0px )}"), "a{width:calc(100% - 10px)}");
        assert_eq!(css("a{width:calc(0px + 1em)}"), "a{width:calc(0px + 1em)}");
        assert_eq!(css("a{transition:opacity 0s}"), "a{transition:opacity 0s}");
        assert_eq!(css("a{font:12px / 1.5 Arial , serif}"), "a{font:12px/1.5 Arial,serif}");
        assert_eq!(css("a{color:red ! important}"), "a{color:red!important}");
        assert_eq!(css("a{content:\"a\\\nb\"}"), "a{content:\"ab\"}");
    }

    #[test]
    fn test_colors() {
        assert_eq!(css("a{color:#FF0000}"), "a{color:red}");
        assert_eq!(css("a{color:#000000}"), "a{color:#000}");
        assert_eq!(css("a{color:rgb(255,255,255)}"), "a{color:#fff}");
        assert_eq!(css("a{color:rgba(255,0,0,1)}"), "a{color:red}");
        assert_eq!(css("a{color:rgb(100%, 0%, 0%)}"), "a{color:red}");
        assert_eq!(css("a{color:rgba(0,0,0,0)}"), "a{color:#0000}");
        assert_eq!(css("a{color:rgba(0,0,0,.5)}"), "a{color:#00000080}");
        assert_eq!(css("a{color:rgba(0 100% 50% / 60%)}"), "a{color:#00ff8099}");
        assert_eq!(css("a{color:hsla(5,0%,10%,.75)}"), "a{color:#1a1a1abf}");
        assert_eq!(css("a{background-color:transparent}"), "a{background-color:#0000}");
        assert_eq!(css("a{color:#aabbcc00}"), "a{color:#0000}");
        assert_eq!(css("a{color:hsl(0, 100%, 50%)}"), "a{color:red}");
        assert_eq!(css("a{background:white url(x.png)}"), "a{background:#fff url(x.png)}");
        assert_eq!(css("a{font-family:White}"), "a{font-family:White}");
        assert_eq!(css("a{color:#ff000080}"), "a{color:#ff000080}");
        assert_eq!(
            minify_with(Options { keep_css2: true, ..Options::default() }, "a{color:#FF000088}", false),
            "a{color:#ff000088}"
        );
        let css2 = |src: &str| minify_with(Options { keep_css2: true, ..Options::default() }, src, false);
        assert_eq!(css2("a{color:rgba(0,0,0,.5)}"), "a{color:rgba(0,0,0,.5)}");
        assert_eq!(css2("a{color:rgba(0,0,0,0)}"), "a{color:transparent}");
        assert_eq!(css2("a{color:transparent}"), "a{color:transparent}");
    }

    #[test]
    fn test_integer_properties() {
        assert_eq!(css("a{z-index:1000}"), "a{z-index:1000}");
        assert_eq!(css("a{order:10000}"), "a{order:10000}");
        assert_eq!(css("a{counter-reset:x 1000}"), "a{counter-reset:x 1000}");
        assert_eq!(css("a{-webkit-box-ordinal-group:2000}"), "a{-webkit-box-ordinal-group:2000}");
    }

    #[test]
    fn test_star_hack() {
        assert_eq!(
            css(".clearfix { order:4; *zoom: 1px; color:red; }"),
            ".clearfix{order:4;*zoom:1px;color:red}"
        );
        assert_eq!(css("a{ *display : inline }"), "a{*display:inline}");
    }

    #[test]
    fn test_unclosed_blocks_at_eof() {
        assert_eq!(css("a{b:l("), "a{b:l()}");
        assert_eq!(css("a{b:l()}"), "a{b:l()}");
        assert_eq!(css("a{b:(}"), "a{b:(})}");
        assert_eq!(css("a{b:(})}"), "a{b:(})}");
        assert_eq!(css("a{b:x[1"), "a{b:x[1]}");
        assert_eq!(css("a{--x:f(a"), "a{--x:f(a)}");
    }

    #[test]
    fn test_background() {
        assert_eq!(css("a{background:none repeat scroll 0 0 transparent}"), "a{background:0 0}");
        assert_eq!(
            css("a{background:url(x.png) no-repeat left top}"),
            "a{background:url(x.png) no-repeat}"
        );
        assert_eq!(css("a{background:#fff url(x) padding-box border-box}"), "a{background:#fff url(x)}");
        assert_eq!(css("a{background:url(x) repeat no-repeat}"), "a{background:url(x) repeat-x}");
        assert_eq!(css("a{background:url(x) 0 0 / auto}"), "a{background:url(x)}");
        assert_eq!(css("a{background:url(x) center / 10px auto}"), "a{background:url(x) 50%/10px}");
        assert_eq!(css("a{background:url(a),none}"), "a{background:url(a),0 0}");
        assert_eq!(css("a{background-position:right bottom}"), "a{background-position:100% 100%}");
        assert_eq!(css("a{background-position:center}"), "a{background-position:50%}");
        assert_eq!(css("a{background-position:left 10% top 20px}"), "a{background-position:10% 20px}");
        assert_eq!(css("a{background-position:right 10% bottom 20%}"), "a{background-position:90% 80%}");
        assert_eq!(css("a{background-position:center top 10px}"), "a{background-position:50% 10px}");
        assert_eq!(css("a{background-position:left 0 top 0}"), "a{background-position:0 0}");
        assert_eq!(css("a{background-size:10px auto}"), "a{background-size:10px}");
        assert_eq!(css("a{background-repeat:no-repeat no-repeat}"), "a{background-repeat:no-repeat}");
        assert_eq!(css("a{background-repeat:no-repeat repeat}"), "a{background-repeat:repeat-y}");
    }

    #[test]
    fn test_font_and_flex() {
        assert_eq!(
            css("a{font:normal normal 400 12px/normal Arial,sans-serif}"),
            "a{font:12px Arial,sans-serif}"
        );
        assert_eq!(css("a{font:normal 12px Times New Roman}"), "a{font:12px Times New Roman}");
        assert_eq!(css("a{font:italic 400 1em/1.5 x}"), "a{font:italic 1em/1.5 x}");
        assert_eq!(css("a{flex:0 1 auto}"), "a{flex:initial}");
        assert_eq!(css("a{flex:1 1 auto}"), "a{flex:auto}");
        assert_eq!(css("a{flex:0 0 auto}"), "a{flex:none}");
        assert_eq!(css("a{flex:1 1 0px}"), "a{flex:1}");
        assert_eq!(css("a{flex:5 0 0%}"), "a{flex:5 0}");
        assert_eq!(css("a{flex:2 0px}"), "a{flex:2}");
        assert_eq!(css("a{flex-basis:0%}"), "a{flex-basis:0}");
        assert_eq!(css("a{flex-grow:initial}"), "a{flex-grow:0}");
    }

    #[test]
    fn test_shorthand_defaults() {
        assert_eq!(css("a{border:medium none currentcolor}"), "a{border:0}");
        assert_eq!(css("a{border:1px solid currentColor}"), "a{border:1px solid}");
        assert_eq!(css("a{outline:none}"), "a{outline:0}");
        assert_eq!(css("a{column-rule:medium none currentcolor}"), "a{column-rule:none}");
        assert_eq!(css("a{text-decoration:underline solid}"), "a{text-decoration:underline}");
        assert_eq!(css("a{text-decoration:none currentcolor}"), "a{text-decoration:none}");
        assert_eq!(css("a{border-top-color:currentColor}"), "a{border-top-color:initial}");
        assert_eq!(css("a{box-shadow:initial}"), "a{box-shadow:none}");
        assert_eq!(css("a{box-shadow:0 0 0,1px 1px red}"), "a{box-shadow:0 0,1px 1px red}");
        assert_eq!(
            css("a{filter:progid:DXImageTransform.Microsoft.Alpha(Opacity=80)}"),
            "a{filter:alpha(opacity=80)}"
        );
        assert_eq!(
            css("a{-ms-filter:\"progid:DXImageTransform.Microsoft.Alpha(Opacity=80)\"}"),
            "a{-ms-filter:\"alpha(opacity=80)\"}"
        );
    }

    #[test]
    fn test_property_rewrites() {
        assert_eq!(css("a{margin:1px 2px 1px 2px}"), "a{margin:1px 2px}");
        assert_eq!(css("a{padding:0 0 0 0}"), "a{padding:0}");
        assert_eq!(css("a{margin:1px 2px 3px 2px !important}"), "a{margin:1px 2px 3px!important}");
        assert_eq!(css("a{border:none}"), "a{border:0}");
        assert_eq!(css("a{box-shadow:0 0 0 0}"), "a{box-shadow:0 0}");
        assert_eq!(css("a{font-weight:bold}"), "a{font-weight:700}");
        assert_eq!(css("a{font-weight:normal}"), "a{font-weight:400}");
        assert_eq!(css("a{font:bold 1em x}"), "a{font:700 1em x}");
        assert_eq!(
            css("a{font-family:\"Times New Roman\",\"serif\",'Font 2'}"),
            "a{font-family:Times New Roman,\"serif\",'Font 2'}"
        );
        assert_eq!(css("a{COLOR:Red}"), "a{color:red}");
        assert_eq!(css("a{--Custom:  {a:b}  }"), "a{--Custom:{a:b}}");
    }

    #[test]
    fn test_urls() {
        assert_eq!(css("a{b:url( \"x.png\" )}"), "a{b:url(x.png)}");
        assert_eq!(css("a{b:url('x y.png')}"), "a{b:url('x y.png')}");
        assert_eq!(css("a{b:url(data:,======)}"), "a{b:url(data:;base64,PT09PT09)}");
    }

    #[test]
    fn test_at_rules() {
        assert_eq!(css("@import url(a.css) screen;"), "@import \"a.css\" screen");
        assert_eq!(css("@import url(\"a.css\");a{b:c}"), "@import \"a.css\";a{b:c}");
        assert_eq!(
            css("@MEDIA screen and ( max-width : 100.0px ) , print { a { b : c } }"),
            "@media screen and (max-width:100px),print{a{b:c}}"
        );
        assert_eq!(css("@charset \"utf-8\";a{b:c}"), "@charset \"utf-8\";a{b:c}");
        assert_eq!(css("@font-face { src : x ; }"), "@font-face{src:x}");
        assert_eq!(
            css("@keyframes k { from { a: b } 50.0% { a: c } 100% { a: d } }"),
            "@keyframes k{0%{a:b}50%{a:c}to{a:d}}"
        );
    }

    #[test]
    fn test_inline() {
        assert_eq!(inline(" color : RED ; margin : 0px ; "), "color:red;margin:0");
    }

    #[test]
    fn test_precision() {
        let o = Options {
            precision: 3,
            ..Options::default()
        };
        assert_eq!(minify_with(o, "a{width:33.33333%}", false), "a{width:33.3%}");
    }

    #[test]
    fn test_errors() {
        let m = Minifier::from_config(&Config::default());
        assert!(m.bytes("text/css", b"a{content:'x").is_err());
        assert!(m.bytes("text/css", b"/* x").is_err());
    }
}
