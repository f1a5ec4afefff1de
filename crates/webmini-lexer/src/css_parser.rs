//! CSS grammar parser.
//!
//! Groups the lexer's tokens into grammar units (rulesets, declarations,
//! at-rules) without building a tree. Each call to `next` returns one unit;
//! its component tokens are available through `values` until the next call.

use crate::css::{Lexer, TokenType};
use crate::LexerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarType {
    /// End of input or parse error; see `Parser::err`.
    Error,
    Comment,
    /// At-rule without a block, e.g. `@import "a.css";`.
    AtRule,
    BeginAtRule,
    EndAtRule,
    BeginRuleset,
    EndRuleset,
    Declaration,
    CustomProperty,
    /// Tokens that do not form a valid rule or declaration.
    Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenType,
    pub data: &'a [u8],
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenType, data: &'a [u8]) -> Self {
        Self { kind, data }
    }
}

/// Parser state, one entry per open block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Top level of a stylesheet.
    AtTop,
    /// Declaration list of a ruleset.
    InBlock,
    /// Declaration list of an at-rule such as `@font-face`.
    InAtRuleDeclarations,
    /// Rule list of an at-rule such as `@media`.
    InAtRuleBlock,
    /// Bare declaration list of a `style` attribute.
    Inline,
}

impl State {
    /// Whether the block holds declarations rather than rules.
    pub fn has_declarations(self) -> bool {
        matches!(self, State::InBlock | State::InAtRuleDeclarations | State::Inline)
    }
}

#[derive(Clone, Copy)]
struct Item<'a> {
    token: Token<'a>,
    offset: usize,
}

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    state: Vec<State>,
    pending: Option<Item<'a>>,
    values: Vec<Token<'a>>,
}

impl<'a> Parser<'a> {
    /// Parser for a stylesheet, or for a bare declaration list when `inline`.
    pub fn new(src: &'a [u8], inline: bool) -> Self {
        Self {
            lexer: Lexer::new(src),
            state: vec![if inline { State::Inline } else { State::AtTop }],
            pending: None,
            values: Vec::new(),
        }
    }

    pub fn err(&self) -> Option<&LexerError> {
        self.lexer.err()
    }

    /// Current state, the innermost open block.
    pub fn state(&self) -> State {
        self.state.last().copied().unwrap_or(State::AtTop)
    }

    /// Tokens of the unit returned by the last call to `next`.
    ///
    /// For at-rules this is the prelude, for rulesets the selector, for
    /// declarations the value with surrounding whitespace and comments removed.
    pub fn values(&self) -> &[Token<'a>] {
        &self.values
    }

    /// Next grammar unit. The returned bytes are the at-keyword, the property
    /// name, the comment, or the brace that opens or closes a block.
    pub fn next(&mut self) -> (GrammarType, &'a [u8]) {
        self.values.clear();
        loop {
            let item = self.read();
            let t = item.token;
            match t.kind {
                TokenType::Whitespace => continue,
                TokenType::Error => return self.close_block_at_eof(),
                TokenType::Comment => return (GrammarType::Comment, t.data),
                TokenType::Semicolon => continue,
                TokenType::AtKeyword => return self.parse_at_rule(t.data),
                TokenType::RightBrace => match self.state() {
                    State::AtTop | State::Inline => continue,
                    State::InBlock => {
                        self.state.pop();
                        return (GrammarType::EndRuleset, t.data);
                    }
                    State::InAtRuleBlock | State::InAtRuleDeclarations => {
                        self.state.pop();
                        return (GrammarType::EndAtRule, t.data);
                    }
                },
                TokenType::Cdo | TokenType::Cdc if self.state() == State::AtTop => {
                    self.values.push(t);
                    return (GrammarType::Token, t.data);
                }
                TokenType::Ident if self.state().has_declarations() => {
                    if let Some(unit) = self.try_declaration(item) {
                        return unit;
                    }
                    let rest = self.read();
                    return self.parse_qualified_rule(rest);
                }
                _ => return self.parse_qualified_rule(item),
            }
        }
    }

    // --- Units ---

    fn close_block_at_eof(&mut self) -> (GrammarType, &'a [u8]) {
        match self.state() {
            State::AtTop | State::Inline => (GrammarType::Error, b""),
            State::InBlock => {
                self.state.pop();
                (GrammarType::EndRuleset, b"")
            }
            State::InAtRuleBlock | State::InAtRuleDeclarations => {
                self.state.pop();
                (GrammarType::EndAtRule, b"")
            }
        }
    }

    fn parse_at_rule(&mut self, name: &'a [u8]) -> (GrammarType, &'a [u8]) {
        let mut depth = 0usize;
        loop {
            let item = self.read();
            let t = item.token;
            match t.kind {
                TokenType::Comment => continue,
                TokenType::LeftParenthesis | TokenType::LeftBracket | TokenType::Function => {
                    depth += 1
                }
                TokenType::RightParenthesis | TokenType::RightBracket => {
                    depth = depth.saturating_sub(1)
                }
                TokenType::Semicolon if depth == 0 => break,
                TokenType::LeftBrace => {
                    self.trim_values();
                    let inner = if has_declaration_block(name) {
                        State::InAtRuleDeclarations
                    } else {
                        State::InAtRuleBlock
                    };
                    self.state.push(inner);
                    return (GrammarType::BeginAtRule, name);
                }
                TokenType::RightBrace | TokenType::Error => {
                    self.pending = Some(item);
                    break;
                }
                _ => {}
            }
            self.values.push(t);
        }
        self.trim_values();
        (GrammarType::AtRule, name)
    }

    fn parse_qualified_rule(&mut self, first: Item<'a>) -> (GrammarType, &'a [u8]) {
        let mut item = first;
        loop {
            let t = item.token;
            match t.kind {
                TokenType::Comment => {}
                TokenType::LeftBrace => {
                    self.trim_values();
                    self.state.push(State::InBlock);
                    return (GrammarType::BeginRuleset, t.data);
                }
                TokenType::Semicolon if self.state().has_declarations() => break,
                TokenType::RightBrace | TokenType::Error => {
                    self.pending = Some(item);
                    break;
                }
                _ => self.values.push(t),
            }
            item = self.read();
        }
        self.trim_values();
        (GrammarType::Token, b"")
    }

    /// Parse `name: value` if a colon follows the identifier. Otherwise the
    /// tokens read so far are left in `values` as the start of a nested rule.
    fn try_declaration(&mut self, name: Item<'a>) -> Option<(GrammarType, &'a [u8])> {
        let mut skipped = Vec::new();
        let colon = loop {
            let item = self.read();
            match item.token.kind {
                TokenType::Whitespace | TokenType::Comment => skipped.push(item.token),
                TokenType::Colon => break item,
                _ => {
                    self.pending = Some(item);
                    self.values.push(name.token);
                    self.values.extend(skipped);
                    return None;
                }
            }
        };

        let custom = name.token.data.starts_with(b"--");
        let value_start = colon.offset + 1;
        let mut value_end = value_start;
        let mut depth = 0usize;
        loop {
            let item = self.read();
            let t = item.token;
            match t.kind {
                TokenType::LeftParenthesis
                | TokenType::LeftBracket
                | TokenType::LeftBrace
                | TokenType::Function => depth += 1,
                TokenType::RightParenthesis | TokenType::RightBracket => {
                    depth = depth.saturating_sub(1)
                }
                TokenType::RightBrace if depth > 0 => depth -= 1,
                TokenType::Semicolon if depth == 0 => break,
                TokenType::RightBrace | TokenType::Error => {
                    self.pending = Some(item);
                    break;
                }
                _ => {}
            }
            if t.kind != TokenType::Comment || custom {
                self.values.push(t);
            }
            value_end = item.offset + t.data.len();
        }

        if custom {
            let value = &self.lexer.bytes()[value_start..value_end.max(value_start)];
            let raw = crate::trim_whitespace(value);
            self.values.clear();
            self.values.push(Token::new(TokenType::CustomPropertyValue, raw));
            return Some((GrammarType::CustomProperty, name.token.data));
        }
        self.trim_values();
        Some((GrammarType::Declaration, name.token.data))
    }

    // --- Helpers ---

    fn read(&mut self) -> Item<'a> {
        if let Some(item) = self.pending.take() {
            return item;
        }
        let offset = self.lexer.offset();
        let (kind, data) = self.lexer.next();
        Item {
            token: Token::new(kind, data),
            offset,
        }
    }

    fn trim_values(&mut self) {
        while matches!(self.values.last(), Some(t) if t.kind == TokenType::Whitespace) {
            self.values.pop();
        }
        let lead = self
            .values
            .iter()
            .take_while(|t| t.kind == TokenType::Whitespace)
            .count();
        self.values.drain(..lead);
    }
}

/// At-rules whose block holds declarations rather than rules.
fn has_declaration_block(name: &[u8]) -> bool {
    let name = name.strip_prefix(b"@").unwrap_or(name);
    let name = strip_vendor_prefix(name);
    [
        &b"font-face"[..],
        b"page",
        b"viewport",
        b"counter-style",
        b"property",
        b"font-palette-values",
        b"top-left-corner",
        b"top-left",
        b"top-center",
        b"top-right",
        b"top-right-corner",
        b"bottom-left-corner",
        b"bottom-left",
        b"bottom-center",
        b"bottom-right",
        b"bottom-right-corner",
        b"left-top",
        b"left-middle",
        b"left-bottom",
        b"right-top",
        b"right-middle",
        b"right-bottom",
    ]
    .iter()
    .any(|n| crate::eq_lower(name, n))
}

fn strip_vendor_prefix(name: &[u8]) -> &[u8] {
    if name.first() == Some(&b'-') {
        if let Some(i) = name[1..].iter().position(|&c| c == b'-') {
            return &name[i + 2..];
        }
    }
    name
}
