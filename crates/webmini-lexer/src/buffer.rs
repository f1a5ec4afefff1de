use std::collections::VecDeque;

/// A tokenizer that can feed a [`TokenBuffer`].
pub trait TokenSource {
    type Token: Clone;

    /// Scan the next token. Once the terminal token has been returned the
    /// source is not called again by the buffer.
    fn next_token(&mut self) -> Self::Token;

    /// Whether `token` ends the stream (end of input or error).
    fn is_terminal(token: &Self::Token) -> bool;
}

/// Lookahead buffer over a [`TokenSource`].
///
/// `peek(i)` scans only as far as needed and keeps the tokens queued, so
/// repeated peeks at the same position return the same token. Peeking at or
/// past the terminal token returns the terminal token.
pub struct TokenBuffer<S: TokenSource> {
    source: S,
    buf: VecDeque<S::Token>,
    terminal: Option<S::Token>,
}

impl<S: TokenSource> TokenBuffer<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            buf: VecDeque::new(),
            terminal: None,
        }
    }

    /// Fill the queue so that position `i` is buffered or the stream has ended.
    fn fill(&mut self, i: usize) {
        while self.buf.len() <= i && self.terminal.is_none() {
            let token = self.source.next_token();
            if S::is_terminal(&token) {
                self.terminal = Some(token.clone());
            }
            self.buf.push_back(token);
        }
    }

    /// Token `i` positions ahead of the cursor, without consuming it.
    pub fn peek(&mut self, i: usize) -> &S::Token {
        self.fill(i);
        let last = self.buf.len() - 1;
        &self.buf[i.min(last)]
    }

    /// Mutable access to a buffered token, used to rewrite or blank out
    /// tokens that have not been consumed yet.
    pub fn peek_mut(&mut self, i: usize) -> &mut S::Token {
        self.fill(i);
        let last = self.buf.len() - 1;
        &mut self.buf[i.min(last)]
    }

    /// Consume and return the front token.
    pub fn shift(&mut self) -> S::Token {
        self.fill(0);
        if self.buf.len() == 1 && S::is_terminal(&self.buf[0]) {
            // Keep the terminal token in place so later calls see it again.
            return self.buf[0].clone();
        }
        match self.buf.pop_front() {
            Some(token) => token,
            None => self.terminal.clone().unwrap_or_else(|| self.source.next_token()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
