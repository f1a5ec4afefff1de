use crate::LexerError;

/// Byte cursor shared by all lexers.
///
/// `start` marks the beginning of the token being scanned and `pos` the
/// current read position. `shift()` hands out `buf[start..pos]` as a
/// zero-copy view and moves `start` up to `pos`. The input is borrowed for
/// `'a`, so every view stays valid for as long as the input does.
#[derive(Debug, Clone)]
pub struct Input<'a> {
    buf: &'a [u8],
    pos: usize,
    start: usize,
}

impl<'a> Input<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0, start: 0 }
    }

    /// Byte at `pos + n`, or `0` past the end.
    ///
    /// A literal NUL in the input also reads as `0`; use `is_eof_at` when the
    /// difference matters.
    pub fn peek(&self, n: usize) -> u8 {
        self.buf.get(self.pos + n).copied().unwrap_or(0)
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn is_eof_at(&self, n: usize) -> bool {
        self.pos + n >= self.buf.len()
    }

    pub fn move_by(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }

    /// Move the read position back to `start + n`.
    pub fn rewind(&mut self, n: usize) {
        self.pos = (self.start + n).min(self.buf.len());
    }

    /// Move both the token start and the read position to `offset`.
    pub fn reset(&mut self, offset: usize) {
        self.pos = offset.min(self.buf.len());
        self.start = self.pos;
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Bytes of the token scanned so far.
    pub fn lexeme(&self) -> &'a [u8] {
        &self.buf[self.start..self.pos]
    }

    /// Bytes from the read position to the end.
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Finish the current token and return it.
    pub fn shift(&mut self) -> &'a [u8] {
        let b = &self.buf[self.start..self.pos];
        self.start = self.pos;
        b
    }

    /// Drop the bytes scanned so far without returning them.
    pub fn skip(&mut self) {
        self.start = self.pos;
    }

    /// Slice of the whole input.
    pub fn bytes(&self) -> &'a [u8] {
        self.buf
    }

    pub fn slice(&self, from: usize, to: usize) -> &'a [u8] {
        &self.buf[from.min(self.buf.len())..to.min(self.buf.len())]
    }

    /// Error located at the current read position.
    pub fn error(&self, message: impl Into<String>) -> LexerError {
        LexerError::new(self.buf, self.pos, message)
    }

    /// Error located at an arbitrary offset.
    pub fn error_at(&self, offset: usize, message: impl Into<String>) -> LexerError {
        LexerError::new(self.buf, offset, message)
    }

    /// Length in bytes of a UTF-8 encoded line separator (U+2028/U+2029) at `pos + n`, or 0.
    pub fn line_separator_len(&self, n: usize) -> usize {
        if self.peek(n) == 0xE2 && self.peek(n + 1) == 0x80 && matches!(self.peek(n + 2), 0xA8 | 0xA9)
        {
            3
        } else {
            0
        }
    }
}

const CONTEXT_WIDTH: usize = 60;

/// Line, column (in characters, 1-based) and a context snippet for `offset`.
pub fn position(source: &[u8], offset: usize) -> (usize, usize, String) {
    let offset = offset.min(source.len());
    let mut line = 1;
    let mut line_start = 0;
    let mut i = 0;
    while i < offset {
        let n = newline_len(source, i);
        if n > 0 {
            i += n;
            if i <= offset {
                line += 1;
                line_start = i;
            }
        } else {
            i += 1;
        }
    }

    let mut line_end = offset;
    while line_end < source.len() && newline_len(source, line_end) == 0 {
        line_end += 1;
    }

    let prefix = String::from_utf8_lossy(&source[line_start..offset]);
    let column = prefix.chars().count() + 1;
    let text: Vec<char> = String::from_utf8_lossy(&source[line_start..line_end])
        .chars()
        .map(|c| if c == '\t' { ' ' } else { c })
        .collect();

    // Long lines are cut to a window around the column.
    let mut caret = column - 1;
    let mut from = 0;
    let mut snippet = String::new();
    if text.len() > CONTEXT_WIDTH && caret > CONTEXT_WIDTH / 2 {
        from = (caret - CONTEXT_WIDTH / 2).min(text.len() - CONTEXT_WIDTH);
        snippet.push_str("...");
        caret = caret - from + 3;
    }
    let to = (from + CONTEXT_WIDTH).min(text.len());
    snippet.extend(&text[from..to]);
    if to < text.len() {
        snippet.push_str("...");
    }

    let context = format!("{:5}: {}\n{}^", line, snippet, " ".repeat(7 + caret));
    (line, column, context)
}

fn newline_len(b: &[u8], i: usize) -> usize {
    match b[i] {
        b'\n' => 1,
        b'\r' => {
            if b.get(i + 1) == Some(&b'\n') {
                2
            } else {
                1
            }
        }
        0xE2 if b.get(i + 1) == Some(&0x80) && matches!(b.get(i + 2), Some(0xA8 | 0xA9)) => 3,
        _ => 0,
    }
}
