//! SVG path data shortening.
//!
//! A path is parsed into segments, each with its absolute arguments. The
//! writer then picks, per segment, the shorter of the absolute and the
//! relative form, turns straight lines along an axis into `H`/`V`, and drops
//! command letters that the grammar repeats implicitly. Malformed path data
//! is returned unchanged.

use std::cmp::Ordering;

use crate::common::number;

/// A coordinate with the number of decimals it was written with, so that
/// differences can be rounded back to the input's resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coord {
    value: f64,
    decimals: usize,
}

impl Coord {
    const ZERO: Self = Self { value: 0.0, decimals: 0 };

    fn add(self, other: Self) -> Self {
        Self {
            value: self.value + other.value,
            decimals: self.decimals.max(other.decimals),
        }
    }

    fn sub(self, other: Self) -> Self {
        Self {
            value: self.value - other.value,
            decimals: self.decimals.max(other.decimals),
        }
    }

    fn format(self, precision: usize) -> Vec<u8> {
        let s = format!("{:.*}", self.decimals.min(20), self.value);
        number(s.as_bytes(), precision)
    }
}

#[derive(Debug, Clone)]
struct Segment {
    /// Uppercase command letter.
    cmd: u8,
    relative: bool,
    /// Arguments made absolute. Arc flags and radii are kept as written.
    args: Vec<Coord>,
}

/// Shorten path data. `precision` rounds every number to that many
/// significant digits, 0 keeps them exact.
pub fn shorten_path_data(b: &[u8], precision: usize) -> Vec<u8> {
    match parse(b, precision) {
        Some(segments) => write(&segments, precision),
        None => b.to_vec(),
    }
}

fn arg_count(cmd: u8) -> Option<usize> {
    match cmd {
        b'Z' => Some(0),
        b'H' | b'V' => Some(1),
        b'M' | b'L' | b'T' => Some(2),
        b'S' | b'Q' => Some(4),
        b'C' => Some(6),
        b'A' => Some(7),
        _ => None,
    }
}

/// Which arguments of a command are x or y coordinates (as opposed to radii,
/// angles and flags).
fn axis(cmd: u8, i: usize) -> Option<Axis> {
    match cmd {
        b'H' => Some(Axis::X),
        b'V' => Some(Axis::Y),
        b'A' => match i {
            5 => Some(Axis::X),
            6 => Some(Axis::Y),
            _ => None,
        },
        _ if i % 2 == 0 => Some(Axis::X),
        _ => Some(Axis::Y),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Axis {
    X,
    Y,
}

struct Scanner<'a> {
    b: &'a [u8],
    pos: usize,
}

impl Scanner<'_> {
    fn skip_separators(&mut self) {
        while let Some(&c) = self.b.get(self.pos) {
            if !matches!(c, b' ' | b'\t' | b'\n' | b'\r' | 0x0C | b',') {
                break;
            }
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.b.get(self.pos).copied()
    }

    /// A number: sign, digits, fraction, exponent.
    fn number(&mut self) -> Option<&[u8]> {
        let start = self.pos;
        let digits = |s: &mut Self| {
            let from = s.pos;
            while s.peek().is_some_and(|c| c.is_ascii_digit()) {
                s.pos += 1;
            }
            s.pos - from
        };
        if matches!(self.peek(), Some(b'+' | b'-')) {
            self.pos += 1;
        }
        let mut n = digits(self);
        if self.peek() == Some(b'.') {
            self.pos += 1;
            n += digits(self);
        }
        if n == 0 {
            self.pos = start;
            return None;
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let mark = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if digits(self) == 0 {
                self.pos = mark;
            }
        }
        Some(&self.b[start..self.pos])
    }

    /// An arc flag, which may be written without a separator after it.
    fn flag(&mut self) -> Option<&[u8]> {
        match self.peek() {
            Some(b'0' | b'1') => {
                self.pos += 1;
                Some(&self.b[self.pos - 1..self.pos])
            }
            _ => None,
        }
    }
}

fn coord(num: &[u8], precision: usize) -> Option<Coord> {
    let num = number(num, precision);
    let s = std::str::from_utf8(&num).ok()?;
    let value: f64 = s.parse().ok()?;
    let (mantissa, exp) = match s.find(['e', 'E']) {
        Some(i) => (&s[..i], s[i + 1..].parse::<i64>().ok()?),
        None => (s, 0),
    };
    let fraction = mantissa.find('.').map_or(0, |i| mantissa.len() - i - 1) as i64;
    Some(Coord {
        value,
        decimals: usize::try_from(fraction - exp).unwrap_or(0),
    })
}

fn parse(b: &[u8], precision: usize) -> Option<Vec<Segment>> {
    let mut s = Scanner { b, pos: 0 };
    let mut segments = Vec::new();
    let (mut cur, mut start) = ([Coord::ZERO; 2], [Coord::ZERO; 2]);
    let mut cmd = 0;
    let mut relative = false;

    loop {
        s.skip_separators();
        let Some(c) = s.peek() else {
            return Some(segments);
        };
        if c.is_ascii_alphabetic() {
            s.pos += 1;
            cmd = c.to_ascii_uppercase();
            relative = c.is_ascii_lowercase();
            arg_count(cmd)?;
        } else if cmd == 0 || cmd == b'Z' {
            return None;
        }

        let n = arg_count(cmd)?;
        let mut args = Vec::with_capacity(n);
        for i in 0..n {
            s.skip_separators();
            let raw = if cmd == b'A' && (i == 3 || i == 4) { s.flag()? } else { s.number()? };
            let mut c = coord(raw, precision)?;
            if relative {
                match axis(cmd, i) {
                    Some(Axis::X) => c = c.add(cur[0]),
                    Some(Axis::Y) => c = c.add(cur[1]),
                    None => {}
                }
            }
            args.push(c);
        }

        match cmd {
            b'Z' => cur = start,
            b'H' => cur[0] = args[0],
            b'V' => cur[1] = args[0],
            _ => cur = [args[n - 2], args[n - 1]],
        }
        if cmd == b'M' {
            start = cur;
        }
        segments.push(Segment { cmd, relative, args });
        // further coordinate pairs after a moveto are linetos
        if cmd == b'M' {
            cmd = b'L';
        }
    }
}

fn write(segments: &[Segment], precision: usize) -> Vec<u8> {
    let mut out = Vec::new();
    let (mut cur, mut start) = ([Coord::ZERO; 2], [Coord::ZERO; 2]);
    // last written command letter and whether the last number lacks a point
    let mut prev_cmd: Option<u8> = None;
    let mut prev_number: Option<bool> = None;

    for seg in segments {
        let mut cmd = seg.cmd;
        let mut args = seg.args.as_slice();
        if cmd == b'L' {
            if args[1].value == cur[1].value {
                cmd = b'H';
                args = &seg.args[..1];
            } else if args[0].value == cur[0].value {
                cmd = b'V';
                args = &seg.args[1..];
            }
        }

        let absolute: Vec<Vec<u8>> = args.iter().map(|a| a.format(precision)).collect();
        let relative: Vec<Vec<u8>> = args
            .iter()
            .enumerate()
            .map(|(i, &a)| match axis(cmd, i) {
                Some(Axis::X) => a.sub(cur[0]).format(precision),
                Some(Axis::Y) => a.sub(cur[1]).format(precision),
                None => a.format(precision),
            })
            .collect();

        let letters = [cmd, cmd.to_ascii_lowercase()];
        let rendered = [
            render(letters[0], &absolute, prev_cmd, prev_number),
            render(letters[1], &relative, prev_cmd, prev_number),
        ];
        let pick = match rendered[0].0.len().cmp(&rendered[1].0.len()) {
            Ordering::Less => 0,
            Ordering::Greater => 1,
            Ordering::Equal => usize::from(seg.relative),
        };
        let (bytes, last) = &rendered[pick];
        out.extend_from_slice(bytes);
        prev_cmd = Some(letters[pick]);
        prev_number = *last;

        match cmd {
            b'Z' => cur = start,
            b'H' => cur[0] = args[0],
            b'V' => cur[1] = args[0],
            _ => cur = [args[args.len() - 2], args[args.len() - 1]],
        }
        if cmd == b'M' {
            start = cur;
        }
    }
    out
}

/// Write one segment. Returns the bytes and, if it ends in a number,
/// whether a following `.` would need a space.
fn render(letter: u8, nums: &[Vec<u8>], prev_cmd: Option<u8>, prev_number: Option<bool>) -> (Vec<u8>, Option<bool>) {
    let implicit = match prev_cmd {
        Some(b'M') => letter == b'L',
        Some(b'm') => letter == b'l',
        Some(p) => p == letter && !matches!(letter, b'M' | b'm' | b'Z' | b'z'),
        None => false,
    };
    let mut out = Vec::new();
    let mut last = prev_number;
    if !implicit || nums.is_empty() {
        out.push(letter);
        last = None;
    }
    for num in nums {
        if let Some(needs_space_before_point) = last {
            let first = num.first().copied().unwrap_or(b'0');
            if first.is_ascii_digit() || (first == b'.' && needs_space_before_point) {
                out.push(b' ');
            }
        }
        out.extend_from_slice(num);
        last = Some(!num.iter().any(|&c| matches!(c, b'.' | b'e' | b'E')));
    }
    (out, last)
}
