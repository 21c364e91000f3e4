//! Display-width measurement of render output.
//!
//! Escape sequences occupy no cells, so they are skipped before asking
//! `unicode-width` for the column count:
//! - CSI: `ESC [` ... final byte (0x40-0x7E)
//! - OSC/DCS/PM/APC: `ESC ]`/`ESC P`/`ESC ^`/`ESC _` ... BEL or ST
//! - everything else: `ESC` + one byte

use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::foundation::geometry::Size;

const ESC: u8 = 0x1B;

/// Strip escape sequences, borrowing when there are none.
pub fn strip_escapes(s: &str) -> Cow<'_, str> {
    if !s.as_bytes().contains(&ESC) {
        return Cow::Borrowed(s);
    }

    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == ESC {
            i = skip_escape(s, i);
        } else {
            // ESC is ASCII, so slicing between escapes stays on char boundaries.
            let start = i;
            while i < bytes.len() && bytes[i] != ESC {
                i += 1;
            }
            out.push_str(&s[start..i]);
        }
    }
    Cow::Owned(out)
}

/// End of the escape sequence starting at `pos`; always a char boundary of `s`.
fn skip_escape(s: &str, pos: usize) -> usize {
    let bytes = s.as_bytes();
    let next = pos + 1;
    match bytes.get(next) {
        None => bytes.len(),
        Some(b'[') => skip_csi(bytes, next + 1),
        Some(b']' | b'P' | b'^' | b'_') => skip_string(bytes, next + 1),
        Some(_) => next + s[next..].chars().next().map_or(1, char::len_utf8),
    }
}

fn skip_csi(bytes: &[u8], pos: usize) -> usize {
    let mut i = pos;
    while i < bytes.len() {
        let b = bytes[i];
        if (0x40..=0x7E).contains(&b) {
            return i + 1;
        }
        if !(0x20..=0x7E).contains(&b) {
            return i;
        }
        i += 1;
    }
    bytes.len()
}

fn skip_string(bytes: &[u8], pos: usize) -> usize {
    let mut i = pos;
    while i < bytes.len() {
        match bytes[i] {
            0x07 => return i + 1,
            ESC if bytes.get(i + 1) == Some(&b'\\') => return i + 2,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Columns occupied by one line of output.
pub fn line_width(line: &str) -> usize {
    UnicodeWidthStr::width(strip_escapes(line).as_ref())
}

/// Columns occupied by a single character (0 for control characters).
pub fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

/// Measure multi-line output: widest line by number of lines.
///
/// Lines are separated by `\n` only; a trailing break starts an (empty) extra line.
pub fn measure(render: &str) -> Size {
    let mut width = 0usize;
    let mut height = 0usize;
    for line in render.split('\n') {
        width = width.max(line_width(line));
        height += 1;
    }
    Size::new(
        u32::try_from(width).unwrap_or(u32::MAX),
        u32::try_from(height).unwrap_or(u32::MAX),
    )
}

/// Fit `line` into exactly `width` columns: truncate by display width, then fill.
///
/// Escape sequences are copied through whole at zero width, including those past the
/// truncation point. A wide character that would straddle the boundary is replaced by fill.
pub fn fit_line(line: &str, width: usize, fill: char) -> String {
    let fill_width = char_width(fill).max(1);
    let mut out = String::with_capacity(line.len().max(width));
    let mut used = 0usize;
    let mut truncated = false;
    let mut i = 0;
    while let Some(c) = line[i..].chars().next() {
        if c == char::from(ESC) {
            let end = skip_escape(line, i);
            out.push_str(&line[i..end]);
            i = end;
            continue;
        }
        i += c.len_utf8();
        let w = char_width(c);
        if truncated || used + w > width {
            truncated = true;
            continue;
        }
        out.push(c);
        used += w;
    }
    while used + fill_width <= width {
        out.push(fill);
        used += fill_width;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/layout/measure.rs"]
mod tests;
