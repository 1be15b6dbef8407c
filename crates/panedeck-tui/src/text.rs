//! Display-width helpers for plain (unstyled) text.
//!
//! Widths are counted per `char` with `unicode-width`; wide glyphs take two
//! columns, ambiguous ones one, control characters none.  For strings that
//! may carry escape sequences use the equivalents in [`crate::ansi`].

use unicode_width::UnicodeWidthChar;

use crate::ansi;

pub const ELLIPSIS: &str = "...";
pub const ELLIPSIS_WIDTH: usize = 3;
pub const TAB_STOP: usize = 8;

#[inline]
pub fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Number of terminal columns `s` occupies.
pub fn visual_width(s: &str) -> usize {
    s.chars().map(char_width).sum()
}

/// Fit `s` into `width` columns, replacing the tail with `...`.
///
/// Below three columns there is no room for the marker, so the string is cut
/// to `width` chars instead (which may still be wider than `width` columns
/// when it holds wide glyphs).
pub fn truncate_end(s: &str, width: usize) -> String {
    if width < ELLIPSIS_WIDTH {
        return s.chars().take(width).collect();
    }
    if visual_width(s) <= width {
        return s.to_string();
    }

    let target = width - ELLIPSIS_WIDTH;
    let mut used = 0;
    let mut end = 0;
    for (i, c) in s.char_indices() {
        let w = char_width(c);
        if used + w > target {
            break;
        }
        used += w;
        end = i + c.len_utf8();
    }
    format!("{}{}", &s[..end], ELLIPSIS)
}

/// Mirror of [`truncate_end`]: keeps the suffix and prefixes `...`.
pub fn truncate_start(s: &str, width: usize) -> String {
    if width < ELLIPSIS_WIDTH {
        let count = s.chars().count();
        return s.chars().skip(count.saturating_sub(width)).collect();
    }
    if visual_width(s) <= width {
        return s.to_string();
    }

    let target = width - ELLIPSIS_WIDTH;
    let mut used = 0;
    let mut start = s.len();
    for (i, c) in s.char_indices().rev() {
        let w = char_width(c);
        if used + w > target {
            break;
        }
        used += w;
        start = i;
    }
    format!("{}{}", ELLIPSIS, &s[start..])
}

/// Pad with spaces up to `width` columns.  Never shortens.
pub fn pad_right(s: &str, width: usize) -> String {
    let w = visual_width(s);
    if w >= width {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + width - w);
    out.push_str(s);
    out.extend(std::iter::repeat(' ').take(width - w));
    out
}

/// Replace tabs with spaces up to the next multiple of `tab_stop`.
/// Escape sequences do not advance the column.
pub fn expand_tabs(line: &str, tab_stop: usize) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let tab_stop = tab_stop.max(1);
    let mut out = String::with_capacity(line.len() + tab_stop);
    let mut col = 0;
    for piece in ansi::pieces(line) {
        match piece {
            ansi::Piece::Escape(seq) => out.push_str(seq),
            ansi::Piece::Char('\t') => {
                let n = tab_stop - (col % tab_stop);
                out.extend(std::iter::repeat(' ').take(n));
                col += n;
            }
            ansi::Piece::Char(c) => {
                out.push(c);
                col += char_width(c);
            }
        }
    }
    out
}

/// Expand tabs and clip every line of a block to `max_width` columns.
/// Used as the last step before a pane body leaves its renderer.
pub fn truncate_all_lines(content: &str, max_width: usize) -> String {
    content
        .split('\n')
        .map(|line| {
            let line = expand_tabs(line, TAB_STOP);
            if ansi::width(&line) > max_width {
                ansi::truncate(&line, max_width)
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Greedy word wrap for plain text.  Words longer than `width` are split.
pub fn wrap(s: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for raw in s.split('\n') {
        let mut line = String::new();
        let mut line_w = 0;
        for word in raw.split(' ') {
            let word_w = visual_width(word);
            let sep = usize::from(!line.is_empty());
            if line_w + sep + word_w <= width {
                if sep == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                line_w += sep + word_w;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_w = 0;
            }
            // Hard-split words that cannot fit on a line of their own.
            for c in word.chars() {
                let w = char_width(c);
                if line_w + w > width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_w = 0;
                }
                line.push(c);
                line_w += w;
            }
        }
        lines.push(line);
    }
    lines
}
