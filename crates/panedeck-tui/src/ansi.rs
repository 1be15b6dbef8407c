//! Escape-sequence-aware string operations.
//!
//! Styled strings carry SGR sequences (`ESC [ ... m`) produced by
//! [`crate::theme::paint`] or captured from external panes.  Everything here
//! measures and slices by display column while passing escapes through
//! untouched, and never returns a string that leaves a style open.

use crate::text::char_width;

pub const RESET: &str = "\x1b[0m";

const ESC: char = '\x1b';

/// One lexical unit of a styled string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Escape(&'a str),
    Char(char),
}

/// Split `s` into escape sequences and printable chars.
pub fn pieces(s: &str) -> Pieces<'_> {
    Pieces { src: s, pos: 0 }
}

pub struct Pieces<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Iterator for Pieces<'a> {
    type Item = Piece<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = &self.src[self.pos..];
        let mut chars = rest.char_indices();
        let (_, first) = chars.next()?;
        if first != ESC {
            self.pos += first.len_utf8();
            return Some(Piece::Char(first));
        }

        let end = match chars.next() {
            // CSI: parameters and intermediates, then a final byte in @..~
            Some((_, '[')) => chars
                .find(|&(_, c)| ('@'..='~').contains(&c))
                .map(|(i, c)| i + c.len_utf8()),
            // OSC: terminated by BEL or ST (ESC \)
            Some((_, ']')) => {
                let mut end = None;
                let mut prev_esc = false;
                for (i, c) in chars {
                    if c == '\x07' || (prev_esc && c == '\\') {
                        end = Some(i + c.len_utf8());
                        break;
                    }
                    prev_esc = c == ESC;
                }
                end
            }
            Some((i, c)) => Some(i + c.len_utf8()),
            None => Some(first.len_utf8()),
        };
        // An unterminated sequence swallows the rest of the input.
        let end = end.unwrap_or(rest.len());
        self.pos += end;
        Some(Piece::Escape(&rest[..end]))
    }
}

fn is_sgr(seq: &str) -> bool {
    seq.starts_with("\x1b[") && seq.ends_with('m')
}

fn is_reset(seq: &str) -> bool {
    seq == "\x1b[0m" || seq == "\x1b[m"
}

/// Remove every escape sequence.
pub fn strip(s: &str) -> String {
    pieces(s)
        .filter_map(|p| match p {
            Piece::Char(c) => Some(c),
            Piece::Escape(_) => None,
        })
        .collect()
}

/// Display width, ignoring escape sequences.
pub fn width(s: &str) -> usize {
    pieces(s)
        .map(|p| match p {
            Piece::Char(c) => char_width(c),
            Piece::Escape(_) => 0,
        })
        .sum()
}

/// Columns `[start, end)` of `s`.
///
/// Styles opened before `start` are carried into the result so the slice
/// looks the same as it did in place.  A wide glyph is kept only when it fits
/// entirely inside the range.  Cutting past the end yields a shorter (or
/// empty) string.
pub fn cut(s: &str, start: usize, end: usize) -> String {
    if start >= end {
        return String::new();
    }
    let mut out = String::new();
    let mut col = 0;
    let mut styled = false;
    let mut any_char = false;

    for piece in pieces(s) {
        match piece {
            Piece::Escape(seq) => {
                if col >= end {
                    break;
                }
                if is_reset(seq) {
                    styled = false;
                } else if is_sgr(seq) {
                    styled = true;
                }
                out.push_str(seq);
            }
            Piece::Char(c) => {
                let w = char_width(c);
                if col >= end {
                    break;
                }
                if col >= start && col + w <= end {
                    out.push(c);
                    any_char = true;
                }
                col += w;
            }
        }
    }

    if !any_char {
        return String::new();
    }
    if styled {
        out.push_str(RESET);
    }
    out
}

/// Hard clip to `max` columns without an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if width(s) <= max {
        return s.to_string();
    }
    cut(s, 0, max)
}

/// Clip or pad with spaces so the result is exactly `w` columns wide
/// (a trailing wide glyph that does not fit is replaced by padding).
pub fn fit(s: &str, w: usize) -> String {
    let mut out = truncate(s, w);
    let cur = width(&out);
    if cur < w {
        out.extend(std::iter::repeat(' ').take(w - cur));
    }
    out
}

/// Wrap at exactly `max` columns, re-opening the active style on each
/// continuation line.
pub fn wrap_hard(s: &str, max: usize) -> Vec<String> {
    let max = max.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut active = String::new();
    let mut col = 0;

    for piece in pieces(s) {
        match piece {
            Piece::Escape(seq) => {
                if is_reset(seq) {
                    active.clear();
                } else if is_sgr(seq) {
                    active.push_str(seq);
                }
                line.push_str(seq);
            }
            Piece::Char(c) => {
                let w = char_width(c);
                if col + w > max && col > 0 {
                    if !active.is_empty() {
                        line.push_str(RESET);
                    }
                    lines.push(std::mem::replace(&mut line, active.clone()));
                    col = 0;
                }
                line.push(c);
                col += w;
            }
        }
    }
    if !active.is_empty() {
        line.push_str(RESET);
    }
    lines.push(line);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RED: &str = "\x1b[31m";

    #[test]
    fn test_pieces_split_csi_and_osc() {
        let s = "a\x1b[1;31mb\x1b]8;;http://x\x07c";
        let got: Vec<_> = pieces(s).collect();
        assert_eq!(
            got,
            vec![
                Piece::Char('a'),
                Piece::Escape("\x1b[1;31m"),
                Piece::Char('b'),
                Piece::Escape("\x1b]8;;http://x\x07"),
                Piece::Char('c'),
            ]
        );
    }

    #[test]
    fn test_unterminated_escape_is_swallowed() {
        assert_eq!(strip("ab\x1b[31"), "ab");
        assert_eq!(width("ab\x1b"), 2);
    }

    #[test]
    fn test_strip_and_width() {
        let s = format!("{RED}hello{RESET} 日本");
        assert_eq!(strip(&s), "hello 日本");
        assert_eq!(width(&s), 10);
    }

    #[test]
    fn test_cut_carries_style_and_terminates() {
        let s = format!("{RED}hello world{RESET}");
        let out = cut(&s, 6, 11);
        assert_eq!(strip(&out), "world");
        assert!(out.starts_with(RED));
        assert!(out.ends_with(RESET));
    }

    #[test]
    fn test_cut_unstyled_has_no_reset() {
        assert_eq!(cut("hello world", 0, 5), "hello");
        assert_eq!(cut("hello", 3, 100), "lo");
        assert_eq!(cut("hello", 10, 20), "");
        assert_eq!(cut("hello", 3, 3), "");
    }

    #[test]
    fn test_cut_never_splits_wide_glyph() {
        // "日" occupies columns 0-1; a cut at column 1 drops it.
        assert_eq!(cut("日本", 1, 4), "本");
        assert_eq!(cut("日本", 0, 3), "日");
    }

    #[test]
    fn test_fit_pads_and_clips() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdef", 4), "abcd");
        assert_eq!(width(&fit("日本語", 5)), 5);
    }

    #[test]
    fn test_wrap_hard_reopens_style() {
        let s = format!("{RED}abcdef{RESET}");
        let lines = wrap_hard(&s, 4);
        assert_eq!(lines.len(), 2);
        assert_eq!(strip(&lines[0]), "abcd");
        assert_eq!(strip(&lines[1]), "ef");
        assert!(lines[1].starts_with(RED));
        assert!(lines[0].ends_with(RESET));
    }

    proptest! {
        #[test]
        fn prop_cut_width_bounded(s in "\\PC{0,30}", a in 0usize..40, b in 0usize..40) {
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            let styled = format!("{RED}{s}{RESET}");
            let out = cut(&styled, start, end);
            prop_assert!(width(&out) <= end - start);
            // Every style that is opened gets closed.
            if out.contains(RED) {
                prop_assert!(out.ends_with(RESET));
            }
        }

        #[test]
        fn prop_fit_is_exact(s in "\\PC{0,30}", w in 0usize..40) {
            prop_assert_eq!(width(&fit(&s, w)), w);
        }
    }
}
