//! Splice a pre-rendered surface (modal, toast stack) over a background frame.
//!
//! Output is always exactly `height` lines of exactly `width` columns, no
//! matter how large the background or surface is, so compositing the result
//! again keeps the same dimensions.

use ratatui::layout::Rect;

use crate::ansi;
use crate::theme::{paint, Tone};

/// How background lines are drawn around and under the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backdrop {
    /// Strip styling and paint the background muted.
    Dim,
    /// Leave the background untouched.
    Keep,
}

/// Top-left corner that centres a `mw × mh` surface in a `w × h` frame.
/// A surface larger than the frame is pinned to 0.
pub fn centered_origin(mw: u16, mh: u16, w: u16, h: u16) -> (u16, u16) {
    (w.saturating_sub(mw) / 2, h.saturating_sub(mh) / 2)
}

/// Width and height of a rendered block.
pub fn measure(block: &str) -> (u16, u16) {
    let (w, h) = block
        .split('\n')
        .fold((0usize, 0usize), |(w, h), line| (w.max(ansi::width(line)), h + 1));
    (clamp_u16(w), clamp_u16(h))
}

fn clamp_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Centre `modal` over a dimmed `background`.
pub fn overlay_modal(background: &str, modal: &str, width: u16, height: u16) -> String {
    let (mw, mh) = measure(modal);
    let (x, y) = centered_origin(mw, mh, width, height);
    overlay_at(background, modal, x, y, width, height, Backdrop::Dim)
}

/// Splice `surface` with its top-left corner at `(x, y)`.  Parts of the
/// surface falling outside the frame are clipped.
pub fn overlay_at(
    background: &str,
    surface: &str,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    backdrop: Backdrop,
) -> String {
    let w = usize::from(width);
    let x = usize::from(x);
    let y = usize::from(y);
    let bg: Vec<&str> = background.split('\n').collect();
    let top: Vec<&str> = surface.split('\n').collect();
    let sw = top.iter().map(|l| ansi::width(l)).max().unwrap_or(0);

    let mut out = Vec::with_capacity(usize::from(height));
    for row in 0..usize::from(height) {
        let raw = bg.get(row).copied().unwrap_or("");
        let base = match backdrop {
            Backdrop::Dim => paint(Tone::Muted, &ansi::strip(raw)),
            Backdrop::Keep => raw.to_string(),
        };

        let covered = row >= y && row - y < top.len() && x < w;
        if !covered {
            out.push(ansi::fit(&base, w));
            continue;
        }

        let piece_w = sw.min(w - x);
        let mut line = ansi::fit(&ansi::cut(&base, 0, x), x);
        line.push_str(&ansi::fit(top[row - y], piece_w));
        if x + piece_w < w {
            line.push_str(&ansi::cut(&base, x + piece_w, w));
        }
        out.push(ansi::fit(&line, w));
    }
    out.join("\n")
}

/// Lay pre-rendered blocks out inside `area`.  Each block's rectangle is
/// absolute; uncovered cells are blank.
pub fn compose(area: Rect, blocks: &[(Rect, String)]) -> String {
    let blank = vec![" ".repeat(usize::from(area.width)); usize::from(area.height)].join("\n");
    blocks.iter().fold(blank, |frame, (rect, block)| {
        if rect.width == 0 || rect.height == 0 {
            return frame;
        }
        overlay_at(
            &frame,
            block,
            rect.x.saturating_sub(area.x),
            rect.y.saturating_sub(area.y),
            area.width,
            area.height,
            Backdrop::Keep,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn plain(frame: &str) -> Vec<String> {
        frame.split('\n').map(ansi::strip).collect()
    }

    #[test]
    fn test_centered_origin() {
        assert_eq!(centered_origin(10, 4, 40, 10), (15, 3));
        assert_eq!(centered_origin(11, 5, 40, 10), (14, 2));
        assert_eq!(centered_origin(60, 30, 40, 10), (0, 0));
    }

    #[test]
    fn test_splice_keeps_sides() {
        let bg = "aaaaaaaaaa\nbbbbbbbbbb\ncccccccccc";
        let out = overlay_at(bg, "XY\nZW", 4, 1, 10, 3, Backdrop::Keep);
        assert_eq!(plain(&out), vec!["aaaaaaaaaa", "bbbbXYbbbb", "ccccZWcccc"]);
    }

    #[test]
    fn test_overlay_modal_centres() {
        let bg = vec!["..........".to_string(); 5].join("\n");
        let out = overlay_modal(&bg, "###\n###", 10, 5);
        assert_eq!(
            plain(&out),
            vec!["..........", "...###....", "...###....", "..........", ".........."]
        );
    }

    #[test]
    fn test_oversized_modal_is_clipped() {
        let bg = "abc\ndef";
        let modal = "0123456789\n0123456789\n0123456789\n0123456789";
        let out = overlay_modal(bg, modal, 5, 2);
        assert_eq!(plain(&out), vec!["01234", "01234"]);
    }

    #[test]
    fn test_short_background_is_padded() {
        let out = overlay_at("", "x", 9, 9, 4, 3, Backdrop::Keep);
        assert_eq!(plain(&out), vec!["    ", "    ", "    "]);
    }

    #[test]
    fn test_compose_side_by_side() {
        let area = Rect { x: 0, y: 1, width: 7, height: 2 };
        let left = Rect { x: 0, y: 1, width: 3, height: 2 };
        let right = Rect { x: 4, y: 1, width: 3, height: 2 };
        let out = compose(area, &[(left, "aaa\naaa".into()), (right, "bbb\nbbb".into())]);
        assert_eq!(plain(&out), vec!["aaa bbb", "aaa bbb"]);
        let hidden = Rect { width: 0, ..left };
        assert_eq!(plain(&compose(area, &[(hidden, "zzz".into())])), vec!["       ", "       "]);
    }

    #[test]
    fn test_wide_glyph_at_seam() {
        // The glyph straddling column 2 cannot be half drawn.
        let out = overlay_at("a日本b", "X", 2, 0, 6, 1, Backdrop::Keep);
        assert_eq!(ansi::width(&out), 6);
        assert!(ansi::strip(&out).contains('X'));
    }

    #[test]
    fn test_dim_strips_styles() {
        let bg = paint(Tone::Danger, "alert");
        let out = overlay_at(&bg, "", 0, 9, 5, 1, Backdrop::Dim);
        assert_eq!(ansi::strip(&out), "alert");
        assert_eq!(out, paint(Tone::Muted, "alert"));
    }

    proptest! {
        #[test]
        fn prop_nested_overlay_keeps_dimensions(
            bg in proptest::collection::vec("[a-z日 ]{0,30}", 0..12),
            a in proptest::collection::vec("[A-Z本]{0,20}", 1..8),
            b in proptest::collection::vec("[0-9]{0,50}", 1..15),
            w in 1u16..40,
            h in 1u16..12,
        ) {
            let once = overlay_modal(&bg.join("\n"), &a.join("\n"), w, h);
            let twice = overlay_modal(&once, &b.join("\n"), w, h);
            for frame in [&once, &twice] {
                let lines: Vec<&str> = frame.split('\n').collect();
                prop_assert_eq!(lines.len(), usize::from(h));
                for line in lines {
                    prop_assert_eq!(ansi::width(line), usize::from(w));
                }
            }
        }
    }
}
