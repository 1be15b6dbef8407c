//! PaneChrome: standardized bordered pane with focus styling and badges.

use crate::ansi;
use crate::theme::{border_tone, paint, Tone};

/// A badge shown in the top-right of the pane header (e.g., "LIVE", "ERR").
pub struct Badge<'a> {
    pub text: &'a str,
    pub tone: Tone,
}

/// Draws a rounded box exactly `width` x `height` around `body`.
///
/// Body lines are clipped or padded to the inner width; missing rows are
/// blank, surplus rows are dropped.  Title is `[N] title` when a number key
/// is given.
pub fn pane_chrome(
    title: &str,
    number_key: Option<char>,
    focused: bool,
    badge: Option<Badge<'_>>,
    body: &str,
    width: u16,
    height: u16,
) -> String {
    let w = usize::from(width);
    let h = usize::from(height);
    if w < 2 || h < 2 {
        return vec![" ".repeat(w); h].join("\n");
    }
    let inner = w - 2;
    let tone = border_tone(focused);

    let mut head = String::new();
    if let Some(key) = number_key {
        head.push_str(&paint(Tone::KeyHint, &format!("[{key}] ")));
    }
    let title_tone = if focused { Tone::Title } else { Tone::Muted };
    head.push_str(&paint(title_tone, title));
    let head = ansi::truncate(&format!(" {head} "), inner.saturating_sub(1));

    let badge = badge
        .map(|b| paint(b.tone, &format!(" {} ", b.text)))
        .filter(|b| ansi::width(&head) + 1 + ansi::width(b) + 1 <= inner)
        .unwrap_or_default();

    let fill = inner
        .saturating_sub(1)
        .saturating_sub(ansi::width(&head))
        .saturating_sub(ansi::width(&badge))
        .saturating_sub(usize::from(!badge.is_empty()));
    let mut top = paint(tone, "╭─");
    top.push_str(&head);
    top.push_str(&paint(tone, &"─".repeat(fill)));
    top.push_str(&badge);
    if !badge.is_empty() {
        top.push_str(&paint(tone, "─"));
    }
    top.push_str(&paint(tone, "╮"));
    let top = ansi::fit(&top, w);

    let side = paint(tone, "│");
    let mut lines = Vec::with_capacity(h);
    lines.push(top);
    let mut body_lines = body.split('\n');
    for _ in 0..h - 2 {
        let row = body_lines.next().unwrap_or("");
        lines.push(format!("{side}{}{side}", ansi::fit(row, inner)));
    }
    lines.push(paint(tone, &format!("╰{}╯", "─".repeat(inner))));
    lines.join("\n")
}
