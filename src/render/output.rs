//! Plain stdout output for the one-shot commands.

use super::lines::{SegmentRole, StyledLine};

/// How links are written when printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    /// OSC 8 escape so terminals make the `Link` label clickable.
    Osc8,
    /// `Link <url>` for pipes and files.
    Inline,
}

/// Join laid-out lines into printable text.
pub fn to_text(lines: &[StyledLine], links: LinkStyle) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for segment in &line.segments {
            match (segment.role, segment.link_url.as_deref(), links) {
                (SegmentRole::Link, Some(url), LinkStyle::Osc8) => {
                    out.push_str(&format!("\x1b]8;;{url}\x1b\\{}\x1b]8;;\x1b\\", segment.text));
                }
                (SegmentRole::Link, Some(url), LinkStyle::Inline) => {
                    out.push_str(&format!("{} <{url}>", segment.text));
                }
                // Reference numbers only matter for the interactive /open.
                (SegmentRole::LinkRef, _, _) => {}
                _ => out.push_str(&segment.text),
            }
        }
    }
    out
}
