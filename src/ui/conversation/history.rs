//! Conversation history display component

use crate::events::MessageKind;
use crate::render::{self, SegmentRole, StyledLine};
use crate::store::{ConversationStore, Message};
use crate::ui::conversation::composer::{ACCENT, LINK_COLOR};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Read-only view of the conversation, rebuilt every frame
pub struct ConversationHistory<'a> {
    store: &'a ConversationStore,
    loading: bool,
    show_timestamps: bool,
    tick: u64,
}

impl<'a> ConversationHistory<'a> {
    pub fn new(store: &'a ConversationStore) -> Self {
        Self {
            store,
            loading: false,
            show_timestamps: true,
            tick: 0,
        }
    }

    /// Show the thinking indicator after the last message
    pub fn loading(mut self, loading: bool, tick: u64) -> Self {
        self.loading = loading;
        self.tick = tick;
        self
    }

    pub fn show_timestamps(mut self, show: bool) -> Self {
        self.show_timestamps = show;
        self
    }

    fn welcome_lines() -> Vec<Line<'static>> {
        vec![
            Line::from(vec![Span::styled(
                "Welcome to syuting.film AI",
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            )]),
            Line::from(vec![Span::raw("")]),
            Line::from(vec![Span::styled("Always here to help", Style::default().fg(Color::Gray))]),
            Line::from(vec![Span::raw("")]),
            Line::from(vec![Span::styled(
                "Type your message below. Enter sends, /help lists commands.",
                Style::default().fg(Color::DarkGray),
            )]),
        ]
    }

    /// Render a single message into lines
    pub fn message_lines(&self, message: &Message) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let mut header = format!("{} {}", message.kind.icon(), message.kind.display_name());
        if self.show_timestamps {
            header.push(' ');
            header.push_str(&message.timestamp.format("%H:%M:%S").to_string());
        }
        header.push(' ');
        header.push_str(&"─".repeat(20));
        lines.push(Line::from(vec![Span::styled(header, Style::default().fg(Color::DarkGray))]));

        let body = match message.kind {
            MessageKind::Assistant => render::layout(&render::render(&message.text)),
            MessageKind::User | MessageKind::Error => {
                render::layout(&render::RenderNode::PlainText(message.text.clone()))
            }
        };
        let base = content_style(message.kind);
        for styled in &body {
            let mut spans = vec![Span::raw("  ")];
            spans.extend(styled_spans(styled, base));
            lines.push(Line::from(spans));
        }

        lines
    }

    fn thinking_line(&self) -> Line<'static> {
        let dots = match self.tick % 4 {
            0 => ".",
            1 => "..",
            2 => "...",
            _ => "   ",
        };

        Line::from(vec![
            Span::styled("🤖 ", Style::default().fg(ACCENT)),
            Span::styled("Thinking", Style::default().fg(Color::Gray)),
            Span::styled(dots, Style::default().fg(ACCENT)),
        ])
    }
}

impl Widget for ConversationHistory<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("💬 syuting.film AI Assistant");

        let inner_area = block.inner(area);
        block.render(area, buf);

        let all_lines: Vec<Line<'static>> = if self.store.is_empty() && !self.loading {
            Self::welcome_lines()
        } else {
            let mut all_lines = Vec::new();
            for message in self.store.all() {
                all_lines.extend(self.message_lines(message));
                // spacing between messages
                all_lines.push(Line::from(vec![Span::raw("")]));
            }
            if self.loading {
                all_lines.push(self.thinking_line());
            }
            all_lines
        };

        let width = inner_area.width as usize;
        let wrapped: Vec<Line<'static>> = all_lines
            .into_iter()
            .flat_map(|line| wrap_line(line, width))
            .collect();

        // Keep the newest lines in view
        let height = inner_area.height as usize;
        let start = wrapped.len().saturating_sub(height);
        for (i, line) in wrapped[start..].iter().enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }
    }
}

/// Get content style based on message kind
fn content_style(kind: MessageKind) -> Style {
    match kind {
        MessageKind::User => Style::default().fg(ACCENT),
        MessageKind::Assistant => Style::default().fg(Color::White),
        MessageKind::Error => Style::default().fg(Color::Red),
    }
}

/// Map laid-out segments to ratatui spans
fn styled_spans(line: &StyledLine, base: Style) -> Vec<Span<'static>> {
    line.segments
        .iter()
        .map(|segment| {
            let style = match segment.role {
                SegmentRole::Indent | SegmentRole::Text => base,
                SegmentRole::Label => base.add_modifier(Modifier::BOLD),
                SegmentRole::Link => Style::default()
                    .fg(LINK_COLOR)
                    .add_modifier(Modifier::UNDERLINED),
                SegmentRole::LinkRef => Style::default().fg(Color::DarkGray),
            };
            // Drop the '\r' of CRLF line breaks.
            let text = segment.text.strip_suffix('\r').unwrap_or(segment.text.as_str());
            Span::styled(text.to_string(), style)
        })
        .collect()
}

/// Hard-wrap a line at `width` characters without touching whitespace
fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line];
    }

    let mut out = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut used = 0;

    for span in line.spans {
        let style = span.style;
        let mut chunk = String::new();
        for ch in span.content.chars() {
            if used == width {
                if !chunk.is_empty() {
                    current.push(Span::styled(std::mem::take(&mut chunk), style));
                }
                out.push(Line::from(std::mem::take(&mut current)));
                used = 0;
            }
            chunk.push(ch);
            used += 1;
        }
        if !chunk.is_empty() {
            current.push(Span::styled(chunk, style));
        }
    }

    out.push(Line::from(current));
    out
}
