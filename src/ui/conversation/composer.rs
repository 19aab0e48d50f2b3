use crate::ui::conversation::commands::{command_entries, parse_slash_command, CommandEntry, ParsedCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Brand colours shared with the history view
pub const ACCENT: Color = Color::Rgb(232, 101, 91);
pub const LINK_COLOR: Color = Color::Rgb(66, 193, 227);

/// Result returned when the user interacts with the conversation composer
#[derive(Debug, PartialEq)]
pub enum ConversationResult {
    Submitted(String),
    Command(ParsedCommand),
    None,
}

/// State for the text area within the composer
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    /// Cursor position in characters
    pub cursor_position: usize,
}

impl TextAreaState {
    fn byte_index(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// Conversation composer for user input
pub struct ConversationComposer {
    state: TextAreaState,
    placeholder: String,
    enabled: bool,
    command_entries: Vec<CommandEntry>,
    filtered_commands: Vec<CommandEntry>,
    show_command_palette: bool,
    selected_command: Option<usize>,
}

impl ConversationComposer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder: placeholder.into(),
            enabled: true,
            command_entries: command_entries(),
            filtered_commands: Vec::new(),
            show_command_palette: false,
            selected_command: None,
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationResult {
        if key.kind != KeyEventKind::Press {
            return ConversationResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if key.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) {
                    self.insert_char('\n');
                } else if self.show_command_palette && self.apply_selected_command() {
                    return ConversationResult::None;
                } else if !self.state.content.trim().is_empty() {
                    return self.take_submission();
                }
            }
            KeyCode::Up if self.show_command_palette => self.move_command_selection(-1),
            KeyCode::Down if self.show_command_palette => self.move_command_selection(1),
            KeyCode::Esc if self.show_command_palette => self.close_command_palette(),
            KeyCode::Tab if self.show_command_palette => {
                self.apply_selected_command();
            }
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return ConversationResult::None;
                }
                self.insert_char(c);
                self.sync_command_palette();
            }
            KeyCode::Backspace => {
                if self.backspace() {
                    self.sync_command_palette();
                }
            }
            KeyCode::Delete => {
                if self.delete() {
                    self.sync_command_palette();
                }
            }
            KeyCode::Left => {
                self.state.cursor_position = self.state.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.state.cursor_position < self.state.char_count() {
                    self.state.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                self.state.cursor_position = 0;
            }
            KeyCode::End => {
                self.state.cursor_position = self.state.char_count();
            }
            _ => {}
        }

        ConversationResult::None
    }

    /// Insert pasted text at the cursor
    pub fn paste(&mut self, text: &str) {
        for c in text.chars() {
            if c != '\r' {
                self.insert_char(c);
            }
        }
        self.sync_command_palette();
    }

    fn take_submission(&mut self) -> ConversationResult {
        let content = std::mem::take(&mut self.state.content);
        self.state.cursor_position = 0;
        self.close_command_palette();
        match parse_slash_command(&content) {
            Some(command) => ConversationResult::Command(command),
            None => ConversationResult::Submitted(content),
        }
    }

    /// Insert a character at the cursor position
    fn insert_char(&mut self, c: char) {
        let at = self.state.byte_index();
        self.state.content.insert(at, c);
        self.state.cursor_position += 1;
    }

    /// Delete character before cursor
    fn backspace(&mut self) -> bool {
        if self.state.cursor_position > 0 {
            self.state.cursor_position -= 1;
            let at = self.state.byte_index();
            self.state.content.remove(at);
            true
        } else {
            false
        }
    }

    /// Delete character at cursor
    fn delete(&mut self) -> bool {
        if self.state.cursor_position < self.state.char_count() {
            let at = self.state.byte_index();
            self.state.content.remove(at);
            true
        } else {
            false
        }
    }

    /// Open, refresh or close the palette to match the current input
    fn sync_command_palette(&mut self) {
        let content = &self.state.content;
        let is_command_prefix = content.starts_with('/') && !content.contains(char::is_whitespace);
        if is_command_prefix {
            if !self.show_command_palette {
                self.show_command_palette = true;
                self.selected_command = Some(0);
            }
            self.refresh_command_palette();
        } else if self.show_command_palette {
            self.close_command_palette();
        }
    }

    fn close_command_palette(&mut self) {
        self.show_command_palette = false;
        self.filtered_commands.clear();
        self.selected_command = None;
    }

    fn refresh_command_palette(&mut self) {
        let query = self.state.content.trim_start_matches('/').to_lowercase();
        self.filtered_commands = self
            .command_entries
            .iter()
            .filter(|entry| query.is_empty() || entry.keyword.starts_with(&query))
            .copied()
            .collect();

        if self.filtered_commands.is_empty() {
            self.selected_command = None;
        } else {
            let index = self.selected_command.unwrap_or(0);
            self.selected_command = Some(index.min(self.filtered_commands.len() - 1));
        }
    }

    fn move_command_selection(&mut self, delta: isize) {
        if self.filtered_commands.is_empty() {
            self.selected_command = None;
            return;
        }

        let current = self.selected_command.unwrap_or(0) as isize;
        let len = self.filtered_commands.len() as isize;
        let next = (current + delta).rem_euclid(len);
        self.selected_command = Some(next as usize);
    }

    fn apply_selected_command(&mut self) -> bool {
        let Some(entry) = self
            .selected_command
            .and_then(|index| self.filtered_commands.get(index))
            .copied()
        else {
            return false;
        };

        self.state.content = format!("/{} ", entry.keyword);
        self.state.cursor_position = self.state.char_count();
        self.close_command_palette();
        true
    }

    /// Typing is accepted but sending is held back while disabled
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_palette_open(&self) -> bool {
        self.show_command_palette
    }

    /// Get current content
    pub fn content(&self) -> &str {
        &self.state.content
    }

    /// Put text back after a refused submission
    pub fn restore(&mut self, content: String) {
        self.state.cursor_position = content.chars().count();
        self.state.content = content;
    }

    fn title(&self) -> &'static str {
        if self.enabled {
            "✉️ Message - Enter to send"
        } else {
            "⏳ Waiting for the assistant..."
        }
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.enabled {
            Style::default().fg(ACCENT)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(self.title())
            .border_style(border_style);

        let inner_area = block.inner(area);
        block.render(area, buf);

        if self.state.content.is_empty() {
            let placeholder_line = Line::from(vec![Span::styled(
                self.placeholder.as_str(),
                Style::default().fg(Color::DarkGray),
            )]);
            buf.set_line(inner_area.x, inner_area.y, &placeholder_line, inner_area.width);
        } else {
            let mut content = self.state.content.clone();
            content.insert(self.state.byte_index(), '▌');

            let text_style = if self.enabled {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };

            let lines: Vec<&str> = content.split('\n').collect();
            let visible = inner_area.height as usize;
            let start = lines.len().saturating_sub(visible);
            for (i, line_text) in lines[start..].iter().enumerate() {
                let line = Line::from(vec![Span::styled(*line_text, text_style)]);
                buf.set_line(inner_area.x, inner_area.y + i as u16, &line, inner_area.width);
            }
        }

        if self.show_command_palette && !self.filtered_commands.is_empty() {
            let palette_height = (self.filtered_commands.len().min(5) + 2) as u16;
            let palette_area = Rect {
                x: area.x,
                y: area.y.saturating_sub(palette_height),
                width: area.width,
                height: palette_height.min(area.y),
            };
            if palette_area.height < 3 {
                return;
            }

            let block = Block::default()
                .borders(Borders::ALL)
                .title("Commands")
                .border_style(Style::default().fg(LINK_COLOR));
            let inner = block.inner(palette_area);
            block.render(palette_area, buf);

            for (index, entry) in self.filtered_commands.iter().enumerate() {
                if index >= inner.height as usize {
                    break;
                }

                let style = if self.selected_command == Some(index) {
                    Style::default().fg(Color::Black).bg(LINK_COLOR).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };

                let line = Line::from(vec![
                    Span::styled(format!("/{}", entry.keyword), style),
                    Span::styled(" — ", Style::default().fg(Color::DarkGray)),
                    Span::styled(entry.description, Style::default().fg(Color::Gray)),
                ]);

                buf.set_line(inner.x, inner.y + index as u16, &line, inner.width);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::conversation::commands::SlashCommand;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(composer: &mut ConversationComposer, text: &str) {
        for c in text.chars() {
            composer.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_enter_submits_and_clears() {
        let mut composer = ConversationComposer::new("Type your message...");
        type_text(&mut composer, "hello");
        assert_eq!(
            composer.handle_key(key(KeyCode::Enter)),
            ConversationResult::Submitted("hello".to_string())
        );
        assert_eq!(composer.content(), "");
    }

    #[test]
    fn test_enter_on_blank_input_does_nothing() {
        let mut composer = ConversationComposer::new("");
        type_text(&mut composer, "   ");
        assert_eq!(composer.handle_key(key(KeyCode::Enter)), ConversationResult::None);
        assert_eq!(composer.content(), "   ");
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut composer = ConversationComposer::new("");
        type_text(&mut composer, "a");
        composer.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT));
        type_text(&mut composer, "b");
        assert_eq!(composer.content(), "a\nb");
    }

    #[test]
    fn test_multibyte_editing() {
        let mut composer = ConversationComposer::new("");
        type_text(&mut composer, "héllo");
        composer.handle_key(key(KeyCode::Left));
        composer.handle_key(key(KeyCode::Left));
        composer.handle_key(key(KeyCode::Left));
        composer.handle_key(key(KeyCode::Backspace));
        assert_eq!(composer.content(), "hllo");
        composer.handle_key(key(KeyCode::Home));
        composer.handle_key(key(KeyCode::Delete));
        assert_eq!(composer.content(), "llo");
    }

    #[test]
    fn test_slash_command_submission() {
        let mut composer = ConversationComposer::new("");
        type_text(&mut composer, "/open 2");
        match composer.handle_key(key(KeyCode::Enter)) {
            ConversationResult::Command(parsed) => {
                assert_eq!(parsed.command, SlashCommand::Open);
                assert_eq!(parsed.link_number(), Some(2));
            }
            other => panic!("expected command, got {other:?}"),
        }
    }

    #[test]
    fn test_palette_completion() {
        let mut composer = ConversationComposer::new("");
        type_text(&mut composer, "/he");
        assert!(composer.show_command_palette);
        composer.handle_key(key(KeyCode::Tab));
        assert_eq!(composer.content(), "/help ");
        assert!(!composer.show_command_palette);
    }

    #[test]
    fn test_paste_strips_carriage_returns() {
        let mut composer = ConversationComposer::new("");
        composer.paste("line one\r\nline two");
        assert_eq!(composer.content(), "line one\nline two");
    }
}
