use crate::config::Config;
use crate::render;
use crate::session::{ChatSession, SubmitOutcome};
use crate::store::ConversationStore;
use crate::ui::conversation::composer::ConversationResult;
use crate::ui::conversation::{get_help_text, ConversationComposer, ConversationHistory, ParsedCommand, SlashCommand};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// Manages the conversation flow and UI components
pub struct ConversationManager {
    session: ChatSession,
    composer: ConversationComposer,
    notice: Option<String>,
    show_timestamps: bool,
    tick: u64,
}

impl ConversationManager {
    pub fn new(session: ChatSession, config: &Config) -> Self {
        Self {
            session,
            composer: ConversationComposer::new("Type your message..."),
            notice: None,
            show_timestamps: config.ui.show_timestamps,
            tick: 0,
        }
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return ConversationAction::Exit;
        }
        if key.code == KeyCode::Esc && !self.composer.is_palette_open() {
            return ConversationAction::Exit;
        }

        match self.composer.handle_key(key) {
            ConversationResult::Submitted(input) => {
                self.handle_input(input);
                ConversationAction::None
            }
            ConversationResult::Command(command) => self.handle_slash_command(command),
            ConversationResult::None => ConversationAction::None,
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.composer.paste(text);
    }

    /// Send user input unless a reply is still pending
    fn handle_input(&mut self, input: String) {
        match self.session.submit(&input) {
            SubmitOutcome::Sent => {
                self.notice = None;
                self.sync_composer();
            }
            SubmitOutcome::Empty => {}
            SubmitOutcome::Busy => {
                self.composer.restore(input);
                self.notice = Some("Still waiting for the previous reply".to_string());
            }
        }
    }

    /// Poll for replies and advance animations (called from main loop)
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        if self.session.process_replies() {
            self.sync_composer();
        }
    }

    fn sync_composer(&mut self) {
        self.composer.set_enabled(!self.session.is_loading());
    }

    /// Handle slash commands; all of them work while a reply is pending
    fn handle_slash_command(&mut self, command: ParsedCommand) -> ConversationAction {
        match command.command {
            SlashCommand::Bye => ConversationAction::Exit,
            SlashCommand::Help => {
                self.notice = Some(get_help_text());
                ConversationAction::None
            }
            SlashCommand::Open => {
                self.notice = Some(match command.link_number() {
                    Some(n) => match resolve_link(self.session.store(), n) {
                        Ok(url) => match open::that(&url) {
                            Ok(()) => format!("Opened link [{n}] in your browser"),
                            Err(e) => {
                                tracing::warn!(error = %e, %url, "failed to open link");
                                format!("Failed to open link: {e}")
                            }
                        },
                        Err(reason) => reason,
                    },
                    None => "Usage: /open <n>".to_string(),
                });
                ConversationAction::None
            }
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }
}

/// Target of link `n` (1-based) in the latest assistant reply
pub fn resolve_link(store: &ConversationStore, n: usize) -> Result<String, String> {
    let Some(reply) = store.last_assistant() else {
        return Err("No reply to open links from yet".to_string());
    };

    let node = render::render(&reply.text);
    let links = node.links();
    match n.checked_sub(1).and_then(|i| links.get(i)) {
        Some(link) => Ok(link.target.clone()),
        None if links.is_empty() => Err("The latest reply has no links".to_string()),
        None => Err(format!("No link [{n}], the latest reply has {}", links.len())),
    }
}

impl Widget for &ConversationManager {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Create layout: history takes most space, notice and composer at bottom
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),    // History
                Constraint::Length(1), // Notice
                Constraint::Length(5), // Composer
            ])
            .split(area);

        ConversationHistory::new(self.session.store())
            .loading(self.session.is_loading(), self.tick)
            .show_timestamps(self.show_timestamps)
            .render(chunks[0], buf);

        if let Some(notice) = &self.notice {
            let line = Line::from(vec![Span::styled(
                notice.as_str(),
                Style::default().fg(Color::Yellow),
            )]);
            buf.set_line(chunks[1].x, chunks[1].y, &line, chunks[1].width);
        }

        self.composer.render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MessageKind;
    use crate::store::Message;
    use crate::transport::{Transport, TransportError};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct EchoTransport;

    #[async_trait]
    impl Transport for EchoTransport {
        async fn send(&self, text: &str) -> Result<String, TransportError> {
            Ok(format!("echo: {text}"))
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_and_enter(manager: &mut ConversationManager, text: &str) -> ConversationAction {
        for c in text.chars() {
            manager.handle_key(key(KeyCode::Char(c)));
        }
        manager.handle_key(key(KeyCode::Enter))
    }

    fn manager() -> ConversationManager {
        ConversationManager::new(ChatSession::new(Arc::new(EchoTransport)), &Config::default())
    }

    #[test]
    fn test_resolve_link_from_latest_reply() {
        let mut store = ConversationStore::new();
        assert!(resolve_link(&store, 1).is_err());

        store.append(Message::assistant(r#"{"a": "https://old.example"}"#));
        store.append(Message::assistant(
            r#"{"a": "https://one.example", "b": ["https://two.example"]}"#,
        ));
        store.append(Message::user("thanks"));

        assert_eq!(resolve_link(&store, 1).unwrap(), "https://one.example");
        assert_eq!(resolve_link(&store, 2).unwrap(), "https://two.example");
        assert!(resolve_link(&store, 3).unwrap_err().contains("has 2"));
        assert!(resolve_link(&store, 0).is_err());
    }

    #[test]
    fn test_resolve_link_plain_reply() {
        let mut store = ConversationStore::new();
        store.append(Message::assistant("see https://example.com"));
        assert_eq!(resolve_link(&store, 1).unwrap_err(), "The latest reply has no links");
    }

    #[tokio::test]
    async fn test_second_send_while_loading_is_refused() {
        let mut manager = manager();

        type_and_enter(&mut manager, "first");
        assert!(manager.session().is_loading());
        assert!(!manager.composer.is_enabled());

        type_and_enter(&mut manager, "second");
        assert_eq!(manager.session().store().len(), 1);
        assert_eq!(manager.composer.content(), "second");
        assert!(manager.notice().is_some());

        let mut settled = false;
        for _ in 0..100 {
            tokio::task::yield_now().await;
            manager.on_tick();
            if !manager.session().is_loading() {
                settled = true;
                break;
            }
        }
        assert!(settled);
        assert!(manager.composer.is_enabled());

        let kinds: Vec<MessageKind> = manager.session().store().all().iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MessageKind::User, MessageKind::Assistant]);
        assert_eq!(manager.session().store().all()[1].text, "echo: first");
    }

    #[tokio::test]
    async fn test_commands_are_not_sent() {
        let mut manager = manager();
        assert_eq!(type_and_enter(&mut manager, "/help "), ConversationAction::None);
        assert!(manager.session().store().is_empty());
        assert!(manager.notice().unwrap().contains("/open"));

        assert_eq!(type_and_enter(&mut manager, "/bye "), ConversationAction::Exit);
    }

    #[test]
    fn test_escape_and_ctrl_c_exit() {
        let mut manager = manager();
        assert_eq!(manager.handle_key(key(KeyCode::Esc)), ConversationAction::Exit);
        assert_eq!(
            manager.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            ConversationAction::Exit
        );
    }
}
