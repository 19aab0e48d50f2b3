use serde::Serialize;
use strum::{Display, EnumIter};

/// Terminal events feeding the interactive loop
#[derive(Debug, Clone)]
pub enum TuiEvent {
    /// Key press event
    Key(crossterm::event::KeyEvent),

    /// Bracketed paste
    Paste(String),

    /// Terminal resize
    Resize(u16, u16),

    /// Animation/poll tick
    Tick,
}

/// Who produced a conversation message
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MessageKind {
    /// Text typed by the user
    User,
    /// Reply text from the assistant endpoint
    Assistant,
    /// Failed exchange, shown in place of a reply
    Error,
}

impl MessageKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            MessageKind::User => "You",
            MessageKind::Assistant => "Assistant",
            MessageKind::Error => "Error",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MessageKind::User => "👤",
            MessageKind::Assistant => "🤖",
            MessageKind::Error => "⚠️",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_exactly_three_kinds() {
        let kinds: Vec<String> = MessageKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(kinds, vec!["user", "assistant", "error"]);
    }

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MessageKind::Assistant).unwrap(), "\"assistant\"");
    }
}
