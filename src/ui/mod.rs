//! Interactive terminal chat

pub mod conversation;

use std::sync::Arc;

use anyhow::Result;

use crate::config::Config;
use crate::events::TuiEvent;
use crate::session::ChatSession;
use crate::transport::WebhookClient;
use crate::tui::{self, EventHandler, Tui, TICK_RATE};
use conversation::{ConversationAction, ConversationManager};

/// Run the full-screen chat until the user quits
pub async fn run(config: Config) -> Result<()> {
    let client = WebhookClient::new(&config)?;
    tracing::info!(endpoint = %client.endpoint(), "starting interactive session");

    let session = ChatSession::new(Arc::new(client));
    let mut manager = ConversationManager::new(session, &config);

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = event_loop(&mut terminal, &mut manager).await;
    tui::restore()?;

    tracing::info!(messages = manager.session().store().len(), "session ended");
    result
}

async fn event_loop(terminal: &mut Tui, manager: &mut ConversationManager) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    loop {
        terminal.draw(|frame| frame.render_widget(&*manager, frame.size()))?;

        let Some(event) = events.next().await else {
            break;
        };

        match event {
            TuiEvent::Key(key) => {
                if manager.handle_key(key) == ConversationAction::Exit {
                    break;
                }
            }
            TuiEvent::Paste(text) => manager.handle_paste(&text),
            TuiEvent::Resize(width, height) => {
                tracing::debug!(width, height, "terminal resized");
            }
            TuiEvent::Tick => manager.on_tick(),
        }
    }

    Ok(())
}
