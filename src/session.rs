//! Chat session: the conversation store plus the one outstanding request.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::store::{ConversationStore, Message};
use crate::transport::{Transport, TransportError};

/// What happened to a submitted input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Appended and sent
    Sent,
    /// Empty or whitespace only, nothing done
    Empty,
    /// A request is already outstanding, nothing done
    Busy,
}

type ReplyResult = Result<String, TransportError>;

/// Drives one conversation.
///
/// At most one request is in flight. The user message is appended before
/// the request starts; the reply (or error) is appended before the loading
/// flag clears.
pub struct ChatSession {
    store: ConversationStore,
    transport: Arc<dyn Transport>,
    loading: bool,
    reply_tx: mpsc::UnboundedSender<ReplyResult>,
    reply_rx: mpsc::UnboundedReceiver<ReplyResult>,
}

impl ChatSession {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        Self {
            store: ConversationStore::new(),
            transport,
            loading: false,
            reply_tx,
            reply_rx,
        }
    }

    /// Submit user input. Must be called inside a tokio runtime.
    pub fn submit(&mut self, input: &str) -> SubmitOutcome {
        let text = input.trim();
        if text.is_empty() {
            return SubmitOutcome::Empty;
        }
        if self.loading {
            tracing::debug!("ignoring submit while a request is outstanding");
            return SubmitOutcome::Busy;
        }

        self.store.append(Message::user(text));
        self.loading = true;

        let transport = Arc::clone(&self.transport);
        let tx = self.reply_tx.clone();
        let text = text.to_string();
        tokio::spawn(async move {
            let result = transport.send(&text).await;
            let _ = tx.send(result);
        });

        SubmitOutcome::Sent
    }

    /// Apply any settled reply without waiting (called from the UI loop).
    /// Returns true when the store changed.
    pub fn process_replies(&mut self) -> bool {
        let mut changed = false;
        while let Ok(result) = self.reply_rx.try_recv() {
            self.apply_reply(result);
            changed = true;
        }
        changed
    }

    /// Wait for the outstanding request to settle and apply it.
    /// Returns immediately when nothing is in flight.
    pub async fn wait_for_reply(&mut self) {
        if !self.loading {
            return;
        }
        if let Some(result) = self.reply_rx.recv().await {
            self.apply_reply(result);
        }
    }

    fn apply_reply(&mut self, result: ReplyResult) {
        match result {
            Ok(answer) => self.store.append(Message::assistant(answer)),
            Err(e) => {
                tracing::warn!(error = %e, "exchange failed");
                self.store.append(Message::error(e.display_text()));
            }
        }
        self.loading = false;
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
