//! Terminal chat client for the syuting.film AI assistant.
//!
//! Replies from the assistant webhook are shown either verbatim or, when the
//! reply is a JSON object, as an indented key/value tree with URLs turned
//! into links (see [`render`]).

pub mod config;
pub mod events;
pub mod render;
pub mod session;
pub mod store;
pub mod transport;
pub mod tui;
pub mod ui;
