//! A minimal Discord REST client covering what product delivery needs: opening a DM channel with a user and
//! posting embed messages, either to that DM channel or to an ordinary guild channel. Gateway/websocket
//! functionality is deliberately absent; delivery is plain REST.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::DiscordApi;
pub use config::DiscordConfig;
pub use data_objects::{DmChannel, Embed, EmbedField, EmbedFooter, Message};
pub use error::DiscordApiError;
