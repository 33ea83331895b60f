//! Adapters that plug the concrete client crates into the engine's trait seams.
mod discord;
mod stripe;

pub use discord::DiscordNotifier;
pub use stripe::StripeGateway;
