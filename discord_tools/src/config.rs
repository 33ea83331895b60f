use std::{env, time::Duration};

use log::*;
use spg_common::Secret;

pub const DEFAULT_DISCORD_API_URL: &str = "https://discord.com/api/v10";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct DiscordConfig {
    /// Base URL for the Discord REST API. Only overridden in tests.
    pub api_url: String,
    pub bot_token: Secret<String>,
    /// Applied to every request. Delivery must never wedge a reconciliation on a slow Discord response.
    pub timeout: Duration,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_DISCORD_API_URL.to_string(), bot_token: Secret::default(), timeout: DEFAULT_TIMEOUT }
    }
}

impl DiscordConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = env::var("SPG_DISCORD_API_URL").ok().unwrap_or_else(|| DEFAULT_DISCORD_API_URL.to_string());
        let bot_token = env::var("SPG_DISCORD_BOT_TOKEN").ok().map(Secret::new).unwrap_or_else(|| {
            error!("🪛️ SPG_DISCORD_BOT_TOKEN is not set. Deliveries will fail until it is configured.");
            Secret::default()
        });
        let timeout = env::var("SPG_DISCORD_TIMEOUT_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>()
                    .map_err(|e| warn!("🪛️ Invalid value for SPG_DISCORD_TIMEOUT_SECS. {e}"))
                    .ok()
            })
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        Self { api_url, bot_token, timeout }
    }
}
