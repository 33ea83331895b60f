use std::{env, time::Duration as StdDuration};

use chrono::Duration;
use discord_tools::DiscordConfig;
use log::*;
use spg_common::DEFAULT_CURRENCY_CODE;
use stripe_tools::StripeConfig;

const DEFAULT_SPG_HOST: &str = "127.0.0.1";
const DEFAULT_SPG_PORT: u16 = 8740;
const DEFAULT_SWEEP_INTERVAL: StdDuration = StdDuration::from_secs(60);
const DEFAULT_STALE_PENDING_MINUTES: i64 = 15;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// All prices and checkout sessions use this single currency code.
    pub currency: String,
    /// How often the background sweeper looks for stale pending sessions.
    pub sweep_interval: StdDuration,
    /// How long a pending session must be untouched before the sweeper reconciles it against the gateway.
    pub stale_pending_after: Duration,
    pub stripe: StripeConfig,
    pub discord: DiscordConfig,
    /// Channel that receives a mention-tagged delivery announcement when a buyer's DMs are closed. Without one,
    /// a rejected DM means the delivery fails and lands on the undelivered report.
    pub fallback_channel_id: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SPG_HOST.to_string(),
            port: DEFAULT_SPG_PORT,
            database_url: String::default(),
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            stale_pending_after: Duration::minutes(DEFAULT_STALE_PENDING_MINUTES),
            stripe: StripeConfig::default(),
            discord: DiscordConfig::default(),
            fallback_channel_id: None,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("SPG_HOST").ok().unwrap_or_else(|| DEFAULT_SPG_HOST.into());
        let port = env::var("SPG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for SPG_PORT. {e} Using the default, {DEFAULT_SPG_PORT}, \
                         instead."
                    );
                    DEFAULT_SPG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_SPG_PORT);
        let database_url = env::var("SPG_DATABASE_URL").ok().unwrap_or_else(|| {
            error!("🪛️ SPG_DATABASE_URL is not set. Please set it to the URL for the shop database.");
            String::default()
        });
        let currency = env::var("SPG_CURRENCY").map(|s| s.to_lowercase()).ok().unwrap_or_else(|| {
            info!("🪛️ SPG_CURRENCY is not set. Using the default, {DEFAULT_CURRENCY_CODE}.");
            DEFAULT_CURRENCY_CODE.to_string()
        });
        let sweep_interval = env::var("SPG_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| {
                s.parse::<u64>().map_err(|e| warn!("🪛️ Invalid value for SPG_SWEEP_INTERVAL_SECS. {e}")).ok()
            })
            .map(StdDuration::from_secs)
            .unwrap_or(DEFAULT_SWEEP_INTERVAL);
        let stale_pending_after = env::var("SPG_STALE_PENDING_MINUTES")
            .ok()
            .and_then(|s| {
                s.parse::<i64>().map_err(|e| warn!("🪛️ Invalid value for SPG_STALE_PENDING_MINUTES. {e}")).ok()
            })
            .map(Duration::minutes)
            .unwrap_or_else(|| Duration::minutes(DEFAULT_STALE_PENDING_MINUTES));
        let fallback_channel_id = env::var("SPG_DISCORD_FALLBACK_CHANNEL").ok().filter(|s| !s.is_empty());
        if fallback_channel_id.is_none() {
            info!(
                "🪛️ SPG_DISCORD_FALLBACK_CHANNEL is not set. Deliveries to buyers with closed DMs will fail and \
                 land on the undelivered report."
            );
        }
        Self {
            host,
            port,
            database_url,
            currency,
            sweep_interval,
            stale_pending_after,
            stripe: StripeConfig::new_from_env_or_default(),
            discord: DiscordConfig::new_from_env_or_default(),
            fallback_channel_id,
        }
    }
}
