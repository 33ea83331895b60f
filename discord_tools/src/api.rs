use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
    StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;

use crate::{
    config::DiscordConfig,
    data_objects::{DmChannel, Embed, Message},
    error::DiscordApiError,
};

#[derive(Clone)]
pub struct DiscordApi {
    config: DiscordConfig,
    client: Arc<Client>,
}

impl DiscordApi {
    pub fn new(config: DiscordConfig) -> Result<Self, DiscordApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let token = format!("Bot {}", config.bot_token.reveal());
        let mut val = HeaderValue::from_str(&token).map_err(|e| DiscordApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| DiscordApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<B>,
    ) -> Result<T, DiscordApiError> {
        let url = self.url(path);
        trace!("Sending Discord query: {url}");
        let mut req = self.client.request(method, url);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                DiscordApiError::Timeout(e.to_string())
            } else {
                DiscordApiError::RequestError(e.to_string())
            }
        })?;
        if response.status().is_success() {
            trace!("Discord query successful. {}", response.status());
            return response.json::<T>().await.map_err(|e| DiscordApiError::JsonError(e.to_string()));
        }
        let status = response.status();
        let message = response.text().await.map_err(|e| DiscordApiError::RequestError(e.to_string()))?;
        if status == StatusCode::FORBIDDEN {
            Err(DiscordApiError::Forbidden(message))
        } else {
            Err(DiscordApiError::QueryError { status: status.as_u16(), message })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Opens (or reuses) the DM channel between the bot and the given user.
    pub async fn create_dm(&self, user_id: &str) -> Result<DmChannel, DiscordApiError> {
        let body = json!({ "recipient_id": user_id });
        debug!("Opening DM channel with user {user_id}");
        let channel: DmChannel = self.rest_query(Method::POST, "/users/@me/channels", Some(body)).await?;
        trace!("DM channel {} ready for user {user_id}", channel.id);
        Ok(channel)
    }

    /// Posts a message with an embed to the given channel. `content` carries any mention text; it may be empty.
    pub async fn send_embed(
        &self,
        channel_id: &str,
        content: Option<&str>,
        embed: &Embed,
    ) -> Result<Message, DiscordApiError> {
        let mut body = json!({ "embeds": [embed] });
        if let Some(content) = content {
            body["content"] = json!(content);
        }
        let path = format!("/channels/{channel_id}/messages");
        let message: Message = self.rest_query(Method::POST, &path, Some(body)).await?;
        debug!("Posted message {} to channel {channel_id}", message.id);
        Ok(message)
    }
}
