use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::embed::MessagePayload;
use crate::chat::{ChannelHandle, ChatClient};
use crate::core::report::Report;
use crate::error::{RelayError, Result};

pub const API_BASE: &str = "https://discord.com/api/v10";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct ChannelPayload {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

/// Discord REST API client authenticated with a bot token.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: reqwest::Client,
    base_url: String,
}

impl DiscordClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, API_BASE)
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| RelayError::config(format!("Invalid API base {:?}: {}", base_url, e)))?;

        let mut auth = HeaderValue::from_str(&format!("Bot {}", token))
            .map_err(|_| RelayError::config("token contains characters invalid in a header"))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!(
                "DiscordBot (https://github.com/sysrelay/sysrelay, ",
                env!("CARGO_PKG_VERSION"),
                ")"
            )),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: base.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl ChatClient for DiscordClient {
    async fn resolve_channel(&self, channel_id: &str) -> Result<ChannelHandle> {
        let lookup_failed = |detail: String| {
            RelayError::channel_not_found(format!(
                "lookup of channel {} failed: {}",
                channel_id, detail
            ))
        };

        let response = self
            .http
            .get(self.endpoint(&format!("/channels/{}", channel_id)))
            .send()
            .await
            .map_err(|e| lookup_failed(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN => {
                Err(RelayError::channel_not_found(format!(
                    "Channel with ID {} not found ({})",
                    channel_id,
                    response.status()
                )))
            }
            status if status.is_success() => {
                let channel: ChannelPayload = response
                    .json()
                    .await
                    .map_err(|e| lookup_failed(e.to_string()))?;
                Ok(ChannelHandle {
                    id: channel.id,
                    name: channel.name,
                })
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(lookup_failed(format!("{}: {}", status, body.trim())))
            }
        }
    }

    async fn send(&self, channel: &ChannelHandle, report: &Report) -> Result<()> {
        let payload = MessagePayload::from(report);

        let response = self
            .http
            .post(self.endpoint(&format!("/channels/{}/messages", channel.id)))
            .json(&payload)
            .send()
            .await
            .map_err(|e| RelayError::send_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::send_failed(format!("{}: {}", status, body.trim())));
        }

        Ok(())
    }
}
