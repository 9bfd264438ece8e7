// src/notification/telegram.rs
use crate::config::TelegramConfig;
use crate::notification::{DeliveryReport, DeliveryStatus, Notifier};
use crate::utils::utils::truncate_string;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{error, info};

/// Longest response body echoed to the log.
const MAX_LOGGED_BODY: usize = 500;

/// Sends messages through the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
    chat_ids: Vec<String>,
}

impl TelegramNotifier {
    pub fn new(api_base: &str, bot_token: &str, chat_ids: Vec<String>) -> Self {
        Self {
            client: Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            chat_ids,
        }
    }

    pub fn from_config(config: &TelegramConfig) -> Self {
        Self::new(&config.api_base, &config.bot_token, config.chat_ids.clone())
    }

    pub fn chat_ids(&self) -> &[String] {
        &self.chat_ids
    }

    // Contains the bot token, never log it
    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }

    async fn send_to(&self, url: &str, chat_id: &str, text: &str) -> DeliveryStatus {
        let params = [("chat_id", chat_id), ("text", text)];

        let response = match self.client.post(url).form(&params).send().await {
            Ok(response) => response,
            Err(e) => {
                // reqwest errors carry the URL; strip it so the token stays out of logs
                let reason = e.without_url().to_string();
                error!("Failed to send message to {}: {}", chat_id, reason);
                return DeliveryStatus::Failed(reason);
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            info!("Message delivered to {}", chat_id);
            return DeliveryStatus::Delivered;
        }

        let body = response.text().await.unwrap_or_default();
        error!("Failed to send message to {}: HTTP {}", chat_id, status.as_u16());
        error!("Response: {}", truncate_string(&body, MAX_LOGGED_BODY));

        DeliveryStatus::Rejected {
            status: status.as_u16(),
            body,
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> DeliveryReport {
        let url = self.endpoint();
        let mut report = DeliveryReport::default();

        for chat_id in &self.chat_ids {
            let status = self.send_to(&url, chat_id, text).await;
            report.push(chat_id.as_str(), status);
        }

        report
    }
}
