//! Slack notifications
//!
//! Posts to a Slack "incoming webhook". Notification is best effort: an
//! unconfigured hook, a blank message or a failed post is logged and
//! otherwise ignored.

use crate::config::SlackConfig;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Serialize)]
struct SlackMessage<'a> {
    channel: &'a str,
    username: &'a str,
    icon_emoji: &'a str,
    mrkdwn: bool,
    text: &'a str,
}

#[derive(Clone)]
pub struct SlackNotifier {
    http_client: reqwest::Client,
    config: SlackConfig,
}

impl SlackNotifier {
    pub fn new(config: SlackConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                warn!("Slack HTTP client setup failed, using defaults: {}", e);
                reqwest::Client::new()
            });
        Self {
            http_client,
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.hook.trim().is_empty()
    }

    /// Send `msg`; returns whether Slack accepted it
    pub async fn notify(&self, msg: &str) -> bool {
        let hook = self.config.hook.trim();
        if hook.is_empty() {
            warn!("Slack NOT notified: hook not configured");
            return false;
        }
        if msg.trim().is_empty() {
            warn!("Slack NOT notified: no message specified");
            return false;
        }

        let body = SlackMessage {
            channel: &self.config.channel,
            username: &self.config.username,
            icon_emoji: &self.config.icon_emoji,
            mrkdwn: true,
            text: msg,
        };

        match self.http_client.post(hook).json(&body).send().await {
            Ok(response) if response.status().is_success() => {
                info!("Notified slack");
                true
            }
            Ok(response) => {
                let status = response.status();
                let text = response.text().await.unwrap_or_default();
                error!("Error notifying slack: [{}] {}", status, text);
                false
            }
            Err(e) => {
                error!("Error notifying slack: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_hook_is_skipped() {
        let notifier = SlackNotifier::new(SlackConfig::default());
        assert!(!notifier.is_configured());
        assert!(!notifier.notify("hello").await);
    }

    #[tokio::test]
    async fn test_blank_message_is_skipped() {
        let notifier = SlackNotifier::new(SlackConfig {
            hook: "http://127.0.0.1:9/hook".to_string(),
            ..SlackConfig::default()
        });
        assert!(notifier.is_configured());
        assert!(!notifier.notify("   ").await);
    }

    #[test]
    fn test_message_shape() {
        let config = SlackConfig::default();
        let body = SlackMessage {
            channel: &config.channel,
            username: &config.username,
            icon_emoji: &config.icon_emoji,
            mrkdwn: true,
            text: "Movie night saved",
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["channel"], "#general");
        assert_eq!(value["username"], "Movie Night Monkey");
        assert_eq!(value["mrkdwn"], true);
    }
}
