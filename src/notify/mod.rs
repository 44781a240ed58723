pub mod embed;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde_json::json;
use std::time::Duration;
use tracing::{error, info};

use crate::models::{AlertKind, ComparisonRow, LinkPair, RunEvent};
use crate::ui::Presenter;
use embed::create_embed;

pub fn create_client(user_agent: &str) -> Result<Client> {
    let client = ClientBuilder::new()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(25))
        .build()?;

    Ok(client)
}

pub async fn send_notification(
    client: &Client,
    webhook_url: &str,
    kind: AlertKind,
    row: &ComparisonRow,
    pair: &LinkPair,
    precision: u32,
) -> Result<()> {
    let embed = create_embed(kind, row, pair, precision);

    let payload = json!({
        "embeds": [embed]
    });

    let response = client
        .post(webhook_url)
        .json(&payload)
        .send()
        .await
        .context("Failed to send alert webhook")?;

    if response.status().is_success() {
        info!("Sent {} alert for row {}", kind.label(), row.sequence);
        Ok(())
    } else {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!("Alert webhook failed with status {}: {}", status, error_text);
        Err(anyhow::anyhow!("Alert webhook failed: {} - {}", status, error_text))
    }
}

/// Posts every mismatch alert to a Discord-compatible webhook.
pub struct WebhookNotifier {
    client: Client,
    webhook_url: String,
    precision: u32,
}

impl WebhookNotifier {
    pub fn new(client: Client, webhook_url: impl Into<String>, precision: u32) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
            precision,
        }
    }
}

#[async_trait]
impl Presenter for WebhookNotifier {
    async fn present(&mut self, event: &RunEvent) {
        if let RunEvent::Alert { kind, row, pair } = event {
            if let Err(e) = send_notification(
                &self.client,
                &self.webhook_url,
                *kind,
                row,
                pair,
                self.precision,
            )
            .await
            {
                error!("Failed to deliver alert: {:#}", e);
            }
        }
    }
}
