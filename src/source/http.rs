use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::config::Config;
use crate::models::RawCard;
use crate::source::PageSource;

/// The sidecar may return a bare array or wrap it in `{"cards": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CardsResponse {
    Bare(Vec<RawCard>),
    Wrapped { cards: Vec<RawCard> },
}

impl CardsResponse {
    fn into_cards(self) -> Vec<RawCard> {
        match self {
            CardsResponse::Bare(cards) | CardsResponse::Wrapped { cards } => cards,
        }
    }
}

/// Fetches pre-rendered cards as JSON from a rendering sidecar.
pub struct HttpCardSource {
    url: String,
    user_agent: String,
    timeout: Duration,
    client: Option<Client>,
}

impl HttpCardSource {
    pub fn new(cfg: &Config) -> Self {
        Self {
            url: cfg.source_url.clone(),
            user_agent: cfg.user_agent.clone(),
            timeout: Duration::from_secs(cfg.request_timeout_secs),
            client: None,
        }
    }
}

#[async_trait]
impl PageSource for HttpCardSource {
    async fn open(&mut self) -> Result<()> {
        let client = Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client")?;
        self.client = Some(client);
        Ok(())
    }

    async fn fetch_cards(&mut self) -> Result<Vec<RawCard>> {
        let client = self.client.as_ref().context("HTTP source not opened")?;

        let resp = client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch cards from {}", self.url))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("Card source error {}: {}", status, body);
        }

        let data: CardsResponse = resp.json().await.context("Failed to parse card response")?;
        let cards = data.into_cards();
        debug!("Found {} signal cards", cards.len());
        Ok(cards)
    }

    async fn close(&mut self) {
        self.client = None;
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
