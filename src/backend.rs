use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::MaestroConfig;
use crate::http_cache::{fetch_json_cached, snippet};
use crate::http_client::http_client;
use crate::model::{Bet, League, Match, Team};

/// Client for the first-party Maestro backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    token: Option<String>,
    ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Wrapped { data: Vec<T> },
    Bare(Vec<T>),
}

/// Accepts `[...]` or `{ "data": [...] }`.
pub fn parse_listing<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let listing: Listing<T> = serde_json::from_str(trimmed).context("invalid backend json")?;
    Ok(match listing {
        Listing::Wrapped { data } => data,
        Listing::Bare(items) => items,
    })
}

impl BackendClient {
    pub fn from_config(cfg: &MaestroConfig) -> Result<Self> {
        let base_url = cfg
            .backend_url
            .clone()
            .context("MAESTRO_BACKEND_URL missing")?;
        Ok(Self::new(base_url, cfg.backend_token.clone(), cfg.cache_ttl_secs))
    }

    pub fn new(base_url: impl Into<String>, token: Option<String>, ttl_secs: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
            ttl_secs,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let client = http_client()?;
        let url = self.url(path);
        debug!(url = %url, "backend request");
        let auth = self.token.as_ref().map(|t| format!("Bearer {t}"));
        let headers: Vec<(&str, &str)> = auth
            .as_deref()
            .map(|value| vec![("Authorization", value)])
            .unwrap_or_default();
        let body = fetch_json_cached(client, &url, &headers, self.ttl_secs)
            .with_context(|| format!("backend request failed: {path}"))?;
        parse_listing(&body)
    }

    pub fn fetch_leagues(&self) -> Result<Vec<League>> {
        self.get_list("/leagues")
    }

    pub fn fetch_teams(&self) -> Result<Vec<Team>> {
        self.get_list("/teams")
    }

    pub fn fetch_matches(&self, league_id: Option<u32>) -> Result<Vec<Match>> {
        match league_id {
            Some(id) => self.get_list(&format!("/matches?league={id}")),
            None => self.get_list("/matches"),
        }
    }

    pub fn fetch_bets(&self) -> Result<Vec<Bet>> {
        self.get_list("/bets")
    }

    /// Creates or replaces the bet on the backend.
    pub fn push_bet(&self, bet: &Bet) -> Result<()> {
        let client = http_client()?;
        let mut req = client.put(self.url(&format!("/bets/{}", bet.id))).json(bet);
        if let Some(token) = self.token.as_ref() {
            req = req.bearer_auth(token);
        }
        let resp = req.send().context("backend bet push failed")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(anyhow!("backend http {}: {}", status, snippet(&body)));
        }
        info!(bet = %bet.id, "pushed bet to backend");
        Ok(())
    }
}
