use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;

use crate::config;

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(config::http_timeout_secs()))
            .user_agent(concat!("maestro/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build http client")
    })
}
