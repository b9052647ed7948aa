use std::env;
use std::path::PathBuf;

use crate::http_cache::app_cache_dir;

const DEFAULT_FOOTBALL_API_BASE: &str = "https://v3.football.api-sports.io";
const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";
const DEFAULT_SYNC_PATH: &str = "maestro/state.json";
const DEFAULT_SYNC_BRANCH: &str = "main";
const DEFAULT_CACHE_TTL_SECS: u64 = 600;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DB_FILE: &str = "maestro.sqlite";

#[derive(Debug, Clone)]
pub struct MaestroConfig {
    pub football_api_key: Option<String>,
    pub football_api_base: String,
    pub backend_url: Option<String>,
    pub backend_token: Option<String>,
    pub github: Option<GithubSyncConfig>,
    pub db_path: Option<PathBuf>,
    pub cache_ttl_secs: u64,
    pub bankroll: f64,
    pub kelly_fraction: f64,
    pub min_edge: f64,
    pub default_league: Option<u32>,
    pub season: Option<u16>,
}

#[derive(Debug, Clone)]
pub struct GithubSyncConfig {
    pub token: String,
    /// `owner/name`
    pub repo: String,
    pub path: String,
    pub branch: String,
    pub api_base: String,
}

impl MaestroConfig {
    pub fn from_env() -> Self {
        let github = match (env_string("GITHUB_TOKEN"), env_string("MAESTRO_SYNC_REPO")) {
            (Some(token), Some(repo)) if repo.contains('/') => Some(GithubSyncConfig {
                token,
                repo,
                path: env_string("MAESTRO_SYNC_PATH")
                    .map(|p| p.trim_start_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_SYNC_PATH.to_string()),
                branch: env_string("MAESTRO_SYNC_BRANCH")
                    .unwrap_or_else(|| DEFAULT_SYNC_BRANCH.to_string()),
                api_base: env_string("GITHUB_API_BASE")
                    .map(|b| b.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.to_string()),
            }),
            _ => None,
        };

        Self {
            football_api_key: env_string("FOOTBALL_API_KEY"),
            football_api_base: env_string("FOOTBALL_API_BASE")
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_FOOTBALL_API_BASE.to_string()),
            backend_url: env_string("MAESTRO_BACKEND_URL")
                .map(|b| b.trim_end_matches('/').to_string()),
            backend_token: env_string("MAESTRO_BACKEND_TOKEN"),
            github,
            db_path: env_string("MAESTRO_DB")
                .map(PathBuf::from)
                .or_else(|| app_cache_dir().map(|dir| dir.join(DB_FILE))),
            cache_ttl_secs: env_u64("MAESTRO_CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS).min(86_400),
            bankroll: env_f64("MAESTRO_BANKROLL", 1000.0).max(0.0),
            kelly_fraction: env_f64("MAESTRO_KELLY_FRACTION", 0.25).clamp(0.0, 1.0),
            min_edge: env_f64("MAESTRO_MIN_EDGE", 0.03).clamp(0.0, 0.5),
            default_league: env_string("MAESTRO_DEFAULT_LEAGUE").and_then(|v| v.parse().ok()),
            season: env_string("MAESTRO_SEASON").and_then(|v| v.parse().ok()),
        }
    }
}

pub fn http_timeout_secs() -> u64 {
    env_u64("MAESTRO_HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS).clamp(2, 120)
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_string(key)
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    env_string(key)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}
