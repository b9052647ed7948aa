//! JSON snapshot sync through a file committed to a GitHub repository.
//!
//! The whole local state is exported as one JSON document and written with the
//! GitHub contents API. Reading it back merges record by record: the copy with
//! the newer `updated_at` wins, ties keep the local copy, and tombstones not older
//! than a record remove it. There are no retries. A push that races another
//! writer fails with [`SyncError::Conflict`] and the next sync merges again.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::GithubSyncConfig;
use crate::http_cache::snippet;
use crate::http_client::http_client;
use crate::model::{Bet, League, Match, RecordKind, Team, Tombstone};
use crate::store;

pub const SNAPSHOT_VERSION: u32 = 1;
const GITHUB_API_VERSION: &str = "2022-11-28";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub exported_at: i64,
    #[serde(default)]
    pub leagues: Vec<League>,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub matches: Vec<Match>,
    #[serde(default)]
    pub bets: Vec<Bet>,
    #[serde(default)]
    pub tombstones: Vec<Tombstone>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Remote records that did not exist locally.
    pub added: usize,
    /// Local records replaced by a newer remote copy.
    pub updated: usize,
    /// Local records removed by a newer remote tombstone.
    pub removed: usize,
}

impl MergeStats {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.updated == 0 && self.removed == 0
    }

    fn absorb(&mut self, other: MergeStats) {
        self.added += other.added;
        self.updated += other.updated;
        self.removed += other.removed;
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote sync file changed during push (http {0}); run sync again")]
    Conflict(u16),
    #[error("github rejected credentials (http {0})")]
    Unauthorized(u16),
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("github http {status}: {body}")]
    Http { status: u16, body: String },
}

trait SyncRecord: Clone {
    const KIND: RecordKind;
    fn key(&self) -> String;
    fn updated_at(&self) -> i64;
}

impl SyncRecord for League {
    const KIND: RecordKind = RecordKind::League;
    fn key(&self) -> String {
        self.id.to_string()
    }
    fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

impl SyncRecord for Team {
    const KIND: RecordKind = RecordKind::Team;
    fn key(&self) -> String {
        self.id.to_string()
    }
    fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

impl SyncRecord for Match {
    const KIND: RecordKind = RecordKind::Match;
    fn key(&self) -> String {
        self.id.to_string()
    }
    fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

impl SyncRecord for Bet {
    const KIND: RecordKind = RecordKind::Bet;
    fn key(&self) -> String {
        self.id.clone()
    }
    fn updated_at(&self) -> i64 {
        self.updated_at
    }
}

/// Last-write-wins merge of two snapshots. The result is in canonical order.
pub fn merge_snapshots(local: &Snapshot, remote: &Snapshot) -> (Snapshot, MergeStats) {
    let mut tombstones: HashMap<(RecordKind, String), i64> = HashMap::new();
    for t in local.tombstones.iter().chain(remote.tombstones.iter()) {
        let slot = tombstones.entry((t.kind, t.id.clone())).or_insert(t.deleted_at);
        *slot = (*slot).max(t.deleted_at);
    }

    let mut stats = MergeStats::default();
    let leagues = merge_records(&local.leagues, &remote.leagues, &tombstones, &mut stats);
    let teams = merge_records(&local.teams, &remote.teams, &tombstones, &mut stats);
    let matches = merge_records(&local.matches, &remote.matches, &tombstones, &mut stats);
    let bets = merge_records(&local.bets, &remote.bets, &tombstones, &mut stats);

    // A tombstone older than a live record is superseded by the re-created record.
    let live: HashMap<(RecordKind, String), i64> = leagues
        .iter()
        .map(|r| ((League::KIND, r.key()), r.updated_at))
        .chain(teams.iter().map(|r| ((Team::KIND, r.key()), r.updated_at)))
        .chain(matches.iter().map(|r| ((Match::KIND, r.key()), r.updated_at)))
        .chain(bets.iter().map(|r| ((Bet::KIND, r.key()), r.updated_at)))
        .collect();
    let mut merged_tombstones: Vec<Tombstone> = tombstones
        .into_iter()
        .filter(|(key, _)| !live.contains_key(key))
        .map(|((kind, id), deleted_at)| Tombstone {
            kind,
            id,
            deleted_at,
        })
        .collect();
    merged_tombstones.sort_by(|a, b| a.kind.as_str().cmp(b.kind.as_str()).then(a.id.cmp(&b.id)));

    let merged = Snapshot {
        version: SNAPSHOT_VERSION,
        exported_at: local.exported_at.max(remote.exported_at),
        leagues,
        teams,
        matches,
        bets,
        tombstones: merged_tombstones,
    };
    (merged, stats)
}

fn merge_records<T: SyncRecord>(
    local: &[T],
    remote: &[T],
    tombstones: &HashMap<(RecordKind, String), i64>,
    stats: &mut MergeStats,
) -> Vec<T> {
    let mut out: BTreeMap<String, T> = local.iter().map(|r| (r.key(), r.clone())).collect();
    let mut local_stats = MergeStats::default();

    for record in remote {
        let key = record.key();
        match out.get(&key) {
            Some(existing) if record.updated_at() > existing.updated_at() => {
                out.insert(key, record.clone());
                local_stats.updated += 1;
            }
            Some(_) => {}
            None => {
                out.insert(key, record.clone());
                local_stats.added += 1;
            }
        }
    }

    let local_keys: std::collections::HashSet<String> = local.iter().map(|r| r.key()).collect();
    out.retain(|key, record| {
        let Some(deleted_at) = tombstones.get(&(T::KIND, key.clone())) else {
            return true;
        };
        if *deleted_at < record.updated_at() {
            return true;
        }
        if local_keys.contains(key) {
            local_stats.removed += 1;
        } else {
            // Arrived from remote but was already deleted here.
            local_stats.added = local_stats.added.saturating_sub(1);
        }
        false
    });

    stats.absorb(local_stats);
    out.into_values().collect()
}

/// Snapshot with records in key order and `exported_at` cleared, so that
/// equal state always serialises to equal bytes.
pub fn canonical(snapshot: &Snapshot) -> Snapshot {
    let mut out = snapshot.clone();
    out.exported_at = 0;
    out.leagues.sort_by_key(|r| r.id);
    out.teams.sort_by_key(|r| r.id);
    out.matches.sort_by_key(|r| r.id);
    out.bets.sort_by(|a, b| a.id.cmp(&b.id));
    out.tombstones
        .sort_by(|a, b| a.kind.as_str().cmp(b.kind.as_str()).then(a.id.cmp(&b.id)));
    out
}

pub fn snapshot_digest(snapshot: &Snapshot) -> Result<String> {
    let json = serde_json::to_vec(&canonical(snapshot)).context("serialize snapshot")?;
    let digest = Sha256::digest(&json);
    Ok(digest.iter().map(|b| format!("{b:02x}")).collect())
}

pub fn encode_snapshot(snapshot: &Snapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).context("serialize snapshot")
}

pub fn decode_snapshot(raw: &str) -> Result<Snapshot> {
    let snapshot: Snapshot = serde_json::from_str(raw.trim()).context("invalid snapshot json")?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(SyncError::UnsupportedVersion(snapshot.version).into());
    }
    Ok(snapshot)
}

// ---------------------------------------------------------------------------
// GitHub contents API
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub sha: String,
    pub snapshot: Snapshot,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    download_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct PutContentsRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutContentsResponse {
    content: PutContent,
}

#[derive(Debug, Deserialize)]
struct PutContent {
    sha: String,
}

fn contents_url(cfg: &GithubSyncConfig) -> String {
    format!("{}/repos/{}/contents/{}", cfg.api_base, cfg.repo, cfg.path)
}

fn authed(req: reqwest::blocking::RequestBuilder, cfg: &GithubSyncConfig) -> reqwest::blocking::RequestBuilder {
    req.bearer_auth(&cfg.token)
        .header("Accept", "application/vnd.github+json")
        .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
}

/// Decodes the base64 payload GitHub returns, which is wrapped at 60 columns.
pub fn decode_contents_payload(content: &str) -> Result<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact.as_bytes())
        .context("contents base64 decode failed")?;
    String::from_utf8(bytes).context("contents payload is not utf8")
}

/// Fetches the sync file. `Ok(None)` when it does not exist yet.
pub fn pull(client: &Client, cfg: &GithubSyncConfig) -> Result<Option<RemoteFile>> {
    let url = contents_url(cfg);
    let resp = authed(client.get(&url), cfg)
        .query(&[("ref", cfg.branch.as_str())])
        .send()
        .context("github contents request failed")?;
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        debug!(path = %cfg.path, "no remote sync file yet");
        return Ok(None);
    }
    let body = resp.text().context("failed reading github body")?;
    check_status(status, &body)?;

    let parsed: ContentsResponse =
        serde_json::from_str(&body).context("invalid github contents json")?;
    let raw = match (parsed.encoding.as_deref(), parsed.content.as_deref()) {
        (Some("base64"), Some(content)) if !content.trim().is_empty() => {
            decode_contents_payload(content)?
        }
        // Files over 1 MB come back without inline content.
        _ => {
            let download_url = parsed
                .download_url
                .as_deref()
                .context("github contents response has neither content nor download_url")?;
            let resp = authed(client.get(download_url), cfg)
                .send()
                .context("github raw download failed")?;
            let status = resp.status();
            let body = resp.text().context("failed reading raw sync file")?;
            check_status(status, &body)?;
            body
        }
    };

    Ok(Some(RemoteFile {
        sha: parsed.sha,
        snapshot: decode_snapshot(&raw)?,
    }))
}

/// Writes the snapshot, replacing blob `previous_sha` when given. Returns the new blob sha.
pub fn push(
    client: &Client,
    cfg: &GithubSyncConfig,
    snapshot: &Snapshot,
    previous_sha: Option<&str>,
) -> Result<String> {
    let json = encode_snapshot(snapshot)?;
    let message = format!(
        "maestro sync: {} bets, {} matches",
        snapshot.bets.len(),
        snapshot.matches.len()
    );
    let body = PutContentsRequest {
        message: &message,
        content: BASE64.encode(json.as_bytes()),
        branch: &cfg.branch,
        sha: previous_sha,
    };
    let resp = authed(client.put(contents_url(cfg)), cfg)
        .json(&body)
        .send()
        .context("github put contents failed")?;
    let status = resp.status();
    let text = resp.text().context("failed reading github put body")?;
    check_status(status, &text)?;
    let parsed: PutContentsResponse =
        serde_json::from_str(&text).context("invalid github put response")?;
    Ok(parsed.content.sha)
}

fn check_status(status: StatusCode, body: &str) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    let code = status.as_u16();
    let err = match code {
        409 | 422 => SyncError::Conflict(code),
        401 | 403 => SyncError::Unauthorized(code),
        _ => SyncError::Http {
            status: code,
            body: snippet(body),
        },
    };
    Err(err.into())
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub remote_found: bool,
    pub merged: MergeStats,
    pub pushed: bool,
    pub remote_sha: Option<String>,
    pub digest: String,
}

/// Pull, merge into the store, then push the merged state if it differs.
pub fn sync(conn: &mut Connection, cfg: &GithubSyncConfig, now: i64) -> Result<SyncReport> {
    let client = http_client()?;
    let remote = pull(client, cfg)?;

    let mut merged = MergeStats::default();
    let mut remote_digest = None;
    if let Some(remote) = remote.as_ref() {
        merged = store::apply_snapshot(conn, &remote.snapshot, now)?;
        remote_digest = Some(snapshot_digest(&remote.snapshot)?);
    }

    let local = store::export_snapshot(conn, now)?;
    let digest = snapshot_digest(&local)?;
    let previous_sha = remote.as_ref().map(|r| r.sha.clone());
    if remote_digest.as_deref() == Some(digest.as_str()) {
        info!(digest = %digest, "remote already up to date");
        return Ok(SyncReport {
            remote_found: true,
            merged,
            pushed: false,
            remote_sha: previous_sha,
            digest,
        });
    }

    let sha = push(client, cfg, &local, previous_sha.as_deref())?;
    info!(sha = %sha, bets = local.bets.len(), "pushed snapshot");
    Ok(SyncReport {
        remote_found: remote.is_some(),
        merged,
        pushed: true,
        remote_sha: Some(sha),
        digest,
    })
}

/// Writes the current store to a local JSON backup.
pub fn export_to_file(conn: &Connection, path: &Path, now: i64) -> Result<usize> {
    let snapshot = store::export_snapshot(conn, now)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let json = encode_snapshot(&snapshot)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(snapshot.bets.len())
}

/// Merges a local JSON backup into the store.
pub fn import_from_file(conn: &mut Connection, path: &Path, now: i64) -> Result<MergeStats> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let snapshot = decode_snapshot(&raw)?;
    store::apply_snapshot(conn, &snapshot, now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contents_payload_ignores_line_wraps() {
        let encoded = BASE64.encode(br#"{"version":1,"exported_at":5}"#);
        let (a, b) = encoded.split_at(10);
        let wrapped = format!("{a}\n{b}\n");
        let decoded = decode_contents_payload(&wrapped).unwrap();
        let snapshot = decode_snapshot(&decoded).unwrap();
        assert_eq!(snapshot.exported_at, 5);
        assert!(snapshot.bets.is_empty());
    }

    #[test]
    fn newer_snapshot_versions_are_rejected() {
        let err = decode_snapshot(r#"{"version":99,"exported_at":0}"#).unwrap_err();
        assert!(err.to_string().contains("unsupported snapshot version"));
    }

    #[test]
    fn conflict_statuses_map_to_conflict() {
        let err = check_status(StatusCode::CONFLICT, "").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::Conflict(409))
        ));
        let err = check_status(StatusCode::UNAUTHORIZED, "").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::Unauthorized(401))
        ));
        assert!(check_status(StatusCode::OK, "").is_ok());
    }

    #[test]
    fn put_request_omits_sha_for_new_files() {
        let body = PutContentsRequest {
            message: "m",
            content: "e30=".to_string(),
            branch: "main",
            sha: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("sha").is_none());
        assert_eq!(json["branch"], "main");
    }
}
