use std::path::Path;

use anyhow::{Context, Result, anyhow};
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use tracing::{debug, info, warn};

use crate::model::{Bet, BetStatus, League, Market, Match, MatchStatus, RecordKind, Team, Tombstone};
use crate::pnl;
use crate::sync::{MergeStats, SNAPSHOT_VERSION, Snapshot, merge_snapshots, snapshot_digest};

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    debug!(path = %path.display(), "opened store");
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS leagues (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            country TEXT NULL,
            season INTEGER NULL,
            logo TEXT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS teams (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            short_name TEXT NULL,
            country TEXT NULL,
            logo TEXT NULL,
            league_id INTEGER NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_teams_league ON teams(league_id);

        CREATE TABLE IF NOT EXISTS matches (
            id INTEGER PRIMARY KEY,
            league_id INTEGER NOT NULL,
            season INTEGER NULL,
            round TEXT NULL,
            kickoff TEXT NOT NULL,
            home_team_id INTEGER NOT NULL,
            away_team_id INTEGER NOT NULL,
            home TEXT NOT NULL,
            away TEXT NOT NULL,
            home_goals INTEGER NULL,
            away_goals INTEGER NULL,
            status TEXT NOT NULL,
            home_corners INTEGER NULL,
            away_corners INTEGER NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_matches_league ON matches(league_id);
        CREATE INDEX IF NOT EXISTS idx_matches_kickoff ON matches(kickoff);

        CREATE TABLE IF NOT EXISTS bets (
            id TEXT PRIMARY KEY,
            match_id INTEGER NULL,
            event TEXT NOT NULL,
            league TEXT NULL,
            market TEXT NOT NULL,
            selection TEXT NOT NULL,
            odds INTEGER NOT NULL,
            stake REAL NOT NULL,
            status TEXT NOT NULL,
            placed_at INTEGER NOT NULL,
            settled_at INTEGER NULL,
            notes TEXT NULL,
            updated_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_bets_status ON bets(status);

        CREATE TABLE IF NOT EXISTS tombstones (
            kind TEXT NOT NULL,
            id TEXT NOT NULL,
            deleted_at INTEGER NOT NULL,
            PRIMARY KEY (kind, id)
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Leagues
// ---------------------------------------------------------------------------

pub fn upsert_league(conn: &Connection, league: &League) -> Result<()> {
    conn.execute(
        "INSERT INTO leagues(id, name, country, season, logo, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name, country = excluded.country, season = excluded.season,
            logo = excluded.logo, updated_at = excluded.updated_at",
        params![
            league.id as i64,
            league.name,
            league.country,
            league.season,
            league.logo,
            league.updated_at
        ],
    )
    .context("upsert league")?;
    clear_tombstone(conn, RecordKind::League, &league.id.to_string())
}

pub fn get_league(conn: &Connection, id: u32) -> Result<Option<League>> {
    conn.query_row(
        "SELECT id, name, country, season, logo, updated_at FROM leagues WHERE id = ?1",
        params![id as i64],
        league_from_row,
    )
    .optional()
    .context("query league")
}

pub fn list_leagues(conn: &Connection) -> Result<Vec<League>> {
    let mut stmt = conn
        .prepare("SELECT id, name, country, season, logo, updated_at FROM leagues ORDER BY name, id")
        .context("prepare list leagues")?;
    let rows = stmt.query_map([], league_from_row).context("query leagues")?;
    collect_rows(rows, "decode league row")
}

pub fn delete_league(conn: &Connection, id: u32, now: i64) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM leagues WHERE id = ?1", params![id as i64])
        .context("delete league")?;
    write_tombstone(conn, RecordKind::League, &id.to_string(), now)?;
    Ok(n > 0)
}

fn league_from_row(row: &Row<'_>) -> rusqlite::Result<League> {
    Ok(League {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        season: row.get(3)?,
        logo: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

pub fn upsert_team(conn: &Connection, team: &Team) -> Result<()> {
    conn.execute(
        "INSERT INTO teams(id, name, short_name, country, logo, league_id, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
            name = excluded.name, short_name = excluded.short_name, country = excluded.country,
            logo = excluded.logo, league_id = excluded.league_id, updated_at = excluded.updated_at",
        params![
            team.id as i64,
            team.name,
            team.short_name,
            team.country,
            team.logo,
            team.league_id.map(i64::from),
            team.updated_at
        ],
    )
    .context("upsert team")?;
    clear_tombstone(conn, RecordKind::Team, &team.id.to_string())
}

pub fn get_team(conn: &Connection, id: u32) -> Result<Option<Team>> {
    conn.query_row(
        "SELECT id, name, short_name, country, logo, league_id, updated_at FROM teams WHERE id = ?1",
        params![id as i64],
        team_from_row,
    )
    .optional()
    .context("query team")
}

pub fn list_teams(conn: &Connection, league_id: Option<u32>) -> Result<Vec<Team>> {
    let mut sql = String::from(
        "SELECT id, name, short_name, country, logo, league_id, updated_at FROM teams",
    );
    let mut args: Vec<Value> = Vec::new();
    if let Some(league_id) = league_id {
        sql.push_str(" WHERE league_id = ?1");
        args.push(Value::Integer(i64::from(league_id)));
    }
    sql.push_str(" ORDER BY name, id");
    let mut stmt = conn.prepare(&sql).context("prepare list teams")?;
    let rows = stmt
        .query_map(params_from_iter(args), team_from_row)
        .context("query teams")?;
    collect_rows(rows, "decode team row")
}

/// Case-insensitive lookup by name or short name.
pub fn find_team_by_name(conn: &Connection, name: &str) -> Result<Option<Team>> {
    let needle = name.trim();
    conn.query_row(
        "SELECT id, name, short_name, country, logo, league_id, updated_at FROM teams
         WHERE name = ?1 COLLATE NOCASE OR short_name = ?1 COLLATE NOCASE
         ORDER BY id LIMIT 1",
        params![needle],
        team_from_row,
    )
    .optional()
    .context("query team by name")
}

pub fn delete_team(conn: &Connection, id: u32, now: i64) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM teams WHERE id = ?1", params![id as i64])
        .context("delete team")?;
    write_tombstone(conn, RecordKind::Team, &id.to_string(), now)?;
    Ok(n > 0)
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        short_name: row.get(2)?,
        country: row.get(3)?,
        logo: row.get(4)?,
        league_id: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MatchFilter {
    pub league_id: Option<u32>,
    pub team_id: Option<u32>,
    pub status: Option<MatchStatus>,
    /// Inclusive lower bound on the kickoff string (ISO dates sort lexically).
    pub from: Option<String>,
    /// Exclusive upper bound on the kickoff string.
    pub to: Option<String>,
}

const MATCH_COLUMNS: &str = "id, league_id, season, round, kickoff, home_team_id, away_team_id, \
     home, away, home_goals, away_goals, status, home_corners, away_corners, updated_at";

/// Corner counts are only overwritten by non-null values: fixture listings do
/// not carry them, so a refetch keeps what `fetch corners` stored. Snapshot
/// replacement clears the table first and writes the record as given.
pub fn upsert_match(conn: &Connection, m: &Match) -> Result<()> {
    conn.execute(
        "INSERT INTO matches(id, league_id, season, round, kickoff, home_team_id, away_team_id,
                             home, away, home_goals, away_goals, status, home_corners, away_corners,
                             updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
         ON CONFLICT(id) DO UPDATE SET
            league_id = excluded.league_id, season = excluded.season, round = excluded.round,
            kickoff = excluded.kickoff, home_team_id = excluded.home_team_id,
            away_team_id = excluded.away_team_id, home = excluded.home, away = excluded.away,
            home_goals = excluded.home_goals, away_goals = excluded.away_goals,
            status = excluded.status,
            home_corners = COALESCE(excluded.home_corners, matches.home_corners),
            away_corners = COALESCE(excluded.away_corners, matches.away_corners),
            updated_at = excluded.updated_at",
        params![
            m.id as i64,
            m.league_id as i64,
            m.season,
            m.round,
            m.kickoff,
            m.home_team_id as i64,
            m.away_team_id as i64,
            m.home,
            m.away,
            m.home_goals,
            m.away_goals,
            m.status.as_str(),
            m.home_corners,
            m.away_corners,
            m.updated_at
        ],
    )
    .context("upsert match")?;
    clear_tombstone(conn, RecordKind::Match, &m.id.to_string())
}

/// Upserts a batch inside one transaction.
pub fn upsert_matches(conn: &mut Connection, matches: &[Match]) -> Result<usize> {
    let tx = conn.transaction().context("begin match transaction")?;
    for m in matches {
        upsert_match(&tx, m)?;
    }
    tx.commit().context("commit match transaction")?;
    Ok(matches.len())
}

pub fn set_match_corners(
    conn: &Connection,
    id: u64,
    home: u8,
    away: u8,
    now: i64,
) -> Result<bool> {
    let n = conn
        .execute(
            "UPDATE matches SET home_corners = ?1, away_corners = ?2, updated_at = ?3 WHERE id = ?4",
            params![home, away, now, id as i64],
        )
        .context("update match corners")?;
    Ok(n > 0)
}

pub fn get_match(conn: &Connection, id: u64) -> Result<Option<Match>> {
    conn.query_row(
        &format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = ?1"),
        params![id as i64],
        match_from_row,
    )
    .optional()
    .context("query match")
}

pub fn list_matches(conn: &Connection, filter: &MatchFilter) -> Result<Vec<Match>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Value> = Vec::new();
    if let Some(league_id) = filter.league_id {
        args.push(Value::Integer(i64::from(league_id)));
        clauses.push(format!("league_id = ?{}", args.len()));
    }
    if let Some(team_id) = filter.team_id {
        args.push(Value::Integer(i64::from(team_id)));
        let n = args.len();
        clauses.push(format!("(home_team_id = ?{n} OR away_team_id = ?{n})"));
    }
    if let Some(status) = filter.status {
        args.push(Value::Text(status.as_str().to_string()));
        clauses.push(format!("status = ?{}", args.len()));
    }
    if let Some(from) = filter.from.as_ref() {
        args.push(Value::Text(from.clone()));
        clauses.push(format!("kickoff >= ?{}", args.len()));
    }
    if let Some(to) = filter.to.as_ref() {
        args.push(Value::Text(to.clone()));
        clauses.push(format!("kickoff < ?{}", args.len()));
    }

    let mut sql = format!("SELECT {MATCH_COLUMNS} FROM matches");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY kickoff ASC, id ASC");

    let mut stmt = conn.prepare(&sql).context("prepare list matches")?;
    let rows = stmt
        .query_map(params_from_iter(args), match_from_row)
        .context("query matches")?;
    collect_rows(rows, "decode match row")
}

pub fn delete_match(conn: &Connection, id: u64, now: i64) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM matches WHERE id = ?1", params![id as i64])
        .context("delete match")?;
    write_tombstone(conn, RecordKind::Match, &id.to_string(), now)?;
    Ok(n > 0)
}

fn match_from_row(row: &Row<'_>) -> rusqlite::Result<Match> {
    let status: String = row.get(11)?;
    Ok(Match {
        id: row.get::<_, i64>(0)? as u64,
        league_id: row.get(1)?,
        season: row.get(2)?,
        round: row.get(3)?,
        kickoff: row.get(4)?,
        home_team_id: row.get(5)?,
        away_team_id: row.get(6)?,
        home: row.get(7)?,
        away: row.get(8)?,
        home_goals: row.get(9)?,
        away_goals: row.get(10)?,
        status: parse_column(11, &status)?,
        home_corners: row.get(12)?,
        away_corners: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

// ---------------------------------------------------------------------------
// Bets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct BetFilter {
    pub status: Option<BetStatus>,
    pub market: Option<Market>,
    pub league: Option<String>,
}

const BET_COLUMNS: &str = "id, match_id, event, league, market, selection, odds, stake, status, \
     placed_at, settled_at, notes, updated_at";

pub fn upsert_bet(conn: &Connection, bet: &Bet) -> Result<()> {
    conn.execute(
        "INSERT INTO bets(id, match_id, event, league, market, selection, odds, stake, status,
                          placed_at, settled_at, notes, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
         ON CONFLICT(id) DO UPDATE SET
            match_id = excluded.match_id, event = excluded.event, league = excluded.league,
            market = excluded.market, selection = excluded.selection, odds = excluded.odds,
            stake = excluded.stake, status = excluded.status, placed_at = excluded.placed_at,
            settled_at = excluded.settled_at, notes = excluded.notes,
            updated_at = excluded.updated_at",
        params![
            bet.id,
            bet.match_id.map(|id| id as i64),
            bet.event,
            bet.league,
            bet.market.as_str(),
            bet.selection,
            bet.odds,
            bet.stake,
            bet.status.as_str(),
            bet.placed_at,
            bet.settled_at,
            bet.notes,
            bet.updated_at
        ],
    )
    .context("upsert bet")?;
    clear_tombstone(conn, RecordKind::Bet, &bet.id)
}

pub fn get_bet(conn: &Connection, id: &str) -> Result<Option<Bet>> {
    conn.query_row(
        &format!("SELECT {BET_COLUMNS} FROM bets WHERE id = ?1"),
        params![id],
        bet_from_row,
    )
    .optional()
    .context("query bet")
}

/// Resolves a full id or a unique prefix of one.
pub fn resolve_bet_id(conn: &Connection, prefix: &str) -> Result<String> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(anyhow!("empty bet id"));
    }
    let mut stmt = conn
        .prepare("SELECT id FROM bets WHERE id LIKE ?1 || '%' ORDER BY id LIMIT 2")
        .context("prepare bet id lookup")?;
    let ids = stmt
        .query_map(params![prefix], |row| row.get::<_, String>(0))
        .context("query bet ids")?;
    let ids: Vec<String> = collect_rows(ids, "decode bet id")?;
    match ids.as_slice() {
        [only] => Ok(only.clone()),
        [] => Err(anyhow!("no bet matches id {prefix}")),
        _ => Err(anyhow!("bet id {prefix} is ambiguous")),
    }
}

pub fn list_bets(conn: &Connection, filter: &BetFilter) -> Result<Vec<Bet>> {
    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Value> = Vec::new();
    if let Some(status) = filter.status {
        args.push(Value::Text(status.as_str().to_string()));
        clauses.push(format!("status = ?{}", args.len()));
    }
    if let Some(market) = filter.market {
        args.push(Value::Text(market.as_str().to_string()));
        clauses.push(format!("market = ?{}", args.len()));
    }
    if let Some(league) = filter.league.as_ref() {
        args.push(Value::Text(league.clone()));
        clauses.push(format!("league = ?{} COLLATE NOCASE", args.len()));
    }

    let mut sql = format!("SELECT {BET_COLUMNS} FROM bets");
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY placed_at DESC, id ASC");

    let mut stmt = conn.prepare(&sql).context("prepare list bets")?;
    let rows = stmt
        .query_map(params_from_iter(args), bet_from_row)
        .context("query bets")?;
    collect_rows(rows, "decode bet row")
}

pub fn settle_bet(conn: &Connection, id: &str, status: BetStatus, now: i64) -> Result<Bet> {
    let mut bet = get_bet(conn, id)?.ok_or_else(|| anyhow!("bet {id} not found"))?;
    if status == BetStatus::Pending {
        pnl::reopen(&mut bet, now);
    } else {
        pnl::settle(&mut bet, status, now)?;
    }
    upsert_bet(conn, &bet)?;
    info!(bet = %bet.id, status = %bet.status, "bet settled");
    Ok(bet)
}

pub fn delete_bet(conn: &Connection, id: &str, now: i64) -> Result<bool> {
    let n = conn
        .execute("DELETE FROM bets WHERE id = ?1", params![id])
        .context("delete bet")?;
    write_tombstone(conn, RecordKind::Bet, id, now)?;
    Ok(n > 0)
}

fn bet_from_row(row: &Row<'_>) -> rusqlite::Result<Bet> {
    let market: String = row.get(4)?;
    let status: String = row.get(8)?;
    Ok(Bet {
        id: row.get(0)?,
        match_id: row.get::<_, Option<i64>>(1)?.map(|id| id as u64),
        event: row.get(2)?,
        league: row.get(3)?,
        market: parse_column(4, &market)?,
        selection: row.get(5)?,
        odds: row.get(6)?,
        stake: row.get(7)?,
        status: parse_column(8, &status)?,
        placed_at: row.get(9)?,
        settled_at: row.get(10)?,
        notes: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

// ---------------------------------------------------------------------------
// Tombstones and snapshots
// ---------------------------------------------------------------------------

fn write_tombstone(conn: &Connection, kind: RecordKind, id: &str, now: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO tombstones(kind, id, deleted_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(kind, id) DO UPDATE SET deleted_at = MAX(deleted_at, excluded.deleted_at)",
        params![kind.as_str(), id, now],
    )
    .context("write tombstone")?;
    Ok(())
}

fn clear_tombstone(conn: &Connection, kind: RecordKind, id: &str) -> Result<()> {
    conn.execute(
        "DELETE FROM tombstones WHERE kind = ?1 AND id = ?2",
        params![kind.as_str(), id],
    )
    .context("clear tombstone")?;
    Ok(())
}

pub fn list_tombstones(conn: &Connection) -> Result<Vec<Tombstone>> {
    let mut stmt = conn
        .prepare("SELECT kind, id, deleted_at FROM tombstones ORDER BY kind, id")
        .context("prepare list tombstones")?;
    let rows = stmt
        .query_map([], |row| {
            let kind: String = row.get(0)?;
            Ok(Tombstone {
                kind: parse_column(0, &kind)?,
                id: row.get(1)?,
                deleted_at: row.get(2)?,
            })
        })
        .context("query tombstones")?;
    collect_rows(rows, "decode tombstone row")
}

pub fn export_snapshot(conn: &Connection, now: i64) -> Result<Snapshot> {
    Ok(Snapshot {
        version: SNAPSHOT_VERSION,
        exported_at: now,
        leagues: list_leagues(conn)?,
        teams: list_teams(conn, None)?,
        matches: list_matches(conn, &MatchFilter::default())?,
        bets: list_bets(conn, &BetFilter::default())?,
        tombstones: list_tombstones(conn)?,
    })
}

/// Merges `remote` into the store (last write wins) and returns what changed.
/// Invalid remote bets are skipped. The store is rewritten whenever the merged
/// state differs from the local one, tombstone-only changes included.
pub fn apply_snapshot(conn: &mut Connection, remote: &Snapshot, now: i64) -> Result<MergeStats> {
    let local = export_snapshot(conn, now)?;
    let remote = without_invalid_bets(remote);
    let (merged, stats) = merge_snapshots(&local, &remote);
    if snapshot_digest(&merged)? == snapshot_digest(&local)? {
        return Ok(stats);
    }
    replace_all(conn, &merged)?;
    info!(
        added = stats.added,
        updated = stats.updated,
        removed = stats.removed,
        tombstones = merged.tombstones.len(),
        "applied remote snapshot"
    );
    Ok(stats)
}

/// Replaces every table with the snapshot contents in one transaction.
/// Bets failing validation are skipped.
pub fn replace_all(conn: &mut Connection, snapshot: &Snapshot) -> Result<()> {
    let tx = conn.transaction().context("begin replace transaction")?;
    tx.execute_batch(
        "DELETE FROM leagues; DELETE FROM teams; DELETE FROM matches;
         DELETE FROM bets; DELETE FROM tombstones;",
    )
    .context("clear tables")?;
    for league in &snapshot.leagues {
        upsert_league(&tx, league)?;
    }
    for team in &snapshot.teams {
        upsert_team(&tx, team)?;
    }
    for m in &snapshot.matches {
        upsert_match(&tx, m)?;
    }
    for bet in snapshot.bets.iter().filter(|bet| accept_bet(bet)) {
        upsert_bet(&tx, bet)?;
    }
    for t in &snapshot.tombstones {
        write_tombstone(&tx, t.kind, &t.id, t.deleted_at)?;
    }
    tx.commit().context("commit replace transaction")?;
    Ok(())
}

/// Stores a bet from the backend unless the local copy or a local delete is
/// at least as recent. Returns whether the bet was written.
pub fn import_bet(conn: &Connection, bet: &Bet) -> Result<bool> {
    if !accept_bet(bet) {
        return Ok(false);
    }
    if let Some(deleted_at) = tombstone_at(conn, RecordKind::Bet, &bet.id)?
        && deleted_at >= bet.updated_at
    {
        debug!(bet = %bet.id, deleted_at, "skipping deleted bet");
        return Ok(false);
    }
    let newer = get_bet(conn, &bet.id)?.is_none_or(|local| bet.updated_at > local.updated_at);
    if newer {
        upsert_bet(conn, bet)?;
    }
    Ok(newer)
}

pub fn tombstone_at(conn: &Connection, kind: RecordKind, id: &str) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT deleted_at FROM tombstones WHERE kind = ?1 AND id = ?2",
        params![kind.as_str(), id],
        |row| row.get(0),
    )
    .optional()
    .context("query tombstone")
}

fn accept_bet(bet: &Bet) -> bool {
    match bet.validate() {
        Ok(()) => true,
        Err(err) => {
            warn!(bet = %bet.id, error = %err, "skipping invalid bet");
            false
        }
    }
}

fn without_invalid_bets(snapshot: &Snapshot) -> Snapshot {
    let mut out = snapshot.clone();
    out.bets.retain(accept_bet);
    out
}

fn parse_column<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = anyhow::Error>,
{
    raw.parse::<T>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into()))
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
    what: &'static str,
) -> Result<Vec<T>> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context(what)?);
    }
    Ok(out)
}
