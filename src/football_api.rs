use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::MaestroConfig;
use crate::http_cache::{fetch_json_cached, unix_now};
use crate::http_client::http_client;
use crate::model::{League, Match, MatchStatus, Team};
use crate::odds;

const API_KEY_HEADER: &str = "x-apisports-key";
const MATCH_WINNER_BET: &str = "Match Winner";

/// Client for the API-Football v3 REST API.
#[derive(Debug, Clone)]
pub struct FootballApi {
    base: String,
    key: String,
    ttl_secs: u64,
}

#[derive(Debug, Clone, Default)]
pub struct FixtureQuery {
    pub league: Option<u32>,
    pub season: Option<u16>,
    pub team: Option<u32>,
    /// `YYYY-MM-DD`
    pub from: Option<String>,
    pub to: Option<String>,
    pub next: Option<u8>,
}

impl FixtureQuery {
    fn to_query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(league) = self.league {
            parts.push(format!("league={league}"));
        }
        if let Some(season) = self.season {
            parts.push(format!("season={season}"));
        }
        if let Some(team) = self.team {
            parts.push(format!("team={team}"));
        }
        if let Some(from) = self.from.as_deref() {
            parts.push(format!("from={from}"));
        }
        if let Some(to) = self.to.as_deref() {
            parts.push(format!("to={to}"));
        }
        if let Some(next) = self.next {
            parts.push(format!("next={next}"));
        }
        parts.join("&")
    }
}

/// Consensus three-way price for a fixture.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchOdds {
    pub fixture_id: u64,
    pub bookmakers: usize,
    pub home: i32,
    pub draw: i32,
    pub away: i32,
}

impl FootballApi {
    pub fn from_config(cfg: &MaestroConfig) -> Result<Self> {
        let key = cfg
            .football_api_key
            .clone()
            .context("FOOTBALL_API_KEY missing")?;
        Ok(Self {
            base: cfg.football_api_base.clone(),
            key,
            ttl_secs: cfg.cache_ttl_secs,
        })
    }

    fn get(&self, path_and_query: &str) -> Result<String> {
        let client = http_client()?;
        let url = format!("{}{}", self.base, path_and_query);
        debug!(url = %url, "football api request");
        fetch_json_cached(client, &url, &[(API_KEY_HEADER, &self.key)], self.ttl_secs)
            .with_context(|| format!("football api request failed: {path_and_query}"))
    }

    pub fn fetch_leagues(&self, country: Option<&str>, season: Option<u16>) -> Result<Vec<League>> {
        let mut query = Vec::new();
        if let Some(country) = country.map(str::trim).filter(|c| !c.is_empty()) {
            query.push(format!("country={}", country.replace(' ', "%20")));
        }
        if let Some(season) = season {
            query.push(format!("season={season}"));
        }
        let path = if query.is_empty() {
            "/leagues".to_string()
        } else {
            format!("/leagues?{}", query.join("&"))
        };
        parse_leagues_json(&self.get(&path)?)
    }

    pub fn fetch_teams(&self, league: u32, season: u16) -> Result<Vec<Team>> {
        let body = self.get(&format!("/teams?league={league}&season={season}"))?;
        parse_teams_json(&body, Some(league))
    }

    pub fn fetch_fixtures(&self, query: &FixtureQuery) -> Result<Vec<Match>> {
        let qs = query.to_query_string();
        if qs.is_empty() {
            return Err(anyhow!("fixture query needs at least one filter"));
        }
        parse_fixtures_json(&self.get(&format!("/fixtures?{qs}"))?)
    }

    /// Corner counts per team id for one fixture.
    pub fn fetch_fixture_corners(&self, fixture_id: u64) -> Result<HashMap<u32, u8>> {
        let body = self.get(&format!("/fixtures/statistics?fixture={fixture_id}"))?;
        parse_fixture_corners_json(&body)
    }

    pub fn fetch_match_odds(&self, fixture_id: u64) -> Result<Option<MatchOdds>> {
        let body = self.get(&format!("/odds?fixture={fixture_id}"))?;
        parse_odds_json(&body).map(|mut all| all.pop())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    errors: Value,
    #[serde(default = "Vec::new")]
    response: Vec<T>,
}

fn parse_envelope<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<Vec<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow!("empty football api response"));
    }
    let env: Envelope<T> = serde_json::from_str(trimmed).context("invalid football api json")?;
    if let Some(message) = api_error_message(&env.errors) {
        return Err(anyhow!("football api error: {message}"));
    }
    Ok(env.response)
}

/// `errors` is `[]` when fine and an object or array of messages otherwise.
fn api_error_message(errors: &Value) -> Option<String> {
    match errors {
        Value::Object(map) if !map.is_empty() => Some(
            map.iter()
                .map(|(k, v)| match v.as_str() {
                    Some(s) => format!("{k}: {s}"),
                    None => format!("{k}: {v}"),
                })
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Value::Array(items) if !items.is_empty() => Some(
            items
                .iter()
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .collect::<Vec<_>>()
                .join("; "),
        ),
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct LeagueItem {
    league: LeagueInfo,
    #[serde(default)]
    country: Option<CountryInfo>,
    #[serde(default)]
    seasons: Vec<SeasonInfo>,
}

#[derive(Debug, Deserialize)]
struct LeagueInfo {
    id: u32,
    name: String,
    #[serde(default)]
    logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CountryInfo {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeasonInfo {
    year: u16,
    #[serde(default)]
    current: bool,
}

pub fn parse_leagues_json(raw: &str) -> Result<Vec<League>> {
    let items: Vec<LeagueItem> = parse_envelope(raw)?;
    let now = unix_now();
    Ok(items
        .into_iter()
        .map(|item| {
            let season = item
                .seasons
                .iter()
                .find(|s| s.current)
                .or_else(|| item.seasons.iter().max_by_key(|s| s.year))
                .map(|s| s.year);
            League {
                id: item.league.id,
                name: item.league.name,
                country: item.country.and_then(|c| c.name),
                season,
                logo: item.league.logo,
                updated_at: now,
            }
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct TeamItem {
    team: TeamInfo,
}

#[derive(Debug, Deserialize)]
struct TeamInfo {
    id: u32,
    name: String,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    logo: Option<String>,
}

pub fn parse_teams_json(raw: &str, league_id: Option<u32>) -> Result<Vec<Team>> {
    let items: Vec<TeamItem> = parse_envelope(raw)?;
    let now = unix_now();
    Ok(items
        .into_iter()
        .map(|item| Team {
            id: item.team.id,
            name: item.team.name,
            short_name: item.team.code.filter(|c| !c.trim().is_empty()),
            country: item.team.country,
            logo: item.team.logo,
            league_id,
            updated_at: now,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct FixtureItem {
    fixture: FixtureInfo,
    league: FixtureLeague,
    teams: FixtureTeams,
    #[serde(default)]
    goals: Option<FixtureGoals>,
}

#[derive(Debug, Deserialize)]
struct FixtureInfo {
    id: u64,
    date: String,
    status: FixtureStatus,
}

#[derive(Debug, Deserialize)]
struct FixtureStatus {
    short: String,
}

#[derive(Debug, Deserialize)]
struct FixtureLeague {
    id: u32,
    #[serde(default)]
    season: Option<u16>,
    #[serde(default)]
    round: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FixtureTeams {
    home: FixtureTeam,
    away: FixtureTeam,
}

#[derive(Debug, Deserialize)]
struct FixtureTeam {
    id: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
struct FixtureGoals {
    home: Option<u8>,
    away: Option<u8>,
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<Match>> {
    let items: Vec<FixtureItem> = parse_envelope(raw)?;
    let now = unix_now();
    let mut out: Vec<Match> = items
        .into_iter()
        .map(|item| {
            let (home_goals, away_goals) = item
                .goals
                .map(|g| (g.home, g.away))
                .unwrap_or((None, None));
            Match {
                id: item.fixture.id,
                league_id: item.league.id,
                season: item.league.season,
                round: item.league.round,
                kickoff: item.fixture.date,
                home_team_id: item.teams.home.id,
                away_team_id: item.teams.away.id,
                home: item.teams.home.name,
                away: item.teams.away.name,
                home_goals,
                away_goals,
                status: MatchStatus::from_short_code(&item.fixture.status.short),
                home_corners: None,
                away_corners: None,
                updated_at: now,
            }
        })
        .collect();
    out.sort_by(|a, b| a.kickoff.cmp(&b.kickoff).then(a.id.cmp(&b.id)));
    Ok(out)
}

#[derive(Debug, Deserialize)]
struct StatisticsItem {
    team: StatisticsTeam,
    #[serde(default)]
    statistics: Vec<StatisticEntry>,
}

#[derive(Debug, Deserialize)]
struct StatisticsTeam {
    id: u32,
}

#[derive(Debug, Deserialize)]
struct StatisticEntry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Value,
}

pub fn parse_fixture_corners_json(raw: &str) -> Result<HashMap<u32, u8>> {
    let items: Vec<StatisticsItem> = parse_envelope(raw)?;
    let mut out = HashMap::new();
    for item in items {
        let corners = item
            .statistics
            .iter()
            .find(|s| s.kind.eq_ignore_ascii_case("Corner Kicks"))
            .and_then(|s| stat_value_u8(&s.value));
        if let Some(corners) = corners {
            out.insert(item.team.id, corners);
        }
    }
    Ok(out)
}

fn stat_value_u8(v: &Value) -> Option<u8> {
    match v {
        Value::Number(n) => n.as_u64().and_then(|n| u8::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        // The API reports `null` for zero on some fixtures.
        Value::Null => Some(0),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
struct OddsItem {
    fixture: OddsFixture,
    #[serde(default)]
    bookmakers: Vec<OddsBookmaker>,
}

#[derive(Debug, Deserialize)]
struct OddsFixture {
    id: u64,
}

#[derive(Debug, Deserialize)]
struct OddsBookmaker {
    #[serde(default)]
    bets: Vec<OddsBet>,
}

#[derive(Debug, Deserialize)]
struct OddsBet {
    name: String,
    #[serde(default)]
    values: Vec<OddsValue>,
}

#[derive(Debug, Deserialize)]
struct OddsValue {
    value: String,
    odd: String,
}

/// Median "Match Winner" price per outcome across bookmakers.
pub fn parse_odds_json(raw: &str) -> Result<Vec<MatchOdds>> {
    let items: Vec<OddsItem> = parse_envelope(raw)?;
    let mut out = Vec::new();
    for item in items {
        let mut home = Vec::new();
        let mut draw = Vec::new();
        let mut away = Vec::new();
        for book in &item.bookmakers {
            let Some(bet) = book
                .bets
                .iter()
                .find(|b| b.name.eq_ignore_ascii_case(MATCH_WINNER_BET))
            else {
                continue;
            };
            let mut triplet = (None, None, None);
            for v in &bet.values {
                let Ok(price) = v.odd.trim().parse::<f64>() else {
                    continue;
                };
                match v.value.trim().to_ascii_lowercase().as_str() {
                    "home" | "1" => triplet.0 = Some(price),
                    "draw" | "x" => triplet.1 = Some(price),
                    "away" | "2" => triplet.2 = Some(price),
                    _ => {}
                }
            }
            if let (Some(h), Some(d), Some(a)) = triplet
                && h > 1.0
                && d > 1.0
                && a > 1.0
            {
                home.push(h);
                draw.push(d);
                away.push(a);
            }
        }
        let (Some(h), Some(d), Some(a)) = (median_f64(&home), median_f64(&draw), median_f64(&away))
        else {
            continue;
        };
        out.push(MatchOdds {
            fixture_id: item.fixture.id,
            bookmakers: home.len(),
            home: odds::decimal_to_american(h)?,
            draw: odds::decimal_to_american(d)?,
            away: odds::decimal_to_american(a)?,
        });
    }
    Ok(out)
}

fn median_f64(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

#[cfg(test)]
mod tests {
    use super::{FixtureQuery, api_error_message, median_f64};
    use serde_json::json;

    #[test]
    fn error_field_shapes() {
        assert_eq!(api_error_message(&json!([])), None);
        assert_eq!(api_error_message(&json!({})), None);
        assert_eq!(
            api_error_message(&json!({"token": "Error/Missing application key"})).as_deref(),
            Some("token: Error/Missing application key")
        );
        assert_eq!(
            api_error_message(&json!(["rate limit"])).as_deref(),
            Some("rate limit")
        );
    }

    #[test]
    fn fixture_query_string_in_fixed_order() {
        let q = FixtureQuery {
            league: Some(39),
            season: Some(2025),
            from: Some("2025-08-01".to_string()),
            to: Some("2025-08-31".to_string()),
            ..FixtureQuery::default()
        };
        assert_eq!(
            q.to_query_string(),
            "league=39&season=2025&from=2025-08-01&to=2025-08-31"
        );
        assert_eq!(FixtureQuery::default().to_query_string(), "");
    }

    #[test]
    fn median_handles_even_and_odd() {
        assert_eq!(median_f64(&[]), None);
        assert_eq!(median_f64(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median_f64(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
    }
}
