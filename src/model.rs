use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub season: Option<u16>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub league_id: Option<u32>,
    #[serde(default)]
    pub updated_at: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
    Postponed,
    Cancelled,
}

impl MatchStatus {
    /// Maps API-Football `fixture.status.short` codes.
    pub fn from_short_code(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "1H" | "HT" | "2H" | "ET" | "BT" | "P" | "LIVE" | "INT" => MatchStatus::Live,
            "FT" | "AET" | "PEN" => MatchStatus::Finished,
            "PST" | "SUSP" => MatchStatus::Postponed,
            "CANC" | "ABD" | "AWD" | "WO" => MatchStatus::Cancelled,
            _ => MatchStatus::Scheduled,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
            MatchStatus::Postponed => "postponed",
            MatchStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for MatchStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "live" => Ok(MatchStatus::Live),
            "finished" => Ok(MatchStatus::Finished),
            "postponed" => Ok(MatchStatus::Postponed),
            "cancelled" | "canceled" => Ok(MatchStatus::Cancelled),
            other => Err(anyhow!("unknown match status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: u64,
    pub league_id: u32,
    #[serde(default)]
    pub season: Option<u16>,
    #[serde(default)]
    pub round: Option<String>,
    pub kickoff: String,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub home: String,
    pub away: String,
    #[serde(default)]
    pub home_goals: Option<u8>,
    #[serde(default)]
    pub away_goals: Option<u8>,
    pub status: MatchStatus,
    #[serde(default)]
    pub home_corners: Option<u8>,
    #[serde(default)]
    pub away_corners: Option<u8>,
    #[serde(default)]
    pub updated_at: i64,
}

impl Match {
    pub fn outcome(&self) -> Option<char> {
        if self.status != MatchStatus::Finished {
            return None;
        }
        let (Some(home), Some(away)) = (self.home_goals, self.away_goals) else {
            return None;
        };
        if home > away {
            Some('H')
        } else if home < away {
            Some('A')
        } else {
            Some('D')
        }
    }

    pub fn label(&self) -> String {
        format!("{} vs {}", self.home, self.away)
    }

    pub fn involves(&self, team_id: u32) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Market {
    MatchResult,
    DoubleChance,
    TotalGoals,
    BothTeamsScore,
    Handicap,
    Corners,
    Other,
}

impl Market {
    pub const ALL: [Market; 7] = [
        Market::MatchResult,
        Market::DoubleChance,
        Market::TotalGoals,
        Market::BothTeamsScore,
        Market::Handicap,
        Market::Corners,
        Market::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Market::MatchResult => "match_result",
            Market::DoubleChance => "double_chance",
            Market::TotalGoals => "total_goals",
            Market::BothTeamsScore => "both_teams_score",
            Market::Handicap => "handicap",
            Market::Corners => "corners",
            Market::Other => "other",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match key.as_str() {
            "match_result" | "1x2" | "moneyline" | "result" => Ok(Market::MatchResult),
            "double_chance" => Ok(Market::DoubleChance),
            "total_goals" | "totals" | "over_under" => Ok(Market::TotalGoals),
            "both_teams_score" | "btts" => Ok(Market::BothTeamsScore),
            "handicap" | "spread" => Ok(Market::Handicap),
            "corners" => Ok(Market::Corners),
            "other" => Ok(Market::Other),
            other => Err(anyhow!("unknown market: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
    Push,
    Void,
}

impl BetStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BetStatus::Pending => "pending",
            BetStatus::Won => "won",
            BetStatus::Lost => "lost",
            BetStatus::Push => "push",
            BetStatus::Void => "void",
        }
    }

    pub fn is_settled(self) -> bool {
        self != BetStatus::Pending
    }
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "open" => Ok(BetStatus::Pending),
            "won" | "win" => Ok(BetStatus::Won),
            "lost" | "loss" | "lose" => Ok(BetStatus::Lost),
            "push" => Ok(BetStatus::Push),
            "void" | "cancelled" => Ok(BetStatus::Void),
            other => Err(anyhow!("unknown bet status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bet {
    pub id: String,
    #[serde(default)]
    pub match_id: Option<u64>,
    pub event: String,
    #[serde(default)]
    pub league: Option<String>,
    pub market: Market,
    pub selection: String,
    /// American odds, e.g. `-150` or `+210`.
    pub odds: i32,
    pub stake: f64,
    pub status: BetStatus,
    pub placed_at: i64,
    #[serde(default)]
    pub settled_at: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub updated_at: i64,
}

/// Fields a user provides when recording a new bet.
#[derive(Debug, Clone)]
pub struct NewBet {
    pub match_id: Option<u64>,
    pub event: String,
    pub league: Option<String>,
    pub market: Market,
    pub selection: String,
    pub odds: i32,
    pub stake: f64,
    pub notes: Option<String>,
}

impl Bet {
    /// Builds a pending bet after validating odds and stake.
    pub fn create(new: NewBet, now: i64) -> anyhow::Result<Self> {
        crate::odds::validate_american(new.odds)?;
        crate::odds::validate_stake(new.stake)?;
        let event = new.event.trim().to_string();
        if event.is_empty() {
            return Err(anyhow!("bet event must not be empty"));
        }
        let selection = new.selection.trim().to_string();
        if selection.is_empty() {
            return Err(anyhow!("bet selection must not be empty"));
        }
        let id = bet_id(&event, new.market, &selection, new.odds, new.stake, now);
        Ok(Self {
            id,
            match_id: new.match_id,
            event,
            league: new.league.filter(|l| !l.trim().is_empty()),
            market: new.market,
            selection,
            odds: new.odds,
            stake: new.stake,
            status: BetStatus::Pending,
            placed_at: now,
            settled_at: None,
            notes: new.notes.filter(|n| !n.trim().is_empty()),
            updated_at: now,
        })
    }

    /// Checks a bet that arrived from elsewhere (backend, sync, backup).
    pub fn validate(&self) -> anyhow::Result<()> {
        crate::odds::validate_american(self.odds)?;
        crate::odds::validate_stake(self.stake)?;
        if self.id.trim().is_empty() {
            return Err(anyhow!("bet id must not be empty"));
        }
        Ok(())
    }
}

/// Id unique per creation. The hash mixes in the current sub-second time, so
/// two identical bets recorded in the same second still get distinct ids.
pub fn bet_id(event: &str, market: Market, selection: &str, odds: i32, stake: f64, now: i64) -> String {
    let nanos = chrono::Utc::now().timestamp_subsec_nanos();
    let mut hasher = Sha256::new();
    hasher.update(event.as_bytes());
    hasher.update(market.as_str().as_bytes());
    hasher.update(selection.as_bytes());
    hasher.update(odds.to_le_bytes());
    hasher.update(stake.to_le_bytes());
    hasher.update(now.to_le_bytes());
    hasher.update(nanos.to_le_bytes());
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    League,
    Team,
    Match,
    Bet,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::League => "league",
            RecordKind::Team => "team",
            RecordKind::Match => "match",
            RecordKind::Bet => "bet",
        }
    }
}

impl FromStr for RecordKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "league" => Ok(RecordKind::League),
            "team" => Ok(RecordKind::Team),
            "match" => Ok(RecordKind::Match),
            "bet" => Ok(RecordKind::Bet),
            other => Err(anyhow!("unknown record kind: {other}")),
        }
    }
}

/// Marks a deleted record so the deletion survives a merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tombstone {
    pub kind: RecordKind,
    pub id: String,
    pub deleted_at: i64,
}
