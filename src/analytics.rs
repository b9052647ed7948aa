use std::collections::HashMap;

use serde::Serialize;

use crate::elo::{self, EloConfig};
use crate::model::{Match, Team};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StandingRow {
    pub team_id: u32,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub points: u32,
    /// Most recent result last, at most five characters of W/D/L.
    pub form: String,
}

impl StandingRow {
    pub fn goal_difference(&self) -> i64 {
        i64::from(self.goals_for) - i64::from(self.goals_against)
    }
}

/// League table from finished matches. Names come from `teams` when known.
pub fn standings(matches: &[Match], league_id: u32, teams: &[Team]) -> Vec<StandingRow> {
    let names: HashMap<u32, &str> = teams.iter().map(|t| (t.id, t.name.as_str())).collect();
    let mut finished: Vec<&Match> = matches
        .iter()
        .filter(|m| m.league_id == league_id && m.outcome().is_some())
        .collect();
    finished.sort_by(|a, b| a.kickoff.cmp(&b.kickoff).then(a.id.cmp(&b.id)));

    let mut table: HashMap<u32, StandingRow> = HashMap::new();
    let mut results: HashMap<u32, Vec<char>> = HashMap::new();
    for m in finished {
        let (Some(hg), Some(ag)) = (m.home_goals, m.away_goals) else {
            continue;
        };
        for (team_id, name, gf, ga) in [
            (m.home_team_id, m.home.as_str(), hg, ag),
            (m.away_team_id, m.away.as_str(), ag, hg),
        ] {
            let row = table.entry(team_id).or_insert_with(|| StandingRow {
                team_id,
                team: names.get(&team_id).copied().unwrap_or(name).to_string(),
                ..StandingRow::default()
            });
            row.played += 1;
            row.goals_for += u32::from(gf);
            row.goals_against += u32::from(ga);
            let result = match gf.cmp(&ga) {
                std::cmp::Ordering::Greater => {
                    row.won += 1;
                    row.points += 3;
                    'W'
                }
                std::cmp::Ordering::Equal => {
                    row.drawn += 1;
                    row.points += 1;
                    'D'
                }
                std::cmp::Ordering::Less => {
                    row.lost += 1;
                    'L'
                }
            };
            results.entry(team_id).or_default().push(result);
        }
    }

    let mut rows: Vec<StandingRow> = table
        .into_values()
        .map(|mut row| {
            if let Some(r) = results.get(&row.team_id) {
                let start = r.len().saturating_sub(5);
                row.form = r[start..].iter().collect();
            }
            row
        })
        .collect();
    rows.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference().cmp(&a.goal_difference()))
            .then(b.goals_for.cmp(&a.goals_for))
            .then(a.team.cmp(&b.team))
    });
    rows
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamForm {
    pub team_id: u32,
    pub played: u32,
    /// W/D/L, oldest first.
    pub results: String,
    pub goals_for: u32,
    pub goals_against: u32,
    pub clean_sheets: u32,
    pub btts_rate: f64,
    pub over_2_5_rate: f64,
    pub points_per_game: f64,
    pub corners_for_avg: Option<f64>,
    pub corners_against_avg: Option<f64>,
    pub corner_samples: u32,
}

/// Form over the team's last `last_n` finished matches (any league).
pub fn team_form(matches: &[Match], team_id: u32, last_n: usize) -> TeamForm {
    let mut played: Vec<&Match> = matches
        .iter()
        .filter(|m| m.involves(team_id) && m.outcome().is_some())
        .collect();
    played.sort_by(|a, b| a.kickoff.cmp(&b.kickoff).then(a.id.cmp(&b.id)));
    let start = played.len().saturating_sub(last_n);
    let window = &played[start..];

    let mut out = TeamForm {
        team_id,
        ..TeamForm::default()
    };
    let mut points = 0u32;
    let mut btts = 0u32;
    let mut over = 0u32;
    let mut corners_for = Vec::new();
    let mut corners_against = Vec::new();

    for m in window {
        let (Some(hg), Some(ag)) = (m.home_goals, m.away_goals) else {
            continue;
        };
        let home = m.home_team_id == team_id;
        let (gf, ga) = if home { (hg, ag) } else { (ag, hg) };
        out.played += 1;
        out.goals_for += u32::from(gf);
        out.goals_against += u32::from(ga);
        if ga == 0 {
            out.clean_sheets += 1;
        }
        if hg > 0 && ag > 0 {
            btts += 1;
        }
        if u32::from(hg) + u32::from(ag) > 2 {
            over += 1;
        }
        out.results.push(if gf > ga {
            points += 3;
            'W'
        } else if gf == ga {
            points += 1;
            'D'
        } else {
            'L'
        });
        if let (Some(hc), Some(ac)) = (m.home_corners, m.away_corners) {
            let (cf, ca) = if home { (hc, ac) } else { (ac, hc) };
            corners_for.push(f64::from(cf));
            corners_against.push(f64::from(ca));
        }
    }

    if out.played > 0 {
        let n = f64::from(out.played);
        out.btts_rate = f64::from(btts) / n;
        out.over_2_5_rate = f64::from(over) / n;
        out.points_per_game = f64::from(points) / n;
    }
    out.corner_samples = corners_for.len() as u32;
    out.corners_for_avg = mean(&corners_for);
    out.corners_against_avg = mean(&corners_against);
    out
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadToHead {
    pub matches: u32,
    pub a_wins: u32,
    pub draws: u32,
    pub b_wins: u32,
    pub a_goals: u32,
    pub b_goals: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamComparison {
    pub a: TeamForm,
    pub b: TeamForm,
    pub head_to_head: HeadToHead,
    pub elo_a: f64,
    pub elo_b: f64,
    /// Probability that `a` beats `b` on neutral ground, draws counted as half.
    pub expected_a: f64,
}

pub fn compare_teams(matches: &[Match], a: u32, b: u32, last_n: usize) -> TeamComparison {
    let mut h2h = HeadToHead::default();
    for m in matches
        .iter()
        .filter(|m| m.involves(a) && m.involves(b) && a != b)
    {
        let (Some(hg), Some(ag)) = (m.home_goals, m.away_goals) else {
            continue;
        };
        if m.outcome().is_none() {
            continue;
        }
        let (ga, gb) = if m.home_team_id == a { (hg, ag) } else { (ag, hg) };
        h2h.matches += 1;
        h2h.a_goals += u32::from(ga);
        h2h.b_goals += u32::from(gb);
        match ga.cmp(&gb) {
            std::cmp::Ordering::Greater => h2h.a_wins += 1,
            std::cmp::Ordering::Equal => h2h.draws += 1,
            std::cmp::Ordering::Less => h2h.b_wins += 1,
        }
    }

    let ratings = elo::compute_elo(matches, None, EloConfig::default());
    let elo_a = elo::rating(&ratings, a);
    let elo_b = elo::rating(&ratings, b);
    TeamComparison {
        a: team_form(matches, a, last_n),
        b: team_form(matches, b, last_n),
        head_to_head: h2h,
        elo_a,
        elo_b,
        expected_a: elo::expected_score(elo_a, elo_b),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
