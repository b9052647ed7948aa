//! Value bet detection and corner picks.
//!
//! Model probabilities come from Elo ratings, prices from the consensus
//! bookmaker odds. Corner picks use a Poisson model over recent corner counts.

use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;

use crate::analytics;
use crate::config::MaestroConfig;
use crate::elo;
use crate::football_api::MatchOdds;
use crate::model::Match;
use crate::odds;

#[derive(Debug, Clone, Copy)]
pub struct ValueConfig {
    pub min_edge: f64,
    pub kelly_fraction: f64,
    pub bankroll: f64,
    /// Hard cap on a single stake, as a fraction of bankroll.
    pub max_stake_fraction: f64,
    /// Draw probability between evenly matched teams.
    pub draw_base: f64,
    pub home_adv_pts: f64,
}

impl Default for ValueConfig {
    fn default() -> Self {
        Self {
            min_edge: 0.03,
            kelly_fraction: 0.25,
            bankroll: 1000.0,
            max_stake_fraction: 0.05,
            draw_base: 0.28,
            home_adv_pts: 60.0,
        }
    }
}

impl ValueConfig {
    pub fn from_config(cfg: &MaestroConfig) -> Self {
        Self {
            min_edge: cfg.min_edge,
            kelly_fraction: cfg.kelly_fraction,
            bankroll: cfg.bankroll,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Outcome {
    Home,
    Draw,
    Away,
}

impl Outcome {
    pub fn label(self) -> &'static str {
        match self {
            Outcome::Home => "Home",
            Outcome::Draw => "Draw",
            Outcome::Away => "Away",
        }
    }
}

/// Home/draw/away probabilities, summing to one.
pub fn outcome_probabilities(elo_home: f64, elo_away: f64, cfg: &ValueConfig) -> (f64, f64, f64) {
    let e = elo::expected_score(elo_home + cfg.home_adv_pts, elo_away);
    let closeness = 1.0 - (2.0 * e - 1.0).abs();
    let p_draw = cfg.draw_base * closeness;
    let p_home = (e - p_draw / 2.0).max(0.01);
    let p_away = (1.0 - e - p_draw / 2.0).max(0.01);
    let p_draw = p_draw.max(0.01);
    let sum = p_home + p_draw + p_away;
    (p_home / sum, p_draw / sum, p_away / sum)
}

#[derive(Debug, Clone)]
pub struct PricedMatch {
    pub fixture: Match,
    pub odds: MatchOdds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueBet {
    pub match_id: u64,
    pub event: String,
    pub kickoff: String,
    pub selection: Outcome,
    pub odds: i32,
    pub model_prob: f64,
    pub implied_prob: f64,
    pub edge: f64,
    pub expected_value: f64,
    pub stake: f64,
}

pub fn find_value_bets(
    priced: &[PricedMatch],
    ratings: &HashMap<u32, f64>,
    cfg: &ValueConfig,
) -> Result<Vec<ValueBet>> {
    let mut out = Vec::new();
    for pm in priced {
        let m = &pm.fixture;
        let (ph, pd, pa) = outcome_probabilities(
            elo::rating(ratings, m.home_team_id),
            elo::rating(ratings, m.away_team_id),
            cfg,
        );
        for (selection, model_prob, price) in [
            (Outcome::Home, ph, pm.odds.home),
            (Outcome::Draw, pd, pm.odds.draw),
            (Outcome::Away, pa, pm.odds.away),
        ] {
            let implied_prob = odds::implied_probability(price)?;
            let edge = odds::edge(model_prob, implied_prob);
            let ev = odds::expected_value(model_prob, price)?;
            if edge < cfg.min_edge || ev <= 0.0 {
                continue;
            }
            let kelly = odds::kelly_fraction(model_prob, price)? * cfg.kelly_fraction;
            let stake = (kelly.min(cfg.max_stake_fraction) * cfg.bankroll * 100.0).round() / 100.0;
            out.push(ValueBet {
                match_id: m.id,
                event: m.label(),
                kickoff: m.kickoff.clone(),
                selection,
                odds: price,
                model_prob,
                implied_prob,
                edge,
                expected_value: ev,
                stake,
            });
        }
    }
    out.sort_by(|a, b| {
        b.expected_value
            .partial_cmp(&a.expected_value)
            .unwrap_or(Ordering::Equal)
            .then(a.match_id.cmp(&b.match_id))
    });
    Ok(out)
}

#[derive(Debug, Clone, Copy)]
pub struct CornerConfig {
    pub line: f64,
    /// Required distance of P(over) from 0.5 before a side is picked.
    pub margin: f64,
    pub min_samples: u32,
    pub last_n: usize,
}

impl Default for CornerConfig {
    fn default() -> Self {
        Self {
            line: 9.5,
            margin: 0.08,
            min_samples: 3,
            last_n: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CornerSide {
    Over,
    Under,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CornerPick {
    pub match_id: u64,
    pub event: String,
    pub line: f64,
    pub expected_total: f64,
    pub p_over: f64,
    pub side: CornerSide,
}

/// Corner over/under picks for `fixtures`, using corner history from `history`.
pub fn corner_picks(history: &[Match], fixtures: &[Match], cfg: &CornerConfig) -> Vec<CornerPick> {
    let mut out = Vec::new();
    for m in fixtures {
        let home = analytics::team_form(history, m.home_team_id, cfg.last_n);
        let away = analytics::team_form(history, m.away_team_id, cfg.last_n);
        if home.corner_samples < cfg.min_samples || away.corner_samples < cfg.min_samples {
            continue;
        }
        let (Some(hf), Some(ha), Some(af), Some(aa)) = (
            home.corners_for_avg,
            home.corners_against_avg,
            away.corners_for_avg,
            away.corners_against_avg,
        ) else {
            continue;
        };
        let expected_total = (hf + aa) / 2.0 + (af + ha) / 2.0;
        let p_over = poisson_over(cfg.line, expected_total);
        let side = if p_over >= 0.5 + cfg.margin {
            CornerSide::Over
        } else if p_over <= 0.5 - cfg.margin {
            CornerSide::Under
        } else {
            continue;
        };
        out.push(CornerPick {
            match_id: m.id,
            event: m.label(),
            line: cfg.line,
            expected_total,
            p_over,
            side,
        });
    }
    out.sort_by(|a, b| {
        let da = (a.p_over - 0.5).abs();
        let db = (b.p_over - 0.5).abs();
        db.partial_cmp(&da)
            .unwrap_or(Ordering::Equal)
            .then(a.match_id.cmp(&b.match_id))
    });
    out
}

/// P(X > line) for X ~ Poisson(lambda).
pub fn poisson_over(line: f64, lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 0.0;
    }
    let k_max = line.floor().max(-1.0) as i64;
    if k_max < 0 {
        return 1.0;
    }
    let mut term = (-lambda).exp();
    let mut cdf = term;
    for k in 1..=k_max {
        term *= lambda / k as f64;
        cdf += term;
    }
    (1.0 - cdf).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probabilities_sum_to_one_and_favour_stronger_side() {
        let cfg = ValueConfig::default();
        let (h, d, a) = outcome_probabilities(1700.0, 1450.0, &cfg);
        assert!((h + d + a - 1.0).abs() < 1e-9);
        assert!(h > a);
        let (_, even_draw, _) = outcome_probabilities(1500.0, 1560.0, &cfg);
        assert!(even_draw > d);
    }

    #[test]
    fn poisson_over_matches_closed_form() {
        // P(X > 0.5) = 1 - e^-lambda
        assert!((poisson_over(0.5, 2.0) - (1.0 - (-2.0f64).exp())).abs() < 1e-12);
        assert!(poisson_over(9.5, 12.0) > 0.6);
        assert!(poisson_over(9.5, 7.0) < 0.25);
        assert_eq!(poisson_over(9.5, 0.0), 0.0);
    }
}
