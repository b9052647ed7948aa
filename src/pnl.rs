use std::cmp::Ordering;
use std::collections::BTreeMap;

use anyhow::{Result, anyhow};
use serde::Serialize;

use crate::model::{Bet, BetStatus};
use crate::odds;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PnlSummary {
    pub total: usize,
    pub pending: usize,
    pub won: usize,
    pub lost: usize,
    pub push: usize,
    pub void: usize,
    /// Stakes of won/lost bets. Push and void stakes come back untouched.
    pub staked: f64,
    pub pending_exposure: f64,
    /// Money handed back on settled bets (winning payouts plus push/void stakes).
    pub returned: f64,
    pub net_profit: f64,
    pub roi: Option<f64>,
    pub win_rate: Option<f64>,
    pub avg_decimal_odds: Option<f64>,
    pub longest_win_streak: usize,
    /// Positive for a run of wins, negative for a run of losses.
    pub current_streak: i32,
}

/// Net result of a settled bet. `None` while pending.
pub fn bet_result(bet: &Bet) -> Option<f64> {
    match bet.status {
        BetStatus::Pending => None,
        BetStatus::Won => Some(odds::profit_unchecked(bet.stake, bet.odds)),
        BetStatus::Lost => Some(-bet.stake),
        BetStatus::Push | BetStatus::Void => Some(0.0),
    }
}

/// Moves a bet to a terminal status. Re-settling corrects an earlier result.
pub fn settle(bet: &mut Bet, status: BetStatus, now: i64) -> Result<()> {
    if status == BetStatus::Pending {
        return Err(anyhow!("cannot settle bet {} back to pending", bet.id));
    }
    bet.status = status;
    bet.settled_at = Some(now);
    bet.updated_at = now;
    Ok(())
}

/// Clears a settlement, returning the bet to pending.
pub fn reopen(bet: &mut Bet, now: i64) {
    bet.status = BetStatus::Pending;
    bet.settled_at = None;
    bet.updated_at = now;
}

pub fn summarize<'a, I>(bets: I) -> PnlSummary
where
    I: IntoIterator<Item = &'a Bet>,
{
    let mut out = PnlSummary::default();
    let mut decimal_sum = 0.0;
    let mut settled: Vec<&Bet> = Vec::new();

    for bet in bets {
        out.total += 1;
        decimal_sum += odds::decimal_unchecked(bet.odds);
        match bet.status {
            BetStatus::Pending => {
                out.pending += 1;
                out.pending_exposure += bet.stake;
                continue;
            }
            BetStatus::Won => {
                out.won += 1;
                out.staked += bet.stake;
                out.returned += bet.stake + odds::profit_unchecked(bet.stake, bet.odds);
            }
            BetStatus::Lost => {
                out.lost += 1;
                out.staked += bet.stake;
            }
            BetStatus::Push => {
                out.push += 1;
                out.returned += bet.stake;
            }
            BetStatus::Void => {
                out.void += 1;
                out.returned += bet.stake;
            }
        }
        out.net_profit += bet_result(bet).unwrap_or_default();
        settled.push(bet);
    }

    if out.total > 0 {
        out.avg_decimal_odds = Some(decimal_sum / out.total as f64);
    }
    if out.staked > 0.0 {
        out.roi = Some(out.net_profit / out.staked);
    }
    let decided = out.won + out.lost;
    if decided > 0 {
        out.win_rate = Some(out.won as f64 / decided as f64);
    }

    settled.sort_by(|a, b| settlement_order(a, b));
    let mut run = 0i32;
    for bet in settled {
        match bet.status {
            BetStatus::Won => {
                run = if run > 0 { run + 1 } else { 1 };
                out.longest_win_streak = out.longest_win_streak.max(run as usize);
            }
            BetStatus::Lost => {
                run = if run < 0 { run - 1 } else { -1 };
            }
            // Pushes and voids neither extend nor break a streak.
            _ => {}
        }
    }
    out.current_streak = run;
    out
}

pub fn breakdown_by_market(bets: &[Bet]) -> BTreeMap<String, PnlSummary> {
    breakdown_by(bets, |bet| bet.market.as_str().to_string())
}

pub fn breakdown_by_league(bets: &[Bet]) -> BTreeMap<String, PnlSummary> {
    breakdown_by(bets, |bet| {
        bet.league
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or("Unknown")
            .to_string()
    })
}

fn breakdown_by(bets: &[Bet], key: impl Fn(&Bet) -> String) -> BTreeMap<String, PnlSummary> {
    let mut groups: BTreeMap<String, Vec<&Bet>> = BTreeMap::new();
    for bet in bets {
        groups.entry(key(bet)).or_default().push(bet);
    }
    groups
        .into_iter()
        .map(|(k, group)| (k, summarize(group)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquityPoint {
    pub settled_at: i64,
    pub bet_id: String,
    pub result: f64,
    pub cumulative: f64,
}

/// Cumulative net profit across settled bets, in settlement order.
pub fn equity_curve(bets: &[Bet]) -> Vec<EquityPoint> {
    let mut settled: Vec<&Bet> = bets.iter().filter(|b| b.status.is_settled()).collect();
    settled.sort_by(|a, b| settlement_order(a, b));

    let mut cumulative = 0.0;
    settled
        .into_iter()
        .filter_map(|bet| {
            let result = bet_result(bet)?;
            cumulative += result;
            Some(EquityPoint {
                settled_at: bet.settled_at.unwrap_or(bet.placed_at),
                bet_id: bet.id.clone(),
                result,
                cumulative,
            })
        })
        .collect()
}

/// Largest peak-to-trough fall of the equity curve.
pub fn max_drawdown(curve: &[EquityPoint]) -> f64 {
    let mut peak = 0.0f64;
    let mut worst = 0.0f64;
    for point in curve {
        peak = peak.max(point.cumulative);
        worst = worst.max(peak - point.cumulative);
    }
    worst
}

fn settlement_order(a: &Bet, b: &Bet) -> Ordering {
    let ta = a.settled_at.unwrap_or(a.placed_at);
    let tb = b.settled_at.unwrap_or(b.placed_at);
    ta.cmp(&tb).then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Market;

    fn bet(id: &str, odds: i32, stake: f64, status: BetStatus, settled_at: Option<i64>) -> Bet {
        Bet {
            id: id.to_string(),
            match_id: None,
            event: "A vs B".to_string(),
            league: None,
            market: Market::MatchResult,
            selection: "A".to_string(),
            odds,
            stake,
            status,
            placed_at: 0,
            settled_at,
            notes: None,
            updated_at: 0,
        }
    }

    #[test]
    fn bet_result_by_status() {
        assert_eq!(bet_result(&bet("a", 200, 10.0, BetStatus::Won, Some(1))), Some(20.0));
        assert_eq!(bet_result(&bet("a", 200, 10.0, BetStatus::Lost, Some(1))), Some(-10.0));
        assert_eq!(bet_result(&bet("a", 200, 10.0, BetStatus::Push, Some(1))), Some(0.0));
        assert_eq!(bet_result(&bet("a", 200, 10.0, BetStatus::Pending, None)), None);
    }

    #[test]
    fn settle_rejects_pending_target() {
        let mut b = bet("a", 200, 10.0, BetStatus::Pending, None);
        assert!(settle(&mut b, BetStatus::Pending, 5).is_err());
        settle(&mut b, BetStatus::Won, 5).unwrap();
        assert_eq!(b.settled_at, Some(5));
        settle(&mut b, BetStatus::Lost, 9).unwrap();
        assert_eq!(b.status, BetStatus::Lost);
        assert_eq!(b.updated_at, 9);
        reopen(&mut b, 11);
        assert_eq!(b.status, BetStatus::Pending);
        assert_eq!(b.settled_at, None);
    }

    #[test]
    fn streaks_skip_pushes() {
        let bets = vec![
            bet("1", 100, 10.0, BetStatus::Won, Some(1)),
            bet("2", 100, 10.0, BetStatus::Push, Some(2)),
            bet("3", 100, 10.0, BetStatus::Won, Some(3)),
            bet("4", 100, 10.0, BetStatus::Lost, Some(4)),
            bet("5", 100, 10.0, BetStatus::Lost, Some(5)),
        ];
        let s = summarize(&bets);
        assert_eq!(s.longest_win_streak, 2);
        assert_eq!(s.current_streak, -2);
    }

    #[test]
    fn drawdown_tracks_peak() {
        let bets = vec![
            bet("1", 100, 10.0, BetStatus::Won, Some(1)),
            bet("2", 100, 10.0, BetStatus::Won, Some(2)),
            bet("3", 100, 15.0, BetStatus::Lost, Some(3)),
            bet("4", 100, 10.0, BetStatus::Lost, Some(4)),
            bet("5", 100, 10.0, BetStatus::Won, Some(5)),
        ];
        let curve = equity_curve(&bets);
        assert!((max_drawdown(&curve) - 25.0).abs() < 1e-9);
    }
}
