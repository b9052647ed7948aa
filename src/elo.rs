use std::collections::HashMap;

use crate::model::Match;

pub const BASE_RATING: f64 = 1500.0;

#[derive(Debug, Clone, Copy)]
pub struct EloConfig {
    pub k: f64,
    pub home_adv_pts: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        Self {
            k: 20.0,
            home_adv_pts: 60.0,
        }
    }
}

/// Ratings for every team seen in a finished match, optionally limited to one league.
pub fn compute_elo(matches: &[Match], league_id: Option<u32>, cfg: EloConfig) -> HashMap<u32, f64> {
    let mut finished: Vec<&Match> = matches
        .iter()
        .filter(|m| league_id.is_none_or(|id| m.league_id == id))
        .filter(|m| m.outcome().is_some())
        .collect();

    // Kickoffs are RFC 3339 from the same source, so string order is time order.
    finished.sort_by(|a, b| a.kickoff.cmp(&b.kickoff).then(a.id.cmp(&b.id)));

    let mut elo: HashMap<u32, f64> = HashMap::new();
    for m in finished {
        let eh = *elo.entry(m.home_team_id).or_insert(BASE_RATING);
        let ea = *elo.entry(m.away_team_id).or_insert(BASE_RATING);

        let expected_home = expected_score(eh + cfg.home_adv_pts, ea);
        let s_home = match m.outcome() {
            Some('H') => 1.0,
            Some('A') => 0.0,
            _ => 0.5,
        };

        let delta = cfg.k * (s_home - expected_home);
        elo.insert(m.home_team_id, eh + delta);
        elo.insert(m.away_team_id, ea - delta);
    }

    elo
}

pub fn rating(ratings: &HashMap<u32, f64>, team_id: u32) -> f64 {
    ratings.get(&team_id).copied().unwrap_or(BASE_RATING)
}

pub fn expected_score(r_a: f64, r_b: f64) -> f64 {
    1.0 / (1.0 + 10.0_f64.powf(-(r_a - r_b) / 400.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MatchStatus;

    fn finished(id: u64, kickoff: &str, home: u32, away: u32, hg: u8, ag: u8) -> Match {
        Match {
            id,
            league_id: 39,
            season: None,
            round: None,
            kickoff: kickoff.to_string(),
            home_team_id: home,
            away_team_id: away,
            home: home.to_string(),
            away: away.to_string(),
            home_goals: Some(hg),
            away_goals: Some(ag),
            status: MatchStatus::Finished,
            home_corners: None,
            away_corners: None,
            updated_at: 0,
        }
    }

    #[test]
    fn winner_gains_what_loser_drops() {
        let ratings = compute_elo(
            &[finished(1, "2025-08-01T15:00:00+00:00", 1, 2, 2, 0)],
            None,
            EloConfig::default(),
        );
        let a = rating(&ratings, 1);
        let b = rating(&ratings, 2);
        assert!(a > BASE_RATING);
        assert!((a - BASE_RATING + (b - BASE_RATING)).abs() < 1e-9);
    }

    #[test]
    fn unfinished_and_other_leagues_are_ignored() {
        let mut live = finished(2, "2025-08-02T15:00:00+00:00", 1, 2, 3, 0);
        live.status = MatchStatus::Live;
        let mut other = finished(3, "2025-08-03T15:00:00+00:00", 1, 2, 3, 0);
        other.league_id = 140;
        let ratings = compute_elo(&[live, other], Some(39), EloConfig::default());
        assert!(ratings.is_empty());
        assert_eq!(rating(&ratings, 1), BASE_RATING);
    }

    #[test]
    fn expected_score_is_symmetric() {
        let e = expected_score(1600.0, 1500.0);
        assert!((e + expected_score(1500.0, 1600.0) - 1.0).abs() < 1e-12);
        assert!(e > 0.6 && e < 0.7);
    }
}
