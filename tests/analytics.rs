use std::collections::HashMap;

use maestro::analytics::{compare_teams, standings, team_form};
use maestro::elo;
use maestro::football_api::MatchOdds;
use maestro::model::{Match, MatchStatus, Team};
use maestro::value_bets::{
    CornerConfig, CornerSide, Outcome, PricedMatch, ValueConfig, corner_picks, find_value_bets,
};

fn played(
    id: u64,
    kickoff: &str,
    (home, away): (u32, u32),
    (hg, ag): (u8, u8),
    (hc, ac): (u8, u8),
) -> Match {
    Match {
        id,
        league_id: 39,
        season: Some(2024),
        round: None,
        kickoff: kickoff.to_string(),
        home_team_id: home,
        away_team_id: away,
        home: format!("Team {home}"),
        away: format!("Team {away}"),
        home_goals: Some(hg),
        away_goals: Some(ag),
        status: MatchStatus::Finished,
        home_corners: Some(hc),
        away_corners: Some(ac),
        updated_at: 0,
    }
}

fn upcoming(id: u64, home: u32, away: u32) -> Match {
    Match {
        id,
        league_id: 39,
        season: Some(2024),
        round: None,
        kickoff: "2024-09-14T14:00:00+00:00".to_string(),
        home_team_id: home,
        away_team_id: away,
        home: format!("Team {home}"),
        away: format!("Team {away}"),
        home_goals: None,
        away_goals: None,
        status: MatchStatus::Scheduled,
        home_corners: None,
        away_corners: None,
        updated_at: 0,
    }
}

fn season() -> Vec<Match> {
    vec![
        played(4, "2024-08-22T19:00:00+00:00", (1, 3), (1, 2), (7, 4)),
        played(1, "2024-08-01T19:00:00+00:00", (1, 2), (2, 0), (8, 3)),
        played(3, "2024-08-15T19:00:00+00:00", (3, 1), (0, 3), (2, 9)),
        played(2, "2024-08-08T19:00:00+00:00", (2, 3), (1, 1), (5, 5)),
        upcoming(5, 1, 2),
    ]
}

#[test]
fn standings_rank_by_points_and_use_known_names() {
    let teams = vec![Team {
        id: 1,
        name: "Arsenal".to_string(),
        short_name: None,
        country: None,
        logo: None,
        league_id: Some(39),
        updated_at: 0,
    }];
    let table = standings(&season(), 39, &teams);
    assert_eq!(table.len(), 3);

    let top = &table[0];
    assert_eq!(top.team, "Arsenal");
    assert_eq!((top.played, top.won, top.drawn, top.lost), (3, 2, 0, 1));
    assert_eq!((top.goals_for, top.goals_against, top.points), (6, 2, 6));
    assert_eq!(top.form, "WWL");

    assert_eq!(table[1].team_id, 3);
    assert_eq!(table[1].points, 4);
    assert_eq!(table[1].form, "DLW");
    assert_eq!(table[2].team, "Team 2");
    assert_eq!(table[2].goal_difference(), -2);

    assert!(standings(&season(), 140, &teams).is_empty());
}

#[test]
fn team_form_covers_window_and_corners() {
    let form = team_form(&season(), 1, 10);
    assert_eq!(form.played, 3);
    assert_eq!(form.results, "WWL");
    assert_eq!(form.clean_sheets, 2);
    assert!((form.points_per_game - 2.0).abs() < 1e-9);
    assert!((form.btts_rate - 1.0 / 3.0).abs() < 1e-9);
    assert!((form.over_2_5_rate - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(form.corner_samples, 3);
    assert_eq!(form.corners_for_avg, Some(8.0));
    assert_eq!(form.corners_against_avg, Some(3.0));

    let recent = team_form(&season(), 1, 2);
    assert_eq!(recent.results, "WL");

    let unknown = team_form(&season(), 99, 5);
    assert_eq!(unknown.played, 0);
    assert_eq!(unknown.corners_for_avg, None);
}

#[test]
fn comparison_includes_head_to_head() {
    let cmp = compare_teams(&season(), 1, 3, 10);
    let h = &cmp.head_to_head;
    assert_eq!((h.matches, h.a_wins, h.draws, h.b_wins), (2, 1, 0, 1));
    assert_eq!((h.a_goals, h.b_goals), (4, 2));
    assert_eq!(cmp.a.team_id, 1);
    assert_eq!(cmp.b.results, "DLW");
    assert!((cmp.expected_a - elo::expected_score(cmp.elo_a, cmp.elo_b)).abs() < 1e-12);
}

#[test]
fn value_bets_need_edge_and_cap_stake() {
    let priced = vec![PricedMatch {
        fixture: upcoming(5, 1, 2),
        odds: MatchOdds {
            fixture_id: 5,
            bookmakers: 3,
            home: 100,
            draw: 300,
            away: 400,
        },
    }];
    let ratings = HashMap::from([(1, 1650.0), (2, 1400.0)]);
    let cfg = ValueConfig::default();

    let picks = find_value_bets(&priced, &ratings, &cfg).unwrap();
    assert_eq!(picks.len(), 1);
    let pick = &picks[0];
    assert_eq!(pick.selection, Outcome::Home);
    assert_eq!(pick.event, "Team 1 vs Team 2");
    assert!(pick.edge > 0.3);
    assert!((pick.implied_prob - 0.5).abs() < 1e-9);
    // Quarter Kelly is above the 5% cap here.
    assert!((pick.stake - 50.0).abs() < 1e-9);

    let strict = ValueConfig {
        min_edge: 0.5,
        ..cfg
    };
    assert!(find_value_bets(&priced, &ratings, &strict).unwrap().is_empty());
}

#[test]
fn corner_picks_need_enough_history() {
    let history = season();
    let fixtures = vec![upcoming(5, 1, 2)];

    // Team 2 has only two matches with corner data.
    assert!(corner_picks(&history, &fixtures, &CornerConfig::default()).is_empty());

    let cfg = CornerConfig {
        min_samples: 2,
        ..CornerConfig::default()
    };
    let picks = corner_picks(&history, &fixtures, &cfg);
    assert_eq!(picks.len(), 1);
    assert_eq!(picks[0].side, CornerSide::Over);
    assert!((picks[0].expected_total - 10.75).abs() < 1e-9);
    assert!((picks[0].p_over - 0.6318).abs() < 1e-3);
}
