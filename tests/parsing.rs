use std::fs;
use std::path::PathBuf;

use maestro::backend::parse_listing;
use maestro::football_api::{
    parse_fixture_corners_json, parse_fixtures_json, parse_leagues_json, parse_odds_json,
    parse_teams_json,
};
use maestro::model::{Bet, BetStatus, Market, MatchStatus};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_leagues_with_current_season() {
    let raw = read_fixture("apifootball_leagues.json");
    let leagues = parse_leagues_json(&raw).expect("fixture should parse");
    assert_eq!(leagues.len(), 2);
    assert_eq!(leagues[0].id, 39);
    assert_eq!(leagues[0].country.as_deref(), Some("England"));
    assert_eq!(leagues[0].season, Some(2024));
    // No current season flagged: falls back to the latest year.
    assert_eq!(leagues[1].season, Some(2023));
    assert_eq!(leagues[1].logo, None);
}

#[test]
fn parses_teams_and_drops_blank_codes() {
    let raw = read_fixture("apifootball_teams.json");
    let teams = parse_teams_json(&raw, Some(39)).expect("fixture should parse");
    assert_eq!(teams.len(), 3);
    assert_eq!(teams[0].name, "Arsenal");
    assert_eq!(teams[0].short_name.as_deref(), Some("ARS"));
    assert_eq!(teams[2].short_name, None);
    assert!(teams.iter().all(|t| t.league_id == Some(39)));
}

#[test]
fn parses_fixtures_sorted_by_kickoff() {
    let raw = read_fixture("apifootball_fixtures.json");
    let fixtures = parse_fixtures_json(&raw).expect("fixture should parse");
    let ids = fixtures.iter().map(|m| m.id).collect::<Vec<_>>();
    assert_eq!(ids, vec![1208021, 1208025, 1208030]);

    let finished = &fixtures[0];
    assert_eq!(finished.status, MatchStatus::Finished);
    assert_eq!((finished.home_goals, finished.away_goals), (Some(2), Some(0)));
    assert_eq!(finished.outcome(), Some('H'));
    assert_eq!(finished.round.as_deref(), Some("Regular Season - 1"));

    assert_eq!(fixtures[1].status, MatchStatus::Live);
    assert_eq!(fixtures[1].outcome(), None);

    let upcoming = &fixtures[2];
    assert_eq!(upcoming.status, MatchStatus::Scheduled);
    assert_eq!(upcoming.home_goals, None);
    assert_eq!(upcoming.label(), "Arsenal vs Bournemouth");
}

#[test]
fn parses_corner_kicks_with_null_as_zero() {
    let raw = read_fixture("apifootball_statistics.json");
    let corners = parse_fixture_corners_json(&raw).expect("fixture should parse");
    assert_eq!(corners.get(&42), Some(&7));
    assert_eq!(corners.get(&49), Some(&0));
}

#[test]
fn odds_take_median_match_winner_price() {
    let raw = read_fixture("apifootball_odds.json");
    let odds = parse_odds_json(&raw).expect("fixture should parse");
    assert_eq!(odds.len(), 1);
    let o = &odds[0];
    assert_eq!(o.fixture_id, 1208030);
    assert_eq!(o.bookmakers, 3);
    assert_eq!(o.home, -222);
    assert_eq!(o.draw, 375);
    assert_eq!(o.away, 700);
}

#[test]
fn api_error_object_is_reported() {
    let raw = read_fixture("apifootball_error.json");
    let err = parse_fixtures_json(&raw).unwrap_err().to_string();
    assert!(err.contains("token"), "{err}");
    assert!(parse_fixtures_json("").is_err());
}

#[test]
fn backend_listing_fills_optional_fields() {
    let raw = read_fixture("backend_bets.json");
    let bets: Vec<Bet> = parse_listing(&raw).expect("fixture should parse");
    assert_eq!(bets.len(), 2);
    assert_eq!(bets[0].status, BetStatus::Won);
    assert_eq!(bets[0].market, Market::MatchResult);
    assert_eq!(bets[1].market, Market::TotalGoals);
    assert_eq!(bets[1].league, None);
    assert_eq!(bets[1].settled_at, None);
    assert_eq!(bets[1].updated_at, 0);
}
