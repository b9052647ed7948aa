use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::analytics;
use crate::backend::BackendClient;
use crate::config::MaestroConfig;
use crate::dashboard;
use crate::elo::{self, EloConfig};
use crate::export;
use crate::football_api::{FixtureQuery, FootballApi};
use crate::http_cache::{self, unix_now};
use crate::model::{Bet, BetStatus, Market, MatchStatus, NewBet, Team};
use crate::odds;
use crate::pnl::{self, PnlSummary};
use crate::store::{self, BetFilter, MatchFilter};
use crate::sync;
use crate::value_bets::{self, CornerConfig, PricedMatch, ValueConfig};

pub const USAGE: &str = "\
usage: maestro [command] [options]

  dashboard [--league ID]                     terminal dashboard (default)
  fetch leagues [--country NAME] [--season Y]
  fetch teams --league ID [--season Y]
  fetch fixtures --league ID [--season Y] [--from DATE] [--to DATE] [--next N]
  fetch corners [--league ID] [--limit N]     fill corner counts of finished matches
  backend pull [--league ID]
  bet add --event TEXT --selection TEXT --odds ODDS --stake AMOUNT
          [--market M] [--league NAME] [--match ID] [--notes TEXT] [--push]
  bet list [--status S] [--market M] [--league NAME]
  bet settle ID STATUS
  bet delete ID
  pnl [--by market|league]
  standings [--league ID]
  compare TEAM TEAM [--last N]
  value [--league ID] [--season Y] [--next N]
  corners [--league ID] [--line L] [--last N]
  sync
  backup PATH
  restore PATH [--replace]
  export PATH
  cache clear";

/// Positional words and `--flag value` / `--flag=value` options.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Args {
    pub positionals: Vec<String>,
    pub flags: HashMap<String, Option<String>>,
}

impl Args {
    pub fn parse<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let raw = raw.into_iter().map(Into::into).collect::<Vec<String>>();
        let mut out = Args::default();
        let mut idx = 0;
        while idx < raw.len() {
            let arg = &raw[idx];
            idx += 1;
            let Some(flag) = arg.strip_prefix("--") else {
                out.positionals.push(arg.clone());
                continue;
            };
            if let Some((name, value)) = flag.split_once('=') {
                out.flags
                    .insert(name.to_string(), Some(value.trim().to_string()));
                continue;
            }
            let value = raw
                .get(idx)
                .filter(|next| !next.starts_with("--"))
                .cloned();
            if value.is_some() {
                idx += 1;
            }
            out.flags.insert(flag.to_string(), value);
        }
        out
    }

    pub fn command(&self, idx: usize) -> Option<&str> {
        self.positionals.get(idx).map(String::as_str)
    }

    pub fn has(&self, name: &str) -> bool {
        self.flags.contains_key(name)
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.flags
            .get(name)
            .and_then(|v| v.as_deref())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, name: &str) -> Result<&str> {
        self.value(name)
            .ok_or_else(|| anyhow!("missing required option --{name}"))
    }

    pub fn parsed<T>(&self, name: &str) -> Result<Option<T>>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.value(name) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<T>()
                .map(Some)
                .map_err(|err| anyhow!("invalid --{name} value '{raw}': {err}")),
        }
    }
}

pub fn run(args: &Args, cfg: &MaestroConfig) -> Result<()> {
    match args.command(0).unwrap_or("dashboard") {
        "dashboard" => {
            let conn = open_store(cfg)?;
            let league = args.parsed::<u32>("league")?.or(cfg.default_league);
            dashboard::run_dashboard(&conn, league)
        }
        "fetch" => run_fetch(args, cfg),
        "backend" => run_backend(args, cfg),
        "bet" => run_bet(args, cfg),
        "pnl" => run_pnl(args, cfg),
        "standings" => run_standings(args, cfg),
        "compare" => run_compare(args, cfg),
        "value" => run_value(args, cfg),
        "corners" => run_corners(args, cfg),
        "sync" => run_sync(cfg),
        "backup" => {
            let path = path_arg(args)?;
            let conn = open_store(cfg)?;
            let bets = sync::export_to_file(&conn, &path, unix_now())?;
            println!("Backed up {bets} bets to {}", path.display());
            Ok(())
        }
        "restore" => run_restore(args, cfg),
        "export" => {
            let path = path_arg(args)?;
            let conn = open_store(cfg)?;
            let bets = store::list_bets(&conn, &BetFilter::default())?;
            let report = export::export_bets_xlsx(&path, &bets)?;
            println!(
                "Exported {} bets ({} markets, {} leagues) to {}",
                report.bets,
                report.markets,
                report.leagues,
                path.display()
            );
            Ok(())
        }
        "cache" => match args.command(1) {
            Some("clear") => {
                http_cache::clear_cache()?;
                println!("HTTP cache cleared");
                Ok(())
            }
            _ => bail!("usage: maestro cache clear"),
        },
        "help" => {
            println!("{USAGE}");
            Ok(())
        }
        other => bail!("unknown command '{other}'\n\n{USAGE}"),
    }
}

pub fn open_store(cfg: &MaestroConfig) -> Result<Connection> {
    let path = cfg
        .db_path
        .as_deref()
        .context("unable to resolve sqlite path; set MAESTRO_DB")?;
    store::open_db(path)
}

fn path_arg(args: &Args) -> Result<PathBuf> {
    args.command(1)
        .map(PathBuf::from)
        .context("missing PATH argument")
}

fn league_arg(args: &Args, cfg: &MaestroConfig) -> Result<u32> {
    args.parsed::<u32>("league")?
        .or(cfg.default_league)
        .context("no league given; pass --league or set MAESTRO_DEFAULT_LEAGUE")
}

fn season_arg(args: &Args, cfg: &MaestroConfig) -> Result<Option<u16>> {
    Ok(args.parsed::<u16>("season")?.or(cfg.season))
}

fn run_fetch(args: &Args, cfg: &MaestroConfig) -> Result<()> {
    let api = FootballApi::from_config(cfg)?;
    let mut conn = open_store(cfg)?;
    match args.command(1) {
        Some("leagues") => {
            let leagues = api.fetch_leagues(args.value("country"), season_arg(args, cfg)?)?;
            for league in &leagues {
                store::upsert_league(&conn, league)?;
            }
            info!(count = leagues.len(), "stored leagues");
            println!("Stored {} leagues", leagues.len());
        }
        Some("teams") => {
            let league = league_arg(args, cfg)?;
            let season = season_arg(args, cfg)?.context("teams need --season or MAESTRO_SEASON")?;
            let teams = api.fetch_teams(league, season)?;
            for team in &teams {
                store::upsert_team(&conn, team)?;
            }
            println!("Stored {} teams for league {league}", teams.len());
        }
        Some("fixtures") => {
            let query = FixtureQuery {
                league: Some(league_arg(args, cfg)?),
                season: season_arg(args, cfg)?,
                team: args.parsed("team")?,
                from: args.value("from").map(str::to_string),
                to: args.value("to").map(str::to_string),
                next: args.parsed("next")?,
            };
            let fixtures = api.fetch_fixtures(&query)?;
            let n = store::upsert_matches(&mut conn, &fixtures)?;
            println!("Stored {n} fixtures");
        }
        Some("corners") => {
            let limit = args.parsed::<usize>("limit")?.unwrap_or(20);
            let filter = MatchFilter {
                league_id: args.parsed("league")?.or(cfg.default_league),
                status: Some(MatchStatus::Finished),
                ..MatchFilter::default()
            };
            let missing = store::list_matches(&conn, &filter)?
                .into_iter()
                .filter(|m| m.home_corners.is_none() || m.away_corners.is_none())
                .rev()
                .take(limit)
                .collect::<Vec<_>>();
            let mut filled = 0usize;
            for m in &missing {
                let corners = match api.fetch_fixture_corners(m.id) {
                    Ok(corners) => corners,
                    Err(err) => {
                        warn!(fixture = m.id, error = %err, "corner fetch failed");
                        continue;
                    }
                };
                let (Some(home), Some(away)) = (
                    corners.get(&m.home_team_id).copied(),
                    corners.get(&m.away_team_id).copied(),
                ) else {
                    continue;
                };
                if store::set_match_corners(&conn, m.id, home, away, unix_now())? {
                    filled += 1;
                }
            }
            println!("Filled corners for {filled}/{} matches", missing.len());
        }
        _ => bail!("usage: maestro fetch leagues|teams|fixtures|corners"),
    }
    Ok(())
}

fn run_backend(args: &Args, cfg: &MaestroConfig) -> Result<()> {
    if args.command(1) != Some("pull") {
        bail!("usage: maestro backend pull [--league ID]");
    }
    let client = BackendClient::from_config(cfg)?;
    let mut conn = open_store(cfg)?;

    let leagues = client.fetch_leagues()?;
    for league in &leagues {
        store::upsert_league(&conn, league)?;
    }
    let teams = client.fetch_teams()?;
    for team in &teams {
        store::upsert_team(&conn, team)?;
    }
    let matches = client.fetch_matches(args.parsed("league")?)?;
    store::upsert_matches(&mut conn, &matches)?;

    // Keep local edits and deletes that are newer than the backend copy.
    let mut bets = 0usize;
    for bet in client.fetch_bets()? {
        if store::import_bet(&conn, &bet)? {
            bets += 1;
        }
    }
    println!(
        "Pulled {} leagues, {} teams, {} matches, {bets} bets",
        leagues.len(),
        teams.len(),
        matches.len()
    );
    Ok(())
}

fn run_bet(args: &Args, cfg: &MaestroConfig) -> Result<()> {
    let conn = open_store(cfg)?;
    let now = unix_now();
    match args.command(1) {
        Some("add") => {
            let new = NewBet {
                match_id: args.parsed("match")?,
                event: args.required("event")?.to_string(),
                league: args.value("league").map(str::to_string),
                market: args.parsed::<Market>("market")?.unwrap_or(Market::MatchResult),
                selection: args.required("selection")?.to_string(),
                odds: odds::parse_american(args.required("odds")?)?,
                stake: args.parsed::<f64>("stake")?.context("missing required option --stake")?,
                notes: args.value("notes").map(str::to_string),
            };
            let bet = Bet::create(new, now)?;
            store::upsert_bet(&conn, &bet)?;
            println!(
                "Recorded {} | {} | {} @ {} for {:.2} (to win {:.2})",
                short_id(&bet.id),
                bet.event,
                bet.selection,
                odds::format_american(bet.odds),
                bet.stake,
                odds::profit_on_win(bet.stake, bet.odds)?
            );
            if args.has("push") {
                BackendClient::from_config(cfg)?.push_bet(&bet)?;
                println!("Pushed to backend");
            }
        }
        Some("list") => {
            let filter = BetFilter {
                status: args.parsed("status")?,
                market: args.parsed("market")?,
                league: args.value("league").map(str::to_string),
            };
            let bets = store::list_bets(&conn, &filter)?;
            for bet in &bets {
                println!("{}", bet_line(bet));
            }
            println!("{} bets", bets.len());
        }
        Some("settle") => {
            let prefix = args.command(2).context("usage: maestro bet settle ID STATUS")?;
            let status = args
                .command(3)
                .context("usage: maestro bet settle ID STATUS")?
                .parse::<BetStatus>()?;
            let id = store::resolve_bet_id(&conn, prefix)?;
            let bet = store::settle_bet(&conn, &id, status, now)?;
            println!("{}", bet_line(&bet));
        }
        Some("delete") => {
            let prefix = args.command(2).context("usage: maestro bet delete ID")?;
            let id = store::resolve_bet_id(&conn, prefix)?;
            if store::delete_bet(&conn, &id, now)? {
                println!("Deleted bet {id}");
            }
        }
        _ => bail!("usage: maestro bet add|list|settle|delete"),
    }
    Ok(())
}

fn bet_line(bet: &Bet) -> String {
    let result = pnl::bet_result(bet)
        .map(|r| format!("{r:+.2}"))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}  {}  {:<30} {:<16} {:<14} {:>6} {:>8.2}  {:<7} {}",
        short_id(&bet.id),
        export::format_ts(bet.placed_at),
        bet.event,
        bet.market.to_string(),
        bet.selection,
        odds::format_american(bet.odds),
        bet.stake,
        bet.status,
        result
    )
}

fn short_id(id: &str) -> &str {
    id.char_indices().nth(8).map_or(id, |(idx, _)| &id[..idx])
}

fn run_pnl(args: &Args, cfg: &MaestroConfig) -> Result<()> {
    let conn = open_store(cfg)?;
    let bets = store::list_bets(&conn, &BetFilter::default())?;
    let summary = pnl::summarize(&bets);
    print_summary(&summary);
    println!(
        "Max drawdown      {:.2}",
        pnl::max_drawdown(&pnl::equity_curve(&bets))
    );

    let groups = match args.value("by") {
        None => return Ok(()),
        Some("market") => pnl::breakdown_by_market(&bets),
        Some("league") => pnl::breakdown_by_league(&bets),
        Some(other) => bail!("unknown breakdown '{other}', expected market or league"),
    };
    println!();
    for (key, g) in &groups {
        println!(
            "{key:<20} bets {:>4}  staked {:>9.2}  net {:>+9.2}  roi {}",
            g.total,
            g.staked,
            g.net_profit,
            pct(g.roi)
        );
    }
    Ok(())
}

fn pct(v: Option<f64>) -> String {
    v.map(|v| format!("{:+.1}%", v * 100.0))
        .unwrap_or_else(|| "n/a".to_string())
}

fn print_summary(s: &PnlSummary) {
    println!("Bets              {} ({} pending)", s.total, s.pending);
    println!("W / L / P / V     {} / {} / {} / {}", s.won, s.lost, s.push, s.void);
    println!("Staked            {:.2}", s.staked);
    println!("Returned          {:.2}", s.returned);
    println!("Net profit        {:+.2}", s.net_profit);
    println!("ROI               {}", pct(s.roi));
    println!("Win rate          {}", pct(s.win_rate));
    println!("Pending exposure  {:.2}", s.pending_exposure);
    println!("Longest streak    {}", s.longest_win_streak);
    println!("Current streak    {:+}", s.current_streak);
}

fn run_standings(args: &Args, cfg: &MaestroConfig) -> Result<()> {
    let conn = open_store(cfg)?;
    let league = league_arg(args, cfg)?;
    let matches = store::list_matches(
        &conn,
        &MatchFilter {
            league_id: Some(league),
            ..MatchFilter::default()
        },
    )?;
    let teams = store::list_teams(&conn, Some(league))?;
    let rows = analytics::standings(&matches, league, &teams);
    if rows.is_empty() {
        println!("No finished matches stored for league {league}");
        return Ok(());
    }
    println!(
        "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>7} {:>4} {:>4}  Form",
        "#", "Team", "P", "W", "D", "L", "Goals", "GD", "Pts"
    );
    for (idx, r) in rows.iter().enumerate() {
        println!(
            "{:>3}  {:<24} {:>3} {:>3} {:>3} {:>3} {:>7} {:>+4} {:>4}  {}",
            idx + 1,
            r.team,
            r.played,
            r.won,
            r.drawn,
            r.lost,
            format!("{}:{}", r.goals_for, r.goals_against),
            r.goal_difference(),
            r.points,
            r.form
        );
    }
    Ok(())
}

fn resolve_team(conn: &Connection, raw: &str) -> Result<Team> {
    if let Ok(id) = raw.parse::<u32>()
        && let Some(team) = store::get_team(conn, id)?
    {
        return Ok(team);
    }
    store::find_team_by_name(conn, raw)?.with_context(|| format!("unknown team '{raw}'"))
}

fn run_compare(args: &Args, cfg: &MaestroConfig) -> Result<()> {
    let conn = open_store(cfg)?;
    let (Some(a), Some(b)) = (args.command(1), args.command(2)) else {
        bail!("usage: maestro compare TEAM TEAM [--last N]");
    };
    let a = resolve_team(&conn, a)?;
    let b = resolve_team(&conn, b)?;
    let last_n = args.parsed::<usize>("last")?.unwrap_or(10);
    let matches = store::list_matches(&conn, &MatchFilter::default())?;
    let cmp = analytics::compare_teams(&matches, a.id, b.id, last_n);

    let avg = |v: Option<f64>| v.map(|v| format!("{v:.1}")).unwrap_or_else(|| "-".into());
    println!("{:<22} {:>12} {:>12}", "", a.name, b.name);
    println!("{:<22} {:>12.0} {:>12.0}", "Elo", cmp.elo_a, cmp.elo_b);
    println!("{:<22} {:>12} {:>12}", "Form", cmp.a.results, cmp.b.results);
    println!(
        "{:<22} {:>12.2} {:>12.2}",
        "Points per game", cmp.a.points_per_game, cmp.b.points_per_game
    );
    println!(
        "{:<22} {:>12} {:>12}",
        "Goals for/against",
        format!("{}/{}", cmp.a.goals_for, cmp.a.goals_against),
        format!("{}/{}", cmp.b.goals_for, cmp.b.goals_against)
    );
    println!(
        "{:<22} {:>12} {:>12}",
        "Clean sheets", cmp.a.clean_sheets, cmp.b.clean_sheets
    );
    println!(
        "{:<22} {:>11.0}% {:>11.0}%",
        "Both teams scored",
        cmp.a.btts_rate * 100.0,
        cmp.b.btts_rate * 100.0
    );
    println!(
        "{:<22} {:>11.0}% {:>11.0}%",
        "Over 2.5",
        cmp.a.over_2_5_rate * 100.0,
        cmp.b.over_2_5_rate * 100.0
    );
    println!(
        "{:<22} {:>12} {:>12}",
        "Corners for",
        avg(cmp.a.corners_for_avg),
        avg(cmp.b.corners_for_avg)
    );
    let h = &cmp.head_to_head;
    println!(
        "Head to head: {} played, {} {} / {} draws / {} {} (goals {}-{})",
        h.matches, a.name, h.a_wins, h.draws, b.name, h.b_wins, h.a_goals, h.b_goals
    );
    println!(
        "Neutral expected score for {}: {:.1}%",
        a.name,
        cmp.expected_a * 100.0
    );
    Ok(())
}

fn run_value(args: &Args, cfg: &MaestroConfig) -> Result<()> {
    let api = FootballApi::from_config(cfg)?;
    let mut conn = open_store(cfg)?;
    let league = league_arg(args, cfg)?;
    let fixtures = api.fetch_fixtures(&FixtureQuery {
        league: Some(league),
        season: season_arg(args, cfg)?,
        next: Some(args.parsed::<u8>("next")?.unwrap_or(10)),
        ..FixtureQuery::default()
    })?;
    store::upsert_matches(&mut conn, &fixtures)?;

    let mut priced = Vec::new();
    for fixture in fixtures
        .into_iter()
        .filter(|m| m.status == MatchStatus::Scheduled)
    {
        match api.fetch_match_odds(fixture.id) {
            Ok(Some(odds)) => priced.push(PricedMatch { fixture, odds }),
            Ok(None) => info!(fixture = fixture.id, "no match winner odds"),
            Err(err) => warn!(fixture = fixture.id, error = %err, "odds fetch failed"),
        }
    }

    let history = store::list_matches(
        &conn,
        &MatchFilter {
            league_id: Some(league),
            status: Some(MatchStatus::Finished),
            ..MatchFilter::default()
        },
    )?;
    let ratings = elo::compute_elo(&history, Some(league), EloConfig::default());
    let picks = value_bets::find_value_bets(&priced, &ratings, &ValueConfig::from_config(cfg))?;
    if picks.is_empty() {
        println!("No value found across {} priced fixtures", priced.len());
        return Ok(());
    }
    for p in &picks {
        println!(
            "{:<32} {:<5} {:>6}  model {:>5.1}%  book {:>5.1}%  edge {:>+5.1}%  ev {:>+.3}  stake {:.2}",
            p.event,
            p.selection.label(),
            odds::format_american(p.odds),
            p.model_prob * 100.0,
            p.implied_prob * 100.0,
            p.edge * 100.0,
            p.expected_value,
            p.stake
        );
    }
    Ok(())
}

fn run_corners(args: &Args, cfg: &MaestroConfig) -> Result<()> {
    let conn = open_store(cfg)?;
    let league = league_arg(args, cfg)?;
    let mut corner_cfg = CornerConfig::default();
    if let Some(line) = args.parsed::<f64>("line")? {
        corner_cfg.line = line;
    }
    if let Some(last_n) = args.parsed::<usize>("last")? {
        corner_cfg.last_n = last_n;
    }
    let history = store::list_matches(
        &conn,
        &MatchFilter {
            status: Some(MatchStatus::Finished),
            ..MatchFilter::default()
        },
    )?;
    let fixtures = store::list_matches(
        &conn,
        &MatchFilter {
            league_id: Some(league),
            status: Some(MatchStatus::Scheduled),
            ..MatchFilter::default()
        },
    )?;
    let picks = value_bets::corner_picks(&history, &fixtures, &corner_cfg);
    if picks.is_empty() {
        println!(
            "No corner picks for {} upcoming fixtures (run `maestro fetch corners` to fill history)",
            fixtures.len()
        );
        return Ok(());
    }
    for p in &picks {
        println!(
            "{:<32} {:?} {:.1}  expected {:.1}  p(over) {:.1}%",
            p.event,
            p.side,
            p.line,
            p.expected_total,
            p.p_over * 100.0
        );
    }
    Ok(())
}

fn run_sync(cfg: &MaestroConfig) -> Result<()> {
    let github = cfg
        .github
        .as_ref()
        .context("sync needs GITHUB_TOKEN and MAESTRO_SYNC_REPO (owner/name)")?;
    let mut conn = open_store(cfg)?;
    let report = sync::sync(&mut conn, github, unix_now())?;
    println!(
        "Merged {} added, {} updated, {} removed",
        report.merged.added, report.merged.updated, report.merged.removed
    );
    if report.pushed {
        println!(
            "Pushed {} ({})",
            github.path,
            report.remote_sha.as_deref().unwrap_or("-")
        );
    } else {
        println!("Remote already up to date");
    }
    Ok(())
}

fn run_restore(args: &Args, cfg: &MaestroConfig) -> Result<()> {
    let path = path_arg(args)?;
    let mut conn = open_store(cfg)?;
    if args.has("replace") {
        restore_replace(&mut conn, &path)?;
        println!("Replaced store with {}", path.display());
        return Ok(());
    }
    let stats = sync::import_from_file(&mut conn, &path, unix_now())?;
    println!(
        "Merged {} added, {} updated, {} removed",
        stats.added, stats.updated, stats.removed
    );
    Ok(())
}

fn restore_replace(conn: &mut Connection, path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let snapshot = sync::decode_snapshot(&raw)?;
    store::replace_all(conn, &snapshot)
}

#[cfg(test)]
mod tests {
    use super::{Args, short_id};

    #[test]
    fn parses_both_flag_forms() {
        let args = Args::parse([
            "bet", "add", "--event=Arsenal vs Chelsea", "--odds", "-120", "--stake", "25",
            "--push",
        ]);
        assert_eq!(args.positionals, vec!["bet", "add"]);
        assert_eq!(args.value("event"), Some("Arsenal vs Chelsea"));
        assert_eq!(args.value("stake"), Some("25"));
        assert!(args.has("push"));
        assert_eq!(args.value("push"), None);
    }

    #[test]
    fn negative_odds_are_values_not_flags() {
        let args = Args::parse(["--odds", "-150", "--league", "39"]);
        assert_eq!(args.value("odds"), Some("-150"));
        assert_eq!(args.parsed::<u32>("league").unwrap(), Some(39));
    }

    #[test]
    fn parsed_reports_bad_numbers() {
        let args = Args::parse(["--league=abc"]);
        let err = args.parsed::<u32>("league").unwrap_err().to_string();
        assert!(err.contains("--league"), "{err}");
        assert!(args.required("event").is_err());
    }

    #[test]
    fn short_id_cuts_on_char_boundaries() {
        assert_eq!(short_id("0123456789abcdef"), "01234567");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id("abcdefgé-1"), "abcdefgé");
        assert_eq!(short_id("éééééééééé"), "éééééééé");
    }
}
