use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::DateTime;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::model::Bet;
use crate::odds;
use crate::pnl::{self, PnlSummary};

pub struct ExportReport {
    pub bets: usize,
    pub markets: usize,
    pub leagues: usize,
}

pub fn export_bets_xlsx(path: &Path, bets: &[Bet]) -> Result<ExportReport> {
    let bet_rows = bet_rows(bets);
    let summary = pnl::summarize(bets);
    let curve = pnl::equity_curve(bets);
    let mut summary_rows = summary_rows(&summary);
    summary_rows.push(vec![
        "Max drawdown".to_string(),
        format!("{:.2}", pnl::max_drawdown(&curve)),
    ]);
    let by_market = pnl::breakdown_by_market(bets);
    let by_league = pnl::breakdown_by_league(bets);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Bets")?;
        write_rows(sheet, &bet_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Summary")?;
        write_rows(sheet, &summary_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("ByMarket")?;
        write_rows(sheet, &breakdown_rows("Market", &by_market))?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("ByLeague")?;
        write_rows(sheet, &breakdown_rows("League", &by_league))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        bets: bets.len(),
        markets: by_market.len(),
        leagues: by_league.len(),
    })
}

pub(crate) fn bet_rows(bets: &[Bet]) -> Vec<Vec<String>> {
    let mut rows = vec![
        [
            "ID", "Placed", "Event", "League", "Market", "Selection", "Odds", "Stake", "Status",
            "Settled", "Result", "Notes",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>(),
    ];
    for bet in bets {
        rows.push(vec![
            bet.id.clone(),
            format_ts(bet.placed_at),
            bet.event.clone(),
            bet.league.clone().unwrap_or_default(),
            bet.market.to_string(),
            bet.selection.clone(),
            odds::format_american(bet.odds),
            format!("{:.2}", bet.stake),
            bet.status.to_string(),
            bet.settled_at.map(format_ts).unwrap_or_default(),
            pnl::bet_result(bet)
                .map(|r| format!("{r:.2}"))
                .unwrap_or_default(),
            bet.notes.clone().unwrap_or_default(),
        ]);
    }
    rows
}

fn summary_rows(s: &PnlSummary) -> Vec<Vec<String>> {
    let pct = |v: Option<f64>| v.map(|v| format!("{:.1}%", v * 100.0)).unwrap_or_default();
    vec![
        vec!["Metric".to_string(), "Value".to_string()],
        vec!["Bets".to_string(), s.total.to_string()],
        vec!["Pending".to_string(), s.pending.to_string()],
        vec!["Won".to_string(), s.won.to_string()],
        vec!["Lost".to_string(), s.lost.to_string()],
        vec!["Push".to_string(), s.push.to_string()],
        vec!["Void".to_string(), s.void.to_string()],
        vec!["Staked".to_string(), format!("{:.2}", s.staked)],
        vec!["Pending exposure".to_string(), format!("{:.2}", s.pending_exposure)],
        vec!["Returned".to_string(), format!("{:.2}", s.returned)],
        vec!["Net profit".to_string(), format!("{:.2}", s.net_profit)],
        vec!["ROI".to_string(), pct(s.roi)],
        vec!["Win rate".to_string(), pct(s.win_rate)],
        vec![
            "Avg decimal odds".to_string(),
            s.avg_decimal_odds.map(|v| format!("{v:.2}")).unwrap_or_default(),
        ],
        vec!["Longest win streak".to_string(), s.longest_win_streak.to_string()],
        vec!["Current streak".to_string(), s.current_streak.to_string()],
    ]
}

fn breakdown_rows(label: &str, groups: &BTreeMap<String, PnlSummary>) -> Vec<Vec<String>> {
    let mut rows = vec![vec![
        label.to_string(),
        "Bets".to_string(),
        "Won".to_string(),
        "Lost".to_string(),
        "Staked".to_string(),
        "Net".to_string(),
        "ROI".to_string(),
    ]];
    for (key, s) in groups {
        rows.push(vec![
            key.clone(),
            s.total.to_string(),
            s.won.to_string(),
            s.lost.to_string(),
            format!("{:.2}", s.staked),
            format!("{:.2}", s.net_profit),
            s.roi.map(|v| format!("{:.1}%", v * 100.0)).unwrap_or_default(),
        ]);
    }
    rows
}

pub fn format_ts(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{bet_rows, format_ts};
    use crate::model::{Bet, BetStatus, Market};

    #[test]
    fn bet_rows_have_header_and_result_column() {
        let bet = Bet {
            id: "abc".to_string(),
            match_id: None,
            event: "A vs B".to_string(),
            league: Some("EPL".to_string()),
            market: Market::MatchResult,
            selection: "A".to_string(),
            odds: 150,
            stake: 10.0,
            status: BetStatus::Won,
            placed_at: 0,
            settled_at: Some(86_400),
            notes: None,
            updated_at: 0,
        };
        let rows = bet_rows(&[bet]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][10], "Result");
        assert_eq!(rows[1][6], "+150");
        assert_eq!(rows[1][10], "15.00");
        assert_eq!(rows[1][9], "1970-01-02 00:00");
    }

    #[test]
    fn format_ts_epoch() {
        assert_eq!(format_ts(0), "1970-01-01 00:00");
    }
}
