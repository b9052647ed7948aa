use std::collections::BTreeMap;
use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use rusqlite::Connection;

use crate::analytics::{self, StandingRow};
use crate::export::format_ts;
use crate::model::{Bet, BetStatus};
use crate::odds;
use crate::pnl::{self, PnlSummary};
use crate::store::{self, BetFilter, MatchFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Bets,
    Pnl,
    Standings,
}

impl Tab {
    fn next(self) -> Self {
        match self {
            Tab::Bets => Tab::Pnl,
            Tab::Pnl => Tab::Standings,
            Tab::Standings => Tab::Bets,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Tab::Bets => "Bets",
            Tab::Pnl => "P&L",
            Tab::Standings => "Standings",
        }
    }
}

pub struct DashboardState {
    pub tab: Tab,
    pub bets: Vec<Bet>,
    pub summary: PnlSummary,
    pub by_market: BTreeMap<String, PnlSummary>,
    pub by_league: BTreeMap<String, PnlSummary>,
    pub drawdown: f64,
    pub standings: Vec<StandingRow>,
    pub league_id: Option<u32>,
    pub league_name: String,
    pub selected: usize,
    pub help_overlay: bool,
    pub should_quit: bool,
    pub status: String,
}

impl DashboardState {
    pub fn new(league_id: Option<u32>) -> Self {
        Self {
            tab: Tab::Bets,
            bets: Vec::new(),
            summary: PnlSummary::default(),
            by_market: BTreeMap::new(),
            by_league: BTreeMap::new(),
            drawdown: 0.0,
            standings: Vec::new(),
            league_id,
            league_name: String::new(),
            selected: 0,
            help_overlay: false,
            should_quit: false,
            status: String::new(),
        }
    }

    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        self.bets = store::list_bets(conn, &BetFilter::default())?;
        self.summary = pnl::summarize(&self.bets);
        self.by_market = pnl::breakdown_by_market(&self.bets);
        self.by_league = pnl::breakdown_by_league(&self.bets);
        self.drawdown = pnl::max_drawdown(&pnl::equity_curve(&self.bets));

        self.standings.clear();
        self.league_name.clear();
        if let Some(league_id) = self.league_id {
            let matches = store::list_matches(
                conn,
                &MatchFilter {
                    league_id: Some(league_id),
                    ..MatchFilter::default()
                },
            )?;
            let teams = store::list_teams(conn, Some(league_id))?;
            self.standings = analytics::standings(&matches, league_id, &teams);
            self.league_name = store::get_league(conn, league_id)?
                .map(|l| l.name)
                .unwrap_or_else(|| format!("League {league_id}"));
        }
        self.selected = self.selected.min(self.row_count().saturating_sub(1));
        self.status = format!("Loaded {} bets", self.bets.len());
        Ok(())
    }

    fn row_count(&self) -> usize {
        match self.tab {
            Tab::Bets => self.bets.len(),
            Tab::Pnl => self.by_market.len() + self.by_league.len(),
            Tab::Standings => self.standings.len(),
        }
    }

    pub fn select_next(&mut self) {
        let n = self.row_count();
        if n == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected + 1) % n;
    }

    pub fn select_prev(&mut self) {
        let n = self.row_count();
        if n == 0 {
            self.selected = 0;
            return;
        }
        self.selected = if self.selected == 0 { n - 1 } else { self.selected - 1 };
    }

    pub fn set_tab(&mut self, tab: Tab) {
        if self.tab != tab {
            self.tab = tab;
            self.selected = 0;
        }
    }

    /// Returns true when the store should be reloaded.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('1') => self.set_tab(Tab::Bets),
            KeyCode::Char('2') => self.set_tab(Tab::Pnl),
            KeyCode::Char('3') => self.set_tab(Tab::Standings),
            KeyCode::Tab => self.set_tab(self.tab.next()),
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Char('r') => return true,
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            KeyCode::Esc => self.help_overlay = false,
            _ => {}
        }
        false
    }
}

pub fn run_dashboard(conn: &Connection, league_id: Option<u32>) -> Result<()> {
    let mut state = DashboardState::new(league_id);
    state.load(conn)?;

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("enter alternate screen")?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend).context("create terminal")?;

    let res = run_loop(&mut terminal, &mut state, conn);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();
    res
}

fn run_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    state: &mut DashboardState,
    conn: &Connection,
) -> Result<()> {
    let tick_rate = Duration::from_millis(250);
    loop {
        terminal.draw(|f| ui(f, state)).context("draw frame")?;

        if event::poll(tick_rate).context("poll terminal events")?
            && let Event::Key(key) = event::read().context("read terminal event")?
            && key.kind == KeyEventKind::Press
            && state.on_key(key)
            && let Err(err) = state.load(conn)
        {
            state.status = format!("Reload failed: {err}");
        }

        if state.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, state: &DashboardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(state))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match state.tab {
        Tab::Bets => render_bets(frame, chunks[1], state),
        Tab::Pnl => render_pnl(frame, chunks[1], state),
        Tab::Standings => render_standings(frame, chunks[1], state),
    }

    let footer = Paragraph::new(format!(
        "1 Bets | 2 P&L | 3 Standings | Tab Next | j/k Move | r Reload | ? Help | q Quit   {}",
        state.status
    ))
    .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[2]);

    if state.help_overlay {
        let area = frame.size();
        render_help_overlay(frame, area);
    }
}

fn header_text(state: &DashboardState) -> String {
    format!(
        "MAESTRO | {} | Net {:+.2} | ROI {} | Pending {}",
        state.tab.label(),
        state.summary.net_profit,
        state
            .summary
            .roi
            .map(|r| format!("{:+.1}%", r * 100.0))
            .unwrap_or_else(|| "n/a".to_string()),
        state.summary.pending
    )
}

fn status_style(status: BetStatus) -> Style {
    match status {
        BetStatus::Won => Style::default().fg(Color::Green),
        BetStatus::Lost => Style::default().fg(Color::Red),
        BetStatus::Pending => Style::default().fg(Color::Yellow),
        BetStatus::Push | BetStatus::Void => Style::default().fg(Color::DarkGray),
    }
}

fn render_bets(frame: &mut Frame, area: Rect, state: &DashboardState) {
    if state.bets.is_empty() {
        let empty = Paragraph::new("No bets recorded. Add one with `maestro bet add`.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let visible = area.height.saturating_sub(1) as usize;
    let (start, end) = visible_range(state.selected, state.bets.len(), visible);
    let rows = (start..end).map(|idx| {
        let bet = &state.bets[idx];
        let result = pnl::bet_result(bet)
            .map(|r| format!("{r:+.2}"))
            .unwrap_or_default();
        let row = Row::new(vec![
            Cell::from(bet.id.chars().take(8).collect::<String>()),
            Cell::from(format_ts(bet.placed_at)),
            Cell::from(bet.event.clone()),
            Cell::from(bet.market.to_string()),
            Cell::from(bet.selection.clone()),
            Cell::from(odds::format_american(bet.odds)),
            Cell::from(format!("{:.2}", bet.stake)),
            Cell::from(bet.status.to_string()).style(status_style(bet.status)),
            Cell::from(result),
        ]);
        if idx == state.selected {
            row.style(Style::default().bg(Color::DarkGray).fg(Color::White))
        } else {
            row
        }
    });

    let widths = [
        Constraint::Length(9),
        Constraint::Length(17),
        Constraint::Min(18),
        Constraint::Length(16),
        Constraint::Length(14),
        Constraint::Length(7),
        Constraint::Length(9),
        Constraint::Length(8),
        Constraint::Length(9),
    ];
    let table = Table::new(rows, widths).header(
        Row::new(vec![
            "ID", "Placed", "Event", "Market", "Selection", "Odds", "Stake", "Status", "Result",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(table, area);
}

fn render_pnl(frame: &mut Frame, area: Rect, state: &DashboardState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let s = &state.summary;
    let pct = |v: Option<f64>| {
        v.map(|v| format!("{:.1}%", v * 100.0))
            .unwrap_or_else(|| "n/a".to_string())
    };
    let lines = [
        format!("Bets           {}", s.total),
        format!("W / L / P / V  {} / {} / {} / {}", s.won, s.lost, s.push, s.void),
        format!("Pending        {} ({:.2} at risk)", s.pending, s.pending_exposure),
        format!("Staked         {:.2}", s.staked),
        format!("Returned       {:.2}", s.returned),
        format!("Net profit     {:+.2}", s.net_profit),
        format!("ROI            {}", pct(s.roi)),
        format!("Win rate       {}", pct(s.win_rate)),
        format!(
            "Avg odds       {}",
            s.avg_decimal_odds
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "n/a".to_string())
        ),
        format!("Best streak    {}", s.longest_win_streak),
        format!("Current streak {:+}", s.current_streak),
        format!("Max drawdown   {:.2}", state.drawdown),
    ]
    .join("\n");
    let summary =
        Paragraph::new(lines).block(Block::default().title("Summary").borders(Borders::ALL));
    frame.render_widget(summary, cols[0]);

    let mut rows = Vec::new();
    for (section, groups) in [("market", &state.by_market), ("league", &state.by_league)] {
        for (key, g) in groups {
            let style = if g.net_profit >= 0.0 {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::Red)
            };
            let mut row = Row::new(vec![
                Cell::from(section),
                Cell::from(key.clone()),
                Cell::from(g.total.to_string()),
                Cell::from(format!("{:.2}", g.staked)),
                Cell::from(format!("{:+.2}", g.net_profit)).style(style),
                Cell::from(pct(g.roi)),
            ]);
            if rows.len() == state.selected {
                row = row.style(Style::default().bg(Color::DarkGray));
            }
            rows.push(row);
        }
    }
    let widths = [
        Constraint::Length(7),
        Constraint::Min(16),
        Constraint::Length(6),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(8),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["By", "Group", "Bets", "Staked", "Net", "ROI"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().title("Breakdown").borders(Borders::ALL));
    frame.render_widget(table, cols[1]);
}

fn render_standings(frame: &mut Frame, area: Rect, state: &DashboardState) {
    if state.league_id.is_none() {
        let empty = Paragraph::new("Set MAESTRO_DEFAULT_LEAGUE or pass --league to show a table.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }
    if state.standings.is_empty() {
        let empty = Paragraph::new("No finished matches stored for this league.")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let visible = area.height.saturating_sub(3) as usize;
    let (start, end) = visible_range(state.selected, state.standings.len(), visible);
    let rows = (start..end).map(|idx| {
        let r = &state.standings[idx];
        let row = Row::new(vec![
            (idx + 1).to_string(),
            r.team.clone(),
            r.played.to_string(),
            r.won.to_string(),
            r.drawn.to_string(),
            r.lost.to_string(),
            format!("{}:{}", r.goals_for, r.goals_against),
            format!("{:+}", r.goal_difference()),
            r.points.to_string(),
            r.form.clone(),
        ]);
        if idx == state.selected {
            row.style(Style::default().bg(Color::DarkGray).fg(Color::White))
        } else {
            row
        }
    });
    let widths = [
        Constraint::Length(3),
        Constraint::Min(18),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(7),
        Constraint::Length(5),
        Constraint::Length(4),
        Constraint::Length(6),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["#", "Team", "P", "W", "D", "L", "Goals", "GD", "Pts", "Form"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(
            Block::default()
                .title(state.league_name.as_str())
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(50, 50, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Maestro - Help",
        "",
        "  1 / 2 / 3    Bets / P&L / Standings",
        "  Tab          Next view",
        "  j/k or ↑/↓   Move",
        "  r            Reload from store",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text).block(Block::default().title("Help").borders(Borders::ALL));
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}
