use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use tracing::{info, warn};

use hurling_hub::competition::{display_label, long_label};
use hurling_hub::config::{Config, load_env_files};
use hurling_hub::logging::init_file_logging;
use hurling_hub::model::MatchRecord;
use hurling_hub::persist;
use hurling_hub::provider::spawn_provider;
use hurling_hub::state::{AppState, Delta, ProviderCommand, apply_delta};
use hurling_hub::view::{
    Section, StatusFilter, View, ViewState, format_date_short, format_time_short, group_short,
    round_short, score_middle,
};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    share_base: String,
    state_path: Option<PathBuf>,
    /// Link or saved query to apply once the first dataset arrives; groups of
    /// some competitions are only known from the data.
    pending_query: Option<String>,
}

impl App {
    fn new(
        cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
        config: &Config,
        pending_query: Option<String>,
    ) -> Self {
        let view = pending_query
            .as_deref()
            .map(|q| ViewState::from_query(q, &[]))
            .unwrap_or_default();
        Self {
            state: AppState::new(view),
            should_quit: false,
            cmd_tx,
            share_base: config.share_base.clone(),
            state_path: persist::state_path(),
            pending_query,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            match key.code {
                KeyCode::Char('?') | KeyCode::Esc => self.state.help_overlay = false,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        let before = self.state.view.clone();
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.state.help_overlay = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_selection(-1),
            KeyCode::PageDown => self.state.move_selection(10),
            KeyCode::PageUp => self.state.move_selection(-10),
            KeyCode::Char('c') => self.state.cycle_competition(1),
            KeyCode::Char('C') => self.state.cycle_competition(-1),
            KeyCode::Char('g') => self.state.cycle_group(1),
            KeyCode::Char('G') => self.state.cycle_group(-1),
            KeyCode::Char('t') | KeyCode::Tab => self.state.toggle_table(),
            KeyCode::Char('m') => {
                self.state.view.view = View::Matches;
                self.state.selected = 0;
            }
            KeyCode::Char('p') => self.state.show_club_view(),
            KeyCode::Char(']') => self.state.cycle_club(1),
            KeyCode::Char('[') => self.state.cycle_club(-1),
            KeyCode::Char('d') => self.state.show_date_view(),
            KeyCode::Char('h') | KeyCode::Left if self.state.view.view == View::Date => {
                self.step_date(-1)
            }
            KeyCode::Char('l') | KeyCode::Right if self.state.view.view == View::Date => {
                self.step_date(1)
            }
            KeyCode::Char('T') => {
                self.state.view.date = None;
                self.state.show_date_view();
            }
            KeyCode::Char('f') => self.state.cycle_status(),
            KeyCode::Char('a') => self.toggle_section(Section::About),
            KeyCode::Char('F') => self.toggle_section(Section::Football),
            KeyCode::Char('s') => {
                let link = self.state.view.share_url(&self.share_base);
                self.state.push_log(format!("[INFO] Link: {link}"));
            }
            KeyCode::Char('e') => self.request_export(),
            KeyCode::Char('r') => self.request_refresh(),
            _ => {}
        }
        if self.state.view != before {
            self.save_view();
        }
    }

    fn toggle_section(&mut self, section: Section) {
        self.state.view.section = if self.state.view.section == section {
            Section::Hurling
        } else {
            section
        };
    }

    /// Moves the date view to the previous/next date that has games.
    fn step_date(&mut self, step: isize) {
        let rows = self.state.visible_matches();
        let Some(current) = self.state.selected_match().map(|m| m.date.clone()) else {
            return;
        };
        let mut dates: Vec<&str> = rows.iter().map(|m| m.date.as_str()).collect();
        dates.dedup();
        let Some(idx) = dates.iter().position(|d| *d == current) else {
            return;
        };
        let next = idx.saturating_add_signed(step).min(dates.len().saturating_sub(1));
        let target = dates[next].to_string();
        self.state.view.date = Some(target);
        self.state.jump_to_date();
    }

    fn request_refresh(&mut self) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Refresh unavailable");
            return;
        };
        if tx.send(ProviderCommand::Refresh).is_err() {
            self.state.push_log("[WARN] Refresh request failed");
        } else {
            self.state.loading = true;
        }
    }

    fn request_export(&mut self) {
        if self.state.export.active && !self.state.export.done {
            self.state.push_log("[INFO] Export already running");
            return;
        }
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Export unavailable");
            return;
        };
        let path = export_path();
        if tx.send(ProviderCommand::Export { path: path.clone() }).is_err() {
            self.state.push_log("[WARN] Export request failed");
        } else {
            self.state.push_log(format!("[INFO] Export queued: {path}"));
        }
    }

    /// Applies a deferred link once there is data to resolve it against.
    fn apply_pending_query(&mut self) {
        if self.state.matches.is_empty() {
            return;
        }
        let Some(query) = self.pending_query.take() else {
            return;
        };
        self.state.view = ViewState::from_query(&query, &self.state.matches);
        self.state.selected = 0;
        if self.state.view.view == View::Date {
            self.state.jump_to_date();
        }
        self.save_view();
    }

    fn save_view(&self) {
        if let Some(path) = &self.state_path {
            persist::save_view(path, &self.state.view);
        }
    }
}

fn main() -> io::Result<()> {
    load_env_files();
    let config = Config::from_env();
    let _log_guard = init_file_logging(config.log_dir.as_deref());
    info!(data_url = %config.data_url, "starting");

    // A link given on the command line wins over the last saved view.
    let pending_query = link_arg().or_else(|| {
        persist::state_path().and_then(|path| persist::load_saved_query(&path))
    });

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(config.clone(), tx, cmd_rx);

    let mut app = App::new(Some(cmd_tx), &config, pending_query);
    let res = run_app(&mut terminal, &mut app, rx);
    app.save_view();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        warn!("ui loop ended with error: {err}");
        eprintln!("error: {err}");
    }
    Ok(())
}

fn link_arg() -> Option<String> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--link" {
            return args.next();
        }
        if let Some(value) = arg.strip_prefix("--link=") {
            return Some(value.to_string());
        }
        if arg.contains('=') || arg.starts_with('?') || arg.starts_with("http") {
            return Some(arg);
        }
    }
    None
}

fn export_path() -> String {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("hurling_export_{stamp}.xlsx")
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.apply_pending_query();
        app.state.maybe_clear_export(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    match app.state.view.section {
        Section::Hurling => match app.state.view.view {
            View::Table => render_table(frame, chunks[1], &app.state),
            _ => render_matches(frame, chunks[1], &app.state),
        },
        Section::Football => {
            let text = Paragraph::new("Football fixtures are not published yet.\n\nF  Back to hurling")
                .block(Block::default().title("Football").borders(Borders::ALL));
            frame.render_widget(text, chunks[1]);
        }
        Section::About => {
            let text = Paragraph::new(about_text())
                .block(Block::default().title("About").borders(Borders::ALL));
            frame.render_widget(text, chunks[1]);
        }
    }

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let view = &state.view;
    let scope = match view.view {
        View::Team => format!("Club: {}", view.club.as_deref().unwrap_or("-")),
        View::Date => format!("By date: {}", view.date.as_deref().unwrap_or("today")),
        View::Matches | View::Table => format!(
            "{} | {} | {}",
            display_label(&view.competition),
            view.matches_label(),
            if view.view == View::Table {
                "Table"
            } else {
                "Matches"
            }
        ),
    };
    let status = match view.status {
        StatusFilter::All => "",
        StatusFilter::Result => " | Results only",
        StatusFilter::Fixture => " | Fixtures only",
    };
    let line1 = format!("  HURLING HUB | {scope}{status}");
    let line2 = format!("  {}", long_label(&view.competition));
    let line3 = data_line(state);
    format!("{line1}\n{line2}\n{line3}")
}

fn data_line(state: &AppState) -> String {
    if state.loading && state.source.is_none() {
        return "  Loading fixtures...".to_string();
    }
    let mut line = format!("  {} matches", state.matches.len());
    if state.is_stale() {
        let age = state
            .fetched_at
            .and_then(|t| SystemTime::now().duration_since(t).ok())
            .map(|d| format!(" ({} min old)", d.as_secs() / 60))
            .unwrap_or_default();
        line.push_str(&format!(" | STALE DATA{age}"));
    }
    if state.loading {
        line.push_str(" | refreshing");
    }
    if state.export.active {
        line.push_str(&format!(" | Export: {}", state.export.message));
    }
    line
}

fn footer_text(state: &AppState) -> String {
    match state.view.view {
        View::Date => {
            "h/l Prev/next date | T Today | m Matches | p Club | f Filter | s Link | e Export | r Refresh | ? Help | q Quit".to_string()
        }
        View::Team => {
            "[/] Prev/next club | m Matches | d Dates | f Filter | s Link | e Export | ? Help | q Quit".to_string()
        }
        _ => {
            "c Comp | g Group | t Table | p Club | d Dates | f Filter | s Link | e Export | r Refresh | ? Help | q Quit".to_string()
        }
    }
}

fn match_columns() -> [Constraint; 7] {
    [
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Min(16),
        Constraint::Length(17),
        Constraint::Min(16),
        Constraint::Min(10),
    ]
}

fn render_matches(frame: &mut Frame, area: Rect, state: &AppState) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let widths = match_columns();
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[0]);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let second = if state.view.view == View::Date {
        "Comp"
    } else {
        "Round"
    };
    for (col, title) in ["Date", "Time", second, "Home", "Score", "Away", "Venue"]
        .iter()
        .enumerate()
    {
        render_cell_text(frame, header_cols[col], title, bold);
    }

    let list_area = sections[1];
    let rows = state.visible_matches();
    if rows.is_empty() {
        let msg = match state.view.view {
            View::Team if state.view.club.is_none() => "Pick a club with [ and ]",
            _ if state.loading => "Loading...",
            _ => "No matches for this selection",
        };
        let empty = Paragraph::new(msg).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, rows.len(), visible);
    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let selected = idx == state.selected;
        let m = rows[idx];
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else if m.is_result() {
            Style::default()
        } else {
            Style::default().fg(Color::Gray)
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);
        for (col, text) in match_cells(m, state.view.view).iter().enumerate() {
            render_cell_text(frame, cols[col], text, row_style);
        }
    }
}

fn match_cells(m: &MatchRecord, view: View) -> [String; 7] {
    let second = match view {
        View::Date => m.code.clone(),
        View::Team => format!("{} {}", m.code, round_short(&m.round)),
        _ if m.is_knockout() => m.round.clone(),
        _ => round_short(&m.round),
    };
    let venue = if m.venue.is_empty() && !m.group.is_empty() && view != View::Matches {
        group_short(&m.group)
    } else {
        m.venue.clone()
    };
    [
        format_date_short(&m.date),
        format_time_short(&m.time),
        second,
        m.home.clone(),
        score_middle(m),
        m.away.clone(),
        venue,
    ]
}

fn table_columns() -> [Constraint; 10] {
    [
        Constraint::Length(4),
        Constraint::Min(20),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(4),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(5),
    ]
}

fn render_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let Some(table) = state.current_table() else {
        let empty = Paragraph::new("No league table for knockout games")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    };

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(if table.warnings.is_empty() { 0 } else { 2 }),
        ])
        .split(area);

    let widths = table_columns();
    let header_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(sections[0]);
    let bold = Style::default().add_modifier(Modifier::BOLD);
    for (col, title) in ["#", "Team", "P", "W", "D", "L", "For", "Agst", "Diff", "Pts"]
        .iter()
        .enumerate()
    {
        render_cell_text(frame, header_cols[col], title, bold);
    }

    if table.rows.is_empty() {
        let empty = Paragraph::new("No teams in this group yet")
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, sections[1]);
        return;
    }

    let list_area = sections[1];
    let (start, end) = visible_range(state.selected, table.rows.len(), list_area.height as usize);
    for (i, idx) in (start..end).enumerate() {
        let row = &table.rows[idx];
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };
        let style = if idx == state.selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if idx == state.selected {
            frame.render_widget(Block::default().style(style), row_area);
        }
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);
        let team = match (&row.note, row.adjustment) {
            (Some(_), _) => format!("{} *", row.team),
            (None, adj) if adj != 0 => format!("{} ({adj:+})", row.team),
            _ => row.team.clone(),
        };
        let cells = [
            row.position.to_string(),
            team,
            row.played.to_string(),
            row.won.to_string(),
            row.drawn.to_string(),
            row.lost.to_string(),
            row.score_for.to_string(),
            row.score_against.to_string(),
            format!("{:+}", row.diff),
            row.points.to_string(),
        ];
        for (col, text) in cells.iter().enumerate() {
            render_cell_text(frame, cols[col], text, style);
        }
    }

    if !table.warnings.is_empty() {
        let warn = Paragraph::new(table.warnings.join("\n")).style(Style::default().fg(Color::Yellow));
        frame.render_widget(warn, sections[2]);
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text).style(style);
    frame.render_widget(paragraph, text_area);
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

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    let lines: Vec<&str> = state.logs.iter().rev().take(3).map(String::as_str).collect();
    lines.into_iter().rev().collect::<Vec<_>>().join("\n")
}

fn about_text() -> String {
    [
        "Fixtures, results and league tables for the county hurling championships.",
        "",
        "Tables award 2 points for a win and 1 for a draw. A walkover gives the",
        "receiving club 2 points and leaves scoring totals untouched. Ties on points",
        "between two clubs go to their meeting, then scoring difference, then",
        "scores for.",
        "",
        "Results are provisional until ratified by the county board.",
        "",
        "a  Back to hurling",
    ]
    .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Hurling Hub - Help",
        "",
        "Competition:",
        "  c / C        Next/previous competition",
        "  g / G        Next/previous group",
        "  t / Tab      Matches/table",
        "  m            Matches view",
        "",
        "Clubs and dates:",
        "  p            Club view",
        "  [ / ]        Previous/next club",
        "  d            Date view",
        "  h/l or ←/→   Previous/next date",
        "  T            Jump to today",
        "",
        "General:",
        "  j/k or ↑/↓   Move",
        "  f            Cycle results/fixtures filter",
        "  s            Show share link in console",
        "  e            Export workbook",
        "  r            Refresh data",
        "  a / F        About / Football",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
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

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
