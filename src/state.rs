use std::collections::VecDeque;
use std::time::{Instant, SystemTime};

use crate::competition::{COMPETITIONS, GroupLayout, layout_of};
use crate::loader::{DataSource, LoadedData};
use crate::model::MatchRecord;
use crate::names::{clean_team_name, looks_like_club};
use crate::standings::{Overrides, StandingsConfig, StandingsTable, compute_standings};
use crate::view::{
    View, ViewState, club_list, club_matches, competition_matches, date_jump_index, date_matches,
    default_group, groups_for,
};

const MAX_LOGS: usize = 200;

#[derive(Debug, Clone, Default)]
pub struct ExportState {
    pub active: bool,
    pub done: bool,
    pub path: Option<String>,
    pub message: String,
    pub last_updated: Option<Instant>,
}

impl ExportState {
    pub fn clear_if_done_for(&mut self, now: Instant, keep_secs: u64) {
        if !self.active || !self.done {
            return;
        }
        let Some(last) = self.last_updated else {
            return;
        };
        if now.duration_since(last).as_secs() >= keep_secs {
            *self = Self::default();
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub view: ViewState,
    pub matches: Vec<MatchRecord>,
    pub overrides: Overrides,
    pub standings_config: StandingsConfig,
    pub source: Option<DataSource>,
    pub fetched_at: Option<SystemTime>,
    pub loaded_at: Option<SystemTime>,
    pub loading: bool,
    pub selected: usize,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    pub export: ExportState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ViewState::default())
    }
}

impl AppState {
    pub fn new(view: ViewState) -> Self {
        Self {
            view,
            matches: Vec::new(),
            overrides: Overrides::default(),
            standings_config: StandingsConfig::default(),
            source: None,
            fetched_at: None,
            loaded_at: None,
            loading: true,
            selected: 0,
            logs: VecDeque::with_capacity(MAX_LOGS),
            help_overlay: false,
            export: ExportState::default(),
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    pub fn maybe_clear_export(&mut self, now: Instant) {
        self.export.clear_if_done_for(now, 8);
    }

    pub fn is_stale(&self) -> bool {
        self.source.is_some_and(DataSource::is_stale)
    }

    /// Rows for the list-style views. The table view has none.
    pub fn visible_matches(&self) -> Vec<&MatchRecord> {
        match self.view.view {
            View::Matches => competition_matches(&self.view, &self.matches),
            View::Team => match self.view.club.as_deref() {
                Some(club) => club_matches(club, &self.matches)
                    .into_iter()
                    .filter(|m| self.view.status.allows(m))
                    .collect(),
                None => Vec::new(),
            },
            View::Date => date_matches(&self.matches)
                .into_iter()
                .filter(|m| self.view.status.allows(m))
                .collect(),
            View::Table => Vec::new(),
        }
    }

    pub fn selected_match(&self) -> Option<&MatchRecord> {
        self.visible_matches().get(self.selected).copied()
    }

    pub fn current_table(&self) -> Option<StandingsTable> {
        if !self.view.table_available() {
            return None;
        }
        Some(compute_standings(
            &self.matches,
            &self.view.competition,
            self.view.group.as_deref(),
            &self.overrides,
            &self.standings_config,
        ))
    }

    pub fn row_count(&self) -> usize {
        match self.view.view {
            View::Table => self.current_table().map(|t| t.rows.len()).unwrap_or(0),
            _ => self.visible_matches().len(),
        }
    }

    pub fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.row_count().saturating_sub(1));
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.row_count();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    pub fn cycle_competition(&mut self, step: isize) {
        let len = COMPETITIONS.len() as isize;
        let current = COMPETITIONS
            .iter()
            .position(|c| c.name == self.view.competition)
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(len) as usize;
        self.view
            .set_competition(COMPETITIONS[next].name, &self.matches);
        if self.view.view == View::Team || self.view.view == View::Date {
            self.view.view = View::Matches;
        }
        self.selected = 0;
    }

    pub fn cycle_group(&mut self, step: isize) {
        // A single-table competition has its league phase under `None`.
        let mut options: Vec<Option<String>> = Vec::new();
        if layout_of(&self.view.competition) == GroupLayout::Single {
            options.push(None);
        }
        options.extend(groups_for(&self.view.competition, &self.matches).into_iter().map(Some));
        if options.len() < 2 && options.first() == Some(&self.view.group) {
            return;
        }
        if options.is_empty() {
            return;
        }
        let len = options.len() as isize;
        let next = match options.iter().position(|g| *g == self.view.group) {
            Some(idx) => (idx as isize + step).rem_euclid(len) as usize,
            None if step >= 0 => 0,
            None => options.len() - 1,
        };
        match &options[next] {
            Some(group) => {
                self.view.select_group(group, &self.matches);
            }
            None => self.view.group = None,
        }
        if self.view.view == View::Table && !self.view.table_available() {
            self.view.view = View::Matches;
        }
        self.selected = 0;
    }

    /// Flips between fixtures and the league table. Knockout has no table, so
    /// the request is refused with a log line.
    pub fn toggle_table(&mut self) {
        match self.view.view {
            View::Table => self.view.view = View::Matches,
            _ if !self.view.table_available() => {
                self.push_log("[INFO] No league table for knockout games");
                return;
            }
            _ => self.view.view = View::Table,
        }
        self.selected = 0;
    }

    pub fn show_club_view(&mut self) {
        if self.view.club.is_none() {
            let from_selection = self.selected_match().map(|m| clean_team_name(&m.home));
            self.view.club = from_selection
                .filter(|name| looks_like_club(name))
                .or_else(|| club_list(&self.matches).into_iter().next());
        }
        self.view.view = View::Team;
        self.selected = 0;
    }

    pub fn cycle_club(&mut self, step: isize) {
        let clubs = club_list(&self.matches);
        if clubs.is_empty() {
            return;
        }
        let len = clubs.len() as isize;
        let next = match self
            .view
            .club
            .as_ref()
            .and_then(|c| clubs.iter().position(|x| x == c))
        {
            Some(idx) => (idx as isize + step).rem_euclid(len) as usize,
            None => 0,
        };
        self.view.club = Some(clubs[next].clone());
        self.view.view = View::Team;
        self.selected = 0;
    }

    pub fn show_date_view(&mut self) {
        self.view.view = View::Date;
        self.jump_to_date();
    }

    /// Scrolls the date view to the requested date (or today when none).
    pub fn jump_to_date(&mut self) {
        let target = self
            .view
            .date
            .clone()
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string());
        let rows = self.visible_matches();
        self.selected = date_jump_index(&rows, &target).unwrap_or(0);
    }

    pub fn cycle_status(&mut self) {
        self.view.status = self.view.status.cycle();
        self.clamp_selection();
    }
}

#[derive(Debug, Clone)]
pub enum Delta {
    SetData(Box<LoadedData>),
    LoadFailed(String),
    ExportStarted { path: String },
    ExportFinished {
        path: String,
        fixtures: usize,
        tables: usize,
    },
    ExportFailed { path: String, error: String },
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Refresh,
    Export { path: String },
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetData(data) => {
            let LoadedData {
                matches,
                overrides,
                source,
                fetched_at,
                base_count,
                knockout_count,
                notes,
            } = *data;
            state.matches = matches;
            state.overrides = overrides;
            state.source = Some(source);
            state.fetched_at = fetched_at;
            state.loaded_at = Some(SystemTime::now());
            state.loading = false;

            // A refresh can remove the selected group (e.g. knockout games withdrawn).
            let groups = groups_for(&state.view.competition, &state.matches);
            let group_valid = match state.view.group.as_ref() {
                Some(group) => groups.contains(group),
                None => true,
            };
            if !group_valid {
                state.view.group = default_group(&state.view.competition, &state.matches);
            }
            if state.view.view == View::Table && !state.view.table_available() {
                state.view.view = View::Matches;
            }

            if state.view.view == View::Date {
                state.jump_to_date();
            } else {
                state.clamp_selection();
            }

            state.push_log(format!(
                "[INFO] Loaded {base_count} matches (+{knockout_count} knockout)"
            ));
            match source {
                DataSource::Live => {}
                DataSource::Cache => {
                    state.push_log("[WARN] Live data unavailable, showing cached copy")
                }
                DataSource::Bootstrap => {
                    state.push_log("[WARN] Live data unavailable, showing bundled snapshot")
                }
            }
            for note in notes {
                state.push_log(format!("[WARN] {note}"));
            }
        }
        Delta::LoadFailed(err) => {
            state.loading = false;
            state.push_log(format!("[WARN] Load failed: {err}"));
        }
        Delta::ExportStarted { path } => {
            state.export = ExportState {
                active: true,
                done: false,
                path: Some(path),
                message: "Exporting".to_string(),
                last_updated: Some(Instant::now()),
            };
        }
        Delta::ExportFinished {
            path,
            fixtures,
            tables,
        } => {
            state.export.active = true;
            state.export.done = true;
            state.export.message = format!("Done: {fixtures} fixtures, {tables} tables");
            state.export.last_updated = Some(Instant::now());
            state.push_log(format!("[INFO] Export saved: {path}"));
            state.export.path = Some(path);
        }
        Delta::ExportFailed { path, error } => {
            state.export.active = true;
            state.export.done = true;
            state.export.message = format!("Failed: {error}");
            state.export.last_updated = Some(Instant::now());
            state.push_log(format!("[WARN] Export failed ({path}): {error}"));
            state.export.path = Some(path);
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
