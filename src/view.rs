use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use url::{Url, form_urlencoded};

use crate::competition::{GroupLayout, competition_rank, default_competition, find, layout_of};
use crate::feed::normalize_group;
use crate::model::{KNOCKOUT_GROUP, MatchRecord};
use crate::names::{clean_team_name, looks_like_club};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Section {
    #[default]
    Hurling,
    Football,
    About,
}

impl Section {
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Hurling => "hurling",
            Section::Football => "football",
            Section::About => "about",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hurling" => Some(Section::Hurling),
            "football" => Some(Section::Football),
            "about" => Some(Section::About),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum View {
    #[default]
    Matches,
    Table,
    Team,
    Date,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Matches => "matches",
            View::Table => "table",
            View::Team => "team",
            View::Date => "date",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "matches" => Some(View::Matches),
            "table" => Some(View::Table),
            "team" | "club" => Some(View::Team),
            "date" => Some(View::Date),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Result,
    Fixture,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Result => "result",
            StatusFilter::Fixture => "fixture",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Some(StatusFilter::All),
            "result" | "results" => Some(StatusFilter::Result),
            "fixture" | "fixtures" => Some(StatusFilter::Fixture),
            _ => None,
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Result,
            StatusFilter::Result => StatusFilter::Fixture,
            StatusFilter::Fixture => StatusFilter::All,
        }
    }

    pub fn allows(self, m: &MatchRecord) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Result => m.is_result(),
            StatusFilter::Fixture => !m.is_result(),
        }
    }
}

/// Everything needed to reproduce one screen; round-trips through a query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub section: Section,
    pub view: View,
    pub competition: String,
    pub group: Option<String>,
    pub club: Option<String>,
    pub date: Option<String>,
    pub status: StatusFilter,
}

impl Default for ViewState {
    fn default() -> Self {
        let comp = default_competition();
        Self {
            section: Section::Hurling,
            view: View::Matches,
            competition: comp.name.to_string(),
            group: default_group(comp.name, &[]),
            club: None,
            date: None,
            status: StatusFilter::All,
        }
    }
}

impl ViewState {
    /// Only non-default values are written so the bare page stays clean.
    pub fn to_query(&self) -> String {
        let mut sp = form_urlencoded::Serializer::new(String::new());
        if self.section != Section::Hurling {
            sp.append_pair("s", self.section.as_str());
        }
        if self.view != View::Matches {
            sp.append_pair("v", self.view.as_str());
        }
        if !self.competition.is_empty() {
            sp.append_pair("comp", &self.competition);
        }
        if let Some(group) = self.group.as_deref() {
            sp.append_pair("group", group);
        }
        if let Some(club) = self.club.as_deref() {
            sp.append_pair("team", club);
        }
        if let Some(date) = self.date.as_deref() {
            sp.append_pair("date", date);
        }
        if self.status != StatusFilter::All {
            sp.append_pair("status", self.status.as_str());
        }
        sp.finish()
    }

    pub fn share_url(&self, base: &str) -> String {
        let query = self.to_query();
        match Url::parse(base) {
            Ok(mut url) => {
                url.set_query(if query.is_empty() { None } else { Some(&query) });
                url.to_string()
            }
            Err(_) if query.is_empty() => base.to_string(),
            Err(_) => format!("{base}?{query}"),
        }
    }

    /// Restores a state from `?comp=...`, a bare query, or a full link.
    /// Unknown values fall back to defaults instead of failing.
    pub fn from_query(raw: &str, matches: &[MatchRecord]) -> Self {
        let trimmed = raw.trim();
        let query = match Url::parse(trimmed) {
            Ok(url) => url.query().unwrap_or("").to_string(),
            Err(_) => trimmed.trim_start_matches('?').to_string(),
        };

        let mut state = ViewState::default();
        let mut comp = None;
        let mut group = None;
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim().to_string();
            match key.as_ref() {
                "s" => state.section = Section::parse(&value).unwrap_or_default(),
                "v" => state.view = View::parse(&value).unwrap_or_default(),
                "comp" => comp = Some(value),
                "group" if !value.is_empty() => group = Some(value),
                "team" if !value.is_empty() => state.club = Some(value),
                "date" => state.date = NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                    .ok()
                    .map(|_| value),
                "status" => state.status = StatusFilter::parse(&value).unwrap_or_default(),
                _ => {}
            }
        }

        let comp = comp
            .and_then(|c| {
                find(&c)
                    .or_else(|| crate::competition::find_by_code(&c))
                    .map(|found| found.name.to_string())
            })
            .unwrap_or_else(|| default_competition().name.to_string());
        state.set_competition(&comp, matches);
        if let Some(group) = group {
            state.select_group(&group, matches);
        }
        if state.view == View::Table && !state.table_available() {
            state.view = View::Matches;
        }
        state
    }

    /// Switching competition resets the group to that competition's default.
    pub fn set_competition(&mut self, competition: &str, matches: &[MatchRecord]) {
        self.competition = competition.to_string();
        self.group = default_group(competition, matches);
    }

    /// Accepts only groups the competition actually has; returns whether the
    /// selection changed.
    pub fn select_group(&mut self, group: &str, matches: &[MatchRecord]) -> bool {
        let groups = groups_for(&self.competition, matches);
        let Some(found) = groups.iter().find(|g| g.eq_ignore_ascii_case(group.trim())) else {
            return false;
        };
        if layout_of(&self.competition) == GroupLayout::Single && found != KNOCKOUT_GROUP {
            self.group = None;
        } else {
            self.group = Some(found.clone());
        }
        if self.view == View::Table && !self.table_available() {
            self.view = View::Matches;
        }
        true
    }

    pub fn is_knockout(&self) -> bool {
        self.group.as_deref() == Some(KNOCKOUT_GROUP)
    }

    /// A knockout bracket has no league table.
    pub fn table_available(&self) -> bool {
        !self.is_knockout()
    }

    pub fn matches_label(&self) -> String {
        if self.is_knockout() {
            return KNOCKOUT_GROUP.to_string();
        }
        match layout_of(&self.competition) {
            GroupLayout::Single => find(&self.competition)
                .map(|c| c.code.to_string())
                .unwrap_or_else(|| self.competition.clone()),
            _ => self.group.clone().unwrap_or_else(|| "Group 1".to_string()),
        }
    }
}

pub fn default_group(competition: &str, matches: &[MatchRecord]) -> Option<String> {
    match layout_of(competition) {
        GroupLayout::Single => None,
        GroupLayout::Groups(groups) => groups.first().map(|g| g.to_string()),
        // Only knockout games so far: open on those.
        GroupLayout::Inferred => groups_for(competition, matches).into_iter().next(),
    }
}

/// Matches loose user input ("1", "group 1", "Group City") against the
/// competition's league groups. Knockout has no table and never matches.
pub fn resolve_table_group(competition: &str, raw: &str, matches: &[MatchRecord]) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let bare = match raw.get(..5) {
        Some(head) if head.eq_ignore_ascii_case("group") => raw[5..].trim(),
        _ => raw,
    };
    let candidates = [
        raw.to_string(),
        bare.to_string(),
        normalize_group(raw, competition),
        normalize_group(&format!("Group {bare}"), competition),
    ];
    groups_for(competition, matches)
        .into_iter()
        .filter(|g| g != KNOCKOUT_GROUP)
        .find(|g| candidates.iter().any(|c| c.eq_ignore_ascii_case(g)))
}

/// League-phase groups in display order, with `Knockout` appended when the
/// competition has knockout games.
pub fn groups_for(competition: &str, matches: &[MatchRecord]) -> Vec<String> {
    let mut groups: Vec<String> = match layout_of(competition) {
        GroupLayout::Single => Vec::new(),
        GroupLayout::Groups(groups) => groups.iter().map(|g| g.to_string()).collect(),
        GroupLayout::Inferred => inferred_groups(competition, matches),
    };
    if matches
        .iter()
        .any(|m| m.competition == competition && m.is_knockout())
    {
        groups.push(KNOCKOUT_GROUP.to_string());
    }
    groups
}

fn inferred_groups(competition: &str, matches: &[MatchRecord]) -> Vec<String> {
    let mut groups: Vec<String> = matches
        .iter()
        .filter(|m| m.competition == competition && !m.is_knockout() && !m.group.is_empty())
        .map(|m| m.group.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    groups.sort_by(|a, b| natural_cmp(a, b));
    groups
}

/// Orders "Group 2" before "Group 10".
fn natural_cmp(a: &str, b: &str) -> Ordering {
    let split = |s: &str| {
        let idx = s.find(|c: char| c.is_ascii_digit()).unwrap_or(s.len());
        let (head, tail) = s.split_at(idx);
        let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
        (head.to_lowercase(), digits.parse::<u64>().ok(), s.to_string())
    };
    split(a).cmp(&split(b))
}

fn round_date_time(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    a.round_num
        .cmp(&b.round_num)
        .then_with(|| a.date.cmp(&b.date))
        .then_with(|| a.time.cmp(&b.time))
}

fn date_time(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    a.date.cmp(&b.date).then_with(|| a.time.cmp(&b.time))
}

fn date_comp_time(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| competition_rank(&a.competition).cmp(&competition_rank(&b.competition)))
        .then_with(|| a.time.cmp(&b.time))
}

/// Matches for the competition/group selection. Knockout games are listed only
/// under the knockout group, in date order; the league phase is sorted by round.
pub fn competition_matches<'a>(state: &ViewState, matches: &'a [MatchRecord]) -> Vec<&'a MatchRecord> {
    let single_table = layout_of(&state.competition) == GroupLayout::Single;
    let knockout = state.is_knockout();
    let mut rows: Vec<&MatchRecord> = matches
        .iter()
        .filter(|m| m.competition == state.competition)
        .filter(|m| {
            if knockout {
                m.is_knockout()
            } else {
                !m.is_knockout()
                    && (single_table
                        || state.group.is_none()
                        || state.group.as_deref() == Some(m.group.as_str()))
            }
        })
        .filter(|m| state.status.allows(m))
        .collect();
    if knockout {
        rows.sort_by(|a, b| date_time(a, b));
    } else {
        rows.sort_by(|a, b| round_date_time(a, b));
    }
    rows
}

/// Unique, cleaned club names; knockout slot placeholders are left out.
pub fn club_list(matches: &[MatchRecord]) -> Vec<String> {
    matches
        .iter()
        .flat_map(|m| [clean_team_name(&m.home), clean_team_name(&m.away)])
        .filter(|name| looks_like_club(name))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// A club's games: results first, then fixtures, each by round/date/time.
pub fn club_matches<'a>(club: &str, matches: &'a [MatchRecord]) -> Vec<&'a MatchRecord> {
    let club = club.trim();
    if club.is_empty() {
        return Vec::new();
    }
    let mut rows: Vec<&MatchRecord> = matches
        .iter()
        .filter(|m| clean_team_name(&m.home) == club || clean_team_name(&m.away) == club)
        .collect();
    rows.sort_by(|a, b| {
        let rank = |m: &MatchRecord| if m.is_result() { 0 } else { 1 };
        rank(a).cmp(&rank(b)).then_with(|| round_date_time(a, b))
    });
    rows
}

/// Every match, by date then competition seniority then time.
pub fn date_matches(matches: &[MatchRecord]) -> Vec<&MatchRecord> {
    let mut rows: Vec<&MatchRecord> = matches.iter().collect();
    rows.sort_by(|a, b| date_comp_time(a, b));
    rows
}

/// Row to scroll to for a requested date: the first row of that date, or the
/// first row of the closest earlier date, or the last row.
pub fn date_jump_index(rows: &[&MatchRecord], date: &str) -> Option<usize> {
    if rows.is_empty() {
        return None;
    }
    if let Some(idx) = rows.iter().position(|m| m.date == date) {
        return Some(idx);
    }
    let chosen = rows
        .iter()
        .take_while(|m| m.date.as_str() <= date)
        .last()
        .map(|m| m.date.as_str());
    match chosen {
        Some(d) if !d.is_empty() => rows.iter().position(|m| m.date == d),
        _ => Some(rows.len() - 1),
    }
}

pub fn format_date_short(iso: &str) -> String {
    match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(date) => format!(
            "{} {:02}/{:02}",
            date.format("%a"),
            date.day(),
            date.month()
        ),
        Err(_) => iso.to_string(),
    }
}

pub fn format_time_short(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some((h, rest)) = trimmed.split_once(':') else {
        return trimmed.to_string();
    };
    let minutes: String = rest.chars().take(2).collect();
    match (h.parse::<u32>(), minutes.len() == 2 && minutes.chars().all(|c| c.is_ascii_digit())) {
        (Ok(hour), true) if h.len() <= 2 => format!("{hour:02}:{minutes}"),
        _ => trimmed.to_string(),
    }
}

pub fn round_short(round: &str) -> String {
    let trimmed = round.trim();
    let short = match trimmed.get(..5) {
        Some(head) if head.eq_ignore_ascii_case("round") => format!("R{}", &trimmed[5..]),
        _ => trimmed.to_string(),
    };
    let compact: String = short.split_whitespace().collect();
    if compact.is_empty() {
        "—".to_string()
    } else {
        compact
    }
}

pub fn group_short(group: &str) -> String {
    let trimmed = group.trim();
    match trimmed.get(..5) {
        Some(head) if head.eq_ignore_ascii_case("group") => {
            format!("G{}", trimmed[5..].trim())
        }
        _ => trimmed.to_string(),
    }
}

/// The centre column of a match row: both scores, `W/O`, or a dash.
pub fn score_middle(m: &MatchRecord) -> String {
    if m.is_walkover() {
        return "W/O".to_string();
    }
    match (m.home_score, m.away_score) {
        (Some(h), Some(a)) => format!("{h} - {a}"),
        _ => "—".to_string(),
    }
}
