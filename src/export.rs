use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::competition::{GroupLayout, competition_code, competition_rank, layout_of};
use crate::model::{KNOCKOUT_GROUP, MatchRecord};
use crate::standings::{Overrides, StandingsConfig, StandingsTable, compute_standings};
use crate::view::{date_matches, groups_for};

const SHEET_NAME_MAX: usize = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub fixtures: usize,
    pub tables: usize,
}

/// Writes a workbook with every fixture on one sheet and one sheet per league
/// table.
pub fn export_workbook(
    path: impl AsRef<Path>,
    matches: &[MatchRecord],
    overrides: &Overrides,
) -> Result<ExportReport> {
    let path = path.as_ref();
    let fixtures = fixture_rows(matches);
    let tables = all_tables(matches, overrides);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Fixtures")?;
        write_rows(sheet, &fixtures)?;
    }
    let mut used = BTreeSet::new();
    for table in &tables {
        let name = unique_sheet_name(&sheet_name(table), &mut used);
        let sheet = workbook.add_worksheet();
        sheet.set_name(&name)?;
        write_rows(sheet, &standings_rows(table))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        fixtures: fixtures.len().saturating_sub(1),
        tables: tables.len(),
    })
}

/// League tables for every competition and group present in the data, in
/// catalog order.
pub fn all_tables(matches: &[MatchRecord], overrides: &Overrides) -> Vec<StandingsTable> {
    let config = StandingsConfig::default();
    let mut competitions: Vec<&str> = matches
        .iter()
        .filter(|m| !m.is_knockout() && !m.competition.is_empty())
        .map(|m| m.competition.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    competitions.sort_by_key(|c| competition_rank(c));

    let mut tables = Vec::new();
    for competition in competitions {
        let groups: Vec<Option<String>> = match layout_of(competition) {
            GroupLayout::Single => vec![None],
            _ => groups_for(competition, matches)
                .into_iter()
                .filter(|g| g != KNOCKOUT_GROUP)
                .map(Some)
                .collect(),
        };
        for group in groups {
            let table = compute_standings(matches, competition, group.as_deref(), overrides, &config);
            if !table.rows.is_empty() {
                tables.push(table);
            }
        }
    }
    tables
}

pub fn fixture_rows(matches: &[MatchRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![
        [
            "Date", "Time", "Competition", "Group", "Round", "Home", "Score", "Away", "Venue",
            "Referee", "Status",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>(),
    ];
    rows.extend(date_matches(matches).into_iter().map(fixture_row));
    rows
}

fn fixture_row(m: &MatchRecord) -> Vec<String> {
    let score = match (m.home_score, m.away_score) {
        (Some(h), Some(a)) => format!("{h} - {a}"),
        _ if m.is_walkover() => "W/O".to_string(),
        _ => String::new(),
    };
    vec![
        m.date.clone(),
        m.time.clone(),
        m.competition.clone(),
        m.group.clone(),
        m.round.clone(),
        m.home.clone(),
        score,
        m.away.clone(),
        m.venue.clone(),
        m.referee.clone(),
        m.status.label().to_string(),
    ]
}

pub fn standings_rows(table: &StandingsTable) -> Vec<Vec<String>> {
    let mut rows = vec![
        [
            "Pos", "Team", "P", "W", "D", "L", "For", "Against", "Diff", "Pts", "Adj", "Note",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>(),
    ];
    for row in &table.rows {
        rows.push(vec![
            row.position.to_string(),
            row.team.clone(),
            row.played.to_string(),
            row.won.to_string(),
            row.drawn.to_string(),
            row.lost.to_string(),
            row.score_for.to_string(),
            row.score_against.to_string(),
            row.diff.to_string(),
            row.points.to_string(),
            if row.adjustment == 0 {
                String::new()
            } else {
                row.adjustment.to_string()
            },
            row.note.clone().unwrap_or_default(),
        ]);
    }
    rows
}

fn sheet_name(table: &StandingsTable) -> String {
    let code = competition_code(&table.competition);
    let raw = match table.group.as_deref() {
        Some(group) => format!("{code} {group}"),
        None => code,
    };
    raw.chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(SHEET_NAME_MAX)
        .collect()
}

/// Excel refuses duplicate sheet names, case-insensitively.
fn unique_sheet_name(base: &str, used: &mut BTreeSet<String>) -> String {
    let mut name = base.to_string();
    let mut n = 2;
    while !used.insert(name.to_lowercase()) {
        let suffix = format!(" ({n})");
        let keep = SHEET_NAME_MAX.saturating_sub(suffix.len());
        name = format!("{}{suffix}", base.chars().take(keep).collect::<String>());
        n += 1;
    }
    name
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
