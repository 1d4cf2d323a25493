use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::competition::{GroupLayout, layout_of, resolve_competition};
use crate::model::{MatchRecord, Side, Status};
use crate::names::{clean_team_name, looks_like_club};

pub const POINTS_WIN: i32 = 2;
pub const POINTS_DRAW: i32 = 1;

/// Manual corrections published alongside the feed: board decisions that the
/// scraped results cannot express.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Overrides {
    #[serde(default)]
    pub adjustments: Vec<PointsAdjustment>,
    #[serde(default)]
    pub results: Vec<ResultOverride>,
    #[serde(default)]
    pub positions: Vec<PositionOverride>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.adjustments.is_empty() && self.results.is_empty() && self.positions.is_empty()
    }

    /// Later sources win for the same fixture or team; adjustments accumulate.
    pub fn extend(&mut self, other: Overrides) {
        self.adjustments.extend(other.adjustments);
        self.results.extend(other.results);
        self.positions.extend(other.positions);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointsAdjustment {
    pub competition: String,
    #[serde(default)]
    pub group: Option<String>,
    pub team: String,
    pub points: i32,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardedOutcome {
    HomeWin,
    AwayWin,
    Draw,
    /// The fixture is struck out and ignored by the table.
    Void,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultOverride {
    pub competition: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub round: Option<String>,
    pub home: String,
    pub away: String,
    pub outcome: AwardedOutcome,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionOverride {
    pub competition: String,
    #[serde(default)]
    pub group: Option<String>,
    pub team: String,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Decides a two-way tie on points by the results between those two teams.
    HeadToHead,
    ScoreDifference,
    ScoreFor,
    Name,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandingsConfig {
    pub tie_breaks: Vec<TieBreak>,
}

impl Default for StandingsConfig {
    fn default() -> Self {
        Self {
            tie_breaks: vec![
                TieBreak::HeadToHead,
                TieBreak::ScoreDifference,
                TieBreak::ScoreFor,
                TieBreak::Name,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StandingRow {
    pub position: usize,
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub drawn: u32,
    pub lost: u32,
    pub score_for: u32,
    pub score_against: u32,
    pub diff: i32,
    pub points: i32,
    pub adjustment: i32,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StandingsTable {
    pub competition: String,
    pub group: Option<String>,
    pub rows: Vec<StandingRow>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    HomeWin,
    AwayWin,
    Draw,
}

#[derive(Debug, Clone)]
struct Meeting {
    home: String,
    away: String,
    outcome: Outcome,
}

/// Builds the league table for one competition (and group, for grouped
/// competitions). Knockout games never count.
pub fn compute_standings(
    matches: &[MatchRecord],
    competition: &str,
    group: Option<&str>,
    overrides: &Overrides,
    config: &StandingsConfig,
) -> StandingsTable {
    let single_table = layout_of(competition) == GroupLayout::Single;
    let group_key = group.unwrap_or("");
    let scoped: Vec<&MatchRecord> = matches
        .iter()
        .filter(|m| m.competition == competition && !m.is_knockout())
        .filter(|m| single_table || m.group == group_key)
        .filter(|m| m.status != Status::Bye)
        .collect();

    let mut rows: HashMap<String, StandingRow> = HashMap::new();
    for m in &scoped {
        for side in [Side::Home, Side::Away] {
            let name = clean_team_name(m.team(side));
            if !looks_like_club(&name) {
                continue;
            }
            rows.entry(name.clone()).or_insert_with(|| StandingRow {
                team: name,
                ..StandingRow::default()
            });
        }
    }

    let mut warnings = Vec::new();
    let mut meetings: Vec<Meeting> = Vec::new();

    for m in &scoped {
        let home = clean_team_name(&m.home);
        let away = clean_team_name(&m.away);
        if !rows.contains_key(&home) || !rows.contains_key(&away) {
            continue;
        }

        if let Some(over) = find_result_override(overrides, m, competition, &home, &away) {
            let outcome = match over.outcome {
                AwardedOutcome::Void => continue,
                AwardedOutcome::HomeWin => Outcome::HomeWin,
                AwardedOutcome::AwayWin => Outcome::AwayWin,
                AwardedOutcome::Draw => Outcome::Draw,
            };
            apply_outcome(&mut rows, &home, &away, outcome);
            if !over.reason.is_empty() {
                for team in [&home, &away] {
                    append_note(&mut rows, team, &over.reason);
                }
            }
            meetings.push(Meeting {
                home,
                away,
                outcome,
            });
            continue;
        }

        if !m.is_result() {
            continue;
        }

        if m.is_walkover() {
            let outcome = match m.walkover_winner {
                Some(Side::Home) => Some(Outcome::HomeWin),
                Some(Side::Away) => Some(Outcome::AwayWin),
                None => None,
            };
            match outcome {
                Some(outcome) => {
                    apply_outcome(&mut rows, &home, &away, outcome);
                    meetings.push(Meeting {
                        home,
                        away,
                        outcome,
                    });
                }
                None => {
                    // Counted as played, but nobody is credited.
                    for team in [&home, &away] {
                        if let Some(row) = rows.get_mut(team.as_str()) {
                            row.played += 1;
                        }
                    }
                    let msg = format!("Walkover without clear winner: {home} v {away}");
                    warn!(competition, group = group_key, "{msg}");
                    warnings.push(msg);
                }
            }
            continue;
        }

        let (Some(hs), Some(aws)) = (m.home_score, m.away_score) else {
            continue;
        };
        let (hs, aws) = (hs.total(), aws.total());
        if let Some(row) = rows.get_mut(home.as_str()) {
            row.score_for += hs;
            row.score_against += aws;
        }
        if let Some(row) = rows.get_mut(away.as_str()) {
            row.score_for += aws;
            row.score_against += hs;
        }
        let outcome = match hs.cmp(&aws) {
            Ordering::Greater => Outcome::HomeWin,
            Ordering::Less => Outcome::AwayWin,
            Ordering::Equal => Outcome::Draw,
        };
        apply_outcome(&mut rows, &home, &away, outcome);
        meetings.push(Meeting {
            home,
            away,
            outcome,
        });
    }

    for adj in overrides
        .adjustments
        .iter()
        .filter(|a| scope_matches(&a.competition, a.group.as_deref(), competition, group, single_table))
    {
        let team = clean_team_name(&adj.team);
        let Some(row) = rows.get_mut(team.as_str()) else {
            // Group-less adjustments are tried against every group of the competition.
            if adj.group.is_some() || single_table {
                warnings.push(format!("Adjustment for unknown team: {team}"));
            }
            continue;
        };
        row.points += adj.points;
        row.adjustment += adj.points;
        if !adj.reason.is_empty() {
            append_note(&mut rows, &team, &adj.reason);
        }
    }

    let mut table: Vec<StandingRow> = rows
        .into_values()
        .map(|mut row| {
            row.diff = row.score_for as i32 - row.score_against as i32;
            row
        })
        .collect();

    let mut cluster_sizes: HashMap<i32, usize> = HashMap::new();
    for row in &table {
        *cluster_sizes.entry(row.points).or_default() += 1;
    }

    table.sort_by(|a, b| {
        b.points.cmp(&a.points).then_with(|| {
            for rule in &config.tie_breaks {
                let ord = match rule {
                    TieBreak::HeadToHead => {
                        if cluster_sizes.get(&a.points).copied() == Some(2) {
                            let a_pts = head_to_head_points(&meetings, &a.team, &b.team);
                            let b_pts = head_to_head_points(&meetings, &b.team, &a.team);
                            b_pts.cmp(&a_pts)
                        } else {
                            Ordering::Equal
                        }
                    }
                    TieBreak::ScoreDifference => b.diff.cmp(&a.diff),
                    TieBreak::ScoreFor => b.score_for.cmp(&a.score_for),
                    TieBreak::Name => compare_names(&a.team, &b.team),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        })
    });

    apply_position_overrides(&mut table, overrides, competition, group, single_table);

    for (idx, row) in table.iter_mut().enumerate() {
        row.position = idx + 1;
    }

    debug!(
        competition,
        group = group_key,
        teams = table.len(),
        meetings = meetings.len(),
        "standings computed"
    );

    StandingsTable {
        competition: competition.to_string(),
        group: if single_table {
            None
        } else {
            group.map(|g| g.to_string())
        },
        rows: table,
        warnings,
    }
}

fn apply_outcome(rows: &mut HashMap<String, StandingRow>, home: &str, away: &str, outcome: Outcome) {
    let (winner, loser) = match outcome {
        Outcome::HomeWin => (home, away),
        Outcome::AwayWin => (away, home),
        Outcome::Draw => {
            for team in [home, away] {
                if let Some(row) = rows.get_mut(team) {
                    row.played += 1;
                    row.drawn += 1;
                    row.points += POINTS_DRAW;
                }
            }
            return;
        }
    };
    if let Some(row) = rows.get_mut(winner) {
        row.played += 1;
        row.won += 1;
        row.points += POINTS_WIN;
    }
    if let Some(row) = rows.get_mut(loser) {
        row.played += 1;
        row.lost += 1;
    }
}

fn head_to_head_points(meetings: &[Meeting], team: &str, opponent: &str) -> i32 {
    meetings
        .iter()
        .filter_map(|m| {
            let side = if m.home == team && m.away == opponent {
                Side::Home
            } else if m.away == team && m.home == opponent {
                Side::Away
            } else {
                return None;
            };
            let pts = match (m.outcome, side) {
                (Outcome::Draw, _) => POINTS_DRAW,
                (Outcome::HomeWin, Side::Home) | (Outcome::AwayWin, Side::Away) => POINTS_WIN,
                _ => 0,
            };
            Some(pts)
        })
        .sum()
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn append_note(rows: &mut HashMap<String, StandingRow>, team: &str, reason: &str) {
    let Some(row) = rows.get_mut(team) else {
        return;
    };
    row.note = Some(match row.note.take() {
        Some(existing) if existing.contains(reason) => existing,
        Some(existing) => format!("{existing}; {reason}"),
        None => reason.to_string(),
    });
}

fn scope_matches(
    over_competition: &str,
    over_group: Option<&str>,
    competition: &str,
    group: Option<&str>,
    single_table: bool,
) -> bool {
    if resolve_competition(over_competition) != competition {
        return false;
    }
    if single_table {
        return true;
    }
    match over_group {
        None => true,
        Some(g) => Some(g.trim()) == group,
    }
}

fn find_result_override<'a>(
    overrides: &'a Overrides,
    m: &MatchRecord,
    competition: &str,
    home: &str,
    away: &str,
) -> Option<&'a ResultOverride> {
    overrides.results.iter().rev().find(|o| {
        resolve_competition(&o.competition) == competition
            && o.group.as_deref().is_none_or(|g| g.trim() == m.group)
            && o.round.as_deref().is_none_or(|r| r.trim() == m.round)
            && clean_team_name(&o.home) == home
            && clean_team_name(&o.away) == away
    })
}

fn apply_position_overrides(
    table: &mut Vec<StandingRow>,
    overrides: &Overrides,
    competition: &str,
    group: Option<&str>,
    single_table: bool,
) {
    let mut pins: Vec<&PositionOverride> = overrides
        .positions
        .iter()
        .filter(|p| scope_matches(&p.competition, p.group.as_deref(), competition, group, single_table))
        .collect();
    if pins.is_empty() {
        return;
    }
    pins.sort_by_key(|p| p.position);

    // Lift every pinned row out first so placing one pin never shifts another.
    let mut placed: Vec<(usize, StandingRow)> = Vec::new();
    for pin in pins {
        let team = clean_team_name(&pin.team);
        let Some(from) = table.iter().position(|r| r.team == team) else {
            continue;
        };
        let mut row = table.remove(from);
        row.note = Some(match row.note.take() {
            Some(existing) => format!("{existing}; position set by override"),
            None => "position set by override".to_string(),
        });
        placed.push((pin.position.saturating_sub(1), row));
    }
    for (to, row) in placed {
        let to = to.min(table.len());
        table.insert(to, row);
    }
}
