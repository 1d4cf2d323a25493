use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use crate::competition::{competition_code, resolve_competition};
use crate::model::{KNOCKOUT_GROUP, MatchRecord, Side, Stage, Status, parse_round_num};
use crate::names::{clean_team_name, has_walkover_tag};
use crate::score::Score;
use crate::standings::Overrides;

#[derive(Debug, Clone, Default)]
pub struct FeedDocument {
    pub matches: Vec<MatchRecord>,
    pub overrides: Overrides,
}

/// Parses the main fixtures document: either `{ "matches": [...] }` or a bare
/// array. An empty body or `null` is an empty dataset.
pub fn parse_feed_json(raw: &str) -> Result<FeedDocument> {
    let Some(root) = parse_root(raw, "invalid fixtures json")? else {
        return Ok(FeedDocument::default());
    };
    let matches = records(&root)
        .iter()
        .filter_map(normalize_record)
        .collect::<Vec<_>>();
    let overrides = match root.get("overrides") {
        Some(value) if !value.is_null() => serde_json::from_value::<Overrides>(value.clone())
            .context("invalid overrides block")?,
        _ => Overrides::default(),
    };
    debug!(count = matches.len(), "parsed fixtures feed");
    Ok(FeedDocument { matches, overrides })
}

/// Parses the hand-maintained knockout overlay. Every record is forced into the
/// knockout stage and defaults to a provisional status.
pub fn parse_knockout_json(raw: &str) -> Result<Vec<MatchRecord>> {
    let Some(root) = parse_root(raw, "invalid knockout json")? else {
        return Ok(Vec::new());
    };
    let matches = records(&root)
        .iter()
        .filter_map(|item| {
            let mut record = normalize_record(item)?;
            record.group = KNOCKOUT_GROUP.to_string();
            record.stage = Stage::Knockout;
            if pick_string(item, &["status"]).is_none() {
                record.status = Status::Provisional;
            }
            Some(record)
        })
        .collect::<Vec<_>>();
    debug!(count = matches.len(), "parsed knockout overlay");
    Ok(matches)
}

/// Overlays `extra` onto `base` by merge key. Overlay records replace the base
/// record in place; new keys are appended in overlay order.
pub fn merge_overlay(base: Vec<MatchRecord>, extra: Vec<MatchRecord>) -> Vec<MatchRecord> {
    let mut out = base;
    let mut index: HashMap<String, usize> = out
        .iter()
        .enumerate()
        .map(|(idx, m)| (m.merge_key(), idx))
        .collect();
    for record in extra {
        let key = record.merge_key();
        match index.get(&key) {
            Some(&idx) => out[idx] = record,
            None => {
                index.insert(key, out.len());
                out.push(record);
            }
        }
    }
    out
}

fn parse_root(raw: &str, what: &'static str) -> Result<Option<Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(None);
    }
    let root: Value = serde_json::from_str(trimmed).context(what)?;
    Ok(Some(root))
}

fn records(root: &Value) -> &[Value] {
    if let Some(arr) = root.as_array() {
        return arr;
    }
    root.get("matches")
        .and_then(|m| m.as_array())
        .map(|arr| arr.as_slice())
        .unwrap_or(&[])
}

pub fn normalize_record(item: &Value) -> Option<MatchRecord> {
    if !item.is_object() {
        return None;
    }

    let competition = resolve_competition(&pick_string(item, &["competition"]).unwrap_or_default());
    let code = competition_code(&competition);
    let raw_group = pick_string(item, &["group"]).unwrap_or_default();
    let group = normalize_group(&raw_group, &competition);
    let stage = match pick_string(item, &["stage"]) {
        Some(s) if s.eq_ignore_ascii_case("knockout") => Stage::Knockout,
        _ => Stage::League,
    };
    let round = pick_string(item, &["round"]).unwrap_or_default();
    let date = normalize_date(&pick_string(item, &["date", "match_date"]).unwrap_or_default());
    let time = pick_string(item, &["time", "time_local", "throw_in"]).unwrap_or_default();
    let mut home = pick_string(item, &["home", "home_team", "homeTeam"]).unwrap_or_default();
    let mut away = pick_string(item, &["away", "away_team", "awayTeam"]).unwrap_or_default();
    let venue = pick_string(item, &["venue", "ground"]).unwrap_or_default();
    let referee = pick_string(item, &["referee"]).unwrap_or_default();
    let status = Status::parse(&pick_string(item, &["status"]).unwrap_or_default());

    let home_score = Score::from_parts(item.get("home_goals"), item.get("home_points"))
        .or_else(|| pick_string(item, &["home_score"]).and_then(|s| Score::parse(&s)));
    let away_score = Score::from_parts(item.get("away_goals"), item.get("away_points"))
        .or_else(|| pick_string(item, &["away_score"]).and_then(|s| Score::parse(&s)));

    let mut walkover_winner = None;
    if status == Status::Walkover {
        walkover_winner = explicit_walkover_winner(item, &home, &away).or_else(|| {
            if has_walkover_tag(&home) {
                Some(Side::Home)
            } else if has_walkover_tag(&away) {
                Some(Side::Away)
            } else {
                None
            }
        });
        home = clean_team_name(&home);
        away = clean_team_name(&away);
    }

    let id = pick_string(item, &["id", "match_id"]);

    Some(MatchRecord {
        id,
        round_num: parse_round_num(&round),
        competition,
        code,
        group,
        stage,
        round,
        date,
        time,
        home,
        away,
        venue,
        referee,
        status,
        home_score,
        away_score,
        walkover_winner,
    })
}

fn explicit_walkover_winner(item: &Value, home: &str, away: &str) -> Option<Side> {
    let raw = pick_string(item, &["walkover_winner", "awarded_to"])?;
    if raw.eq_ignore_ascii_case("home") {
        return Some(Side::Home);
    }
    if raw.eq_ignore_ascii_case("away") {
        return Some(Side::Away);
    }
    let cleaned = clean_team_name(&raw);
    if cleaned == clean_team_name(home) {
        Some(Side::Home)
    } else if cleaned == clean_team_name(away) {
        Some(Side::Away)
    } else {
        None
    }
}

/// Keeps a trailing "Group X" label when present, otherwise strips the
/// competition name out of the group text.
pub fn normalize_group(raw: &str, competition: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if let Some(group) = trailing_group_label(trimmed) {
        return group;
    }
    let stripped = if competition.is_empty() {
        trimmed.to_string()
    } else {
        trimmed.replacen(competition.trim(), "", 1).trim().to_string()
    };
    if stripped.is_empty() {
        trimmed.to_string()
    } else {
        stripped
    }
}

fn trailing_group_label(text: &str) -> Option<String> {
    let lower = text.to_ascii_lowercase();
    let start = lower.rfind("group")?;
    if text[..start].chars().last().is_some_and(|c| c.is_alphanumeric()) {
        return None;
    }
    let after = &text[start + "group".len()..];
    let id = after.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    // "Groups" is a word, not group S.
    if !after.starts_with(char::is_whitespace) && id.starts_with(|c: char| c.is_ascii_lowercase()) {
        return None;
    }
    if id.len() == 1 {
        return Some(format!("Group {}", id.to_ascii_uppercase()));
    }
    Some(format!("Group {id}"))
}

/// Dates are carried as ISO `YYYY-MM-DD`; a few scraped sources use
/// day-first formats, which are converted when unambiguous.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok() {
        return trimmed.to_string();
    }
    const FORMATS: [&str; 3] = ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y"];
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return date.format("%Y-%m-%d").to_string();
        }
    }
    // ISO timestamps keep only their date part.
    if trimmed.len() > 10
        && let Some(prefix) = trimmed.get(..10)
        && NaiveDate::parse_from_str(prefix, "%Y-%m-%d").is_ok()
    {
        return prefix.to_string();
    }
    trimmed.to_string()
}

fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(*key) {
            if let Some(s) = as_string(v) {
                return Some(s);
            }
        }
    }
    None
}

fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Object(map) => match map.get("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => Some(name.trim().to_string()),
            _ => None,
        },
        _ => None,
    }
}
