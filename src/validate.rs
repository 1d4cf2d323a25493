//! Sanity checks run on a scraped dataset before it is published.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::model::MatchRecord;

pub const ALLOWED_STATUS: [&str; 4] = ["SCHEDULED", "Result", "Walkover", "Bye"];
const REQUIRED_KEYS: [&str; 9] = [
    "competition",
    "group",
    "round",
    "date",
    "time",
    "home",
    "away",
    "venue",
    "status",
];
const SCORE_KEYS: [&str; 4] = ["home_goals", "home_points", "away_goals", "away_points"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub location: String,
    pub message: String,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

/// Validates a dataset document. Combined files carry `matches`; the
/// per-competition files carry `fixtures`/`results` with the competition on the
/// root object.
pub fn validate_document(root: &Value) -> Vec<Problem> {
    let mut problems = Vec::new();
    let Some(obj) = root.as_object() else {
        problems.push(problem("document", "root is not an object"));
        return problems;
    };

    if obj.contains_key("matches") {
        validate_combined(obj, &mut problems);
    } else if obj.contains_key("fixtures") || obj.contains_key("results") {
        validate_per_competition(obj, &mut problems);
    } else {
        problems.push(problem("document", "'matches' missing or not a list"));
    }
    problems
}

/// Parses then validates; a parse failure is reported as a single problem.
pub fn validate_json(raw: &str) -> Vec<Problem> {
    match serde_json::from_str::<Value>(raw) {
        Ok(root) => validate_document(&root),
        Err(err) => vec![problem("document", format!("JSON parse error: {err}"))],
    }
}

fn validate_combined(obj: &Map<String, Value>, problems: &mut Vec<Problem>) {
    let Some(matches) = obj.get("matches").and_then(Value::as_array) else {
        problems.push(problem("document", "'matches' missing or not a list"));
        return;
    };

    let mut seen: HashSet<[String; 5]> = HashSet::new();
    for (i, item) in matches.iter().enumerate() {
        let location = format!("matches[{i}]");
        let Some(record) = item.as_object() else {
            problems.push(problem(&location, "is not an object"));
            continue;
        };
        validate_record(record, &location, problems);

        let key = ["competition", "group", "date", "home", "away"].map(|k| raw_text(record.get(k)));
        if !seen.insert(key.clone()) {
            problems.push(problem(
                &location,
                format!("duplicate key tuple ({})", key.join(", ")),
            ));
        }
    }
}

fn validate_per_competition(obj: &Map<String, Value>, problems: &mut Vec<Problem>) {
    for (list_key, default_status) in [("fixtures", "SCHEDULED"), ("results", "Result")] {
        let Some(list) = obj.get(list_key) else {
            continue;
        };
        let Some(list) = list.as_array() else {
            problems.push(problem("document", format!("'{list_key}' is not a list")));
            continue;
        };
        for (i, item) in list.iter().enumerate() {
            let location = format!("{list_key}[{i}]");
            let Some(record) = item.as_object() else {
                problems.push(problem(&location, "is not an object"));
                continue;
            };
            // Lift the record into the combined layout before checking it.
            let mut lifted = Map::new();
            lifted.insert(
                "competition".to_string(),
                obj.get("competition").cloned().unwrap_or(Value::Null),
            );
            for key in ["group", "round", "date", "home", "away", "venue"] {
                lifted.insert(key.to_string(), record.get(key).cloned().unwrap_or(Value::Null));
            }
            lifted.insert(
                "time".to_string(),
                record.get("time_local").cloned().unwrap_or(Value::Null),
            );
            let status = match record.get("status") {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                _ => default_status.to_string(),
            };
            lifted.insert("status".to_string(), Value::String(status));
            for key in SCORE_KEYS {
                lifted.insert(key.to_string(), record.get(key).cloned().unwrap_or(Value::Null));
            }
            validate_record(&lifted, &location, problems);
        }
    }
}

pub fn validate_record(record: &Map<String, Value>, location: &str, problems: &mut Vec<Problem>) {
    for key in REQUIRED_KEYS {
        if !record.contains_key(key) {
            problems.push(problem(location, format!("missing key '{key}'")));
        }
    }

    let status = raw_text(record.get("status"));
    if !status.is_empty() && !ALLOWED_STATUS.contains(&status.as_str()) {
        problems.push(problem(
            location,
            format!(
                "invalid status '{status}' (allowed: {}, or empty)",
                ALLOWED_STATUS.join(", ")
            ),
        ));
    }

    let group = raw_text(record.get("group"));
    let group = group.trim();
    if !group.is_empty() && !group_label_ok(group) {
        problems.push(problem(
            location,
            format!("unexpected group label '{group}' (expected 'Group 1/2' or 'Premier Intermediate')"),
        ));
    }

    let home = raw_text(record.get("home")).trim().to_string();
    let away = raw_text(record.get("away")).trim().to_string();
    if home.is_empty() || away.is_empty() {
        problems.push(problem(location, "home/away team missing or empty"));
    }

    let is_bye = |name: &str| name.eq_ignore_ascii_case("bye");
    if (is_bye(&home) || is_bye(&away)) && status != "Bye" {
        problems.push(problem(
            location,
            format!("team has 'BYE' but status is '{status}' (must be 'Bye')"),
        ));
    }

    for (side, name) in [("home", &home), ("away", &away)] {
        if name.eq_ignore_ascii_case("w/o") || name.eq_ignore_ascii_case("walkover") {
            problems.push(problem(
                location,
                format!("team '{side}' is 'W/O' (should be a status, not a team)"),
            ));
        }
        if looks_like_label_or_code(name) {
            problems.push(problem(
                location,
                format!("team '{side}' looks like a stage/label/code ('{name}')"),
            ));
        }
    }

    if status == "Walkover"
        && SCORE_KEYS
            .iter()
            .any(|k| record.get(*k).is_some_and(|v| !v.is_null()))
    {
        problems.push(problem(location, "Walkover must not carry numeric scores"));
    }

    if status == "Result" || status == "Walkover" {
        for key in SCORE_KEYS {
            if let Some(value) = record.get(key)
                && !is_int_like(value)
            {
                problems.push(problem(
                    location,
                    format!("score field '{key}' is not int-like (got {value})"),
                ));
            }
        }
    }

    match record.get("date") {
        None | Some(Value::Null) => {}
        Some(Value::String(date)) if date.is_empty() || is_iso_date(date) => {}
        Some(other) => problems.push(problem(
            location,
            format!("date '{}' is not YYYY-MM-DD", raw_text(Some(other))),
        )),
    }
}

/// `Group 1`, `Group 2` or `Premier Intermediate`, any case.
pub fn group_label_ok(group: &str) -> bool {
    let lower = group.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("group") {
        return matches!(rest.trim_start(), "1" | "2");
    }
    if let Some(rest) = lower.strip_prefix("premier") {
        return rest.starts_with(char::is_whitespace) && rest.trim_start() == "intermediate";
    }
    false
}

/// Stage names ("Semi-Final", "Round 3", "... Cup") or scraper codes
/// ("SJBHCG1") that ended up in a team column.
pub fn looks_like_label_or_code(name: &str) -> bool {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return false;
    }
    let lower = trimmed.to_lowercase();
    let sep_optional = |text: &str, head: &str, tail: &str| -> bool {
        let Some(rest) = text.strip_prefix(head) else {
            return false;
        };
        let rest = rest.strip_prefix(['-', ' ']).unwrap_or(rest);
        rest == tail || rest.strip_prefix(tail) == Some("s")
    };
    let stage_like = lower == "final"
        || lower == "relegation"
        || lower == "league"
        || sep_optional(&lower, "semi", "final")
        || sep_optional(&lower, "quarter", "final")
        || lower
            .strip_prefix("play")
            .map(|rest| rest.strip_prefix(['-', ' ']).unwrap_or(rest) == "off")
            .unwrap_or(false)
        || lower
            .strip_prefix("round")
            .map(|rest| {
                let rest = rest.trim_start();
                !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
            })
            .unwrap_or(false)
        || ends_with_word(&lower, "cup");
    if stage_like {
        return true;
    }

    trimmed.chars().count() <= 8
        && !trimmed.contains(' ')
        && trimmed.to_uppercase() == trimmed
        && trimmed.chars().any(|c| c.is_ascii_digit())
}

fn ends_with_word(text: &str, word: &str) -> bool {
    let Some(head) = text.strip_suffix(word) else {
        return false;
    };
    head.chars().last().is_none_or(|c| !c.is_alphanumeric() && c != '_')
}

fn is_int_like(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Number(n) => n.is_i64() || n.is_u64(),
        Value::String(s) => !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    }
}

fn is_iso_date(raw: &str) -> bool {
    raw.len() == 10 && NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_ok()
}

fn raw_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn problem(location: &str, message: impl Into<String>) -> Problem {
    Problem {
        location: location.to_string(),
        message: message.into(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverageRow {
    pub competition: String,
    pub total: usize,
    pub results: usize,
    pub fixtures: usize,
    pub groups: Vec<String>,
}

/// Per-competition counts, printed next to the problem list so a thin scrape
/// is visible even when every record is well formed.
pub fn coverage(matches: &[MatchRecord]) -> Vec<CoverageRow> {
    let mut by_comp: BTreeMap<&str, Vec<&MatchRecord>> = BTreeMap::new();
    for m in matches {
        by_comp.entry(m.competition.as_str()).or_default().push(m);
    }
    by_comp
        .into_iter()
        .map(|(competition, rows)| CoverageRow {
            competition: competition.to_string(),
            total: rows.len(),
            results: rows.iter().filter(|m| m.is_result()).count(),
            fixtures: rows.iter().filter(|m| !m.is_result()).count(),
            groups: rows
                .iter()
                .map(|m| {
                    if m.group.is_empty() {
                        "Unassigned".to_string()
                    } else {
                        m.group.clone()
                    }
                })
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        })
        .collect()
}
