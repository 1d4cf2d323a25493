use serde::{Deserialize, Serialize};

use crate::score::Score;

pub const KNOCKOUT_GROUP: &str = "Knockout";
pub const NO_ROUND: u32 = 999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stage {
    #[default]
    League,
    Knockout,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Scheduled,
    Result,
    Walkover,
    Bye,
    Provisional,
    Postponed,
    Other(String),
}

impl Status {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.is_empty() || lower == "scheduled" || lower == "fixture" {
            return Status::Scheduled;
        }
        if lower.contains("walkover") {
            return Status::Walkover;
        }
        if lower.starts_with("res") || lower.starts_with("final") {
            return Status::Result;
        }
        match lower.as_str() {
            "bye" => Status::Bye,
            "provisional" => Status::Provisional,
            "postponed" | "ppd" => Status::Postponed,
            _ => Status::Other(trimmed.to_string()),
        }
    }

    /// Results and walkovers both count as played; everything else is a fixture.
    pub fn is_result(&self) -> bool {
        match self {
            Status::Result | Status::Walkover => true,
            Status::Other(raw) => {
                let lower = raw.to_ascii_lowercase();
                lower.starts_with("res") || lower.starts_with("final")
            }
            _ => false,
        }
    }

    pub fn is_fixture(&self) -> bool {
        !self.is_result()
    }

    pub fn label(&self) -> &str {
        match self {
            Status::Scheduled => "Scheduled",
            Status::Result => "Result",
            Status::Walkover => "Walkover",
            Status::Bye => "Bye",
            Status::Provisional => "Provisional",
            Status::Postponed => "Postponed",
            Status::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Option<String>,
    pub competition: String,
    pub code: String,
    pub group: String,
    pub stage: Stage,
    pub round: String,
    pub round_num: u32,
    pub date: String,
    pub time: String,
    pub home: String,
    pub away: String,
    pub venue: String,
    pub referee: String,
    pub status: Status,
    pub home_score: Option<Score>,
    pub away_score: Option<Score>,
    pub walkover_winner: Option<Side>,
}

impl MatchRecord {
    pub fn is_knockout(&self) -> bool {
        self.stage == Stage::Knockout || self.group.eq_ignore_ascii_case(KNOCKOUT_GROUP)
    }

    pub fn is_result(&self) -> bool {
        self.status.is_result()
    }

    pub fn is_walkover(&self) -> bool {
        self.status == Status::Walkover
    }

    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Stable identity used when overlaying one feed onto another.
    pub fn merge_key(&self) -> String {
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            return id.to_string();
        }
        [
            self.competition.as_str(),
            self.round.as_str(),
            self.date.as_str(),
            self.time.as_str(),
            self.venue.as_str(),
            self.home.as_str(),
            self.away.as_str(),
        ]
        .join("|")
    }
}

pub fn parse_round_num(round: &str) -> u32 {
    let digits: String = round
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().unwrap_or(NO_ROUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_partitions_results_and_fixtures() {
        assert!(Status::parse("Result").is_result());
        assert!(Status::parse("FINAL").is_result());
        assert!(Status::parse("Walkover").is_result());
        assert!(Status::parse("SCHEDULED").is_fixture());
        assert!(Status::parse("Bye").is_fixture());
        assert!(Status::parse("").is_fixture());
        assert_eq!(Status::parse("Postponed"), Status::Postponed);
    }

    #[test]
    fn round_numbers_default_high() {
        assert_eq!(parse_round_num("Round 3"), 3);
        assert_eq!(parse_round_num("R12"), 12);
        assert_eq!(parse_round_num("Quarter Final"), NO_ROUND);
    }
}
