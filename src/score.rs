use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A hurling score line: a goal is worth three points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub goals: u32,
    pub points: u32,
}

impl Score {
    pub fn new(goals: u32, points: u32) -> Self {
        Self { goals, points }
    }

    pub fn total(&self) -> u32 {
        self.goals * 3 + self.points
    }

    /// Combines the separate goals/points fields of a feed record. Both must be
    /// present; numeric strings are accepted and blank strings count as absent.
    pub fn from_parts(goals: Option<&Value>, points: Option<&Value>) -> Option<Self> {
        let goals = int_like(goals?)?;
        let points = int_like(points?)?;
        Some(Self { goals, points })
    }

    /// Parses "2-14", also tolerating en/em dashes and surrounding spaces.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().replace(['–', '—'], "-");
        let (goals, points) = normalized.split_once('-')?;
        let goals = goals.trim().parse::<u32>().ok()?;
        let points = points.trim().parse::<u32>().ok()?;
        Some(Self { goals, points })
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.goals, self.points)
    }
}

pub fn int_like(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .map(|n| n as u32),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            // Non-numeric text is coerced to zero rather than dropped.
            Some(trimmed.parse::<u32>().unwrap_or(0))
        }
        _ => None,
    }
}
