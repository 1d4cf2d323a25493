use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};

use hurling_hub::feed::parse_feed_json;
use hurling_hub::logging::init_stderr_logging;
use hurling_hub::validate::{Problem, coverage, validate_json};

const COMBINED_FILE: &str = "hurling_2025.json";
const PER_COMPETITION_FILES: [&str; 6] = [
    "senior.json",
    "premier_intermediate.json",
    "intermediate.json",
    "premier_junior_a.json",
    "junior_a.json",
    "junior_c.json",
];

fn main() -> ExitCode {
    init_stderr_logging();
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ExitCode::from(2)
        }
    }
}

/// Accepts a dataset file, or a directory holding the combined file plus any
/// per-competition files.
fn run() -> Result<bool> {
    let target = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: validate <dataset.json | scrape-dir>")?;

    let mut problems: Vec<Problem> = Vec::new();
    let combined = if target.is_dir() {
        for name in PER_COMPETITION_FILES {
            let path = target.join(name);
            if path.exists() {
                problems.extend(check_file(&path)?);
            }
        }
        target.join(COMBINED_FILE)
    } else {
        target
    };

    if combined.exists() {
        problems.extend(check_file(&combined)?);
        let raw = fs::read_to_string(&combined)?;
        if let Ok(doc) = parse_feed_json(&raw) {
            println!("=== Coverage by competition ===");
            for row in coverage(&doc.matches) {
                println!(
                    "- {}: {} (Results {} / Fixtures {}), groups: {}",
                    if row.competition.is_empty() {
                        "(missing)"
                    } else {
                        &row.competition
                    },
                    row.total,
                    row.results,
                    row.fixtures,
                    row.groups.join(", ")
                );
            }
        }
    } else {
        problems.push(Problem {
            location: combined.display().to_string(),
            message: "missing (expected combined output)".to_string(),
        });
    }

    if problems.is_empty() {
        println!("Validation passed");
        return Ok(true);
    }
    println!("VALIDATION FAILED:");
    for problem in &problems {
        println!(" - {problem}");
    }
    Ok(false)
}

fn check_file(path: &PathBuf) -> Result<Vec<Problem>> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let name = path.display().to_string();
    Ok(validate_json(&raw)
        .into_iter()
        .map(|p| Problem {
            location: format!("[{name}] {}", p.location),
            message: p.message,
        })
        .collect())
}
