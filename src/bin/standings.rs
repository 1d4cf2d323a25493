use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use hurling_hub::competition::{GroupLayout, default_competition, find, find_by_code, layout_of};
use hurling_hub::config::{Config, load_env_files};
use hurling_hub::loader::{load_document, load_overrides_file};
use hurling_hub::logging::init_stderr_logging;
use hurling_hub::model::KNOCKOUT_GROUP;
use hurling_hub::standings::{StandingsConfig, compute_standings};
use hurling_hub::view::{default_group, groups_for, resolve_table_group};

fn main() -> Result<()> {
    load_env_files();
    init_stderr_logging();
    let config = Config::from_env();

    let location = arg_value("--data").unwrap_or_else(|| config.data_url.clone());
    let doc = load_document(&location, config.fetch_retries)
        .with_context(|| format!("unable to load dataset from {location}"))?;

    let competition = match arg_value("--comp") {
        Some(raw) => find(&raw)
            .or_else(|| find_by_code(&raw))
            .map(|c| c.name.to_string())
            .ok_or_else(|| anyhow!("unknown competition '{raw}'"))?,
        None => default_competition().name.to_string(),
    };
    let group = match arg_value("--group") {
        // One table per competition; the group argument has nothing to select.
        Some(_) if layout_of(&competition) == GroupLayout::Single => None,
        Some(raw) => Some(
            resolve_table_group(&competition, &raw, &doc.matches).ok_or_else(|| {
                let known = groups_for(&competition, &doc.matches)
                    .into_iter()
                    .filter(|g| g != KNOCKOUT_GROUP)
                    .collect::<Vec<_>>();
                anyhow!("unknown group '{raw}' for {competition} (known: {})", known.join(", "))
            })?,
        ),
        None => default_group(&competition, &doc.matches),
    };

    let mut overrides = doc.overrides;
    if let Some(path) = arg_value("--overrides")
        .map(PathBuf::from)
        .or_else(|| config.overrides_path.clone())
    {
        overrides.extend(load_overrides_file(&path)?);
    }

    let table = compute_standings(
        &doc.matches,
        &competition,
        group.as_deref(),
        &overrides,
        &StandingsConfig::default(),
    );

    if has_flag("--json") {
        println!("{}", serde_json::to_string_pretty(&table.rows)?);
        return Ok(());
    }

    match table.group.as_deref() {
        Some(group) => println!("{competition} - {group}"),
        None => println!("{competition}"),
    }
    println!(
        "{:>3}  {:<28} {:>3} {:>3} {:>3} {:>3} {:>5} {:>5} {:>5} {:>4}",
        "#", "Team", "P", "W", "D", "L", "For", "Agst", "Diff", "Pts"
    );
    for row in &table.rows {
        println!(
            "{:>3}  {:<28} {:>3} {:>3} {:>3} {:>3} {:>5} {:>5} {:>+5} {:>4}{}",
            row.position,
            row.team,
            row.played,
            row.won,
            row.drawn,
            row.lost,
            row.score_for,
            row.score_against,
            row.diff,
            row.points,
            row.note
                .as_deref()
                .map(|note| format!("  ({note})"))
                .unwrap_or_default()
        );
    }
    for warning in &table.warnings {
        eprintln!("warning: {warning}");
    }

    Ok(())
}

fn arg_value(name: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn has_flag(name: &str) -> bool {
    std::env::args().skip(1).any(|arg| arg == name)
}
