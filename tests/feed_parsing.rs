use std::fs;
use std::path::PathBuf;

use hurling_hub::feed::{merge_overlay, parse_feed_json, parse_knockout_json};
use hurling_hub::loader::BOOTSTRAP_JSON;
use hurling_hub::model::{KNOCKOUT_GROUP, Side, Stage, Status};
use hurling_hub::score::Score;

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn normalizes_field_variants() {
    let doc = parse_feed_json(&read_fixture("feed_variants.json")).expect("fixture should parse");
    assert_eq!(doc.matches.len(), 6);

    let m1 = &doc.matches[0];
    assert_eq!(m1.id.as_deref(), Some("m1"));
    assert_eq!(m1.competition, "Premier Intermediate Hurling Championship");
    assert_eq!(m1.code, "PIHC");
    assert_eq!(m1.date, "2025-07-12");
    assert_eq!(m1.time, "19:30");
    assert_eq!(m1.home, "Cappamore");
    assert_eq!(m1.away, "Murroe-Boher");
    assert_eq!(m1.venue, "Caherline");
    assert_eq!(m1.round_num, 2);
    assert_eq!(m1.home_score, Some(Score::new(1, 17)));
    assert_eq!(m1.away_score, Some(Score::new(2, 11)));

    let m2 = &doc.matches[1];
    assert_eq!(m2.group, "Group 2");
    assert_eq!(m2.date, "2025-07-05");
    assert_eq!(m2.time, "18:00");
    assert_eq!(m2.referee, "J. Murphy");
    assert_eq!(m2.home_score, Some(Score::new(1, 14)));
    assert_eq!(m2.away_score.map(|s| s.total()), Some(25));
}

#[test]
fn walkover_winner_from_tag_or_field() {
    let doc = parse_feed_json(&read_fixture("feed_variants.json")).expect("fixture should parse");

    let tagged = &doc.matches[2];
    assert_eq!(tagged.status, Status::Walkover);
    assert_eq!(tagged.walkover_winner, Some(Side::Away));
    assert_eq!(tagged.away, "Na Piarsaigh");
    assert!(tagged.is_result());

    let awarded = &doc.matches[3];
    assert_eq!(awarded.walkover_winner, Some(Side::Home));
}

#[test]
fn fixtures_without_scores_stay_open() {
    let doc = parse_feed_json(&read_fixture("feed_variants.json")).expect("fixture should parse");
    let m5 = &doc.matches[4];
    assert_eq!(m5.group, "City");
    assert_eq!(m5.date, "");
    assert!(!m5.is_result());

    let m6 = &doc.matches[5];
    assert_eq!(m6.home_score, None);
    assert_eq!(m6.status, Status::Scheduled);
}

#[test]
fn reads_inline_overrides() {
    let doc = parse_feed_json(&read_fixture("feed_variants.json")).expect("fixture should parse");
    assert_eq!(doc.overrides.adjustments.len(), 1);
    assert_eq!(doc.overrides.adjustments[0].team, "Ahane");
    assert_eq!(doc.overrides.adjustments[0].points, -2);
}

#[test]
fn empty_and_null_bodies_are_empty_datasets() {
    assert!(parse_feed_json("").expect("empty ok").matches.is_empty());
    assert!(parse_feed_json("null").expect("null ok").matches.is_empty());
    assert!(parse_feed_json("[]").expect("array ok").matches.is_empty());
    assert!(parse_feed_json("{not json").is_err());
}

#[test]
fn knockout_overlay_replaces_by_id_and_appends() {
    let base = parse_feed_json(&read_fixture("feed_variants.json"))
        .expect("fixture should parse")
        .matches;
    let ko = parse_knockout_json(&read_fixture("knockout.json")).expect("knockout should parse");
    assert_eq!(ko.len(), 2);
    assert!(ko.iter().all(|m| m.group == KNOCKOUT_GROUP && m.stage == Stage::Knockout));
    assert_eq!(ko[0].status, Status::Provisional);
    assert_eq!(ko[1].status, Status::Scheduled);

    let merged = merge_overlay(base, ko);
    assert_eq!(merged.len(), 7);
    // m6 keeps its slot but now carries the knockout details.
    assert_eq!(merged[5].id.as_deref(), Some("m6"));
    assert_eq!(merged[5].round, "Semi-Final");
    assert!(merged[5].is_knockout());
    assert_eq!(merged[6].id.as_deref(), Some("ko-final"));
}

#[test]
fn bootstrap_snapshot_parses() {
    let doc = parse_feed_json(BOOTSTRAP_JSON).expect("snapshot should parse");
    assert!(doc.matches.len() > 10);
    assert!(doc.matches.iter().any(|m| m.is_walkover()));
    assert!(doc.matches.iter().any(|m| m.status == Status::Bye));
}
