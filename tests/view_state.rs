use std::fs;
use std::path::PathBuf;

use hurling_hub::feed::parse_feed_json;
use hurling_hub::loader::BOOTSTRAP_JSON;
use hurling_hub::model::MatchRecord;
use hurling_hub::view::{
    Section, StatusFilter, View, ViewState, club_list, club_matches, competition_matches,
    date_jump_index, date_matches, default_group, groups_for, resolve_table_group, score_middle,
};

const SHC: &str = "Senior Hurling Championship";
const PIHC: &str = "Premier Intermediate Hurling Championship";
const JBHC: &str = "Junior B Hurling Championship";

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn group_matches() -> Vec<MatchRecord> {
    parse_feed_json(&read_fixture("group_table.json"))
        .expect("fixture should parse")
        .matches
}

fn bootstrap() -> Vec<MatchRecord> {
    parse_feed_json(BOOTSTRAP_JSON)
        .expect("snapshot should parse")
        .matches
}

#[test]
fn default_state_writes_only_competition_and_group() {
    let view = ViewState::default();
    assert_eq!(view.competition, SHC);
    assert_eq!(view.group.as_deref(), Some("Group 1"));
    assert_eq!(
        view.to_query(),
        "comp=Senior+Hurling+Championship&group=Group+1"
    );
}

#[test]
fn query_round_trips_non_default_view() {
    let matches = group_matches();
    let mut view = ViewState::default();
    view.view = View::Team;
    view.club = Some("Na Piarsaigh".to_string());
    view.status = StatusFilter::Result;
    view.date = Some("2025-07-19".to_string());

    let query = view.to_query();
    assert!(query.contains("v=team"));
    assert!(query.contains("team=Na+Piarsaigh"));
    assert!(query.contains("status=result"));
    assert!(!query.contains("s="));

    assert_eq!(ViewState::from_query(&format!("?{query}"), &matches), view);
}

#[test]
fn from_query_accepts_links_and_codes() {
    let matches = group_matches();
    let view = ViewState::from_query(
        "https://limerickgaahub.ie/?s=about&comp=SHC&group=Group%202&v=table",
        &matches,
    );
    assert_eq!(view.section, Section::About);
    assert_eq!(view.competition, SHC);
    assert_eq!(view.group.as_deref(), Some("Group 2"));
    assert_eq!(view.view, View::Table);

    let view = ViewState::from_query("comp=PIHC&date=2025-13-40&v=bogus", &matches);
    assert_eq!(view.competition, PIHC);
    assert_eq!(view.group, None);
    assert_eq!(view.date, None);
    assert_eq!(view.view, View::Matches);
}

#[test]
fn unknown_competition_and_group_fall_back() {
    let matches = group_matches();
    let view = ViewState::from_query("comp=Camogie&group=Group+9", &matches);
    assert_eq!(view.competition, SHC);
    assert_eq!(view.group.as_deref(), Some("Group 1"));
}

#[test]
fn knockout_has_no_table() {
    let matches = group_matches();
    let view = ViewState::from_query("comp=SHC&group=Knockout&v=table", &matches);
    assert_eq!(view.group.as_deref(), Some("Knockout"));
    assert!(!view.table_available());
    assert_eq!(view.view, View::Matches);
}

#[test]
fn share_url_uses_base() {
    let mut view = ViewState::default();
    view.view = View::Date;
    let url = view.share_url("https://limerickgaahub.ie/");
    assert!(url.starts_with("https://limerickgaahub.ie/?"));
    assert!(url.contains("v=date"));
}

#[test]
fn groups_follow_layout() {
    let matches = group_matches();
    assert_eq!(
        groups_for(SHC, &matches),
        vec!["Group 1", "Group 2", "Knockout"]
    );
    assert!(groups_for(PIHC, &matches).is_empty());

    let snapshot = bootstrap();
    assert_eq!(groups_for(JBHC, &snapshot), vec!["City", "East"]);
    assert_eq!(default_group(JBHC, &snapshot).as_deref(), Some("City"));
    assert_eq!(default_group(PIHC, &snapshot), None);
}

#[test]
fn competition_slice_sorts_by_round_and_filters() {
    let matches = group_matches();
    let mut view = ViewState::default();
    let rows = competition_matches(&view, &matches);
    assert_eq!(rows.len(), 6);
    assert!(rows.windows(2).all(|w| w[0].round_num <= w[1].round_num));

    view.status = StatusFilter::Fixture;
    let rows = competition_matches(&view, &matches);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].home, "Ahane");

    view.status = StatusFilter::All;
    view.group = Some("Knockout".to_string());
    let rows = competition_matches(&view, &matches);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].round, "Quarter-Final");
}

#[test]
fn club_view_lists_results_first() {
    let matches = group_matches();
    assert_eq!(
        club_list(&matches),
        vec!["Adare", "Ahane", "Bruff", "Cappamore", "Doon", "Kilmallock"]
    );

    let rows = club_matches("Doon", &matches);
    let rounds: Vec<&str> = rows.iter().map(|m| m.round.as_str()).collect();
    assert_eq!(rounds, vec!["Round 1", "Round 2", "Round 3", "Quarter-Final"]);
    assert_eq!(score_middle(rows[1]), "W/O");
    assert_eq!(score_middle(rows[0]), "2-10 - 1-13");
    assert_eq!(score_middle(rows[3]), "—");
    assert!(club_matches("", &matches).is_empty());
}

#[test]
fn date_jump_prefers_exact_then_previous_then_last() {
    let matches = group_matches();
    let rows = date_matches(&matches);
    assert_eq!(rows.len(), 8);
    assert!(rows.windows(2).all(|w| w[0].date <= w[1].date));

    assert_eq!(date_jump_index(&rows, "2025-07-19"), Some(4));
    assert_eq!(date_jump_index(&rows, "2025-07-25"), Some(4));
    assert_eq!(date_jump_index(&rows, "2025-09-30"), Some(7));
    assert_eq!(date_jump_index(&rows, "2025-01-01"), Some(7));
    assert_eq!(date_jump_index(&[], "2025-07-19"), None);
}

#[test]
fn knockout_only_competition_opens_on_knockout() {
    let matches = parse_feed_json(
        r#"{"matches": [
            {"competition": "JBHC", "stage": "knockout", "round": "Final", "date": "2025-09-14",
             "home": "Ballybrown", "away": "Bruree", "status": "SCHEDULED"}
        ]}"#,
    )
    .expect("dataset should parse")
    .matches;
    assert_eq!(groups_for(JBHC, &matches), vec!["Knockout"]);
    assert_eq!(default_group(JBHC, &matches).as_deref(), Some("Knockout"));

    let view = ViewState::from_query("comp=JBHC", &matches);
    assert!(view.is_knockout());
    assert_eq!(competition_matches(&view, &matches).len(), 1);
}

#[test]
fn table_group_accepts_loose_input() {
    let matches = group_matches();
    for raw in ["Group 2", "group 2", "2", "GROUP2"] {
        assert_eq!(
            resolve_table_group(SHC, raw, &matches).as_deref(),
            Some("Group 2"),
            "{raw}"
        );
    }
    assert_eq!(resolve_table_group(SHC, "Group 9", &matches), None);
    assert_eq!(resolve_table_group(SHC, "Knockout", &matches), None);

    let snapshot = bootstrap();
    assert_eq!(resolve_table_group(JBHC, "group city", &snapshot).as_deref(), Some("City"));
    assert_eq!(resolve_table_group(JBHC, "east", &snapshot).as_deref(), Some("East"));
}
