use std::fs;
use std::path::PathBuf;

use hurling_hub::feed::parse_feed_json;
use hurling_hub::loader::{BOOTSTRAP_JSON, DataSource, LoadedData};
use hurling_hub::standings::Overrides;
use hurling_hub::state::{AppState, Delta, apply_delta};
use hurling_hub::view::{View, ViewState};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn loaded(raw: &str, source: DataSource) -> Delta {
    let doc = parse_feed_json(raw).expect("dataset should parse");
    Delta::SetData(Box::new(LoadedData {
        base_count: doc.matches.len(),
        knockout_count: 0,
        matches: doc.matches,
        overrides: doc.overrides,
        source,
        fetched_at: None,
        notes: Vec::new(),
    }))
}

#[test]
fn set_data_marks_stale_sources() {
    let mut state = AppState::default();
    assert!(state.loading);

    apply_delta(&mut state, loaded(BOOTSTRAP_JSON, DataSource::Bootstrap));
    assert!(!state.loading);
    assert!(state.is_stale());
    assert!(state.logs.iter().any(|l| l.starts_with("[WARN]")));

    apply_delta(&mut state, loaded(BOOTSTRAP_JSON, DataSource::Live));
    assert!(!state.is_stale());
}

#[test]
fn refresh_drops_vanished_group() {
    let mut view = ViewState::default();
    view.group = Some("Knockout".to_string());
    let mut state = AppState::new(view);
    apply_delta(&mut state, loaded(BOOTSTRAP_JSON, DataSource::Live));
    // The snapshot has no knockout games.
    assert_eq!(state.view.group.as_deref(), Some("Group 1"));
}

#[test]
fn selection_is_clamped_after_reload() {
    let mut state = AppState::default();
    state.selected = 500;
    apply_delta(&mut state, loaded(&read_fixture("group_table.json"), DataSource::Live));
    assert_eq!(state.selected, state.visible_matches().len() - 1);
}

#[test]
fn table_toggle_refuses_knockout() {
    let mut state = AppState::default();
    apply_delta(&mut state, loaded(&read_fixture("group_table.json"), DataSource::Live));

    state.toggle_table();
    assert_eq!(state.view.view, View::Table);
    let table = state.current_table().expect("league table");
    assert_eq!(table.rows[0].team, "Doon");
    state.toggle_table();
    assert_eq!(state.view.view, View::Matches);

    // Group 1 -> Group 2 -> Knockout
    state.cycle_group(1);
    state.cycle_group(1);
    assert!(state.view.is_knockout());
    state.toggle_table();
    assert_eq!(state.view.view, View::Matches);
    assert!(state.current_table().is_none());
    assert!(state.logs.back().is_some_and(|l| l.contains("knockout")));

    state.cycle_group(1);
    assert_eq!(state.view.group.as_deref(), Some("Group 1"));
}

#[test]
fn single_table_competition_cycles_league_and_knockout() {
    let raw = r#"{"matches": [
        {"competition": "PIHC", "round": "Round 1", "home": "Cappamore", "away": "Knockainey", "status": "SCHEDULED"},
        {"competition": "PIHC", "stage": "knockout", "round": "Final", "home": "Cappamore", "away": "Knockainey", "status": "SCHEDULED"}
    ]}"#;
    let mut state = AppState::default();
    apply_delta(&mut state, loaded(raw, DataSource::Live));
    state.cycle_competition(1);
    assert_eq!(state.view.competition, "Premier Intermediate Hurling Championship");
    assert_eq!(state.view.group, None);

    state.cycle_group(1);
    assert!(state.view.is_knockout());
    assert_eq!(state.visible_matches().len(), 1);
    state.cycle_group(1);
    assert_eq!(state.view.group, None);
    assert_eq!(state.visible_matches().len(), 1);
}

#[test]
fn club_and_date_views() {
    let mut state = AppState::default();
    apply_delta(&mut state, loaded(&read_fixture("group_table.json"), DataSource::Live));

    state.cycle_club(1);
    assert_eq!(state.view.view, View::Team);
    assert_eq!(state.view.club.as_deref(), Some("Adare"));
    state.cycle_club(-1);
    assert_eq!(state.view.club.as_deref(), Some("Kilmallock"));

    state.view.date = Some("2025-08-02".to_string());
    state.show_date_view();
    assert_eq!(state.view.view, View::Date);
    let selected = state.selected_match().expect("row for date");
    assert_eq!(selected.date, "2025-08-02");
}

#[test]
fn export_and_failure_deltas_log() {
    let mut state = AppState::default();
    apply_delta(&mut state, Delta::LoadFailed("timeout".to_string()));
    assert!(!state.loading);
    assert!(state.logs.back().is_some_and(|l| l.contains("timeout")));

    apply_delta(
        &mut state,
        Delta::ExportStarted {
            path: "out.xlsx".to_string(),
        },
    );
    assert!(state.export.active && !state.export.done);
    apply_delta(
        &mut state,
        Delta::ExportFinished {
            path: "out.xlsx".to_string(),
            fixtures: 8,
            tables: 2,
        },
    );
    assert!(state.export.done);
    assert!(state.export.message.contains("8 fixtures"));
}

#[test]
fn log_is_bounded() {
    let mut state = AppState::default();
    for i in 0..250 {
        apply_delta(&mut state, Delta::Log(format!("[INFO] line {i}")));
    }
    assert_eq!(state.logs.len(), 200);
    assert_eq!(state.logs.front().map(String::as_str), Some("[INFO] line 50"));
    assert!(state.overrides == Overrides::default());
}
