use std::fs;
use std::path::PathBuf;

use serde_json::json;

use hurling_hub::feed::{normalize_record, parse_feed_json};
use hurling_hub::model::MatchRecord;
use hurling_hub::standings::{
    AwardedOutcome, Overrides, PointsAdjustment, PositionOverride, ResultOverride, StandingRow,
    StandingsConfig, TieBreak, compute_standings,
};

const SHC: &str = "Senior Hurling Championship";
const PIHC: &str = "Premier Intermediate Hurling Championship";

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

fn row<'a>(rows: &'a [StandingRow], team: &str) -> &'a StandingRow {
    rows.iter()
        .find(|r| r.team == team)
        .unwrap_or_else(|| panic!("{team} missing from table"))
}

fn order(rows: &[StandingRow]) -> Vec<&str> {
    rows.iter().map(|r| r.team.as_str()).collect()
}

#[test]
fn counts_results_draws_and_walkovers() {
    let matches = group_matches();
    let table = compute_standings(
        &matches,
        SHC,
        Some("Group 1"),
        &Overrides::default(),
        &StandingsConfig::default(),
    );
    assert_eq!(table.rows.len(), 4);
    assert!(table.warnings.is_empty());

    let doon = row(&table.rows, "Doon");
    assert_eq!((doon.played, doon.won, doon.drawn, doon.lost), (3, 2, 1, 0));
    assert_eq!(doon.points, 5);
    // The walkover adds nothing to scoring totals.
    assert_eq!((doon.score_for, doon.score_against, doon.diff), (31, 30, 1));

    let ahane = row(&table.rows, "Ahane");
    assert_eq!((ahane.played, ahane.won, ahane.lost), (2, 1, 1));
    assert_eq!(ahane.points, 2);
    assert_eq!(ahane.diff, 6);

    let cappamore = row(&table.rows, "Cappamore");
    assert_eq!((cappamore.played, cappamore.drawn, cappamore.points), (2, 1, 1));
    assert_eq!(cappamore.diff, -15);
}

#[test]
fn head_to_head_settles_two_way_tie_before_difference() {
    let matches = group_matches();
    let table = compute_standings(
        &matches,
        SHC,
        Some("Group 1"),
        &Overrides::default(),
        &StandingsConfig::default(),
    );
    // Bruff has the better difference but lost the meeting with Ahane.
    assert_eq!(order(&table.rows), vec!["Doon", "Ahane", "Bruff", "Cappamore"]);
    assert_eq!(
        table.rows.iter().map(|r| r.position).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );

    let by_difference = StandingsConfig {
        tie_breaks: vec![TieBreak::ScoreDifference, TieBreak::ScoreFor, TieBreak::Name],
    };
    let table = compute_standings(&matches, SHC, Some("Group 1"), &Overrides::default(), &by_difference);
    assert_eq!(order(&table.rows), vec!["Doon", "Bruff", "Ahane", "Cappamore"]);
}

#[test]
fn three_way_tie_skips_head_to_head() {
    let records = [
        ("Ahane", "Bruff", (1, 10), (0, 10)),
        ("Bruff", "Cappamore", (2, 10), (0, 10)),
        ("Cappamore", "Ahane", (0, 14), (0, 10)),
    ];
    let matches: Vec<MatchRecord> = records
        .iter()
        .filter_map(|(home, away, hs, aws)| {
            normalize_record(&json!({
                "competition": SHC,
                "group": "Group 2",
                "round": "Round 1",
                "home": home,
                "away": away,
                "status": "Result",
                "home_goals": hs.0, "home_points": hs.1,
                "away_goals": aws.0, "away_points": aws.1,
            }))
        })
        .collect();
    let table = compute_standings(
        &matches,
        SHC,
        Some("Group 2"),
        &Overrides::default(),
        &StandingsConfig::default(),
    );
    // All on 2 points: Bruff +3, Ahane -1, Cappamore -2.
    assert_eq!(order(&table.rows), vec!["Bruff", "Ahane", "Cappamore"]);
}

#[test]
fn other_groups_and_knockout_games_stay_out() {
    let matches = group_matches();
    let table = compute_standings(
        &matches,
        SHC,
        Some("Group 2"),
        &Overrides::default(),
        &StandingsConfig::default(),
    );
    assert_eq!(order(&table.rows), vec!["Adare", "Kilmallock"]);
    assert!(table.rows.iter().all(|r| r.played == 1));
    assert!(!table.rows.iter().any(|r| r.team.contains("Winner")));
}

#[test]
fn walkover_without_winner_is_played_but_unscored() {
    let matches: Vec<MatchRecord> = [json!({
        "competition": SHC,
        "group": "Group 1",
        "round": "Round 1",
        "home": "Ahane",
        "away": "Bruff",
        "status": "Walkover",
    })]
    .iter()
    .filter_map(normalize_record)
    .collect();
    let table = compute_standings(
        &matches,
        SHC,
        Some("Group 1"),
        &Overrides::default(),
        &StandingsConfig::default(),
    );
    assert_eq!(table.warnings.len(), 1);
    for team in ["Ahane", "Bruff"] {
        let r = row(&table.rows, team);
        assert_eq!((r.played, r.won, r.lost, r.points), (1, 0, 0, 0));
    }
}

#[test]
fn adjustments_and_awarded_results_apply() {
    let matches = group_matches();
    let overrides = Overrides {
        adjustments: vec![PointsAdjustment {
            competition: "SHC".to_string(),
            group: Some("Group 1".to_string()),
            team: "Doon".to_string(),
            points: -2,
            reason: "Fielded ineligible player".to_string(),
        }],
        results: vec![ResultOverride {
            competition: SHC.to_string(),
            group: None,
            round: Some("Round 3".to_string()),
            home: "Bruff".to_string(),
            away: "Doon".to_string(),
            outcome: AwardedOutcome::HomeWin,
            reason: "Awarded on appeal".to_string(),
        }],
        positions: Vec::new(),
    };
    let table = compute_standings(
        &matches,
        SHC,
        Some("Group 1"),
        &overrides,
        &StandingsConfig::default(),
    );

    let doon = row(&table.rows, "Doon");
    // Draw + walkover win, minus the deduction.
    assert_eq!(doon.points, 1);
    assert_eq!(doon.adjustment, -2);
    let note = doon.note.as_deref().unwrap_or_default();
    assert!(note.contains("ineligible"));
    assert!(note.contains("appeal"));

    let bruff = row(&table.rows, "Bruff");
    assert_eq!((bruff.won, bruff.lost, bruff.points), (2, 1, 4));
    // An awarded result carries no score.
    assert_eq!(bruff.score_for, 37);
    assert_eq!(table.rows[0].team, "Bruff");
}

#[test]
fn voided_fixture_is_ignored() {
    let matches = group_matches();
    let overrides = Overrides {
        results: vec![ResultOverride {
            competition: SHC.to_string(),
            group: Some("Group 1".to_string()),
            round: None,
            home: "Doon".to_string(),
            away: "Ahane".to_string(),
            outcome: AwardedOutcome::Void,
            reason: String::new(),
        }],
        ..Overrides::default()
    };
    let table = compute_standings(
        &matches,
        SHC,
        Some("Group 1"),
        &overrides,
        &StandingsConfig::default(),
    );
    assert_eq!(row(&table.rows, "Doon").points, 3);
    assert_eq!(row(&table.rows, "Ahane").played, 1);
}

#[test]
fn position_override_pins_team() {
    let matches = group_matches();
    let overrides = Overrides {
        positions: vec![PositionOverride {
            competition: SHC.to_string(),
            group: Some("Group 1".to_string()),
            team: "Cappamore".to_string(),
            position: 2,
        }],
        ..Overrides::default()
    };
    let table = compute_standings(
        &matches,
        SHC,
        Some("Group 1"),
        &overrides,
        &StandingsConfig::default(),
    );
    assert_eq!(order(&table.rows), vec!["Doon", "Cappamore", "Ahane", "Bruff"]);
    assert_eq!(table.rows[1].position, 2);
    assert!(table.rows[1].note.is_some());
}

#[test]
fn unknown_team_adjustment_warns() {
    let matches = group_matches();
    let overrides = Overrides {
        adjustments: vec![PointsAdjustment {
            competition: SHC.to_string(),
            group: Some("Group 1".to_string()),
            team: "Nobody".to_string(),
            points: 2,
            reason: String::new(),
        }],
        ..Overrides::default()
    };
    let table = compute_standings(
        &matches,
        SHC,
        Some("Group 1"),
        &overrides,
        &StandingsConfig::default(),
    );
    assert_eq!(table.warnings.len(), 1);
    assert!(table.warnings[0].contains("Nobody"));
}

#[test]
fn single_table_competition_ignores_group_argument() {
    let doc = parse_feed_json(&read_fixture("feed_variants.json")).expect("fixture should parse");
    let table = compute_standings(
        &doc.matches,
        PIHC,
        Some("anything"),
        &Overrides::default(),
        &StandingsConfig::default(),
    );
    assert_eq!(table.group, None);
    // 1-17 (20) beats 2-11 (17).
    assert_eq!(order(&table.rows), vec!["Cappamore", "Murroe-Boher"]);
    assert_eq!(table.rows[0].points, 2);
    assert_eq!(table.rows[0].diff, 3);
}

fn group_one_results(games: &[(&str, &str, (u32, u32), (u32, u32))]) -> Vec<MatchRecord> {
    games
        .iter()
        .filter_map(|(home, away, hs, aws)| {
            normalize_record(&json!({
                "competition": SHC,
                "group": "Group 1",
                "round": "Round 1",
                "home": home,
                "away": away,
                "status": "Result",
                "home_goals": hs.0, "home_points": hs.1,
                "away_goals": aws.0, "away_points": aws.1,
            }))
        })
        .collect()
}

#[test]
fn several_pins_hold_their_positions() {
    let matches = group_one_results(&[
        ("Ahane", "Bruff", (1, 10), (0, 10)),
        ("Ahane", "Cappamore", (1, 10), (0, 10)),
        ("Ahane", "Doon", (1, 10), (0, 10)),
        ("Bruff", "Cappamore", (1, 10), (0, 10)),
        ("Bruff", "Doon", (1, 10), (0, 10)),
        ("Cappamore", "Doon", (1, 10), (0, 10)),
    ]);
    let natural = compute_standings(
        &matches,
        SHC,
        Some("Group 1"),
        &Overrides::default(),
        &StandingsConfig::default(),
    );
    assert_eq!(order(&natural.rows), vec!["Ahane", "Bruff", "Cappamore", "Doon"]);

    let pin = |team: &str, position: usize| PositionOverride {
        competition: SHC.to_string(),
        group: Some("Group 1".to_string()),
        team: team.to_string(),
        position,
    };
    let overrides = Overrides {
        positions: vec![pin("Doon", 2), pin("Ahane", 3)],
        ..Overrides::default()
    };
    let table = compute_standings(
        &matches,
        SHC,
        Some("Group 1"),
        &overrides,
        &StandingsConfig::default(),
    );
    assert_eq!(order(&table.rows), vec!["Bruff", "Doon", "Ahane", "Cappamore"]);
    assert_eq!(row(&table.rows, "Doon").position, 2);
    assert_eq!(row(&table.rows, "Ahane").position, 3);
}

#[test]
fn byes_placeholders_and_unscored_results_add_nothing() {
    let baseline = group_matches();
    let mut matches = baseline.clone();
    matches.extend(
        [
            json!({
                "competition": SHC, "group": "Group 1", "round": "Round 4",
                "home": "Ahane", "away": "Bruff", "status": "Result",
                "home_goals": 2, "home_points": 11,
            }),
            json!({
                "competition": SHC, "group": "Group 1", "round": "Round 4",
                "home": "Cappamore", "away": "BYE", "status": "Bye",
            }),
            json!({
                "competition": SHC, "group": "Group 1", "round": "Round 4",
                "home": "TBC", "away": "Doon", "status": "Result",
                "home_goals": 0, "home_points": 9, "away_goals": 1, "away_points": 12,
            }),
        ]
        .iter()
        .filter_map(normalize_record),
    );

    let expected = compute_standings(
        &baseline,
        SHC,
        Some("Group 1"),
        &Overrides::default(),
        &StandingsConfig::default(),
    );
    let table = compute_standings(
        &matches,
        SHC,
        Some("Group 1"),
        &Overrides::default(),
        &StandingsConfig::default(),
    );
    assert_eq!(order(&table.rows), vec!["Doon", "Ahane", "Bruff", "Cappamore"]);
    assert!(!table.rows.iter().any(|r| r.team == "BYE" || r.team == "TBC"));
    for (got, want) in table.rows.iter().zip(&expected.rows) {
        assert_eq!(
            (got.played, got.won, got.drawn, got.lost, got.points),
            (want.played, want.won, want.drawn, want.lost, want.points),
            "{}",
            got.team
        );
    }
}
