//! Persistence tests: JSON export/import, state validation and CSV.

mod common;

use common::{completed_table, make_player, results_in_seat_order, round, strs};
use dune_tournament::logic::io::{from_json, roster_from_csv, standings_to_csv, to_json, validate_state};
use dune_tournament::{
    add_player, generate_round, standings_table, start_tournament, submit_table_results,
    update_settings, Phase, Player, RoundType, Table, TournamentError, TournamentState,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

const SAVED: &str = r#"{
  "metadata": {
    "version": "1.0.0",
    "timestamp": "2025-03-01T18:30:00.000Z",
    "tournamentName": "Club Night"
  },
  "players": [
    { "id": "1", "name": "Ann", "points": 5, "totalVP": 12, "efficiency": 1, "opponents": ["2", "3", "4"] },
    { "id": "2", "name": "Ben", "points": 3, "totalVP": 9, "efficiency": 2, "opponents": ["1", "3", "4"] },
    { "id": "3", "name": "Cat", "points": 2, "totalVP": 6, "efficiency": 3, "opponents": ["1", "2", "4"] },
    { "id": "4", "name": "Dan", "points": 1, "totalVP": 3, "efficiency": 4, "opponents": ["1", "2", "3"] }
  ],
  "rounds": [
    {
      "number": 1,
      "type": "qualifying",
      "isComplete": true,
      "tables": [
        {
          "id": 1,
          "playerIds": ["1", "2", "3", "4"],
          "isComplete": true,
          "results": [
            { "playerId": "1", "position": 1, "vp": 12, "leader": "Paul Atreides" },
            { "playerId": "2", "position": 2, "vp": 9, "leader": "Glossu Rabban" },
            { "playerId": "3", "position": 3, "vp": 6 },
            { "playerId": "4", "position": 4, "vp": 3 }
          ]
        }
      ]
    }
  ],
  "phase": "top8",
  "currentRound": 1,
  "settings": { "totalQualifyingRounds": 4, "topCut": 16, "dramaticReveal": true }
}"#;

fn played_state() -> TournamentState {
    let mut state = TournamentState::new("Round Trip");
    for name in ["Ann", "Ben", "Cat", "Dan", "Eve", "Fay", "Gus", "Hal"] {
        state = add_player(&state, name).unwrap();
    }
    let state = update_settings(&state, 3, 8).unwrap();
    let state = start_tournament(&state).unwrap();
    let state = generate_round(&state, &mut StdRng::seed_from_u64(17)).unwrap();
    let table = state.rounds[0].tables[0].clone();
    submit_table_results(&state, 0, table.id, results_in_seat_order(&table)).unwrap()
}

#[test]
fn export_then_import_gives_the_same_state() {
    let state = played_state();
    let json = to_json(&state).unwrap();
    assert!(json.contains("\"totalVP\""));
    assert!(json.contains("\"type\": \"qualifying\""));
    assert_eq!(from_json(&json).unwrap(), state);
}

#[test]
fn saved_files_in_the_browser_format_load() {
    let state = from_json(SAVED).unwrap();
    assert_eq!(state.metadata.tournament_name, "Club Night");
    assert_eq!(state.phase, Phase::TopCut);
    assert!(state.settings.dramatic_reveal);
    assert_eq!(state.player("1").unwrap().total_vp, 12);
    assert!(state.player("4").unwrap().has_faced("1"));

    let table = &state.rounds[0].tables[0];
    assert_eq!(table.results[0].leader.as_deref(), Some("Paul Atreides"));
    assert_eq!(table.results[2].leader, None);

    // Re-exported phase uses the current name.
    assert!(to_json(&state).unwrap().contains("\"phase\": \"top-cut\""));
}

#[test]
fn repeated_meetings_are_kept_across_export() {
    let json = SAVED.replace(r#""opponents": ["2", "3", "4"]"#, r#""opponents": ["2", "3", "2", "4"]"#);
    let state = from_json(&json).unwrap();
    let ann = state.player("1").unwrap();
    assert_eq!(ann.opponents.meetings("2"), 2);
    assert_eq!(ann.opponents.meetings("3"), 1);
    assert_eq!(ann.opponents.len(), 3);
    assert_eq!(from_json(&to_json(&state).unwrap()).unwrap(), state);
}

#[test]
fn redemption_rounds_accept_the_old_type_name() {
    let json = SAVED.replace("\"type\": \"qualifying\"", "\"type\": \"redemption\"");
    let state = from_json(&json).unwrap();
    assert_eq!(state.rounds[0].round_type, RoundType::WinnersFinal);
}

#[test]
fn malformed_json_is_a_json_error() {
    assert!(matches!(from_json("{ not json"), Err(TournamentError::Json(_))));
    assert!(matches!(from_json("{}"), Err(TournamentError::Json(_))));
}

#[test]
fn structural_problems_are_rejected() {
    let base = from_json(SAVED).unwrap();
    assert_eq!(validate_state(&base), Ok(()));

    let mut bad_cut = base.clone();
    bad_cut.settings.top_cut = 12;
    assert!(matches!(validate_state(&bad_cut), Err(TournamentError::InvalidSettings(_))));

    let mut duplicate_id = base.clone();
    duplicate_id.players.push(Arc::new(Player::new("1", "Copy")));
    assert!(matches!(validate_state(&duplicate_id), Err(TournamentError::InvalidState(_))));

    let mut stranger = base.clone();
    stranger.rounds.push(Arc::new(round(
        2,
        RoundType::Qualifying,
        vec![Table::new(1, strs(&["1", "2", "3", "99"]))],
    )));
    assert!(matches!(validate_state(&stranger), Err(TournamentError::InvalidState(_))));

    let mut out_of_order = base.clone();
    out_of_order.rounds.push(Arc::new(round(
        1,
        RoundType::Qualifying,
        vec![Table::new(1, strs(&["1", "2", "3", "4"]))],
    )));
    assert!(matches!(validate_state(&out_of_order), Err(TournamentError::InvalidState(_))));

    let mut seated_twice = base.clone();
    seated_twice.rounds.push(Arc::new(round(
        2,
        RoundType::Qualifying,
        vec![Table::new(1, strs(&["1", "2", "3", "1"]))],
    )));
    assert!(matches!(validate_state(&seated_twice), Err(TournamentError::InvalidState(_))));

    let mut empty_but_complete = base.clone();
    let mut table = Table::new(1, strs(&["1", "2", "3", "4"]));
    table.is_complete = true;
    empty_but_complete
        .rounds
        .push(Arc::new(round(2, RoundType::Qualifying, vec![table])));
    assert!(matches!(
        validate_state(&empty_but_complete),
        Err(TournamentError::InvalidState(_))
    ));

    let mut bad_results = base;
    let mut table = completed_table(1, &["1", "2", "3", "4"]);
    table.results[1].position = 1;
    bad_results
        .rounds
        .push(Arc::new(round(2, RoundType::Qualifying, vec![table])));
    assert!(matches!(validate_state(&bad_results), Err(TournamentError::InvalidResults(_))));
}

#[test]
fn absurd_victory_points_are_rejected_on_import() {
    let json = SAVED.replace(r#""vp": 12,"#, r#""vp": 2147483647,"#);
    assert!(matches!(from_json(&json), Err(TournamentError::InvalidResults(_))));
}

#[test]
fn roster_csv_takes_the_first_column() {
    let csv = "name,club\nAlice,Arrakis\n\n  Bob  ,\n,ignored\nCarol\n";
    assert_eq!(roster_from_csv(csv.as_bytes()).unwrap(), strs(&["Alice", "Bob", "Carol"]));

    let no_header = "Alice\nBob\n";
    assert_eq!(roster_from_csv(no_header.as_bytes()).unwrap(), strs(&["Alice", "Bob"]));
}

#[test]
fn standings_csv_lists_rank_and_stats() {
    let players = vec![
        Arc::new(make_player("2", "Smith, J", 3, 9, 2)),
        Arc::new(make_player("1", "Ann", 5, 12, 1)),
    ];
    let mut buf = Vec::new();
    standings_to_csv(&standings_table(&players), &mut buf).unwrap();
    assert_eq!(
        String::from_utf8(buf).unwrap(),
        "rank,name,points,total_vp,efficiency\n1,Ann,5,12,1\n2,\"Smith, J\",3,9,2\n"
    );
}
