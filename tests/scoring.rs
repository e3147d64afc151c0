//! Integration tests for scoring: validation, apply and the revert round trip.

mod common;

use common::{completed_table, make_player, round, strs};
use dune_tournament::logic::scoring::{apply_round_results, MAX_VP};
use dune_tournament::{
    add_player, apply_table_results, generate_round, revert_table_results, start_tournament,
    submit_table_results, update_settings, validate_table_result, Player, ResultError, RoundType,
    Table, TableResult, TournamentError, TournamentState,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

fn r(id: &str, position: u32, vp: i32) -> TableResult {
    TableResult::new(id, position, vp)
}

/// Eight players with some points already; round 0 holds two completed, unscored tables.
fn scored_state() -> TournamentState {
    let players: Vec<Player> = (1..=8)
        .map(|i| make_player(&i.to_string(), &format!("P{i}"), 7, 20 + i, 5))
        .collect();
    let mut state = TournamentState::with_players(players);
    state.push_round(round(
        1,
        RoundType::Qualifying,
        vec![
            completed_table(1, &["1", "2", "3", "4"]),
            completed_table(2, &["5", "6", "7"]),
        ],
    ));
    state
}

#[test]
fn valid_results_pass() {
    let results = vec![r("a", 2, 9), r("b", 1, 11), r("c", 4, 3), r("d", 3, 7)];
    assert_eq!(validate_table_result(&results, 4), Ok(()));
    let three = vec![r("a", 3, 4), r("b", 1, 10), r("c", 2, 8)];
    assert_eq!(validate_table_result(&three, 3), Ok(()));
}

#[test]
fn malformed_results_are_rejected() {
    let dup = vec![r("a", 1, 9), r("b", 1, 11), r("c", 3, 3), r("d", 4, 7)];
    assert_eq!(validate_table_result(&dup, 4), Err(ResultError::DuplicatePosition(1)));

    let missing = vec![r("a", 1, 9), r("b", 2, 11), r("c", 3, 3)];
    assert_eq!(
        validate_table_result(&missing, 4),
        Err(ResultError::WrongEntryCount { expected: 4, found: 3 })
    );

    let out_of_range = vec![r("a", 1, 9), r("b", 2, 11), r("c", 4, 3)];
    assert_eq!(
        validate_table_result(&out_of_range, 3),
        Err(ResultError::PositionOutOfRange { position: 4, table_size: 3 })
    );

    let negative = vec![r("a", 1, 9), r("b", 2, -1), r("c", 3, 3), r("d", 4, 7)];
    assert_eq!(
        validate_table_result(&negative, 4),
        Err(ResultError::NegativeVp("b".to_string()))
    );

    let twice = vec![r("a", 1, 9), r("a", 2, 11), r("c", 3, 3), r("d", 4, 7)];
    assert_eq!(
        validate_table_result(&twice, 4),
        Err(ResultError::DuplicatePlayer("a".to_string()))
    );

    let huge = vec![r("a", 1, MAX_VP + 1), r("b", 2, 11), r("c", 3, 3), r("d", 4, 7)];
    assert_eq!(
        validate_table_result(&huge, 4),
        Err(ResultError::VpTooHigh { player_id: "a".to_string(), max: MAX_VP })
    );

    assert_eq!(validate_table_result(&[], 5), Err(ResultError::UnsupportedTableSize(5)));
}

#[test]
fn validation_errors_have_readable_reasons() {
    let err = TournamentError::from(ResultError::NegativeVp("7".to_string()));
    assert_eq!(err.to_string(), "Victory points cannot be negative (player 7)");
}

#[test]
fn apply_adds_points_vp_efficiency_and_opponents() {
    let state = scored_state();
    let next = apply_table_results(&state, 0, 1).unwrap();

    let winner = next.player("1").unwrap();
    assert_eq!(winner.points, 7 + 5);
    assert_eq!(winner.total_vp, 21 + 12);
    assert_eq!(winner.efficiency, 5 + 1);
    assert_eq!(winner.opponents.len(), 3);

    let last = next.player("4").unwrap();
    assert_eq!(last.points, 7 + 1);
    assert_eq!(last.total_vp, 24 + 3);
    assert_eq!(last.efficiency, 5 + 4);
    assert!(last.has_faced("1") && last.has_faced("2") && last.has_faced("3"));
}

#[test]
fn three_player_table_has_no_fourth_place_bonus() {
    let state = scored_state();
    let next = apply_table_results(&state, 0, 2).unwrap();
    assert_eq!(next.player("5").unwrap().points, 7 + 5);
    assert_eq!(next.player("6").unwrap().points, 7 + 3);
    assert_eq!(next.player("7").unwrap().points, 7 + 2);
    assert_eq!(next.player("7").unwrap().opponents.len(), 2);
}

#[test]
fn apply_then_revert_restores_players_exactly() {
    let state = scored_state();
    let applied = apply_table_results(&state, 0, 1).unwrap();
    assert_ne!(applied.players, state.players);
    let reverted = revert_table_results(&applied, 0, 1).unwrap();
    assert_eq!(reverted.players, state.players);
}

#[test]
fn apply_then_revert_keeps_meetings_from_outside_the_state() {
    let mut state = scored_state();
    for (p, other) in [(0, "2"), (1, "1")] {
        Arc::make_mut(&mut state.players[p]).opponents.insert(other.to_string());
    }
    let applied = apply_table_results(&state, 0, 1).unwrap();
    assert_eq!(applied.player("1").unwrap().opponents.meetings("2"), 2);
    let reverted = revert_table_results(&applied, 0, 1).unwrap();
    assert_eq!(reverted.players, state.players);
    assert!(reverted.player("1").unwrap().has_faced("2"));
}

#[test]
fn apply_then_revert_ignores_other_unscored_tables() {
    // Both rounds reported but not yet scored; "1" and "2" share a table in each.
    let mut state = scored_state();
    state.push_round(round(
        2,
        RoundType::Qualifying,
        vec![
            completed_table(1, &["2", "1", "6", "8"]),
            completed_table(2, &["3", "4", "5"]),
        ],
    ));
    let applied = apply_table_results(&state, 0, 1).unwrap();
    let reverted = revert_table_results(&applied, 0, 1).unwrap();
    assert!(!reverted.player("1").unwrap().has_faced("2"));
    assert_eq!(reverted.players, state.players);
}

#[test]
fn totals_out_of_range_are_an_error_not_a_wrap() {
    let mut state = scored_state();
    Arc::make_mut(&mut state.players[0]).total_vp = i32::MAX - 5;
    assert!(matches!(
        apply_table_results(&state, 0, 1),
        Err(TournamentError::InvalidState(_))
    ));
}

#[test]
fn revert_keeps_opponents_met_at_other_tables() {
    let mut state = scored_state();
    state.push_round(round(
        2,
        RoundType::Qualifying,
        vec![
            completed_table(1, &["3", "1", "5", "7"]),
            completed_table(2, &["2", "4", "6"]),
        ],
    ));
    let state = apply_round_results(&state, 0).unwrap();
    let state = apply_round_results(&state, 1).unwrap();

    let reverted = revert_table_results(&state, 1, 1).unwrap();
    let p3 = reverted.player("3").unwrap();
    // Met "1" in round 1 too; "5" and "7" only in round 2.
    assert!(p3.has_faced("1"));
    assert!(!p3.has_faced("5"));
    assert!(!p3.has_faced("7"));
}

#[test]
fn apply_leaves_input_and_other_tables_untouched() {
    let state = scored_state();
    let snapshot = state.clone();
    let next = apply_table_results(&state, 0, 1).unwrap();
    assert_eq!(state, snapshot);

    // Players of other tables are shared, not copied.
    for id in ["5", "6", "7", "8"] {
        let before = state.players.iter().find(|p| p.id == id).unwrap();
        let after = next.players.iter().find(|p| p.id == id).unwrap();
        assert!(Arc::ptr_eq(before, after), "player {id} was copied");
    }
    assert!(Arc::ptr_eq(&state.rounds[0], &next.rounds[0]));
}

#[test]
fn apply_preconditions() {
    let mut state = scored_state();
    assert_eq!(apply_table_results(&state, 3, 1), Err(TournamentError::RoundNotFound(3)));
    assert_eq!(apply_table_results(&state, 0, 9), Err(TournamentError::TableNotFound(9)));

    state.push_round(round(2, RoundType::Qualifying, vec![Table::new(1, strs(&["1", "2", "3", "4"]))]));
    assert_eq!(apply_table_results(&state, 1, 1), Err(TournamentError::TableIncomplete(1)));
    assert_eq!(revert_table_results(&state, 1, 1), Err(TournamentError::TableIncomplete(1)));
}

#[test]
fn apply_round_results_scores_every_completed_table() {
    let state = scored_state();
    let next = apply_round_results(&state, 0).unwrap();
    assert_eq!(next.player("1").unwrap().points, 12);
    assert_eq!(next.player("5").unwrap().points, 12);
    // "8" sat out.
    assert_eq!(next.player("8").unwrap().points, 7);
}

/// A started tournament with `rounds` qualifying rounds reported in random order.
fn random_tournament(players: usize, rounds: u32, seed: u64) -> TournamentState {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut state = TournamentState::new("Random");
    for i in 1..=players {
        state = add_player(&state, &format!("P{i}")).unwrap();
    }
    let mut state = start_tournament(&update_settings(&state, rounds, 8).unwrap()).unwrap();
    for index in 0..rounds as usize {
        state = generate_round(&state, &mut rng).unwrap();
        for table in state.rounds[index].tables.clone() {
            let mut finish = table.player_ids.clone();
            finish.shuffle(&mut rng);
            let results = finish
                .iter()
                .enumerate()
                .map(|(i, id)| TableResult::new(id.clone(), i as u32 + 1, rng.gen_range(0..15)))
                .collect();
            state = submit_table_results(&state, index, table.id, results).unwrap();
        }
    }
    state
}

/// The same rounds with every player back at zero: all tables complete, none scored.
fn unscored(state: &TournamentState) -> TournamentState {
    let mut raw = state.clone();
    raw.players = state
        .players
        .iter()
        .map(|p| Arc::new(Player::new(p.id.clone(), p.name.clone())))
        .collect();
    raw
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn revert_undoes_apply_in_any_state(
        players in 8usize..18,
        rounds in 1u32..4,
        seed in any::<u64>(),
        pick in any::<prop::sample::Index>(),
    ) {
        let played = random_tournament(players, rounds, seed);
        let tables: Vec<(usize, u32)> = played
            .rounds
            .iter()
            .enumerate()
            .flat_map(|(ri, r)| r.tables.iter().map(move |t| (ri, t.id)))
            .collect();
        let (ri, table_id) = tables[pick.index(tables.len())];

        // Scored state: take the table out and put it back.
        let without = revert_table_results(&played, ri, table_id).unwrap();
        prop_assert_eq!(&apply_table_results(&without, ri, table_id).unwrap().players, &played.players);
        let again = apply_table_results(&played, ri, table_id).unwrap();
        prop_assert_eq!(&revert_table_results(&again, ri, table_id).unwrap().players, &played.players);

        // Unscored state: every table complete, nothing applied yet.
        let raw = unscored(&played);
        let applied = apply_table_results(&raw, ri, table_id).unwrap();
        prop_assert_eq!(&revert_table_results(&applied, ri, table_id).unwrap(), &raw);
    }
}
