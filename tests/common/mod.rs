//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use dune_tournament::{Phase, Player, Round, RoundType, Table, TableResult, TournamentState};
use std::sync::Arc;

pub fn make_player(id: &str, name: &str, points: i32, total_vp: i32, efficiency: i32) -> Player {
    let mut p = Player::new(id, name);
    p.points = points;
    p.total_vp = total_vp;
    p.efficiency = efficiency;
    p
}

/// 20 players ranked by id: id "1" is seed 1 (20 points) down to id "20" (1 point).
pub fn make_20_players() -> Vec<Player> {
    (0..20)
        .map(|i| {
            make_player(
                &(i + 1).to_string(),
                &format!("Player{:02}", i + 1),
                20 - i,
                40 - i * 2,
                4 + i,
            )
        })
        .collect()
}

pub fn make_state(players: Vec<Player>, top_cut: usize) -> TournamentState {
    let mut state = TournamentState::with_players(players);
    state.settings.top_cut = top_cut;
    state.phase = Phase::TopCut;
    state
}

/// A completed table; `finish_order` lists player ids 1st to last.
pub fn completed_table(id: u32, finish_order: &[&str]) -> Table {
    let mut table = Table::new(id, finish_order.iter().map(|s| s.to_string()).collect());
    table.results = finish_order
        .iter()
        .enumerate()
        .map(|(i, pid)| TableResult::new(*pid, i as u32 + 1, 12 - 3 * i as i32))
        .collect();
    table.is_complete = true;
    table
}

pub fn round(number: u32, round_type: RoundType, tables: Vec<Table>) -> Round {
    Round::new(number, round_type, tables)
}

/// Results for a table in seating order: first seat wins.
pub fn results_in_seat_order(table: &Table) -> Vec<TableResult> {
    table
        .player_ids
        .iter()
        .enumerate()
        .map(|(i, pid)| TableResult::new(pid.clone(), i as u32 + 1, 10 - i as i32))
        .collect()
}

pub fn ids(players: &[Arc<Player>]) -> Vec<String> {
    players.iter().map(|p| p.id.clone()).collect()
}

pub fn sorted(mut v: Vec<String>) -> Vec<String> {
    v.sort();
    v
}

pub fn strs(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

/// The standard completed top-16 semifinal: every table finishes in seed order.
pub fn semifinal_round() -> Round {
    round(
        5,
        RoundType::Semifinal,
        vec![
            completed_table(1, &["1", "4", "5", "8"]),
            completed_table(2, &["2", "3", "6", "7"]),
            completed_table(3, &["9", "10", "11", "12"]),
            completed_table(4, &["13", "14", "15", "16"]),
        ],
    )
}
