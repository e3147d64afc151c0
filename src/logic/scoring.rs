//! Scoring: result validation and applying/reverting a table's results on players.

use crate::models::{Player, ResultError, Round, Table, TableResult, TournamentError, TournamentState};
use std::collections::HashSet;

/// Tournament points for a finishing position (1st 5, 2nd 3, 3rd 2, 4th 1).
pub fn points_for_position(position: u32) -> i32 {
    match position {
        1 => 5,
        2 => 3,
        3 => 2,
        4 => 1,
        _ => 0,
    }
}

/// Highest victory point total accepted for one game.
pub const MAX_VP: i32 = 999;

/// Check a table's results: every position 1..=size exactly once, VP within 0..=[`MAX_VP`].
pub fn validate_table_result(results: &[TableResult], table_size: usize) -> Result<(), ResultError> {
    if !(3..=4).contains(&table_size) {
        return Err(ResultError::UnsupportedTableSize(table_size));
    }
    if results.len() != table_size {
        return Err(ResultError::WrongEntryCount {
            expected: table_size,
            found: results.len(),
        });
    }
    let mut seen_positions = HashSet::new();
    let mut seen_players = HashSet::new();
    for r in results {
        if r.position == 0 || r.position as usize > table_size {
            return Err(ResultError::PositionOutOfRange {
                position: r.position,
                table_size,
            });
        }
        if !seen_positions.insert(r.position) {
            return Err(ResultError::DuplicatePosition(r.position));
        }
        if !seen_players.insert(r.player_id.as_str()) {
            return Err(ResultError::DuplicatePlayer(r.player_id.clone()));
        }
        if r.vp < 0 {
            return Err(ResultError::NegativeVp(r.player_id.clone()));
        }
        if r.vp > MAX_VP {
            return Err(ResultError::VpTooHigh {
                player_id: r.player_id.clone(),
                max: MAX_VP,
            });
        }
    }
    Ok(())
}

/// Validate results against the seated players of a specific table.
pub fn validate_for_table(table: &Table, results: &[TableResult]) -> Result<(), ResultError> {
    validate_table_result(results, table.size())?;
    match results.iter().find(|r| !table.seats(&r.player_id)) {
        Some(r) => Err(ResultError::UnknownPlayer(r.player_id.clone())),
        None => Ok(()),
    }
}

fn scored_table(state: &TournamentState, round_index: usize, table_id: u32) -> Result<Table, TournamentError> {
    let table = state
        .round(round_index)?
        .table(table_id)
        .ok_or(TournamentError::TableNotFound(table_id))?;
    if !table.is_complete || table.results.is_empty() {
        return Err(TournamentError::TableIncomplete(table_id));
    }
    validate_for_table(table, &table.results)?;
    for id in &table.player_ids {
        if state.player(id).is_none() {
            return Err(TournamentError::PlayerNotFound(id.clone()));
        }
    }
    Ok(table.clone())
}

/// Add one completed table's results to its players' stats and opponent records.
///
/// Only the players of that table are replaced in the returned state.
pub fn apply_table_results(
    state: &TournamentState,
    round_index: usize,
    table_id: u32,
) -> Result<TournamentState, TournamentError> {
    let table = scored_table(state, round_index, table_id)?;
    let mut next = state.clone();
    for result in &table.results {
        let player = next
            .player_mut(&result.player_id)
            .ok_or_else(|| TournamentError::PlayerNotFound(result.player_id.clone()))?;
        add_totals(player, result, 1)?;
        for other in table.player_ids.iter().filter(|id| **id != result.player_id) {
            player.opponents.insert(other.clone());
        }
    }
    log::debug!(
        "Applied round {} table {} results",
        state.round(round_index)?.number,
        table_id
    );
    Ok(next)
}

/// Exact inverse of [`apply_table_results`] for the same table.
///
/// Each co-seated player loses one meeting, so links from other scored
/// tables survive and links this table created disappear.
pub fn revert_table_results(
    state: &TournamentState,
    round_index: usize,
    table_id: u32,
) -> Result<TournamentState, TournamentError> {
    let table = scored_table(state, round_index, table_id)?;
    let mut next = state.clone();
    for result in &table.results {
        let player = next
            .player_mut(&result.player_id)
            .ok_or_else(|| TournamentError::PlayerNotFound(result.player_id.clone()))?;
        add_totals(player, result, -1)?;
        for other in table.player_ids.iter().filter(|id| **id != result.player_id) {
            player.opponents.remove_one(other);
        }
    }
    log::debug!(
        "Reverted round {} table {} results",
        state.round(round_index)?.number,
        table_id
    );
    Ok(next)
}

/// Add (`sign` 1) or remove (`sign` -1) one result from a player's totals.
fn add_totals(player: &mut Player, result: &TableResult, sign: i32) -> Result<(), TournamentError> {
    let overflow = || {
        TournamentError::InvalidState(format!("totals of player {} are out of range", player.id))
    };
    let points = player
        .points
        .checked_add(sign * points_for_position(result.position))
        .ok_or_else(overflow)?;
    let total_vp = result
        .vp
        .checked_mul(sign)
        .and_then(|vp| player.total_vp.checked_add(vp))
        .ok_or_else(overflow)?;
    let efficiency = i32::try_from(result.position)
        .ok()
        .and_then(|pos| player.efficiency.checked_add(sign * pos))
        .ok_or_else(overflow)?;
    player.points = points;
    player.total_vp = total_vp;
    player.efficiency = efficiency;
    Ok(())
}

/// Apply every completed table of a round, in table order.
pub fn apply_round_results(state: &TournamentState, round_index: usize) -> Result<TournamentState, TournamentError> {
    let table_ids: Vec<u32> = completed_table_ids(state.round(round_index)?);
    let mut next = state.clone();
    for id in table_ids {
        next = apply_table_results(&next, round_index, id)?;
    }
    Ok(next)
}

fn completed_table_ids(round: &Round) -> Vec<u32> {
    round
        .tables
        .iter()
        .filter(|t| t.is_complete)
        .map(|t| t.id)
        .collect()
}
