//! Tournament workflow: registration, round generation, result entry and phase changes.
//!
//! Every function takes the current state and returns the next one; the input
//! is never modified.

use crate::logic::bracket::{generate_elimination_round, BracketTemplate};
use crate::logic::pairing::{generate_qualifying_round, table_sizes, MIN_PLAYERS};
use crate::logic::scoring::{apply_table_results, revert_table_results, validate_for_table};
use crate::models::{
    Phase, Player, Round, RoundType, Settings, TableResult, TournamentError, TournamentState,
};
use rand::Rng;
use std::sync::Arc;

/// Add a player (Registration only). Names must be unique (case-insensitive).
///
/// Ids are sequential numbers continuing after the highest numeric id present,
/// so imported rosters keep unique ids.
pub fn add_player(state: &TournamentState, name: &str) -> Result<TournamentState, TournamentError> {
    state.require_phase(Phase::Registration)?;
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::EmptyName);
    }
    if state.players.iter().any(|p| p.name.eq_ignore_ascii_case(name)) {
        return Err(TournamentError::DuplicatePlayerName);
    }
    let next_id = state
        .players
        .iter()
        .filter_map(|p| p.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    let mut next = state.clone();
    next.players.push(Arc::new(Player::new(next_id.to_string(), name)));
    next.touch();
    Ok(next)
}

/// Remove a player by id (Registration only).
pub fn remove_player(state: &TournamentState, player_id: &str) -> Result<TournamentState, TournamentError> {
    state.require_phase(Phase::Registration)?;
    if state.player(player_id).is_none() {
        return Err(TournamentError::PlayerNotFound(player_id.to_string()));
    }
    let mut next = state.clone();
    next.players.retain(|p| p.id != player_id);
    next.touch();
    Ok(next)
}

pub fn set_tournament_name(state: &TournamentState, name: &str) -> Result<TournamentState, TournamentError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TournamentError::EmptyName);
    }
    let mut next = state.clone();
    next.metadata.tournament_name = name.to_string();
    next.touch();
    Ok(next)
}

/// Change the number of qualifying rounds and the top-cut size (Registration only).
pub fn update_settings(
    state: &TournamentState,
    total_qualifying_rounds: u32,
    top_cut: usize,
) -> Result<TournamentState, TournamentError> {
    state.require_phase(Phase::Registration)?;
    if total_qualifying_rounds == 0 {
        return Err(TournamentError::InvalidSettings(
            "at least one qualifying round is required".to_string(),
        ));
    }
    BracketTemplate::for_cut(top_cut)?;
    let mut next = state.clone();
    next.settings = Settings {
        total_qualifying_rounds,
        top_cut,
        ..state.settings.clone()
    };
    Ok(next)
}

/// Start the tournament: Registration -> Qualifying.
///
/// The roster must be seatable at tables of 3 and 4 and large enough to fill
/// the configured top cut; both are fixed once registration closes.
pub fn start_tournament(state: &TournamentState) -> Result<TournamentState, TournamentError> {
    state.require_phase(Phase::Registration)?;
    let count = state.players.len();
    if count < MIN_PLAYERS {
        return Err(TournamentError::NotEnoughPlayers {
            required: MIN_PLAYERS,
            actual: count,
        });
    }
    table_sizes(count)?;
    if count < state.settings.top_cut {
        return Err(TournamentError::NotEnoughPlayers {
            required: state.settings.top_cut,
            actual: count,
        });
    }
    let mut next = state.clone();
    next.phase = Phase::Qualifying;
    next.current_round = 0;
    next.touch();
    log::info!(
        "Tournament '{}' started with {} players",
        next.metadata.tournament_name,
        next.players.len()
    );
    Ok(next)
}

/// Pair and append the next qualifying round (Qualifying only).
pub fn generate_round<R: Rng + ?Sized>(
    state: &TournamentState,
    rng: &mut R,
) -> Result<TournamentState, TournamentError> {
    state.require_phase(Phase::Qualifying)?;
    if let Some(last) = state.last_round() {
        if !last.is_complete {
            return Err(TournamentError::RoundIncomplete(last.number));
        }
    }
    if state.qualifying_rounds() >= state.settings.total_qualifying_rounds as usize {
        return Err(TournamentError::QualifyingFinished);
    }
    let tables = generate_qualifying_round(state, rng)?;
    let number = state.last_round().map_or(1, |r| r.number + 1);
    let mut next = state.clone();
    next.push_round(Round::new(number, RoundType::Qualifying, tables));
    next.touch();
    log::info!("Generated qualifying round {}", number);
    Ok(next)
}

/// Record a table's results and score them.
///
/// Editing an already-scored table reverts its old results first. Invalid
/// results are rejected and nothing is applied.
pub fn submit_table_results(
    state: &TournamentState,
    round_index: usize,
    table_id: u32,
    results: Vec<TableResult>,
) -> Result<TournamentState, TournamentError> {
    require_play(state)?;
    let round = state.round(round_index)?;
    let table = round
        .table(table_id)
        .ok_or(TournamentError::TableNotFound(table_id))?;
    validate_for_table(table, &results)?;

    let mut next = if table.is_complete {
        revert_table_results(state, round_index, table_id)?
    } else {
        state.clone()
    };

    let round = next.round_mut(round_index)?;
    if let Some(t) = round.tables.iter_mut().find(|t| t.id == table_id) {
        t.results = results;
        t.is_complete = true;
    }
    round.refresh_completion();
    let round_number = round.number;
    let round_complete = round.is_complete;

    let mut next = apply_table_results(&next, round_index, table_id)?;
    next.touch();
    if round_complete {
        log::info!("Round {} complete", round_number);
    }
    Ok(next)
}

/// Undo a table's scoring and clear its results so they can be re-entered.
pub fn clear_table_results(
    state: &TournamentState,
    round_index: usize,
    table_id: u32,
) -> Result<TournamentState, TournamentError> {
    require_play(state)?;
    let mut next = revert_table_results(state, round_index, table_id)?;
    let round = next.round_mut(round_index)?;
    if let Some(t) = round.tables.iter_mut().find(|t| t.id == table_id) {
        t.results.clear();
        t.is_complete = false;
    }
    round.refresh_completion();
    next.touch();
    Ok(next)
}

/// Results may be entered while games are being played (Qualifying or TopCut).
fn require_play(state: &TournamentState) -> Result<(), TournamentError> {
    match state.phase {
        Phase::Qualifying | Phase::TopCut => Ok(()),
        actual => Err(TournamentError::InvalidPhase {
            expected: Phase::Qualifying,
            actual,
        }),
    }
}

/// Qualifying -> TopCut once every configured qualifying round is complete.
pub fn advance_to_top_cut(state: &TournamentState) -> Result<TournamentState, TournamentError> {
    state.require_phase(Phase::Qualifying)?;
    let required = state.settings.total_qualifying_rounds;
    let completed = state.completed_qualifying_rounds();
    if completed < required as usize {
        return Err(TournamentError::RoundIncomplete(completed as u32 + 1));
    }
    if state.players.len() < state.settings.top_cut {
        return Err(TournamentError::NotEnoughPlayers {
            required: state.settings.top_cut,
            actual: state.players.len(),
        });
    }
    let mut next = state.clone();
    next.phase = Phase::TopCut;
    next.touch();
    log::info!("Qualifying finished; top {} bracket begins", state.settings.top_cut);
    Ok(next)
}

/// Append the next bracket stage (TopCut only).
pub fn generate_top_cut_round(state: &TournamentState) -> Result<TournamentState, TournamentError> {
    state.require_phase(Phase::TopCut)?;
    let round = generate_elimination_round(state)?;
    let mut next = state.clone();
    log::info!("Generated {:?} as round {}", round.round_type, round.number);
    next.push_round(round);
    next.touch();
    Ok(next)
}

/// TopCut -> Finished once the grand final is complete.
pub fn finish_tournament(state: &TournamentState) -> Result<TournamentState, TournamentError> {
    state.require_phase(Phase::TopCut)?;
    let grand_final = state
        .round_of_type(RoundType::GrandFinal)
        .ok_or(TournamentError::RoundNotFound(state.rounds.len()))?;
    if !grand_final.is_complete {
        return Err(TournamentError::RoundIncomplete(grand_final.number));
    }
    let mut next = state.clone();
    next.phase = Phase::Finished;
    next.touch();
    log::info!("Tournament '{}' finished", next.metadata.tournament_name);
    Ok(next)
}

/// Explicit reset to a fresh Registration state (name and settings are kept).
pub fn reset(state: &TournamentState) -> TournamentState {
    TournamentState {
        settings: state.settings.clone(),
        ..TournamentState::new(state.metadata.tournament_name.clone())
    }
}
