//! Swiss qualifying rounds: table sizes, point brackets and greedy seating.

use crate::logic::standings::rank_players;
use crate::models::{Player, PlayerId, Table, TournamentError, TournamentState};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Smallest field that can be seated.
pub const MIN_PLAYERS: usize = 4;

/// Table sizes for `n` players: tables of 4 first, then the 3-player descent tables.
///
/// `n % 4` of 1, 2, 3 gives 3, 2, 1 tables of three. Five players cannot be
/// seated at tables of 3 and 4 at all.
pub fn table_sizes(n: usize) -> Result<Vec<usize>, TournamentError> {
    if n < MIN_PLAYERS {
        return Err(TournamentError::NotEnoughPlayers {
            required: MIN_PLAYERS,
            actual: n,
        });
    }
    let tables_of_3 = match n % 4 {
        0 => 0,
        1 => 3,
        2 => 2,
        _ => 1,
    };
    if tables_of_3 * 3 > n {
        return Err(TournamentError::UnsupportedPlayerCount(n));
    }
    let tables_of_4 = (n - tables_of_3 * 3) / 4;
    let mut sizes = vec![4; tables_of_4];
    sizes.extend(std::iter::repeat(3).take(tables_of_3));
    Ok(sizes)
}

/// Seating order: point brackets from highest to lowest, shuffled within each bracket.
///
/// In round 1 everyone is on zero points, so this is a full shuffle.
pub fn bracket_order<R: Rng + ?Sized>(players: &[&Player], rng: &mut R) -> Vec<PlayerId> {
    let mut brackets: Vec<(i32, Vec<PlayerId>)> = Vec::new();
    for p in players {
        match brackets.iter_mut().find(|(pts, _)| *pts == p.points) {
            Some((_, ids)) => ids.push(p.id.clone()),
            None => brackets.push((p.points, vec![p.id.clone()])),
        }
    }
    brackets.sort_by(|a, b| b.0.cmp(&a.0));

    let mut order = Vec::with_capacity(players.len());
    for (_, mut ids) in brackets {
        ids.shuffle(rng);
        order.extend(ids);
    }
    order
}

/// Generate the tables for the next qualifying round.
///
/// Each player, in bracket order, takes the open table with the fewest players
/// they have already faced; ties go to the earliest table. This is a greedy
/// best effort: repeats are allowed when no clean seat is left.
pub fn generate_qualifying_round<R: Rng + ?Sized>(
    state: &TournamentState,
    rng: &mut R,
) -> Result<Vec<Table>, TournamentError> {
    let sizes = table_sizes(state.players.len())?;

    let ranked = rank_players(&state.players);
    let ranked_refs: Vec<&Player> = ranked.iter().map(|p| p.as_ref()).collect();
    let order = bracket_order(&ranked_refs, rng);
    let by_id: HashMap<&str, &Player> = ranked_refs.iter().map(|p| (p.id.as_str(), *p)).collect();

    let mut seats: Vec<Vec<PlayerId>> = sizes.iter().map(|&n| Vec::with_capacity(n)).collect();
    let mut repeats = 0;
    for id in order {
        let player = by_id[id.as_str()];
        let best = seats
            .iter()
            .enumerate()
            .filter(|(t, seated)| seated.len() < sizes[*t])
            .map(|(t, seated)| {
                let conflicts = seated.iter().filter(|other| player.has_faced(other)).count();
                (t, conflicts)
            })
            // min_by_key keeps the first of equal minima.
            .min_by_key(|&(_, conflicts)| conflicts);

        // Table capacities sum to the player count, so a seat is always open.
        if let Some((t, conflicts)) = best {
            repeats += conflicts;
            seats[t].push(id);
        }
    }

    if repeats > 0 {
        log::warn!("Qualifying pairing could not avoid {} repeat pairing(s)", repeats);
    }
    log::debug!(
        "Paired {} players into {} tables ({:?})",
        state.players.len(),
        seats.len(),
        sizes
    );

    Ok(seats
        .into_iter()
        .filter(|seated| !seated.is_empty())
        .enumerate()
        .map(|(i, seated)| Table::new(i as u32 + 1, seated))
        .collect())
}
