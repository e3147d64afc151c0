//! Cumulative standings: the comparator every other ranking builds on.

use crate::models::{Player, TournamentState};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

/// Points descending, then total VP descending, then efficiency ascending.
///
/// Players equal on all three compare `Equal`; callers keep their input order
/// by using a stable sort.
pub fn compare_standings(a: &Player, b: &Player) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.total_vp.cmp(&a.total_vp))
        .then_with(|| a.efficiency.cmp(&b.efficiency))
}

/// Players sorted best-first. The input is left untouched.
pub fn rank_players(players: &[Arc<Player>]) -> Vec<Arc<Player>> {
    let mut sorted = players.to_vec();
    // `sort_by` is stable.
    sorted.sort_by(|a, b| compare_standings(a, b));
    sorted
}

/// The standings prefix that qualifies for the elimination phase.
pub fn top_cut(state: &TournamentState) -> Vec<Arc<Player>> {
    let mut ranked = rank_players(&state.players);
    ranked.truncate(state.settings.top_cut);
    ranked
}

/// One row of a rendered standings table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Standing {
    /// Competition rank: tied players share a rank and the next rank skips.
    pub rank: usize,
    pub player: Arc<Player>,
    /// True when equal on every comparator key with a neighbour.
    pub tied: bool,
}

/// Ranked rows with shared ranks for exact ties ("1, 2, 2, 4").
pub fn standings_table(players: &[Arc<Player>]) -> Vec<Standing> {
    let ordered = rank_players(players);
    let ties = |i: usize, j: usize| compare_standings(&ordered[i], &ordered[j]) == Ordering::Equal;
    let mut rows = Vec::with_capacity(ordered.len());
    let mut rank = 1;
    for i in 0..ordered.len() {
        let tied_prev = i > 0 && ties(i - 1, i);
        let tied_next = i + 1 < ordered.len() && ties(i, i + 1);
        if i > 0 && !tied_prev {
            rank = i + 1;
        }
        rows.push(Standing {
            rank,
            player: Arc::clone(&ordered[i]),
            tied: tied_prev || tied_next,
        });
    }
    rows
}
