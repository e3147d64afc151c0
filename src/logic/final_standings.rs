//! Final standings: bracket placement for the top cut, cumulative stats for everyone else.

use crate::logic::bracket::{BracketTemplate, Placement};
use crate::logic::standings::{compare_standings, rank_players, standings_table, Standing};
use crate::models::{Player, PlayerId, TournamentState};
use std::collections::HashMap;
use std::sync::Arc;

/// Overall ranking once the grand final is complete.
///
/// Players are grouped by the deepest bracket stage they reached, deepest
/// first. The grand final is ordered purely by its finishing positions; other
/// stages follow their template's [`Placement`] rule, with cumulative
/// standings as the tie-break. Players outside the top cut come last, by
/// cumulative standings. Without a completed grand final this is exactly
/// [`rank_players`].
pub fn final_standings(state: &TournamentState) -> Vec<Arc<Player>> {
    bracket_standings(state).unwrap_or_else(|| rank_players(&state.players))
}

/// `None` until the final stage of the configured bracket is complete.
fn bracket_standings(state: &TournamentState) -> Option<Vec<Arc<Player>>> {
    let template = BracketTemplate::for_cut(state.settings.top_cut).ok()?;
    let final_type = template.stages[template.final_stage()].round_type;
    if !state.round_of_type(final_type)?.is_complete {
        return None;
    }
    let ranked = rank_players(&state.players);

    // Deepest stage reached and the finish there.
    let mut reached: HashMap<&PlayerId, (usize, Option<u32>)> = HashMap::new();
    for (stage, stage_template) in template.stages.iter().enumerate() {
        let Some(round) = state.round_of_type(stage_template.round_type) else {
            continue;
        };
        for table in &round.tables {
            for id in &table.player_ids {
                reached.insert(id, (stage, table.position_of(id)));
            }
        }
    }

    let mut ordered = Vec::with_capacity(ranked.len());
    for stage in (0..template.stages.len()).rev() {
        let mut tier: Vec<(Option<u32>, &Arc<Player>)> = ranked
            .iter()
            .filter_map(|p| match reached.get(&p.id) {
                Some(&(s, position)) if s == stage => Some((position, p)),
                _ => None,
            })
            .collect();
        let by_finish = stage == template.final_stage()
            || template.stages[stage].placement == Placement::ByFinish;
        if by_finish {
            // Stable: equal finishes keep cumulative order.
            tier.sort_by_key(|(position, _)| position.unwrap_or(u32::MAX));
        } else {
            tier.sort_by(|a, b| compare_standings(a.1, b.1));
        }
        ordered.extend(tier.into_iter().map(|(_, p)| Arc::clone(p)));
    }
    ordered.extend(
        ranked
            .iter()
            .filter(|p| !reached.contains_key(&p.id))
            .cloned(),
    );
    Some(ordered)
}

/// Final standings as rows. Bracket ranks are strictly positional; before the
/// grand final completes this is the cumulative [`standings_table`].
pub fn final_standings_table(state: &TournamentState) -> Vec<Standing> {
    let Some(ordered) = bracket_standings(state) else {
        return standings_table(&state.players);
    };
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, player)| Standing {
            rank: i + 1,
            player,
            tied: false,
        })
        .collect()
}
