//! Data structures for the tournament: players, tables, rounds, tournament state.

mod player;
mod table;
mod tournament;

pub use player::{Opponents, Player, PlayerId};
pub use table::{Round, RoundType, Table, TableResult};
pub use tournament::{
    Metadata, Phase, ResultError, Settings, TournamentError, TournamentState,
    DEFAULT_QUALIFYING_ROUNDS, DEFAULT_TOP_CUT, DEFAULT_TOURNAMENT_NAME, STATE_VERSION,
};
