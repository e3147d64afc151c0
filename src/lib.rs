//! Dune Imperium tournament organizer: library with models, tournament logic and the HTTP API.

pub mod api;
pub mod logic;
pub mod models;

pub use logic::{
    add_player, advance_to_top_cut, apply_table_results, clear_table_results, final_standings,
    finish_tournament, generate_elimination_round, generate_grand_final,
    generate_qualifying_round, generate_redemption_round, generate_round, generate_semifinals,
    generate_top_cut_round, leader_stats, rank_players, remove_player, reset,
    revert_table_results, set_tournament_name, standings_table, start_tournament,
    submit_table_results, update_settings, validate_table_result, BracketTemplate,
};
pub use models::{
    Opponents, Phase, Player, PlayerId, ResultError, Round, RoundType, Settings, Table,
    TableResult, TournamentError, TournamentState,
};
