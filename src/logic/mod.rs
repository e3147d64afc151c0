//! Tournament business logic: standings, pairing, bracket, scoring, workflow.

pub mod bracket;
pub mod final_standings;
pub mod io;
pub mod leaders;
pub mod pairing;
pub mod scoring;
pub mod setup;
pub mod standings;

pub use bracket::{
    generate_elimination_round, generate_grand_final, generate_redemption_round,
    generate_semifinals, BracketTemplate, Placement, Seat,
};
pub use final_standings::{final_standings, final_standings_table};
pub use leaders::{
    filter_by_tier, leader_info, leader_stats, leaders_by_tier, LeaderInfo, LeaderStat, LeaderTier,
};
pub use pairing::{generate_qualifying_round, table_sizes};
pub use scoring::{
    apply_round_results, apply_table_results, points_for_position, revert_table_results,
    validate_table_result,
};
pub use setup::{
    add_player, advance_to_top_cut, clear_table_results, finish_tournament, generate_round,
    generate_top_cut_round, remove_player, reset, set_tournament_name, start_tournament,
    submit_table_results, update_settings,
};
pub use standings::{compare_standings, rank_players, standings_table, top_cut, Standing};
