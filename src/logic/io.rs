//! JSON import/export of the full state, CSV rosters and CSV standings.

use crate::logic::bracket::BracketTemplate;
use crate::logic::scoring::validate_for_table;
use crate::logic::standings::Standing;
use crate::models::{TournamentError, TournamentState};
use std::collections::HashSet;
use std::io::{Read, Write};

pub fn to_json(state: &TournamentState) -> Result<String, TournamentError> {
    serde_json::to_string_pretty(state).map_err(|e| TournamentError::Json(e.to_string()))
}

/// Parse and structurally validate a persisted tournament.
pub fn from_json(json: &str) -> Result<TournamentState, TournamentError> {
    let state: TournamentState =
        serde_json::from_str(json).map_err(|e| TournamentError::Json(e.to_string()))?;
    validate_state(&state)?;
    Ok(state)
}

/// Structural checks applied to any state crossing the API boundary.
pub fn validate_state(state: &TournamentState) -> Result<(), TournamentError> {
    let invalid = |msg: String| Err(TournamentError::InvalidState(msg));

    BracketTemplate::for_cut(state.settings.top_cut)?;

    let mut ids = HashSet::new();
    for p in &state.players {
        if !ids.insert(p.id.as_str()) {
            return invalid(format!("duplicate player id {}", p.id));
        }
    }

    let mut last_number = 0;
    for round in &state.rounds {
        if round.number <= last_number {
            return invalid(format!("round number {} is out of order", round.number));
        }
        last_number = round.number;

        let mut seated = HashSet::new();
        let mut table_ids = HashSet::new();
        for table in &round.tables {
            if !table_ids.insert(table.id) {
                return invalid(format!("round {} repeats table id {}", round.number, table.id));
            }
            if !(3..=4).contains(&table.size()) {
                return invalid(format!(
                    "round {} table {} seats {} players",
                    round.number,
                    table.id,
                    table.size()
                ));
            }
            for id in &table.player_ids {
                if !ids.contains(id.as_str()) {
                    return invalid(format!("round {} seats unknown player {}", round.number, id));
                }
                if !seated.insert(id.as_str()) {
                    return invalid(format!("round {} seats player {} twice", round.number, id));
                }
            }
            if !table.results.is_empty() {
                validate_for_table(table, &table.results)?;
            }
            if table.is_complete && table.results.is_empty() {
                return invalid(format!(
                    "round {} table {} is complete without results",
                    round.number, table.id
                ));
            }
        }
    }
    Ok(())
}

/// Player names from a CSV roster: first column, optional `name` header, blank rows skipped.
pub fn roster_from_csv<R: Read>(reader: R) -> Result<Vec<String>, TournamentError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut names = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| TournamentError::Csv(e.to_string()))?;
        let Some(name) = record.get(0).filter(|n| !n.is_empty()) else {
            continue;
        };
        if i == 0 && name.eq_ignore_ascii_case("name") {
            continue;
        }
        names.push(name.to_string());
    }
    Ok(names)
}

/// Write standings rows as `rank,name,points,total_vp,efficiency`.
pub fn standings_to_csv<W: Write>(standings: &[Standing], writer: W) -> Result<(), TournamentError> {
    let csv_err = |e: csv::Error| TournamentError::Csv(e.to_string());
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["rank", "name", "points", "total_vp", "efficiency"])
        .map_err(csv_err)?;
    for row in standings {
        wtr.write_record([
            row.rank.to_string(),
            row.player.name.clone(),
            row.player.points.to_string(),
            row.player.total_vp.to_string(),
            row.player.efficiency.to_string(),
        ])
        .map_err(csv_err)?;
    }
    wtr.flush().map_err(|e| TournamentError::Csv(e.to_string()))?;
    Ok(())
}
