//! Elimination phase over the top cut, driven by a declarative bracket template.
//!
//! A template is a list of stages. Each stage is one round; each of its tables
//! lists its seats, and a seat is either a standings seed or "the player who
//! finished at position P of table T in an earlier stage". A finish that no
//! later seat refers to is terminal for that player.
//!
//! Top 16 (double chance for the elite seeds):
//!
//! | stage | table          | seats                                   |
//! |-------|----------------|-----------------------------------------|
//! | 0     | Elite A        | seeds 1, 4, 5, 8                        |
//! | 0     | Elite B        | seeds 2, 3, 6, 7                        |
//! | 0     | Challenger C   | seeds 9, 10, 11, 12                     |
//! | 0     | Challenger D   | seeds 13, 14, 15, 16                    |
//! | 1     | Redemption 1   | A 2nd, A 3rd, A 4th, C 1st              |
//! | 1     | Redemption 2   | B 2nd, B 3rd, B 4th, D 1st              |
//! | 2     | Grand Final    | A 1st, B 1st, R1 1st, R2 1st            |
//!
//! Top 8 splits the semifinal tables into a winners final (top two of each)
//! and a losers final (bottom two of each); the grand final takes the top two
//! of both.

use crate::logic::standings::rank_players;
use crate::models::{PlayerId, Round, RoundType, Table, TournamentError, TournamentState};

/// Where a bracket seat is filled from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Seat {
    /// 1-based standings seed within the top cut.
    Seed(usize),
    /// Finisher at `position` of table index `table` (0-based) in stage `stage`.
    Finisher { stage: usize, table: usize, position: u32 },
}

/// How players whose run ends in a stage are ordered in the final standings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Placement {
    /// By finishing position in that stage, then cumulative standings.
    ByFinish,
    /// By cumulative standings only.
    ByStandings,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableTemplate {
    pub name: &'static str,
    pub seats: Vec<Seat>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StageTemplate {
    pub round_type: RoundType,
    pub tables: Vec<TableTemplate>,
    pub placement: Placement,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BracketTemplate {
    pub cut: usize,
    pub stages: Vec<StageTemplate>,
}

fn seeds(ids: &[usize]) -> Vec<Seat> {
    ids.iter().map(|&s| Seat::Seed(s)).collect()
}

fn fin(stage: usize, table: usize, position: u32) -> Seat {
    Seat::Finisher { stage, table, position }
}

fn table(name: &'static str, seats: Vec<Seat>) -> TableTemplate {
    TableTemplate { name, seats }
}

impl BracketTemplate {
    /// Template for a supported top-cut size (8 or 16).
    pub fn for_cut(cut: usize) -> Result<Self, TournamentError> {
        match cut {
            8 => Ok(Self::top_8()),
            16 => Ok(Self::top_16()),
            other => Err(TournamentError::InvalidSettings(format!(
                "top cut must be 8 or 16 (got {})",
                other
            ))),
        }
    }

    pub fn top_16() -> Self {
        Self {
            cut: 16,
            stages: vec![
                StageTemplate {
                    round_type: RoundType::Semifinal,
                    tables: vec![
                        table("Elite A", seeds(&[1, 4, 5, 8])),
                        table("Elite B", seeds(&[2, 3, 6, 7])),
                        table("Challenger C", seeds(&[9, 10, 11, 12])),
                        table("Challenger D", seeds(&[13, 14, 15, 16])),
                    ],
                    placement: Placement::ByStandings,
                },
                StageTemplate {
                    round_type: RoundType::WinnersFinal,
                    tables: vec![
                        table("Redemption 1", vec![fin(0, 0, 2), fin(0, 0, 3), fin(0, 0, 4), fin(0, 2, 1)]),
                        table("Redemption 2", vec![fin(0, 1, 2), fin(0, 1, 3), fin(0, 1, 4), fin(0, 3, 1)]),
                    ],
                    placement: Placement::ByFinish,
                },
                StageTemplate {
                    round_type: RoundType::GrandFinal,
                    tables: vec![table(
                        "Grand Final",
                        vec![fin(0, 0, 1), fin(0, 1, 1), fin(1, 0, 1), fin(1, 1, 1)],
                    )],
                    placement: Placement::ByFinish,
                },
            ],
        }
    }

    pub fn top_8() -> Self {
        Self {
            cut: 8,
            stages: vec![
                StageTemplate {
                    round_type: RoundType::Semifinal,
                    tables: vec![
                        table("Semifinal A", seeds(&[1, 4, 5, 8])),
                        table("Semifinal B", seeds(&[2, 3, 6, 7])),
                    ],
                    placement: Placement::ByStandings,
                },
                StageTemplate {
                    round_type: RoundType::WinnersFinal,
                    tables: vec![
                        table("Winners Final", vec![fin(0, 0, 1), fin(0, 1, 1), fin(0, 0, 2), fin(0, 1, 2)]),
                        table("Losers Final", vec![fin(0, 0, 3), fin(0, 1, 3), fin(0, 0, 4), fin(0, 1, 4)]),
                    ],
                    placement: Placement::ByStandings,
                },
                StageTemplate {
                    round_type: RoundType::GrandFinal,
                    tables: vec![table(
                        "Grand Final",
                        vec![fin(1, 0, 1), fin(1, 0, 2), fin(1, 1, 1), fin(1, 1, 2)],
                    )],
                    placement: Placement::ByFinish,
                },
            ],
        }
    }

    pub fn final_stage(&self) -> usize {
        self.stages.len().saturating_sub(1)
    }

    /// True if finishing at `position` of `table` in `stage` earns a later seat.
    pub fn advances(&self, stage: usize, table: usize, position: u32) -> bool {
        let target = Seat::Finisher { stage, table, position };
        self.stages
            .get(stage.saturating_add(1)..)
            .unwrap_or_default()
            .iter()
            .flat_map(|s| s.tables.iter())
            .any(|t| t.seats.contains(&target))
    }

    /// Build the tables of `stage`.
    ///
    /// `seeds` is the top cut in standings order (seed 1 first); `prior` holds
    /// the already-played elimination rounds in stage order. Every round a seat
    /// draws from must be complete.
    pub fn build_stage(
        &self,
        stage: usize,
        seeds: &[PlayerId],
        prior: &[&Round],
    ) -> Result<Vec<Table>, TournamentError> {
        let template = self.stages.get(stage).ok_or(TournamentError::BracketComplete)?;
        if stage > 0 {
            let previous = prior
                .get(stage - 1)
                .ok_or(TournamentError::RoundNotFound(stage - 1))?;
            if !previous.is_complete {
                return Err(TournamentError::RoundIncomplete(previous.number));
            }
        }

        let mut tables = Vec::with_capacity(template.tables.len());
        for (i, t) in template.tables.iter().enumerate() {
            let mut player_ids = Vec::with_capacity(t.seats.len());
            for seat in &t.seats {
                player_ids.push(self.resolve(*seat, seeds, prior)?);
            }
            log::debug!("{}: {:?}", t.name, player_ids);
            tables.push(Table::new(i as u32 + 1, player_ids));
        }
        Ok(tables)
    }

    fn resolve(
        &self,
        seat: Seat,
        seeds: &[PlayerId],
        prior: &[&Round],
    ) -> Result<PlayerId, TournamentError> {
        match seat {
            Seat::Seed(n) => seeds.get(n - 1).cloned().ok_or(TournamentError::NotEnoughPlayers {
                required: self.cut,
                actual: seeds.len(),
            }),
            Seat::Finisher { stage, table, position } => {
                let round = prior
                    .get(stage)
                    .ok_or(TournamentError::RoundNotFound(stage))?;
                let expected = self.stages[stage].round_type;
                if round.round_type != expected {
                    return Err(TournamentError::InvalidState(format!(
                        "round {} is {:?}, expected {:?}",
                        round.number, round.round_type, expected
                    )));
                }
                if !round.is_complete {
                    return Err(TournamentError::RoundIncomplete(round.number));
                }
                let missing = TournamentError::MissingPlacement {
                    round: expected,
                    table: table as u32 + 1,
                    position,
                };
                round
                    .tables
                    .get(table)
                    .and_then(|t| t.finisher(position))
                    .cloned()
                    .ok_or(missing)
            }
        }
    }
}

/// Next elimination round for the tournament's configured top cut.
///
/// Seeds come from the standings prefix; later stages read finishing positions
/// from the elimination rounds already in `state`. Re-invoking on the same
/// state yields the same tables.
pub fn generate_elimination_round(state: &TournamentState) -> Result<Round, TournamentError> {
    let template = BracketTemplate::for_cut(state.settings.top_cut)?;
    let prior = state.elimination_rounds();
    let stage = prior.len();
    let seeds = seed_ids(state, template.cut);
    let tables = template.build_stage(stage, &seeds, &prior)?;
    let number = state.last_round().map_or(1, |r| r.number + 1);
    Ok(Round::new(number, template.stages[stage].round_type, tables))
}

fn seed_ids(state: &TournamentState, cut: usize) -> Vec<PlayerId> {
    rank_players(&state.players)
        .into_iter()
        .take(cut)
        .map(|p| p.id.clone())
        .collect()
}

/// Top-16 semifinal tables: Elite A, Elite B, Challenger C, Challenger D.
pub fn generate_semifinals(state: &TournamentState) -> Result<Vec<Table>, TournamentError> {
    let template = BracketTemplate::top_16();
    let seeds = seed_ids(state, template.cut);
    template.build_stage(0, &seeds, &[])
}

/// Top-16 redemption tables from a completed semifinal round.
pub fn generate_redemption_round(semifinal: &Round) -> Result<Vec<Table>, TournamentError> {
    BracketTemplate::top_16().build_stage(1, &[], &[semifinal])
}

/// Top-16 grand final from completed semifinal and redemption rounds.
pub fn generate_grand_final(semifinal: &Round, redemption: &Round) -> Result<Table, TournamentError> {
    BracketTemplate::top_16()
        .build_stage(2, &[], &[semifinal, redemption])?
        .pop()
        .ok_or(TournamentError::BracketComplete)
}
