//! TournamentState (the aggregate root), its phase and settings, and errors.

use crate::models::player::{Player, PlayerId};
use crate::models::table::{Round, RoundType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Why a set of table results was rejected.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ResultError {
    /// Only 3- and 4-player tables are played.
    UnsupportedTableSize(usize),
    /// One result per seated player is required.
    WrongEntryCount { expected: usize, found: usize },
    PositionOutOfRange { position: u32, table_size: usize },
    DuplicatePosition(u32),
    NegativeVp(PlayerId),
    VpTooHigh { player_id: PlayerId, max: i32 },
    /// A result names a player who is not seated at the table.
    UnknownPlayer(PlayerId),
    DuplicatePlayer(PlayerId),
}

impl std::fmt::Display for ResultError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResultError::UnsupportedTableSize(n) => {
                write!(f, "Tables must seat 3 or 4 players (got {})", n)
            }
            ResultError::WrongEntryCount { expected, found } => {
                write!(f, "Each table must have exactly {} results (got {})", expected, found)
            }
            ResultError::PositionOutOfRange { position, table_size } => {
                write!(f, "Position {} is outside 1-{}", position, table_size)
            }
            ResultError::DuplicatePosition(p) => {
                write!(f, "All positions must be unique (position {} used twice)", p)
            }
            ResultError::NegativeVp(id) => write!(f, "Victory points cannot be negative (player {})", id),
            ResultError::VpTooHigh { player_id, max } => {
                write!(f, "Victory points cannot exceed {} (player {})", max, player_id)
            }
            ResultError::UnknownPlayer(id) => write!(f, "Player {} is not seated at this table", id),
            ResultError::DuplicatePlayer(id) => write!(f, "Player {} has more than one result", id),
        }
    }
}

impl std::error::Error for ResultError {}

/// Errors that can occur during tournament operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TournamentError {
    /// The tournament is not in a phase that allows this action.
    InvalidPhase { expected: Phase, actual: Phase },
    /// Not enough players to seat tables or fill the top cut.
    NotEnoughPlayers { required: usize, actual: usize },
    /// Player count that cannot be split into tables of 3 and 4.
    UnsupportedPlayerCount(usize),
    /// The previous round still has unreported tables.
    RoundIncomplete(u32),
    RoundNotFound(usize),
    TableNotFound(u32),
    /// The table has no reported results to score.
    TableIncomplete(u32),
    PlayerNotFound(PlayerId),
    /// A player with this name already exists (names are unique, case-insensitive).
    DuplicatePlayerName,
    EmptyName,
    InvalidSettings(String),
    /// All configured qualifying rounds have been generated.
    QualifyingFinished,
    /// Every bracket stage has already been generated.
    BracketComplete,
    /// A finishing position required to advance a player is missing.
    MissingPlacement { round: RoundType, table: u32, position: u32 },
    /// Malformed result entry; never partially applied.
    InvalidResults(ResultError),
    /// Structurally invalid state at the import boundary.
    InvalidState(String),
    Json(String),
    Csv(String),
}

impl std::fmt::Display for TournamentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TournamentError::InvalidPhase { expected, actual } => {
                write!(f, "Action requires phase {:?} (tournament is in {:?})", expected, actual)
            }
            TournamentError::NotEnoughPlayers { required, actual } => {
                write!(f, "Need at least {} players (have {})", required, actual)
            }
            TournamentError::UnsupportedPlayerCount(n) => {
                write!(f, "{} players cannot be seated at tables of 3 and 4", n)
            }
            TournamentError::RoundIncomplete(n) => write!(f, "Round {} is not complete", n),
            TournamentError::RoundNotFound(i) => write!(f, "Round index {} not found", i),
            TournamentError::TableNotFound(id) => write!(f, "Table {} not found", id),
            TournamentError::TableIncomplete(id) => write!(f, "Table {} has no results", id),
            TournamentError::PlayerNotFound(id) => write!(f, "Player {} not found", id),
            TournamentError::DuplicatePlayerName => write!(f, "A player with this name already exists"),
            TournamentError::EmptyName => write!(f, "Name cannot be empty"),
            TournamentError::InvalidSettings(msg) => write!(f, "Invalid settings: {}", msg),
            TournamentError::QualifyingFinished => write!(f, "All qualifying rounds have been played"),
            TournamentError::BracketComplete => write!(f, "All top-cut rounds have been generated"),
            TournamentError::MissingPlacement { round, table, position } => {
                write!(f, "No position {} recorded at {:?} table {}", position, round, table)
            }
            TournamentError::InvalidResults(e) => write!(f, "{}", e),
            TournamentError::InvalidState(msg) => write!(f, "Invalid tournament data: {}", msg),
            TournamentError::Json(msg) => write!(f, "JSON error: {}", msg),
            TournamentError::Csv(msg) => write!(f, "CSV error: {}", msg),
        }
    }
}

impl std::error::Error for TournamentError {}

impl From<ResultError> for TournamentError {
    fn from(e: ResultError) -> Self {
        TournamentError::InvalidResults(e)
    }
}

/// Current phase of the tournament. Only moves forward, except via reset.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Adding players; not started.
    #[default]
    Registration,
    /// Swiss qualifying rounds.
    Qualifying,
    /// Elimination bracket over the top cut.
    #[serde(alias = "top8")]
    TopCut,
    Finished,
}

pub const DEFAULT_TOURNAMENT_NAME: &str = "Dune Imperium Open";
pub const DEFAULT_QUALIFYING_ROUNDS: u32 = 4;
pub const DEFAULT_TOP_CUT: usize = 16;
pub const STATE_VERSION: &str = "1.0.0";

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub tournament_name: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub total_qualifying_rounds: u32,
    /// 8 or 16.
    pub top_cut: usize,
    /// Presentation flag carried for the UI; the engine ignores it.
    #[serde(default)]
    pub dramatic_reveal: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            total_qualifying_rounds: DEFAULT_QUALIFYING_ROUNDS,
            top_cut: DEFAULT_TOP_CUT,
            dramatic_reveal: false,
        }
    }
}

/// Full tournament state: roster, rounds, phase and settings.
///
/// Players and rounds sit behind `Arc` so producing a new state shares every
/// record that did not change.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentState {
    pub metadata: Metadata,
    pub players: Vec<Arc<Player>>,
    #[serde(default)]
    pub rounds: Vec<Arc<Round>>,
    #[serde(default)]
    pub phase: Phase,
    /// Number of the most recently generated round (0 before the first).
    #[serde(default)]
    pub current_round: u32,
    pub settings: Settings,
}

impl Default for TournamentState {
    fn default() -> Self {
        Self::new(DEFAULT_TOURNAMENT_NAME)
    }
}

impl TournamentState {
    /// Create a new tournament in Registration with no players.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            metadata: Metadata {
                version: STATE_VERSION.to_string(),
                timestamp: Utc::now(),
                tournament_name: name.into(),
            },
            players: Vec::new(),
            rounds: Vec::new(),
            phase: Phase::Registration,
            current_round: 0,
            settings: Settings::default(),
        }
    }

    /// Create a tournament with initial players. Still in Registration until started.
    pub fn with_players(players: Vec<Player>) -> Self {
        Self {
            players: players.into_iter().map(Arc::new).collect(),
            ..Self::default()
        }
    }

    pub fn player(&self, id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id).map(|p| p.as_ref())
    }

    /// Copy-on-write access to one player record.
    pub fn player_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .map(Arc::make_mut)
    }

    pub fn round(&self, index: usize) -> Result<&Round, TournamentError> {
        self.rounds
            .get(index)
            .map(|r| r.as_ref())
            .ok_or(TournamentError::RoundNotFound(index))
    }

    /// Copy-on-write access to one round.
    pub fn round_mut(&mut self, index: usize) -> Result<&mut Round, TournamentError> {
        self.rounds
            .get_mut(index)
            .map(Arc::make_mut)
            .ok_or(TournamentError::RoundNotFound(index))
    }

    pub fn last_round(&self) -> Option<&Round> {
        self.rounds.last().map(|r| r.as_ref())
    }

    /// First round of the given type, if generated.
    pub fn round_of_type(&self, round_type: RoundType) -> Option<&Round> {
        self.rounds
            .iter()
            .find(|r| r.round_type == round_type)
            .map(|r| r.as_ref())
    }

    pub fn completed_qualifying_rounds(&self) -> usize {
        self.rounds
            .iter()
            .filter(|r| r.round_type == RoundType::Qualifying && r.is_complete)
            .count()
    }

    pub fn qualifying_rounds(&self) -> usize {
        self.rounds
            .iter()
            .filter(|r| r.round_type == RoundType::Qualifying)
            .count()
    }

    /// Rounds belonging to the elimination phase, in play order.
    pub fn elimination_rounds(&self) -> Vec<&Round> {
        self.rounds
            .iter()
            .filter(|r| r.round_type.is_elimination())
            .map(|r| r.as_ref())
            .collect()
    }

    /// Appends a round and makes it current.
    pub fn push_round(&mut self, round: Round) {
        self.current_round = round.number;
        self.rounds.push(Arc::new(round));
    }

    pub fn touch(&mut self) {
        self.metadata.timestamp = Utc::now();
    }

    pub fn require_phase(&self, expected: Phase) -> Result<(), TournamentError> {
        if self.phase != expected {
            return Err(TournamentError::InvalidPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }
}
