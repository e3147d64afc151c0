//! Table, TableResult, Round and RoundType.

use crate::models::player::PlayerId;
use serde::{Deserialize, Serialize};

/// One player's finish at a table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableResult {
    pub player_id: PlayerId,
    /// 1-based finishing position, unique within the table.
    pub position: u32,
    /// Raw in-game victory points.
    pub vp: i32,
    /// Leader played in this game; metadata only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leader: Option<String>,
}

impl TableResult {
    pub fn new(player_id: impl Into<PlayerId>, position: u32, vp: i32) -> Self {
        Self {
            player_id: player_id.into(),
            position,
            vp,
            leader: None,
        }
    }

    pub fn with_leader(mut self, leader: impl Into<String>) -> Self {
        self.leader = Some(leader.into());
        self
    }
}

/// A group of 3 or 4 players seated for one game.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    /// Unique within its round, starting at 1.
    pub id: u32,
    pub player_ids: Vec<PlayerId>,
    #[serde(default)]
    pub results: Vec<TableResult>,
    #[serde(default)]
    pub is_complete: bool,
}

impl Table {
    /// Create an empty (unplayed) table.
    pub fn new(id: u32, player_ids: Vec<PlayerId>) -> Self {
        Self {
            id,
            player_ids,
            results: Vec::new(),
            is_complete: false,
        }
    }

    pub fn size(&self) -> usize {
        self.player_ids.len()
    }

    pub fn seats(&self, player_id: &str) -> bool {
        self.player_ids.iter().any(|id| id == player_id)
    }

    /// Player who finished at `position`, if results are in.
    pub fn finisher(&self, position: u32) -> Option<&PlayerId> {
        self.results
            .iter()
            .find(|r| r.position == position)
            .map(|r| &r.player_id)
    }

    pub fn position_of(&self, player_id: &str) -> Option<u32> {
        self.results
            .iter()
            .find(|r| r.player_id == player_id)
            .map(|r| r.position)
    }
}

/// Stage of the tournament a round belongs to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundType {
    Qualifying,
    Semifinal,
    /// Second bracket stage: redemption tables (top 16) or winners/losers split (top 8).
    #[serde(alias = "redemption")]
    WinnersFinal,
    LosersFinal,
    GrandFinal,
}

impl RoundType {
    pub fn is_elimination(self) -> bool {
        self != RoundType::Qualifying
    }
}

/// All tables played simultaneously before results are reported.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub number: u32,
    pub tables: Vec<Table>,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(rename = "type")]
    pub round_type: RoundType,
}

impl Round {
    pub fn new(number: u32, round_type: RoundType, tables: Vec<Table>) -> Self {
        let is_complete = !tables.is_empty() && tables.iter().all(|t| t.is_complete);
        Self {
            number,
            tables,
            is_complete,
            round_type,
        }
    }

    pub fn table(&self, table_id: u32) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == table_id)
    }

    /// Recompute `is_complete` from the tables.
    pub fn refresh_completion(&mut self) {
        self.is_complete = !self.tables.is_empty() && self.tables.iter().all(|t| t.is_complete);
    }
}
