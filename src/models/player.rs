//! Player and the opponent record used for anti-repeat pairing.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unique identifier for a player (used in tables, results and lookups).
pub type PlayerId = String;

/// Players already faced, counted per shared scored table.
///
/// Serialized as a list of ids with one entry per meeting, so a plain set of
/// ids reads back as one meeting each.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<PlayerId>", into = "Vec<PlayerId>")]
pub struct Opponents(BTreeMap<PlayerId, u32>);

impl Opponents {
    /// Record one more meeting with `id`.
    pub fn insert(&mut self, id: PlayerId) {
        *self.0.entry(id).or_insert(0) += 1;
    }

    /// Forget one meeting with `id`; the id disappears with its last meeting.
    pub fn remove_one(&mut self, id: &str) {
        if let Some(count) = self.0.get_mut(id) {
            *count -= 1;
            if *count == 0 {
                self.0.remove(id);
            }
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    /// Number of distinct players faced.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// How many scored tables were shared with `id`.
    pub fn meetings(&self, id: &str) -> u32 {
        self.0.get(id).copied().unwrap_or(0)
    }
}

impl From<Vec<PlayerId>> for Opponents {
    fn from(ids: Vec<PlayerId>) -> Self {
        let mut opponents = Opponents::default();
        for id in ids {
            opponents.insert(id);
        }
        opponents
    }
}

impl From<Opponents> for Vec<PlayerId> {
    fn from(opponents: Opponents) -> Self {
        opponents
            .0
            .into_iter()
            .flat_map(|(id, count)| std::iter::repeat(id).take(count as usize))
            .collect()
    }
}

/// A registered player and their cumulative tournament record.
///
/// Stats are only ever changed by the scoring functions in `logic::scoring`.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Tournament points from finishing positions.
    #[serde(default)]
    pub points: i32,
    /// Sum of in-game victory points.
    #[serde(default, rename = "totalVP")]
    pub total_vp: i32,
    /// Sum of finishing positions; lower is better.
    #[serde(default)]
    pub efficiency: i32,
    #[serde(default)]
    pub opponents: Opponents,
}

impl Player {
    /// Create a new player with the given id and name. Stats start at zero.
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into().trim().to_string(),
            points: 0,
            total_vp: 0,
            efficiency: 0,
            opponents: Opponents::default(),
        }
    }

    pub fn has_faced(&self, other: &str) -> bool {
        self.opponents.contains(other)
    }
}
