//! Leader catalog and per-leader statistics over reported games.

use crate::models::Round;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Community strength rating of a leader.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum LeaderTier {
    A,
    B,
    C,
    #[serde(rename = "none")]
    Unrated,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expansion {
    Base,
    Ix,
    Uprising,
    Bloodlines,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct LeaderInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub tier: LeaderTier,
    pub expansion: Expansion,
}

const fn leader(id: &'static str, name: &'static str, tier: LeaderTier, expansion: Expansion) -> LeaderInfo {
    LeaderInfo { id, name, tier, expansion }
}

use Expansion::{Base, Bloodlines, Ix, Uprising};
use LeaderTier::{Unrated, A, B, C};

/// Every known leader. Results name leaders by `name`.
pub const LEADERS: &[LeaderInfo] = &[
    leader("paulAtreides", "Paul Atreides", Unrated, Base),
    leader("letoAtreides", "Duke Leto Atreides", B, Base),
    leader("memnonThorvald", "Earl Memnon Thorvald", Unrated, Base),
    leader("glossuRabban", "Glossu \"The Beast\" Rabban", A, Base),
    leader("vladimirHarkonnen", "Baron Vladimir Harkonnen", B, Base),
    leader("helenaRichese", "Helena Richese", Unrated, Base),
    leader("arianaThorvald", "Countess Ariana Thorvald", Unrated, Base),
    leader("ilbanRichese", "Count Ilban Richese", Unrated, Base),
    leader("armandEcaz", "Archduke Armand Ecaz", B, Base),
    leader("tessiaVernius", "Tessia Vernius", A, Ix),
    leader("ilesaEcaz_com", "Ilesa Ecaz (Community)", A, Ix),
    leader("stabanTuek", "Staban Tuek", A, Uprising),
    leader("amberMetulli", "Lady Amber Metulli", B, Uprising),
    leader("gurneyHalleck", "Gurney Halleck", B, Uprising),
    leader("margotFenring", "Lady Margot Fenring", C, Uprising),
    leader("irulanCorrino", "Princess Irulan", B, Uprising),
    leader("jessica", "Lady Jessica", C, Uprising),
    leader("feydRauthaHarkonnen", "Feyd-Rautha Harkonnen", C, Uprising),
    leader("shaddamCorrino", "Shaddam IV", C, Uprising),
    leader("muadDib", "Muad'Dib", C, Uprising),
    leader("yunaMoritani", "Princess Yuna Moritani", B, Uprising),
    leader("bl_Chani", "Chani", C, Bloodlines),
    leader("bl_Duncan", "Duncan Idaho", C, Bloodlines),
    leader("bl_Esmar", "Esmar Tuek", A, Bloodlines),
    leader("bl_Hasimir", "Count Hasimir Fenring", A, Bloodlines),
    leader("bl_Kota", "Kota Odax of Ix", A, Bloodlines),
    leader("bl_Liet", "Liet Kynes", Unrated, Bloodlines),
    leader("liet_com", "Liet Kynes (Community)", A, Bloodlines),
    leader("bl_Mohiam", "Gaius Helen Mohiam", C, Bloodlines),
    leader("bl_Piter", "Piter De Vries", Unrated, Bloodlines),
    leader("bl_Piter_com", "Piter De Vries (Community)", A, Bloodlines),
    leader("bl_Yrkoon", "Steersman Y'rkoon", C, Bloodlines),
];

/// Catalog entry for a leader display name.
pub fn leader_info(name: &str) -> Option<&'static LeaderInfo> {
    LEADERS.iter().find(|l| l.name == name)
}

pub fn leaders_by_tier(tier: LeaderTier) -> Vec<&'static LeaderInfo> {
    LEADERS.iter().filter(|l| l.tier == tier).collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderStat {
    pub leader: String,
    /// Catalog tier; leaders missing from the catalog are unrated.
    pub tier: LeaderTier,
    pub plays: u32,
    /// 1st-place finishes.
    pub wins: u32,
    /// 1st- and 2nd-place finishes.
    pub top2: u32,
    #[serde(rename = "totalVP")]
    pub total_vp: i32,
    /// Rounded to 2 decimals.
    pub avg_position: f64,
    /// Percent, rounded to 1 decimal.
    pub win_rate: f64,
}

#[derive(Default)]
struct Tally {
    plays: u32,
    wins: u32,
    top2: u32,
    total_vp: i32,
    position_sum: u32,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Leader stats over complete rounds, optionally limited to an inclusive
/// range of round numbers. Sorted by win rate, then plays, both descending.
pub fn leader_stats(rounds: &[Arc<Round>], from_round: Option<u32>, to_round: Option<u32>) -> Vec<LeaderStat> {
    let mut tallies: HashMap<&str, Tally> = HashMap::new();
    let in_range = |n: u32| from_round.map_or(true, |f| n >= f) && to_round.map_or(true, |t| n <= t);

    for round in rounds.iter().filter(|r| r.is_complete && in_range(r.number)) {
        for result in round.tables.iter().flat_map(|t| t.results.iter()) {
            let Some(leader) = result.leader.as_deref() else {
                continue;
            };
            let tally = tallies.entry(leader).or_default();
            tally.plays += 1;
            if result.position == 1 {
                tally.wins += 1;
            }
            if result.position <= 2 {
                tally.top2 += 1;
            }
            tally.total_vp = tally.total_vp.saturating_add(result.vp);
            tally.position_sum = tally.position_sum.saturating_add(result.position);
        }
    }

    let mut stats: Vec<LeaderStat> = tallies
        .into_iter()
        .map(|(leader, t)| LeaderStat {
            leader: leader.to_string(),
            tier: leader_info(leader).map_or(Unrated, |info| info.tier),
            plays: t.plays,
            wins: t.wins,
            top2: t.top2,
            total_vp: t.total_vp,
            avg_position: round_to(t.position_sum as f64 / t.plays as f64, 2),
            win_rate: round_to(t.wins as f64 / t.plays as f64 * 100.0, 1),
        })
        .collect();
    stats.sort_by(|a, b| {
        b.win_rate
            .total_cmp(&a.win_rate)
            .then_with(|| b.plays.cmp(&a.plays))
            .then_with(|| a.leader.cmp(&b.leader))
    });
    stats
}

/// Only the rows whose leader is rated `tier`.
pub fn filter_by_tier(stats: Vec<LeaderStat>, tier: LeaderTier) -> Vec<LeaderStat> {
    stats.into_iter().filter(|s| s.tier == tier).collect()
}
