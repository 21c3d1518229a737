use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable numeric identity the stats backend assigns to a player tag
pub type PlayerId = u64;

#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct SkillRating {
    pub rating: f64,
}

/// Response of the base stats resource. The backend sends a much larger user
/// record, only the fields needed here are decoded.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct BaseStats {
    pub id: PlayerId,
    #[serde(rename = "skillRating")]
    pub skill_rating: SkillRating,
}

impl BaseStats {
    pub fn rating(&self) -> f64 {
        self.skill_rating.rating
    }
}

/// A win/loss pair, used both for the lifetime record and the session counter
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub struct WinsLosses {
    pub wins: u32,
    pub losses: u32,
}

impl WinsLosses {
    pub const fn new(wins: u32, losses: u32) -> Self {
        Self { wins, losses }
    }
}

impl Display for WinsLosses {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} W - {} L", self.wins, self.losses)
    }
}
