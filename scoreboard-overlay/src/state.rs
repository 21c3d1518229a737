use log::warn;
use scoreboard_common::stats::{PlayerId, WinsLosses};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayMode {
    /// MMR, the session score and the remote set record
    #[default]
    MatchBox,
    /// Only the combined win/loss count
    #[serde(rename = "WL")]
    WinLoss,
}

impl Display for DisplayMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MatchBox => write!(f, "MatchBox"),
            Self::WinLoss => write!(f, "WL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown display mode {0:?}, expected \"MatchBox\" or \"WL\"")]
pub struct UnknownDisplayMode(pub String);

impl FromStr for DisplayMode {
    type Err = UnknownDisplayMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "MatchBox" => Ok(Self::MatchBox),
            "WL" => Ok(Self::WinLoss),
            other => Err(UnknownDisplayMode(other.to_string())),
        }
    }
}

impl DisplayMode {
    /// Maps a `--dm`/`DM` value to a mode. Anything unrecognised is reported
    /// and yields `None`, leaving the configured mode alone.
    pub fn from_override(value: Option<&str>) -> Option<Self> {
        match value?.parse() {
            Ok(mode) => Some(mode),
            Err(e) => {
                warn!("{e}, ignoring");
                None
            }
        }
    }
}

/// The one synchronized view of the player's numbers. Remote fields stay
/// `None` until the first successful fetch; the session counter starts at zero
/// so there is always something to draw.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScoreboardState {
    pub display_mode: DisplayMode,
    pub player_id: Option<PlayerId>,
    pub player_mmr: Option<f64>,
    pub player_wins: Option<u32>,
    pub player_losses: Option<u32>,
    pub local_player_wins: u32,
    pub local_player_losses: u32,
}

impl ScoreboardState {
    pub fn with_mode(display_mode: DisplayMode) -> Self {
        Self {
            display_mode,
            ..Default::default()
        }
    }

    /// The lifetime record, if it has been fetched
    pub fn player_record(&self) -> Option<WinsLosses> {
        match (self.player_wins, self.player_losses) {
            (Some(wins), Some(losses)) => Some(WinsLosses::new(wins, losses)),
            _ => None,
        }
    }

    pub fn session_record(&self) -> WinsLosses {
        WinsLosses::new(self.local_player_wins, self.local_player_losses)
    }
}
