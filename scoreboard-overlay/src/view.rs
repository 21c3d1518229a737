use crate::state::{DisplayMode, ScoreboardState};
use scoreboard_common::stats::WinsLosses;

/// What the overlay shows for a given state. Anything not listed in a variant
/// is hidden in that mode.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreboardView {
    MatchBox {
        mmr: Option<f64>,
        session: WinsLosses,
        /// The remote record on its own, the session is not added in
        set_record: Option<WinsLosses>,
    },
    WinLoss {
        /// Remote record plus the session counter
        total: WinsLosses,
    },
}

impl ScoreboardView {
    // The two modes merge differently: WL adds the session onto the lifetime
    // record, MatchBox shows the lifetime record untouched next to the session.
    pub fn project(state: &ScoreboardState) -> Self {
        match state.display_mode {
            DisplayMode::MatchBox => Self::MatchBox {
                mmr: state.player_mmr,
                session: state.session_record(),
                set_record: state.player_record(),
            },
            DisplayMode::WinLoss => Self::WinLoss {
                total: WinsLosses::new(
                    state
                        .player_wins
                        .unwrap_or(0)
                        .saturating_add(state.local_player_wins),
                    state
                        .player_losses
                        .unwrap_or(0)
                        .saturating_add(state.local_player_losses),
                ),
            },
        }
    }

    /// The text lines the renderer draws, top to bottom
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::MatchBox {
                mmr,
                session,
                set_record,
            } => vec![
                match mmr {
                    Some(mmr) => format!("MMR: {}", mmr.round()),
                    None => String::from("MMR: -"),
                },
                format!("| {}    {} |", session.wins, session.losses),
                match set_record {
                    Some(record) => record.to_string(),
                    None => String::from("- W - - L"),
                },
            ],
            Self::WinLoss { total } => vec![total.to_string()],
        }
    }
}
