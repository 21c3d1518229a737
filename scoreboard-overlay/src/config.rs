use crate::{scheduler::Periods, state::DisplayMode};
use scoreboard_common::{client::SessionSource, session_file::SessionScoreFile};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub stats_url: String,
    pub player_tag: String,
    /// Read the session counter from this file instead of asking the backend
    pub session_file: Option<PathBuf>,
    pub display_mode: DisplayMode,
    pub player_data_period_secs: u64,
    pub session_period_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stats_url: String::from("http://127.0.0.1:5000"),
            player_tag: String::new(),
            session_file: None,
            display_mode: DisplayMode::MatchBox,
            player_data_period_secs: 15,
            session_period_secs: 1,
            connect_timeout_secs: 20,
        }
    }
}

impl AppConfig {
    pub fn periods(&self) -> Periods {
        Periods {
            player_data: Duration::from_secs(self.player_data_period_secs.max(1)),
            session_scores: Duration::from_secs(self.session_period_secs.max(1)),
        }
    }

    pub fn session_source(&self) -> SessionSource {
        match &self.session_file {
            Some(path) => SessionSource::File(SessionScoreFile::new(path.clone())),
            None => SessionSource::Http,
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}
