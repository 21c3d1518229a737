use crate::state::{DisplayMode, ScoreboardState};
use futures::try_join;
use log::{debug, info, warn};
use scoreboard_common::{
    client::{FetchFailed, StatsSource},
    stats::{BaseStats, WinsLosses},
};
use tokio::sync::watch;

/// Owns the canonical [`ScoreboardState`] and is the only thing that writes
/// it. Every commit is a single synchronous closure over the whole record, so
/// a refresh either lands completely or not at all.
pub struct SyncEngine<S> {
    source: S,
    player_tag: String,
    state: watch::Sender<ScoreboardState>,
}

/// Read-only handle on the canonical state, for whoever draws it
#[derive(Debug, Clone)]
pub struct StateReader {
    rx: watch::Receiver<ScoreboardState>,
}

impl StateReader {
    pub fn current(&self) -> ScoreboardState {
        self.rx.borrow().clone()
    }

    /// Returns the state only if a commit has landed since the last call.
    pub fn latest(&mut self) -> Option<ScoreboardState> {
        match self.rx.has_changed() {
            Ok(true) => Some(self.rx.borrow_and_update().clone()),
            _ => None,
        }
    }
}

impl<S: StatsSource> SyncEngine<S> {
    pub fn new(source: S, player_tag: impl Into<String>, initial: ScoreboardState) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            source,
            player_tag: player_tag.into(),
            state,
        }
    }

    pub fn reader(&self) -> StateReader {
        StateReader {
            rx: self.state.subscribe(),
        }
    }

    #[cfg(test)]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> ScoreboardState {
        self.state.borrow().clone()
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.state.borrow().display_mode
    }

    /// Takes effect on the next scheduler tick; nothing is fetched here.
    pub fn set_display_mode(&self, mode: DisplayMode) {
        self.state.send_if_modified(|state| {
            if state.display_mode == mode {
                return false;
            }
            info!("Display mode {} -> {mode}", state.display_mode);
            state.display_mode = mode;
            true
        });
    }

    /// Fetches the rating and lifetime record and commits them together.
    /// Returns whether anything was committed; a failed fetch is logged and
    /// leaves the state as it was.
    pub async fn refresh_player_data(&self) -> bool {
        match self.fetch_player_data().await {
            Ok((base_stats, record)) => {
                self.commit_player_data(base_stats, record);
                true
            }
            Err(e) => {
                warn!("Player data refresh skipped: {e}");
                false
            }
        }
    }

    async fn fetch_player_data(&self) -> Result<(BaseStats, WinsLosses), FetchFailed> {
        let known_id = self.state.borrow().player_id;

        match known_id {
            // Neither request needs the other's answer, so both go out at once
            Some(player_id) => try_join!(
                self.source.fetch_base_stats(&self.player_tag),
                self.source.fetch_player_win_loss(player_id)
            ),
            // The win/loss lookup is keyed by the id, which we don't have yet
            None => {
                let base_stats = self.source.fetch_base_stats(&self.player_tag).await?;
                let record = self.source.fetch_player_win_loss(base_stats.id).await?;
                Ok((base_stats, record))
            }
        }
    }

    fn commit_player_data(&self, base_stats: BaseStats, record: WinsLosses) {
        self.state.send_if_modified(|state| {
            if state.player_id.is_none() {
                info!(
                    "Resolved player tag {:?} to id {}",
                    self.player_tag, base_stats.id
                );
            }

            let next = ScoreboardState {
                player_id: Some(base_stats.id),
                player_mmr: Some(base_stats.rating()),
                player_wins: Some(record.wins),
                player_losses: Some(record.losses),
                ..state.clone()
            };
            if *state == next {
                return false;
            }

            debug!(
                "Committing player data: MMR {}, record {record}",
                base_stats.rating()
            );
            *state = next;
            true
        });
    }

    /// Fetches the session counter and commits it. Same failure handling as
    /// [`Self::refresh_player_data`].
    pub async fn refresh_session_scores(&self) -> bool {
        match self.source.fetch_session_win_loss().await {
            Ok(score) => {
                self.state.send_if_modified(|state| {
                    if state.session_record() == score {
                        return false;
                    }
                    debug!("Committing session score {score}");
                    state.local_player_wins = score.wins;
                    state.local_player_losses = score.losses;
                    true
                });
                true
            }
            Err(e) => {
                warn!("Session score refresh skipped: {e}");
                false
            }
        }
    }
}
