use scoreboard_common::{
    client::{FetchFailed, Resource, StatsSource},
    stats::{BaseStats, PlayerId, WinsLosses},
};
use std::{
    future::Future,
    io,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::Barrier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    BaseStatsIssued(String),
    BaseStatsAnswered,
    WinLossIssued(PlayerId),
    SessionIssued,
}

/// A `StatsSource` that answers from whatever the test last set, and keeps a
/// log of what was asked of it. `None` answers fail.
#[derive(Default)]
pub struct ScriptedSource {
    base_stats: Mutex<Option<BaseStats>>,
    player_win_loss: Mutex<Option<WinsLosses>>,
    session_win_loss: Mutex<Option<WinsLosses>>,
    session_delay: Mutex<Option<Duration>>,
    rendezvous: Option<Arc<Barrier>>,
    events: Mutex<Vec<Event>>,
}

impl ScriptedSource {
    /// The player data requests each wait until the other has been issued
    pub fn with_rendezvous() -> Self {
        Self {
            rendezvous: Some(Arc::new(Barrier::new(2))),
            ..Default::default()
        }
    }

    pub fn set_base_stats(&self, answer: Option<BaseStats>) {
        *self.base_stats.lock().unwrap() = answer;
    }

    pub fn set_player_win_loss(&self, answer: Option<WinsLosses>) {
        *self.player_win_loss.lock().unwrap() = answer;
    }

    pub fn set_session_win_loss(&self, answer: Option<WinsLosses>) {
        *self.session_win_loss.lock().unwrap() = answer;
    }

    pub fn set_session_delay(&self, delay: Option<Duration>) {
        *self.session_delay.lock().unwrap() = delay;
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, matches: impl Fn(&Event) -> bool) -> usize {
        self.events.lock().unwrap().iter().filter(|e| matches(e)).count()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

fn scripted_failure(resource: Resource) -> FetchFailed {
    FetchFailed::new(resource, io::Error::other("scripted failure"))
}

impl StatsSource for ScriptedSource {
    fn fetch_base_stats(
        &self,
        player_tag: &str,
    ) -> impl Future<Output = Result<BaseStats, FetchFailed>> + Send {
        self.record(Event::BaseStatsIssued(player_tag.to_string()));
        let answer = *self.base_stats.lock().unwrap();
        let rendezvous = self.rendezvous.clone();

        async move {
            if let Some(barrier) = rendezvous {
                barrier.wait().await;
            }
            tokio::task::yield_now().await;
            self.record(Event::BaseStatsAnswered);
            answer.ok_or_else(|| scripted_failure(Resource::BaseStats))
        }
    }

    fn fetch_player_win_loss(
        &self,
        player_id: PlayerId,
    ) -> impl Future<Output = Result<WinsLosses, FetchFailed>> + Send {
        self.record(Event::WinLossIssued(player_id));
        let answer = *self.player_win_loss.lock().unwrap();
        let rendezvous = self.rendezvous.clone();

        async move {
            if let Some(barrier) = rendezvous {
                barrier.wait().await;
            }
            answer.ok_or_else(|| scripted_failure(Resource::PlayerWinLoss))
        }
    }

    fn fetch_session_win_loss(&self) -> impl Future<Output = Result<WinsLosses, FetchFailed>> + Send {
        self.record(Event::SessionIssued);
        let answer = *self.session_win_loss.lock().unwrap();
        let delay = *self.session_delay.lock().unwrap();

        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            answer.ok_or_else(|| scripted_failure(Resource::SessionWinLoss))
        }
    }
}
