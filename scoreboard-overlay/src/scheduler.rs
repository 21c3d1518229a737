use crate::{engine::SyncEngine, state::DisplayMode};
use log::{debug, info, trace};
use scoreboard_common::client::StatsSource;
use std::sync::Arc;
use tokio::{
    task::{self, JoinHandle},
    time::{Duration, Instant, MissedTickBehavior, interval_at},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periods {
    pub player_data: Duration,
    pub session_scores: Duration,
}

impl Default for Periods {
    fn default() -> Self {
        Self {
            player_data: Duration::from_secs(15),
            session_scores: Duration::from_secs(1),
        }
    }
}

/// The two refresh cycles. Dropping or stopping this ends the cycles, but a
/// refresh that has already been spawned still runs to completion.
#[derive(Debug)]
pub struct Scheduler {
    player_data_join: JoinHandle<()>,
    session_scores_join: JoinHandle<()>,
}

impl Scheduler {
    /// Applies the startup mode override, kicks off one player data refresh
    /// whatever the mode, then starts both cycles. Must be called from within
    /// a tokio runtime.
    pub fn start<S: StatsSource + 'static>(
        engine: Arc<SyncEngine<S>>,
        mode_override: Option<DisplayMode>,
        periods: Periods,
    ) -> Self {
        if let Some(mode) = mode_override {
            engine.set_display_mode(mode);
        }

        info!(
            "Starting refresh cycles: player data every {:?}, session score every {:?}",
            periods.player_data, periods.session_scores
        );
        spawn_player_data_refresh(&engine);

        let player_data_join = task::spawn(player_data_cycle(engine.clone(), periods.player_data));
        let session_scores_join = task::spawn(session_scores_cycle(engine, periods.session_scores));

        Self {
            player_data_join,
            session_scores_join,
        }
    }

    pub fn stop(&self) {
        debug!("Stopping refresh cycles");
        self.player_data_join.abort();
        self.session_scores_join.abort();
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

// Refreshes run in their own task so that aborting a cycle never cancels a
// fetch that is already in flight.
fn spawn_player_data_refresh<S: StatsSource + 'static>(engine: &Arc<SyncEngine<S>>) {
    let engine = engine.clone();
    task::spawn(async move {
        engine.refresh_player_data().await;
    });
}

fn spawn_session_scores_refresh<S: StatsSource + 'static>(engine: &Arc<SyncEngine<S>>) {
    let engine = engine.clone();
    task::spawn(async move {
        engine.refresh_session_scores().await;
    });
}

fn ticker(period: Duration) -> tokio::time::Interval {
    // First tick one period from now, the startup refresh covers time zero
    let mut ticks = interval_at(Instant::now() + period, period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticks
}

async fn player_data_cycle<S: StatsSource + 'static>(engine: Arc<SyncEngine<S>>, period: Duration) {
    let mut ticks = ticker(period);
    loop {
        ticks.tick().await;
        let mode = engine.display_mode();
        if mode != DisplayMode::MatchBox {
            trace!("Player data not shown in {mode} mode, skipping refresh");
            continue;
        }
        spawn_player_data_refresh(&engine);
    }
}

async fn session_scores_cycle<S: StatsSource + 'static>(
    engine: Arc<SyncEngine<S>>,
    period: Duration,
) {
    let mut ticks = ticker(period);
    loop {
        ticks.tick().await;
        spawn_session_scores_refresh(&engine);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        state::ScoreboardState,
        test_support::{Event, ScriptedSource},
    };
    use scoreboard_common::stats::{BaseStats, SkillRating, WinsLosses};
    use tokio::time::sleep;

    fn engine(initial: ScoreboardState) -> Arc<SyncEngine<ScriptedSource>> {
        let source = ScriptedSource::default();
        source.set_base_stats(Some(BaseStats {
            id: 42,
            skill_rating: SkillRating { rating: 1500.0 },
        }));
        source.set_player_win_loss(Some(WinsLosses::new(10, 3)));
        source.set_session_win_loss(Some(WinsLosses::new(2, 1)));
        Arc::new(SyncEngine::new(source, "some-player", initial))
    }

    fn base_stats_calls(engine: &SyncEngine<ScriptedSource>) -> usize {
        engine
            .source()
            .count(|e| matches!(e, Event::BaseStatsIssued(_)))
    }

    fn session_calls(engine: &SyncEngine<ScriptedSource>) -> usize {
        engine.source().count(|e| *e == Event::SessionIssued)
    }

    fn periods() -> Periods {
        Periods {
            player_data: Duration::from_secs(15),
            session_scores: Duration::from_secs(1),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_match_box_runs_both_cycles() {
        let engine = engine(ScoreboardState::default());
        let _scheduler = Scheduler::start(engine.clone(), None, periods());

        sleep(Duration::from_millis(60_500)).await;

        // One startup refresh plus ticks at 15, 30, 45 and 60 seconds
        assert_eq!(base_stats_calls(&engine), 5);
        assert_eq!(session_calls(&engine), 60);

        let state = engine.snapshot();
        assert_eq!(state.player_id, Some(42));
        assert_eq!(state.session_record(), WinsLosses::new(2, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_win_loss_mode_skips_player_data_ticks() {
        let engine = engine(ScoreboardState::default());
        let _scheduler = Scheduler::start(engine.clone(), Some(DisplayMode::WinLoss), periods());

        sleep(Duration::from_millis(500)).await;
        // The startup refresh happens whatever the mode
        assert_eq!(base_stats_calls(&engine), 1);
        assert_eq!(engine.snapshot().player_id, Some(42));

        sleep(Duration::from_secs(60)).await;
        assert_eq!(base_stats_calls(&engine), 1);
        assert_eq!(engine.source().count(|e| matches!(e, Event::WinLossIssued(_))), 1);
        assert_eq!(session_calls(&engine), 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mode_change_is_picked_up_on_next_tick() {
        let engine = engine(ScoreboardState::default());
        let _scheduler = Scheduler::start(engine.clone(), None, periods());

        sleep(Duration::from_millis(15_500)).await;
        assert_eq!(base_stats_calls(&engine), 2);

        engine.set_display_mode(DisplayMode::WinLoss);
        sleep(Duration::from_secs(30)).await;
        assert_eq!(base_stats_calls(&engine), 2);

        engine.set_display_mode(DisplayMode::MatchBox);
        sleep(Duration::from_secs(15)).await;
        assert_eq!(base_stats_calls(&engine), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_mode_override_applies_before_anything_else() {
        let engine = engine(ScoreboardState::default());
        let mut reader = engine.reader();
        let _scheduler = Scheduler::start(engine.clone(), Some(DisplayMode::WinLoss), periods());

        let first = reader.latest().expect("override should be committed");
        assert_eq!(first.display_mode, DisplayMode::WinLoss);
        assert_eq!(first.player_id, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_ends_ticks_but_not_in_flight_fetches() {
        let engine = engine(ScoreboardState::default());
        engine.source().set_session_delay(Some(Duration::from_secs(2)));
        let scheduler = Scheduler::start(engine.clone(), None, periods());

        // The first session tick fires at 1s and its answer lands at 3s
        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(session_calls(&engine), 1);
        assert_eq!(engine.snapshot().local_player_wins, 0);

        scheduler.stop();
        sleep(Duration::from_secs(30)).await;

        assert_eq!(session_calls(&engine), 1);
        assert_eq!(base_stats_calls(&engine), 1);
        assert_eq!(engine.snapshot().session_record(), WinsLosses::new(2, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_end_cycles() {
        let engine = engine(ScoreboardState::default());
        engine.source().set_session_win_loss(None);
        let _scheduler = Scheduler::start(engine.clone(), None, periods());

        sleep(Duration::from_millis(3_500)).await;
        assert_eq!(session_calls(&engine), 3);
        assert_eq!(engine.snapshot().session_record(), WinsLosses::default());

        engine.source().set_session_win_loss(Some(WinsLosses::new(5, 0)));
        sleep(Duration::from_secs(1)).await;
        assert_eq!(engine.snapshot().session_record(), WinsLosses::new(5, 0));
    }
}
