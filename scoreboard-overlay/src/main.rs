use clap::Parser;
use engine::SyncEngine;
use log::{LevelFilter, error, info, warn};
#[cfg(debug_assertions)]
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::{
    append::rolling_file::{
        RollingFileAppender,
        policy::compound::{
            CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
        },
    },
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use macroquad::prelude::*;
use scheduler::{Periods, Scheduler};
use scoreboard_common::client::StatsClient;
use state::{DisplayMode, ScoreboardState};
use std::{path::PathBuf, sync::Arc};
use view::ScoreboardView;

mod config;
mod engine;
mod render;
mod scheduler;
mod state;
mod view;

#[cfg(test)]
mod test_support;

use config::AppConfig;
use render::window_conf;

const APP_NAME: &str = "scoreboard-overlay";

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(long)]
    /// Directory within which log files will be placed, default is platform dependent
    log_location: Option<PathBuf>,

    #[clap(long, default_value = "5000000")]
    /// Max size in bytes that a log file is allowed to reach before being rolled over
    log_max_file_size: u64,

    #[clap(long, default_value = "3")]
    /// Number of archived logs to keep
    num_old_logs: u32,

    #[clap(long = "dm", env = "DM")]
    /// Display mode to start in, "MatchBox" or "WL"
    display_mode: Option<String>,

    #[clap(long, env = "PLAYER_TAG")]
    /// Player tag to look up, overrides the config file
    player_tag: Option<String>,
}

#[macroquad::main(window_conf())]
async fn main() {
    let args = Cli::parse();
    init_logging(&args);

    let mut config: AppConfig = match confy::load(APP_NAME, None) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to read config file, overwriting with default. Error: {e}");
            let config = AppConfig::default();
            if let Err(e) = confy::store(APP_NAME, None, &config) {
                error!("Failed to store default config: {e}");
            }
            config
        }
    };
    if let Some(tag) = args.player_tag {
        config.player_tag = tag;
    }
    if config.player_tag.is_empty() {
        warn!("No player tag configured, player data lookups will fail");
    }

    let mode_override = DisplayMode::from_override(args.display_mode.as_deref());

    let client = StatsClient::new(
        &config.stats_url,
        config.session_source(),
        config.connect_timeout(),
    )
    .expect("Couldn't create HTTP client!");
    let engine = Arc::new(SyncEngine::new(
        client,
        config.player_tag.clone(),
        ScoreboardState::with_mode(config.display_mode),
    ));
    let mut reader = engine.reader();

    let periods = config.periods();
    let net_worker = std::thread::spawn(move || {
        networking_thread(engine, mode_override, periods);
    });

    let mut view = ScoreboardView::project(&reader.current());

    loop {
        assert!(!net_worker.is_finished(), "Networking thread panicked!");
        clear_background(BLACK);

        if let Some(state) = reader.latest() {
            view = ScoreboardView::project(&state);
        }
        render::draw(&view);

        next_frame().await;
    }
}

/// Runs the refresh cycles on a single-threaded runtime for the life of the process
#[tokio::main(flavor = "current_thread")]
async fn networking_thread(
    engine: Arc<SyncEngine<StatsClient>>,
    mode_override: Option<DisplayMode>,
    periods: Periods,
) {
    info!("Networking thread initialized!");
    let _scheduler = Scheduler::start(engine, mode_override, periods);
    std::future::pending::<()>().await;
}

fn init_logging(args: &Cli) {
    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_base_path = args.log_location.clone().unwrap_or_else(|| {
        let mut path = directories::BaseDirs::new()
            .expect("Could not find a directory to store logs")
            .data_local_dir()
            .to_path_buf();
        path.push("scoreboard-overlay-logs");
        path
    });
    let mut log_path = log_base_path.clone();
    let mut archived_log_path = log_base_path.clone();
    log_path.push(format!("{APP_NAME}-log.txt"));
    archived_log_path.push(format!("{APP_NAME}-log-{{}}.txt.gz"));

    #[cfg(debug_assertions)]
    println!("Log path: {}", log_path.display());

    // Only log to the console in debug mode
    #[cfg(all(debug_assertions, not(target_os = "windows")))]
    let console_target = Target::Stderr;
    #[cfg(all(debug_assertions, target_os = "windows"))]
    let console_target = Target::Stdout; // Windows apps don't get a stderr handle
    #[cfg(debug_assertions)]
    let console = ConsoleAppender::builder()
        .target(console_target)
        .encoder(Box::new(PatternEncoder::new("[{d} {h({l:5})} {M}] {m}{n}")))
        .build();

    // Setup the file log roller
    let roller = FixedWindowRoller::builder()
        .build(
            archived_log_path.as_os_str().to_str().unwrap(),
            args.num_old_logs,
        )
        .unwrap();
    let file_policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(args.log_max_file_size)),
        Box::new(roller),
    );
    let file_appender = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("[{d} {l:5} {M}] {m}{n}")))
        .build(log_path, Box::new(file_policy))
        .unwrap();

    // Setup the logging from all locations to use `LevelFilter::Error`
    let root = Root::builder().appender("file_appender");
    #[cfg(debug_assertions)]
    let root = root.appender("console");
    let root = root.build(LevelFilter::Error);

    // Setup the top level logging config
    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("file_appender", Box::new(file_appender)));

    #[cfg(debug_assertions)]
    let log_config = log_config.appender(Appender::builder().build("console", Box::new(console)));

    let log_config = log_config
        .logger(Logger::builder().build("scoreboard_overlay", log_level))
        .logger(Logger::builder().build("scoreboard_common", log_level))
        .build(root)
        .unwrap();

    log4rs::init_config(log_config).unwrap();
    log_panics::init();
}
