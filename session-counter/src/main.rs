use clap::{Parser, Subcommand};
use log::{LevelFilter, info};
use log4rs::{
    append::console::{ConsoleAppender, Target},
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use scoreboard_common::{
    session_file::{DEFAULT_FILE_NAME, SessionScoreFile},
    stats::WinsLosses,
};
use std::path::PathBuf;

const APP_NAME: &str = "session_counter";

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
/// Keeps the stream session's win/loss count that the overlay displays
struct Args {
    #[clap(long, short, env = "SCORE_FILE", default_value = DEFAULT_FILE_NAME)]
    /// The session score file
    file: PathBuf,

    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Print the current session score
    Show,
    /// Record won sets
    Win {
        #[clap(long, default_value = "1")]
        /// How many to add
        by: u32,
    },
    /// Record lost sets
    Loss {
        #[clap(long, default_value = "1")]
        /// How many to add
        by: u32,
    },
    /// Start a new session at 0 - 0
    Reset,
}

fn run(command: &Command, file: &SessionScoreFile) -> Result<WinsLosses, Box<dyn std::error::Error>> {
    let score = match command {
        Command::Show => file.read()?,
        Command::Win { by } => {
            info!("Adding {by} win(s)");
            file.add_wins(*by)?
        }
        Command::Loss { by } => {
            info!("Adding {by} loss(es)");
            file.add_losses(*by)?
        }
        Command::Reset => file.reset()?,
    };
    Ok(score)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    #[cfg(not(target_os = "windows"))]
    let console_target = Target::Stderr;
    #[cfg(target_os = "windows")]
    let console_target = Target::Stdout; // Windows apps don't get a stderr handle
    let console = ConsoleAppender::builder()
        .target(console_target)
        .encoder(Box::new(PatternEncoder::new("[{d} {h({l:5})} {M}] {m}{n}")))
        .build();

    // Setup the logging from all locations to use `LevelFilter::Error`
    let root = Root::builder().appender("console");
    let root = root.build(LevelFilter::Error);

    // Setup the top level logging config
    let log_config =
        LogConfig::builder().appender(Appender::builder().build("console", Box::new(console)));

    let log_config = log_config
        .logger(Logger::builder().build(APP_NAME, log_level)) // Setup the logging from this app to use `log_level`
        .logger(Logger::builder().build("scoreboard_common", log_level))
        .build(root)?;

    log4rs::init_config(log_config)?;
    if args.verbose > 0 {
        log_panics::init();
    }

    let file = SessionScoreFile::new(args.file);
    let score = run(&args.command, &file)?;
    println!("{score}");

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::try_parse_from(["session-counter", "win"]).unwrap();
        assert_eq!(args.command, Command::Win { by: 1 });

        let args =
            Args::try_parse_from(["session-counter", "--file", "other.json", "loss", "--by", "3"])
                .unwrap();
        assert_eq!(args.file, PathBuf::from("other.json"));
        assert_eq!(args.command, Command::Loss { by: 3 });

        assert!(Args::try_parse_from(["session-counter", "win", "--by", "-1"]).is_err());
        assert!(Args::try_parse_from(["session-counter"]).is_err());
    }

    #[test]
    fn test_run_commands() {
        let dir = tempfile::tempdir().unwrap();
        let file = SessionScoreFile::new(dir.path().join("score.json"));

        assert_eq!(run(&Command::Show, &file).unwrap(), WinsLosses::default());
        assert_eq!(run(&Command::Win { by: 2 }, &file).unwrap(), WinsLosses::new(2, 0));
        assert_eq!(run(&Command::Loss { by: 1 }, &file).unwrap(), WinsLosses::new(2, 1));
        assert_eq!(run(&Command::Show, &file).unwrap(), WinsLosses::new(2, 1));
        assert_eq!(run(&Command::Reset, &file).unwrap(), WinsLosses::default());
    }
}
