//! The session counter lives in a small JSON file (`{"wins": 0, "losses": 0}`)
//! that the streamer edits between sets and the overlay polls.

use crate::stats::WinsLosses;
use log::{debug, info};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const DEFAULT_FILE_NAME: &str = "score.json";

#[derive(Debug, Error)]
pub enum ScoreFileError {
    #[error("Could not access score file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Score file {} is not valid: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Could not encode score for {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionScoreFile {
    path: PathBuf,
}

impl SessionScoreFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A file that does not exist yet counts as a fresh session.
    pub fn read(&self) -> Result<WinsLosses, ScoreFileError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => parse(&contents).map_err(|source| ScoreFileError::Parse {
                path: self.path.clone(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No score file at {}, starting at zero", self.path.display());
                Ok(WinsLosses::default())
            }
            Err(source) => Err(ScoreFileError::Io {
                path: self.path.clone(),
                source,
            }),
        }
    }

    pub fn add_wins(&self, by: u32) -> Result<WinsLosses, ScoreFileError> {
        self.update(|score| score.wins = score.wins.saturating_add(by))
    }

    pub fn add_losses(&self, by: u32) -> Result<WinsLosses, ScoreFileError> {
        self.update(|score| score.losses = score.losses.saturating_add(by))
    }

    pub fn reset(&self) -> Result<WinsLosses, ScoreFileError> {
        info!("Resetting session score in {}", self.path.display());
        self.write(WinsLosses::default())
    }

    fn update<F: FnOnce(&mut WinsLosses)>(&self, f: F) -> Result<WinsLosses, ScoreFileError> {
        let mut score = self.read()?;
        f(&mut score);
        self.write(score)
    }

    fn write(&self, score: WinsLosses) -> Result<WinsLosses, ScoreFileError> {
        let io_err = |source: io::Error| ScoreFileError::Io {
            path: self.path.clone(),
            source,
        };

        let body = serde_json::to_string_pretty(&score).map_err(|source| ScoreFileError::Encode {
            path: self.path.clone(),
            source,
        })?;

        // The overlay may read at any moment, so the new contents are swapped in whole
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        fs::write(&tmp_path, body).map_err(io_err)?;
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;

        debug!("Wrote session score {score} to {}", self.path.display());
        Ok(score)
    }
}

pub fn parse(contents: &str) -> Result<WinsLosses, serde_json::Error> {
    serde_json::from_str(contents)
}
