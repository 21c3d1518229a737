use crate::{
    session_file::{self, SessionScoreFile},
    stats::{BaseStats, PlayerId, WinsLosses},
};
use futures::FutureExt;
use log::{trace, warn};
use reqwest::{Client, ClientBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::{
    fmt::{Display, Formatter},
    future::Future,
    io,
    path::PathBuf,
    time::Duration,
};
use thiserror::Error;

/// The backend resources the overlay reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    BaseStats,
    PlayerWinLoss,
    SessionWinLoss,
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BaseStats => write!(f, "player base stats"),
            Self::PlayerWinLoss => write!(f, "player win/loss record"),
            Self::SessionWinLoss => write!(f, "session win/loss counter"),
        }
    }
}

/// The only failure a fetch reports. Whatever went wrong underneath, the
/// caller just learns that this resource produced nothing this time.
#[derive(Debug, Error)]
#[error("Failed to fetch {resource}: {cause}")]
pub struct FetchFailed {
    pub resource: Resource,
    #[source]
    cause: FetchCause,
}

impl FetchFailed {
    pub fn new(resource: Resource, cause: impl Into<FetchCause>) -> Self {
        Self {
            resource,
            cause: cause.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchCause {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("server responded with {0}")]
    Status(StatusCode),
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Something that can answer the three stats queries. The HTTP client is the
/// real implementation; the engine only ever sees this trait.
pub trait StatsSource: Send + Sync {
    /// Resolves a player tag to its stable id and current rating.
    fn fetch_base_stats(
        &self,
        player_tag: &str,
    ) -> impl Future<Output = Result<BaseStats, FetchFailed>> + Send;

    fn fetch_player_win_loss(
        &self,
        player_id: PlayerId,
    ) -> impl Future<Output = Result<WinsLosses, FetchFailed>> + Send;

    fn fetch_session_win_loss(&self) -> impl Future<Output = Result<WinsLosses, FetchFailed>> + Send;
}

/// Where the session counter is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSource {
    /// `GET /LocalWinsLosses` on the stats backend
    Http,
    /// The score file, read directly
    File(SessionScoreFile),
}

pub struct StatsClient {
    base_url: String,
    session: SessionSource,
    client: Client,
}

impl StatsClient {
    pub fn new(
        base_url: &str,
        session: SessionSource,
        connect_timeout: Duration,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let client = ClientBuilder::new()
            .connect_timeout(connect_timeout)
            .build()?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self {
            base_url,
            session,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: DeserializeOwned + Send>(
        &self,
        resource: Resource,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<T, FetchFailed>> + Send + use<T> {
        let url = format!("{}/{path}", self.base_url);
        trace!("Requesting {resource} from {url} with {query:?}");
        let request = self.client.get(&url).query(query).send();

        async move {
            let response = request
                .await
                .map_err(|e| FetchFailed::new(resource, e))?;

            if !response.status().is_success() {
                warn!("Request for {resource} failed, response: {response:?}");
                return Err(FetchFailed::new(
                    resource,
                    FetchCause::Status(response.status()),
                ));
            }

            let body = response
                .text()
                .await
                .map_err(|e| FetchFailed::new(resource, e))?;
            serde_json::from_str(&body).map_err(|e| FetchFailed::new(resource, e))
        }
    }
}

impl StatsSource for StatsClient {
    fn fetch_base_stats(
        &self,
        player_tag: &str,
    ) -> impl Future<Output = Result<BaseStats, FetchFailed>> + Send {
        self.get_json(
            Resource::BaseStats,
            "PlayerData",
            &[("player_tag", player_tag.to_string())],
        )
    }

    fn fetch_player_win_loss(
        &self,
        player_id: PlayerId,
    ) -> impl Future<Output = Result<WinsLosses, FetchFailed>> + Send {
        self.get_json(
            Resource::PlayerWinLoss,
            "PlayerWinsLosses",
            &[("player_id", player_id.to_string())],
        )
    }

    fn fetch_session_win_loss(&self) -> impl Future<Output = Result<WinsLosses, FetchFailed>> + Send {
        match &self.session {
            SessionSource::Http => self
                .get_json::<WinsLosses>(Resource::SessionWinLoss, "LocalWinsLosses", &[])
                .left_future(),
            SessionSource::File(file) => read_score_file(file.path().to_path_buf()).right_future(),
        }
    }
}

/// A missing file is a fresh session, same as [`SessionScoreFile::read`]
async fn read_score_file(path: PathBuf) -> Result<WinsLosses, FetchFailed> {
    trace!("Reading session score from {}", path.display());
    let contents = match tokio::fs::read_to_string(&path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(WinsLosses::default()),
        Err(e) => return Err(FetchFailed::new(Resource::SessionWinLoss, e)),
    };
    session_file::parse(&contents).map_err(|e| FetchFailed::new(Resource::SessionWinLoss, e))
}
