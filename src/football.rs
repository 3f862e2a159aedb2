//! football-data.org v4 client with read-through caching and
//! rate-limit-aware retries
//!
//! Lookup path for cached documents: a cache hit within TTL is returned
//! unchanged with no network call. On a miss the remote call is issued;
//! HTTP 429 is retried with exponential backoff (2^attempt seconds) up to
//! the configured attempt count, every other HTTP or transport error fails
//! immediately. Successful payloads are written back to the cache before
//! being returned; a cache write failure is logged and ignored.

use crate::cache::{CacheEntry, CacheKey, CacheStore, DocKind};
use crate::config::SourcesConfig;
use crate::error::{Error, Result};
use crate::types::{Season, TeamId};
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Backoff delay before retrying a rate-limited attempt (attempt from 0)
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt)
}

/// Client for the football-data.org v4 API
pub struct FootballDataClient {
    /// HTTP client
    http: Client,
    /// Configuration
    config: SourcesConfig,
    /// Shared cache store for raw documents
    cache: Arc<dyn CacheStore>,
}

impl FootballDataClient {
    /// Create a new client over the given cache store
    pub fn new(config: SourcesConfig, cache: Arc<dyn CacheStore>) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            cache,
        })
    }

    /// Base URL without a trailing slash, for endpoint formatting
    fn base(&self) -> &str {
        self.config.base_url.as_str().trim_end_matches('/')
    }

    /// Fetch a raw JSON document, going through the cache when a key is given
    async fn fetch_document(
        &self,
        key: Option<CacheKey>,
        url: &str,
    ) -> Result<serde_json::Value> {
        if let Some(key) = &key {
            match self.cache.get(key) {
                Ok(Some(entry)) if entry.is_fresh(self.config.cache_ttl, Utc::now()) => {
                    info!(%url, "cache hit");
                    return Ok(entry.payload);
                }
                Ok(_) => {}
                Err(e) => warn!(%url, error = %e, "cache read failed, treating as miss"),
            }
        }

        for attempt in 0..self.config.max_attempts {
            let response = self
                .http
                .get(url)
                .header("X-Auth-Token", self.config.api_key())
                .send()
                .await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS {
                // No point backing off when no attempt remains
                if attempt + 1 < self.config.max_attempts {
                    let delay = backoff_delay(attempt);
                    warn!(%url, attempt, wait_s = delay.as_secs(), "rate limited, backing off");
                    tokio::time::sleep(delay).await;
                }
                continue;
            }

            if !response.status().is_success() {
                return Err(Error::fetch(format!(
                    "{url} answered {}",
                    response.status()
                )));
            }

            let payload: serde_json::Value = response.json().await?;

            if let Some(key) = &key {
                if let Err(e) = self.cache.put(key, CacheEntry::new(payload.clone())) {
                    warn!(%url, error = %e, "cache write failed, continuing without cache");
                }
            }

            return Ok(payload);
        }

        Err(Error::RateLimitExhausted {
            endpoint: url.to_string(),
            attempts: self.config.max_attempts,
        })
    }

    /// Per-match history for the configured competition, cached per team
    /// and season
    pub async fn competition_matches(
        &self,
        team: TeamId,
        season: Season,
    ) -> Result<MatchesResponse> {
        let url = format!(
            "{}/competitions/{}/matches?season={}",
            self.base(),
            self.config.competition,
            season.start_year()
        );
        let key = CacheKey::new(team, season, DocKind::Matches);
        let payload = self.fetch_document(Some(key), &url).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Current standings for the configured competition (not cached; the
    /// table moves faster than the document TTL)
    pub async fn standings(&self) -> Result<StandingsResponse> {
        let url = format!(
            "{}/competitions/{}/standings",
            self.base(),
            self.config.competition
        );
        let payload = self.fetch_document(None, &url).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Team metadata and squad, cached per team and season
    pub async fn team(&self, team: TeamId, season: Season) -> Result<TeamResponse> {
        let url = format!("{}/teams/{}", self.base(), team);
        let key = CacheKey::new(team, season, DocKind::Team);
        let payload = self.fetch_document(Some(key), &url).await?;
        Ok(serde_json::from_value(payload)?)
    }

    /// Squad names in source order; tolerant, empty on any failure
    pub async fn roster(&self, team: TeamId, season: Season) -> Vec<String> {
        match self.team(team, season).await {
            Ok(response) => response.squad.into_iter().map(|p| p.name).collect(),
            Err(e) => {
                warn!(%team, error = %e, "squad fetch failed");
                Vec::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl crate::sanitize::RosterSource for FootballDataClient {
    async fn roster(&self, team: TeamId, season: Season) -> Vec<String> {
        FootballDataClient::roster(self, team, season).await
    }
}

/// Standings response for a competition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsResponse {
    /// Standing groups (TOTAL, HOME, AWAY)
    #[serde(default)]
    pub standings: Vec<StandingGroup>,
}

impl StandingsResponse {
    /// Row for a team in the overall (TOTAL) table, if present
    pub fn total_row(&self, team: TeamId) -> Option<&StandingRow> {
        self.standings
            .iter()
            .find(|g| g.group_type == "TOTAL")
            .and_then(|g| g.table.iter().find(|r| r.team.id == team.as_u32()))
    }
}

/// One standings group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingGroup {
    /// Group type, e.g. "TOTAL"
    #[serde(rename = "type")]
    pub group_type: String,
    /// Table rows
    #[serde(default)]
    pub table: Vec<StandingRow>,
}

/// One standings table row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingRow {
    /// League position
    pub position: u32,
    /// Team reference
    pub team: TeamRef,
    /// Points
    pub points: u32,
    /// Wins
    pub won: u32,
    /// Draws
    pub draw: u32,
    /// Losses
    pub lost: u32,
}

/// Minimal team reference inside other documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRef {
    /// Numeric team id
    pub id: u32,
}

/// Team endpoint response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamResponse {
    /// Team name
    pub name: String,
    /// Founding year, when the source provides it
    #[serde(default)]
    pub founded: Option<u32>,
    /// Squad in source order
    #[serde(default)]
    pub squad: Vec<SquadMember>,
}

/// One squad entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquadMember {
    /// Player name
    pub name: String,
}

/// Competition matches response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesResponse {
    /// Raw match records
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
}

/// One raw match record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRecord {
    /// Match id
    pub id: u64,
    /// Kickoff date (UTC, ISO 8601)
    pub utc_date: String,
    /// Competition reference
    pub competition: CompetitionRef,
    /// Home team
    pub home_team: TeamRef,
    /// Away team
    pub away_team: TeamRef,
    /// Score
    pub score: Score,
}

/// Competition reference inside a match record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitionRef {
    /// Competition code, e.g. "FL1"
    pub code: String,
}

/// Match score
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    /// Full-time score
    pub full_time: FullTime,
}

/// Full-time goals; absent for unplayed matches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullTime {
    /// Home goals
    pub home: Option<i32>,
    /// Away goals
    pub away: Option<i32>,
}
