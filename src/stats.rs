//! Season statistics: derivation from raw match records and reconciliation
//! of the authoritative standings source against the locally derived record
//!
//! The reconciler never fails outward: it always produces some record plus
//! a provenance tag, degrading from authoritative to derived to the static
//! baseline.

use crate::config::TeamSpec;
use crate::error::{Error, Result};
use crate::football::{FootballDataClient, MatchRecord};
use crate::types::{Season, TeamId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Where a reconciled record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Official standings endpoint
    Authoritative,
    /// Derived locally from raw match records
    Derived,
    /// Static baseline table
    Baseline,
}

impl Provenance {
    /// Bracketed tag used in context text
    pub fn tag(&self) -> &'static str {
        match self {
            Provenance::Authoritative => "[OFFICIAL]",
            Provenance::Derived => "[LOCAL]",
            Provenance::Baseline => "[BASELINE]",
        }
    }
}

/// A season record for one team
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    /// League position, when the source provides it
    pub position: Option<u32>,
    /// Points, when the source provides them
    pub points: Option<u32>,
    /// Wins
    pub wins: u32,
    /// Draws
    pub draws: u32,
    /// Losses
    pub losses: u32,
    /// Goals scored, when the source provides them
    pub goals_for: Option<u32>,
    /// Goals conceded, when the source provides them
    pub goals_against: Option<u32>,
}

impl StatsRecord {
    /// Matches accounted for by this record
    pub fn matches_played(&self) -> u32 {
        self.wins + self.draws + self.losses
    }
}

/// Outcome of one match from a given team's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Win
    Win,
    /// Draw
    Draw,
    /// Loss
    Loss,
}

/// Classify a match from `team`'s perspective. `None` when the team was not
/// involved or no full-time score is available.
pub fn outcome_for(record: &MatchRecord, team: TeamId) -> Option<Outcome> {
    let id = team.as_u32();
    if record.home_team.id != id && record.away_team.id != id {
        return None;
    }
    let home = record.score.full_time.home?;
    let away = record.score.full_time.away?;
    let (own, other) = if record.home_team.id == id {
        (home, away)
    } else {
        (away, home)
    };
    Some(if own > other {
        Outcome::Win
    } else if own < other {
        Outcome::Loss
    } else {
        Outcome::Draw
    })
}

/// Derive a season record from raw match records, counting only matches the
/// team was involved in that have a full-time score
pub fn derive_record(records: &[MatchRecord], team: TeamId) -> StatsRecord {
    let mut record = StatsRecord::default();
    for outcome in records.iter().filter_map(|m| outcome_for(m, team)) {
        match outcome {
            Outcome::Win => record.wins += 1,
            Outcome::Draw => record.draws += 1,
            Outcome::Loss => record.losses += 1,
        }
    }
    record.points = Some(record.wins * 3 + record.draws);
    record
}

/// Accept an authoritative record only when its match count is within one
/// of the locally derived count
pub fn validate(derived_matches: u32, authoritative: &StatsRecord) -> Result<()> {
    let sum = authoritative.matches_played();
    let diff = derived_matches.abs_diff(sum);
    if diff <= 1 {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "derived match count {derived_matches} vs standings sum {sum}"
        )))
    }
}

/// Cross-validates the standings source against locally derived statistics
pub struct StatsReconciler {
    api: Arc<FootballDataClient>,
}

impl StatsReconciler {
    /// Create a reconciler over the shared API client
    pub fn new(api: Arc<FootballDataClient>) -> Self {
        Self { api }
    }

    /// Reconcile the best available record for a team. Total: always
    /// returns a record plus its provenance.
    pub async fn reconcile(&self, team: &TeamSpec, season: Season) -> (StatsRecord, Provenance) {
        // Derived record first: it doubles as the validation yardstick
        let derived = match self.api.competition_matches(team.id, season).await {
            Ok(response) => derive_record(&response.matches, team.id),
            Err(e) => {
                warn!(team = %team.tag, error = %e, "match history unavailable");
                StatsRecord::default()
            }
        };

        match self.fetch_authoritative(team).await {
            Ok(authoritative) => match validate(derived.matches_played(), &authoritative) {
                Ok(()) => return (authoritative, Provenance::Authoritative),
                Err(e) => {
                    warn!(team = %team.tag, error = %e, "standings rejected, using derived record")
                }
            },
            Err(e) => warn!(team = %team.tag, error = %e, "standings unavailable"),
        }

        if derived.matches_played() > 0 {
            (derived, Provenance::Derived)
        } else {
            info!(team = %team.tag, "falling back to baseline record");
            (team.baseline.clone(), Provenance::Baseline)
        }
    }

    async fn fetch_authoritative(&self, team: &TeamSpec) -> Result<StatsRecord> {
        let standings = self.api.standings().await?;
        let row = standings
            .total_row(team.id)
            .ok_or_else(|| Error::fetch(format!("no standings row for {}", team.tag)))?;
        Ok(StatsRecord {
            position: Some(row.position),
            points: Some(row.points),
            wins: row.won,
            draws: row.draw,
            losses: row.lost,
            goals_for: None,
            goals_against: None,
        })
    }
}
