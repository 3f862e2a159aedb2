//! Knowledge context assembly for one team
//!
//! Pure assembly over the reconciler and the encyclopedic clients. Every
//! sub-fetch is fault-isolated: a failing step logs and contributes a
//! fallback fragment instead of aborting the build, so `build` is total.

use crate::config::TeamSpec;
use crate::football::FootballDataClient;
use crate::stats::{Provenance, StatsRecord, StatsReconciler};
use crate::types::{Season, TeamId};
use crate::wiki::WikiClient;
use std::sync::Arc;
use tracing::info;

/// Squad names rendered into the context text, capped in source order
pub const SQUAD_CAP: usize = 15;

/// Assembled factual profile for one team, immutable for the session
#[derive(Debug, Clone)]
pub struct TeamContext {
    /// Team the context describes
    pub team: TeamId,
    /// Display name
    pub name: String,
    /// Season the facts cover
    pub season: Season,
    /// Founding year, infobox or fallback
    pub founded: String,
    /// Home venue, infobox or fallback
    pub venue: String,
    /// Reconciled season record
    pub stats: StatsRecord,
    /// Provenance of the season record
    pub provenance: Provenance,
    /// Squad in source order; empty when unavailable
    pub roster: Vec<String>,
    /// Prose summary; `None` when unavailable
    pub summary: Option<String>,
}

impl TeamContext {
    /// Render the context block injected into prompts. Deterministic
    /// concatenation: stats, founding facts, optional summary, squad.
    pub fn render(&self) -> String {
        let position = self
            .stats
            .position
            .map(|p| p.to_string())
            .unwrap_or_else(|| "?".to_string());
        let points = self
            .stats
            .points
            .map(|p| p.to_string())
            .unwrap_or_else(|| "?".to_string());

        let mut text = format!(
            "{} in {} {}:\n\
             - Position: {} (Points: {})\n\
             - Record: {}W / {}D / {}L\n\
             - Founded {} | Stadium: {}\n",
            self.name,
            self.season,
            self.provenance.tag(),
            position,
            points,
            self.stats.wins,
            self.stats.draws,
            self.stats.losses,
            self.founded,
            self.venue,
        );

        if let Some(summary) = &self.summary {
            text.push_str(&format!("Summary: {summary}\n"));
        }

        if self.roster.is_empty() {
            text.push_str("Squad unavailable.");
        } else {
            let lineup = self
                .roster
                .iter()
                .take(SQUAD_CAP)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            text.push_str(&format!(
                "Squad ({}): {lineup}.",
                self.roster.len().min(SQUAD_CAP)
            ));
        }

        text
    }
}

/// Assembles the per-team factual context injected into every prompt
pub struct ContextBuilder {
    api: Arc<FootballDataClient>,
    wiki: WikiClient,
    reconciler: StatsReconciler,
}

impl ContextBuilder {
    /// Create a builder over the shared clients
    pub fn new(api: Arc<FootballDataClient>, wiki: WikiClient) -> Self {
        let reconciler = StatsReconciler::new(api.clone());
        Self {
            api,
            wiki,
            reconciler,
        }
    }

    /// Build the context for one team and season. Total: degraded inputs
    /// yield a lower-fidelity profile, never an error.
    pub async fn build(&self, team: &TeamSpec, season: Season) -> TeamContext {
        let (stats, provenance) = self.reconciler.reconcile(team, season).await;

        let infobox = self.wiki.infobox(&team.wiki_title).await;
        let founded = infobox
            .founded
            .unwrap_or_else(|| team.fallback_founded.to_string());
        let venue = infobox.venue.unwrap_or_else(|| team.fallback_venue.clone());

        let summary = self.wiki.summary(&team.wiki_title).await;
        let roster = self.api.roster(team.id, season).await;

        info!(team = %team.tag, provenance = ?provenance, "context assembled");

        TeamContext {
            team: team.id,
            name: team.name.clone(),
            season,
            founded,
            venue,
            stats,
            provenance,
            roster,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::config::SourcesConfig;
    use serde_json::json;
    use url::Url;

    fn builder_for(server: &mockito::ServerGuard) -> ContextBuilder {
        let base = Url::parse(&format!("{}/", server.url())).unwrap();
        let config = SourcesConfig::new("test-key")
            .with_base_url(Url::parse(&server.url()).unwrap())
            .with_wiki_summary_url(base.join("summary/").unwrap())
            .with_wiki_page_url(base.join("wiki/").unwrap())
            .with_max_attempts(1);
        let api = Arc::new(
            FootballDataClient::new(config.clone(), Arc::new(MemoryCache::new())).unwrap(),
        );
        let wiki = WikiClient::new(config).unwrap();
        ContextBuilder::new(api, wiki)
    }

    #[tokio::test]
    async fn all_sources_failing_yields_the_baseline_figures() {
        // No mocks registered: every fetch fails
        let server = mockito::Server::new_async().await;
        let builder = builder_for(&server);

        let context = builder
            .build(&TeamSpec::marseille(), Season::new(2023))
            .await;

        assert_eq!(context.provenance, Provenance::Baseline);
        assert_eq!(context.stats, TeamSpec::marseille().baseline);
        assert!(context.roster.is_empty());
        assert!(context.summary.is_none());

        let text = context.render();
        assert!(text.contains("[BASELINE]"));
        assert!(text.contains("Record: 22W / 7D / 9L"));
        assert!(text.contains("(Points: 73)"));
        assert!(text.contains("Founded 1898 | Stadium: Orange Vélodrome"));
        assert!(text.contains("Squad unavailable."));
        assert!(!text.contains("Summary:"));
    }

    #[tokio::test]
    async fn full_sources_produce_an_authoritative_context() {
        let mut server = mockito::Server::new_async().await;

        server
            .mock("GET", "/competitions/FL1/standings")
            .with_body(
                json!({
                    "standings": [{
                        "type": "TOTAL",
                        "table": [{
                            "position": 2,
                            "team": {"id": 516},
                            "points": 6,
                            "won": 2, "draw": 0, "lost": 0
                        }]
                    }]
                })
                .to_string(),
            )
            .create_async()
            .await;

        server
            .mock("GET", "/competitions/FL1/matches?season=2023")
            .with_body(
                json!({
                    "matches": [
                        {
                            "id": 1,
                            "utcDate": "2023-08-12T19:00:00Z",
                            "competition": {"code": "FL1"},
                            "homeTeam": {"id": 516},
                            "awayTeam": {"id": 1},
                            "score": {"fullTime": {"home": 2, "away": 1}}
                        },
                        {
                            "id": 2,
                            "utcDate": "2023-08-19T19:00:00Z",
                            "competition": {"code": "FL1"},
                            "homeTeam": {"id": 2},
                            "awayTeam": {"id": 516},
                            "score": {"fullTime": {"home": 0, "away": 1}}
                        }
                    ]
                })
                .to_string(),
            )
            .create_async()
            .await;

        server
            .mock("GET", "/teams/516")
            .with_body(
                json!({
                    "name": "Olympique de Marseille",
                    "squad": [{"name": "Pau López"}, {"name": "Chancel Mbemba"}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        server
            .mock("GET", "/summary/Olympique_de_Marseille")
            .with_body(json!({"extract": "Club fondé à Marseille."}).to_string())
            .create_async()
            .await;

        server
            .mock("GET", "/wiki/Olympique_de_Marseille")
            .with_body("<th>Fondé en</th><td>1899</td><th>Stade</th><td>Vélodrome</td>")
            .create_async()
            .await;

        let builder = builder_for(&server);
        let context = builder
            .build(&TeamSpec::marseille(), Season::new(2023))
            .await;

        assert_eq!(context.provenance, Provenance::Authoritative);
        assert_eq!(context.roster, vec!["Pau López", "Chancel Mbemba"]);

        let text = context.render();
        assert!(text.contains("[OFFICIAL]"));
        assert!(text.contains("Position: 2 (Points: 6)"));
        assert!(text.contains("Record: 2W / 0D / 0L"));
        assert!(text.contains("Founded 1899 | Stadium: Vélodrome"));
        assert!(text.contains("Summary: Club fondé à Marseille."));
        assert!(text.contains("Squad (2): Pau López, Chancel Mbemba."));
    }

    #[test]
    fn render_caps_the_squad_at_fifteen_names() {
        let roster: Vec<String> = (1..=20).map(|n| format!("Joueur {n}")).collect();
        let context = TeamContext {
            team: TeamId::new(516),
            name: "Olympique de Marseille".to_string(),
            season: Season::new(2023),
            founded: "1898".to_string(),
            venue: "Orange Vélodrome".to_string(),
            stats: TeamSpec::marseille().baseline,
            provenance: Provenance::Baseline,
            roster,
            summary: None,
        };

        let text = context.render();
        assert!(text.contains("Squad (15):"));
        assert!(text.contains("Joueur 15"));
        assert!(!text.contains("Joueur 16"));
    }
}
