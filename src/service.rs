//! Top-level debate service: request validation, wiring and reporting
//!
//! `DebateService` owns the clients and drives one debate per request:
//! validate, build contexts and directives once, run the turn machine,
//! report. The report is returned even when generation broke mid-debate;
//! only invalid requests and wiring failures error out.

use crate::cache::{CacheStore, JsonFileCache};
use crate::config::{SourcesConfig, TeamSpec, DEFAULT_MODEL};
use crate::context::ContextBuilder;
use crate::debate::{Agent, DebateOutcome, DebateRun, DebateSession};
use crate::error::{Error, Result};
use crate::football::FootballDataClient;
use crate::generate::{Generator, OpenRouterGenerator};
use crate::persona::{PersonaProvider, Personality};
use crate::sanitize::Sanitizer;
use crate::types::{DebateId, Season};
use crate::wiki::WikiClient;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Debate formats accepted by the service
pub const VALID_FORMATS: [&str; 4] = [
    "Duel des Géants",
    "Choc Ultime",
    "Analytique 360°",
    "Happy Hour",
];

/// Default cache directory for the disk-resident document cache
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// One debate request
#[derive(Debug, Clone)]
pub struct DebateRequest {
    /// Debate question put to both agents
    pub topic: String,
    /// Debate format, one of [`VALID_FORMATS`]
    pub format: String,
    /// Total number of turns across both agents
    pub max_turns: u32,
    /// Personality label for the opening agent
    pub persona_a: String,
    /// Personality label for the replying agent
    pub persona_b: String,
    /// Slang intensity in `0.0..=1.0`
    pub slang_level: f32,
    /// Model override; the configured default when `None`
    pub model: Option<String>,
    /// Seed for persona sampling; entropy when `None`
    pub seed: Option<u64>,
    /// Write the report as JSON to this path after the run
    pub output_file: Option<PathBuf>,
}

impl DebateRequest {
    /// Create a request with defaults: 6 turns, Standard personas, full
    /// slang, "Duel des Géants"
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            format: VALID_FORMATS[0].to_string(),
            max_turns: 6,
            persona_a: "Standard".to_string(),
            persona_b: "Standard".to_string(),
            slang_level: 1.0,
            model: None,
            seed: None,
            output_file: None,
        }
    }

    /// Set the debate format
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Set the total turn count
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set both personality labels
    pub fn with_personas(
        mut self,
        persona_a: impl Into<String>,
        persona_b: impl Into<String>,
    ) -> Self {
        self.persona_a = persona_a.into();
        self.persona_b = persona_b.into();
        self
    }

    /// Set the slang intensity
    pub fn with_slang_level(mut self, slang_level: f32) -> Self {
        self.slang_level = slang_level;
        self
    }

    /// Set the model override
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the persona sampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Write the report as JSON to the given path after the run
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }
}

/// Final report for one debate
#[derive(Debug, Serialize)]
pub struct DebateReport {
    /// Debate identifier
    pub id: DebateId,
    /// Debate question
    pub topic: String,
    /// Debate format
    pub format: String,
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// When the run finished
    pub finished_at: DateTime<Utc>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Transcript and failure marker
    pub outcome: DebateOutcome,
}

/// Validated form of a request, produced before any network call
struct ValidatedRequest {
    persona_a: Personality,
    persona_b: Personality,
    model: String,
}

/// Owns the clients and runs debates end to end
pub struct DebateService {
    api: Arc<FootballDataClient>,
    contexts: ContextBuilder,
    generator: Arc<dyn Generator>,
    provider: PersonaProvider,
    season: Season,
    team_a: TeamSpec,
    team_b: TeamSpec,
    default_model: String,
}

impl DebateService {
    /// Create a service from environment variables, with the disk cache
    /// under [`DEFAULT_CACHE_DIR`]
    pub fn from_env() -> Result<Self> {
        let sources = SourcesConfig::from_env()?;
        let generator = OpenRouterGenerator::from_env()?;
        let cache = Arc::new(JsonFileCache::new(DEFAULT_CACHE_DIR)?);
        Self::new(sources, Arc::new(generator), cache)
    }

    /// Create a service from explicit configuration
    pub fn new(
        sources: SourcesConfig,
        generator: Arc<dyn Generator>,
        cache: Arc<dyn CacheStore>,
    ) -> Result<Self> {
        let api = Arc::new(FootballDataClient::new(sources.clone(), cache)?);
        let wiki = WikiClient::new(sources)?;
        let contexts = ContextBuilder::new(api.clone(), wiki);
        Ok(Self {
            api,
            contexts,
            generator,
            provider: PersonaProvider::new(),
            season: Season::new(2023),
            team_a: TeamSpec::marseille(),
            team_b: TeamSpec::paris(),
            default_model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Set the season the factual context covers
    pub fn with_season(mut self, season: Season) -> Self {
        self.season = season;
        self
    }

    /// Set the default model used when a request has no override
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    fn validate(&self, request: &DebateRequest) -> Result<ValidatedRequest> {
        if request.topic.trim().is_empty() {
            return Err(Error::invalid_input("debate topic must not be empty"));
        }
        if !VALID_FORMATS.contains(&request.format.as_str()) {
            return Err(Error::invalid_input(format!(
                "unknown format '{}', expected one of: {}",
                request.format,
                VALID_FORMATS.join(", ")
            )));
        }
        if request.max_turns < 2 {
            return Err(Error::invalid_input(
                "a debate needs at least 2 turns, one per agent",
            ));
        }
        if !(0.0..=1.0).contains(&request.slang_level) {
            return Err(Error::invalid_input(
                "slang level must be between 0.0 and 1.0",
            ));
        }
        Ok(ValidatedRequest {
            persona_a: request.persona_a.parse()?,
            persona_b: request.persona_b.parse()?,
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.default_model.clone()),
        })
    }

    /// Submit one debate request. The report carries the partial
    /// transcript and a failure marker when generation broke; only an
    /// invalid request errors out.
    pub async fn submit(&self, request: DebateRequest) -> Result<DebateReport> {
        let validated = self.validate(&request)?;
        let id = DebateId::new();
        let started_at = Utc::now();

        info!(
            debate = %id,
            topic = %request.topic,
            format = %request.format,
            turns = request.max_turns,
            "debate starting"
        );

        let mut rng = match request.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let agents = [
            self.prepare_agent(&mut rng, &self.team_a, validated.persona_a, &request, id)
                .await,
            self.prepare_agent(&mut rng, &self.team_b, validated.persona_b, &request, id)
                .await,
        ];

        let session = DebateSession {
            id,
            topic: request.topic.clone(),
            format: request.format.clone(),
            max_turns: request.max_turns,
            model: validated.model,
            agents,
        };
        let run = DebateRun::new(
            session,
            self.generator.clone(),
            Sanitizer::new(self.api.clone(), self.season),
        );
        let outcome = run.run_to_completion().await;

        let finished_at = Utc::now();
        let report = DebateReport {
            id,
            topic: request.topic,
            format: request.format,
            started_at,
            finished_at,
            duration_ms: (finished_at - started_at).num_milliseconds().max(0) as u64,
            outcome,
        };

        if let Some(path) = &request.output_file {
            // Export failure must not lose the in-memory report
            if let Err(e) = export_report(&report, path) {
                warn!(path = %path.display(), error = %e, "report export failed");
            }
        }

        info!(
            debate = %id,
            turns = report.outcome.transcript.len(),
            failed = report.outcome.error.is_some(),
            ms = report.duration_ms,
            "debate finished"
        );

        Ok(report)
    }

    async fn prepare_agent(
        &self,
        rng: &mut StdRng,
        team: &TeamSpec,
        personality: Personality,
        request: &DebateRequest,
        id: DebateId,
    ) -> Agent {
        let context = self.contexts.build(team, self.season).await;
        let directive = self.provider.build_directive(
            rng,
            team,
            personality,
            &request.format,
            request.slang_level,
            id,
        );
        Agent {
            spec: team.clone(),
            personality,
            context,
            directive,
        }
    }
}

fn export_report(report: &DebateReport, path: &std::path::Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    Ok(())
}
