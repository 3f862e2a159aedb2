//! # Classico
//!
//! A football fan debate engine. Two generated fan agents, Olympique de
//! Marseille against Paris Saint-Germain, argue over a question in strict
//! alternation, each grounded in a factual context assembled from
//! football-data.org and the French Wikipedia and speaking through a
//! configurable persona.
//!
//! The pipeline per debate:
//!
//! 1. **Context aggregation**: season statistics are derived from raw
//!    match records, cross-validated against the official standings and
//!    degraded to a static baseline when every source fails; encyclopedic
//!    facts come from Wikipedia with per-field fallbacks.
//! 2. **Turn orchestration**: a step-wise state machine alternates the
//!    two agents, feeding each the opponent's previous reply.
//! 3. **Sanitization**: every generated turn passes a fixed-order
//!    cleaning pipeline before it reaches the transcript.
//!
//! ## Example
//!
//! ```no_run
//! use classico::{DebateRequest, DebateService};
//!
//! #[tokio::main]
//! async fn main() -> classico::Result<()> {
//!     let service = DebateService::from_env()?;
//!     let report = service
//!         .submit(
//!             DebateRequest::new("Qui gagne le Classique ?")
//!                 .with_format("Choc Ultime")
//!                 .with_personas("Ultra", "Commentateur")
//!                 .with_max_turns(6),
//!         )
//!         .await?;
//!
//!     for turn in report.outcome.transcript.turns() {
//!         println!("[{}] {}", turn.speaker, turn.sanitized);
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod config;
pub mod context;
pub mod debate;
pub mod error;
pub mod football;
pub mod generate;
pub mod persona;
pub mod sanitize;
pub mod service;
pub mod stats;
pub mod types;
pub mod wiki;

pub use config::{GeneratorConfig, SourcesConfig, TeamSpec};
pub use debate::{DebateOutcome, DebateRun, DebateSession, Transcript, Turn, TurnError};
pub use error::{Error, Result};
pub use persona::Personality;
pub use service::{DebateReport, DebateRequest, DebateService, VALID_FORMATS};
pub use types::{DebateId, Season, TeamId};

/// Commonly used types for working with the debate engine
pub mod prelude {
    pub use crate::cache::{CacheStore, JsonFileCache, MemoryCache};
    pub use crate::config::{GeneratorConfig, SourcesConfig, TeamSpec};
    pub use crate::context::{ContextBuilder, TeamContext};
    pub use crate::debate::{
        Agent, DebateOutcome, DebateRun, DebateSession, Transcript, Turn, TurnError,
    };
    pub use crate::error::{Error, Result};
    pub use crate::generate::{Generator, OpenRouterGenerator};
    pub use crate::persona::{PersonaProvider, Personality};
    pub use crate::sanitize::Sanitizer;
    pub use crate::service::{DebateReport, DebateRequest, DebateService};
    pub use crate::stats::{Provenance, StatsRecord, StatsReconciler};
    pub use crate::types::{DebateId, Season, TeamId};
}
