//! Configuration types for the classico debate engine
//!
//! Everything that used to be module-level state in earlier prototypes
//! (API endpoints, fallback tables, logging knobs) is explicit
//! configuration passed into constructors.

use crate::error::{Error, Result};
use crate::stats::StatsRecord;
use crate::types::TeamId;
use dotenvy::dotenv;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use url::Url;

/// Default cache time-to-live: 24 hours
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86_400);

/// Default model for debate turns
pub const DEFAULT_MODEL: &str = "openai/gpt-4-turbo";

/// Configuration for the external factual data sources
#[derive(Clone)]
pub struct SourcesConfig {
    /// football-data.org API key
    pub api_key: SecretString,
    /// Base URL for the football-data.org v4 API
    pub base_url: Url,
    /// Base URL for the Wikipedia REST summary endpoint
    pub wiki_summary_url: Url,
    /// Base URL for raw Wikipedia pages (infobox scraping)
    pub wiki_page_url: Url,
    /// Competition code on football-data.org (Ligue 1)
    pub competition: String,
    /// Request timeout for data-source calls
    pub timeout: Duration,
    /// Maximum fetch attempts when rate-limited
    pub max_attempts: u32,
    /// Time-to-live for cached source documents
    pub cache_ttl: Duration,
}

impl SourcesConfig {
    /// Create a configuration from environment variables.
    /// Loads `.env` if present so local development picks up
    /// `FOOTBALL_DATA_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        let api_key = std::env::var("FOOTBALL_DATA_API_KEY")
            .map_err(|_| Error::config("FOOTBALL_DATA_API_KEY environment variable not set"))?;

        Ok(Self::new(api_key))
    }

    /// Create a configuration with a specific API key and default endpoints
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: Url::parse("https://api.football-data.org/v4")
                .expect("valid football-data URL"),
            wiki_summary_url: Url::parse("https://fr.wikipedia.org/api/rest_v1/page/summary/")
                .expect("valid Wikipedia summary URL"),
            wiki_page_url: Url::parse("https://fr.wikipedia.org/wiki/")
                .expect("valid Wikipedia page URL"),
            competition: "FL1".to_string(),
            timeout: Duration::from_secs(5),
            max_attempts: 4,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Set the football-data base URL
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Set the Wikipedia summary base URL
    pub fn with_wiki_summary_url(mut self, url: Url) -> Self {
        self.wiki_summary_url = url;
        self
    }

    /// Set the Wikipedia page base URL
    pub fn with_wiki_page_url(mut self, url: Url) -> Self {
        self.wiki_page_url = url;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the maximum rate-limited fetch attempts
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the cache time-to-live
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Get the API key as a string
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl std::fmt::Debug for SourcesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourcesConfig")
            .field("api_key", &"***REDACTED***")
            .field("base_url", &self.base_url)
            .field("wiki_summary_url", &self.wiki_summary_url)
            .field("wiki_page_url", &self.wiki_page_url)
            .field("competition", &self.competition)
            .field("timeout", &self.timeout)
            .field("max_attempts", &self.max_attempts)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

/// Configuration for the text Generator (OpenRouter)
#[derive(Clone)]
pub struct GeneratorConfig {
    /// OpenRouter API key
    pub api_key: SecretString,
    /// Base URL for the OpenRouter API
    pub base_url: Url,
    /// App name for OpenRouter tracking
    pub app_name: String,
    /// Default model for debate turns
    pub default_model: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl GeneratorConfig {
    /// Create a configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let _ = dotenv();

        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| Error::config("OPENROUTER_API_KEY environment variable not set"))?;

        Ok(Self::new(api_key))
    }

    /// Create a configuration with a specific API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: Url::parse("https://openrouter.ai/api/v1").expect("valid OpenRouter URL"),
            app_name: "Classico Debate Engine".to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Set the default model
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Get the API key as a string
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &"***REDACTED***")
            .field("base_url", &self.base_url)
            .field("app_name", &self.app_name)
            .field("default_model", &self.default_model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Static description of a debating team: identity, encyclopedic fallbacks
/// and the baseline season record used when every external source fails
#[derive(Debug, Clone)]
pub struct TeamSpec {
    /// football-data.org team identifier
    pub id: TeamId,
    /// Full display name
    pub name: String,
    /// Short tag used in prompts and transcripts
    pub tag: String,
    /// French Wikipedia page title (underscored)
    pub wiki_title: String,
    /// Founding year used when infobox extraction fails
    pub fallback_founded: u16,
    /// Home venue used when infobox extraction fails
    pub fallback_venue: String,
    /// Baseline season record (2023/2024)
    pub baseline: StatsRecord,
}

impl TeamSpec {
    /// Olympique de Marseille
    pub fn marseille() -> Self {
        Self {
            id: TeamId::new(516),
            name: "Olympique de Marseille".to_string(),
            tag: "OM".to_string(),
            wiki_title: "Olympique_de_Marseille".to_string(),
            fallback_founded: 1898,
            fallback_venue: "Orange Vélodrome".to_string(),
            baseline: StatsRecord {
                position: None,
                points: Some(73),
                wins: 22,
                draws: 7,
                losses: 9,
                goals_for: Some(67),
                goals_against: Some(40),
            },
        }
    }

    /// Paris Saint-Germain
    pub fn paris() -> Self {
        Self {
            id: TeamId::new(524),
            name: "Paris Saint-Germain".to_string(),
            tag: "PSG".to_string(),
            wiki_title: "Paris_Saint-Germain_FC".to_string(),
            fallback_founded: 1970,
            fallback_venue: "Parc des Princes".to_string(),
            baseline: StatsRecord {
                position: None,
                points: Some(83),
                wins: 25,
                draws: 8,
                losses: 5,
                goals_for: Some(89),
                goals_against: Some(40),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baselines_cover_a_full_season() {
        for team in [TeamSpec::marseille(), TeamSpec::paris()] {
            assert_eq!(team.baseline.matches_played(), 38, "{}", team.tag);
        }
    }

    #[test]
    fn debug_redacts_api_keys() {
        let sources = SourcesConfig::new("secret-key");
        assert!(!format!("{sources:?}").contains("secret-key"));

        let generator = GeneratorConfig::new("secret-key");
        assert!(!format!("{generator:?}").contains("secret-key"));
    }
}
