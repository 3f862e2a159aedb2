//! French Wikipedia clients: REST summary endpoint and infobox scraping
//!
//! Both lookups are best-effort. A failed summary fetch yields `None`, a
//! failed infobox extraction yields per-field `None`; callers substitute
//! their own fallbacks.

use crate::config::SourcesConfig;
use crate::error::Result;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

/// Founding year and home venue scraped from a page infobox
#[derive(Debug, Clone, Default)]
pub struct Infobox {
    /// Founding year as printed in the infobox
    pub founded: Option<String>,
    /// Home venue
    pub venue: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: String,
}

/// Client for the encyclopedic summary and page endpoints
pub struct WikiClient {
    http: Client,
    config: SourcesConfig,
    founded_re: Regex,
    venue_re: Regex,
}

impl WikiClient {
    /// Create a new client
    pub fn new(config: SourcesConfig) -> Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            // French club infoboxes carry "Fondé en" / "Stade" header cells
            founded_re: Regex::new(r"Fondé en\s*</th>\s*<td[^>]*>(\d{4})")
                .expect("valid founded regex"),
            venue_re: Regex::new(r"Stade\s*</th>\s*<td[^>]*>([^<]+)")
                .expect("valid venue regex"),
        })
    }

    /// First paragraph of the page summary, `None` on any failure
    pub async fn summary(&self, title: &str) -> Option<String> {
        let url = format!(
            "{}{}",
            self.config.wiki_summary_url,
            title.replace(' ', "_")
        );
        match self.fetch_summary(&url).await {
            Ok(extract) => {
                let first = extract.lines().next().unwrap_or_default().trim();
                if first.is_empty() {
                    None
                } else {
                    Some(first.to_string())
                }
            }
            Err(e) => {
                warn!(title, error = %e, "summary fetch failed");
                None
            }
        }
    }

    async fn fetch_summary(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        let summary: SummaryResponse = response.json().await?;
        Ok(summary.extract)
    }

    /// Founding year and venue from the page infobox; per-field `None`
    /// when extraction fails
    pub async fn infobox(&self, title: &str) -> Infobox {
        let url = format!("{}{}", self.config.wiki_page_url, title.replace(' ', "_"));
        let html = match self.fetch_page(&url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(title, error = %e, "infobox fetch failed");
                return Infobox::default();
            }
        };

        Infobox {
            founded: self
                .founded_re
                .captures(&html)
                .map(|c| c[1].to_string()),
            venue: self
                .venue_re
                .captures(&html)
                .map(|c| c[1].trim().to_string()),
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn client_for(server: &mockito::ServerGuard) -> WikiClient {
        let base = Url::parse(&format!("{}/", server.url())).unwrap();
        let config = SourcesConfig::new("unused")
            .with_wiki_summary_url(base.join("summary/").unwrap())
            .with_wiki_page_url(base.join("wiki/").unwrap());
        WikiClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn summary_returns_first_paragraph() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/summary/Olympique_de_Marseille")
            .with_status(200)
            .with_body(
                serde_json::json!({
                    "extract": "L'Olympique de Marseille est un club français.\nDeuxième paragraphe."
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let summary = client.summary("Olympique de Marseille").await;
        assert_eq!(
            summary.as_deref(),
            Some("L'Olympique de Marseille est un club français.")
        );
    }

    #[tokio::test]
    async fn summary_is_none_on_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/summary/Paris_Saint-Germain_FC")
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(&server);
        assert!(client.summary("Paris_Saint-Germain_FC").await.is_none());
    }

    #[tokio::test]
    async fn infobox_extracts_founded_and_venue() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/wiki/Olympique_de_Marseille")
            .with_status(200)
            .with_body(
                "<table><tr><th>Fondé en</th>\n<td class=\"x\">1899</td></tr>\
                 <tr><th>Stade</th>\n<td>Orange Vélodrome </td></tr></table>",
            )
            .create_async()
            .await;

        let client = client_for(&server);
        let infobox = client.infobox("Olympique_de_Marseille").await;
        assert_eq!(infobox.founded.as_deref(), Some("1899"));
        assert_eq!(infobox.venue.as_deref(), Some("Orange Vélodrome"));
    }

    #[tokio::test]
    async fn infobox_fields_are_none_when_absent() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/wiki/Paris_Saint-Germain_FC")
            .with_status(200)
            .with_body("<p>page without an infobox</p>")
            .create_async()
            .await;

        let client = client_for(&server);
        let infobox = client.infobox("Paris_Saint-Germain_FC").await;
        assert!(infobox.founded.is_none());
        assert!(infobox.venue.is_none());
    }
}
