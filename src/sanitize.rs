//! Response sanitization pipeline
//!
//! Fixed-order cleaning of raw generated text: placeholder characters,
//! prompt-echo labels, opposing-squad name leakage, verbatim-repeated
//! openings, then whitespace normalization. Total: the worst case is an
//! empty or heavily redacted string, never an error.

use crate::config::TeamSpec;
use crate::types::{Season, TeamId};
use async_trait::async_trait;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::warn;

/// Comparison qualifiers that suppress redaction of a forbidden name when
/// they appear anywhere later in the text. The lookahead is unbounded to
/// end-of-text rather than scoped to the local clause; that matching rule
/// is preserved as documented.
pub const COMPARISON_QUALIFIERS: [&str; 4] =
    ["plus fort", "meilleur", "stronger than", "better than"];

/// Prefix length (in characters) compared when stripping a verbatim-repeated
/// opening sentence
pub const OPENING_PREFIX_CHARS: usize = 60;

/// Tolerant roster lookup used to build the forbidden-name list
#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Squad names in source order; empty on any failure
    async fn roster(&self, team: TeamId, season: Season) -> Vec<String>;
}

/// Fixed-order text-cleaning pipeline for generated debate turns
pub struct Sanitizer {
    rosters: Arc<dyn RosterSource>,
    season: Season,
}

impl Sanitizer {
    /// Create a sanitizer drawing forbidden names from the given source
    pub fn new(rosters: Arc<dyn RosterSource>, season: Season) -> Self {
        Self { rosters, season }
    }

    /// Clean a raw generated response for `speaker`. `previous` is the
    /// opponent's preceding sanitized message, used for overlap stripping.
    pub async fn sanitize(
        &self,
        speaker: &TeamSpec,
        opponent: &TeamSpec,
        raw: &str,
        previous: Option<&str>,
    ) -> String {
        let mut text = strip_placeholders(raw);
        text = strip_speaker_labels(&text, &speaker.tag, &opponent.tag);

        let forbidden = self.rosters.roster(opponent.id, self.season).await;
        text = redact_forbidden_names(&text, &forbidden);

        if let Some(previous) = previous {
            text = strip_repeated_opening(&text, previous);
        }

        collapse_whitespace(&text)
    }
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\[\]{}…]").expect("valid placeholder regex"))
}

/// Step 1: drop bracket/brace/ellipsis placeholder characters
fn strip_placeholders(text: &str) -> String {
    placeholder_re().replace_all(text, "").into_owned()
}

/// Step 2: drop case-insensitive "Réponse OM :"-style label echoes for
/// either team tag
fn strip_speaker_labels(text: &str, tag_a: &str, tag_b: &str) -> String {
    let pattern = format!(
        r"(?i)\b(?:Réponse|Response)\s+(?:{}|{})\s*:",
        regex::escape(tag_a),
        regex::escape(tag_b)
    );
    match Regex::new(&pattern) {
        Ok(re) => re.replace_all(text, "").into_owned(),
        Err(e) => {
            warn!(error = %e, "label pattern failed to compile, skipping step");
            text.to_string()
        }
    }
}

fn qualifier_after(text: &str, from: usize) -> bool {
    let rest = text[from..].to_lowercase();
    COMPARISON_QUALIFIERS.iter().any(|q| rest.contains(q))
}

/// Step 3: redact whole-word occurrences of opposing-squad names, unless a
/// comparison qualifier appears later in the text
fn redact_forbidden_names(text: &str, forbidden: &[String]) -> String {
    let mut ranges: Vec<(usize, usize)> = Vec::new();

    for name in forbidden.iter().filter(|n| !n.trim().is_empty()) {
        let pattern = format!(r"(?i)\b{}\b", regex::escape(name));
        let re = match Regex::new(&pattern) {
            Ok(re) => re,
            Err(e) => {
                warn!(name, error = %e, "name pattern failed to compile, skipping");
                continue;
            }
        };
        for m in re.find_iter(text) {
            if !qualifier_after(text, m.end()) {
                ranges.push((m.start(), m.end()));
            }
        }
    }

    if ranges.is_empty() {
        return text.to_string();
    }

    // Merge overlaps (e.g. "Silva" inside "Thiago Silva"), then cut
    ranges.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end) in merged {
        out.push_str(&text[cursor..start]);
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// Step 4: strip a verbatim-repeated opening sentence carried over from the
/// previous opponent turn
fn strip_repeated_opening(text: &str, previous: &str) -> String {
    let first_line = previous.trim().lines().next().unwrap_or_default();
    let snip: String = first_line.chars().take(OPENING_PREFIX_CHARS).collect();
    if !snip.is_empty() && text.starts_with(&snip) {
        text[snip.len()..].trim_start().to_string()
    } else {
        text.to_string()
    }
}

fn blank_runs_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{2,}").expect("valid blank-run regex"))
}

/// Step 5: collapse runs of blank lines to one, trim the ends
fn collapse_whitespace(text: &str) -> String {
    blank_runs_re().replace_all(text, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRoster(Vec<String>);

    #[async_trait]
    impl RosterSource for FixedRoster {
        async fn roster(&self, _team: TeamId, _season: Season) -> Vec<String> {
            self.0.clone()
        }
    }

    fn sanitizer_with(names: &[&str]) -> Sanitizer {
        Sanitizer::new(
            Arc::new(FixedRoster(names.iter().map(|s| s.to_string()).collect())),
            Season::new(2023),
        )
    }

    fn om() -> TeamSpec {
        TeamSpec::marseille()
    }

    fn psg() -> TeamSpec {
        TeamSpec::paris()
    }

    #[tokio::test]
    async fn placeholders_and_labels_are_stripped() {
        let sanitizer = sanitizer_with(&[]);
        let cleaned = sanitizer
            .sanitize(&om(), &psg(), "réponse om : on y croit [vraiment] {fort}…", None)
            .await;
        assert_eq!(cleaned, "on y croit vraiment fort");
    }

    #[tokio::test]
    async fn forbidden_name_is_redacted_without_qualifier() {
        let sanitizer = sanitizer_with(&["Mbappé"]);
        let cleaned = sanitizer
            .sanitize(&om(), &psg(), "Mbappé is weak today", None)
            .await;
        assert!(!cleaned.contains("Mbappé"));
        assert!(cleaned.contains("is weak today"));
    }

    #[tokio::test]
    async fn qualifier_later_in_text_suppresses_redaction() {
        let sanitizer = sanitizer_with(&["Mbappé"]);
        let cleaned = sanitizer
            .sanitize(
                &om(),
                &psg(),
                "Mbappé is weak today but honestly stronger than most",
                None,
            )
            .await;
        assert!(cleaned.contains("Mbappé"));
    }

    #[tokio::test]
    async fn qualifier_before_the_name_does_not_count() {
        let sanitizer = sanitizer_with(&["Mbappé"]);
        let cleaned = sanitizer
            .sanitize(&om(), &psg(), "On est meilleur. Mbappé n'a rien montré", None)
            .await;
        assert!(!cleaned.contains("Mbappé"));
    }

    #[tokio::test]
    async fn whole_word_matching_spares_substrings() {
        let sanitizer = sanitizer_with(&["Ali"]);
        let cleaned = sanitizer
            .sanitize(&om(), &psg(), "Il salive devant Ali au stade", None)
            .await;
        assert!(cleaned.contains("salive"));
        assert!(!cleaned.contains("Ali"));
    }

    #[tokio::test]
    async fn repeated_opening_is_stripped() {
        let sanitizer = sanitizer_with(&[]);
        let previous = "Notre milieu domine largement ce match.\nEt de loin.";
        let raw = "Notre milieu domine largement ce match. Mais pas que ça.";
        let cleaned = sanitizer
            .sanitize(&om(), &psg(), raw, Some(previous))
            .await;
        assert!(!cleaned.starts_with("Notre milieu domine"));
        assert_eq!(cleaned, "Mais pas que ça.");
    }

    #[tokio::test]
    async fn different_opening_is_kept() {
        let sanitizer = sanitizer_with(&[]);
        let cleaned = sanitizer
            .sanitize(
                &om(),
                &psg(),
                "Un tout autre angle d'attaque.",
                Some("Notre milieu domine largement ce match."),
            )
            .await;
        assert_eq!(cleaned, "Un tout autre angle d'attaque.");
    }

    #[tokio::test]
    async fn blank_runs_collapse_and_ends_trim() {
        let sanitizer = sanitizer_with(&[]);
        let cleaned = sanitizer
            .sanitize(&om(), &psg(), "  Un.\n\n\n\nDeux.\n\n", None)
            .await;
        assert_eq!(cleaned, "Un.\n\nDeux.");
    }

    #[tokio::test]
    async fn empty_input_stays_empty() {
        let sanitizer = sanitizer_with(&["Mbappé"]);
        assert_eq!(sanitizer.sanitize(&om(), &psg(), "", None).await, "");
    }
}
