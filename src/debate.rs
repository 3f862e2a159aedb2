//! Turn orchestration: strict alternation between the two fan agents
//!
//! `DebateSession` is the read-only description of a debate, fixed at
//! creation. `DebateRun` is the step-wise state machine over it: each
//! `advance` produces exactly one sanitized turn; `run_to_completion`
//! drives it to the configured turn count and surfaces the partial
//! transcript together with the failing turn when generation breaks
//! mid-debate.

use crate::config::TeamSpec;
use crate::context::TeamContext;
use crate::generate::Generator;
use crate::persona::Personality;
use crate::sanitize::Sanitizer;
use crate::types::DebateId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

/// One fan agent: team identity plus its prepared context and directive
#[derive(Debug, Clone)]
pub struct Agent {
    /// Team the agent argues for
    pub spec: TeamSpec,
    /// Debate personality
    pub personality: Personality,
    /// Factual context built once before the first turn
    pub context: TeamContext,
    /// Persona directive built once before the first turn
    pub directive: String,
}

/// Read-only description of one debate, fixed at session start.
/// `agents[0]` opens; turns then alternate strictly.
#[derive(Debug, Clone)]
pub struct DebateSession {
    /// Debate identifier
    pub id: DebateId,
    /// Debate question put to both agents
    pub topic: String,
    /// Debate format label
    pub format: String,
    /// Total number of turns across both agents
    pub max_turns: u32,
    /// Model identifier for generation
    pub model: String,
    /// The two agents, opener first
    pub agents: [Agent; 2],
}

/// One completed debate turn
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    /// Zero-based position in the transcript
    pub index: usize,
    /// Speaking team's tag
    pub speaker: String,
    /// Raw generated text, before sanitization
    pub raw: String,
    /// Sanitized text shown to the audience
    pub sanitized: String,
    /// When the turn completed
    pub timestamp: DateTime<Utc>,
    /// Wall-clock time spent in generation
    pub generation_time: Duration,
}

/// Append-only sequence of completed turns
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Completed turns in order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Number of completed turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turn has completed yet
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Last completed turn, if any
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }
}

/// The turn where a debate broke, with the error that broke it
#[derive(Debug, Clone, Serialize)]
pub struct TurnError {
    /// Index the failing turn would have had
    pub index: usize,
    /// Tag of the team that was about to speak
    pub speaker: String,
    /// Error description
    pub message: String,
}

/// Final state of a debate: everything that completed, plus the failure
/// marker when it did not run to the configured turn count
#[derive(Debug, Serialize)]
pub struct DebateOutcome {
    /// Turns completed before the end or the failure
    pub transcript: Transcript,
    /// Failure marker; `None` when every turn completed
    pub error: Option<TurnError>,
}

/// Step-wise debate state machine over a prepared session
pub struct DebateRun {
    session: DebateSession,
    generator: Arc<dyn Generator>,
    sanitizer: Sanitizer,
    transcript: Transcript,
}

impl DebateRun {
    /// Create a run over a prepared session
    pub fn new(session: DebateSession, generator: Arc<dyn Generator>, sanitizer: Sanitizer) -> Self {
        Self {
            session,
            generator,
            sanitizer,
            transcript: Transcript::default(),
        }
    }

    /// The session being run
    pub fn session(&self) -> &DebateSession {
        &self.session
    }

    /// Transcript of completed turns
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether the configured turn count has been reached
    pub fn is_complete(&self) -> bool {
        self.transcript.len() as u32 >= self.session.max_turns
    }

    fn speaker_index(&self) -> usize {
        self.transcript.len() % 2
    }

    /// Produce the next turn. Returns `Ok(None)` once the run is complete.
    /// A generation failure leaves the transcript untouched so the caller
    /// sees exactly the turns that completed.
    pub async fn advance(&mut self) -> crate::error::Result<Option<&Turn>> {
        if self.is_complete() {
            return Ok(None);
        }

        let index = self.transcript.len();
        let side = self.speaker_index();
        let speaker = self.session.agents[side].clone();
        let opponent_spec = self.session.agents[1 - side].spec.clone();
        let previous = self.transcript.last().map(|t| t.sanitized.clone());

        let prompt = self.build_prompt(&speaker, &opponent_spec, previous.as_deref());

        let started = Instant::now();
        let raw = self.generator.generate(&prompt, &self.session.model).await?;
        let generation_time = started.elapsed();

        let sanitized = self
            .sanitizer
            .sanitize(&speaker.spec, &opponent_spec, &raw, previous.as_deref())
            .await;

        info!(
            debate = %self.session.id,
            index,
            speaker = %speaker.spec.tag,
            ms = generation_time.as_millis() as u64,
            "turn completed"
        );

        self.transcript.push(Turn {
            index,
            speaker: speaker.spec.tag.clone(),
            raw,
            sanitized,
            timestamp: Utc::now(),
            generation_time,
        });

        Ok(self.transcript.last())
    }

    /// Drive the run to the configured turn count. A generation failure
    /// stops the debate and is reported alongside the partial transcript.
    pub async fn run_to_completion(mut self) -> DebateOutcome {
        let mut error = None;
        loop {
            match self.advance().await {
                Ok(Some(_)) => {}
                Ok(None) => break,
                Err(e) => {
                    let index = self.transcript.len();
                    let speaker = self.session.agents[index % 2].spec.tag.clone();
                    error = Some(TurnError {
                        index,
                        speaker,
                        message: e.to_string(),
                    });
                    break;
                }
            }
        }
        DebateOutcome {
            transcript: self.transcript,
            error,
        }
    }

    fn build_prompt(&self, speaker: &Agent, opponent: &TeamSpec, previous: Option<&str>) -> String {
        let mut rules = vec![
            format!(
                "- Réponds uniquement du point de vue {}, jamais pour l'adversaire.",
                speaker.spec.tag
            ),
            "- Ne cite aucun joueur de l'effectif adverse.".to_string(),
        ];
        // The Footix is wrong on purpose; pinning it to the facts defeats
        // the persona
        if speaker.personality != Personality::Footix {
            rules.push("- Appuie-toi sur les faits du contexte ci-dessus.".to_string());
        }
        rules.push("- Intègre toujours la dernière réplique adverse pour rebondir.".to_string());
        rules.push("- Ne répète jamais tes propres phrases textuellement.".to_string());
        rules.push("- Pas de crochets ni de texte à compléter.".to_string());

        let previous_block = match previous {
            Some(text) => text.to_string(),
            None => "(aucune, tu ouvres le débat)".to_string(),
        };

        format!(
            "{context}\n\n\
             Tu es un supporter de {name} ({tag}). Tu débats contre un supporter de {other}.\n\n\
             {directive}\n\n\
             Format du débat : {format}\n\n\
             Consignes :\n{rules}\n\n\
             Réplique adverse précédente :\n{previous_block}\n\n\
             Question : {topic}\n\n\
             Réponse {tag} :",
            context = speaker.context.render(),
            name = speaker.spec.name,
            tag = speaker.spec.tag,
            other = opponent.name,
            directive = speaker.directive,
            format = self.session.format,
            rules = rules.join("\n"),
            topic = self.session.topic,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::sanitize::RosterSource;
    use crate::stats::Provenance;
    use crate::types::{Season, TeamId};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct EmptyRoster;

    #[async_trait]
    impl RosterSource for EmptyRoster {
        async fn roster(&self, _team: TeamId, _season: Season) -> Vec<String> {
            Vec::new()
        }
    }

    /// Replays scripted replies in order, recording the prompts it sees.
    /// `Err` entries simulate a generation failure.
    struct ScriptedGenerator {
        replies: Mutex<Vec<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn generate(&self, prompt: &str, _model: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(Error::generation("script exhausted"));
            }
            replies.remove(0)
        }
    }

    fn agent(spec: TeamSpec, personality: Personality) -> Agent {
        let context = TeamContext {
            team: spec.id,
            name: spec.name.clone(),
            season: Season::new(2023),
            founded: spec.fallback_founded.to_string(),
            venue: spec.fallback_venue.clone(),
            stats: spec.baseline.clone(),
            provenance: Provenance::Baseline,
            roster: Vec::new(),
            summary: None,
        };
        Agent {
            directive: format!("Persona: {personality}"),
            spec,
            personality,
            context,
        }
    }

    fn run_with(
        generator: Arc<ScriptedGenerator>,
        max_turns: u32,
        personality_a: Personality,
    ) -> DebateRun {
        let session = DebateSession {
            id: DebateId::new(),
            topic: "Qui gagne le Classique ?".to_string(),
            format: "Choc Ultime".to_string(),
            max_turns,
            model: "openai/gpt-4-turbo".to_string(),
            agents: [
                agent(TeamSpec::marseille(), personality_a),
                agent(TeamSpec::paris(), Personality::Standard),
            ],
        };
        DebateRun::new(
            session,
            generator,
            Sanitizer::new(Arc::new(EmptyRoster), Season::new(2023)),
        )
    }

    #[tokio::test]
    async fn turns_alternate_from_the_opening_team() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("Un.".to_string()),
            Ok("Deux.".to_string()),
            Ok("Trois.".to_string()),
            Ok("Quatre.".to_string()),
        ]));
        let outcome = run_with(generator, 4, Personality::Ultra)
            .run_to_completion()
            .await;

        assert!(outcome.error.is_none());
        let speakers: Vec<&str> = outcome
            .transcript
            .turns()
            .iter()
            .map(|t| t.speaker.as_str())
            .collect();
        assert_eq!(speakers, vec!["OM", "PSG", "OM", "PSG"]);
        assert_eq!(outcome.transcript.turns()[2].sanitized, "Trois.");
    }

    #[tokio::test]
    async fn previous_reply_reaches_the_next_prompt() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("On domine ce match.".to_string()),
            Ok("Pas du tout.".to_string()),
        ]));
        run_with(generator.clone(), 2, Personality::Standard)
            .run_to_completion()
            .await;

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("(aucune, tu ouvres le débat)"));
        assert!(prompts[1].contains("On domine ce match."));
        assert!(prompts[1].contains("Réponse PSG :"));
    }

    #[tokio::test]
    async fn every_prompt_carries_the_anti_repetition_directives() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("Un.".to_string()),
            Ok("Deux.".to_string()),
        ]));
        run_with(generator.clone(), 2, Personality::Ultra)
            .run_to_completion()
            .await;

        let prompts = generator.prompts.lock().unwrap();
        for prompt in prompts.iter() {
            assert!(prompt.contains("Intègre toujours la dernière réplique adverse pour rebondir."));
            assert!(prompt.contains("Ne répète jamais tes propres phrases textuellement."));
        }
    }

    #[tokio::test]
    async fn generation_failure_surfaces_the_partial_transcript() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("Un.".to_string()),
            Ok("Deux.".to_string()),
            Err(Error::generation("upstream went away")),
        ]));
        let outcome = run_with(generator, 4, Personality::Standard)
            .run_to_completion()
            .await;

        assert_eq!(outcome.transcript.len(), 2);
        let error = outcome.error.unwrap();
        assert_eq!(error.index, 2);
        assert_eq!(error.speaker, "OM");
        assert!(error.message.contains("upstream went away"));
    }

    #[tokio::test]
    async fn footix_prompt_drops_the_factual_grounding_rule() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("wé trop bo".to_string()),
            Ok("Bien sûr.".to_string()),
        ]));
        run_with(generator.clone(), 2, Personality::Footix)
            .run_to_completion()
            .await;

        let prompts = generator.prompts.lock().unwrap();
        assert!(!prompts[0].contains("Appuie-toi sur les faits"));
        // The standard opponent keeps it
        assert!(prompts[1].contains("Appuie-toi sur les faits"));
    }

    #[tokio::test]
    async fn advance_past_completion_yields_none() {
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok("Un.".to_string()),
            Ok("Deux.".to_string()),
        ]));
        let mut run = run_with(generator, 2, Personality::Standard);

        assert!(run.advance().await.unwrap().is_some());
        assert!(run.advance().await.unwrap().is_some());
        assert!(run.is_complete());
        assert!(run.advance().await.unwrap().is_none());
        assert_eq!(run.transcript().len(), 2);
    }
}
