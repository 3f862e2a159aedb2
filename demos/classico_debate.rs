//! OM vs PSG debate, end to end
//!
//! Requires `FOOTBALL_DATA_API_KEY` and `OPENROUTER_API_KEY` in the
//! environment (or a local `.env`). The topic can be overridden on the
//! command line:
//!
//! ```sh
//! cargo run --example classico_debate -- "Qui a le meilleur milieu ?"
//! ```

use classico::{DebateRequest, DebateService};

#[tokio::main]
async fn main() -> classico::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let topic = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Qui gagne le Classique ?".to_string());

    let service = DebateService::from_env()?;
    let report = service
        .submit(
            DebateRequest::new(topic)
                .with_format("Choc Ultime")
                .with_personas("Ultra", "Commentateur")
                .with_max_turns(6)
                .with_output_file("debate.json"),
        )
        .await?;

    println!("Débat {} : {}\n", report.id, report.topic);
    for turn in report.outcome.transcript.turns() {
        println!(
            "[{}] ({} ms)\n{}\n",
            turn.speaker,
            turn.generation_time.as_millis(),
            turn.sanitized
        );
    }

    if let Some(error) = &report.outcome.error {
        eprintln!(
            "Le débat s'est arrêté au tour {} ({}) : {}",
            error.index, error.speaker, error.message
        );
    }

    Ok(())
}
