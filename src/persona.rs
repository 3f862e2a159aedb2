//! Persona directives for the two fan agents
//!
//! Pure template assembly with random sampling of flavor text. The random
//! source is injected by the caller so a fixed seed reproduces the exact
//! directive. Expected stylistic keywords missing from a produced directive
//! are logged as warnings, never fatal.

use crate::config::TeamSpec;
use crate::error::{Error, Result};
use crate::types::DebateId;
use rand::seq::SliceRandom;
use rand::Rng;
use std::str::FromStr;
use tracing::warn;

/// Debate personality of a fan agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Personality {
    /// The calm neighbour who knows a bit about football
    Standard,
    /// The hardcore fan who tolerates no criticism
    Ultra,
    /// The radical fan, all verbal intimidation and bravado
    Hooligan,
    /// The pro behind the microphone, live numbers and analysis
    Commentator,
    /// The veteran sharing dressing-room stories
    FormerPlayer,
    /// The strategist decoding shapes, movement and stats
    TacticsExpert,
    /// The badly informed provocateur, deliberate typos included
    Footix,
    /// The sensationalist: scoops, rumours, shock headlines
    FreelanceJournalist,
    /// The nostalgic of the 70s, always back to the good old days
    GrandmaSupporter,
}

impl Personality {
    /// All personalities, for UI listings and validation messages
    pub const ALL: [Personality; 9] = [
        Personality::Standard,
        Personality::Ultra,
        Personality::Hooligan,
        Personality::Commentator,
        Personality::FormerPlayer,
        Personality::TacticsExpert,
        Personality::Footix,
        Personality::FreelanceJournalist,
        Personality::GrandmaSupporter,
    ];

    /// Canonical label (matches the original UI keys)
    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::Standard => "Standard",
            Personality::Ultra => "Ultra",
            Personality::Hooligan => "Hooligan",
            Personality::Commentator => "Commentateur",
            Personality::FormerPlayer => "Ancien Joueur",
            Personality::TacticsExpert => "Expert Tactique",
            Personality::Footix => "Footix",
            Personality::FreelanceJournalist => "Journaliste Free-Lance",
            Personality::GrandmaSupporter => "Supporter Mémé",
        }
    }

    /// Short description for UI listings
    pub fn description(&self) -> &'static str {
        match self {
            Personality::Standard => "Le voisin sympa qui s'y connaît un peu, mais sans folie.",
            Personality::Ultra => {
                "Le fan hardcore qui refuse toute critique et vit le foot comme une religion."
            }
            Personality::Hooligan => {
                "Le supporter radical, prêt à en découdre verbalement, très agressif."
            }
            Personality::Commentator => {
                "Le pro derrière le micro, chiffres et analyses en temps réel."
            }
            Personality::FormerPlayer => {
                "Le vétéran qui partage anecdotes et regrets de carrière."
            }
            Personality::TacticsExpert => {
                "Le stratège qui décrypte schémas, mouvements et stats."
            }
            Personality::Footix => {
                "Le provocateur mal informé, bourré de vannes et de fautes volontaires."
            }
            Personality::FreelanceJournalist => {
                "Le sensationaliste : scoops, rumeurs et titres chocs."
            }
            Personality::GrandmaSupporter => {
                "La nostalgique des années 70, toujours prête à évoquer le bon vieux temps."
            }
        }
    }

    /// Stylistic keywords the directive is expected to contain
    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Personality::Standard => &[],
            Personality::Ultra => &["!!!", "aucune critique"],
            Personality::Hooligan => &["intimidation", "démonter"],
            Personality::Commentator => &["stats", "technique"],
            Personality::FormerPlayer => &["vestiaire", "anecdotes"],
            Personality::TacticsExpert => &["schémas", "transitions"],
            Personality::Footix => &["wé", "trop bo"],
            Personality::FreelanceJournalist => &["scoops", "chocs"],
            Personality::GrandmaSupporter => &["souvenirs", "jardin"],
        }
    }
}

impl FromStr for Personality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Personality::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::invalid_input(format!(
                    "unknown personality '{s}', expected one of: {}",
                    Personality::ALL.map(|p| p.as_str()).join(", ")
                ))
            })
    }
}

impl std::fmt::Display for Personality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Expressions {
    colloquial: &'static [&'static str],
    interjections: &'static [&'static str],
    emoticons: &'static [&'static str],
}

const OM_EXPRESSIONS: Expressions = Expressions {
    colloquial: &[
        "oh fan de chichoune",
        "boulegan",
        "peuchère",
        "péguer",
        "fada",
        "pitchoun",
        "chépa",
        "tchatche",
        "gavé",
        "oulà",
    ],
    interjections: &["allez l'OM !", "oulà", "éh bé", "tu vois", "quoi"],
    emoticons: &["🔵", "💙", "⚽️", "🤟"],
};

const PSG_EXPRESSIONS: Expressions = Expressions {
    colloquial: &[
        "wesh mon reuf",
        "chelou",
        "paname",
        "chanmé",
        "money",
        "poto",
        "dégaine",
        "sape",
        "chiller",
        "la mif",
    ],
    interjections: &["allez Paris !", "oh la la", "mdr", "grave", "t'as capté"],
    emoticons: &["🔴", "⭐️", "🏆", "✌️"],
};

const NEUTRAL_EXPRESSIONS: Expressions = Expressions {
    colloquial: &[],
    interjections: &[],
    emoticons: &["⚽️"],
};

fn expressions_for(tag: &str) -> &'static Expressions {
    match tag {
        "OM" => &OM_EXPRESSIONS,
        "PSG" => &PSG_EXPRESSIONS,
        _ => &NEUTRAL_EXPRESSIONS,
    }
}

fn examples_for(personality: Personality) -> &'static [&'static str] {
    match personality {
        Personality::Standard => &[
            "J'aime notre collectif, on reste soudés jusqu'au bout.",
            "Il faut garder la tête froide et jouer simple.",
            "Notre force, c'est la solidarité sur le terrain.",
        ],
        Personality::Ultra => &[
            "ALLEZ, ON LÂCHE RIEN!!!",
            "C'EST NOTRE MATCH, PAS DE PITIÉ!!!",
            "ON EST LES MEILLEURS, POINT FINAL!!!",
        ],
        Personality::Hooligan => &[
            "ON VA VOUS DÉMONTER!!! LE STADE EST À NOUS!!!",
            "VOUS N'AVEZ RIEN À FAIRE ICI!!! ON EST LES ROIS!!!",
            "VOUS ALLEZ RENTRER EN PLEURANT!!! C'EST CHEZ NOUS ICI!!!",
        ],
        Personality::Commentator => &[
            "Minute 75 : possession à 68 %, très intéressant.",
            "Le pressing haut génère 5 interceptions à l'heure.",
            "Le bloc médian sur les ailes fonctionne parfaitement.",
        ],
        Personality::FormerPlayer => &[
            "Je me souviens en 2005, ce but en prolongation…",
            "Dans le vestiaire, l'ambiance était électrique.",
            "À l'entraînement, on travaillait les actions fixes tous les matins.",
        ],
        Personality::TacticsExpert => &[
            "Le 4-3-3 fluidifie la circulation ballon-attaquant.",
            "Bloc bas risqué : attention aux transversales.",
            "Optimiser la largeur pour écarter la défense.",
        ],
        Personality::Footix => &[
            "wé trop bo match lol",
            "jai pa capté, mais c cool je crois",
            "on gagne tro fassile, c ouf",
        ],
        Personality::FreelanceJournalist => &[
            "Breaking : transfert choc imminent…",
            "Selon nos infos, le coach vacille.",
            "Un scandale couve en coulisses.",
        ],
        Personality::GrandmaSupporter => &[
            "À mon temps, on gagnait tout avec Papin !",
            "Je vous prépare une tarte après le match.",
            "Mon jardin fleurit quand l'équipe gagne.",
        ],
    }
}

/// Builds persona directive blocks for debate prompts
#[derive(Debug, Default)]
pub struct PersonaProvider;

impl PersonaProvider {
    /// Create a provider
    pub fn new() -> Self {
        Self
    }

    /// Build the full persona directive for one agent. Sampling goes
    /// through `rng`; the same seed yields the same directive.
    pub fn build_directive<R: Rng>(
        &self,
        rng: &mut R,
        team: &TeamSpec,
        personality: Personality,
        format_label: &str,
        slang_level: f32,
        debate_id: DebateId,
    ) -> String {
        let ex = expressions_for(&team.tag);
        let sample_colloquial = sample_join(rng, ex.colloquial, 5, ", ");
        let sample_interjections = sample_join(rng, ex.interjections, 4, ", ");
        let sample_emoticons = sample_join(rng, ex.emoticons, 3, " ");

        let mut blocks: Vec<String> = Vec::new();
        match personality {
            Personality::Standard => {
                blocks.push(format!(
                    "• Supporter calme et posé de {}, langage neutre.",
                    team.tag
                ));
                blocks.push(format!("• Ponctue avec parcimonie : {sample_emoticons}."));
            }
            Personality::Ultra => {
                blocks.push(format!(
                    "• Ultra de {} : argot ({sample_colloquial}), interjections ({sample_interjections}), MAJUSCULES !!!",
                    team.tag
                ));
                blocks.push("• Aucune critique tolérée, passion extrême.".to_string());
            }
            Personality::Hooligan => {
                blocks.push(format!(
                    "• Hooligan de {} : langage agressif, argot ({sample_colloquial}), provocations ({sample_interjections}), MAJUSCULES !!!",
                    team.tag
                ));
                blocks.push(
                    "• Intimidation strictement verbale, domination psychologique, on démonte l'adversaire sans aucune diplomatie.".to_string(),
                );
            }
            Personality::Commentator => {
                blocks.push(
                    "• Commentateur pro : stats en direct, vocabulaire technique, structure live TV."
                        .to_string(),
                );
            }
            Personality::FormerPlayer => {
                blocks.push(
                    "• Ancien joueur : anecdotes de vestiaire, émotions, camaraderie.".to_string(),
                );
            }
            Personality::TacticsExpert => {
                blocks.push(
                    "• Expert tactique : schémas, transitions, bloc haut/bas, passes clés."
                        .to_string(),
                );
            }
            Personality::Footix => {
                blocks.push(
                    "• Footix : mal informé, fautes volontaires ('wé', 'trop bo'), vannes loufoques."
                        .to_string(),
                );
            }
            Personality::FreelanceJournalist => {
                blocks.push(
                    "• Journaliste sensationaliste : titres chocs, scoops, teasers.".to_string(),
                );
            }
            Personality::GrandmaSupporter => {
                blocks.push(
                    "• Mémé nostalgique : souvenirs, jardin, madeleines, affectueuse.".to_string(),
                );
            }
        }

        blocks.push("Exemples :".to_string());
        for example in sample(rng, examples_for(personality), 3) {
            blocks.push(format!("- {example}"));
        }

        if slang_level < 1.0 {
            blocks.push(format!(
                "Niveau d'argot : {} %, mélange neutre/argot.",
                (slang_level * 100.0) as u32
            ));
        }

        let human_style = "Parle naturellement : utilise contractions, hésitations, \
                           variations de rythme, évite répétitions exactes.";

        let directive = format!(
            "Debate-ID: {debate_id}\n\
             Équipe: {}\n\
             Format: {format_label}\n\
             Persona: {} (argot {} %)\n\n\
             {}\n\n\
             {human_style}",
            team.tag,
            personality,
            (slang_level * 100.0) as u32,
            blocks.join("\n"),
        );

        for keyword in personality.keywords() {
            if !directive.to_lowercase().contains(&keyword.to_lowercase()) {
                warn!(
                    personality = %personality,
                    keyword,
                    "expected stylistic keyword missing from persona directive"
                );
            }
        }

        directive
    }
}

fn sample<'a, R: Rng>(rng: &mut R, pool: &[&'a str], k: usize) -> Vec<&'a str> {
    pool.choose_multiple(rng, k.min(pool.len())).copied().collect()
}

fn sample_join<R: Rng>(rng: &mut R, pool: &[&str], k: usize, sep: &str) -> String {
    sample(rng, pool, k).join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn personality_labels_roundtrip() {
        for personality in Personality::ALL {
            assert_eq!(
                personality.as_str().parse::<Personality>().unwrap(),
                personality
            );
        }
        assert!("Tifo Capo".parse::<Personality>().is_err());
    }

    #[test]
    fn directive_is_reproducible_under_a_fixed_seed() {
        let provider = PersonaProvider::new();
        let team = TeamSpec::marseille();
        let id = DebateId::new();

        let build = |seed: u64| {
            let mut rng = StdRng::seed_from_u64(seed);
            provider.build_directive(&mut rng, &team, Personality::Ultra, "Choc Ultime", 1.0, id)
        };

        assert_eq!(build(7), build(7));
    }

    #[test]
    fn hooligan_directive_stays_strictly_verbal() {
        let provider = PersonaProvider::new();
        let mut rng = StdRng::seed_from_u64(0);
        let directive = provider.build_directive(
            &mut rng,
            &TeamSpec::marseille(),
            Personality::Hooligan,
            "Choc Ultime",
            1.0,
            DebateId::new(),
        );
        assert!(directive.contains("Hooligan de OM"));
        assert!(directive.contains("Intimidation strictement verbale"));
        assert_eq!("Hooligan".parse::<Personality>().unwrap(), Personality::Hooligan);
    }

    #[test]
    fn slang_level_below_one_is_announced() {
        let provider = PersonaProvider::new();
        let mut rng = StdRng::seed_from_u64(0);
        let directive = provider.build_directive(
            &mut rng,
            &TeamSpec::paris(),
            Personality::Standard,
            "Happy Hour",
            0.4,
            DebateId::new(),
        );
        assert!(directive.contains("Niveau d'argot : 40 %"));
        assert!(directive.contains("Équipe: PSG"));
    }
}
