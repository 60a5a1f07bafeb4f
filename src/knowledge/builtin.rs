//! Curated answers for a handful of common questions.
//!
//! Matching is near-exact: the query is lowercased, stripped of punctuation and
//! whitespace-collapsed, then compared against each entry's phrasings. A hit
//! is either an equal string or a query that contains the phrasing.

use async_trait::async_trait;

use super::{Answer, KnowledgeSource, SourceError, SourceKind};
use crate::query::Query;

struct CuratedAnswer {
    phrasings: &'static [&'static str],
    answer: &'static str,
}

const CURATED: &[CuratedAnswer] = &[
    CuratedAnswer {
        phrasings: &["why is the sky blue", "what makes the sky blue", "why does the sky look blue"],
        answer: "The sky looks blue because of Rayleigh scattering. Sunlight is a mix of colours, \
                 and the molecules in the air scatter short wavelengths (blue and violet) much more \
                 strongly than long ones (red and orange). That scattered blue light reaches your eyes \
                 from every direction, so the whole sky appears blue. Our eyes are less sensitive to \
                 violet, and some of it is absorbed high in the atmosphere, which is why we see blue \
                 rather than purple.",
    },
    CuratedAnswer {
        phrasings: &["what are clouds made of", "what is a cloud made of", "how do clouds form"],
        answer: "Clouds are made of tiny water droplets or ice crystals floating in the air. Warm, \
                 moist air rises and cools; when it cools to its dew point the water vapour condenses \
                 onto microscopic particles such as dust, salt or smoke. Billions of those droplets \
                 together scatter light and form the cloud you see.",
    },
    CuratedAnswer {
        phrasings: &["what is photosynthesis", "how does photosynthesis work"],
        answer: "Photosynthesis is how plants, algae and some bacteria turn light into chemical \
                 energy. Using chlorophyll, they absorb sunlight and combine carbon dioxide and water \
                 into glucose, releasing oxygen as a by-product: 6CO2 + 6H2O + light -> C6H12O6 + 6O2.",
    },
    CuratedAnswer {
        phrasings: &["what is the speed of light", "how fast is light", "how fast does light travel"],
        answer: "Light travels at 299,792,458 metres per second in a vacuum, about 300,000 km/s or \
                 186,000 miles per second. It takes roughly 8 minutes and 20 seconds for sunlight to \
                 reach Earth.",
    },
    CuratedAnswer {
        phrasings: &[
            "what is the boiling point of water",
            "at what temperature does water boil",
            "when does water boil",
        ],
        answer: "At sea level water boils at 100 °C (212 °F). The boiling point drops as air \
                 pressure falls, so at high altitude water boils at a lower temperature.",
    },
    CuratedAnswer {
        phrasings: &["what is gravity", "how does gravity work"],
        answer: "Gravity is the attraction between masses. Newton described it as a force that \
                 grows with mass and weakens with the square of distance; Einstein's general \
                 relativity explains it as the curvature of spacetime caused by mass and energy. \
                 On Earth's surface it accelerates objects at about 9.8 m/s².",
    },
    CuratedAnswer {
        phrasings: &["why is the ocean salty", "why is the sea salty", "why is seawater salty"],
        answer: "Rain slowly dissolves minerals from rocks on land, and rivers carry those salts \
                 into the sea. When seawater evaporates the water leaves but the salt stays behind, \
                 so over millions of years the oceans have built up an average salinity of about \
                 3.5%, mostly sodium chloride.",
    },
    CuratedAnswer {
        phrasings: &["what is dna", "what does dna do"],
        answer: "DNA (deoxyribonucleic acid) is the molecule that carries genetic instructions in \
                 living things. It is a double helix of two strands built from four bases (A, T, C \
                 and G); the order of those bases encodes the proteins a cell can make.",
    },
    CuratedAnswer {
        phrasings: &["how do rainbows form", "how is a rainbow formed", "why do rainbows appear"],
        answer: "A rainbow forms when sunlight enters raindrops, bends (refracts), reflects off the \
                 back of the drop and refracts again on the way out. Each colour bends by a slightly \
                 different angle, so the light spreads into a spectrum, seen as an arc opposite the \
                 sun at about 42 degrees.",
    },
];

/// Lowercase, drop punctuation (apostrophes kept), collapse whitespace.
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '\'' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Look up a curated answer for `text`.
pub fn lookup(text: &str) -> Option<&'static str> {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return None;
    }
    let padded = format!(" {normalized} ");
    CURATED
        .iter()
        .find(|entry| {
            entry
                .phrasings
                .iter()
                .any(|p| normalized == *p || padded.contains(&format!(" {p} ")))
        })
        .map(|entry| entry.answer)
}

/// First source in the chain: the curated table.
#[derive(Debug, Default)]
pub struct BuiltinSource;

#[async_trait]
impl KnowledgeSource for BuiltinSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Builtin
    }

    async fn attempt(&self, query: &Query) -> Result<Option<Answer>, SourceError> {
        Ok(lookup(&query.text).map(|text| Answer::new(text, SourceKind::Builtin)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sky_blue_mentions_scattering() {
        let answer = lookup("Why is the sky blue?").unwrap();
        assert!(answer.contains("scattering"));
    }

    #[test]
    fn matches_inside_longer_question() {
        assert!(lookup("hey, can you tell me why is the sky blue??").is_some());
    }

    #[test]
    fn does_not_match_partial_words() {
        // "what is dna" must not fire on "what is dnase"
        assert!(lookup("what is dnase").is_none());
    }

    #[test]
    fn unknown_question_misses() {
        assert!(lookup("who won the 1998 world cup").is_none());
        assert!(lookup("   ").is_none());
    }
}
