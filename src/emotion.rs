//! Emotion keyword catalog.
//!
//! Each [`EmotionRecord`] maps an emotion name to a frequency label from one of
//! two fixed catalogs. The table is static metadata for the reply; nothing is
//! computed from the numbers.

use serde::{Deserialize, Serialize};

use crate::query::words;

/// Which table a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Catalog {
    /// Brainwave band labels.
    Neuroscience,
    /// Solfeggio-style tone labels.
    Metaphysical,
}

impl Catalog {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Neuroscience => "neuroscience",
            Self::Metaphysical => "metaphysical",
        }
    }
}

impl std::fmt::Display for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Catalog {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "neuroscience" => Ok(Self::Neuroscience),
            "metaphysical" => Ok(Self::Metaphysical),
            _ => Err(format!("unknown emotion catalog: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionRecord {
    pub emotion_name: &'static str,
    /// Hz.
    pub frequency_value: f64,
    pub basis_label: &'static str,
    pub catalog: Catalog,
}

/// Trigger words per emotion, checked in this order.
const TRIGGERS: &[(&str, &[&str])] = &[
    ("anxious", &["anxious", "anxiety", "nervous", "worried", "worry", "panic", "panicking", "stressed", "overwhelmed"]),
    ("sad", &["sad", "unhappy", "depressed", "miserable", "crying", "heartbroken", "grief", "grieving"]),
    ("angry", &["angry", "mad", "furious", "annoyed", "frustrated", "irritated", "rage"]),
    ("afraid", &["afraid", "scared", "fear", "frightened", "terrified"]),
    ("lonely", &["lonely", "alone", "isolated"]),
    ("tired", &["tired", "exhausted", "sleepy", "drained", "fatigued"]),
    ("happy", &["happy", "glad", "joyful", "joy", "excited", "wonderful", "delighted"]),
    ("grateful", &["grateful", "thankful", "blessed", "appreciative"]),
    ("calm", &["calm", "peaceful", "relaxed", "serene"]),
    ("loved", &["loved", "love", "caring", "affection"]),
];

const NEUROSCIENCE: &[EmotionRecord] = &[
    record("anxious", 22.0, "high beta", Catalog::Neuroscience),
    record("sad", 6.0, "theta", Catalog::Neuroscience),
    record("angry", 25.0, "high beta", Catalog::Neuroscience),
    record("afraid", 28.0, "high beta", Catalog::Neuroscience),
    record("lonely", 7.0, "theta", Catalog::Neuroscience),
    record("tired", 2.0, "delta", Catalog::Neuroscience),
    record("happy", 40.0, "gamma", Catalog::Neuroscience),
    record("grateful", 40.0, "gamma", Catalog::Neuroscience),
    record("calm", 10.0, "alpha", Catalog::Neuroscience),
    record("loved", 10.0, "alpha", Catalog::Neuroscience),
];

const METAPHYSICAL: &[EmotionRecord] = &[
    record("anxious", 396.0, "liberating fear", Catalog::Metaphysical),
    record("sad", 417.0, "facilitating change", Catalog::Metaphysical),
    record("angry", 396.0, "liberating fear", Catalog::Metaphysical),
    record("afraid", 396.0, "liberating fear", Catalog::Metaphysical),
    record("lonely", 639.0, "connecting relationships", Catalog::Metaphysical),
    record("tired", 174.0, "foundation", Catalog::Metaphysical),
    record("happy", 528.0, "transformation", Catalog::Metaphysical),
    record("grateful", 528.0, "transformation", Catalog::Metaphysical),
    record("calm", 432.0, "natural tuning", Catalog::Metaphysical),
    record("loved", 639.0, "connecting relationships", Catalog::Metaphysical),
];

const fn record(
    emotion_name: &'static str,
    frequency_value: f64,
    basis_label: &'static str,
    catalog: Catalog,
) -> EmotionRecord {
    EmotionRecord {
        emotion_name,
        frequency_value,
        basis_label,
        catalog,
    }
}

fn table(catalog: Catalog) -> &'static [EmotionRecord] {
    match catalog {
        Catalog::Neuroscience => NEUROSCIENCE,
        Catalog::Metaphysical => METAPHYSICAL,
    }
}

/// Record for an emotion name in `catalog`.
pub fn lookup(emotion_name: &str, catalog: Catalog) -> Option<&'static EmotionRecord> {
    table(catalog)
        .iter()
        .find(|r| r.emotion_name.eq_ignore_ascii_case(emotion_name))
}

/// First emotion whose trigger word appears in `text`, resolved in `catalog`.
pub fn detect(text: &str, catalog: Catalog) -> Option<&'static EmotionRecord> {
    let tokens = words(text);
    TRIGGERS
        .iter()
        .find(|(_, triggers)| tokens.iter().any(|t| triggers.contains(&t.as_str())))
        .and_then(|(name, _)| lookup(name, catalog))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_trigger_has_a_record_in_both_catalogs() {
        for (name, _) in TRIGGERS {
            assert!(lookup(name, Catalog::Neuroscience).is_some(), "{name}");
            assert!(lookup(name, Catalog::Metaphysical).is_some(), "{name}");
        }
    }

    #[test]
    fn detect_picks_catalog_record() {
        let neuro = detect("I'm so stressed about exams", Catalog::Neuroscience).unwrap();
        assert_eq!(neuro.emotion_name, "anxious");
        assert_eq!(neuro.basis_label, "high beta");

        let meta = detect("I'm so stressed about exams", Catalog::Metaphysical).unwrap();
        assert_eq!(meta.frequency_value, 396.0);
    }

    #[test]
    fn detect_is_word_based() {
        // "madness" must not trigger "mad"
        assert!(detect("the madness of crowds", Catalog::Neuroscience).is_none());
    }

    #[test]
    fn catalog_parses() {
        assert_eq!("metaphysical".parse::<Catalog>().unwrap(), Catalog::Metaphysical);
        assert!("astrology".parse::<Catalog>().is_err());
    }
}
