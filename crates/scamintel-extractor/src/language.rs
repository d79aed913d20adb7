//! Language detection module
//!
//! Heuristic language identification used to pick regional defaults
//! (phone country codes, local payment systems). Scores each supported
//! language by:
//! - Script ranges: any character in the language's Unicode block adds a
//!   large fixed bonus (Devanagari, CJK, Arabic, Cyrillic)
//! - Function words: each common word found as a whole word adds a small
//!   increment

use scamintel_core::{Language, LanguageDetection};

/// Bonus for a matching script; dominates word scoring
const SCRIPT_WEIGHT: f32 = 10.0;
/// Increment per common word found
const WORD_WEIGHT: f32 = 0.5;
/// Score that maps to full confidence
const CONFIDENCE_SCALE: f32 = 5.0;
/// Below this the result is reported as unknown
const MIN_CONFIDENCE: f32 = 0.2;

/// Unicode block that identifies a language on its own
struct ScriptRange {
    language: Language,
    start: char,
    end: char,
}

const SCRIPT_RANGES: &[ScriptRange] = &[
    ScriptRange {
        language: Language::Hi,
        start: '\u{0900}',
        end: '\u{097F}',
    },
    ScriptRange {
        language: Language::Zh,
        start: '\u{4E00}',
        end: '\u{9FFF}',
    },
    ScriptRange {
        language: Language::Ar,
        start: '\u{0600}',
        end: '\u{06FF}',
    },
    ScriptRange {
        language: Language::Ru,
        start: '\u{0400}',
        end: '\u{04FF}',
    },
];

fn common_words(language: Language) -> &'static [&'static str] {
    match language {
        Language::En => &[
            "the", "is", "are", "you", "your", "and", "to", "of", "this", "that", "have", "will",
            "please",
        ],
        Language::Es => &[
            "el", "la", "los", "las", "que", "y", "es", "por", "para", "usted", "con", "su",
        ],
        Language::Fr => &[
            "le", "les", "et", "est", "vous", "pour", "une", "avec", "votre", "nous", "pas",
        ],
        Language::De => &[
            "der", "die", "das", "und", "ist", "sie", "nicht", "ein", "eine", "mit", "ihr",
            "bitte",
        ],
        Language::Hi => &[
            "hai", "aap", "kya", "nahi", "mera", "aapka", "karo", "है", "आप", "का", "की",
        ],
        Language::Zh => &["的", "是", "你", "我", "了", "在"],
        Language::Ar => &["في", "من", "على", "أن", "هذا", "إلى"],
        Language::Ru => &["и", "в", "не", "на", "что", "вы", "это"],
        Language::Pt => &[
            "o", "os", "não", "você", "seu", "sua", "uma", "com", "para", "obrigado",
        ],
        Language::It => &[
            "il", "di", "che", "è", "per", "non", "sono", "lei", "grazie", "della",
        ],
        Language::Unknown => &[],
    }
}

/// Script- and word-based language detector
#[derive(Debug, Clone, Copy, Default)]
pub struct LanguageDetector;

impl LanguageDetector {
    pub fn new() -> Self {
        Self
    }

    /// Detect the language of `text`.
    ///
    /// Never fails: empty input or a weak signal yields
    /// `{language: unknown, confidence: 0}`.
    pub fn detect(&self, text: &str) -> LanguageDetection {
        if text.trim().is_empty() {
            return LanguageDetection::unknown();
        }

        let mut scores = [0.0f32; Language::SUPPORTED.len()];

        for range in SCRIPT_RANGES {
            if text.chars().any(|c| c >= range.start && c <= range.end) {
                scores[index_of(range.language)] += SCRIPT_WEIGHT;
            }
        }

        let padded = format!(" {} ", text.to_lowercase());
        for (i, language) in Language::SUPPORTED.iter().enumerate() {
            let hits = common_words(*language)
                .iter()
                .filter(|word| padded.contains(&format!(" {word} ")))
                .count();
            scores[i] += hits as f32 * WORD_WEIGHT;
        }

        // First language to reach the maximum wins ties
        let best = scores
            .iter()
            .enumerate()
            .fold(0, |best, (i, score)| if *score > scores[best] { i } else { best });

        let confidence = (scores[best] / CONFIDENCE_SCALE).min(1.0);
        if confidence < MIN_CONFIDENCE {
            return LanguageDetection::unknown();
        }

        LanguageDetection::new(Language::SUPPORTED[best], confidence)
    }
}

fn index_of(language: Language) -> usize {
    Language::SUPPORTED
        .iter()
        .position(|l| *l == language)
        .unwrap_or(0)
}
