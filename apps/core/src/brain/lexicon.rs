//! Keyword lexicons used by the message classifier and the scene assessor.
//!
//! Every term is compiled once into a case-insensitive regex anchored on a
//! leading word boundary: "fire" matches "fire" and "fires" but not "campfire".
//! There is no stemming. Multi-word terms match literally.

use regex::Regex;
use std::sync::LazyLock;

/// A fixed list of trigger terms with precompiled matchers.
pub struct Lexicon {
    name: &'static str,
    terms: &'static [&'static str],
    patterns: Vec<Regex>,
}

impl Lexicon {
    /// Compile a lexicon from a static term list
    pub fn new(name: &'static str, terms: &'static [&'static str]) -> Self {
        // NOTE: expect() is acceptable here, escaped literals always compile
        let patterns = terms
            .iter()
            .map(|term| {
                Regex::new(&format!(r"(?i)\b{}", regex::escape(term)))
                    .expect("Invalid regex: escaped lexicon term")
            })
            .collect();

        Self {
            name,
            terms,
            patterns,
        }
    }

    /// True if any term occurs in `text`
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    /// Number of distinct terms that occur in `text`
    pub fn count_hits(&self, text: &str) -> usize {
        self.patterns.iter().filter(|p| p.is_match(text)).count()
    }

    /// Terms that occur in `text`, in declaration order
    pub fn matched_terms(&self, text: &str) -> Vec<&'static str> {
        self.terms
            .iter()
            .zip(&self.patterns)
            .filter(|(_, p)| p.is_match(text))
            .map(|(term, _)| *term)
            .collect()
    }
}

impl std::fmt::Debug for Lexicon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lexicon")
            .field("name", &self.name)
            .field("terms", &self.terms)
            .finish()
    }
}

// ============================================================================
// Message intent
// ============================================================================

pub static PSYCHOLOGICAL_DISTRESS: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new(
        "psychological_distress",
        &[
            "anxious", "anxiety", "scared", "afraid", "worried", "panic", "stress",
            "overwhelmed", "helpless", "trauma", "ptsd", "depression", "fear",
        ],
    )
});

/// The user reports being in danger right now
pub static ACTIVE_EMERGENCY: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new(
        "active_emergency",
        &[
            "trapped",
            "help me",
            "immediate danger",
            "urgent help",
            "emergency now",
            "evacuation needed",
            "injured",
            "collapse",
            "stuck",
            "surrounded",
            "cannot escape",
            "need rescue",
            "in danger",
            "emergency situation",
        ],
    )
});

pub static INFORMATION_SEEKING: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new(
        "information_seeking",
        &[
            "news",
            "update",
            "information",
            "status",
            "report",
            "today",
            "yesterday",
            "current",
            "latest",
            "what happened",
            "tell me about",
            "is there",
            "any news",
            "what is",
            "how is",
            "condition",
            "situation in",
            "about the",
            "regarding",
        ],
    )
});

pub static DISASTER_TOPIC: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new(
        "disaster_topic",
        &[
            "fire", "flood", "earthquake", "cyclone", "tsunami", "landslide", "hurricane",
            "tornado", "volcano", "drought", "storm",
        ],
    )
});

// ============================================================================
// Scene type detection
// ============================================================================

pub static FLOOD_SIGNS: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new(
        "flood",
        &["water", "flooding", "submerged", "current", "debris", "muddy"],
    )
});

pub static FIRE_SIGNS: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new(
        "fire",
        &["smoke", "flames", "fire", "burning", "ash", "charred"],
    )
});

pub static EARTHQUAKE_SIGNS: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new(
        "earthquake",
        &["cracks", "collapsed", "rubble", "tilted", "broken"],
    )
});

pub static STRUCTURAL_SIGNS: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new(
        "structural",
        &["collapsed", "damaged", "broken", "cracked", "unsafe"],
    )
});

/// Single-keyword fallbacks when no type reaches two hits
pub static WATER_TERMS: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new("water", &["water", "flood", "wet", "submerged"]));

pub static SMOKE_TERMS: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new("smoke", &["smoke", "fire", "burn", "flame"]));

pub static STRUCTURE_TERMS: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new("structure", &["crack", "collapse", "damage", "broken"]));

// ============================================================================
// Severity tiers (checked critical first)
// ============================================================================

pub static CRITICAL_SIGNS: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new(
        "critical",
        &[
            "trapped",
            "can't escape",
            "cannot escape",
            "rising rapidly",
            "heavy smoke",
            "collapse",
            "critical",
        ],
    )
});

pub static HIGH_SIGNS: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new(
        "high",
        &[
            "knee deep",
            "waist deep",
            "blocked exit",
            "spreading",
            "unstable",
            "dangerous",
        ],
    )
});

pub static MODERATE_SIGNS: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new(
        "moderate",
        &["ankle deep", "light smoke", "minor crack", "manageable", "slow"],
    )
});

// ============================================================================
// Emotional state (checked panic, fear, confusion)
// ============================================================================

pub static PANIC_TERMS: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new("panic", &["panic", "scared", "terrified", "afraid"])
});

pub static FEAR_TERMS: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new("fear", &["worried", "anxious", "nervous", "uncertain"])
});

pub static CONFUSION_TERMS: LazyLock<Lexicon> = LazyLock::new(|| {
    Lexicon::new(
        "confusion",
        &["confused", "don't know", "not sure", "unclear"],
    )
});

// ============================================================================
// Photo detail extraction
// ============================================================================

pub static WATER_DEPTHS: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new("water_depth", &["ankle", "knee", "waist", "chest"]));

pub static MOVING_WATER: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new("moving_water", &["moving", "current", "flowing"]));

pub static FLOATING_DEBRIS: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new("debris", &["debris", "objects", "furniture"]));

pub static SMOKE_DENSITY: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new("smoke_density", &["thick", "heavy", "dense"]));

pub static EXIT_TERMS: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new("exit", &["exit", "door"]));

pub static EXIT_BLOCKERS: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new("exit_blocker", &["blocked", "smoke", "hot"]));

pub static LOW_VISIBILITY: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new("low_visibility", &["dark", "night", "low visibility"]));

pub static WEATHER_TERMS: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new("weather", &["cold", "hot", "weather"]));
