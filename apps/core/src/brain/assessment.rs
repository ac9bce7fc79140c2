//! Disaster Assessment Engine.
//!
//! Turns a free-text scene description into a structured assessment:
//! disaster type, severity, guidance, an ordered action list, extracted
//! photo details and a confidence score. Best-effort throughout: input that
//! matches nothing falls through to `general_emergency` / `low` defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::guidance;
use super::lexicon::{
    Lexicon, CRITICAL_SIGNS, EARTHQUAKE_SIGNS, EXIT_BLOCKERS, EXIT_TERMS, FIRE_SIGNS,
    FLOATING_DEBRIS, FLOOD_SIGNS, HIGH_SIGNS, LOW_VISIBILITY, MODERATE_SIGNS, MOVING_WATER,
    SMOKE_DENSITY, SMOKE_TERMS, STRUCTURAL_SIGNS, STRUCTURE_TERMS, WATER_DEPTHS, WATER_TERMS,
    WEATHER_TERMS,
};

/// Hits needed for a type lexicon to claim the scene
const TYPE_HIT_THRESHOLD: usize = 2;
const BASE_CONFIDENCE: f32 = 0.5;
const MAX_CONFIDENCE: f32 = 0.95;
const MAX_KEYWORD_BONUS: f32 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisasterType {
    Flood,
    Fire,
    Earthquake,
    Structural,
    GeneralEmergency,
}

impl DisasterType {
    /// Detection order. The first type reaching the hit threshold wins.
    pub const PRIORITY: [DisasterType; 4] = [
        DisasterType::Flood,
        DisasterType::Fire,
        DisasterType::Earthquake,
        DisasterType::Structural,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DisasterType::Flood => "flood",
            DisasterType::Fire => "fire",
            DisasterType::Earthquake => "earthquake",
            DisasterType::Structural => "structural",
            DisasterType::GeneralEmergency => "general_emergency",
        }
    }

    fn signs(&self) -> Option<&'static Lexicon> {
        match self {
            DisasterType::Flood => Some(&*FLOOD_SIGNS),
            DisasterType::Fire => Some(&*FIRE_SIGNS),
            DisasterType::Earthquake => Some(&*EARTHQUAKE_SIGNS),
            DisasterType::Structural => Some(&*STRUCTURAL_SIGNS),
            DisasterType::GeneralEmergency => None,
        }
    }
}

impl fmt::Display for DisasterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Ordered severity tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl SeverityLevel {
    pub fn label(&self) -> &'static str {
        match self {
            SeverityLevel::Low => "low",
            SeverityLevel::Moderate => "moderate",
            SeverityLevel::High => "high",
            SeverityLevel::Critical => "critical",
        }
    }

    pub fn is_high_or_above(&self) -> bool {
        *self >= SeverityLevel::High
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscapeRoute {
    #[default]
    Unknown,
    Compromised,
    PotentiallyClear,
}

/// Details pulled out of the scene description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoAnalysis {
    pub disaster_type: DisasterType,
    pub key_observations: Vec<String>,
    pub hazard_indicators: Vec<String>,
    pub escape_route_assessment: EscapeRoute,
    pub environmental_factors: Vec<String>,
}

impl PhotoAnalysis {
    fn empty(disaster_type: DisasterType) -> Self {
        Self {
            disaster_type,
            key_observations: Vec::new(),
            hazard_indicators: Vec::new(),
            escape_route_assessment: EscapeRoute::Unknown,
            environmental_factors: Vec::new(),
        }
    }
}

/// Result of one assessment call. Never persisted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterAssessment {
    pub disaster_type: DisasterType,
    pub severity_level: SeverityLevel,
    pub safety_recommendation: String,
    pub psychological_support: String,
    pub educational_guidance: String,
    /// Most urgent first; always opens with the two universal actions
    pub immediate_actions: Vec<String>,
    pub photo_analysis: PhotoAnalysis,
    /// In `[0.5, 0.95]`
    pub confidence_score: f32,
}

impl DisasterAssessment {
    /// Plain-text report with the section markers used in chat replies
    pub fn render_report(&self) -> String {
        let mut lines = vec![
            format!(
                "[PHOTO_ANALYSIS] I can see this is a {} situation with {} severity level.",
                self.disaster_type, self.severity_level
            ),
            String::new(),
            self.psychological_support.clone(),
            String::new(),
            self.educational_guidance.clone(),
            String::new(),
            format!("[EMERGENCY] {}", self.safety_recommendation),
            String::new(),
            "[IMMEDIATE_ACTIONS]".to_string(),
        ];

        lines.extend(
            self.immediate_actions
                .iter()
                .enumerate()
                .map(|(i, action)| format!("{}. {}", i + 1, action)),
        );

        lines.push(String::new());
        lines.push(format!(
            "[CONFIDENCE] Assessment confidence: {:.0}%",
            self.confidence_score * 100.0
        ));
        lines.push(String::new());
        lines.push(
            "Stay safe, and remember - you're not alone in this situation. Help is available."
                .to_string(),
        );

        lines.join("\n")
    }
}

/// Stateless, deterministic scene assessor
#[derive(Debug, Default, Clone, Copy)]
pub struct AssessmentEngine;

impl AssessmentEngine {
    pub fn new() -> Self {
        Self
    }

    /// Assess a scene description. Never fails; empty input yields the defaults.
    pub fn assess(&self, description: &str, user_context: &str) -> DisasterAssessment {
        let scene = normalize(description);
        let combined = format!("{} {}", scene, normalize(user_context));

        let disaster_type = self.detect_type(&scene);
        let severity_level = self.assess_severity(&scene);
        let confidence_score = self.confidence(&scene, disaster_type);

        debug!(
            disaster_type = %disaster_type,
            severity = %severity_level,
            confidence = confidence_score,
            "Scene assessed"
        );

        DisasterAssessment {
            disaster_type,
            severity_level,
            safety_recommendation: guidance::safety_recommendation(severity_level).to_string(),
            psychological_support: guidance::psychological_support(&combined).to_string(),
            educational_guidance: guidance::educational_guidance(
                disaster_type,
                &scene,
                severity_level,
            ),
            immediate_actions: guidance::immediate_actions(disaster_type, severity_level),
            photo_analysis: self.analyze_details(&scene, disaster_type),
            confidence_score,
        }
    }

    /// First type in priority order with enough hits, else single-keyword fallbacks
    pub fn detect_type(&self, scene: &str) -> DisasterType {
        for candidate in DisasterType::PRIORITY {
            let hits = candidate.signs().map_or(0, |signs| signs.count_hits(scene));
            if hits >= TYPE_HIT_THRESHOLD {
                return candidate;
            }
        }

        if WATER_TERMS.matches(scene) {
            DisasterType::Flood
        } else if SMOKE_TERMS.matches(scene) {
            DisasterType::Fire
        } else if STRUCTURE_TERMS.matches(scene) {
            DisasterType::Structural
        } else {
            DisasterType::GeneralEmergency
        }
    }

    /// First matching tier wins, checked from critical downwards
    pub fn assess_severity(&self, scene: &str) -> SeverityLevel {
        if CRITICAL_SIGNS.matches(scene) {
            SeverityLevel::Critical
        } else if HIGH_SIGNS.matches(scene) {
            SeverityLevel::High
        } else if MODERATE_SIGNS.matches(scene) {
            SeverityLevel::Moderate
        } else {
            SeverityLevel::Low
        }
    }

    fn confidence(&self, scene: &str, disaster_type: DisasterType) -> f32 {
        let word_count = scene.split_whitespace().count();
        let detail_bonus = if word_count > 20 {
            0.2
        } else if word_count > 10 {
            0.1
        } else {
            0.0
        };

        let hits = disaster_type
            .signs()
            .map_or(0, |signs| signs.count_hits(scene));
        let keyword_bonus = (hits as f32 * 0.1).min(MAX_KEYWORD_BONUS);

        (BASE_CONFIDENCE + detail_bonus + keyword_bonus).min(MAX_CONFIDENCE)
    }

    fn analyze_details(&self, scene: &str, disaster_type: DisasterType) -> PhotoAnalysis {
        let mut analysis = PhotoAnalysis::empty(disaster_type);

        match disaster_type {
            DisasterType::Flood => {
                analysis.key_observations.extend(
                    WATER_DEPTHS
                        .matched_terms(scene)
                        .into_iter()
                        .map(|depth| format!("Water level: {}-deep", depth)),
                );
                if MOVING_WATER.matches(scene) {
                    analysis
                        .hazard_indicators
                        .push("Moving water detected".to_string());
                }
                if FLOATING_DEBRIS.matches(scene) {
                    analysis.hazard_indicators.push("Debris in water".to_string());
                }
            }
            DisasterType::Fire => {
                let smoky = SMOKE_TERMS.matched_terms(scene).contains(&"smoke");
                if smoky && SMOKE_DENSITY.matches(scene) {
                    analysis
                        .hazard_indicators
                        .push("Heavy smoke concentration".to_string());
                }
                if EXIT_TERMS.matches(scene) {
                    analysis.escape_route_assessment = if EXIT_BLOCKERS.matches(scene) {
                        EscapeRoute::Compromised
                    } else {
                        EscapeRoute::PotentiallyClear
                    };
                }
            }
            _ => {}
        }

        if LOW_VISIBILITY.matches(scene) {
            analysis
                .environmental_factors
                .push("Low visibility conditions".to_string());
        }
        if WEATHER_TERMS.matches(scene) {
            analysis
                .environmental_factors
                .push("Weather considerations needed".to_string());
        }

        analysis
    }
}

/// Lowercase and turn hyphens into spaces so "knee-deep" reads as "knee deep"
fn normalize(text: &str) -> String {
    text.to_lowercase().replace('-', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> AssessmentEngine {
        AssessmentEngine::new()
    }

    #[test]
    fn test_flood_round_trip() {
        let assessment = engine().assess(
            "Flood water knee-deep, moving slowly, debris floating",
            "need to reach exit",
        );
        assert_eq!(assessment.disaster_type, DisasterType::Flood);
        assert!(assessment.severity_level.is_high_or_above());
        assert!(assessment
            .immediate_actions
            .iter()
            .any(|a| a == "Do NOT enter or attempt to cross flood water"));
        assert_eq!(
            assessment.photo_analysis.key_observations,
            vec!["Water level: knee-deep".to_string()]
        );
        assert_eq!(
            assessment.photo_analysis.hazard_indicators,
            vec!["Moving water detected".to_string(), "Debris in water".to_string()]
        );
    }

    #[test]
    fn test_critical_overrides_high() {
        let assessment =
            engine().assess("water is trapped and rising rapidly and knee deep", "");
        assert_eq!(assessment.severity_level, SeverityLevel::Critical);
        assert!(assessment.safety_recommendation.starts_with("IMMEDIATE EVACUATION"));
    }

    #[test]
    fn test_type_priority_is_fixed() {
        // Two flood hits and three fire hits: flood is checked first
        let scene = "water and debris, smoke, flames, burning";
        assert_eq!(engine().detect_type(scene), DisasterType::Flood);
    }

    #[test]
    fn test_shared_terms_resolve_to_earthquake() {
        assert_eq!(
            engine().detect_type("collapsed roof and broken beams"),
            DisasterType::Earthquake
        );
    }

    #[test]
    fn test_single_keyword_fallbacks() {
        assert_eq!(engine().detect_type("the floor is wet"), DisasterType::Flood);
        assert_eq!(engine().detect_type("i smell smoke"), DisasterType::Fire);
        assert_eq!(engine().detect_type("a crack in the wall"), DisasterType::Structural);
        assert_eq!(
            engine().detect_type("something happened"),
            DisasterType::GeneralEmergency
        );
    }

    #[test]
    fn test_empty_input_falls_back_to_defaults() {
        let assessment = engine().assess("", "");
        assert_eq!(assessment.disaster_type, DisasterType::GeneralEmergency);
        assert_eq!(assessment.severity_level, SeverityLevel::Low);
        assert_eq!(assessment.confidence_score, BASE_CONFIDENCE);
        assert_eq!(assessment.immediate_actions.len(), 2);
    }

    #[test]
    fn test_confidence_is_capped() {
        let long = "water flooding submerged current debris muddy ".repeat(5);
        let score = engine().assess(&long, "").confidence_score;
        assert_eq!(score, MAX_CONFIDENCE);
    }

    #[test]
    fn test_fire_escape_route() {
        let blocked = engine().assess("thick smoke and flames near the exit", "");
        assert_eq!(blocked.disaster_type, DisasterType::Fire);
        assert_eq!(
            blocked.photo_analysis.escape_route_assessment,
            EscapeRoute::Compromised
        );
        assert_eq!(
            blocked.photo_analysis.hazard_indicators,
            vec!["Heavy smoke concentration".to_string()]
        );

        let clear = engine().assess("flames and ash in the kitchen, door open", "");
        assert_eq!(
            clear.photo_analysis.escape_route_assessment,
            EscapeRoute::PotentiallyClear
        );
    }

    #[test]
    fn test_environment_checked_for_every_type() {
        let assessment = engine().assess("it is dark and cold outside", "");
        assert_eq!(assessment.disaster_type, DisasterType::GeneralEmergency);
        assert_eq!(
            assessment.photo_analysis.environmental_factors,
            vec![
                "Low visibility conditions".to_string(),
                "Weather considerations needed".to_string()
            ]
        );
    }

    #[test]
    fn test_context_feeds_psychological_support() {
        let assessment = engine().assess("water in the hallway", "I'm terrified");
        assert!(assessment.psychological_support.contains("[BREATHING]"));
    }

    #[test]
    fn test_render_report_layout() {
        let assessment = engine().assess("smoke and flames in the hall", "");
        let report = assessment.render_report();
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(
            lines[0],
            "[PHOTO_ANALYSIS] I can see this is a fire situation with low severity level."
        );
        assert!(report.contains("[IMMEDIATE_ACTIONS]\n1. Ensure your immediate personal safety\n2. Contact emergency services if not already done\n3. "));
        assert!(report.contains("[CONFIDENCE] Assessment confidence: 70%"));
        assert!(report.ends_with("Help is available."));
    }

    #[test]
    fn test_serialized_labels() {
        let json = serde_json::to_value(engine().assess("", "")).unwrap();
        assert_eq!(json["disaster_type"], "general_emergency");
        assert_eq!(json["severity_level"], "low");
        assert_eq!(json["photo_analysis"]["escape_route_assessment"], "unknown");
    }
}
