//! Canned guidance text for scene assessments.

use super::assessment::{DisasterType, SeverityLevel};
use super::lexicon::{
    CONFUSION_TERMS, FEAR_TERMS, FIRE_SIGNS, PANIC_TERMS, STRUCTURE_TERMS, WATER_DEPTHS,
};

const PANIC_SUPPORT: &str = "[CALM] I can see this is overwhelming. Let's take this step by step. You're safe right now, and we'll figure out the best course of action together. [BREATHING] Take a slow, deep breath with me. In for 4 counts... hold for 4... out for 6. This will help clear your thinking.";

const FEAR_SUPPORT: &str = "[CALM] Your fear is completely normal in this situation. It shows you're being smart and cautious about safety. You're already doing the right thing by assessing the situation before acting. That's excellent judgment.";

const CONFUSION_SUPPORT: &str = "I understand this situation is confusing. Let me help break down what I see and what options you have. It's normal to feel uncertain in emergencies. We'll focus on the most important safety steps first.";

const DEFAULT_SUPPORT: &str = "[CALM] You're handling this situation well by carefully assessing before acting. That shows excellent judgment and self-control.";

pub const GENERAL_PROTOCOL: &str = "[EDUCATION] General emergency protocol: 1) Assess immediate dangers, 2) Secure your safety first, 3) Contact emergency services, 4) Follow evacuation procedures if necessary.";

const FLOOD_CAVEAT: &str = " [CRITICAL] All flood water may contain sewage, chemicals, and dangerous debris. Avoid skin contact when possible.";
const FIRE_CAVEAT: &str = " [CRITICAL] NEVER re-enter a building after evacuation. Meet at designated assembly point away from structure.";
const AFTERSHOCK_CAVEAT: &str = " [CRITICAL] Be prepared for aftershocks. If trapped, conserve energy, protect airways from dust, and signal for help periodically.";
const STRUCTURAL_CAVEAT: &str = " [CRITICAL] Do not re-enter a damaged structure until it has been inspected by a qualified professional.";

/// The two actions every assessment starts with
pub const UNIVERSAL_ACTIONS: [&str; 2] = [
    "Ensure your immediate personal safety",
    "Contact emergency services if not already done",
];

/// Empathetic opener chosen by the strongest emotion present.
/// Panic outranks fear, fear outranks confusion.
pub fn psychological_support(combined_text: &str) -> &'static str {
    if PANIC_TERMS.matches(combined_text) {
        PANIC_SUPPORT
    } else if FEAR_TERMS.matches(combined_text) {
        FEAR_SUPPORT
    } else if CONFUSION_TERMS.matches(combined_text) {
        CONFUSION_SUPPORT
    } else {
        DEFAULT_SUPPORT
    }
}

pub fn educational_guidance(
    disaster_type: DisasterType,
    description: &str,
    severity: SeverityLevel,
) -> String {
    match disaster_type {
        DisasterType::Flood => flood_guidance(description, severity),
        DisasterType::Fire => fire_guidance(description, severity),
        DisasterType::Earthquake => earthquake_guidance(description, severity),
        DisasterType::Structural => format!("{}{}", GENERAL_PROTOCOL, STRUCTURAL_CAVEAT),
        DisasterType::GeneralEmergency => GENERAL_PROTOCOL.to_string(),
    }
}

fn flood_guidance(description: &str, severity: SeverityLevel) -> String {
    let depths = WATER_DEPTHS.matched_terms(description);
    let mut guidance = String::from("[EDUCATION] FLOOD SAFETY: ");

    if depths.contains(&"knee") || severity.is_high_or_above() {
        guidance.push_str(
            "Water at knee level or higher is EXTREMELY DANGEROUS. Just 6 inches of moving water \
             can knock down an adult. DO NOT attempt to walk through this water. ACTIONS: \
             1) Stay where you are, 2) Move to highest available point, 3) Signal for help using \
             phone light or noise, 4) Wait for rescue personnel.",
        );
    } else if depths.contains(&"ankle") || severity == SeverityLevel::Moderate {
        guidance.push_str(
            "Ankle-deep water requires extreme caution. ONLY proceed if: 1) Water is not moving, \
             2) You have sturdy shoes, 3) You can test each step carefully, 4) You have something \
             to hold onto for balance.",
        );
    } else {
        guidance.push_str(
            "Assess water depth and movement before any action. Even shallow moving water is dangerous.",
        );
    }

    guidance.push_str(FLOOD_CAVEAT);
    guidance
}

fn fire_guidance(description: &str, severity: SeverityLevel) -> String {
    let mut guidance = String::from("[EDUCATION] FIRE SAFETY: ");

    if FIRE_SIGNS.matched_terms(description).contains(&"smoke") {
        if severity.is_high_or_above() {
            guidance.push_str(
                "Heavy smoke is IMMEDIATELY LIFE-THREATENING. ACTIONS: 1) Get as low as possible \
                 (crawl if necessary), 2) Exit building immediately, 3) Do NOT open doors with \
                 smoke coming underneath, 4) If trapped, seal room and signal from windows.",
            );
        } else {
            guidance.push_str(
                "ANY visible smoke requires immediate evacuation. Stay low where air is cleaner, \
                 cover nose/mouth, exit quickly.",
            );
        }
    }

    guidance.push_str(FIRE_CAVEAT);
    guidance
}

fn earthquake_guidance(description: &str, severity: SeverityLevel) -> String {
    let damage = STRUCTURE_TERMS.matched_terms(description);
    let mut guidance = String::from("[EDUCATION] EARTHQUAKE/STRUCTURAL SAFETY: ");

    if damage.contains(&"crack") || damage.contains(&"damage") {
        if severity.is_high_or_above() {
            guidance.push_str(
                "Visible structural damage indicates building is UNSAFE. EVACUATE IMMEDIATELY but \
                 carefully. Watch for falling debris, broken glass, and unstable structures.",
            );
        } else {
            guidance.push_str(
                "Any structural cracks require professional assessment. Exit carefully and do not \
                 re-enter until building is inspected.",
            );
        }
    }

    guidance.push_str(AFTERSHOCK_CAVEAT);
    guidance
}

/// One-line summary, chosen by severity alone
pub fn safety_recommendation(severity: SeverityLevel) -> &'static str {
    match severity {
        SeverityLevel::Critical => {
            "IMMEDIATE EVACUATION REQUIRED - This situation poses imminent danger to life. Do not delay."
        }
        SeverityLevel::High => {
            "HIGH RISK - Evacuate area safely but quickly. Avoid unnecessary exposure to hazards."
        }
        SeverityLevel::Moderate => {
            "PROCEED WITH EXTREME CAUTION - Assess each action carefully and be prepared to retreat."
        }
        SeverityLevel::Low => {
            "LOW RISK - Monitor situation and be prepared to escalate response if conditions worsen."
        }
    }
}

/// Ordered action list, most urgent first
pub fn immediate_actions(disaster_type: DisasterType, severity: SeverityLevel) -> Vec<String> {
    let specific: &[&str] = match (disaster_type, severity.is_high_or_above()) {
        (DisasterType::Flood, true) => &[
            "Do NOT enter or attempt to cross flood water",
            "Move to highest available location",
            "Signal for rescue using phone light or noise",
            "Wait for professional rescue personnel",
        ],
        (DisasterType::Flood, false) => &[
            "Test water depth and movement carefully",
            "Ensure you have sturdy footwear",
            "Identify safe exit route before proceeding",
        ],
        (DisasterType::Fire, _) => &[
            "Exit building immediately if safe to do so",
            "Stay low to avoid smoke inhalation",
            "Feel doors for heat before opening",
            "If trapped, seal room and signal from windows",
        ],
        (DisasterType::Earthquake | DisasterType::Structural, _) => &[
            "Check for immediate hazards (gas leaks, electrical)",
            "Exit building carefully if structural damage visible",
            "Be prepared for aftershocks",
            "Avoid areas with potential falling debris",
        ],
        (DisasterType::GeneralEmergency, _) => &[],
    };

    UNIVERSAL_ACTIONS
        .iter()
        .chain(specific)
        .map(|action| action.to_string())
        .collect()
}
