//! Offline gateway: canned replies chosen by message type, no network.

use async_trait::async_trait;
use std::sync::LazyLock;
use tracing::debug;

use super::{ModelGateway, ModelResult};
use crate::brain::lexicon::{Lexicon, SMOKE_TERMS, WATER_TERMS};
use crate::brain::{MessageType, PromptPayload};
use crate::models::Attachment;

static BUILDING_TERMS: LazyLock<Lexicon> =
    LazyLock::new(|| Lexicon::new("building", &["earthquake", "building"]));

const EMERGENCY_OPENING: &str = "[EMERGENCY] I understand you're in a critical situation. First, take a deep breath - panic reduces clear thinking. ";
const FLOOD_EDUCATION: &str = "[EDUCATION] If you're dealing with flood water: Do NOT attempt to walk through moving water. Even 6 inches can knock you down. Stay where you are, move to the highest point available, and signal for help.";
const FIRE_EDUCATION: &str = "[EDUCATION] For fire/smoke: Stay low where air is cleaner, feel doors before opening (if hot, don't open), exit immediately if safe path available.";
const BUILDING_EDUCATION: &str = "[EDUCATION] If building is damaged: Look for cracks, avoid areas with potential falling debris, exit carefully if structure appears compromised.";
const EMERGENCY_CLOSING: &str = " [CALM] You're being smart by asking for guidance. Contact emergency services (911) with your exact location.";

const PANIC_REPLY: &str = "[CALM] I can hear that you're feeling overwhelmed right now, and that's completely understandable. Let's work on calming your mind first. [BREATHING] Try this with me: Breathe in slowly for 4 counts... hold for 4... breathe out for 6 counts. This helps activate your body's calm response. [GROUNDING] Now, name 3 things you can see around you, 2 things you can touch, and 1 sound you can hear. This helps bring you back to the present moment.";

const EDUCATION_REPLY: &str = "[EDUCATION] For any emergency situation, follow these priorities: 1) Ensure your immediate safety, 2) Assess the situation calmly, 3) Contact emergency services if needed, 4) Follow evacuation procedures if necessary. For specific disasters: Floods - never walk through moving water; Fires - stay low and exit quickly; Earthquakes - drop, cover, and hold on during shaking.";

const GENERAL_REPLY: &str = "[CALM] I'm here to help you through this situation. You're not alone, and it's good that you're reaching out for guidance. Can you tell me more about what you're experiencing? Are you in immediate danger, or do you need help with understanding safety procedures?";

const VISUAL_REPLY: &str = "[PHOTO_ANALYSIS] I can't view images or videos while running offline. Please describe what you see: water depth and movement, smoke or flames, cracks or collapsed structures, and whether your exit is clear. I'll assess the scene from your description. If you are in immediate danger, contact emergency services (911) now.";

const DOCUMENT_REPLY: &str = "[EDUCATION] I can't read documents while running offline. Tell me which part of the plan or guide you need help with, and I'll walk you through the key safety steps. If you are in immediate danger, contact emergency services (911) now.";

/// Deterministic canned replies, used when no external model is configured.
///
/// Never fails: every message type maps to a fixed reply family.
#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedGateway;

impl RuleBasedGateway {
    pub fn new() -> Self {
        Self
    }

    fn emergency_reply(message: &str) -> String {
        let education = if WATER_TERMS.matches(message) {
            FLOOD_EDUCATION
        } else if SMOKE_TERMS.matches(message) {
            FIRE_EDUCATION
        } else if BUILDING_TERMS.matches(message) {
            BUILDING_EDUCATION
        } else {
            ""
        };
        format!("{}{}{}", EMERGENCY_OPENING, education, EMERGENCY_CLOSING)
    }

    /// Reply for a classified message
    pub fn reply(&self, message_type: MessageType, message: &str) -> String {
        match message_type {
            MessageType::EmergencyProtocol => Self::emergency_reply(message),
            MessageType::PsychologicalSupport => PANIC_REPLY.to_string(),
            MessageType::DisasterInformationRequest => EDUCATION_REPLY.to_string(),
            MessageType::ImageAnalysis | MessageType::VideoAnalysis => VISUAL_REPLY.to_string(),
            MessageType::PdfAnalysis => DOCUMENT_REPLY.to_string(),
            MessageType::GreetingOrGeneral => GENERAL_REPLY.to_string(),
        }
    }
}

#[async_trait]
impl ModelGateway for RuleBasedGateway {
    async fn invoke(&self, prompt: &PromptPayload, attachment: Option<&Attachment>) -> ModelResult {
        debug!(
            message_type = %prompt.message_type(),
            has_attachment = attachment.is_some(),
            "Rule-based reply"
        );
        Ok(self.reply(prompt.message_type(), prompt.user_message()))
    }

    fn name(&self) -> &'static str {
        "rule_based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::PromptEngine;

    #[test]
    fn test_emergency_reply_picks_topic() {
        let gateway = RuleBasedGateway::new();

        let flood = gateway.reply(MessageType::EmergencyProtocol, "Trapped by flood water");
        assert!(flood.contains(FLOOD_EDUCATION));
        assert!(flood.ends_with(EMERGENCY_CLOSING));

        let fire = gateway.reply(MessageType::EmergencyProtocol, "stuck, there is smoke");
        assert!(fire.contains(FIRE_EDUCATION));

        let building = gateway.reply(MessageType::EmergencyProtocol, "stuck in the building");
        assert!(building.contains(BUILDING_EDUCATION));

        let bare = gateway.reply(MessageType::EmergencyProtocol, "help");
        assert_eq!(bare, format!("{}{}", EMERGENCY_OPENING, EMERGENCY_CLOSING));
    }

    #[test]
    fn test_every_type_has_a_reply() {
        let gateway = RuleBasedGateway::new();
        for message_type in MessageType::ALL {
            assert!(!gateway.reply(message_type, "hello").is_empty());
        }
    }

    #[tokio::test]
    async fn test_invoke_never_fails() {
        let gateway = RuleBasedGateway::new();
        let prompt =
            PromptEngine::new().build("I'm so scared", MessageType::PsychologicalSupport, None, None);
        let reply = gateway.invoke(&prompt, None).await.unwrap();
        assert!(reply.contains("[BREATHING]"));
        assert_eq!(gateway.name(), "rule_based");
    }
}
