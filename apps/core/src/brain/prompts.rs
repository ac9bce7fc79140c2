//! Prompt specialization.
//!
//! Each [`MessageType`] owns one instruction template. The final payload is the
//! persona preamble, an optional context/preferences block, then the filled
//! template.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::message_type::MessageType;
use crate::models::ConversationContext;

/// Slot replaced by the user's message, exactly once per template
const USER_MESSAGE_SLOT: &str = "{user_message}";

/// Persona and style preamble shared by every prompt
pub const PERSONA_PREAMBLE: &str = r#"You are DisasterAI, a friendly and helpful assistant specializing in disaster management, emergency guidance, and safety support.

COMMUNICATION STYLE:
- Be natural, warm, and conversational
- Match the user's tone - casual for greetings, serious for emergencies
- Keep responses concise unless detailed information is needed
- Use simple, clear language
- Be supportive and reassuring

CORE CAPABILITIES:
- Emergency safety guidance and protocols
- Disaster preparedness education
- Psychological support during stressful situations
- Resource connections and emergency contacts
- Image/video analysis for damage assessment

RESPONSE APPROACH:
- For casual greetings: Respond naturally and ask how you can help
- For emergencies: Provide immediate, actionable safety guidance
- For questions: Give clear, helpful information
- Always prioritize user safety and well-being
"#;

pub const GENERAL_TEMPLATE: &str = r#"
USER MESSAGE: {user_message}

INSTRUCTIONS:
- If this is a simple greeting (hello, hi, hey, etc.), respond warmly and briefly, then ask how you can help with disaster preparedness or safety
- If this is an emergency, provide immediate safety guidance
- If this is a question about disaster news, updates, or current situations, provide helpful information while clarifying that you cannot access real-time data
- If this is a general question, provide helpful, clear information
- Keep the tone conversational and match the user's energy level
- Be concise unless detailed information is specifically requested

Provide a natural, helpful response.
"#;

pub const DISASTER_INFORMATION_TEMPLATE: &str = r#"
CONTEXT: User is asking for information, news, or updates about disaster situations, weather conditions, or emergency events.

IMPORTANT: You do not have access to real-time data, current news, or live updates. Be honest about this limitation.

RESPONSE APPROACH:
1. ACKNOWLEDGE REQUEST - Recognize their information need
2. EXPLAIN LIMITATIONS - Clarify you don't have real-time data
3. PROVIDE GUIDANCE - Suggest reliable sources for current information
4. OFFER PREPAREDNESS HELP - Provide relevant safety information
5. EMERGENCY CONTEXT - Include emergency contact info if relevant

RESPONSE FORMAT:
INFORMATION REQUEST: [Acknowledge what they're asking about]
REAL-TIME LIMITATION: [Explain you don't have current data]
RELIABLE SOURCES: [Suggest where to get current information]
PREPAREDNESS GUIDANCE: [Relevant safety tips for the situation]
EMERGENCY CONTACTS: [If situation might be relevant]

USER MESSAGE: {user_message}

Provide helpful guidance while being transparent about your limitations regarding real-time information.
"#;

pub const IMAGE_ANALYSIS_TEMPLATE: &str = r#"
CONTEXT: User has shared an image that may show disaster conditions, damage, or emergency situations.

ANALYSIS TASKS:
1. SAFETY ASSESSMENT - Identify immediate dangers or hazards visible
2. SITUATION EVALUATION - Assess severity and urgency level
3. ACTIONABLE GUIDANCE - Provide specific next steps
4. PSYCHOLOGICAL SUPPORT - Acknowledge stress and provide reassurance
5. EMERGENCY PROTOCOLS - Reference relevant emergency procedures

RESPONSE FORMAT:
IMMEDIATE SAFETY: [Key safety points]
SITUATION ASSESSMENT: [What you observe]
RECOMMENDED ACTIONS: [Step-by-step guidance]
PSYCHOLOGICAL SUPPORT: [Calming, supportive message]
EMERGENCY CONTACTS: [If situation warrants]

USER MESSAGE (with image): {user_message}

Analyze the image and provide comprehensive disaster management guidance.
"#;

pub const VIDEO_ANALYSIS_TEMPLATE: &str = r#"
CONTEXT: User has shared a video that may show dynamic disaster conditions, evacuation scenarios, or emergency situations in progress.

ANALYSIS TASKS:
1. MOTION & DYNAMICS - Assess movement, progression of conditions
2. SAFETY HAZARDS - Identify immediate and developing dangers
3. EVACUATION ASSESSMENT - Evaluate escape routes and safety options
4. EMERGENCY RESPONSE - Determine if immediate emergency services needed
5. PSYCHOLOGICAL IMPACT - Address potential trauma and stress

RESPONSE FORMAT:
VIDEO ASSESSMENT: [Key observations from video]
IMMEDIATE RISKS: [Dangers identified]
EVACUATION GUIDANCE: [Movement and safety instructions]
EMERGENCY RESPONSE: [When to call emergency services]
PSYCHOLOGICAL SUPPORT: [Trauma-informed support]

USER MESSAGE (with video): {user_message}

Analyze the video content and provide dynamic disaster response guidance.
"#;

pub const PDF_ANALYSIS_TEMPLATE: &str = r#"
CONTEXT: User has shared a PDF document that may contain emergency plans, safety procedures, incident reports, or preparedness materials.

ANALYSIS TASKS:
1. DOCUMENT TYPE - Identify the nature and purpose of the document
2. KEY INFORMATION - Extract critical safety and emergency information
3. PROCEDURE REVIEW - Assess emergency procedures for completeness
4. RECOMMENDATIONS - Suggest improvements or additional measures
5. IMPLEMENTATION GUIDANCE - Help user understand and apply information

RESPONSE FORMAT:
DOCUMENT SUMMARY: [Overview of content]
KEY FINDINGS: [Important information identified]
PROCEDURE ASSESSMENT: [Evaluation of emergency procedures]
RECOMMENDATIONS: [Suggested improvements]
IMPLEMENTATION STEPS: [How to use this information]

USER MESSAGE (with PDF): {user_message}

Analyze the document and provide expert guidance on disaster management procedures.
"#;

pub const PSYCHOLOGICAL_SUPPORT_TEMPLATE: &str = r#"
CONTEXT: User is experiencing anxiety, stress, trauma, or psychological distress related to disasters or emergency situations.

SUPPORT APPROACH:
1. IMMEDIATE GROUNDING - Provide calming techniques
2. VALIDATION - Acknowledge feelings and normalize responses
3. BREATHING EXERCISES - Guide through calming techniques
4. SAFETY ASSURANCE - Help assess current safety
5. RESOURCE CONNECTION - Suggest professional support if needed

RESPONSE FORMAT:
EMOTIONAL SUPPORT: [Validation and empathy]
IMMEDIATE TECHNIQUES: [Breathing, grounding exercises]
SAFETY CHECK: [Current safety assessment]
RESOURCES: [Professional support options if needed]
COPING STRATEGIES: [Long-term resilience building]

USER MESSAGE: {user_message}

Provide compassionate, trauma-informed psychological support focused on disaster-related stress.
"#;

pub const EMERGENCY_PROTOCOL_TEMPLATE: &str = r#"
CONTEXT: User needs immediate emergency guidance or is in an active emergency situation.

PROTOCOL RESPONSE:
1. IMMEDIATE SAFETY - Priority actions for safety
2. EMERGENCY SERVICES - When and how to contact help
3. EVACUATION PROCEDURES - Clear movement instructions
4. COMMUNICATION - How to maintain contact and signal for help
5. SURVIVAL PRIORITIES - Essential needs and resources

RESPONSE FORMAT:
IMMEDIATE ACTIONS: [Critical first steps]
EMERGENCY CONTACTS: [911, local emergency services]
EVACUATION STEPS: [Safe movement procedures]
COMMUNICATION: [How to stay connected/signal]
SURVIVAL NEEDS: [Essential resources and priorities]

EMERGENCY SITUATION: {user_message}

Provide immediate, life-saving emergency response guidance.
"#;

/// Template for a message type
pub fn template_for(message_type: MessageType) -> &'static str {
    match message_type {
        MessageType::GreetingOrGeneral => GENERAL_TEMPLATE,
        MessageType::DisasterInformationRequest => DISASTER_INFORMATION_TEMPLATE,
        MessageType::ImageAnalysis => IMAGE_ANALYSIS_TEMPLATE,
        MessageType::VideoAnalysis => VIDEO_ANALYSIS_TEMPLATE,
        MessageType::PdfAnalysis => PDF_ANALYSIS_TEMPLATE,
        MessageType::PsychologicalSupport => PSYCHOLOGICAL_SUPPORT_TEMPLATE,
        MessageType::EmergencyProtocol => EMERGENCY_PROTOCOL_TEMPLATE,
    }
}

/// Fully composed instructions for the external model.
///
/// Built once by [`PromptEngine`]; there are no mutating methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptPayload {
    message_type: MessageType,
    user_message: String,
    text: String,
}

impl PromptPayload {
    pub fn message_type(&self) -> MessageType {
        self.message_type
    }

    /// The raw user message interpolated into the template
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    /// The complete prompt text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Prompt text with extracted document content appended
    pub fn text_with_document(&self, document: &str) -> String {
        format!("{}\n\nPDF CONTENT:\n{}", self.text, document)
    }
}

/// Builds [`PromptPayload`]s. Holds no state.
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptEngine;

impl PromptEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compose the prompt for a classified message
    pub fn build(
        &self,
        message: &str,
        message_type: MessageType,
        context: Option<&ConversationContext>,
        preferences: Option<&BTreeMap<String, String>>,
    ) -> PromptPayload {
        let mut text = String::with_capacity(PERSONA_PREAMBLE.len() + 2048);
        text.push_str(PERSONA_PREAMBLE);

        if let Some(context) = context {
            text.push_str(&render_context(context));
        }
        if let Some(preferences) = preferences.filter(|p| !p.is_empty()) {
            text.push_str(&render_preferences(preferences));
        }

        text.push_str("\n\n");
        text.push_str(&fill_template(template_for(message_type), message));

        debug!(
            message_type = %message_type,
            prompt_chars = text.len(),
            "Prompt built"
        );

        PromptPayload {
            message_type,
            user_message: message.to_string(),
            text,
        }
    }

    /// Compose a prompt from a wire label. An unknown label uses the general
    /// template instead of failing the request.
    pub fn build_for_label(
        &self,
        message: &str,
        label: &str,
        context: Option<&ConversationContext>,
        preferences: Option<&BTreeMap<String, String>>,
    ) -> PromptPayload {
        let message_type = MessageType::from_label(label).unwrap_or_else(|| {
            warn!(label, "Unknown message type label, using general template");
            MessageType::GreetingOrGeneral
        });
        self.build(message, message_type, context, preferences)
    }
}

fn fill_template(template: &str, message: &str) -> String {
    match template.split_once(USER_MESSAGE_SLOT) {
        Some((head, tail)) => format!("{}{}{}", head, message, tail),
        None => format!("{}\n{}", template, message),
    }
}

fn render_context(context: &ConversationContext) -> String {
    let mut block = String::from("\n\nCONTEXT INFORMATION:\n");
    block.push_str(&format!("- Input Method: {}\n", context.input_method));
    block.push_str(&format!("- Session ID: {}\n", context.session_id));

    if let Some(previous) = &context.previous {
        block.push_str(&format!("- Previous Messages: {}\n", previous.message_count));
        block.push_str(&format!("- Chat Topic: {}\n", previous.chat_title));
        if let Some(recent) = previous.recent_messages.as_deref().filter(|r| !r.is_empty()) {
            block.push_str(&format!("- Recent Context:\n{}\n", recent));
        }
    }

    block
}

fn render_preferences(preferences: &BTreeMap<String, String>) -> String {
    let mut block = String::from("\nUSER PREFERENCES:\n");
    for (key, value) in preferences {
        block.push_str(&format!("- {}: {}\n", key, value));
    }
    block
}
