//! Rule-based message classification.
//!
//! Rules are evaluated in priority order and the first match wins:
//! attachments, psychological distress, information requests, active
//! emergencies, then the general fallback. No state is kept between calls.
//!
//! The information-request rule is broader than "information keyword plus
//! disaster topic": an information keyword next to an emergency keyword also
//! counts, so questions about trapped or injured people are not treated as
//! live emergencies.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use super::lexicon::{
    Lexicon, ACTIVE_EMERGENCY, DISASTER_TOPIC, INFORMATION_SEEKING, PSYCHOLOGICAL_DISTRESS,
};
use super::message_type::{MessageType, MimeCategory};

/// Which rule produced the label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationRule {
    Attachment,
    PsychologicalKeyword,
    InformationRequest,
    EmergencyKeyword,
    Fallback,
}

/// Result of message classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub message_type: MessageType,
    pub rule: ClassificationRule,
    /// Lexicon terms that contributed to the decision
    pub matched_terms: Vec<String>,
}

/// Deterministic keyword classifier
pub struct MessageClassifier {
    psychological: &'static Lexicon,
    emergency: &'static Lexicon,
    information: &'static Lexicon,
    disaster_topic: &'static Lexicon,
}

impl Default for MessageClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageClassifier {
    pub fn new() -> Self {
        Self {
            psychological: &PSYCHOLOGICAL_DISTRESS,
            emergency: &ACTIVE_EMERGENCY,
            information: &INFORMATION_SEEKING,
            disaster_topic: &DISASTER_TOPIC,
        }
    }

    /// Classify a message. The caller guarantees `message` is non-empty.
    pub fn classify(
        &self,
        message: &str,
        has_attachments: bool,
        categories: &HashSet<MimeCategory>,
    ) -> MessageType {
        self.classify_detailed(message, has_attachments, categories)
            .message_type
    }

    /// Classify with attachment categories given by name (`image`, `video`,
    /// `pdf`). Names outside that set are ignored.
    pub fn classify_labels<I, S>(
        &self,
        message: &str,
        has_attachments: bool,
        category_names: I,
    ) -> MessageType
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let categories = category_names
            .into_iter()
            .filter_map(|name| {
                let parsed = MimeCategory::from_name(name.as_ref());
                if parsed.is_none() {
                    debug!(category = name.as_ref(), "Ignoring unknown attachment category");
                }
                parsed
            })
            .collect();
        self.classify(message, has_attachments, &categories)
    }

    /// Classify a message and report which rule fired
    pub fn classify_detailed(
        &self,
        message: &str,
        has_attachments: bool,
        categories: &HashSet<MimeCategory>,
    ) -> Classification {
        let result = self.resolve(message, has_attachments, categories);
        debug!(
            message_type = %result.message_type,
            rule = ?result.rule,
            matched = ?result.matched_terms,
            "Message classified"
        );
        result
    }

    fn resolve(
        &self,
        message: &str,
        has_attachments: bool,
        categories: &HashSet<MimeCategory>,
    ) -> Classification {
        // 1. Attachments, by fixed category priority
        if has_attachments {
            let by_attachment = [
                (MimeCategory::Image, MessageType::ImageAnalysis),
                (MimeCategory::Video, MessageType::VideoAnalysis),
                (MimeCategory::Pdf, MessageType::PdfAnalysis),
            ]
            .into_iter()
            .find(|(category, _)| categories.contains(category));

            if let Some((_, message_type)) = by_attachment {
                return Classification {
                    message_type,
                    rule: ClassificationRule::Attachment,
                    matched_terms: vec![],
                };
            }
        }

        // 2. Distress outranks everything text-based
        let distress = self.psychological.matched_terms(message);
        if !distress.is_empty() {
            return Classification {
                message_type: MessageType::PsychologicalSupport,
                rule: ClassificationRule::PsychologicalKeyword,
                matched_terms: to_owned(distress),
            };
        }

        // 3. Independent predicates
        let information = self.information.matched_terms(message);
        let topic = self.disaster_topic.matched_terms(message);
        let emergency = self.emergency.matched_terms(message);
        let is_information_request = !information.is_empty();

        // 4. Information keyword plus a disaster-topic keyword. This rule is
        //    deliberately wider than that: an information keyword plus an
        //    emergency keyword with no disaster topic ("any news about the
        //    trapped workers") also lands here instead of in step 5.
        if is_information_request && (!topic.is_empty() || !emergency.is_empty()) {
            let mut matched = information;
            matched.extend(topic);
            matched.extend(emergency);
            return Classification {
                message_type: MessageType::DisasterInformationRequest,
                rule: ClassificationRule::InformationRequest,
                matched_terms: to_owned(matched),
            };
        }

        // 5. Live emergency, only when not phrased as a question for information
        if !emergency.is_empty() && !is_information_request {
            return Classification {
                message_type: MessageType::EmergencyProtocol,
                rule: ClassificationRule::EmergencyKeyword,
                matched_terms: to_owned(emergency),
            };
        }

        // 6. Fallback
        Classification {
            message_type: MessageType::GreetingOrGeneral,
            rule: ClassificationRule::Fallback,
            matched_terms: vec![],
        }
    }
}

fn to_owned(terms: Vec<&'static str>) -> Vec<String> {
    terms.into_iter().map(str::to_string).collect()
}
