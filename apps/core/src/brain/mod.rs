//! # Brain Module
//!
//! Fast, non-LLM analysis for DisasterAI.
//! Runs BEFORE the model gateway is called.
//!
//! ## Components
//! - `lexicon`: Keyword lists compiled to word-boundary regexes
//! - `message_type`: The seven message labels and attachment categories
//! - `classifier`: Priority-ordered keyword classification
//! - `prompts`: Persona preamble, templates and prompt composition
//! - `assessment`: Scene description to structured disaster assessment
//! - `guidance`: Canned guidance text used by the assessment

pub mod assessment;
pub mod classifier;
pub mod guidance;
pub mod lexicon;
pub mod message_type;
pub mod prompts;

pub use assessment::{
    AssessmentEngine, DisasterAssessment, DisasterType, EscapeRoute, PhotoAnalysis, SeverityLevel,
};
pub use classifier::{Classification, ClassificationRule, MessageClassifier};
pub use message_type::{MessageType, MimeCategory};
pub use prompts::{PromptEngine, PromptPayload};
