//! Chat service: the boundary that validates requests and drives
//! classification, prompt composition, the model gateway and session history.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::attachments::AttachmentPolicy;
use crate::brain::{AssessmentEngine, DisasterAssessment, MessageClassifier, PromptEngine};
use crate::error::AppError;
use crate::gateway::ModelGateway;
use crate::models::{ChatRequest, ChatResponse};
use crate::session::{HistoryEntry, SessionStore};

/// Max characters of user text written to logs
const LOG_PREVIEW_CHARS: usize = 100;

/// Assessment plus its rendered text report
#[derive(Debug, Clone, Serialize)]
pub struct SceneReport {
    pub session_id: String,
    pub assessment: DisasterAssessment,
    pub report: String,
}

pub struct ChatService {
    gateway: Arc<dyn ModelGateway>,
    sessions: Arc<dyn SessionStore>,
    policy: AttachmentPolicy,
    classifier: MessageClassifier,
    prompts: PromptEngine,
    assessor: AssessmentEngine,
}

impl ChatService {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        sessions: Arc<dyn SessionStore>,
        policy: AttachmentPolicy,
    ) -> Self {
        Self {
            gateway,
            sessions,
            policy,
            classifier: MessageClassifier::new(),
            prompts: PromptEngine::new(),
            assessor: AssessmentEngine::new(),
        }
    }

    /// Handle one chat request.
    ///
    /// Invalid requests and refused attachments are `Err`. A gateway failure
    /// is not: it becomes an unsuccessful response carrying user guidance.
    #[instrument(skip(self, request), fields(gateway = self.gateway.name()))]
    pub async fn handle(&self, mut request: ChatRequest) -> Result<ChatResponse, AppError> {
        request.validate()?;

        request.attachments = std::mem::take(&mut request.attachments)
            .into_iter()
            .map(|a| self.policy.admit(a))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            message = %preview(&request.message),
            attachments = request.attachments.len(),
            session_id = request.session_id(),
            "Chat request received"
        );

        let message_type = self.classifier.classify(
            &request.message,
            !request.attachments.is_empty(),
            &request.mime_categories(),
        );

        let prompt = self.prompts.build(
            &request.message,
            message_type,
            request.context.as_ref(),
            Some(&request.preferences),
        );

        // Only the first attachment is forwarded
        let outcome = self
            .gateway
            .invoke(&prompt, request.attachments.first())
            .await;

        let (success, response, failure) = match outcome {
            Ok(text) => (true, text, None),
            Err(err) => {
                warn!(kind = %err.kind(), error = %err, "Gateway failed, returning guidance");
                (false, err.user_guidance(), Some(err.kind()))
            }
        };

        let session_id = request.session_id().to_string();
        self.sessions.append(
            &session_id,
            HistoryEntry::text(request.message.as_str(), response.as_str(), message_type),
        );

        Ok(ChatResponse {
            success,
            response,
            message_type,
            input_method: request.input_method().to_string(),
            session_id,
            timestamp: Utc::now(),
            has_files: !request.attachments.is_empty(),
            context_used: request
                .context
                .as_ref()
                .is_some_and(|c| c.previous.is_some()),
            failure,
        })
    }

    /// Assess a described scene and record the report in the session history
    #[instrument(skip(self, description, user_context))]
    pub fn assess_scene(
        &self,
        description: &str,
        user_context: &str,
        session_id: &str,
    ) -> SceneReport {
        info!(description = %preview(description), "Scene assessment requested");

        let assessment = self.assessor.assess(description, user_context);
        let report = assessment.render_report();

        self.sessions.append(
            session_id,
            HistoryEntry::visual_assessment(description, report.as_str()),
        );

        SceneReport {
            session_id: session_id.to_string(),
            assessment,
            report,
        }
    }

    pub fn history(&self, session_id: &str) -> Vec<HistoryEntry> {
        self.sessions.get(session_id)
    }

    pub fn clear_history(&self, session_id: &str) -> bool {
        let cleared = self.sessions.clear(session_id);
        info!(session_id, cleared, "History cleared");
        cleared
    }
}

fn preview(text: &str) -> String {
    let mut preview: String = text.chars().take(LOG_PREVIEW_CHARS).collect();
    if text.chars().count() > LOG_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}
