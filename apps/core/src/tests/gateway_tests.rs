//! Gateway Integration Tests
//!
//! The chat service wired to the Gemini adapter, against a mock server.

use crate::attachments::AttachmentPolicy;
use crate::brain::MessageType;
use crate::config::GeminiSettings;
use crate::gateway::{FailureKind, GeminiGateway, EMERGENCY_REMINDER};
use crate::models::{Attachment, ChatRequest};
use crate::service::ChatService;
use crate::session::InMemorySessionStore;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn setup_service(server: &MockServer) -> ChatService {
    let settings = GeminiSettings {
        api_key: "integration-key".to_string(),
        model: "gemini-1.5-flash".to_string(),
        base_url: Url::parse(&server.uri()).unwrap(),
        timeout: Duration::from_secs(5),
    };
    ChatService::new(
        Arc::new(GeminiGateway::new(&settings)),
        Arc::new(InMemorySessionStore::default()),
        AttachmentPolicy::default(),
    )
}

fn gemini_reply(text: &str) -> Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

#[cfg(test)]
mod gemini_flow_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex(r"^/v1beta/models/.+:generateContent$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("Stay calm.")))
            .expect(1)
            .mount(&server)
            .await;

        let service = setup_service(&server);
        let response = service
            .handle(ChatRequest::text("I am so scared right now"))
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.response, "Stay calm.");
        assert_eq!(response.message_type, MessageType::PsychologicalSupport);

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("USER MESSAGE: I am so scared right now"));
        // The key travels in a header, never in the URL
        assert!(!requests[0].url.as_str().contains("integration-key"));
    }

    #[tokio::test]
    async fn test_video_attachment_inlined() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(gemini_reply("Water is rising.")))
            .mount(&server)
            .await;

        let service = setup_service(&server);
        let request = ChatRequest::text("what is happening here")
            .with_attachment(Attachment::new("street.mp4", "video/mp4", vec![9, 9, 9]));
        let response = service.handle(request).await.unwrap();
        assert_eq!(response.message_type, MessageType::VideoAnalysis);

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(
            body["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "video/mp4"
        );
    }

    #[tokio::test]
    async fn test_outage_returns_guidance_not_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let service = setup_service(&server);
        let response = service
            .handle(ChatRequest::text("Please help me, the water keeps rising"))
            .await
            .unwrap();

        assert!(!response.success);
        assert_eq!(response.failure, Some(FailureKind::ServiceUnavailable));
        assert!(response.response.contains("AI Service Temporarily Down"));
        assert!(response.response.ends_with(EMERGENCY_REMINDER));
    }

    #[tokio::test]
    async fn test_bad_key_reports_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "code": 400, "message": "API key not valid. Please pass a valid API key." }
            })))
            .mount(&server)
            .await;

        let service = setup_service(&server);
        let response = service.handle(ChatRequest::text("hello")).await.unwrap();
        assert_eq!(response.failure, Some(FailureKind::Authentication));
    }
}
