//! Gemini Gateway
//!
//! Talks to the hosted `generateContent` endpoint with reqwest.

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info, instrument, warn};

use super::{GatewayError, ModelGateway, ModelResult};
use crate::brain::{MimeCategory, PromptPayload};
use crate::config::GeminiSettings;
use crate::models::Attachment;
use crate::text_extract;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Adapter for the Gemini `generateContent` REST endpoint.
pub struct GeminiGateway {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    request_timeout: Duration,
}

impl GeminiGateway {
    pub fn new(settings: &GeminiSettings) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.base_url.as_str().trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            request_timeout: settings.timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Prompt text first, then the attachment. Images and videos travel as
    /// base64 inline data; PDFs are converted to text and appended to the prompt.
    async fn build_parts(
        &self,
        prompt: &PromptPayload,
        attachment: Option<&Attachment>,
    ) -> Result<Vec<Value>, GatewayError> {
        let Some(attachment) = attachment else {
            return Ok(vec![json!({ "text": prompt.text() })]);
        };

        match attachment.category() {
            Some(MimeCategory::Image) | Some(MimeCategory::Video) => {
                let encoded = general_purpose::STANDARD.encode(&attachment.data);
                Ok(vec![
                    json!({ "text": prompt.text() }),
                    json!({
                        "inline_data": {
                            "mime_type": attachment.mime_type,
                            "data": encoded,
                        }
                    }),
                ])
            }
            Some(MimeCategory::Pdf) => {
                let data = attachment.data.clone();
                let document = tokio::task::spawn_blocking(move || {
                    text_extract::extract_pdf_text(&data)
                })
                .await
                .unwrap_or_else(|_| text_extract::PDF_EXTRACTION_PLACEHOLDER.to_string());
                Ok(vec![json!({ "text": prompt.text_with_document(&document) })])
            }
            None => Err(GatewayError::UnsupportedFormat(format!(
                "cannot forward '{}' ({})",
                attachment.file_name, attachment.mime_type
            ))),
        }
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    #[instrument(skip(self, prompt, attachment), fields(model = %self.model, message_type = %prompt.message_type()))]
    async fn invoke(&self, prompt: &PromptPayload, attachment: Option<&Attachment>) -> ModelResult {
        let parts = self.build_parts(prompt, attachment).await?;
        let payload = json!({ "contents": [{ "role": "user", "parts": parts }] });

        info!(
            has_attachment = attachment.is_some(),
            "Sending generateContent request"
        );

        // One deadline covers connecting, headers and the full body
        let exchange = async {
            let res = self
                .client
                .post(self.endpoint())
                .header(API_KEY_HEADER, &self.api_key)
                .json(&payload)
                .send()
                .await
                .map_err(map_transport_error)?;
            let status = res.status();
            let body = res.text().await.map_err(map_transport_error)?;
            Ok::<_, GatewayError>((status, body))
        };

        let (status, body) = timeout(self.request_timeout, exchange)
            .await
            .map_err(|_| {
                warn!("Gemini request timed out after {:?}", self.request_timeout);
                GatewayError::Network(format!(
                    "request timed out after {}ms",
                    self.request_timeout.as_millis()
                ))
            })??;

        if !status.is_success() {
            let err = classify_status(status, &body);
            error!(kind = %err.kind(), %status, "Gemini request failed");
            return Err(err);
        }

        extract_reply(&body).inspect_err(|e| warn!(kind = %e.kind(), "Unusable Gemini reply"))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

fn extract_reply(body: &str) -> ModelResult {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GatewayError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let text = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GatewayError::MalformedResponse(
            "response contained no text".to_string(),
        ));
    }
    Ok(text)
}

/// Map a non-success HTTP status (and its body) to a failure category
fn classify_status(status: StatusCode, body: &str) -> GatewayError {
    let detail = format!("HTTP {}: {}", status.as_u16(), truncate(body, 200));
    let lower = body.to_lowercase();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GatewayError::Authentication(detail),
        StatusCode::BAD_REQUEST if lower.contains("api key") || lower.contains("api_key") => {
            GatewayError::Authentication(detail)
        }
        StatusCode::TOO_MANY_REQUESTS => GatewayError::RateLimited(detail),
        StatusCode::PAYLOAD_TOO_LARGE => GatewayError::FileTooLarge(detail),
        StatusCode::UNSUPPORTED_MEDIA_TYPE => GatewayError::UnsupportedFormat(detail),
        StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => GatewayError::ServiceUnavailable(detail),
        _ => GatewayError::Unknown(detail),
    }
}

fn map_transport_error(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        GatewayError::Network(err.to_string())
    } else if err.is_decode() || err.is_body() {
        GatewayError::MalformedResponse(err.to_string())
    } else {
        GatewayError::Unknown(err.to_string())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::{MessageType, PromptEngine};
    use crate::gateway::FailureKind;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use url::Url;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

    fn setup_gateway(server_url: &str, request_timeout: Duration) -> GeminiGateway {
        GeminiGateway::new(&GeminiSettings {
            api_key: "test-key".to_string(),
            model: "gemini-1.5-flash".to_string(),
            base_url: Url::parse(server_url).unwrap(),
            timeout: request_timeout,
        })
    }

    fn prompt(message_type: MessageType) -> PromptPayload {
        PromptEngine::new().build("Is the corridor safe?", message_type, None, None)
    }

    fn reply(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    #[tokio::test]
    async fn test_text_request_success() {
        let mock_server = MockServer::start().await;
        let gateway = setup_gateway(&mock_server.uri(), Duration::from_secs(5));

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header(API_KEY_HEADER, "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("Stay where you are.")))
            .mount(&mock_server)
            .await;

        let result = gateway
            .invoke(&prompt(MessageType::GreetingOrGeneral), None)
            .await;
        assert_eq!(result.unwrap(), "Stay where you are.");
    }

    #[tokio::test]
    async fn test_image_is_sent_as_inline_base64() {
        let mock_server = MockServer::start().await;
        let gateway = setup_gateway(&mock_server.uri(), Duration::from_secs(5));

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("I see water.")))
            .mount(&mock_server)
            .await;

        let attachment = Attachment::new("scene.png", "image/png", vec![1, 2, 3]);
        let result = gateway
            .invoke(&prompt(MessageType::ImageAnalysis), Some(&attachment))
            .await;
        assert!(result.is_ok());

        let requests = mock_server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let inline = &body["contents"][0]["parts"][1]["inline_data"];
        assert_eq!(inline["mime_type"], "image/png");
        assert_eq!(inline["data"], "AQID");
    }

    #[tokio::test]
    async fn test_unreadable_pdf_inlines_placeholder() {
        let mock_server = MockServer::start().await;
        let gateway = setup_gateway(&mock_server.uri(), Duration::from_secs(5));

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("Summary")))
            .mount(&mock_server)
            .await;

        let attachment = Attachment::new("plan.pdf", "application/pdf", b"not a pdf".to_vec());
        gateway
            .invoke(&prompt(MessageType::PdfAnalysis), Some(&attachment))
            .await
            .unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 1);
        let text = parts[0]["text"].as_str().unwrap();
        assert!(text.ends_with("PDF CONTENT:\nError extracting PDF content"));
    }

    #[tokio::test]
    async fn test_status_codes_are_classified() {
        let cases = [
            (401, "unauthorized", FailureKind::Authentication),
            (400, "API key not valid. Please pass a valid API key.", FailureKind::Authentication),
            (429, "Resource has been exhausted", FailureKind::RateLimited),
            (503, "The model is overloaded", FailureKind::ServiceUnavailable),
            (413, "Request payload size exceeds the limit", FailureKind::FileTooLarge),
            (418, "teapot", FailureKind::Unknown),
        ];

        for (status, body, expected) in cases {
            let mock_server = MockServer::start().await;
            let gateway = setup_gateway(&mock_server.uri(), Duration::from_secs(5));
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status).set_body_string(body))
                .mount(&mock_server)
                .await;

            let err = gateway
                .invoke(&prompt(MessageType::GreetingOrGeneral), None)
                .await
                .unwrap_err();
            assert_eq!(err.kind(), expected, "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_is_malformed() {
        let mock_server = MockServer::start().await;
        let gateway = setup_gateway(&mock_server.uri(), Duration::from_secs(5));
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
            .mount(&mock_server)
            .await;

        let err = gateway
            .invoke(&prompt(MessageType::GreetingOrGeneral), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let mock_server = MockServer::start().await;
        let gateway = setup_gateway(&mock_server.uri(), Duration::from_secs(5));
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = gateway
            .invoke(&prompt(MessageType::GreetingOrGeneral), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_timeout_maps_to_network() {
        let mock_server = MockServer::start().await;
        let gateway = setup_gateway(&mock_server.uri(), Duration::from_millis(100));
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply("late"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let err = gateway
            .invoke(&prompt(MessageType::EmergencyProtocol), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }

    #[tokio::test]
    async fn test_stalled_body_maps_to_network() {
        // Headers arrive promptly, then the body stops short of Content-Length
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 64 * 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 1000\r\n\r\n{\"cand",
                )
                .await
                .unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
        });

        let gateway = setup_gateway(&format!("http://{}", addr), Duration::from_millis(200));
        let outcome = tokio::time::timeout(
            Duration::from_secs(3),
            gateway.invoke(&prompt(MessageType::EmergencyProtocol), None),
        )
        .await
        .expect("invoke must honour its own deadline");

        assert!(matches!(outcome, Err(GatewayError::Network(_))), "got {:?}", outcome);
    }

    #[tokio::test]
    async fn test_unreachable_server_maps_to_network() {
        // Nothing listens on port 9 of localhost
        let gateway = setup_gateway("http://127.0.0.1:9", Duration::from_secs(5));
        let err = gateway
            .invoke(&prompt(MessageType::GreetingOrGeneral), None)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Network(_)));
    }

    #[tokio::test]
    async fn test_unknown_attachment_category_rejected() {
        let gateway = setup_gateway("http://127.0.0.1:9", Duration::from_secs(5));
        let attachment = Attachment::new("notes.txt", "text/plain", b"hello".to_vec());
        let err = gateway
            .invoke(&prompt(MessageType::GreetingOrGeneral), Some(&attachment))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnsupportedFormat(_)));
    }
}
