//! services/api/src/adapters/gemini.rs
//!
//! This module contains the adapter for Gemini image generation.
//! It implements the `LightingGenerator` port from the `core` crate.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use lumiere_core::{LightingColor, LightingGenerator, PortError, PortResult, RoomImage};
use serde::Deserialize;
use tracing::{error, info};

const SYSTEM_INSTRUCTION: &str = "You are an expert interior lighting designer. \
Your task is to take an input image of a room and re-imagine it with specific colored lighting. \
Maintain the original furniture, layout, and perspective exactly. \
Only change the ambient lighting color and atmosphere. \
Make it look photorealistic, like high-end architectural photography.";

/// How much of an error body ends up in logs and error messages.
const MAX_ERROR_BODY_CHARS: usize = 1024;

/// The per-call instruction naming the target color.
pub fn lighting_prompt(color: LightingColor) -> String {
    format!(
        "Change the ambient lighting of this room to be strictly {color}. \
The room should look illuminated by {color} neon or smart lights. \
Keep the room structure and furniture identical. High quality, photorealistic."
    )
}

//=========================================================================================
// Response Shape
//=========================================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    #[serde(alias = "inline_data")]
    inline_data: Option<InlineBlob>,
}

#[derive(Debug, Deserialize)]
struct InlineBlob {
    data: String,
}

/// Pulls the first inline image out of the first candidate of a response body.
fn extract_image(body: &str) -> PortResult<Bytes> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| PortError::Unexpected(format!("Unparsable Gemini response: {}", e)))?;

    let blob = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().find_map(|p| p.inline_data))
        .ok_or_else(|| PortError::NotFound("No image part in Gemini response".to_string()))?;

    STANDARD
        .decode(blob.data.trim())
        .map(Bytes::from)
        .map_err(|e| PortError::Unexpected(format!("Image part is not valid base64: {}", e)))
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `LightingGenerator` using the Gemini `generateContent` API.
#[derive(Clone)]
pub struct GeminiLightingAdapter {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiLightingAdapter {
    /// Creates a new `GeminiLightingAdapter`. Without an API key every call
    /// fails fast with `PortError::Unauthorized`.
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        model: String,
        base_url: String,
    ) -> Self {
        Self {
            client,
            api_key,
            model,
            base_url,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

//=========================================================================================
// `LightingGenerator` Trait Implementation
//=========================================================================================

#[async_trait]
impl LightingGenerator for GeminiLightingAdapter {
    async fn relight(&self, room: &RoomImage, color: LightingColor) -> PortResult<Bytes> {
        let api_key = self.api_key.as_deref().ok_or(PortError::Unauthorized)?;

        let body = serde_json::json!({
            "systemInstruction": {
                "parts": [{ "text": SYSTEM_INSTRUCTION }]
            },
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": lighting_prompt(color) },
                    { "inlineData": { "mimeType": "image/jpeg", "data": STANDARD.encode(&room.jpeg) } }
                ]
            }]
        });

        info!("Requesting {} lighting from {}.", color, self.model);
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let msg = if e.is_timeout() {
                    format!("Gemini request timed out for {} lighting", color)
                } else {
                    format!("Gemini request failed for {} lighting: {}", color, e)
                };
                error!("{}", msg);
                PortError::Unexpected(msg)
            })?;

        let text = handle_response(response, color).await?;
        extract_image(&text)
    }
}

/// Checks the status and reads the body text of a `generateContent` response.
async fn handle_response(response: reqwest::Response, color: LightingColor) -> PortResult<String> {
    let status = response.status();
    if let Some(err) = status_error(status) {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        let truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        error!(
            "Gemini returned {} for {} lighting: {}",
            status, color, truncated
        );
        return Err(match err {
            PortError::Unexpected(msg) => PortError::Unexpected(format!("{} - {}", msg, truncated)),
            other => other,
        });
    }
    response
        .text()
        .await
        .map_err(|e| PortError::Unexpected(format!("Failed to read Gemini response: {}", e)))
}

/// Maps a non-success status to the port error it stands for.
fn status_error(status: reqwest::StatusCode) -> Option<PortError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            PortError::Unauthorized
        }
        _ => PortError::Unexpected(format!("Gemini returned {}", status)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_inline_image() {
        let body = r#"{
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here is your room." },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "AQID" } },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "BAUG" } }
                ]}
            }]
        }"#;
        assert_eq!(extract_image(body).unwrap(), Bytes::from_static(&[1, 2, 3]));
    }

    #[test]
    fn accepts_snake_case_inline_data() {
        let body = r#"{"candidates":[{"content":{"parts":[{"inline_data":{"mime_type":"image/png","data":"AQID"}}]}}]}"#;
        assert_eq!(extract_image(body).unwrap().len(), 3);
    }

    #[test]
    fn text_only_response_has_no_image() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"I cannot do that."}]}}]}"#;
        assert!(matches!(extract_image(body), Err(PortError::NotFound(_))));
        assert!(matches!(extract_image("{}"), Err(PortError::NotFound(_))));
    }

    #[test]
    fn garbage_is_unexpected() {
        assert!(matches!(extract_image("<html>"), Err(PortError::Unexpected(_))));
    }

    #[test]
    fn statuses_map_to_port_errors() {
        assert!(status_error(reqwest::StatusCode::OK).is_none());
        assert!(matches!(
            status_error(reqwest::StatusCode::FORBIDDEN),
            Some(PortError::Unauthorized)
        ));
        assert!(matches!(
            status_error(reqwest::StatusCode::TOO_MANY_REQUESTS),
            Some(PortError::Unexpected(msg)) if msg.contains("429")
        ));
    }

    #[test]
    fn prompt_names_the_color() {
        let prompt = lighting_prompt(LightingColor::Orange);
        assert!(prompt.contains("strictly Orange"));
        assert!(prompt.contains("Orange neon"));
    }

    #[tokio::test]
    async fn missing_key_short_circuits_without_network() {
        let adapter = GeminiLightingAdapter::new(
            reqwest::Client::new(),
            None,
            "gemini-2.5-flash-image".to_string(),
            // Unroutable on purpose: a network attempt would fail differently.
            "http://127.0.0.1:9".to_string(),
        );
        let room = RoomImage::new(Bytes::from_static(b"jpeg"));
        assert!(matches!(
            adapter.relight(&room, LightingColor::Red).await,
            Err(PortError::Unauthorized)
        ));
        assert_eq!(adapter.generate(&room, LightingColor::Red).await, None);
    }
}
