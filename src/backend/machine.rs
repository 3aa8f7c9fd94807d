//! Backend A: direct machine translation over HTTP.
//!
//! Speaks the Google Cloud Translation v2 wire format:
//!
//! ```text
//! POST {endpoint}?key={api_key}
//! {"q": ["…"], "source": "ja", "target": "es", "format": "text"}
//!
//! 200 {"data": {"translations": [{"translatedText": "…"}]}}
//! 4xx {"error": {"code": 403, "message": "…"}}
//! ```
//!
//! `format: "text"` keeps newlines intact, which the paginator depends on.
//! Any service exposing the same shape (self-hosted proxies, emulators) can
//! be targeted by changing [`MachineConfig::endpoint`].

use super::{BackendRequest, TranslationBackend};
use crate::config::MachineConfig;
use crate::error::{BackendError, TranslateError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Serialize)]
struct TranslateRequestBody<'a> {
    q: [&'a str; 1],
    source: &'a str,
    target: &'a str,
    format: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponseBody {
    data: Option<TranslateData>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

/// HTTP client for a Google-Translate-v2-compatible endpoint.
#[derive(Debug)]
pub struct MachineTranslationBackend {
    client: reqwest::Client,
    config: MachineConfig,
}

impl MachineTranslationBackend {
    pub fn new(config: MachineConfig) -> Result<Self, TranslateError> {
        if reqwest::Url::parse(&config.endpoint).is_err() {
            return Err(TranslateError::InvalidConfig(format!(
                "machine translation endpoint is not a valid URL: '{}'",
                config.endpoint
            )));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| TranslateError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl TranslationBackend for MachineTranslationBackend {
    fn name(&self) -> &str {
        "machine"
    }

    async fn translate(&self, request: BackendRequest<'_>) -> Result<String, BackendError> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            BackendError::NotConfigured(
                "no API key for the machine translation endpoint (set GOOGLE_TRANSLATE_API_KEY)"
                    .into(),
            )
        })?;

        let body = build_request_body(&request);
        let start = Instant::now();

        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", api_key)])
            .json(&body)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let text = response.text().await.map_err(classify_transport_error)?;

        debug!(
            "machine backend: HTTP {} for {} chars in {:?}",
            status.as_u16(),
            request.text.chars().count(),
            start.elapsed()
        );

        if !status.is_success() {
            return Err(classify_status(status, retry_after, &text));
        }

        parse_response(&text)
    }
}

fn build_request_body<'a>(request: &BackendRequest<'a>) -> TranslateRequestBody<'a> {
    TranslateRequestBody {
        q: [request.text],
        source: request.source_language,
        target: request.target_language,
        format: "text",
    }
}

/// Extract the translated text from a successful response body.
fn parse_response(body: &str) -> Result<String, BackendError> {
    let parsed: TranslateResponseBody = serde_json::from_str(body)
        .map_err(|e| BackendError::MalformedResponse(format!("invalid JSON: {e}")))?;

    if let Some(err) = parsed.error {
        return Err(BackendError::Api {
            status: err.code.unwrap_or(200),
            message: err.message,
        });
    }

    let translated = parsed
        .data
        .and_then(|d| d.translations.into_iter().next())
        .map(|t| t.translated_text)
        .ok_or_else(|| {
            BackendError::MalformedResponse("missing data.translations[0].translatedText".into())
        })?;

    if translated.trim().is_empty() {
        return Err(BackendError::EmptyResponse);
    }
    Ok(translated)
}

/// Map a non-success HTTP status (plus the body's error message, if any).
fn classify_status(status: StatusCode, retry_after_secs: Option<u64>, body: &str) -> BackendError {
    let message = serde_json::from_str::<TranslateResponseBody>(body)
        .ok()
        .and_then(|b| b.error)
        .map(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| truncate(body, 200));

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Auth(message),
        StatusCode::TOO_MANY_REQUESTS => BackendError::RateLimited { retry_after_secs },
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => BackendError::Timeout(message),
        _ => BackendError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

fn classify_transport_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout(e.to_string())
    } else if e.is_connect() || e.is_request() {
        BackendError::Network(e.to_string())
    } else if e.is_decode() || e.is_body() {
        BackendError::MalformedResponse(e.to_string())
    } else {
        BackendError::Network(e.to_string())
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(text: &str) -> BackendRequest<'_> {
        BackendRequest {
            text,
            source_language: "ja",
            target_language: "es",
        }
    }

    #[test]
    fn request_body_uses_text_format() {
        let json = serde_json::to_value(build_request_body(&request("一\n二"))).unwrap();
        assert_eq!(json["q"][0], "一\n二");
        assert_eq!(json["source"], "ja");
        assert_eq!(json["target"], "es");
        assert_eq!(json["format"], "text");
    }

    #[test]
    fn parses_successful_response() {
        let body = r#"{"data":{"translations":[{"translatedText":"uno\ndos","detectedSourceLanguage":"ja"}]}}"#;
        assert_eq!(parse_response(body).unwrap(), "uno\ndos");
    }

    #[test]
    fn missing_translation_is_malformed() {
        let err = parse_response(r#"{"data":{"translations":[]}}"#).unwrap_err();
        assert!(matches!(err, BackendError::MalformedResponse(_)));

        let err = parse_response("<html>oops</html>").unwrap_err();
        assert!(matches!(err, BackendError::MalformedResponse(_)));
    }

    #[test]
    fn blank_translation_is_empty_response() {
        let err = parse_response(r#"{"data":{"translations":[{"translatedText":"  "}]}}"#)
            .unwrap_err();
        assert_eq!(err, BackendError::EmptyResponse);
    }

    #[test]
    fn error_body_in_200_is_api_error() {
        let err = parse_response(r#"{"error":{"code":400,"message":"Invalid Value"}}"#).unwrap_err();
        assert_eq!(
            err,
            BackendError::Api {
                status: 400,
                message: "Invalid Value".into()
            }
        );
    }

    #[test]
    fn classifies_http_statuses() {
        let body = r#"{"error":{"code":403,"message":"API key not valid"}}"#;
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN, None, body),
            BackendError::Auth("API key not valid".into())
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, Some(12), ""),
            BackendError::RateLimited {
                retry_after_secs: Some(12)
            }
        );
        assert!(matches!(
            classify_status(StatusCode::GATEWAY_TIMEOUT, None, "upstream"),
            BackendError::Timeout(_)
        ));
        assert_eq!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, None, "boom"),
            BackendError::Api {
                status: 500,
                message: "boom".into()
            }
        );
    }

    #[tokio::test]
    async fn missing_api_key_fails_without_network() {
        let backend = MachineTranslationBackend::new(MachineConfig::default()).unwrap();
        let err = backend.translate(request("こんにちは")).await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured(_)));
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = MachineTranslationBackend::new(MachineConfig {
            endpoint: "not a url".into(),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, TranslateError::InvalidConfig(_)));
    }
}
