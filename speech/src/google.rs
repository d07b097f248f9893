//! Google Cloud Text-to-Speech client.

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};

use crate::{CloudSynthesizer, SpeechError};

/// Default Text-to-Speech API base URL.
pub const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error type for Google Text-to-Speech operations.
#[derive(Debug, thiserror::Error)]
pub enum GoogleTtsError {
    /// Error returned by the API.
    #[error("google tts: {message} (status={status}, http={http_status})")]
    Api {
        status: String,
        message: String,
        http_status: u16,
    },

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Audio content was not valid base64.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Voice gender requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SsmlGender {
    Male,
    Female,
    #[default]
    Neutral,
}

/// Encoding of the returned audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
    OggOpus,
    Linear16,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig,
}

#[derive(Debug, Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    ssml_gender: SsmlGender,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig {
    audio_encoding: AudioEncoding,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Google Cloud Text-to-Speech client authenticated with an API key.
///
/// # Example
///
/// ```rust,ignore
/// use glovetalk_speech::GoogleTts;
///
/// let client = GoogleTts::new("your-api-key")?;
/// let mp3 = client.synthesize_speech("hello", "en-US").await?;
/// ```
pub struct GoogleTts {
    http: ReqwestClient,
    base_url: String,
    api_key: String,
    gender: SsmlGender,
    encoding: AudioEncoding,
}

impl GoogleTts {
    /// Creates a client with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GoogleTtsError> {
        GoogleTtsBuilder::new(api_key).build()
    }

    /// Creates a builder for more configuration options.
    pub fn builder(api_key: impl Into<String>) -> GoogleTtsBuilder {
        GoogleTtsBuilder::new(api_key)
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Synthesizes `text` and returns the decoded audio.
    pub async fn synthesize_speech(
        &self,
        text: &str,
        language: &str,
    ) -> Result<Vec<u8>, GoogleTtsError> {
        let url = format!("{}/v1/text:synthesize", self.base_url);
        let body = self.request_body(text, language);

        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let http_status = response.status();
        let bytes = response.bytes().await?;
        if !http_status.is_success() {
            let err: ErrorResponse = serde_json::from_slice(&bytes).unwrap_or_default();
            return Err(GoogleTtsError::Api {
                status: err.error.status,
                message: err.error.message,
                http_status: http_status.as_u16(),
            });
        }

        let resp: SynthesizeResponse = serde_json::from_slice(&bytes).map_err(|e| {
            GoogleTtsError::Api {
                status: "INVALID_RESPONSE".to_string(),
                message: e.to_string(),
                http_status: http_status.as_u16(),
            }
        })?;
        decode_audio_content(&resp.audio_content)
    }

    fn request_body<'a>(&self, text: &'a str, language: &'a str) -> SynthesizeRequest<'a> {
        SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: language,
                ssml_gender: self.gender,
            },
            audio_config: AudioConfig {
                audio_encoding: self.encoding,
            },
        }
    }
}

#[async_trait]
impl CloudSynthesizer for GoogleTts {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, SpeechError> {
        self.synthesize_speech(text, language)
            .await
            .map_err(|e| SpeechError::Cloud(e.to_string()))
    }
}

/// Builder for [`GoogleTts`].
pub struct GoogleTtsBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
    gender: SsmlGender,
    encoding: AudioEncoding,
}

impl GoogleTtsBuilder {
    /// Creates a builder.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            gender: SsmlGender::default(),
            encoding: AudioEncoding::default(),
        }
    }

    /// Sets a custom base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the voice gender.
    pub fn gender(mut self, gender: SsmlGender) -> Self {
        self.gender = gender;
        self
    }

    /// Sets the audio encoding.
    pub fn encoding(mut self, encoding: AudioEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Builds the client.
    pub fn build(self) -> Result<GoogleTts, GoogleTtsError> {
        if self.api_key.is_empty() {
            return Err(GoogleTtsError::Config("api_key must be non-empty".to_string()));
        }
        if self.base_url.is_empty() {
            return Err(GoogleTtsError::Config("base_url must be non-empty".to_string()));
        }

        let http = ReqwestClient::builder().timeout(self.timeout).build()?;

        Ok(GoogleTts {
            http,
            base_url: self.base_url,
            api_key: self.api_key,
            gender: self.gender,
            encoding: self.encoding,
        })
    }
}

/// Decodes the base64 `audioContent` field of a synthesis response.
pub fn decode_audio_content(content: &str) -> Result<Vec<u8>, GoogleTtsError> {
    Ok(BASE64.decode(content.trim())?)
}

#[cfg(test)]
mod google_tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers one request with a canned response and returns the request
    /// head it received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            let head_end = loop {
                let n = stream.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending headers");
                request.extend_from_slice(&chunk[..n]);
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };
            let head = String::from_utf8_lossy(&request[..head_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            while request.len() < head_end + content_length {
                let n = stream.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&request).to_string()
        });
        (base_url, handle)
    }

    fn client(base_url: &str) -> GoogleTts {
        GoogleTts {
            http: ReqwestClient::builder()
                .no_proxy()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            gender: SsmlGender::default(),
            encoding: AudioEncoding::default(),
        }
    }

    #[tokio::test]
    async fn test_synthesize_decodes_audio() {
        let (base_url, server) = serve_once("200 OK", r#"{"audioContent":"SUQz"}"#).await;

        let audio = client(&base_url).synthesize_speech("hello", "ml-IN").await.unwrap();
        assert_eq!(audio, b"ID3");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /v1/text:synthesize?key=test-key "));
        assert!(request.contains(r#""languageCode":"ml-IN""#));
    }

    #[tokio::test]
    async fn test_synthesize_api_error() {
        let (base_url, server) = serve_once(
            "403 Forbidden",
            r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#,
        )
        .await;

        let err = client(&base_url).synthesize_speech("hello", "ml-IN").await.unwrap_err();
        match err {
            GoogleTtsError::Api {
                status,
                message,
                http_status,
            } => {
                assert_eq!(status, "PERMISSION_DENIED");
                assert_eq!(message, "API key not valid");
                assert_eq!(http_status, 403);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_synthesize_error_without_body() {
        let (base_url, server) = serve_once("503 Service Unavailable", "").await;

        let err = client(&base_url).synthesize_speech("hello", "ml-IN").await.unwrap_err();
        assert!(matches!(
            err,
            GoogleTtsError::Api { http_status: 503, ref status, .. } if status.is_empty()
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_synthesize_invalid_response() {
        let (base_url, server) = serve_once("200 OK", "<html>not json</html>").await;

        let err = client(&base_url).synthesize_speech("hello", "ml-IN").await.unwrap_err();
        assert!(matches!(
            err,
            GoogleTtsError::Api { http_status: 200, ref status, .. } if status == "INVALID_RESPONSE"
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_synthesize_bad_audio_content() {
        let (base_url, server) = serve_once("200 OK", r#"{"audioContent":"not base64!"}"#).await;

        let err = client(&base_url).synthesize_speech("hello", "ml-IN").await.unwrap_err();
        assert!(matches!(err, GoogleTtsError::Base64(_)));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_cloud_synthesizer_maps_errors() {
        let (base_url, server) = serve_once("500 Internal Server Error", "{}").await;

        let err = client(&base_url).synthesize("hello", "ml-IN").await.unwrap_err();
        assert!(matches!(err, SpeechError::Cloud(ref msg) if msg.contains("http=500")));
        server.await.unwrap();
    }

    #[test]
    fn test_build_requires_api_key() {
        assert!(matches!(
            GoogleTts::new(""),
            Err(GoogleTtsError::Config(_))
        ));
    }

    #[test]
    fn test_builder_trims_base_url() {
        let client = GoogleTts::builder("key")
            .base_url("http://localhost:8080/")
            .build()
            .unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[test]
    fn test_request_body_shape() {
        let client = GoogleTts::new("key").unwrap();
        let body = serde_json::to_value(client.request_body("hello", "ml-IN")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "input": { "text": "hello" },
                "voice": { "languageCode": "ml-IN", "ssmlGender": "NEUTRAL" },
                "audioConfig": { "audioEncoding": "MP3" }
            })
        );
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!(
            serde_json::to_value(AudioEncoding::OggOpus).unwrap(),
            "OGG_OPUS"
        );
        assert_eq!(serde_json::to_value(SsmlGender::Female).unwrap(), "FEMALE");
    }

    #[test]
    fn test_decode_audio_content() {
        assert_eq!(decode_audio_content("SUQz").unwrap(), b"ID3");
        assert!(matches!(
            decode_audio_content("not base64!"),
            Err(GoogleTtsError::Base64(_))
        ));
    }

    #[test]
    fn test_error_response_parse() {
        let data = br#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
        let err: ErrorResponse = serde_json::from_slice(data).unwrap();
        assert_eq!(err.error.status, "PERMISSION_DENIED");
        assert_eq!(err.error.message, "API key not valid");
    }
}
