//! Short-audio speech recognition client.
//!
//! [`SpeechClient`] keeps a template [`RequestBuilder`] (method, path,
//! `language` query item, subscription key, WAV content type, timeout) and
//! derives one request per upload by adding the body to it.

use std::time::Duration;

use bytes::Bytes;
use thiserror::Error;
use url::Url;

use crate::config::SpeechConfig;
use crate::request::{ContentType, Request, RequestBuilder};
use crate::speech::result::RecognitionResult;
use crate::speech::transport::{Transport, TransportError};

/// Recognition path, resolved against the regional endpoint.
pub const RECOGNITION_PATH: &str = "speech/recognition/conversation/cognitiveservices/v1";

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

// ---------------------------------------------------------------------------
// SpeechError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("no subscription key configured (set AZURE_API_KEY or speech.subscription_key)")]
    MissingKey,

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("failed to parse recognition response: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// SpeechClient
// ---------------------------------------------------------------------------

pub struct SpeechClient<T: Transport> {
    transport: T,
    endpoint: Url,
    subscription_key: String,
    timeout: Duration,
    template: RequestBuilder,
}

impl<T: Transport> SpeechClient<T> {
    /// Build a client from config.  The subscription key is resolved via
    /// [`SpeechConfig::subscription_key`].
    pub fn from_config(config: &SpeechConfig, transport: T) -> Result<Self, SpeechError> {
        let key = config.subscription_key().ok_or(SpeechError::MissingKey)?;
        Self::new(
            transport,
            config.endpoint_url()?,
            key,
            &config.language,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn new(
        transport: T,
        endpoint: Url,
        subscription_key: impl Into<String>,
        language: &str,
        timeout: Duration,
    ) -> Result<Self, SpeechError> {
        let subscription_key = subscription_key.into();
        if subscription_key.trim().is_empty() {
            return Err(SpeechError::MissingKey);
        }
        let template = recognition_template(&subscription_key, language, timeout);
        Ok(Self {
            transport,
            endpoint,
            subscription_key,
            timeout,
            template,
        })
    }

    /// Same client, recognizing `language` instead.
    pub fn with_language(mut self, language: &str) -> Self {
        self.template = recognition_template(&self.subscription_key, language, self.timeout);
        self
    }

    /// The request that [`recognize`](Self::recognize) would send for `wav`.
    pub fn recognition_request(&self, wav: impl Into<Bytes>) -> Request {
        self.template.body(wav, true).finalize(&self.endpoint)
    }

    /// Upload a 16 kHz mono PCM16 WAV and parse the recognition result.
    pub async fn recognize(&self, wav: impl Into<Bytes>) -> Result<RecognitionResult, SpeechError> {
        let request = self.recognition_request(wav);
        log::info!(
            "recognizing {} bytes of audio at {}",
            request.body_len(),
            request.url
        );

        let body = self.transport.send(request).await?;
        let result: RecognitionResult = serde_json::from_slice(&body)?;

        if !result.is_success() {
            log::warn!("recognition status: {}", result.recognition_status);
        }
        Ok(result)
    }
}

fn recognition_template(key: &str, language: &str, timeout: Duration) -> RequestBuilder {
    RequestBuilder::post(RECOGNITION_PATH)
        .query_item("language", language)
        .header(SUBSCRIPTION_KEY_HEADER, key)
        .content_type(ContentType::AUDIO_WAV_PCM)
        .timeout(timeout)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
