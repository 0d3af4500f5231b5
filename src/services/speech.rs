// Cloud Speech-to-Text v1 client
// Author: kelexine (https://github.com/kelexine)

use super::decode;
use crate::config::GoogleConfig;
use crate::error::{Error, Result};
use crate::ratelimit::RateGate;
use crate::transport::{Method, Transport};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Largest `maxAlternatives` the API accepts.
pub const MAX_ALTERNATIVES: u32 = 30;

/// Where the audio comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum AudioSource {
    /// Object in Google Cloud Storage, `gs://bucket/object`.
    Uri(String),
    /// Raw audio bytes, sent inline as base64.
    Content(Vec<u8>),
}

impl std::fmt::Debug for AudioSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioSource::Uri(uri) => f.debug_tuple("Uri").field(uri).finish(),
            AudioSource::Content(bytes) => write!(f, "Content({} bytes)", bytes.len()),
        }
    }
}

impl AudioSource {
    /// `gs://` locations stay remote; anything else is read from disk.
    pub async fn from_location(location: &str) -> Result<Self> {
        if location.starts_with("gs://") {
            return Ok(AudioSource::Uri(location.to_string()));
        }
        Self::from_path(location).await
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(AudioSource::Content(tokio::fs::read(path).await?))
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            AudioSource::Uri(uri) => json!({ "uri": uri }),
            AudioSource::Content(bytes) => json!({ "content": STANDARD.encode(bytes) }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    EncodingUnspecified,
    #[default]
    Linear16,
    Flac,
    Mulaw,
    Amr,
    AmrWb,
    OggOpus,
    SpeexWithHeaderByte,
}

impl std::str::FromStr for AudioEncoding {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_value(json!(s.to_ascii_uppercase()))
            .map_err(|_| Error::InvalidArgument(format!("unknown audio encoding: {}", s)))
    }
}

#[derive(Debug, Clone)]
pub struct RecognizeOptions {
    pub language_code: String,
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    pub max_alternatives: u32,
    pub profanity_filter: bool,
    /// Phrase hints.
    pub speech_contexts: Vec<String>,
}

impl Default for RecognizeOptions {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            encoding: AudioEncoding::Linear16,
            sample_rate_hertz: 16_000,
            max_alternatives: 1,
            profanity_filter: false,
            speech_contexts: Vec::new(),
        }
    }
}

/// One transcription hypothesis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeechAlternative {
    /// Index of the consecutive audio segment this belongs to.
    pub result_index: usize,
    pub transcript: String,
    pub confidence: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireResponse {
    results: Vec<WireResult>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct WireResult {
    alternatives: Vec<WireAlternative>,
}

#[derive(Deserialize)]
struct WireAlternative {
    #[serde(default)]
    transcript: String,
    confidence: Option<f64>,
}

/// Client for `speech.googleapis.com/v1/speech:recognize`.
#[derive(Clone)]
pub struct SpeechClient {
    transport: Arc<dyn Transport>,
    gate: RateGate,
    base_url: String,
}

impl SpeechClient {
    pub fn new(transport: Arc<dyn Transport>, gate: RateGate, config: &GoogleConfig) -> Self {
        Self {
            transport,
            gate,
            base_url: config.speech_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Synchronous recognition of up to one minute of audio.
    ///
    /// Audio is not billed by characters, so only the per-request pause applies.
    pub async fn recognize(
        &self,
        audio: &AudioSource,
        options: &RecognizeOptions,
    ) -> Result<Vec<SpeechAlternative>> {
        if options.max_alternatives > MAX_ALTERNATIVES {
            return Err(Error::InvalidArgument(format!(
                "max_alternatives must be between 0 and {}, got {}",
                MAX_ALTERNATIVES, options.max_alternatives
            )));
        }
        if options.language_code.trim().is_empty() {
            return Err(Error::InvalidArgument("language_code must not be empty".to_string()));
        }

        let mut config = json!({
            "encoding": options.encoding,
            "sampleRateHertz": options.sample_rate_hertz,
            "languageCode": options.language_code,
            "maxAlternatives": options.max_alternatives,
            "profanityFilter": options.profanity_filter,
        });
        if !options.speech_contexts.is_empty() {
            config["speechContexts"] = json!([{ "phrases": options.speech_contexts }]);
        }
        let body = json!({ "config": config, "audio": audio.to_json() });

        debug!("Recognizing speech from {:?}", audio);
        self.gate.pace().await;

        let url = format!("{}/speech:recognize", self.base_url);
        let response = self
            .transport
            .call(Method::Post, &url, &[], Some(body))
            .await?;
        let wire: WireResponse = decode(response)?;

        Ok(wire
            .results
            .into_iter()
            .enumerate()
            .flat_map(|(result_index, result)| {
                result.alternatives.into_iter().map(move |alt| SpeechAlternative {
                    result_index,
                    transcript: alt.transcript,
                    confidence: alt.confidence,
                })
            })
            .collect())
    }
}
