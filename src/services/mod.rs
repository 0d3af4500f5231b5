//! Thin clients for the Google Translation, Natural Language and Speech APIs.
//!
//! Each client shares one [`Transport`] and one [`RateGate`]; text-bearing
//! calls are admitted through the gate with their character count before the
//! request is sent. Results are flat `Serialize` rows.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod language;
pub mod speech;
pub mod translation;

pub use language::{AnalysisKind, LanguageClient, NlpAnalysis, NlpOptions};
pub use speech::{AudioEncoding, AudioSource, RecognizeOptions, SpeechAlternative, SpeechClient};
pub use translation::{
    Detection, Language, TextFormat, TranslateOptions, Translation, TranslationClient,
    TranslationModel,
};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::metrics::MetricsObserver;
use crate::ratelimit::{GateObserver, RateGate, TracingObserver};
use crate::transport::{GoogleTransport, Transport};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Decode a JSON response body into its wire type.
pub(crate) fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| Error::InvalidResponse(format!("Unexpected response shape: {}", e)))
}

/// All three API clients wired to one transport and one quota gate.
#[derive(Clone)]
pub struct CloudLingo {
    gate: RateGate,
    translation: TranslationClient,
    language: LanguageClient,
    speech: SpeechClient,
}

impl CloudLingo {
    /// Build the Google transport from config and wire every client to it.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let transport = GoogleTransport::new(&config.google, &config.auth)?;
        let observers: Vec<Arc<dyn GateObserver>> =
            vec![Arc::new(TracingObserver), Arc::new(MetricsObserver)];
        let gate = RateGate::with_observer(config.rate_limit.clone(), Arc::new(observers));
        Ok(Self::with_transport(config, Arc::new(transport), gate))
    }

    /// Wire the clients to a caller-supplied transport and gate.
    pub fn with_transport(config: &AppConfig, transport: Arc<dyn Transport>, gate: RateGate) -> Self {
        Self {
            translation: TranslationClient::new(transport.clone(), gate.clone(), &config.google),
            language: LanguageClient::new(transport.clone(), gate.clone(), &config.google),
            speech: SpeechClient::new(transport, gate.clone(), &config.google),
            gate,
        }
    }

    pub fn gate(&self) -> &RateGate {
        &self.gate
    }

    pub fn translation(&self) -> &TranslationClient {
        &self.translation
    }

    pub fn language(&self) -> &LanguageClient {
        &self.language
    }

    pub fn speech(&self) -> &SpeechClient {
        &self.speech
    }
}
