// Cloud Translation v2 client
// Author: kelexine (https://github.com/kelexine)

use super::decode;
use crate::config::GoogleConfig;
use crate::error::{Error, Result};
use crate::ratelimit::{batch_character_count, RateGate};
use crate::transport::{Method, Transport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Input format of the text to translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Text,
    Html,
}

/// Translation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationModel {
    /// Neural machine translation.
    #[default]
    Nmt,
    /// Phrase-based model.
    Base,
}

#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Source language; auto-detected by Google when `None`.
    pub source: Option<String>,
    pub format: TextFormat,
    pub model: TranslationModel,
}

/// One translated input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translation {
    pub translated_text: String,
    pub detected_source_language: Option<String>,
    pub source_text: String,
}

/// Language detection for one input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub text: String,
    pub language: String,
    pub confidence: Option<f64>,
    pub is_reliable: Option<bool>,
}

/// A language supported by the Translation API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    #[serde(rename = "language")]
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct TranslationsData {
    #[serde(default)]
    translations: Vec<WireTranslation>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireTranslation {
    translated_text: String,
    detected_source_language: Option<String>,
}

#[derive(Deserialize)]
struct DetectionsData {
    #[serde(default)]
    detections: Vec<Vec<WireDetection>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireDetection {
    language: String,
    confidence: Option<f64>,
    is_reliable: Option<bool>,
}

#[derive(Deserialize)]
struct LanguagesData {
    #[serde(default)]
    languages: Vec<Language>,
}

/// Client for `translation.googleapis.com/language/translate/v2`.
#[derive(Clone)]
pub struct TranslationClient {
    transport: Arc<dyn Transport>,
    gate: RateGate,
    base_url: String,
}

impl TranslationClient {
    pub fn new(transport: Arc<dyn Transport>, gate: RateGate, config: &GoogleConfig) -> Self {
        Self {
            transport,
            gate,
            base_url: config.translate_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Translates each entry of `texts` into `target`.
    ///
    /// Rows come back in input order. An empty batch returns no rows and
    /// sends nothing.
    pub async fn translate<S: AsRef<str>>(
        &self,
        texts: &[S],
        target: &str,
        options: &TranslateOptions,
    ) -> Result<Vec<Translation>> {
        require_language("target", target)?;
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let q: Vec<&str> = texts.iter().map(AsRef::as_ref).collect();
        let mut body = json!({
            "q": q,
            "target": target,
            "format": options.format,
            "model": options.model,
        });
        if let Some(source) = options.source.as_deref().filter(|s| !s.is_empty()) {
            body["source"] = json!(source);
        }

        let characters = batch_character_count(texts);
        debug!("Translating {} texts ({} characters) to {}", texts.len(), characters, target);
        self.gate.admit(characters).await?;

        let response = self
            .transport
            .call(Method::Post, &self.base_url, &[], Some(body))
            .await?;
        let data: Envelope<TranslationsData> = decode(response)?;

        if data.data.translations.len() != texts.len() {
            return Err(Error::InvalidResponse(format!(
                "expected {} translations, got {}",
                texts.len(),
                data.data.translations.len()
            )));
        }

        Ok(data
            .data
            .translations
            .into_iter()
            .zip(q)
            .map(|(t, source_text)| Translation {
                translated_text: t.translated_text,
                detected_source_language: t.detected_source_language,
                source_text: source_text.to_string(),
            })
            .collect())
    }

    /// Detects the language of each entry of `texts`, keeping Google's
    /// top-ranked guess.
    pub async fn detect_language<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<Detection>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let q: Vec<&str> = texts.iter().map(AsRef::as_ref).collect();
        self.gate.admit(batch_character_count(texts)).await?;

        let url = format!("{}/detect", self.base_url);
        let response = self
            .transport
            .call(Method::Post, &url, &[], Some(json!({ "q": q })))
            .await?;
        let data: Envelope<DetectionsData> = decode(response)?;

        if data.data.detections.len() != texts.len() {
            return Err(Error::InvalidResponse(format!(
                "expected {} detections, got {}",
                texts.len(),
                data.data.detections.len()
            )));
        }

        data.data
            .detections
            .into_iter()
            .zip(q)
            .map(|(candidates, text)| {
                let best = candidates.into_iter().next().ok_or_else(|| {
                    Error::InvalidResponse(format!("no detection returned for {:?}", text))
                })?;
                Ok(Detection {
                    text: text.to_string(),
                    language: best.language,
                    confidence: best.confidence,
                    is_reliable: best.is_reliable,
                })
            })
            .collect()
    }

    /// Lists supported languages, with names localized to `target` when given.
    pub async fn languages(&self, target: Option<&str>) -> Result<Vec<Language>> {
        let mut query = Vec::new();
        if let Some(target) = target.filter(|t| !t.is_empty()) {
            query.push(("target".to_string(), target.to_string()));
        }

        self.gate.pace().await;

        let url = format!("{}/languages", self.base_url);
        let response = self.transport.call(Method::Get, &url, &query, None).await?;
        let data: Envelope<LanguagesData> = decode(response)?;
        Ok(data.data.languages)
    }
}

fn require_language(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(format!("{} language must not be empty", field)));
    }
    Ok(())
}
