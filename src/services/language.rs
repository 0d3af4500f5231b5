// Cloud Natural Language v1 client
// Author: kelexine (https://github.com/kelexine)

use super::decode;
use crate::config::GoogleConfig;
use crate::error::{Error, Result};
use crate::ratelimit::{character_count, RateGate};
use crate::transport::{Method, Transport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Which `documents:*` method to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisKind {
    Sentiment,
    Entities,
    Syntax,
    /// Syntax, entities and document sentiment in one call.
    #[default]
    Annotate,
}

impl AnalysisKind {
    fn method(self) -> &'static str {
        match self {
            AnalysisKind::Sentiment => "analyzeSentiment",
            AnalysisKind::Entities => "analyzeEntities",
            AnalysisKind::Syntax => "analyzeSyntax",
            AnalysisKind::Annotate => "annotateText",
        }
    }
}

impl std::str::FromStr for AnalysisKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sentiment" | "analyzesentiment" => Ok(AnalysisKind::Sentiment),
            "entities" | "analyzeentities" => Ok(AnalysisKind::Entities),
            "syntax" | "analyzesyntax" => Ok(AnalysisKind::Syntax),
            "annotate" | "annotatetext" => Ok(AnalysisKind::Annotate),
            other => Err(Error::InvalidArgument(format!("unknown analysis kind: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NlpOptions {
    /// ISO-639-1 language; detected by Google when `None`.
    pub language: Option<String>,
    /// Treat the content as HTML instead of plain text.
    pub html: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceRow {
    pub content: String,
    pub begin_offset: i64,
    pub score: Option<f64>,
    pub magnitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenRow {
    pub content: String,
    pub begin_offset: i64,
    pub tag: Option<String>,
    pub lemma: Option<String>,
    pub head_token_index: Option<i64>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityRow {
    pub name: String,
    pub entity_type: String,
    pub salience: f64,
    pub mentions: usize,
    pub wikipedia_url: Option<String>,
    pub mid: Option<String>,
}

/// Flattened result of one analysis. Sections the chosen
/// [`AnalysisKind`] does not produce are empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NlpAnalysis {
    pub sentences: Vec<SentenceRow>,
    pub tokens: Vec<TokenRow>,
    pub entities: Vec<EntityRow>,
    pub document_sentiment: Option<Sentiment>,
    pub language: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct WireResponse {
    sentences: Vec<WireSentence>,
    tokens: Vec<WireToken>,
    entities: Vec<WireEntity>,
    document_sentiment: Option<Sentiment>,
    language: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct TextSpan {
    content: String,
    begin_offset: i64,
}

#[derive(Deserialize)]
struct WireSentence {
    #[serde(default)]
    text: TextSpan,
    sentiment: Option<Sentiment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireToken {
    #[serde(default)]
    text: TextSpan,
    part_of_speech: Option<PartOfSpeech>,
    dependency_edge: Option<DependencyEdge>,
    lemma: Option<String>,
}

#[derive(Deserialize)]
struct PartOfSpeech {
    tag: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DependencyEdge {
    head_token_index: Option<i64>,
    label: Option<String>,
}

#[derive(Deserialize)]
struct WireEntity {
    name: String,
    #[serde(rename = "type", default)]
    entity_type: String,
    #[serde(default)]
    salience: f64,
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(default)]
    mentions: Vec<serde_json::Value>,
}

impl From<WireResponse> for NlpAnalysis {
    fn from(wire: WireResponse) -> Self {
        Self {
            sentences: wire
                .sentences
                .into_iter()
                .map(|s| SentenceRow {
                    content: s.text.content,
                    begin_offset: s.text.begin_offset,
                    score: s.sentiment.map(|x| x.score),
                    magnitude: s.sentiment.map(|x| x.magnitude),
                })
                .collect(),
            tokens: wire
                .tokens
                .into_iter()
                .map(|t| TokenRow {
                    content: t.text.content,
                    begin_offset: t.text.begin_offset,
                    tag: t.part_of_speech.and_then(|p| p.tag),
                    lemma: t.lemma,
                    head_token_index: t.dependency_edge.as_ref().and_then(|d| d.head_token_index),
                    label: t.dependency_edge.and_then(|d| d.label),
                })
                .collect(),
            entities: wire
                .entities
                .into_iter()
                .map(|mut e| EntityRow {
                    mentions: e.mentions.len(),
                    wikipedia_url: e.metadata.remove("wikipedia_url"),
                    mid: e.metadata.remove("mid"),
                    name: e.name,
                    entity_type: e.entity_type,
                    salience: e.salience,
                })
                .collect(),
            document_sentiment: wire.document_sentiment,
            language: wire.language,
        }
    }
}

/// Client for `language.googleapis.com/v1/documents:*`.
#[derive(Clone)]
pub struct LanguageClient {
    transport: Arc<dyn Transport>,
    gate: RateGate,
    base_url: String,
}

impl LanguageClient {
    pub fn new(transport: Arc<dyn Transport>, gate: RateGate, config: &GoogleConfig) -> Self {
        Self {
            transport,
            gate,
            base_url: config.language_base_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn analyze(
        &self,
        text: &str,
        kind: AnalysisKind,
        options: &NlpOptions,
    ) -> Result<NlpAnalysis> {
        if text.trim().is_empty() {
            return Err(Error::InvalidArgument("text to analyze must not be empty".to_string()));
        }

        let mut document = json!({
            "type": if options.html { "HTML" } else { "PLAIN_TEXT" },
            "content": text,
        });
        if let Some(language) = options.language.as_deref().filter(|l| !l.is_empty()) {
            document["language"] = json!(language);
        }
        let mut body = json!({
            "document": document,
            "encodingType": "UTF8",
        });
        if kind == AnalysisKind::Annotate {
            body["features"] = json!({
                "extractSyntax": true,
                "extractEntities": true,
                "extractDocumentSentiment": true,
            });
        }

        let characters = character_count(text);
        debug!("Running {} on {} characters", kind.method(), characters);
        self.gate.admit(characters).await?;

        let url = format!("{}/documents:{}", self.base_url, kind.method());
        let response = self
            .transport
            .call(Method::Post, &url, &[], Some(body))
            .await?;
        let wire: WireResponse = decode(response)?;
        Ok(wire.into())
    }

    pub async fn analyze_sentiment(&self, text: &str, options: &NlpOptions) -> Result<NlpAnalysis> {
        self.analyze(text, AnalysisKind::Sentiment, options).await
    }

    pub async fn analyze_entities(&self, text: &str, options: &NlpOptions) -> Result<NlpAnalysis> {
        self.analyze(text, AnalysisKind::Entities, options).await
    }

    pub async fn analyze_syntax(&self, text: &str, options: &NlpOptions) -> Result<NlpAnalysis> {
        self.analyze(text, AnalysisKind::Syntax, options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_str() {
        assert_eq!("sentiment".parse::<AnalysisKind>().unwrap(), AnalysisKind::Sentiment);
        assert_eq!("annotateText".parse::<AnalysisKind>().unwrap(), AnalysisKind::Annotate);
        assert!("summarize".parse::<AnalysisKind>().is_err());
    }

    #[test]
    fn test_wire_response_flattening() {
        let wire: WireResponse = serde_json::from_value(json!({
            "sentences": [
                {"text": {"content": "I love Rust.", "beginOffset": 0},
                 "sentiment": {"magnitude": 0.9, "score": 0.9}}
            ],
            "tokens": [
                {"text": {"content": "love", "beginOffset": 2},
                 "partOfSpeech": {"tag": "VERB"},
                 "dependencyEdge": {"headTokenIndex": 1, "label": "ROOT"},
                 "lemma": "love"}
            ],
            "entities": [
                {"name": "Rust", "type": "OTHER", "salience": 1.0,
                 "metadata": {"wikipedia_url": "https://en.wikipedia.org/wiki/Rust_(programming_language)"},
                 "mentions": [{"text": {"content": "Rust"}}]}
            ],
            "documentSentiment": {"magnitude": 0.9, "score": 0.9},
            "language": "en"
        }))
        .unwrap();

        let analysis = NlpAnalysis::from(wire);
        assert_eq!(analysis.sentences[0].content, "I love Rust.");
        assert_eq!(analysis.sentences[0].score, Some(0.9));
        assert_eq!(analysis.tokens[0].tag.as_deref(), Some("VERB"));
        assert_eq!(analysis.tokens[0].head_token_index, Some(1));
        assert_eq!(analysis.entities[0].mentions, 1);
        assert!(analysis.entities[0].wikipedia_url.is_some());
        assert!(analysis.entities[0].mid.is_none());
        assert_eq!(analysis.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_entities_only_response_leaves_other_sections_empty() {
        let wire: WireResponse = serde_json::from_value(json!({
            "entities": [{"name": "Paris", "type": "LOCATION", "salience": 0.5}],
            "language": "fr"
        }))
        .unwrap();
        let analysis = NlpAnalysis::from(wire);
        assert!(analysis.sentences.is_empty());
        assert!(analysis.tokens.is_empty());
        assert!(analysis.document_sentiment.is_none());
        assert_eq!(analysis.entities[0].entity_type, "LOCATION");
    }
}
