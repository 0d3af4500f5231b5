// CLI module for cloudlingo
// Author: kelexine (https://github.com/kelexine)

use crate::config::AppConfig;
use crate::error::Result;
use crate::services::{
    AnalysisKind, AudioEncoding, AudioSource, CloudLingo, NlpOptions, RecognizeOptions,
    TextFormat, TranslateOptions, TranslationModel,
};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

/// cloudlingo - Quota-aware client for Google Translation, Natural Language and Speech APIs
#[derive(Parser, Debug)]
#[command(name = "cloudlingo", version, about, long_about = None)]
pub struct Args {
    /// Config file (default: ~/.cloudlingo/config.toml)
    #[arg(long, global = true, env = "CLOUDLINGO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Google Cloud API key (overrides OAuth credentials)
    #[arg(long, global = true, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Characters allowed per quota window
    #[arg(long, global = true)]
    pub character_limit: Option<u64>,

    /// Quota window length in seconds
    #[arg(long, global = true)]
    pub delay_limit_seconds: Option<u64>,

    /// Pause before every request, in milliseconds
    #[arg(long, global = true)]
    pub per_request_delay_ms: Option<u64>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print Prometheus metrics to stderr when done
    #[arg(long, global = true)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Translate text
    Translate {
        /// Target language code
        #[arg(short, long)]
        target: String,

        /// Source language code (auto-detect if not specified)
        #[arg(short, long)]
        source: Option<String>,

        /// Input is HTML
        #[arg(long)]
        html: bool,

        /// Use the phrase-based model instead of NMT
        #[arg(long)]
        base_model: bool,

        /// Texts to translate
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// Detect the language of text
    Detect {
        #[arg(required = true)]
        texts: Vec<String>,
    },

    /// List supported translation languages
    Languages {
        /// Localize language names into this language
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Analyze text with the Natural Language API
    Nlp {
        /// sentiment, entities, syntax or annotate
        #[arg(short, long, default_value = "annotate")]
        kind: String,

        /// Document language (auto-detect if not specified)
        #[arg(short, long)]
        language: Option<String>,

        /// Input is HTML
        #[arg(long)]
        html: bool,

        text: String,
    },

    /// Transcribe audio with the Speech-to-Text API
    Speech {
        /// Local audio file or gs:// URI
        audio: String,

        #[arg(short, long, default_value = "en-US")]
        language_code: String,

        #[arg(short, long, default_value = "LINEAR16")]
        encoding: String,

        #[arg(long, default_value_t = 16_000)]
        sample_rate_hertz: u32,

        #[arg(long, default_value_t = 1)]
        max_alternatives: u32,

        #[arg(long)]
        profanity_filter: bool,

        /// Phrase hints, repeatable
        #[arg(long = "phrase")]
        phrases: Vec<String>,
    },
}

impl Args {
    /// Layer CLI flags over the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(key) = &self.api_key {
            config.auth.api_key = Some(key.clone());
        }
        if let Some(limit) = self.character_limit {
            config.rate_limit.character_limit = limit;
        }
        if let Some(seconds) = self.delay_limit_seconds {
            config.rate_limit.delay_limit_seconds = seconds;
        }
        if let Some(ms) = self.per_request_delay_ms {
            config.rate_limit.per_request_delay_ms = ms;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}

/// Run one subcommand and return its rows as JSON.
pub async fn execute(command: Command, lingo: &CloudLingo) -> Result<Value> {
    let value = match command {
        Command::Translate {
            target,
            source,
            html,
            base_model,
            texts,
        } => {
            let options = TranslateOptions {
                source,
                format: if html { TextFormat::Html } else { TextFormat::Text },
                model: if base_model {
                    TranslationModel::Base
                } else {
                    TranslationModel::Nmt
                },
            };
            serde_json::to_value(lingo.translation().translate(&texts, &target, &options).await?)?
        }
        Command::Detect { texts } => {
            serde_json::to_value(lingo.translation().detect_language(&texts).await?)?
        }
        Command::Languages { target } => {
            serde_json::to_value(lingo.translation().languages(target.as_deref()).await?)?
        }
        Command::Nlp {
            kind,
            language,
            html,
            text,
        } => {
            let kind: AnalysisKind = kind.parse()?;
            let options = NlpOptions { language, html };
            serde_json::to_value(lingo.language().analyze(&text, kind, &options).await?)?
        }
        Command::Speech {
            audio,
            language_code,
            encoding,
            sample_rate_hertz,
            max_alternatives,
            profanity_filter,
            phrases,
        } => {
            let encoding: AudioEncoding = encoding.parse()?;
            let audio = AudioSource::from_location(&audio).await?;
            let options = RecognizeOptions {
                language_code,
                encoding,
                sample_rate_hertz,
                max_alternatives,
                profanity_filter,
                speech_contexts: phrases,
            };
            serde_json::to_value(lingo.speech().recognize(&audio, &options).await?)?
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_translate() {
        let args = Args::parse_from([
            "cloudlingo",
            "--character-limit",
            "500",
            "translate",
            "-t",
            "fr",
            "hello",
            "world",
        ]);
        match &args.command {
            Command::Translate { target, texts, .. } => {
                assert_eq!(target, "fr");
                assert_eq!(texts, &vec!["hello".to_string(), "world".to_string()]);
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let mut config = AppConfig::default();
        args.apply(&mut config);
        assert_eq!(config.rate_limit.character_limit, 500);
        assert_eq!(config.rate_limit.delay_limit_seconds, 100);
    }

    #[test]
    fn test_parse_speech_phrases() {
        let args = Args::parse_from([
            "cloudlingo",
            "speech",
            "gs://bucket/a.flac",
            "--encoding",
            "flac",
            "--phrase",
            "Rust",
            "--phrase",
            "tokio",
        ]);
        match args.command {
            Command::Speech {
                audio,
                phrases,
                sample_rate_hertz,
                ..
            } => {
                assert_eq!(audio, "gs://bucket/a.flac");
                assert_eq!(phrases, vec!["Rust", "tokio"]);
                assert_eq!(sample_rate_hertz, 16_000);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
