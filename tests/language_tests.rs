// Natural Language client tests
// Author: kelexine (https://github.com/kelexine)

mod common;

use cloudlingo::error::Error;
use cloudlingo::services::{AnalysisKind, NlpOptions};
use common::{gate, lingo, FakeTransport};
use serde_json::json;

#[tokio::test]
async fn test_sentiment_request_and_rows() {
    let transport = FakeTransport::with_responses(vec![Ok(json!({
        "documentSentiment": {"magnitude": 1.2, "score": -0.6},
        "language": "en",
        "sentences": [
            {"text": {"content": "This is awful.", "beginOffset": 0},
             "sentiment": {"magnitude": 0.8, "score": -0.8}},
            {"text": {"content": "Mostly.", "beginOffset": 15},
             "sentiment": {"magnitude": 0.4, "score": -0.4}}
        ]
    }))]);
    let lingo = lingo(transport.clone(), gate(100_000, 100));

    let analysis = lingo
        .language()
        .analyze_sentiment("This is awful. Mostly.", &NlpOptions::default())
        .await
        .unwrap();

    let sentiment = analysis.document_sentiment.unwrap();
    assert_eq!(sentiment.score, -0.6);
    assert_eq!(sentiment.magnitude, 1.2);
    assert_eq!(analysis.sentences.len(), 2);
    assert_eq!(analysis.sentences[1].begin_offset, 15);
    assert!(analysis.entities.is_empty());

    let call = &transport.calls()[0];
    assert_eq!(
        call.url,
        "https://language.googleapis.com/v1/documents:analyzeSentiment"
    );
    assert_eq!(
        call.body,
        Some(json!({
            "document": {"type": "PLAIN_TEXT", "content": "This is awful. Mostly."},
            "encodingType": "UTF8"
        }))
    );
    assert_eq!(lingo.gate().snapshot().await.accumulated_characters, 22);
}

#[tokio::test]
async fn test_annotate_requests_all_features() {
    let transport = FakeTransport::with_responses(vec![Ok(json!({
        "entities": [{"name": "Berlin", "type": "LOCATION", "salience": 0.7,
                      "metadata": {"mid": "/m/0156q"},
                      "mentions": [{}, {}]}],
        "tokens": [{"text": {"content": "Berlin", "beginOffset": 0},
                    "partOfSpeech": {"tag": "NOUN"},
                    "dependencyEdge": {"headTokenIndex": 0, "label": "ROOT"},
                    "lemma": "Berlin"}],
        "language": "de"
    }))]);
    let lingo = lingo(transport.clone(), gate(100_000, 100));
    let options = NlpOptions {
        language: Some("de".to_string()),
        html: true,
    };

    let analysis = lingo
        .language()
        .analyze("<p>Berlin</p>", AnalysisKind::Annotate, &options)
        .await
        .unwrap();

    assert_eq!(analysis.entities[0].mid.as_deref(), Some("/m/0156q"));
    assert_eq!(analysis.entities[0].mentions, 2);
    assert_eq!(analysis.tokens[0].label.as_deref(), Some("ROOT"));

    let body = transport.calls()[0].body.clone().unwrap();
    assert!(transport.calls()[0].url.ends_with("documents:annotateText"));
    assert_eq!(body["document"]["type"], "HTML");
    assert_eq!(body["document"]["language"], "de");
    assert_eq!(body["features"]["extractSyntax"], true);
    assert_eq!(body["features"]["extractEntities"], true);
    assert_eq!(body["features"]["extractDocumentSentiment"], true);
}

#[tokio::test]
async fn test_entities_and_syntax_endpoints() {
    let transport = FakeTransport::with_responses(vec![Ok(json!({})), Ok(json!({}))]);
    let lingo = lingo(transport.clone(), gate(100_000, 100));
    let options = NlpOptions::default();

    lingo.language().analyze_entities("Paris", &options).await.unwrap();
    lingo.language().analyze_syntax("Paris", &options).await.unwrap();

    let calls = transport.calls();
    assert!(calls[0].url.ends_with("documents:analyzeEntities"));
    assert!(calls[1].url.ends_with("documents:analyzeSyntax"));
    assert!(calls[0].body.as_ref().unwrap().get("features").is_none());
}

#[tokio::test]
async fn test_blank_text_rejected_before_gate() {
    let transport = FakeTransport::with_responses(vec![]);
    let lingo = lingo(transport.clone(), gate(100_000, 100));

    let err = lingo
        .language()
        .analyze("   ", AnalysisKind::Sentiment, &NlpOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidArgument(_)));
    assert!(transport.calls().is_empty());
    assert_eq!(lingo.gate().snapshot().await.accumulated_characters, 0);
}

#[tokio::test]
async fn test_malformed_response_is_invalid() {
    let transport = FakeTransport::with_responses(vec![Ok(json!({"sentences": "nope"}))]);
    let lingo = lingo(transport, gate(100_000, 100));

    let err = lingo
        .language()
        .analyze_sentiment("fine", &NlpOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidResponse(_)));
}
