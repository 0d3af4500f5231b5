// Shared test doubles
// Author: kelexine (https://github.com/kelexine)

#![allow(dead_code)]

use async_trait::async_trait;
use cloudlingo::config::{AppConfig, RateGateConfig};
use cloudlingo::error::Result;
use cloudlingo::transport::{Method, Transport};
use cloudlingo::{CloudLingo, RateGate};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// One request seen by [`FakeTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Replays canned responses in order and records every call.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<VecDeque<Result<Value>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn with_responses(responses: Vec<Result<Value>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn call(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            query: query.to_vec(),
            body,
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Value::Object(Default::default())))
    }
}

/// Gate with no per-request pause and the given window.
pub fn gate(character_limit: u64, delay_limit_seconds: u64) -> RateGate {
    RateGate::new(RateGateConfig {
        character_limit,
        delay_limit_seconds,
        per_request_delay_ms: 0,
        poll_interval_seconds: 5,
    })
}

pub fn lingo(transport: Arc<FakeTransport>, gate: RateGate) -> CloudLingo {
    CloudLingo::with_transport(&AppConfig::default(), transport, gate)
}
