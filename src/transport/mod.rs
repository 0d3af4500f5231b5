// Authenticated HTTP transport for Google REST APIs
// Author: kelexine (https://github.com/kelexine)

mod google;

pub use google::GoogleTransport;

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// HTTP verbs used by the Google REST endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// Performs one authenticated call and returns the decoded JSON body.
///
/// Implementations surface provider errors unchanged: a non-2xx answer is an
/// `Error::Api` carrying Google's status and message.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(
        &self,
        method: Method,
        url: &str,
        query: &[(String, String)],
        body: Option<Value>,
    ) -> Result<Value>;
}
