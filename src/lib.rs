// cloudlingo - Quota-aware client for Google Translation, Natural Language and Speech APIs
// Author: kelexine (https://github.com/kelexine)

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod metrics;
pub mod ratelimit;
pub mod services;
pub mod transport;
pub mod utils;

pub use error::{Error, Result};
pub use ratelimit::{RateGate, RateGateConfig};
pub use services::CloudLingo;
