//! Client-side throttling for Google's character quotas.
//!
//! - `window`: the pure [`QuotaWindow`] counter.
//! - `gate`: [`RateGate`], the shared service every character-bearing call goes through.
//! - `events`: [`GateEvent`] and the [`GateObserver`] hook.
//!
//! Author: kelexine (<https://github.com/kelexine>)

mod events;
mod gate;
mod window;

pub use crate::config::RateGateConfig;
pub use events::{GateEvent, GateObserver, NoopObserver, TracingObserver};
pub use gate::{QuotaSnapshot, RateGate};
pub use window::QuotaWindow;

/// Number of characters Google bills for `text`: Unicode scalar values, not bytes.
pub fn character_count(text: &str) -> i64 {
    text.chars().count() as i64
}

/// Sum of [`character_count`] over a batch of inputs.
pub fn batch_character_count<S: AsRef<str>>(texts: &[S]) -> i64 {
    texts.iter().map(|t| character_count(t.as_ref())).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_count_is_not_byte_length() {
        assert_eq!(character_count("hello"), 5);
        assert_eq!(character_count("héllo"), 5);
        assert_eq!(character_count("日本語"), 3);
        assert_eq!(character_count(""), 0);
    }

    #[test]
    fn test_batch_character_count() {
        assert_eq!(batch_character_count(&["ab", "cde", ""]), 5);
        assert_eq!(batch_character_count::<&str>(&[]), 0);
    }
}
