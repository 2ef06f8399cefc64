//! Parsing for human-readable TTL strings like "60s", "5m", "1h".

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{de, Deserialize, Deserializer};

/// Parse a TTL string: a number followed by an optional unit.
///
/// Supported units are `h` (hours), `m` (minutes) and `s` (seconds); a bare
/// number is read as seconds. Input is case-insensitive and trimmed.
pub fn parse_ttl(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();

    let (num, multiplier) = match s.as_bytes().last() {
        Some(b'h') => (&s[..s.len() - 1], 3600),
        Some(b'm') => (&s[..s.len() - 1], 60),
        Some(b's') => (&s[..s.len() - 1], 1),
        _ => (s.as_str(), 1),
    };

    let num: u64 = num
        .trim()
        .parse()
        .with_context(|| format!("invalid TTL: {s:?}"))?;

    let secs = num.checked_mul(multiplier).context("TTL is too large")?;
    Ok(Duration::from_secs(secs))
}

/// Serde deserializer accepting either a TTL string or a plain number of
/// seconds.
///
/// Use with `#[serde(deserialize_with = "deserialize_ttl")]`.
pub fn deserialize_ttl<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(s) => parse_ttl(&s).map_err(de::Error::custom),
    }
}
