use serde::{Deserialize, Deserializer};

/// Parse a lap time string like `"1:23.456"` into seconds.
///
/// Plain second values (`"83.456"`) are accepted as well. Returns `None`
/// for empty or malformed input; the feed leaves the field out entirely
/// for laps without a timing record.
pub fn parse(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match value.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes.parse().ok()?;
            let seconds: f64 = seconds.parse().ok()?;
            Some(f64::from(minutes) * 60.0 + seconds)
        }
        None => value.parse().ok(),
    }
}

/// Deserialize a lap time string field into `f64` seconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid lap time '{s}'")))
}
