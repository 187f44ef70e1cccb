use serde::{Deserialize, Serialize};
use std::fmt;

/// Approximate working hours per year, used to turn an hourly rate into an annual figure.
pub const HOURS_PER_YEAR: u64 = 2000;

/// Handle of a rendered job card. Assigned in page order at scan time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub usize);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub rate: String, // display form, e.g. "$250/hr"
    #[serde(default)]
    pub tags: Vec<String>,
}

impl JobRecord {
    pub fn hourly_rate(&self) -> Option<u64> {
        parse_rate(&self.rate)
    }

    pub fn annual_rate(&self) -> Option<u64> {
        self.hourly_rate()
            .map(|rate| rate.saturating_mul(HOURS_PER_YEAR))
    }

    pub fn lowercase_tags(&self) -> Vec<String> {
        self.tags.iter().map(|tag| tag.to_lowercase()).collect()
    }
}

/// A job record paired with the card it was scanned from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobEntry {
    pub id: JobId,
    pub record: JobRecord,
}

/// Integer rate from a display string with every non-digit dropped.
///
/// "$250/hr" parses to 250, "$1,200/day" to 1200. Strings without digits have
/// no rate; digits too large for a u64 saturate to `u64::MAX`.
pub fn parse_rate(rate: &str) -> Option<u64> {
    let digits: String = rate.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(rate: &str) -> JobRecord {
        JobRecord {
            title: "Engineer".to_string(),
            company: "Acme".to_string(),
            rate: rate.to_string(),
            tags: vec!["Full-Time".to_string(), "Senior".to_string()],
        }
    }

    #[test]
    fn test_parse_rate_strips_non_digits() {
        assert_eq!(parse_rate("$250/hr"), Some(250));
        assert_eq!(parse_rate("$1,200/day"), Some(1200));
        assert_eq!(parse_rate("75"), Some(75));
    }

    #[test]
    fn test_parse_rate_joins_every_digit_group() {
        // Ranges collapse into a single number, same as stripping with a regex would.
        assert_eq!(parse_rate("$100-150/hr"), Some(100150));
    }

    #[test]
    fn test_parse_rate_without_digits() {
        assert_eq!(parse_rate("Negotiable"), None);
        assert_eq!(parse_rate(""), None);
    }

    #[test]
    fn test_parse_rate_overflow_saturates() {
        assert_eq!(parse_rate("$99999999999999999999999/hr"), Some(u64::MAX));
        assert_eq!(record("$100000000000000000000/hr").annual_rate(), Some(u64::MAX));
    }

    #[test]
    fn test_annual_rate() {
        assert_eq!(record("$100/hr").annual_rate(), Some(200_000));
        assert_eq!(record("DOE").annual_rate(), None);
    }

    #[test]
    fn test_lowercase_tags() {
        assert_eq!(record("$1").lowercase_tags(), vec!["full-time", "senior"]);
    }

    #[test]
    fn test_record_deserializes_without_tags() {
        let record: JobRecord = serde_json::from_str(
            r#"{"title":"Dev","company":"Beta","rate":"$300/hr","location":"Remote"}"#,
        )
        .unwrap();
        assert_eq!(record.title, "Dev");
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_job_id_display() {
        assert_eq!(JobId(3).to_string(), "#3");
    }
}
