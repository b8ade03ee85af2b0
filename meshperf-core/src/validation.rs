//! Field validation helpers
//!
//! Pure checks run against raw form input before anything is sent to the backend.
use crate::error::FieldError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Returns true when `input` is an absolute URL with both a scheme and a host.
pub fn is_valid_url(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

/// Returns true when `input` parses as a JSON document.
pub fn is_json(input: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(input).is_ok()
}

/// Check the target URL field.
pub fn validate_url(input: &str) -> Result<(), FieldError> {
    if input.is_empty() {
        Err(FieldError::MissingUrl)
    } else if is_valid_url(input) {
        Ok(())
    } else {
        Err(FieldError::InvalidUrl(input.to_string()))
    }
}

/// Check the additional options field. An empty value is accepted.
pub fn validate_additional_options(input: &str) -> Result<(), FieldError> {
    if input.is_empty() || is_json(input) {
        Ok(())
    } else {
        Err(FieldError::InvalidJson)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationUnit {
    Hours,
    Minutes,
    Seconds,
}

impl DurationUnit {
    pub fn suffix(&self) -> char {
        match self {
            DurationUnit::Hours => 'h',
            DurationUnit::Minutes => 'm',
            DurationUnit::Seconds => 's',
        }
    }

    fn from_suffix(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'h' => Some(DurationUnit::Hours),
            'm' => Some(DurationUnit::Minutes),
            's' => Some(DurationUnit::Seconds),
            _ => None,
        }
    }

    fn seconds(&self) -> u64 {
        match self {
            DurationUnit::Hours => 3600,
            DurationUnit::Minutes => 60,
            DurationUnit::Seconds => 1,
        }
    }
}

/// Load test duration as typed into the form: `30s`, `5m`, `1h`.
///
/// Accepted iff the input is one or more ASCII digits followed by one of `hHmMsS`, and the
/// numeric part is greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestDuration {
    value: u64,
    unit: DurationUnit,
}

impl TestDuration {
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn unit(&self) -> DurationUnit {
        self.unit
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.value.saturating_mul(self.unit.seconds()))
    }
}

impl FromStr for TestDuration {
    type Err = FieldError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || FieldError::InvalidDuration(input.to_string());

        let mut chars = input.chars();
        let unit = chars
            .next_back()
            .and_then(DurationUnit::from_suffix)
            .ok_or_else(invalid)?;

        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let value: u64 = digits.parse().map_err(|_| invalid())?;
        if value == 0 {
            return Err(invalid());
        }

        Ok(TestDuration { value, unit })
    }
}

impl fmt::Display for TestDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit.suffix())
    }
}
