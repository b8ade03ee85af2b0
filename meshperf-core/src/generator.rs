use crate::error::FieldError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Load generators the backend knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadGenerator {
    /// Fortio load testing library: fixed QPS with latency histograms.
    #[default]
    Fortio,
    /// Constant throughput, correct latency recording variant of wrk.
    Wrk2,
    /// Distributed load generation.
    Nighthawk,
}

impl LoadGenerator {
    pub const ALL: [LoadGenerator; 3] = [
        LoadGenerator::Fortio,
        LoadGenerator::Wrk2,
        LoadGenerator::Nighthawk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LoadGenerator::Fortio => "fortio",
            LoadGenerator::Wrk2 => "wrk2",
            LoadGenerator::Nighthawk => "nighthawk",
        }
    }
}

impl FromStr for LoadGenerator {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LoadGenerator::ALL
            .into_iter()
            .find(|g| g.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| FieldError::UnknownLoadGenerator(s.to_string()))
    }
}

impl fmt::Display for LoadGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
