use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// MIME criterion: everything, or records whose MIME type contains a substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MimeFilter {
    #[default]
    All,
    Contains(String),
}

impl MimeFilter {
    pub const ALL: &'static str = "all";
}

impl Display for MimeFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MimeFilter::All => write!(f, "{}", Self::ALL),
            MimeFilter::Contains(s) => write!(f, "{}", s),
        }
    }
}

impl From<String> for MimeFilter {
    fn from(s: String) -> Self {
        if s == Self::ALL {
            MimeFilter::All
        } else {
            MimeFilter::Contains(s)
        }
    }
}

impl From<MimeFilter> for String {
    fn from(filter: MimeFilter) -> Self {
        filter.to_string()
    }
}

impl FromStr for MimeFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MimeFilter::from(s.to_string()))
    }
}

/// Inclusive size bounds in kilobytes (1 KB = 1024 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min_kb: u64,
    pub max_kb: u64,
}

impl SizeRange {
    pub fn new(min_kb: u64, max_kb: u64) -> Self {
        Self { min_kb, max_kb }
    }

    /// Lower bound in bytes.
    pub fn min_bytes(&self) -> u64 {
        self.min_kb.saturating_mul(1024)
    }

    /// Upper bound in bytes.
    pub fn max_bytes(&self) -> u64 {
        self.max_kb.saturating_mul(1024)
    }

    pub fn contains(&self, size: u64) -> bool {
        self.min_bytes() <= size && size <= self.max_bytes()
    }
}

impl Default for SizeRange {
    /// Unbounded range.
    fn default() -> Self {
        Self {
            min_kb: 0,
            max_kb: u64::MAX,
        }
    }
}

/// Upload-time window. Absent bounds impose no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        if let Some(from) = &self.from {
            if at < from {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if at > to {
                return false;
            }
        }
        true
    }
}

/// Dashboard filter state. A record is visible iff it satisfies every criterion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Case-insensitive filename substring.
    pub search: String,
    pub mime_type: MimeFilter,
    pub size_range: SizeRange,
    pub date_range: Option<DateRange>,
    /// Matches records sharing at least one of these tags. Empty matches everything.
    pub tags: BTreeSet<String>,
    /// Uploader substring. Empty matches everything.
    pub uploader: String,
}

impl FilterSpec {
    /// Clear all filters.
    pub fn reset(&mut self) {
        *self = FilterSpec::default();
    }

    pub fn is_default(&self) -> bool {
        *self == FilterSpec::default()
    }
}
