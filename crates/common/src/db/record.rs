//! Store-agnostic summary record and its identifier

use crate::db::models::TextSummary;
use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a summary record.
///
/// Always a positive integer. Parsing rejects zero, negative and non-numeric
/// input with [`AppError::InvalidId`], so an invalid id never reaches a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct SummaryId(i64);

impl SummaryId {
    /// Wrap a raw value, `None` unless it is positive
    pub fn new(value: i64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Primary key in the `text_summaries` table; ids past the column range
    /// cannot name a stored row.
    pub(crate) fn as_key(self) -> Option<i32> {
        i32::try_from(self.0).ok()
    }
}

impl FromStr for SummaryId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidId { value: s.to_string() };

        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        // All digits: the only parse failure left is overflow, which is still
        // a positive integer but can never exist in any store.
        let value = s.parse::<i64>().unwrap_or(i64::MAX);
        SummaryId::new(value).ok_or_else(invalid)
    }
}

impl TryFrom<i64> for SummaryId {
    type Error = AppError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        SummaryId::new(value).ok_or_else(|| AppError::InvalidId {
            value: value.to_string(),
        })
    }
}

impl From<SummaryId> for i64 {
    fn from(id: SummaryId) -> Self {
        id.0
    }
}

impl fmt::Display for SummaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single summary resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub id: SummaryId,
    pub url: String,
    /// Empty for a stub that has not been enriched (or whose enrichment failed)
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl SummaryRecord {
    /// Whether a summary text has been filled in yet
    pub fn is_stub(&self) -> bool {
        self.summary.is_empty()
    }
}

impl From<TextSummary> for SummaryRecord {
    fn from(model: TextSummary) -> Self {
        Self {
            id: SummaryId(i64::from(model.id)),
            url: model.url,
            summary: model.summary,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}
