//! Status codes reported by the review API and their verdict text.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, WatchError};
use crate::types::TrackedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl ReviewStatus {
    pub const ALL: [ReviewStatus; 3] = [Self::Approved, Self::Reviewing, Self::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Reviewing => "reviewing",
            Self::Rejected => "rejected",
        }
    }

    /// Verdict text shown to the student. Locale content, kept verbatim.
    pub fn verdict(&self) -> &'static str {
        match self {
            Self::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            Self::Reviewing => "Работа взята на проверку ревьюером.",
            Self::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReviewStatus {
    type Err = WatchError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| WatchError::UnknownStatus(s.to_string()))
    }
}

/// Map a raw status code to its verdict.
pub fn verdict_for(status: &str) -> Result<&'static str> {
    status.parse::<ReviewStatus>().map(|s| s.verdict())
}

/// Build the notification text for a record whose status has a verdict.
pub fn verdict_message(record: &TrackedRecord) -> Result<String> {
    let verdict = verdict_for(&record.status)?;
    Ok(format!("Changed status of \"{}\". {}", record.id, verdict))
}
