//! Candidate skill levels accepted by the review service.

use std::fmt;
use std::str::FromStr;

use crate::error::AppraiseError;

/// Competency level the reviewed repository is held against.
///
/// Parsing is case-insensitive at the boundary, but the set is closed:
/// unknown input is rejected rather than mapped to a default.
///
/// # Example
///
/// ```
/// use appraise::review::CandidateLevel;
///
/// let level: CandidateLevel = "junior".parse().expect("should parse");
/// assert_eq!(level, CandidateLevel::Junior);
/// assert_eq!(level.as_str(), "Junior");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateLevel {
    /// Entry-level candidate.
    Junior,
    /// Mid-level candidate.
    Middle,
    /// Senior candidate.
    Senior,
}

impl CandidateLevel {
    /// Canonical display form used in prompts and reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Junior => "Junior",
            Self::Middle => "Middle",
            Self::Senior => "Senior",
        }
    }
}

impl fmt::Display for CandidateLevel {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for CandidateLevel {
    type Err = AppraiseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "junior" => Ok(Self::Junior),
            "middle" => Ok(Self::Middle),
            "senior" => Ok(Self::Senior),
            _ => Err(AppraiseError::InvalidCandidateLevel {
                value: value.to_owned(),
            }),
        }
    }
}
