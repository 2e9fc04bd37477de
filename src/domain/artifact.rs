use crate::error::{Result, SharplineError};
use serde::{Deserialize, Serialize};

/// Natural-language pick artifact produced by the external generator
///
/// The decision core never edits an artifact; it either releases it as-is or
/// asks the generator for a fresh one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickCandidate {
    /// Short pick statement, e.g. "Nuggets -8.5"
    pub pick: String,
    /// Supporting reasoning paragraph
    pub reasoning: String,
    /// Text intended for downstream broadcast
    pub broadcast_text: String,
    /// Generator's own confidence (0-1)
    pub confidence: f64,
    pub key_factors: Vec<String>,
}

impl PickCandidate {
    /// Parse a generator JSON payload into a candidate
    pub fn from_json(payload: &str) -> Result<Self> {
        let candidate: PickCandidate = serde_json::from_str(payload)?;
        if candidate.pick.trim().is_empty() {
            return Err(SharplineError::MalformedArtifact(
                "pick statement is empty".to_string(),
            ));
        }
        Ok(candidate)
    }

    /// All artifact text in one scan target for fact checking
    pub fn full_text(&self) -> String {
        let mut text = String::with_capacity(
            self.pick.len() + self.reasoning.len() + self.broadcast_text.len() + 2,
        );
        text.push_str(&self.pick);
        text.push('\n');
        text.push_str(&self.reasoning);
        text.push('\n');
        text.push_str(&self.broadcast_text);
        text
    }
}

/// Which fact check raised an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    SpreadClaim,
    TeamLocation,
    DayOfWeek,
    StatPlausibility,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::SpreadClaim => "SPREAD_CLAIM",
            IssueKind::TeamLocation => "TEAM_LOCATION",
            IssueKind::DayOfWeek => "DAY_OF_WEEK",
            IssueKind::StatPlausibility => "STAT_PLAUSIBILITY",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single factual problem found in an artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Outcome of running every fact check against an artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Build from collected issues; passes only when the list is empty
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        Self {
            passed: issues.is_empty(),
            issues,
        }
    }

    /// One-line summary of every issue, for regeneration context and logs
    pub fn issue_summary(&self) -> String {
        self.issues
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
