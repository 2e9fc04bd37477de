//! Bounded-retry verification gate
//!
//! Sits between the external pick generator and anything downstream. Every
//! candidate artifact is fact checked before release; a failing artifact is
//! regenerated with the accumulated issue context, and once the retry budget
//! is spent the pick is suppressed rather than published.

use crate::domain::{GameData, PickCandidate, ValidationIssue};
use crate::error::Result;
use crate::factcheck::FactChecker;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

fn default_max_retries() -> u32 {
    2
}

/// Verification gate settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// Regenerations allowed after the initial attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

/// External artifact producer
///
/// Implementations receive the issues from every failed attempt so far and
/// are expected to address them in the next candidate.
#[async_trait]
pub trait PickGenerator: Send + Sync {
    async fn generate(
        &self,
        game: &GameData,
        prior_issues: &[ValidationIssue],
    ) -> Result<PickCandidate>;
}

/// Terminal outcome for one game's pick
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum ReleaseDecision {
    /// Artifact cleared fact checking and may be published
    Released {
        decision_id: Uuid,
        candidate: PickCandidate,
        attempts: u32,
    },
    /// Every attempt failed verification; nothing is published
    Suppressed {
        decision_id: Uuid,
        attempts: u32,
        issues: Vec<ValidationIssue>,
    },
}

impl ReleaseDecision {
    pub fn is_released(&self) -> bool {
        matches!(self, ReleaseDecision::Released { .. })
    }

    pub fn decision_id(&self) -> Uuid {
        match self {
            ReleaseDecision::Released { decision_id, .. } => *decision_id,
            ReleaseDecision::Suppressed { decision_id, .. } => *decision_id,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ReleaseDecision::Released { attempts, .. } => *attempts,
            ReleaseDecision::Suppressed { attempts, .. } => *attempts,
        }
    }
}

/// Generate-validate-retry loop around an external generator
#[derive(Debug, Clone, Default)]
pub struct VerificationGate {
    checker: FactChecker,
    config: ReviewConfig,
}

impl VerificationGate {
    pub fn new(config: ReviewConfig) -> Self {
        Self {
            checker: FactChecker::new(),
            config,
        }
    }

    /// Drive one game through generation and fact checking.
    ///
    /// Generator failures bubble up as errors; factual failures are consumed
    /// by the retry loop and, past the budget, become a `Suppressed` outcome.
    pub async fn review(
        &self,
        generator: &dyn PickGenerator,
        game: &GameData,
    ) -> Result<ReleaseDecision> {
        let decision_id = Uuid::new_v4();
        let total_attempts = self.config.max_retries + 1;
        let mut accumulated: Vec<ValidationIssue> = Vec::new();

        for attempt in 1..=total_attempts {
            let candidate = generator.generate(game, &accumulated).await?;
            let result = self.checker.validate(&candidate, game);

            if result.passed {
                info!(
                    %decision_id,
                    game = %game.matchup(),
                    attempt,
                    "artifact released"
                );
                return Ok(ReleaseDecision::Released {
                    decision_id,
                    candidate,
                    attempts: attempt,
                });
            }

            warn!(
                %decision_id,
                game = %game.matchup(),
                attempt,
                issues = %result.issue_summary(),
                "artifact failed verification"
            );
            accumulated.extend(result.issues);
        }

        warn!(
            %decision_id,
            game = %game.matchup(),
            attempts = total_attempts,
            "suppressing pick after exhausting retries"
        );
        Ok(ReleaseDecision::Suppressed {
            decision_id,
            attempts: total_attempts,
            issues: accumulated,
        })
    }
}
