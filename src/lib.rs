pub mod config;
pub mod domain;
pub mod ensemble;
pub mod error;
pub mod factcheck;
pub mod models;
pub mod review;
pub mod rules;

pub use config::{AppConfig, LoggingConfig};
pub use domain::{
    ConfidenceTier, GameContext, GameData, IssueKind, League, LineSnapshot, ModelVote,
    PickCandidate, Recommendation, ScheduleSpot, Side, TeamSchedule, TeamSituation,
    ValidationIssue, ValidationResult,
};
pub use ensemble::{EnsembleConfig, EnsembleResult, EnsembleVoter};
pub use error::{Result, SharplineError};
pub use factcheck::FactChecker;
pub use models::{
    GamePrediction, RatingConfig, RatingModel, RatingStore, RestAnalysis, SteamDirection,
    TemporalEngine, TemporalFactors, VelocityAnalysis, VelocityConfig, VelocityTracker,
};
pub use review::{PickGenerator, ReleaseDecision, ReviewConfig, VerificationGate};
pub use rules::{RuleKind, RuleViolation, RulesConfig, RulesEngine, RulesResult, Severity};
