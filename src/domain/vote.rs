use serde::{Deserialize, Serialize};

/// Recommendation tag shared by every signal model and the ensemble
///
/// Directional tags (HOME/AWAY/NEUTRAL) come from the rating model, graded
/// tags (BET/LEAN/FADE/PASS/BLOCKED) from the rules engine, and STRONG_BET
/// only from the ensemble itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBet,
    Bet,
    Lean,
    Pass,
    Fade,
    Home,
    Away,
    Neutral,
    Blocked,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongBet => "STRONG_BET",
            Recommendation::Bet => "BET",
            Recommendation::Lean => "LEAN",
            Recommendation::Pass => "PASS",
            Recommendation::Fade => "FADE",
            Recommendation::Home => "HOME",
            Recommendation::Away => "AWAY",
            Recommendation::Neutral => "NEUTRAL",
            Recommendation::Blocked => "BLOCKED",
        }
    }

    /// Counts toward the ensemble's bet tally
    pub fn is_bet_vote(&self) -> bool {
        matches!(self, Recommendation::Bet | Recommendation::Home)
    }

    /// Counts toward the ensemble's pass tally
    pub fn is_pass_vote(&self) -> bool {
        matches!(self, Recommendation::Pass | Recommendation::Neutral)
    }

    /// Counts toward the ensemble's fade tally
    pub fn is_fade_vote(&self) -> bool {
        matches!(self, Recommendation::Fade | Recommendation::Away)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Recommendation::Blocked)
    }
}

impl Default for Recommendation {
    fn default() -> Self {
        Recommendation::Pass
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Confidence tier derived from how far a probability sits from the coin flip
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    /// Tier from |p - 0.5|: > 0.15 high, > 0.08 medium, otherwise low
    pub fn from_probability(probability: f64) -> Self {
        let edge = (probability - 0.5).abs();
        if edge > 0.15 {
            ConfidenceTier::High
        } else if edge > 0.08 {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Low => "LOW",
            ConfidenceTier::Medium => "MEDIUM",
            ConfidenceTier::High => "HIGH",
        }
    }
}

impl Default for ConfidenceTier {
    fn default() -> Self {
        ConfidenceTier::Low
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One model's contribution to the ensemble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelVote {
    /// Stable model identifier ("bayesian", "elo", "rules")
    pub model: String,
    pub probability: f64,
    pub recommendation: Recommendation,
    pub confidence: ConfidenceTier,
}

impl ModelVote {
    /// Build a vote, clamping the probability and deriving its tier.
    ///
    /// A blocked vote always carries high confidence regardless of how close
    /// its probability sits to 0.5.
    pub fn new(model: &str, probability: f64, recommendation: Recommendation) -> Self {
        let probability = probability.clamp(0.0, 1.0);
        let confidence = if recommendation.is_blocked() {
            ConfidenceTier::High
        } else {
            ConfidenceTier::from_probability(probability)
        };

        Self {
            model: model.to_string(),
            probability,
            recommendation,
            confidence,
        }
    }
}
