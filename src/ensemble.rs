//! Ensemble voting across the signal models
//!
//! Fuses an optional external Bayesian probability with the rating model's
//! and rules engine's outputs into one final recommendation. A blocked rules
//! vote short-circuits everything else.

use crate::domain::{ModelVote, Recommendation};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const MODEL_BAYESIAN: &str = "bayesian";
pub const MODEL_ELO: &str = "elo";
pub const MODEL_RULES: &str = "rules";

/// Ensemble thresholds owned by configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleConfig {
    /// Mean probability above which a bet consensus upgrades to STRONG_BET
    #[serde(default = "default_strong_bet_threshold")]
    pub strong_bet_threshold: f64,
}

fn default_strong_bet_threshold() -> f64 {
    0.60
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            strong_bet_threshold: default_strong_bet_threshold(),
        }
    }
}

/// Final fused decision for one game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsembleResult {
    /// Votes in submission order: bayesian (when present), elo, rules
    pub votes: Vec<ModelVote>,
    /// True whenever any tally reaches two votes, independent of the
    /// recommendation ladder
    pub consensus: bool,
    pub final_probability: f64,
    pub recommendation: Recommendation,
    /// Human-readable agreement description
    pub agreement: String,
}

impl EnsembleResult {
    pub fn vote_for(&self, model: &str) -> Option<&ModelVote> {
        self.votes.iter().find(|v| v.model == model)
    }
}

/// Majority voter over the model set
#[derive(Debug, Clone, Default)]
pub struct EnsembleVoter {
    config: EnsembleConfig,
}

impl EnsembleVoter {
    pub fn new(config: EnsembleConfig) -> Self {
        Self { config }
    }

    /// Fuse the model outputs into one recommendation.
    ///
    /// The Bayesian input is optional; without it the tallies run over a
    /// two-vote set. Any blocked vote ends the election immediately: the
    /// result is BLOCKED with consensus set and the rules vote's probability
    /// carried through. Otherwise bet votes (BET or HOME), pass votes (PASS
    /// or NEUTRAL), and fade votes (FADE or AWAY) are tallied; LEAN counts
    /// toward none. The final probability is the unweighted mean of all
    /// votes.
    pub fn vote(
        &self,
        bayesian: Option<(f64, Recommendation)>,
        elo_probability: f64,
        elo_recommendation: Recommendation,
        rules_probability: f64,
        rules_recommendation: Recommendation,
    ) -> EnsembleResult {
        let mut votes = Vec::with_capacity(3);
        if let Some((probability, recommendation)) = bayesian {
            votes.push(ModelVote::new(MODEL_BAYESIAN, probability, recommendation));
        }
        votes.push(ModelVote::new(MODEL_ELO, elo_probability, elo_recommendation));
        votes.push(ModelVote::new(
            MODEL_RULES,
            rules_probability,
            rules_recommendation,
        ));

        if votes.iter().any(|v| v.recommendation.is_blocked()) {
            warn!("ensemble short-circuited by a blocked vote");
            return EnsembleResult {
                final_probability: rules_probability.clamp(0.0, 1.0),
                votes,
                consensus: true,
                recommendation: Recommendation::Blocked,
                agreement: "blocked by the rules engine".to_string(),
            };
        }

        let bet_votes = votes
            .iter()
            .filter(|v| v.recommendation.is_bet_vote())
            .count();
        let pass_votes = votes
            .iter()
            .filter(|v| v.recommendation.is_pass_vote())
            .count();
        let fade_votes = votes
            .iter()
            .filter(|v| v.recommendation.is_fade_vote())
            .count();

        let mean: f64 = votes.iter().map(|v| v.probability).sum::<f64>() / votes.len() as f64;
        let final_probability = mean.clamp(0.0, 1.0);

        let recommendation = if bet_votes >= 2 && final_probability > self.config.strong_bet_threshold
        {
            Recommendation::StrongBet
        } else if bet_votes >= 2 {
            Recommendation::Bet
        } else if fade_votes >= 2 {
            Recommendation::Fade
        } else if bet_votes == 1 && pass_votes <= 1 {
            Recommendation::Lean
        } else {
            Recommendation::Pass
        };

        let consensus = bet_votes >= 2 || pass_votes >= 2 || fade_votes >= 2;
        let agreement = if bet_votes >= 2 {
            format!("{}/{} models back the home side", bet_votes, votes.len())
        } else if fade_votes >= 2 {
            format!("{}/{} models fade the home side", fade_votes, votes.len())
        } else if pass_votes >= 2 {
            format!("{}/{} models see no edge", pass_votes, votes.len())
        } else {
            "split decision".to_string()
        };

        info!(
            recommendation = recommendation.as_str(),
            probability = format!("{final_probability:.3}"),
            consensus,
            "ensemble vote"
        );

        EnsembleResult {
            votes,
            consensus,
            final_probability,
            recommendation,
            agreement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ConfidenceTier;

    #[test]
    fn test_unanimous_bet_with_high_mean_is_strong() {
        let voter = EnsembleVoter::default();
        let result = voter.vote(
            Some((0.65, Recommendation::Bet)),
            0.62,
            Recommendation::Home,
            0.60,
            Recommendation::Bet,
        );

        assert_eq!(result.recommendation, Recommendation::StrongBet);
        assert!(result.consensus);
        assert!((result.final_probability - 0.62333).abs() < 1e-4);
        assert_eq!(result.votes.len(), 3);
    }

    #[test]
    fn test_bet_majority_at_threshold_stays_bet() {
        let voter = EnsembleVoter::default();
        // Mean lands exactly on the strong-bet threshold; upgrade needs to
        // clear it strictly.
        let result = voter.vote(None, 0.62, Recommendation::Home, 0.58, Recommendation::Bet);

        assert!((result.final_probability - 0.60).abs() < 1e-9);
        assert_eq!(result.recommendation, Recommendation::Bet);
        assert!(result.consensus);
    }

    #[test]
    fn test_bet_majority_with_modest_mean_stays_bet() {
        let voter = EnsembleVoter::default();
        let result = voter.vote(
            Some((0.58, Recommendation::Bet)),
            0.55,
            Recommendation::Home,
            0.52,
            Recommendation::Pass,
        );

        assert_eq!(result.recommendation, Recommendation::Bet);
        assert!(result.consensus);
        assert!((result.final_probability - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_two_vote_pass_consensus() {
        let voter = EnsembleVoter::default();
        let result = voter.vote(
            None,
            0.52,
            Recommendation::Neutral,
            0.50,
            Recommendation::Pass,
        );

        assert_eq!(result.recommendation, Recommendation::Pass);
        assert!(result.consensus);
        assert!((result.final_probability - 0.51).abs() < 1e-9);
        assert_eq!(result.votes.len(), 2);
    }

    #[test]
    fn test_blocked_vote_short_circuits() {
        let voter = EnsembleVoter::default();
        let result = voter.vote(
            Some((0.70, Recommendation::Bet)),
            0.68,
            Recommendation::Home,
            0.30,
            Recommendation::Blocked,
        );

        assert_eq!(result.recommendation, Recommendation::Blocked);
        assert!(result.consensus);
        // Final probability comes from the rules vote, not the mean.
        assert_eq!(result.final_probability, 0.30);
        let rules_vote = result.vote_for(MODEL_RULES).unwrap();
        assert_eq!(rules_vote.confidence, ConfidenceTier::High);
    }

    #[test]
    fn test_single_bet_vote_leans() {
        let voter = EnsembleVoter::default();
        let result = voter.vote(None, 0.62, Recommendation::Home, 0.52, Recommendation::Lean);

        assert_eq!(result.recommendation, Recommendation::Lean);
        assert!(!result.consensus);
    }

    #[test]
    fn test_pass_pair_outvotes_single_bet() {
        let voter = EnsembleVoter::default();
        // One bet vote, but two passes: the ladder lands on PASS while the
        // pass pair still counts as consensus.
        let result = voter.vote(
            Some((0.63, Recommendation::Bet)),
            0.51,
            Recommendation::Neutral,
            0.50,
            Recommendation::Pass,
        );

        assert_eq!(result.recommendation, Recommendation::Pass);
        assert!(result.consensus);
    }

    #[test]
    fn test_fade_majority() {
        let voter = EnsembleVoter::default();
        let result = voter.vote(None, 0.38, Recommendation::Away, 0.40, Recommendation::Fade);

        assert_eq!(result.recommendation, Recommendation::Fade);
        assert!(result.consensus);
        assert!((result.final_probability - 0.39).abs() < 1e-9);
    }

    #[test]
    fn test_vote_order_is_preserved() {
        let voter = EnsembleVoter::default();
        let result = voter.vote(
            Some((0.55, Recommendation::Bet)),
            0.52,
            Recommendation::Neutral,
            0.50,
            Recommendation::Pass,
        );

        let models: Vec<&str> = result.votes.iter().map(|v| v.model.as_str()).collect();
        assert_eq!(models, vec![MODEL_BAYESIAN, MODEL_ELO, MODEL_RULES]);
    }
}
