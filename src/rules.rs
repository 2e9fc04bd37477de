//! Situational rules engine
//!
//! Runs a fixed battery of independent schedule, travel, and market checks
//! over a game context, sums their probability adjustments onto a base win
//! probability, and grades the result. A single auto-block violation
//! overrides the graded bands and forces BLOCKED.

use crate::domain::{GameContext, Recommendation, ScheduleSpot, Side};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

// ==================== Fixed adjustments and bands ====================

const REST_ADJUSTMENT: f64 = 0.03;
const PUBLIC_FADE_ADJUSTMENT: f64 = 0.04;
const TRAVEL_B2B_ADJUSTMENT: f64 = 0.035;
const FATIGUE_ADJUSTMENT_SCALE: f64 = 0.04;
const SPOT_FOUR_IN_FIVE_ADJUSTMENT: f64 = 0.04;
const SPOT_THREE_IN_FOUR_ADJUSTMENT: f64 = 0.025;

/// Minimum fatigue gap before the graduated fatigue rule fires
const FATIGUE_GAP_MIN: f64 = 0.5;
/// Fatigue gap at which the violation escalates to critical
const FATIGUE_GAP_CRITICAL: f64 = 1.0;

const BET_THRESHOLD: f64 = 0.58;
const LEAN_THRESHOLD: f64 = 0.54;
const FADE_THRESHOLD: f64 = 0.42;

/// Rules engine thresholds owned by configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Public bet share (%) above which an unconfirmed side is auto-blocked
    #[serde(default = "default_public_fade_pct")]
    pub public_fade_pct: f64,
    /// Rest-day gap that counts as a disadvantage
    #[serde(default = "default_rest_penalty_days")]
    pub rest_penalty_days: u32,
}

fn default_public_fade_pct() -> f64 {
    70.0
}

fn default_rest_penalty_days() -> u32 {
    2
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            public_fade_pct: default_public_fade_pct(),
            rest_penalty_days: default_rest_penalty_days(),
        }
    }
}

/// Which rule in the battery raised a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleKind {
    RestDisadvantage,
    PublicFade,
    TravelBackToBack,
    GraduatedFatigue,
    CircadianDisruption,
    ScheduleSpot,
}

impl RuleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::RestDisadvantage => "REST_DISADVANTAGE",
            RuleKind::PublicFade => "PUBLIC_FADE",
            RuleKind::TravelBackToBack => "TRAVEL_BACK_TO_BACK",
            RuleKind::GraduatedFatigue => "GRADUATED_FATIGUE",
            RuleKind::CircadianDisruption => "CIRCADIAN_DISRUPTION",
            RuleKind::ScheduleSpot => "SCHEDULE_SPOT",
        }
    }
}

impl std::fmt::Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How hard a violation weighs on the recommendation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Warning,
    Critical,
    AutoBlock,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
            Severity::AutoBlock => "AUTO_BLOCK",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One triggered rule with its probability effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule: RuleKind,
    /// Side the situation works against
    pub side: Side,
    /// Signed home-probability adjustment
    pub adjustment: f64,
    pub severity: Severity,
    pub message: String,
}

/// Outcome of one rules evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesResult {
    pub base_probability: f64,
    pub adjusted_probability: f64,
    /// Every triggered violation, in battery order
    pub violations: Vec<RuleViolation>,
    pub recommendation: Recommendation,
    pub blocked: bool,
}

impl RulesResult {
    pub fn total_adjustment(&self) -> f64 {
        self.violations.iter().map(|v| v.adjustment).sum()
    }
}

/// Deterministic rule battery over a game context
#[derive(Debug, Clone, Default)]
pub struct RulesEngine {
    config: RulesConfig,
}

impl RulesEngine {
    pub fn new(config: RulesConfig) -> Self {
        Self { config }
    }

    /// Evaluate the battery against a home-side base probability.
    ///
    /// Adjustments are summed, the result clamped to [0, 1], and the graded
    /// bands applied: >= 0.58 BET, >= 0.54 LEAN, <= 0.42 FADE, else PASS.
    /// Any auto-block violation forces BLOCKED regardless of the adjusted
    /// probability. All violations are retained for audit.
    pub fn evaluate(&self, context: &GameContext, base_probability: f64) -> RulesResult {
        let base_probability = base_probability.clamp(0.0, 1.0);

        let checks = [
            self.check_rest_disadvantage(context),
            self.check_public_fade(context),
            self.check_travel_back_to_back(context),
            self.check_graduated_fatigue(context),
            self.check_circadian(context),
            self.check_schedule_spot(context),
        ];
        let violations: Vec<RuleViolation> = checks.into_iter().flatten().collect();

        for violation in &violations {
            debug!(
                rule = violation.rule.as_str(),
                side = violation.side.as_str(),
                adjustment = format!("{:+.3}", violation.adjustment),
                severity = violation.severity.as_str(),
                "{}",
                violation.message
            );
        }

        let total: f64 = violations.iter().map(|v| v.adjustment).sum();
        let adjusted_probability = (base_probability + total).clamp(0.0, 1.0);
        let blocked = violations
            .iter()
            .any(|v| v.severity == Severity::AutoBlock);

        let recommendation = if blocked {
            warn!(
                base = format!("{base_probability:.3}"),
                "auto-block violation overrides graded recommendation"
            );
            Recommendation::Blocked
        } else {
            grade(adjusted_probability)
        };

        RulesResult {
            base_probability,
            adjusted_probability,
            violations,
            recommendation,
            blocked,
        }
    }

    // ==================== Rule battery ====================

    fn check_rest_disadvantage(&self, ctx: &GameContext) -> Option<RuleViolation> {
        let gap = ctx.rest_gap();
        let threshold = self.config.rest_penalty_days as i64;

        if gap <= -threshold {
            Some(RuleViolation {
                rule: RuleKind::RestDisadvantage,
                side: Side::Home,
                adjustment: -REST_ADJUSTMENT,
                severity: Severity::Warning,
                message: format!(
                    "home side on {} rest days vs {} for the visitors",
                    ctx.home.rest_days, ctx.away.rest_days
                ),
            })
        } else if gap >= threshold {
            Some(RuleViolation {
                rule: RuleKind::RestDisadvantage,
                side: Side::Away,
                adjustment: REST_ADJUSTMENT,
                severity: Severity::Warning,
                message: format!(
                    "away side on {} rest days vs {} for the hosts",
                    ctx.away.rest_days, ctx.home.rest_days
                ),
            })
        } else {
            None
        }
    }

    fn check_public_fade(&self, ctx: &GameContext) -> Option<RuleViolation> {
        if ctx.sharp_action {
            return None;
        }

        let threshold = self.config.public_fade_pct;
        if ctx.public_home_pct > threshold {
            Some(RuleViolation {
                rule: RuleKind::PublicFade,
                side: Side::Home,
                adjustment: -PUBLIC_FADE_ADJUSTMENT,
                severity: Severity::AutoBlock,
                message: format!(
                    "{:.0}% of public bets on the home side with no sharp confirmation",
                    ctx.public_home_pct
                ),
            })
        } else if ctx.public_home_pct < 100.0 - threshold {
            Some(RuleViolation {
                rule: RuleKind::PublicFade,
                side: Side::Away,
                adjustment: PUBLIC_FADE_ADJUSTMENT,
                severity: Severity::AutoBlock,
                message: format!(
                    "{:.0}% of public bets on the away side with no sharp confirmation",
                    100.0 - ctx.public_home_pct
                ),
            })
        } else {
            None
        }
    }

    fn check_travel_back_to_back(&self, ctx: &GameContext) -> Option<RuleViolation> {
        // Away is checked first; at most one side is charged.
        [Side::Away, Side::Home].into_iter().find_map(|side| {
            let situation = ctx.situation(side);
            if !situation.back_to_back || situation.circadian_disruption <= 0.0 {
                return None;
            }

            let adjustment = match side {
                Side::Away => TRAVEL_B2B_ADJUSTMENT,
                Side::Home => -TRAVEL_B2B_ADJUSTMENT,
            };
            Some(RuleViolation {
                rule: RuleKind::TravelBackToBack,
                side,
                adjustment,
                severity: Severity::Critical,
                message: format!(
                    "{} side on a back-to-back after crossing time zones",
                    side_label(side)
                ),
            })
        })
    }

    fn check_graduated_fatigue(&self, ctx: &GameContext) -> Option<RuleViolation> {
        let gap = ctx.away.fatigue_score - ctx.home.fatigue_score;
        if gap.abs() < FATIGUE_GAP_MIN {
            return None;
        }

        let side = if gap > 0.0 { Side::Away } else { Side::Home };
        let severity = if gap.abs() >= FATIGUE_GAP_CRITICAL {
            Severity::Critical
        } else {
            Severity::Warning
        };

        Some(RuleViolation {
            rule: RuleKind::GraduatedFatigue,
            side,
            adjustment: gap * FATIGUE_ADJUSTMENT_SCALE,
            severity,
            message: format!(
                "fatigue gap of {:.2} against the {} side",
                gap.abs(),
                side_label(side)
            ),
        })
    }

    fn check_circadian(&self, ctx: &GameContext) -> Option<RuleViolation> {
        let net = ctx.away.circadian_disruption - ctx.home.circadian_disruption;
        if net.abs() <= f64::EPSILON {
            return None;
        }

        let side = if net > 0.0 { Side::Away } else { Side::Home };
        Some(RuleViolation {
            rule: RuleKind::CircadianDisruption,
            side,
            adjustment: net,
            severity: Severity::Warning,
            message: format!(
                "{} side playing {:.2} behind its body clock",
                side_label(side),
                net.abs()
            ),
        })
    }

    fn check_schedule_spot(&self, ctx: &GameContext) -> Option<RuleViolation> {
        if !ctx.home.schedule_spot.is_compressed() && !ctx.away.schedule_spot.is_compressed() {
            return None;
        }

        // Matching spots cancel out.
        let net = spot_penalty(ctx.away.schedule_spot) - spot_penalty(ctx.home.schedule_spot);
        if net == 0.0 {
            return None;
        }

        let (side, spot) = if net > 0.0 {
            (Side::Away, ctx.away.schedule_spot)
        } else {
            (Side::Home, ctx.home.schedule_spot)
        };
        let severity = if spot == ScheduleSpot::FourInFive {
            Severity::Critical
        } else {
            Severity::Warning
        };

        Some(RuleViolation {
            rule: RuleKind::ScheduleSpot,
            side,
            adjustment: net,
            severity,
            message: format!("{} side in a {} spot", side_label(side), spot),
        })
    }
}

fn side_label(side: Side) -> &'static str {
    match side {
        Side::Home => "home",
        Side::Away => "away",
    }
}

fn spot_penalty(spot: ScheduleSpot) -> f64 {
    match spot {
        ScheduleSpot::FourInFive => SPOT_FOUR_IN_FIVE_ADJUSTMENT,
        ScheduleSpot::ThreeInFour => SPOT_THREE_IN_FOUR_ADJUSTMENT,
        ScheduleSpot::Normal | ScheduleSpot::BackToBack => 0.0,
    }
}

/// Graded recommendation bands over the adjusted probability
fn grade(probability: f64) -> Recommendation {
    if probability >= BET_THRESHOLD {
        Recommendation::Bet
    } else if probability >= LEAN_THRESHOLD {
        Recommendation::Lean
    } else if probability <= FADE_THRESHOLD {
        Recommendation::Fade
    } else {
        Recommendation::Pass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TeamSituation;

    fn neutral_context() -> GameContext {
        GameContext {
            home: TeamSituation {
                rest_days: 2,
                ..Default::default()
            },
            away: TeamSituation {
                rest_days: 2,
                ..Default::default()
            },
            public_home_pct: 50.0,
            sharp_action: false,
        }
    }

    #[test]
    fn test_quiet_context_leaves_probability_alone() {
        let engine = RulesEngine::default();
        let result = engine.evaluate(&neutral_context(), 0.55);

        assert!(result.violations.is_empty());
        assert_eq!(result.adjusted_probability, 0.55);
        assert_eq!(result.recommendation, Recommendation::Lean);
        assert!(!result.blocked);
    }

    #[test]
    fn test_rest_disadvantage_lowers_probability() {
        let engine = RulesEngine::default();
        let mut ctx = neutral_context();
        ctx.home = TeamSituation {
            rest_days: 0,
            back_to_back: true,
            fatigue_score: 0.8,
            ..Default::default()
        };
        ctx.away.rest_days = 3;

        let result = engine.evaluate(&ctx, 0.60);

        assert!(result.adjusted_probability < result.base_probability);
        assert!(result
            .violations
            .iter()
            .any(|v| v.rule == RuleKind::RestDisadvantage && v.side == Side::Home));
    }

    #[test]
    fn test_rest_gap_applies_after_long_layoffs() {
        let engine = RulesEngine::default();
        let mut ctx = neutral_context();
        // Both sides past the fatigue stages, but the gap still counts.
        ctx.home.rest_days = 8;
        ctx.away.rest_days = 10;

        let result = engine.evaluate(&ctx, 0.55);
        let rest = result
            .violations
            .iter()
            .find(|v| v.rule == RuleKind::RestDisadvantage)
            .unwrap();
        assert_eq!(rest.side, Side::Home);
        assert!(rest.adjustment < 0.0);
        assert!(result.adjusted_probability < result.base_probability);
    }

    #[test]
    fn test_rested_home_side_gains() {
        let engine = RulesEngine::default();
        let mut ctx = neutral_context();
        ctx.home.rest_days = 3;
        ctx.away = TeamSituation {
            rest_days: 0,
            back_to_back: true,
            fatigue_score: 1.0,
            ..Default::default()
        };

        let result = engine.evaluate(&ctx, 0.50);
        assert!(result.adjusted_probability > result.base_probability);
    }

    #[test]
    fn test_heavy_public_without_sharp_blocks() {
        let engine = RulesEngine::default();
        let mut ctx = neutral_context();
        ctx.public_home_pct = 75.0;

        let result = engine.evaluate(&ctx, 0.70);

        assert!(result.blocked);
        assert_eq!(result.recommendation, Recommendation::Blocked);
        let fade = result
            .violations
            .iter()
            .find(|v| v.rule == RuleKind::PublicFade)
            .unwrap();
        assert_eq!(fade.severity, Severity::AutoBlock);
        assert_eq!(fade.side, Side::Home);
    }

    #[test]
    fn test_sharp_confirmation_clears_public_fade() {
        let engine = RulesEngine::default();
        let mut ctx = neutral_context();
        ctx.public_home_pct = 75.0;
        ctx.sharp_action = true;

        let result = engine.evaluate(&ctx, 0.70);
        assert!(!result.blocked);
        assert_eq!(result.recommendation, Recommendation::Bet);
    }

    #[test]
    fn test_public_pile_on_away_side_blocks_too() {
        let engine = RulesEngine::default();
        let mut ctx = neutral_context();
        ctx.public_home_pct = 22.0;

        let result = engine.evaluate(&ctx, 0.45);
        assert!(result.blocked);
        let fade = result
            .violations
            .iter()
            .find(|v| v.rule == RuleKind::PublicFade)
            .unwrap();
        assert_eq!(fade.side, Side::Away);
        assert!(fade.adjustment > 0.0);
    }

    #[test]
    fn test_travel_back_to_back_for_visitors() {
        let engine = RulesEngine::default();
        let mut ctx = neutral_context();
        ctx.away = TeamSituation {
            rest_days: 0,
            back_to_back: true,
            fatigue_score: 1.0,
            circadian_disruption: 0.04,
            ..Default::default()
        };
        ctx.home.rest_days = 1;

        let result = engine.evaluate(&ctx, 0.50);
        let travel = result
            .violations
            .iter()
            .find(|v| v.rule == RuleKind::TravelBackToBack)
            .unwrap();
        assert_eq!(travel.side, Side::Away);
        assert_eq!(travel.severity, Severity::Critical);
        assert!(travel.adjustment > 0.0);
    }

    #[test]
    fn test_fatigue_gap_graduation() {
        let engine = RulesEngine::default();

        // Full gap: away on a road back-to-back, home fresh.
        let mut ctx = neutral_context();
        ctx.away.fatigue_score = 1.0;
        let full = engine.evaluate(&ctx, 0.50);
        let violation = full
            .violations
            .iter()
            .find(|v| v.rule == RuleKind::GraduatedFatigue)
            .unwrap();
        assert_eq!(violation.severity, Severity::Critical);
        assert!((violation.adjustment - 0.04).abs() < 1e-9);

        // Discounted gap: home on a back-to-back in its own building.
        let mut ctx = neutral_context();
        ctx.home.fatigue_score = 0.8;
        let partial = engine.evaluate(&ctx, 0.50);
        let violation = partial
            .violations
            .iter()
            .find(|v| v.rule == RuleKind::GraduatedFatigue)
            .unwrap();
        assert_eq!(violation.severity, Severity::Warning);
        assert_eq!(violation.side, Side::Home);
        assert!(violation.adjustment < 0.0);
    }

    #[test]
    fn test_schedule_spot_nets_both_sides() {
        let engine = RulesEngine::default();

        let mut ctx = neutral_context();
        ctx.away.schedule_spot = ScheduleSpot::FourInFive;
        let result = engine.evaluate(&ctx, 0.50);
        let spot = result
            .violations
            .iter()
            .find(|v| v.rule == RuleKind::ScheduleSpot)
            .unwrap();
        assert_eq!(spot.severity, Severity::Critical);
        assert!((spot.adjustment - 0.04).abs() < 1e-9);

        // Matching spots cancel out.
        let mut ctx = neutral_context();
        ctx.home.schedule_spot = ScheduleSpot::ThreeInFour;
        ctx.away.schedule_spot = ScheduleSpot::ThreeInFour;
        let result = engine.evaluate(&ctx, 0.50);
        assert!(result
            .violations
            .iter()
            .all(|v| v.rule != RuleKind::ScheduleSpot));
    }

    #[test]
    fn test_adjustments_sum_and_clamp() {
        let engine = RulesEngine::default();
        let mut ctx = neutral_context();
        ctx.home.rest_days = 3;
        ctx.away = TeamSituation {
            rest_days: 0,
            back_to_back: true,
            fatigue_score: 1.0,
            schedule_spot: ScheduleSpot::FourInFive,
            circadian_disruption: 0.06,
        };

        let result = engine.evaluate(&ctx, 0.99);

        // rest +0.03, travel +0.035, fatigue +0.04, circadian +0.06, spot +0.04
        assert!((result.total_adjustment() - 0.205).abs() < 1e-9);
        assert_eq!(result.adjusted_probability, 1.0);
        assert_eq!(result.recommendation, Recommendation::Bet);
    }

    #[test]
    fn test_violations_follow_battery_order() {
        let engine = RulesEngine::default();
        let mut ctx = neutral_context();
        ctx.home.rest_days = 3;
        ctx.away = TeamSituation {
            rest_days: 0,
            back_to_back: true,
            fatigue_score: 1.0,
            schedule_spot: ScheduleSpot::FourInFive,
            circadian_disruption: 0.06,
        };

        let result = engine.evaluate(&ctx, 0.50);
        let rules: Vec<RuleKind> = result.violations.iter().map(|v| v.rule).collect();
        assert_eq!(
            rules,
            vec![
                RuleKind::RestDisadvantage,
                RuleKind::TravelBackToBack,
                RuleKind::GraduatedFatigue,
                RuleKind::CircadianDisruption,
                RuleKind::ScheduleSpot,
            ]
        );
    }

    #[test]
    fn test_graded_bands() {
        let engine = RulesEngine::default();
        let ctx = neutral_context();

        assert_eq!(
            engine.evaluate(&ctx, 0.60).recommendation,
            Recommendation::Bet
        );
        assert_eq!(
            engine.evaluate(&ctx, 0.58).recommendation,
            Recommendation::Bet
        );
        assert_eq!(
            engine.evaluate(&ctx, 0.55).recommendation,
            Recommendation::Lean
        );
        assert_eq!(
            engine.evaluate(&ctx, 0.50).recommendation,
            Recommendation::Pass
        );
        assert_eq!(
            engine.evaluate(&ctx, 0.42).recommendation,
            Recommendation::Fade
        );
    }

    #[test]
    fn test_out_of_range_base_is_clamped() {
        let engine = RulesEngine::default();
        let result = engine.evaluate(&neutral_context(), 1.7);
        assert_eq!(result.base_probability, 1.0);
        assert_eq!(result.adjusted_probability, 1.0);
    }
}
