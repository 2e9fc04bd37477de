//! Artifact fact checking against authoritative game data
//!
//! Scans generated pick text for claims that contradict the game record:
//! spread numbers, which side is at home, the day of the week, and obviously
//! implausible stats. Checks never short-circuit; every issue is collected so
//! the generator can fix them all in one regeneration pass.

use crate::domain::{GameData, IssueKind, PickCandidate, ValidationIssue, ValidationResult};
use chrono::{Datelike, Duration, Weekday};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Tolerance between a claimed spread and the posted line
const SPREAD_TOLERANCE: f64 = 0.5;
/// Ceiling for believable per-game scoring claims
const MAX_PLAUSIBLE_PPG: f64 = 45.0;
/// Win percentages cannot exceed this
const MAX_WIN_PCT: f64 = 100.0;
/// How far after a team mention a directional phrase still counts
const PHRASE_WINDOW: usize = 60;

static SPREAD_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(-?\d+(?:\.\d+)?)[-\s]point\b").expect("valid spread pattern"),
        Regex::new(r"(?i)\bby\s+(-?\d+(?:\.\d+)?)\s+points?\b").expect("valid spread pattern"),
        Regex::new(r"(?i)\bcover(?:s|ing|ed)?\s+(?:the\s+)?(-?\d+(?:\.\d+)?)\b")
            .expect("valid spread pattern"),
    ]
});

static WEEKDAY_FULL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .expect("valid weekday pattern")
});

// Abbreviations stay case-sensitive so prose like "sat out" is not read as
// a Saturday reference.
static WEEKDAY_ABBR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(Mon|Tue|Tues|Wed|Thu|Thur|Thurs|Fri|Sat|Sun)\b").expect("valid weekday pattern")
});

static PPG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(?:ppg|points\s+per\s+game)\b").expect("valid ppg pattern")
});

static WIN_PCT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*%\s*win").expect("valid win pct pattern"),
        Regex::new(r"(?i)\bwin\s+(?:rate|percentage)\s+of\s+(\d+(?:\.\d+)?)\s*%")
            .expect("valid win pct pattern"),
    ]
});

const HOME_PHRASES: &[&str] = &[
    "at home",
    "home court",
    "home floor",
    "home crowd",
    "home game",
    "in front of the home",
];

const AWAY_PHRASES: &[&str] = &[
    "on the road",
    "road game",
    "road trip",
    "away game",
    "as visitors",
    "away from home",
];

/// Read-only artifact checker
#[derive(Debug, Clone, Copy, Default)]
pub struct FactChecker;

impl FactChecker {
    pub fn new() -> Self {
        Self
    }

    /// Run every check over the artifact text; passes only when no check
    /// raises an issue.
    pub fn validate(&self, candidate: &PickCandidate, game: &GameData) -> ValidationResult {
        let text = candidate.full_text();
        let mut issues = Vec::new();

        self.check_spread_claim(&text, game, &mut issues);
        self.check_team_location(&text, game, &mut issues);
        self.check_day_of_week(&text, game, &mut issues);
        self.check_stat_plausibility(&text, &mut issues);

        if issues.is_empty() {
            debug!(game = %game.matchup(), "artifact passed fact check");
        } else {
            warn!(
                game = %game.matchup(),
                issues = issues.len(),
                "artifact failed fact check"
            );
        }

        ValidationResult::from_issues(issues)
    }

    /// First numeric spread claim vs the posted line, compared by magnitude
    fn check_spread_claim(&self, text: &str, game: &GameData, issues: &mut Vec<ValidationIssue>) {
        let claimed = SPREAD_PATTERNS.iter().find_map(|pattern| {
            pattern
                .captures(text)
                .and_then(|caps| caps.get(1))
                .and_then(|m| m.as_str().parse::<f64>().ok())
        });

        if let Some(claimed) = claimed {
            if (claimed.abs() - game.spread.abs()).abs() > SPREAD_TOLERANCE {
                issues.push(ValidationIssue::new(
                    IssueKind::SpreadClaim,
                    format!(
                        "claims a {:.1}-point spread but the posted line is {:.1}",
                        claimed.abs(),
                        game.spread
                    ),
                ));
            }
        }
    }

    /// The away team described as home, or the home team described as away
    fn check_team_location(&self, text: &str, game: &GameData, issues: &mut Vec<ValidationIssue>) {
        let lower = text.to_lowercase();

        if phrase_near_team(&lower, &game.away_team, HOME_PHRASES) {
            issues.push(ValidationIssue::new(
                IssueKind::TeamLocation,
                format!(
                    "describes {} as the home side; they are the away team",
                    game.away_team
                ),
            ));
        }

        if phrase_near_team(&lower, &game.home_team, AWAY_PHRASES) {
            issues.push(ValidationIssue::new(
                IssueKind::TeamLocation,
                format!(
                    "describes {} as playing on the road; they are the home team",
                    game.home_team
                ),
            ));
        }
    }

    /// Explicit weekday references vs the venue-local game date
    fn check_day_of_week(&self, text: &str, game: &GameData, issues: &mut Vec<ValidationIssue>) {
        let local_start = game.scheduled_start + Duration::hours(game.venue_utc_offset as i64);
        let actual = local_start.weekday();

        let mut claimed: Vec<Weekday> = Vec::new();
        for caps in WEEKDAY_FULL_RE.captures_iter(text) {
            if let Some(day) = parse_weekday(&caps[1]) {
                claimed.push(day);
            }
        }
        for caps in WEEKDAY_ABBR_RE.captures_iter(text) {
            if let Some(day) = parse_weekday(&caps[1]) {
                claimed.push(day);
            }
        }

        claimed.sort_by_key(|d| d.num_days_from_monday());
        claimed.dedup();

        for day in claimed {
            if day != actual {
                issues.push(ValidationIssue::new(
                    IssueKind::DayOfWeek,
                    format!(
                        "mentions {} but the game tips off on {}",
                        weekday_name(day),
                        weekday_name(actual)
                    ),
                ));
            }
        }
    }

    /// Scoring and win-rate claims past hard plausibility ceilings
    fn check_stat_plausibility(&self, text: &str, issues: &mut Vec<ValidationIssue>) {
        for caps in PPG_RE.captures_iter(text) {
            if let Ok(value) = caps[1].parse::<f64>() {
                if value > MAX_PLAUSIBLE_PPG {
                    issues.push(ValidationIssue::new(
                        IssueKind::StatPlausibility,
                        format!("claims {value:.1} points per game, above the plausible ceiling"),
                    ));
                }
            }
        }

        for pattern in WIN_PCT_PATTERNS.iter() {
            for caps in pattern.captures_iter(text) {
                if let Ok(value) = caps[1].parse::<f64>() {
                    if value > MAX_WIN_PCT {
                        issues.push(ValidationIssue::new(
                            IssueKind::StatPlausibility,
                            format!("claims a {value:.0}% win rate"),
                        ));
                    }
                }
            }
        }
    }
}

/// Does a phrase from the list appear shortly after any mention of the team?
///
/// Mentions are matched on the full name and on the nickname (the last word
/// of the team name). Text must already be lowercased.
fn phrase_near_team(lower_text: &str, team: &str, phrases: &[&str]) -> bool {
    let full = team.to_lowercase();
    let nickname = full.rsplit(' ').next().unwrap_or(&full).to_string();
    let mut tokens = vec![full.clone()];
    if nickname.len() >= 3 && nickname != full {
        tokens.push(nickname);
    }

    for token in tokens {
        for (idx, _) in lower_text.match_indices(&token) {
            let start = idx + token.len();
            let mut end = (start + PHRASE_WINDOW).min(lower_text.len());
            while end > start && !lower_text.is_char_boundary(end) {
                end -= 1;
            }
            let window = &lower_text[start..end];
            if phrases.iter().any(|p| window.contains(p)) {
                return true;
            }
        }
    }

    false
}

fn parse_weekday(token: &str) -> Option<Weekday> {
    let token = token.to_lowercase();
    let day = match token.as_str() {
        "monday" | "mon" => Weekday::Mon,
        "tuesday" | "tue" | "tues" => Weekday::Tue,
        "wednesday" | "wed" => Weekday::Wed,
        "thursday" | "thu" | "thur" | "thurs" => Weekday::Thu,
        "friday" | "fri" => Weekday::Fri,
        "saturday" | "sat" => Weekday::Sat,
        "sunday" | "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
