//! Rest, schedule-compression, and body-clock analysis
//!
//! Everything here is pure calendar arithmetic over caller-supplied
//! schedules. Calendar days come from the UTC dates of the supplied
//! instants, so callers should feed consistently-zoned timestamps.

use crate::domain::{GameContext, GameData, ScheduleSpot, TeamSchedule, TeamSituation};
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// Rest days reported when a team has no recorded previous game
const FULL_REST_DAYS: u32 = 7;
/// Fatigue discount applied when the short-rested side sleeps in its own beds
const HOME_FATIGUE_DISCOUNT: f64 = 0.8;
/// Local start hour below which eastward travel is penalized
const EARLY_START_HOUR: u32 = 18;
/// Disruption per timezone hour crossed west-to-east
const CIRCADIAN_PENALTY_PER_HOUR: f64 = 0.02;

/// Rest profile for one side entering a game
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RestAnalysis {
    pub rest_days: u32,
    pub back_to_back: bool,
    /// 0.0 fresh, 0.5 one day of rest, 1.0 back-to-back
    pub fatigue_score: f64,
}

/// Combined situational output for both sides
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalFactors {
    pub home: TeamSituation,
    pub away: TeamSituation,
}

/// Pure schedule analysis engine
#[derive(Debug, Default)]
pub struct TemporalEngine;

impl TemporalEngine {
    pub fn new() -> Self {
        Self
    }

    /// Rest-day gap and staged fatigue for one side.
    ///
    /// Rest days are whole calendar days between the games minus one, floored
    /// at zero: consecutive calendar days mean zero rest days and a
    /// back-to-back. Fatigue is staged 1.0 / 0.5 / 0.0 and discounted 0.8x
    /// when the tired side is at home.
    pub fn analyze_rest(
        &self,
        last_game: Option<DateTime<Utc>>,
        game_time: DateTime<Utc>,
        is_home: bool,
    ) -> RestAnalysis {
        let rest_days = match last_game {
            None => FULL_REST_DAYS,
            Some(last) => {
                let gap = (game_time.date_naive() - last.date_naive()).num_days() - 1;
                gap.max(0) as u32
            }
        };

        let back_to_back = last_game.is_some() && rest_days == 0;
        let base_fatigue = match rest_days {
            0 => 1.0,
            1 => 0.5,
            _ => 0.0,
        };
        let fatigue_score = if is_home {
            base_fatigue * HOME_FATIGUE_DISCOUNT
        } else {
            base_fatigue
        };

        RestAnalysis {
            rest_days,
            back_to_back,
            fatigue_score,
        }
    }

    /// Classify the trailing schedule compression.
    ///
    /// Counts prior games inside the trailing 5- and 4-day windows. The
    /// 4-in-5 check runs before 3-in-4, so a slate qualifying for both
    /// classifies as the heavier spot.
    pub fn detect_schedule_spot(
        &self,
        recent_games: &[DateTime<Utc>],
        game_time: DateTime<Utc>,
    ) -> ScheduleSpot {
        let game_day = game_time.date_naive();
        let mut priors_in_five = 0u32;
        let mut priors_in_four = 0u32;
        let mut played_yesterday = false;

        for game in recent_games {
            let days_back = (game_day - game.date_naive()).num_days();
            if days_back < 1 {
                continue;
            }
            if days_back <= 4 {
                priors_in_five += 1;
            }
            if days_back <= 3 {
                priors_in_four += 1;
            }
            if days_back == 1 {
                played_yesterday = true;
            }
        }

        if priors_in_five >= 3 {
            ScheduleSpot::FourInFive
        } else if priors_in_four >= 2 {
            ScheduleSpot::ThreeInFour
        } else if played_yesterday {
            ScheduleSpot::BackToBack
        } else {
            ScheduleSpot::Normal
        }
    }

    /// Body-clock penalty for a team whose home market trails the venue.
    ///
    /// Only west-to-east shifts before an early local start register; the
    /// penalty scales with the hours crossed.
    pub fn circadian_disruption(
        &self,
        team_utc_offset: i32,
        venue_utc_offset: i32,
        local_start_hour: u32,
    ) -> f64 {
        let eastward_shift = venue_utc_offset - team_utc_offset;
        if eastward_shift > 0 && local_start_hour < EARLY_START_HOUR {
            eastward_shift as f64 * CIRCADIAN_PENALTY_PER_HOUR
        } else {
            0.0
        }
    }

    /// Full per-side situational bundle for a game
    pub fn temporal_factors(
        &self,
        game: &GameData,
        home_schedule: &TeamSchedule,
        away_schedule: &TeamSchedule,
    ) -> TemporalFactors {
        let local_start_hour = venue_local_hour(game.scheduled_start, game.venue_utc_offset);

        TemporalFactors {
            home: self.side_situation(game, home_schedule, true, local_start_hour),
            away: self.side_situation(game, away_schedule, false, local_start_hour),
        }
    }

    /// Evaluation context for the rules engine, one call per cycle
    pub fn game_context(
        &self,
        game: &GameData,
        home_schedule: &TeamSchedule,
        away_schedule: &TeamSchedule,
    ) -> GameContext {
        let factors = self.temporal_factors(game, home_schedule, away_schedule);
        GameContext {
            home: factors.home,
            away: factors.away,
            public_home_pct: game.public_home_pct,
            sharp_action: game.sharp_action,
        }
    }

    fn side_situation(
        &self,
        game: &GameData,
        schedule: &TeamSchedule,
        is_home: bool,
        local_start_hour: u32,
    ) -> TeamSituation {
        let rest = self.analyze_rest(
            schedule.last_game_before(game.scheduled_start),
            game.scheduled_start,
            is_home,
        );
        let spot = self.detect_schedule_spot(&schedule.recent_games, game.scheduled_start);
        let circadian = self.circadian_disruption(
            schedule.utc_offset,
            game.venue_utc_offset,
            local_start_hour,
        );

        TeamSituation {
            rest_days: rest.rest_days,
            back_to_back: rest.back_to_back,
            fatigue_score: rest.fatigue_score,
            schedule_spot: spot,
            circadian_disruption: circadian,
        }
    }
}

/// Hour of day at the venue for a UTC tip-off time
fn venue_local_hour(start: DateTime<Utc>, venue_utc_offset: i32) -> u32 {
    (start + Duration::hours(venue_utc_offset as i64)).hour()
}
