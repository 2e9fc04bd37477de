use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// League the game belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum League {
    Nba,
    Custom(String),
}

impl League {
    pub fn as_str(&self) -> &str {
        match self {
            League::Nba => "NBA",
            League::Custom(name) => name,
        }
    }
}

impl std::fmt::Display for League {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Side of the matchup (HOME or AWAY)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Home => "HOME",
            Side::Away => "AWAY",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Schedule spot classification for a team entering a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduleSpot {
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "B2B")]
    BackToBack,
    #[serde(rename = "3_IN_4")]
    ThreeInFour,
    #[serde(rename = "4_IN_5")]
    FourInFive,
}

impl ScheduleSpot {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleSpot::Normal => "NORMAL",
            ScheduleSpot::BackToBack => "B2B",
            ScheduleSpot::ThreeInFour => "3_IN_4",
            ScheduleSpot::FourInFive => "4_IN_5",
        }
    }

    /// True for the compressed spots that carry a schedule penalty
    pub fn is_compressed(&self) -> bool {
        matches!(self, ScheduleSpot::ThreeInFour | ScheduleSpot::FourInFive)
    }
}

impl Default for ScheduleSpot {
    fn default() -> Self {
        ScheduleSpot::Normal
    }
}

impl std::fmt::Display for ScheduleSpot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable per-game input snapshot
///
/// Spread and total are quoted relative to the home side: a negative spread
/// means the home team is favored. Moneylines use American odds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameData {
    pub game_id: String,
    pub league: League,
    pub home_team: String,
    pub away_team: String,
    pub scheduled_start: DateTime<Utc>,
    /// UTC offset of the venue in whole hours (e.g. -5 for New York)
    pub venue_utc_offset: i32,
    pub spread: f64,
    pub total: f64,
    pub home_moneyline: i32,
    pub away_moneyline: i32,
    /// Share of public bets on the home side (0-100)
    pub public_home_pct: f64,
    pub sharp_action: bool,
}

impl GameData {
    /// "Away @ Home" label for logs and reports
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }

    /// Implied home win probability from the American moneyline
    pub fn implied_home_probability(&self) -> f64 {
        let ml = self.home_moneyline as f64;
        if ml < 0.0 {
            -ml / (-ml + 100.0)
        } else {
            100.0 / (ml + 100.0)
        }
    }
}

/// A single sportsbook line observation
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub timestamp: DateTime<Utc>,
    /// Home-relative spread at observation time
    pub spread: f64,
    pub total: f64,
    pub home_moneyline: i32,
    pub away_moneyline: i32,
}

/// Recent schedule for one team, supplied by the caller
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamSchedule {
    /// Tip-off times of recent games, any order
    pub recent_games: Vec<DateTime<Utc>>,
    /// UTC offset of the team's home market in whole hours
    pub utc_offset: i32,
}

impl TeamSchedule {
    pub fn new(recent_games: Vec<DateTime<Utc>>, utc_offset: i32) -> Self {
        Self {
            recent_games,
            utc_offset,
        }
    }

    /// Most recent game before the given time, if any
    pub fn last_game_before(&self, cutoff: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.recent_games.iter().copied().filter(|t| *t < cutoff).max()
    }
}

/// Situational state for one side of a matchup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamSituation {
    pub rest_days: u32,
    pub back_to_back: bool,
    /// 0.0 (fresh) to 1.0 (max fatigue)
    pub fatigue_score: f64,
    pub schedule_spot: ScheduleSpot,
    /// Body-clock penalty from eastward travel, 0.0 when none
    pub circadian_disruption: f64,
}

/// Derived game view rebuilt for every evaluation cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContext {
    pub home: TeamSituation,
    pub away: TeamSituation,
    /// Share of public bets on the home side (0-100)
    pub public_home_pct: f64,
    pub sharp_action: bool,
}

impl GameContext {
    pub fn situation(&self, side: Side) -> &TeamSituation {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    /// Rest-day gap from the home side's perspective (positive = home more rested)
    pub fn rest_gap(&self) -> i64 {
        self.home.rest_days as i64 - self.away.rest_days as i64
    }
}
