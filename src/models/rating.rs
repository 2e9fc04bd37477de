//! Elo-style team rating model
//!
//! Keeps a per-league rating table and turns rating gaps into home win
//! probabilities and expected margins. The table is the only mutable state in
//! the decision core, so it lives behind an explicit store that the
//! orchestrator owns and injects.

use crate::domain::{League, Recommendation};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// Home side classification threshold
const HOME_EDGE_THRESHOLD: f64 = 0.55;
/// Away side classification threshold
const AWAY_EDGE_THRESHOLD: f64 = 0.45;
/// Cap on the log-scaled margin-of-victory multiplier
const MOV_MULTIPLIER_CAP: f64 = 2.0;

/// Preseason NBA ratings, roughly power-ranking order
const NBA_SEED_RATINGS: &[(&str, f64)] = &[
    ("Oklahoma City Thunder", 1755.0),
    ("Boston Celtics", 1680.0),
    ("Denver Nuggets", 1660.0),
    ("Cleveland Cavaliers", 1650.0),
    ("Minnesota Timberwolves", 1630.0),
    ("New York Knicks", 1625.0),
    ("Indiana Pacers", 1615.0),
    ("Houston Rockets", 1600.0),
    ("LA Clippers", 1585.0),
    ("Los Angeles Lakers", 1580.0),
    ("Golden State Warriors", 1565.0),
    ("Milwaukee Bucks", 1550.0),
    ("Memphis Grizzlies", 1545.0),
    ("Orlando Magic", 1540.0),
    ("Detroit Pistons", 1535.0),
    ("Dallas Mavericks", 1520.0),
    ("Atlanta Hawks", 1510.0),
    ("Miami Heat", 1500.0),
    ("Sacramento Kings", 1490.0),
    ("San Antonio Spurs", 1485.0),
    ("Chicago Bulls", 1470.0),
    ("Phoenix Suns", 1465.0),
    ("Portland Trail Blazers", 1455.0),
    ("Toronto Raptors", 1440.0),
    ("Philadelphia 76ers", 1435.0),
    ("Brooklyn Nets", 1380.0),
    ("New Orleans Pelicans", 1370.0),
    ("Charlotte Hornets", 1350.0),
    ("Utah Jazz", 1330.0),
    ("Washington Wizards", 1300.0),
];

/// Rating model tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingConfig {
    /// Elo K-factor per game
    #[serde(default = "default_k_factor")]
    pub k_factor: f64,
    /// Home-court advantage in rating points
    #[serde(default = "default_home_advantage")]
    pub home_advantage: f64,
    /// Rating points per point of expected margin
    #[serde(default = "default_elo_per_margin_point")]
    pub elo_per_margin_point: f64,
    /// Rating assigned to teams missing from the table
    #[serde(default = "default_rating")]
    pub default_rating: f64,
}

fn default_k_factor() -> f64 {
    20.0
}

fn default_home_advantage() -> f64 {
    100.0
}

fn default_elo_per_margin_point() -> f64 {
    28.0
}

fn default_rating() -> f64 {
    1500.0
}

impl Default for RatingConfig {
    fn default() -> Self {
        Self {
            k_factor: default_k_factor(),
            home_advantage: default_home_advantage(),
            elo_per_margin_point: default_elo_per_margin_point(),
            default_rating: default_rating(),
        }
    }
}

/// Shared team rating table
///
/// One global lock guards the whole map: an Elo update moves two entries and
/// must land atomically.
#[derive(Debug, Default)]
pub struct RatingStore {
    ratings: RwLock<HashMap<String, f64>>,
}

impl RatingStore {
    /// Empty store; teams are registered by the caller
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the league's seed ratings
    pub fn seeded(league: &League) -> Self {
        let store = Self::new();
        let seeds: &[(&str, f64)] = match league {
            League::Nba => NBA_SEED_RATINGS,
            League::Custom(_) => &[],
        };

        {
            let mut map = store.write_map();
            for (team, rating) in seeds {
                map.insert((*team).to_string(), *rating);
            }
        }
        debug!(league = %league, teams = seeds.len(), "seeded rating store");
        store
    }

    pub fn register_team(&self, name: &str, rating: f64) {
        self.write_map().insert(name.to_string(), rating);
    }

    /// Resolve a team name to its registered entry.
    ///
    /// Exact case-insensitive match wins; otherwise substring containment in
    /// either direction. Among several containment matches the longest
    /// registered name wins, then lexicographic order, so "lakers" always
    /// lands on the same entry.
    pub fn resolve(&self, name: &str) -> Option<(String, f64)> {
        resolve_in(&self.read_map(), name)
    }

    /// Rating for a team, or the fallback when unregistered
    pub fn rating_or(&self, name: &str, fallback: f64) -> f64 {
        self.resolve(name).map(|(_, r)| r).unwrap_or(fallback)
    }

    /// Resolve both names and move rating points between them atomically.
    ///
    /// The amount comes from the supplied function of the two ratings as
    /// they stand under the write lock, so racing transfers serialize
    /// instead of computing from stale reads. Returns the resolved keys and
    /// the points moved, or `None` with the table untouched when either
    /// name fails to resolve.
    pub fn transfer(
        &self,
        gaining: &str,
        losing: &str,
        points: impl FnOnce(f64, f64) -> f64,
    ) -> Option<(String, String, f64)> {
        let mut map = self.write_map();
        let (gaining_key, gaining_rating) = resolve_in(&map, gaining)?;
        let (losing_key, losing_rating) = resolve_in(&map, losing)?;

        let moved = points(gaining_rating, losing_rating);
        if let Some(r) = map.get_mut(&gaining_key) {
            *r += moved;
        }
        if let Some(r) = map.get_mut(&losing_key) {
            *r -= moved;
        }
        Some((gaining_key, losing_key, moved))
    }

    /// Copy of the current table, for audit and tests
    pub fn snapshot(&self) -> HashMap<String, f64> {
        self.read_map().clone()
    }

    pub fn len(&self) -> usize {
        self.read_map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_map().is_empty()
    }

    fn read_map(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, f64>> {
        self.ratings.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_map(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, f64>> {
        self.ratings.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Rating-based prediction for one game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GamePrediction {
    pub home_team: String,
    pub away_team: String,
    /// Table rating before home advantage
    pub home_rating: f64,
    pub away_rating: f64,
    pub home_win_probability: f64,
    /// Expected home margin in points (negative = away favored)
    pub expected_margin: f64,
    pub recommendation: Recommendation,
}

/// Elo pairing and update logic over an injected store
#[derive(Debug)]
pub struct RatingModel {
    store: Arc<RatingStore>,
    config: RatingConfig,
}

impl RatingModel {
    pub fn new(store: Arc<RatingStore>, config: RatingConfig) -> Self {
        Self { store, config }
    }

    /// Predict the home win probability and expected margin for a matchup.
    ///
    /// Unregistered teams fall back to the default rating, so a prediction is
    /// always produced.
    pub fn predict_game(&self, home: &str, away: &str) -> GamePrediction {
        let home_rating = self.store.rating_or(home, self.config.default_rating);
        let away_rating = self.store.rating_or(away, self.config.default_rating);

        let diff = home_rating + self.config.home_advantage - away_rating;
        let probability = pairing_probability(diff);
        let expected_margin = diff / self.config.elo_per_margin_point;

        let recommendation = if probability > HOME_EDGE_THRESHOLD {
            Recommendation::Home
        } else if probability < AWAY_EDGE_THRESHOLD {
            Recommendation::Away
        } else {
            Recommendation::Neutral
        };

        debug!(
            home,
            away,
            probability = format!("{probability:.3}"),
            margin = format!("{expected_margin:+.1}"),
            "rating prediction"
        );

        GamePrediction {
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_rating,
            away_rating,
            home_win_probability: probability,
            expected_margin,
            recommendation,
        }
    }

    /// Fold a final score into the table.
    ///
    /// The shift is K x a log-scaled margin-of-victory multiplier (capped at
    /// 2x) x the result surprise, computed and applied symmetrically inside
    /// one store critical section. Does nothing when either team is not a
    /// registered entry.
    pub fn update_elo(&self, home: &str, away: &str, home_won: bool, margin: f64) {
        let actual = if home_won { 1.0 } else { 0.0 };
        let mov_multiplier = (1.0 + margin.abs()).ln().min(MOV_MULTIPLIER_CAP);

        let applied = self.store.transfer(home, away, |home_rating, away_rating| {
            let expected =
                pairing_probability(home_rating + self.config.home_advantage - away_rating);
            self.config.k_factor * mov_multiplier * (actual - expected)
        });

        match applied {
            Some((home_key, away_key, delta)) => debug!(
                home = %home_key,
                away = %away_key,
                home_won,
                margin,
                delta = format!("{delta:+.2}"),
                "rating update"
            ),
            None => debug!(home, away, "skipping rating update for unregistered matchup"),
        }
    }
}

/// Resolution body shared by the read path and the locked transfer path
fn resolve_in(map: &HashMap<String, f64>, name: &str) -> Option<(String, f64)> {
    let query = name.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    for (team, rating) in map.iter() {
        if team.to_lowercase() == query {
            return Some((team.clone(), *rating));
        }
    }

    map.iter()
        .filter(|(team, _)| {
            let registered = team.to_lowercase();
            registered.contains(&query) || query.contains(&registered)
        })
        .max_by(|(a, _), (b, _)| a.len().cmp(&b.len()).then_with(|| b.cmp(a)))
        .map(|(team, rating)| (team.clone(), *rating))
}

/// Win probability from a rating difference on the standard Elo curve
#[inline]
fn pairing_probability(rating_diff: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf(-rating_diff / 400.0))
}
