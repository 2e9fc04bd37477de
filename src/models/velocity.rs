//! Line movement velocity and steam detection
//!
//! Summarizes a series of sportsbook line snapshots into per-hour movement
//! velocities, flags steam moves past configured thresholds, and separately
//! flags late movement close to tip-off.

use crate::domain::LineSnapshot;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Minimum observed span before velocities are meaningful
const MIN_SPAN_HOURS: f64 = 0.1;

/// Configuration for steam and late-movement detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VelocityConfig {
    /// Spread velocity (points/hour) that qualifies as steam
    #[serde(default = "default_steam_spread_per_hour")]
    pub steam_spread_per_hour: f64,
    /// Total velocity (points/hour) that qualifies as steam
    #[serde(default = "default_steam_total_per_hour")]
    pub steam_total_per_hour: f64,
    /// Trailing window scanned for late movement
    #[serde(default = "default_late_window_hours")]
    pub late_window_hours: f64,
    /// Spread delta inside the window that counts as late movement
    #[serde(default = "default_late_move_points")]
    pub late_move_points: f64,
}

fn default_steam_spread_per_hour() -> f64 {
    0.5
}

fn default_steam_total_per_hour() -> f64 {
    1.0
}

fn default_late_window_hours() -> f64 {
    2.0
}

fn default_late_move_points() -> f64 {
    0.5
}

impl Default for VelocityConfig {
    fn default() -> Self {
        Self {
            steam_spread_per_hour: default_steam_spread_per_hour(),
            steam_total_per_hour: default_steam_total_per_hour(),
            late_window_hours: default_late_window_hours(),
            late_move_points: default_late_move_points(),
        }
    }
}

/// Which way the money is pushing the line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SteamDirection {
    /// Spread falling toward the home side
    Home,
    /// Spread rising toward the away side
    Away,
    /// Total rising
    Over,
    /// Total falling
    Under,
}

impl SteamDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SteamDirection::Home => "HOME",
            SteamDirection::Away => "AWAY",
            SteamDirection::Over => "OVER",
            SteamDirection::Under => "UNDER",
        }
    }
}

impl std::fmt::Display for SteamDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Movement summary between the earliest and latest snapshots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VelocityAnalysis {
    pub snapshot_count: usize,
    pub span_hours: f64,
    pub spread_delta: f64,
    pub total_delta: f64,
    pub spread_velocity: f64,
    pub total_velocity: f64,
    pub is_steam_move: bool,
    pub steam_direction: Option<SteamDirection>,
    pub late_movement: bool,
}

impl VelocityAnalysis {
    /// Zero-valued summary for series too thin to measure
    pub fn no_data(snapshot_count: usize) -> Self {
        Self {
            snapshot_count,
            span_hours: 0.0,
            spread_delta: 0.0,
            total_delta: 0.0,
            spread_velocity: 0.0,
            total_velocity: 0.0,
            is_steam_move: false,
            steam_direction: None,
            late_movement: false,
        }
    }

    pub fn has_data(&self) -> bool {
        self.span_hours > 0.0
    }
}

/// Snapshot-series analyzer
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    config: VelocityConfig,
}

impl VelocityTracker {
    pub fn new(config: VelocityConfig) -> Self {
        Self { config }
    }

    /// Summarize a snapshot series.
    ///
    /// Snapshots are sorted by time first. Fewer than two snapshots, or a
    /// sorted span under 0.1h, produce the no-data summary. Steam checks the
    /// spread velocity before the total velocity, so when both clear their
    /// thresholds the spread direction wins. Late movement is judged
    /// independently on the spread delta inside the trailing window before
    /// the last snapshot.
    pub fn analyze(&self, snapshots: &[LineSnapshot]) -> VelocityAnalysis {
        if snapshots.len() < 2 {
            return VelocityAnalysis::no_data(snapshots.len());
        }

        let mut sorted: Vec<LineSnapshot> = snapshots.to_vec();
        sorted.sort_by_key(|s| s.timestamp);

        let first = &sorted[0];
        let last = &sorted[sorted.len() - 1];
        let span_hours = (last.timestamp - first.timestamp).num_seconds() as f64 / 3600.0;
        if span_hours < MIN_SPAN_HOURS {
            return VelocityAnalysis::no_data(sorted.len());
        }

        let spread_delta = last.spread - first.spread;
        let total_delta = last.total - first.total;
        let spread_velocity = spread_delta / span_hours;
        let total_velocity = total_delta / span_hours;

        let steam_direction = if spread_velocity.abs() >= self.config.steam_spread_per_hour {
            Some(if spread_velocity < 0.0 {
                SteamDirection::Home
            } else {
                SteamDirection::Away
            })
        } else if total_velocity.abs() >= self.config.steam_total_per_hour {
            Some(if total_velocity > 0.0 {
                SteamDirection::Over
            } else {
                SteamDirection::Under
            })
        } else {
            None
        };

        let late_movement = self.detect_late_movement(&sorted);

        if let Some(direction) = steam_direction {
            info!(
                direction = %direction,
                spread_velocity = format!("{spread_velocity:+.2}"),
                total_velocity = format!("{total_velocity:+.2}"),
                "steam move detected"
            );
        }

        VelocityAnalysis {
            snapshot_count: sorted.len(),
            span_hours,
            spread_delta,
            total_delta,
            spread_velocity,
            total_velocity,
            is_steam_move: steam_direction.is_some(),
            steam_direction,
            late_movement,
        }
    }

    /// Spread delta across the trailing window before the last snapshot
    fn detect_late_movement(&self, sorted: &[LineSnapshot]) -> bool {
        let last = &sorted[sorted.len() - 1];
        let window_secs = (self.config.late_window_hours * 3600.0) as i64;
        let cutoff = last.timestamp - Duration::seconds(window_secs);

        let Some(window_first) = sorted.iter().find(|s| s.timestamp >= cutoff) else {
            return false;
        };
        if window_first.timestamp == last.timestamp {
            return false;
        }

        (last.spread - window_first.spread).abs() >= self.config.late_move_points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    fn make_snapshot(minutes: i64, spread: f64, total: f64) -> LineSnapshot {
        LineSnapshot {
            timestamp: t0() + Duration::minutes(minutes),
            spread,
            total,
            home_moneyline: -150,
            away_moneyline: 130,
        }
    }

    #[test]
    fn test_single_snapshot_is_no_data() {
        let tracker = VelocityTracker::default();
        let analysis = tracker.analyze(&[make_snapshot(0, -3.0, 220.0)]);

        assert!(!analysis.has_data());
        assert!(!analysis.is_steam_move);
        assert_eq!(analysis.steam_direction, None);
        assert_eq!(analysis.spread_velocity, 0.0);
    }

    #[test]
    fn test_tiny_span_is_no_data() {
        let tracker = VelocityTracker::default();
        let snapshots = vec![make_snapshot(0, -3.0, 220.0), make_snapshot(4, -4.0, 220.0)];

        let analysis = tracker.analyze(&snapshots);
        assert!(!analysis.has_data());
    }

    #[test]
    fn test_velocities_from_unsorted_input() {
        let tracker = VelocityTracker::default();
        // Out of order on purpose; 2 hours end to end.
        let snapshots = vec![
            make_snapshot(120, -5.0, 223.0),
            make_snapshot(0, -3.0, 220.0),
            make_snapshot(60, -4.0, 221.0),
        ];

        let analysis = tracker.analyze(&snapshots);
        assert_eq!(analysis.snapshot_count, 3);
        assert!((analysis.span_hours - 2.0).abs() < 1e-9);
        assert!((analysis.spread_delta - (-2.0)).abs() < 1e-9);
        assert!((analysis.spread_velocity - (-1.0)).abs() < 1e-9);
        assert!((analysis.total_velocity - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_spread_steam_toward_home() {
        let tracker = VelocityTracker::default();
        let snapshots = vec![make_snapshot(0, -3.0, 220.0), make_snapshot(120, -5.0, 220.0)];

        let analysis = tracker.analyze(&snapshots);
        assert!(analysis.is_steam_move);
        assert_eq!(analysis.steam_direction, Some(SteamDirection::Home));
    }

    #[test]
    fn test_spread_steam_toward_away() {
        let tracker = VelocityTracker::default();
        let snapshots = vec![make_snapshot(0, -6.0, 220.0), make_snapshot(120, -4.0, 220.0)];

        let analysis = tracker.analyze(&snapshots);
        assert_eq!(analysis.steam_direction, Some(SteamDirection::Away));
    }

    #[test]
    fn test_total_steam_when_spread_quiet() {
        let tracker = VelocityTracker::default();
        let snapshots = vec![make_snapshot(0, -3.0, 220.0), make_snapshot(120, -3.5, 216.0)];

        let analysis = tracker.analyze(&snapshots);
        assert!(analysis.is_steam_move);
        assert_eq!(analysis.steam_direction, Some(SteamDirection::Under));
    }

    #[test]
    fn test_spread_wins_steam_tie_break() {
        let tracker = VelocityTracker::default();
        // Both series clear their thresholds; spread direction is reported.
        let snapshots = vec![make_snapshot(0, -3.0, 220.0), make_snapshot(120, -6.0, 226.0)];

        let analysis = tracker.analyze(&snapshots);
        assert!(analysis.is_steam_move);
        assert_eq!(analysis.steam_direction, Some(SteamDirection::Home));
    }

    #[test]
    fn test_quiet_line_is_not_steam() {
        let tracker = VelocityTracker::default();
        let snapshots = vec![make_snapshot(0, -3.0, 220.0), make_snapshot(240, -3.5, 221.0)];

        let analysis = tracker.analyze(&snapshots);
        assert!(!analysis.is_steam_move);
        assert_eq!(analysis.steam_direction, None);
    }

    #[test]
    fn test_late_movement_independent_of_steam() {
        let tracker = VelocityTracker::default();
        // Flat for most of the day, then a 1-point jolt in the last hour.
        // Overall velocity stays under the steam threshold.
        let snapshots = vec![
            make_snapshot(0, -3.0, 220.0),
            make_snapshot(360, -3.0, 220.0),
            make_snapshot(420, -4.0, 220.0),
        ];

        let analysis = tracker.analyze(&snapshots);
        assert!(!analysis.is_steam_move);
        assert!(analysis.late_movement);
    }

    #[test]
    fn test_early_move_is_not_late_movement() {
        let tracker = VelocityTracker::default();
        // All movement happens early; the trailing window is flat.
        let snapshots = vec![
            make_snapshot(0, -3.0, 220.0),
            make_snapshot(60, -5.0, 220.0),
            make_snapshot(600, -5.0, 220.0),
        ];

        let analysis = tracker.analyze(&snapshots);
        assert!(!analysis.late_movement);
    }
}
