//! Timeline simulation.
//!
//! Samples the concentration curve on a fixed step:
//! - Linear absorption across the drinking window (instant when the window is empty)
//! - Constant-rate elimination since the start of drinking
//! - Stops at the first zero once the whole dose has been absorbed
//!
//! The horizon is `drinking window + tail`, clamped between the configured
//! minimum and maximum, so a default run never exceeds 145 samples.

use crate::config::ModelConfig;
use crate::types::{Session, TimelinePoint};
use chrono::{DateTime, Duration, FixedOffset};
use std::iter::FusedIterator;

const MS_PER_MINUTE: i64 = 60 * 1000;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// Lazy, single-use sequence of timeline samples
#[derive(Debug)]
pub struct Timeline {
    start: DateTime<FixedOffset>,
    total_grams: f64,
    distribution_mass_kg: f64,
    model: ModelConfig,
    duration_ms: i64,
    step_ms: i64,
    horizon_ms: i64,
    next_ms: i64,
    finished: bool,
}

/// Start simulating a session with the given dose
pub fn simulate(session: &Session, total_grams: f64, config: &ModelConfig) -> Timeline {
    let duration_ms = session.duration_ms();
    let step_ms = i64::from(config.step_minutes.max(1)) * MS_PER_MINUTE;
    let horizon_ms = (duration_ms + i64::from(config.tail_hours) * MS_PER_HOUR)
        .max(i64::from(config.min_horizon_hours) * MS_PER_HOUR)
        .min(i64::from(config.max_horizon_hours) * MS_PER_HOUR);

    tracing::debug!(
        "Simulating {:.3} g over a {} min window, horizon {} min",
        total_grams,
        duration_ms / MS_PER_MINUTE,
        horizon_ms / MS_PER_MINUTE
    );

    Timeline {
        start: session.start_time,
        total_grams: if total_grams.is_finite() {
            total_grams.max(0.0)
        } else {
            0.0
        },
        distribution_mass_kg: session.distribution_ratio * session.weight_kg,
        model: config.clone(),
        duration_ms,
        step_ms,
        horizon_ms,
        next_ms: 0,
        finished: false,
    }
}

impl Timeline {
    /// Share of the dose absorbed `t_ms` after the start
    fn absorbed_fraction(&self, t_ms: i64) -> f64 {
        if self.duration_ms == 0 {
            1.0
        } else {
            (t_ms as f64 / self.duration_ms as f64).min(1.0)
        }
    }

    /// Concentration in percent at `t_ms`, floored at zero
    fn percent_at(&self, t_ms: i64, absorbed_grams: f64) -> f64 {
        let hours = t_ms as f64 / MS_PER_HOUR as f64;
        // grams per kg of distribution mass, read on the percent scale
        let before_elimination = absorbed_grams / self.distribution_mass_kg;
        (before_elimination - self.model.elimination_rate_pct_per_hour * hours).max(0.0)
    }

    fn remaining(&self) -> usize {
        if self.finished || self.next_ms > self.horizon_ms {
            0
        } else {
            ((self.horizon_ms - self.next_ms) / self.step_ms) as usize + 1
        }
    }
}

impl Iterator for Timeline {
    type Item = TimelinePoint;

    fn next(&mut self) -> Option<TimelinePoint> {
        if self.finished || self.next_ms > self.horizon_ms {
            return None;
        }

        let t_ms = self.next_ms;
        self.next_ms += self.step_ms;

        let fraction = self.absorbed_fraction(t_ms);
        let absorbed = fraction * self.total_grams;
        let promiles = self.model.round(self.percent_at(t_ms, absorbed) * 10.0);

        let absorption_complete = fraction >= 1.0 || self.total_grams <= 0.0;
        if promiles <= 0.0 && absorption_complete {
            tracing::debug!("Concentration back at zero after {} min", t_ms / MS_PER_MINUTE);
            self.finished = true;
        }

        let clock = (self.start + Duration::milliseconds(t_ms))
            .format("%H:%M")
            .to_string();

        Some(TimelinePoint {
            time: (t_ms / MS_PER_MINUTE) as u32,
            clock,
            promiles,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining()))
    }
}

impl FusedIterator for Timeline {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dose::total_grams;
    use crate::types::{Drink, Sex};
    use chrono::TimeZone;

    fn session(weight_kg: f64, duration_minutes: i64, drinks: Vec<Drink>) -> Session {
        let start = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 6, 1, 18, 0, 0)
            .unwrap();
        Session {
            weight_kg,
            sex: Sex::Male,
            distribution_ratio: 0.68,
            start_time: start,
            end_time: start + Duration::minutes(duration_minutes),
            drinks,
        }
    }

    fn large_beers(count: u32) -> Vec<Drink> {
        vec![Drink {
            volume_ml: 500.0,
            percent: 5.0,
            count,
        }]
    }

    fn run(session: &Session, config: &ModelConfig) -> Vec<TimelinePoint> {
        let grams = total_grams(&session.drinks, config);
        simulate(session, grams, config).collect()
    }

    #[test]
    fn test_instantaneous_large_beer() {
        let config = ModelConfig::default();
        let points = run(&session(70.0, 0, large_beers(1)), &config);

        // 16h horizon at 10 min steps
        assert_eq!(points.len(), 97);
        assert_eq!(points[0].time, 0);
        assert!((points[0].promiles - 4.144).abs() < 1e-9);

        // 0.15 per hour
        assert!((points[6].promiles - 3.994).abs() < 1e-9);

        let last = points.last().unwrap();
        assert_eq!(last.time, 16 * 60);
        assert!((last.promiles - 1.744).abs() < 1e-9);
        assert!(last.promiles > 0.0);
        let min = points
            .iter()
            .map(|p| p.promiles)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(last.promiles, min);
    }

    #[test]
    fn test_zero_dose_single_point() {
        let config = ModelConfig::default();
        for duration in [0, 120] {
            let points = run(&session(70.0, duration, vec![]), &config);
            assert_eq!(points.len(), 1);
            assert_eq!(points[0].time, 0);
            assert_eq!(points[0].promiles, 0.0);
        }
    }

    #[test]
    fn test_spread_window_rises_then_declines() {
        let config = ModelConfig::default();
        let points = run(&session(70.0, 120, large_beers(3)), &config);

        assert_eq!(points[0].promiles, 0.0);

        let (absorbing, eliminating): (Vec<_>, Vec<_>) =
            points.iter().partition(|p| p.time <= 120);
        for pair in absorbing.windows(2) {
            assert!(pair[1].promiles > pair[0].promiles);
        }
        let peak = absorbing.last().unwrap();
        assert_eq!(peak.time, 120);
        assert!(eliminating[0].promiles < peak.promiles);
        for pair in eliminating.windows(2) {
            assert!(pair[1].promiles < pair[0].promiles);
        }

        // 2h window plus 16h tail
        assert_eq!(points.last().unwrap().time, 18 * 60);
    }

    #[test]
    fn test_stops_at_first_zero() {
        let config = ModelConfig::default();
        let shot = vec![Drink {
            volume_ml: 50.0,
            percent: 40.0,
            count: 1,
        }];
        let points = run(&session(100.0, 0, shot), &config);

        let last = points.last().unwrap();
        assert_eq!(last.time, 930);
        assert_eq!(last.promiles, 0.0);
        assert_eq!(points.len(), 94);
        assert!(points[..points.len() - 1].iter().all(|p| p.promiles > 0.0));
    }

    #[test]
    fn test_horizon_capped() {
        let config = ModelConfig::default();
        let points = run(&session(70.0, 20 * 60, large_beers(10)), &config);
        assert_eq!(points.len(), 145);
        assert_eq!(points.last().unwrap().time, 24 * 60);
    }

    #[test]
    fn test_minimum_horizon_applies() {
        let config = ModelConfig {
            tail_hours: 1,
            ..Default::default()
        };
        let points = run(&session(70.0, 0, large_beers(1)), &config);
        assert_eq!(points.last().unwrap().time, 6 * 60);
    }

    #[test]
    fn test_samples_ordered_and_non_negative() {
        let config = ModelConfig::default();
        for (duration, count) in [(0, 1), (45, 2), (300, 6), (1440, 20)] {
            let points = run(&session(30.0, duration, large_beers(count)), &config);
            assert!(points.len() <= 145);
            assert!(points.iter().all(|p| p.promiles >= 0.0));
            for pair in points.windows(2) {
                assert!(pair[1].time > pair[0].time);
            }
        }
    }

    #[test]
    fn test_elimination_rate_substitutable() {
        let flat = ModelConfig {
            elimination_rate_pct_per_hour: 0.0,
            ..Default::default()
        };
        let points = run(&session(70.0, 0, large_beers(1)), &flat);
        assert!(points.iter().all(|p| (p.promiles - 4.144).abs() < 1e-9));

        let fast = ModelConfig {
            elimination_rate_pct_per_hour: 0.03,
            ..Default::default()
        };
        let points = run(&session(70.0, 0, large_beers(1)), &fast);
        assert!((points[6].promiles - 3.844).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_dose_simulated_as_zero() {
        let config = ModelConfig::default();
        let s = session(70.0, 120, large_beers(1));
        for grams in [f64::INFINITY, f64::NAN] {
            let points: Vec<_> = simulate(&s, grams, &config).collect();
            assert_eq!(points.len(), 1);
            assert_eq!(points[0].promiles, 0.0);
        }
    }

    #[test]
    fn test_huge_dose_stays_finite() {
        let config = ModelConfig::default();
        let points: Vec<_> = simulate(&session(70.0, 120, vec![]), 1e300, &config).collect();
        assert!(points.iter().all(|p| p.promiles.is_finite()));
        assert!(points[1].promiles > 0.0);
    }

    #[test]
    fn test_clock_labels_follow_start_offset() {
        let config = ModelConfig::default();
        let mut s = session(70.0, 0, large_beers(1));
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        s.start_time = offset.with_ymd_and_hms(2024, 6, 1, 23, 50, 0).unwrap();
        s.end_time = s.start_time;

        let points = run(&s, &config);
        assert_eq!(points[0].clock, "23:50");
        assert_eq!(points[1].clock, "00:00");
    }

    #[test]
    fn test_sequence_is_single_use_and_deterministic() {
        let config = ModelConfig::default();
        let s = session(70.0, 90, large_beers(2));
        let grams = total_grams(&s.drinks, &config);

        let mut timeline = simulate(&s, grams, &config);
        assert_eq!(timeline.size_hint(), (0, Some(106)));
        let first: Vec<_> = timeline.by_ref().collect();
        assert!(timeline.next().is_none());

        let second: Vec<_> = simulate(&s, grams, &config).collect();
        assert_eq!(first, second);
    }
}
