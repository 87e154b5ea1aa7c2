//! Estimation pipeline.
//!
//! Stages, strictly in order:
//! 1. Normalizer - raw record to session
//! 2. Dose aggregation - grams of ethanol
//! 3. Timeline simulation - concentration samples
//! 4. Classification - status and summary

use crate::classifier::classify;
use crate::config::ModelConfig;
use crate::dose::total_grams;
use crate::normalizer::Normalizer;
use crate::timeline::simulate;
use crate::types::{Estimate, RawInput, TimelinePoint};
use chrono::{DateTime, Utc};

/// Estimate the concentration curve, using the current time for unparsable instants
pub fn estimate(raw: &RawInput, config: &ModelConfig) -> Estimate {
    estimate_at(raw, Utc::now(), config)
}

/// Estimate the concentration curve with an explicit `now`
///
/// Deterministic: the same input and `now` give the same estimate.
pub fn estimate_at(raw: &RawInput, now: DateTime<Utc>, config: &ModelConfig) -> Estimate {
    let session = Normalizer::normalize(raw, now, config);
    let grams = total_grams(&session.drinks, config);
    let timeline: Vec<TimelinePoint> = simulate(&session, grams, config).collect();
    let classification = classify(timeline.last(), grams, config);

    let (peak_minute, peak_promiles) = find_peak(&timeline);
    let below_threshold_minute = timeline
        .iter()
        .filter(|p| p.time >= peak_minute)
        .find(|p| p.promiles <= config.threshold_promiles)
        .map(|p| p.time);

    tracing::info!(
        "Estimated {:.3} g, peak {:.3}‰ at {} min, current {:.3}‰ ({})",
        grams,
        peak_promiles,
        peak_minute,
        classification.promiles,
        classification.status.as_str()
    );

    Estimate {
        promiles: classification.promiles,
        status: classification.status,
        summary: classification.summary,
        total_grams: config.round(grams),
        peak_promiles,
        peak_minute,
        below_threshold_minute,
        timeline,
    }
}

/// Earliest sample with the highest concentration
fn find_peak(timeline: &[TimelinePoint]) -> (u32, f64) {
    timeline
        .iter()
        .fold((0, 0.0), |(minute, peak), p| {
            if p.promiles > peak {
                (p.time, p.promiles)
            } else {
                (minute, peak)
            }
        })
}
