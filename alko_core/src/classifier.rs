//! Status classification and summary text.

use crate::config::ModelConfig;
use crate::types::{Status, TimelinePoint};

/// Status and summary derived from the last sample
#[derive(Clone, Debug, PartialEq)]
pub struct Classification {
    pub promiles: f64,
    pub status: Status,
    pub summary: String,
}

/// Classify the current concentration
///
/// `last` is `None` only for an empty timeline, which reads as zero.
pub fn classify(
    last: Option<&TimelinePoint>,
    total_grams: f64,
    config: &ModelConfig,
) -> Classification {
    let promiles = last.map(|p| p.promiles).unwrap_or(0.0);
    let status = if promiles <= config.threshold_promiles {
        Status::BelowThreshold
    } else {
        Status::AboveThreshold
    };

    let summary = format!(
        "Consumed {:.1} g of pure alcohol. Current estimate: {:.2}‰ ({} {}‰).",
        total_grams,
        promiles,
        match status {
            Status::BelowThreshold => "at or below",
            Status::AboveThreshold => "above",
        },
        config.threshold_promiles
    );

    Classification {
        promiles,
        status,
        summary,
    }
}
