//! Input normalization.
//!
//! Turns whatever the form handed over into a [`Session`]:
//! - Weight clamped to a safe minimum
//! - Sex mapped to a distribution ratio, male for anything unrecognised
//! - Times parsed leniently, `now` substituted when unparsable
//! - Drink quantities clamped to non-negative values
//!
//! Nothing here fails.

use crate::config::ModelConfig;
use crate::types::{Drink, RawDrink, RawInput, Session, Sex};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};

const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Normalizer for converting raw input into a session
pub struct Normalizer;

impl Normalizer {
    /// Normalize a raw input record
    pub fn normalize(raw: &RawInput, now: DateTime<Utc>, config: &ModelConfig) -> Session {
        let ignored = raw.ignored_fields();
        if !ignored.is_empty() {
            tracing::debug!("Ignoring fields not used by the model: {:?}", ignored);
        }

        let weight_kg = clamp_weight(raw.weight_kg, config.min_weight_kg);
        let sex = parse_sex(&raw.sex);
        let distribution_ratio = match sex {
            Sex::Male => config.male_ratio,
            Sex::Female => config.female_ratio,
        };

        let now = now.fixed_offset();
        let start_time = parse_time(&raw.start_time).unwrap_or_else(|| {
            tracing::debug!("Unparsable start time {:?}, using now", raw.start_time);
            now
        });
        let end_time = parse_time(&raw.end_time).unwrap_or_else(|| {
            tracing::debug!("Unparsable end time {:?}, using now", raw.end_time);
            now
        });
        if end_time < start_time {
            tracing::debug!("End time precedes start time, treating as instantaneous");
        }

        let drinks = raw.drinks.iter().map(normalize_drink).collect();

        Session {
            weight_kg,
            sex,
            distribution_ratio,
            start_time,
            end_time,
            drinks,
        }
    }
}

fn clamp_weight(weight_kg: f64, min_weight_kg: f64) -> f64 {
    if weight_kg.is_finite() && weight_kg >= min_weight_kg {
        weight_kg
    } else {
        tracing::debug!("Weight {} clamped to {}", weight_kg, min_weight_kg);
        min_weight_kg
    }
}

/// Map a sex string to [`Sex`], defaulting to male
pub fn parse_sex(value: &str) -> Sex {
    match value.trim().to_lowercase().as_str() {
        "female" | "f" | "woman" | "kobieta" => Sex::Female,
        "male" | "m" | "man" | "mężczyzna" => Sex::Male,
        other => {
            if !other.is_empty() {
                tracing::debug!("Unrecognised sex {:?}, using male ratio", other);
            }
            Sex::Male
        }
    }
}

/// Parse an instant from RFC 3339 or a local datetime
///
/// Local values carry no offset and are read as UTC wall-clock time.
pub fn parse_time(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant);
    }

    for format in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

fn normalize_drink(raw: &RawDrink) -> Drink {
    Drink {
        volume_ml: non_negative(raw.volume_ml),
        percent: non_negative(raw.percent).min(100.0),
        count: if raw.count.is_finite() && raw.count > 0.0 {
            raw.count.floor().min(f64::from(u32::MAX)) as u32
        } else {
            0
        },
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}
