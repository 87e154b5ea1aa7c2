//! Core domain types for the Alkomat estimation engine.
//!
//! This module defines the records that flow through each stage:
//! - Raw input as handed over by the form or CLI
//! - The normalized session the engine works on
//! - Timeline samples and the final estimate

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Raw Input Types
// ============================================================================

/// A drink entry exactly as the caller supplied it
///
/// Fields default to zero when missing so that partial form state still
/// deserializes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDrink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub volume_ml: f64,
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub count: f64,
}

/// The input record of one estimation request
///
/// `height_cm`, `age`, `body_type`, `food` and `metabolism` are collected by
/// some form variants. They are accepted but play no part in the model.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInput {
    #[serde(default)]
    pub weight_kg: f64,
    #[serde(default)]
    pub sex: String,
    #[serde(default)]
    pub drinks: Vec<RawDrink>,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_cm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metabolism: Option<String>,
}

impl RawInput {
    /// Names of the supplied fields the model does not use
    pub fn ignored_fields(&self) -> Vec<&'static str> {
        let mut ignored = Vec::new();
        if self.height_cm.is_some() {
            ignored.push("heightCm");
        }
        if self.age.is_some() {
            ignored.push("age");
        }
        if self.body_type.is_some() {
            ignored.push("bodyType");
        }
        if self.food.is_some() {
            ignored.push("food");
        }
        if self.metabolism.is_some() {
            ignored.push("metabolism");
        }
        ignored
    }
}

// ============================================================================
// Session Types
// ============================================================================

/// Biological sex, selecting the distribution ratio
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// A drink after normalization
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Drink {
    pub volume_ml: f64,
    pub percent: f64,
    pub count: u32,
}

/// The canonical computation record
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub weight_kg: f64,
    pub sex: Sex,
    /// Distribution ratio resolved from `sex`
    pub distribution_ratio: f64,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub drinks: Vec<Drink>,
}

impl Session {
    /// Drinking window length in milliseconds, never negative
    pub fn duration_ms(&self) -> i64 {
        (self.end_time - self.start_time).num_milliseconds().max(0)
    }
}

// ============================================================================
// Output Types
// ============================================================================

/// One sample of the concentration curve
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Minutes since the start of drinking
    pub time: u32,
    /// Wall-clock label (`HH:MM`) in the offset of the start time
    pub clock: String,
    /// Concentration in per-mille
    pub promiles: f64,
}

/// Status relative to the threshold
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    BelowThreshold,
    AboveThreshold,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::BelowThreshold => "below-threshold",
            Status::AboveThreshold => "above-threshold",
        }
    }
}

/// The output record of one estimation request
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    /// Concentration at the last sample
    pub promiles: f64,
    pub status: Status,
    pub summary: String,
    pub total_grams: f64,
    pub peak_promiles: f64,
    pub peak_minute: u32,
    /// First sample at or after the peak that is at or below the threshold
    pub below_threshold_minute: Option<u32>,
    pub timeline: Vec<TimelinePoint>,
}

// ============================================================================
// Preset Types
// ============================================================================

/// A named drink the form offers with a zero count
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DrinkPreset {
    pub id: String,
    pub label: String,
    pub volume_ml: f64,
    pub percent: f64,
}

impl DrinkPreset {
    /// Build a raw drink entry of this preset with the given count
    pub fn to_raw(&self, count: u32) -> RawDrink {
        RawDrink {
            id: Some(self.id.clone()),
            label: Some(self.label.clone()),
            volume_ml: self.volume_ml,
            percent: self.percent,
            count: f64::from(count),
        }
    }
}

/// The catalog of drink presets, keyed by id
#[derive(Clone, Debug)]
pub struct PresetCatalog {
    pub presets: HashMap<String, DrinkPreset>,
}
