//! Dose aggregation: grams of pure ethanol across all drinks.

use crate::config::ModelConfig;
use crate::types::Drink;

/// Grams of ethanol in one drink entry, count included
///
/// Negative or non-finite quantities contribute nothing, and so does an
/// entry too large to represent.
pub fn drink_grams(drink: &Drink, config: &ModelConfig) -> f64 {
    let volume_ml = if drink.volume_ml.is_finite() {
        drink.volume_ml.max(0.0)
    } else {
        0.0
    };
    let percent = if drink.percent.is_finite() {
        drink.percent.clamp(0.0, 100.0)
    } else {
        0.0
    };

    let ethanol_ml = volume_ml * percent / 100.0;
    let grams = ethanol_ml * config.ethanol_density_g_per_ml * f64::from(drink.count);
    if grams.is_finite() {
        grams
    } else {
        tracing::debug!("Dropping drink of {} ml: dose overflows", drink.volume_ml);
        0.0
    }
}

/// Total grams of ethanol, never negative and always finite
pub fn total_grams(drinks: &[Drink], config: &ModelConfig) -> f64 {
    let sum: f64 = drinks.iter().map(|d| drink_grams(d, config)).sum();
    let total = if sum.is_finite() {
        sum
    } else {
        tracing::debug!("Total dose overflows, treating it as zero");
        0.0
    };
    tracing::debug!("Total ethanol over {} drinks: {:.3} g", drinks.len(), total);
    total
}
