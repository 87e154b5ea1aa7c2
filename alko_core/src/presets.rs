//! Default catalog of drink presets.
//!
//! These are the drinks the form lists with a zero count. Custom presets
//! from the configuration file are merged on top.

use crate::config::CustomPreset;
use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Cached default catalog, built once per process
static DEFAULT_PRESETS: Lazy<PresetCatalog> = Lazy::new(build_default_presets);

/// Get a reference to the cached default catalog
pub fn get_default_presets() -> &'static PresetCatalog {
    &DEFAULT_PRESETS
}

/// Builds the default catalog of built-in drink presets
pub fn build_default_presets() -> PresetCatalog {
    let builtin = [
        ("large_beer", "Large beer 500ml", 500.0, 5.0),
        ("small_beer", "Small beer 350ml", 350.0, 5.0),
        ("wine", "Wine glass 175ml", 175.0, 12.0),
        ("champagne", "Champagne glass 120ml", 120.0, 12.0),
        ("spirit", "Spirit shot 50ml", 50.0, 40.0),
    ];

    let presets = builtin
        .into_iter()
        .map(|(id, label, volume_ml, percent)| {
            (
                id.to_string(),
                DrinkPreset {
                    id: id.to_string(),
                    label: label.to_string(),
                    volume_ml,
                    percent,
                },
            )
        })
        .collect();

    PresetCatalog { presets }
}

impl PresetCatalog {
    /// Default catalog extended with custom presets
    ///
    /// A custom preset with a built-in id replaces the built-in one.
    pub fn with_custom(custom: &[CustomPreset]) -> Self {
        let mut catalog = get_default_presets().clone();
        for preset in custom {
            if catalog.presets.contains_key(&preset.id) {
                tracing::debug!("Custom preset {} overrides built-in", preset.id);
            }
            catalog.presets.insert(
                preset.id.clone(),
                DrinkPreset {
                    id: preset.id.clone(),
                    label: preset.label.clone(),
                    volume_ml: preset.volume_ml,
                    percent: preset.percent,
                },
            );
        }
        catalog
    }

    /// Look up a preset by id
    pub fn get(&self, id: &str) -> Result<&DrinkPreset> {
        self.presets
            .get(id)
            .ok_or_else(|| Error::Preset(format!("Unknown preset: {}", id)))
    }

    /// Presets sorted by id for stable listing
    pub fn sorted(&self) -> Vec<&DrinkPreset> {
        let mut presets: Vec<_> = self.presets.values().collect();
        presets.sort_by(|a, b| a.id.cmp(&b.id));
        presets
    }

    /// Resolve a `<preset>[:count]` spec into a raw drink
    ///
    /// The count defaults to 1.
    pub fn resolve_spec(&self, spec: &str) -> Result<RawDrink> {
        let (id, count) = match spec.split_once(':') {
            Some((id, count)) => (id, parse_count(spec, count)?),
            None => (spec, 1),
        };
        Ok(self.get(id.trim())?.to_raw(count))
    }

    /// Validate the catalog
    ///
    /// Returns a list of validation errors (empty if valid)
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (key, preset) in &self.presets {
            if key != &preset.id {
                errors.push(format!(
                    "Preset keyed as {} has id {}",
                    key, preset.id
                ));
            }
            if preset.id.trim().is_empty() {
                errors.push("Preset with empty id".to_string());
            }
            if !(preset.volume_ml > 0.0) {
                errors.push(format!(
                    "Preset {} has non-positive volume {}",
                    preset.id, preset.volume_ml
                ));
            }
            if !(0.0..=100.0).contains(&preset.percent) {
                errors.push(format!(
                    "Preset {} has percent {} outside 0-100",
                    preset.id, preset.percent
                ));
            }
        }

        errors
    }
}

/// Parse a `<volumeMl>:<percent>[:count]` spec into a raw drink
pub fn parse_custom_spec(spec: &str) -> Result<RawDrink> {
    let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
    let (volume, percent, count) = match parts.as_slice() {
        [volume, percent] => (*volume, *percent, 1),
        [volume, percent, count] => (*volume, *percent, parse_count(spec, count)?),
        _ => {
            return Err(Error::DrinkSpec(format!(
                "{} (expected <volumeMl>:<percent>[:count])",
                spec
            )))
        }
    };

    let volume_ml: f64 = volume
        .parse()
        .map_err(|_| Error::DrinkSpec(format!("{}: bad volume {:?}", spec, volume)))?;
    let percent: f64 = percent
        .trim_end_matches('%')
        .parse()
        .map_err(|_| Error::DrinkSpec(format!("{}: bad percent {:?}", spec, percent)))?;

    Ok(RawDrink {
        id: None,
        label: None,
        volume_ml,
        percent,
        count: f64::from(count),
    })
}

fn parse_count(spec: &str, count: &str) -> Result<u32> {
    count
        .trim()
        .parse()
        .map_err(|_| Error::DrinkSpec(format!("{}: bad count {:?}", spec, count)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_presets();
        assert_eq!(catalog.presets.len(), 5);
        let beer = catalog.get("large_beer").unwrap();
        assert_eq!(beer.volume_ml, 500.0);
        assert_eq!(beer.percent, 5.0);
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = get_default_presets();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_unknown_preset() {
        let catalog = build_default_presets();
        assert!(matches!(catalog.get("mead"), Err(Error::Preset(_))));
    }

    #[test]
    fn test_custom_presets_merge_and_override() {
        let custom = vec![
            CustomPreset {
                id: "cider".into(),
                label: "Cider 400ml".into(),
                volume_ml: 400.0,
                percent: 4.5,
            },
            CustomPreset {
                id: "wine".into(),
                label: "Wine glass 150ml".into(),
                volume_ml: 150.0,
                percent: 13.0,
            },
        ];
        let catalog = PresetCatalog::with_custom(&custom);

        assert_eq!(catalog.presets.len(), 6);
        assert_eq!(catalog.get("cider").unwrap().percent, 4.5);
        assert_eq!(catalog.get("wine").unwrap().volume_ml, 150.0);
        // The cached default stays untouched
        assert_eq!(get_default_presets().get("wine").unwrap().volume_ml, 175.0);
    }

    #[test]
    fn test_invalid_custom_preset_reported() {
        let custom = vec![CustomPreset {
            id: "broken".into(),
            label: "Broken".into(),
            volume_ml: -5.0,
            percent: 140.0,
        }];
        let errors = PresetCatalog::with_custom(&custom).validate();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_sorted_listing_is_stable() {
        let catalog = build_default_presets();
        let ids: Vec<_> = catalog.sorted().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["champagne", "large_beer", "small_beer", "spirit", "wine"]
        );
    }

    #[test]
    fn test_resolve_spec() {
        let catalog = build_default_presets();

        let drink = catalog.resolve_spec("spirit:3").unwrap();
        assert_eq!(drink.volume_ml, 50.0);
        assert_eq!(drink.percent, 40.0);
        assert_eq!(drink.count, 3.0);
        assert_eq!(drink.id.as_deref(), Some("spirit"));

        let drink = catalog.resolve_spec("wine").unwrap();
        assert_eq!(drink.count, 1.0);

        assert!(matches!(catalog.resolve_spec("mead:2"), Err(Error::Preset(_))));
        assert!(matches!(
            catalog.resolve_spec("wine:two"),
            Err(Error::DrinkSpec(_))
        ));
    }

    #[test]
    fn test_parse_custom_spec() {
        let drink = parse_custom_spec("330:4.5%:2").unwrap();
        assert_eq!(drink.volume_ml, 330.0);
        assert_eq!(drink.percent, 4.5);
        assert_eq!(drink.count, 2.0);

        let drink = parse_custom_spec("40:38").unwrap();
        assert_eq!(drink.count, 1.0);

        for bad in ["330", "a:5", "330:x", "330:5:-1", "1:2:3:4"] {
            assert!(
                matches!(parse_custom_spec(bad), Err(Error::DrinkSpec(_))),
                "{} should be rejected",
                bad
            );
        }
    }
}
