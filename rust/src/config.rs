//! Configuration types for the graph engine.
//!
//! Every table the engine consults (equipment vocabulary, unit aliases) lives
//! here and is passed in explicitly; nothing is loaded lazily or held globally.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;
use thiserror::Error;

// Note: We use std HashMap here for PyO3 interface compatibility

const DEFAULT_EQUIPMENT_KEYWORDS: &[&str] = &["preheat", "préchauffer", "allumer", "préparer le four"];

const DEFAULT_UNIT_ADJECTIVES: &[&str] = &[
    "small", "large", "big", "medium", "heaped", "heaping", "rounded", "level", "generous", "good",
    "thick", "thin", "whole", "fresh", "scant", "packed", "loosely", "tightly", "firmly", "lightly",
];

const DEFAULT_WEIGHT_VOLUME_UNITS: &[&str] = &["g", "kg", "ml", "l", "cl", "dl", "oz", "lb"];

const DEFAULT_UNIT_ALIASES: &[(&str, &str)] = &[
    // Spoons
    ("tablespoon", "tbsp"),
    ("tablespoons", "tbsp"),
    ("teaspoon", "tsp"),
    ("teaspoons", "tsp"),
    ("dessertspoon", "tsp"),
    ("dessertspoons", "tsp"),
    // Volume
    ("cups", "cup"),
    ("liter", "l"),
    ("liters", "l"),
    ("litre", "l"),
    ("litres", "l"),
    ("milliliter", "ml"),
    ("milliliters", "ml"),
    ("millilitre", "ml"),
    ("millilitres", "ml"),
    ("centiliter", "cl"),
    ("centiliters", "cl"),
    ("deciliter", "dl"),
    ("deciliters", "dl"),
    // Weight
    ("gram", "g"),
    ("grams", "g"),
    ("kilogram", "kg"),
    ("kilograms", "kg"),
    ("ounce", "oz"),
    ("ounces", "oz"),
    ("pound", "lb"),
    ("pounds", "lb"),
    // Countable
    ("cloves", "clove"),
    ("sprigs", "sprig"),
    ("slices", "slice"),
    ("pieces", "piece"),
    ("bunches", "bunch"),
    ("leaves", "leaf"),
    ("stalks", "stalk"),
    ("heads", "head"),
    ("bulbs", "bulb"),
    ("spears", "spear"),
    ("sheets", "sheet"),
    ("strips", "strip"),
    ("filet", "fillet"),
    ("fillets", "fillet"),
    ("filets", "fillet"),
    ("cans", "can"),
    ("jars", "jar"),
    ("packets", "packet"),
    ("package", "packet"),
    ("packages", "packet"),
    ("sticks", "stick"),
    ("knobs", "knob"),
    ("handfuls", "handful"),
    ("pinches", "pinch"),
    ("drops", "drop"),
    ("squares", "square"),
    ("cubes", "cube"),
];

/// Invalid engine configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite number of minutes >= 0, got {value}")]
    InvalidFallbackMinutes { field: &'static str, value: f64 },
}

/// Configuration for repair, validation and scheduling.
#[pyclass]
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Action-text keywords marking a step as equipment-only (matched as lowercase substrings)
    #[pyo3(get, set)]
    pub equipment_keywords: Vec<String>,
    /// Largest edit distance the repair pass accepts as a near miss
    #[pyo3(get, set)]
    pub max_fuzzy_distance: usize,
    /// Duration assumed for an ordinary step without a usable duration
    #[pyo3(get, set)]
    pub default_step_minutes: f64,
    /// Duration assumed for an equipment-only step without a usable duration
    #[pyo3(get, set)]
    pub equipment_step_minutes: f64,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            equipment_keywords: DEFAULT_EQUIPMENT_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            max_fuzzy_distance: 3,
            default_step_minutes: 5.0,
            equipment_step_minutes: 0.0,
            verbosity: 0,
        }
    }
}

impl EngineConfig {
    /// Whether a step's action text sets up equipment rather than transforming food.
    pub fn is_equipment_action(&self, action: &str) -> bool {
        let action = action.to_lowercase();
        self.equipment_keywords
            .iter()
            .any(|kw| !kw.is_empty() && action.contains(&kw.to_lowercase()))
    }

    /// Check the fallback durations; both feed the critical path recurrence directly.
    pub fn check(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("default_step_minutes", self.default_step_minutes),
            ("equipment_step_minutes", self.equipment_step_minutes),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidFallbackMinutes { field, value });
            }
        }
        Ok(())
    }
}

#[pymethods]
impl EngineConfig {
    #[new]
    #[pyo3(signature = (
        equipment_keywords=None,
        max_fuzzy_distance=None,
        default_step_minutes=None,
        equipment_step_minutes=None,
        verbosity=None
    ))]
    fn new(
        equipment_keywords: Option<Vec<String>>,
        max_fuzzy_distance: Option<usize>,
        default_step_minutes: Option<f64>,
        equipment_step_minutes: Option<f64>,
        verbosity: Option<u8>,
    ) -> PyResult<Self> {
        let defaults = Self::default();
        let config = Self {
            equipment_keywords: equipment_keywords.unwrap_or(defaults.equipment_keywords),
            max_fuzzy_distance: max_fuzzy_distance.unwrap_or(defaults.max_fuzzy_distance),
            default_step_minutes: default_step_minutes.unwrap_or(defaults.default_step_minutes),
            equipment_step_minutes: equipment_step_minutes
                .unwrap_or(defaults.equipment_step_minutes),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        };
        config
            .check()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(config)
    }

    fn __repr__(&self) -> String {
        format!(
            "EngineConfig(equipment_keywords={:?}, max_fuzzy_distance={}, default_step_minutes={})",
            self.equipment_keywords, self.max_fuzzy_distance, self.default_step_minutes
        )
    }
}

/// Tables used by unit normalization.
#[pyclass]
#[derive(Clone, Debug)]
pub struct UnitConfig {
    /// Quantity adjectives stripped from multi-word units ("heaped", "small", ...)
    #[pyo3(get, set)]
    pub adjectives: Vec<String>,
    /// Alias -> canonical unit ("tablespoons" -> "tbsp")
    #[pyo3(get, set)]
    pub aliases: HashMap<String, String>,
    /// Canonical weight/volume units that short-circuit a compound unit ("g bulbs" -> "g")
    #[pyo3(get, set)]
    pub weight_volume_units: Vec<String>,
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self {
            adjectives: DEFAULT_UNIT_ADJECTIVES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            aliases: DEFAULT_UNIT_ALIASES
                .iter()
                .map(|(alias, canonical)| (alias.to_string(), canonical.to_string()))
                .collect(),
            weight_volume_units: DEFAULT_WEIGHT_VOLUME_UNITS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl UnitConfig {
    pub fn is_adjective(&self, word: &str) -> bool {
        self.adjectives.iter().any(|a| a == word)
    }

    pub fn is_weight_volume_unit(&self, word: &str) -> bool {
        self.weight_volume_units.iter().any(|u| u == word)
    }

    pub fn alias(&self, phrase: &str) -> Option<&str> {
        self.aliases.get(phrase).map(|s| s.as_str())
    }
}

#[pymethods]
impl UnitConfig {
    #[new]
    #[pyo3(signature = (adjectives=None, aliases=None, weight_volume_units=None))]
    fn new(
        adjectives: Option<Vec<String>>,
        aliases: Option<HashMap<String, String>>,
        weight_volume_units: Option<Vec<String>>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            adjectives: adjectives.unwrap_or(defaults.adjectives),
            aliases: aliases.unwrap_or(defaults.aliases),
            weight_volume_units: weight_volume_units.unwrap_or(defaults.weight_volume_units),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "UnitConfig(adjectives={}, aliases={}, weight_volume_units={:?})",
            self.adjectives.len(),
            self.aliases.len(),
            self.weight_volume_units
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_fuzzy_distance, 3);
        assert!((config.default_step_minutes - 5.0).abs() < 1e-9);
        assert!(config.equipment_step_minutes.abs() < 1e-9);
        assert_eq!(config.verbosity, 0);
    }

    #[test]
    fn test_equipment_detection_is_case_insensitive() {
        let config = EngineConfig::default();
        assert!(config.is_equipment_action("Preheat the oven to 200°C"));
        assert!(config.is_equipment_action("Préchauffer le four à 180°C"));
        assert!(!config.is_equipment_action("Chop the onions"));
    }

    #[test]
    fn test_equipment_keywords_are_injectable() {
        let config = EngineConfig {
            equipment_keywords: vec!["vorheizen".to_string()],
            ..EngineConfig::default()
        };
        assert!(config.is_equipment_action("Backofen vorheizen"));
        assert!(!config.is_equipment_action("Preheat the oven"));
    }

    #[test]
    fn test_fallback_minutes_checked() {
        assert_eq!(EngineConfig::default().check(), Ok(()));

        let negative = EngineConfig {
            default_step_minutes: -5.0,
            ..EngineConfig::default()
        };
        assert_eq!(
            negative.check(),
            Err(ConfigError::InvalidFallbackMinutes {
                field: "default_step_minutes",
                value: -5.0,
            })
        );

        let nan = EngineConfig {
            equipment_step_minutes: f64::NAN,
            ..EngineConfig::default()
        };
        assert!(matches!(
            nan.check(),
            Err(ConfigError::InvalidFallbackMinutes {
                field: "equipment_step_minutes",
                ..
            })
        ));

        let infinite = EngineConfig {
            default_step_minutes: f64::INFINITY,
            ..EngineConfig::default()
        };
        assert!(infinite.check().is_err());
    }

    #[test]
    fn test_unit_config_tables() {
        let units = UnitConfig::default();
        assert_eq!(units.alias("tablespoons"), Some("tbsp"));
        assert_eq!(units.alias("filets"), Some("fillet"));
        assert!(units.is_adjective("heaped"));
        assert!(units.is_weight_volume_unit("cl"));
        assert!(!units.is_weight_volume_unit("cup"));
    }
}
