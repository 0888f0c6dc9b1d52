//! Chart property definitions with defaults from chart.json
//!
//! chart.json is embedded at compile time and holds every property together
//! with its default value. Readers overlay user-set values on top of those
//! defaults, so no fallback values are scattered through the chart code.

use super::colors::parse_hex_color;
use super::error::{ChartError, Result};
use std::collections::HashMap;
use std::path::Path;

/// chart.json embedded at compile time
const CHART_JSON: &str = include_str!("../../chart.json");

/// Property definition from chart.json
#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub name: String,
    pub kind: PropertyKind,
    pub default_value: String,
    pub description: String,
    /// For EnumeratedProperty, the valid values
    pub valid_values: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    String,
    Enumerated,
}

/// Registry of all chart properties with their defaults from chart.json
#[derive(Debug, Default)]
pub struct PropertyRegistry {
    properties: HashMap<String, PropertyDef>,
}

impl PropertyRegistry {
    /// Parse a chart.json document and build the registry
    pub fn from_json(json: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(json)?;

        let properties_array = json["properties"]
            .as_array()
            .ok_or_else(|| ChartError::Config("missing 'properties' array".to_string()))?;

        let mut properties = HashMap::new();

        for prop in properties_array {
            let name = prop["name"]
                .as_str()
                .ok_or_else(|| ChartError::Config("property missing 'name'".to_string()))?
                .to_string();

            let kind = match prop["kind"].as_str() {
                Some("StringProperty") => PropertyKind::String,
                Some("EnumeratedProperty") => PropertyKind::Enumerated,
                other => {
                    return Err(ChartError::Config(format!(
                        "unknown kind {:?} for property '{}'",
                        other, name
                    )))
                }
            };

            let default_value = prop["defaultValue"].as_str().unwrap_or("").to_string();
            let description = prop["description"].as_str().unwrap_or("").to_string();

            let valid_values = if kind == PropertyKind::Enumerated {
                prop["values"].as_array().map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect()
                })
            } else {
                None
            };

            properties.insert(
                name.clone(),
                PropertyDef {
                    name,
                    kind,
                    default_value,
                    description,
                    valid_values,
                },
            );
        }

        Ok(Self { properties })
    }

    /// Get the default value for a property
    pub fn get_default(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.default_value.as_str())
    }

    /// Get the property definition
    pub fn get_property(&self, name: &str) -> Option<&PropertyDef> {
        self.properties.get(name)
    }

    /// All known property names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.properties.keys().map(|k| k.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Check if a value is valid for an enumerated property
    pub fn is_valid_enum_value(&self, name: &str, value: &str) -> bool {
        self.properties
            .get(name)
            .and_then(|p| p.valid_values.as_ref())
            .map(|values| values.iter().any(|v| v.eq_ignore_ascii_case(value)))
            .unwrap_or(true) // Non-enumerated properties accept any value
    }
}

static REGISTRY: std::sync::OnceLock<PropertyRegistry> = std::sync::OnceLock::new();

/// Get the global property registry
pub fn registry() -> &'static PropertyRegistry {
    REGISTRY.get_or_init(|| {
        PropertyRegistry::from_json(CHART_JSON).unwrap_or_else(|e| {
            tracing::error!("failed to load chart.json: {}", e);
            PropertyRegistry::default()
        })
    })
}

/// Typed property reader
///
/// User-set values take precedence; everything else comes from chart.json.
#[derive(Debug, Clone, Default)]
pub struct PropertyReader {
    user_values: HashMap<String, String>,
}

impl PropertyReader {
    pub fn new(user_values: HashMap<String, String>) -> Self {
        let user_values = user_values
            .into_iter()
            .filter(|(_, v)| !v.is_empty()) // Empty = not set
            .collect();
        Self { user_values }
    }

    /// Load user values from a JSON object of `name -> value`
    ///
    /// Numbers and booleans are accepted and stored in their textual form.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&text)?;
        let object = json.as_object().ok_or_else(|| {
            ChartError::Config(format!("{} is not a JSON object", path.display()))
        })?;

        let user_values = object
            .iter()
            .map(|(name, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), value)
            })
            .collect();

        Ok(Self::new(user_values))
    }

    /// Set (or replace) a user value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if registry().get_property(&name).is_none() {
            tracing::warn!(property = %name, "unknown property, value will be ignored");
        }
        self.user_values.insert(name, value.into());
    }

    /// Get string property (user value or default from chart.json)
    pub fn get_string(&self, name: &str) -> String {
        if let Some(value) = self.user_values.get(name) {
            return value.clone();
        }
        registry().get_default(name).unwrap_or("").to_string()
    }

    /// Get enumerated property with validation
    pub fn get_enum(&self, name: &str) -> String {
        let reg = registry();
        let default = reg.get_default(name).unwrap_or("");

        if let Some(value) = self.user_values.get(name) {
            if reg.is_valid_enum_value(name, value) {
                return value.to_lowercase();
            }
            let valid_values = reg
                .get_property(name)
                .and_then(|p| p.valid_values.as_ref())
                .map(|v| v.join(", "))
                .unwrap_or_default();
            tracing::warn!(
                "Invalid value '{}' for property '{}'. Valid values: [{}]. Using default: '{}'",
                value,
                name,
                valid_values,
                default
            );
        }

        default.to_string()
    }

    /// Get optional string property (None if empty)
    pub fn get_optional_string(&self, name: &str) -> Option<String> {
        let value = self.get_string(name);
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Get f64 property, falling back to the default on parse failure
    pub fn get_f64(&self, name: &str) -> f64 {
        self.get_parsed(name, 0.0)
    }

    /// Get f64 property with range validation
    pub fn get_f64_in_range(&self, name: &str, min: f64, max: f64) -> f64 {
        let value = self.get_f64(name);
        if value >= min && value <= max {
            return value;
        }
        let default = Self::default_as(name, 0.0);
        tracing::warn!(
            "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
            value,
            name,
            min,
            max,
            default
        );
        default
    }

    /// Get usize property, falling back to the default on parse failure
    pub fn get_usize(&self, name: &str) -> usize {
        self.get_parsed(name, 0)
    }

    /// Get u64 property, falling back to the default on parse failure
    pub fn get_u64(&self, name: &str) -> u64 {
        self.get_parsed(name, 0)
    }

    /// Get u64 property with range validation
    pub fn get_u64_in_range(&self, name: &str, min: u64, max: u64) -> u64 {
        let value = self.get_u64(name);
        if (min..=max).contains(&value) {
            return value;
        }
        let default = Self::default_as(name, 0u64).clamp(min, max);
        tracing::warn!(
            "Value {} for property '{}' out of range [{}, {}]. Using default: {}",
            value,
            name,
            min,
            max,
            default
        );
        default
    }

    /// Get optional u64 property (None if empty or unparseable)
    pub fn get_optional_u64(&self, name: &str) -> Option<u64> {
        let value = self.get_optional_string(name)?;
        match value.trim().parse::<u64>() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Invalid integer value '{}' for property '{}'", value, name);
                None
            }
        }
    }

    /// Get a hex colour property (`#rrggbb`)
    pub fn get_color(&self, name: &str) -> [u8; 3] {
        let value = self.get_string(name);
        if let Some(rgb) = parse_hex_color(&value) {
            return rgb;
        }
        let default = registry()
            .get_default(name)
            .and_then(parse_hex_color)
            .unwrap_or([0, 0, 0]);
        tracing::warn!(
            "Invalid colour '{}' for property '{}'. Using default: {:?}",
            value,
            name,
            default
        );
        default
    }

    /// Parse a comma separated list of four numbers: top,right,bottom,left
    pub fn get_quad(&self, name: &str) -> [f64; 4] {
        fn parse(s: &str) -> Option<[f64; 4]> {
            let parts = s
                .split(',')
                .map(|p| p.trim().parse::<f64>().ok())
                .collect::<Option<Vec<f64>>>()?;
            parts.try_into().ok()
        }

        let value = self.get_string(name);
        if let Some(quad) = parse(&value) {
            return quad;
        }
        let default = registry()
            .get_default(name)
            .and_then(parse)
            .unwrap_or([0.0; 4]);
        tracing::warn!(
            "Invalid value '{}' for property '{}', expected 'top,right,bottom,left'. Using default: {:?}",
            value,
            name,
            default
        );
        default
    }

    fn get_parsed<T>(&self, name: &str, fallback: T) -> T
    where
        T: std::str::FromStr + Copy + std::fmt::Display,
    {
        let default = Self::default_as(name, fallback);
        let value = self.get_string(name);
        if value.is_empty() {
            return default;
        }

        match value.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    "Invalid numeric value '{}' for property '{}'. Using default: {}",
                    value,
                    name,
                    default
                );
                default
            }
        }
    }

    fn default_as<T: std::str::FromStr>(name: &str, fallback: T) -> T {
        registry()
            .get_default(name)
            .and_then(|d| d.parse::<T>().ok())
            .unwrap_or(fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_loads() {
        let reg = registry();
        assert!(reg.get_property("race.top.n").is_some());
        assert!(reg.get_property("heatmap.color.free").is_some());
        assert!(reg.get_property("render.output").is_some());
    }

    #[test]
    fn test_registry_defaults() {
        let reg = registry();
        assert_eq!(reg.get_default("race.top.n"), Some("12"));
        assert_eq!(reg.get_default("heatmap.duration.ms"), Some("2000"));
        assert_eq!(reg.get_default("render.output"), Some("frames"));
    }

    #[test]
    fn test_enum_validation() {
        let reg = registry();
        assert!(reg.is_valid_enum_value("render.output", "frames"));
        assert!(reg.is_valid_enum_value("render.output", "NONE"));
        assert!(!reg.is_valid_enum_value("render.output", "png"));
    }

    #[test]
    fn test_reader_defaults() {
        let reader = PropertyReader::default();
        assert_eq!(reader.get_usize("race.top.n"), 12);
        assert_eq!(reader.get_f64("race.year.step"), 0.1);
        assert_eq!(reader.get_color("heatmap.color.load"), [255, 0, 0]);
        assert_eq!(reader.get_quad("heatmap.margin"), [0.0, 0.0, 50.0, 50.0]);
        assert_eq!(reader.get_optional_u64("race.seed"), None);
    }

    #[test]
    fn test_reader_invalid_values_fall_back() {
        let mut reader = PropertyReader::default();
        reader.set("race.top.n", "many");
        reader.set("heatmap.color.free", "green");
        reader.set("render.output", "png");
        reader.set("race.margin", "1,2,3");

        assert_eq!(reader.get_usize("race.top.n"), 12);
        assert_eq!(reader.get_color("heatmap.color.free"), [0, 255, 0]);
        assert_eq!(reader.get_enum("render.output"), "frames");
        assert_eq!(reader.get_quad("race.margin"), [80.0, 0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_reader_user_values_win() {
        let mut reader = PropertyReader::default();
        reader.set("race.top.n", "5");
        reader.set("heatmap.seed", "42");
        reader.set("render.output", "None");

        assert_eq!(reader.get_usize("race.top.n"), 5);
        assert_eq!(reader.get_optional_u64("heatmap.seed"), Some(42));
        assert_eq!(reader.get_enum("render.output"), "none");
    }

    #[test]
    fn test_f64_in_range() {
        let mut reader = PropertyReader::default();
        reader.set("heatmap.value.max", "-5");
        assert_eq!(
            reader.get_f64_in_range("heatmap.value.max", 1.0, f64::MAX),
            100.0
        );
    }

    #[test]
    fn test_u64_in_range() {
        let mut reader = PropertyReader::default();
        reader.set("race.tick.ms", "18446744073709551615");
        assert_eq!(reader.get_u64_in_range("race.tick.ms", 1, 3_600_000), 500);
        reader.set("race.tick.ms", "0");
        assert_eq!(reader.get_u64_in_range("race.tick.ms", 1, 3_600_000), 500);
        reader.set("race.tick.ms", "250");
        assert_eq!(reader.get_u64_in_range("race.tick.ms", 1, 3_600_000), 250);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("props.json");
        std::fs::write(&path, r#"{"race.top.n": 3, "race.title": "Brands", "race.seed": ""}"#)
            .unwrap();

        let reader = PropertyReader::from_json_file(&path).unwrap();
        assert_eq!(reader.get_usize("race.top.n"), 3);
        assert_eq!(reader.get_string("race.title"), "Brands");
        assert_eq!(reader.get_optional_u64("race.seed"), None);
    }

    #[test]
    fn test_from_json_file_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("props.json");
        std::fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(
            PropertyReader::from_json_file(&path),
            Err(ChartError::Config(_))
        ));
    }
}
