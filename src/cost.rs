//! Per-SKU economic parameters.
//!
//! A `CostProfile` is assembled from a shared defaults table and an
//! optional per-SKU override. Merging is field-by-field: an override that
//! only sets `unit_cost` still inherits the remaining fields from the
//! defaults. There is no process-wide default table; callers thread an
//! explicit `CostDefaults` value through construction.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Default cost parameters applied to SKUs without explicit overrides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct CostDefaults {
    /// Purchase cost per unit.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_unit_cost")]
    pub unit_cost: f64,
    /// Holding cost per unit ordered above mean demand.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_holding_cost")]
    pub holding_cost: f64,
    /// Penalty per unit of mean demand left uncovered.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_shortage_penalty")]
    pub shortage_penalty: f64,
    /// Storage volume per unit.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_unit_volume")]
    pub unit_volume: f64,
}

const fn default_unit_cost() -> f64 {
    10.0
}

const fn default_holding_cost() -> f64 {
    1.0
}

const fn default_shortage_penalty() -> f64 {
    5.0
}

const fn default_unit_volume() -> f64 {
    1.0
}

impl Default for CostDefaults {
    fn default() -> Self {
        Self {
            unit_cost: default_unit_cost(),
            holding_cost: default_holding_cost(),
            shortage_penalty: default_shortage_penalty(),
            unit_volume: default_unit_volume(),
        }
    }
}

/// Partial per-SKU cost override. Absent fields fall back to defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct CostOverride {
    /// Purchase cost per unit.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub unit_cost: Option<f64>,
    /// Holding cost per unit above mean demand.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub holding_cost: Option<f64>,
    /// Penalty per unit of uncovered mean demand.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub shortage_penalty: Option<f64>,
    /// Storage volume per unit.
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub unit_volume: Option<f64>,
}

impl CostOverride {
    /// Whether the override sets no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.unit_cost.is_none()
            && self.holding_cost.is_none()
            && self.shortage_penalty.is_none()
            && self.unit_volume.is_none()
    }
}

/// Fully resolved cost parameters for one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostProfile {
    /// SKU identifier.
    pub sku: String,
    /// Purchase cost per unit.
    pub unit_cost: f64,
    /// Holding cost per unit ordered above mean demand.
    pub holding_cost: f64,
    /// Penalty per unit of mean demand left uncovered.
    pub shortage_penalty: f64,
    /// Storage volume per unit.
    pub unit_volume: f64,
}

impl CostProfile {
    /// Resolve a profile from defaults and an optional override.
    ///
    /// Explicit override values win field-by-field; missing fields keep
    /// the default, never the whole record.
    #[must_use]
    pub fn merged(sku: &str, defaults: &CostDefaults, overrides: Option<&CostOverride>) -> Self {
        let ov = overrides.copied().unwrap_or_default();
        Self {
            sku: sku.to_string(),
            unit_cost: ov.unit_cost.unwrap_or(defaults.unit_cost),
            holding_cost: ov.holding_cost.unwrap_or(defaults.holding_cost),
            shortage_penalty: ov.shortage_penalty.unwrap_or(defaults.shortage_penalty),
            unit_volume: ov.unit_volume.unwrap_or(defaults.unit_volume),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_table() {
        let defaults = CostDefaults::default();
        assert!((defaults.unit_cost - 10.0).abs() < f64::EPSILON);
        assert!((defaults.holding_cost - 1.0).abs() < f64::EPSILON);
        assert!((defaults.shortage_penalty - 5.0).abs() < f64::EPSILON);
        assert!((defaults.unit_volume - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_merge_without_override_takes_defaults() {
        let profile = CostProfile::merged("A", &CostDefaults::default(), None);
        assert_eq!(profile.sku, "A");
        assert!((profile.unit_cost - 10.0).abs() < f64::EPSILON);
        assert!((profile.shortage_penalty - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_merge_is_field_by_field() {
        let ov = CostOverride {
            unit_cost: Some(25.0),
            shortage_penalty: Some(40.0),
            ..CostOverride::default()
        };
        let profile = CostProfile::merged("A", &CostDefaults::default(), Some(&ov));
        // Overridden fields win.
        assert!((profile.unit_cost - 25.0).abs() < f64::EPSILON);
        assert!((profile.shortage_penalty - 40.0).abs() < f64::EPSILON);
        // Untouched fields keep defaults even though the override record exists.
        assert!((profile.holding_cost - 1.0).abs() < f64::EPSILON);
        assert!((profile.unit_volume - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_explicit_zero_override_beats_default() {
        let ov = CostOverride {
            holding_cost: Some(0.0),
            ..CostOverride::default()
        };
        let profile = CostProfile::merged("A", &CostDefaults::default(), Some(&ov));
        assert!((profile.holding_cost - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_override_is_empty() {
        assert!(CostOverride::default().is_empty());
        let ov = CostOverride {
            unit_volume: Some(2.0),
            ..CostOverride::default()
        };
        assert!(!ov.is_empty());
    }

    #[test]
    fn test_defaults_yaml_partial_fill() {
        let defaults: CostDefaults = serde_yaml::from_str("unit_cost: 3.5").unwrap();
        assert!((defaults.unit_cost - 3.5).abs() < f64::EPSILON);
        assert!((defaults.holding_cost - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_override_fails_validation() {
        let ov = CostOverride {
            unit_cost: Some(-1.0),
            ..CostOverride::default()
        };
        assert!(ov.validate().is_err());
    }

    #[test]
    fn test_negative_defaults_fail_validation() {
        let defaults = CostDefaults {
            shortage_penalty: -5.0,
            ..CostDefaults::default()
        };
        assert!(defaults.validate().is_err());
    }
}
