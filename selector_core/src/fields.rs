//! # Field Store Data
//!
//! The [`FieldSet`] is the authoritative record of what the user has entered
//! into the connection form. It is deliberately dumb: merging an update never
//! validates or coerces anything. Derivation and validation react to merges
//! from the [`session`](crate::session) layer.
//!
//! ## Structure
//!
//! ```text
//! FieldSet
//! ├── geometry: shaft_diameter, hub_length, shaft_type, inner/outer diameters
//! ├── materials: shaft_material, hub_material
//! ├── loading: has_bending, required_torque, safety_factor
//! ├── overrides: mu_override, spline_major_diameter_override, spline_tooth_count_override
//! ├── surface_condition
//! └── user_preferences: eight weights in [0, 1]
//! ```
//!
//! ## Example
//!
//! ```rust
//! use selector_core::fields::{FieldSet, FieldUpdate, ShaftType};
//!
//! let mut fields = FieldSet::default();
//! fields.merge(&FieldUpdate::new().with_shaft_type(ShaftType::Hollow).with_shaft_inner_diameter(Some(20.0)));
//!
//! assert_eq!(fields.shaft_type, ShaftType::Hollow);
//! assert_eq!(fields.shaft_inner_diameter, Some(20.0));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{SelectorError, SelectorResult};

/// Material preselected before the material list arrives
pub const DEFAULT_MATERIAL: &str = "Steel C45";

/// Default weight for every preference slider
pub const DEFAULT_PREFERENCE: f64 = 0.5;

/// Shaft cross-section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShaftType {
    #[default]
    Solid,
    Hollow,
}

impl ShaftType {
    pub const ALL: [ShaftType; 2] = [ShaftType::Solid, ShaftType::Hollow];

    /// Wire value ("solid" / "hollow")
    pub fn key(&self) -> &'static str {
        match self {
            ShaftType::Solid => "solid",
            ShaftType::Hollow => "hollow",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        ShaftType::ALL
            .into_iter()
            .find(|t| t.key().eq_ignore_ascii_case(s.trim()))
    }
}

/// Contact surface condition used for the friction coefficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceCondition {
    #[default]
    Dry,
    Oiled,
}

impl SurfaceCondition {
    pub const ALL: [SurfaceCondition; 2] = [SurfaceCondition::Dry, SurfaceCondition::Oiled];

    /// Wire value ("dry" / "oiled")
    pub fn key(&self) -> &'static str {
        match self {
            SurfaceCondition::Dry => "dry",
            SurfaceCondition::Oiled => "oiled",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        SurfaceCondition::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(s.trim()))
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// Named selection criteria weighted by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreferenceKey {
    Ease,
    Movement,
    Cost,
    Bidirectional,
    Vibration,
    Speed,
    Maintenance,
    Durability,
}

impl PreferenceKey {
    /// All preference keys, in form order
    pub const ALL: [PreferenceKey; 8] = [
        PreferenceKey::Ease,
        PreferenceKey::Movement,
        PreferenceKey::Bidirectional,
        PreferenceKey::Maintenance,
        PreferenceKey::Vibration,
        PreferenceKey::Speed,
        PreferenceKey::Durability,
        PreferenceKey::Cost,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PreferenceKey::Ease => "ease",
            PreferenceKey::Movement => "movement",
            PreferenceKey::Cost => "cost",
            PreferenceKey::Bidirectional => "bidirectional",
            PreferenceKey::Vibration => "vibration",
            PreferenceKey::Speed => "speed",
            PreferenceKey::Maintenance => "maintenance",
            PreferenceKey::Durability => "durability",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            PreferenceKey::Ease => "Ease of Assembly / Disassembly",
            PreferenceKey::Movement => "Frequent Axial Movement",
            PreferenceKey::Cost => "Low Manufacturing Cost",
            PreferenceKey::Bidirectional => "Bidirectional / Reversing Torque",
            PreferenceKey::Vibration => "Vibration Resistance",
            PreferenceKey::Speed => "High-Speed Suitability",
            PreferenceKey::Maintenance => "Easy Maintenance / Repair",
            PreferenceKey::Durability => "Durability / Fatigue Life",
        }
    }

    /// Parse "ease", "pref_ease" or "Ease"
    pub fn from_str_flexible(s: &str) -> SelectorResult<Self> {
        let normalized = s.trim().to_lowercase();
        let name = normalized.strip_prefix("pref_").unwrap_or(&normalized);
        PreferenceKey::ALL
            .into_iter()
            .find(|k| k.key() == name)
            .ok_or_else(|| SelectorError::unknown_field(s))
    }
}

/// Preference weights, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub ease: f64,
    pub movement: f64,
    pub cost: f64,
    pub bidirectional: f64,
    pub vibration: f64,
    pub speed: f64,
    pub maintenance: f64,
    pub durability: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            ease: DEFAULT_PREFERENCE,
            movement: DEFAULT_PREFERENCE,
            cost: DEFAULT_PREFERENCE,
            bidirectional: DEFAULT_PREFERENCE,
            vibration: DEFAULT_PREFERENCE,
            speed: DEFAULT_PREFERENCE,
            maintenance: DEFAULT_PREFERENCE,
            durability: DEFAULT_PREFERENCE,
        }
    }
}

impl Preferences {
    pub fn get(&self, key: PreferenceKey) -> f64 {
        match key {
            PreferenceKey::Ease => self.ease,
            PreferenceKey::Movement => self.movement,
            PreferenceKey::Cost => self.cost,
            PreferenceKey::Bidirectional => self.bidirectional,
            PreferenceKey::Vibration => self.vibration,
            PreferenceKey::Speed => self.speed,
            PreferenceKey::Maintenance => self.maintenance,
            PreferenceKey::Durability => self.durability,
        }
    }

    /// Set a weight. Values outside the slider domain [0, 1] are ignored.
    pub fn set(&mut self, key: PreferenceKey, value: f64) {
        if !(0.0..=1.0).contains(&value) {
            return;
        }
        let slot = match key {
            PreferenceKey::Ease => &mut self.ease,
            PreferenceKey::Movement => &mut self.movement,
            PreferenceKey::Cost => &mut self.cost,
            PreferenceKey::Bidirectional => &mut self.bidirectional,
            PreferenceKey::Vibration => &mut self.vibration,
            PreferenceKey::Speed => &mut self.speed,
            PreferenceKey::Maintenance => &mut self.maintenance,
            PreferenceKey::Durability => &mut self.durability,
        };
        *slot = value;
    }
}

// ============================================================================
// Field catalogue
// ============================================================================

/// Every editable scalar field of the form, keyed by its wire name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    ShaftDiameter,
    HubLength,
    ShaftMaterial,
    HubMaterial,
    ShaftType,
    HasBending,
    RequiredTorque,
    SafetyFactor,
    HubOuterDiameter,
    ShaftInnerDiameter,
    MuOverride,
    SplineMajorDiameterOverride,
    SplineToothCountOverride,
    SurfaceCondition,
}

impl FieldName {
    pub const ALL: [FieldName; 14] = [
        FieldName::ShaftDiameter,
        FieldName::HubLength,
        FieldName::ShaftMaterial,
        FieldName::HubMaterial,
        FieldName::ShaftType,
        FieldName::HasBending,
        FieldName::RequiredTorque,
        FieldName::SafetyFactor,
        FieldName::HubOuterDiameter,
        FieldName::ShaftInnerDiameter,
        FieldName::MuOverride,
        FieldName::SplineMajorDiameterOverride,
        FieldName::SplineToothCountOverride,
        FieldName::SurfaceCondition,
    ];

    /// Wire key used in requests, diagnostics and snapshots
    pub fn key(&self) -> &'static str {
        match self {
            FieldName::ShaftDiameter => "shaft_diameter",
            FieldName::HubLength => "hub_length",
            FieldName::ShaftMaterial => "shaft_material",
            FieldName::HubMaterial => "hub_material",
            FieldName::ShaftType => "shaft_type",
            FieldName::HasBending => "has_bending",
            FieldName::RequiredTorque => "required_torque",
            FieldName::SafetyFactor => "safety_factor",
            FieldName::HubOuterDiameter => "hub_outer_diameter",
            FieldName::ShaftInnerDiameter => "shaft_inner_diameter",
            FieldName::MuOverride => "mu_override",
            FieldName::SplineMajorDiameterOverride => "spline_major_diameter_override",
            FieldName::SplineToothCountOverride => "spline_tooth_count_override",
            FieldName::SurfaceCondition => "surface_condition",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            FieldName::ShaftDiameter => "Shaft diameter d [mm]",
            FieldName::HubLength => "Hub length L [mm]",
            FieldName::ShaftMaterial => "Shaft material",
            FieldName::HubMaterial => "Hub material",
            FieldName::ShaftType => "Shaft type",
            FieldName::HasBending => "Bending moment present",
            FieldName::RequiredTorque => "Required torque [Nmm]",
            FieldName::SafetyFactor => "Safety factor",
            FieldName::HubOuterDiameter => "Hub outer diameter [mm]",
            FieldName::ShaftInnerDiameter => "Shaft inner diameter [mm]",
            FieldName::MuOverride => "Friction coefficient μ override",
            FieldName::SplineMajorDiameterOverride => "Spline major diameter override [mm]",
            FieldName::SplineToothCountOverride => "Spline tooth count override",
            FieldName::SurfaceCondition => "Surface condition",
        }
    }

    /// Parse from common string representations ("hub_length", "hub-length", "Hub Length")
    pub fn from_str_flexible(s: &str) -> SelectorResult<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        FieldName::ALL
            .into_iter()
            .find(|f| f.key() == normalized)
            .ok_or_else(|| SelectorError::unknown_field(s))
    }

    pub fn is_numeric(&self) -> bool {
        self.input_bounds().is_some()
    }

    /// Fields whose empty input means "absent"
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            FieldName::RequiredTorque
                | FieldName::HubOuterDiameter
                | FieldName::ShaftInnerDiameter
                | FieldName::MuOverride
                | FieldName::SplineMajorDiameterOverride
                | FieldName::SplineToothCountOverride
        )
    }

    /// Input bounds applied when a numeric field is committed
    pub fn input_bounds(&self) -> Option<(f64, f64)> {
        match self {
            FieldName::ShaftDiameter => Some((0.0, 9_999.0)),
            FieldName::HubLength => Some((0.0, 99_999.0)),
            FieldName::RequiredTorque => Some((0.0, 1e12)),
            FieldName::SafetyFactor => Some((0.0, 999.0)),
            FieldName::ShaftInnerDiameter => Some((0.0, 99_999.0)),
            FieldName::HubOuterDiameter => Some((0.0, 999_999.0)),
            FieldName::MuOverride => Some((0.0, 1.0)),
            FieldName::SplineMajorDiameterOverride => Some((0.0, 999_999.0)),
            FieldName::SplineToothCountOverride => Some((0.0, 999_999.0)),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ============================================================================
// FieldSet
// ============================================================================

/// Current user input of the connection form.
///
/// ## JSON Example
///
/// ```json
/// {
///   "shaft_diameter": 30.0,
///   "hub_length": 30.0,
///   "shaft_material": "Steel C45",
///   "hub_material": "Steel C45",
///   "shaft_type": "solid",
///   "has_bending": true,
///   "required_torque": 50000.0,
///   "safety_factor": 1.5,
///   "hub_outer_diameter": null,
///   "shaft_inner_diameter": null,
///   "mu_override": null,
///   "spline_major_diameter_override": null,
///   "spline_tooth_count_override": null,
///   "surface_condition": "dry",
///   "user_preferences": { "ease": 0.5, "movement": 0.5, "...": 0.5 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    /// Nominal shaft diameter d in mm
    pub shaft_diameter: f64,

    /// Hub length L in mm (derived from d until the user edits it)
    pub hub_length: f64,

    pub shaft_material: String,
    pub hub_material: String,
    pub shaft_type: ShaftType,

    /// Whether the shaft also carries a bending moment
    pub has_bending: bool,

    /// Required torque in Nmm
    pub required_torque: Option<f64>,

    pub safety_factor: f64,

    /// Hub outer diameter in mm
    pub hub_outer_diameter: Option<f64>,

    /// Bore of a hollow shaft in mm
    pub shaft_inner_diameter: Option<f64>,

    /// Manual friction coefficient μ
    pub mu_override: Option<f64>,

    pub spline_major_diameter_override: Option<f64>,
    pub spline_tooth_count_override: Option<f64>,
    pub surface_condition: SurfaceCondition,
    pub user_preferences: Preferences,
}

impl Default for FieldSet {
    fn default() -> Self {
        FieldSet {
            shaft_diameter: 30.0,
            hub_length: 30.0,
            shaft_material: DEFAULT_MATERIAL.to_string(),
            hub_material: DEFAULT_MATERIAL.to_string(),
            shaft_type: ShaftType::Solid,
            has_bending: true,
            required_torque: Some(50_000.0),
            safety_factor: 1.5,
            hub_outer_diameter: None,
            shaft_inner_diameter: None,
            mu_override: None,
            spline_major_diameter_override: None,
            spline_tooth_count_override: None,
            surface_condition: SurfaceCondition::Dry,
            user_preferences: Preferences::default(),
        }
    }
}

impl FieldSet {
    /// Shallow-merge an update. No validation, no derivation.
    pub fn merge(&mut self, update: &FieldUpdate) {
        if let Some(v) = update.shaft_diameter {
            self.shaft_diameter = v;
        }
        if let Some(v) = update.hub_length {
            self.hub_length = v;
        }
        if let Some(v) = &update.shaft_material {
            self.shaft_material = v.clone();
        }
        if let Some(v) = &update.hub_material {
            self.hub_material = v.clone();
        }
        if let Some(v) = update.shaft_type {
            self.shaft_type = v;
        }
        if let Some(v) = update.has_bending {
            self.has_bending = v;
        }
        if let Some(v) = update.required_torque {
            self.required_torque = v;
        }
        if let Some(v) = update.safety_factor {
            self.safety_factor = v;
        }
        if let Some(v) = update.hub_outer_diameter {
            self.hub_outer_diameter = v;
        }
        if let Some(v) = update.shaft_inner_diameter {
            self.shaft_inner_diameter = v;
        }
        if let Some(v) = update.mu_override {
            self.mu_override = v;
        }
        if let Some(v) = update.spline_major_diameter_override {
            self.spline_major_diameter_override = v;
        }
        if let Some(v) = update.spline_tooth_count_override {
            self.spline_tooth_count_override = v;
        }
        if let Some(v) = update.surface_condition {
            self.surface_condition = v;
        }
        for (key, value) in &update.preferences {
            self.user_preferences.set(*key, *value);
        }
    }

    /// Current value of a numeric field (`None` for absent or non-numeric fields)
    pub fn numeric(&self, field: FieldName) -> Option<f64> {
        match field {
            FieldName::ShaftDiameter => Some(self.shaft_diameter),
            FieldName::HubLength => Some(self.hub_length),
            FieldName::RequiredTorque => self.required_torque,
            FieldName::SafetyFactor => Some(self.safety_factor),
            FieldName::HubOuterDiameter => self.hub_outer_diameter,
            FieldName::ShaftInnerDiameter => self.shaft_inner_diameter,
            FieldName::MuOverride => self.mu_override,
            FieldName::SplineMajorDiameterOverride => self.spline_major_diameter_override,
            FieldName::SplineToothCountOverride => self.spline_tooth_count_override,
            _ => None,
        }
    }

    /// Human-readable value of any field, as the form shows it
    pub fn display_value(&self, field: FieldName) -> String {
        match field {
            FieldName::ShaftMaterial => self.shaft_material.clone(),
            FieldName::HubMaterial => self.hub_material.clone(),
            FieldName::ShaftType => self.shaft_type.key().to_string(),
            FieldName::HasBending => self.has_bending.to_string(),
            FieldName::SurfaceCondition => self.surface_condition.key().to_string(),
            numeric => match self.numeric(numeric) {
                Some(v) => v.to_string(),
                None => String::new(),
            },
        }
    }
}

// ============================================================================
// FieldUpdate
// ============================================================================

/// A partial update to a [`FieldSet`].
///
/// For optional fields the outer `Option` means "touched", the inner one the
/// new value, so `Some(None)` clears the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdate {
    pub shaft_diameter: Option<f64>,
    pub hub_length: Option<f64>,
    pub shaft_material: Option<String>,
    pub hub_material: Option<String>,
    pub shaft_type: Option<ShaftType>,
    pub has_bending: Option<bool>,
    pub required_torque: Option<Option<f64>>,
    pub safety_factor: Option<f64>,
    pub hub_outer_diameter: Option<Option<f64>>,
    pub shaft_inner_diameter: Option<Option<f64>>,
    pub mu_override: Option<Option<f64>>,
    pub spline_major_diameter_override: Option<Option<f64>>,
    pub spline_tooth_count_override: Option<Option<f64>>,
    pub surface_condition: Option<SurfaceCondition>,
    pub preferences: BTreeMap<PreferenceKey, f64>,
}

impl FieldUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shaft_diameter(mut self, value: f64) -> Self {
        self.shaft_diameter = Some(value);
        self
    }

    pub fn with_hub_length(mut self, value: f64) -> Self {
        self.hub_length = Some(value);
        self
    }

    pub fn with_shaft_material(mut self, value: impl Into<String>) -> Self {
        self.shaft_material = Some(value.into());
        self
    }

    pub fn with_hub_material(mut self, value: impl Into<String>) -> Self {
        self.hub_material = Some(value.into());
        self
    }

    pub fn with_shaft_type(mut self, value: ShaftType) -> Self {
        self.shaft_type = Some(value);
        self
    }

    pub fn with_has_bending(mut self, value: bool) -> Self {
        self.has_bending = Some(value);
        self
    }

    pub fn with_required_torque(mut self, value: Option<f64>) -> Self {
        self.required_torque = Some(value);
        self
    }

    pub fn with_safety_factor(mut self, value: f64) -> Self {
        self.safety_factor = Some(value);
        self
    }

    pub fn with_hub_outer_diameter(mut self, value: Option<f64>) -> Self {
        self.hub_outer_diameter = Some(value);
        self
    }

    pub fn with_shaft_inner_diameter(mut self, value: Option<f64>) -> Self {
        self.shaft_inner_diameter = Some(value);
        self
    }

    pub fn with_mu_override(mut self, value: Option<f64>) -> Self {
        self.mu_override = Some(value);
        self
    }

    pub fn with_spline_major_diameter_override(mut self, value: Option<f64>) -> Self {
        self.spline_major_diameter_override = Some(value);
        self
    }

    pub fn with_spline_tooth_count_override(mut self, value: Option<f64>) -> Self {
        self.spline_tooth_count_override = Some(value);
        self
    }

    pub fn with_surface_condition(mut self, value: SurfaceCondition) -> Self {
        self.surface_condition = Some(value);
        self
    }

    pub fn with_preference(mut self, key: PreferenceKey, value: f64) -> Self {
        self.preferences.insert(key, value);
        self
    }

    /// Set a numeric field by name. Non-numeric fields are ignored.
    pub fn with_numeric(mut self, field: FieldName, value: Option<f64>) -> Self {
        match field {
            FieldName::ShaftDiameter => self.shaft_diameter = value,
            FieldName::HubLength => self.hub_length = value,
            FieldName::SafetyFactor => self.safety_factor = value,
            FieldName::RequiredTorque => self.required_torque = Some(value),
            FieldName::HubOuterDiameter => self.hub_outer_diameter = Some(value),
            FieldName::ShaftInnerDiameter => self.shaft_inner_diameter = Some(value),
            FieldName::MuOverride => self.mu_override = Some(value),
            FieldName::SplineMajorDiameterOverride => self.spline_major_diameter_override = Some(value),
            FieldName::SplineToothCountOverride => self.spline_tooth_count_override = Some(value),
            _ => {}
        }
        self
    }

    /// Build an update from raw text typed into a field.
    ///
    /// Returns `None` when the text must leave the previous value unchanged:
    /// malformed numbers (including "NaN"), empty text on a required numeric
    /// field, or an unrecognised choice.
    pub fn from_text(field: FieldName, raw: &str) -> Option<Self> {
        let text = raw.trim();
        let update = FieldUpdate::new();
        match field {
            FieldName::ShaftMaterial => Some(update.with_shaft_material(text)),
            FieldName::HubMaterial => Some(update.with_hub_material(text)),
            FieldName::ShaftType => ShaftType::from_key(text).map(|t| update.with_shaft_type(t)),
            FieldName::SurfaceCondition => {
                SurfaceCondition::from_key(text).map(|c| update.with_surface_condition(c))
            }
            FieldName::HasBending => parse_flag(text).map(|b| update.with_has_bending(b)),
            numeric => {
                if text.is_empty() {
                    return numeric
                        .is_optional()
                        .then(|| update.with_numeric(numeric, None));
                }
                parse_number(text).map(|v| update.with_numeric(numeric, Some(v)))
            }
        }
    }

    /// Whether this update writes the given field
    pub fn touches(&self, field: FieldName) -> bool {
        match field {
            FieldName::ShaftDiameter => self.shaft_diameter.is_some(),
            FieldName::HubLength => self.hub_length.is_some(),
            FieldName::ShaftMaterial => self.shaft_material.is_some(),
            FieldName::HubMaterial => self.hub_material.is_some(),
            FieldName::ShaftType => self.shaft_type.is_some(),
            FieldName::HasBending => self.has_bending.is_some(),
            FieldName::RequiredTorque => self.required_torque.is_some(),
            FieldName::SafetyFactor => self.safety_factor.is_some(),
            FieldName::HubOuterDiameter => self.hub_outer_diameter.is_some(),
            FieldName::ShaftInnerDiameter => self.shaft_inner_diameter.is_some(),
            FieldName::MuOverride => self.mu_override.is_some(),
            FieldName::SplineMajorDiameterOverride => self.spline_major_diameter_override.is_some(),
            FieldName::SplineToothCountOverride => self.spline_tooth_count_override.is_some(),
            FieldName::SurfaceCondition => self.surface_condition.is_some(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.preferences.is_empty() && !FieldName::ALL.iter().any(|f| self.touches(*f))
    }
}

/// Parse a number the way a numeric input does. NaN and infinities are rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a checkbox-style flag
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "0" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let fields = FieldSet::default();
        assert_eq!(fields.shaft_diameter, 30.0);
        assert_eq!(fields.hub_length, 30.0);
        assert_eq!(fields.shaft_material, "Steel C45");
        assert!(fields.has_bending);
        assert_eq!(fields.required_torque, Some(50_000.0));
        assert!(fields.mu_override.is_none());
        for key in PreferenceKey::ALL {
            assert_eq!(fields.user_preferences.get(key), 0.5);
        }
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut fields = FieldSet::default();
        let update = FieldUpdate::new()
            .with_shaft_diameter(45.0)
            .with_mu_override(Some(0.12))
            .with_preference(PreferenceKey::Cost, 0.9);
        fields.merge(&update);

        assert_eq!(fields.shaft_diameter, 45.0);
        assert_eq!(fields.mu_override, Some(0.12));
        assert_eq!(fields.user_preferences.cost, 0.9);
        // Untouched fields keep their values
        assert_eq!(fields.hub_length, 30.0);
        assert_eq!(fields.user_preferences.ease, 0.5);
    }

    #[test]
    fn test_merge_clears_optional() {
        let mut fields = FieldSet::default();
        fields.merge(&FieldUpdate::new().with_hub_outer_diameter(Some(60.0)));
        assert_eq!(fields.hub_outer_diameter, Some(60.0));
        fields.merge(&FieldUpdate::new().with_hub_outer_diameter(None));
        assert_eq!(fields.hub_outer_diameter, None);
    }

    #[test]
    fn test_text_malformed_number_is_ignored() {
        assert!(FieldUpdate::from_text(FieldName::ShaftDiameter, "3O").is_none());
        assert!(FieldUpdate::from_text(FieldName::ShaftDiameter, "NaN").is_none());
        assert!(FieldUpdate::from_text(FieldName::MuOverride, "abc").is_none());
    }

    #[test]
    fn test_text_empty_required_is_ignored() {
        assert!(FieldUpdate::from_text(FieldName::ShaftDiameter, "").is_none());
        assert!(FieldUpdate::from_text(FieldName::SafetyFactor, "  ").is_none());
    }

    #[test]
    fn test_text_empty_optional_clears() {
        let update = FieldUpdate::from_text(FieldName::ShaftInnerDiameter, "").unwrap();
        assert_eq!(update.shaft_inner_diameter, Some(None));

        let update = FieldUpdate::from_text(FieldName::RequiredTorque, "").unwrap();
        assert_eq!(update.required_torque, Some(None));
    }

    #[test]
    fn test_text_choices() {
        let update = FieldUpdate::from_text(FieldName::ShaftType, "Hollow").unwrap();
        assert_eq!(update.shaft_type, Some(ShaftType::Hollow));
        assert!(FieldUpdate::from_text(FieldName::ShaftType, "square").is_none());

        let update = FieldUpdate::from_text(FieldName::HasBending, "no").unwrap();
        assert_eq!(update.has_bending, Some(false));

        let update = FieldUpdate::from_text(FieldName::SurfaceCondition, "oiled").unwrap();
        assert_eq!(update.surface_condition, Some(SurfaceCondition::Oiled));
    }

    #[test]
    fn test_preference_outside_slider_range_ignored() {
        let mut prefs = Preferences::default();
        prefs.set(PreferenceKey::Speed, 1.0);
        assert_eq!(prefs.speed, 1.0);
        prefs.set(PreferenceKey::Speed, 1.7);
        assert_eq!(prefs.speed, 1.0);
        prefs.set(PreferenceKey::Speed, -0.2);
        assert_eq!(prefs.speed, 1.0);
        prefs.set(PreferenceKey::Speed, f64::NAN);
        assert_eq!(prefs.speed, 1.0);
        prefs.set(PreferenceKey::Speed, 0.0);
        assert_eq!(prefs.speed, 0.0);
    }

    #[test]
    fn test_infinity_text_is_not_a_number() {
        for raw in ["inf", "-inf", "infinity", "+Infinity", "NaN"] {
            assert_eq!(parse_number(raw), None, "{}", raw);
            assert!(FieldUpdate::from_text(FieldName::RequiredTorque, raw).is_none(), "{}", raw);
        }
        assert_eq!(parse_number(" 1e3 "), Some(1000.0));
    }

    #[test]
    fn test_field_name_parsing() {
        assert_eq!(FieldName::from_str_flexible("hub-length").unwrap(), FieldName::HubLength);
        assert_eq!(FieldName::from_str_flexible("MU_OVERRIDE").unwrap(), FieldName::MuOverride);
        assert!(FieldName::from_str_flexible("spline_module").is_err());
        assert_eq!(PreferenceKey::from_str_flexible("pref_cost").unwrap(), PreferenceKey::Cost);
    }

    #[test]
    fn test_update_touches() {
        let update = FieldUpdate::new().with_has_bending(false);
        assert!(update.touches(FieldName::HasBending));
        assert!(!update.touches(FieldName::ShaftDiameter));
        assert!(FieldUpdate::new().is_empty());
    }

    #[test]
    fn test_fieldset_wire_names() {
        let json = serde_json::to_value(FieldSet::default()).unwrap();
        assert_eq!(json["shaft_type"], "solid");
        assert_eq!(json["surface_condition"], "dry");
        assert!(json["mu_override"].is_null());
        assert_eq!(json["user_preferences"]["durability"], 0.5);
    }
}
