//! # Input Validation
//!
//! A fixed table of independent rules evaluated against the whole
//! [`FieldSet`] on every pass. Several rules compare fields against the shaft
//! diameter, so the table is always run in full rather than per edited field.
//!
//! Diagnostics are values, not errors. They block submission but never touch
//! the fields.
//!
//! ## Example
//!
//! ```rust
//! use selector_core::fields::{FieldName, FieldSet};
//! use selector_core::validation::validate;
//!
//! let mut fields = FieldSet::default();
//! fields.shaft_diameter = 5.0;
//!
//! let diagnostics = validate(&fields);
//! assert!(diagnostics.message_for(FieldName::ShaftDiameter).is_some());
//! ```

use serde::{Deserialize, Serialize};

use crate::fields::{FieldName, FieldSet, ShaftType};

/// Smallest shaft diameter covered by the DIN tables (mm)
pub const DIAMETER_MIN_MM: f64 = 6.0;

/// Largest shaft diameter covered by the DIN tables (mm)
pub const DIAMETER_MAX_MM: f64 = 230.0;

/// Accepted range for a manual friction coefficient
pub const MU_OVERRIDE_RANGE: (f64, f64) = (0.05, 0.50);

/// Minimum safety factor
pub const SAFETY_FACTOR_MIN: f64 = 1.0;

/// One validation failure tied to a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub field: FieldName,
    pub message: String,
}

impl Diagnostic {
    pub fn new(field: FieldName, message: impl Into<String>) -> Self {
        Diagnostic {
            field,
            message: message.into(),
        }
    }
}

/// The full result of one validation pass. Replaces the previous one wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// First message for a field, as shown inline next to the input
    pub fn message_for(&self, field: FieldName) -> Option<&str> {
        self.0
            .iter()
            .find(|d| d.field == field)
            .map(|d| d.message.as_str())
    }

    /// All messages for a field
    pub fn messages_for(&self, field: FieldName) -> Vec<&str> {
        self.0
            .iter()
            .filter(|d| d.field == field)
            .map(|d| d.message.as_str())
            .collect()
    }

    pub fn has(&self, field: FieldName) -> bool {
        self.0.iter().any(|d| d.field == field)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A named check that may push diagnostics
struct Rule {
    name: &'static str,
    check: fn(&FieldSet, &mut Vec<Diagnostic>),
}

const RULES: &[Rule] = &[
    Rule { name: "shaft_diameter_range", check: check_shaft_diameter },
    Rule { name: "hollow_inner_diameter", check: check_inner_diameter },
    Rule { name: "hub_outer_diameter", check: check_hub_outer_diameter },
    Rule { name: "required_torque", check: check_required_torque },
    Rule { name: "safety_factor", check: check_safety_factor },
    Rule { name: "mu_override_range", check: check_mu_override },
    Rule { name: "spline_major_diameter", check: check_spline_major_diameter },
    Rule { name: "spline_tooth_count", check: check_spline_tooth_count },
];

/// Run every rule against the fields.
///
/// Pure: the same fields always give the same diagnostics in the same order.
pub fn validate(fields: &FieldSet) -> Diagnostics {
    let mut found = Vec::new();
    for rule in RULES {
        let before = found.len();
        (rule.check)(fields, &mut found);
        if found.len() > before {
            tracing::trace!(rule = rule.name, "rule failed");
        }
    }
    tracing::debug!(count = found.len(), "validation pass");
    Diagnostics(found)
}

fn check_shaft_diameter(fields: &FieldSet, out: &mut Vec<Diagnostic>) {
    let d = fields.shaft_diameter;
    if !d.is_finite() {
        out.push(Diagnostic::new(FieldName::ShaftDiameter, "Shaft diameter must be a number."));
        return;
    }
    if d < DIAMETER_MIN_MM {
        out.push(Diagnostic::new(
            FieldName::ShaftDiameter,
            format!("Shaft diameter must be ≥ {} mm (DIN table minimum).", DIAMETER_MIN_MM),
        ));
    }
    if d > DIAMETER_MAX_MM {
        out.push(Diagnostic::new(
            FieldName::ShaftDiameter,
            format!("Shaft diameter must be ≤ {} mm (DIN table maximum).", DIAMETER_MAX_MM),
        ));
    }
}

fn check_inner_diameter(fields: &FieldSet, out: &mut Vec<Diagnostic>) {
    if fields.shaft_type != ShaftType::Hollow {
        return;
    }
    match fields.shaft_inner_diameter {
        None => out.push(Diagnostic::new(
            FieldName::ShaftInnerDiameter,
            "Hollow shafts require an inner diameter.",
        )),
        Some(inner) if !(inner < fields.shaft_diameter) => out.push(Diagnostic::new(
            FieldName::ShaftInnerDiameter,
            "Shaft inner diameter must be less than the shaft diameter.",
        )),
        Some(_) => {}
    }
}

fn check_hub_outer_diameter(fields: &FieldSet, out: &mut Vec<Diagnostic>) {
    if let Some(outer) = fields.hub_outer_diameter {
        if !(outer > fields.shaft_diameter) {
            out.push(Diagnostic::new(
                FieldName::HubOuterDiameter,
                "Hub outer diameter must be greater than the shaft diameter.",
            ));
        }
    }
}

fn check_required_torque(fields: &FieldSet, out: &mut Vec<Diagnostic>) {
    let positive = matches!(fields.required_torque, Some(t) if t > 0.0);
    if !positive {
        out.push(Diagnostic::new(
            FieldName::RequiredTorque,
            "Required torque must be a positive number.",
        ));
    }
}

fn check_safety_factor(fields: &FieldSet, out: &mut Vec<Diagnostic>) {
    if !(fields.safety_factor >= SAFETY_FACTOR_MIN) {
        out.push(Diagnostic::new(FieldName::SafetyFactor, "Safety factor should be ≥ 1.0."));
    }
}

fn check_mu_override(fields: &FieldSet, out: &mut Vec<Diagnostic>) {
    let (lo, hi) = MU_OVERRIDE_RANGE;
    if let Some(mu) = fields.mu_override {
        if !(lo..=hi).contains(&mu) {
            out.push(Diagnostic::new(
                FieldName::MuOverride,
                "Friction coefficient μ override must be between 0.05 and 0.50.",
            ));
        }
    }
}

// Both checks may fire for the same value.
fn check_spline_major_diameter(fields: &FieldSet, out: &mut Vec<Diagnostic>) {
    let Some(major) = fields.spline_major_diameter_override else {
        return;
    };
    if !(major > fields.shaft_diameter) {
        out.push(Diagnostic::new(
            FieldName::SplineMajorDiameterOverride,
            "Spline major diameter override must be greater than the shaft diameter.",
        ));
    }
    if !(major > 0.0) {
        out.push(Diagnostic::new(
            FieldName::SplineMajorDiameterOverride,
            "Spline major diameter override must be positive.",
        ));
    }
}

fn check_spline_tooth_count(fields: &FieldSet, out: &mut Vec<Diagnostic>) {
    if let Some(count) = fields.spline_tooth_count_override {
        if !(count.is_finite() && count > 0.0) {
            out.push(Diagnostic::new(
                FieldName::SplineToothCountOverride,
                "Spline tooth count override must be a positive number.",
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn fields_with(edit: impl FnOnce(&mut FieldSet)) -> FieldSet {
        let mut fields = FieldSet::default();
        edit(&mut fields);
        fields
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&FieldSet::default()).is_empty());
    }

    #[test]
    fn test_diameter_range() {
        let low = validate(&fields_with(|f| f.shaft_diameter = 5.0));
        let high = validate(&fields_with(|f| f.shaft_diameter = 231.0));
        let ok = validate(&fields_with(|f| f.shaft_diameter = 30.0));

        assert!(low.has(FieldName::ShaftDiameter));
        assert!(high.has(FieldName::ShaftDiameter));
        assert!(!ok.has(FieldName::ShaftDiameter));
        assert_ne!(
            low.message_for(FieldName::ShaftDiameter),
            high.message_for(FieldName::ShaftDiameter)
        );
    }

    #[test]
    fn test_diameter_bounds_are_inclusive() {
        assert!(!validate(&fields_with(|f| f.shaft_diameter = 6.0)).has(FieldName::ShaftDiameter));
        assert!(!validate(&fields_with(|f| f.shaft_diameter = 230.0)).has(FieldName::ShaftDiameter));
    }

    #[test]
    fn test_non_finite_diameter() {
        let diagnostics = validate(&fields_with(|f| f.shaft_diameter = f64::NAN));
        assert_eq!(
            diagnostics.message_for(FieldName::ShaftDiameter),
            Some("Shaft diameter must be a number.")
        );
    }

    #[test]
    fn test_hollow_inner_diameter() {
        let too_big = validate(&fields_with(|f| {
            f.shaft_type = ShaftType::Hollow;
            f.shaft_inner_diameter = Some(35.0);
        }));
        assert!(too_big.has(FieldName::ShaftInnerDiameter));

        let ok = validate(&fields_with(|f| {
            f.shaft_type = ShaftType::Hollow;
            f.shaft_inner_diameter = Some(20.0);
        }));
        assert!(!ok.has(FieldName::ShaftInnerDiameter));

        let missing = validate(&fields_with(|f| f.shaft_type = ShaftType::Hollow));
        assert_eq!(
            missing.message_for(FieldName::ShaftInnerDiameter),
            Some("Hollow shafts require an inner diameter.")
        );
    }

    #[test]
    fn test_inner_diameter_ignored_for_solid() {
        let diagnostics = validate(&fields_with(|f| f.shaft_inner_diameter = Some(50.0)));
        assert!(!diagnostics.has(FieldName::ShaftInnerDiameter));
    }

    #[test]
    fn test_hub_outer_diameter() {
        assert!(validate(&fields_with(|f| f.hub_outer_diameter = Some(30.0))).has(FieldName::HubOuterDiameter));
        assert!(!validate(&fields_with(|f| f.hub_outer_diameter = Some(60.0))).has(FieldName::HubOuterDiameter));
    }

    #[test]
    fn test_required_torque() {
        assert!(validate(&fields_with(|f| f.required_torque = None)).has(FieldName::RequiredTorque));
        assert!(validate(&fields_with(|f| f.required_torque = Some(0.0))).has(FieldName::RequiredTorque));
        assert!(validate(&fields_with(|f| f.required_torque = Some(-10.0))).has(FieldName::RequiredTorque));
    }

    #[test]
    fn test_safety_factor() {
        assert!(validate(&fields_with(|f| f.safety_factor = 0.9)).has(FieldName::SafetyFactor));
        assert!(!validate(&fields_with(|f| f.safety_factor = 1.0)).has(FieldName::SafetyFactor));
    }

    #[test]
    fn test_mu_override_range() {
        assert!(validate(&fields_with(|f| f.mu_override = Some(0.04))).has(FieldName::MuOverride));
        assert!(validate(&fields_with(|f| f.mu_override = Some(0.51))).has(FieldName::MuOverride));
        assert!(!validate(&fields_with(|f| f.mu_override = Some(0.05))).has(FieldName::MuOverride));
        assert!(!validate(&fields_with(|f| f.mu_override = Some(0.50))).has(FieldName::MuOverride));
    }

    #[test]
    fn test_spline_major_diameter_both_checks_fire() {
        let diagnostics = validate(&fields_with(|f| f.spline_major_diameter_override = Some(-1.0)));
        assert_eq!(diagnostics.messages_for(FieldName::SplineMajorDiameterOverride).len(), 2);

        let diagnostics = validate(&fields_with(|f| f.spline_major_diameter_override = Some(25.0)));
        assert_eq!(diagnostics.messages_for(FieldName::SplineMajorDiameterOverride).len(), 1);

        let diagnostics = validate(&fields_with(|f| f.spline_major_diameter_override = Some(34.0)));
        assert!(!diagnostics.has(FieldName::SplineMajorDiameterOverride));
    }

    #[test]
    fn test_spline_tooth_count() {
        assert!(validate(&fields_with(|f| f.spline_tooth_count_override = Some(0.0))).has(FieldName::SplineToothCountOverride));
        assert!(validate(&fields_with(|f| f.spline_tooth_count_override = Some(f64::INFINITY))).has(FieldName::SplineToothCountOverride));
        assert!(!validate(&fields_with(|f| f.spline_tooth_count_override = Some(6.0))).has(FieldName::SplineToothCountOverride));
    }

    #[test]
    fn test_all_rules_run_every_pass() {
        let diagnostics = validate(&fields_with(|f| {
            f.shaft_diameter = 300.0;
            f.required_torque = None;
            f.safety_factor = 0.5;
            f.mu_override = Some(0.9);
        }));
        assert_eq!(diagnostics.len(), 4);
    }

    #[test]
    fn test_validation_is_idempotent() {
        let fields = fields_with(|f| {
            f.shaft_type = ShaftType::Hollow;
            f.hub_outer_diameter = Some(10.0);
            f.spline_tooth_count_override = Some(-3.0);
        });
        let first: HashSet<_> = validate(&fields).iter().cloned().collect();
        let second: HashSet<_> = validate(&fields).iter().cloned().collect();
        assert_eq!(first, second);
        assert_eq!(validate(&fields), validate(&fields));
    }

    #[test]
    fn test_diagnostic_serialization() {
        let diagnostics = validate(&fields_with(|f| f.safety_factor = 0.5));
        let json = serde_json::to_string(&diagnostics).unwrap();
        assert_eq!(json, r#"[{"field":"safety_factor","message":"Safety factor should be ≥ 1.0."}]"#);
    }
}
