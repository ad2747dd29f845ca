//! # Submission Transformer
//!
//! Turns the current [`FieldSet`] into the exact `POST /select-connection`
//! payload. The order of operations is fixed:
//!
//! 1. validate the fields as they are (pre-snap)
//! 2. snap the required torque to a multiple of 100 and clamp at 0
//! 3. turn every empty optional into an explicit `null`
//! 4. round the spline tooth count override
//! 5. hand back the snapped fields so the form shows what was sent
//!
//! ## Example
//!
//! ```rust
//! use selector_core::fields::FieldSet;
//! use selector_core::submission::prepare;
//!
//! let mut fields = FieldSet::default();
//! fields.required_torque = Some(50_049.0);
//!
//! let prepared = prepare(&fields).unwrap();
//! assert_eq!(prepared.request.required_torque, Some(50_000.0));
//! assert_eq!(prepared.fields.required_torque, Some(50_000.0));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{SelectorError, SelectorResult};
use crate::fields::{FieldSet, Preferences, ShaftType, SurfaceCondition};
use crate::validation::validate;

/// Step used when snapping the required torque (Nmm)
pub const TORQUE_SNAP_STEP: f64 = 100.0;

/// Request body for `POST /select-connection`.
///
/// Optional values serialize as `null`, never omitted and never `""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub shaft_diameter: f64,
    pub hub_length: f64,
    pub shaft_material: String,
    pub hub_material: String,
    pub shaft_type: ShaftType,
    pub has_bending: bool,
    pub required_torque: Option<f64>,
    pub safety_factor: f64,
    pub hub_outer_diameter: Option<f64>,
    pub shaft_inner_diameter: Option<f64>,
    pub mu_override: Option<f64>,
    pub spline_major_diameter_override: Option<f64>,
    pub spline_tooth_count_override: Option<i64>,
    pub surface_condition: SurfaceCondition,
    pub user_preferences: Preferences,
}

/// A request that passed the gate, plus the fields to write back.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSubmission {
    pub request: SelectionRequest,
    pub fields: FieldSet,
}

/// Snap a torque to the nearest multiple of 100 Nmm, half away from zero,
/// then clamp at 0.
pub fn snap_torque(torque: f64) -> f64 {
    if !torque.is_finite() {
        return torque;
    }
    let snapped = (torque / TORQUE_SNAP_STEP).round() * TORQUE_SNAP_STEP;
    snapped.max(0.0)
}

/// Gate and normalize the fields for transmission.
///
/// # Returns
///
/// * `Ok(PreparedSubmission)` - payload and snapped fields
/// * `Err(SelectorError::SubmissionBlocked)` - diagnostics were present
pub fn prepare(fields: &FieldSet) -> SelectorResult<PreparedSubmission> {
    let diagnostics = validate(fields);
    if !diagnostics.is_empty() {
        return Err(SelectorError::blocked(diagnostics.len()));
    }

    let mut snapped = fields.clone();
    snapped.required_torque = snapped.required_torque.map(snap_torque);
    snapped.spline_tooth_count_override = snapped.spline_tooth_count_override.map(f64::round);

    let request = SelectionRequest {
        shaft_diameter: snapped.shaft_diameter,
        hub_length: snapped.hub_length,
        shaft_material: snapped.shaft_material.clone(),
        hub_material: snapped.hub_material.clone(),
        shaft_type: snapped.shaft_type,
        has_bending: snapped.has_bending,
        required_torque: snapped.required_torque,
        safety_factor: snapped.safety_factor,
        hub_outer_diameter: snapped.hub_outer_diameter,
        shaft_inner_diameter: snapped.shaft_inner_diameter,
        mu_override: snapped.mu_override,
        spline_major_diameter_override: snapped.spline_major_diameter_override,
        spline_tooth_count_override: snapped.spline_tooth_count_override.map(|n| n as i64),
        surface_condition: snapped.surface_condition,
        user_preferences: snapped.user_preferences,
    };

    Ok(PreparedSubmission {
        request,
        fields: snapped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_torque() {
        assert_eq!(snap_torque(50_049.0), 50_000.0);
        assert_eq!(snap_torque(50_050.0), 50_100.0);
        assert_eq!(snap_torque(149.0), 100.0);
        assert_eq!(snap_torque(49.0), 0.0);
        assert_eq!(snap_torque(-260.0), 0.0);
    }

    #[test]
    fn test_prepare_snaps_and_writes_back() {
        let mut fields = FieldSet::default();
        fields.required_torque = Some(50_050.0);
        let prepared = prepare(&fields).unwrap();
        assert_eq!(prepared.request.required_torque, Some(50_100.0));
        assert_eq!(prepared.fields.required_torque, Some(50_100.0));
    }

    #[test]
    fn test_prepare_blocks_on_diagnostics() {
        let mut fields = FieldSet::default();
        fields.shaft_diameter = 5.0;
        let err = prepare(&fields).unwrap_err();
        assert_eq!(err.error_code(), "SUBMISSION_BLOCKED");
    }

    #[test]
    fn test_validation_runs_before_snap() {
        // 40 Nmm is a valid positive torque; it only becomes 0 after snapping
        let mut fields = FieldSet::default();
        fields.required_torque = Some(40.0);
        let prepared = prepare(&fields).unwrap();
        assert_eq!(prepared.request.required_torque, Some(0.0));
    }

    #[test]
    fn test_tooth_count_rounded() {
        let mut fields = FieldSet::default();
        fields.spline_tooth_count_override = Some(7.6);
        let prepared = prepare(&fields).unwrap();
        assert_eq!(prepared.request.spline_tooth_count_override, Some(8));
        assert_eq!(prepared.fields.spline_tooth_count_override, Some(8.0));
    }

    #[test]
    fn test_absent_optionals_are_null() {
        let prepared = prepare(&FieldSet::default()).unwrap();
        let json = serde_json::to_value(&prepared.request).unwrap();
        let body = json.as_object().unwrap();

        for key in [
            "hub_outer_diameter",
            "shaft_inner_diameter",
            "mu_override",
            "spline_major_diameter_override",
            "spline_tooth_count_override",
        ] {
            assert!(body.contains_key(key), "{} must be present", key);
            assert!(body[key].is_null(), "{} must be null", key);
        }
        assert_eq!(body["shaft_type"], "solid");
        assert_eq!(body["user_preferences"]["ease"], 0.5);
    }

    #[test]
    fn test_present_optionals_are_sent() {
        let mut fields = FieldSet::default();
        fields.hub_outer_diameter = Some(60.0);
        fields.mu_override = Some(0.15);
        let prepared = prepare(&fields).unwrap();
        let json = serde_json::to_value(&prepared.request).unwrap();
        assert_eq!(json["hub_outer_diameter"], 60.0);
        assert_eq!(json["mu_override"], 0.15);
    }
}
