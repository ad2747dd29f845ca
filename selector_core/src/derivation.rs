//! # Hub Length Derivation
//!
//! The hub length follows the shaft diameter until the user types a hub length
//! of their own:
//!
//! - with a bending moment: L = round(d)
//! - torque only: L = round(0.5 · d)
//!
//! The "still derived" state is an explicit [`LengthMode`] stored next to the
//! fields, so it round-trips through snapshots.

use serde::{Deserialize, Serialize};

use crate::fields::{FieldName, FieldSet, FieldUpdate};

/// Whether the hub length is still engine-managed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthMode {
    pub length_is_auto_derived: bool,
}

impl Default for LengthMode {
    fn default() -> Self {
        LengthMode {
            length_is_auto_derived: true,
        }
    }
}

impl LengthMode {
    /// Record a direct user edit of the hub length. There is no way back
    /// short of a reset.
    pub fn mark_overridden(&mut self) {
        self.length_is_auto_derived = false;
    }
}

/// Recommended hub length for a diameter, or `None` when d is not a finite
/// positive number.
pub fn recommended_length(shaft_diameter: f64, has_bending: bool) -> Option<f64> {
    if !shaft_diameter.is_finite() || shaft_diameter <= 0.0 {
        return None;
    }
    let length = if has_bending {
        shaft_diameter.round()
    } else {
        (shaft_diameter * 0.5).round()
    };
    Some(length)
}

/// Text shown next to the hub length input
pub fn length_rule_label(has_bending: bool) -> &'static str {
    if has_bending {
        "D (equal to shaft diameter)"
    } else {
        "0.5D (half shaft diameter)"
    }
}

/// React to a merged update.
///
/// A direct hub length edit flips the mode first; otherwise a change to the
/// diameter or the bending flag recomputes the length. Returns `true` when
/// the hub length was rewritten.
pub fn apply(fields: &mut FieldSet, mode: &mut LengthMode, update: &FieldUpdate, user_edit: bool) -> bool {
    if user_edit && update.touches(FieldName::HubLength) {
        mode.mark_overridden();
    }
    if !mode.length_is_auto_derived {
        return false;
    }
    if !update.touches(FieldName::ShaftDiameter) && !update.touches(FieldName::HasBending) {
        return false;
    }
    match recommended_length(fields.shaft_diameter, fields.has_bending) {
        Some(length) => {
            tracing::debug!(
                shaft_diameter = fields.shaft_diameter,
                has_bending = fields.has_bending,
                hub_length = length,
                "derived hub length"
            );
            fields.hub_length = length;
            true
        }
        None => false,
    }
}
