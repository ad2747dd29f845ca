//! # Result Mapping
//!
//! The selection service owns the numbers; this module only reads them.
//! [`summarize`] derives the display aggregates (design torque, feasible
//! count, per-connection margins) from a [`ComputationResult`] without
//! mutating it.
//!
//! Older service versions do not send `feasible_connections_count` or
//! `M_design_Nmm`; both are filled in locally when missing.
//!
//! ## Example
//!
//! ```rust
//! use selector_core::result::{summarize, ComputationResult};
//!
//! let result: ComputationResult = serde_json::from_str(r#"{
//!     "recommended_connection": "press",
//!     "required_torque_Nmm": 50000,
//!     "capacities_Nmm": { "press": 80000, "key": 40000 },
//!     "M_design_Nmm": 60000,
//!     "feasible": true
//! }"#).unwrap();
//!
//! let summary = summarize(&result);
//! assert_eq!(summary.design_torque_nmm, 60000.0);
//! assert_eq!(summary.feasible_count, 1);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Banner text when the service finds nothing feasible and gives no reason
pub const DEFAULT_INFEASIBLE_HINT: &str =
    "Try increasing shaft diameter, hub length, or reducing required torque/safety factor.";

/// Response of `POST /select-connection`.
///
/// Only the documented fields are read; unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputationResult {
    #[serde(default)]
    pub recommended_connection: Option<String>,

    /// Required torque as echoed by the service (Nmm)
    #[serde(rename = "required_torque_Nmm")]
    pub required_torque_nmm: f64,

    /// Torque capacity per connection type (Nmm)
    #[serde(rename = "capacities_Nmm", default)]
    pub capacities_nmm: BTreeMap<String, f64>,

    /// Selection score per feasible connection type
    #[serde(default)]
    pub scores: Option<BTreeMap<String, f64>>,

    /// Friction coefficient actually used
    #[serde(default)]
    pub mu_used: Option<f64>,

    #[serde(default)]
    pub surface_condition: Option<String>,

    /// Hub stiffness reduction factor (1.0 = rigid hub)
    #[serde(default)]
    pub hub_stiffness_factor: Option<f64>,

    #[serde(default)]
    pub feasible: bool,

    /// Explanation when nothing is feasible
    #[serde(default)]
    pub reason: Option<String>,

    /// Some service versions send the count as a float
    #[serde(default)]
    pub feasible_connections_count: Option<f64>,

    /// Factored design torque (Nmm)
    #[serde(rename = "M_design_Nmm", default)]
    pub m_design_nmm: Option<f64>,

    #[serde(default)]
    pub ml_recommendation: Option<String>,

    /// Classifier probability per connection type, each in [0, 1]
    #[serde(default)]
    pub ml_probabilities: Option<BTreeMap<String, f64>>,

    #[serde(default)]
    pub input_parameters: Option<serde_json::Value>,

    /// Opaque calculation snapshot
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl ComputationResult {
    /// Factored design torque, falling back to the echoed required torque
    pub fn design_torque_nmm(&self) -> f64 {
        self.m_design_nmm.unwrap_or(self.required_torque_nmm)
    }

    /// Feasible count as reported, or counted from the capacities
    pub fn feasible_count(&self) -> usize {
        match self.feasible_connections_count {
            Some(count) if count.is_finite() && count >= 0.0 => count.round() as usize,
            _ => {
                let design = self.design_torque_nmm();
                self.capacities_nmm.values().filter(|c| **c >= design).count()
            }
        }
    }
}

// ============================================================================
// Connection labels
// ============================================================================

/// Connection types known to the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Press,
    Key,
    Spline,
}

impl ConnectionKind {
    pub const ALL: [ConnectionKind; 3] = [ConnectionKind::Press, ConnectionKind::Key, ConnectionKind::Spline];

    pub fn from_key(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "press" => Some(ConnectionKind::Press),
            "key" => Some(ConnectionKind::Key),
            "spline" => Some(ConnectionKind::Spline),
            _ => None,
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectionKind::Press => "Press",
            ConnectionKind::Key => "Key",
            ConnectionKind::Spline => "Spline",
        }
    }
}

/// Headline label for the analytical recommendation ("PRESS", "N/A", ...)
pub fn connection_label(key: Option<&str>) -> String {
    match key.filter(|k| !k.is_empty()) {
        None => "N/A".to_string(),
        Some(k) => match ConnectionKind::from_key(k) {
            Some(kind) => kind.display_name().to_uppercase(),
            None => k.to_uppercase(),
        },
    }
}

/// Label used in the classifier panel ("Press", unknown keys upper-cased)
pub fn ml_label(key: Option<&str>) -> String {
    match key.filter(|k| !k.is_empty()) {
        None => "N/A".to_string(),
        Some(k) => match ConnectionKind::from_key(k) {
            Some(kind) => kind.display_name().to_string(),
            None => k.to_uppercase(),
        },
    }
}

// ============================================================================
// Summary
// ============================================================================

/// One capacity compared against the design torque
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapacityRow {
    pub connection: String,
    pub label: String,
    pub capacity_nmm: f64,
    pub feasible: bool,
    /// (capacity - design) / design in percent, 0 when design <= 0
    pub margin_percent: f64,
    /// capacity / design clamped to [0, 1]
    pub fill_ratio: f64,
    pub recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub connection: String,
    pub score: f64,
    pub recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityRow {
    pub connection: String,
    pub label: String,
    pub probability: f64,
}

/// Hub wall thickness class derived from the stiffness factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StiffnessClass {
    Thick,
    Medium,
    Thin,
}

/// Severity tone for a stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Ok,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HubStiffness {
    pub factor: f64,
    pub class: StiffnessClass,
    pub tone: Tone,
}

impl HubStiffness {
    pub fn from_factor(factor: f64) -> Self {
        let class = if factor >= 0.85 {
            StiffnessClass::Thick
        } else if factor >= 0.5 {
            StiffnessClass::Medium
        } else {
            StiffnessClass::Thin
        };
        let tone = if factor >= 0.7 {
            Tone::Ok
        } else if factor >= 0.4 {
            Tone::Warn
        } else {
            Tone::Fail
        };
        HubStiffness { factor, class, tone }
    }
}

/// Display-ready aggregates of one service response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub recommended_label: String,
    pub design_torque_nmm: f64,
    pub feasible_count: usize,
    pub feasible: bool,
    /// Banner text, present only when nothing is feasible
    pub infeasible_reason: Option<String>,
    pub capacities: Vec<CapacityRow>,
    /// Highest score first
    pub scores: Vec<ScoreRow>,
    pub ml_label: String,
    pub ml_probabilities: Vec<ProbabilityRow>,
    pub hub_stiffness: Option<HubStiffness>,
    pub mu_used: Option<f64>,
}

/// Derive display aggregates from a service response.
pub fn summarize(result: &ComputationResult) -> ResultSummary {
    let design = result.design_torque_nmm();
    let recommended = result.recommended_connection.as_deref();

    let capacities = result
        .capacities_nmm
        .iter()
        .map(|(connection, &capacity)| {
            let (margin_percent, fill_ratio) = if design > 0.0 {
                ((capacity - design) / design * 100.0, (capacity / design).clamp(0.0, 1.0))
            } else {
                (0.0, 0.0)
            };
            CapacityRow {
                connection: connection.clone(),
                label: connection.to_uppercase(),
                capacity_nmm: capacity,
                feasible: capacity >= design,
                margin_percent,
                fill_ratio,
                recommended: Some(connection.as_str()) == recommended,
            }
        })
        .collect();

    let mut scores: Vec<ScoreRow> = result
        .scores
        .iter()
        .flatten()
        .map(|(connection, &score)| ScoreRow {
            connection: connection.clone(),
            score,
            recommended: Some(connection.as_str()) == recommended,
        })
        .collect();
    scores.sort_by(|a, b| b.score.total_cmp(&a.score));

    let ml_probabilities = result
        .ml_probabilities
        .iter()
        .flatten()
        .map(|(connection, &probability)| ProbabilityRow {
            connection: connection.clone(),
            label: ml_label(Some(connection)),
            probability,
        })
        .collect();

    let infeasible_reason = (!result.feasible).then(|| {
        result
            .reason
            .clone()
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_INFEASIBLE_HINT.to_string())
    });

    ResultSummary {
        recommended_label: connection_label(recommended),
        design_torque_nmm: design,
        feasible_count: result.feasible_count(),
        feasible: result.feasible,
        infeasible_reason,
        capacities,
        scores,
        ml_label: ml_label(result.ml_recommendation.as_deref()),
        ml_probabilities,
        hub_stiffness: result.hub_stiffness_factor.map(HubStiffness::from_factor),
        mu_used: result.mu_used,
    }
}

/// Format a value with thousands separators and no decimals ("50,000")
pub fn pretty(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round();
    let digits = format!("{}", rounded.abs() as u64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0.0 {
        out.insert(0, '-');
    }
    out
}
