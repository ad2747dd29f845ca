//! # Form Session
//!
//! [`FormSession`] owns everything one open form needs: the fields, the hub
//! length mode, the current diagnostics, the material list and the last
//! service result. Every edit goes through [`FormSession::set`], which runs
//! derivation and then validation against the fully merged fields.
//!
//! The session is single-threaded. The only suspension points are the two
//! service calls, and both are split into begin/finish halves so the caller
//! can drive them from any event loop:
//!
//! ```text
//! begin_submit() ──► service call ──► complete_submit(id, outcome)
//!      │ (loading = true)                  │ (loading = false)
//!      └─ refused while loading or while diagnostics exist
//! ```
//!
//! An outcome whose id is not the submission in flight (the form was reset
//! meanwhile) is discarded.
//!
//! ## Example
//!
//! ```rust
//! use selector_core::fields::FieldUpdate;
//! use selector_core::session::FormSession;
//!
//! let mut session = FormSession::new();
//! session.set(FieldUpdate::new().with_shaft_diameter(48.0).with_has_bending(false));
//! assert_eq!(session.fields().hub_length, 24.0);
//!
//! session.set(FieldUpdate::new().with_hub_length(40.0));
//! session.set(FieldUpdate::new().with_shaft_diameter(60.0));
//! assert_eq!(session.fields().hub_length, 40.0);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::derivation::{self, LengthMode};
use crate::errors::{SelectorError, SelectorResult};
use crate::fields::{FieldName, FieldSet, FieldUpdate, PreferenceKey};
use crate::result::{summarize, ComputationResult, ResultSummary};
use crate::service::{ConnectionService, MATERIALS_UNAVAILABLE};
use crate::snapshot::FormSnapshot;
use crate::submission::{prepare, SelectionRequest};
use crate::validation::{validate, Diagnostics};

/// Handle for one outstanding material list request.
///
/// Cancelled when a newer load starts or the session is torn down; the
/// outcome of a cancelled load is discarded.
#[derive(Debug, Clone)]
pub struct MaterialLoad {
    cancelled: Arc<AtomicBool>,
}

impl MaterialLoad {
    fn new() -> Self {
        MaterialLoad {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn same_as(&self, other: &MaterialLoad) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

/// A request that passed the gate, tagged with its submission id
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub id: Uuid,
    pub request: SelectionRequest,
}

/// What was sent for the current or last submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub request: SelectionRequest,
}

/// State of one open connection form.
#[derive(Debug)]
pub struct FormSession {
    fields: FieldSet,
    length_mode: LengthMode,
    diagnostics: Diagnostics,

    materials: Vec<String>,
    materials_warning: Option<String>,
    material_load: Option<MaterialLoad>,

    result: Option<ComputationResult>,
    banner: Option<String>,
    in_flight: Option<Uuid>,
    last_submission: Option<SubmissionRecord>,
}

impl Default for FormSession {
    fn default() -> Self {
        FormSession::new()
    }
}

impl FormSession {
    /// Open a form with default values.
    pub fn new() -> Self {
        let fields = FieldSet::default();
        let diagnostics = validate(&fields);
        FormSession {
            fields,
            length_mode: LengthMode::default(),
            diagnostics,
            materials: Vec::new(),
            materials_warning: None,
            material_load: None,
            result: None,
            banner: None,
            in_flight: None,
            last_submission: None,
        }
    }

    // ------------------------------------------------------------------
    // Field store
    // ------------------------------------------------------------------

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn length_is_auto_derived(&self) -> bool {
        self.length_mode.length_is_auto_derived
    }

    /// Hint shown next to the hub length ("D ..." or "0.5D ...")
    pub fn length_rule_label(&self) -> &'static str {
        derivation::length_rule_label(self.fields.has_bending)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Apply a user edit. Never fails.
    pub fn set(&mut self, update: FieldUpdate) -> &FieldSet {
        self.apply(&update, true)
    }

    /// Apply raw text typed into a field. Malformed input leaves the field as it was.
    pub fn edit_text(&mut self, field: FieldName, raw: &str) -> &FieldSet {
        match FieldUpdate::from_text(field, raw) {
            Some(update) => self.apply(&update, true),
            None => {
                tracing::debug!(field = field.key(), raw, "ignored unparseable input");
                &self.fields
            }
        }
    }

    pub fn set_preference(&mut self, key: PreferenceKey, value: f64) -> &FieldSet {
        self.apply(&FieldUpdate::new().with_preference(key, value), true)
    }

    /// Clamp a numeric field to its input bounds, as when the input loses focus.
    ///
    /// This is an engine write and does not count as a hub length edit.
    pub fn commit_field(&mut self, field: FieldName) -> &FieldSet {
        let (Some((lo, hi)), Some(value)) = (field.input_bounds(), self.fields.numeric(field)) else {
            return &self.fields;
        };
        if !value.is_finite() {
            return &self.fields;
        }
        let clamped = value.clamp(lo, hi);
        if clamped == value {
            return &self.fields;
        }
        self.apply(&FieldUpdate::new().with_numeric(field, Some(clamped)), false)
    }

    /// Back to defaults: fields, length mode, result and banner. A pending
    /// submission is abandoned and its outcome will be discarded.
    pub fn reset(&mut self) {
        if let Some(id) = self.in_flight.take() {
            tracing::info!(submission = %id, "abandoned in-flight submission");
        }
        self.fields = FieldSet::default();
        self.length_mode = LengthMode::default();
        self.diagnostics = validate(&self.fields);
        self.result = None;
        self.banner = None;
        tracing::info!("form reset to defaults");
    }

    fn apply(&mut self, update: &FieldUpdate, user_edit: bool) -> &FieldSet {
        self.fields.merge(update);
        derivation::apply(&mut self.fields, &mut self.length_mode, update, user_edit);
        self.diagnostics = validate(&self.fields);
        &self.fields
    }

    // ------------------------------------------------------------------
    // Material list
    // ------------------------------------------------------------------

    pub fn materials(&self) -> &[String] {
        &self.materials
    }

    /// Non-fatal warning when the material list could not be loaded
    pub fn materials_warning(&self) -> Option<&str> {
        self.materials_warning.as_deref()
    }

    pub fn materials_loading(&self) -> bool {
        self.material_load.is_some()
    }

    /// Start a material list request, cancelling any older one.
    pub fn begin_material_load(&mut self) -> MaterialLoad {
        if let Some(previous) = self.material_load.take() {
            previous.cancel();
        }
        let ticket = MaterialLoad::new();
        self.material_load = Some(ticket.clone());
        ticket
    }

    /// Apply the outcome of a material request.
    ///
    /// Returns `false` when the ticket was cancelled or superseded and the
    /// outcome was discarded.
    pub fn finish_material_load(&mut self, ticket: &MaterialLoad, outcome: SelectorResult<Vec<String>>) -> bool {
        let current = self.material_load.as_ref().is_some_and(|t| t.same_as(ticket));
        if ticket.is_cancelled() || !current {
            tracing::debug!("discarding stale material list response");
            return false;
        }
        self.material_load = None;

        match outcome {
            Ok(materials) => {
                tracing::info!(count = materials.len(), "material list loaded");
                self.materials_warning = None;
                if let Some(first) = materials.first() {
                    let mut update = FieldUpdate::new();
                    if !materials.contains(&self.fields.shaft_material) {
                        update.shaft_material = Some(first.clone());
                    }
                    if !materials.contains(&self.fields.hub_material) {
                        update.hub_material = Some(first.clone());
                    }
                    if !update.is_empty() {
                        self.apply(&update, false);
                    }
                }
                self.materials = materials;
            }
            Err(e) => {
                tracing::warn!(error = %e, "material list unavailable");
                self.materials.clear();
                self.materials_warning = Some(MATERIALS_UNAVAILABLE.to_string());
            }
        }
        true
    }

    /// Fetch and apply the material list.
    pub async fn load_materials<S: ConnectionService + ?Sized>(&mut self, service: &S) -> bool {
        let ticket = self.begin_material_load();
        let outcome = service.fetch_materials().await;
        self.finish_material_load(&ticket, outcome)
    }

    /// Tear down: outstanding material requests are cancelled.
    pub fn close(&mut self) {
        if let Some(ticket) = self.material_load.take() {
            ticket.cancel();
        }
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Error banner from the last failed or refused submission
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn last_submission(&self) -> Option<&SubmissionRecord> {
        self.last_submission.as_ref()
    }

    /// Pass the gate and produce the request to send.
    ///
    /// On success the snapped fields are written back, the previous result
    /// is cleared and the session is marked loading.
    ///
    /// # Returns
    ///
    /// * `Err(SelectorError::SubmissionInFlight)` - a submission is already loading
    /// * `Err(SelectorError::SubmissionBlocked)` - diagnostics present; nothing is sent
    pub fn begin_submit(&mut self) -> SelectorResult<PendingSubmission> {
        if self.in_flight.is_some() {
            return Err(SelectorError::SubmissionInFlight);
        }

        let prepared = match prepare(&self.fields) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(diagnostics = self.diagnostics.len(), "submission blocked");
                self.diagnostics = validate(&self.fields);
                self.banner = Some(e.banner_message());
                return Err(e);
            }
        };

        self.fields = prepared.fields;
        self.diagnostics = validate(&self.fields);
        self.banner = None;
        self.result = None;

        let record = SubmissionRecord {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            request: prepared.request.clone(),
        };
        tracing::info!(
            submission = %record.id,
            required_torque = ?record.request.required_torque,
            "submitting connection selection"
        );
        let pending = PendingSubmission {
            id: record.id,
            request: prepared.request,
        };
        self.in_flight = Some(record.id);
        self.last_submission = Some(record);
        Ok(pending)
    }

    /// Record the service outcome. The result is replaced wholesale; an
    /// error becomes the banner. Either way the form is editable again.
    ///
    /// # Returns
    ///
    /// * `Err(SelectorError::StaleResponse)` - `id` is not in flight; nothing changed
    pub fn complete_submit(
        &mut self,
        id: Uuid,
        outcome: SelectorResult<ComputationResult>,
    ) -> SelectorResult<ResultSummary> {
        if self.in_flight != Some(id) {
            tracing::warn!(submission = %id, "discarding stale selection response");
            return Err(SelectorError::StaleResponse {
                submission: id.to_string(),
            });
        }
        self.in_flight = None;
        match outcome {
            Ok(result) => {
                let summary = summarize(&result);
                tracing::info!(
                    submission = %id,
                    recommended = %summary.recommended_label,
                    feasible = summary.feasible_count,
                    "selection received"
                );
                self.result = Some(result);
                Ok(summary)
            }
            Err(e) => {
                tracing::warn!(submission = %id, code = e.error_code(), error = %e, "selection failed");
                self.banner = Some(e.banner_message());
                Err(e)
            }
        }
    }

    /// Gate, send and record in one step.
    pub async fn submit<S: ConnectionService + ?Sized>(&mut self, service: &S) -> SelectorResult<ResultSummary> {
        let pending = self.begin_submit()?;
        let outcome = service.select_connection(&pending.request).await;
        self.complete_submit(pending.id, outcome)
    }

    pub fn result(&self) -> Option<&ComputationResult> {
        self.result.as_ref()
    }

    pub fn summary(&self) -> Option<ResultSummary> {
        self.result.as_ref().map(summarize)
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub fn snapshot(&self) -> FormSnapshot {
        FormSnapshot::new(self.fields.clone(), self.length_mode)
    }

    /// Replace fields and length mode from a snapshot; results are cleared.
    pub fn restore(&mut self, snapshot: FormSnapshot) {
        self.fields = snapshot.fields;
        self.length_mode = snapshot.length_mode;
        self.diagnostics = validate(&self.fields);
        self.result = None;
        self.banner = None;
    }
}

impl Drop for FormSession {
    fn drop(&mut self) {
        self.close();
    }
}
