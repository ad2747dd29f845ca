//! # selector_core - Shaft-Hub Connection Form Engine
//!
//! `selector_core` holds the client-side state of a shaft-hub connection
//! selector: the input fields, the hub length rule, field validation, the
//! submission gate and the presentation of the service's answer. The torque
//! capacity calculations themselves run on a remote selection service; this
//! crate only talks to it through [`service::ConnectionService`].
//!
//! ## Design Philosophy
//!
//! - **Explicit state**: the "hub length is still derived" flag is a field, not a heuristic
//! - **JSON-First**: all wire and snapshot types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types, never fatal to the form
//! - **No panics**: malformed input is ignored or reported, never unwrapped
//!
//! ## Quick Start
//!
//! ```rust
//! use selector_core::fields::{FieldName, FieldUpdate};
//! use selector_core::session::FormSession;
//!
//! let mut session = FormSession::new();
//! session.edit_text(FieldName::ShaftDiameter, "45");
//! assert_eq!(session.fields().hub_length, 45.0);
//!
//! session.set(FieldUpdate::new().with_shaft_diameter(4.0));
//! assert!(session.diagnostics().has(FieldName::ShaftDiameter));
//! assert!(session.begin_submit().is_err());
//! ```
//!
//! ## Modules
//!
//! - [`fields`] - Field catalogue, defaults and partial updates
//! - [`derivation`] - Hub length rule and the auto-derived flag
//! - [`validation`] - Pure field diagnostics
//! - [`submission`] - Torque snapping and the request payload
//! - [`result`] - Service response and its display aggregates
//! - [`service`] - HTTP client for the selection service
//! - [`session`] - The form state machine tying it all together
//! - [`snapshot`] - Atomic save/load of form state
//! - [`config`] - Service URL and client settings
//! - [`errors`] - Structured error types

pub mod config;
pub mod derivation;
pub mod errors;
pub mod fields;
pub mod result;
pub mod service;
pub mod session;
pub mod snapshot;
pub mod submission;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use config::SelectorConfig;
pub use errors::{SelectorError, SelectorResult};
pub use fields::{FieldName, FieldSet, FieldUpdate, PreferenceKey};
pub use result::{ComputationResult, ResultSummary};
pub use service::{ConnectionService, HttpConnectionService};
pub use session::FormSession;
pub use snapshot::{load_snapshot, save_snapshot, FormSnapshot};
pub use validation::{validate, Diagnostics};
