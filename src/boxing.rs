//! Boxing of generated tag groups
//!
//!     A "box" is a wrapper expression placed around a brace group that carries yor metadata,
//!     so the group can be switched off with a boolean variable:
//!
//!         tags = { yor_trace = "..." }
//!         tags = (var.yor_toggle ? { yor_trace = "..." } : {})
//!
//! Pipeline
//!
//!     1. [template]: compile the rendered box template into left and right token halves.
//!     2. [tags]: find the brace groups that contain a marked key.
//!     3. [toggles]: find wrappers that are already there.
//!     4. [engine]: strip stale wrappers and insert new ones, highest index first.
//!
//!     [boxer] ties the steps together for one attribute value at a time.

pub mod boxer;
pub mod engine;
pub mod error;
pub mod range;
pub mod tags;
pub mod template;
pub mod toggles;

pub use boxer::{BlockSelector, Boxer};
pub use error::{BoxError, TemplateError};
pub use range::{Side, ToggleRange, TokenRange};
pub use tags::{scan_tag_ranges, KeyMatcher, DEFAULT_MARKED_KEYS};
pub use template::{BoxTemplate, BEGIN_MARKER, END_MARKER};
pub use toggles::{scan_legacy_toggle_ranges, scan_toggle_ranges, ToggleRanges};
