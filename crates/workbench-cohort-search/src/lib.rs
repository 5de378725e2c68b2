//! Editable cohort search requests
//!
//! This crate holds the in-memory tree a researcher edits while building a
//! cohort, and the conversions between it and the persisted
//! `CohortDefinition`:
//! - `map_request` folds the editable tree into the wire definition
//! - `parse_cohort_definition` inflates stored criteria back into the tree
//! - `Action`s update the tree as a value
//! - `EditorSession` ties the tree to its id registry, mirror and store
//!
//! # Example
//!
//! ```
//! use workbench_cohort_search::{map_request, parse_cohort_definition};
//!
//! let request = parse_cohort_definition(r#"{"includes":[],"excludes":[],"dataFilters":[]}"#)?;
//! assert!(map_request(&request).is_empty());
//! # Ok::<(), workbench_cohort_diagnostics::CohortError>(())
//! ```

pub mod action;
pub mod display;
pub mod ids;
pub mod mapper;
pub mod mirror;
pub mod parser;
pub mod request;
pub mod selection;
pub mod session;
pub mod store;

pub use action::{Action, GroupTarget};
pub use ids::IdRegistry;
pub use mapper::{has_active_items, map_group, map_group_item, map_parameter, map_request};
pub use mirror::{FileMirror, MemoryMirror, MirrorSnapshot, SessionMirror};
pub use parser::{inflate_definition, parse_cohort_definition};
pub use request::{EditableGroup, EditableItem, ItemStatus, SearchRequest};
pub use selection::{RawSelection, Selection};
pub use session::{EditorSession, MIRROR_KEY, SessionConfig};
pub use store::{CohortStore, InMemoryCohortStore, ParticipantCounter};
