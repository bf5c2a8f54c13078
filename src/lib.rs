//! Spec-IR to ReqIF export
//!
//! Reads a specification and its schema from a Spec-IR SQLite database,
//! builds a typed [`ExportBundle`], and serializes it as a ReqIF document.

pub mod model;
pub use model::{ExportBundle, Identifier};

pub mod store;
pub use store::{Snapshot, Store};

pub mod export;
pub use export::{AssignId, RandomIds, StableIds, build_bundle};

pub mod render;

pub mod xml;
pub use xml::{to_xml_string, write_reqif};
