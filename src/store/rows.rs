//! Materialized source rows.
//!
//! Plain data carried from the store to the builder. Field names follow
//! the builder's vocabulary rather than the source column names; the SQL
//! layer does the renaming.

use std::path::Path;

/// Descriptor of one stored specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecificationRow {
    /// Stable source identifier.
    pub id: String,
    /// Optional display name.
    pub long_name: Option<String>,
    /// Optional human-facing identifier.
    pub pid: Option<String>,
    /// Optional filesystem root the specification was compiled from.
    pub root_path: Option<String>,
}

impl SpecificationRow {
    /// Resolves the display title: `long_name`, else `pid`, else the base
    /// name of `root_path`, else the id.
    #[must_use]
    pub fn title(&self) -> String {
        if let Some(long_name) = self.long_name.as_deref().filter(|s| !s.is_empty()) {
            return long_name.to_string();
        }
        if let Some(pid) = self.pid.as_deref().filter(|s| !s.is_empty()) {
            return pid.to_string();
        }
        if let Some(base) = self
            .root_path
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|p| Path::new(p).file_name())
        {
            return base.to_string_lossy().into_owned();
        }
        self.id.clone()
    }
}

/// One document node, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRow {
    /// Stable source identifier.
    pub id: String,
    /// The node's object type.
    pub type_ref: String,
    /// Optional human-facing identifier; falls back to `id`.
    pub pid: Option<String>,
    /// Optional display title; falls back to `pid`, then `id`.
    pub title: Option<String>,
    /// Source heading depth. `2` is the shallowest real content level;
    /// NULL defaults to `2`.
    pub depth: Option<i64>,
    /// Position in total document order.
    pub sequence: i64,
    /// Optional Pandoc JSON body.
    pub ast: Option<String>,
    /// Optional pre-rendered markup body; wins over `ast`.
    pub content_xhtml: Option<String>,
}

impl ObjectRow {
    /// The human-facing identifier, falling back to the id. An empty
    /// string counts as absent.
    #[must_use]
    pub fn public_id(&self) -> &str {
        self.pid
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.id)
    }

    /// The display title, falling back to the public id, then the id. An
    /// empty string counts as absent.
    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.pid.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(&self.id)
    }
}

/// One declared datatype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatatypeRow {
    /// Stable source identifier.
    pub id: String,
    /// The declared primitive name (`STRING`, `ENUM`, ...).
    pub primitive: String,
}

/// One enumeration literal, ordered within its datatype.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValueRow {
    /// Stable source identifier of the literal.
    pub id: String,
    /// The owning enumeration datatype.
    pub datatype_ref: String,
    /// The literal's key.
    pub key: String,
}

/// One declared object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectTypeRow {
    /// Stable source identifier.
    pub id: String,
    /// Optional display name; falls back to the id.
    pub long_name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}

/// One attribute declaration: objects of `owner_type_ref` may carry a
/// `name` attribute typed by `datatype_ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTypeRow {
    /// The owning object type.
    pub owner_type_ref: String,
    /// The attribute name.
    pub name: String,
    /// The declared datatype.
    pub datatype_ref: String,
}

/// One attribute value row, with per-kind payload slots.
///
/// `kind` selects which slot the conversion reads; the remaining slots of
/// a well-formed row are NULL, but nothing enforces that at the source.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeValueRow {
    /// The node this value is attached to.
    pub owner_object_id: String,
    /// The attribute name.
    pub name: String,
    /// The row's declared kind tag; NULL means string.
    pub kind: Option<String>,
    /// String payload slot.
    pub string_value: Option<String>,
    /// Integer payload slot.
    pub int_value: Option<i64>,
    /// Real payload slot.
    pub real_value: Option<f64>,
    /// Boolean payload slot.
    pub bool_value: Option<bool>,
    /// Date payload slot, kept textual.
    pub date_value: Option<String>,
    /// Rich-text payload slot.
    pub xhtml_value: Option<String>,
    /// Enumeration literal reference.
    pub enum_ref: Option<String>,
    /// Untyped fallback text.
    pub raw_value: Option<String>,
}

/// One declared relation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationTypeRow {
    /// Stable source identifier.
    pub id: String,
    /// Optional display name; falls back to the id.
    pub long_name: Option<String>,
    /// Optional description.
    pub description: Option<String>,
}

/// One relation between two nodes, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationRow {
    /// Stable source identifier.
    pub id: String,
    /// Optional relation type; NULL picks the default type.
    pub type_ref: Option<String>,
    /// The source node.
    pub source: String,
    /// The target node.
    pub target: String,
}
