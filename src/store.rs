//! Read access to a Spec-IR database.
//!
//! The builder never touches SQL: [`Store::snapshot`] materializes every
//! row set one specification needs into a [`Snapshot`] up front.

/// Plain row types mirroring the source tables.
pub mod rows;
/// Choosing which specification to export.
pub mod select;

use std::path::Path;

use rusqlite::{Connection, OpenFlags, OptionalExtension};
use thiserror::Error;
use tracing::instrument;

use rows::{
    AttributeTypeRow, AttributeValueRow, DatatypeRow, EnumValueRow, ObjectRow, ObjectTypeRow,
    RelationRow, RelationTypeRow, SpecificationRow,
};
pub use select::{SelectionError, select_spec};

/// Failure talking to the relational store.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct StoreError(#[from] rusqlite::Error);

/// Every row set the builder needs for one specification.
#[derive(Debug)]
pub struct Snapshot {
    /// The specification's own descriptor row.
    pub spec: SpecificationRow,
    /// Document nodes in document order.
    pub objects: Vec<ObjectRow>,
    /// Declared datatypes.
    pub datatypes: Vec<DatatypeRow>,
    /// Enum literals, ordered within their datatype.
    pub enum_values: Vec<EnumValueRow>,
    /// Declared object types.
    pub object_types: Vec<ObjectTypeRow>,
    /// Declared attributes, ordered by owner then name.
    pub attribute_types: Vec<AttributeTypeRow>,
    /// Attribute values scoped to this specification.
    pub attribute_values: Vec<AttributeValueRow>,
    /// Declared relation types.
    pub relation_types: Vec<RelationTypeRow>,
    /// Relations scoped to this specification, both endpoints present.
    pub relations: Vec<RelationRow>,
}

/// Read-only handle on a Spec-IR database.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Opens the database at `path` read-only.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be opened as a SQLite
    /// database.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_NO_MUTEX
                | OpenFlags::SQLITE_OPEN_URI,
        )?;
        Ok(Self { conn })
    }

    /// Wraps an already opened connection.
    #[must_use]
    pub const fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Lists every specification id, ordered.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub fn spec_ids(&self) -> Result<Vec<String>, StoreError> {
        self.load(
            "SELECT identifier FROM specifications ORDER BY identifier",
            [],
            |row| row.get(0),
        )
    }

    /// Materializes everything the builder needs for one specification.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if any query fails.
    #[instrument(skip(self))]
    pub fn snapshot(&self, spec_id: &str) -> Result<Snapshot, StoreError> {
        Ok(Snapshot {
            spec: self.specification(spec_id)?,
            objects: self.objects(spec_id)?,
            datatypes: self.datatypes()?,
            enum_values: self.enum_values()?,
            object_types: self.object_types()?,
            attribute_types: self.attribute_types()?,
            attribute_values: self.attribute_values(spec_id)?,
            relation_types: self.relation_types()?,
            relations: self.relations(spec_id)?,
        })
    }

    fn load<T, P>(
        &self,
        sql: &str,
        params: P,
        map: impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>, StoreError>
    where
        P: rusqlite::Params,
    {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?.collect::<rusqlite::Result<_>>()?;
        Ok(rows)
    }

    fn specification(&self, spec_id: &str) -> Result<SpecificationRow, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT long_name, pid, root_path FROM specifications WHERE identifier = ?1",
                [spec_id],
                |row| {
                    Ok(SpecificationRow {
                        id: spec_id.to_string(),
                        long_name: row.get(0)?,
                        pid: row.get(1)?,
                        root_path: row.get(2)?,
                    })
                },
            )
            .optional()?;
        // A missing descriptor row still exports, titled by its id.
        Ok(row.unwrap_or_else(|| SpecificationRow {
            id: spec_id.to_string(),
            long_name: None,
            pid: None,
            root_path: None,
        }))
    }

    fn objects(&self, spec_id: &str) -> Result<Vec<ObjectRow>, StoreError> {
        self.load(
            "SELECT id, type_ref, pid, title_text, level, file_seq, ast, content_xhtml
             FROM spec_objects
             WHERE specification_ref = ?1
             ORDER BY file_seq ASC",
            [spec_id],
            |row| {
                Ok(ObjectRow {
                    id: row.get(0)?,
                    type_ref: row.get(1)?,
                    pid: row.get(2)?,
                    title: row.get(3)?,
                    depth: row.get(4)?,
                    sequence: row.get(5)?,
                    ast: row.get(6)?,
                    content_xhtml: row.get(7)?,
                })
            },
        )
    }

    fn datatypes(&self) -> Result<Vec<DatatypeRow>, StoreError> {
        self.load(
            "SELECT identifier, type FROM datatype_definitions",
            [],
            |row| {
                Ok(DatatypeRow {
                    id: row.get(0)?,
                    primitive: row.get(1)?,
                })
            },
        )
    }

    fn enum_values(&self) -> Result<Vec<EnumValueRow>, StoreError> {
        self.load(
            "SELECT identifier, datatype_ref, key FROM enum_values ORDER BY datatype_ref, sequence",
            [],
            |row| {
                Ok(EnumValueRow {
                    id: row.get(0)?,
                    datatype_ref: row.get(1)?,
                    key: row.get(2)?,
                })
            },
        )
    }

    fn object_types(&self) -> Result<Vec<ObjectTypeRow>, StoreError> {
        self.load(
            "SELECT identifier, long_name, description FROM spec_object_types ORDER BY identifier",
            [],
            |row| {
                Ok(ObjectTypeRow {
                    id: row.get(0)?,
                    long_name: row.get(1)?,
                    description: row.get(2)?,
                })
            },
        )
    }

    fn attribute_types(&self) -> Result<Vec<AttributeTypeRow>, StoreError> {
        self.load(
            "SELECT owner_type_ref, long_name, datatype_ref
             FROM spec_attribute_types
             ORDER BY owner_type_ref, long_name",
            [],
            |row| {
                Ok(AttributeTypeRow {
                    owner_type_ref: row.get(0)?,
                    name: row.get(1)?,
                    datatype_ref: row.get(2)?,
                })
            },
        )
    }

    fn attribute_values(&self, spec_id: &str) -> Result<Vec<AttributeValueRow>, StoreError> {
        self.load(
            "SELECT owner_object_id, name, datatype, string_value, int_value, real_value,
                    bool_value, date_value, xhtml_value, enum_ref, raw_value
             FROM spec_attribute_values
             WHERE specification_ref = ?1
             ORDER BY owner_object_id, name",
            [spec_id],
            |row| {
                Ok(AttributeValueRow {
                    owner_object_id: row.get(0)?,
                    name: row.get(1)?,
                    kind: row.get(2)?,
                    string_value: row.get(3)?,
                    int_value: row.get(4)?,
                    real_value: row.get(5)?,
                    // Stored as 0/1; only exactly 1 counts as true.
                    bool_value: row.get::<_, Option<i64>>(6)?.map(|v| v == 1),
                    date_value: row.get(7)?,
                    xhtml_value: row.get(8)?,
                    enum_ref: row.get(9)?,
                    raw_value: row.get(10)?,
                })
            },
        )
    }

    fn relation_types(&self) -> Result<Vec<RelationTypeRow>, StoreError> {
        self.load(
            "SELECT identifier, long_name, description
             FROM spec_relation_types
             ORDER BY identifier",
            [],
            |row| {
                Ok(RelationTypeRow {
                    id: row.get(0)?,
                    long_name: row.get(1)?,
                    description: row.get(2)?,
                })
            },
        )
    }

    fn relations(&self, spec_id: &str) -> Result<Vec<RelationRow>, StoreError> {
        self.load(
            "SELECT r.id, r.type_ref, r.source_object_id, r.target_object_id
             FROM spec_relations r
             JOIN spec_objects s1 ON s1.id = r.source_object_id
             JOIN spec_objects s2 ON s2.id = r.target_object_id
             WHERE r.specification_ref = ?1
               AND r.target_object_id IS NOT NULL
             ORDER BY r.id",
            [spec_id],
            |row| {
                Ok(RelationRow {
                    id: row.get(0)?,
                    type_ref: row.get(1)?,
                    source: row.get(2)?,
                    target: row.get(3)?,
                })
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = "
        CREATE TABLE specifications (
            identifier TEXT PRIMARY KEY, long_name TEXT, pid TEXT, root_path TEXT);
        CREATE TABLE spec_objects (
            id TEXT PRIMARY KEY, specification_ref TEXT, type_ref TEXT, pid TEXT,
            title_text TEXT, level INTEGER, file_seq INTEGER, ast TEXT, content_xhtml TEXT);
        CREATE TABLE datatype_definitions (identifier TEXT PRIMARY KEY, type TEXT);
        CREATE TABLE enum_values (
            identifier TEXT PRIMARY KEY, datatype_ref TEXT, key TEXT, sequence INTEGER);
        CREATE TABLE spec_object_types (
            identifier TEXT PRIMARY KEY, long_name TEXT, description TEXT);
        CREATE TABLE spec_attribute_types (
            owner_type_ref TEXT, long_name TEXT, datatype_ref TEXT);
        CREATE TABLE spec_attribute_values (
            owner_object_id TEXT, specification_ref TEXT, name TEXT, datatype TEXT,
            string_value TEXT, int_value INTEGER, real_value REAL, bool_value INTEGER,
            date_value TEXT, xhtml_value TEXT, enum_ref TEXT, raw_value TEXT);
        CREATE TABLE spec_relation_types (
            identifier TEXT PRIMARY KEY, long_name TEXT, description TEXT);
        CREATE TABLE spec_relations (
            id TEXT PRIMARY KEY, specification_ref TEXT, type_ref TEXT,
            source_object_id TEXT, target_object_id TEXT);
    ";

    fn store_with(inserts: &str) -> Store {
        let conn = Connection::open_in_memory().expect("in-memory database opens");
        conn.execute_batch(SCHEMA).expect("schema applies");
        conn.execute_batch(inserts).expect("fixture rows insert");
        Store::new(conn)
    }

    #[test]
    fn spec_ids_come_back_ordered() {
        let store = store_with(
            "INSERT INTO specifications (identifier) VALUES ('zeta'), ('alpha'), ('mid');",
        );
        let ids = store.spec_ids().expect("query succeeds");
        assert_eq!(ids, ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn objects_are_scoped_and_ordered_by_file_sequence() {
        let store = store_with(
            "INSERT INTO specifications (identifier) VALUES ('s1');
             INSERT INTO spec_objects (id, specification_ref, type_ref, file_seq)
             VALUES ('b', 's1', 'SECTION', 20),
                    ('a', 's1', 'SECTION', 10),
                    ('x', 'other', 'SECTION', 1);",
        );
        let snapshot = store.snapshot("s1").expect("snapshot succeeds");

        let ids: Vec<&str> = snapshot.objects.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn a_missing_descriptor_row_still_snapshots() {
        let store = store_with("");
        let snapshot = store.snapshot("ghost").expect("snapshot succeeds");

        assert_eq!(snapshot.spec.id, "ghost");
        assert_eq!(snapshot.spec.title(), "ghost");
        assert!(snapshot.objects.is_empty());
    }

    #[test]
    fn booleans_count_only_exact_one_as_true() {
        let store = store_with(
            "INSERT INTO spec_attribute_values
                 (owner_object_id, specification_ref, name, datatype, bool_value)
             VALUES ('n1', 's1', 'a', 'BOOLEAN', 1),
                    ('n1', 's1', 'b', 'BOOLEAN', 0),
                    ('n1', 's1', 'c', 'BOOLEAN', 2),
                    ('n1', 's1', 'd', 'BOOLEAN', NULL);",
        );
        let snapshot = store.snapshot("s1").expect("snapshot succeeds");

        let bools: Vec<Option<bool>> = snapshot
            .attribute_values
            .iter()
            .map(|v| v.bool_value)
            .collect();
        assert_eq!(bools, [Some(true), Some(false), Some(false), None]);
    }

    #[test]
    fn relations_require_both_endpoints_and_a_target() {
        let store = store_with(
            "INSERT INTO spec_objects (id, specification_ref, type_ref, file_seq)
             VALUES ('a', 's1', 'SECTION', 1), ('b', 's1', 'SECTION', 2);
             INSERT INTO spec_relations (id, specification_ref, type_ref, source_object_id, target_object_id)
             VALUES ('keep', 's1', NULL, 'a', 'b'),
                    ('dangling', 's1', NULL, 'a', 'ghost'),
                    ('untargeted', 's1', NULL, 'a', NULL);",
        );
        let snapshot = store.snapshot("s1").expect("snapshot succeeds");

        assert_eq!(snapshot.relations.len(), 1);
        assert_eq!(snapshot.relations[0].id, "keep");
        assert!(snapshot.relations[0].type_ref.is_none());
    }

    #[test]
    fn enum_values_keep_their_declared_sequence() {
        let store = store_with(
            "INSERT INTO enum_values (identifier, datatype_ref, key, sequence)
             VALUES ('second', 'dt', 'two', 2),
                    ('first', 'dt', 'one', 1);",
        );
        let snapshot = store.snapshot("s1").expect("snapshot succeeds");

        let ids: Vec<&str> = snapshot.enum_values.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["first", "second"]);
    }

    #[test]
    fn attribute_declarations_order_by_owner_then_name() {
        let store = store_with(
            "INSERT INTO spec_attribute_types (owner_type_ref, long_name, datatype_ref)
             VALUES ('B', 'z', 'dt'), ('A', 'b', 'dt'), ('A', 'a', 'dt');",
        );
        let snapshot = store.snapshot("s1").expect("snapshot succeeds");

        let pairs: Vec<(&str, &str)> = snapshot
            .attribute_types
            .iter()
            .map(|d| (d.owner_type_ref.as_str(), d.name.as_str()))
            .collect();
        assert_eq!(pairs, [("A", "a"), ("A", "b"), ("B", "z")]);
    }

    #[test]
    fn open_reads_an_existing_database_file() {
        let dir = tempfile::tempdir().expect("temp dir creates");
        let path = dir.path().join("specir.db");
        {
            let conn = Connection::open(&path).expect("database file creates");
            conn.execute_batch(SCHEMA).expect("schema applies");
            conn.execute_batch(
                "INSERT INTO specifications (identifier, long_name) VALUES ('s1', 'Spec One');",
            )
            .expect("fixture rows insert");
        }

        let store = Store::open(&path).expect("store opens");
        assert_eq!(store.spec_ids().expect("query succeeds"), ["s1"]);
        let snapshot = store.snapshot("s1").expect("snapshot succeeds");
        assert_eq!(snapshot.spec.title(), "Spec One");
    }

    #[test]
    fn opening_a_missing_file_fails() {
        let dir = tempfile::tempdir().expect("temp dir creates");
        assert!(Store::open(&dir.path().join("absent.db")).is_err());
    }
}
