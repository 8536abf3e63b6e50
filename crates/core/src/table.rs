//! Destination table specifications.
//!
//! The load stage is driven by an ordered list of [`TableSpec`] values,
//! never by hardcoded control flow, so tests can substitute specs that
//! point at broken partitions. The write mode is an explicit field:
//! exactly one table (`master_table`) appends across runs, the derived
//! tables are overwritten as snapshots.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ── Write mode ────────────────────────────────────────────────

/// Policy for writing a table's rows into the relational store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Insert rows, keeping whatever the table already holds.
    Append,
    /// Truncate the table, then insert.
    Overwrite,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteMode::Append => write!(f, "append"),
            WriteMode::Overwrite => write!(f, "overwrite"),
        }
    }
}

// ── Columns ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Varchar(u32),
    Text,
    Integer,
    Double,
    TextArray,
}

impl ColumnType {
    pub fn sql(&self) -> String {
        match self {
            ColumnType::Varchar(n) => format!("VARCHAR({n})"),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::Double => "DOUBLE PRECISION".to_string(),
            ColumnType::TextArray => "TEXT[]".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    pub col_type: ColumnType,
    pub primary_key: bool,
}

impl ColumnSpec {
    pub fn new(name: &str, col_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            col_type,
            primary_key: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    fn ddl(&self) -> String {
        if self.primary_key {
            format!("{} {} PRIMARY KEY", self.name, self.col_type.sql())
        } else {
            format!("{} {}", self.name, self.col_type.sql())
        }
    }
}

// ── Table spec ────────────────────────────────────────────────

/// One destination table: where its columnar partition lives relative to
/// the load input directory, how it is written, and its column set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSpec {
    pub name: String,
    pub partition: PathBuf,
    pub mode: WriteMode,
    pub columns: Vec<ColumnSpec>,
}

impl TableSpec {
    pub fn new(name: &str, partition: &str, mode: WriteMode, columns: Vec<ColumnSpec>) -> Self {
        Self {
            name: name.to_string(),
            partition: PathBuf::from(partition),
            mode,
            columns,
        }
    }

    /// Idempotent creation statement for this table.
    pub fn create_table_sql(&self) -> String {
        let cols: Vec<String> = self.columns.iter().map(ColumnSpec::ddl).collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.name,
            cols.join(", ")
        )
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// The five destination tables of a dataset snapshot, in load order.
pub fn default_tables() -> Vec<TableSpec> {
    use ColumnType::*;

    vec![
        TableSpec::new(
            "master_table",
            "stage2/master_table",
            WriteMode::Append,
            vec![
                ColumnSpec::new("track_id", Varchar(50)),
                ColumnSpec::new("track_name", Text),
                ColumnSpec::new("track_popularity", Integer),
                ColumnSpec::new("artist_id", Varchar(50)),
                ColumnSpec::new("artist_name", Text),
                ColumnSpec::new("followers", Double),
                ColumnSpec::new("genres", Text),
                ColumnSpec::new("artist_popularity", Integer),
                ColumnSpec::new("danceability", Double),
                ColumnSpec::new("energy", Double),
                ColumnSpec::new("tempo", Double),
                ColumnSpec::new("related_ids", TextArray),
            ],
        ),
        TableSpec::new(
            "recommendations_exploded",
            "stage3/recommendations_exploded",
            WriteMode::Overwrite,
            vec![
                ColumnSpec::new("id", Varchar(50)),
                ColumnSpec::new("related_id", Varchar(50)),
            ],
        ),
        TableSpec::new(
            "artist_track",
            "stage3/artist_track",
            WriteMode::Overwrite,
            vec![
                ColumnSpec::new("id", Varchar(50)),
                ColumnSpec::new("artist_id", Varchar(50)),
            ],
        ),
        TableSpec::new(
            "track_metadata",
            "stage3/track_metadata",
            WriteMode::Overwrite,
            vec![
                ColumnSpec::new("id", Varchar(50)).primary_key(),
                ColumnSpec::new("name", Text),
                ColumnSpec::new("popularity", Integer),
                ColumnSpec::new("duration_ms", Integer),
                ColumnSpec::new("danceability", Double),
                ColumnSpec::new("energy", Double),
                ColumnSpec::new("tempo", Double),
            ],
        ),
        TableSpec::new(
            "artist_metadata",
            "stage3/artist_metadata",
            WriteMode::Overwrite,
            vec![
                ColumnSpec::new("id", Varchar(50)).primary_key(),
                ColumnSpec::new("name", Text),
                ColumnSpec::new("followers", Double),
                ColumnSpec::new("popularity", Integer),
            ],
        ),
    ]
}

// ── Tests ─────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn five_tables_in_load_order() {
        let tables = default_tables();
        let names: Vec<&str> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "master_table",
                "recommendations_exploded",
                "artist_track",
                "track_metadata",
                "artist_metadata",
            ]
        );
    }

    #[test]
    fn exactly_one_append_table() {
        let tables = default_tables();
        let append: Vec<&TableSpec> = tables
            .iter()
            .filter(|t| t.mode == WriteMode::Append)
            .collect();
        assert_eq!(append.len(), 1);
        assert_eq!(append[0].name, "master_table");
    }

    #[test]
    fn master_table_column_set() {
        let tables = default_tables();
        let master = &tables[0];
        assert_eq!(master.columns.len(), 12);
        assert_eq!(
            master.column_names(),
            vec![
                "track_id",
                "track_name",
                "track_popularity",
                "artist_id",
                "artist_name",
                "followers",
                "genres",
                "artist_popularity",
                "danceability",
                "energy",
                "tempo",
                "related_ids",
            ]
        );
    }

    #[test]
    fn create_table_sql_is_idempotent_ddl() {
        let tables = default_tables();
        for table in &tables {
            assert!(table
                .create_table_sql()
                .starts_with("CREATE TABLE IF NOT EXISTS"));
        }
    }

    #[test]
    fn artist_metadata_ddl() {
        let tables = default_tables();
        let artist = tables.iter().find(|t| t.name == "artist_metadata").unwrap();
        assert_eq!(
            artist.create_table_sql(),
            "CREATE TABLE IF NOT EXISTS artist_metadata (id VARCHAR(50) PRIMARY KEY, \
             name TEXT, followers DOUBLE PRECISION, popularity INTEGER)"
        );
    }

    #[test]
    fn related_ids_is_text_array() {
        let tables = default_tables();
        let master = &tables[0];
        let related = master.columns.last().unwrap();
        assert_eq!(related.col_type, ColumnType::TextArray);
        assert_eq!(related.col_type.sql(), "TEXT[]");
    }

    #[test]
    fn partition_paths_match_layout() {
        let tables = default_tables();
        assert_eq!(tables[0].partition, PathBuf::from("stage2/master_table"));
        for table in &tables[1..] {
            assert!(table.partition.starts_with("stage3"));
        }
    }
}
