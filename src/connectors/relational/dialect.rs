//! SQL dialect differences
//!
//! Statements run through `sqlx::Any`, which passes SQL through untouched, so
//! placeholders, DDL types and catalog queries are rendered per backend here.
//! Every identifier is quoted; only values are bound as parameters.

use crate::errors::{Result, SecureStorageError};
use std::fmt;

/// Longest identifier accepted by every supported backend
const MAX_IDENTIFIER_LEN: usize = 63;

/// Supported relational backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlDialect {
    Postgres,
    Sqlite,
}

impl SqlDialect {
    /// Dialect of a connection URL
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            _ => Err(SecureStorageError::config(format!(
                "Unsupported database URL scheme '{}': expected postgres:// or sqlite:",
                scheme
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgresql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Positional placeholder for the `n`th (1-based) bound value
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            Self::Postgres => format!("${}", n),
            Self::Sqlite => "?".to_string(),
        }
    }

    /// `count` comma separated placeholders starting at `first`
    pub fn placeholders(&self, first: usize, count: usize) -> String {
        (first..first + count).map(|n| self.placeholder(n)).collect::<Vec<_>>().join(", ")
    }

    /// Create a per-form table with its fixed columns
    pub fn create_table_sql(&self, table: &str) -> Result<String> {
        let table = quote_ident(table)?;
        Ok(match self {
            Self::Postgres => format!(
                "CREATE TABLE IF NOT EXISTS {} (\
                 id BIGSERIAL PRIMARY KEY, \
                 entry_id BIGINT NOT NULL UNIQUE, \
                 submitted TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP)",
                table
            ),
            Self::Sqlite => format!(
                "CREATE TABLE IF NOT EXISTS {} (\
                 id INTEGER PRIMARY KEY AUTOINCREMENT, \
                 entry_id INTEGER NOT NULL UNIQUE, \
                 submitted TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP)",
                table
            ),
        })
    }

    /// Add a nullable text column
    pub fn add_column_sql(&self, table: &str, column: &str) -> Result<String> {
        let table = quote_ident(table)?;
        let column = quote_ident(column)?;
        Ok(match self {
            Self::Postgres => {
                format!("ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} TEXT NULL", table, column)
            }
            Self::Sqlite => format!("ALTER TABLE {} ADD COLUMN {} TEXT NULL", table, column),
        })
    }

    /// Catalog query returning one row if the table (bound as parameter 1) exists
    pub fn table_exists_sql(&self) -> &'static str {
        match self {
            Self::Postgres => {
                "SELECT table_name::text FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = $1"
            }
            Self::Sqlite => "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
        }
    }

    /// Catalog query listing the columns of the table bound as parameter 1
    pub fn columns_sql(&self) -> &'static str {
        match self {
            Self::Postgres => {
                "SELECT column_name::text FROM information_schema.columns \
                 WHERE table_schema = current_schema() AND table_name = $1"
            }
            Self::Sqlite => "SELECT name FROM pragma_table_info(?)",
        }
    }

    /// DDL of the entry index and per-entry column tables
    pub fn metadata_tables_sql(&self) -> [&'static str; 2] {
        [
            "CREATE TABLE IF NOT EXISTS secure_entry_index (\
             site_id BIGINT NOT NULL, \
             entry_id BIGINT NOT NULL, \
             form_id BIGINT NOT NULL, \
             table_name TEXT NOT NULL, \
             PRIMARY KEY (site_id, entry_id))",
            "CREATE TABLE IF NOT EXISTS secure_entry_columns (\
             site_id BIGINT NOT NULL, \
             entry_id BIGINT NOT NULL, \
             field_key TEXT NOT NULL, \
             column_name TEXT NOT NULL, \
             PRIMARY KEY (site_id, entry_id, field_key))",
        ]
    }

    /// Upsert (site_id, entry_id, form_id, table_name) into the entry index
    pub fn upsert_index_sql(&self) -> String {
        format!(
            "INSERT INTO secure_entry_index (site_id, entry_id, form_id, table_name) VALUES ({}) \
             ON CONFLICT (site_id, entry_id) DO UPDATE SET \
             form_id = excluded.form_id, table_name = excluded.table_name",
            self.placeholders(1, 4)
        )
    }

    /// Record (site_id, entry_id, field_key, column_name) for one stored value
    pub fn insert_entry_column_sql(&self) -> String {
        format!(
            "INSERT INTO secure_entry_columns (site_id, entry_id, field_key, column_name) VALUES ({})",
            self.placeholders(1, 4)
        )
    }

    /// Forget the recorded columns of an entry, by (site_id, entry_id)
    pub fn delete_entry_columns_sql(&self) -> String {
        format!(
            "DELETE FROM secure_entry_columns WHERE site_id = {} AND entry_id = {}",
            self.placeholder(1),
            self.placeholder(2)
        )
    }

    /// Table name of an entry, by (site_id, entry_id)
    pub fn lookup_index_sql(&self) -> String {
        format!(
            "SELECT table_name FROM secure_entry_index WHERE site_id = {} AND entry_id = {}",
            self.placeholder(1),
            self.placeholder(2)
        )
    }

    /// Remove an entry from the index, by (site_id, entry_id)
    pub fn delete_index_sql(&self) -> String {
        format!(
            "DELETE FROM secure_entry_index WHERE site_id = {} AND entry_id = {}",
            self.placeholder(1),
            self.placeholder(2)
        )
    }

    /// Columns holding an entry's values, by (site_id, entry_id)
    pub fn entry_columns_sql(&self) -> String {
        format!(
            "SELECT field_key, column_name FROM secure_entry_columns \
             WHERE site_id = {} AND entry_id = {}",
            self.placeholder(1),
            self.placeholder(2)
        )
    }

    /// Insert one row: entry id first, then one value per column
    pub fn insert_row_sql(&self, table: &str, columns: &[&str]) -> Result<String> {
        let mut names = vec!["entry_id".to_string()];
        for column in columns {
            names.push(quote_ident(column)?);
        }
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote_ident(table)?,
            names.join(", "),
            self.placeholders(1, names.len())
        ))
    }

    /// Select the given columns of one entry's row
    pub fn select_row_sql(&self, table: &str, columns: &[&str]) -> Result<String> {
        let mut names = Vec::with_capacity(columns.len());
        for column in columns {
            names.push(quote_ident(column)?);
        }
        let projection = if names.is_empty() { "entry_id".to_string() } else { names.join(", ") };
        Ok(format!(
            "SELECT {} FROM {} WHERE entry_id = {}",
            projection,
            quote_ident(table)?,
            self.placeholder(1)
        ))
    }

    /// Delete one entry's row
    pub fn delete_row_sql(&self, table: &str) -> Result<String> {
        Ok(format!("DELETE FROM {} WHERE entry_id = {}", quote_ident(table)?, self.placeholder(1)))
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// True for non-empty `[a-z0-9_]` names no longer than the identifier limit
pub fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_IDENTIFIER_LEN
        && name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Double-quote a generated identifier, rejecting anything outside `[a-z0-9_]`
pub fn quote_ident(name: &str) -> Result<String> {
    if !is_safe_identifier(name) {
        return Err(SecureStorageError::validation_field(
            format!("'{}' is not a valid storage identifier", name),
            "column_name",
        ));
    }
    Ok(format!("\"{}\"", name))
}
