//! Per-form table provisioning
//!
//! One table per form named `site_{siteId}_form_{formId}`. Columns are only
//! ever added: existing columns are never dropped, renamed or retyped.

use super::dialect::SqlDialect;
use crate::domain::{ColumnNameMap, FormId, SiteId};
use crate::errors::{Result, SecureStorageError};
use sqlx::AnyPool;
use sqlx::Row;
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Table holding a form's secured submissions
pub fn table_name(site_id: SiteId, form_id: FormId) -> String {
    format!("site_{}_form_{}", site_id, form_id)
}

/// What a provisioning run changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionReport {
    pub table: String,
    pub created: bool,
    pub added_columns: Vec<String>,
}

/// DDL and catalog access for one pool
#[derive(Debug, Clone)]
pub struct SchemaManager {
    pool: AnyPool,
    dialect: SqlDialect,
}

impl SchemaManager {
    pub fn new(pool: AnyPool, dialect: SqlDialect) -> Self {
        Self { pool, dialect }
    }

    /// Create the entry index and entry column tables if missing
    pub async fn ensure_metadata_tables(&self) -> Result<()> {
        for ddl in self.dialect.metadata_tables_sql() {
            sqlx::query(ddl).execute(&self.pool).await.map_err(|e| {
                SecureStorageError::database(e, "Failed to create secure storage metadata tables")
            })?;
        }
        Ok(())
    }

    pub async fn table_exists(&self, table: &str) -> Result<bool> {
        let row = sqlx::query(self.dialect.table_exists_sql())
            .bind(table.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                SecureStorageError::database(e, format!("Failed to look up table '{}'", table))
            })?;
        Ok(row.is_some())
    }

    /// Column names currently present on `table`
    pub async fn existing_columns(&self, table: &str) -> Result<BTreeSet<String>> {
        let rows = sqlx::query(self.dialect.columns_sql())
            .bind(table.to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                SecureStorageError::database(e, format!("Failed to list columns of '{}'", table))
            })?;

        let mut columns = BTreeSet::new();
        for row in rows {
            columns.insert(row.try_get::<String, _>(0)?);
        }
        Ok(columns)
    }

    /// Create `table` if it does not exist; true when it was created
    pub async fn ensure_table(&self, table: &str) -> Result<bool> {
        if self.table_exists(table).await? {
            return Ok(false);
        }

        let ddl = self.dialect.create_table_sql(table)?;
        sqlx::query(&ddl).execute(&self.pool).await.map_err(|e| {
            SecureStorageError::database(e, format!("Failed to create table '{}'", table))
        })?;

        info!(table = %table, "Created secure storage table");
        Ok(true)
    }

    /// Add every column in `wanted` that `table` lacks; returns the added names
    pub async fn ensure_columns<'a, I>(&self, table: &str, wanted: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let existing = self.existing_columns(table).await?;
        let mut added = Vec::new();

        for column in wanted {
            if existing.contains(column) || added.iter().any(|a: &String| a == column) {
                continue;
            }

            let ddl = self.dialect.add_column_sql(table, column)?;
            sqlx::query(&ddl).execute(&self.pool).await.map_err(|e| {
                SecureStorageError::database(
                    e,
                    format!("Failed to add column '{}' to '{}'", column, table),
                )
            })?;

            debug!(table = %table, column = %column, "Added secure storage column");
            added.push(column.to_string());
        }

        Ok(added)
    }

    /// Bring `table` in line with a form's column map
    pub async fn provision(&self, table: &str, columns: &ColumnNameMap) -> Result<ProvisionReport> {
        let collisions = columns.collisions();
        if !collisions.is_empty() {
            return Err(SecureStorageError::validation(format!(
                "Fields of this form map to the same column: {}",
                collisions.join(", ")
            )));
        }

        self.ensure_metadata_tables().await?;
        let created = self.ensure_table(table).await?;
        let wanted: Vec<&str> = columns.iter().map(|(_, c)| c).collect();
        let added_columns = self.ensure_columns(table, wanted).await?;

        if created || !added_columns.is_empty() {
            info!(
                table = %table,
                created,
                added_columns = added_columns.len(),
                "Provisioned secure storage table"
            );
        }

        Ok(ProvisionReport { table: table.to_string(), created, added_columns })
    }
}
