//! Entry deletion hooks
//!
//! Deleting an entry in the host store removes its secure record too. Bulk
//! deletion stops at the first connector error so no entry is dropped
//! locally while its secure values survive remotely.

use super::SubmissionOrchestrator;
use crate::connectors::DeleteOutcome;
use crate::domain::{EntryId, EntryStatus, Form, FormId};
use crate::errors::{Result, SecureStorageError};
use async_trait::async_trait;
use tracing::{info, warn, Instrument};

/// Host-side enumeration of entries
#[async_trait]
pub trait EntryLookup: Send + Sync {
    /// Ids of a form's entries, optionally restricted to one status
    async fn entry_ids(&self, form_id: FormId, status: Option<EntryStatus>) -> Result<Vec<EntryId>>;
}

/// Tally of a bulk deletion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkDeleteReport {
    pub attempted: usize,
    pub deleted: usize,
    pub not_found: usize,
    pub conflicts: usize,
    pub unsupported: usize,
}

impl BulkDeleteReport {
    fn record(&mut self, outcome: &DeleteOutcome) {
        self.attempted += 1;
        match outcome {
            DeleteOutcome::Deleted(_) => self.deleted += 1,
            DeleteOutcome::NotFound => self.not_found += 1,
            DeleteOutcome::Conflict => self.conflicts += 1,
            DeleteOutcome::Unsupported => self.unsupported += 1,
        }
    }
}

impl SubmissionOrchestrator {
    /// Remove the secure record of one entry.
    ///
    /// `Ok(None)` when the form does not use secure storage. A connector that
    /// cannot delete is an error unless the policy acknowledges it.
    pub async fn delete_entry(&self, entry_id: EntryId, form: &Form) -> Result<Option<DeleteOutcome>> {
        let Some(connector) = self.connector_for(form).await? else {
            return Ok(None);
        };

        self.entries.invalidate(entry_id).await;
        let outcome = connector
            .delete_record(entry_id)
            .instrument(crate::connector_span!(connector.kind(), "delete_record", entry_id = %entry_id))
            .await?;

        match outcome {
            DeleteOutcome::Deleted(records) => {
                info!(entry_id = %entry_id, records, "Deleted secure record");
            }
            DeleteOutcome::NotFound => {
                info!(entry_id = %entry_id, "No secure record to delete");
            }
            DeleteOutcome::Conflict => {
                warn!(entry_id = %entry_id, "Secure record deletion conflicted; treating as deleted");
            }
            DeleteOutcome::Unsupported if self.policy.allow_unsupported_delete => {
                warn!(
                    entry_id = %entry_id,
                    connector = %connector.kind(),
                    "Connector cannot delete records; secure values remain in the backend"
                );
            }
            DeleteOutcome::Unsupported => {
                return Err(SecureStorageError::unsupported(connector.kind().as_str(), "delete_record"));
            }
        }

        Ok(Some(outcome))
    }

    /// Remove the secure records of every entry matching `status`.
    ///
    /// Halts on the first error; entries after it are not attempted.
    pub async fn delete_entries(
        &self,
        form: &Form,
        status: Option<EntryStatus>,
        lookup: &dyn EntryLookup,
    ) -> Result<BulkDeleteReport> {
        self.delete_all(form, status, lookup)
            .instrument(crate::submission_span!("delete_entries", form.id, status = ?status))
            .await
    }

    async fn delete_all(
        &self,
        form: &Form,
        status: Option<EntryStatus>,
        lookup: &dyn EntryLookup,
    ) -> Result<BulkDeleteReport> {
        let mut report = BulkDeleteReport::default();
        if !self.is_enabled(form) {
            return Ok(report);
        }

        let entry_ids = lookup.entry_ids(form.id, status).await?;
        for entry_id in entry_ids {
            if let Some(outcome) = self.delete_entry(entry_id, form).await? {
                report.record(&outcome);
            }
        }

        info!(
            attempted = report.attempted,
            deleted = report.deleted,
            not_found = report.not_found,
            "Bulk secure record deletion finished"
        );
        Ok(report)
    }
}
