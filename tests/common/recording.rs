//! In-memory connector double that records every call.

#![allow(clippy::duplicate_mod)]

use async_trait::async_trait;
use secure_form_storage::connectors::{
    ConnectorKind, DataConnector, DeleteOutcome, FieldDescriptor, ReadOutcome,
};
use secure_form_storage::domain::{
    ColumnNameMap, EntryId, EntryRecord, Form, FormId, FormSettings, SecureValueSet,
};
use secure_form_storage::{Result, SecureStorageError};
use std::collections::HashMap;
use std::sync::Mutex;

/// One observed connector call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Init,
    AddRecord { entry_id: EntryId, form_id: FormId, values: Vec<(String, String)>, columns: Vec<(String, String)> },
    GetRecord(EntryId),
    DeleteRecord(EntryId),
    PrepareForm { form_id: FormId, is_new: bool },
}

#[derive(Debug, Default)]
pub struct RecordingConnector {
    calls: Mutex<Vec<Call>>,
    records: Mutex<HashMap<EntryId, EntryRecord>>,
    /// Entries whose delete fails with a connection error
    failing_deletes: Mutex<Vec<EntryId>>,
    unsupported_reads: bool,
    unsupported_deletes: bool,
    fail_reads: bool,
    reject_init: bool,
}

impl RecordingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn without_reads() -> Self {
        Self { unsupported_reads: true, ..Self::default() }
    }

    pub fn without_deletes() -> Self {
        Self { unsupported_deletes: true, ..Self::default() }
    }

    pub fn failing_reads() -> Self {
        Self { fail_reads: true, ..Self::default() }
    }

    pub fn misconfigured() -> Self {
        Self { reject_init: true, ..Self::default() }
    }

    pub fn fail_delete_of(&self, entry_id: i64) {
        self.failing_deletes.lock().unwrap().push(EntryId::new(entry_id));
    }

    pub fn seed(&self, entry_id: i64, record: EntryRecord) {
        self.records.lock().unwrap().insert(EntryId::new(entry_id), record);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls other than `init`
    pub fn operations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| *c != Call::Init).collect()
    }

    pub fn has_record(&self, entry_id: i64) -> bool {
        self.records.lock().unwrap().contains_key(&EntryId::new(entry_id))
    }

    fn log(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DataConnector for RecordingConnector {
    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Vault
    }

    fn label(&self) -> &str {
        "Recording"
    }

    async fn init(&self, _settings: &FormSettings) -> Result<bool> {
        self.log(Call::Init);
        if self.reject_init {
            return Err(SecureStorageError::config("Missing required settings: secure_client_id"));
        }
        Ok(false)
    }

    async fn add_record(
        &self,
        values: &SecureValueSet,
        entry_id: EntryId,
        form_id: FormId,
        columns: &ColumnNameMap,
    ) -> Result<()> {
        self.log(Call::AddRecord {
            entry_id,
            form_id,
            values: values.iter().map(|(k, v)| (k.to_string(), v.expose().to_string())).collect(),
            columns: columns.iter().map(|(k, c)| (k.to_string(), c.to_string())).collect(),
        });
        self.records.lock().unwrap().insert(entry_id, EntryRecord::from(values.clone()));
        Ok(())
    }

    async fn get_record(&self, entry_id: EntryId) -> Result<ReadOutcome> {
        self.log(Call::GetRecord(entry_id));
        if self.unsupported_reads {
            return Ok(ReadOutcome::Unsupported);
        }
        if self.fail_reads {
            return Err(SecureStorageError::connection("recording", "backend unreachable"));
        }
        Ok(match self.records.lock().unwrap().get(&entry_id) {
            Some(record) => ReadOutcome::Found(record.clone()),
            None => ReadOutcome::NotFound,
        })
    }

    async fn delete_record(&self, entry_id: EntryId) -> Result<DeleteOutcome> {
        self.log(Call::DeleteRecord(entry_id));
        if self.unsupported_deletes {
            return Ok(DeleteOutcome::Unsupported);
        }
        if self.failing_deletes.lock().unwrap().contains(&entry_id) {
            return Err(SecureStorageError::connection("recording", "backend unreachable"));
        }
        Ok(match self.records.lock().unwrap().remove(&entry_id) {
            Some(_) => DeleteOutcome::Deleted(1),
            None => DeleteOutcome::NotFound,
        })
    }

    fn settings_fields(&self) -> Vec<FieldDescriptor> {
        vec![FieldDescriptor::credential("recording_token", "Token", "Recording token")]
    }

    async fn prepare_form(&self, form: &Form, is_new: bool) -> Result<()> {
        self.log(Call::PrepareForm { form_id: form.id, is_new });
        Ok(())
    }
}
