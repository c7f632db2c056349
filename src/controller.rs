use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::{AdminError, AdminResult},
    repository::RepositoryState,
    resource::{Record, Resource, ResourceSchema, record_flag, record_id},
};

/// Confirmation
///
/// The explicit answer to "are you sure?" that a destructive operation requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl From<bool> for Confirmation {
    fn from(confirmed: bool) -> Self {
        if confirmed {
            Confirmation::Confirmed
        } else {
            Confirmation::Declined
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    /// The confirmation was declined; nothing was sent to the store.
    Cancelled,
}

/// ControllerView
///
/// A snapshot of the controller state, as rendered by the admin pages.
#[derive(Debug, Clone, Serialize, ToSchema, TS)]
#[ts(export)]
pub struct ControllerView {
    pub resource: Resource,
    #[schema(value_type = Vec<Object>)]
    #[ts(type = "Array<Record<string, unknown>>")]
    pub items: Vec<Record>,
    pub is_loading: bool,
    pub is_saving: bool,
    pub is_modal_open: bool,
    pub editing_id: Option<Uuid>,
    #[schema(value_type = Object)]
    #[ts(type = "Record<string, unknown>")]
    pub draft: Record,
    /// Set when the last list fetch failed; `items` then holds the previous list.
    pub list_error: Option<String>,
    /// Message of the last failed save or delete.
    pub save_error: Option<String>,
}

#[derive(Debug)]
struct ControllerState {
    items: Vec<Record>,
    is_loading: bool,
    is_saving: bool,
    is_modal_open: bool,
    editing: Option<Record>,
    draft: Record,
    list_error: Option<String>,
    save_error: Option<String>,
}

/// Resets `is_saving` however the save ends, including when its future is dropped.
struct SavingGuard<'a>(&'a Mutex<ControllerState>);

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.lock().is_saving = false;
    }
}

/// ResourceAdminController
///
/// Mediates between a list view, an edit form and the persistence collaborator for
/// exactly one table. One generic implementation serves every resource; what
/// differs between tables lives in its `ResourceSchema`.
///
/// State sits behind a lock that is never held across an `.await`, so a shared
/// controller can observe its own in-flight save (`is_saving`) and reject a
/// duplicate submission.
pub struct ResourceAdminController {
    repo: RepositoryState,
    schema: &'static ResourceSchema,
    state: Mutex<ControllerState>,
    mounted: AtomicBool,
    fetch_epoch: AtomicU64,
}

impl ResourceAdminController {
    pub fn new(repo: RepositoryState, resource: Resource) -> Self {
        let schema = resource.schema();
        Self {
            repo,
            schema,
            state: Mutex::new(ControllerState {
                items: Vec::new(),
                is_loading: false,
                is_saving: false,
                is_modal_open: false,
                editing: None,
                draft: schema.empty_template(),
                list_error: None,
                save_error: None,
            }),
            mounted: AtomicBool::new(true),
            fetch_epoch: AtomicU64::new(0),
        }
    }

    /// Builds the controller and performs the initial fetch, as mounting a page does.
    pub async fn mount(repo: RepositoryState, resource: Resource) -> Arc<Self> {
        let controller = Arc::new(Self::new(repo, resource));
        if let Err(e) = controller.refresh().await {
            tracing::warn!(table = resource.table(), error = %e, "initial fetch failed");
        }
        controller
    }

    pub fn resource(&self) -> Resource {
        self.schema.resource
    }

    pub fn schema(&self) -> &'static ResourceSchema {
        self.schema
    }

    /// Marks the controller defunct. Calls still in flight finish, but their
    /// results are no longer applied.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    // --- Read accessors ---

    pub fn view(&self) -> ControllerView {
        let state = self.state.lock();
        ControllerView {
            resource: self.resource(),
            items: state.items.clone(),
            is_loading: state.is_loading,
            is_saving: state.is_saving,
            is_modal_open: state.is_modal_open,
            editing_id: state.editing.as_ref().and_then(record_id),
            draft: state.draft.clone(),
            list_error: state.list_error.clone(),
            save_error: state.save_error.clone(),
        }
    }

    pub fn items(&self) -> Vec<Record> {
        self.state.lock().items.clone()
    }

    pub fn draft(&self) -> Record {
        self.state.lock().draft.clone()
    }

    pub fn find(&self, id: Uuid) -> Option<Record> {
        self.state
            .lock()
            .items
            .iter()
            .find(|r| record_id(r) == Some(id))
            .cloned()
    }

    pub fn is_modal_open(&self) -> bool {
        self.state.lock().is_modal_open
    }

    pub fn is_saving(&self) -> bool {
        self.state.lock().is_saving
    }

    // --- Operations ---

    /// refresh
    ///
    /// Re-reads the whole table ordered by the schema's sort key, newest first.
    /// On failure the previous list stays in place and `list_error` records why,
    /// so the page can offer a retry. A response superseded by a newer refresh, or
    /// arriving after `unmount`, is dropped.
    pub async fn refresh(&self) -> AdminResult<()> {
        let epoch = self.fetch_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.lock().is_loading = true;

        let result = self
            .repo
            .list(self.resource(), self.schema.sort_key, false, None)
            .await;

        if !self.is_mounted() || self.fetch_epoch.load(Ordering::SeqCst) != epoch {
            tracing::debug!(table = self.schema.table, epoch, "discarding stale list response");
            return Ok(());
        }

        let mut state = self.state.lock();
        state.is_loading = false;
        match result {
            Ok(items) => {
                state.items = items;
                state.list_error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(table = self.schema.table, error = %e, "list fetch failed");
                state.list_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn open_create(&self) {
        let mut state = self.state.lock();
        state.editing = None;
        state.draft = self.schema.empty_template();
        state.save_error = None;
        state.is_modal_open = true;
    }

    pub fn open_edit(&self, record: Record) {
        let mut state = self.state.lock();
        state.draft = self.schema.draft_from(&record);
        state.editing = Some(record);
        state.save_error = None;
        state.is_modal_open = true;
    }

    pub fn close_modal(&self) {
        let mut state = self.state.lock();
        state.is_modal_open = false;
        state.editing = None;
        state.draft = self.schema.empty_template();
    }

    /// Sets one draft field. Names outside the schema are rejected.
    pub fn set_field(&self, name: &str, value: Value) -> AdminResult<()> {
        if self.schema.field(name).is_none() {
            return Err(AdminError::validation(name, "is not a field of this form"));
        }
        self.state.lock().draft.insert(name.to_string(), value);
        Ok(())
    }

    /// Merges a set of form values into the draft, ignoring non-editable keys
    /// such as `id` and `created_at`.
    pub fn apply(&self, values: Record) {
        let mut state = self.state.lock();
        for (name, value) in values {
            if self.schema.field(&name).is_some() {
                state.draft.insert(name, value);
            }
        }
    }

    /// submit
    ///
    /// Validates the draft, then inserts it (create mode) or updates the record
    /// being edited. A successful save refreshes the list and closes the form; a
    /// failed one keeps the form open with the draft intact.
    pub async fn submit(&self) -> AdminResult<()> {
        let (payload, editing_id) = {
            let mut state = self.state.lock();
            if state.is_saving {
                return Err(AdminError::SaveInProgress);
            }
            let payload = self.schema.validate(&state.draft)?;
            let editing_id = match &state.editing {
                Some(record) => Some(record_id(record).ok_or_else(|| {
                    AdminError::NotFound(format!("{} being edited has no id", self.schema.label))
                })?),
                None => None,
            };
            state.is_saving = true;
            state.save_error = None;
            (payload, editing_id)
        };
        let _saving = SavingGuard(&self.state);

        let result = match editing_id {
            Some(id) => self.repo.update(self.resource(), id, payload).await,
            None => self.repo.insert(self.resource(), payload).await.map(|_| ()),
        };

        if !self.is_mounted() {
            return result.map_err(AdminError::from);
        }

        match result {
            Ok(()) => {
                tracing::info!(table = self.schema.table, ?editing_id, "saved {}", self.schema.label);
                // The save itself succeeded; a failed re-read is reported through `list_error`.
                let _ = self.refresh().await;
                self.close_modal();
                Ok(())
            }
            Err(e) => {
                let action = if editing_id.is_some() { "updating" } else { "creating" };
                self.state.lock().save_error = Some(format!("Error {action} {}: {e}", self.schema.label));
                Err(e.into())
            }
        }
    }

    /// remove
    ///
    /// Deletes a row by id. Irreversible, so nothing is sent unless the caller
    /// passes `Confirmation::Confirmed`.
    pub async fn remove(&self, id: Uuid, confirmation: Confirmation) -> AdminResult<RemoveOutcome> {
        if confirmation == Confirmation::Declined {
            return Ok(RemoveOutcome::Cancelled);
        }

        match self.repo.delete_by_id(self.resource(), id).await {
            Ok(()) => {
                tracing::info!(table = self.schema.table, %id, "deleted {}", self.schema.label);
                let _ = self.refresh().await;
                Ok(RemoveOutcome::Removed)
            }
            Err(e) => {
                if self.is_mounted() {
                    self.state.lock().save_error = Some(format!("Error deleting {}: {e}", self.schema.label));
                }
                Err(e.into())
            }
        }
    }

    /// Flips the `featured` flag of a row, then refreshes.
    pub async fn toggle_featured(&self, record: &Record) -> AdminResult<()> {
        if !self.schema.supports_featured() {
            return Err(AdminError::Unsupported {
                resource: self.schema.table,
                operation: "featured",
            });
        }
        let id = record_id(record)
            .ok_or_else(|| AdminError::NotFound(format!("{} has no id", self.schema.label)))?;

        let mut patch = Record::new();
        patch.insert("featured".to_string(), Value::Bool(!record_flag(record, "featured")));

        self.repo.update(self.resource(), id, patch).await?;
        let _ = self.refresh().await;
        Ok(())
    }

    /// add_tag
    ///
    /// Appends a tag to the draft. Returns false when the trimmed text is empty
    /// or already present.
    pub fn add_tag(&self, text: &str) -> AdminResult<bool> {
        self.require_tags()?;
        let tag = text.trim();
        if tag.is_empty() {
            return Ok(false);
        }

        let mut state = self.state.lock();
        let mut tags = take_tags(&mut state.draft);
        let added = !tags.iter().any(|t| t.as_str() == Some(tag));
        if added {
            tags.push(Value::from(tag));
        }
        state.draft.insert("tags".to_string(), Value::Array(tags));
        Ok(added)
    }

    pub fn remove_tag(&self, text: &str) -> AdminResult<()> {
        self.require_tags()?;
        let mut state = self.state.lock();
        let mut tags = take_tags(&mut state.draft);
        tags.retain(|t| t.as_str() != Some(text));
        state.draft.insert("tags".to_string(), Value::Array(tags));
        Ok(())
    }

    fn require_tags(&self) -> AdminResult<()> {
        if self.schema.supports_tags() {
            Ok(())
        } else {
            Err(AdminError::Unsupported {
                resource: self.schema.table,
                operation: "tags",
            })
        }
    }
}

fn take_tags(draft: &mut Record) -> Vec<Value> {
    match draft.remove("tags") {
        Some(Value::Array(tags)) => tags,
        _ => Vec::new(),
    }
}
