//! Thread-safe in-memory work-item tracking for tests.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::workflow::domain::WorkItemId;
use crate::workflow::ports::{
    PatchOperation, Relation, RemoteError, WorkItemPayload, WorkItemTracking,
};

/// Field path prefix of field patch operations.
const FIELDS_PATH_PREFIX: &str = "/fields/";

/// Patch path of relation appends.
const RELATIONS_APPEND_PATH: &str = "/relations/-";

/// Patch path of state updates.
const STATE_FIELD_PATH: &str = "/fields/System.State";

/// Thread-safe in-memory work-item store with failure injection.
#[derive(Debug, Clone, Default)]
pub struct InMemoryWorkItemTracking {
    state: Arc<RwLock<WorkItemState>>,
}

#[derive(Debug, Default)]
struct WorkItemState {
    work_items: HashMap<u64, Map<String, Value>>,
    relations: HashMap<u64, Vec<Relation>>,
    fail_state_updates: bool,
    fail_relation_patches: bool,
    fail_relation_reads: bool,
}

impl InMemoryWorkItemTracking {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a work item with the standard orchestration fields.
    pub fn insert_work_item(
        &self,
        id: u64,
        title: &str,
        work_item_type: &str,
        team_project: &str,
        state: &str,
    ) {
        let mut fields = Map::new();
        fields.insert("System.Id".to_owned(), Value::from(id));
        fields.insert("System.Title".to_owned(), Value::from(title));
        fields.insert("System.WorkItemType".to_owned(), Value::from(work_item_type));
        fields.insert("System.TeamProject".to_owned(), Value::from(team_project));
        fields.insert("System.State".to_owned(), Value::from(state));
        self.write().work_items.insert(id, fields);
    }

    /// Seeds an existing relation.
    pub fn seed_relation(&self, id: u64, rel: &str, url: &str) {
        self.write().relations.entry(id).or_default().push(Relation {
            rel: rel.to_owned(),
            url: url.to_owned(),
        });
    }

    /// Makes subsequent state updates fail.
    pub fn set_fail_state_updates(&self, fail: bool) {
        self.write().fail_state_updates = fail;
    }

    /// Makes subsequent relation patches fail.
    pub fn set_fail_relation_patches(&self, fail: bool) {
        self.write().fail_relation_patches = fail;
    }

    /// Makes subsequent relation reads fail.
    pub fn set_fail_relation_reads(&self, fail: bool) {
        self.write().fail_relation_reads = fail;
    }

    /// Returns a field's string value for assertions.
    #[must_use]
    pub fn field(&self, id: u64, field: &str) -> Option<String> {
        self.read()
            .work_items
            .get(&id)
            .and_then(|fields| fields.get(field))
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    /// Returns the relations attached to a work item.
    #[must_use]
    pub fn relations_of(&self, id: u64) -> Vec<Relation> {
        self.read().relations.get(&id).cloned().unwrap_or_default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, WorkItemState> {
        self.state.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, WorkItemState> {
        self.state.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Not-found API error for a missing work item.
fn not_found(id: WorkItemId) -> RemoteError {
    RemoteError::Api {
        status: 404,
        message: format!("work item {id} does not exist"),
    }
}

#[async_trait]
impl WorkItemTracking for InMemoryWorkItemTracking {
    async fn work_item(
        &self,
        id: WorkItemId,
        _fields: &[&str],
    ) -> Result<Option<WorkItemPayload>, RemoteError> {
        Ok(self.read().work_items.get(&id.value()).map(|fields| {
            WorkItemPayload {
                id: id.value(),
                fields: fields.clone(),
            }
        }))
    }

    async fn update_work_item(
        &self,
        id: WorkItemId,
        _project: &str,
        operations: &[PatchOperation],
    ) -> Result<(), RemoteError> {
        let mut state = self.write();
        if !state.work_items.contains_key(&id.value()) {
            return Err(not_found(id));
        }

        for operation in operations {
            if operation.path == STATE_FIELD_PATH && state.fail_state_updates {
                return Err(RemoteError::Api {
                    status: 500,
                    message: "injected state-update failure".to_owned(),
                });
            }
            if operation.path == RELATIONS_APPEND_PATH && state.fail_relation_patches {
                return Err(RemoteError::Api {
                    status: 500,
                    message: "injected relation-patch failure".to_owned(),
                });
            }
        }

        for operation in operations {
            if let Some(field) = operation.path.strip_prefix(FIELDS_PATH_PREFIX) {
                if let Some(fields) = state.work_items.get_mut(&id.value()) {
                    fields.insert(field.to_owned(), operation.value.clone());
                }
            } else if operation.path == RELATIONS_APPEND_PATH {
                let rel = operation
                    .value
                    .get("rel")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                let url = operation
                    .value
                    .get("url")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                state
                    .relations
                    .entry(id.value())
                    .or_default()
                    .push(Relation { rel, url });
            }
        }
        Ok(())
    }

    async fn work_item_relations(
        &self,
        id: WorkItemId,
        _project: &str,
    ) -> Result<Vec<Relation>, RemoteError> {
        let state = self.read();
        if state.fail_relation_reads {
            return Err(RemoteError::Api {
                status: 500,
                message: "injected relation-read failure".to_owned(),
            });
        }
        if !state.work_items.contains_key(&id.value()) {
            return Err(not_found(id));
        }
        Ok(state
            .relations
            .get(&id.value())
            .cloned()
            .unwrap_or_default())
    }

    async fn query_work_item_ids(
        &self,
        _wiql: &str,
        _project: Option<&str>,
        limit: u32,
    ) -> Result<Vec<WorkItemId>, RemoteError> {
        let mut ids: Vec<u64> = self.read().work_items.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids
            .into_iter()
            .take(limit as usize)
            .filter_map(|id| WorkItemId::new(id).ok())
            .collect())
    }
}
