//! The command execution contract.
//!
//! Commands are structs whose fields are the parameters. Each implements
//! [`Execute`] against a [`BoardContext`] and returns its result as JSON, so
//! callers (CLI, tests, future tool surfaces) all consume the same shape.

use crate::store::TaskStore;
use crate::types::{UserId, WorkspaceId};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Execute a command against a context, producing a JSON value or an error.
#[async_trait]
pub trait Execute<C, E> {
    async fn execute(&self, ctx: &C) -> std::result::Result<Value, E>;
}

/// Context passed to every command: access, not logic.
///
/// Carries the store handle plus the identity the store authorizes against.
/// Commands do all the work.
pub struct BoardContext {
    store: Arc<dyn TaskStore>,
    caller: UserId,
    workspace_id: WorkspaceId,
}

impl BoardContext {
    pub fn new(store: Arc<dyn TaskStore>, caller: UserId, workspace_id: WorkspaceId) -> Self {
        Self {
            store,
            caller,
            workspace_id,
        }
    }

    pub fn store(&self) -> &dyn TaskStore {
        self.store.as_ref()
    }

    /// A cloneable handle to the store
    pub fn store_handle(&self) -> Arc<dyn TaskStore> {
        self.store.clone()
    }

    pub fn caller(&self) -> &UserId {
        &self.caller
    }

    pub fn workspace_id(&self) -> &WorkspaceId {
        &self.workspace_id
    }
}
