//! Per-request context: who is calling and where records live

use crate::role::Role;
use crate::store::{EventStore, User};
use async_trait::async_trait;
use gatehouse_authorization::{CallerRole, RuleError};
use std::sync::Arc;

/// Request context handed to every event rule
#[derive(Debug, Clone)]
pub struct EventContext {
    caller: Option<String>,
    store: Arc<EventStore>,
}

impl EventContext {
    /// Context of a logged-in caller
    pub fn new(caller: impl Into<String>, store: Arc<EventStore>) -> Self {
        Self {
            caller: Some(caller.into()),
            store,
        }
    }

    /// Context of a request without a session
    pub fn anonymous(store: Arc<EventStore>) -> Self {
        Self { caller: None, store }
    }

    /// Logged-in user id, if any
    pub fn caller(&self) -> Option<&str> {
        self.caller.as_deref()
    }

    /// Record store of this request
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// Record of the logged-in caller; unknown callers are an error
    pub async fn caller_record(&self) -> Result<Option<User>, RuleError> {
        let Some(id) = self.caller() else {
            return Ok(None);
        };
        match self.store.user(id).await {
            Some(user) => Ok(Some(user)),
            None => Err(RuleError::new(
                "caller",
                format!("session refers to unknown user `{id}`"),
            )),
        }
    }
}

#[async_trait]
impl CallerRole<Role> for EventContext {
    async fn caller_role(&self) -> Result<Option<Role>, RuleError> {
        Ok(self.caller_record().await?.and_then(|user| user.role))
    }
}
