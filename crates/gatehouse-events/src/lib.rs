//! # Gatehouse Events - Layer 3: Event Platform Policy
//!
//! Permissions of an event-organising platform expressed as role-gated rule
//! trees: account tiers, the request context, a record store the leaf
//! predicates read from, and the per-tier policies composed into one tree.
//!
//! ```rust,no_run
//! use gatehouse_authorization::ShieldConfig;
//! use gatehouse_events::{policy, EventContext, EventStore};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(EventStore::load_from_file("fixtures/store.json".as_ref())?);
//! let shield = policy::shield(ShieldConfig::default())?;
//! let ctx = EventContext::new("u1", store);
//! let args = json!({ "event": { "title": "Launch", "private": true } });
//! shield.check_path("Mutation.createEvent", &json!(null), &args, &ctx).await?;
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod errors;
pub mod policy;
pub mod role;
pub mod rules;
pub mod store;

pub use context::EventContext;
pub use errors::StoreError;
pub use policy::{permissions, role_policy, EventPolicy};
pub use role::Role;
pub use rules::Reference;
pub use store::{EventStore, Fixture};
