//! In-memory record store read by the leaf predicates
//!
//! Fixtures are JSON documents with one array per collection:
//!
//! ```json
//! {
//!   "users": [{ "_id": "u1", "username": "ada", "role": "PREMIUM" }],
//!   "categories": [{ "_id": "c1", "name": "Music", "moderators": ["u2"] }],
//!   "events": [{ "_id": "e1", "title": "Gig", "owner": "u1", "managers": ["u1"] }],
//!   "posts": [{ "_id": "p1", "content": "hi", "author": "u1", "postedAt": "e1" }],
//!   "invitations": [{ "_id": "i1", "from": "u1", "invited": "u3", "to": "e1" }]
//! }
//! ```

use crate::errors::{Result, StoreError};
use crate::role::Role;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::debug;

/// User account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Record id
    #[serde(rename = "_id")]
    pub id: String,
    /// Login name
    pub username: String,
    /// Given name
    #[serde(default)]
    pub name: String,
    /// Family name
    #[serde(default)]
    pub surname: String,
    /// Tier; `None` grants only the defaults
    #[serde(default)]
    pub role: Option<Role>,
    /// Subscribed category ids
    #[serde(default)]
    pub subscribes: Vec<String>,
}

/// Event category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Record id
    #[serde(rename = "_id")]
    pub id: String,
    /// Display name
    pub name: String,
    /// Moderating user ids
    #[serde(default)]
    pub moderators: Vec<String>,
}

/// Event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Record id
    #[serde(rename = "_id")]
    pub id: String,
    /// Event title
    pub title: String,
    /// Visible only to attendants and invitees
    #[serde(default)]
    pub private: bool,
    /// Owning user id
    #[serde(default)]
    pub owner: Option<String>,
    /// Managing user ids
    #[serde(default)]
    pub managers: Vec<String>,
    /// Attending user ids
    #[serde(default)]
    pub attendants: Vec<String>,
    /// Users asking to attend
    #[serde(default)]
    pub requests: Vec<String>,
    /// Category ids
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Message board post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Record id
    #[serde(rename = "_id")]
    pub id: String,
    /// Post body
    pub content: String,
    /// Authoring user id
    pub author: String,
    /// Event whose message board holds the post
    pub posted_at: String,
    /// Reported for review
    #[serde(default)]
    pub flagged: bool,
    /// Hidden from non-managers
    #[serde(default)]
    pub locked: bool,
}

/// Invitation to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    /// Record id
    #[serde(rename = "_id")]
    pub id: String,
    /// Inviting user id
    pub from: String,
    /// Invited user id
    pub invited: String,
    /// Event the invitation is for
    pub to: String,
}

/// Serialized form of a store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    /// User accounts
    pub users: Vec<User>,
    /// Categories
    pub categories: Vec<Category>,
    /// Events
    pub events: Vec<Event>,
    /// Posts
    pub posts: Vec<Post>,
    /// Invitations
    pub invitations: Vec<Invitation>,
}

#[derive(Debug, Default)]
struct Records {
    users: IndexMap<String, User>,
    categories: IndexMap<String, Category>,
    events: IndexMap<String, Event>,
    posts: IndexMap<String, Post>,
    invitations: IndexMap<String, Invitation>,
}

fn index<T>(kind: &'static str, items: Vec<T>, id: impl Fn(&T) -> &str) -> Result<IndexMap<String, T>> {
    let mut map = IndexMap::with_capacity(items.len());
    for item in items {
        let key = id(&item).to_string();
        if map.contains_key(&key) {
            return Err(StoreError::Duplicate { kind, id: key });
        }
        map.insert(key, item);
    }
    Ok(map)
}

/// Shared record store; readers clone records out
#[derive(Debug, Default)]
pub struct EventStore {
    records: RwLock<Records>,
}

impl EventStore {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a fixture, rejecting duplicate ids
    pub fn from_fixture(fixture: Fixture) -> Result<Self> {
        let records = Records {
            users: index("user", fixture.users, |u| u.id.as_str())?,
            categories: index("category", fixture.categories, |c| c.id.as_str())?,
            events: index("event", fixture.events, |e| e.id.as_str())?,
            posts: index("post", fixture.posts, |p| p.id.as_str())?,
            invitations: index("invitation", fixture.invitations, |i| i.id.as_str())?,
        };
        debug!(
            users = records.users.len(),
            events = records.events.len(),
            posts = records.posts.len(),
            "Event store loaded"
        );
        Ok(Self {
            records: RwLock::new(records),
        })
    }

    /// Store from a JSON fixture
    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_fixture(serde_json::from_str(json)?)
    }

    /// Store from a JSON fixture file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// User by id
    pub async fn user(&self, id: &str) -> Option<User> {
        self.records.read().await.users.get(id).cloned()
    }

    /// Category by id
    pub async fn category(&self, id: &str) -> Option<Category> {
        self.records.read().await.categories.get(id).cloned()
    }

    /// Event by id
    pub async fn event(&self, id: &str) -> Option<Event> {
        self.records.read().await.events.get(id).cloned()
    }

    /// Post by id
    pub async fn post(&self, id: &str) -> Option<Post> {
        self.records.read().await.posts.get(id).cloned()
    }

    /// Invitation by id
    pub async fn invitation(&self, id: &str) -> Option<Invitation> {
        self.records.read().await.invitations.get(id).cloned()
    }

    /// Whether `user` holds an invitation to `event`
    pub async fn is_invited(&self, user: &str, event: &str) -> bool {
        self.records
            .read()
            .await
            .invitations
            .values()
            .any(|i| i.to == event && i.invited == user)
    }

    /// Whether `user` moderates any of `categories`
    pub async fn moderates_any(&self, user: &str, categories: &[String]) -> bool {
        let records = self.records.read().await;
        categories.iter().any(|id| {
            records
                .categories
                .get(id)
                .is_some_and(|c| c.moderators.iter().any(|m| m == user))
        })
    }

    /// Add or replace a user
    pub async fn insert_user(&self, user: User) {
        self.records.write().await.users.insert(user.id.clone(), user);
    }

    /// Add or replace a category
    pub async fn insert_category(&self, category: Category) {
        self.records
            .write()
            .await
            .categories
            .insert(category.id.clone(), category);
    }

    /// Add or replace an event
    pub async fn insert_event(&self, event: Event) {
        self.records.write().await.events.insert(event.id.clone(), event);
    }

    /// Add or replace a post
    pub async fn insert_post(&self, post: Post) {
        self.records.write().await.posts.insert(post.id.clone(), post);
    }

    /// Add or replace an invitation
    pub async fn insert_invitation(&self, invitation: Invitation) {
        self.records
            .write()
            .await
            .invitations
            .insert(invitation.id.clone(), invitation);
    }

    /// Change a user's tier; returns false for unknown users
    pub async fn set_role(&self, user: &str, role: Option<Role>) -> bool {
        match self.records.write().await.users.get_mut(user) {
            Some(record) => {
                record.role = role;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "users": [{ "_id": "u1", "username": "ada", "role": "PREMIUM" }],
        "categories": [{ "_id": "c1", "name": "Music", "moderators": ["u2"] }],
        "events": [{ "_id": "e1", "title": "Gig", "owner": "u1", "categories": ["c1"] }],
        "posts": [{ "_id": "p1", "content": "hi", "author": "u1", "postedAt": "e1" }],
        "invitations": [{ "_id": "i1", "from": "u1", "invited": "u3", "to": "e1" }]
    }"#;

    #[tokio::test]
    async fn test_fixture_lookup() {
        let store = EventStore::from_json_str(FIXTURE).unwrap();
        assert_eq!(store.user("u1").await.unwrap().role, Some(Role::Premium));
        assert_eq!(store.post("p1").await.unwrap().posted_at, "e1");
        assert!(store.is_invited("u3", "e1").await);
        assert!(!store.is_invited("u1", "e1").await);
        assert!(store.moderates_any("u2", &["c1".to_string()]).await);
        assert!(store.event("e2").await.is_none());
    }

    #[tokio::test]
    async fn test_set_role() {
        let store = EventStore::from_json_str(FIXTURE).unwrap();
        assert!(store.set_role("u1", Some(Role::Administrator)).await);
        assert_eq!(store.user("u1").await.unwrap().role, Some(Role::Administrator));
        assert!(!store.set_role("nobody", None).await);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();
        let store = EventStore::load_from_file(file.path()).unwrap();
        assert_eq!(store.invitation("i1").await.unwrap().to, "e1");

        let err = EventStore::load_from_file(Path::new("/nonexistent/store.json")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{ "users": [
            { "_id": "u1", "username": "ada" },
            { "_id": "u1", "username": "bob" }
        ] }"#;
        let err = EventStore::from_json_str(json).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { kind: "user", .. }));
    }
}
