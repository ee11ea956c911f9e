//! Leaf predicates of the event platform
//!
//! `*_parent` rules look at the object the field is resolved on, `*_arg`
//! rules at the record named by the field arguments. Records are addressed
//! either by id string or by an object carrying `_id`:
//!
//! ```text
//! Event parent        -> the event itself
//! Post parent         -> event of its message board (postedAt)
//! Invitation parent   -> event it invites to
//! event / post / invitation argument -> same resolution, first one present wins
//! new post argument   -> its postedAt
//! ```
//!
//! Rules with nothing to resolve deny. Rules whose required argument is
//! missing fail, since the access cannot be judged.

use crate::context::EventContext;
use crate::role::Role;
use crate::store::Event;
use async_trait::async_trait;
use gatehouse_authorization::{Decision, FieldAccess, Outcome, Predicate, Rule, RuleError};
use serde_json::Value;
use std::fmt;

/// Which object an identity check compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    /// The object the field is resolved on
    Parent,
    /// The `user` argument of the field
    Arg,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Parent => f.write_str("parent"),
            Reference::Arg => f.write_str("arg"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Check {
    LoggedIn,
    IsCaller(Reference),
    Manages(Reference),
    Attends(Reference),
    InvitedTo(Reference),
    Owns(Reference),
    Moderates(Reference),
    RequestsArg,
    IsPrivate(Reference),
    IsLocked(Reference),
    ArgEventHasOwner,
    ArgIsFlagged,
    ArgHasRole(Role),
}

struct EventRule {
    name: String,
    check: Check,
}

fn rule(name: impl Into<String>, check: Check) -> Rule<EventContext> {
    Rule::new(EventRule {
        name: name.into(),
        check,
    })
}

/// Id of a record given as a string or as an object with `_id`
fn id_of(value: &Value) -> Option<&str> {
    match value {
        Value::String(id) => Some(id.as_str()),
        Value::Object(fields) => fields.get("_id").and_then(Value::as_str),
        _ => None,
    }
}

fn flag(value: &Value, key: &str) -> Option<bool> {
    value.get(key).and_then(Value::as_bool)
}

fn contains(ids: &[String], id: &str) -> bool {
    ids.iter().any(|candidate| candidate == id)
}

impl EventRule {
    fn missing(&self, argument: &str) -> RuleError {
        RuleError::new(self.name.clone(), format!("missing argument `{argument}`"))
    }

    fn required<'a>(&self, access: &FieldAccess<'a>, argument: &str) -> Result<&'a Value, RuleError> {
        access.arg(argument).ok_or_else(|| self.missing(argument))
    }

    async fn event_of_post(ctx: &EventContext, post: &str) -> Option<Event> {
        let post = ctx.store().post(post).await?;
        ctx.store().event(&post.posted_at).await
    }

    async fn event_of_invitation(ctx: &EventContext, invitation: &str) -> Option<Event> {
        let invitation = ctx.store().invitation(invitation).await?;
        ctx.store().event(&invitation.to).await
    }

    /// Event the referenced object belongs to
    async fn event(
        &self,
        access: &FieldAccess<'_>,
        ctx: &EventContext,
        reference: Reference,
    ) -> Result<Option<Event>, RuleError> {
        match reference {
            Reference::Parent => {
                let Some(id) = id_of(access.parent) else {
                    return Ok(None);
                };
                Ok(match access.info.parent_type.as_str() {
                    "Event" => ctx.store().event(id).await,
                    "Post" => Self::event_of_post(ctx, id).await,
                    "Invitation" => Self::event_of_invitation(ctx, id).await,
                    _ => None,
                })
            }
            Reference::Arg => {
                if let Some(event) = access.arg("event") {
                    return Ok(match id_of(event) {
                        Some(id) => ctx.store().event(id).await,
                        None => None,
                    });
                }
                if let Some(post) = access.arg("post") {
                    if let Some(id) = id_of(post) {
                        return Ok(Self::event_of_post(ctx, id).await);
                    }
                    // A post being created names its board directly
                    return Ok(match post.get("postedAt").and_then(id_of) {
                        Some(event) => ctx.store().event(event).await,
                        None => None,
                    });
                }
                if let Some(invitation) = access.arg("invitation") {
                    return Ok(match id_of(invitation) {
                        Some(id) => Self::event_of_invitation(ctx, id).await,
                        None => None,
                    });
                }
                Err(self.missing("event"))
            }
        }
    }

    async fn invited_to(
        &self,
        access: &FieldAccess<'_>,
        ctx: &EventContext,
        reference: Reference,
        caller: &str,
    ) -> Result<bool, RuleError> {
        let invitation = match reference {
            Reference::Parent if access.info.parent_type == "Invitation" => id_of(access.parent),
            Reference::Arg => access.arg("invitation").and_then(id_of),
            Reference::Parent => None,
        };
        if let Some(id) = invitation {
            return Ok(ctx
                .store()
                .invitation(id)
                .await
                .is_some_and(|invitation| invitation.invited == caller));
        }
        Ok(match self.event(access, ctx, reference).await? {
            Some(event) => ctx.store().is_invited(caller, &event.id).await,
            None => false,
        })
    }

    async fn moderates(
        &self,
        access: &FieldAccess<'_>,
        ctx: &EventContext,
        reference: Reference,
        caller: &str,
    ) -> Result<bool, RuleError> {
        let category = match reference {
            Reference::Parent if access.info.parent_type == "Category" => id_of(access.parent),
            Reference::Arg => access.arg("category").and_then(id_of),
            Reference::Parent => None,
        };
        if let Some(id) = category {
            return Ok(ctx
                .store()
                .category(id)
                .await
                .is_some_and(|category| contains(&category.moderators, caller)));
        }
        Ok(match self.event(access, ctx, reference).await? {
            Some(event) => ctx.store().moderates_any(caller, &event.categories).await,
            None => false,
        })
    }

    async fn is_private(
        &self,
        access: &FieldAccess<'_>,
        ctx: &EventContext,
        reference: Reference,
    ) -> Result<bool, RuleError> {
        let declared = match reference {
            Reference::Parent => flag(access.parent, "private"),
            Reference::Arg => access.arg("event").and_then(|event| flag(event, "private")),
        };
        if let Some(private) = declared {
            return Ok(private);
        }
        Ok(self
            .event(access, ctx, reference)
            .await?
            .is_some_and(|event| event.private))
    }

    async fn is_locked(
        &self,
        access: &FieldAccess<'_>,
        ctx: &EventContext,
        reference: Reference,
    ) -> Result<bool, RuleError> {
        let post = match reference {
            Reference::Parent => {
                if let Some(locked) = flag(access.parent, "locked") {
                    return Ok(locked);
                }
                id_of(access.parent)
            }
            Reference::Arg => id_of(self.required(access, "post")?),
        };
        Ok(match post {
            Some(id) => ctx.store().post(id).await.is_some_and(|post| post.locked),
            None => false,
        })
    }

    async fn decide(&self, access: &FieldAccess<'_>, ctx: &EventContext) -> Result<bool, RuleError> {
        let caller = ctx.caller();
        let with_caller = |check: fn(&Event, &str) -> bool, event: Option<Event>| match (event, caller) {
            (Some(event), Some(caller)) => check(&event, caller),
            _ => false,
        };

        match self.check {
            Check::LoggedIn => Ok(caller.is_some()),
            Check::IsCaller(reference) => {
                let subject = match reference {
                    Reference::Parent => id_of(access.parent),
                    Reference::Arg => id_of(self.required(access, "user")?),
                };
                Ok(subject.is_some() && subject == caller)
            }
            Check::Manages(reference) => {
                let event = self.event(access, ctx, reference).await?;
                Ok(with_caller(|e, c| contains(&e.managers, c), event))
            }
            Check::Attends(reference) => {
                let event = self.event(access, ctx, reference).await?;
                Ok(with_caller(|e, c| contains(&e.attendants, c), event))
            }
            Check::Owns(reference) => {
                let event = self.event(access, ctx, reference).await?;
                Ok(with_caller(|e, c| e.owner.as_deref() == Some(c), event))
            }
            Check::RequestsArg => {
                let event = self.event(access, ctx, Reference::Arg).await?;
                Ok(with_caller(|e, c| contains(&e.requests, c), event))
            }
            Check::InvitedTo(reference) => match caller {
                Some(caller) => self.invited_to(access, ctx, reference, caller).await,
                None => Ok(false),
            },
            Check::Moderates(reference) => match caller {
                Some(caller) => self.moderates(access, ctx, reference, caller).await,
                None => Ok(false),
            },
            Check::IsPrivate(reference) => self.is_private(access, ctx, reference).await,
            Check::IsLocked(reference) => self.is_locked(access, ctx, reference).await,
            Check::ArgEventHasOwner => Ok(self
                .event(access, ctx, Reference::Arg)
                .await?
                .is_some_and(|event| event.owner.is_some())),
            Check::ArgIsFlagged => {
                let post = id_of(self.required(access, "post")?);
                Ok(match post {
                    Some(id) => ctx.store().post(id).await.is_some_and(|post| post.flagged),
                    None => false,
                })
            }
            Check::ArgHasRole(role) => {
                let user = id_of(self.required(access, "user")?);
                Ok(match user {
                    Some(id) => ctx
                        .store()
                        .user(id)
                        .await
                        .is_some_and(|user| user.role == Some(role)),
                    None => false,
                })
            }
        }
    }
}

#[async_trait]
impl Predicate<EventContext> for EventRule {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, access: &FieldAccess<'_>, ctx: &EventContext) -> Outcome {
        self.decide(access, ctx).await.map(Decision::from)
    }
}

/// Caller has a session
pub fn is_logged_in() -> Rule<EventContext> {
    rule("is_logged_in", Check::LoggedIn)
}

/// Caller is the referenced user
pub fn is_caller(reference: Reference) -> Rule<EventContext> {
    rule(format!("is_caller({reference})"), Check::IsCaller(reference))
}

/// Caller manages the parent event
pub fn caller_manages_parent() -> Rule<EventContext> {
    rule("caller_manages_parent", Check::Manages(Reference::Parent))
}

/// Caller manages the argument event
pub fn caller_manages_arg() -> Rule<EventContext> {
    rule("caller_manages_arg", Check::Manages(Reference::Arg))
}

/// Caller attends the parent event
pub fn caller_attends_parent() -> Rule<EventContext> {
    rule("caller_attends_parent", Check::Attends(Reference::Parent))
}

/// Caller attends the argument event
pub fn caller_attends_arg() -> Rule<EventContext> {
    rule("caller_attends_arg", Check::Attends(Reference::Arg))
}

/// Caller holds an invitation to the parent event
pub fn caller_is_invited_to_parent() -> Rule<EventContext> {
    rule("caller_is_invited_to_parent", Check::InvitedTo(Reference::Parent))
}

/// Caller holds the argument invitation, or one to the argument event
pub fn caller_is_invited_to_arg() -> Rule<EventContext> {
    rule("caller_is_invited_to_arg", Check::InvitedTo(Reference::Arg))
}

/// Caller owns the parent event
pub fn caller_owns_parent() -> Rule<EventContext> {
    rule("caller_owns_parent", Check::Owns(Reference::Parent))
}

/// Caller owns the argument event
pub fn caller_owns_arg() -> Rule<EventContext> {
    rule("caller_owns_arg", Check::Owns(Reference::Arg))
}

/// Caller moderates the category, or a category of the event
pub fn caller_moderates_parent() -> Rule<EventContext> {
    rule("caller_moderates_parent", Check::Moderates(Reference::Parent))
}

/// Caller moderates a category of the argument event
pub fn caller_moderates_arg() -> Rule<EventContext> {
    rule("caller_moderates_arg", Check::Moderates(Reference::Arg))
}

/// Caller asked to attend the argument event
pub fn caller_requests_arg() -> Rule<EventContext> {
    rule("caller_requests_arg", Check::RequestsArg)
}

/// The parent event is private
pub fn parent_is_private() -> Rule<EventContext> {
    rule("parent_is_private", Check::IsPrivate(Reference::Parent))
}

/// The parent post is locked
pub fn parent_is_locked() -> Rule<EventContext> {
    rule("parent_is_locked", Check::IsLocked(Reference::Parent))
}

/// The argument event is, or is being made, private
pub fn arg_is_private() -> Rule<EventContext> {
    rule("arg_is_private", Check::IsPrivate(Reference::Arg))
}

/// The argument event has an owner
pub fn arg_event_has_owner() -> Rule<EventContext> {
    rule("arg_event_has_owner", Check::ArgEventHasOwner)
}

/// The argument post is flagged
pub fn arg_is_flagged() -> Rule<EventContext> {
    rule("arg_is_flagged", Check::ArgIsFlagged)
}

/// The argument post is locked
pub fn arg_is_locked() -> Rule<EventContext> {
    rule("arg_is_locked", Check::IsLocked(Reference::Arg))
}

/// The argument user holds `role`
pub fn arg_has_role(role: Role) -> Rule<EventContext> {
    rule(format!("arg_has_role({role})"), Check::ArgHasRole(role))
}
