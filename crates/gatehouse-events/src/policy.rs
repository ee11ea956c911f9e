//! Role policies of the event platform and their composition
//!
//! Each tier declares only what it adds. Broader tiers are the union of the
//! narrower ones before gating:
//!
//! ```text
//! FREE          = free
//! PREMIUM       = free ∨ premium
//! MODERATOR     = free ∨ premium ∨ moderator
//! ADMINISTRATOR = free ∨ premium ∨ moderator ∨ administrator
//! ```

use crate::context::EventContext;
use crate::role::Role;
use crate::rules::{
    arg_event_has_owner, arg_has_role, arg_is_flagged, arg_is_locked, arg_is_private,
    caller_attends_arg, caller_attends_parent, caller_is_invited_to_arg,
    caller_is_invited_to_parent, caller_manages_arg, caller_manages_parent, caller_moderates_arg,
    caller_moderates_parent, caller_owns_arg, caller_requests_arg, is_caller, is_logged_in,
    parent_is_locked, parent_is_private, Reference,
};
use gatehouse_authorization::{
    allow, and, not, or, or_trees, rule_tree, PolicyTree, Result, RoleRuleSet, Shield,
    ShieldConfig,
};
use tracing::info;

/// Policy tree over the event platform's request context
pub type EventPolicy = PolicyTree<EventContext>;

/// Fields open to everyone, logged in or not
pub fn defaults() -> EventPolicy {
    rule_tree! {
        Mutation: {
            createUser: allow(),
            login: allow(),
        },
    }
}

/// What every logged-in tier may do
pub fn free() -> EventPolicy {
    let invited_or_manager = or([caller_is_invited_to_parent(), caller_manages_parent()]);
    let public_or_invited_or_attending = or([
        not(parent_is_private()),
        caller_is_invited_to_parent(),
        caller_attends_parent(),
    ]);
    let attendant_unless_locked = and([
        caller_attends_parent(),
        or([not(parent_is_locked()), caller_manages_parent()]),
    ]);
    let self_only = is_caller(Reference::Parent);

    rule_tree! {
        User: {
            _id: allow(),
            name: is_logged_in(),
            surname: is_logged_in(),
            username: is_logged_in(),
            role: is_logged_in(),
            moderates: is_logged_in(),
            attends: self_only.clone(),
            requests: self_only.clone(),
            authored: self_only.clone(),
            subscribes: self_only.clone(),
            invitations: self_only.clone(),
            invites: self_only,
        },
        Category: {
            _id: allow(),
            name: allow(),
            events: allow(),
            moderators: is_logged_in(),
        },
        Invitation: {
            _id: invited_or_manager.clone(),
            from: invited_or_manager.clone(),
            invited: invited_or_manager.clone(),
            to: invited_or_manager,
        },
        Event: {
            _id: public_or_invited_or_attending.clone(),
            title: public_or_invited_or_attending.clone(),
            time: public_or_invited_or_attending.clone(),
            description: public_or_invited_or_attending.clone(),
            location: public_or_invited_or_attending.clone(),
            owner: public_or_invited_or_attending.clone(),
            private: public_or_invited_or_attending.clone(),
            attendants: public_or_invited_or_attending.clone(),
            managers: public_or_invited_or_attending,
            requests: caller_manages_parent(),
            invited: caller_manages_parent(),
            messageBoard: caller_attends_parent(),
        },
        Post: {
            _id: attendant_unless_locked.clone(),
            content: attendant_unless_locked.clone(),
            author: attendant_unless_locked.clone(),
            postedAt: attendant_unless_locked,
            flagged: caller_manages_parent(),
            locked: caller_manages_parent(),
        },
        Query: {
            users: is_logged_in(),
            usersByUsername: is_logged_in(),
            events: allow(),
        },
        Mutation: {
            editUser: is_caller(Reference::Arg),
            unsubscribe: allow(),

            createEvent: and([is_logged_in(), not(arg_is_private())]),
            editEvent: and([
                or([caller_manages_arg(), not(arg_event_has_owner())]),
                not(arg_is_private()),
            ]),
            addCategories: caller_manages_arg(),
            removeCategories: caller_manages_arg(),
            // Gated on the argument event: a root mutation has no parent to own
            deleteEvent: caller_owns_arg(),

            kick: and([
                not(and([caller_owns_arg(), is_caller(Reference::Arg)])),
                or([is_caller(Reference::Arg), caller_manages_arg()]),
            ]),
            promote: caller_owns_arg(),
            demote: and([caller_owns_arg(), not(is_caller(Reference::Arg))]),

            invite: caller_manages_arg(),
            acceptInvitation: caller_is_invited_to_arg(),
            declineInvitation: or([
                caller_is_invited_to_arg(),
                caller_manages_arg(),
                caller_owns_arg(),
            ]),

            request: not(arg_is_private()),
            acceptRequest: or([caller_manages_arg(), caller_owns_arg()]),
            declineRequest: or([caller_requests_arg(), caller_manages_arg(), caller_owns_arg()]),

            createPost: and([is_logged_in(), caller_attends_arg()]),
            flagPost: caller_attends_arg(),
            review: and([arg_is_flagged(), caller_manages_arg()]),
        },
    }
}

/// What premium accounts add
pub fn premium() -> EventPolicy {
    rule_tree! {
        Mutation: {
            subscribe: allow(),
            createEvent: allow(),
            editEvent: or([caller_manages_arg(), not(arg_event_has_owner())]),
        },
    }
}

/// What moderators add
pub fn moderator() -> EventPolicy {
    let moderates = caller_moderates_parent();

    rule_tree! {
        Category: {
            subscribers: moderates.clone(),
        },
        Event: {
            messageBoard: moderates.clone(),
        },
        Post: {
            _id: moderates.clone(),
            content: moderates.clone(),
            author: moderates.clone(),
            postedAt: moderates.clone(),
            flagged: moderates.clone(),
            locked: moderates,
        },
        Mutation: {
            removeCategories: caller_moderates_arg(),
            flagPost: caller_moderates_arg(),
            review: and([arg_is_flagged(), caller_moderates_arg()]),
        },
    }
}

/// What administrators add
pub fn administrator() -> EventPolicy {
    rule_tree! {
        Category: {
            subscribers: allow(),
        },
        Event: {
            messageBoard: allow(),
        },
        Post: {
            _id: allow(),
            content: allow(),
            author: allow(),
            postedAt: allow(),
            flagged: allow(),
            locked: allow(),
        },
        Mutation: {
            createCategory: allow(),
            editCategory: allow(),
            deleteCategory: allow(),
            assignModerator: arg_has_role(Role::Moderator),
            removeModerator: allow(),

            setRole: allow(),
            deleteUser: allow(),

            removeCategories: allow(),

            deletePost: arg_is_locked(),
            flagPost: allow(),
            unlockPost: allow(),
            review: arg_is_flagged(),
        },
    }
}

/// Ungated tree of everything `role` may do
pub fn role_policy(role: Role) -> Result<EventPolicy> {
    match role {
        Role::Free => Ok(free()),
        Role::Premium => or_trees([free(), premium()]),
        Role::Moderator => or_trees([free(), premium(), moderator()]),
        Role::Administrator => or_trees([free(), premium(), moderator(), administrator()]),
    }
}

/// Per-tier policies plus the defaults, ready to build
pub fn role_rule_set() -> Result<RoleRuleSet<Role, EventContext>> {
    Role::ALL
        .into_iter()
        .try_fold(RoleRuleSet::new().with_default(defaults()), |set, role| {
            Ok(set.with_role(role, role_policy(role)?))
        })
}

/// Composed, role-gated tree of the event platform
pub fn permissions() -> Result<EventPolicy> {
    let tree = role_rule_set()?.build()?;
    info!(leaves = tree.leaf_count(), "Event platform permissions composed");
    Ok(tree)
}

/// Shield over [`permissions`]
pub fn shield(config: ShieldConfig) -> Result<Shield<EventContext>> {
    Shield::new(permissions()?, config)
}
