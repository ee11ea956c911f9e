//! Caller roles and the role membership primitive

use crate::access::FieldAccess;
use crate::decision::{Decision, Outcome};
use crate::errors::RuleError;
use crate::rule::{Predicate, Rule, RuleContext};
use async_trait::async_trait;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

/// Caller privilege identifier drawn from a fixed set
pub trait Role: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

impl<T> Role for T where T: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static {}

/// Request contexts that know the caller's current role
///
/// A caller holds at most one role. Resolving it may need I/O.
#[async_trait]
pub trait CallerRole<R: Role>: Send + Sync {
    /// The caller's role, or `None` for anonymous callers and callers without one
    async fn caller_role(&self) -> Result<Option<R>, RuleError>;
}

struct CallerHasRole<R, C> {
    role: R,
    name: String,
    _context: PhantomData<fn(&C)>,
}

#[async_trait]
impl<R, C> Predicate<C> for CallerHasRole<R, C>
where
    R: Role,
    C: RuleContext + CallerRole<R>,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, _access: &FieldAccess<'_>, ctx: &C) -> Outcome {
        let current = ctx
            .caller_role()
            .await
            .map_err(|err| RuleError::new(self.name.clone(), err.message))?;
        Ok(Decision::from(current.as_ref() == Some(&self.role)))
    }
}

/// Gate: allows exactly when the caller currently holds `role`
pub fn caller_has_role<R, C>(role: R) -> Rule<C>
where
    R: Role,
    C: RuleContext + CallerRole<R>,
{
    Rule::new(CallerHasRole {
        name: format!("caller_has_role({role})"),
        role,
        _context: PhantomData,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::FieldInfo;
    use serde_json::Value;

    struct Session(Option<&'static str>);

    #[async_trait]
    impl CallerRole<&'static str> for Session {
        async fn caller_role(&self) -> Result<Option<&'static str>, RuleError> {
            Ok(self.0)
        }
    }

    struct Offline;

    #[async_trait]
    impl CallerRole<&'static str> for Offline {
        async fn caller_role(&self) -> Result<Option<&'static str>, RuleError> {
            Err(RuleError::new("session", "user directory unreachable"))
        }
    }

    #[tokio::test]
    async fn test_gate_matches_exact_role() {
        let gate = caller_has_role::<_, Session>("ADMINISTRATOR");
        let info = FieldInfo::new("Mutation", "setRole");
        let access = FieldAccess::root(&Value::Null, &info);

        assert_eq!(gate.name(), "caller_has_role(ADMINISTRATOR)");
        assert_eq!(
            gate.evaluate(&access, &Session(Some("ADMINISTRATOR"))).await,
            Ok(Decision::Allow)
        );
        assert_eq!(gate.evaluate(&access, &Session(Some("FREE"))).await, Ok(Decision::Deny));
        assert_eq!(gate.evaluate(&access, &Session(None)).await, Ok(Decision::Deny));
    }

    #[tokio::test]
    async fn test_gate_reports_lookup_failure() {
        let gate = caller_has_role::<_, Offline>("FREE");
        let info = FieldInfo::new("Query", "users");
        let access = FieldAccess::root(&Value::Null, &info);

        let err = gate.evaluate(&access, &Offline).await.unwrap_err();
        assert_eq!(err.rule, "caller_has_role(FREE)");
        assert_eq!(err.message, "user directory unreachable");
    }
}
