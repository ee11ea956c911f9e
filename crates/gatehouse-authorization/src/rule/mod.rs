//! Leaf predicate contract
//!
//! A rule is an opaque, possibly asynchronous decision over one field access
//! and the per-request context `C`. Rules must be deterministic and free of
//! side effects so that the order in which combinators run them never
//! changes an outcome. Rules built from other rules with [`and`], [`or`] and
//! [`not`] are themselves ordinary rules.

mod logic;

pub use logic::{allow, and, chain, deny, not, or};

use crate::access::FieldAccess;
use crate::decision::Outcome;
use async_trait::async_trait;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;

/// Request context types a rule can read from
pub trait RuleContext: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> RuleContext for T {}

/// Decision function implemented by leaf rules
#[async_trait]
pub trait Predicate<C>: Send + Sync {
    /// Name used in logs, errors and tree dumps
    fn name(&self) -> &str;

    /// Decide one field access; must always resolve
    async fn evaluate(&self, access: &FieldAccess<'_>, ctx: &C) -> Outcome;
}

/// Shared handle to a predicate
///
/// Cloning is cheap; one rule may sit at many paths of many trees.
pub struct Rule<C> {
    inner: Arc<dyn Predicate<C>>,
}

impl<C> Clone for Rule<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: RuleContext> Rule<C> {
    /// Wrap a predicate
    pub fn new(predicate: impl Predicate<C> + 'static) -> Self {
        Self {
            inner: Arc::new(predicate),
        }
    }

    /// Rule from a synchronous closure
    pub fn from_fn<F>(name: impl Into<String>, decide: F) -> Self
    where
        F: Fn(&FieldAccess<'_>, &C) -> Outcome + Send + Sync + 'static,
    {
        Self::new(FnPredicate {
            name: name.into(),
            decide,
            _context: PhantomData,
        })
    }

    /// Name used in logs and rule errors
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Evaluate against one field access
    pub async fn evaluate(&self, access: &FieldAccess<'_>, ctx: &C) -> Outcome {
        let outcome = self.inner.evaluate(access, ctx).await;
        trace!(rule = self.name(), ?outcome, "Rule evaluated");
        outcome
    }

    /// Whether both handles point at the same predicate
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<C: RuleContext> fmt::Debug for Rule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rule").field(&self.name()).finish()
    }
}

impl<C: RuleContext> fmt::Display for Rule<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

struct FnPredicate<C, F> {
    name: String,
    decide: F,
    _context: PhantomData<fn(&C)>,
}

#[async_trait]
impl<C, F> Predicate<C> for FnPredicate<C, F>
where
    C: RuleContext,
    F: Fn(&FieldAccess<'_>, &C) -> Outcome + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, access: &FieldAccess<'_>, ctx: &C) -> Outcome {
        (self.decide)(access, ctx)
    }
}
