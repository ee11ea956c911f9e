//! Rule logic: constants, conjunction, disjunction, negation
//!
//! Evaluation is sequential and short-circuits:
//!
//! ```text
//! or:    first Allow wins; else first Error; else Deny
//! and:   first Deny wins;  else first Error; else Allow
//! not:   Allow ↔ Deny, Error unchanged
//! chain: stops at the first result that is not Allow
//! ```
//!
//! Allow/Deny/Error classes do not depend on member order. When several
//! members fail, the first failure in declaration order is reported.

use super::{Predicate, Rule, RuleContext};
use crate::access::FieldAccess;
use crate::decision::{Decision, Outcome};
use async_trait::async_trait;
use tracing::trace;

struct Constant {
    decision: Decision,
}

#[async_trait]
impl<C: RuleContext> Predicate<C> for Constant {
    fn name(&self) -> &str {
        match self.decision {
            Decision::Allow => "allow",
            Decision::Deny => "deny",
        }
    }

    async fn evaluate(&self, _access: &FieldAccess<'_>, _ctx: &C) -> Outcome {
        Ok(self.decision)
    }
}

/// Rule that always allows
pub fn allow<C: RuleContext>() -> Rule<C> {
    Rule::new(Constant {
        decision: Decision::Allow,
    })
}

/// Rule that always denies
pub fn deny<C: RuleContext>() -> Rule<C> {
    Rule::new(Constant {
        decision: Decision::Deny,
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Connective {
    Or,
    And,
    Chain,
}

impl Connective {
    fn keyword(self) -> &'static str {
        match self {
            Connective::Or => "or",
            Connective::And => "and",
            Connective::Chain => "chain",
        }
    }

    /// Decision that ends evaluation early
    fn absorbing(self) -> Decision {
        match self {
            Connective::Or => Decision::Allow,
            Connective::And | Connective::Chain => Decision::Deny,
        }
    }
}

struct Logic<C> {
    name: String,
    connective: Connective,
    rules: Vec<Rule<C>>,
}

impl<C: RuleContext> Logic<C> {
    fn build(connective: Connective, rules: impl IntoIterator<Item = Rule<C>>) -> Rule<C> {
        let mut rules: Vec<Rule<C>> = rules.into_iter().collect();
        if rules.len() == 1 {
            if let Some(only) = rules.pop() {
                return only;
            }
        }
        let names: Vec<&str> = rules.iter().map(Rule::name).collect();
        let name = format!("{}({})", connective.keyword(), names.join(", "));
        Rule::new(Self {
            name,
            connective,
            rules,
        })
    }
}

#[async_trait]
impl<C: RuleContext> Predicate<C> for Logic<C> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, access: &FieldAccess<'_>, ctx: &C) -> Outcome {
        let absorbing = self.connective.absorbing();
        let mut first_error = None;

        for (position, rule) in self.rules.iter().enumerate() {
            match rule.evaluate(access, ctx).await {
                Ok(decision) if decision == absorbing => {
                    trace!(
                        rule = %self.name,
                        position,
                        %decision,
                        "Short-circuited"
                    );
                    return Ok(decision);
                }
                Ok(_) => {}
                Err(err) if self.connective == Connective::Chain => return Err(err),
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(absorbing.invert()),
        }
    }
}

/// Allow if any member allows; an empty disjunction denies
pub fn or<C: RuleContext>(rules: impl IntoIterator<Item = Rule<C>>) -> Rule<C> {
    Logic::build(Connective::Or, rules)
}

/// Deny if any member denies; an empty conjunction allows
pub fn and<C: RuleContext>(rules: impl IntoIterator<Item = Rule<C>>) -> Rule<C> {
    Logic::build(Connective::And, rules)
}

/// Conjunction evaluated strictly in order, stopping at the first non-Allow
pub fn chain<C: RuleContext>(rules: impl IntoIterator<Item = Rule<C>>) -> Rule<C> {
    Logic::build(Connective::Chain, rules)
}

struct Not<C> {
    name: String,
    rule: Rule<C>,
}

#[async_trait]
impl<C: RuleContext> Predicate<C> for Not<C> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self, access: &FieldAccess<'_>, ctx: &C) -> Outcome {
        self.rule.evaluate(access, ctx).await.map(Decision::invert)
    }
}

/// Swap Allow and Deny; errors pass through
pub fn not<C: RuleContext>(rule: Rule<C>) -> Rule<C> {
    Rule::new(Not {
        name: format!("not({})", rule.name()),
        rule,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::FieldInfo;
    use crate::errors::RuleError;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how many leaf rules ran
    #[derive(Default)]
    struct Counter {
        calls: AtomicUsize,
    }

    fn counted(name: &'static str, outcome: Outcome) -> Rule<Counter> {
        Rule::from_fn(name, move |_, counter: &Counter| {
            counter.calls.fetch_add(1, Ordering::SeqCst);
            outcome.clone()
        })
    }

    fn failing(name: &'static str) -> Rule<Counter> {
        counted(name, Err(RuleError::new(name, "boom")))
    }

    async fn run(rule: &Rule<Counter>) -> (Outcome, usize) {
        let info = FieldInfo::new("Query", "users");
        let counter = Counter::default();
        let outcome = rule.evaluate(&FieldAccess::root(&Value::Null, &info), &counter).await;
        (outcome, counter.calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_or_short_circuits_on_allow() {
        let rule = or([
            counted("a", Ok(Decision::Deny)),
            counted("b", Ok(Decision::Allow)),
            counted("c", Ok(Decision::Allow)),
        ]);
        assert_eq!(run(&rule).await, (Ok(Decision::Allow), 2));
        assert_eq!(rule.name(), "or(a, b, c)");
    }

    #[tokio::test]
    async fn test_or_precedence() {
        let allow_beats_error = or([failing("x"), counted("y", Ok(Decision::Allow))]);
        assert_eq!(run(&allow_beats_error).await.0, Ok(Decision::Allow));

        let error_beats_deny = or([counted("y", Ok(Decision::Deny)), failing("x"), failing("z")]);
        assert_eq!(run(&error_beats_deny).await.0, Err(RuleError::new("x", "boom")));

        let all_deny = or([counted("y", Ok(Decision::Deny)), deny()]);
        assert_eq!(run(&all_deny).await.0, Ok(Decision::Deny));
    }

    #[tokio::test]
    async fn test_and_short_circuits_on_deny() {
        let rule = and([
            counted("a", Ok(Decision::Allow)),
            counted("b", Ok(Decision::Deny)),
            counted("c", Ok(Decision::Allow)),
        ]);
        assert_eq!(run(&rule).await, (Ok(Decision::Deny), 2));
    }

    #[tokio::test]
    async fn test_and_precedence() {
        let deny_beats_error = and([failing("x"), counted("y", Ok(Decision::Deny))]);
        assert_eq!(run(&deny_beats_error).await, (Ok(Decision::Deny), 2));

        let error_beats_allow = and([allow(), failing("x")]);
        assert_eq!(run(&error_beats_allow).await.0, Err(RuleError::new("x", "boom")));
    }

    #[tokio::test]
    async fn test_chain_stops_at_first_error() {
        let rule = chain([failing("x"), counted("y", Ok(Decision::Deny))]);
        assert_eq!(run(&rule).await, (Err(RuleError::new("x", "boom")), 1));
    }

    #[tokio::test]
    async fn test_not() {
        assert_eq!(run(&not(allow())).await.0, Ok(Decision::Deny));
        assert_eq!(run(&not(deny())).await.0, Ok(Decision::Allow));
        assert!(run(&not(failing("x"))).await.0.is_err());
        assert_eq!(not::<Counter>(allow()).name(), "not(allow)");
    }

    #[tokio::test]
    async fn test_identities() {
        assert_eq!(run(&or(Vec::new())).await.0, Ok(Decision::Deny));
        assert_eq!(run(&and(Vec::new())).await.0, Ok(Decision::Allow));

        let only = counted("only", Ok(Decision::Allow));
        assert!(or([only.clone()]).ptr_eq(&only));
        assert!(and([only.clone()]).ptr_eq(&only));
    }

    #[test]
    fn test_nested_names() {
        let rule: Rule<()> = and([allow(), or([deny(), not(allow())])]);
        assert_eq!(rule.name(), "and(allow, or(deny, not(allow)))");
    }
}
