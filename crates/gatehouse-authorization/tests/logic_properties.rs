//! Property tests for rule logic
//!
//! Outcome classes of OR and AND must not depend on member order.

use futures::executor::block_on;
use gatehouse_authorization::{and, or, Decision, FieldAccess, FieldInfo, Outcome, Rule, RuleError};
use proptest::prelude::*;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Class {
    Allow,
    Deny,
    Error,
}

fn class_of(outcome: &Outcome) -> Class {
    match outcome {
        Ok(Decision::Allow) => Class::Allow,
        Ok(Decision::Deny) => Class::Deny,
        Err(_) => Class::Error,
    }
}

fn arb_class() -> impl Strategy<Value = Class> {
    prop_oneof![Just(Class::Allow), Just(Class::Deny), Just(Class::Error)]
}

fn rule(position: usize, class: Class) -> Rule<()> {
    let name = format!("leaf{position}");
    let outcome = match class {
        Class::Allow => Ok(Decision::Allow),
        Class::Deny => Ok(Decision::Deny),
        Class::Error => Err(RuleError::new(name.clone(), "unavailable")),
    };
    Rule::from_fn(name, move |_, _| outcome.clone())
}

fn rules(classes: &[Class]) -> Vec<Rule<()>> {
    classes.iter().enumerate().map(|(i, class)| rule(i, *class)).collect()
}

fn evaluate(rule: &Rule<()>) -> Outcome {
    let info = FieldInfo::new("Query", "events");
    block_on(rule.evaluate(&FieldAccess::root(&Value::Null, &info), &()))
}

proptest! {
    /// Property: OR yields Allow if any member allows, else Error if any errs, else Deny
    #[test]
    fn or_outcome_is_order_independent(classes in prop::collection::vec(arb_class(), 0..8)) {
        let forward = class_of(&evaluate(&or(rules(&classes))));
        let mut reversed_classes = classes.clone();
        reversed_classes.reverse();
        let reversed = class_of(&evaluate(&or(rules(&reversed_classes))));

        let expected = if classes.contains(&Class::Allow) {
            Class::Allow
        } else if classes.contains(&Class::Error) {
            Class::Error
        } else {
            Class::Deny
        };
        prop_assert_eq!(forward, expected);
        prop_assert_eq!(reversed, expected);
    }

    /// Property: AND yields Deny if any member denies, else Error if any errs, else Allow
    #[test]
    fn and_outcome_is_order_independent(classes in prop::collection::vec(arb_class(), 0..8)) {
        let forward = class_of(&evaluate(&and(rules(&classes))));
        let mut reversed_classes = classes.clone();
        reversed_classes.reverse();
        let reversed = class_of(&evaluate(&and(rules(&reversed_classes))));

        let expected = if classes.contains(&Class::Deny) {
            Class::Deny
        } else if classes.contains(&Class::Error) {
            Class::Error
        } else {
            Class::Allow
        };
        prop_assert_eq!(forward, expected);
        prop_assert_eq!(reversed, expected);
    }

    /// Property: with several failures the first one in declaration order is reported
    #[test]
    fn first_error_wins(classes in prop::collection::vec(prop_oneof![Just(Class::Deny), Just(Class::Error)], 1..8)) {
        let outcome = evaluate(&or(rules(&classes)));
        match classes.iter().position(|class| *class == Class::Error) {
            Some(first) => prop_assert_eq!(outcome.unwrap_err().rule, format!("leaf{first}")),
            None => prop_assert_eq!(outcome, Ok(Decision::Deny)),
        }
    }
}
