//! Nested literal syntax for rule trees

/// Build a [`RuleTree`](crate::RuleTree) from a nested literal
///
/// Every `name: { ... }` entry becomes a branch and every `name: expr` entry
/// becomes a leaf holding `expr`. Keys are identifiers or string literals.
/// The outermost braces are implied.
///
/// ```rust
/// use gatehouse_core::{rule_tree, RuleTree};
///
/// let tree: RuleTree<bool> = rule_tree! {
///     Query: { events: true },
///     Mutation: { createUser: true, "deleteUser": false },
/// };
/// assert_eq!(tree.lookup("Mutation", "deleteUser"), Some(&false));
/// ```
#[macro_export]
macro_rules! rule_tree {
    ($($body:tt)*) => {{
        #[allow(unused_mut)]
        let mut children = $crate::tree::IndexMap::new();
        $crate::__rule_tree_entries!(children; $($body)*);
        $crate::tree::RuleTree::Branch(children)
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rule_tree_entries {
    ($map:ident;) => {};
    ($map:ident; $key:tt : { $($inner:tt)* } $(, $($rest:tt)*)?) => {
        $map.insert($crate::__rule_tree_key!($key), $crate::rule_tree!($($inner)*));
        $crate::__rule_tree_entries!($map; $($($rest)*)?);
    };
    ($map:ident; $key:tt : $value:expr $(, $($rest:tt)*)?) => {
        $map.insert($crate::__rule_tree_key!($key), $crate::tree::RuleTree::Leaf($value));
        $crate::__rule_tree_entries!($map; $($($rest)*)?);
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __rule_tree_key {
    ($key:ident) => {
        ::std::string::String::from(stringify!($key))
    };
    ($key:literal) => {
        ::std::string::String::from($key)
    };
}
