//! What a leaf predicate sees about the field being resolved

use gatehouse_core::FieldPath;
use serde_json::Value;

static NULL: Value = Value::Null;

/// Static metadata of the field being resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    /// Object type owning the field (`Event`, `Mutation`, ...)
    pub parent_type: String,
    /// Field name (`title`, `createEvent`, ...)
    pub field_name: String,
}

impl FieldInfo {
    /// Field metadata from type and field names
    pub fn new(parent_type: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            parent_type: parent_type.into(),
            field_name: field_name.into(),
        }
    }

    /// Parse `Type.field`
    pub fn parse(dotted: &str) -> Option<Self> {
        let (parent_type, field_name) = dotted.split_once('.')?;
        if parent_type.is_empty() || field_name.is_empty() {
            return None;
        }
        Some(Self::new(parent_type, field_name))
    }

    /// `Type.field` as a two-segment path
    pub fn path(&self) -> FieldPath {
        FieldPath::new([self.parent_type.as_str(), self.field_name.as_str()])
    }
}

/// One field access: source object, field arguments and field metadata
#[derive(Debug, Clone, Copy)]
pub struct FieldAccess<'a> {
    /// Object the field is resolved on; `Null` for root operations
    pub parent: &'a Value,
    /// Field arguments
    pub args: &'a Value,
    /// Field metadata
    pub info: &'a FieldInfo,
}

impl<'a> FieldAccess<'a> {
    /// Access with an explicit parent object
    pub fn new(parent: &'a Value, args: &'a Value, info: &'a FieldInfo) -> Self {
        Self { parent, args, info }
    }

    /// Access to a root operation field (`Query.*`, `Mutation.*`)
    pub fn root(args: &'a Value, info: &'a FieldInfo) -> Self {
        Self::new(&NULL, args, info)
    }

    /// Field argument `name`, if given
    pub fn arg(&self, name: &str) -> Option<&'a Value> {
        self.args.get(name)
    }

    /// Field `name` of the parent object
    pub fn parent_field(&self, name: &str) -> Option<&'a Value> {
        self.parent.get(name)
    }
}
