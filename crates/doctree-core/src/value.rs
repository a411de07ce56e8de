//! External value format helpers.
//!
//! The only shape external callers ever see: every composite node is a JSON
//! object `{"kind": tag, ...}` nesting the external forms of its children;
//! leaves are bare scalars. Internal keys never leak into it.

use doctree_store::NodeKind;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("composite value must be an object with a string \"kind\" field")]
    MissingKindTag,
    #[error("unknown kind tag {0:?}")]
    UnknownTag(String),
    #[error("expected kind {expected}, found {found}")]
    WrongKind { expected: NodeKind, found: NodeKind },
    #[error("{kind} value is missing field {field:?}")]
    MissingField { kind: NodeKind, field: &'static str },
    #[error("{kind} content must be an array")]
    ExpectedArray { kind: NodeKind },
    #[error("text value must be a bare string")]
    ExpectedString,
    #[error("checkbox value must be a bare boolean")]
    ExpectedBool,
}

/// Reads the kind tag of a composite external value.
pub fn kind_of(value: &Value) -> Result<NodeKind, ValueError> {
    let tag = value
        .get("kind")
        .and_then(Value::as_str)
        .ok_or(ValueError::MissingKindTag)?;
    NodeKind::from_tag(tag).ok_or_else(|| ValueError::UnknownTag(tag.to_string()))
}

/// Checks that a composite value carries the expected kind tag.
pub fn expect_kind(value: &Value, expected: NodeKind) -> Result<(), ValueError> {
    let found = kind_of(value)?;
    if found == expected {
        Ok(())
    } else {
        Err(ValueError::WrongKind { expected, found })
    }
}

/// Fetches a named field of a composite value.
pub fn field<'a>(
    value: &'a Value,
    kind: NodeKind,
    name: &'static str,
) -> Result<&'a Value, ValueError> {
    value
        .get(name)
        .ok_or(ValueError::MissingField { kind, field: name })
}
