//! Typed entry keys.
//!
//! A key is a `(sequence, kind)` pair rendered as `"{sequence}:{tag}"` at the
//! storage-backend boundary. Sequences are assigned monotonically and never
//! reused; the kind tag of a key never changes after creation. Comparing keys
//! compares the full identity, so two kinds can never collide on a sequence
//! alone.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKind {
    /// Document root: ordered block children.
    Doc,
    /// Block wrapping a single `Text` child.
    Paragraph,
    /// String leaf.
    Text,
    /// Question block: `task` and `answers` slots.
    MultipleChoice,
    /// Ordered `Answer` children.
    Answers,
    /// One answer: `checked` and `label` slots.
    Answer,
    /// Boolean leaf.
    Checkbox,
}

impl NodeKind {
    pub const ALL: [NodeKind; 7] = [
        NodeKind::Doc,
        NodeKind::Paragraph,
        NodeKind::Text,
        NodeKind::MultipleChoice,
        NodeKind::Answers,
        NodeKind::Answer,
        NodeKind::Checkbox,
    ];

    /// Stable string tag used in keys and in the external value format.
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Doc => "doc",
            NodeKind::Paragraph => "paragraph",
            NodeKind::Text => "text",
            NodeKind::MultipleChoice => "multiple_choice",
            NodeKind::Answers => "answers",
            NodeKind::Answer => "answer",
            NodeKind::Checkbox => "checkbox",
        }
    }

    pub fn from_tag(tag: &str) -> Option<NodeKind> {
        NodeKind::ALL.into_iter().find(|k| k.tag() == tag)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for NodeKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        NodeKind::from_tag(&s)
            .ok_or_else(|| D::Error::custom(format!("unknown kind tag {s:?}")))
    }
}

/// Globally unique, kind-tagged entry identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    pub seq: u64,
    pub kind: NodeKind,
}

impl Key {
    pub fn new(seq: u64, kind: NodeKind) -> Self {
        Self { seq, kind }
    }

    /// `true` when this key addresses a node of the given kind.
    pub fn is_kind(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.seq, self.kind.tag())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("key {0:?} is missing the ':' separator")]
    MissingSeparator(String),
    #[error("key {0:?} has a non-numeric sequence")]
    BadSequence(String),
    #[error("key {0:?} names an unknown kind")]
    UnknownKind(String),
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (seq, tag) = s
            .split_once(':')
            .ok_or_else(|| KeyParseError::MissingSeparator(s.to_string()))?;
        let seq: u64 = seq
            .parse()
            .map_err(|_| KeyParseError::BadSequence(s.to_string()))?;
        let kind =
            NodeKind::from_tag(tag).ok_or_else(|| KeyParseError::UnknownKind(s.to_string()))?;
        Ok(Key { seq, kind })
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
