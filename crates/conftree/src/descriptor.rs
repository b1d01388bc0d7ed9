//! The plain-data ("descriptor") form of an entity tree.
//!
//! A `Descriptor` is what the engine hands to — and accepts from — the
//! persistence and transport layers. It is deliberately schemaless: a
//! tree of maps, sequences and scalars that serializes 1:1 onto JSON.

use crate::validate::{NodePath, PathSeg, prefixed};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Descriptor
///

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Descriptor {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    Seq(Vec<Descriptor>),
    Map(IndexMap<String, Descriptor>),
}

impl Descriptor {
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_seq(&self) -> Option<&Vec<Self>> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&IndexMap<String, Self>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Map-field lookup; `None` on non-maps and absent keys alike.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Self> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Shape name used in error messages.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Seq(_) => "sequence",
            Self::Map(_) => "map",
        }
    }
}

impl From<bool> for Descriptor {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Descriptor {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for Descriptor {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Descriptor {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<Self>> for Descriptor {
    fn from(items: Vec<Self>) -> Self {
        Self::Seq(items)
    }
}

impl From<IndexMap<String, Self>> for Descriptor {
    fn from(map: IndexMap<String, Self>) -> Self {
        Self::Map(map)
    }
}

///
/// ImportMode
///
/// Lenient is the default used when loading possibly-stale stored
/// configuration: out-of-range and mis-kinded scalars are replaced by
/// the target's documented fallback instead of failing. Shape problems
/// (a sequence where a map must be) are errors in both modes.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ImportMode {
    Strict,
    #[default]
    Lenient,
}

impl ImportMode {
    #[must_use]
    pub const fn is_lenient(self) -> bool {
        matches!(self, Self::Lenient)
    }
}

///
/// DescriptorError
///
/// Import-side failures. In strict mode every mismatch lands here; in
/// lenient mode only structurally nonsensical input does.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
#[error("{}", prefixed(.path, &.kind.to_string()))]
pub struct DescriptorError {
    pub path: NodePath,
    pub kind: DescriptorErrorKind,
}

///
/// DescriptorErrorKind
///

#[derive(Clone, Debug, PartialEq, ThisError)]
#[remain::sorted]
pub enum DescriptorErrorKind {
    #[error("expected a {expected} value, got {got}")]
    KindMismatch {
        expected: &'static str,
        got: &'static str,
    },

    #[error("missing field '{field}'")]
    MissingField { field: &'static str },

    #[error("value rejected: {message}")]
    OutOfRange { message: String },

    #[error("expected a {expected}, got {got}")]
    ShapeMismatch {
        expected: &'static str,
        got: &'static str,
    },

    #[error("wrong entity type: expected '{expected}', got '{got}'")]
    TypeMismatch { expected: String, got: String },

    #[error("unknown key '{key}'")]
    UnknownKey { key: String },

    #[error("unknown option '{key}'")]
    UnknownOption { key: String },
}

impl From<DescriptorErrorKind> for DescriptorError {
    fn from(kind: DescriptorErrorKind) -> Self {
        Self {
            path: NodePath::root(),
            kind,
        }
    }
}

impl DescriptorError {
    pub(crate) fn kind_mismatch(expected: &'static str, got: &'static str) -> Self {
        DescriptorErrorKind::KindMismatch { expected, got }.into()
    }

    pub(crate) fn missing_field(field: &'static str) -> Self {
        DescriptorErrorKind::MissingField { field }.into()
    }

    pub(crate) fn out_of_range(message: impl Into<String>) -> Self {
        DescriptorErrorKind::OutOfRange {
            message: message.into(),
        }
        .into()
    }

    pub(crate) fn shape_mismatch(expected: &'static str, got: &Descriptor) -> Self {
        DescriptorErrorKind::ShapeMismatch {
            expected,
            got: got.shape(),
        }
        .into()
    }

    pub(crate) fn type_mismatch(expected: impl Into<String>, got: impl Into<String>) -> Self {
        DescriptorErrorKind::TypeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
        .into()
    }

    pub(crate) fn unknown_key(key: impl Into<String>) -> Self {
        DescriptorErrorKind::UnknownKey { key: key.into() }.into()
    }

    pub(crate) fn unknown_option(key: impl Into<String>) -> Self {
        DescriptorErrorKind::UnknownOption { key: key.into() }.into()
    }

    /// Prepend the segment a composite used to reach the failing child.
    #[must_use]
    pub fn at(mut self, seg: impl Into<PathSeg>) -> Self {
        self.path.prepend(seg.into());
        self
    }
}
