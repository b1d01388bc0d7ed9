//! conftree — a polymorphic configuration entity tree.
//!
//! The engine defines, validates and (de)serializes trees of typed
//! configuration nodes: scalar leaves, fixed-schema objects, homogeneous
//! dynamic arrays and discriminated-union choices, all built through an
//! explicit type registry. Concrete node types are data layered on top
//! of these four shapes; the standard set lives in `conftree-catalog`.
//!
//! The engine owns no I/O and no concurrency: every operation is pure,
//! synchronous and in-memory. One logical editing session owns a tree at
//! a time; `clone` produces a fully independent subtree for speculative
//! drafts.

pub mod array;
pub mod choice;
pub mod descriptor;
pub mod entity;
pub mod object;
pub mod registry;
pub mod validate;
pub mod value;

#[cfg(test)]
mod tests;

use thiserror::Error as ThisError;

pub use crate::{
    array::ArrayNode,
    choice::{ChoiceError, ChoiceNode},
    descriptor::{Descriptor, DescriptorError, DescriptorErrorKind, ImportMode},
    entity::{Entity, Payload, SchemaError, read_entity},
    object::{CustomRule, ObjectNode, ObjectRule},
    registry::{BuildArgs, Registry, RegistryError},
    validate::{NodePath, PathSeg, ValidateError},
    value::{ConfTransform, Constraint, Kind, Scalar, ValueNode},
};

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        ArrayNode, BuildArgs, ChoiceNode, ConfTransform, Constraint, Descriptor, Entity, Error,
        ImportMode, Kind, ObjectNode, ObjectRule, Registry, Scalar, ValueNode, read_entity,
    };
}

///
/// Error
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum Error {
    #[error(transparent)]
    Choice(#[from] ChoiceError),

    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validate(#[from] ValidateError),
}

impl Error {
    /// Prepend a path segment to errors that carry one; others pass
    /// through unchanged.
    #[must_use]
    pub fn at(self, seg: impl Into<PathSeg>) -> Self {
        match self {
            Self::Descriptor(e) => Self::Descriptor(e.at(seg)),
            Self::Validate(e) => Self::Validate(e.at(seg)),
            other => other,
        }
    }
}
