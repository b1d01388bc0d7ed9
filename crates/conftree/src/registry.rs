//! The type registry: type name -> builder closure.
//!
//! Built explicitly and passed explicitly. A process typically fills one
//! registry during initialization and treats it as frozen afterward;
//! lookups through a shared reference are safe from any number of
//! editing sessions. Tests construct isolated registries per case.

use crate::{Error, descriptor::Descriptor, entity::Entity};
use indexmap::IndexMap;
use std::{fmt, sync::Arc};
use thiserror::Error as ThisError;

///
/// RegistryError
///
/// Always a deployment or registration defect, never a recoverable
/// runtime condition.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum RegistryError {
    #[error("duplicate entity type: {type_name}")]
    DuplicateType { type_name: String },

    #[error("unknown entity type: {type_name}")]
    UnregisteredType { type_name: String },
}

///
/// BuildArgs
///
/// Positional constructor arguments fixed at the call site — the
/// parameters a composite bakes into its child builders (an array's
/// element options, a command's default name).
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BuildArgs(Vec<Descriptor>);

impl BuildArgs {
    #[must_use]
    pub const fn none() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn one(arg: impl Into<Descriptor>) -> Self {
        Self(vec![arg.into()])
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Descriptor> {
        self.0.get(index)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<Descriptor>> for BuildArgs {
    fn from(args: Vec<Descriptor>) -> Self {
        Self(args)
    }
}

type BuildFn = dyn Fn(&Registry, &BuildArgs) -> Result<Entity, Error> + Send + Sync;

///
/// Registry
///

#[derive(Clone, Default)]
pub struct Registry {
    builders: IndexMap<String, Arc<BuildFn>>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append-only registration; re-registering a name is a defect.
    pub fn register(
        &mut self,
        type_name: impl Into<String>,
        builder: impl Fn(&Registry, &BuildArgs) -> Result<Entity, Error> + Send + Sync + 'static,
    ) -> Result<(), RegistryError> {
        let type_name = type_name.into();
        if self.builders.contains_key(&type_name) {
            return Err(RegistryError::DuplicateType { type_name });
        }

        tracing::debug!(type_name, "registered entity type");
        self.builders.insert(type_name, Arc::new(builder));

        Ok(())
    }

    #[must_use]
    pub fn contains(&self, type_name: &str) -> bool {
        self.builders.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.builders.keys().map(String::as_str)
    }

    /// Build a fresh instance of a registered type.
    pub fn build(&self, type_name: &str) -> Result<Entity, Error> {
        self.build_with(type_name, &BuildArgs::none())
    }

    pub fn build_with(&self, type_name: &str, args: &BuildArgs) -> Result<Entity, Error> {
        let builder = self
            .builders
            .get(type_name)
            .ok_or_else(|| RegistryError::UnregisteredType {
                type_name: type_name.to_string(),
            })?;

        builder(self, args)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.builders.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Kind, ValueNode};

    #[test]
    fn duplicate_registration_fails() {
        let mut registry = Registry::new();
        let build =
            |_: &Registry, _: &BuildArgs| Ok(Entity::value("Flag", ValueNode::new(Kind::Boolean)));

        registry.register("Flag", build).unwrap();
        assert_eq!(
            registry.register("Flag", build),
            Err(RegistryError::DuplicateType {
                type_name: "Flag".to_string()
            })
        );
    }

    #[test]
    fn unregistered_lookup_fails_loudly() {
        let registry = Registry::new();
        let err = registry.build("Ghost").unwrap_err();
        assert_eq!(err.to_string(), "unknown entity type: Ghost");
    }

    #[test]
    fn builders_can_read_args() {
        let mut registry = Registry::new();
        registry
            .register("Named", |_, args| {
                let name = args
                    .get(0)
                    .and_then(Descriptor::as_text)
                    .unwrap_or("unnamed");
                Ok(Entity::value("Named", ValueNode::new(Kind::String)).with_name(name))
            })
            .unwrap();

        let entity = registry
            .build_with("Named", &BuildArgs::one("greeting"))
            .unwrap();
        assert_eq!(entity.name(), Some("greeting"));
    }
}
