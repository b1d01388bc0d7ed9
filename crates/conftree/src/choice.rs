//! Choice composites: a discriminated union over a catalog of named
//! variant types, with exactly one instantiated variant at a time.
//!
//! Selecting a key always builds a fresh child from the registry, so
//! nothing from a previously selected variant can leak across a switch.
//! A caller that wants to preserve data across a re-selection re-applies
//! a descriptor after selecting.

use crate::{
    Error, SchemaError,
    descriptor::{Descriptor, DescriptorError, ImportMode},
    entity::Entity,
    registry::Registry,
    validate::ValidateError,
};
use indexmap::IndexMap;
use thiserror::Error as ThisError;

///
/// ChoiceError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum ChoiceError {
    #[error("unknown option '{key}'")]
    UnknownOption { key: String },
}

///
/// ChoiceNode
///

#[derive(Clone, Debug, Default)]
pub struct ChoiceNode {
    options: IndexMap<String, String>,
    selected: Option<(String, Box<Entity>)>,
    required: bool,
}

impl ChoiceNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variant: option key -> concrete type name.
    pub fn add_option(
        &mut self,
        key: impl Into<String>,
        type_name: impl Into<String>,
    ) -> Result<(), SchemaError> {
        let key = key.into();
        if self.options.contains_key(&key) {
            return Err(SchemaError::DuplicateKey { key });
        }

        self.options.insert(key, type_name.into());
        Ok(())
    }

    /// A required choice fails validation while unselected; the default
    /// is optional, where "unset" is a legitimate state.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn has_option(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    #[must_use]
    pub fn selected_key(&self) -> Option<&str> {
        self.selected.as_ref().map(|(k, _)| k.as_str())
    }

    #[must_use]
    pub fn selected(&self) -> Option<&Entity> {
        self.selected.as_ref().map(|(_, e)| e.as_ref())
    }

    pub fn selected_mut(&mut self) -> Option<&mut Entity> {
        self.selected.as_mut().map(|(_, e)| e.as_mut())
    }

    /// Discard the current variant (if any) and build a fresh instance
    /// of the type registered for `key`.
    pub fn select(&mut self, registry: &Registry, key: &str) -> Result<&mut Entity, Error> {
        let type_name = self
            .options
            .get(key)
            .ok_or_else(|| ChoiceError::UnknownOption {
                key: key.to_string(),
            })?;

        let child = registry.build(type_name)?;
        self.selected = Some((key.to_string(), Box::new(child)));

        Ok(self
            .selected
            .as_mut()
            .map(|(_, e)| e.as_mut())
            .expect("selection was just made"))
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub(crate) const fn is_set(&self) -> bool {
        self.selected.is_some()
    }

    pub(crate) fn validate(&self) -> Result<(), ValidateError> {
        match &self.selected {
            None if self.required => Err(ValidateError::no_selection()),
            None => Ok(()),
            Some((key, child)) => child.validate().map_err(|e| e.at(key.as_str())),
        }
    }

    pub(crate) fn to_conf(&self) -> Descriptor {
        self.selected
            .as_ref()
            .map_or(Descriptor::Null, |(_, child)| child.to_conf())
    }

    pub(crate) fn export_desc(&self) -> Descriptor {
        let mut desc = IndexMap::new();
        match &self.selected {
            Some((key, child)) => {
                desc.insert("selected".to_string(), Descriptor::Text(key.clone()));
                desc.insert("option".to_string(), child.export());
            }
            None => {
                desc.insert("selected".to_string(), Descriptor::Null);
                desc.insert("option".to_string(), Descriptor::Null);
            }
        }

        Descriptor::Map(desc)
    }

    pub(crate) fn import_desc(
        &mut self,
        registry: &Registry,
        desc: &Descriptor,
        mode: ImportMode,
    ) -> Result<(), Error> {
        let Some(map) = desc.as_map() else {
            return Err(DescriptorError::shape_mismatch("map", desc).into());
        };

        let selected = map.get("selected").unwrap_or(&Descriptor::Null);
        let key = match selected {
            Descriptor::Null => {
                self.selected = None;
                return Ok(());
            }
            Descriptor::Text(key) if self.options.contains_key(key) => key.clone(),
            Descriptor::Text(key) if mode.is_lenient() => {
                // Stale stored selection; fall back to the first
                // declared option, freshly built.
                let Some(first) = self.options.keys().next().cloned() else {
                    self.selected = None;
                    return Ok(());
                };

                tracing::debug!(
                    stored = key.as_str(),
                    substituted = first.as_str(),
                    "lenient import replaced an unknown selected option"
                );

                let child = registry.build(&self.options[&first])?;
                self.selected = Some((first, Box::new(child)));
                return Ok(());
            }
            Descriptor::Text(key) => {
                return Err(DescriptorError::unknown_option(key.clone()).into());
            }
            other => {
                return Err(DescriptorError::shape_mismatch("text", other)
                    .at("selected")
                    .into());
            }
        };

        // Stage the fresh variant fully before committing.
        let mut child = registry.build(&self.options[&key])?;
        if let Some(option) = map.get("option")
            && !option.is_null()
        {
            child
                .import(registry, option, mode)
                .map_err(|e| e.at(key.as_str()))?;
        }

        self.selected = Some((key, Box::new(child)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Kind, ValueNode};

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register("ChatResponse", |_, _| {
                Ok(Entity::value("ChatResponse", ValueNode::new(Kind::String)))
            })
            .unwrap();
        registry
            .register("ConsoleResponse", |_, _| {
                Ok(Entity::value(
                    "ConsoleResponse",
                    ValueNode::new(Kind::String),
                ))
            })
            .unwrap();

        registry
    }

    fn response_choice() -> ChoiceNode {
        let mut node = ChoiceNode::new();
        node.add_option("chat", "ChatResponse").unwrap();
        node.add_option("console", "ConsoleResponse").unwrap();
        node
    }

    #[test]
    fn select_unknown_option() {
        let registry = registry();
        let mut node = response_choice();
        assert!(node.select(&registry, "carrier-pigeon").is_err());
        assert!(!node.is_set());
    }

    #[test]
    fn switching_options_discards_the_previous_variant() {
        let registry = registry();
        let mut node = response_choice();

        node.select(&registry, "chat")
            .unwrap()
            .set_value("hello")
            .unwrap();
        node.select(&registry, "console").unwrap();

        let child = node.selected().unwrap();
        assert_eq!(child.type_name(), "ConsoleResponse");
        assert!(!child.is_set());
    }

    #[test]
    fn required_choice_fails_validation_while_unselected() {
        let node = response_choice().required();
        assert_eq!(
            node.validate().unwrap_err(),
            ValidateError::no_selection()
        );
    }

    #[test]
    fn optional_choice_validates_while_unselected() {
        let node = response_choice();
        assert!(node.validate().is_ok());
    }

    #[test]
    fn lenient_import_substitutes_first_option_for_stale_keys() {
        let registry = registry();
        let mut node = response_choice();

        let mut desc = IndexMap::new();
        desc.insert("selected".to_string(), Descriptor::from("telegraph"));
        node.import_desc(&registry, &Descriptor::Map(desc), ImportMode::Lenient)
            .unwrap();

        assert_eq!(node.selected_key(), Some("chat"));
    }
}
