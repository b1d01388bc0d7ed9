//! Static object composites: an ordered, fixed schema of named children.
//!
//! The key set is declared once at construction and never grows or
//! shrinks at runtime; import only ever touches declared keys.

use crate::{
    SchemaError,
    descriptor::{Descriptor, DescriptorError, ImportMode},
    entity::Entity,
    registry::Registry,
    validate::ValidateError,
};
use indexmap::IndexMap;
use std::{fmt, sync::Arc};

///
/// CustomRule
///
/// A named composite-level invariant that cannot be expressed by any
/// single child (e.g. "at least one of image/sound must be set"). The
/// name identifies the rule in debug output; the message it returns is
/// expected to name the composite, not a child.
///

#[derive(Clone)]
pub struct CustomRule {
    name: &'static str,
    check: Arc<dyn Fn(&ObjectNode) -> Result<(), String> + Send + Sync>,
}

impl CustomRule {
    pub fn new(
        name: &'static str,
        check: impl Fn(&ObjectNode) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            check: Arc::new(check),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn check(&self, node: &ObjectNode) -> Result<(), String> {
        (self.check)(node)
    }
}

impl fmt::Debug for CustomRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomRule")
            .field("name", &self.name)
            .finish()
    }
}

///
/// ObjectRule
///
/// How the composite validates. Opting out of child recursion to
/// substitute an aggregate message is an explicit choice here, not an
/// override that forgot to chain.
///

#[derive(Clone, Debug, Default)]
pub enum ObjectRule {
    /// Validate every declared child in order (the default).
    #[default]
    Children,
    /// Only the custom invariant; child results do not surface.
    Custom(CustomRule),
    /// Children first, then the custom invariant.
    ChildrenThenCustom(CustomRule),
}

///
/// ObjectNode
///

#[derive(Clone, Debug, Default)]
pub struct ObjectNode {
    children: IndexMap<String, Entity>,
    identity_keys: Option<Vec<String>>,
    rule: ObjectRule,
}

impl ObjectNode {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a child. Construction-time only; a duplicate key is a
    /// programming error.
    pub fn add_child(
        &mut self,
        key: impl Into<String>,
        entity: Entity,
    ) -> Result<&mut Entity, SchemaError> {
        let key = key.into();
        if self.children.contains_key(&key) {
            return Err(SchemaError::DuplicateKey { key });
        }

        Ok(self.children.entry(key).or_insert(entity))
    }

    /// Narrow `is_set` to a subset of identifying children.
    #[must_use]
    pub fn with_identity_keys(mut self, keys: &[&str]) -> Self {
        self.identity_keys = Some(keys.iter().map(ToString::to_string).collect());
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: ObjectRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn child(&self, key: &str) -> Result<&Entity, SchemaError> {
        self.children
            .get(key)
            .ok_or_else(|| SchemaError::UnknownKey {
                key: key.to_string(),
            })
    }

    pub fn child_mut(&mut self, key: &str) -> Result<&mut Entity, SchemaError> {
        self.children
            .get_mut(key)
            .ok_or_else(|| SchemaError::UnknownKey {
                key: key.to_string(),
            })
    }

    #[must_use]
    pub fn has_child(&self, key: &str) -> bool {
        self.children.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entity)> {
        self.children.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn is_set(&self) -> bool {
        match &self.identity_keys {
            Some(keys) => keys
                .iter()
                .all(|k| self.children.get(k).is_some_and(Entity::is_set)),
            None => self.children.values().all(Entity::is_set),
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ValidateError> {
        match &self.rule {
            ObjectRule::Children => self.validate_children(),
            ObjectRule::Custom(rule) => rule.check(self).map_err(ValidateError::invalid),
            ObjectRule::ChildrenThenCustom(rule) => {
                self.validate_children()?;
                rule.check(self).map_err(ValidateError::invalid)
            }
        }
    }

    fn validate_children(&self) -> Result<(), ValidateError> {
        for (key, child) in &self.children {
            child.validate().map_err(|e| e.at(key.as_str()))?;
        }

        Ok(())
    }

    pub(crate) fn to_conf(&self) -> Descriptor {
        let mut conf = IndexMap::new();
        for (key, child) in &self.children {
            conf.insert(key.clone(), child.to_conf());
        }

        Descriptor::Map(conf)
    }

    pub(crate) fn export_desc(&self) -> Descriptor {
        let mut desc = IndexMap::new();
        for (key, child) in &self.children {
            desc.insert(key.clone(), child.export());
        }

        Descriptor::Map(desc)
    }

    pub(crate) fn import_desc(
        &mut self,
        registry: &Registry,
        desc: &Descriptor,
        mode: ImportMode,
    ) -> Result<(), crate::Error> {
        let Some(map) = desc.as_map() else {
            return Err(DescriptorError::shape_mismatch("map", desc).into());
        };

        // Stage into clones so a failing child leaves the committed
        // tree untouched (no half-populated imports).
        let mut staged: Vec<(String, Entity)> = Vec::new();
        for (key, sub) in map {
            let Some(child) = self.children.get(key) else {
                if mode.is_lenient() {
                    tracing::trace!(key, "lenient import skipped an undeclared key");
                    continue;
                }

                return Err(DescriptorError::unknown_key(key.clone()).into());
            };

            let mut draft = child.clone();
            draft
                .import(registry, sub, mode)
                .map_err(|e| e.at(key.as_str()))?;
            staged.push((key.clone(), draft));
        }

        for (key, draft) in staged {
            self.children[&key] = draft;
        }

        Ok(())
    }

    /// Shallow seeding hook: map a plain descriptor's top-level fields
    /// onto value-leaf children by key. Unknown keys and non-leaf
    /// children are skipped.
    pub(crate) fn seed(&mut self, data: &Descriptor) {
        let Some(map) = data.as_map() else {
            return;
        };

        for (key, sub) in map {
            let Some(child) = self.children.get_mut(key) else {
                continue;
            };

            let _ = child.import_scalar(sub);
        }
    }
}
