//! The universal tree node.
//!
//! One `Entity` struct carries identity and presentation metadata; the
//! payload enum distinguishes the four shapes a node can take. The
//! parent/child relation is pure ownership — a node owns its subtree and
//! nothing in the tree points back up, which is what makes `clone` a
//! plain deep copy.

use crate::{
    array::ArrayNode,
    choice::ChoiceNode,
    descriptor::{Descriptor, ImportMode},
    object::ObjectNode,
    registry::Registry,
    validate::ValidateError,
    value::{Scalar, ValueNode},
    Error,
};
use crate::descriptor::DescriptorError;
use indexmap::IndexMap;
use thiserror::Error as ThisError;

///
/// SchemaError
///
/// Misuse of a declared schema — a programming error in the caller, not
/// a data error in a descriptor.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum SchemaError {
    #[error("duplicate key: {key}")]
    DuplicateKey { key: String },

    #[error("bad array element: expected type '{expected}', got '{got}'")]
    ElementTypeMismatch { expected: String, got: String },

    #[error("no array element at index {index} (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("illegal value: expected type '{expected}', got '{got}'")]
    KindMismatch {
        expected: &'static str,
        got: &'static str,
    },

    #[error("key not found: {key}")]
    UnknownKey { key: String },

    #[error("entity is a {got}, not a {expected}")]
    WrongVariant {
        expected: &'static str,
        got: &'static str,
    },
}

///
/// Payload
///

#[derive(Clone, Debug)]
pub enum Payload {
    Value(ValueNode),
    Object(ObjectNode),
    Array(ArrayNode),
    Choice(ChoiceNode),
}

impl Payload {
    #[must_use]
    pub const fn variant_name(&self) -> &'static str {
        match self {
            Self::Value(_) => "value",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Choice(_) => "choice",
        }
    }
}

///
/// Entity
///

#[derive(Clone, Debug)]
pub struct Entity {
    type_name: String,
    gui_hint: Option<String>,
    name: Option<String>,
    description: Option<String>,
    help: Option<String>,
    visible: bool,
    payload: Payload,
}

impl Entity {
    fn new(type_name: impl Into<String>, payload: Payload) -> Self {
        Self {
            type_name: type_name.into(),
            gui_hint: None,
            name: None,
            description: None,
            help: None,
            visible: true,
            payload,
        }
    }

    #[must_use]
    pub fn value(type_name: impl Into<String>, node: ValueNode) -> Self {
        Self::new(type_name, Payload::Value(node))
    }

    #[must_use]
    pub fn object(type_name: impl Into<String>, node: ObjectNode) -> Self {
        Self::new(type_name, Payload::Object(node))
    }

    #[must_use]
    pub fn array(type_name: impl Into<String>, node: ArrayNode) -> Self {
        Self::new(type_name, Payload::Array(node))
    }

    #[must_use]
    pub fn choice(type_name: impl Into<String>, node: ChoiceNode) -> Self {
        Self::new(type_name, Payload::Choice(node))
    }

    // ---- metadata (fluent constructors + mutators) ----

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Presentation type tag for a rendering layer; distinct from the
    /// data identity in `type_name`.
    #[must_use]
    pub fn with_gui_hint(mut self, hint: impl Into<String>) -> Self {
        self.gui_hint = Some(hint.into());
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn gui_hint(&self) -> Option<&str> {
        self.gui_hint.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    #[must_use]
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    pub fn set_help(&mut self, help: impl Into<String>) {
        self.help = Some(help.into());
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    // ---- payload access ----

    #[must_use]
    pub const fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn as_value(&self) -> Result<&ValueNode, SchemaError> {
        match &self.payload {
            Payload::Value(node) => Ok(node),
            other => Err(wrong_variant("value", other)),
        }
    }

    pub fn as_value_mut(&mut self) -> Result<&mut ValueNode, SchemaError> {
        match &mut self.payload {
            Payload::Value(node) => Ok(node),
            other => Err(wrong_variant("value", other)),
        }
    }

    pub fn as_object(&self) -> Result<&ObjectNode, SchemaError> {
        match &self.payload {
            Payload::Object(node) => Ok(node),
            other => Err(wrong_variant("object", other)),
        }
    }

    pub fn as_object_mut(&mut self) -> Result<&mut ObjectNode, SchemaError> {
        match &mut self.payload {
            Payload::Object(node) => Ok(node),
            other => Err(wrong_variant("object", other)),
        }
    }

    pub fn as_array(&self) -> Result<&ArrayNode, SchemaError> {
        match &self.payload {
            Payload::Array(node) => Ok(node),
            other => Err(wrong_variant("array", other)),
        }
    }

    pub fn as_array_mut(&mut self) -> Result<&mut ArrayNode, SchemaError> {
        match &mut self.payload {
            Payload::Array(node) => Ok(node),
            other => Err(wrong_variant("array", other)),
        }
    }

    pub fn as_choice(&self) -> Result<&ChoiceNode, SchemaError> {
        match &self.payload {
            Payload::Choice(node) => Ok(node),
            other => Err(wrong_variant("choice", other)),
        }
    }

    pub fn as_choice_mut(&mut self) -> Result<&mut ChoiceNode, SchemaError> {
        match &mut self.payload {
            Payload::Choice(node) => Ok(node),
            other => Err(wrong_variant("choice", other)),
        }
    }

    /// Leaf convenience: set this entity's scalar value.
    pub fn set_value(&mut self, scalar: impl Into<Scalar>) -> Result<(), SchemaError> {
        self.as_value_mut()?.set(scalar)
    }

    /// Leaf convenience: return to the unset state.
    pub fn clear_value(&mut self) -> Result<(), SchemaError> {
        self.as_value_mut()?.clear();
        Ok(())
    }

    // ---- shared contract ----

    /// True iff the entity holds a meaningful value. Leaves: a value is
    /// present. Objects: all (or the identifying) children are set.
    /// Arrays: every element is set. Choices: an option is selected.
    #[must_use]
    pub fn is_set(&self) -> bool {
        match &self.payload {
            Payload::Value(node) => node.is_set(),
            Payload::Object(node) => node.is_set(),
            Payload::Array(node) => node.is_set(),
            Payload::Choice(node) => node.is_set(),
        }
    }

    /// Fail-fast invariant check; the first violation found anywhere in
    /// the subtree surfaces with its path.
    pub fn validate(&self) -> Result<(), ValidateError> {
        match &self.payload {
            Payload::Value(node) => node.validate(),
            Payload::Object(node) => node.validate(),
            Payload::Array(node) => node.validate(),
            Payload::Choice(node) => node.validate(),
        }
    }

    /// The module-ready plain form: whatever a runtime consumer reads,
    /// with unset leaves falling back to their defaults.
    #[must_use]
    pub fn to_conf(&self) -> Descriptor {
        match &self.payload {
            Payload::Value(node) => node.to_conf(),
            Payload::Object(node) => node.to_conf(),
            Payload::Array(node) => node.to_conf(),
            Payload::Choice(node) => node.to_conf(),
        }
    }

    /// The storage form. Total: reflects whatever state exists,
    /// including unset markers — invariants are not enforced here.
    #[must_use]
    pub fn export(&self) -> Descriptor {
        let mut map = IndexMap::new();
        map.insert("type".to_string(), Descriptor::Text(self.type_name.clone()));
        if let Some(name) = &self.name {
            map.insert("name".to_string(), Descriptor::Text(name.clone()));
        }
        if let Some(description) = &self.description {
            map.insert(
                "description".to_string(),
                Descriptor::Text(description.clone()),
            );
        }
        if let Some(help) = &self.help {
            map.insert("helpText".to_string(), Descriptor::Text(help.clone()));
        }
        if !self.visible {
            map.insert("hidden".to_string(), Descriptor::Bool(true));
        }
        map.insert("descriptor".to_string(), self.export_desc());

        Descriptor::Map(map)
    }

    fn export_desc(&self) -> Descriptor {
        match &self.payload {
            Payload::Value(node) => node.export_desc(),
            Payload::Object(node) => node.export_desc(),
            Payload::Array(node) => node.export_desc(),
            Payload::Choice(node) => node.export_desc(),
        }
    }

    /// Rehydrate from a tagged export. Never validates; callers wanting
    /// enforcement run `validate` explicitly afterwards.
    pub fn import(
        &mut self,
        registry: &Registry,
        info: &Descriptor,
        mode: ImportMode,
    ) -> Result<(), Error> {
        let Some(map) = info.as_map() else {
            return Err(DescriptorError::shape_mismatch("map", info).into());
        };

        let tag = map
            .get("type")
            .and_then(Descriptor::as_text)
            .ok_or(DescriptorError::missing_field("type"))?;

        if tag != self.type_name {
            if !mode.is_lenient() {
                return Err(DescriptorError::type_mismatch(&self.type_name, tag).into());
            }

            if !self.assignable_from(tag) {
                // Value stored under an incompatible type; leave the
                // node in its constructed state.
                tracing::trace!(
                    declared = self.type_name,
                    stored = tag,
                    "lenient import skipped a non-assignable entity"
                );
                return Ok(());
            }
        }

        let desc = map.get("descriptor").unwrap_or(&Descriptor::Null);
        self.import_desc(registry, desc, mode)?;

        // Code-authored names and descriptions win over stored ones, so
        // wording fixed in code is not pinned by old saved files.
        if self.name.is_none()
            && let Some(name) = map.get("name").and_then(Descriptor::as_text)
        {
            self.name = Some(name.to_string());
        }
        if self.description.is_none()
            && let Some(description) = map.get("description").and_then(Descriptor::as_text)
        {
            self.description = Some(description.to_string());
        }
        if self.help.is_none()
            && let Some(help) = map.get("helpText").and_then(Descriptor::as_text)
        {
            self.help = Some(help.to_string());
        }
        self.visible = !map
            .get("hidden")
            .and_then(Descriptor::as_bool)
            .unwrap_or(false);

        Ok(())
    }

    pub(crate) fn import_desc(
        &mut self,
        registry: &Registry,
        desc: &Descriptor,
        mode: ImportMode,
    ) -> Result<(), Error> {
        match &mut self.payload {
            Payload::Value(node) => node.import_desc(desc, mode).map_err(Error::from),
            Payload::Object(node) => node.import_desc(registry, desc, mode),
            Payload::Array(node) => node.import_desc(registry, desc, mode),
            Payload::Choice(node) => node.import_desc(registry, desc, mode),
        }
    }

    /// Shallow seeding hook: composites that want to absorb several
    /// fields from one plain descriptor in a single call. Default
    /// behavior seeds an object's value-leaf children; other payloads
    /// ignore it.
    pub fn set_data(&mut self, data: &Descriptor) {
        if let Payload::Object(node) = &mut self.payload {
            node.seed(data);
        }
    }

    // Lenient value seeding used by `ObjectNode::seed`; kind mismatches
    // and non-leaf payloads report rather than panic.
    pub(crate) fn import_scalar(&mut self, desc: &Descriptor) -> Result<(), SchemaError> {
        let node = self.as_value_mut()?;
        match Scalar::from_descriptor(desc) {
            Some(scalar) => node.set(scalar),
            None => {
                node.clear();
                Ok(())
            }
        }
    }

    fn assignable_from(&self, tag: &str) -> bool {
        if tag == self.type_name {
            return true;
        }

        match &self.payload {
            Payload::Value(node) => node.assignable_from(tag),
            _ => false,
        }
    }
}

///
/// read_entity
///
/// Registry-driven rehydration of a whole tree: build the entity named
/// by the descriptor's `type` tag, then import the descriptor into it.
///

pub fn read_entity(
    registry: &Registry,
    info: &Descriptor,
    mode: ImportMode,
) -> Result<Entity, Error> {
    let tag = info
        .get("type")
        .and_then(Descriptor::as_text)
        .ok_or(DescriptorError::missing_field("type"))?;

    let mut entity = registry.build(tag)?;
    entity.import(registry, info, mode)?;

    Ok(entity)
}

fn wrong_variant(expected: &'static str, got: &Payload) -> SchemaError {
    SchemaError::WrongVariant {
        expected,
        got: got.variant_name(),
    }
}
