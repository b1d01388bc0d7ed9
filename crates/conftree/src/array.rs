//! Dynamic array composites: a homogeneous, order-significant sequence
//! of one declared element type.
//!
//! Element order is insertion order and consumers may rely on it (filter
//! priority, key sequences), so clone/export/import must reproduce it
//! exactly.

use crate::{
    Error, SchemaError,
    descriptor::{Descriptor, DescriptorError, ImportMode},
    entity::Entity,
    registry::{BuildArgs, Registry},
    validate::ValidateError,
};
use indexmap::IndexMap;

///
/// ArrayNode
///

#[derive(Clone, Debug)]
pub struct ArrayNode {
    element_type: String,
    build_args: BuildArgs,
    elements: Vec<Entity>,
}

impl ArrayNode {
    #[must_use]
    pub fn new(element_type: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            build_args: BuildArgs::default(),
            elements: Vec::new(),
        }
    }

    /// Constructor arguments handed to every element build, fixed at the
    /// array's own construction.
    #[must_use]
    pub fn with_args(mut self, args: BuildArgs) -> Self {
        self.build_args = args;
        self
    }

    #[must_use]
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.elements.get(index)
    }

    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Entity> {
        self.elements.get_mut(index)
    }

    /// Live, in-order iteration; re-running after a mutation observes
    /// the new state.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.elements.iter_mut()
    }

    /// Build one fresh element from the declared type and append it.
    pub fn add(&mut self, registry: &Registry) -> Result<&mut Entity, Error> {
        let element = registry.build_with(&self.element_type, &self.build_args)?;
        self.elements.push(element);

        Ok(self.elements.last_mut().expect("element was just pushed"))
    }

    /// Build, import the given descriptor (either a tagged export or a
    /// plain value descriptor), and append.
    pub fn add_from(
        &mut self,
        registry: &Registry,
        desc: &Descriptor,
        mode: ImportMode,
    ) -> Result<&mut Entity, Error> {
        let index = self.elements.len();
        let mut element = registry.build_with(&self.element_type, &self.build_args)?;

        let result = if desc.get("type").is_some() {
            element.import(registry, desc, mode)
        } else {
            element.import_desc(registry, desc, mode)
        };
        result.map_err(|e| e.at(index))?;

        self.elements.push(element);
        Ok(self.elements.last_mut().expect("element was just pushed"))
    }

    /// Append an already-built entity; its type must match the declared
    /// element type.
    pub fn push(&mut self, element: Entity) -> Result<(), SchemaError> {
        if element.type_name() != self.element_type {
            return Err(SchemaError::ElementTypeMismatch {
                expected: self.element_type.clone(),
                got: element.type_name().to_string(),
            });
        }

        self.elements.push(element);
        Ok(())
    }

    /// Detach and discard the element at `index`.
    pub fn remove(&mut self, index: usize) -> Result<Entity, SchemaError> {
        if index >= self.elements.len() {
            return Err(SchemaError::IndexOutOfBounds {
                index,
                len: self.elements.len(),
            });
        }

        Ok(self.elements.remove(index))
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub(crate) fn is_set(&self) -> bool {
        self.elements.iter().all(Entity::is_set)
    }

    pub(crate) fn validate(&self) -> Result<(), ValidateError> {
        for (index, element) in self.elements.iter().enumerate() {
            element.validate().map_err(|e| e.at(index))?;
        }

        Ok(())
    }

    pub(crate) fn to_conf(&self) -> Descriptor {
        Descriptor::Seq(self.elements.iter().map(Entity::to_conf).collect())
    }

    pub(crate) fn export_desc(&self) -> Descriptor {
        let mut desc = IndexMap::new();
        desc.insert(
            "elementType".to_string(),
            Descriptor::Text(self.element_type.clone()),
        );
        desc.insert(
            "elements".to_string(),
            Descriptor::Seq(self.elements.iter().map(Entity::export).collect()),
        );

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

        // The declared element type wins; a disagreeing tag is bad data
        // in strict mode and ignored leniently.
        if let Some(tag) = map.get("elementType").and_then(Descriptor::as_text)
            && tag != self.element_type
        {
            if !mode.is_lenient() {
                return Err(DescriptorError::type_mismatch(&self.element_type, tag).into());
            }

            tracing::trace!(
                declared = self.element_type,
                stored = tag,
                "lenient import ignored a stored element type"
            );
        }

        let elements = map
            .get("elements")
            .ok_or(DescriptorError::missing_field("elements"))?;
        let Some(items) = elements.as_seq() else {
            return Err(DescriptorError::shape_mismatch("sequence", elements)
                .at("elements")
                .into());
        };

        // Stage the full replacement before committing: a failing
        // element must not leave the array half-rebuilt.
        let mut staged = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let mut element = registry
                .build_with(&self.element_type, &self.build_args)
                .map_err(|e| e.at(index))?;
            element.import(registry, item, mode).map_err(|e| e.at(index))?;
            staged.push(element);
        }

        self.elements = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Kind, ValueNode};

    fn number_registry() -> Registry {
        let mut registry = Registry::new();
        registry
            .register("Number", |_, _| {
                Ok(Entity::value("Number", ValueNode::new(Kind::Number)))
            })
            .unwrap();
        registry
            .register("Positive", |_, _| {
                Ok(Entity::value(
                    "Positive",
                    ValueNode::new(Kind::Number).with_constraint(crate::Constraint::Positive),
                ))
            })
            .unwrap();

        registry
    }

    #[test]
    fn add_and_remove_preserve_order() {
        let registry = number_registry();
        let mut node = ArrayNode::new("Number");

        for n in [1.0, 2.0, 3.0] {
            node.add(&registry).unwrap().set_value(n).unwrap();
        }
        node.remove(1).unwrap();

        let values: Vec<f64> = node
            .iter()
            .map(|e| e.as_value().unwrap().get().unwrap().as_f64().unwrap())
            .collect();
        assert_eq!(values, vec![1.0, 3.0]);
    }

    #[test]
    fn remove_out_of_bounds() {
        let mut node = ArrayNode::new("Number");
        assert!(matches!(
            node.remove(0),
            Err(SchemaError::IndexOutOfBounds { index: 0, len: 0 })
        ));
    }

    #[test]
    fn push_enforces_element_type() {
        let mut node = ArrayNode::new("Number");
        let stray = Entity::value("String", ValueNode::new(Kind::String));
        assert!(matches!(
            node.push(stray),
            Err(SchemaError::ElementTypeMismatch { .. })
        ));
    }

    #[test]
    fn validate_reports_the_failing_index() {
        let registry = number_registry();
        let mut node = ArrayNode::new("Positive");
        node.add(&registry).unwrap().set_value(1.0).unwrap();
        node.add(&registry).unwrap().set_value(-5.0).unwrap();

        let err = node.validate().unwrap_err();
        assert_eq!(err.to_string(), "[1]: this value must be positive.");
    }

    #[test]
    fn missing_elements_field_is_an_error_even_leniently() {
        let registry = number_registry();
        let mut node = ArrayNode::new("Number");
        let desc = Descriptor::Map(IndexMap::new());

        assert!(
            node.import_desc(&registry, &desc, ImportMode::Lenient)
                .is_err()
        );
    }
}
