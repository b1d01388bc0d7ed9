//! Media asset composites: image and sound display parameters plus the
//! image effect union.
//!
//! Both `Image` and `Sound` treat the filename as their identity: the
//! other fields are presentation tweaks, so the composite only counts
//! as set once a file has been chosen.

use crate::values;
use conftree::{
    ArrayNode, ChoiceNode, Entity, ObjectNode, Registry, RegistryError, SchemaError,
};

fn natural(name: &str, description: &str) -> Entity {
    values::natural_number()
        .with_name(name)
        .with_description(description)
}

pub fn image() -> Result<Entity, SchemaError> {
    let mut node = ObjectNode::new().with_identity_keys(&["filename"]);
    node.add_child(
        "filename",
        values::string()
            .with_name("File Name")
            .with_description("The name of the image file that will be displayed"),
    )?;
    node.add_child(
        "width",
        values::integer()
            .with_name("Width")
            .with_description("Display width on screen"),
    )?;
    node.add_child(
        "height",
        values::integer()
            .with_name("Height")
            .with_description("Display height on screen"),
    )?;
    node.add_child(
        "duration",
        values::natural_number()
            .with_name("Duration")
            .with_description("Duration in milliseconds that the image will be displayed"),
    )?;
    node.add_child(
        "effects",
        Entity::array("Array", ArrayNode::new("ImageEffect"))
            .with_name("Effects")
            .with_description("Special effects to apply to the image"),
    )?;

    Ok(Entity::object("Image", node))
}

pub fn sound() -> Result<Entity, SchemaError> {
    let mut node = ObjectNode::new().with_identity_keys(&["filename"]);
    node.add_child(
        "filename",
        values::string()
            .with_name("File Name")
            .with_description("The name of the sound file that will be played"),
    )?;
    node.add_child(
        "volume",
        values::percentage_number()
            .with_name("Volume")
            .with_description("Volume at which to play the sound"),
    )?;

    Ok(Entity::object("Sound", node))
}

/// The effect union an image's `effects` array is built over.
pub fn image_effect() -> Result<Entity, SchemaError> {
    let mut node = ChoiceNode::new();
    node.add_option("glow", "ImageEffect_Glow")?;
    node.add_option("shadow", "ImageEffect_Shadow")?;
    node.add_option("dundundun", "ImageEffect_DunDunDun")?;

    Ok(Entity::choice("ImageEffect", node))
}

pub fn image_effect_glow() -> Result<Entity, SchemaError> {
    let mut node = ObjectNode::new();
    let size = natural(
        "Size",
        "Spread of the glow effect (warning: doesn't work that well).",
    );
    node.add_child("size", size)?;

    Ok(Entity::object("ImageEffect_Glow", node).with_name("Glow"))
}

pub fn image_effect_shadow() -> Result<Entity, SchemaError> {
    let mut node = ObjectNode::new();
    let size = natural(
        "Size",
        "Spread of the shadow effect (warning: doesn't work that well).",
    );
    node.add_child("size", size)?;

    Ok(Entity::object("ImageEffect_Shadow", node).with_name("Shadow"))
}

pub fn image_effect_dundundun() -> Result<Entity, SchemaError> {
    let mut node = ObjectNode::new();
    let duration_small = natural(
        "Small Size Duration",
        "The amount of time that the image will remain in its smallest size. Should match the pause between the first and second \"dun\"s of the sound effect.",
    );
    node.add_child("durationSmall", duration_small)?;
    let duration_medium = natural(
        "Medium Size Duration",
        "The amount of time that the image will remain in its middle size. Should match the pause between the second and third \"dun\"s of the sound effect.",
    );
    node.add_child("durationMedium", duration_medium)?;
    let duration_large = natural(
        "Large Size Duration",
        "The amount of time that the image will remain in its full size (shaking). Should match the length of the third \"dun\" in the sound effect.",
    );
    node.add_child("durationLarge", duration_large)?;
    let size_small = natural(
        "Small Size (Width)",
        "The width the image should have in its small form. The height will scale to match.",
    );
    node.add_child("sizeSmall", size_small)?;
    let size_medium = natural(
        "Medium Size (Width)",
        "The width the image should have in its middle form. The height will scale to match.",
    );
    node.add_child("sizeMedium", size_medium)?;
    let size_large = natural(
        "Large Size (Width)",
        "The width the image should have in its final form. The height will scale to match.",
    );
    node.add_child("sizeLarge", size_large)?;

    Ok(Entity::object("ImageEffect_DunDunDun", node)
        .with_name("Dun Dun Dun!!!")
        .with_description(
            "Makes the image zoom in in three steps and then shake (dun dun duuuuuun!!!)",
        ))
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register("Image", |_, _| image().map_err(Into::into))?;
    registry.register("Sound", |_, _| sound().map_err(Into::into))?;
    registry.register("ImageEffect", |_, _| image_effect().map_err(Into::into))?;
    registry.register("ImageEffect_Glow", |_, _| {
        image_effect_glow().map_err(Into::into)
    })?;
    registry.register("ImageEffect_Shadow", |_, _| {
        image_effect_shadow().map_err(Into::into)
    })?;
    registry.register("ImageEffect_DunDunDun", |_, _| {
        image_effect_dundundun().map_err(Into::into)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_identity_is_the_filename() {
        let mut image = image().unwrap();
        assert!(!image.is_set());

        let object = image.as_object_mut().unwrap();
        object
            .child_mut("width")
            .unwrap()
            .set_value(100.0)
            .unwrap();
        assert!(!image.is_set());

        image
            .as_object_mut()
            .unwrap()
            .child_mut("filename")
            .unwrap()
            .set_value("parrot.png")
            .unwrap();
        assert!(image.is_set());
    }

    #[test]
    fn effect_selection_builds_the_variant_fields() {
        let mut registry = Registry::new();
        crate::values::register(&mut registry).unwrap();
        register(&mut registry).unwrap();

        let mut effect = image_effect().unwrap();
        let choice = effect.as_choice_mut().unwrap();
        let glow = choice.select(&registry, "glow").unwrap();
        assert!(glow.as_object().unwrap().has_child("size"));
    }
}
