use crate::prelude::*;

// ---- a small fixture catalog ------------------------------------------

fn sound() -> Entity {
    let mut node = ObjectNode::new().with_identity_keys(&["filename"]);
    node.add_child(
        "filename",
        Entity::value("Filename", ValueNode::new(Kind::String)).with_name("File Name"),
    )
    .unwrap();
    node.add_child(
        "volume",
        Entity::value(
            "Volume",
            ValueNode::new(Kind::Number)
                .with_constraint(Constraint::Percentage)
                .with_default(100.0),
        ),
    )
    .unwrap();

    Entity::object("Sound", node)
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register("Filename", |_, _| {
            Ok(Entity::value("Filename", ValueNode::new(Kind::String)))
        })
        .unwrap();
    registry
        .register("Volume", |_, _| {
            Ok(Entity::value(
                "Volume",
                ValueNode::new(Kind::Number).with_constraint(Constraint::Percentage),
            ))
        })
        .unwrap();
    registry.register("Sound", |_, _| Ok(sound())).unwrap();
    registry
        .register("Playlist", |_, _| {
            Ok(Entity::array("Playlist", ArrayNode::new("Sound")))
        })
        .unwrap();

    registry
}

fn set_sound(entity: &mut Entity, filename: &str, volume: f64) {
    let node = entity.as_object_mut().unwrap();
    node.child_mut("filename")
        .unwrap()
        .set_value(filename)
        .unwrap();
    node.child_mut("volume").unwrap().set_value(volume).unwrap();
}

// ---- descriptor <-> JSON ----------------------------------------------

#[test]
fn descriptor_maps_onto_json() {
    let mut entity = sound();
    set_sound(&mut entity, "airhorn.mp3", 80.0);

    let exported = entity.export();
    let json = serde_json::to_string(&exported).unwrap();
    let parsed: Descriptor = serde_json::from_str(&json).unwrap();

    assert_eq!(parsed, exported);
}

#[test]
fn unset_leaf_exports_null() {
    let entity = sound();
    let desc = entity.export();
    let filename = desc
        .get("descriptor")
        .and_then(|d| d.get("filename"))
        .and_then(|d| d.get("descriptor"))
        .unwrap();

    assert!(filename.is_null());
}

// ---- round trips -------------------------------------------------------

#[test]
fn strict_round_trip_reproduces_the_export() {
    let registry = registry();
    let mut original = sound();
    set_sound(&mut original, "airhorn.mp3", 80.0);
    original.validate().unwrap();

    let exported = original.export();
    let rebuilt = read_entity(&registry, &exported, ImportMode::Strict).unwrap();

    assert_eq!(rebuilt.export(), exported);
}

#[test]
fn array_order_survives_a_round_trip() {
    let registry = registry();
    let mut playlist = registry.build("Playlist").unwrap();
    for (i, name) in ["a.mp3", "b.mp3", "c.mp3"].iter().enumerate() {
        let element = playlist
            .as_array_mut()
            .unwrap()
            .add(&registry)
            .unwrap();
        set_sound(element, name, i as f64);
    }

    let exported = playlist.export();
    let rebuilt = read_entity(&registry, &exported, ImportMode::Strict).unwrap();

    let names: Vec<String> = rebuilt
        .as_array()
        .unwrap()
        .iter()
        .map(|e| {
            e.as_object()
                .unwrap()
                .child("filename")
                .unwrap()
                .as_value()
                .unwrap()
                .get()
                .unwrap()
                .as_str()
                .unwrap()
                .to_string()
        })
        .collect();
    assert_eq!(names, vec!["a.mp3", "b.mp3", "c.mp3"]);
    assert_eq!(rebuilt.export(), exported);
}

// ---- import semantics --------------------------------------------------

#[test]
fn strict_import_failure_leaves_the_tree_untouched() {
    let registry = registry();
    let mut entity = sound();
    set_sound(&mut entity, "old.mp3", 50.0);

    let mut bad = sound();
    set_sound(&mut bad, "new.mp3", 50.0);
    let mut exported = bad.export();
    // Corrupt the volume in the stored form.
    if let Descriptor::Map(map) = &mut exported
        && let Some(Descriptor::Map(desc)) = map.get_mut("descriptor")
        && let Some(Descriptor::Map(volume)) = desc.get_mut("volume")
    {
        volume.insert("descriptor".to_string(), Descriptor::Number(150.0));
    }

    let err = entity
        .import(&registry, &exported, ImportMode::Strict)
        .unwrap_err();
    assert!(err.to_string().starts_with("volume:"));

    // Nothing was committed, not even the filename that imported fine.
    let node = entity.as_object().unwrap();
    let filename = node.child("filename").unwrap().as_value().unwrap();
    assert_eq!(filename.get().unwrap().as_str(), Some("old.mp3"));
}

#[test]
fn lenient_import_clamps_and_commits() {
    let registry = registry();
    let mut entity = sound();

    let mut stored = sound();
    set_sound(&mut stored, "new.mp3", 50.0);
    let mut exported = stored.export();
    if let Descriptor::Map(map) = &mut exported
        && let Some(Descriptor::Map(desc)) = map.get_mut("descriptor")
        && let Some(Descriptor::Map(volume)) = desc.get_mut("volume")
    {
        volume.insert("descriptor".to_string(), Descriptor::Number(150.0));
    }

    entity
        .import(&registry, &exported, ImportMode::Lenient)
        .unwrap();

    let node = entity.as_object().unwrap();
    let volume = node.child("volume").unwrap().as_value().unwrap();
    assert!(volume.is_set());
    assert_eq!(volume.get(), Some(&Scalar::Number(0.0)));
}

#[test]
fn imported_metadata_never_overrides_code_authored_text() {
    let registry = registry();
    let mut entity = sound().with_name("Sound");

    let mut stored = sound();
    stored.set_name("Old Saved Name");
    let exported = stored.export();

    entity
        .import(&registry, &exported, ImportMode::Lenient)
        .unwrap();
    assert_eq!(entity.name(), Some("Sound"));
}

#[test]
fn import_never_validates() {
    let registry = registry();
    // A required choice with nothing selected is invalid, but importing
    // its own (unselected) export must succeed.
    let mut choice_node = ChoiceNode::new().required();
    choice_node.add_option("sound", "Sound").unwrap();
    let mut entity = Entity::choice("SoundSlot", choice_node);

    let exported = entity.export();
    entity
        .import(&registry, &exported, ImportMode::Strict)
        .unwrap();
    assert!(entity.validate().is_err());
}

#[test]
fn read_entity_fails_on_unregistered_types() {
    let registry = registry();
    let mut map = indexmap::IndexMap::new();
    map.insert("type".to_string(), Descriptor::from("Ghost"));
    map.insert("descriptor".to_string(), Descriptor::Null);

    let err = read_entity(&registry, &Descriptor::Map(map), ImportMode::Lenient).unwrap_err();
    assert_eq!(err.to_string(), "unknown entity type: Ghost");
}

// ---- clone independence ------------------------------------------------

#[test]
fn clone_severs_all_sharing_at_depth_three() {
    let registry = registry();
    let mut playlist = registry.build("Playlist").unwrap();
    let element = playlist.as_array_mut().unwrap().add(&registry).unwrap();
    set_sound(element, "original.mp3", 10.0);

    let mut draft = playlist.clone();
    let draft_sound = draft.as_array_mut().unwrap().get_mut(0).unwrap();
    set_sound(draft_sound, "draft.mp3", 99.0);

    let original_sound = playlist.as_array().unwrap().get(0).unwrap();
    let filename = original_sound
        .as_object()
        .unwrap()
        .child("filename")
        .unwrap()
        .as_value()
        .unwrap();
    assert_eq!(filename.get().unwrap().as_str(), Some("original.mp3"));
}

// ---- conf form ---------------------------------------------------------

#[test]
fn to_conf_is_plain_and_total() {
    let mut entity = sound();
    set_sound(&mut entity, "airhorn.mp3", 80.0);

    let conf = entity.to_conf();
    assert_eq!(
        conf.get("filename").and_then(Descriptor::as_text),
        Some("airhorn.mp3")
    );
    assert_eq!(conf.get("volume").and_then(Descriptor::as_number), Some(80.0));

    // Total even on an unset tree: the default shows through, unset
    // leaves render null.
    let empty = sound();
    let conf = empty.to_conf();
    assert!(conf.get("filename").unwrap().is_null());
    assert_eq!(conf.get("volume").and_then(Descriptor::as_number), Some(100.0));
}
