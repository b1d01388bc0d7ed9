//! Audience filters: the gate conditions a function checks before it
//! runs, and the union modules assemble them from.
//!
//! `FilterChoice` is the catalog's one parameterized union: a module
//! passes the option keys it supports as a build argument and gets a
//! choice restricted to that subset; with no argument the full table
//! is offered.

use crate::values;
use conftree::{
    ArrayNode, ChoiceError, ChoiceNode, Descriptor, Entity, Error, ObjectNode, Registry,
    RegistryError, SchemaError,
};

// Option key -> variant type, in presentation order.
const ALL_FILTERS: &[(&str, &str)] = &[
    ("specificUser", "Filter_SpecificUser"),
    ("oneOfUsers", "Filter_OneOfUsers"),
    ("isMod", "Filter_IsMod"),
    ("isSub", "Filter_IsSub"),
    ("isVIP", "Filter_IsVIP"),
    ("isBroadcaster", "Filter_IsBroadcaster"),
    ("windowActive", "Filter_WindowActive"),
    ("windowRunning", "Filter_WindowRunning"),
];

fn variant_for(key: &str) -> Result<&'static str, ChoiceError> {
    ALL_FILTERS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, type_name)| *type_name)
        .ok_or_else(|| ChoiceError::UnknownOption {
            key: key.to_string(),
        })
}

/// The filter union. `allowed` narrows the offered options to a subset
/// of the table; a key outside the table is a registration defect.
pub fn filter_choice(allowed: Option<&Descriptor>) -> Result<Entity, Error> {
    let mut node = ChoiceNode::new();
    match allowed.and_then(Descriptor::as_seq) {
        Some(keys) => {
            for key in keys {
                let key = key.as_text().ok_or_else(|| ChoiceError::UnknownOption {
                    key: key.shape().to_string(),
                })?;
                node.add_option(key, variant_for(key)?)?;
            }
        }
        None => {
            for (key, type_name) in ALL_FILTERS {
                node.add_option(*key, *type_name)?;
            }
        }
    }

    Ok(Entity::choice("FilterChoice", node).with_gui_hint("ExpandableChoice"))
}

// Field-less filters gate on who the invoking user is.
fn user_gate(type_name: &str, name: &str, description: &str) -> Entity {
    Entity::object(type_name, ObjectNode::new())
        .with_name(name)
        .with_description(description)
}

pub fn specific_user() -> Result<Entity, SchemaError> {
    let mut node = ObjectNode::new();
    node.add_child(
        "username",
        values::string()
            .with_name("Username")
            .with_description("Twitch username of the user who can use this"),
    )?;

    Ok(Entity::object("Filter_SpecificUser", node)
        .with_name("Specific User")
        .with_description("Allows usage by a specific user"))
}

pub fn one_of_users() -> Result<Entity, SchemaError> {
    let mut node = ObjectNode::new();
    node.add_child(
        "usernames",
        Entity::array("Array", ArrayNode::new("String"))
            .with_name("Usernames")
            .with_description("Twitch usernames of the users who can use this"),
    )?;

    Ok(Entity::object("Filter_OneOfUsers", node)
        .with_name("One of Users")
        .with_description("Allows usage by any of the listed users"))
}

fn window_filter(
    type_name: &str,
    name: &str,
    description: &str,
) -> Result<Entity, SchemaError> {
    let mut node = ObjectNode::new();
    node.add_child(
        "title",
        values::string()
            .with_name("Window Title")
            .with_description(
                "The title of the window to check for (this is what shows up when you hover the mouse over the window in the Task Bar)",
            ),
    )?;

    Ok(Entity::object(type_name, node)
        .with_name(name)
        .with_description(description))
}

pub fn window_active() -> Result<Entity, SchemaError> {
    window_filter(
        "Filter_WindowActive",
        "Window Active",
        "Only works when a window with the specified title is in focus",
    )
}

pub fn window_running() -> Result<Entity, SchemaError> {
    window_filter(
        "Filter_WindowRunning",
        "Window Running",
        "Only works when a window with the specified title exists (even if it's in the background)",
    )
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register("FilterChoice", |_, args| filter_choice(args.get(0)))?;
    registry.register("Filter_SpecificUser", |_, _| {
        specific_user().map_err(Into::into)
    })?;
    registry.register("Filter_OneOfUsers", |_, _| {
        one_of_users().map_err(Into::into)
    })?;
    registry.register("Filter_IsMod", |_, _| {
        Ok(user_gate(
            "Filter_IsMod",
            "Moderator",
            "Allows usage by channel moderators",
        ))
    })?;
    registry.register("Filter_IsSub", |_, _| {
        Ok(user_gate(
            "Filter_IsSub",
            "Subscriber",
            "Allows usage by channel subscribers",
        ))
    })?;
    registry.register("Filter_IsVIP", |_, _| {
        Ok(user_gate(
            "Filter_IsVIP",
            "VIP",
            "Allows usage by channel VIPs",
        ))
    })?;
    registry.register("Filter_IsBroadcaster", |_, _| {
        Ok(user_gate(
            "Filter_IsBroadcaster",
            "Broadcaster",
            "Allows usage by the streamer only",
        ))
    })?;
    registry.register("Filter_WindowActive", |_, _| {
        window_active().map_err(Into::into)
    })?;
    registry.register("Filter_WindowRunning", |_, _| {
        window_running().map_err(Into::into)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use conftree::BuildArgs;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        crate::values::register(&mut registry).unwrap();
        register(&mut registry).unwrap();
        registry
    }

    #[test]
    fn full_table_is_offered_by_default() {
        let choice = filter_choice(None).unwrap();
        let offered: Vec<&str> = choice
            .as_choice()
            .unwrap()
            .options()
            .map(|(key, _)| key)
            .collect();
        assert_eq!(offered.len(), ALL_FILTERS.len());
        assert_eq!(offered[0], "specificUser");
    }

    #[test]
    fn build_argument_narrows_the_offered_options() {
        let registry = registry();
        let args = BuildArgs::one(vec![Descriptor::from("isMod"), Descriptor::from("isBroadcaster")]);
        let choice = registry.build_with("FilterChoice", &args).unwrap();

        let node = choice.as_choice().unwrap();
        let offered: Vec<&str> = node.options().map(|(key, _)| key).collect();
        assert_eq!(offered, ["isMod", "isBroadcaster"]);
        assert!(!node.has_option("specificUser"));
    }

    #[test]
    fn unknown_filter_key_fails_the_build() {
        let registry = registry();
        let args = BuildArgs::one(vec![Descriptor::from("timeOfDay")]);
        let err = registry.build_with("FilterChoice", &args).unwrap_err();
        assert_eq!(err.to_string(), "unknown option 'timeOfDay'");
    }

    #[test]
    fn selecting_a_variant_builds_its_fields() {
        let registry = registry();
        let mut choice = filter_choice(None).unwrap();
        let selected = choice
            .as_choice_mut()
            .unwrap()
            .select(&registry, "windowRunning")
            .unwrap();
        assert!(selected.as_object().unwrap().has_child("title"));
    }
}
