//! Bot-function composites: commands, cooldowns, keyboard shortcuts
//! and the trigger/response unions.
//!
//! `Command` is the one type whose builder takes arguments: callers can
//! hand the registry a plain seed map (`cmdname`, `cost`, ...) and get
//! a pre-populated command back, which is how module authors declare
//! their built-in commands in code.

use crate::{assets, values};
use conftree::{
    ArrayNode, ChoiceNode, CustomRule, Descriptor, Entity, Kind, ObjectNode, ObjectRule, Registry,
    RegistryError, Scalar, SchemaError, ValueNode,
};

fn enabled_flag(description: &str) -> Entity {
    Entity::value("Boolean", ValueNode::new(Kind::Boolean).with_default(true))
        .with_name("Enabled")
        .with_description(description)
}

pub fn cooldown() -> Result<Entity, SchemaError> {
    let mut node = ObjectNode::new();
    node.add_child(
        "user",
        values::natural_number()
            .with_description("Time in milliseconds before the same user can use the command."),
    )?;
    node.add_child(
        "global",
        values::natural_number()
            .with_description("Time in milliseconds before the command can be used again at all."),
    )?;

    Ok(Entity::object("Cooldown", node))
}

/// One keyboard shortcut: the ordered keys that must be held together.
pub fn key_shortcut() -> Result<Entity, SchemaError> {
    let mut node = ObjectNode::new();
    node.add_child(
        "keys",
        Entity::array("Array", ArrayNode::new("KeyCode"))
            .with_name("Keys")
            .with_description("The keys that make up the shortcut, in press order"),
    )?;

    Ok(Entity::object("KeyShortcut", node))
}

///
/// Triggers
///

fn trigger_base() -> Result<ObjectNode, SchemaError> {
    let mut node = ObjectNode::new();
    node.add_child("enabled", enabled_flag("Enables/disables this trigger"))?;
    node.add_child(
        "cooldowns",
        cooldown()?.with_description(
            "Trigger-specific cooldowns (work in addition to function-wide cooldowns)",
        ),
    )?;

    Ok(node)
}

pub fn trigger() -> Result<Entity, SchemaError> {
    let mut node = ChoiceNode::new();
    node.add_option("command", "Trigger_Command")?;
    node.add_option("message", "Trigger_Message")?;
    node.add_option("shortcut", "Trigger_Shortcut")?;
    node.add_option("reward", "Trigger_ChannelReward")?;

    Ok(Entity::choice("Trigger", node).with_gui_hint("ExpandableChoice"))
}

pub fn trigger_command() -> Result<Entity, SchemaError> {
    let mut node = trigger_base()?;
    node.add_child(
        "cmdname",
        values::string()
            .with_name("Name")
            .with_description("The term that will invoke the command"),
    )?;
    node.add_child(
        "cost",
        values::natural_number().with_description("Cost in StreamElements loyalty points"),
    )?;

    Ok(Entity::object("Trigger_Command", node)
        .with_name("Command")
        .with_description("Activates this function via a command on the Twitch chat"))
}

pub fn trigger_message() -> Result<Entity, SchemaError> {
    let mut node = trigger_base()?;
    node.add_child(
        "text",
        values::string()
            .with_name("Text")
            .with_description("The text that will invoke the function"),
    )?;
    node.add_child(
        "exact",
        values::boolean().with_description(
            "The text must match the message exactly, rather than show up anywhere.",
        ),
    )?;
    node.add_child(
        "regex",
        values::boolean()
            .with_description("Specifies that the given text is a regular expression."),
    )?;

    Ok(Entity::object("Trigger_Message", node)
        .with_name("Message")
        .with_description("Activates this function via a message on the Twitch chat"))
}

pub fn trigger_shortcut() -> Result<Entity, SchemaError> {
    let mut node = trigger_base()?;
    node.add_child(
        "keys",
        Entity::array("Array", ArrayNode::new("KeyShortcut"))
            .with_name("Shortcuts")
            .with_description("List of keyboard shortcuts that will activate this trigger"),
    )?;

    Ok(Entity::object("Trigger_Shortcut", node)
        .with_name("Key Shortcut")
        .with_description(
            "Activates this function when pressing one of a set of keyboard shortcuts",
        ))
}

pub fn trigger_channel_reward() -> Result<Entity, SchemaError> {
    let mut node = trigger_base()?;
    node.add_child(
        "rewardID",
        values::channel_reward()
            .with_name("Reward")
            .with_description("Name of the channel reward which will activate this function"),
    )?;

    Ok(Entity::object("Trigger_ChannelReward", node)
        .with_name("Channel Reward")
        .with_description("Activates this function when the selected channel reward is redeemed"))
}

///
/// Responses
///

fn response_base(description: &str) -> Result<ObjectNode, SchemaError> {
    let mut node = ObjectNode::new();
    node.add_child("enabled", enabled_flag("Enables/disables this response"))?;
    node.add_child(
        "message",
        values::string().with_description(description),
    )?;

    Ok(node)
}

pub fn response() -> Result<Entity, SchemaError> {
    let mut node = ChoiceNode::new();
    node.add_option("chat", "Response_Chat")?;
    node.add_option("console", "Response_Console")?;

    Ok(Entity::choice("Response", node))
}

pub fn response_chat() -> Result<Entity, SchemaError> {
    let node = response_base(
        "The message that will be sent by this response (variables are available - prefix a variable with an extra $ to force another evaluation pass on the message)",
    )?;

    Ok(Entity::object("Response_Chat", node)
        .with_name("Chat")
        .with_description("Sends the response to the Twitch chat"))
}

pub fn response_console() -> Result<Entity, SchemaError> {
    let node = response_base("The message that will be printed on the bot console")?;

    Ok(Entity::object("Response_Console", node)
        .with_name("Console")
        .with_description("Prints the response on the bot console"))
}

///
/// Commands
///

fn command_name_rule(node: &ObjectNode) -> Result<(), String> {
    let cmdname = node
        .child("cmdname")
        .ok()
        .and_then(|c| c.as_value().ok())
        .and_then(|v| v.get())
        .and_then(Scalar::as_str);
    match cmdname {
        Some(s) if !s.is_empty() && !s.contains(char::is_whitespace) => {}
        Some(s) => {
            return Err(format!(
                "Command name must be a non-empty single-word string. Got: \"{s}\""
            ));
        }
        None => {
            return Err(
                "Command name must be a non-empty single-word string. Got: nothing".to_string(),
            );
        }
    }

    let aliases = node.child("aliases").and_then(Entity::as_array);
    if let Ok(aliases) = aliases {
        for alias in aliases.iter() {
            let empty = alias
                .as_value()
                .ok()
                .and_then(|v| v.get())
                .and_then(Scalar::as_str)
                .is_some_and(str::is_empty);
            if empty {
                return Err("Command aliases must be non-empty strings.".to_string());
            }
        }
    }

    Ok(())
}

fn media_presence_rule(node: &ObjectNode) -> Result<(), String> {
    command_name_rule(node)?;

    let has = |key: &str| node.child(key).is_ok_and(Entity::is_set);
    if has("image") || has("sound") {
        Ok(())
    } else {
        Err("An Image Command must have an image or a sound set.".to_string())
    }
}

fn command_children() -> Result<ObjectNode, SchemaError> {
    let mut node = ObjectNode::new();
    node.add_child("cmdid", values::string().hidden())?;
    node.add_child(
        "cmdname",
        values::string()
            .with_name("Name")
            .with_description("The term that will invoke the command"),
    )?;
    node.add_child(
        "aliases",
        Entity::array("Array", ArrayNode::new("String"))
            .with_description("Optional additional names for the command"),
    )?;
    node.add_child(
        "cost",
        values::natural_number().with_description("Cost in StreamElements loyalty points"),
    )?;
    node.add_child(
        "message",
        values::string().with_description(
            "A message the bot will send to the chat when the command is invoked",
        ),
    )?;
    node.add_child(
        "cooldowns",
        cooldown()?.with_description("How long it takes before the command can be used again"),
    )?;

    Ok(node)
}

// Seeds scalar fields from the plain map, then pulls out the
// presentation metadata the map may carry alongside them.
fn apply_seed(entity: &mut Entity, seed: Option<&Descriptor>) {
    let Some(seed) = seed else {
        return;
    };

    entity.set_data(seed);
    if let Some(name) = seed.get("name").and_then(Descriptor::as_text) {
        entity.set_name(name);
    }
    if let Some(description) = seed.get("description").and_then(Descriptor::as_text) {
        entity.set_description(description);
    }
}

pub fn command(seed: Option<&Descriptor>) -> Result<Entity, SchemaError> {
    let node = command_children()?
        .with_rule(ObjectRule::ChildrenThenCustom(CustomRule::new(
            "command name",
            command_name_rule,
        )));

    let mut entity = Entity::object("Command", node).with_gui_hint("Command");
    apply_seed(&mut entity, seed);

    Ok(entity)
}

/// A command that shows an image, plays a sound, or both.
pub fn image_or_sound_command(seed: Option<&Descriptor>) -> Result<Entity, SchemaError> {
    let mut node = command_children()?;
    node.add_child(
        "image",
        assets::image()?
            .with_name("Image")
            .with_description("Image display parameters"),
    )?;
    node.add_child(
        "sound",
        assets::sound()?
            .with_name("Sound")
            .with_description("Sound playing parameters"),
    )?;
    let node = node.with_rule(ObjectRule::ChildrenThenCustom(CustomRule::new(
        "image or sound",
        media_presence_rule,
    )));

    let mut entity = Entity::object("ImageOrSoundCommand", node).with_gui_hint("Command");
    entity
        .as_object_mut()?
        .child_mut("cmdname")?
        .set_value("newcommand")?;
    apply_seed(&mut entity, seed);

    Ok(entity)
}

///
/// Functions
///

/// The aggregate a module's user-defined behaviors live in: when any
/// trigger fires and every filter passes, all responses run. The
/// filters array is priority-ordered; the first failing filter decides
/// the rejection message.
pub fn function(seed: Option<&Descriptor>) -> Result<Entity, SchemaError> {
    let mut node = ObjectNode::new();
    node.add_child("funcID", values::string().hidden())?;
    node.add_child(
        "name",
        values::string()
            .with_name("Name")
            .with_description(
                "A name for you to recognize this function easily (it has no meaning other than organization for you)",
            )
            .hidden(),
    )?;
    node.add_child("enabled", enabled_flag("Enables/disables this function"))?;
    node.add_child(
        "cooldowns",
        cooldown()?.with_description(
            "Function-wide cooldowns (work in addition to trigger-specific cooldowns)",
        ),
    )?;
    node.add_child(
        "filters",
        Entity::array("Array", ArrayNode::new("FilterChoice"))
            .with_name("Filters")
            .with_description("Defines who can invoke this function"),
    )?;
    node.add_child(
        "triggers",
        Entity::array("Array", ArrayNode::new("Trigger"))
            .with_name("Triggers")
            .with_description("Defines when this function will be invoked"),
    )?;
    node.add_child(
        "responses",
        Entity::array("Array", ArrayNode::new("Response"))
            .with_name("Responses")
            .with_description("Defines messages that will be sent after the function is done"),
    )?;

    let mut entity = Entity::object("Function", node);
    apply_seed(&mut entity, seed);

    Ok(entity)
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register("Cooldown", |_, _| cooldown().map_err(Into::into))?;
    registry.register("KeyShortcut", |_, _| key_shortcut().map_err(Into::into))?;
    registry.register("Trigger", |_, _| trigger().map_err(Into::into))?;
    registry.register("Trigger_Command", |_, _| {
        trigger_command().map_err(Into::into)
    })?;
    registry.register("Trigger_Message", |_, _| {
        trigger_message().map_err(Into::into)
    })?;
    registry.register("Trigger_Shortcut", |_, _| {
        trigger_shortcut().map_err(Into::into)
    })?;
    registry.register("Trigger_ChannelReward", |_, _| {
        trigger_channel_reward().map_err(Into::into)
    })?;
    registry.register("Response", |_, _| response().map_err(Into::into))?;
    registry.register("Response_Chat", |_, _| response_chat().map_err(Into::into))?;
    registry.register("Response_Console", |_, _| {
        response_console().map_err(Into::into)
    })?;
    registry.register("Command", |_, args| command(args.get(0)).map_err(Into::into))?;
    registry.register("ImageOrSoundCommand", |_, args| {
        image_or_sound_command(args.get(0)).map_err(Into::into)
    })?;
    registry.register("Function", |_, args| {
        function(args.get(0)).map_err(Into::into)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_requires_a_single_word_name() {
        let mut cmd = command(None).unwrap();
        assert!(
            cmd.validate()
                .unwrap_err()
                .to_string()
                .starts_with("Command name must be")
        );

        cmd.as_object_mut()
            .unwrap()
            .child_mut("cmdname")
            .unwrap()
            .set_value("two words")
            .unwrap();
        assert!(
            cmd.validate()
                .unwrap_err()
                .to_string()
                .contains("\"two words\"")
        );

        cmd.as_object_mut()
            .unwrap()
            .child_mut("cmdname")
            .unwrap()
            .set_value("greet")
            .unwrap();
        assert!(cmd.validate().is_ok());
    }

    #[test]
    fn command_seed_fills_scalar_fields_and_metadata() {
        let seed: Descriptor = serde_json::from_value(serde_json::json!({
            "cmdname": "hi",
            "cost": 50.0,
            "description": "Greets the chat",
        }))
        .unwrap();

        let cmd = command(Some(&seed)).unwrap();
        let object = cmd.as_object().unwrap();
        assert_eq!(
            object
                .child("cmdname")
                .unwrap()
                .as_value()
                .unwrap()
                .get(),
            Some(&Scalar::Text("hi".to_string()))
        );
        assert_eq!(
            object.child("cost").unwrap().as_value().unwrap().get(),
            Some(&Scalar::Number(50.0))
        );
        assert_eq!(cmd.description(), Some("Greets the chat"));
    }

    #[test]
    fn image_or_sound_command_needs_at_least_one_medium() {
        let mut cmd = image_or_sound_command(None).unwrap();
        assert_eq!(
            cmd.validate().unwrap_err().to_string(),
            "An Image Command must have an image or a sound set."
        );

        cmd.as_object_mut()
            .unwrap()
            .child_mut("sound")
            .unwrap()
            .as_object_mut()
            .unwrap()
            .child_mut("filename")
            .unwrap()
            .set_value("dundundun.mp3")
            .unwrap();
        assert!(cmd.validate().is_ok());
    }
}
