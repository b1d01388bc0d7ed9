//! Scalar leaf types.
//!
//! Each constructor returns a fresh unset leaf; registration wires the
//! same constructors into a [`Registry`] so composites and stored
//! descriptors can build them by name. The numeric family declares
//! mutual assignability, which is what lets a stored `Number` stand in
//! for a slot that has since tightened to, say, `PositiveNumber`.

use conftree::{
    ConfTransform, Constraint, Entity, Kind, Registry, RegistryError, ValueNode,
};

/// Every key a shortcut leaf may hold, by short identifier (the
/// `VC_`-prefixed virtual keycode with the prefix dropped).
pub const KEYCODES: &[&str] = &[
    "ESCAPE",
    "F1",
    "F2",
    "F3",
    "F4",
    "F5",
    "F6",
    "F7",
    "F8",
    "F9",
    "F10",
    "F11",
    "F12",
    "F13",
    "F14",
    "F15",
    "F16",
    "F17",
    "F18",
    "F19",
    "F20",
    "F21",
    "F22",
    "F23",
    "F24",
    "BACKQUOTE",
    "1",
    "2",
    "3",
    "4",
    "5",
    "6",
    "7",
    "8",
    "9",
    "0",
    "MINUS",
    "EQUALS",
    "BACKSPACE",
    "TAB",
    "CAPS_LOCK",
    "A",
    "B",
    "C",
    "D",
    "E",
    "F",
    "G",
    "H",
    "I",
    "J",
    "K",
    "L",
    "M",
    "N",
    "O",
    "P",
    "Q",
    "R",
    "S",
    "T",
    "U",
    "V",
    "W",
    "X",
    "Y",
    "Z",
    "OPEN_BRACKET",
    "CLOSE_BRACKET",
    "BACK_SLASH",
    "SEMICOLON",
    "QUOTE",
    "ENTER",
    "COMMA",
    "PERIOD",
    "SLASH",
    "SPACE",
    "PRINTSCREEN",
    "SCROLL_LOCK",
    "PAUSE",
    "INSERT",
    "DELETE",
    "HOME",
    "END",
    "PAGE_UP",
    "PAGE_DOWN",
    "UP",
    "LEFT",
    "CLEAR",
    "RIGHT",
    "DOWN",
    "NUM_LOCK",
    "KP_DIVIDE",
    "KP_MULTIPLY",
    "KP_SUBTRACT",
    "KP_EQUALS",
    "KP_ADD",
    "KP_ENTER",
    "KP_SEPARATOR",
    "KP_1",
    "KP_2",
    "KP_3",
    "KP_4",
    "KP_5",
    "KP_6",
    "KP_7",
    "KP_8",
    "KP_9",
    "KP_0",
    "KP_END",
    "KP_DOWN",
    "KP_PAGE_DOWN",
    "KP_LEFT",
    "KP_CLEAR",
    "KP_RIGHT",
    "KP_HOME",
    "KP_UP",
    "KP_PAGE_UP",
    "KP_INSERT",
    "KP_DELETE",
    "SHIFT_L",
    "SHIFT_R",
    "CONTROL_L",
    "CONTROL_R",
    "ALT_L",
    "ALT_R",
    "META_L",
    "META_R",
    "CONTEXT_MENU",
    "POWER",
    "SLEEP",
    "WAKE",
    "MEDIA_PLAY",
    "MEDIA_STOP",
    "MEDIA_PREVIOUS",
    "MEDIA_NEXT",
    "MEDIA_SELECT",
    "MEDIA_EJECT",
    "VOLUME_MUTE",
    "VOLUME_UP",
    "VOLUME_DOWN",
    "APP_MAIL",
    "APP_CALCULATOR",
    "APP_MUSIC",
    "APP_PICTURES",
    "BROWSER_SEARCH",
    "BROWSER_HOME",
    "BROWSER_BACK",
    "BROWSER_FORWARD",
    "BROWSER_STOP",
    "BROWSER_REFRESH",
    "BROWSER_FAVORITES",
    "KATAKANA",
    "UNDERSCORE",
    "FURIGANA",
    "KANJI",
    "HIRAGANA",
    "YEN",
    "KP_COMMA",
    "SUN_HELP",
    "SUN_STOP",
    "SUN_PROPS",
    "SUN_FRONT",
    "SUN_OPEN",
    "SUN_FIND",
    "SUN_AGAIN",
    "SUN_UNDO",
    "SUN_COPY",
    "SUN_INSERT",
    "SUN_CUT",
    "UNDEFINED",
];

// Numeric assignability is directional: a slot only absorbs values
// stored under a broader tag, where its own constraint clamps whatever
// the broader type allowed. A broad slot never takes a narrower tag.
fn numeric(constraint: Constraint, assignable_from: &[&str]) -> ValueNode {
    ValueNode::new(Kind::Number)
        .with_constraint(constraint)
        .with_assignable_from(assignable_from)
}

#[must_use]
pub fn string() -> Entity {
    Entity::value("String", ValueNode::new(Kind::String))
}

#[must_use]
pub fn boolean() -> Entity {
    Entity::value("Boolean", ValueNode::new(Kind::Boolean))
}

#[must_use]
pub fn number() -> Entity {
    Entity::value("Number", numeric(Constraint::Free, &[]))
}

#[must_use]
pub fn integer() -> Entity {
    Entity::value("Integer", numeric(Constraint::Integer, &["Number"]))
}

#[must_use]
pub fn natural_number() -> Entity {
    Entity::value(
        "NaturalNumber",
        numeric(Constraint::Natural, &["Number", "Integer"]),
    )
}

#[must_use]
pub fn non_negative_number() -> Entity {
    Entity::value(
        "NonNegativeNumber",
        numeric(Constraint::NonNegative, &["Number"]),
    )
}

#[must_use]
pub fn positive_number() -> Entity {
    Entity::value(
        "PositiveNumber",
        numeric(Constraint::Positive, &["Number", "Integer"]),
    )
}

#[must_use]
pub fn percentage_number() -> Entity {
    Entity::value(
        "PercentageNumber",
        numeric(Constraint::Percentage, &["Number"]),
    )
}

#[must_use]
pub fn degrees() -> Entity {
    Entity::value(
        "Degrees",
        numeric(Constraint::Degrees, &["Number", "Integer", "NaturalNumber"]),
    )
    .with_gui_hint("Degrees")
}

/// Held in seconds; the conf form is milliseconds, which is what the
/// playback side consumes.
#[must_use]
pub fn duration() -> Entity {
    Entity::value(
        "Duration",
        numeric(Constraint::NonNegative, &["Number"]).with_conf(ConfTransform::SecondsToMillis),
    )
}

/// `#RRGGBB` with an optional alpha pair.
#[must_use]
pub fn color() -> Entity {
    Entity::value(
        "Color",
        ValueNode::new(Kind::String).with_constraint(Constraint::HexColor),
    )
    .with_gui_hint("Color")
}

#[must_use]
pub fn key_code() -> Entity {
    Entity::value(
        "KeyCode",
        ValueNode::new(Kind::String).with_constraint(Constraint::OneOf {
            label: "keycode",
            allowed: KEYCODES,
        }),
    )
}

/// The Twitch-side reward identifier, exported raw for the module that
/// matches redemptions against it.
#[must_use]
pub fn channel_reward() -> Entity {
    Entity::value("ChannelReward", ValueNode::new(Kind::String))
        .with_name("Reward ID")
        .with_description("A unique string that identifies the reward on Twitch")
        .with_gui_hint("ChannelReward")
}

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register("String", |_, _| Ok(string()))?;
    registry.register("Boolean", |_, _| Ok(boolean()))?;
    registry.register("Number", |_, _| Ok(number()))?;
    registry.register("Integer", |_, _| Ok(integer()))?;
    registry.register("NaturalNumber", |_, _| Ok(natural_number()))?;
    registry.register("NonNegativeNumber", |_, _| Ok(non_negative_number()))?;
    registry.register("PositiveNumber", |_, _| Ok(positive_number()))?;
    registry.register("PercentageNumber", |_, _| Ok(percentage_number()))?;
    registry.register("Degrees", |_, _| Ok(degrees()))?;
    registry.register("Duration", |_, _| Ok(duration()))?;
    registry.register("Color", |_, _| Ok(color()))?;
    registry.register("KeyCode", |_, _| Ok(key_code()))?;
    registry.register("ChannelReward", |_, _| Ok(channel_reward()))?;

    Ok(())
}
