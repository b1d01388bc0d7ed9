//! Value leaves: a single scalar with a declared primitive kind, an
//! optional default and a constraint predicate.
//!
//! Validation never clamps — a present value either satisfies the
//! constraint or fails with the constraint's message. Clamping to a
//! legal fallback happens only during lenient import, which is the
//! mechanism that keeps old stored configuration loading after a
//! constraint tightens.

use crate::{
    SchemaError,
    descriptor::{Descriptor, DescriptorError, ImportMode},
    validate::ValidateError,
};
use derive_more::Display;

///
/// Kind
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Kind {
    #[display("string")]
    String,
    #[display("number")]
    Number,
    #[display("boolean")]
    Boolean,
}

impl Kind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

///
/// Scalar
///

#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Scalar {
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Text(_) => Kind::String,
            Self::Number(_) => Kind::Number,
            Self::Bool(_) => Kind::Boolean,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn to_descriptor(&self) -> Descriptor {
        match self {
            Self::Text(s) => Descriptor::Text(s.clone()),
            Self::Number(n) => Descriptor::Number(*n),
            Self::Bool(b) => Descriptor::Bool(*b),
        }
    }

    /// Read a scalar out of a descriptor leaf; composites yield `None`.
    #[must_use]
    pub fn from_descriptor(desc: &Descriptor) -> Option<Self> {
        match desc {
            Descriptor::Text(s) => Some(Self::Text(s.clone())),
            Descriptor::Number(n) => Some(Self::Number(*n)),
            Descriptor::Bool(b) => Some(Self::Bool(*b)),
            Descriptor::Null | Descriptor::Seq(_) | Descriptor::Map(_) => None,
        }
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for Scalar {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

///
/// Constraint
///
/// The per-leaf predicate, expressed as data instead of a subclass.
/// `check` is the validation side; `fallback` is the lenient-import
/// substitution documented for each rule.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Constraint {
    /// Any value of the declared kind.
    Free,
    /// Whole numbers only. Lenient fallback: round.
    Integer,
    /// Whole numbers >= 0. Lenient fallback: round and clamp to 0.
    Natural,
    /// >= 0. Lenient fallback: 0.
    NonNegative,
    /// > 0. Lenient fallback: 1.
    Positive,
    /// 0..=100. Lenient fallback: 0.
    Percentage,
    /// Whole numbers in 0..=365. Lenient fallback: round in range,
    /// else 0.
    Degrees,
    /// `#RRGGBB` or `#RRGGBBAA`. Lenient fallback: unset.
    HexColor,
    /// Membership in a fixed set. Lenient fallback: unset.
    OneOf {
        label: &'static str,
        allowed: &'static [&'static str],
    },
}

fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };

    (digits.len() == 6 || digits.len() == 8) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

impl Constraint {
    /// The validation predicate. Messages are surfaced verbatim next to
    /// the offending field by the hosting layer.
    pub fn check(&self, scalar: &Scalar) -> Result<(), String> {
        match self {
            Self::Free => Ok(()),
            Self::Integer => match scalar.as_f64() {
                Some(n) if n.fract() == 0.0 => Ok(()),
                _ => Err("this value must be an integer (whole number).".to_string()),
            },
            Self::Natural => match scalar.as_f64() {
                Some(n) if n.fract() == 0.0 && n >= 0.0 => Ok(()),
                Some(n) if n.fract() != 0.0 => {
                    Err("this value must be an integer (whole number).".to_string())
                }
                _ => Err("this value cannot be negative.".to_string()),
            },
            Self::NonNegative => match scalar.as_f64() {
                Some(n) if n >= 0.0 => Ok(()),
                _ => Err("this value cannot be negative.".to_string()),
            },
            Self::Positive => match scalar.as_f64() {
                Some(n) if n > 0.0 => Ok(()),
                _ => Err("this value must be positive.".to_string()),
            },
            Self::Percentage => match scalar.as_f64() {
                Some(n) if (0.0..=100.0).contains(&n) => Ok(()),
                _ => Err("this value must be between 0 and 100.".to_string()),
            },
            Self::Degrees => match scalar.as_f64() {
                Some(n) if n.fract() == 0.0 && (0.0..=365.0).contains(&n) => Ok(()),
                Some(n) if n.fract() != 0.0 => {
                    Err("this value must be an integer (whole number).".to_string())
                }
                _ => Err("this value must be between 0 and 365.".to_string()),
            },
            Self::HexColor => match scalar.as_str() {
                Some(s) if is_hex_color(s) => Ok(()),
                _ => Err(format!("bad color string: {scalar:?}")),
            },
            Self::OneOf { label, allowed } => match scalar.as_str() {
                Some(s) if allowed.contains(&s) => Ok(()),
                Some(s) => Err(format!("unknown {label}: {s}")),
                None => Err(format!("unknown {label}: {scalar:?}")),
            },
        }
    }

    /// The lenient-import substitution for a scalar that failed `check`
    /// (or arrived with the wrong kind). `None` means "leave unset".
    #[must_use]
    pub fn fallback(&self, scalar: &Scalar) -> Option<Scalar> {
        match self {
            Self::Free | Self::HexColor | Self::OneOf { .. } => None,
            Self::Integer => scalar.as_f64().map(|n| Scalar::Number(n.round())),
            Self::Natural => Some(Scalar::Number(
                scalar.as_f64().map_or(0.0, |n| n.round().max(0.0)),
            )),
            Self::NonNegative | Self::Percentage => Some(Scalar::Number(0.0)),
            // In-range fractions round like any integer leaf; anything
            // outside the circle resets.
            Self::Degrees => Some(Scalar::Number(scalar.as_f64().map_or(0.0, |n| {
                if (0.0..=365.0).contains(&n) {
                    n.round()
                } else {
                    0.0
                }
            }))),
            Self::Positive => Some(Scalar::Number(1.0)),
        }
    }
}

///
/// ConfTransform
///
/// How a leaf renders into the module-ready conf form. Most leaves pass
/// their scalar through; duration leaves hold logical seconds and export
/// milliseconds.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ConfTransform {
    #[default]
    Identity,
    SecondsToMillis,
}

impl ConfTransform {
    #[must_use]
    pub fn apply(self, scalar: &Scalar) -> Descriptor {
        match self {
            Self::Identity => scalar.to_descriptor(),
            Self::SecondsToMillis => scalar
                .as_f64()
                .map_or_else(|| scalar.to_descriptor(), |n| ((n * 1000.0).round()).into()),
        }
    }
}

///
/// ValueNode
///

#[derive(Clone, Debug, PartialEq)]
pub struct ValueNode {
    kind: Kind,
    value: Option<Scalar>,
    default: Option<Scalar>,
    constraint: Constraint,
    conf: ConfTransform,
    assignable_from: Vec<String>,
}

impl ValueNode {
    #[must_use]
    pub const fn new(kind: Kind) -> Self {
        Self {
            kind,
            value: None,
            default: None,
            constraint: Constraint::Free,
            conf: ConfTransform::Identity,
            assignable_from: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = constraint;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<Scalar>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn with_conf(mut self, conf: ConfTransform) -> Self {
        self.conf = conf;
        self
    }

    /// Sibling type names whose stored values may stand in for this
    /// slot during lenient import.
    #[must_use]
    pub fn with_assignable_from(mut self, types: &[&str]) -> Self {
        self.assignable_from = types.iter().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub const fn kind(&self) -> Kind {
        self.kind
    }

    #[must_use]
    pub const fn get(&self) -> Option<&Scalar> {
        self.value.as_ref()
    }

    #[must_use]
    pub const fn default(&self) -> Option<&Scalar> {
        self.default.as_ref()
    }

    #[must_use]
    pub const fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.value.is_some()
    }

    /// Replace the value; the scalar must match the declared kind.
    pub fn set(&mut self, scalar: impl Into<Scalar>) -> Result<(), SchemaError> {
        let scalar = scalar.into();
        if scalar.kind() != self.kind {
            return Err(SchemaError::KindMismatch {
                expected: self.kind.name(),
                got: scalar.kind().name(),
            });
        }

        self.value = Some(scalar);
        Ok(())
    }

    /// Return to the distinct "unset" state.
    pub fn clear(&mut self) {
        self.value = None;
    }

    pub(crate) fn assignable_from(&self, type_name: &str) -> bool {
        self.assignable_from.iter().any(|t| t == type_name)
    }

    pub(crate) fn validate(&self) -> Result<(), ValidateError> {
        match &self.value {
            None => Ok(()),
            Some(v) => self.constraint.check(v).map_err(ValidateError::invalid),
        }
    }

    pub(crate) fn to_conf(&self) -> Descriptor {
        self.value
            .as_ref()
            .or(self.default.as_ref())
            .map_or(Descriptor::Null, |v| self.conf.apply(v))
    }

    pub(crate) fn export_desc(&self) -> Descriptor {
        self.value
            .as_ref()
            .map_or(Descriptor::Null, Scalar::to_descriptor)
    }

    pub(crate) fn import_desc(
        &mut self,
        desc: &Descriptor,
        mode: ImportMode,
    ) -> Result<(), DescriptorError> {
        if desc.is_null() {
            self.value = None;
            return Ok(());
        }

        let Some(scalar) = Scalar::from_descriptor(desc) else {
            // Composite where a scalar belongs is a shape problem in
            // both modes.
            return Err(DescriptorError::shape_mismatch("scalar", desc));
        };

        if scalar.kind() != self.kind {
            if mode.is_lenient() {
                self.value = self.substitute(&scalar);
                return Ok(());
            }

            return Err(DescriptorError::kind_mismatch(
                self.kind.name(),
                scalar.kind().name(),
            ));
        }

        if let Err(message) = self.constraint.check(&scalar) {
            if mode.is_lenient() {
                self.value = self.substitute(&scalar);
                return Ok(());
            }

            return Err(DescriptorError::out_of_range(message));
        }

        self.value = Some(scalar);
        Ok(())
    }

    // Lenient substitution: the constraint's documented fallback, then
    // the declared default, then unset.
    fn substitute(&self, rejected: &Scalar) -> Option<Scalar> {
        let replacement = self
            .constraint
            .fallback(rejected)
            .or_else(|| self.default.clone());

        tracing::debug!(
            kind = self.kind.name(),
            rejected = ?rejected,
            replacement = ?replacement,
            "lenient import substituted an illegal value"
        );

        replacement
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_rejects_wrong_kind() {
        let mut node = ValueNode::new(Kind::Number);
        assert!(node.set(5.0).is_ok());
        assert!(matches!(
            node.set("five"),
            Err(SchemaError::KindMismatch { .. })
        ));
        assert_eq!(node.get(), Some(&Scalar::Number(5.0)));
    }

    #[test]
    fn unset_is_distinct_from_default() {
        let node = ValueNode::new(Kind::Number).with_default(7.0);
        assert!(!node.is_set());
        assert_eq!(node.to_conf(), Descriptor::Number(7.0));
        assert_eq!(node.export_desc(), Descriptor::Null);
    }

    #[test]
    fn validate_passes_unset_values() {
        let node = ValueNode::new(Kind::Number).with_constraint(Constraint::Positive);
        assert!(node.validate().is_ok());
    }

    #[test]
    fn percentage_check_and_fallback() {
        let c = Constraint::Percentage;
        assert!(c.check(&Scalar::Number(100.0)).is_ok());
        assert!(c.check(&Scalar::Number(150.0)).is_err());
        assert_eq!(c.fallback(&Scalar::Number(150.0)), Some(Scalar::Number(0.0)));
    }

    #[test]
    fn integer_fallback_rounds() {
        let c = Constraint::Integer;
        assert!(c.check(&Scalar::Number(2.5)).is_err());
        assert_eq!(c.fallback(&Scalar::Number(2.5)), Some(Scalar::Number(3.0)));
    }

    #[test]
    fn natural_rounds_then_clamps() {
        let c = Constraint::Natural;
        assert!(c.check(&Scalar::Number(3.0)).is_ok());
        assert!(c.check(&Scalar::Number(2.5)).is_err());
        assert!(c.check(&Scalar::Number(-1.0)).is_err());
        assert_eq!(c.fallback(&Scalar::Number(-2.4)), Some(Scalar::Number(0.0)));
        assert_eq!(c.fallback(&Scalar::Number(2.6)), Some(Scalar::Number(3.0)));
    }

    #[test]
    fn degrees_are_whole_numbers_within_the_circle() {
        let c = Constraint::Degrees;
        assert!(c.check(&Scalar::Number(180.0)).is_ok());
        assert_eq!(
            c.check(&Scalar::Number(12.5)),
            Err("this value must be an integer (whole number).".to_string())
        );
        assert!(c.check(&Scalar::Number(400.0)).is_err());
        assert_eq!(c.fallback(&Scalar::Number(12.5)), Some(Scalar::Number(13.0)));
        assert_eq!(c.fallback(&Scalar::Number(400.0)), Some(Scalar::Number(0.0)));
    }

    #[test]
    fn hex_color_accepts_rgb_and_rgba() {
        let c = Constraint::HexColor;
        assert!(c.check(&Scalar::from("#0f0f0f")).is_ok());
        assert!(c.check(&Scalar::from("#0F0F0F2A")).is_ok());
        assert!(c.check(&Scalar::from("#0f0f")).is_err());
        assert!(c.check(&Scalar::from("0f0f0f")).is_err());
        assert_eq!(c.fallback(&Scalar::from("oops")), None);
    }

    #[test]
    fn one_of_names_its_label() {
        let c = Constraint::OneOf {
            label: "keycode",
            allowed: &["A", "B"],
        };
        assert_eq!(
            c.check(&Scalar::from("FOO")),
            Err("unknown keycode: FOO".to_string())
        );
    }

    #[test]
    fn duration_conf_is_millis() {
        let mut node = ValueNode::new(Kind::Number)
            .with_constraint(Constraint::NonNegative)
            .with_conf(ConfTransform::SecondsToMillis);
        node.set(1.5).unwrap();
        assert_eq!(node.to_conf(), Descriptor::Number(1500.0));
    }

    #[test]
    fn strict_import_rejects_out_of_range() {
        let mut node = ValueNode::new(Kind::Number).with_constraint(Constraint::Percentage);
        let err = node
            .import_desc(&Descriptor::Number(150.0), ImportMode::Strict)
            .unwrap_err();
        assert!(err.to_string().contains("between 0 and 100"));
        assert!(!node.is_set());
    }

    #[test]
    fn lenient_import_clamps_to_fallback() {
        let mut node = ValueNode::new(Kind::Number).with_constraint(Constraint::Percentage);
        node.import_desc(&Descriptor::Number(150.0), ImportMode::Lenient)
            .unwrap();
        assert!(node.is_set());
        assert_eq!(node.get(), Some(&Scalar::Number(0.0)));
    }

    #[test]
    fn lenient_import_of_composite_is_still_a_shape_error() {
        let mut node = ValueNode::new(Kind::Number);
        assert!(
            node.import_desc(&Descriptor::Seq(vec![]), ImportMode::Lenient)
                .is_err()
        );
    }
}
