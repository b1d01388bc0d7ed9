//! Validation protocol: fail-fast errors annotated with the path of the
//! descendant that produced them.
//!
//! Paths are never stored in the tree. A failing node reports a rootless
//! error and every composite on the way out prepends the key or index it
//! used to reach the child, so the rendered path always reflects the real
//! route taken through the live tree.

use std::fmt;
use thiserror::Error as ThisError;

///
/// PathSeg
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathSeg {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSeg {
    fn from(s: &str) -> Self {
        Self::Key(s.to_string())
    }
}

impl From<String> for PathSeg {
    fn from(s: String) -> Self {
        Self::Key(s)
    }
}

impl From<usize> for PathSeg {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

///
/// NodePath
///
/// Renders with the `a.b[2].c` grammar: keys are dot-joined, indexes
/// attach to the preceding segment.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NodePath(Vec<PathSeg>);

impl NodePath {
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn prepend(&mut self, seg: PathSeg) {
        self.0.insert(0, seg);
    }

    #[must_use]
    pub fn segments(&self) -> &[PathSeg] {
        &self.0
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            match seg {
                PathSeg::Key(s) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(s)?;
                }
                PathSeg::Index(i) => write!(f, "[{i}]")?,
            }
            first = false;
        }

        Ok(())
    }
}

// A root-level error carries no location worth printing.
pub(crate) fn prefixed(path: &NodePath, message: &str) -> String {
    if path.is_root() {
        message.to_string()
    } else {
        format!("{path}: {message}")
    }
}

///
/// ValidateError
///
/// The first invariant violation found during a `validate` pass. One
/// error per invocation; callers wanting exhaustive diagnostics iterate
/// children and validate each themselves.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[remain::sorted]
pub enum ValidateError {
    #[error("{}", prefixed(.path, .message))]
    Invalid { path: NodePath, message: String },

    #[error("{}", prefixed(.path, "no option selected"))]
    NoSelection { path: NodePath },
}

impl ValidateError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            path: NodePath::root(),
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn no_selection() -> Self {
        Self::NoSelection {
            path: NodePath::root(),
        }
    }

    /// Prepend the segment a composite used to reach the failing child.
    #[must_use]
    pub fn at(mut self, seg: impl Into<PathSeg>) -> Self {
        match &mut self {
            Self::Invalid { path, .. } | Self::NoSelection { path } => {
                path.prepend(seg.into());
            }
        }

        self
    }
}
