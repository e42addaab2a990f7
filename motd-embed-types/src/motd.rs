//! The shapes a server's MOTD can arrive in.

use std::fmt;

use serde_json::Value;

/// A MOTD as it was reported, before normalization.
///
/// Servers describe themselves either with a legacy string carrying `§`
/// formatting codes or with a JSON chat component. `Attributes` keeps the
/// component exactly as received; it is classified into a tree only when
/// it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum MotdInput {
    /// Legacy text, possibly with embedded formatting codes.
    PlainText(String),

    /// A markup tree whose children inherit formatting from their parent.
    Node(MotdNode),

    /// A raw JSON chat component (`{"text": ..., "extra": [...]}` and friends).
    Attributes(Value),
}

/// A node of the markup tree form of a MOTD.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotdNode {
    pub text: String,
    pub children: Vec<MotdInput>,
}

impl MotdInput {
    pub fn text(text: impl Into<String>) -> Self {
        MotdInput::PlainText(text.into())
    }

    pub fn node(text: impl Into<String>, children: Vec<MotdInput>) -> Self {
        MotdInput::Node(MotdNode {
            text: text.into(),
            children,
        })
    }

    /// Wrap a JSON description, unwrapping bare strings into plain text.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::String(text) => MotdInput::PlainText(text),
            other => MotdInput::Attributes(other),
        }
    }
}

impl From<&str> for MotdInput {
    fn from(text: &str) -> Self {
        MotdInput::text(text)
    }
}

impl From<String> for MotdInput {
    fn from(text: String) -> Self {
        MotdInput::PlainText(text)
    }
}

/// The raw stringified form, used when a MOTD cannot be rendered as markup.
impl fmt::Display for MotdInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotdInput::PlainText(text) => f.write_str(text),
            MotdInput::Node(node) => {
                f.write_str(&node.text)?;
                node.children
                    .iter()
                    .try_for_each(|child| write!(f, "{child}"))
            }
            MotdInput::Attributes(value) => write!(f, "{value}"),
        }
    }
}
