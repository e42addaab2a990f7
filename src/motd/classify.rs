//! Classification of raw MOTD shapes into a component tree.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::trace;

use motd_embed_types::{MotdInput, MotdNode};

/// A MOTD reduced to its one traversable shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Component {
    pub text: String,
    pub children: Vec<Component>,
}

impl Component {
    pub fn leaf(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            children: Vec::new(),
        }
    }
}

/// The input matched none of the accepted MOTD shapes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed MOTD component: {reason}")]
pub struct MalformedComponentError {
    reason: String,
}

impl MalformedComponentError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Reduce any [`MotdInput`] to a [`Component`] tree.
///
/// Plain text becomes a leaf and markup nodes keep their shape. A JSON
/// component is accepted as a string, as an object with `text` and/or an
/// `extra` array, or as a non-empty array whose first element is the parent
/// of the rest. Scalars inside those shapes are stringified.
///
/// Only the root has to match. A nested JSON child that matches no shape
/// (a `translate` component, `null`, ...) becomes an empty leaf and its
/// siblings are kept.
pub fn classify(input: &MotdInput) -> Result<Component, MalformedComponentError> {
    match input {
        MotdInput::PlainText(text) => Ok(Component::leaf(text.as_str())),
        MotdInput::Node(node) => classify_node(node),
        MotdInput::Attributes(value) => classify_json(value),
    }
}

fn classify_node(node: &MotdNode) -> Result<Component, MalformedComponentError> {
    Ok(Component {
        text: node.text.clone(),
        children: node
            .children
            .iter()
            .map(classify)
            .collect::<Result<_, _>>()?,
    })
}

fn classify_json(value: &Value) -> Result<Component, MalformedComponentError> {
    match value {
        Value::String(text) => Ok(Component::leaf(text.as_str())),
        Value::Object(map) => classify_object(map),
        Value::Array(items) => {
            let (first, rest) = items
                .split_first()
                .ok_or_else(|| MalformedComponentError::new("empty component array"))?;
            let mut root = classify_json(first)?;
            for item in rest {
                root.children.push(classify_child(item));
            }
            Ok(root)
        }
        Value::Null => Err(MalformedComponentError::new("null component")),
        Value::Bool(_) | Value::Number(_) => Err(MalformedComponentError::new(format!(
            "bare scalar {value} is not a component"
        ))),
    }
}

fn classify_object(map: &Map<String, Value>) -> Result<Component, MalformedComponentError> {
    let text = match map.get("text") {
        None => None,
        Some(value) => Some(scalar_text(value).ok_or_else(|| {
            MalformedComponentError::new(format!("`text` must be a scalar, got {value}"))
        })?),
    };
    let children = match map.get("extra") {
        None => None,
        Some(Value::Array(items)) => Some(items.iter().map(classify_child).collect::<Vec<_>>()),
        Some(other) => {
            return Err(MalformedComponentError::new(format!(
                "`extra` must be an array, got {other}"
            )))
        }
    };

    if text.is_none() && children.is_none() {
        return Err(MalformedComponentError::new(
            "object has neither `text` nor `extra`",
        ));
    }
    Ok(Component {
        text: text.unwrap_or_default(),
        children: children.unwrap_or_default(),
    })
}

/// Children may also be bare scalars, which stand for their text. A child
/// of no known shape renders as nothing.
fn classify_child(value: &Value) -> Component {
    match value {
        Value::Bool(_) | Value::Number(_) => Component::leaf(scalar_text(value).unwrap_or_default()),
        _ => classify_json(value).unwrap_or_else(|err| {
            trace!(error = %err, "dropping unrecognized child component");
            Component::default()
        }),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
