//! Flattening of a component tree into text runs.

use crate::format::{FormatState, TextRun};

use super::classify::Component;

/// Flatten `root` into runs, depth-first, parent before children.
///
/// Each node's text is parsed from a copy of its parent's state, and the
/// state it ends in is what its children start from. Siblings never see each
/// other's codes.
pub fn normalize(root: &Component) -> Vec<TextRun> {
    let mut runs = Vec::new();
    walk(root, &FormatState::default(), &mut runs);
    runs
}

fn walk(component: &Component, inherited: &FormatState, runs: &mut Vec<TextRun>) {
    let mut state = inherited.clone();
    state.consume(&component.text, runs);
    for child in &component.children {
        walk(child, &state, runs);
    }
}
