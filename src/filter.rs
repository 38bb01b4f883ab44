// SPDX-License-Identifier: PMPL-1.0-or-later
//! Declaration filter.
//!
//! Reduces a document to the colour-bearing part that the contrast engine
//! cares about. Nothing here mutates its input.

use crate::ast::{Declaration, Document, Node, Rule};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Properties kept by [`prune_color_declarations`]
pub const COLOR_PROPERTIES: &[&str] = &["color", "background", "background-color"];

/// Properties that fill the background slot; the last one declared wins
const BACKGROUND_PROPERTIES: &[&str] = &["background", "background-color"];

fn is_color_property(decl: &Declaration) -> bool {
    COLOR_PROPERTIES.iter().any(|p| decl.is(p))
}

/// Whether any declaration in the document sets `color` or `background`.
///
/// `background-color` alone does not count: a document whose only colour
/// declarations are `background-color` reports no colour.
pub fn has_color(doc: &Document) -> bool {
    doc.declarations().any(|d| d.is("color") || d.is("background"))
}

/// Build a new document holding only the rules that declare a colour, each
/// reduced to its colour declarations in source order.
///
/// Root-level declarations and at-rules are dropped.
pub fn prune_color_declarations(doc: &Document) -> Document {
    let mut pruned = Document::new();

    for rule in doc.rules() {
        let declarations: Vec<Declaration> = rule
            .declarations
            .iter()
            .filter(|d| is_color_property(d))
            .cloned()
            .collect();

        if !declarations.is_empty() {
            pruned.push(Node::Rule(Rule {
                selector: rule.selector.clone(),
                declarations,
                position: rule.position,
            }));
        }
    }

    pruned
}

/// The declarations that decide a rule's effective colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorSlots<'a> {
    pub foreground: Option<&'a Declaration>,
    pub background: Option<&'a Declaration>,
}

impl Rule {
    /// Effective foreground and background declarations.
    ///
    /// The last declaration in source order wins, regardless of whether its
    /// value can be resolved. `background` and `background-color` share one slot.
    pub fn color_slots(&self) -> ColorSlots<'_> {
        let mut slots = ColorSlots::default();
        for decl in &self.declarations {
            if decl.is("color") {
                slots.foreground = Some(decl);
            } else if BACKGROUND_PROPERTIES.iter().any(|p| decl.is(p)) {
                slots.background = Some(decl);
            }
        }
        slots
    }
}

/// Raw effective colour values of a selector
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColorPair {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

/// Map each colour-bearing selector to its effective raw colour values.
///
/// Returns `None` when no rule declares a colour. A selector that appears in
/// several rules takes its slots from the later rule whenever that rule sets them.
pub fn color_map(doc: &Document) -> Option<BTreeMap<String, ColorPair>> {
    let mut map: BTreeMap<String, ColorPair> = BTreeMap::new();

    for rule in doc.rules() {
        let slots = rule.color_slots();
        if slots.foreground.is_none() && slots.background.is_none() {
            continue;
        }

        let entry = map.entry(rule.selector.clone()).or_default();
        if let Some(fg) = slots.foreground {
            entry.foreground = Some(fg.value.clone());
        }
        if let Some(bg) = slots.background {
            entry.background = Some(bg.value.clone());
        }
    }

    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}
