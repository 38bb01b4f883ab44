// SPDX-License-Identifier: PMPL-1.0-or-later
//! Document model for parsed stylesheets.
//!
//! A [`Document`] owns an ordered list of [`Node`]s. Nodes are plain values:
//! transformations such as pruning build a new document from clones and never
//! touch the original.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Location of a node in the source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Byte offset into the source
    pub offset: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number in characters (1-indexed)
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A single `property: value` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub property: String,
    /// Raw value, trimmed, without any `!important` suffix
    pub value: String,
    pub important: bool,
    pub position: Position,
}

impl Declaration {
    /// Whether the property name matches `name`, ignoring ASCII case
    pub fn is(&self, name: &str) -> bool {
        self.property.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)?;
        if self.important {
            write!(f, " !important")?;
        }
        Ok(())
    }
}

/// A selector with its declaration block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Selector text, not interpreted
    pub selector: String,
    pub declarations: Vec<Declaration>,
    pub position: Position,
}

impl Rule {
    pub fn new(selector: impl Into<String>, position: Position) -> Self {
        Self {
            selector: selector.into(),
            declarations: Vec::new(),
            position,
        }
    }
}

/// An at-rule kept as opaque text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtRule {
    /// Name without the leading `@`
    pub name: String,
    pub params: String,
    /// Raw block contents between the braces, if the at-rule has a block
    pub block: Option<String>,
    pub position: Position,
}

/// Top-level node of a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    Rule(Rule),
    /// A declaration outside any rule (e.g. an inline style fragment)
    Declaration(Declaration),
    AtRule(AtRule),
}

/// A parsed stylesheet
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Iterate over the rules, skipping other node kinds
    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Rule(rule) => Some(rule),
            _ => None,
        })
    }

    /// Iterate over every declaration, at root level and inside rules
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.nodes.iter().flat_map(|node| {
            let decls: &[Declaration] = match node {
                Node::Rule(rule) => &rule.declarations,
                Node::Declaration(decl) => std::slice::from_ref(decl),
                Node::AtRule(_) => &[],
            };
            decls.iter()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, node) in self.nodes.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            match node {
                Node::Rule(rule) => {
                    writeln!(f, "{} {{", rule.selector)?;
                    for decl in &rule.declarations {
                        writeln!(f, "    {};", decl)?;
                    }
                    writeln!(f, "}}")?;
                }
                Node::Declaration(decl) => writeln!(f, "{};", decl)?,
                Node::AtRule(at) => {
                    write!(f, "@{}", at.name)?;
                    if !at.params.is_empty() {
                        write!(f, " {}", at.params)?;
                    }
                    match &at.block {
                        Some(block) => writeln!(f, " {{{}}}", block)?,
                        None => writeln!(f, ";")?,
                    }
                }
            }
        }
        Ok(())
    }
}
