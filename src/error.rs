// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for contrastbot

use crate::ast::Position;
use serde::Serialize;
use thiserror::Error;

/// Structural failure while parsing a stylesheet.
///
/// Fatal to the invocation that produced it: no partial document is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseError {
    #[error("Stylesheet is empty: nothing to lint")]
    EmptyInput,

    #[error("Unclosed block opened at {position}")]
    UnclosedBlock { position: Position },

    #[error("Unexpected '}}' at {position}")]
    UnexpectedClose { position: Position },

    #[error("Unclosed comment opened at {position}")]
    UnclosedComment { position: Position },

    #[error("Unclosed string opened at {position}")]
    UnclosedString { position: Position },
}

impl ParseError {
    /// Source position of the failure, when there is one
    pub fn position(&self) -> Option<Position> {
        match self {
            ParseError::EmptyInput => None,
            ParseError::UnclosedBlock { position }
            | ParseError::UnexpectedClose { position }
            | ParseError::UnclosedComment { position }
            | ParseError::UnclosedString { position } => Some(*position),
        }
    }
}

/// A declaration value that cannot be mapped to an sRGB triple.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Unsupported color format: {value:?}")]
pub struct ColorResolutionError {
    /// The raw value as it appeared in the declaration
    pub value: String,
}

/// Failure while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
