// SPDX-License-Identifier: PMPL-1.0-or-later
//! Colour value resolution.
//!
//! Only literal hex notation is understood: `#rgb` and `#rrggbb`, in any case,
//! with the leading `#` optional. Named colours, functional notation,
//! gradients and `var()` references are reported as unsupported so the
//! caller can skip the rule instead of guessing.

use crate::error::ColorResolutionError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static HEX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#?(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid regex")
});

/// An sRGB colour with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Lowercase `#rrggbb` form
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Resolve a raw declaration value to an RGB triple
pub fn resolve_color(raw: &str) -> Result<Rgb, ColorResolutionError> {
    let value = raw.trim();
    if !HEX_RE.is_match(value) {
        return Err(ColorResolutionError { value: raw.to_string() });
    }

    let hex = value.trim_start_matches('#');
    let expanded: String = if hex.len() == 3 {
        hex.chars().flat_map(|c| [c, c]).collect()
    } else {
        hex.to_string()
    };

    let channel = |idx: usize| {
        u8::from_str_radix(&expanded[idx..idx + 2], 16)
            .map_err(|_| ColorResolutionError { value: raw.to_string() })
    };

    Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}
