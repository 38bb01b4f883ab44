// SPDX-License-Identifier: PMPL-1.0-or-later
//! Contrast engine - WCAG 1.4.3 Contrast (Minimum) / 1.4.6 Contrast (Enhanced)
//!
//! Relative luminance and contrast ratio as defined by WCAG 2.x:
//! <https://www.w3.org/TR/WCAG20/#relativeluminancedef>
//! - AA: 4.5:1 for normal text
//! - AAA: 7:1 for normal text

use crate::color::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Linearisation cutoff from the WCAG 2.0 definition
const LINEAR_CUTOFF: f64 = 0.03928;

/// Lowest possible contrast ratio (identical colours)
pub const MIN_RATIO: f64 = 1.0;

/// Highest possible contrast ratio (black on white)
pub const MAX_RATIO: f64 = 21.0;

/// WCAG conformance level for normal-size text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum WcagLevel {
    /// Level AA - standard conformance
    #[default]
    AA,
    /// Level AAA - enhanced conformance
    AAA,
}

impl WcagLevel {
    /// Minimum contrast ratio required at this level
    pub fn min_ratio(&self) -> f64 {
        match self {
            WcagLevel::AA => 4.5,
            WcagLevel::AAA => 7.0,
        }
    }

    /// WCAG success criterion checked at this level
    pub fn criterion(&self) -> &'static str {
        match self {
            WcagLevel::AA => "1.4.3",
            WcagLevel::AAA => "1.4.6",
        }
    }

    /// W3C "Understanding" page for [`criterion`](Self::criterion)
    pub fn understanding_uri(&self) -> &'static str {
        match self {
            WcagLevel::AA => "https://www.w3.org/WAI/WCAG21/Understanding/contrast-minimum",
            WcagLevel::AAA => "https://www.w3.org/WAI/WCAG21/Understanding/contrast-enhanced",
        }
    }
}

impl fmt::Display for WcagLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WcagLevel::AA => write!(f, "AA"),
            WcagLevel::AAA => write!(f, "AAA"),
        }
    }
}

impl std::str::FromStr for WcagLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "aa" => Ok(WcagLevel::AA),
            "aaa" => Ok(WcagLevel::AAA),
            other => Err(format!("Unknown WCAG level: {}", other)),
        }
    }
}

fn linearize(channel: u8) -> f64 {
    let c = channel as f64 / 255.0;
    if c <= LINEAR_CUTOFF {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of an sRGB colour, in [0, 1]
pub fn relative_luminance(color: Rgb) -> f64 {
    let [r, g, b] = color.channels().map(linearize);
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Contrast ratio between two colours, in [1, 21].
///
/// Symmetric: the lighter colour is always the numerator.
pub fn contrast_ratio(fg: Rgb, bg: Rgb) -> f64 {
    let l1 = relative_luminance(fg);
    let l2 = relative_luminance(bg);
    (l1.max(l2) + 0.05) / (l1.min(l2) + 0.05)
}

/// Whether `ratio` meets `threshold`
pub fn meets(ratio: f64, threshold: f64) -> bool {
    ratio >= threshold
}
