// SPDX-License-Identifier: PMPL-1.0-or-later
//! Contrastbot - WCAG colour contrast linting for CSS
//!
//! Part of the gitbot-fleet ecosystem. Contrastbot parses stylesheets, keeps
//! the `color` / `background` / `background-color` declarations of each
//! selector, and checks every resolvable foreground/background pair against
//! the WCAG 2.x contrast threshold (4.5:1 for AA, 7:1 for AAA).
//!
//! ## Pipeline
//!
//! - **Parser** ([`parser`]): stylesheet text to a typed [`Document`]
//! - **Filter** ([`filter`]): keeps only colour-bearing rules
//! - **Resolver** ([`color`]): `#rgb` / `#rrggbb` to [`Rgb`]
//! - **Contrast** ([`contrast`]): relative luminance and contrast ratio
//! - **Lint** ([`lint`]): runs the pipeline and aggregates a [`LintReport`]
//!
//! The engine does no I/O and keeps no state between calls. The [`scanner`],
//! [`report`] and [`config`] modules are the host side used by the CLI.
//!
//! ```
//! let report = contrastbot::lint(".btn { color: #000; background: #fff; }").unwrap();
//! assert!(report.all_accessible);
//! ```

pub mod ast;
pub mod color;
pub mod config;
pub mod contrast;
pub mod error;
pub mod filter;
pub mod lint;
pub mod parser;
pub mod report;
pub mod scanner;

pub use ast::{AtRule, Declaration, Document, Node, Position, Rule};
pub use color::{resolve_color, Rgb};
pub use config::{Config, LintConfig};
pub use contrast::{contrast_ratio, relative_luminance, WcagLevel};
pub use error::{ColorResolutionError, ConfigError, ParseError};
pub use filter::{color_map, has_color, prune_color_declarations, ColorPair};
pub use lint::{lint, Contrast, ContrastResult, LintReport, LintStatus, Linter, SkipReason};
pub use parser::parse;
