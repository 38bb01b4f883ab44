// SPDX-License-Identifier: PMPL-1.0-or-later
//! Stylesheet parser.
//!
//! A pragmatic, error-tolerant parser for the subset of CSS needed to find
//! literal colours attached to selectors:
//! - comments are blanked out before tokenizing, so byte offsets stay valid
//! - `selector { ... }` blocks become [`Rule`]s, split on `;` then on the first `:`
//! - quoted strings and `(...)` groups never split a declaration
//! - malformed declarations are dropped, nested blocks are skipped
//! - at-rules are kept as opaque [`AtRule`] nodes
//!
//! Only structural problems (unbalanced braces, unterminated comments or
//! strings) are errors.

use crate::ast::{AtRule, Declaration, Document, Node, Position, Rule};
use crate::error::ParseError;
use regex::Regex;
use std::cell::Cell;
use std::sync::LazyLock;

static IMPORTANT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*!\s*important\s*$").expect("valid regex"));

/// Parse stylesheet text into a [`Document`].
///
/// Empty input yields an empty document.
pub fn parse(css: &str) -> Result<Document, ParseError> {
    let index = LineIndex::new(css);
    let source = strip_comments(css, &index)?;
    Parser::new(&source, &index).parse_document()
}

/// Maps byte offsets to line/column positions in the original text.
///
/// Positions are mostly requested in ascending order, so the last resolved
/// column is cached and later offsets on the same line count on from it.
/// This keeps single-line (minified) stylesheets linear.
struct LineIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
    /// Last resolved `(offset, column)`, column 0-based in characters
    cursor: Cell<(usize, usize)>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(idx, _)| idx + 1));
        Self { text, line_starts, cursor: Cell::new((0, 0)) }
    }

    fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];

        let (cached_offset, cached_column) = self.cursor.get();
        let (from, base) = if (line_start..=offset).contains(&cached_offset) {
            (cached_offset, cached_column)
        } else {
            (line_start, 0)
        };
        let column = base
            + self
                .text
                .get(from..offset)
                .map(|s| s.chars().count())
                .unwrap_or(offset - from);
        self.cursor.set((offset, column));

        Position { offset, line, column: column + 1 }
    }
}

/// Replace every comment with blanks of the same byte length.
/// Newlines inside comments are kept so line numbers do not move.
fn strip_comments(css: &str, index: &LineIndex<'_>) -> Result<String, ParseError> {
    let bytes = css.as_bytes();
    let mut out = String::with_capacity(css.len());
    let mut copied = 0;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q || b == b'\n' {
                quote = None;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' | b'\'' => {
                quote = Some(b);
                i += 1;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = match css[i + 2..].find("*/") {
                    Some(rel) => i + 2 + rel + 2,
                    None => {
                        return Err(ParseError::UnclosedComment {
                            position: index.position(i),
                        })
                    }
                };
                out.push_str(&css[copied..i]);
                out.extend(
                    bytes[i..end]
                        .iter()
                        .map(|&c| if c == b'\n' { '\n' } else { ' ' }),
                );
                copied = end;
                i = end;
            }
            _ => i += 1,
        }
    }

    out.push_str(&css[copied..]);
    Ok(out)
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    index: &'a LineIndex<'a>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, index: &'a LineIndex<'a>) -> Self {
        Self { src, bytes: src.as_bytes(), index }
    }

    fn parse_document(&self) -> Result<Document, ParseError> {
        let mut doc = Document::new();
        let len = self.bytes.len();
        let mut pos = 0;

        loop {
            pos = self.skip_whitespace(pos, len);
            if pos >= len {
                break;
            }

            let (end, stop) = self.scan(pos, len, &[b'{', b'}', b';'])?;
            match stop {
                Some(b'{') => {
                    let close = self.find_block_end(end)?;
                    let prelude = self.src[pos..end].trim();
                    let node = match prelude.strip_prefix('@') {
                        Some(at) => {
                            Node::AtRule(self.at_rule(at, Some(&self.src[end + 1..close]), pos))
                        }
                        None => Node::Rule(self.rule(prelude, end + 1, close, pos)?),
                    };
                    doc.push(node);
                    pos = close + 1;
                }
                Some(b'}') => {
                    return Err(ParseError::UnexpectedClose {
                        position: self.index.position(end),
                    });
                }
                _ => {
                    let text = self.src[pos..end].trim();
                    if let Some(at) = text.strip_prefix('@') {
                        doc.push(Node::AtRule(self.at_rule(at, None, pos)));
                    } else if let Some(decl) = self.declaration(pos, end) {
                        doc.push(Node::Declaration(decl));
                    }
                    pos = end + 1;
                }
            }
        }

        Ok(doc)
    }

    fn rule(
        &self,
        selector: &str,
        body_start: usize,
        body_end: usize,
        start: usize,
    ) -> Result<Rule, ParseError> {
        let mut rule = Rule::new(selector, self.index.position(start));
        let mut pos = body_start;

        loop {
            pos = self.skip_whitespace(pos, body_end);
            if pos >= body_end {
                break;
            }

            let (end, stop) = self.scan(pos, body_end, &[b';', b'{'])?;
            if stop == Some(b'{') {
                // Nested block: not part of this rule's declarations
                pos = self.find_block_end(end)? + 1;
                continue;
            }

            if let Some(decl) = self.declaration(pos, end) {
                rule.declarations.push(decl);
            }
            pos = end + 1;
        }

        Ok(rule)
    }

    fn at_rule(&self, text: &str, block: Option<&str>, start: usize) -> AtRule {
        let text = text.trim();
        let (name, params) = match text.find(|c: char| c.is_whitespace() || c == '(') {
            Some(idx) => (&text[..idx], text[idx..].trim()),
            None => (text, ""),
        };
        AtRule {
            name: name.to_string(),
            params: params.to_string(),
            block: block.map(str::to_string),
            position: self.index.position(start),
        }
    }

    /// Build a declaration from `src[start..end]`, or `None` if it is malformed
    fn declaration(&self, start: usize, end: usize) -> Option<Declaration> {
        let raw = &self.src[start..end];
        let colon = raw.find(':')?;
        let property = raw[..colon].trim();
        if property.is_empty() {
            return None;
        }

        let mut value = raw[colon + 1..].trim();
        let important = match IMPORTANT_RE.find(value) {
            Some(m) => {
                value = value[..m.start()].trim_end();
                true
            }
            None => false,
        };

        let lead = raw.len() - raw.trim_start().len();
        Some(Declaration {
            property: property.to_string(),
            value: value.to_string(),
            important,
            position: self.index.position(start + lead),
        })
    }

    fn skip_whitespace(&self, mut pos: usize, limit: usize) -> usize {
        while pos < limit && self.bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        pos
    }

    /// Find the first stop byte in `[from, limit)`.
    ///
    /// Braces stop the scan anywhere; other stop bytes only outside
    /// parentheses. Returns `(limit, None)` if nothing stops the scan.
    fn scan(&self, from: usize, limit: usize, stops: &[u8]) -> Result<(usize, Option<u8>), ParseError> {
        let mut depth = 0usize;
        let mut i = from;

        while i < limit {
            let b = self.bytes[i];
            match b {
                b'"' | b'\'' => {
                    i = self.skip_string(i, limit)?;
                    continue;
                }
                b'{' | b'}' if stops.contains(&b) => return Ok((i, Some(b))),
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                _ if depth == 0 && stops.contains(&b) => return Ok((i, Some(b))),
                _ => {}
            }
            i += 1;
        }

        Ok((limit, None))
    }

    /// Index of the `}` matching the `{` at `open`
    fn find_block_end(&self, open: usize) -> Result<usize, ParseError> {
        let len = self.bytes.len();
        let mut depth = 0usize;
        let mut i = open;

        while i < len {
            match self.bytes[i] {
                b'"' | b'\'' => {
                    i = self.skip_string(i, len)?;
                    continue;
                }
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
            i += 1;
        }

        Err(ParseError::UnclosedBlock {
            position: self.index.position(open),
        })
    }

    /// Index just past the string starting with the quote at `open`
    fn skip_string(&self, open: usize, limit: usize) -> Result<usize, ParseError> {
        let quote = self.bytes[open];
        let mut i = open + 1;

        while i < limit {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\n' => break,
                b if b == quote => return Ok(i + 1),
                _ => i += 1,
            }
        }

        Err(ParseError::UnclosedString {
            position: self.index.position(open),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn only_rule(doc: &Document) -> &Rule {
        let rules: Vec<_> = doc.rules().collect();
        assert_eq!(rules.len(), 1, "expected exactly one rule: {:?}", doc);
        rules[0]
    }

    #[test]
    fn test_parse_simple_rule() {
        let doc = parse(".btn { color: #000; background: #fff; }").unwrap();
        let rule = only_rule(&doc);
        assert_eq!(rule.selector, ".btn");
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(rule.declarations[0].property, "color");
        assert_eq!(rule.declarations[0].value, "#000");
        assert_eq!(rule.declarations[1].property, "background");
        assert_eq!(rule.declarations[1].value, "#fff");
    }

    #[test]
    fn test_trailing_declaration_without_semicolon() {
        let doc = parse("h1 { margin: 0; color: #f00 }").unwrap();
        let rule = only_rule(&doc);
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(rule.declarations[1].value, "#f00");
    }

    #[test]
    fn test_empty_selector_is_allowed() {
        let doc = parse("{ color: #000; background: #fff; }").unwrap();
        assert_eq!(only_rule(&doc).selector, "");
    }

    #[test]
    fn test_malformed_declarations_are_skipped() {
        let doc = parse("p { color #000; : #fff; background: #fff; ; }").unwrap();
        let rule = only_rule(&doc);
        assert_eq!(rule.declarations.len(), 1);
        assert_eq!(rule.declarations[0].property, "background");
    }

    #[test]
    fn test_value_split_on_first_colon_only() {
        let doc = parse("a { background: url(http://example.com/a.png); }").unwrap();
        let rule = only_rule(&doc);
        assert_eq!(rule.declarations[0].value, "url(http://example.com/a.png)");
    }

    #[test]
    fn test_semicolon_inside_parens_and_strings() {
        let css = r#"a { background: url(data:image/png;base64,AAAA); content: "x;y"; color: #111; }"#;
        let doc = parse(css).unwrap();
        let rule = only_rule(&doc);
        let props: Vec<_> = rule.declarations.iter().map(|d| d.property.as_str()).collect();
        assert_eq!(props, vec!["background", "content", "color"]);
        assert_eq!(rule.declarations[1].value, "\"x;y\"");
    }

    #[test]
    fn test_comments_are_stripped() {
        let css = "/* header */\n.a { /* fg */ color: #000; /* bg: #fff; */ }";
        let doc = parse(css).unwrap();
        let rule = only_rule(&doc);
        assert_eq!(rule.declarations.len(), 1);
        assert_eq!(rule.declarations[0].property, "color");
        assert_eq!(rule.position.line, 2);
    }

    #[test]
    fn test_comment_markers_inside_strings_are_kept() {
        let doc = parse(r#"a { content: "/* not a comment */"; }"#).unwrap();
        assert_eq!(only_rule(&doc).declarations[0].value, r#""/* not a comment */""#);
    }

    #[test]
    fn test_important_is_split_from_value() {
        let doc = parse("a { color: #000 !important; background: #fff ! IMPORTANT }").unwrap();
        let rule = only_rule(&doc);
        assert_eq!(rule.declarations[0].value, "#000");
        assert!(rule.declarations[0].important);
        assert_eq!(rule.declarations[1].value, "#fff");
        assert!(rule.declarations[1].important);
    }

    #[test]
    fn test_root_level_declarations() {
        let doc = parse("color: red;").unwrap();
        assert_eq!(doc.len(), 1);
        assert!(matches!(&doc.nodes[0], Node::Declaration(d) if d.property == "color" && d.value == "red"));
    }

    #[test]
    fn test_root_level_text_without_colon_is_dropped() {
        let doc = parse("garbage; a { color: #000 }").unwrap();
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.rules().count(), 1);
    }

    #[test]
    fn test_at_rules_are_opaque() {
        let css = "@import url(base.css);\n@media (max-width: 600px) { .a { color: #000; } }\n.b { color: #fff }";
        let doc = parse(css).unwrap();
        assert_eq!(doc.len(), 3);
        match &doc.nodes[0] {
            Node::AtRule(at) => {
                assert_eq!(at.name, "import");
                assert_eq!(at.params, "url(base.css)");
                assert!(at.block.is_none());
            }
            other => panic!("expected at-rule, got {:?}", other),
        }
        match &doc.nodes[1] {
            Node::AtRule(at) => {
                assert_eq!(at.name, "media");
                assert_eq!(at.params, "(max-width: 600px)");
                assert!(at.block.as_deref().unwrap_or("").contains(".a"));
            }
            other => panic!("expected at-rule, got {:?}", other),
        }
        assert_eq!(only_rule(&doc).selector, ".b");
    }

    #[test]
    fn test_nested_block_is_skipped() {
        let doc = parse(".card { color: #000; &:hover { color: #fff; } background: #eee; }").unwrap();
        let rule = only_rule(&doc);
        let values: Vec<_> = rule.declarations.iter().map(|d| d.value.as_str()).collect();
        assert_eq!(values, vec!["#000", "#eee"]);
    }

    #[test]
    fn test_declaration_positions() {
        let doc = parse(".a {\n  color: #000;\n  background: #fff;\n}").unwrap();
        let rule = only_rule(&doc);
        assert_eq!(rule.position, Position { offset: 0, line: 1, column: 1 });
        assert_eq!(rule.declarations[0].position.line, 2);
        assert_eq!(rule.declarations[0].position.column, 3);
        assert_eq!(rule.declarations[1].position.line, 3);
    }

    #[test]
    fn test_columns_count_characters() {
        let doc = parse("/* é */ a { color: #000 }").unwrap();
        assert_eq!(only_rule(&doc).position.column, 9);
    }

    #[test]
    fn test_empty_and_comment_only_input() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("   \n\t").unwrap().is_empty());
        assert!(parse("/* nothing */").unwrap().is_empty());
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse("a { color: #000;\n.b { color: #fff; }").unwrap_err();
        assert!(matches!(err, ParseError::UnclosedBlock { position } if position.line == 1 && position.column == 3));
    }

    #[test]
    fn test_unexpected_close() {
        let err = parse("a { color: #000; } }").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedClose { position } if position.offset == 19));
    }

    #[test]
    fn test_unclosed_comment() {
        let err = parse("a { color: #000; } /* trailing").unwrap_err();
        assert!(matches!(err, ParseError::UnclosedComment { position } if position.offset == 19));
    }

    #[test]
    fn test_unclosed_string() {
        let err = parse("a { content: \"oops; }").unwrap_err();
        assert!(matches!(err, ParseError::UnclosedString { .. }));
    }

    #[test]
    fn test_stray_apostrophe_is_unclosed_string() {
        let err = parse("a { content: don't }
b { color: #000 }").unwrap_err();
        assert!(matches!(err, ParseError::UnclosedString { position } if position.line == 1 && position.column == 17));
    }

    #[test]
    fn test_positions_on_one_long_line() {
        let unit = ".i{i}{color:#000;background:#fff;margin:0}";
        let css = unit.repeat(20_000);
        let doc = parse(&css).unwrap();
        assert_eq!(doc.rules().count(), 40_000);

        let last = doc.rules().last().unwrap();
        let offset = css.len() - (unit.len() - 5);
        assert_eq!(last.position, Position { offset, line: 1, column: offset + 1 });
        assert_eq!(last.declarations[2].position.column, css.len() - "margin:0}".len() + 1);
    }

    #[test]
    fn test_columns_after_backwards_lookup() {
        let index = LineIndex::new("ab\né é é");
        assert_eq!(index.position(9).column, 5);
        assert_eq!(index.position(3).column, 1);
        assert_eq!(index.position(6).column, 3);
        assert_eq!(index.position(1), Position { offset: 1, line: 1, column: 2 });
        assert_eq!(index.position(9).column, 5);
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let doc = parse(".ünï { color: #000; content: \"—\" }").unwrap();
        assert_eq!(only_rule(&doc).selector, ".ünï");
    }
}
