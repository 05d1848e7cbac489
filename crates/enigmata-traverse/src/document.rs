//! Document text in and out.
//!
//! Pack files are JSON with `//` and `/* */` comments. Comments are blanked
//! before parsing; line breaks inside them are kept so parse errors still
//! point at the right line.

use serde_json::Value;
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed document at line {line}, column {column}: {message}")]
pub struct MalformedDocument {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<serde_json::Error> for MalformedDocument {
    fn from(err: serde_json::Error) -> Self {
        Self {
            line: err.line(),
            column: err.column(),
            message: err.to_string(),
        }
    }
}

/// Parse document text into a tree, tolerating comments and a BOM.
pub fn parse_document(text: &str) -> Result<Value, MalformedDocument> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    Ok(serde_json::from_str(&strip_comments(text))?)
}

/// Pretty-printed document text, two-space indented, non-ASCII kept as is.
pub fn render_document(value: &Value) -> String {
    format!("{value:#}")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Code,
    Str { escaped: bool },
    LineComment,
    BlockComment { star: bool },
}

/// Remove comments that are not inside string literals.
pub fn strip_comments(text: &str) -> Cow<'_, str> {
    if !text.contains("//") && !text.contains("/*") {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut state = Scan::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        state = match state {
            Scan::Code => match (c, chars.peek().copied()) {
                ('"', _) => {
                    out.push(c);
                    Scan::Str { escaped: false }
                }
                ('/', Some('/')) => {
                    chars.next();
                    Scan::LineComment
                }
                ('/', Some('*')) => {
                    chars.next();
                    Scan::BlockComment { star: false }
                }
                _ => {
                    out.push(c);
                    Scan::Code
                }
            },
            Scan::Str { escaped } => {
                out.push(c);
                match c {
                    '\\' if !escaped => Scan::Str { escaped: true },
                    '"' if !escaped => Scan::Code,
                    _ => Scan::Str { escaped: false },
                }
            }
            Scan::LineComment => {
                if c == '\n' {
                    out.push(c);
                    Scan::Code
                } else {
                    Scan::LineComment
                }
            }
            Scan::BlockComment { star } => {
                if c == '\n' {
                    out.push(c);
                }
                match c {
                    '/' if star => Scan::Code,
                    '*' => Scan::BlockComment { star: true },
                    _ => Scan::BlockComment { star: false },
                }
            }
        };
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn comments_outside_strings_are_removed() {
        let text = "{\n  // note\n  \"a\": \"http://x\", /* b */ \"c\": 1\n}";
        let value = parse_document(text).unwrap();
        assert_eq!(value, json!({"a": "http://x", "c": 1}));
    }

    #[test]
    fn block_comment_keeps_line_numbers() {
        let stripped = strip_comments("/* one\ntwo */x");
        assert_eq!(stripped, "\nx");
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let text = r#"{"a": "say \"//hi\""}"#;
        assert_eq!(strip_comments(text), text);
        let value = parse_document(text).unwrap();
        assert_eq!(value["a"], "say \"//hi\"");
    }

    #[test]
    fn malformed_text_reports_position() {
        let err = parse_document("{\n  \"a\": ,\n}").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn bom_is_ignored() {
        assert_eq!(parse_document("\u{feff}[1]").unwrap(), json!([1]));
    }
}
