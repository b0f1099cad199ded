//! Script template rendering
//!
//! Script templates use a mustache-like syntax:
//! - `{{NAME}}` inserts a value
//! - `{{#if_flag}} ... {{/if_flag}}` keeps the block when `flag` is truthy
//! - `{{#each LIST}} ... {{/each}}` repeats the block per item
//!
//! Flag sections are rewritten to Handlebars `if` blocks and the result is
//! rendered with Handlebars. Top-level variables without a value, and any
//! tag outside this grammar (e.g. `{{.Names}}` in a docker format string),
//! are passed through verbatim.

use std::ops::Range;

use handlebars::Handlebars;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{FrameworkError, Result};
use crate::values::Values;

const SENTINEL_OPEN: char = '\u{E000}';
const SENTINEL_CLOSE: char = '\u{E001}';

/// A classified `{{...}}` tag
#[derive(Debug, Clone, PartialEq, Eq)]
enum Tag {
    Variable(String),
    FlagOpen(String),
    FlagClose(String),
    EachOpen(String),
    EachClose,
    Else,
    This,
    Unknown,
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_ascii_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// Find `{{...}}` tags whose inner text has no braces
///
/// Yields the span of the whole tag and of its inner text.
fn tags(text: &str) -> Vec<(Range<usize>, Range<usize>)> {
    let mut found = Vec::new();
    let mut from = 0usize;

    while let Some(rel) = text[from..].find("{{") {
        let start = from + rel;
        let inner_start = start + 2;
        let Some(close) = text[inner_start..].find("}}") else {
            break;
        };
        let inner_end = inner_start + close;
        let inner = &text[inner_start..inner_end];
        if inner.contains('{') || inner.contains('}') {
            from = start + 1;
            continue;
        }
        found.push((start..inner_end + 2, inner_start..inner_end));
        from = inner_end + 2;
    }
    found
}

fn classify(inner: &str) -> Tag {
    let inner = inner.trim();
    if inner == "else" {
        return Tag::Else;
    }
    if inner == "this" {
        return Tag::This;
    }
    if inner == "/each" {
        return Tag::EachClose;
    }
    if let Some(rest) = inner.strip_prefix("#each") {
        let list = rest.trim();
        if rest.starts_with(char::is_whitespace) && is_ident(list) {
            return Tag::EachOpen(list.to_string());
        }
        return Tag::Unknown;
    }
    if let Some(flag) = inner.strip_prefix("#if_") {
        if is_ident(flag) {
            return Tag::FlagOpen(flag.to_string());
        }
        return Tag::Unknown;
    }
    if let Some(flag) = inner.strip_prefix("/if_") {
        if is_ident(flag) {
            return Tag::FlagClose(flag.to_string());
        }
        return Tag::Unknown;
    }
    if is_ident(inner) {
        return Tag::Variable(inner.to_string());
    }
    Tag::Unknown
}

/// Names a script template expects, split by role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScriptScan {
    /// Top-level `{{NAME}}` variables
    pub variables: Vec<String>,
    /// Flags tested by `{{#if_flag}}`, without the `if_` prefix
    pub flags: Vec<String>,
    /// Lists iterated by `{{#each LIST}}`
    pub lists: Vec<String>,
}

impl ScriptScan {
    /// Every name the caller may supply, in first-seen order per role
    pub fn names(&self) -> Vec<String> {
        let mut names = self.variables.clone();
        for name in self.lists.iter().chain(self.flags.iter()) {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

fn push_unique(list: &mut Vec<String>, name: &str) {
    if !list.iter().any(|n| n == name) {
        list.push(name.to_string());
    }
}

/// Collect the variables, flags and lists a script template references
pub fn scan_script(text: &str) -> ScriptScan {
    debug!(len = text.len(), "scan_script: called");
    let mut result = ScriptScan::default();
    let mut each_depth = 0usize;

    for (_, inner) in tags(text) {
        match classify(&text[inner]) {
            Tag::Variable(name) if each_depth == 0 => push_unique(&mut result.variables, &name),
            Tag::FlagOpen(flag) => push_unique(&mut result.flags, &flag),
            Tag::EachOpen(list) => {
                if each_depth == 0 {
                    push_unique(&mut result.lists, &list);
                }
                each_depth += 1;
            }
            Tag::EachClose => each_depth = each_depth.saturating_sub(1),
            _ => {}
        }
    }
    result
}

/// Output of a script render
#[derive(Debug, Clone)]
pub(crate) struct ScriptOutput {
    pub text: String,
    pub substituted: Vec<String>,
    pub unresolved: Vec<String>,
}

/// Render a script template with the given values
pub(crate) fn render_script(template_name: &str, text: &str, values: &Values, strict: bool) -> Result<ScriptOutput> {
    debug!(%template_name, %strict, "render_script: called");

    let mut rewritten = String::with_capacity(text.len());
    let mut verbatim: Vec<String> = Vec::new();
    let mut substituted: Vec<String> = Vec::new();
    let mut unresolved: Vec<String> = Vec::new();
    let mut each_depth = 0usize;
    let mut last = 0usize;

    let mut keep_verbatim = |out: &mut String, raw: &str| {
        out.push(SENTINEL_OPEN);
        out.push_str(&verbatim.len().to_string());
        out.push(SENTINEL_CLOSE);
        verbatim.push(raw.to_string());
    };

    for (span, inner) in tags(text) {
        let whole = &text[span.clone()];
        rewritten.push_str(&text[last..span.start]);
        last = span.end;

        match classify(&text[inner]) {
            Tag::FlagOpen(flag) => rewritten.push_str(&format!("{{{{#if {}}}}}", flag)),
            Tag::FlagClose(_) => rewritten.push_str("{{/if}}"),
            Tag::EachOpen(list) => {
                if each_depth == 0 {
                    if values.contains(&list) {
                        push_unique(&mut substituted, &list);
                    } else {
                        push_unique(&mut unresolved, &list);
                    }
                }
                each_depth += 1;
                rewritten.push_str(whole);
            }
            Tag::EachClose => {
                each_depth = each_depth.saturating_sub(1);
                rewritten.push_str(whole);
            }
            Tag::Variable(name) if each_depth == 0 => {
                if values.contains(&name) {
                    push_unique(&mut substituted, &name);
                    rewritten.push_str(whole);
                } else {
                    push_unique(&mut unresolved, &name);
                    keep_verbatim(&mut rewritten, whole);
                }
            }
            Tag::Variable(_) | Tag::This | Tag::Else => rewritten.push_str(whole),
            Tag::Unknown => {
                debug!(tag = %whole, "render_script: passing unknown tag through");
                keep_verbatim(&mut rewritten, whole);
            }
        }
    }
    rewritten.push_str(&text[last..]);

    if strict && !unresolved.is_empty() {
        return Err(FrameworkError::UnresolvedPlaceholders {
            template: template_name.to_string(),
            names: unresolved,
        });
    }
    for name in &unresolved {
        warn!(template = %template_name, %name, "No value for script variable, leaving it verbatim");
    }

    let mut hbs = Handlebars::new();
    hbs.register_escape_fn(handlebars::no_escape);
    let rendered = hbs
        .render_template(&rewritten, &values.to_json())
        .map_err(|e| FrameworkError::Script {
            template: template_name.to_string(),
            message: e.to_string(),
        })?;

    Ok(ScriptOutput {
        text: restore_verbatim(&rendered, &verbatim),
        substituted,
        unresolved,
    })
}

fn restore_verbatim(rendered: &str, verbatim: &[String]) -> String {
    let mut out = String::with_capacity(rendered.len());
    let mut rest = rendered;

    while let Some(open) = rest.find(SENTINEL_OPEN) {
        out.push_str(&rest[..open]);
        let after = &rest[open + SENTINEL_OPEN.len_utf8()..];
        let restored = after.find(SENTINEL_CLOSE).and_then(|close| {
            let index: usize = after[..close].parse().ok()?;
            let raw = verbatim.get(index)?;
            Some((raw, close))
        });
        match restored {
            Some((raw, close)) => {
                out.push_str(raw);
                rest = &after[close + SENTINEL_CLOSE.len_utf8()..];
            }
            None => {
                out.push(SENTINEL_OPEN);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(pairs: &[(&str, serde_json::Value)]) -> Values {
        let mut v = Values::new();
        for (k, val) in pairs {
            v.set(*k, val.clone());
        }
        v
    }

    #[test]
    fn test_classify_tags() {
        assert_eq!(classify("NAME"), Tag::Variable("NAME".to_string()));
        assert_eq!(classify(" #if_docker_required "), Tag::FlagOpen("docker_required".to_string()));
        assert_eq!(classify("/if_docker_required"), Tag::FlagClose("docker_required".to_string()));
        assert_eq!(classify("#each ITEMS"), Tag::EachOpen("ITEMS".to_string()));
        assert_eq!(classify("/each"), Tag::EachClose);
        assert_eq!(classify("this"), Tag::This);
        assert_eq!(classify(".Names"), Tag::Unknown);
        assert_eq!(classify("#eachITEMS"), Tag::Unknown);
    }

    #[test]
    fn test_tags_skip_braced_inner_text() {
        let text = "{{{x}}} and {{ y }}";
        let found: Vec<&str> = tags(text).into_iter().map(|(_, inner)| &text[inner]).collect();
        assert_eq!(found, vec!["x", " y "]);
    }

    #[test]
    fn test_scan_script_roles() {
        let text = "{{PROJECT_NAME}}\n{{#if_language_python}}x{{/if_language_python}}\n{{#each VARS}}{{this}} {{field}}{{/each}}";
        let scan = scan_script(text);
        assert_eq!(scan.variables, vec!["PROJECT_NAME"]);
        assert_eq!(scan.flags, vec!["language_python"]);
        assert_eq!(scan.lists, vec!["VARS"]);
        assert_eq!(scan.names(), vec!["PROJECT_NAME", "VARS", "language_python"]);
    }

    #[test]
    fn test_render_variables_without_escaping() {
        let v = values(&[("NAME", json!("a & b <c>"))]);
        let out = render_script("t", "Hello {{NAME}}", &v, false).unwrap();
        assert_eq!(out.text, "Hello a & b <c>");
        assert_eq!(out.substituted, vec!["NAME"]);
    }

    #[test]
    fn test_render_flags() {
        let text = "start{{#if_language_python}} python{{/if_language_python}}{{#if_database_mysql}} mysql{{/if_database_mysql}} end";
        let v = values(&[("language_python", json!(true))]);
        let out = render_script("t", text, &v, false).unwrap();
        assert_eq!(out.text, "start python end");
    }

    #[test]
    fn test_render_each_with_items() {
        let text = "{{#each SERVICES}}[{{container_name}}]{{/each}}";
        let v = values(&[("SERVICES", json!([{"container_name": "db"}, {"container_name": "cache"}]))]);
        let out = render_script("t", text, &v, false).unwrap();
        assert_eq!(out.text, "[db][cache]");
    }

    #[test]
    fn test_missing_variable_left_verbatim() {
        let out = render_script("t", "v={{PYTHON_MAJOR}}", &Values::new(), false).unwrap();
        assert_eq!(out.text, "v={{PYTHON_MAJOR}}");
        assert_eq!(out.unresolved, vec!["PYTHON_MAJOR"]);
    }

    #[test]
    fn test_unknown_tag_left_verbatim() {
        let text = "docker ps --format '{{.Names}}' for {{NAME}}";
        let v = values(&[("NAME", json!("app"))]);
        let out = render_script("t", text, &v, false).unwrap();
        assert_eq!(out.text, "docker ps --format '{{.Names}}' for app");
    }

    #[test]
    fn test_strict_rejects_missing_variable() {
        let err = render_script("health", "{{A}} {{B}}", &values(&[("A", json!("1"))]), true).unwrap_err();
        match err {
            FrameworkError::UnresolvedPlaceholders { names, .. } => assert_eq!(names, vec!["B"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_restore_verbatim_ignores_stray_sentinel() {
        let text = format!("a{}b", SENTINEL_OPEN);
        assert_eq!(restore_verbatim(&text, &[]), text);
    }
}
