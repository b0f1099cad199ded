//! Placeholder substitution
//!
//! Rendering is a single pass: replacement text is never rescanned, so a
//! value that itself looks like a placeholder is emitted as-is.

use tracing::{debug, info, warn};

use super::script::render_script;
use super::{Scan, Syntax, Template};
use crate::error::{FrameworkError, Result};
use crate::values::Values;

/// Options controlling how strictly a template is rendered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Fail on malformed brackets and on placeholders left without a value
    pub strict: bool,
}

/// A rendered document plus a record of what happened to each placeholder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub text: String,
    /// Names replaced with a value
    pub substituted: Vec<String>,
    /// Names left verbatim for manual completion
    pub unresolved: Vec<String>,
}

impl Rendered {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn strict() -> Self {
        Self::new(RenderOptions { strict: true })
    }

    /// Render a template with the given values
    pub fn render(&self, template: &Template, values: &Values) -> Result<Rendered> {
        debug!(
            name = %template.name(),
            syntax = ?template.syntax(),
            value_count = values.len(),
            strict = self.options.strict,
            "Renderer::render: called"
        );

        let rendered = match template.syntax() {
            Syntax::Script => {
                let out = render_script(template.name(), template.content(), values, self.options.strict)?;
                Rendered {
                    text: out.text,
                    substituted: out.substituted,
                    unresolved: out.unresolved,
                }
            }
            Syntax::Markdown | Syntax::Json => self.render_brackets(template, values)?,
        };

        info!(
            "Rendered '{}': {} substituted, {} left for manual completion",
            template.name(),
            rendered.substituted.len(),
            rendered.unresolved.len()
        );
        Ok(rendered)
    }

    fn render_brackets(&self, template: &Template, values: &Values) -> Result<Rendered> {
        let scan = template.scan();

        if let Some(first) = scan.malformed.first() {
            if self.options.strict {
                return Err(FrameworkError::MalformedPlaceholder {
                    template: template.name().to_string(),
                    line: first.line,
                    column: first.column,
                    reason: first.kind.to_string(),
                });
            }
            for m in &scan.malformed {
                warn!(
                    template = %template.name(),
                    line = m.line,
                    column = m.column,
                    "Malformed placeholder ({}), copying through unchanged",
                    m.kind
                );
            }
        }

        let rendered = substitute(template, &scan, values);
        if self.options.strict && !rendered.is_complete() {
            return Err(FrameworkError::UnresolvedPlaceholders {
                template: template.name().to_string(),
                names: rendered.unresolved,
            });
        }
        Ok(rendered)
    }
}

/// Replace every well-formed occurrence that has a value; malformed brackets
/// and unknown names are copied through
fn substitute(template: &Template, scan: &Scan, values: &Values) -> Rendered {
    let json = template.syntax() == Syntax::Json;
    let content = template.content();
    let mut text = String::with_capacity(content.len());
    let mut substituted: Vec<String> = Vec::new();
    let mut unresolved: Vec<String> = Vec::new();
    let mut last = 0usize;

    for occurrence in &scan.occurrences {
        text.push_str(&content[last..occurrence.span.start]);
        last = occurrence.span.end;

        match values.substitution(&occurrence.name) {
            Some(value) => {
                if json {
                    text.push_str(&escape_json_fragment(&value));
                } else {
                    text.push_str(&value);
                }
                if !substituted.contains(&occurrence.name) {
                    substituted.push(occurrence.name.clone());
                }
            }
            None => {
                text.push_str(&content[occurrence.span.clone()]);
                if !unresolved.contains(&occurrence.name) {
                    unresolved.push(occurrence.name.clone());
                }
            }
        }
    }
    text.push_str(&content[last..]);

    Rendered {
        text,
        substituted,
        unresolved,
    }
}

/// Escape a value for insertion inside a JSON string literal
fn escape_json_fragment(value: &str) -> String {
    let quoted = serde_json::Value::String(value.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Render Markdown text leniently
pub fn render_str(text: &str, values: &Values) -> String {
    let template = Template::new("inline.md", text);
    substitute(&template, &template.scan(), values).text
}
