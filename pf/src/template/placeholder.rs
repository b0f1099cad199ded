//! Bracket placeholder scanning
//!
//! A placeholder is `[` name `]` on a single line. Task boxes (`[ ]`, `[x]`)
//! and Markdown link text (`[text](url)`) are not placeholders. Brackets that
//! never close on their line, or close without opening, are reported as
//! malformed.

use std::fmt;
use std::ops::Range;

use serde::Serialize;
use tracing::debug;

/// One placeholder token found in a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// Name between the brackets, verbatim
    pub name: String,
    /// 1-based line of the opening bracket
    pub line: usize,
    /// 1-based character column of the opening bracket
    pub column: usize,
    /// Byte range of the whole token, brackets included
    #[serde(skip)]
    pub span: Range<usize>,
}

/// Why a bracket was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MalformedKind {
    /// `[` with no `]` before the end of the line
    Unclosed,
    /// `]` with no matching `[`
    Unopened,
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unclosed => write!(f, "unclosed '['"),
            Self::Unopened => write!(f, "unmatched ']'"),
        }
    }
}

/// A bracket that does not form a well-formed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Malformed {
    pub kind: MalformedKind,
    pub line: usize,
    pub column: usize,
}

/// Result of scanning a template for placeholders
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Scan {
    pub occurrences: Vec<Occurrence>,
    pub malformed: Vec<Malformed>,
}

impl Scan {
    /// Distinct placeholder names in order of first appearance
    pub fn placeholders(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for occurrence in &self.occurrences {
            if !names.contains(&occurrence.name) {
                names.push(occurrence.name.clone());
            }
        }
        names
    }

    pub fn is_well_formed(&self) -> bool {
        self.malformed.is_empty()
    }
}

/// Maps byte offsets to 1-based line and column
struct LineIndex<'a> {
    text: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    fn new(text: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { text, starts }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        let line = match self.starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let column = self.text[self.starts[line]..offset].chars().count() + 1;
        (line + 1, column)
    }
}

/// Scan the whole text for bracket placeholders
pub fn scan(text: &str) -> Scan {
    debug!(len = text.len(), "scan: called");
    let index = LineIndex::new(text);
    let mut result = Scan::default();
    scan_region(text, 0..text.len(), &index, &mut result);
    result
}

/// Scan only the contents of JSON string literals
///
/// Array and object brackets in JSON are structure, not placeholders.
pub fn scan_json_strings(text: &str) -> Scan {
    debug!(len = text.len(), "scan_json_strings: called");
    let index = LineIndex::new(text);
    let mut result = Scan::default();
    for region in json_string_regions(text) {
        scan_region(text, region, &index, &mut result);
    }
    result
}

fn json_string_regions(text: &str) -> Vec<Range<usize>> {
    let mut regions = Vec::new();
    let mut start: Option<usize> = None;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        match start {
            None => {
                if c == '"' {
                    start = Some(i + 1);
                }
            }
            Some(s) => {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    regions.push(s..i);
                    start = None;
                }
            }
        }
    }

    // Unterminated string runs to the end
    if let Some(s) = start {
        regions.push(s..text.len());
    }
    regions
}

fn scan_region(text: &str, region: Range<usize>, index: &LineIndex<'_>, result: &mut Scan) {
    let base = region.start;
    let slice = &text[region];
    let mut open: Vec<usize> = Vec::new();

    for (i, c) in slice.char_indices() {
        let offset = base + i;
        match c {
            '\n' => flush_unclosed(&mut open, index, result),
            '[' => open.push(offset),
            ']' => match open.pop() {
                Some(start) => {
                    let name = &text[start + 1..offset];
                    let followed_by_paren = slice[i + 1..].starts_with('(');
                    if is_placeholder_name(name) && !followed_by_paren {
                        let (line, column) = index.position(start);
                        result.occurrences.push(Occurrence {
                            name: name.to_string(),
                            line,
                            column,
                            span: start..offset + 1,
                        });
                    }
                }
                None => {
                    let (line, column) = index.position(offset);
                    result.malformed.push(Malformed {
                        kind: MalformedKind::Unopened,
                        line,
                        column,
                    });
                }
            },
            _ => {}
        }
    }
    flush_unclosed(&mut open, index, result);
}

fn flush_unclosed(open: &mut Vec<usize>, index: &LineIndex<'_>, result: &mut Scan) {
    for start in open.drain(..) {
        let (line, column) = index.position(start);
        result.malformed.push(Malformed {
            kind: MalformedKind::Unclosed,
            line,
            column,
        });
    }
}

fn is_placeholder_name(name: &str) -> bool {
    if name.trim().is_empty() || name.contains('[') || name.contains(']') {
        return false;
    }
    // Markdown task boxes
    !matches!(name, "x" | "X")
}
