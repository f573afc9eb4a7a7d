//! Block templates and placeholder substitution.
//!
//! A template registry maps section names to an ordered list of lines. Lines
//! reference entity fields with `$Name` or `${Name}`; a `$` not followed by a
//! name is kept literally. Substitution never fails: placeholders without a
//! value are left verbatim so partially extracted models stay readable.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::Deserialize;

use super::error::Error;

const DEFAULT_TEMPLATES_TOML: &str = include_str!("../../resources/default.template.toml");

static DEFAULT_TEMPLATES: OnceLock<TemplateRegistry> = OnceLock::new();

/// Indentation of body lines below their section header.
pub const INDENT: &str = "    ";

/// Placeholder of the line that echoes the source element.
pub const XML_TEXT_PLACEHOLDER: &str = "$XML_Text";

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateRegistry {
    #[serde(default)]
    sections: BTreeMap<String, TemplateSection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateSection {
    /// Header line; the section name when absent.
    #[serde(default)]
    pub header: Option<String>,
    pub lines: Vec<String>,
}

impl TemplateRegistry {
    pub fn section(&self, name: &str) -> Result<&TemplateSection, Error> {
        self.sections
            .get(name)
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }
}

impl TemplateSection {
    /// Unsubstituted block text: the header, then every line indented one
    /// level, each prefixed with `indent`.
    ///
    /// Lines echoing source XML are dropped unless `copy_xml_text` is set.
    pub fn block(&self, name: &str, indent: &str, copy_xml_text: bool) -> String {
        let header = self.header.as_deref().unwrap_or(name);
        let mut out = String::with_capacity(64 * (self.lines.len() + 1));
        out.push_str(indent);
        out.push_str(header);
        out.push('\n');
        for line in &self.lines {
            if !copy_xml_text && line.contains(XML_TEXT_PLACEHOLDER) {
                continue;
            }
            out.push_str(indent);
            out.push_str(INDENT);
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Parses a custom registry, or returns the embedded default.
pub fn load_templates(custom_toml: Option<&str>) -> Result<TemplateRegistry, Error> {
    match custom_toml {
        Some(toml) => {
            let registry: TemplateRegistry = toml::from_str(toml)?;
            Ok(registry)
        }
        None => Ok(default_templates().clone()),
    }
}

pub fn default_templates() -> &'static TemplateRegistry {
    DEFAULT_TEMPLATES.get_or_init(|| {
        toml::from_str(DEFAULT_TEMPLATES_TOML)
            .expect("Failed to parse embedded default templates. This is a library bug.")
    })
}

/// One placeholder occurrence in a text.
struct Placeholder<'t> {
    start: usize,
    end: usize,
    name: &'t str,
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Scans for the next placeholder at or after byte `from`.
fn next_placeholder(text: &str, from: usize) -> Option<Placeholder<'_>> {
    let bytes = text.as_bytes();
    let mut pos = from;
    while let Some(offset) = text[pos..].find('$') {
        let start = pos + offset;
        let after = start + 1;
        match bytes.get(after) {
            Some(b'{') => {
                if let Some(close) = text[after + 1..].find('}') {
                    let name = &text[after + 1..after + 1 + close];
                    let valid = name.bytes().next().is_some_and(is_name_start)
                        && name.bytes().all(is_name_char);
                    if valid {
                        return Some(Placeholder {
                            start,
                            end: after + close + 2,
                            name,
                        });
                    }
                }
            }
            Some(&b) if is_name_start(b) => {
                let len = bytes[after..]
                    .iter()
                    .take_while(|&&c| is_name_char(c))
                    .count();
                return Some(Placeholder {
                    start,
                    end: after + len,
                    name: &text[after..after + len],
                });
            }
            _ => {}
        }
        pos = after;
    }
    None
}

/// Replaces every placeholder `lookup` knows; others are kept verbatim.
///
/// Substituted values are not rescanned.
pub fn substitute<'v, F>(text: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<Cow<'v, str>>,
{
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;
    while let Some(ph) = next_placeholder(text, pos) {
        out.push_str(&text[pos..ph.start]);
        match lookup(ph.name) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&text[ph.start..ph.end]),
        }
        pos = ph.end;
    }
    out.push_str(&text[pos..]);
    out
}

/// Names of the placeholders in `text`, deduplicated, in order of first use.
pub fn placeholders(text: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut pos = 0;
    while let Some(ph) = next_placeholder(text, pos) {
        if !names.iter().any(|n| n == ph.name) {
            names.push(ph.name.to_string());
        }
        pos = ph.end;
    }
    names
}
