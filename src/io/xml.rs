//! Navigable element trees for the input documents.
//!
//! The three input documents are small, so each is read completely into an
//! owned [`Element`] tree. Lookups use a compact path syntax:
//!
//! - `A/B/C` walks child elements step by step from the current element.
//! - A leading `//` matches the first step against every descendant, in
//!   document order.
//! - A step may carry attribute predicates: `Features[@GeometryType='FACE']`.

use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use super::error::Error;

/// Attribute carrying the authoring tool's element identifier.
pub const SOURCE_ID_ATTR: &str = "_id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            text: String::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn children(&self) -> std::slice::Iter<'_, Element> {
        self.children.iter()
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// All elements below this one, in document order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// All elements matching `path`, in document order.
    pub fn select(&self, path: &str) -> Vec<&Element> {
        let (descend, rest) = match path.strip_prefix("//") {
            Some(rest) => (true, rest),
            None => (false, path),
        };
        let steps: Vec<Step<'_>> = split_steps(rest).into_iter().map(Step::parse).collect();
        let Some((first, others)) = steps.split_first() else {
            return Vec::new();
        };

        let mut current: Vec<&Element> = if descend {
            self.descendants().filter(|e| first.matches(e)).collect()
        } else {
            self.children.iter().filter(|e| first.matches(e)).collect()
        };

        for step in others {
            current = current
                .into_iter()
                .flat_map(|e| e.children.iter().filter(|c| step.matches(c)))
                .collect();
        }
        current
    }

    /// First element matching `path`.
    pub fn find(&self, path: &str) -> Option<&Element> {
        self.select(path).into_iter().next()
    }

    /// Short label identifying this element in diagnostics, e.g.
    /// `Displacement[_id=id-0042]`.
    pub fn origin(&self) -> String {
        match self.attr(SOURCE_ID_ATTR) {
            Some(id) => format!("{}[{}={}]", self.name, SOURCE_ID_ATTR, id),
            None => self.name.clone(),
        }
    }

    /// Compact single-line serialisation of this element and its subtree.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape(value.as_str()));
            out.push('"');
        }
        if self.children.is_empty() && self.text.is_empty() {
            out.push_str("/>");
            return;
        }
        out.push('>');
        out.push_str(&escape(self.text.as_str()));
        for child in &self.children {
            child.write_xml(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// One step of a selection path: an element name plus attribute predicates.
struct Step<'p> {
    name: &'p str,
    predicates: Vec<(&'p str, &'p str)>,
}

impl<'p> Step<'p> {
    fn parse(step: &'p str) -> Self {
        let (name, mut rest) = match step.find('[') {
            Some(idx) => (&step[..idx], &step[idx..]),
            None => (step, ""),
        };

        let mut predicates = Vec::new();
        while let Some(open) = rest.strip_prefix("[@") {
            let Some(close) = open.find(']') else { break };
            let body = &open[..close];
            if let Some((key, value)) = body.split_once('=') {
                let value = value.trim_matches(|c| c == '\'' || c == '"');
                predicates.push((key.trim(), value));
            }
            rest = &open[close + 1..];
        }

        Self { name, predicates }
    }

    fn matches(&self, element: &Element) -> bool {
        (self.name == "*" || element.name == self.name)
            && self
                .predicates
                .iter()
                .all(|(key, value)| element.attr(key) == Some(*value))
    }
}

/// Splits a path on `/`, ignoring separators inside `[...]` predicates.
fn split_steps(path: &str) -> Vec<&str> {
    let mut steps = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in path.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                if idx > start {
                    steps.push(&path[start..idx]);
                }
                start = idx + 1;
            }
            _ => {}
        }
    }
    if start < path.len() {
        steps.push(&path[start..]);
    }
    steps
}

/// Parses an XML document into its root element.
pub fn parse_str(xml: &str) -> Result<Element, Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Ok(Event::Start(ref e)) => stack.push(element_from(e, position)?),
            Ok(Event::Empty(ref e)) => {
                let element = element_from(e, position)?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::xml("document", position, "unbalanced end tag"))?;
                attach(&mut stack, &mut root, element, position)?;
            }
            Ok(Event::Text(ref t)) => {
                if let Some(top) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| Error::xml("document", position, e.to_string()))?;
                    top.text.push_str(&text);
                }
            }
            Ok(Event::CData(ref c)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&c[..]));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::xml("document", position, e.to_string())),
        }
    }

    if let Some(open) = stack.last() {
        return Err(Error::xml(
            "document",
            reader.buffer_position(),
            format!("unexpected end of document inside <{}>", open.name),
        ));
    }

    root.ok_or_else(|| Error::xml("document", 0, "document has no root element"))
}

fn element_from(start: &BytesStart<'_>, position: u64) -> Result<Element, Error> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut element = Element::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| Error::xml("document", position, e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::xml("document", position, e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
    position: u64,
) -> Result<(), Error> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(element);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(Error::xml(
            "document",
            position,
            "document has more than one root element",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Root>
  <Assembly ConfigurationID="cfg-1">
    <Geometry>
      <Features GeometryType="FACE" FeatureGeometryType="POINT">
        <Feature MetricID="m-1" _id="f1"/>
      </Features>
      <Features GeometryType="EDGE" FeatureGeometryType="POINT">
        <Feature MetricID="m-2" _id="f2"/>
      </Features>
    </Geometry>
    <Nested>
      <Geometry>
        <Features GeometryType="FACE" FeatureGeometryType="POINT">
          <Feature MetricID="m-3" _id="f3"/>
        </Features>
      </Geometry>
    </Nested>
  </Assembly>
  <Note>a &amp; b</Note>
</Root>"#;

    #[test]
    fn parses_nested_tree() {
        let root = parse_str(SAMPLE).unwrap();
        assert_eq!(root.name(), "Root");
        assert_eq!(root.children().count(), 2);

        let assembly = root.child("Assembly").unwrap();
        assert_eq!(assembly.attr("ConfigurationID"), Some("cfg-1"));
        assert_eq!(root.child("Note").unwrap().text(), "a & b");
    }

    #[test]
    fn select_walks_children_with_predicates() {
        let root = parse_str(SAMPLE).unwrap();
        let faces = root.select("Assembly/Geometry/Features[@GeometryType='FACE']/Feature");
        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].attr("MetricID"), Some("m-1"));
    }

    #[test]
    fn select_descendants_in_document_order() {
        let root = parse_str(SAMPLE).unwrap();
        let faces: Vec<_> = root
            .select("//Geometry/Features[@GeometryType='FACE'][@FeatureGeometryType='POINT']")
            .into_iter()
            .filter_map(|f| f.child("Feature"))
            .filter_map(|f| f.attr("MetricID"))
            .collect();
        assert_eq!(faces, vec!["m-1", "m-3"]);
    }

    #[test]
    fn find_returns_first_match_or_none() {
        let root = parse_str(SAMPLE).unwrap();
        assert!(root.find("Assembly/Missing").is_none());
        assert_eq!(
            root.find("//Feature").and_then(|f| f.attr("_id")),
            Some("f1")
        );
    }

    #[test]
    fn origin_uses_source_id_when_present() {
        let root = parse_str(SAMPLE).unwrap();
        assert_eq!(root.find("//Feature").unwrap().origin(), "Feature[_id=f1]");
        assert_eq!(root.origin(), "Root");
    }

    #[test]
    fn to_xml_is_compact_and_escaped() {
        let element = Element::new("Layer")
            .with_attr("Material_Name", "A & B")
            .with_child(Element::new("Child"));
        assert_eq!(
            element.to_xml(),
            r#"<Layer Material_Name="A &amp; B"><Child/></Layer>"#
        );
        assert_eq!(Element::new("Empty").to_xml(), "<Empty/>");
    }

    #[test]
    fn rejects_mismatched_tags() {
        let err = parse_str("<A><B></A>").unwrap_err();
        assert!(matches!(err, Error::Xml { .. }));
    }

    #[test]
    fn rejects_unterminated_document() {
        let err = parse_str("<A><B/>").unwrap_err();
        assert!(matches!(err, Error::Xml { .. }));
    }

    #[test]
    fn rejects_empty_document() {
        assert!(parse_str("").is_err());
    }

    #[test]
    fn split_steps_respects_predicates() {
        assert_eq!(
            split_steps("A/B[@Path='x/y']/C"),
            vec!["A", "B[@Path='x/y']", "C"]
        );
    }
}
