//! Minimal element tree over a borrowed XML source.
//!
//! Elements keep the byte range of their inner content in the original text so
//! that leaf passages can be captured verbatim, nested markup included.

use std::borrow::Cow;
use std::ops::Range;

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Attribute carrying a passage's number at every citation level.
pub const NUMBER_ATTRIBUTE: &str = "n";

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub inner: Range<usize>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn from_start(start: &BytesStart<'_>, inner_start: usize) -> Result<Self> {
        Ok(Self {
            name: local_name(start)?,
            attributes: read_attributes(start)?,
            inner: inner_start..inner_start,
            children: Vec::new(),
        })
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn number(&self) -> String {
        self.attribute(NUMBER_ATTRIBUTE).unwrap_or_default().to_string()
    }

    pub fn inner_xml<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.inner.clone()).unwrap_or_default()
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children
            .iter()
            .filter(move |child| element_name_matches(name, &child.name))
    }

    /// Every element reached by following `path` as successive child steps, in document order.
    pub fn select_path<'a>(&'a self, path: &[&'a str]) -> Vec<&'a XmlElement> {
        let Some((first, rest)) = path.split_first() else {
            return vec![self];
        };

        self.children_named(first)
            .flat_map(|child| child.select_path(rest))
            .collect()
    }
}

/// Step names match by local name; numbered TEI divisions (`div1`..`div9`) also match `div`.
pub fn element_name_matches(step_name: &str, element_name: &str) -> bool {
    if step_name == element_name {
        return true;
    }

    step_name == "div"
        && element_name
            .strip_prefix("div")
            .is_some_and(|suffix| suffix.len() == 1 && suffix.as_bytes()[0].is_ascii_digit())
}

pub fn local_name(start: &BytesStart<'_>) -> Result<String> {
    let name = start.local_name();
    let name = std::str::from_utf8(name.as_ref()).context("element name is not valid UTF-8")?;
    Ok(name.to_string())
}

pub fn read_attributes(start: &BytesStart<'_>) -> Result<Vec<(String, String)>> {
    let mut attributes = Vec::new();
    for attribute in start.attributes() {
        let attribute = attribute.context("malformed attribute")?;
        let key = attribute.key.local_name();
        let key = std::str::from_utf8(key.as_ref())
            .context("attribute name is not valid UTF-8")?
            .to_string();
        let value = attribute
            .unescape_value()
            .map(Cow::into_owned)
            .unwrap_or_else(|_| String::from_utf8_lossy(&attribute.value).into_owned());
        attributes.push((key, value));
    }
    Ok(attributes)
}

/// Parses `source` into its root element. Fails on any well-formedness error.
///
/// Inner ranges index into `source` itself, byte order mark included.
pub fn parse_document(source: &str) -> Result<XmlElement> {
    let content = source.strip_prefix(BYTE_ORDER_MARK).unwrap_or(source);
    let offset = source.len() - content.len();

    let mut reader = Reader::from_str(content);
    let mut open: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event_start = offset + reader.buffer_position();
        let event = reader
            .read_event()
            .with_context(|| {
                format!("XML parse error at byte {}", offset + reader.buffer_position())
            })?;

        match event {
            Event::Start(start) => {
                open.push(XmlElement::from_start(&start, offset + reader.buffer_position())?);
            }
            Event::Empty(start) => {
                let element = XmlElement::from_start(&start, offset + reader.buffer_position())?;
                attach(&mut open, &mut root, element);
            }
            Event::End(_) => {
                let mut element = open
                    .pop()
                    .with_context(|| format!("unbalanced end tag at byte {event_start}"))?;
                element.inner.end = event_start;
                attach(&mut open, &mut root, element);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(unclosed) = open.last() {
        bail!("unexpected end of document inside <{}>", unclosed.name);
    }

    root.context("document has no root element")
}

fn attach(open: &mut [XmlElement], root: &mut Option<XmlElement>, element: XmlElement) {
    match open.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
