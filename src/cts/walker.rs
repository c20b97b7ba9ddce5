use std::ops::Range;

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::cts::plan::DescentPlan;
use crate::cts::scheme::{DepthMode, PathStep};
use crate::cts::xml_tree::{XmlElement, element_name_matches};

/// A leaf passage before normalization: the numbers captured on the way down and its raw inner XML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLeaf<'s> {
    pub numbers: Vec<String>,
    pub inner_xml: &'s str,
}

impl RawLeaf<'_> {
    pub fn dotted_number(&self) -> String {
        self.numbers.join(".")
    }
}

/// Walks every `text/body` of the document along `plan`, yielding leaves in document order.
pub fn walk_document<'s>(
    root: &XmlElement,
    source: &'s str,
    plan: &DescentPlan,
) -> Result<Vec<RawLeaf<'s>>> {
    let mut leaves = Vec::new();
    let mut captured = Vec::new();

    for body in root.select_path(&["text", "body"]) {
        descend(body, source, plan.steps(), &mut captured, &mut leaves)?;
    }

    Ok(leaves)
}

fn descend<'s>(
    element: &XmlElement,
    source: &'s str,
    steps: &[PathStep],
    captured: &mut Vec<String>,
    leaves: &mut Vec<RawLeaf<'s>>,
) -> Result<()> {
    let Some((step, rest)) = steps.split_first() else {
        return Ok(());
    };

    match step.depth_mode {
        DepthMode::Child => {
            for child in element.children_named(step.element_name) {
                if step.captures_number {
                    captured.push(child.number());
                }

                if step.is_terminal {
                    leaves.push(RawLeaf {
                        numbers: captured.clone(),
                        inner_xml: child.inner_xml(source),
                    });
                } else {
                    descend(child, source, rest, captured, leaves)?;
                }

                if step.captures_number {
                    captured.pop();
                }
            }
        }
        DepthMode::ArbitraryDescendant => {
            let scope = element.inner_xml(source);
            let matches = scan_descendants(scope, step.element_name)
                .with_context(|| {
                    format!(
                        "failed to scan <{}> for <{}>",
                        element.name, step.element_name
                    )
                })?;

            for matched in matches {
                let mut numbers = captured.clone();
                if step.captures_number {
                    numbers.push(matched.number);
                }
                leaves.push(RawLeaf {
                    numbers,
                    inner_xml: scope.get(matched.inner).unwrap_or_default(),
                });
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedElement {
    pub number: String,
    pub inner: Range<usize>,
}

/// Streams through a serialized fragment and returns every element named `name`
/// at any depth. A match is consumed whole: same-named elements nested inside it
/// belong to its content.
pub fn scan_descendants(fragment: &str, name: &str) -> Result<Vec<ScannedElement>> {
    let mut reader = Reader::from_str(fragment);
    let mut found = Vec::new();

    loop {
        match reader.read_event().context("malformed fragment")? {
            Event::Start(start) => {
                let element = XmlElement::from_start(&start, reader.buffer_position())?;
                if element_name_matches(name, &element.name) {
                    let inner_start = element.inner.start;
                    let inner_end = skip_to_matching_end(&mut reader)?;
                    found.push(ScannedElement {
                        number: element.number(),
                        inner: inner_start..inner_end,
                    });
                }
            }
            Event::Empty(start) => {
                let element = XmlElement::from_start(&start, reader.buffer_position())?;
                if element_name_matches(name, &element.name) {
                    found.push(ScannedElement {
                        number: element.number(),
                        inner: element.inner,
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(found)
}

/// Consumes events up to the end tag closing the element just opened; returns
/// the offset where that end tag begins.
fn skip_to_matching_end(reader: &mut Reader<&[u8]>) -> Result<usize> {
    let mut depth = 1usize;
    loop {
        let event_start = reader.buffer_position();
        match reader.read_event().context("malformed fragment")? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(event_start);
                }
            }
            Event::Eof => bail!("fragment ended inside an open element"),
            _ => {}
        }
    }
}
