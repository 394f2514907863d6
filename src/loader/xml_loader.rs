//! TMX/TSX text into an element tree.

use crate::document::Element;
use crate::error::MapError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Parse a complete XML document into its root [`Element`].
pub fn parse_xml(text: &str) -> Result<Element, MapError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(MapError::xml)? {
            Event::Start(e) => stack.push(start_element(&e)?),
            Event::Empty(e) => {
                let element = start_element(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| MapError::xml("unexpected closing tag"))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape().map_err(MapError::xml)?);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    let raw = c.into_inner();
                    let s = std::str::from_utf8(&raw).map_err(MapError::xml)?;
                    top.text.push_str(s.trim());
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(MapError::xml(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| MapError::xml("document has no root element"))
}

fn start_element(e: &BytesStart<'_>) -> Result<Element, MapError> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(MapError::xml)?
        .to_owned();
    let mut element = Element::new(name);

    for attr in e.attributes() {
        let attr = attr.map_err(MapError::xml)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(MapError::xml)?;
        let value = attr.unescape_value().map_err(MapError::xml)?;
        element
            .attributes
            .push((key.to_owned(), value.into_owned()));
    }
    Ok(element)
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), MapError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(MapError::xml("more than one root element")),
    }
    Ok(())
}
