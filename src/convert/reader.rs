use std::io::BufReader;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::error::ConvertError;
use super::model::{Attr, Element, Node};

/// Parses raw sqlMap bytes into the generic document tree.
///
/// Character runs and CDATA sections both become text runs; blank runs are
/// dropped and the rest trimmed before a node is built. Declarations,
/// doctypes, comments and processing instructions are skipped.
pub fn parse_document(bytes: &[u8]) -> Result<Element, ConvertError> {
    let cursor = std::io::Cursor::new(bytes);
    let mut reader = Reader::from_reader(BufReader::new(cursor));
    reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let e = e.into_owned();
                let mut root = open_element(&e)?;
                read_children(&mut reader, &mut buf, &mut root)?;
                return Ok(root);
            }
            Event::Empty(e) => {
                let e = e.into_owned();
                return open_element(&e);
            }
            Event::Eof => return Err(ConvertError::MissingRoot),
            _ => {}
        }
        buf.clear();
    }
}

fn read_children<R: std::io::BufRead>(
    reader: &mut Reader<R>,
    buf: &mut Vec<u8>,
    parent: &mut Element,
) -> Result<(), ConvertError> {
    loop {
        match reader.read_event_into(buf)? {
            Event::Start(e) => {
                let e = e.into_owned();
                let mut child = open_element(&e)?;
                read_children(reader, buf, &mut child)?;
                parent.push(Node::Element(child));
            }
            Event::Empty(e) => {
                let e = e.into_owned();
                parent.push(Node::Element(open_element(&e)?));
            }
            Event::Text(t) => {
                let text = t.unescape()?;
                let text = text.trim();
                if !text.is_empty() {
                    parent.push(Node::text(text));
                }
            }
            Event::CData(t) => {
                let raw = t.into_inner();
                let text = std::str::from_utf8(&raw)?.trim();
                if !text.is_empty() {
                    parent.push(Node::text(text));
                }
            }
            Event::End(_) => return Ok(()),
            Event::Eof => return Err(ConvertError::TruncatedDocument),
            _ => {}
        }
        buf.clear();
    }
}

fn open_element(e: &BytesStart) -> Result<Element, ConvertError> {
    let mut element = Element::new(std::str::from_utf8(e.name().as_ref())?);
    for attr in e.attributes() {
        let attr = attr?;
        let name = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        element.attrs.push(Attr { name, value });
    }
    Ok(element)
}
