use quick_xml::escape::{escape, partial_escape};

use super::model::{Element, Node};

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;
const MAPPER_DOCTYPE: &str = r#"<!DOCTYPE mapper PUBLIC "-//mybatis.org//DTD Mapper 3.0//EN" "http://mybatis.org/dtd/mybatis-3-mapper.dtd">"#;

/// Format hints for the emitted markup.
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Indent nested elements (two spaces per level).
    pub pretty: bool,
    /// Line-ending string used between lines.
    pub newline: String,
    /// Emit `<tag />` instead of `<tag/>` for childless elements.
    pub space_before_self_closing: bool,
}

impl Default for EmitOptions {
    fn default() -> Self {
        EmitOptions {
            pretty: true,
            newline: "\n".to_string(),
            space_before_self_closing: false,
        }
    }
}

/// Serializes the converted tree to MyBatis mapper markup, declaration and
/// DOCTYPE included. Text runs containing `<` or `>` are wrapped in CDATA
/// so the output stays well-formed without double escaping.
pub fn emit_document(mapper: &Element, opts: &EmitOptions) -> String {
    let mut out = String::new();
    out.push_str(XML_DECL);
    out.push_str(&opts.newline);
    out.push_str(MAPPER_DOCTYPE);
    out.push_str(&opts.newline);
    write_element(&mut out, mapper, 0, opts);
    out.push_str(&opts.newline);
    out
}

fn write_element(out: &mut String, el: &Element, depth: usize, opts: &EmitOptions) {
    out.push('<');
    out.push_str(&el.name);
    for attr in &el.attrs {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&escape(&attr.value));
        out.push('"');
    }
    if el.children.is_empty() {
        out.push_str(if opts.space_before_self_closing { " />" } else { "/>" });
        return;
    }
    out.push('>');

    for child in &el.children {
        if opts.pretty {
            out.push_str(&opts.newline);
            push_indent(out, depth + 1);
        }
        match child {
            Node::Text(text) => write_text(out, text),
            Node::Element(nested) => write_element(out, nested, depth + 1, opts),
        }
    }

    if opts.pretty {
        out.push_str(&opts.newline);
        push_indent(out, depth);
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn write_text(out: &mut String, text: &str) {
    if text.contains('<') || text.contains('>') {
        out.push_str("<![CDATA[");
        out.push_str(text);
        out.push_str("]]>");
    } else {
        out.push_str(&partial_escape(text));
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}
