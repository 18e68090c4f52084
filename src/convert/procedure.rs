use std::collections::HashMap;

use super::diag::Diagnostics;
use super::error::ConvertError;
use super::model::{take_attr, Element, Node};
use super::placeholder::rewrite_placeholders;
use super::registry::{filter_attrs, TypeAliasRegistry};

/// Parameter directionality. Anything that is not `OUT` (case-insensitive)
/// counts as `IN`, matching the source dialect's lenient reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    In,
    Out,
}

impl ParamMode {
    fn parse(value: &str) -> ParamMode {
        if value.trim().eq_ignore_ascii_case("OUT") {
            ParamMode::Out
        } else {
            ParamMode::In
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamMode::In => "IN",
            ParamMode::Out => "OUT",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    pub property: String,
    pub mode: ParamMode,
    pub jdbc_type: Option<String>,
    pub java_type: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterMap {
    pub class: Option<String>,
    pub parameters: Vec<ParamDescriptor>,
}

/// Document-scoped table of `<parameterMap>` declarations, filled in
/// document order with the same declare-before-use visibility as the type
/// alias registry.
#[derive(Debug, Default)]
pub struct ParameterMapRegistry {
    maps: HashMap<String, ParameterMap>,
}

impl ParameterMapRegistry {
    pub fn register_from(
        &mut self,
        el: &Element,
        aliases: &TypeAliasRegistry,
        diags: &mut Diagnostics,
    ) {
        let Some(id) = el.attr("id") else {
            diags.warn("<parameterMap> is missing `id` and was ignored");
            return;
        };

        // `map` is a well-known alias for the collection parameter class.
        let class = el.attr("class").map(|class| {
            let class = class.trim();
            if class == "map" {
                "java.util.Map".to_string()
            } else {
                aliases.resolve(class).unwrap_or(class).to_string()
            }
        });

        let mut parameters = Vec::new();
        for child in &el.children {
            let Node::Element(param) = child else {
                continue;
            };
            if param.name != "parameter" {
                continue;
            }
            let Some(property) = param.attr("property") else {
                diags.warn(format!(
                    "<parameter> without `property` in parameterMap `{id}` was skipped"
                ));
                continue;
            };
            parameters.push(ParamDescriptor {
                property: property.trim().to_string(),
                mode: ParamMode::parse(param.attr("mode").unwrap_or("")),
                jdbc_type: param.attr("jdbcType").map(|v| v.trim().to_string()),
                java_type: param.attr("javaType").map(|v| v.trim().to_string()),
            });
        }

        log::debug!("parameter map `{id}` with {} parameters", parameters.len());
        self.maps.insert(id.trim().to_string(), ParameterMap { class, parameters });
    }

    pub fn get(&self, id: &str) -> Option<&ParameterMap> {
        self.maps.get(id)
    }
}

/// Merges a `<procedure>` declaration into a MyBatis callable `<select>`.
///
/// Only the positional `call proc(?, ?, ?)` body form is supported: each
/// `?` consumes the next descriptor of the resolved parameter map in
/// order. An undeclared map reference, or a `?` with nothing left to bind,
/// aborts the whole document conversion.
pub fn convert_procedure(
    el: &Element,
    aliases: &TypeAliasRegistry,
    parameter_maps: &ParameterMapRegistry,
    diags: &mut Diagnostics,
) -> Result<Element, ConvertError> {
    let statement = el.attr("id").unwrap_or("<anonymous>").to_string();
    let mut attrs = filter_attrs(&el.attrs, aliases);

    let map = match take_attr(&mut attrs, "parameterMap") {
        Some(id) => {
            let id = id.trim().to_string();
            Some(
                parameter_maps
                    .get(&id)
                    .ok_or(ConvertError::UnknownParameterMap { statement: statement.clone(), id })?,
            )
        }
        None => None,
    };

    let mut out = Element::new("select");
    out.attrs = attrs;
    if let Some(class) = map.and_then(|m| m.class.as_deref()) {
        out.set_attr("parameterType", class);
    }
    out.set_attr("statementType", "CALLABLE");

    let mut body = String::new();
    for child in &el.children {
        match child {
            Node::Text(text) => {
                if !body.is_empty() {
                    body.push('\n');
                }
                body.push_str(text);
            }
            Node::Element(nested) => diags.warn(format!(
                "<procedure> `{statement}` child <{}> is not supported and was dropped",
                nested.name
            )),
        }
    }

    let descriptors = map.map(|m| m.parameters.as_slice()).unwrap_or(&[]);
    let mut next = 0;
    let mut bound = String::with_capacity(body.len());
    for ch in body.replace("\r\n", "\n").replace('\r', "\n").chars() {
        if ch == '?' {
            let descriptor = descriptors
                .get(next)
                .ok_or(ConvertError::UnresolvedPlaceholder { statement: statement.clone() })?;
            next += 1;
            push_bind_token(&mut bound, descriptor);
        } else {
            bound.push(ch);
        }
    }

    let text = rewrite_placeholders(bound.trim());
    if !text.is_empty() {
        out.push(Node::text(text));
    }
    Ok(out)
}

fn push_bind_token(buf: &mut String, descriptor: &ParamDescriptor) {
    buf.push_str("#{");
    buf.push_str(&descriptor.property);
    buf.push_str(",mode=");
    buf.push_str(descriptor.mode.as_str());
    if let Some(jdbc) = &descriptor.jdbc_type {
        buf.push_str(",jdbcType=");
        buf.push_str(jdbc);
    }
    buf.push('}');
}
