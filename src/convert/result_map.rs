use super::diag::Diagnostics;
use super::model::{get_attr, take_attr, Element, Node};
use super::registry::{filter_attrs, TypeAliasRegistry};

/// Converts a `<resultMap>` declaration.
///
/// Children are filtered to `<result>` mappings; text runs and unrelated
/// tags are dropped. A mapping that carries both a nested `select`
/// reference and a `column` becomes an `<association>`; otherwise the
/// legacy `nullValue` sentinel is discarded and the tag name is kept.
pub fn convert_result_map(
    el: &Element,
    aliases: &TypeAliasRegistry,
    diags: &mut Diagnostics,
) -> Element {
    let mut out = Element::new("resultMap");
    out.attrs = filter_attrs(&el.attrs, aliases);

    for child in &el.children {
        let Node::Element(mapping) = child else {
            continue;
        };
        if mapping.name != "result" {
            diags.warn(format!(
                "<resultMap> child <{}> has no equivalent and was dropped",
                mapping.name
            ));
            continue;
        }

        let mut attrs = filter_attrs(&mapping.attrs, aliases);
        if let Some(jdbc) = attrs.iter_mut().find(|a| a.name == "jdbcType") {
            jdbc.value = jdbc.value.to_ascii_uppercase();
        }

        let nested = get_attr(&attrs, "select").is_some() && get_attr(&attrs, "column").is_some();
        let name = if nested {
            "association"
        } else {
            let _ = take_attr(&mut attrs, "nullValue");
            "result"
        };
        out.push(Node::Element(Element {
            name: name.to_string(),
            attrs,
            children: Vec::new(),
        }));
    }
    out
}
