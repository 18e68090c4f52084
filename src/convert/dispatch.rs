use super::diag::Diagnostics;
use super::error::ConvertError;
use super::model::{Element, Node};
use super::procedure::{convert_procedure, ParameterMapRegistry};
use super::registry::TypeAliasRegistry;
use super::result_map::convert_result_map;
use super::statement::convert_statement;

/// One document-order pass over the sqlMap root: declarations feed the
/// registries, statement-family tags feed the converters, and the result
/// is the finished `<mapper>` element. Root attributes copy verbatim.
pub fn convert_document(root: &Element, diags: &mut Diagnostics) -> Result<Element, ConvertError> {
    let mut aliases = TypeAliasRegistry::default();
    let mut parameter_maps = ParameterMapRegistry::default();

    let mut mapper = Element::new("mapper");
    mapper.attrs = root.attrs.clone();

    for child in &root.children {
        let el = match child {
            Node::Text(_) => continue,
            Node::Element(el) => el,
        };
        match el.name.as_str() {
            "typeAlias" => aliases.register_from(el, diags),
            "parameterMap" => parameter_maps.register_from(el, &aliases, diags),
            "resultMap" => mapper.push(Node::Element(convert_result_map(el, &aliases, diags))),
            "sql" | "select" | "insert" | "update" | "delete" => {
                mapper.push(Node::Element(convert_statement(el, &aliases, diags)));
            }
            "procedure" => mapper.push(Node::Element(convert_procedure(
                el,
                &aliases,
                &parameter_maps,
                diags,
            )?)),
            other => diags.warn(format!("unsupported root tag <{other}> was skipped")),
        }
    }
    Ok(mapper)
}
