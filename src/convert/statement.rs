use lazy_static::lazy_static;
use regex::Regex;

use super::diag::Diagnostics;
use super::model::{take_attr, Attr, Element, Node};
use super::placeholder::rewrite_placeholders;
use super::registry::{filter_attrs, TypeAliasRegistry};

/// Loop variable every converted `<iterate>` binds its items to.
const LOOP_ITEM: &str = "item";

lazy_static! {
    // #name[]# inside an iterate body names the collection being walked.
    static ref ITERATE_COLLECTION: Regex = Regex::new(r"#([A-Za-z_]\w*)\[\]").unwrap();
}

/// Converts one statement-family tag (`select`, `insert`, `update`,
/// `delete`, `sql`) including the tag itself. The body walk is a pure
/// recursive rewrite: every call returns fresh nodes and never mutates an
/// already-emitted sibling.
pub fn convert_statement(
    el: &Element,
    aliases: &TypeAliasRegistry,
    diags: &mut Diagnostics,
) -> Element {
    let mut out = Element::new(el.name.clone());
    out.attrs = filter_attrs(&el.attrs, aliases);
    out.children = rewrite_children(&el.children, &el.name, aliases, diags);
    out
}

fn rewrite_children(
    children: &[Node],
    parent_tag: &str,
    aliases: &TypeAliasRegistry,
    diags: &mut Diagnostics,
) -> Vec<Node> {
    let mut out = Vec::with_capacity(children.len());
    for child in children {
        rewrite_node(&mut out, child, parent_tag, aliases, diags);
    }
    out
}

fn rewrite_node(
    out: &mut Vec<Node>,
    node: &Node,
    parent_tag: &str,
    aliases: &TypeAliasRegistry,
    diags: &mut Diagnostics,
) {
    let el = match node {
        Node::Text(text) => {
            if let Some(text) = normalize_text(text) {
                out.push(Node::text(rewrite_placeholders(&text)));
            }
            return;
        }
        Node::Element(el) => el,
    };

    let attrs = filter_attrs(&el.attrs, aliases);
    match el.name.as_str() {
        "selectKey" => out.push(Node::Element(convert_select_key(el, attrs, aliases, diags))),
        "isNotEmpty" => convert_guard(out, Guard::NotEmpty, el, attrs, parent_tag, aliases, diags),
        "isNotNull" => convert_guard(out, Guard::NotNull, el, attrs, parent_tag, aliases, diags),
        "isEmpty" => convert_guard(out, Guard::Empty, el, attrs, parent_tag, aliases, diags),
        "isNull" => convert_guard(out, Guard::Null, el, attrs, parent_tag, aliases, diags),
        "isEqual" => convert_guard(out, Guard::Equal, el, attrs, parent_tag, aliases, diags),
        "isNotEqual" => convert_guard(out, Guard::NotEqual, el, attrs, parent_tag, aliases, diags),
        "iterate" => out.push(Node::Element(convert_iterate(el, attrs, aliases, diags))),
        "dynamic" => out.push(Node::Element(convert_dynamic(el, attrs, aliases, diags))),
        "include" => out.push(Node::Element(passthrough(el, attrs, aliases, diags))),
        other => {
            diags.warn(format!("unknown tag <{other}> was copied as-is"));
            out.push(Node::Element(passthrough(el, attrs, aliases, diags)));
        }
    }
}

fn passthrough(
    el: &Element,
    attrs: Vec<Attr>,
    aliases: &TypeAliasRegistry,
    diags: &mut Diagnostics,
) -> Element {
    Element {
        name: el.name.clone(),
        attrs,
        children: rewrite_children(&el.children, &el.name, aliases, diags),
    }
}

/// Normalizes line endings to `\n`, trims, and rejects blank runs.
fn normalize_text(raw: &str) -> Option<String> {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn convert_select_key(
    el: &Element,
    attrs: Vec<Attr>,
    aliases: &TypeAliasRegistry,
    diags: &mut Diagnostics,
) -> Element {
    let mut out = Element::new("selectKey");
    for attr in attrs {
        match attr.name.as_str() {
            // The alias filter already renamed resultClass; MyBatis wants
            // the short lower-case alias for primitives like java.lang.Long.
            "resultType" => {
                let value = attr.value.trim();
                let value = value.strip_prefix("java.lang.").unwrap_or(value);
                out.attrs.push(Attr::new("resultType", value.to_ascii_lowercase()));
            }
            "type" => {
                let order = if attr.value.trim() == "post" { "AFTER" } else { "BEFORE" };
                out.attrs.push(Attr::new("order", order));
            }
            _ => out.attrs.push(Attr::new(attr.name, attr.value.trim().to_string())),
        }
    }
    out.children = rewrite_children(&el.children, "selectKey", aliases, diags);
    out
}

#[derive(Debug, Clone, Copy)]
enum Guard {
    NotEmpty,
    NotNull,
    Empty,
    Null,
    Equal,
    NotEqual,
}

fn convert_guard(
    out: &mut Vec<Node>,
    guard: Guard,
    el: &Element,
    mut attrs: Vec<Attr>,
    parent_tag: &str,
    aliases: &TypeAliasRegistry,
    diags: &mut Diagnostics,
) {
    let prepend = take_attr(&mut attrs, "prepend");
    let Some(property) = take_attr(&mut attrs, "property") else {
        // Nothing to test against: splice the children straight into the
        // parent and keep the connective as plain text.
        diags.warn(format!("<{}> without `property` was unwrapped", el.name));
        if let Some(prepend) = &prepend {
            let prepend = prepend.trim();
            if !prepend.is_empty() {
                out.push(Node::text(prepend));
            }
        }
        out.extend(rewrite_children(&el.children, parent_tag, aliases, diags));
        return;
    };

    let test = guard_test(guard, property.trim(), &mut attrs, diags);
    let mut if_el = Element::new("if");
    if_el.set_attr("test", test);
    if_el.attrs.extend(attrs);

    let mut children = rewrite_children(&el.children, "if", aliases, diags);
    if let Some(prepend) = prepend {
        apply_prepend(&mut children, prepend.trim(), parent_tag);
    }
    if_el.children = children;
    out.push(Node::Element(if_el));
}

fn guard_test(guard: Guard, property: &str, attrs: &mut Vec<Attr>, diags: &mut Diagnostics) -> String {
    match guard {
        Guard::NotEmpty => format!("{property} != null and {property} != ''"),
        Guard::NotNull => format!("{property} != null"),
        Guard::Empty => format!("{property} == null or {property} == ''"),
        Guard::Null => format!("{property} == null"),
        Guard::Equal | Guard::NotEqual => {
            let compare = take_attr(attrs, "compareValue").unwrap_or_else(|| {
                diags.warn(format!("comparison guard on `{property}` has no `compareValue`"));
                String::new()
            });
            let op = if matches!(guard, Guard::Equal) { "==" } else { "!=" };
            format!("{property} {op} {}", quote_compare(compare.trim()))
        }
    }
}

/// Booleans and integers compare unquoted; everything else, floats
/// included, is quoted like a string literal.
fn quote_compare(value: &str) -> String {
    if value == "true" || value == "false" || value.parse::<i64>().is_ok() {
        value.to_string()
    } else {
        format!("'{value}'")
    }
}

/// The captured `prepend` connective lands on the first rendered text
/// child. `<set>` only supports trailing separators, so there it becomes a
/// suffix; everywhere else it is a prefix with surrounding spaces.
fn apply_prepend(children: &mut [Node], prepend: &str, parent_tag: &str) {
    if prepend.is_empty() {
        return;
    }
    if let Some(Node::Text(text)) = children.first_mut() {
        *text = if parent_tag == "set" {
            format!("{text}{prepend}")
        } else {
            format!(" {prepend} {text}")
        };
    }
}

fn convert_iterate(
    el: &Element,
    mut attrs: Vec<Attr>,
    aliases: &TypeAliasRegistry,
    diags: &mut Diagnostics,
) -> Element {
    let mut collection = take_attr(&mut attrs, "property").map(|p| p.trim().to_string());
    let conjunction = take_attr(&mut attrs, "conjunction");
    let open = take_attr(&mut attrs, "open");
    let close = take_attr(&mut attrs, "close");
    for dropped in &attrs {
        diags.warn(format!(
            "<iterate> attribute `{}` has no equivalent and was dropped",
            dropped.name
        ));
    }

    if collection.is_none() {
        collection = recover_collection(&el.children);
        if let Some(found) = &collection {
            log::debug!("recovered iterate collection `{found}` from body text");
        }
    }

    let mut fe = Element::new("foreach");
    if let Some(collection) = &collection {
        fe.set_attr("collection", collection.clone());
    } else {
        diags.warn("<iterate> collection could not be determined");
    }
    fe.set_attr("item", LOOP_ITEM);
    if let Some(open) = open {
        fe.set_attr("open", open);
    }
    if let Some(conjunction) = conjunction {
        fe.set_attr("separator", conjunction);
    }
    if let Some(close) = close {
        fe.set_attr("close", close);
    }

    let mut children = rewrite_children(&el.children, "foreach", aliases, diags);
    if let Some(collection) = &collection {
        replace_in_text(&mut children, &format!("{collection}[]"), LOOP_ITEM);
    }
    fe.children = children;
    fe
}

/// Looks for a `#name[]` token in the body text when `<iterate>` carries
/// no `property` attribute.
fn recover_collection(children: &[Node]) -> Option<String> {
    for child in children {
        match child {
            Node::Text(text) => {
                if let Some(caps) = ITERATE_COLLECTION.captures(text) {
                    return Some(caps[1].to_string());
                }
            }
            Node::Element(el) => {
                if let Some(found) = recover_collection(&el.children) {
                    return Some(found);
                }
            }
        }
    }
    None
}

fn replace_in_text(children: &mut [Node], from: &str, to: &str) {
    for child in children {
        match child {
            Node::Text(text) => {
                if text.contains(from) {
                    *text = text.replace(from, to);
                }
            }
            Node::Element(el) => replace_in_text(&mut el.children, from, to),
        }
    }
}

fn convert_dynamic(
    el: &Element,
    mut attrs: Vec<Attr>,
    aliases: &TypeAliasRegistry,
    diags: &mut Diagnostics,
) -> Element {
    let prepend = take_attr(&mut attrs, "prepend");
    let prepend = prepend.as_deref().map(str::trim).unwrap_or("");
    for dropped in &attrs {
        diags.warn(format!(
            "<dynamic> attribute `{}` has no equivalent and was dropped",
            dropped.name
        ));
    }

    let mut node = match prepend {
        "where" => Element::new("where"),
        "set" => Element::new("set"),
        _ => {
            let mut trim = Element::new("trim");
            if !prepend.is_empty() {
                trim.set_attr("prefix", prepend);
            }
            // When every guarded child opens with the same connective, lift
            // the first one into prefixOverrides so trim strips it.
            if let Some(Node::Element(first)) = el.children.first() {
                if let Some(child_prepend) = first.attr("prepend") {
                    trim.set_attr("prefixOverrides", child_prepend.trim());
                }
            }
            trim
        }
    };
    let tag = node.name.clone();
    node.children = rewrite_children(&el.children, &tag, aliases, diags);
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn convert(el: &Element) -> (Element, Diagnostics) {
        let mut diags = Diagnostics::default();
        let out = convert_statement(el, &TypeAliasRegistry::default(), &mut diags);
        (out, diags)
    }

    fn guard(name: &str, attrs: &[(&str, &str)], body: &str) -> Element {
        let mut el = Element::new(name);
        for (k, v) in attrs {
            el.set_attr(k, *v);
        }
        el.push(Node::text(body));
        el
    }

    fn only_element(parent: &Element) -> &Element {
        assert_eq!(parent.children.len(), 1);
        let Node::Element(el) = &parent.children[0] else {
            panic!("expected element child");
        };
        el
    }

    #[test]
    fn not_empty_guard_desugars_to_if() {
        let mut select = Element::new("select");
        select.set_attr("id", "find");
        select.push(Node::Element(guard(
            "isNotEmpty",
            &[("property", "name")],
            "NAME = #name#",
        )));

        let (out, _) = convert(&select);
        let if_el = only_element(&out);
        assert_eq!(if_el.name, "if");
        assert_eq!(if_el.attr("test"), Some("name != null and name != ''"));
        assert_eq!(if_el.children, vec![Node::text("NAME = #{name}")]);
    }

    #[test]
    fn guard_prepend_prefixes_inside_where() {
        let mut dynamic = Element::new("dynamic");
        dynamic.set_attr("prepend", "where");
        dynamic.push(Node::Element(guard(
            "isNotEmpty",
            &[("property", "name"), ("prepend", "AND")],
            "NAME = #name#",
        )));
        let mut select = Element::new("select");
        select.push(Node::Element(dynamic));

        let (out, _) = convert(&select);
        let where_el = only_element(&out);
        assert_eq!(where_el.name, "where");
        assert!(where_el.attrs.is_empty());
        let if_el = only_element(where_el);
        assert_eq!(if_el.children, vec![Node::text(" AND NAME = #{name}")]);
    }

    #[test]
    fn guard_prepend_becomes_suffix_inside_set() {
        let mut dynamic = Element::new("dynamic");
        dynamic.set_attr("prepend", "set");
        dynamic.push(Node::Element(guard(
            "isNotNull",
            &[("property", "name"), ("prepend", ",")],
            "NAME = #name#",
        )));
        let mut update = Element::new("update");
        update.push(Node::Element(dynamic));

        let (out, _) = convert(&update);
        let set_el = only_element(&out);
        assert_eq!(set_el.name, "set");
        let if_el = only_element(set_el);
        assert_eq!(if_el.children, vec![Node::text("NAME = #{name},")]);
    }

    #[test]
    fn guard_without_property_is_unwrapped() {
        let mut select = Element::new("select");
        select.push(Node::Element(guard(
            "isNotNull",
            &[("prepend", "AND")],
            "STATUS = 1",
        )));

        let (out, diags) = convert(&select);
        assert_eq!(
            out.children,
            vec![Node::text("AND"), Node::text("STATUS = 1")]
        );
        assert!(!diags.is_empty());
    }

    #[test]
    fn equal_guard_quotes_non_literal_compare_values() {
        let mut select = Element::new("select");
        select.push(Node::Element(guard(
            "isEqual",
            &[("property", "status"), ("compareValue", "ACTIVE")],
            "STATUS = 1",
        )));
        select.push(Node::Element(guard(
            "isEqual",
            &[("property", "flag"), ("compareValue", "true")],
            "FLAG = 1",
        )));
        select.push(Node::Element(guard(
            "isNotEqual",
            &[("property", "kind"), ("compareValue", "7")],
            "KIND = 1",
        )));

        let (out, _) = convert(&select);
        let tests: Vec<_> = out
            .children
            .iter()
            .map(|c| {
                let Node::Element(el) = c else { panic!("expected element") };
                el.attr("test").unwrap().to_string()
            })
            .collect();
        assert_eq!(
            tests,
            vec!["status == 'ACTIVE'", "flag == true", "kind != 7"]
        );
    }

    #[test]
    fn iterate_recovers_collection_from_body() {
        let mut iterate = Element::new("iterate");
        iterate.set_attr("open", "(");
        iterate.set_attr("close", ")");
        iterate.set_attr("conjunction", ",");
        iterate.push(Node::text("#list[]#"));
        let mut select = Element::new("select");
        select.push(Node::Element(iterate));

        let (out, _) = convert(&select);
        let fe = only_element(&out);
        assert_eq!(fe.name, "foreach");
        assert_eq!(fe.attr("collection"), Some("list"));
        assert_eq!(fe.attr("item"), Some("item"));
        assert_eq!(fe.attr("separator"), Some(","));
        assert_eq!(fe.children, vec![Node::text("#{item}")]);
    }

    #[test]
    fn select_key_attrs_are_renamed() {
        let mut key = Element::new("selectKey");
        key.set_attr("resultClass", "java.lang.Long");
        key.set_attr("keyProperty", "id");
        key.set_attr("type", "post");
        key.push(Node::text("SELECT LAST_INSERT_ID()"));
        let mut insert = Element::new("insert");
        insert.push(Node::Element(key));

        let (out, _) = convert(&insert);
        let key_el = only_element(&out);
        assert_eq!(key_el.attr("resultType"), Some("long"));
        assert_eq!(key_el.attr("keyProperty"), Some("id"));
        assert_eq!(key_el.attr("order"), Some("AFTER"));
        assert_eq!(key_el.attr("type"), None);
    }

    #[test]
    fn dynamic_with_other_prepend_becomes_trim() {
        let mut dynamic = Element::new("dynamic");
        dynamic.set_attr("prepend", "VALUES");
        dynamic.push(Node::Element(guard(
            "isNotNull",
            &[("property", "a"), ("prepend", ",")],
            "#a#",
        )));
        let mut insert = Element::new("insert");
        insert.push(Node::Element(dynamic));

        let (out, _) = convert(&insert);
        let trim_el = only_element(&out);
        assert_eq!(trim_el.name, "trim");
        assert_eq!(trim_el.attr("prefix"), Some("VALUES"));
        assert_eq!(trim_el.attr("prefixOverrides"), Some(","));
    }

    #[test]
    fn unknown_tag_passes_through_with_diagnostic() {
        let mut odd = Element::new("oddTag");
        odd.set_attr("keep", "me");
        odd.push(Node::text("BODY"));
        let mut select = Element::new("select");
        select.push(Node::Element(odd));

        let (out, diags) = convert(&select);
        let copied = only_element(&out);
        assert_eq!(copied.name, "oddTag");
        assert_eq!(copied.attr("keep"), Some("me"));
        assert_eq!(copied.children, vec![Node::text("BODY")]);
        assert_eq!(diags.entries().len(), 1);
    }

    #[test]
    fn windows_line_endings_are_normalized() {
        let mut select = Element::new("select");
        select.push(Node::Text("SELECT 1\r\nFROM DUAL".to_string()));
        let (out, _) = convert(&select);
        assert_eq!(out.children, vec![Node::text("SELECT 1\nFROM DUAL")]);
    }
}
