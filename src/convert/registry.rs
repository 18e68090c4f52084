use std::collections::HashMap;

use super::diag::Diagnostics;
use super::model::{Attr, Element};

/// Attribute keys whose value may be a declared type alias.
const ALIASABLE: [&str; 4] = ["class", "resultClass", "parameterClass", "javaType"];

/// Source-dialect type-bearing keys and their MyBatis names. Renaming runs
/// after alias resolution, and the renamed keys are never in [`ALIASABLE`],
/// which is what makes the whole filter idempotent.
const RENAMES: [(&str, &str); 3] = [
    ("class", "type"),
    ("resultClass", "resultType"),
    ("parameterClass", "parameterType"),
];

/// Document-scoped alias table built from `<typeAlias>` declarations.
///
/// The table is filled in document order and consulted by everything that
/// follows, so an alias declared after its first use does not apply
/// retroactively. Later duplicate declarations silently overwrite.
#[derive(Debug, Default)]
pub struct TypeAliasRegistry {
    aliases: HashMap<String, String>,
}

impl TypeAliasRegistry {
    pub fn register(&mut self, alias: impl Into<String>, full_type: impl Into<String>) {
        self.aliases.insert(alias.into(), full_type.into());
    }

    pub fn register_from(&mut self, el: &Element, diags: &mut Diagnostics) {
        match (el.attr("alias"), el.attr("type")) {
            (Some(alias), Some(full_type)) => {
                log::debug!("type alias {} -> {}", alias.trim(), full_type.trim());
                self.register(alias.trim(), full_type.trim());
            }
            _ => diags.warn("<typeAlias> is missing `alias` or `type` and was ignored"),
        }
    }

    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }
}

/// The attribute alias filter: resolves aliasable values against the
/// registry, then renames the type-bearing keys to their MyBatis spelling.
pub fn filter_attrs(attrs: &[Attr], aliases: &TypeAliasRegistry) -> Vec<Attr> {
    attrs
        .iter()
        .map(|attr| {
            let mut value = attr.value.clone();
            if ALIASABLE.contains(&attr.name.as_str()) {
                let trimmed = value.trim();
                value = match aliases.resolve(trimmed) {
                    Some(full) => full.to_string(),
                    None => trimmed.to_string(),
                };
            }
            let name = RENAMES
                .iter()
                .find(|(from, _)| *from == attr.name)
                .map(|(_, to)| (*to).to_string())
                .unwrap_or_else(|| attr.name.clone());
            Attr { name, value }
        })
        .collect()
}
