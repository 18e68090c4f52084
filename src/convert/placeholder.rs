use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    // #name#, #name.sub#, #name:JDBCTYPE#. The name segment admits [] so
    // iterate bodies like #list[]# survive until the loop variable rewrite.
    static ref HASH_TOKEN: Regex =
        Regex::new(r"#([A-Za-z_][\w\[\]]*(?:\.[A-Za-z_][\w\[\]]*)*)(?::([\w.]+))?#").unwrap();
    static ref DOLLAR_TOKEN: Regex =
        Regex::new(r"\$([A-Za-z_][\w\[\]]*(?:\.[A-Za-z_][\w\[\]]*)*)(?::([\w.]+))?\$").unwrap();
}

/// Rewrites legacy bind tokens to MyBatis `#{...}` tokens.
///
/// Both the escaped (`#...#`) and raw (`$...$`) forms collapse to the same
/// target token; the raw-vs-escaped distinction does not survive the
/// conversion. Dotted sub-properties are kept verbatim and a `:jdbcType`
/// suffix becomes `,jdbcType=`. `replace_all` walks the input once, so
/// substituted output is never re-scanned.
pub fn rewrite_placeholders(text: &str) -> String {
    let pass = HASH_TOKEN.replace_all(text, |caps: &Captures| format_token(caps));
    DOLLAR_TOKEN
        .replace_all(&pass, |caps: &Captures| format_token(caps))
        .into_owned()
}

fn format_token(caps: &Captures) -> String {
    match caps.get(2) {
        Some(jdbc) => format!("#{{{},jdbcType={}}}", &caps[1], jdbc.as_str()),
        None => format!("#{{{}}}", &caps[1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn typed_token_carries_jdbc_type() {
        assert_eq!(rewrite_placeholders("#id:INTEGER#"), "#{id,jdbcType=INTEGER}");
    }

    #[test]
    fn raw_token_loses_the_distinction() {
        assert_eq!(rewrite_placeholders("$orderBy$"), "#{orderBy}");
    }

    #[test]
    fn dotted_sub_property_is_kept_verbatim() {
        assert_eq!(rewrite_placeholders("#account.id#"), "#{account.id}");
    }

    #[test]
    fn several_tokens_on_one_line() {
        assert_eq!(
            rewrite_placeholders("WHERE ID = #id# AND NAME = #name:VARCHAR# OR X = $x$"),
            "WHERE ID = #{id} AND NAME = #{name,jdbcType=VARCHAR} OR X = #{x}"
        );
    }

    #[test]
    fn adjacent_tokens_do_not_share_sigils() {
        assert_eq!(rewrite_placeholders("#a#=#b#"), "#{a}=#{b}");
    }

    #[test]
    fn iterate_subscript_names_match() {
        assert_eq!(rewrite_placeholders("#list[]#"), "#{list[]}");
    }

    #[test]
    fn non_token_text_is_untouched(){
        assert_eq!(rewrite_placeholders("SELECT 1 # comment"), "SELECT 1 # comment");
        assert_eq!(rewrite_placeholders("PRICE > 100"), "PRICE > 100");
    }
}
