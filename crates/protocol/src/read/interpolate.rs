//! Textual `$metadata` substitution.

use std::collections::BTreeMap;

/// Replace every `$key` with its metadata value.
///
/// A reference only matches when the next character cannot continue an
/// identifier, so `$deployment` never rewrites the prefix of
/// `$deployment_name`. Longer keys are tried first and substituted text is
/// never rescanned. Unknown references such as `$step` are left alone.
pub fn interpolate(text: &str, metadata: &BTreeMap<String, String>) -> String {
    let mut keys: Vec<&str> = metadata
        .keys()
        .map(String::as_str)
        .filter(|k| !k.is_empty())
        .collect();
    keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];
        let hit = keys
            .iter()
            .find(|k| after.starts_with(**k) && !after[k.len()..].starts_with(is_ident_char));
        match hit {
            Some(key) => {
                out.push_str(&metadata[*key]);
                rest = &after[key.len()..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}
