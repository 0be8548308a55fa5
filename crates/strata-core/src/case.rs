//! Field-name projection to lower camel case.
//!
//! Record fields are stored under their lower-camel-case name, so `display_name`,
//! `DisplayName` and `display-name` all address the key `displayName`.

/// Whole-name exceptions: a name found here is replaced before conversion and
/// its consecutive capitals are kept as written in the replacement.
pub const ACRONYMS: &[(&str, &str)] = &[
    ("ID", "id"),
    ("URL", "url"),
    ("URI", "uri"),
    ("API", "api"),
    ("TLS", "tls"),
];

/// Converts a field name to lowerCamelCase using [`ACRONYMS`].
pub fn to_lower_camel(name: &str) -> String {
    to_lower_camel_with(name, ACRONYMS)
}

/// Converts a field name to lowerCamelCase with a caller-supplied exception table.
///
/// Separators (`_`, `-`, `.`, space) are dropped and capitalize the next
/// letter, a digit capitalizes the letter after it, and runs of capitals are
/// folded to lowercase unless the name came from the exception table.
pub fn to_lower_camel_with(name: &str, acronyms: &[(&str, &str)]) -> String {
    let mut name = name.trim();
    if name.is_empty() {
        return String::new();
    }

    let replacement = acronyms.iter().find(|(from, _)| *from == name).map(|(_, to)| *to);
    let has_acronym = replacement.is_some();
    if let Some(to) = replacement {
        name = to;
    }

    let mut out = String::with_capacity(name.len());
    let mut cap_next = false;
    let mut prev_is_cap = false;

    for (i, c) in name.chars().enumerate() {
        let is_cap = c.is_ascii_uppercase();
        let is_low = c.is_ascii_lowercase();

        let c = if cap_next {
            c.to_ascii_uppercase()
        } else if i == 0 || (prev_is_cap && is_cap && !has_acronym) {
            c.to_ascii_lowercase()
        } else {
            c
        };
        prev_is_cap = is_cap;

        if is_cap || is_low {
            out.push(c);
            cap_next = false;
        } else if c.is_ascii_digit() {
            out.push(c);
            cap_next = true;
        } else if c.is_alphanumeric() {
            out.push(c);
            cap_next = false;
        } else {
            cap_next = matches!(c, '_' | ' ' | '-' | '.');
        }
    }
    out
}
