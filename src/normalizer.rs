use crate::model::Row;

/// Lowercases a header and strips spaces and underscores, so that
/// `"Other counties"`, `"other_counties"` and `"OTHERCOUNTIES"` compare equal.
pub fn normalize_field_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ' ' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Resolves a requested field name against the available headers.
/// An exact match wins; otherwise the first header whose normalized form
/// equals the normalized request is returned.
pub fn resolve_field<'a>(requested: &str, candidates: &'a [String]) -> Option<&'a str> {
    if let Some(exact) = candidates.iter().find(|c| c.as_str() == requested) {
        return Some(exact.as_str());
    }

    let wanted = normalize_field_name(requested);
    candidates
        .iter()
        .find(|c| normalize_field_name(c) == wanted)
        .map(String::as_str)
}

/// Union of the field names of all rows, in first-seen order.
pub fn collect_field_names(rows: &[Row]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for row in rows {
        for name in row.field_names() {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
    }
    names
}
