//! Live search query construction

use pricematch_core::AttributeSet;

/// Longest query sent to a shopping search
pub const MAX_QUERY_CHARS: usize = 100;

const GENERIC_COLORS: &[&str] = &["black", "white", "clear", "transparent"];
const GENERIC_MATERIALS: &[&str] = &["plastic", "metal"];
const GENERIC_STYLES: &[&str] = &["standard", "regular", "basic"];
const GENERIC_FEATURES: &[&str] = &["durable", "quality", "good"];

/// Shopping query from the most distinctive attributes.
///
/// Product type and brand always go in. Color, material and style are
/// skipped when they are too common to narrow a search. At most two key
/// features are added, ignoring short or generic ones.
pub fn build_search_query(attrs: &AttributeSet) -> String {
    let mut parts: Vec<&str> = vec![attrs.product_type()];
    parts.extend(attrs.brand());
    parts.extend(attrs.color().filter(|c| !is_generic(c, GENERIC_COLORS)));
    parts.extend(attrs.size());
    parts.extend(attrs.material().filter(|m| !is_generic(m, GENERIC_MATERIALS)));
    parts.extend(attrs.style().filter(|s| !is_generic(s, GENERIC_STYLES)));
    parts.extend(
        attrs
            .key_features()
            .iter()
            .take(2)
            .map(String::as_str)
            .filter(|f| f.chars().count() > 3 && !is_generic(f, GENERIC_FEATURES)),
    );

    let query = parts
        .iter()
        .flat_map(|p| p.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");
    truncate_on_word(query, MAX_QUERY_CHARS)
}

fn is_generic(value: &str, generic: &[&str]) -> bool {
    let value = value.trim().to_lowercase();
    generic.iter().any(|g| *g == value)
}

/// Cut to `max_chars` and drop the trailing partial word
fn truncate_on_word(query: String, max_chars: usize) -> String {
    let Some((cut, _)) = query.char_indices().nth(max_chars) else {
        return query;
    };
    let head = &query[..cut];
    match head.rfind(' ') {
        Some(space) => head[..space].to_string(),
        None => head.to_string(),
    }
}
