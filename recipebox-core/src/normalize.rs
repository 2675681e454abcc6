//! Ingredient name normalization for shopping list grouping.

/// Canonical grouping key: trimmed, whitespace runs collapsed, lowercased.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Display form of a canonical key: first letter of each word uppercased.
pub fn display_name(key: &str) -> String {
    key.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
