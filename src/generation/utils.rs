//! Identifier transformation utilities for code generation
//!
//! Every identifier that ends up in the model goes through these helpers, so
//! the same input always yields the same name.

use std::collections::HashSet;
use std::hash::Hash;

/// Converts a string to snake_case.
///
/// Handles camelCase, PascalCase, kebab-case, acronyms and space-separated
/// input. Any character that is not alphanumeric acts as a word separator.
///
/// # Examples
/// ```
/// use sdkgen::generation::utils::to_snake_case;
///
/// assert_eq!(to_snake_case("findPetsByStatus"), "find_pets_by_status");
/// assert_eq!(to_snake_case("HTTPResponse"), "http_response");
/// assert_eq!(to_snake_case("find-pets-by-status"), "find_pets_by_status");
/// ```
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            // word boundary: aB, 1B, or the last capital of an acronym (HTTPResponse)
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else if ch.is_alphanumeric() {
            result.push(ch);
        } else if !result.is_empty() && !result.ends_with('_') {
            result.push('_');
        }
    }

    result.trim_matches('_').to_string()
}

/// Converts a string to UpperCamelCase (PascalCase) for type names.
///
/// # Examples
/// ```
/// use sdkgen::generation::utils::to_proper_case;
///
/// assert_eq!(to_proper_case("find_pets_by_status"), "FindPetsByStatus");
/// assert_eq!(to_proper_case("listPets"), "ListPets");
/// assert_eq!(to_proper_case("in-progress"), "InProgress");
/// ```
pub fn to_proper_case(s: &str) -> String {
    to_snake_case(s)
        .split('_')
        .filter(|s| !s.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            }
        })
        .collect()
}

/// Converts a string to lowerCamelCase for argument names.
///
/// # Examples
/// ```
/// use sdkgen::generation::utils::to_camel_case;
///
/// assert_eq!(to_camel_case("user_id"), "userId");
/// assert_eq!(to_camel_case("OrderID"), "orderId");
/// ```
pub fn to_camel_case(s: &str) -> String {
    let pascal = to_proper_case(s);
    let mut chars = pascal.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
    }
}

/// Singular form of a (proper-cased) name.
///
/// Only the trailing word is affected, so `PetCategories` becomes
/// `PetCategory`. Words ending in `ss`, `us` or `is` are left alone.
pub fn make_singular(name: &str) -> String {
    if let Some(stem) = name.strip_suffix("ies") {
        if !stem.is_empty() {
            return format!("{stem}y");
        }
    }
    for suffix in ["sses", "xes", "ches", "shes", "zzes"] {
        if name.ends_with(suffix) {
            return name[..name.len() - 2].to_string();
        }
    }
    if name.ends_with("ss") || name.ends_with("us") || name.ends_with("is") {
        return name.to_string();
    }
    match name.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => name.to_string(),
    }
}

/// Splits off a leading `+`, `-`, `@` or `$`, which case conversion would
/// otherwise drop, and returns the word it spells out with the remainder.
pub fn split_reserved_prefix(s: &str) -> (&'static str, &str) {
    if let Some(rest) = s.strip_prefix('+') {
        ("Plus", rest)
    } else if let Some(rest) = s.strip_prefix('-') {
        ("Minus", rest)
    } else if let Some(rest) = s.strip_prefix('@') {
        ("At", rest)
    } else if let Some(rest) = s.strip_prefix('$') {
        ("", rest)
    } else {
        ("", s)
    }
}

/// Exported identifier for a struct field or enum literal
///
/// Always starts with a letter: names that would start with a digit are
/// prefixed with `N`, and names with no usable characters become `Value`.
pub fn to_identifier(raw: &str) -> String {
    let (prefix, rest) = split_reserved_prefix(raw);
    let name = format!("{prefix}{}", to_proper_case(rest));
    match name.chars().next() {
        None => "Value".to_string(),
        Some(first) if first.is_ascii_digit() => format!("N{name}"),
        Some(_) => name,
    }
}

/// ASCII letter or underscore first, then letters, digits and underscores
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Keeps the first item for every key, preserving order
pub fn unique_by<T, K, F>(items: Vec<T>, mut key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: FnMut(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}

/// Hands out unique names, suffixing repeats with `2`, `3`, ...
#[derive(Debug, Default)]
pub struct NameSet {
    taken: HashSet<String>,
}

impl NameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `name`, or the first free suffixed variant of it
    pub fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{name}{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
