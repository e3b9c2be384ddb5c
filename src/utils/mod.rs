// src/utils/mod.rs

//! Utility functions and helpers.

pub mod http;
pub mod report;

/// Host without a leading `www.`.
pub fn bare_host(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Guess a business name from a hostname.
///
/// `www.chez-paul.fr` becomes `Chez Paul`.
pub fn business_name_from_host(host: &str) -> String {
    let host = bare_host(host);
    let stem = [".com", ".fr", ".org", ".net"]
        .iter()
        .find_map(|tld| host.strip_suffix(tld))
        .unwrap_or(host);

    stem.split('-')
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_name_from_host() {
        assert_eq!(business_name_from_host("www.chez-paul.fr"), "Chez Paul");
        assert_eq!(business_name_from_host("garage-du-centre.com"), "Garage Du Centre");
        assert_eq!(business_name_from_host("ecole.paris"), "Ecole.paris");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  12 rue\n  du Port "), "12 rue du Port");
    }
}
