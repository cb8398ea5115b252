//! Given-name normalization
//!
//! Upstream sources deliver given names in wildly different shapes: spelled-out
//! names (`"John"`), bare initial runs (`"CS"`), and mixtures with lowercase
//! particles (`"von Bartheld CS"`). This module normalizes them into properly
//! spaced and punctuated initials so the CSL renderer receives consistent
//! input.

/// Normalize a given-name string into spaced, punctuated initials
///
/// Tokens are processed left to right:
///
/// 1. A token starting with a lowercase letter (a mid-name particle such as
///    `"von"`) is preserved verbatim.
/// 2. A token made up entirely of uppercase letters is expanded into initials
///    (`"CS"` becomes `"C. S."`). The first time this happens, and only when a
///    token was already emitted, a comma is appended to the preceding token to
///    mark the boundary between the spelled-out name and the trailing
///    initials. The comma is inserted at most once per call.
/// 3. Every other token (mixed case, or already-punctuated initials) is
///    preserved verbatim.
///
/// # Examples
///
/// ```
/// use citegen::name::format_given_name;
///
/// assert_eq!(format_given_name("Bartheld CS"), "Bartheld, C. S.");
/// assert_eq!(format_given_name("von Bartheld CS"), "von Bartheld, C. S.");
/// assert_eq!(format_given_name("AV"), "A. V.");
/// assert_eq!(format_given_name("John Paul GP"), "John Paul, G. P.");
/// ```
pub fn format_given_name(given: &str) -> String {
    let mut processed: Vec<String> = Vec::new();
    let mut comma_inserted = false;

    for token in given.split_whitespace() {
        let Some(first) = token.chars().next() else {
            continue;
        };

        if first.is_lowercase() {
            processed.push(token.to_string());
        } else if is_initials_run(token) {
            if !comma_inserted {
                if let Some(last) = processed.last_mut() {
                    last.push(',');
                    comma_inserted = true;
                }
            }
            processed.push(expand_initials(token));
        } else {
            processed.push(token.to_string());
        }
    }

    processed.join(" ")
}

/// A run of bare initials is entirely uppercase and entirely alphabetic
fn is_initials_run(token: &str) -> bool {
    !token.is_empty()
        && token
            .chars()
            .all(|c| c.is_alphabetic() && c.is_uppercase())
}

/// Expand `"CS"` into `"C. S."`
fn expand_initials(token: &str) -> String {
    let letters: Vec<String> = token.chars().map(|c| c.to_string()).collect();
    format!("{}.", letters.join(". "))
}
