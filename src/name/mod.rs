//! Author-name parsing
//!
//! Upstream sources return author names as loosely structured strings whose
//! token order depends on the source: PubMed lists the family name first
//! (`"von Bartheld CS"`), while arXiv and bioRxiv list it last
//! (`"Christopher S. von Bartheld"`). This module classifies the tokens of
//! such a string into a structured [`PersonName`] with the family name, a
//! normalized given-name string, and an optional non-dropping particle.
//!
//! The scan rules are best-effort heuristics: names with several capitalized
//! particles or compound family names are inherently ambiguous, and no
//! semantics beyond the documented token rules are guessed.

pub mod given;

pub use given::format_given_name;

use serde::{Deserialize, Serialize};

/// A structured, CSL-shaped personal name
///
/// `family` is non-empty whenever it is derivable from the raw string.
/// `given` is either empty or a string already normalized by
/// [`format_given_name`]. Created once per parsed author and immutable
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    /// Family name (surname)
    pub family: String,
    /// Formatted given name or initials; empty when unknown
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub given: String,
    /// Name prefix that always renders attached to the family name
    /// (e.g. "von", "van")
    #[serde(
        rename = "non-dropping-particle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub non_dropping_particle: Option<String>,
}

/// Token order of a raw author-name string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameOrder {
    /// `"Family Given"`, optionally with a leading particle (PubMed)
    FamilyFirst,
    /// `"Given Family"`, with the particle immediately preceding the family
    /// name (arXiv, bioRxiv)
    FamilyLast,
}

/// Parse one raw author-name string into a [`PersonName`]
///
/// Returns `None` for empty or whitespace-only input. A single-token name
/// yields a family name with an empty given name.
///
/// # Examples
///
/// ```
/// use citegen::name::{parse_author, NameOrder};
///
/// let name = parse_author("von Bartheld CS", NameOrder::FamilyFirst).unwrap();
/// assert_eq!(name.family, "Bartheld");
/// assert_eq!(name.given, "C. S.");
/// assert_eq!(name.non_dropping_particle.as_deref(), Some("von"));
///
/// let name = parse_author("John von Neumann", NameOrder::FamilyLast).unwrap();
/// assert_eq!(name.family, "Neumann");
/// assert_eq!(name.given, "John");
/// assert_eq!(name.non_dropping_particle.as_deref(), Some("von"));
/// ```
pub fn parse_author(raw: &str, order: NameOrder) -> Option<PersonName> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }
    if tokens.len() == 1 {
        return Some(PersonName {
            family: tokens[0].to_string(),
            given: String::new(),
            non_dropping_particle: None,
        });
    }

    let name = match order {
        NameOrder::FamilyFirst => parse_family_first(&tokens),
        NameOrder::FamilyLast => parse_family_last(&tokens),
    };
    Some(name)
}

/// PubMed shape: scan left to right for the first uppercase-starting token,
/// which is the family name. All-lowercase tokens before it form a
/// non-dropping particle; everything after it is the given-name string.
fn parse_family_first(tokens: &[&str]) -> PersonName {
    for (i, token) in tokens.iter().enumerate() {
        if starts_uppercase(token) {
            let non_dropping_particle = if i > 0 {
                Some(tokens[..i].join(" "))
            } else {
                None
            };
            let given = format_given_name(&tokens[i + 1..].join(" "));
            return PersonName {
                family: token.to_string(),
                given,
                non_dropping_particle,
            };
        }
    }

    // Defensive fallback: no uppercase-starting token at all. Treat the first
    // token as the family name.
    PersonName {
        family: tokens[0].to_string(),
        given: format_given_name(&tokens[1..].join(" ")),
        non_dropping_particle: None,
    }
}

/// arXiv/bioRxiv shape: the last token is always part of the family name.
/// The family span extends leftward over directly preceding lowercase-starting
/// tokens; those extra tokens become a non-dropping particle.
fn parse_family_last(tokens: &[&str]) -> PersonName {
    let mut family_start = tokens.len() - 1;
    while family_start > 0 && starts_lowercase(tokens[family_start - 1]) {
        family_start -= 1;
    }

    let family_span = &tokens[family_start..];
    let given = format_given_name(&tokens[..family_start].join(" "));

    if family_span.len() > 1 && starts_lowercase(family_span[0]) {
        PersonName {
            family: family_span[family_span.len() - 1].to_string(),
            given,
            non_dropping_particle: Some(family_span[..family_span.len() - 1].join(" ")),
        }
    } else {
        PersonName {
            family: family_span.join(" "),
            given,
            non_dropping_particle: None,
        }
    }
}

fn starts_uppercase(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_uppercase())
}

fn starts_lowercase(token: &str) -> bool {
    token.chars().next().is_some_and(|c| c.is_lowercase())
}
