//! Citation post-processing
//!
//! CSL engines get several things wrong for this pipeline's purposes: they may
//! truncate the author list without emitting "et al.", they glue their own
//! sequence markers to the entry text, their numbering ignores the requested
//! ordering, and author repair can leave stray periods behind. This module
//! fixes all of that with an ordered sequence of pure string-rewrite passes
//! over the rendered HTML:
//!
//! 1. detect author truncation by comparing record authors against family
//!    names visible in the HTML;
//! 2. normalize any existing "et al" to an italicized `<i>et al.</i>`, or
//!    insert one after the last displayed author when the engine truncated
//!    silently;
//! 3. separate glued numeric markers from the following text with a tab;
//! 4. rewrite the marker to the requested citation number, or strip it
//!    entirely in alphabetical mode (the tab from pass 3 marks the spot);
//! 5. turn the tab into non-breaking spaces so alignment survives HTML;
//! 6. collapse doubled and spaced periods.
//!
//! Later passes depend on markers left by earlier ones, so the order is fixed.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::record::BibliographicRecord;

fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Failed to compile postprocess regex"))
}

/// Run the full post-processing pipeline over one rendered entry
///
/// `citation_number` carries the display number in sequential mode; `None`
/// means alphabetical mode, where the marker is removed instead of rewritten.
pub fn postprocess_entry(
    html: &str,
    record: &BibliographicRecord,
    citation_number: Option<usize>,
) -> String {
    let total = record.author.len();
    let displayed = displayed_author_count(html, record);
    let truncated = total > displayed;

    let mut out = if html.to_lowercase().contains("et al") {
        normalize_existing_et_al(html)
    } else if truncated {
        debug!(
            id = record.id,
            total, displayed, "Renderer truncated author list; inserting et al."
        );
        insert_et_al(html, record, displayed)
    } else {
        html.to_string()
    };

    out = separate_citation_markers(&out);
    out = apply_citation_number(&out, citation_number);
    out = render_tab_separators(&out);
    cleanup_punctuation(&out)
}

/// Count record authors whose family name appears in the rendered HTML
///
/// Simple substring containment, each record author counted at most once.
/// This is knowingly approximate: a short family name can match unrelated
/// text, and diacritic mismatches between fetched and rendered forms can miss.
pub fn displayed_author_count(html: &str, record: &BibliographicRecord) -> usize {
    record
        .author
        .iter()
        .filter(|a| !a.family.is_empty() && html.contains(a.family.as_str()))
        .count()
}

/// Normalize every existing "et al" occurrence to exactly `<i>et al.</i>`
///
/// Handles the period-less form, any capitalization, and occurrences that are
/// already italicized (so the pass never nests markup and is idempotent).
pub fn normalize_existing_et_al(html: &str) -> String {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = cached(&RE, r"(?i)(?:<i>\s*)?\bet al\b\.?(?:\s*</i>)?");
    re.replace_all(html, "<i>et al.</i>").into_owned()
}

/// Insert ` <i>et al.</i>` after the last displayed author
///
/// The insertion point is located via the truncation-boundary author's family
/// name followed by a comma and initial-like tokens. When that pattern cannot
/// be found the fallbacks are, in order: a windowed initials scan after the
/// family name's last occurrence, the first period after that occurrence, and
/// finally the end of the string. With no usable author information at all,
/// the marker is appended at the end.
pub fn insert_et_al(html: &str, record: &BibliographicRecord, displayed_count: usize) -> String {
    let last_author = displayed_count
        .checked_sub(1)
        .and_then(|idx| record.author.get(idx));
    let family = match last_author {
        Some(a) if !a.family.is_empty() && !a.given.is_empty() => a.family.as_str(),
        _ => return append_et_al(html),
    };

    // Initial-like tokens: one leading initial with or without its period,
    // then only period-terminated initials. Requiring the period on the rest
    // keeps the match from swallowing the first capital of the title.
    let pattern = format!(r"{},\s+[A-Z]\.?(?:\s+[A-Z]\.)*", regex::escape(family));
    if let Ok(re) = Regex::new(&pattern) {
        if let Some(m) = re.find_iter(html).last() {
            return insert_at(html, m.end());
        }
    }

    if let Some(family_pos) = html.rfind(family) {
        // The author's rendered form should sit within a short window after
        // the family name; scan only that far.
        let window_end = floor_char_boundary(html, (family_pos + 100).min(html.len()));
        static WINDOW_RE: OnceLock<Regex> = OnceLock::new();
        let re = cached(&WINDOW_RE, r",\s+[A-Z]\.?(?:\s+[A-Z]\.)*");
        if let Some(m) = re.find(&html[family_pos..window_end]) {
            return insert_at(html, family_pos + m.end());
        }

        if let Some(rel) = html[family_pos..].find('.') {
            return insert_at(html, family_pos + rel + 1);
        }
    }

    append_et_al(html)
}

fn insert_at(html: &str, pos: usize) -> String {
    format!("{} <i>et al.</i>{}", &html[..pos], &html[pos..])
}

fn append_et_al(html: &str) -> String {
    format!("{} <i>et al.</i>", html.trim_end())
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    while !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Insert a tab between a numeric sequence marker and directly following text
///
/// Covers the marker shapes CSL engines emit: a bare `N.` glued to a letter
/// (which also covers the line-initial case) and a `csl-left-margin` closing
/// tag glued to a letter. The tab is the landmark the renumbering pass keys on.
pub fn separate_citation_markers(html: &str) -> String {
    static BARE_RE: OnceLock<Regex> = OnceLock::new();
    static MARGIN_RE: OnceLock<Regex> = OnceLock::new();

    let bare = cached(&BARE_RE, r"(\d+\.)([A-Za-z])");
    let margin = cached(&MARGIN_RE, r"(\d+\.</div>)([A-Za-z])");

    let html = bare.replace_all(html, "${1}\t${2}");
    margin.replace_all(&html, "${1}\t${2}").into_owned()
}

/// Rewrite or remove the engine's sequence marker
///
/// With a target number, every recognized marker shape is rewritten to it:
/// the tab-separated form from [`separate_citation_markers`], the
/// `csl-left-margin` element, a line-initial marker, and a marker directly
/// after a tag. With no target number (alphabetical mode) the tab-separated
/// marker is deleted outright.
pub fn apply_citation_number(html: &str, citation_number: Option<usize>) -> String {
    static TAB_RE: OnceLock<Regex> = OnceLock::new();
    static MARGIN_RE: OnceLock<Regex> = OnceLock::new();
    static LINE_RE: OnceLock<Regex> = OnceLock::new();
    static TAG_RE: OnceLock<Regex> = OnceLock::new();

    let tab = cached(&TAB_RE, r"\d+\.\t");

    let Some(n) = citation_number else {
        return tab.replace_all(html, "").into_owned();
    };

    let margin = cached(
        &MARGIN_RE,
        r#"(<div class="csl-left-margin">)\d+(\.?</div>)"#,
    );
    let line = cached(&LINE_RE, r"(?m)^(\s*)\d+\.(\s)");
    let tag = cached(&TAG_RE, r"(>)\s*\d+\.(\s)");

    let html = tab.replace_all(html, format!("{n}.\t"));
    let html = margin.replace_all(&html, |c: &regex::Captures| format!("{}{}{}", &c[1], n, &c[2]));
    let html = line.replace_all(&html, |c: &regex::Captures| format!("{}{}.{}", &c[1], n, &c[2]));
    tag.replace_all(&html, |c: &regex::Captures| format!("{}{}.{}", &c[1], n, &c[2]))
        .into_owned()
}

/// Replace the tab landmark with four non-breaking spaces
///
/// Keeps the visual alignment without shipping a literal control character in
/// the HTML.
pub fn render_tab_separators(html: &str) -> String {
    html.replace('\t', "&nbsp;&nbsp;&nbsp;&nbsp;")
}

/// Collapse runs of periods and period-whitespace-period sequences
///
/// Applied to a fixpoint so the pass is idempotent even on pathological
/// inputs like `". . ."`.
pub fn cleanup_punctuation(html: &str) -> String {
    static MULTI_RE: OnceLock<Regex> = OnceLock::new();
    static SPACED_RE: OnceLock<Regex> = OnceLock::new();

    let multi = cached(&MULTI_RE, r"\.{2,}");
    let spaced = cached(&SPACED_RE, r"\.\s+\.");

    let mut current = html.to_string();
    loop {
        let pass = multi.replace_all(&current, ".");
        let pass = spaced.replace_all(&pass, ".").into_owned();
        if pass == current {
            return pass;
        }
        current = pass;
    }
}
