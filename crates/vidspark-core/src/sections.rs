//! Section parser for generated idea documents.
//!
//! The backend answers with loosely formatted text whose headings follow the
//! prompt template (THE BIG IDEA, STEP-BY-STEP, PRO TIP, CAPTION, HASHTAGS,
//! BEST TIME TO POST). The headings are used purely as delimiters: the text is
//! split on them and the fragments are assigned to sections by position.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// A named section of an idea document, in template order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Section {
    BigIdea,
    Steps,
    ProTip,
    Caption,
    Hashtags,
    BestTime,
}

impl Section {
    /// Index of this section's fragment in the split output.
    ///
    /// Fragment 0 is whatever precedes the first marker and is discarded.
    fn slot(self) -> usize {
        MARKERS
            .iter()
            .position(|m| m.section == self)
            .map_or(0, |i| i + 1)
    }
}

/// A delimiter phrase and the section that follows it.
#[derive(Debug, Clone, Copy)]
pub struct SectionMarker {
    pub section: Section,
    /// Case-insensitive regex fragment matching the heading itself.
    pub pattern: &'static str,
}

/// Section markers in the order the template emits them.
///
/// `step-by-step` is a prefix match: the rest of its heading line
/// ("(How do I do it?)") is part of the marker. `pro tip` only takes a
/// parenthetical ("(To make it sweet)"); text after it on the line is the tip.
pub const MARKERS: [SectionMarker; 6] = [
    SectionMarker {
        section: Section::BigIdea,
        pattern: r"\bthe[ \t]+big[ \t]+idea\b",
    },
    SectionMarker {
        section: Section::Steps,
        pattern: r"\bstep-by-step[^\r\n]*",
    },
    SectionMarker {
        section: Section::ProTip,
        pattern: r"\bpro[ \t]+tips?\b(?:[ \t]*\([^)\r\n]*\))?",
    },
    SectionMarker {
        section: Section::Caption,
        pattern: r"\bcaption\b",
    },
    SectionMarker {
        section: Section::Hashtags,
        pattern: r"\bhashtags\b",
    },
    SectionMarker {
        section: Section::BestTime,
        pattern: r"\bbest[ \t]+time[ \t]+to[ \t]+post\b",
    },
];

/// Structured view of one idea document.
///
/// Always re-derivable from the raw text with [`parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedIdea {
    pub big_idea: String,
    pub steps: Vec<String>,
    pub pro_tip: Option<String>,
    pub caption: Option<String>,
    pub hashtags: Option<String>,
    pub best_time: Option<String>,
    /// No big-idea marker was found; `big_idea` holds the whole trimmed text.
    pub fell_back_to_raw: bool,
}

impl ParsedIdea {
    fn raw(raw: &str) -> Self {
        Self {
            big_idea: raw.trim().to_string(),
            fell_back_to_raw: true,
            ..Self::default()
        }
    }
}

fn marker_regex() -> &'static Regex {
    static MARKER_RE: OnceLock<Regex> = OnceLock::new();
    MARKER_RE.get_or_init(|| {
        let alternatives: Vec<&str> = MARKERS.iter().map(|m| m.pattern).collect();
        // Markdown decoration around a heading ("## ", "**", trailing ':') goes with it.
        let pattern = format!(
            r"(?i)(?:#{{1,6}}[ \t]*)?\**(?:{})[*:]*",
            alternatives.join("|")
        );
        Regex::new(&pattern).expect("section marker regex must compile")
    })
}

fn step_prefix_regex() -> &'static Regex {
    static STEP_PREFIX_RE: OnceLock<Regex> = OnceLock::new();
    STEP_PREFIX_RE
        .get_or_init(|| Regex::new(r"^\d+\.\s*").expect("step prefix regex must compile"))
}

/// Parse a raw idea document into sections. Never fails.
///
/// If no marker is found the whole text becomes `big_idea` and
/// `fell_back_to_raw` is set. Missing trailing sections are left empty.
pub fn parse(raw: &str) -> ParsedIdea {
    let fragments: Vec<&str> = marker_regex().split(raw).collect();

    if fragments.len() < 2 {
        debug!(len = raw.len(), "no section markers found, showing raw text");
        return ParsedIdea::raw(raw);
    }
    if fragments.len() > MARKERS.len() + 1 {
        debug!(
            fragments = fragments.len(),
            "ignoring fragments past the last section"
        );
    }

    ParsedIdea {
        big_idea: fragment(&fragments, Section::BigIdea).to_string(),
        steps: split_steps(fragment(&fragments, Section::Steps)),
        pro_tip: non_empty(fragment(&fragments, Section::ProTip)),
        caption: non_empty(fragment(&fragments, Section::Caption)),
        hashtags: non_empty(fragment(&fragments, Section::Hashtags)),
        best_time: non_empty(fragment(&fragments, Section::BestTime)),
        fell_back_to_raw: false,
    }
}

fn fragment<'a>(fragments: &[&'a str], section: Section) -> &'a str {
    fragments
        .get(section.slot())
        .map_or("", |f| f.trim())
}

/// One step per non-blank line, with any "1. " style ordinal removed.
fn split_steps(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| step_prefix_regex().replace(line, "").into_owned())
        .collect()
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
