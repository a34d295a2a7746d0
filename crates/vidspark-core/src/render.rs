//! Turns a [`ParsedIdea`] into ordered display blocks.
//!
//! The renderer is UI-agnostic: the terminal client maps blocks to cards, and
//! [`to_plain_text`] produces the copy-to-clipboard form.

use serde::Serialize;

use crate::sections::{ParsedIdea, Section};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BlockBody {
    Text(String),
    Steps(Vec<String>),
}

/// One card of the result view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayBlock {
    pub section: Section,
    pub title: &'static str,
    pub body: BlockBody,
}

impl DisplayBlock {
    fn text(section: Section, text: &str) -> Self {
        Self {
            section,
            title: title(section),
            body: BlockBody::Text(text.to_string()),
        }
    }
}

pub fn title(section: Section) -> &'static str {
    match section {
        Section::BigIdea => "The Big Idea",
        Section::Steps => "Step-by-Step Plan",
        Section::ProTip => "Pro Tip",
        Section::Caption => "Caption",
        Section::Hashtags => "Hashtags",
        Section::BestTime => "Best Time to Post",
    }
}

/// Render an idea as display blocks.
///
/// The big-idea block is always present. A raw fallback parse carries its text
/// in `big_idea`, so it renders through the same path as a document that only
/// had a big-idea section.
pub fn render(idea: &ParsedIdea) -> Vec<DisplayBlock> {
    let mut blocks = vec![DisplayBlock::text(Section::BigIdea, &idea.big_idea)];

    if !idea.steps.is_empty() {
        blocks.push(DisplayBlock {
            section: Section::Steps,
            title: title(Section::Steps),
            body: BlockBody::Steps(idea.steps.clone()),
        });
    }

    let optional = [
        (Section::ProTip, &idea.pro_tip),
        (Section::Caption, &idea.caption),
        (Section::Hashtags, &idea.hashtags),
        (Section::BestTime, &idea.best_time),
    ];
    for (section, text) in optional {
        if let Some(text) = text {
            blocks.push(DisplayBlock::text(section, text));
        }
    }

    blocks
}

/// Plain-text form of rendered blocks, one titled paragraph per block.
pub fn to_plain_text(blocks: &[DisplayBlock]) -> String {
    blocks
        .iter()
        .map(|block| {
            let body = match &block.body {
                BlockBody::Text(text) => text.clone(),
                BlockBody::Steps(steps) => steps
                    .iter()
                    .enumerate()
                    .map(|(i, step)| format!("{}. {}", i + 1, step))
                    .collect::<Vec<_>>()
                    .join("\n"),
            };
            format!("{}\n{}", block.title, body)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
