//! Per-platform anchor resolution.
//!
//! Qiita, Zenn and Note all publish headings but disagree on how anchors are
//! derived and how deep a table of contents goes. Each platform is a small
//! strategy object handed to the shared extractor.

use percent_encoding::percent_decode_str;
use serde::Deserialize;

use super::slug::{qiita_anchor, slugify, slugify_truncated};
use super::{HeadingNode, RawHeading};

const NOTE_SLUG_MAX: usize = 80;

pub trait AnchorStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Deepest heading level included in a TOC.
    fn max_level(&self) -> u8 {
        6
    }

    fn resolve_id(&self, heading: &RawHeading<'_>) -> String;
}

/// Decode `%E3%81%82`-style ids, keeping the raw value if it isn't valid UTF-8.
pub fn decode_id(id: &str) -> String {
    percent_decode_str(id)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| id.to_string())
}

fn explicit_or_anchor(heading: &RawHeading<'_>) -> Option<String> {
    heading
        .explicit_id
        .or(heading.anchor)
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(decode_id)
}

pub struct Generic;

impl AnchorStrategy for Generic {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn resolve_id(&self, heading: &RawHeading<'_>) -> String {
        explicit_or_anchor(heading).unwrap_or_else(|| slugify(&heading.text))
    }
}

pub struct Qiita;

impl AnchorStrategy for Qiita {
    fn name(&self) -> &'static str {
        "qiita"
    }

    fn resolve_id(&self, heading: &RawHeading<'_>) -> String {
        qiita_anchor(&heading.text)
    }
}

pub struct Zenn;

impl AnchorStrategy for Zenn {
    fn name(&self) -> &'static str {
        "zenn"
    }

    fn max_level(&self) -> u8 {
        3
    }

    fn resolve_id(&self, heading: &RawHeading<'_>) -> String {
        explicit_or_anchor(heading).unwrap_or_else(|| slugify(&heading.text))
    }
}

pub struct Note;

impl AnchorStrategy for Note {
    fn name(&self) -> &'static str {
        "note"
    }

    fn max_level(&self) -> u8 {
        3
    }

    // Note never links headings through inner anchors.
    fn resolve_id(&self, heading: &RawHeading<'_>) -> String {
        heading
            .explicit_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(decode_id)
            .unwrap_or_else(|| slugify_truncated(&heading.text, NOTE_SLUG_MAX))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Platform {
    #[default]
    Generic,
    Qiita,
    Zenn,
    Note,
}

impl Platform {
    pub fn strategy(self) -> &'static dyn AnchorStrategy {
        match self {
            Platform::Generic => &Generic,
            Platform::Qiita => &Qiita,
            Platform::Zenn => &Zenn,
            Platform::Note => &Note,
        }
    }
}

/// One node of the TOC tree returned by Zenn's article API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiTocNode {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub level: Option<u8>,
    #[serde(default)]
    pub children: Vec<ApiTocNode>,
}

/// Flatten an API-provided TOC tree depth-first, parents before children.
/// Nodes without text or above the strategy's depth are skipped, but their
/// children are still visited.
pub fn flatten_api_toc(nodes: &[ApiTocNode], strategy: &dyn AnchorStrategy) -> Vec<HeadingNode> {
    fn walk(nodes: &[ApiTocNode], strategy: &dyn AnchorStrategy, out: &mut Vec<HeadingNode>) {
        for node in nodes {
            let text = node.text.as_deref().map(str::trim).unwrap_or_default();
            if let Some(level) = node.level {
                if (1..=strategy.max_level()).contains(&level) && !text.is_empty() {
                    let raw = RawHeading {
                        level,
                        text: text.to_string(),
                        explicit_id: node.id.as_deref(),
                        anchor: None,
                    };
                    out.push(HeadingNode {
                        id: strategy.resolve_id(&raw),
                        text: raw.text,
                        level,
                        base: None,
                    });
                }
            }
            walk(&node.children, strategy, out);
        }
    }

    let mut out = Vec::new();
    walk(nodes, strategy, &mut out);
    out
}
