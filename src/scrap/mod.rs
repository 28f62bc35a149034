//! Zenn Scrap comment processing: pick a comment, then break its HTML into
//! typed blocks for custom rendering.

pub mod clean;
pub mod comments;
pub mod structure;

use serde::Serialize;

pub use clean::clean;
pub use comments::{select_comment, Comment};
pub use structure::structure;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Heading,
    Paragraph,
    UnorderedList,
    OrderedList,
    Blockquote,
    CodeBlock,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredElement {
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapContent {
    pub raw: String,
    pub cleaned: String,
    pub structured: Vec<StructuredElement>,
}

/// Clean and structure one comment body. Both passes read the same input.
pub fn process_html(html: &str) -> ScrapContent {
    ScrapContent {
        raw: html.to_string(),
        cleaned: clean(html),
        structured: structure(html),
    }
}
