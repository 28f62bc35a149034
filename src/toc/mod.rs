pub mod html;
pub mod markdown;
pub mod normalize;
pub mod platform;
pub mod slug;

use serde::{Deserialize, Serialize};

pub use normalize::{build_tree, normalize, TocTreeNode};
pub use platform::{AnchorStrategy, Generic, Note, Platform, Qiita, Zenn};
pub use slug::slugify;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Markdown,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingNode {
    pub id: String,
    pub text: String,
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<u8>,
}

impl HeadingNode {
    /// Indentation relative to the document's shallowest heading.
    /// Nodes that were never normalized are treated as their own base.
    pub fn indent(&self, unit: u32) -> u32 {
        let base = self.base.unwrap_or(self.level);
        u32::from(self.level.saturating_sub(base)) * unit
    }

    pub fn is_top_level(&self) -> bool {
        self.base.map_or(true, |b| self.level == b)
    }
}

/// A heading as found in the source, before an id has been chosen.
#[derive(Debug, Clone, Default)]
pub struct RawHeading<'a> {
    pub level: u8,
    pub text: String,
    /// Value of the heading's own `id` attribute.
    pub explicit_id: Option<&'a str>,
    /// Fragment of the first `<a href="#...">` inside the heading.
    pub anchor: Option<&'a str>,
}

/// Extract headings with the platform-neutral strategy.
pub fn extract_headings(source: &str, kind: SourceKind) -> Vec<HeadingNode> {
    extract_headings_with(source, kind, &Generic)
}

pub fn extract_headings_with(
    source: &str,
    kind: SourceKind,
    strategy: &dyn AnchorStrategy,
) -> Vec<HeadingNode> {
    if source.trim().is_empty() {
        return Vec::new();
    }
    match kind {
        SourceKind::Markdown => markdown::extract(source, strategy),
        SourceKind::Html => html::extract(source, strategy),
    }
}
