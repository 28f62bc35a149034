pub mod error;
pub mod fetch;
pub mod hud;
pub mod scrap;
pub mod settings;
pub mod toc;

pub use error::ExtractError;
pub use scrap::{process_html, ScrapContent, StructuredElement};
pub use toc::{build_tree, extract_headings, normalize, slugify, HeadingNode, SourceKind};
