use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::{ElementKind, StructuredElement};
use crate::toc::html::heading_level;

static BODY_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

fn has_text(el: ElementRef<'_>) -> bool {
    el.text().any(|t| !t.trim().is_empty())
}

fn classify(el: ElementRef<'_>) -> Option<StructuredElement> {
    let tag = el.value().name();

    if let Some(level) = heading_level(tag) {
        return Some(StructuredElement {
            kind: ElementKind::Heading,
            content: el.text().collect(),
            level: Some(level),
        });
    }

    let kind = match tag {
        "p" if !has_text(el) => return None,
        "p" => ElementKind::Paragraph,
        "ul" => ElementKind::UnorderedList,
        "ol" => ElementKind::OrderedList,
        "blockquote" => ElementKind::Blockquote,
        "pre" => ElementKind::CodeBlock,
        _ if !has_text(el) => return None,
        _ => ElementKind::Other,
    };

    Some(StructuredElement {
        kind,
        content: el.inner_html(),
        level: None,
    })
}

/// Classify the direct element children of `<body>`, in document order.
/// Descendants are carried inside each block's content, never classified.
pub fn structure(html: &str) -> Vec<StructuredElement> {
    let doc = Html::parse_document(html);
    let Some(body) = doc.select(&BODY_SEL).next() else {
        return Vec::new();
    };

    body.children()
        .filter_map(ElementRef::wrap)
        .filter_map(classify)
        .collect()
}
