use std::sync::LazyLock;

use scraper::node::Element;
use scraper::{Html, Node, Selector};

static BODY_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("body").unwrap());

/// Strip Zenn's presentation noise (`data-line`, the `code-line` class,
/// `aria-hidden` on header anchors) and re-serialize the body content.
/// Every other attribute, namespaced ones included, is left as parsed.
pub fn clean(html: &str) -> String {
    let mut doc = Html::parse_document(html);
    for node in doc.tree.values_mut() {
        if let Node::Element(el) = node {
            strip_noise(el);
        }
    }
    doc.select(&BODY_SEL)
        .next()
        .map(|body| body.inner_html())
        .unwrap_or_default()
}

// Only unprefixed names are matched, so `xlink:href` and friends pass through.
fn strip_noise(el: &mut Element) {
    let header_anchor = el.attrs.iter().any(|(name, value)| {
        name.prefix.is_none()
            && &*name.local == "class"
            && value.split_ascii_whitespace().any(|c| c == "header-anchor-link")
    });

    el.attrs.retain(|name, value| {
        if name.prefix.is_some() {
            return true;
        }
        match &*name.local {
            "data-line" => false,
            "aria-hidden" => !header_anchor,
            "class" => {
                let kept = value
                    .split_ascii_whitespace()
                    .filter(|c| *c != "code-line")
                    .collect::<Vec<_>>()
                    .join(" ");
                if kept.is_empty() {
                    return false;
                }
                value.clear();
                value.push_slice(&kept);
                true
            }
            _ => true,
        }
    });
}
