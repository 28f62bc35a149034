use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use super::platform::AnchorStrategy;
use super::{HeadingNode, RawHeading};

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());
static FRAGMENT_LINK_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r##"a[href^="#"]"##).unwrap());
static TITLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
static OG_TITLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[property="og:title"]"#).unwrap());

/// `h1`..`h6` level from a tag name, if it is one.
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag.as_bytes() {
        [b'h' | b'H', d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

/// Visible text of an element: tags stripped, entities decoded, no-break
/// spaces folded to plain spaces, trimmed.
pub fn text_content(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

fn inside_heading(el: ElementRef<'_>) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| heading_level(a.value().name()).is_some())
}

pub fn extract(html: &str, strategy: &dyn AnchorStrategy) -> Vec<HeadingNode> {
    let doc = Html::parse_document(html);
    let mut headings = Vec::new();

    for el in doc.select(&HEADING_SEL) {
        let Some(level) = heading_level(el.value().name()) else {
            continue;
        };
        if level > strategy.max_level() || inside_heading(el) {
            continue;
        }
        let text = text_content(el);
        if text.is_empty() {
            continue;
        }

        let anchor = el
            .select(&FRAGMENT_LINK_SEL)
            .next()
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.trim_start_matches('#'));

        let raw = RawHeading {
            level,
            text,
            explicit_id: el.value().attr("id"),
            anchor,
        };
        headings.push(HeadingNode {
            id: strategy.resolve_id(&raw),
            text: raw.text,
            level,
            base: None,
        });
    }

    headings
}

/// Page title from `<title>`, falling back to `og:title`. Empty when neither exists.
pub fn extract_title(html: &str) -> String {
    let doc = Html::parse_document(html);
    if let Some(title) = doc.select(&TITLE_SEL).next().map(text_content) {
        if !title.is_empty() {
            return title;
        }
    }
    doc.select(&OG_TITLE_SEL)
        .next()
        .and_then(|m| m.value().attr("content"))
        .map(|c| c.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::{Generic, Note, Zenn};

    #[test]
    fn levels_from_tags() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("H6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("hr"), None);
        assert_eq!(heading_level("header"), None);
    }

    #[test]
    fn inline_markup_stripped() {
        let h = extract("<h3>Use <code>Vec&lt;T&gt;</code> <em>wisely</em></h3>", &Generic);
        assert_eq!(h[0].text, "Use Vec<T> wisely");
        assert_eq!(h[0].level, 3);
    }

    #[test]
    fn entities_decoded() {
        let h = extract(
            "<h2>&quot;Q&quot; &#39;s&#39;&nbsp;x</h2><h2>A &amp; B</h2>",
            &Generic,
        );
        assert_eq!(h[0].text, "\"Q\" 's' x");
        assert_eq!(h[1].text, "A & B");
    }

    #[test]
    fn empty_headings_discarded() {
        let h = extract("<h1> </h1><h2><img src=x></h2><h2>kept</h2>", &Generic);
        assert_eq!(h.len(), 1);
        assert_eq!(h[0].text, "kept");
    }

    #[test]
    fn document_order_across_levels() {
        let h = extract("<h3>c</h3><h1>a</h1><div><h2>b</h2></div>", &Generic);
        let got: Vec<_> = h.iter().map(|x| (x.level, x.text.as_str())).collect();
        assert_eq!(got, vec![(3, "c"), (1, "a"), (2, "b")]);
    }

    #[test]
    fn explicit_id_and_anchor() {
        let html = r##"<h2 id="intro">Intro</h2>
            <h2><a class="header-anchor-link" href="#%E6%A6%82%E8%A6%81"></a> 概要</h2>
            <h2>Plain Title</h2>"##;
        let h = extract(html, &Zenn);
        let ids: Vec<_> = h.iter().map(|x| x.id.as_str()).collect();
        assert_eq!(ids, vec!["intro", "概要", "plain-title"]);
    }

    #[test]
    fn platform_depth_limit() {
        let html = "<h1>a</h1><h3>c</h3><h4>d</h4>";
        assert_eq!(extract(html, &Note).len(), 2);
        assert_eq!(extract(html, &Generic).len(), 3);
    }

    #[test]
    fn zenn_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/zenn_article.html").unwrap();
        let h = extract(&html, &Zenn);
        assert_eq!(h.len(), 4);
        assert_eq!(h[0].text, "はじめに");
        assert_eq!(h[0].id, "はじめに");
        assert!(h.iter().all(|x| x.level <= 3));
    }

    #[test]
    fn title_sources() {
        assert_eq!(extract_title("<title> Post &amp; more </title>"), "Post & more");
        let og = r#"<head><meta property="og:title" content="From OG"></head>"#;
        assert_eq!(extract_title(og), "From OG");
        assert_eq!(extract_title("<p>none</p>"), "");
    }
}
