use std::sync::LazyLock;

use regex::Regex;

use super::platform::AnchorStrategy;
use super::{HeadingNode, RawHeading};

static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*$").unwrap());
static LINE_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\r?\n").unwrap());

/// ATX headings, one per line, in document order.
pub fn extract(markdown: &str, strategy: &dyn AnchorStrategy) -> Vec<HeadingNode> {
    let mut headings = Vec::new();

    for line in LINE_SPLIT_RE.split(markdown) {
        let Some(caps) = HEADING_RE.captures(line) else {
            continue;
        };
        let level = caps[1].len() as u8;
        let text = caps[2].trim();
        if text.is_empty() || level > strategy.max_level() {
            continue;
        }

        let raw = RawHeading {
            level,
            text: text.to_string(),
            ..Default::default()
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toc::{Generic, Qiita};

    fn heading_line_count(md: &str) -> usize {
        md.split('\n')
            .filter_map(|l| HEADING_RE.captures(l.trim_end_matches('\r')))
            .filter(|c| !c[2].trim().is_empty())
            .count()
    }

    #[test]
    fn levels_and_text() {
        let h = extract("# One\n## Two  \n###### Six", &Generic);
        let got: Vec<_> = h.iter().map(|x| (x.level, x.text.as_str())).collect();
        assert_eq!(got, vec![(1, "One"), (2, "Two"), (6, "Six")]);
    }

    #[test]
    fn requires_space_after_hashes() {
        let h = extract("#include <stdio.h>\n####### seven\n#\tTabbed", &Generic);
        assert_eq!(h.len(), 1);
        assert_eq!(h[0].text, "Tabbed");
    }

    #[test]
    fn whitespace_only_heading_is_dropped() {
        assert!(extract("##    \n#  ", &Generic).is_empty());
    }

    #[test]
    fn crlf_lines() {
        let h = extract("# A\r\ntext\r\n## B\r\n", &Generic);
        assert_eq!(h.len(), 2);
        assert_eq!(h[1].text, "B");
    }

    #[test]
    fn count_matches_heading_lines() {
        let md = std::fs::read_to_string("tests/fixtures/qiita_article.md").unwrap();
        assert_eq!(extract(&md, &Generic).len(), heading_line_count(&md));
    }

    #[test]
    fn duplicates_kept_in_order() {
        let h = extract("## Setup\n## Setup\n# Intro", &Generic);
        let texts: Vec<_> = h.iter().map(|x| x.text.as_str()).collect();
        assert_eq!(texts, vec!["Setup", "Setup", "Intro"]);
    }

    #[test]
    fn qiita_anchors_keep_ascii_words() {
        let h = extract("## Rust の Ownership 入門\n## Hello,  World!", &Qiita);
        assert_eq!(h[0].id, "rust-ownership");
        assert_eq!(h[1].id, "hello-world");
    }

    #[test]
    fn generic_anchors_keep_japanese() {
        let h = extract("## Rust の所有権", &Generic);
        assert_eq!(h[0].id, "rust-の所有権");
    }
}
