use unicode_normalization::UnicodeNormalization;

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

fn is_kept(c: char) -> bool {
    c.is_ascii_lowercase()
        || c.is_ascii_digit()
        || ('\u{3040}'..='\u{30FF}').contains(&c)
        || ('\u{4E00}'..='\u{9FAF}').contains(&c)
        || c.is_whitespace()
        || c == '-'
}

/// URL-fragment id for a heading. Keeps ASCII alphanumerics, kana and
/// CJK ideographs; whitespace runs become a single hyphen.
pub fn slugify(text: &str) -> String {
    let filtered: String = text
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .filter(|c| is_kept(*c))
        .collect();

    filtered
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .trim_matches('-')
        .to_string()
}

/// Slug cut to at most `max_chars` characters, for platforms with short anchors.
/// The cut is a plain prefix: a hyphen left at the boundary stays, so ids match
/// what the platform itself generates.
pub fn slugify_truncated(text: &str, max_chars: usize) -> String {
    slugify(text).chars().take(max_chars).collect()
}

/// Qiita's anchor rule: ASCII word characters only, no Unicode folding.
pub fn qiita_anchor(text: &str) -> String {
    let lowered = text.to_lowercase();
    let filtered: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || c.is_whitespace() || *c == '-')
        .collect();

    let mut id = String::with_capacity(filtered.len());
    for part in filtered.split_whitespace() {
        if !id.is_empty() {
            id.push('-');
        }
        id.push_str(part);
    }

    let mut collapsed = String::with_capacity(id.len());
    for c in id.chars() {
        if c == '-' && collapsed.ends_with('-') {
            continue;
        }
        collapsed.push(c);
    }
    collapsed.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_basics() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Tabs\tand   spaces "), "tabs-and-spaces");
        assert_eq!(slugify("C++ & Rust!"), "c-rust");
    }

    #[test]
    fn strips_diacritics() {
        assert_eq!(slugify("Café Crème"), "cafe-creme");
        assert_eq!(slugify("Ünïcödé"), "unicode");
    }

    #[test]
    fn keeps_japanese() {
        let agenda = slugify("今期のアジェンダ");
        assert!(agenda.starts_with("今期のア"));
        assert!(!agenda.contains(char::is_whitespace));
        assert!(slugify("今期の 目標").starts_with("今期の-"));
        assert_eq!(slugify("所有権とは？"), "所有権とは");
    }

    #[test]
    fn full_width_folds_to_ascii() {
        assert_eq!(slugify("ＲＵＳＴ　入門"), "rust-入門");
    }

    #[test]
    fn edge_hyphens_trimmed() {
        assert_eq!(slugify("- list item -"), "list-item");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn idempotent() {
        for input in [
            "Hello World",
            "Café -- Crème",
            "Rust の 所有権 と 借用",
            "ＲＵＳＴ　入門",
            "ガイド ドキュメント",
            "a - b",
            "",
        ] {
            let once = slugify(input);
            assert_eq!(slugify(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn deterministic() {
        assert_eq!(slugify("Same Input"), slugify("Same Input"));
    }

    #[test]
    fn truncation() {
        let long = "word ".repeat(40);
        let slug = slugify_truncated(&long, 80);
        assert_eq!(slug.chars().count(), 80);
        // plain prefix cut, boundary hyphen kept
        assert!(slug.ends_with("word-"));
        assert_eq!(slugify_truncated("日本語の見出し", 3), "日本語");
        assert_eq!(slugify_truncated("short", 80), "short");
    }

    #[test]
    fn qiita_rule() {
        assert_eq!(qiita_anchor("Getting Started"), "getting-started");
        assert_eq!(qiita_anchor("a - b"), "a-b");
        assert_eq!(qiita_anchor("snake_case ok"), "snake_case-ok");
        assert_eq!(qiita_anchor("日本語のみ"), "");
    }
}
