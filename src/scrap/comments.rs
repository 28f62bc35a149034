use std::sync::LazyLock;

use scraper::{Html, Selector};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ExtractError, Result};

/// Comment that carries the current agenda on the portfolio's scrap.
pub const DEFAULT_KEYWORD: &str = "今期のアジェンダ";

static NEXT_DATA_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script#__NEXT_DATA__").unwrap());

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Comment {
    #[serde(rename = "bodyHtml", default, deserialize_with = "null_as_empty")]
    pub content: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}

impl Comment {
    pub fn new(content: impl Into<String>) -> Self {
        Comment {
            content: content.into(),
        }
    }
}

/// Body of the first comment containing `keyword`, else the first comment.
/// An empty list is `NotFound`; an empty body is a valid result.
pub fn select_comment<'a>(comments: &'a [Comment], keyword: &str) -> Result<&'a str> {
    let first = comments
        .first()
        .ok_or(ExtractError::NotFound("no comments in scrap"))?;

    let picked = comments
        .iter()
        .find(|c| c.content.contains(keyword))
        .unwrap_or(first);
    Ok(&picked.content)
}

/// Locate the page's embedded `__NEXT_DATA__` JSON.
pub fn next_data(page_html: &str) -> Result<Value> {
    let doc = Html::parse_document(page_html);
    let script = doc
        .select(&NEXT_DATA_SEL)
        .next()
        .ok_or(ExtractError::NotFound("__NEXT_DATA__ script"))?;

    let json: String = script.text().collect();
    if json.trim().is_empty() {
        return Err(ExtractError::NotFound("__NEXT_DATA__ payload"));
    }
    Ok(serde_json::from_str(&json)?)
}

/// Comment list from a scrap page's `props.pageProps.comments`.
pub fn comments_from_page(page_html: &str) -> Result<Vec<Comment>> {
    let data = next_data(page_html)?;
    let comments = data
        .pointer("/props/pageProps/comments")
        .ok_or(ExtractError::NotFound("props.pageProps.comments"))?;
    Ok(Vec::<Comment>::deserialize(comments)?)
}
