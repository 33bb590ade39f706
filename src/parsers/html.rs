use crate::parsers::ExtractError;
use crate::results::ContentItem;
use crate::utils;
use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

/// Extracts every node matching `selector` from an HTML document, stamped with the current time
pub fn extract(html: &str, selector: &str) -> Result<Vec<ContentItem>, ExtractError> {
    extract_at(html, selector, Utc::now())
}

/// Extracts every node matching `selector`, stamping items with `at`
///
/// Items come back in document order. Nodes whose markup and text are
/// both empty after trimming are dropped.
pub fn extract_at(
    html: &str,
    selector: &str,
    at: DateTime<Utc>,
) -> Result<Vec<ContentItem>, ExtractError> {
    let selector = compile(selector)?;
    let doc = Html::parse_document(html);
    let timestamp = utils::iso_timestamp(at);

    let matched = doc.select(&selector).collect::<Vec<_>>();
    if matched.is_empty() {
        return Err(ExtractError::NoMatch);
    }
    ::log::debug!("Selector matched {} nodes", matched.len());

    let items = matched
        .into_iter()
        .map(|node| to_item(node, &timestamp))
        .filter(|item| !item.is_blank())
        .collect::<Vec<_>>();

    if items.is_empty() {
        return Err(ExtractError::EmptyContent);
    }

    Ok(items)
}

/// Parses a selector, mapping parse failures to `InvalidSelector`
pub fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| {
        ::log::debug!("Rejected selector {:?}: {:?}", selector, e);
        ExtractError::InvalidSelector(selector.to_string())
    })
}

fn to_item(node: ElementRef<'_>, timestamp: &str) -> ContentItem {
    let content = node.inner_html().trim().to_string();
    let text = node.text().collect::<String>().trim().to_string();
    ContentItem::new(content, text, timestamp.to_string())
}
