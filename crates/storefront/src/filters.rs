//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a count of items: `1 item`, `3 items`.
///
/// Usage in templates: `{{ totals.item_count|items_label }}`
#[askama::filter_fn]
pub fn items_label(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_items(&count.to_string()))
}

/// Page title with the brand suffix.
///
/// Usage in templates: `{{ "Cart"|page_title }}`
#[askama::filter_fn]
pub fn page_title(page: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_title(&page.to_string()))
}

fn format_title(page: &str) -> String {
    if page.is_empty() {
        "ARCVERSE".to_string()
    } else {
        format!("{page} | ARCVERSE")
    }
}

fn format_items(count: &str) -> String {
    if count == "1" {
        "1 item".to_string()
    } else {
        format!("{count} items")
    }
}
