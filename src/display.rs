//! Rendering list pages for the terminal.

use serde_json::{Value, json};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::api::Resource;
use crate::error::Result;
use crate::list::ListSnapshot;

/// Records as a table, headed by the resource's columns.
pub fn render_table<T: Resource>(items: &[T]) -> String {
    if items.is_empty() {
        return "No records found.".to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(T::COLUMNS.iter().map(|c| c.to_string()));
    for item in items {
        builder.push_record(item.row());
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

/// Number of pages needed for `total` records. At least 1.
pub fn page_count(total: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 1;
    }
    total.div_ceil(u64::from(page_size)).max(1)
}

pub fn page_summary<T>(snapshot: &ListSnapshot<T>) -> String {
    let total = snapshot.result.total;
    format!(
        "Page {} of {} ({} total)",
        snapshot.result.page.max(1),
        page_count(total, snapshot.query.page_size()),
        total
    )
}

pub fn page_text<T: Resource>(snapshot: &ListSnapshot<T>) -> String {
    format!(
        "{}\n{}",
        render_table(&snapshot.result.items),
        page_summary(snapshot)
    )
}

pub fn page_json<T: Resource>(endpoint: &str, snapshot: &ListSnapshot<T>) -> Result<Value> {
    Ok(json!({
        "endpoint": endpoint,
        "page": snapshot.result.page,
        "page_size": snapshot.query.page_size(),
        "total": snapshot.result.total,
        "search": snapshot.query.search_text(),
        "items": serde_json::to_value(&snapshot.result.items)?,
    }))
}
