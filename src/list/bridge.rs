//! Table "change" events to query updates.
//!
//! Table widgets report pagination and sorting together in one change
//! event, with their own sort vocabulary (`ascend`, `descending`, ...). The
//! bridge validates the whole event first, then applies it so a bad event
//! never leaves the query half-updated.

use serde::Deserialize;

use crate::error::{BidwavesError, Result};

use super::query::{ListQuery, SortDirection};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TableChange {
    #[serde(default)]
    pub pagination: Option<PaginationChange>,
    #[serde(default)]
    pub sorter: Option<SorterChange>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationChange {
    pub current: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SorterChange {
    pub field: Option<String>,
    pub order: Option<String>,
}

impl TableChange {
    pub fn page(current: u32) -> Self {
        Self {
            pagination: Some(PaginationChange {
                current: Some(current),
                page_size: None,
            }),
            sorter: None,
        }
    }

    pub fn page_size(size: u32) -> Self {
        Self {
            pagination: Some(PaginationChange {
                current: None,
                page_size: Some(size),
            }),
            sorter: None,
        }
    }

    pub fn sort(field: impl Into<String>, order: Option<&str>) -> Self {
        Self {
            pagination: None,
            sorter: Some(SorterChange {
                field: Some(field.into()),
                order: order.map(str::to_string),
            }),
        }
    }
}

/// Map a table's sort order onto [`SortDirection`].
///
/// `None`, empty and `"null"`/`"false"` mean "unsorted".
pub fn normalize_direction(order: Option<&str>) -> Result<Option<SortDirection>> {
    let Some(raw) = order else {
        return Ok(None);
    };
    let lower = raw.trim().to_ascii_lowercase();
    match lower.as_str() {
        "" | "null" | "false" | "none" => Ok(None),
        "asc" => Ok(Some(SortDirection::Ascending)),
        "desc" => Ok(Some(SortDirection::Descending)),
        s if s.starts_with("ascend") => Ok(Some(SortDirection::Ascending)),
        s if s.starts_with("descend") => Ok(Some(SortDirection::Descending)),
        _ => Err(BidwavesError::InvalidSortDirection(raw.to_string())),
    }
}

/// Apply a table change. Returns whether the query changed.
///
/// A sort change always lands on page 1, even if the same event carried a
/// page number. A page-size change alone keeps the current page.
pub fn apply_table_change(query: &mut ListQuery, change: &TableChange) -> Result<bool> {
    let sort = match &change.sorter {
        Some(sorter) => Some((
            sorter.field.clone(),
            normalize_direction(sorter.order.as_deref())?,
        )),
        None => None,
    };

    let pagination = change.pagination.clone().unwrap_or_default();

    // Validate on a scratch copy so errors leave `query` untouched.
    let mut next = query.clone();
    let mut changed = false;
    if let Some(size) = pagination.page_size {
        changed |= next.set_page_size(size)?;
    }
    if let Some(current) = pagination.current {
        changed |= next.set_page(current)?;
    }
    if let Some((field, direction)) = sort {
        changed |= next.set_sort(field, direction);
    }

    *query = next;
    Ok(changed)
}
