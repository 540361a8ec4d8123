//! The query a list view asks the server for.
//!
//! All mutation goes through setters so the invariants hold at every point:
//! the search field is one of the configured columns, the page size is one
//! of [`PAGE_SIZE_OPTIONS`], no filter key can shadow another parameter, and
//! any change to search, filters or sort sends the view back to page 1.

use std::collections::BTreeMap;

use crate::api::Resource;
use crate::enum_display_fromstr;
use crate::error::{BidwavesError, Result};

pub const PAGE_SIZE_OPTIONS: &[u32] = &[10, 20, 50, 100];
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Parameter names the builder always owns.
pub const RESERVED_PARAMS: &[&str] = &["size", "page", "order", "sort"];

pub const BOOL_PREFIX: &str = "__bool_";
pub const ENUM_PREFIX: &str = "__enum_";
pub const NOT_NULL_PREFIX: &str = "__notnull_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

enum_display_fromstr!(
    SortDirection,
    BidwavesError::invalid_sort_direction,
    {
        Ascending => "asc",
        Descending => "desc",
    }
);

/// A filter selection. The variant decides the wire prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    /// `__bool_<key>=<true|false>`
    Bool(bool),
    /// `__enum_<key>=<value>`
    Enum(String),
    /// `__notnull_<key>=<true|false>`
    NotNull(bool),
    /// `<key>=<value>`
    Text(String),
}

impl FilterValue {
    pub fn prefix(&self) -> &'static str {
        match self {
            FilterValue::Bool(_) => BOOL_PREFIX,
            FilterValue::Enum(_) => ENUM_PREFIX,
            FilterValue::NotNull(_) => NOT_NULL_PREFIX,
            FilterValue::Text(_) => "",
        }
    }

    /// Raw (unencoded) wire value.
    pub fn wire_value(&self) -> String {
        match self {
            FilterValue::Bool(b) | FilterValue::NotNull(b) => b.to_string(),
            FilterValue::Enum(s) | FilterValue::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    search_columns: &'static [&'static str],
    search_text: String,
    search_field: Option<&'static str>,
    filters: BTreeMap<String, FilterValue>,
    sort_field: Option<String>,
    sort_direction: Option<SortDirection>,
    page: u32,
    page_size: u32,
}

impl ListQuery {
    /// Empty query searching over `search_columns` (first column is the default).
    pub fn new(search_columns: &'static [&'static str]) -> Self {
        Self {
            search_columns,
            search_text: String::new(),
            search_field: search_columns.first().copied(),
            filters: BTreeMap::new(),
            sort_field: None,
            sort_direction: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn for_resource<T: Resource>() -> Self {
        Self::new(T::SEARCH_COLUMNS)
    }

    pub fn search_columns(&self) -> &'static [&'static str] {
        self.search_columns
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn search_field(&self) -> Option<&'static str> {
        self.search_field
    }

    pub fn filters(&self) -> &BTreeMap<String, FilterValue> {
        &self.filters
    }

    pub fn sort_field(&self) -> Option<&str> {
        self.sort_field.as_deref()
    }

    pub fn sort_direction(&self) -> Option<SortDirection> {
        self.sort_direction
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Returns whether the text changed. A change resets to page 1.
    pub fn set_search_text(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        if text == self.search_text {
            return false;
        }
        self.search_text = text;
        self.page = 1;
        true
    }

    pub fn set_search_field(&mut self, field: &str) -> Result<bool> {
        let field = self
            .search_columns
            .iter()
            .copied()
            .find(|c| *c == field)
            .ok_or_else(|| BidwavesError::InvalidSearchField(field.to_string()))?;

        if self.search_field == Some(field) {
            return Ok(false);
        }
        if matches!(self.filters.get(field), Some(FilterValue::Text(_))) {
            return Err(BidwavesError::ReservedFilterKey(field.to_string()));
        }
        self.search_field = Some(field);
        self.page = 1;
        Ok(true)
    }

    /// Set or replace a filter. Returns whether the query changed.
    pub fn set_filter(&mut self, key: &str, value: FilterValue) -> Result<bool> {
        validate_filter_key(key)?;
        if matches!(value, FilterValue::Text(_))
            && (RESERVED_PARAMS.contains(&key) || self.search_field == Some(key))
        {
            return Err(BidwavesError::ReservedFilterKey(key.to_string()));
        }

        if self.filters.get(key) == Some(&value) {
            return Ok(false);
        }
        self.filters.insert(key.to_string(), value);
        self.page = 1;
        Ok(true)
    }

    pub fn remove_filter(&mut self, key: &str) -> bool {
        if self.filters.remove(key).is_none() {
            return false;
        }
        self.page = 1;
        true
    }

    pub fn clear_filters(&mut self) -> bool {
        if self.filters.is_empty() {
            return false;
        }
        self.filters.clear();
        self.page = 1;
        true
    }

    /// Set the sort order. A field without a direction (or the reverse) clears it.
    pub fn set_sort(&mut self, field: Option<String>, direction: Option<SortDirection>) -> bool {
        let (field, direction) = match (field.filter(|f| !f.is_empty()), direction) {
            (Some(f), Some(d)) => (Some(f), Some(d)),
            _ => (None, None),
        };

        if field == self.sort_field && direction == self.sort_direction {
            return false;
        }
        self.sort_field = field;
        self.sort_direction = direction;
        self.page = 1;
        true
    }

    pub fn set_page(&mut self, page: u32) -> Result<bool> {
        if page == 0 {
            return Err(BidwavesError::InvalidPage(page));
        }
        let changed = page != self.page;
        self.page = page;
        Ok(changed)
    }

    /// Change the page size. Keeps the current page, filters and search.
    pub fn set_page_size(&mut self, size: u32) -> Result<bool> {
        if !PAGE_SIZE_OPTIONS.contains(&size) {
            return Err(BidwavesError::InvalidPageSize(size));
        }
        let changed = size != self.page_size;
        self.page_size = size;
        Ok(changed)
    }

    pub fn with_page_size(mut self, size: u32) -> Result<Self> {
        self.set_page_size(size)?;
        Ok(self)
    }
}

fn validate_filter_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(BidwavesError::InvalidFilter(
            key.to_string(),
            "key cannot be empty".to_string(),
        ));
    }
    if key.starts_with("__") {
        return Err(BidwavesError::ReservedFilterKey(key.to_string()));
    }
    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(BidwavesError::InvalidFilter(
            key.to_string(),
            format!("character '{c}' is not allowed in a filter key"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[&str] = &["name", "id"];

    fn query_on_page_3() -> ListQuery {
        let mut query = ListQuery::new(COLUMNS);
        query.set_page(3).unwrap();
        query
    }

    #[test]
    fn test_defaults() {
        let query = ListQuery::new(COLUMNS);
        assert_eq!(query.page(), 1);
        assert_eq!(query.page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(query.search_field(), Some("name"));
        assert!(query.filters().is_empty());
    }

    #[test]
    fn test_search_change_resets_page() {
        let mut query = query_on_page_3();
        assert!(query.set_search_text("acme"));
        assert_eq!(query.page(), 1);

        query.set_page(2).unwrap();
        assert!(!query.set_search_text("acme"));
        assert_eq!(query.page(), 2);
    }

    #[test]
    fn test_filter_change_resets_page() {
        let mut query = query_on_page_3();
        assert!(query.set_filter("active", FilterValue::Bool(true)).unwrap());
        assert_eq!(query.page(), 1);

        query.set_page(4).unwrap();
        assert!(!query.set_filter("active", FilterValue::Bool(true)).unwrap());
        assert_eq!(query.page(), 4);

        assert!(query.remove_filter("active"));
        assert_eq!(query.page(), 1);
    }

    #[test]
    fn test_sort_change_resets_page() {
        let mut query = query_on_page_3();
        assert!(query.set_sort(Some("budget".to_string()), Some(SortDirection::Descending)));
        assert_eq!(query.page(), 1);
        assert_eq!(query.sort_field(), Some("budget"));
    }

    #[test]
    fn test_page_size_change_keeps_page() {
        let mut query = query_on_page_3();
        assert!(query.set_page_size(50).unwrap());
        assert_eq!(query.page(), 3);
        assert!(matches!(
            query.set_page_size(25),
            Err(BidwavesError::InvalidPageSize(25))
        ));
    }

    #[test]
    fn test_half_sort_spec_clears_sort() {
        let mut query = ListQuery::new(COLUMNS);
        query.set_sort(Some("name".to_string()), Some(SortDirection::Ascending));
        assert!(query.set_sort(Some("name".to_string()), None));
        assert_eq!(query.sort_field(), None);
        assert_eq!(query.sort_direction(), None);
    }

    #[test]
    fn test_search_field_must_be_configured() {
        let mut query = ListQuery::new(COLUMNS);
        assert!(query.set_search_field("id").unwrap());
        assert!(matches!(
            query.set_search_field("budget"),
            Err(BidwavesError::InvalidSearchField(_))
        ));
    }

    #[test]
    fn test_text_filter_cannot_shadow_params() {
        let mut query = ListQuery::new(COLUMNS);
        for key in ["page", "size", "order", "sort", "name"] {
            assert!(
                matches!(
                    query.set_filter(key, FilterValue::Text("x".to_string())),
                    Err(BidwavesError::ReservedFilterKey(_))
                ),
                "{key} should be rejected"
            );
        }
        assert!(query.set_filter("__bool_x", FilterValue::Bool(true)).is_err());
        assert!(query.set_filter("a&b", FilterValue::Bool(true)).is_err());

        // Prefixed filters live in their own namespace
        assert!(query.set_filter("page", FilterValue::Bool(true)).unwrap());
    }

    #[test]
    fn test_search_field_cannot_collide_with_text_filter() {
        let mut query = ListQuery::new(COLUMNS);
        query
            .set_filter("id", FilterValue::Text("7".to_string()))
            .unwrap();
        assert!(matches!(
            query.set_search_field("id"),
            Err(BidwavesError::ReservedFilterKey(_))
        ));
    }

    #[test]
    fn test_zero_page_rejected() {
        let mut query = ListQuery::new(COLUMNS);
        assert!(matches!(query.set_page(0), Err(BidwavesError::InvalidPage(0))));
    }

    #[test]
    fn test_sort_direction_parse() {
        assert_eq!("ASC".parse::<SortDirection>().unwrap(), SortDirection::Ascending);
        assert_eq!(SortDirection::Descending.to_string(), "desc");
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
