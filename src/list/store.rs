//! Single source of truth for one list view.

use crate::api::{ApiError, ListPage, Resource};
use crate::notice::Notice;

use super::query::ListQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Fetching,
    Loaded,
    Errored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    /// Page these items were served for. 0 before the first load.
    /// `ListQuery::page` is left alone so a newer page request is not undone.
    pub page: u32,
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            page: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchState {
    pub loading: bool,
    pub last_error: Option<ApiError>,
    pub mounted: bool,
}

impl Default for FetchState {
    fn default() -> Self {
        Self {
            loading: false,
            last_error: None,
            mounted: true,
        }
    }
}

/// The store's full state, as published to observers.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSnapshot<T> {
    pub phase: Phase,
    pub query: ListQuery,
    pub result: ListResult<T>,
    pub fetch: FetchState,
    pub notice: Option<Notice>,
    /// Incremented on every transition; lets observers skip stale reads.
    pub revision: u64,
}

impl<T> ListSnapshot<T> {
    /// Loaded or Errored, i.e. no fetch outstanding.
    pub fn is_settled(&self) -> bool {
        matches!(self.phase, Phase::Loaded | Phase::Errored)
    }
}

#[derive(Debug)]
pub struct ListStore<T> {
    phase: Phase,
    query: ListQuery,
    result: ListResult<T>,
    fetch: FetchState,
    notice: Option<Notice>,
    revision: u64,
}

impl<T: Resource> ListStore<T> {
    pub fn new(query: ListQuery) -> Self {
        Self {
            phase: Phase::Idle,
            query,
            result: ListResult::default(),
            fetch: FetchState::default(),
            notice: None,
            revision: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    /// Mutable access for query edits. Fetch triggering is the caller's job.
    pub fn query_mut(&mut self) -> &mut ListQuery {
        &mut self.query
    }

    pub fn result(&self) -> &ListResult<T> {
        &self.result
    }

    pub fn fetch_state(&self) -> &FetchState {
        &self.fetch
    }

    pub fn is_mounted(&self) -> bool {
        self.fetch.mounted
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Show a notice, replacing any current one.
    pub fn notify(&mut self, notice: Notice) -> bool {
        if !self.fetch.mounted {
            return false;
        }
        self.notice = Some(notice);
        self.bump();
        true
    }

    pub fn dismiss_notice(&mut self) -> bool {
        if self.notice.take().is_none() {
            return false;
        }
        self.bump();
        true
    }

    /// Enter `Fetching` and return the query to request.
    ///
    /// `None` after teardown.
    pub fn begin_fetch(&mut self) -> Option<ListQuery> {
        if !self.fetch.mounted {
            return None;
        }
        self.phase = Phase::Fetching;
        self.fetch.loading = true;
        self.bump();
        Some(self.query.clone())
    }

    /// Apply a successful response for `requested`. Returns whether it applied.
    pub fn apply_success(&mut self, requested: &ListQuery, page: ListPage<T>) -> bool {
        if !self.fetch.mounted {
            return false;
        }
        self.result = ListResult {
            items: page.list,
            total: page.total,
            page: requested.page(),
        };
        self.phase = Phase::Loaded;
        self.fetch.loading = false;
        self.fetch.last_error = None;
        self.bump();
        true
    }

    /// Record a failed fetch. The current result stays visible.
    pub fn apply_error(&mut self, error: ApiError) -> bool {
        if !self.fetch.mounted {
            return false;
        }
        self.phase = Phase::Errored;
        self.fetch.loading = false;
        self.fetch.last_error = Some(error);
        self.bump();
        true
    }

    /// Patch one row in place after the server acknowledged an update.
    pub fn patch_row(&mut self, record: T) -> bool {
        if !self.fetch.mounted {
            return false;
        }
        let Some(slot) = self.result.items.iter_mut().find(|r| r.id() == record.id()) else {
            return false;
        };
        *slot = record;
        self.bump();
        true
    }

    /// Drop one row after the server acknowledged a delete.
    pub fn remove_row(&mut self, id: &str) -> bool {
        if !self.fetch.mounted {
            return false;
        }
        let before = self.result.items.len();
        self.result.items.retain(|r| r.id() != id);
        if self.result.items.len() == before {
            return false;
        }
        self.result.total = self.result.total.saturating_sub(1);
        self.bump();
        true
    }

    /// Flip `mounted` to false. Idempotent; only the first call counts.
    pub fn teardown(&mut self) -> bool {
        if !self.fetch.mounted {
            return false;
        }
        self.fetch.mounted = false;
        self.fetch.loading = false;
        self.bump();
        true
    }

    pub fn snapshot(&self) -> ListSnapshot<T> {
        ListSnapshot {
            phase: self.phase,
            query: self.query.clone(),
            result: self.result.clone(),
            fetch: self.fetch.clone(),
            notice: self.notice.clone(),
            revision: self.revision,
        }
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;
    use crate::api::Order;
    use crate::list::query::FilterValue;

    fn order(id: &str, name: &str) -> Order {
        Order {
            id: id.to_string(),
            name: name.to_string(),
            status: None,
            budget: None,
            active: Some(true),
            created_at: None,
        }
    }

    fn page(items: Vec<Order>, total: u64) -> ListPage<Order> {
        ListPage { list: items, total }
    }

    fn store() -> ListStore<Order> {
        ListStore::new(ListQuery::for_resource::<Order>())
    }

    #[test]
    fn test_idle_fetching_loaded() {
        let mut store = store();
        assert_eq!(store.phase(), Phase::Idle);

        let requested = store.begin_fetch().unwrap();
        assert_eq!(store.phase(), Phase::Fetching);
        assert!(store.fetch_state().loading);

        assert!(store.apply_success(&requested, page(vec![order("1", "Spring")], 1)));
        assert_eq!(store.phase(), Phase::Loaded);
        assert!(!store.fetch_state().loading);
        assert_eq!(store.result().total, 1);
    }

    #[test]
    fn test_empty_page_is_loaded() {
        let mut store = store();
        let requested = store.begin_fetch().unwrap();
        store.apply_success(&requested, ListPage::empty());
        assert_eq!(store.phase(), Phase::Loaded);
        assert!(store.result().items.is_empty());
        assert!(store.fetch_state().last_error.is_none());
    }

    #[test]
    fn test_error_keeps_stale_result() {
        let mut store = store();
        let requested = store.begin_fetch().unwrap();
        store.apply_success(&requested, page(vec![order("1", "Spring")], 1));

        store.begin_fetch();
        store.apply_error(ApiError::ServerNoBody {
            status: StatusCode::BAD_GATEWAY,
        });
        assert_eq!(store.phase(), Phase::Errored);
        assert_eq!(store.result().items.len(), 1);
        assert!(store.fetch_state().last_error.is_some());

        let requested = store.begin_fetch().unwrap();
        store.apply_success(&requested, page(vec![], 0));
        assert!(store.fetch_state().last_error.is_none());
    }

    #[test]
    fn test_result_records_served_page() {
        let mut store = store();
        store.query_mut().set_page(3).unwrap();
        let requested = store.begin_fetch().unwrap();

        // Paging on while the request is out leaves the newer intent alone.
        store.query_mut().set_page(4).unwrap();
        store.apply_success(&requested, page(vec![], 0));
        assert_eq!(store.result().page, 3);
        assert_eq!(store.query().page(), 4);
    }

    #[test]
    fn test_filter_edit_during_fetch_survives() {
        let mut store = store();
        store.query_mut().set_page(3).unwrap();
        let requested = store.begin_fetch().unwrap();

        store
            .query_mut()
            .set_filter("active", FilterValue::Bool(true))
            .unwrap();
        store.apply_success(&requested, page(vec![], 0));
        assert_eq!(store.query().page(), 1);
        assert_eq!(store.query().filters().len(), 1);
    }

    #[test]
    fn test_teardown_blocks_mutation() {
        let mut store = store();
        let requested = store.begin_fetch().unwrap();
        assert!(store.teardown());
        assert!(!store.teardown());

        let before = store.snapshot();
        assert!(!store.apply_success(&requested, page(vec![order("9", "Late")], 1)));
        assert!(!store.apply_error(ApiError::Network("gone".to_string())));
        assert!(store.begin_fetch().is_none());
        assert_eq!(store.snapshot(), before);
        assert!(!store.is_mounted());
    }

    #[test]
    fn test_notice_lifecycle() {
        let mut store = store();
        assert!(store.notify(Notice::warning("Slow response")));
        assert_eq!(store.snapshot().notice.unwrap().message, "Slow response");
        assert!(store.dismiss_notice());
        assert!(!store.dismiss_notice());

        store.teardown();
        assert!(!store.notify(Notice::info("late")));
    }

    #[test]
    fn test_patch_and_remove_rows() {
        let mut store = store();
        let requested = store.begin_fetch().unwrap();
        store.apply_success(
            &requested,
            page(vec![order("1", "Spring"), order("2", "Summer")], 2),
        );

        assert!(store.patch_row(order("2", "Summer sale")));
        assert_eq!(store.result().items[1].name, "Summer sale");
        assert!(!store.patch_row(order("3", "Missing")));

        assert!(store.remove_row("1"));
        assert_eq!(store.result().items.len(), 1);
        assert_eq!(store.result().total, 1);
        assert!(!store.remove_row("1"));
    }
}
