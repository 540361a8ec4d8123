//! Remote list views: query state, request building and the controller.

pub mod bridge;
pub mod builder;
pub mod controller;
pub mod debounce;
pub mod guard;
pub mod query;
pub mod store;


pub use bridge::{PaginationChange, SorterChange, TableChange, apply_table_change};
pub use builder::{build_path, build_query_string};
pub use controller::{ControllerOptions, ListController, ListControllerBuilder};
pub use query::{FilterValue, ListQuery, PAGE_SIZE_OPTIONS, SortDirection};
pub use store::{FetchState, ListResult, ListSnapshot, Phase};
