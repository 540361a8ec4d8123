pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod list;
pub mod macros;
pub mod notice;
pub mod paths;
pub mod session;

#[cfg(test)]
pub(crate) mod test_guards;

pub use api::{ApiClient, ApiError, ListPage, ListSource, Resource, ResourceKind, ResourceSource};
pub use config::Config;
pub use error::{BidwavesError, Result};
pub use events::{EventBus, ListEvent};
pub use list::{
    ControllerOptions, FilterValue, ListController, ListQuery, ListSnapshot, Phase,
    SortDirection, TableChange,
};
pub use notice::{Notice, NoticeLevel};
pub use session::{Anonymous, CredentialStore, Session};
