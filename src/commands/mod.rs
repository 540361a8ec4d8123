//! Command implementations for the `bidwaves` binary.

mod config;
mod ls;
mod query;
mod rm;
mod search;

pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use ls::cmd_ls;
pub use query::cmd_query;
pub use rm::cmd_rm;
pub use search::cmd_search;

use std::sync::Arc;

use serde_json::Value;

use crate::api::{ApiClient, Resource, ResourceSource};
use crate::cli::{ListArgs, OutputOptions};
use crate::config::Config;
use crate::error::{BidwavesError, Result};
use crate::events::EventBus;
use crate::list::bridge::normalize_direction;
use crate::list::{ControllerOptions, FilterValue, ListController, ListQuery};
use crate::session::CredentialStore;

/// Run a generic `fn<T: Resource>` for the record type behind a [`ResourceKind`].
///
/// [`ResourceKind`]: crate::api::ResourceKind
macro_rules! with_resource {
    ($kind:expr, $f:ident($($arg:expr),* $(,)?)) => {
        match $kind {
            $crate::api::ResourceKind::Order => $f::<$crate::api::Order>($($arg),*).await,
            $crate::api::ResourceKind::Billing => $f::<$crate::api::Billing>($($arg),*).await,
            $crate::api::ResourceKind::Campaign => $f::<$crate::api::Campaign>($($arg),*).await,
            $crate::api::ResourceKind::Product => $f::<$crate::api::Product>($($arg),*).await,
            $crate::api::ResourceKind::Suggestion => {
                $f::<$crate::api::Suggestion>($($arg),*).await
            }
        }
    };
}
pub(crate) use with_resource;

/// JSON and text renderings of one command's result.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output: OutputOptions) -> Result<()> {
        match self.text {
            Some(text) if !output.json => println!("{text}"),
            _ => print_json(&self.json)?,
        }
        Ok(())
    }
}

pub fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Everything a networked command needs, built from the loaded config.
pub struct Backend {
    pub config: Config,
    pub events: EventBus,
    pub session: Arc<CredentialStore>,
    pub client: Arc<ApiClient>,
}

impl Backend {
    pub fn connect() -> Result<Self> {
        let config = Config::load()?;
        let events = EventBus::new();
        let session = Arc::new(CredentialStore::new(
            config.token(),
            config.reload_delay(),
            events.sender(),
        ));
        let client = Arc::new(ApiClient::from_config(&config, session.clone())?);
        tracing::debug!(base_url = client.base_url(), "backend ready");

        Ok(Self {
            config,
            events,
            session,
            client,
        })
    }

    /// Mount a list controller for `T` with the configured options.
    pub fn controller<T: Resource>(&self, query: ListQuery) -> ListController<T, ResourceSource<T>> {
        ListController::builder(Arc::new(self.client.resource::<T>()), self.session.clone())
            .events(self.events.subscribe())
            .query(query)
            .options(ControllerOptions::from_config(&self.config))
            .spawn()
    }
}

/// Build the initial query from command-line flags.
///
/// The page is applied last: every other edit returns the query to page 1.
pub fn build_list_query(
    search_columns: &'static [&'static str],
    args: &ListArgs,
    default_page_size: u32,
) -> Result<ListQuery> {
    let mut query =
        ListQuery::new(search_columns).with_page_size(args.size.unwrap_or(default_page_size))?;

    if let Some(field) = &args.field {
        query.set_search_field(field)?;
    }
    if let Some(text) = &args.search {
        query.set_search_text(text.clone());
    }

    for raw in &args.bools {
        let (key, value) = split_pair(raw)?;
        query.set_filter(key, FilterValue::Bool(parse_bool(raw, value)?))?;
    }
    for raw in &args.enums {
        let (key, value) = split_pair(raw)?;
        query.set_filter(key, FilterValue::Enum(value.to_string()))?;
    }
    for raw in &args.not_null {
        let (key, present) = match raw.split_once('=') {
            Some((key, value)) => (key, parse_bool(raw, value)?),
            None => (raw.as_str(), true),
        };
        query.set_filter(key, FilterValue::NotNull(present))?;
    }
    for raw in &args.filters {
        let (key, value) = split_pair(raw)?;
        query.set_filter(key, FilterValue::Text(value.to_string()))?;
    }

    if let Some(sort) = &args.sort {
        let (field, direction) = sort.split_once(':').unwrap_or((sort.as_str(), "asc"));
        query.set_sort(Some(field.to_string()), normalize_direction(Some(direction))?);
    }

    if let Some(page) = args.page {
        query.set_page(page)?;
    }
    Ok(query)
}

fn split_pair(raw: &str) -> Result<(&str, &str)> {
    raw.split_once('=')
        .ok_or_else(|| BidwavesError::InvalidFilter(raw.to_string(), "expected KEY=VALUE".into()))
}

fn parse_bool(raw: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(BidwavesError::InvalidFilter(
            raw.to_string(),
            "expected true or false".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Order, Resource};
    use crate::list::build_path;

    fn args() -> ListArgs {
        ListArgs::default()
    }

    #[test]
    fn test_flags_build_query() {
        let args = ListArgs {
            search: Some("acme corp".to_string()),
            bools: vec!["active=true".to_string()],
            enums: vec!["status=running".to_string()],
            not_null: vec!["budget".to_string()],
            sort: Some("budget:descend".to_string()),
            page: Some(2),
            size: Some(20),
            ..args()
        };
        let query = build_list_query(Order::SEARCH_COLUMNS, &args, 10).unwrap();

        insta::assert_snapshot!(
            build_path(Order::ENDPOINT, &query),
            @"/order?size=20&page=2&name=acme%20corp&order=budget&sort=desc&__bool_active=true&__notnull_budget=true&__enum_status=running"
        );
    }

    #[test]
    fn test_page_survives_other_flags() {
        let args = ListArgs {
            filters: vec!["channel=search".to_string()],
            page: Some(4),
            ..args()
        };
        let query = build_list_query(Order::SEARCH_COLUMNS, &args, 10).unwrap();
        assert_eq!(query.page(), 4);
    }

    #[test]
    fn test_malformed_flags_are_rejected() {
        let missing_value = ListArgs {
            bools: vec!["active".to_string()],
            ..args()
        };
        assert!(matches!(
            build_list_query(Order::SEARCH_COLUMNS, &missing_value, 10),
            Err(BidwavesError::InvalidFilter(..))
        ));

        let not_bool = ListArgs {
            bools: vec!["active=maybe".to_string()],
            ..args()
        };
        assert!(build_list_query(Order::SEARCH_COLUMNS, &not_bool, 10).is_err());

        let bad_size = ListArgs {
            size: Some(25),
            ..args()
        };
        assert!(matches!(
            build_list_query(Order::SEARCH_COLUMNS, &bad_size, 10),
            Err(BidwavesError::InvalidPageSize(25))
        ));

        let bad_field = ListArgs {
            field: Some("budget".to_string()),
            ..args()
        };
        assert!(build_list_query(Order::SEARCH_COLUMNS, &bad_field, 10).is_err());
    }

    #[test]
    fn test_text_filter_cannot_shadow_search_field() {
        let args = ListArgs {
            filters: vec!["name=acme".to_string()],
            ..args()
        };
        assert!(matches!(
            build_list_query(Order::SEARCH_COLUMNS, &args, 10),
            Err(BidwavesError::ReservedFilterKey(_))
        ));
    }
}
