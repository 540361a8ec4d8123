use thiserror::Error;

use crate::api::error::ApiError;

#[derive(Error, Debug)]
pub enum BidwavesError {
    #[error("unknown resource '{0}', expected one of: order, billing, campaign, product, suggestion")]
    UnknownResource(String),

    #[error("'{0}' is not a searchable column for this list")]
    InvalidSearchField(String),

    #[error("invalid page size {0}, expected one of 10, 20, 50, 100")]
    InvalidPageSize(u32),

    #[error("invalid page {0}, pages start at 1")]
    InvalidPage(u32),

    #[error("invalid sort direction '{0}'")]
    InvalidSortDirection(String),

    #[error("filter key '{0}' collides with a reserved query parameter")]
    ReservedFilterKey(String),

    #[error("invalid filter '{0}': {1}")]
    InvalidFilter(String, String),

    #[error("list controller has shut down")]
    ControllerClosed,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("{0}")]
    Other(String),
}

impl BidwavesError {
    pub fn invalid_sort_direction(s: String) -> Self {
        BidwavesError::InvalidSortDirection(s)
    }

    pub fn unknown_resource(s: String) -> Self {
        BidwavesError::UnknownResource(s)
    }
}

pub type Result<T> = std::result::Result<T, BidwavesError>;
