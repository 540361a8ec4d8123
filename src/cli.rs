use clap::{Args, Parser, Subcommand};

use crate::api::ResourceKind;

#[derive(Parser)]
#[command(name = "bidwaves")]
#[command(about = "Browse and manage BidWaves campaign data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List one page of a collection
    #[command(visible_alias = "l")]
    Ls {
        /// Collection: order, billing, campaign, product, suggestion
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        #[command(flatten)]
        list: ListArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Incremental search: each stdin line is the search box's new content
    Search {
        /// Collection: order, billing, campaign, product, suggestion
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        #[command(flatten)]
        list: ListArgs,

        /// Output as JSON (one document per result)
        #[arg(long)]
        json: bool,
    },

    /// Print the request path for a list query without sending it
    Query {
        /// Collection: order, billing, campaign, product, suggestion
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        #[command(flatten)]
        list: ListArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a record
    Rm {
        /// Collection: order, billing, campaign, product, suggestion
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,

        /// Record ID
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print one configuration value
    Get {
        /// Key, e.g. list.page_size
        key: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set one configuration value
    Set {
        /// Key, e.g. api.base_url
        key: String,

        /// New value
        value: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Query flags shared by `ls`, `search` and `query`.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Search text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Column to search (defaults to the collection's first searchable column)
    #[arg(long)]
    pub field: Option<String>,

    /// Boolean filter, e.g. --bool active=true
    #[arg(long = "bool", value_name = "KEY=BOOL")]
    pub bools: Vec<String>,

    /// Enumeration filter, e.g. --enum status=running
    #[arg(long = "enum", value_name = "KEY=VALUE")]
    pub enums: Vec<String>,

    /// Presence filter, e.g. --not-null budget or --not-null budget=false
    #[arg(long = "not-null", value_name = "KEY[=BOOL]")]
    pub not_null: Vec<String>,

    /// Free-text filter sent as-is, e.g. --filter channel=search
    #[arg(long = "filter", value_name = "KEY=VALUE")]
    pub filters: Vec<String>,

    /// Sort, e.g. --sort budget:desc
    #[arg(long, value_name = "FIELD:DIR")]
    pub sort: Option<String>,

    /// Page number (1-based)
    #[arg(short, long)]
    pub page: Option<u32>,

    /// Page size: 10, 20, 50 or 100 (default from config)
    #[arg(long)]
    pub size: Option<u32>,
}

/// Output options shared by all commands
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

impl OutputOptions {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

fn parse_kind(s: &str) -> Result<ResourceKind, String> {
    ResourceKind::parse_loose(s).map_err(|e| e.to_string())
}
