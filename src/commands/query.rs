use serde_json::json;

use super::{CommandOutput, build_list_query};
use crate::api::ResourceKind;
use crate::cli::{ListArgs, OutputOptions};
use crate::config::Config;
use crate::error::Result;
use crate::list::build_path;

/// Print the request a list would send, without sending it.
pub fn cmd_query(kind: ResourceKind, args: &ListArgs, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let query = build_list_query(kind.search_columns(), args, config.page_size())?;
    let path = build_path(kind.endpoint(), &query);
    let url = format!("{}{}", config.base_url().trim_end_matches('/'), path);

    CommandOutput::new(json!({
        "resource": kind.to_string(),
        "path": path,
        "url": url,
        "page": query.page(),
        "page_size": query.page_size(),
    }))
    .with_text(path)
    .print(output)
}
