use super::{Backend, CommandOutput, build_list_query, with_resource};
use crate::api::{Resource, ResourceKind};
use crate::cli::{ListArgs, OutputOptions};
use crate::display::{page_json, page_text};
use crate::error::Result;

/// Fetch one page and print it.
pub async fn cmd_ls(kind: ResourceKind, args: &ListArgs, output: OutputOptions) -> Result<()> {
    let backend = Backend::connect()?;
    with_resource!(kind, list_page(&backend, args, output))
}

async fn list_page<T: Resource>(
    backend: &Backend,
    args: &ListArgs,
    output: OutputOptions,
) -> Result<()> {
    let query = build_list_query(T::SEARCH_COLUMNS, args, backend.config.page_size())?;
    let controller = backend.controller::<T>(query);
    let snapshot = controller.settled().await?;
    let endpoint = controller.endpoint().to_string();
    controller.teardown().await;

    if let Some(err) = &snapshot.fetch.last_error {
        return Err(err.clone().into());
    }

    CommandOutput::new(page_json(&endpoint, &snapshot)?)
        .with_text(page_text(&snapshot))
        .print(output)
}
